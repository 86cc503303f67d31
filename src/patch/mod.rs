// Patch container codec, diff builder and patch applier.

pub mod applier;
pub mod builder;
pub mod container;
pub mod transform;

use std::fmt;

pub use applier::{ApplyOutcome, ApplySession, apply_patch, inspect};
pub use builder::{DiffOutcome, DiffSession, build_diff};
pub use container::{HEADER_LEN, LABEL_LEN, Label, MAGIC, PatchHeader};

use crate::gamefile::VersionRecord;

/// Which direction a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Diff,
    Apply,
}

/// Human-readable description of a patch operation, shown before the transform.
///
/// ```text
/// Diffing game "Zork I" 88/840726 [v3]
/// using 75/830330 [v3] as source.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub operation: Operation,
    pub label: Label,
    pub target: VersionRecord,
    pub source: VersionRecord,
}

impl Summary {
    pub fn new(operation: Operation, header: &PatchHeader) -> Self {
        Self {
            operation,
            label: header.label,
            target: header.target,
            source: header.source,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.operation {
            Operation::Diff => "Diffing",
            Operation::Apply => "Patching",
        };
        write!(
            f,
            "{verb} game \"{}\" {}\nusing {} as source.",
            self.label, self.target, self.source
        )
    }
}
