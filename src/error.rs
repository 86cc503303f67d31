// Error type shared by the header inspector, container codec, builder and applier.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gamefile::VersionRecord;
use crate::patch::Label;

/// Which file an error or diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// The newer game file a patch produces.
    Target,
    /// The older game file a patch is built against.
    Source,
    /// The patch container.
    Patch,
    /// The file being written (patch in diff mode, target in apply mode).
    Output,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Target => "target file",
            Self::Source => "source file",
            Self::Patch => "patch file",
            Self::Output => "output file",
        })
    }
}

/// Errors produced while building, inspecting or applying a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A named file could not be opened or created.
    #[error("unable to open {role} '{}': {source}", .path.display())]
    FileOpen {
        role: FileRole,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One or more inputs do not start with a format version in 1..=8.
    #[error("{}", not_game_files(.roles))]
    NotAGameFile { roles: Vec<FileRole> },

    /// The input is too short to hold the fixed header fields.
    #[error("{role} is too short to hold a game header ({len} bytes)")]
    HeaderTooShort { role: FileRole, len: u64 },

    /// The patch does not start with the `PFG` marker, or its header is cut short.
    #[error("not a valid patch file: {0}")]
    InvalidContainer(String),

    /// The source file header differs from the one recorded in the patch.
    #[error("source file is version {found}, patch requires version {expected}")]
    SourceMismatch {
        label: Label,
        expected: VersionRecord,
        found: VersionRecord,
    },

    /// A stream ran out before its declared length was reached.
    #[error("end of {role} after {available} bytes, declared length is {declared}")]
    DeclaredLengthInconsistency {
        role: FileRole,
        declared: u64,
        available: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn not_game_files(roles: &[FileRole]) -> String {
    let names: Vec<String> = roles.iter().map(ToString::to_string).collect();
    match names.as_slice() {
        [one] => format!("{one} is not a valid game file"),
        _ => format!("{} are not valid game files", names.join(" and ")),
    }
}

pub type Result<T, E = PatchError> = std::result::Result<T, E>;
