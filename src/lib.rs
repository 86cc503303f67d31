//! Zpatch: XOR patches between versions of Infocom z-code game files.
//!
//! The crate provides:
//! - Header extraction for z-code story files (`gamefile`)
//! - The `PFG` patch container, diff builder and patch applier (`patch`)
//! - File-oriented helpers with atomic output (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use zpatch::patch::{self, Label};
//!
//! let target = File::open("zork1-r88.z3").unwrap();
//! let source = File::open("zork1-r75.z3").unwrap();
//! let mut delta = Vec::new();
//! patch::build_diff(target, source, Label::new("Zork I"), &mut delta).unwrap();
//!
//! let source = File::open("zork1-r75.z3").unwrap();
//! let mut rebuilt = Vec::new();
//! patch::apply_patch(&delta[..], source, &mut rebuilt).unwrap();
//! ```

pub mod error;
pub mod gamefile;
pub mod io;
pub mod patch;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{FileRole, PatchError};
