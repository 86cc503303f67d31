// Game-data (z-code story) file metadata.
//
// `header` reads the fixed-offset fields out of a story file; `VersionRecord`
// is the 9-byte identity both endpoints of a patch are described by.

pub mod header;

use std::fmt;

pub use header::GameFileHeader;

/// Length of a serialized `VersionRecord`: version, release (2), identifier (6).
pub const RECORD_LEN: usize = 9;

/// Length of the identifier (serial) field.
pub const IDENTIFIER_LEN: usize = 6;

/// Identity of one game file: format version, release number and identifier.
///
/// Displays as `release/identifier [vN]`. The identifier is shown verbatim
/// when all six bytes are printable ASCII, otherwise as `$` followed by
/// twelve uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRecord {
    pub format_version: u8,
    pub release: u16,
    pub identifier: [u8; IDENTIFIER_LEN],
}

impl VersionRecord {
    /// Serialize as stored in a patch container (release big-endian).
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0] = self.format_version;
        out[1..3].copy_from_slice(&self.release.to_be_bytes());
        out[3..].copy_from_slice(&self.identifier);
        out
    }

    pub fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Self {
        let mut identifier = [0u8; IDENTIFIER_LEN];
        identifier.copy_from_slice(&bytes[3..]);
        Self {
            format_version: bytes[0],
            release: u16::from_be_bytes([bytes[1], bytes[2]]),
            identifier,
        }
    }

    /// Whether the identifier renders as plain characters.
    pub fn identifier_is_printable(&self) -> bool {
        self.identifier.iter().all(|b| (0x20..=0x7F).contains(b))
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.release)?;
        if self.identifier_is_printable() {
            for &b in &self.identifier {
                write!(f, "{}", b as char)?;
            }
        } else {
            f.write_str("$")?;
            for b in &self.identifier {
                write!(f, "{b:02X}")?;
            }
        }
        write!(f, " [v{}]", self.format_version)
    }
}
