// Fixed-offset header fields of a z-code story file.
//
// Only the fields a patch needs are read: format version, release,
// identifier and the scaled length word. Nothing here is ever written back.

use std::io::{Read, Seek, SeekFrom};

use log::warn;

use super::{IDENTIFIER_LEN, VersionRecord};
use crate::error::{FileRole, PatchError, Result};

// ---------------------------------------------------------------------------
// Header layout
// ---------------------------------------------------------------------------

pub const VERSION_OFFSET: usize = 0x00;
pub const RELEASE_OFFSET: usize = 0x02;
pub const IDENTIFIER_OFFSET: usize = 0x12;
pub const LENGTH_OFFSET: usize = 0x1A;

/// Bytes needed to cover every field read from the header.
pub const HEADER_SPAN: usize = LENGTH_OFFSET + 2;

/// Whether `byte` is a recognised z-code format version (1-8).
pub fn is_format_version(byte: u8) -> bool {
    (1..=8).contains(&byte)
}

/// Multiplier applied to the length word for a given format version.
///
/// Unrecognised versions are left unscaled.
pub fn length_scale(format_version: u8) -> u64 {
    match format_version {
        1..=3 => 2,
        4 | 5 => 4,
        6..=8 => 8,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// GameFileHeader
// ---------------------------------------------------------------------------

/// Metadata extracted from a game file's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameFileHeader {
    pub format_version: u8,
    pub release: u16,
    pub identifier: [u8; IDENTIFIER_LEN],
    /// Number of meaningful bytes in the file, after scaling.
    pub declared_length: u64,
    /// Set when the length word was zero and the physical size was used instead.
    pub length_from_file_size: bool,
}

impl GameFileHeader {
    /// Parse the header from its first `HEADER_SPAN` bytes.
    ///
    /// `file_size` is used as the declared length when the length word is zero.
    pub fn parse(bytes: &[u8; HEADER_SPAN], file_size: u64) -> Self {
        let format_version = bytes[VERSION_OFFSET];
        let release = u16::from_be_bytes([bytes[RELEASE_OFFSET], bytes[RELEASE_OFFSET + 1]]);

        let mut identifier = [0u8; IDENTIFIER_LEN];
        identifier.copy_from_slice(&bytes[IDENTIFIER_OFFSET..IDENTIFIER_OFFSET + IDENTIFIER_LEN]);

        let length_word = u16::from_be_bytes([bytes[LENGTH_OFFSET], bytes[LENGTH_OFFSET + 1]]);
        let scaled = u64::from(length_word) * length_scale(format_version);
        let (declared_length, length_from_file_size) = if scaled == 0 {
            (file_size, true)
        } else {
            (scaled, false)
        };

        Self {
            format_version,
            release,
            identifier,
            declared_length,
            length_from_file_size,
        }
    }

    /// Read the header from a seekable stream and rewind it to offset 0.
    ///
    /// No validation is done on the format version; callers that need a
    /// real game file check it with [`is_format_version`] first. A zero
    /// length word falls back to the stream's physical size and logs a
    /// warning.
    pub fn read<R: Read + Seek>(stream: &mut R, role: FileRole) -> Result<Self> {
        let file_size = stream.seek(SeekFrom::End(0))?;
        if file_size < HEADER_SPAN as u64 {
            stream.seek(SeekFrom::Start(0))?;
            return Err(PatchError::HeaderTooShort {
                role,
                len: file_size,
            });
        }

        stream.seek(SeekFrom::Start(0))?;
        let mut bytes = [0u8; HEADER_SPAN];
        stream.read_exact(&mut bytes)?;
        stream.seek(SeekFrom::Start(0))?;

        let header = Self::parse(&bytes, file_size);
        if header.length_from_file_size {
            warn!(
                "{role} has no embedded length, using the whole file ({file_size} bytes); \
                 padding in the file will make the patch inaccurate"
            );
        }
        Ok(header)
    }

    /// The identity fields stored in a patch container.
    pub fn record(&self) -> VersionRecord {
        VersionRecord {
            format_version: self.format_version,
            release: self.release,
            identifier: self.identifier,
        }
    }
}

/// Read the first byte of `stream` and rewind it.
///
/// Returns `None` for an empty stream.
pub fn peek_format_version<R: Read + Seek>(stream: &mut R) -> Result<Option<u8>> {
    stream.seek(SeekFrom::Start(0))?;
    let mut first = [0u8; 1];
    let n = stream.read(&mut first)?;
    stream.seek(SeekFrom::Start(0))?;
    Ok((n == 1).then_some(first[0]))
}

/// Whether `stream` starts with a recognised format version.
pub fn looks_like_game_file<R: Read + Seek>(stream: &mut R) -> Result<bool> {
    Ok(peek_format_version(stream)?.is_some_and(is_format_version))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
