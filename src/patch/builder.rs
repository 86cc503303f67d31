// Diff builder: XOR a target game file against a source game file.

use std::io::{BufReader, BufWriter, Read, Seek, Write};

use log::{debug, warn};

use super::container::{HEADER_LEN, Label, PatchHeader};
use super::transform::{BUF_SIZE, EofPolicy, KeyStream, read_byte};
use super::{Operation, Summary};
use crate::error::{FileRole, PatchError, Result};
use crate::gamefile::GameFileHeader;
use crate::gamefile::header::looks_like_game_file;

/// Result of a completed diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Payload bytes written after the container header.
    pub payload_len: u64,
    /// Number of times the source restarted from its first byte.
    pub source_wraps: u64,
}

impl DiffOutcome {
    /// Total patch size, header included.
    pub fn patch_size(&self) -> u64 {
        HEADER_LEN as u64 + self.payload_len
    }
}

/// One diff operation over an open target and source.
///
/// Opening validates both inputs and reads their headers; [`write_patch`]
/// then emits the container.
///
/// [`write_patch`]: DiffSession::write_patch
pub struct DiffSession<T, S> {
    target: T,
    source: S,
    target_header: GameFileHeader,
    source_header: GameFileHeader,
    label: Label,
}

impl<T: Read + Seek, S: Read + Seek> DiffSession<T, S> {
    /// Validate both inputs and read their headers.
    ///
    /// Both files are checked before failing, so a `NotAGameFile` error
    /// names every bad input.
    pub fn open(mut target: T, mut source: S, label: Label) -> Result<Self> {
        let mut bad = Vec::new();
        if !looks_like_game_file(&mut target)? {
            bad.push(FileRole::Target);
        }
        if !looks_like_game_file(&mut source)? {
            bad.push(FileRole::Source);
        }
        if !bad.is_empty() {
            return Err(PatchError::NotAGameFile { roles: bad });
        }

        let target_header = GameFileHeader::read(&mut target, FileRole::Target)?;
        let source_header = GameFileHeader::read(&mut source, FileRole::Source)?;
        debug!(
            "diff: target {} ({} bytes), source {} ({} bytes)",
            target_header.record(),
            target_header.declared_length,
            source_header.record(),
            source_header.declared_length
        );

        Ok(Self {
            target,
            source,
            target_header,
            source_header,
            label,
        })
    }

    pub fn target_header(&self) -> &GameFileHeader {
        &self.target_header
    }

    pub fn source_header(&self) -> &GameFileHeader {
        &self.source_header
    }

    /// The container header this session will write.
    pub fn patch_header(&self) -> PatchHeader {
        PatchHeader {
            label: self.label,
            target: self.target_header.record(),
            source: self.source_header.record(),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::new(Operation::Diff, &self.patch_header())
    }

    /// Write the container header followed by the XOR payload.
    ///
    /// The payload is exactly the target's declared length. Running out of
    /// either input before its declared length aborts with
    /// `DeclaredLengthInconsistency`.
    pub fn write_patch<W: Write>(self, out: W) -> Result<DiffOutcome> {
        let mut out = BufWriter::with_capacity(BUF_SIZE, out);
        self.patch_header().encode(&mut out)?;

        let declared = self.target_header.declared_length;
        let mut target = BufReader::with_capacity(BUF_SIZE, self.target);
        let mut key = KeyStream::new(
            self.source,
            self.source_header.declared_length,
            EofPolicy::Fail,
        )?;

        let mut written = 0u64;
        while written < declared {
            let Some(t) = read_byte(&mut target)? else {
                warn!("target file ended after {written} bytes, before its declared length {declared}");
                return Err(PatchError::DeclaredLengthInconsistency {
                    role: FileRole::Target,
                    declared,
                    available: written,
                });
            };
            let k = key.next_byte()?;
            out.write_all(&[t ^ k])?;
            written += 1;
        }
        out.flush()?;

        debug!("diff: wrote {written} payload bytes, {} source wraps", key.wraps());
        Ok(DiffOutcome {
            payload_len: written,
            source_wraps: key.wraps(),
        })
    }
}

/// Build a patch turning `source` into `target`, writing it to `out`.
pub fn build_diff<T, S, W>(target: T, source: S, label: Label, out: W) -> Result<DiffOutcome>
where
    T: Read + Seek,
    S: Read + Seek,
    W: Write,
{
    DiffSession::open(target, source, label)?.write_patch(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
