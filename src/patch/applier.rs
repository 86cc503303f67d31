// Patch applier: rebuild a target game file from a patch and its source.
//
// Opening a session walks the verification stages in order:
//   1. container magic
//   2. source format version
//   3. container label and records
//   4. source header against the recorded source identity
// Only after all of them pass is any output written.

use std::io::{BufReader, BufWriter, Read, Seek, Write};

use log::debug;

use super::container::PatchHeader;
use super::transform::{BUF_SIZE, EofPolicy, KeyStream, read_byte};
use super::{Operation, Summary};
use crate::error::{FileRole, PatchError, Result};
use crate::gamefile::GameFileHeader;
use crate::gamefile::header::looks_like_game_file;

/// Result of a completed reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Bytes written to the reconstructed target.
    pub output_len: u64,
    /// Number of times the source restarted from its first byte.
    pub source_wraps: u64,
}

/// Read the container header of a patch without touching any source file.
pub fn inspect<R: Read>(mut patch: R) -> Result<PatchHeader> {
    PatchHeader::decode(&mut patch)
}

/// One apply operation over an open patch and source.
pub struct ApplySession<P, S> {
    patch: BufReader<P>,
    source: S,
    header: PatchHeader,
    source_header: GameFileHeader,
}

impl<P: Read, S: Read + Seek> ApplySession<P, S> {
    /// Verify the patch and the source, leaving the patch at its payload.
    pub fn open(patch: P, mut source: S) -> Result<Self> {
        let mut patch = BufReader::with_capacity(BUF_SIZE, patch);

        PatchHeader::verify_magic(&mut patch)?;

        if !looks_like_game_file(&mut source)? {
            return Err(PatchError::NotAGameFile {
                roles: vec![FileRole::Source],
            });
        }

        let header = PatchHeader::decode_body(&mut patch)?;

        let source_header = GameFileHeader::read(&mut source, FileRole::Source)?;
        let found = source_header.record();
        if found != header.source {
            return Err(PatchError::SourceMismatch {
                label: header.label,
                expected: header.source,
                found,
            });
        }
        debug!(
            "apply: source {found} matches, {} bytes per wrap",
            source_header.declared_length
        );

        Ok(Self {
            patch,
            source,
            header,
            source_header,
        })
    }

    pub fn header(&self) -> &PatchHeader {
        &self.header
    }

    pub fn source_header(&self) -> &GameFileHeader {
        &self.source_header
    }

    pub fn summary(&self) -> Summary {
        Summary::new(Operation::Apply, &self.header)
    }

    /// XOR the payload against the source until the patch ends.
    pub fn reconstruct<W: Write>(self, out: W) -> Result<ApplyOutcome> {
        let mut out = BufWriter::with_capacity(BUF_SIZE, out);
        let mut patch = self.patch;
        let mut key = KeyStream::new(
            self.source,
            self.source_header.declared_length,
            EofPolicy::Rewind,
        )?;

        let mut written = 0u64;
        while let Some(p) = read_byte(&mut patch)? {
            let k = key.next_byte()?;
            out.write_all(&[p ^ k])?;
            written += 1;
        }
        out.flush()?;

        debug!("apply: wrote {written} bytes, {} source wraps", key.wraps());
        Ok(ApplyOutcome {
            output_len: written,
            source_wraps: key.wraps(),
        })
    }
}

/// Apply `patch` to `source`, writing the reconstructed target to `out`.
pub fn apply_patch<P, S, W>(patch: P, source: S, out: W) -> Result<ApplyOutcome>
where
    P: Read,
    S: Read + Seek,
    W: Write,
{
    ApplySession::open(patch, source)?.reconstruct(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
