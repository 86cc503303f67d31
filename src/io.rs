// File-level helpers for building, applying and inspecting patches.
//
// Each helper owns its file handles for the duration of one operation.
// Outputs are written to a temporary file next to the destination and
// renamed into place only once the transform has completed, so a failed
// run never leaves a truncated patch or game file behind. Optionally
// computes a streaming SHA-256 of the output (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;
use tempfile::NamedTempFile;

use crate::error::{FileRole, PatchError, Result};
use crate::patch::{ApplySession, DiffSession, Label, PatchHeader, Summary, inspect};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `diff_file()`.
#[derive(Debug, Clone)]
pub struct DiffStats {
    pub summary: Summary,
    /// XOR payload length (the target's declared length).
    pub payload_len: u64,
    /// Patch file size, container header included.
    pub patch_size: u64,
    /// Times the source was restarted from its first byte.
    pub source_wraps: u64,
    /// SHA-256 of the patch file (if `file-io` feature is enabled).
    pub patch_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `apply_file()`.
#[derive(Debug, Clone)]
pub struct ApplyStats {
    pub summary: Summary,
    /// Reconstructed target size in bytes.
    pub output_size: u64,
    /// Times the source was restarted from its first byte.
    pub source_wraps: u64,
    /// SHA-256 of the reconstructed target (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// diff_file
// ---------------------------------------------------------------------------

/// Build a patch from `source_path` to `target_path`, writing it to `output_path`.
///
/// `announce` receives the operation summary after both inputs have been
/// validated and before any payload is written.
pub fn diff_file(
    source_path: &Path,
    target_path: &Path,
    output_path: &Path,
    label: Label,
    announce: impl FnOnce(&Summary),
) -> Result<DiffStats> {
    let target = open_input(FileRole::Target, target_path)?;
    let source = open_input(FileRole::Source, source_path)?;
    let mut output = AtomicOutput::create(output_path)?;

    let session = DiffSession::open(target, source, label)?;
    let summary = session.summary();
    announce(&summary);

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let outcome = session.write_patch(HashingWriter {
        inner: output.file(),
        hasher: &mut hasher,
    })?;

    #[cfg(not(feature = "file-io"))]
    let outcome = session.write_patch(output.file())?;

    output.commit()?;

    #[cfg(feature = "file-io")]
    let patch_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let patch_sha256: Option<[u8; 32]> = None;

    Ok(DiffStats {
        summary,
        payload_len: outcome.payload_len,
        patch_size: outcome.patch_size(),
        source_wraps: outcome.source_wraps,
        patch_sha256,
    })
}

// ---------------------------------------------------------------------------
// apply_file
// ---------------------------------------------------------------------------

/// Apply the patch at `patch_path` to `source_path`, writing the result to
/// `output_path`.
///
/// Nothing is written unless the patch and source pass verification.
pub fn apply_file(
    patch_path: &Path,
    source_path: &Path,
    output_path: &Path,
    announce: impl FnOnce(&Summary),
) -> Result<ApplyStats> {
    let patch = open_input(FileRole::Patch, patch_path)?;
    let source = open_input(FileRole::Source, source_path)?;
    let mut output = AtomicOutput::create(output_path)?;

    let session = ApplySession::open(patch, source)?;
    let summary = session.summary();
    announce(&summary);

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let outcome = session.reconstruct(HashingWriter {
        inner: output.file(),
        hasher: &mut hasher,
    })?;

    #[cfg(not(feature = "file-io"))]
    let outcome = session.reconstruct(output.file())?;

    output.commit()?;

    #[cfg(feature = "file-io")]
    let output_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(ApplyStats {
        summary,
        output_size: outcome.output_len,
        source_wraps: outcome.source_wraps,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// inspect_file
// ---------------------------------------------------------------------------

/// Read the container header of the patch at `patch_path`.
pub fn inspect_file(patch_path: &Path) -> Result<PatchHeader> {
    let patch = open_input(FileRole::Patch, patch_path)?;
    inspect(BufReader::new(patch))
}

// ---------------------------------------------------------------------------
// File handling
// ---------------------------------------------------------------------------

fn open_input(role: FileRole, path: &Path) -> Result<File> {
    File::open(path).map_err(|source| PatchError::FileOpen {
        role,
        path: path.to_path_buf(),
        source,
    })
}

/// Output written to a sibling temporary file and renamed on `commit`.
///
/// Dropping without committing removes the temporary file.
struct AtomicOutput {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl AtomicOutput {
    fn create(path: &Path) -> Result<Self> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|source| PatchError::FileOpen {
            role: FileRole::Output,
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
        })
    }

    fn file(&mut self) -> &mut File {
        self.tmp.as_file_mut()
    }

    fn commit(mut self) -> Result<()> {
        self.tmp.as_file_mut().sync_all()?;
        self.tmp
            .persist(&self.path)
            .map_err(|e| PatchError::FileOpen {
                role: FileRole::Output,
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
