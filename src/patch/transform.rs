// XOR key stream over the source file.
//
// Both directions XOR the payload against the source bytes, restarting the
// source at offset 0 whenever its declared length is used up. The applier
// additionally restarts on physical end of file; the builder treats that as
// an inconsistent header.

use std::io::{self, BufReader, Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::error::{FileRole, PatchError, Result};

pub(crate) const BUF_SIZE: usize = 64 * 1024; // 64 KiB

/// What to do when the source runs out before its declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofPolicy {
    /// Abort with `DeclaredLengthInconsistency`.
    Fail,
    /// Rewind to the start and keep going.
    Rewind,
}

/// Byte source that cycles over the first `window` bytes of a stream.
pub struct KeyStream<R> {
    inner: BufReader<R>,
    window: u64,
    pos: u64,
    policy: EofPolicy,
    wraps: u64,
}

impl<R: Read + Seek> KeyStream<R> {
    /// Wrap `inner`, positioned at its start. `window` must be non-zero.
    pub fn new(mut inner: R, window: u64, policy: EofPolicy) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner: BufReader::with_capacity(BUF_SIZE, inner),
            window: window.max(1),
            pos: 0,
            policy,
            wraps: 0,
        })
    }

    /// Next key byte.
    pub fn next_byte(&mut self) -> Result<u8> {
        let byte = match read_byte(&mut self.inner)? {
            Some(b) => b,
            None => match self.policy {
                EofPolicy::Fail => {
                    warn!(
                        "source file ended after {} bytes, before its declared length {}",
                        self.pos, self.window
                    );
                    return Err(PatchError::DeclaredLengthInconsistency {
                        role: FileRole::Source,
                        declared: self.window,
                        available: self.pos,
                    });
                }
                EofPolicy::Rewind => {
                    self.rewind()?;
                    read_byte(&mut self.inner)?.ok_or(PatchError::DeclaredLengthInconsistency {
                        role: FileRole::Source,
                        declared: self.window,
                        available: 0,
                    })?
                }
            },
        };

        self.pos += 1;
        if self.pos >= self.window {
            self.rewind()?;
        }
        Ok(byte)
    }

    /// Number of times the stream restarted from offset 0.
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.pos = 0;
        self.wraps += 1;
        debug!("source rewound (wrap {})", self.wraps);
        Ok(())
    }
}

/// Read one byte, `None` at end of stream.
pub(crate) fn read_byte<R: Read>(r: &mut R) -> io::Result<Option<u8>> {
    let mut b = [0u8; 1];
    loop {
        match r.read(&mut b) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(b[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
