// Patch container header: magic, game label and the two endpoint records.
//
// Layout (all integers big-endian):
//   0   3   magic "PFG"
//   3  32   label, NUL padded
//  35   9   target record (version, release, identifier)
//  44   9   source record
//  53   ..  XOR payload up to end of stream

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::{PatchError, Result};
use crate::gamefile::{RECORD_LEN, VersionRecord};

pub const MAGIC: [u8; 3] = *b"PFG";
pub const LABEL_LEN: usize = 32;

/// Size of everything before the payload.
pub const HEADER_LEN: usize = MAGIC.len() + LABEL_LEN + 2 * RECORD_LEN;

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Human-readable game name stored in a fixed 32-byte field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Label([u8; LABEL_LEN]);

impl Label {
    /// Build a label from text, truncating to 32 bytes.
    pub fn new(text: &str) -> Self {
        let mut raw = [0u8; LABEL_LEN];
        let n = text.len().min(LABEL_LEN);
        raw[..n].copy_from_slice(&text.as_bytes()[..n]);
        Self(raw)
    }

    /// Join command-line words into a label.
    ///
    /// A leading quote on the first word and a trailing quote on the result
    /// are dropped. Words are joined by single spaces; the first word that
    /// would overflow the field ends the label. A quoted first word longer
    /// than the field leaves the label empty.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let mut name = String::new();
        for (i, word) in words.iter().enumerate() {
            let word = word.as_ref();
            if i == 0 && word.starts_with('"') {
                if word.len() > LABEL_LEN {
                    break;
                }
                name.push_str(&word[1..]);
                continue;
            }
            // The joining space is counted for the first word too.
            if name.len() + 1 + word.len() > LABEL_LEN {
                break;
            }
            if i > 0 {
                name.push(' ');
            }
            name.push_str(word);
        }
        if name.ends_with('"') {
            name.pop();
        }
        Self::new(&name)
    }

    pub fn from_raw(raw: [u8; LABEL_LEN]) -> Self {
        Self(raw)
    }

    /// The raw 32-byte field, embedded NULs included.
    pub fn as_bytes(&self) -> &[u8; LABEL_LEN] {
        &self.0
    }

    /// Bytes up to the first NUL.
    pub fn text_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(LABEL_LEN);
        &self.0[..end]
    }
}

impl Default for Label {
    fn default() -> Self {
        Self([0u8; LABEL_LEN])
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.text_bytes()))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?})", String::from_utf8_lossy(self.text_bytes()))
    }
}

// ---------------------------------------------------------------------------
// PatchHeader
// ---------------------------------------------------------------------------

/// Decoded container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    pub label: Label,
    /// The file the patch produces.
    pub target: VersionRecord,
    /// The file the patch must be applied to.
    pub source: VersionRecord,
}

impl PatchHeader {
    /// Write the 53-byte header. The payload is streamed by the caller.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(self.label.as_bytes())?;
        w.write_all(&self.target.to_bytes())?;
        w.write_all(&self.source.to_bytes())?;
        Ok(())
    }

    /// Check the magic marker, consuming exactly three bytes.
    pub fn verify_magic<R: Read>(r: &mut R) -> Result<()> {
        let mut magic = [0u8; 3];
        let n = read_full(r, &mut magic)?;
        if n < magic.len() || magic != MAGIC {
            return Err(PatchError::InvalidContainer(format!(
                "bad magic {:02X?}, expected \"PFG\"",
                &magic[..n]
            )));
        }
        Ok(())
    }

    /// Read everything after the magic: label and both records.
    ///
    /// Leaves the reader at the first payload byte.
    pub fn decode_body<R: Read>(r: &mut R) -> Result<Self> {
        let mut body = [0u8; HEADER_LEN - MAGIC.len()];
        let n = read_full(r, &mut body)?;
        if n < body.len() {
            return Err(PatchError::InvalidContainer(format!(
                "header truncated after {} bytes",
                MAGIC.len() + n
            )));
        }

        let mut label = [0u8; LABEL_LEN];
        label.copy_from_slice(&body[..LABEL_LEN]);
        let (target, source) = body[LABEL_LEN..].split_at(RECORD_LEN);

        Ok(Self {
            label: Label::from_raw(label),
            target: VersionRecord::from_bytes(target.try_into().map_err(|_| truncated())?),
            source: VersionRecord::from_bytes(source.try_into().map_err(|_| truncated())?),
        })
    }

    /// Decode the full header, magic included.
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        Self::verify_magic(r)?;
        Self::decode_body(r)
    }
}

fn truncated() -> PatchError {
    PatchError::InvalidContainer("header truncated".into())
}

/// Read until `buf` is full or the stream ends, returning bytes read.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
