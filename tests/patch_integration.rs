mod common;

use std::io::Cursor;

use common::game_image;
use zpatch::gamefile::{GameFileHeader, VersionRecord};
use zpatch::patch::{self, HEADER_LEN, Label, PatchHeader};
use zpatch::{FileRole, PatchError};

fn build(target: &[u8], source: &[u8], label: &str) -> Vec<u8> {
    let mut out = Vec::new();
    patch::build_diff(
        Cursor::new(target.to_vec()),
        Cursor::new(source.to_vec()),
        Label::new(label),
        &mut out,
    )
    .unwrap();
    out
}

fn apply(patch_bytes: &[u8], source: &[u8]) -> Result<Vec<u8>, PatchError> {
    let mut out = Vec::new();
    patch::apply_patch(patch_bytes, Cursor::new(source.to_vec()), &mut out)?;
    Ok(out)
}

#[test]
fn end_to_end_release_upgrade() {
    // Both files are 100 bytes with a length word of 25, i.e. 50 bytes at scale 2.
    let source = game_image(3, 1, b"ABCDEF", 25, 100);
    let target = game_image(3, 2, b"ABCDEG", 25, 100);

    let patch_bytes = build(&target, &source, "Demo Game");
    assert_eq!(patch_bytes.len(), 103);

    let header = patch::inspect(&patch_bytes[..]).unwrap();
    assert_eq!(
        header.target,
        VersionRecord {
            format_version: 3,
            release: 2,
            identifier: *b"ABCDEG",
        }
    );
    assert_eq!(
        header.source,
        VersionRecord {
            format_version: 3,
            release: 1,
            identifier: *b"ABCDEF",
        }
    );
    assert_eq!(header.label.to_string(), "Demo Game");

    for (i, &p) in patch_bytes[HEADER_LEN..].iter().enumerate() {
        assert_eq!(p, target[i] ^ source[i]);
    }

    let rebuilt = apply(&patch_bytes, &source).unwrap();
    assert_eq!(rebuilt, &target[..50]);
}

#[test]
fn longer_target_reuses_shorter_source() {
    let source = game_image(5, 10, b"870601", 16, 64);
    let target = game_image(5, 11, b"870715", 100, 400);

    let patch_bytes = build(&target, &source, "Wraparound");
    assert_eq!(patch_bytes.len(), HEADER_LEN + 400);
    assert_eq!(apply(&patch_bytes, &source).unwrap(), target);
}

#[test]
fn padded_source_wraps_at_declared_length_not_file_end() {
    // Source declares 40 bytes but carries 24 bytes of padding.
    let mut source = game_image(3, 5, b"860101", 20, 64);
    for b in &mut source[40..] {
        *b = 0xFF;
    }
    let target = game_image(3, 6, b"860202", 50, 100);

    let patch_bytes = build(&target, &source, "Padded");
    for (i, &p) in patch_bytes[HEADER_LEN..].iter().enumerate() {
        assert_eq!(p, target[i] ^ source[i % 40], "byte {i}");
    }
    assert_eq!(apply(&patch_bytes, &source).unwrap(), target);
}

#[test]
fn zero_length_word_uses_whole_file() {
    let source = game_image(8, 1, b"ABCDEF", 0, 77);
    let target = game_image(8, 2, b"ABCDEF", 0, 91);

    let h = GameFileHeader::read(&mut Cursor::new(target.clone()), FileRole::Target).unwrap();
    assert_eq!(h.declared_length, 91);
    assert!(h.length_from_file_size);

    let patch_bytes = build(&target, &source, "");
    assert_eq!(patch_bytes.len(), HEADER_LEN + 91);
    assert_eq!(apply(&patch_bytes, &source).unwrap(), target);
}

#[test]
fn wrong_source_is_refused() {
    let source = game_image(3, 1, b"ABCDEF", 25, 100);
    let other = game_image(3, 1, b"ABCDEX", 25, 100);
    let target = game_image(3, 2, b"ABCDEG", 25, 100);

    let patch_bytes = build(&target, &source, "Mismatch");
    match apply(&patch_bytes, &other).unwrap_err() {
        PatchError::SourceMismatch {
            expected, found, ..
        } => {
            assert_eq!(&expected.identifier, b"ABCDEF");
            assert_eq!(&found.identifier, b"ABCDEX");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn mismatch_in_each_header_byte_is_detected() {
    let source = game_image(3, 0x0102, b"ABCDEF", 25, 100);
    let target = game_image(3, 0x0103, b"ABCDEG", 25, 100);
    let patch_bytes = build(&target, &source, "Tamper");

    // Alter the source file itself: version, both release bytes, identifier.
    for offset in [0usize, 2, 3, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17] {
        let mut altered = source.clone();
        altered[offset] = if offset == 0 { 4 } else { altered[offset] ^ 0x20 };
        let mut out = Vec::new();
        let err = patch::apply_patch(&patch_bytes[..], Cursor::new(altered), &mut out).unwrap_err();
        assert!(
            matches!(err, PatchError::SourceMismatch { .. }),
            "offset {offset:#x}: {err}"
        );
        assert!(out.is_empty());
    }
}

#[test]
fn container_magic_must_match_exactly() {
    let source = game_image(3, 1, b"ABCDEF", 25, 100);
    let target = game_image(3, 2, b"ABCDEG", 25, 100);
    let patch_bytes = build(&target, &source, "Magic");

    for bad in [*b"pfg", *b"PFg", *b"GFP", *b"\0FG", *b"PF\0"] {
        let mut tampered = patch_bytes.clone();
        tampered[..3].copy_from_slice(&bad);
        assert!(matches!(
            patch::inspect(&tampered[..]),
            Err(PatchError::InvalidContainer(_))
        ));
        assert!(matches!(
            apply(&tampered, &source),
            Err(PatchError::InvalidContainer(_))
        ));
    }
}

#[test]
fn label_bytes_survive_unchanged() {
    let source = game_image(3, 1, b"ABCDEF", 25, 100);
    let mut raw = [0u8; 32];
    raw[..4].copy_from_slice(b"Zork");
    raw[10..13].copy_from_slice(b"xyz");
    let header = PatchHeader {
        label: Label::from_raw(raw),
        target: VersionRecord {
            format_version: 3,
            release: 1,
            identifier: *b"ABCDEF",
        },
        source: VersionRecord {
            format_version: 3,
            release: 1,
            identifier: *b"ABCDEF",
        },
    };
    let mut patch_bytes = Vec::new();
    header.encode(&mut patch_bytes).unwrap();
    patch_bytes.extend_from_slice(&[0u8; 10]);

    let decoded = patch::inspect(&patch_bytes[..]).unwrap();
    assert_eq!(decoded.label.as_bytes(), &raw);
    assert_eq!(decoded.label.to_string(), "Zork");
    assert_eq!(apply(&patch_bytes, &source).unwrap(), &source[..10]);
}
