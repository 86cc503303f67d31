mod common;

use std::io::Cursor;

use common::write_header;
use proptest::prelude::*;
use zpatch::gamefile::header::length_scale;
use zpatch::patch::{self, HEADER_LEN, Label};

/// A story file of arbitrary content whose declared length fits the data.
///
/// A length word of zero exercises the whole-file fallback.
fn story() -> impl Strategy<Value = (Vec<u8>, u64)> {
    (
        1u8..=8,
        any::<u16>(),
        any::<[u8; 6]>(),
        any::<u16>(),
        proptest::collection::vec(any::<u8>(), 0x1C..2048),
    )
        .prop_map(|(version, release, identifier, seed, mut data)| {
            let scale = length_scale(version);
            let max_word = (data.len() as u64 / scale).min(u64::from(u16::MAX));
            let word = (u64::from(seed) % (max_word + 1)) as u16;
            write_header(&mut data, version, release, &identifier, word);
            let declared = match u64::from(word) * scale {
                0 => data.len() as u64,
                n => n,
            };
            (data, declared)
        })
}

fn build(target: &[u8], source: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    patch::build_diff(
        Cursor::new(target.to_vec()),
        Cursor::new(source.to_vec()),
        Label::new("prop"),
        &mut out,
    )
    .unwrap();
    out
}

proptest! {
    #[test]
    fn prop_build_apply_roundtrip(
        (target, target_len) in story(),
        (source, _) in story(),
    ) {
        let patch_bytes = build(&target, &source);
        prop_assert_eq!(patch_bytes.len() as u64, HEADER_LEN as u64 + target_len);

        let mut rebuilt = Vec::new();
        patch::apply_patch(&patch_bytes[..], Cursor::new(source), &mut rebuilt).unwrap();
        prop_assert_eq!(&rebuilt[..], &target[..target_len as usize]);
    }

    #[test]
    fn prop_identical_files_give_zero_payload((image, len) in story()) {
        let patch_bytes = build(&image, &image);
        prop_assert_eq!(patch_bytes.len() as u64, HEADER_LEN as u64 + len);
        prop_assert!(patch_bytes[HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn prop_header_fields_are_recorded(
        (target, _) in story(),
        (source, _) in story(),
    ) {
        let patch_bytes = build(&target, &source);
        prop_assert_eq!(&patch_bytes[..3], b"PFG");
        prop_assert_eq!(patch_bytes[35], target[0]);
        prop_assert_eq!(&patch_bytes[36..38], &target[2..4]);
        prop_assert_eq!(&patch_bytes[38..44], &target[0x12..0x18]);
        prop_assert_eq!(patch_bytes[44], source[0]);
        prop_assert_eq!(&patch_bytes[45..47], &source[2..4]);
        prop_assert_eq!(&patch_bytes[47..53], &source[0x12..0x18]);
    }

    #[test]
    fn prop_non_pfg_prefix_is_rejected(prefix in any::<[u8; 3]>(), rest in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assume!(&prefix != b"PFG");
        let mut data = prefix.to_vec();
        data.extend_from_slice(&rest);
        prop_assert!(matches!(
            patch::inspect(&data[..]),
            Err(zpatch::PatchError::InvalidContainer(_))
        ));
    }
}

#[test]
fn xor_twice_restores_every_byte() {
    for c in 0..=255u8 {
        for k in 0..=255u8 {
            assert_eq!(c ^ k ^ k, c);
        }
    }
}
