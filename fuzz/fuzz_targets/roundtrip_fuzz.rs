#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use zpatch::gamefile::header::{HEADER_SPAN, is_format_version};
use zpatch::patch::{self, Label};

fuzz_target!(|data: &[u8]| {
    // Split payload into "source" and "target" story files.
    let split = data.len() / 2;
    let (source, target) = data.split_at(split);
    if source.len() < HEADER_SPAN || target.len() < HEADER_SPAN {
        return;
    }
    if !is_format_version(source[0]) || !is_format_version(target[0]) {
        return;
    }

    let mut delta = Vec::new();
    let Ok(outcome) = patch::build_diff(
        Cursor::new(target),
        Cursor::new(source),
        Label::new("fuzz"),
        &mut delta,
    ) else {
        // Headers declaring more than the file holds are rejected.
        return;
    };

    let mut rebuilt = Vec::new();
    patch::apply_patch(&delta[..], Cursor::new(source), &mut rebuilt).unwrap();
    assert_eq!(rebuilt.len() as u64, outcome.payload_len);
    assert_eq!(&rebuilt[..], &target[..rebuilt.len()]);
});
