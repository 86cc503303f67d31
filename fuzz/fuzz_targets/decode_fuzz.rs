#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use zpatch::patch;

fuzz_target!(|data: &[u8]| {
    // Container decoding must never panic, only return errors.
    let _ = patch::inspect(data);

    // Apply arbitrary patches against an arbitrary source.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (source, patch_bytes) = data.split_at(split);
        let _ = patch::apply_patch(patch_bytes, Cursor::new(source), std::io::sink());
    }
});
