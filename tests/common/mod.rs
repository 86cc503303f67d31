#![allow(dead_code)]

/// Build a synthetic z-code story file with the given header fields.
///
/// The body is a deterministic pattern so different releases differ.
pub fn game_image(
    version: u8,
    release: u16,
    identifier: &[u8; 6],
    length_word: u16,
    size: usize,
) -> Vec<u8> {
    assert!(size >= 0x1C);
    let mut data: Vec<u8> = (0..size)
        .map(|i| (i as u8).wrapping_mul(17) ^ (release as u8))
        .collect();
    write_header(&mut data, version, release, identifier, length_word);
    data
}

/// Overwrite the header fields of an existing image.
pub fn write_header(data: &mut [u8], version: u8, release: u16, identifier: &[u8; 6], length_word: u16) {
    data[0] = version;
    data[2..4].copy_from_slice(&release.to_be_bytes());
    data[0x12..0x18].copy_from_slice(identifier);
    data[0x1A..0x1C].copy_from_slice(&length_word.to_be_bytes());
}
