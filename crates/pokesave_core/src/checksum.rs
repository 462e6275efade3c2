/// Computes the footer checksum of one sector's data region.
///
/// The region is summed as little-endian `u32` words with wrapping
/// addition, then the high and low halves of the sum are folded together.
pub fn sector_checksum(data: &[u8]) -> u16 {
    debug_assert!(
        data.len() % 4 == 0,
        "sector data region must be a whole number of words, got {} bytes",
        data.len()
    );

    let sum = data
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .fold(0u32, u32::wrapping_add);

    ((sum >> 16).wrapping_add(sum & 0xFFFF) & 0xFFFF) as u16
}
