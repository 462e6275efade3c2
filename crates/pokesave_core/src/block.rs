use tracing::warn;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{BLOCK1_SECTOR_COUNT, GameLayout};
use crate::sector::SectorMap;

/// Logical id of the sector holding block 2 (player identity, play time).
pub const BLOCK2_SECTOR_ID: u16 = 0;
/// Logical id of the first block-1 chunk.
pub const BLOCK1_FIRST_ID: u16 = 1;

/// Logical ids making up block 1, in assembly order.
pub fn block1_ids() -> impl Iterator<Item = u16> {
    BLOCK1_FIRST_ID..BLOCK1_FIRST_ID + BLOCK1_SECTOR_COUNT as u16
}

/// Offset of a block-1 chunk inside the assembled buffer.
pub fn block1_chunk_offset(layout: &GameLayout, logical_id: u16) -> usize {
    (logical_id - BLOCK1_FIRST_ID) as usize * layout.data_region_size
}

/// Concatenates the data regions of logical sectors 1-4.
///
/// A chunk absent from the map stays zero-filled so a partially corrupt
/// save still yields a best-effort party.
pub fn assemble_block1(raw: &[u8], layout: &GameLayout, map: &SectorMap) -> Vec<u8> {
    let mut block = vec![0u8; layout.block1_size];
    for id in block1_ids() {
        let Some(physical) = map.get(id) else {
            warn!(id, "block 1 chunk missing from active slot; zero-filling");
            continue;
        };
        let src = layout.data_range(physical);
        let dst = block1_chunk_offset(layout, id);
        match raw.get(src.start..src.end) {
            Some(data) => block[dst..dst + data.len()].copy_from_slice(data),
            None => warn!(id, physical, "block 1 chunk lies outside the file; zero-filling"),
        }
    }
    block
}

/// Returns the data region of logical sector 0.
pub fn assemble_block2(
    raw: &[u8],
    layout: &GameLayout,
    map: &SectorMap,
) -> Result<Vec<u8>, CoreError> {
    let physical = map.get(BLOCK2_SECTOR_ID).ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::SectorMissing,
            "block 2 sector (logical id 0) not found in active slot",
        )
    })?;
    let range = layout.data_range(physical);
    raw.get(range.start..range.end)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::SectorMissing,
                format!("block 2 sector at physical index {physical} lies outside the file"),
            )
        })
}
