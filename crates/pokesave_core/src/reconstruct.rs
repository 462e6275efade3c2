use tracing::{debug, warn};

use crate::block::{assemble_block1, block1_chunk_offset, block1_ids};
use crate::checksum::sector_checksum;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::GameLayout;
use crate::party::{PartyRecord, encode_party_record};
use crate::sector::{FOOTER_CHECKSUM_OFFSET, SectorMap};

/// Produces a new save image with `records` written into the party region.
///
/// Only the data regions and footer checksums of block-1 sectors present in
/// `map` change. Absent sectors are never fabricated, and every other byte
/// (block 2, the inactive slot, padding) is copied from `original`.
pub fn reconstruct(
    original: &[u8],
    layout: &GameLayout,
    map: &SectorMap,
    records: &[PartyRecord],
) -> Result<Vec<u8>, CoreError> {
    if records.len() > layout.max_party_size {
        return Err(CoreError::new(
            CoreErrorCode::EncodeOutOfRange,
            format!(
                "party has {} records, at most {} fit",
                records.len(),
                layout.max_party_size
            ),
        ));
    }

    let mut out = original.to_vec();
    let mut block1 = assemble_block1(original, layout, map);
    for (slot, record) in records.iter().enumerate() {
        encode_party_record(record, &mut block1, layout, slot)?;
    }

    for id in block1_ids() {
        let Some(physical) = map.get(id) else {
            debug!(id, "block 1 chunk absent from map; not written");
            continue;
        };
        let data = layout.data_range(physical);
        let footer = layout.footer_range(physical);
        if footer.end > out.len() {
            warn!(id, physical, "mapped sector lies outside the file; skipping");
            continue;
        }

        let chunk_start = block1_chunk_offset(layout, id);
        let chunk = &block1[chunk_start..chunk_start + layout.data_region_size];
        out[data.start..data.end].copy_from_slice(chunk);

        let checksum = sector_checksum(&out[data.start..data.end]);
        let at = footer.start + FOOTER_CHECKSUM_OFFSET;
        out[at..at + 2].copy_from_slice(&checksum.to_le_bytes());
    }

    Ok(out)
}
