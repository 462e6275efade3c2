use tracing::debug;

use crate::block::assemble_block1;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{GameLayout, KNOWN_LAYOUTS, LayoutKind, VANILLA};
use crate::party::count_plausible;
use crate::sector::{build_sector_map, validate_sector};
use crate::slot::resolve_active_slot;

/// Picks the first layout in [`KNOWN_LAYOUTS`] that accepts `raw`.
pub fn detect_layout(raw: &[u8]) -> Result<&'static GameLayout, CoreError> {
    for &layout in KNOWN_LAYOUTS.iter() {
        if accepts(raw, layout) {
            debug!(layout = %layout.kind, "detected save layout");
            return Ok(layout);
        }
        debug!(layout = %layout.kind, "layout rejected");
    }
    Err(CoreError::new(
        CoreErrorCode::NotDetected,
        format!(
            "no known save layout matches this file ({} bytes)",
            raw.len()
        ),
    ))
}

fn accepts(raw: &[u8], layout: &GameLayout) -> bool {
    if !has_valid_sector(raw, layout) {
        return false;
    }
    match layout.kind {
        LayoutKind::Vanilla => true,
        LayoutKind::Quetzal => has_wide_record_marker(raw, layout),
    }
}

fn has_valid_sector(raw: &[u8], layout: &GameLayout) -> bool {
    (0..layout.sector_count).any(|idx| validate_sector(raw, idx, layout).valid)
}

/// The party region reads as more contiguous records with this layout's
/// stride and field offsets than with the vanilla ones.
fn has_wide_record_marker(raw: &[u8], layout: &GameLayout) -> bool {
    let start = resolve_active_slot(raw, layout, None);
    let map = build_sector_map(raw, layout, start);
    let block1 = assemble_block1(raw, layout, &map);

    let wide = count_plausible(&block1, layout);
    let narrow = count_plausible(&block1, &VANILLA);
    debug!(wide, narrow, "record stride check");
    wide > narrow
}
