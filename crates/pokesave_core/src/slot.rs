use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::GameLayout;
use crate::sector::validate_sector;

/// One of the two redundant save slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveSlot {
    One,
    Two,
}

impl SaveSlot {
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(CoreError::new(
                CoreErrorCode::SlotResolution,
                format!("invalid save slot {other}, expected 1 or 2"),
            )),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// First physical sector of this slot.
    pub fn start(&self, layout: &GameLayout) -> usize {
        match self {
            Self::One => layout.slot_starts[0],
            Self::Two => layout.slot_starts[1],
        }
    }

    pub fn from_start(layout: &GameLayout, start: usize) -> Self {
        if start == layout.slot_starts[1] {
            Self::Two
        } else {
            Self::One
        }
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Sum of the save counters of every valid sector in the slot.
pub fn counter_sum(raw: &[u8], layout: &GameLayout, slot_start: usize) -> u32 {
    layout
        .slot_indices(slot_start)
        .map(|idx| validate_sector(raw, idx, layout))
        .filter(|info| info.valid)
        .fold(0u32, |acc, info| acc.wrapping_add(info.footer.counter))
}

/// Picks the physical start of the active slot.
///
/// A forced slot short-circuits without reading any sector. Otherwise the
/// slot with the larger counter sum wins, and ties go to slot 2.
pub fn resolve_active_slot(raw: &[u8], layout: &GameLayout, forced: Option<SaveSlot>) -> usize {
    if let Some(slot) = forced {
        return slot.start(layout);
    }

    let first = counter_sum(raw, layout, layout.slot_starts[0]);
    let second = counter_sum(raw, layout, layout.slot_starts[1]);
    let active = if second >= first {
        layout.slot_starts[1]
    } else {
        layout.slot_starts[0]
    };
    debug!(
        slot1_sum = first,
        slot2_sum = second,
        active_start = active,
        "resolved active save slot"
    );
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::VANILLA;

    #[test]
    fn slot_numbers_round_trip() {
        assert_eq!(SaveSlot::from_number(1).unwrap(), SaveSlot::One);
        assert_eq!(SaveSlot::from_number(2).unwrap().start(&VANILLA), 14);
        assert_eq!(
            SaveSlot::from_number(3).unwrap_err().code,
            CoreErrorCode::SlotResolution
        );
        assert_eq!(SaveSlot::from_start(&VANILLA, 14), SaveSlot::Two);
        assert_eq!(SaveSlot::from_start(&VANILLA, 0), SaveSlot::One);
    }

    #[test]
    fn forced_slot_skips_reading() {
        let empty: [u8; 0] = [];
        assert_eq!(resolve_active_slot(&empty, &VANILLA, Some(SaveSlot::One)), 0);
        assert_eq!(resolve_active_slot(&empty, &VANILLA, Some(SaveSlot::Two)), 14);
    }

    #[test]
    fn blank_save_ties_to_slot_two() {
        let raw = vec![0u8; 32 * 4096];
        assert_eq!(resolve_active_slot(&raw, &VANILLA, None), 14);
    }
}
