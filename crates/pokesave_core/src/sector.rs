use std::collections::BTreeMap;
use std::io::{self, Cursor};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::checksum::sector_checksum;
use crate::layout::GameLayout;
use crate::reader::LittleEndianReader;

/// Highest logical sector id a save slot uses.
pub const MAX_LOGICAL_ID: u16 = 17;

/// Offset of the checksum field inside the footer.
pub const FOOTER_CHECKSUM_OFFSET: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorFooter {
    pub id: u16,
    pub checksum: u16,
    pub signature: u32,
    pub counter: u32,
}

impl SectorFooter {
    fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        Ok(Self {
            id: r.read_u16()?,
            checksum: r.read_u16()?,
            signature: r.read_u32()?,
            counter: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorInfo {
    pub physical_index: usize,
    pub footer: SectorFooter,
    pub valid: bool,
}

impl SectorInfo {
    fn invalid(physical_index: usize, footer: SectorFooter) -> Self {
        Self {
            physical_index,
            footer,
            valid: false,
        }
    }
}

/// Reads the footer of one physical sector and checks signature and checksum.
///
/// A sector that does not fit inside `raw` is reported invalid, never as an
/// error.
pub fn validate_sector(raw: &[u8], physical_index: usize, layout: &GameLayout) -> SectorInfo {
    let footer_range = layout.footer_range(physical_index);
    let Some(footer_bytes) = raw.get(footer_range.start..footer_range.end) else {
        return SectorInfo::invalid(physical_index, SectorFooter::default());
    };
    let Ok(footer) = SectorFooter::parse(footer_bytes) else {
        return SectorInfo::invalid(physical_index, SectorFooter::default());
    };

    if footer.signature != layout.signature {
        return SectorInfo::invalid(physical_index, footer);
    }

    let data = layout.data_range(physical_index);
    let computed = sector_checksum(&raw[data.start..data.end]);
    let valid = computed == footer.checksum;
    if !valid {
        debug!(
            sector = physical_index,
            id = footer.id,
            stored = footer.checksum,
            computed,
            "sector checksum mismatch"
        );
    }

    SectorInfo {
        physical_index,
        footer,
        valid,
    }
}

/// Validation results for every physical sector the layout describes.
pub fn sector_infos(raw: &[u8], layout: &GameLayout) -> Vec<SectorInfo> {
    (0..layout.sector_count)
        .map(|idx| validate_sector(raw, idx, layout))
        .collect()
}

/// Logical sector id -> physical sector index for the active slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorMap {
    entries: BTreeMap<u16, usize>,
}

impl SectorMap {
    pub fn get(&self, logical_id: u16) -> Option<usize> {
        self.entries.get(&logical_id).copied()
    }

    pub fn contains(&self, logical_id: u16) -> bool {
        self.entries.contains_key(&logical_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, usize)> + '_ {
        self.entries.iter().map(|(&id, &idx)| (id, idx))
    }

    pub fn ids(&self) -> Vec<u16> {
        self.entries.keys().copied().collect()
    }

    /// Inserts unless the id is already mapped. Returns whether it was new.
    pub fn insert_first(&mut self, logical_id: u16, physical_index: usize) -> bool {
        if self.entries.contains_key(&logical_id) {
            return false;
        }
        self.entries.insert(logical_id, physical_index);
        true
    }
}

/// Maps every valid sector of the slot starting at `active_slot_start`.
///
/// A repeated logical id keeps the first physical sector seen.
pub fn build_sector_map(raw: &[u8], layout: &GameLayout, active_slot_start: usize) -> SectorMap {
    let mut map = SectorMap::default();
    for idx in layout.slot_indices(active_slot_start) {
        let info = validate_sector(raw, idx, layout);
        if !info.valid {
            continue;
        }
        let id = info.footer.id;
        if id > MAX_LOGICAL_ID {
            warn!(
                sector = idx,
                id, "valid sector carries out-of-range logical id; ignoring"
            );
            continue;
        }
        if !map.insert_first(id, idx) {
            warn!(
                sector = idx,
                id,
                kept = ?map.get(id),
                "duplicate logical sector id in active slot; keeping first"
            );
        }
    }
    debug!(
        slot_start = active_slot_start,
        mapped = map.len(),
        "built sector map"
    );
    map
}
