use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::block::{assemble_block1, assemble_block2};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::detect::detect_layout;
use crate::layout::{GameLayout, LayoutKind};
use crate::party::{PartyRecord, decode_party};
use crate::reader::LittleEndianReader;
use crate::reconstruct::reconstruct;
use crate::sector::{SectorInfo, SectorMap, build_sector_map, sector_infos};
use crate::slot::{SaveSlot, resolve_active_slot};
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayTime {
    pub hours: u32,
    pub minutes: u8,
    pub seconds: u8,
}

/// Overrides applied before parsing. Both default to auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    pub layout: Option<LayoutKind>,
    pub forced_slot: Option<SaveSlot>,
}

/// A decoded save plus the bytes it came from.
#[derive(Debug, Clone)]
pub struct SaveDocument {
    pub player_name: String,
    pub play_time: PlayTime,
    layout: &'static GameLayout,
    active_slot_start: usize,
    sector_map: SectorMap,
    party: Vec<PartyRecord>,
    original_party: Vec<PartyRecord>,
    original: Vec<u8>,
}

impl SaveDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, CoreError> {
        Self::parse_with_options(bytes, &ParseOptions::default())
    }

    pub fn read_from<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Self, CoreError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_with_options(&bytes, options)
    }

    pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Self, CoreError> {
        let layout = match options.layout {
            Some(kind) => kind.layout(),
            None => detect_layout(bytes)?,
        };

        let active_slot_start = resolve_active_slot(bytes, layout, options.forced_slot);
        let sector_map = build_sector_map(bytes, layout, active_slot_start);
        if sector_map.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::SlotResolution,
                format!(
                    "save slot {} has no valid sectors",
                    SaveSlot::from_start(layout, active_slot_start)
                ),
            ));
        }

        let block2 = assemble_block2(bytes, layout, &sector_map)?;
        let player_name = read_player_name(&block2, layout);
        let play_time = read_play_time(&block2, layout)?;

        let block1 = assemble_block1(bytes, layout, &sector_map);
        let party = decode_party(&block1, layout);

        info!(
            layout = %layout.kind,
            slot = active_slot_start,
            sectors = sector_map.len(),
            party = party.len(),
            "parsed save"
        );

        Ok(Self {
            player_name,
            play_time,
            layout,
            active_slot_start,
            sector_map,
            original_party: party.clone(),
            party,
            original: bytes.to_vec(),
        })
    }

    pub fn layout(&self) -> &'static GameLayout {
        self.layout
    }

    /// Physical index of the first sector of the active slot (0 or 14).
    pub fn active_slot_start(&self) -> usize {
        self.active_slot_start
    }

    pub fn active_slot(&self) -> SaveSlot {
        SaveSlot::from_start(self.layout, self.active_slot_start)
    }

    pub fn sector_map(&self) -> &SectorMap {
        &self.sector_map
    }

    /// Per-sector validation results across the whole file.
    pub fn sector_infos(&self) -> Vec<SectorInfo> {
        sector_infos(&self.original, self.layout)
    }

    pub fn party(&self) -> &[PartyRecord] {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut [PartyRecord] {
        &mut self.party
    }

    pub fn original_party(&self) -> &[PartyRecord] {
        &self.original_party
    }

    pub fn record_mut(&mut self, index: usize) -> Result<&mut PartyRecord, CoreError> {
        let count = self.party.len();
        self.party.get_mut(index).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("party index {index} out of range (party has {count})"),
            )
        })
    }

    pub fn swap_party(&mut self, a: usize, b: usize) -> Result<(), CoreError> {
        let count = self.party.len();
        if a >= count || b >= count {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("cannot swap party slots {a} and {b} (party has {count})"),
            ));
        }
        self.party.swap(a, b);
        debug!(a, b, "swapped party records");
        Ok(())
    }

    pub fn is_modified(&self) -> bool {
        self.party != self.original_party
    }

    pub fn to_bytes_unmodified(&self) -> Vec<u8> {
        self.original.clone()
    }

    pub fn to_bytes_modified(&self) -> Result<Vec<u8>, CoreError> {
        reconstruct(&self.original, self.layout, &self.sector_map, &self.party)
    }
}

fn read_player_name(block2: &[u8], layout: &GameLayout) -> String {
    let end = layout.player_name_len.min(block2.len());
    text::decode(&block2[..end])
}

fn read_play_time(block2: &[u8], layout: &GameLayout) -> Result<PlayTime, CoreError> {
    let offsets = layout.play_time;
    let mut r = LittleEndianReader::new(Cursor::new(block2));
    r.seek_to(offsets.hours as u64)?;
    let hours = r.read_uint(offsets.hours_width)?;
    r.seek_to(offsets.minutes as u64)?;
    let minutes = r.read_u8()?;
    r.seek_to(offsets.seconds as u64)?;
    let seconds = r.read_u8()?;
    Ok(PlayTime {
        hours,
        minutes,
        seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{QUETZAL, VANILLA};

    #[test]
    fn play_time_offsets_differ_per_layout() {
        let mut block2 = vec![0u8; 3968];
        block2[0x0E..0x10].copy_from_slice(&123u16.to_le_bytes());
        block2[0x10] = 45;
        block2[0x11] = 6;
        let pt = read_play_time(&block2, &VANILLA).unwrap();
        assert_eq!(
            pt,
            PlayTime {
                hours: 123,
                minutes: 45,
                seconds: 6
            }
        );

        let mut block2 = vec![0u8; 3968];
        block2[0x10..0x14].copy_from_slice(&70_000u32.to_le_bytes());
        block2[0x14] = 59;
        block2[0x15] = 1;
        let pt = read_play_time(&block2, &QUETZAL).unwrap();
        assert_eq!(pt.hours, 70_000);
        assert_eq!(pt.minutes, 59);
        assert_eq!(pt.seconds, 1);
    }

    #[test]
    fn player_name_stops_at_terminator() {
        let mut block2 = vec![0xFFu8; 3968];
        block2[..4].copy_from_slice(&[0xCC, 0xBB, 0xC8, 0xBF]); // RANE
        assert_eq!(read_player_name(&block2, &VANILLA), "RANE");
    }

    #[test]
    fn short_block2_is_io_error() {
        let err = read_play_time(&[0u8; 4], &VANILLA).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Io);
    }
}
