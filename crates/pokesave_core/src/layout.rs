use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::party::Stat;

pub const SECTOR_SIZE: usize = 4096;
pub const SECTOR_DATA_SIZE: usize = 3968;
pub const SECTOR_FOOTER_SIZE: usize = 12;
pub const SECTOR_COUNT: usize = 32;
pub const SECTORS_PER_SLOT: usize = 18;
pub const EMERALD_SIGNATURE: u32 = 0x0801_2025;
pub const BLOCK1_SECTOR_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutKind {
    Vanilla,
    Quetzal,
}

impl LayoutKind {
    pub fn layout(self) -> &'static GameLayout {
        match self {
            Self::Vanilla => &VANILLA,
            Self::Quetzal => &QUETZAL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::Quetzal => "quetzal",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vanilla" | "emerald" => Ok(Self::Vanilla),
            "quetzal" => Ok(Self::Quetzal),
            other => Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("unknown game layout '{other}', expected vanilla or quetzal"),
            )),
        }
    }
}

/// Where the play-time fields live inside block 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTimeOffsets {
    pub hours: usize,
    pub hours_width: usize,
    pub minutes: usize,
    pub seconds: usize,
}

/// Emulator RAM addresses of the live party, for layouts that publish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAddresses {
    pub party_count: u32,
    pub party_data: u32,
}

/// Offsets of the record fields whose position differs between layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOffsets {
    pub ivs: usize,
    pub status: usize,
    pub level: usize,
    pub current_hp: usize,
    /// Max HP then the five battle stats, in `Stat::ALL` order.
    pub stats: [usize; 6],
}

impl RecordOffsets {
    pub fn stat(&self, stat: Stat) -> usize {
        self.stats[stat.index()]
    }
}

/// Static description of one save-layout variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    pub kind: LayoutKind,
    pub name: &'static str,
    pub sector_size: usize,
    pub data_region_size: usize,
    pub footer_size: usize,
    pub signature: u32,
    pub sector_count: usize,
    pub sectors_per_slot: usize,
    pub slot_starts: [usize; 2],
    pub block1_size: usize,
    pub party_offset: usize,
    pub record_size: usize,
    pub record: RecordOffsets,
    pub max_party_size: usize,
    pub nickname_len: usize,
    pub trainer_name_len: usize,
    pub player_name_len: usize,
    pub play_time: PlayTimeOffsets,
    /// Highest species id the game's internal table knows about.
    pub max_species: u16,
    pub memory: Option<MemoryAddresses>,
}

pub static VANILLA: GameLayout = GameLayout {
    kind: LayoutKind::Vanilla,
    name: "Pokemon Emerald (Vanilla)",
    sector_size: SECTOR_SIZE,
    data_region_size: SECTOR_DATA_SIZE,
    footer_size: SECTOR_FOOTER_SIZE,
    signature: EMERALD_SIGNATURE,
    sector_count: SECTOR_COUNT,
    sectors_per_slot: SECTORS_PER_SLOT,
    slot_starts: [0, 14],
    block1_size: SECTOR_DATA_SIZE * BLOCK1_SECTOR_COUNT,
    party_offset: 0x6A8,
    record_size: 100,
    record: RecordOffsets {
        ivs: 0x48,
        status: 0x50,
        level: 0x54,
        current_hp: 0x56,
        stats: [0x58, 0x5A, 0x5C, 0x5E, 0x60, 0x62],
    },
    max_party_size: 6,
    nickname_len: 10,
    trainer_name_len: 7,
    player_name_len: 8,
    play_time: PlayTimeOffsets {
        hours: 0x0E,
        hours_width: 2,
        minutes: 0x10,
        seconds: 0x11,
    },
    max_species: 411,
    memory: Some(MemoryAddresses {
        party_count: 0x0202_44E9,
        party_data: 0x0202_44EC,
    }),
};

pub static QUETZAL: GameLayout = GameLayout {
    kind: LayoutKind::Quetzal,
    name: "Pokemon Quetzal",
    sector_size: SECTOR_SIZE,
    data_region_size: SECTOR_DATA_SIZE,
    footer_size: SECTOR_FOOTER_SIZE,
    signature: EMERALD_SIGNATURE,
    sector_count: SECTOR_COUNT,
    sectors_per_slot: SECTORS_PER_SLOT,
    slot_starts: [0, 14],
    block1_size: SECTOR_DATA_SIZE * BLOCK1_SECTOR_COUNT,
    party_offset: 0x6A8,
    record_size: 104,
    record: RecordOffsets {
        ivs: 0x50,
        status: 0x57,
        level: 0x58,
        current_hp: 0x23,
        stats: [0x5A, 0x5C, 0x5E, 0x60, 0x62, 0x64],
    },
    max_party_size: 6,
    nickname_len: 10,
    trainer_name_len: 7,
    player_name_len: 8,
    play_time: PlayTimeOffsets {
        hours: 0x10,
        hours_width: 4,
        minutes: 0x14,
        seconds: 0x15,
    },
    max_species: 999,
    memory: None,
};

/// Candidate layouts in detection order: most specific first.
pub static KNOWN_LAYOUTS: [&GameLayout; 2] = [&QUETZAL, &VANILLA];

impl GameLayout {
    pub fn sector_range(&self, physical_index: usize) -> ByteRange {
        ByteRange::new(physical_index * self.sector_size, self.sector_size)
    }

    pub fn data_range(&self, physical_index: usize) -> ByteRange {
        ByteRange::new(physical_index * self.sector_size, self.data_region_size)
    }

    pub fn footer_range(&self, physical_index: usize) -> ByteRange {
        let sector = self.sector_range(physical_index);
        ByteRange::new(sector.end - self.footer_size, self.footer_size)
    }

    /// Physical indices covered by the slot starting at `slot_start`.
    pub fn slot_indices(&self, slot_start: usize) -> std::ops::Range<usize> {
        slot_start..slot_start + self.sectors_per_slot
    }

    /// Byte range of party slot `slot` inside block 1.
    pub fn record_range(&self, slot: usize) -> ByteRange {
        ByteRange::new(self.party_offset + slot * self.record_size, self.record_size)
    }

    /// Maps a stored species value to the game's species id.
    ///
    /// Both supported layouts store the id directly; values outside the
    /// game's table are rejected.
    pub fn species_id(&self, raw: u16) -> Option<u16> {
        match self.kind {
            LayoutKind::Vanilla | LayoutKind::Quetzal => {
                (raw != 0 && raw <= self.max_species).then_some(raw)
            }
        }
    }
}
