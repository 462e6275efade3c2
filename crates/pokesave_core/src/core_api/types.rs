use serde::{Deserialize, Serialize};

use crate::document::PlayTime;
use crate::layout::LayoutKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub game_name: String,
    pub layout: LayoutKind,
    pub player_name: String,
    pub play_time: PlayTime,
    pub active_slot: u8,
    pub valid_sectors: usize,
    pub party_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatBlock {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveEntry {
    pub slot: usize,
    pub id: u16,
    pub pp: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartyEntry {
    pub index: usize,
    pub species: u16,
    pub species_known: bool,
    pub nickname: String,
    pub trainer_name: String,
    pub trainer_id: u16,
    pub secret_id: u16,
    pub personality: u32,
    pub level: u8,
    pub current_hp: u16,
    pub stats: StatBlock,
    pub evs: [u8; 6],
    pub ivs: [u8; 6],
    pub moves: Vec<MoveEntry>,
    pub held_item: u16,
    pub nature: String,
    pub shiny: bool,
    pub shiny_value: u16,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorEntry {
    pub physical_index: usize,
    pub id: u16,
    pub checksum: u16,
    pub counter: u32,
    pub valid: bool,
    pub in_active_slot: bool,
}
