use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{NATURE_NAMES, STAT_NAMES};
use crate::core_api::{CoreError, CoreErrorCode};

/// Battle stats in on-disk order (EVs, IVs and the stat block all use it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    Speed,
    SpAttack,
    SpDefense,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::Speed,
        Stat::SpAttack,
        Stat::SpDefense,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        STAT_NAMES[self.index()]
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hp" => Ok(Self::Hp),
            "atk" | "attack" => Ok(Self::Attack),
            "def" | "defense" => Ok(Self::Defense),
            "spe" | "speed" => Ok(Self::Speed),
            "spa" | "spatk" | "sp-attack" | "sp_attack" => Ok(Self::SpAttack),
            "spd" | "spdef" | "sp-defense" | "sp_defense" => Ok(Self::SpDefense),
            other => Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("unknown stat '{other}', expected hp|atk|def|spe|spa|spd"),
            )),
        }
    }
}

/// Nature index derived from a personality value, with its stat effects.
///
/// Natures form a 5x5 grid over the non-HP stats: row is the raised stat,
/// column the lowered one. The diagonal is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nature(u8);

impl Nature {
    pub fn from_index(index: u8) -> Self {
        Self(index % 25)
    }

    pub fn from_personality(personality: u32) -> Self {
        Self::from_index((personality & 0xFF) as u8 % 25)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        NATURE_NAMES[self.0 as usize]
    }

    pub fn increased(&self) -> Option<Stat> {
        let (up, down) = (self.0 / 5, self.0 % 5);
        (up != down).then(|| Self::grid_stat(up))
    }

    pub fn decreased(&self) -> Option<Stat> {
        let (up, down) = (self.0 / 5, self.0 % 5);
        (up != down).then(|| Self::grid_stat(down))
    }

    /// Multiplier applied to `stat`: 1.1 raised, 0.9 lowered, else 1.0.
    pub fn modifier(&self, stat: Stat) -> f32 {
        if self.increased() == Some(stat) {
            1.1
        } else if self.decreased() == Some(stat) {
            0.9
        } else {
            1.0
        }
    }

    fn grid_stat(pos: u8) -> Stat {
        match pos {
            0 => Stat::Attack,
            1 => Stat::Defense,
            2 => Stat::Speed,
            3 => Stat::SpAttack,
            _ => Stat::SpDefense,
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn calculate_hp_stat(base: u16, iv: u8, ev: u8, level: u8) -> u16 {
    let (base, iv, ev, level) = (base as u32, iv as u32, ev as u32, level as u32);
    (((2 * base + iv + ev / 4) * level) / 100 + level + 10) as u16
}

pub fn calculate_stat(base: u16, iv: u8, ev: u8, level: u8, modifier: f32) -> u16 {
    let (base, iv, ev, level) = (base as u32, iv as u32, ev as u32, level as u32);
    let raw = ((2 * base + iv + ev / 4) * level) / 100 + 5;
    (raw as f32 * modifier) as u16
}
