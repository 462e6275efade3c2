pub mod stats;
pub mod types;

use std::ops::Range;

use tracing::{debug, warn};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{GameLayout, LayoutKind, RecordOffsets};
use crate::text;

pub use stats::{Nature, Stat, calculate_hp_stat, calculate_stat};
use types::*;

/// One party creature, as an owned copy of its fixed-size record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyRecord {
    bytes: Vec<u8>,
    kind: LayoutKind,
    nickname_len: usize,
    trainer_name_len: usize,
}

impl PartyRecord {
    /// Copies a record out of `bytes`, which must hold at least one full
    /// record for `layout`. Extra trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8], layout: &GameLayout) -> Result<Self, CoreError> {
        let Some(record) = bytes.get(..layout.record_size) else {
            return Err(CoreError::new(
                CoreErrorCode::RecordTooShort,
                format!(
                    "party record needs {} bytes, got {}",
                    layout.record_size,
                    bytes.len()
                ),
            ));
        };
        Ok(Self {
            bytes: record.to_vec(),
            kind: layout.kind,
            nickname_len: layout.nickname_len,
            trainer_name_len: layout.trainer_name_len,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.species_raw() == 0
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub fn personality(&self) -> u32 {
        self.u32_at(PERSONALITY_OFFSET)
    }

    /// Full 32-bit original-trainer id (public id low, secret id high).
    pub fn trainer_id(&self) -> u32 {
        self.u32_at(TRAINER_ID_OFFSET)
    }

    pub fn public_trainer_id(&self) -> u16 {
        (self.trainer_id() & 0xFFFF) as u16
    }

    pub fn secret_trainer_id(&self) -> u16 {
        (self.trainer_id() >> 16) as u16
    }

    pub fn nickname(&self) -> String {
        self.text_at(NICKNAME_OFFSET, self.nickname_len)
    }

    pub fn trainer_name(&self) -> String {
        self.text_at(TRAINER_NAME_OFFSET, self.trainer_name_len)
    }

    pub fn current_hp(&self) -> u16 {
        self.u16_at(self.offsets().current_hp)
    }

    pub fn max_hp(&self) -> u16 {
        self.stat(Stat::Hp)
    }

    pub fn attack(&self) -> u16 {
        self.stat(Stat::Attack)
    }

    pub fn defense(&self) -> u16 {
        self.stat(Stat::Defense)
    }

    pub fn speed(&self) -> u16 {
        self.stat(Stat::Speed)
    }

    pub fn sp_attack(&self) -> u16 {
        self.stat(Stat::SpAttack)
    }

    pub fn sp_defense(&self) -> u16 {
        self.stat(Stat::SpDefense)
    }

    /// Computed stat value from the stat block (max HP for [`Stat::Hp`]).
    pub fn stat(&self, stat: Stat) -> u16 {
        self.u16_at(self.offsets().stat(stat))
    }

    pub fn species_raw(&self) -> u16 {
        self.u16_at(SPECIES_OFFSET)
    }

    /// Species id after the layout's mapping; `None` when unknown.
    pub fn species(&self) -> Option<u16> {
        self.kind.layout().species_id(self.species_raw())
    }

    pub fn held_item(&self) -> u16 {
        self.u16_at(HELD_ITEM_OFFSET)
    }

    pub fn moves(&self) -> [u16; MOVE_COUNT] {
        std::array::from_fn(|i| self.u16_at(MOVES_OFFSET + i * 2))
    }

    pub fn pp(&self) -> [u8; MOVE_COUNT] {
        std::array::from_fn(|i| self.u8_at(PP_OFFSET + i))
    }

    pub fn evs(&self) -> [u8; STAT_COUNT] {
        std::array::from_fn(|i| self.u8_at(EVS_OFFSET + i))
    }

    pub fn ev(&self, stat: Stat) -> u8 {
        self.u8_at(EVS_OFFSET + stat.index())
    }

    pub fn ivs(&self) -> [u8; STAT_COUNT] {
        unpack_ivs(self.u32_at(self.offsets().ivs))
    }

    pub fn iv(&self, stat: Stat) -> u8 {
        self.ivs()[stat.index()]
    }

    pub fn status(&self) -> u8 {
        self.u8_at(self.offsets().status)
    }

    pub fn status_name(&self) -> Option<&'static str> {
        let status = self.status();
        if status & 0x07 != 0 {
            return Some("Asleep");
        }
        STATUS_NAMES
            .iter()
            .find(|(mask, _)| status & mask != 0)
            .map(|(_, name)| *name)
    }

    pub fn level(&self) -> u8 {
        self.u8_at(self.offsets().level)
    }

    pub fn nature(&self) -> Nature {
        Nature::from_personality(self.personality())
    }

    pub fn shiny_value(&self) -> u16 {
        shiny_value(self.personality(), self.trainer_id())
    }

    pub fn is_shiny(&self) -> bool {
        self.shiny_value() < SHINY_THRESHOLD
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    pub fn set_personality(&mut self, value: u32) -> Result<(), CoreError> {
        self.write_at(PERSONALITY_OFFSET, &value.to_le_bytes(), "personality")
    }

    pub fn set_trainer_id(&mut self, value: u32) -> Result<(), CoreError> {
        self.write_at(TRAINER_ID_OFFSET, &value.to_le_bytes(), "trainer id")
    }

    pub fn set_nickname(&mut self, name: &str) -> Result<(), CoreError> {
        let encoded = text::encode(name, self.nickname_len);
        self.write_at(NICKNAME_OFFSET, &encoded, "nickname")
    }

    pub fn set_trainer_name(&mut self, name: &str) -> Result<(), CoreError> {
        let encoded = text::encode(name, self.trainer_name_len);
        self.write_at(TRAINER_NAME_OFFSET, &encoded, "trainer name")
    }

    pub fn set_current_hp(&mut self, hp: u16) -> Result<(), CoreError> {
        let offset = self.offsets().current_hp;
        self.write_at(offset, &hp.to_le_bytes(), "current hp")
    }

    pub fn set_stat(&mut self, stat: Stat, value: u16) -> Result<(), CoreError> {
        let offset = self.offsets().stat(stat);
        self.write_at(offset, &value.to_le_bytes(), stat.name())
    }

    pub fn set_species_raw(&mut self, species: u16) -> Result<(), CoreError> {
        self.write_at(SPECIES_OFFSET, &species.to_le_bytes(), "species")
    }

    pub fn set_held_item(&mut self, item: u16) -> Result<(), CoreError> {
        self.write_at(HELD_ITEM_OFFSET, &item.to_le_bytes(), "held item")
    }

    pub fn set_move(&mut self, slot: usize, move_id: u16) -> Result<(), CoreError> {
        check_move_slot(slot)?;
        self.write_at(MOVES_OFFSET + slot * 2, &move_id.to_le_bytes(), "move")
    }

    pub fn set_pp(&mut self, slot: usize, pp: u8) -> Result<(), CoreError> {
        check_move_slot(slot)?;
        self.write_at(PP_OFFSET + slot, &[pp], "pp")
    }

    /// Writes one EV, clamped to `0..=255`.
    pub fn set_ev(&mut self, stat: Stat, value: i32) -> Result<(), CoreError> {
        let clamped = value.clamp(0, EV_MAX) as u8;
        self.write_at(EVS_OFFSET + stat.index(), &[clamped], "ev")
    }

    /// Writes one IV, clamped to `0..=31`. The flag bits of the packed word
    /// are preserved.
    pub fn set_iv(&mut self, stat: Stat, value: i32) -> Result<(), CoreError> {
        let offset = self.offsets().ivs;
        let word = self.u32_at(offset);
        let mut ivs = unpack_ivs(word);
        ivs[stat.index()] = value.clamp(0, IV_MAX) as u8;
        let packed = pack_ivs(&ivs) | (word & IV_FLAGS_MASK);
        self.write_at(offset, &packed.to_le_bytes(), "ivs")
    }

    pub fn set_status(&mut self, status: u8) -> Result<(), CoreError> {
        let offset = self.offsets().status;
        self.write_at(offset, &[status], "status")
    }

    pub fn set_level(&mut self, level: u8) -> Result<(), CoreError> {
        if level == 0 || level > MAX_LEVEL {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("level {level} out of range 1..={MAX_LEVEL}"),
            ));
        }
        let offset = self.offsets().level;
        self.write_at(offset, &[level], "level")
    }

    /// Rewrites max HP and the five battle stats from `base_stats` (in
    /// [`Stat::ALL`] order) using the record's level, IVs, EVs and nature.
    /// Current HP is capped at the new maximum. Nothing is written unless
    /// every target field fits the record.
    pub fn recalculate_stats(&mut self, base_stats: [u16; STAT_COUNT]) -> Result<(), CoreError> {
        let level = self.level();
        let ivs = self.ivs();
        let evs = self.evs();
        let nature = self.nature();

        let values: [u16; STAT_COUNT] = std::array::from_fn(|i| match Stat::ALL[i] {
            Stat::Hp => calculate_hp_stat(base_stats[i], ivs[i], evs[i], level),
            stat => calculate_stat(base_stats[i], ivs[i], evs[i], level, nature.modifier(stat)),
        });

        let offsets = *self.offsets();
        let mut targets = Vec::with_capacity(STAT_COUNT);
        for stat in Stat::ALL {
            targets.push(self.check_range(offsets.stat(stat), 2, stat.name())?);
        }
        let hp_range = self.check_range(offsets.current_hp, 2, "current hp")?;

        for (range, value) in targets.into_iter().zip(values) {
            self.bytes[range].copy_from_slice(&value.to_le_bytes());
        }
        let max_hp = values[Stat::Hp.index()];
        if self.current_hp() > max_hp {
            self.bytes[hp_range].copy_from_slice(&max_hp.to_le_bytes());
        }
        debug!(species = self.species_raw(), level, "recalculated stats");
        Ok(())
    }

    /// Restores current HP to max HP and clears any status condition.
    pub fn heal(&mut self) -> Result<(), CoreError> {
        self.set_current_hp(self.max_hp())?;
        self.set_status(0)
    }

    // ------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------

    fn offsets(&self) -> &'static RecordOffsets {
        &self.kind.layout().record
    }

    fn u8_at(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    fn u16_at(&self, offset: usize) -> u16 {
        self.bytes
            .get(offset..offset + 2)
            .map_or(0, |b| u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_at(&self, offset: usize) -> u32 {
        self.bytes
            .get(offset..offset + 4)
            .map_or(0, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn text_at(&self, offset: usize, len: usize) -> String {
        let end = (offset + len).min(self.bytes.len());
        self.bytes
            .get(offset..end)
            .map(text::decode)
            .unwrap_or_default()
    }

    fn check_range(
        &self,
        offset: usize,
        len: usize,
        field: &str,
    ) -> Result<Range<usize>, CoreError> {
        let end = offset + len;
        if end > self.bytes.len() {
            return Err(CoreError::new(
                CoreErrorCode::EncodeOutOfRange,
                format!(
                    "{field} write at 0x{offset:02X}..0x{end:02X} exceeds record of {} bytes",
                    self.bytes.len()
                ),
            ));
        }
        Ok(offset..end)
    }

    fn write_at(&mut self, offset: usize, data: &[u8], field: &str) -> Result<(), CoreError> {
        let range = self.check_range(offset, data.len(), field)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

fn check_move_slot(slot: usize) -> Result<(), CoreError> {
    if slot >= MOVE_COUNT {
        return Err(CoreError::new(
            CoreErrorCode::InvalidInput,
            format!("move slot {slot} out of range 0..{MOVE_COUNT}"),
        ));
    }
    Ok(())
}

/// Splits the packed IV word into six 5-bit values.
pub fn unpack_ivs(word: u32) -> [u8; STAT_COUNT] {
    std::array::from_fn(|i| ((word >> (IV_BITS * i as u32)) & IV_MASK) as u8)
}

/// Packs six IVs into bits 0-29. Values above 31 are masked.
pub fn pack_ivs(ivs: &[u8; STAT_COUNT]) -> u32 {
    ivs.iter()
        .enumerate()
        .fold(0u32, |acc, (i, &iv)| acc | ((iv as u32 & IV_MASK) << (IV_BITS * i as u32)))
}

pub fn shiny_value(personality: u32, trainer_id: u32) -> u16 {
    let pid_hi = (personality >> 16) as u16;
    let pid_lo = (personality & 0xFFFF) as u16;
    let tid = (trainer_id & 0xFFFF) as u16;
    let sid = (trainer_id >> 16) as u16;
    pid_hi ^ pid_lo ^ tid ^ sid
}

// ----------------------------------------------------------------------
// Block-1 codec
// ----------------------------------------------------------------------

/// Decodes one party slot. `Ok(None)` marks an empty slot (species 0).
pub fn decode_party_slot(
    block1: &[u8],
    layout: &GameLayout,
    slot: usize,
) -> Result<Option<PartyRecord>, CoreError> {
    let range = layout.record_range(slot);
    let Some(bytes) = block1.get(range.start..range.end) else {
        return Err(CoreError::new(
            CoreErrorCode::RecordTooShort,
            format!(
                "party slot {slot} at 0x{:X} needs {} bytes, block has {}",
                range.start,
                range.len(),
                block1.len()
            ),
        ));
    };
    let record = PartyRecord::from_bytes(bytes, layout)?;
    if record.is_empty() {
        return Ok(None);
    }
    Ok(Some(record))
}

/// Decodes party slots in order until the first empty or truncated one.
pub fn decode_party(block1: &[u8], layout: &GameLayout) -> Vec<PartyRecord> {
    let mut party = Vec::with_capacity(layout.max_party_size);
    for slot in 0..layout.max_party_size {
        match decode_party_slot(block1, layout, slot) {
            Ok(Some(record)) => party.push(record),
            Ok(None) => break,
            Err(e) => {
                warn!(slot, error = %e, "party record truncated; stopping decode");
                break;
            }
        }
    }
    debug!(count = party.len(), layout = %layout.kind, "decoded party");
    party
}

/// Writes `record` into party slot `slot` of `block1`.
pub fn encode_party_record(
    record: &PartyRecord,
    block1: &mut [u8],
    layout: &GameLayout,
    slot: usize,
) -> Result<(), CoreError> {
    let range = layout.record_range(slot);
    let bytes = record.as_bytes();
    if bytes.len() != layout.record_size {
        return Err(CoreError::new(
            CoreErrorCode::EncodeOutOfRange,
            format!(
                "record is {} bytes but {} uses {}-byte records",
                bytes.len(),
                layout.name,
                layout.record_size
            ),
        ));
    }
    let block_len = block1.len();
    let Some(dst) = block1.get_mut(range.start..range.end) else {
        return Err(CoreError::new(
            CoreErrorCode::EncodeOutOfRange,
            format!(
                "party slot {slot} range 0x{:X}..0x{:X} exceeds block of {block_len} bytes",
                range.start, range.end
            ),
        ));
    };
    dst.copy_from_slice(bytes);
    Ok(())
}

/// Whether the `layout` record at `offset` looks like a real party member.
pub(crate) fn is_plausible(block1: &[u8], offset: usize, layout: &GameLayout) -> bool {
    let Some(bytes) = block1.get(offset..offset + layout.record_size) else {
        return false;
    };
    let fields = &layout.record;
    let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
    let species = u16_at(SPECIES_OFFSET);
    let level = bytes[fields.level];
    let max_hp = u16_at(fields.stat(Stat::Hp));
    let current_hp = u16_at(fields.current_hp);
    species != 0
        && species < PLAUSIBLE_MAX_SPECIES
        && (1..=MAX_LEVEL).contains(&level)
        && max_hp != 0
        && current_hp <= max_hp
}

/// Counts contiguous records from the party start that look plausible when
/// read with `layout`'s record size and field offsets.
pub(crate) fn count_plausible(block1: &[u8], layout: &GameLayout) -> usize {
    (0..layout.max_party_size)
        .take_while(|&slot| is_plausible(block1, layout.record_range(slot).start, layout))
        .count()
}
