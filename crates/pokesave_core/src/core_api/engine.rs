use crate::document::{ParseOptions, SaveDocument};
use crate::layout::GameLayout;
use crate::party::types::MAX_LEVEL;
use crate::party::{PartyRecord, Stat};

use super::error::{CoreError, CoreErrorCode};
use super::types::{MoveEntry, PartyEntry, SectorEntry, Snapshot, StatBlock};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug, Clone)]
pub struct Session {
    snapshot: Snapshot,
    document: SaveDocument,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        options: ParseOptions,
    ) -> Result<Session, CoreError> {
        let document = SaveDocument::parse_with_options(bytes.as_ref(), &options)?;
        Ok(Session::from_document(document))
    }
}

impl Session {
    fn from_document(document: SaveDocument) -> Self {
        let valid_sectors = document
            .sector_infos()
            .iter()
            .filter(|info| info.valid)
            .count();
        let layout = document.layout();
        let snapshot = Snapshot {
            game_name: layout.name.to_string(),
            layout: layout.kind,
            player_name: document.player_name.clone(),
            play_time: document.play_time,
            active_slot: document.active_slot().number(),
            valid_sectors,
            party_count: document.party().len(),
        };
        Self { snapshot, document }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn layout(&self) -> &'static GameLayout {
        self.document.layout()
    }

    pub fn document(&self) -> &SaveDocument {
        &self.document
    }

    pub fn party(&self) -> Vec<PartyEntry> {
        self.document
            .party()
            .iter()
            .enumerate()
            .map(|(index, record)| party_entry(index, record))
            .collect()
    }

    pub fn party_entry(&self, index: usize) -> Option<PartyEntry> {
        self.document
            .party()
            .get(index)
            .map(|record| party_entry(index, record))
    }

    pub fn sectors(&self) -> Vec<SectorEntry> {
        let layout = self.document.layout();
        let active = layout.slot_indices(self.document.active_slot_start());
        self.document
            .sector_infos()
            .into_iter()
            .map(|info| SectorEntry {
                physical_index: info.physical_index,
                id: info.footer.id,
                checksum: info.footer.checksum,
                counter: info.footer.counter,
                valid: info.valid,
                in_active_slot: active.contains(&info.physical_index),
            })
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        self.document.is_modified()
    }

    pub fn to_bytes_unmodified(&self) -> Result<Vec<u8>, CoreError> {
        Ok(self.document.to_bytes_unmodified())
    }

    pub fn to_bytes_modified(&self) -> Result<Vec<u8>, CoreError> {
        self.document.to_bytes_modified().map_err(|e| {
            CoreError::new(e.code, format!("failed to emit modified bytes: {}", e.message))
        })
    }

    pub fn set_level(&mut self, index: usize, level: i32) -> Result<(), CoreError> {
        if !(1..=MAX_LEVEL as i32).contains(&level) {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("invalid level {level}, expected 1-{MAX_LEVEL}"),
            ));
        }
        self.edit(index, "level", |r| r.set_level(level as u8))
    }

    /// Sets current HP, clamped to `0..=max_hp`.
    pub fn set_current_hp(&mut self, index: usize, hp: i32) -> Result<(), CoreError> {
        self.edit(index, "current HP", |r| {
            let hp = hp.clamp(0, r.max_hp() as i32) as u16;
            r.set_current_hp(hp)
        })
    }

    pub fn set_nickname(&mut self, index: usize, name: &str) -> Result<(), CoreError> {
        self.edit(index, "nickname", |r| r.set_nickname(name))
    }

    pub fn set_ev(&mut self, index: usize, stat: Stat, value: i32) -> Result<(), CoreError> {
        self.edit(index, "EV", |r| r.set_ev(stat, value))
    }

    pub fn set_iv(&mut self, index: usize, stat: Stat, value: i32) -> Result<(), CoreError> {
        self.edit(index, "IV", |r| r.set_iv(stat, value))
    }

    pub fn set_species(&mut self, index: usize, species: u16) -> Result<(), CoreError> {
        let layout = self.document.layout();
        if layout.species_id(species).is_none() {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!(
                    "invalid species {species}, expected 1-{} for {}",
                    layout.max_species, layout.name
                ),
            ));
        }
        self.edit(index, "species", |r| r.set_species_raw(species))
    }

    pub fn set_item(&mut self, index: usize, item: u16) -> Result<(), CoreError> {
        self.edit(index, "held item", |r| r.set_held_item(item))
    }

    pub fn set_move(&mut self, index: usize, slot: usize, move_id: u16) -> Result<(), CoreError> {
        self.edit(index, "move", |r| r.set_move(slot, move_id))
    }

    pub fn heal(&mut self, index: usize) -> Result<(), CoreError> {
        self.edit(index, "heal", PartyRecord::heal)
    }

    pub fn heal_all(&mut self) -> Result<(), CoreError> {
        for index in 0..self.document.party().len() {
            self.heal(index)?;
        }
        Ok(())
    }

    pub fn swap_party(&mut self, a: usize, b: usize) -> Result<(), CoreError> {
        self.document.swap_party(a, b)
    }

    fn edit<F>(&mut self, index: usize, what: &str, apply: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut PartyRecord) -> Result<(), CoreError>,
    {
        let record = self.document.record_mut(index)?;
        apply(record).map_err(|e| {
            CoreError::new(
                e.code,
                format!("failed to set {what} on party slot {index}: {}", e.message),
            )
        })
    }
}

fn party_entry(index: usize, record: &PartyRecord) -> PartyEntry {
    let moves = record.moves();
    let pp = record.pp();
    PartyEntry {
        index,
        species: record.species_raw(),
        species_known: record.species().is_some(),
        nickname: record.nickname(),
        trainer_name: record.trainer_name(),
        trainer_id: record.public_trainer_id(),
        secret_id: record.secret_trainer_id(),
        personality: record.personality(),
        level: record.level(),
        current_hp: record.current_hp(),
        stats: StatBlock {
            hp: record.max_hp(),
            attack: record.attack(),
            defense: record.defense(),
            speed: record.speed(),
            sp_attack: record.sp_attack(),
            sp_defense: record.sp_defense(),
        },
        evs: record.evs(),
        ivs: record.ivs(),
        moves: moves
            .iter()
            .zip(pp)
            .enumerate()
            .filter(|&(_, (&id, _))| id != 0)
            .map(|(slot, (&id, pp))| MoveEntry { slot, id, pp })
            .collect(),
        held_item: record.held_item(),
        nature: record.nature().name().to_string(),
        shiny: record.is_shiny(),
        shiny_value: record.shiny_value(),
        status: record.status_name().map(str::to_string),
    }
}
