#![allow(dead_code)]

use pokesave_core::checksum::sector_checksum;
use pokesave_core::layout::{EMERALD_SIGNATURE, GameLayout, SECTOR_COUNT, SECTOR_SIZE};
use pokesave_core::party::types::{
    MOVES_OFFSET, PERSONALITY_OFFSET, PP_OFFSET, SPECIES_OFFSET, TRAINER_ID_OFFSET,
};
use pokesave_core::text;

pub const SAVE_SIZE: usize = SECTOR_COUNT * SECTOR_SIZE;

/// First physical sector used when writing slot 2 in tests. Sectors 14-17
/// belong to both slot ranges, so slot-2 fixtures start past them.
pub const SLOT2_FIXTURE_START: usize = 18;

/// Synthesizes 128 KiB save images sector by sector.
pub struct SaveBuilder {
    layout: &'static GameLayout,
    raw: Vec<u8>,
}

impl SaveBuilder {
    pub fn new(layout: &'static GameLayout) -> Self {
        Self {
            layout,
            raw: vec![0u8; SAVE_SIZE],
        }
    }

    /// Writes a valid sector: `data` (zero-padded) plus a footer with a
    /// correct checksum.
    pub fn sector(mut self, physical: usize, id: u16, counter: u32, data: &[u8]) -> Self {
        let layout = self.layout;
        let region = layout.data_range(physical);
        let dst = &mut self.raw[region.start..region.end];
        dst.fill(0);
        let n = data.len().min(dst.len());
        dst[..n].copy_from_slice(&data[..n]);

        let checksum = sector_checksum(&self.raw[region.start..region.end]);
        let f = layout.footer_range(physical).start;
        self.raw[f..f + 2].copy_from_slice(&id.to_le_bytes());
        self.raw[f + 2..f + 4].copy_from_slice(&checksum.to_le_bytes());
        self.raw[f + 4..f + 8].copy_from_slice(&EMERALD_SIGNATURE.to_le_bytes());
        self.raw[f + 8..f + 12].copy_from_slice(&counter.to_le_bytes());
        self
    }

    /// Writes logical ids 0-4 to five consecutive physical sectors.
    pub fn slot(self, first_physical: usize, counter: u32, block2: &[u8], block1: &[u8]) -> Self {
        let chunk = self.layout.data_region_size;
        let mut b = self.sector(first_physical, 0, counter, block2);
        for id in 1..=4u16 {
            let start = (id as usize - 1) * chunk;
            let end = (start + chunk).min(block1.len());
            let data = block1.get(start..end).unwrap_or_default();
            b = b.sector(first_physical + id as usize, id, counter, data);
        }
        b
    }

    pub fn corrupt_checksum(mut self, physical: usize) -> Self {
        let f = self.layout.footer_range(physical).start;
        self.raw[f + 2] ^= 0xFF;
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.raw
    }
}

pub fn record(layout: &GameLayout, species: u16, level: u8, hp: u16) -> Vec<u8> {
    let mut r = vec![0u8; layout.record_size];
    put_u32(&mut r, PERSONALITY_OFFSET, 0x0000_0100 + species as u32);
    put_u32(&mut r, TRAINER_ID_OFFSET, 0x1234_5678);
    let nick = text::encode(&format!("MON{species}"), layout.nickname_len);
    r[0x08..0x08 + nick.len()].copy_from_slice(&nick);
    put_u16(&mut r, layout.record.current_hp, hp);
    put_u16(&mut r, SPECIES_OFFSET, species);
    put_u16(&mut r, MOVES_OFFSET, 33);
    r[PP_OFFSET] = 35;
    put_u32(&mut r, layout.record.ivs, 0x4000_0000 | 0x1F);
    r[layout.record.level] = level;
    put_u16(&mut r, layout.record.stats[0], hp);
    r
}

pub fn block1_with_party(layout: &GameLayout, records: &[Vec<u8>]) -> Vec<u8> {
    let mut block = vec![0u8; layout.block1_size];
    for (slot, rec) in records.iter().enumerate() {
        let at = layout.record_range(slot).start;
        block[at..at + rec.len()].copy_from_slice(rec);
    }
    block
}

pub fn block2(layout: &GameLayout, name: &str, hours: u32, minutes: u8, seconds: u8) -> Vec<u8> {
    let mut block = vec![0u8; layout.data_region_size];
    let encoded = text::encode(name, layout.player_name_len);
    block[..encoded.len()].copy_from_slice(&encoded);
    let pt = layout.play_time;
    block[pt.hours..pt.hours + pt.hours_width]
        .copy_from_slice(&hours.to_le_bytes()[..pt.hours_width]);
    block[pt.minutes] = minutes;
    block[pt.seconds] = seconds;
    block
}

/// A single-slot save with `party_size` records of ascending species.
pub fn simple_save(layout: &'static GameLayout, party_size: usize) -> Vec<u8> {
    let records: Vec<Vec<u8>> = (0..party_size)
        .map(|i| record(layout, 1 + i as u16 * 3, 10 + i as u8, 30 + i as u16))
        .collect();
    SaveBuilder::new(layout)
        .slot(
            0,
            5,
            &block2(layout, "MAY", 12, 34, 56),
            &block1_with_party(layout, &records),
        )
        .build()
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
