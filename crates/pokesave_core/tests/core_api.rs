mod common;

use common::simple_save;
use pokesave_core::core_api::{CoreErrorCode, Engine, ParseStage};
use pokesave_core::layout::{LayoutKind, VANILLA};
use pokesave_core::party::Stat;
use pokesave_core::{ParseOptions, SaveDocument, SaveSlot};

#[test]
fn engine_reports_snapshot() {
    let bytes = simple_save(&VANILLA, 3);
    let session = Engine::new()
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");

    let snap = session.snapshot();
    assert_eq!(snap.layout, LayoutKind::Vanilla);
    assert_eq!(snap.game_name, VANILLA.name);
    assert_eq!(snap.player_name, "MAY");
    assert_eq!(snap.play_time.hours, 12);
    assert_eq!(snap.active_slot, 1);
    assert_eq!(snap.valid_sectors, 5);
    assert_eq!(snap.party_count, 3);
}

#[test]
fn party_entries_expose_derived_fields() {
    let bytes = simple_save(&VANILLA, 1);
    let session = Engine::new()
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");

    let party = session.party();
    assert_eq!(party.len(), 1);
    let mon = &party[0];
    assert_eq!(mon.species, 1);
    assert!(mon.species_known);
    assert_eq!(mon.nickname, "MON1");
    assert_eq!(mon.trainer_id, 0x5678);
    assert_eq!(mon.secret_id, 0x1234);
    // Personality 0x101: low byte 1 -> Lonely.
    assert_eq!(mon.nature, "Lonely");
    assert_eq!(mon.ivs, [31, 0, 0, 0, 0, 0]);
    assert_eq!(mon.moves.len(), 1);
    assert_eq!(mon.moves[0].id, 33);
    assert_eq!(mon.moves[0].pp, 35);
    assert!(!mon.shiny);
    assert_eq!(mon.status, None);
}

#[test]
fn session_setters_round_trip_through_bytes() {
    let bytes = simple_save(&VANILLA, 2);
    let engine = Engine::new();
    let mut session = engine
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");

    session.set_level(0, 42).expect("level");
    session.set_nickname(0, "ZAPPY").expect("nickname");
    session.set_ev(0, Stat::Defense, 999).expect("ev");
    session.set_iv(0, Stat::SpDefense, 17).expect("iv");
    session.set_species(0, 150).expect("species");
    session.set_item(0, 13).expect("item");
    session.set_move(0, 2, 94).expect("move");
    session.set_current_hp(1, 1).expect("hp");
    session.heal(1).expect("heal");
    assert!(session.is_modified());

    let edited = session.to_bytes_modified().expect("emit");
    let reopened = engine
        .open_bytes(&edited, ParseOptions::default())
        .expect("reopen");
    let mon = reopened.party_entry(0).expect("slot 0");
    assert_eq!(mon.level, 42);
    assert_eq!(mon.nickname, "ZAPPY");
    assert_eq!(mon.evs[2], 255);
    assert_eq!(mon.ivs[5], 17);
    assert_eq!(mon.species, 150);
    assert_eq!(mon.held_item, 13);
    assert!(mon.moves.iter().any(|m| m.slot == 2 && m.id == 94));

    let healed = reopened.party_entry(1).expect("slot 1");
    assert_eq!(healed.current_hp, healed.stats.hp);

    assert_eq!(session.to_bytes_unmodified().unwrap(), bytes);
}

#[test]
fn setters_validate_input() {
    let bytes = simple_save(&VANILLA, 1);
    let mut session = Engine::new()
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");

    assert_eq!(
        session.set_level(0, 0).unwrap_err().code,
        CoreErrorCode::InvalidInput
    );
    assert_eq!(
        session.set_species(0, 0).unwrap_err().code,
        CoreErrorCode::InvalidInput
    );
    assert_eq!(
        session.set_species(0, 5000).unwrap_err().code,
        CoreErrorCode::InvalidInput
    );
    assert!(session.set_level(3, 10).is_err());
    assert!(session.set_move(0, 7, 1).is_err());
    assert!(session.swap_party(0, 1).is_err());
    assert!(!session.is_modified());
}

#[test]
fn current_hp_is_clamped_to_max() {
    let bytes = simple_save(&VANILLA, 1);
    let mut session = Engine::new()
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");
    session.set_current_hp(0, 5000).unwrap();
    let mon = session.party_entry(0).unwrap();
    assert_eq!(mon.current_hp, mon.stats.hp);
    session.set_current_hp(0, -3).unwrap();
    assert_eq!(session.party_entry(0).unwrap().current_hp, 0);
}

#[test]
fn sectors_mark_active_slot() {
    let bytes = simple_save(&VANILLA, 1);
    let session = Engine::new()
        .open_bytes(&bytes, ParseOptions::default())
        .expect("open");
    let sectors = session.sectors();
    assert_eq!(sectors.len(), 32);
    assert!(sectors[0].valid && sectors[0].in_active_slot);
    assert_eq!(sectors[4].id, 4);
    assert!(!sectors[5].valid);
    assert!(!sectors[20].in_active_slot);
}

#[test]
fn open_errors_carry_stage() {
    let err = Engine::new()
        .open_bytes(vec![0u8; 128 * 1024], ParseOptions::default())
        .unwrap_err();
    assert_eq!(err.stage(), ParseStage::Detection);

    let options = ParseOptions {
        layout: Some(LayoutKind::Vanilla),
        forced_slot: Some(SaveSlot::Two),
    };
    let err = Engine::new()
        .open_bytes(simple_save(&VANILLA, 1), options)
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::SlotResolution);
}

#[test]
fn snapshot_serializes_to_json() {
    let doc_bytes = simple_save(&VANILLA, 1);
    let session = Engine::new()
        .open_bytes(&doc_bytes, ParseOptions::default())
        .expect("open");
    let json = serde_json::to_value(session.snapshot()).expect("serialize");
    assert_eq!(json["player_name"], "MAY");
    assert_eq!(json["layout"], "Vanilla");
    assert_eq!(json["play_time"]["minutes"], 34);

    let doc = SaveDocument::parse(&doc_bytes).unwrap();
    assert_eq!(session.document().party(), doc.party());
}
