use std::fmt::Write as _;

use pokesave_core::PlayTime;
use pokesave_core::core_api::{MoveEntry, PartyEntry, SectorEntry, Session, StatBlock};
use serde_json::{Map as JsonMap, Value as JsonValue};

const PARTY_COL_NAME: usize = 12;
const PARTY_COL_SPECIES: usize = 8;
const PARTY_COL_LEVEL: usize = 4;
const PARTY_COL_HP: usize = 10;
const PARTY_COL_NATURE: usize = 9;
const SHEET_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    pub verbose: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: bool,
    pub play_time: bool,
    pub active_slot: bool,
    pub game_name: bool,
    pub party: bool,
    pub sectors: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.name
            || self.play_time
            || self.active_slot
            || self.game_name
            || self.party
            || self.sectors
    }
}

pub fn render_json_full(session: &Session) -> JsonValue {
    JsonValue::Object(default_json(session))
}

pub fn render_json_selected(session: &Session, fields: &FieldSelection) -> JsonValue {
    JsonValue::Object(selected_json(fields, session))
}

/// `(key, value)` pairs for the selected fields, in a fixed order. Party
/// members and sectors expand to one pair each.
pub fn render_field_pairs(session: &Session, fields: &FieldSelection) -> Vec<(String, String)> {
    let snapshot = session.snapshot();
    let mut out = Vec::new();

    if fields.game_name {
        out.push(("game".to_string(), snapshot.game_name.clone()));
    }
    if fields.name {
        out.push(("name".to_string(), snapshot.player_name.clone()));
    }
    if fields.play_time {
        out.push((
            "play_time".to_string(),
            format_play_time(&snapshot.play_time),
        ));
    }
    if fields.active_slot {
        out.push(("active_slot".to_string(), snapshot.active_slot.to_string()));
    }
    if fields.party {
        for mon in session.party() {
            out.push((format!("party.{}", mon.index + 1), party_summary(&mon)));
        }
    }
    if fields.sectors {
        for s in session.sectors() {
            out.push((
                format!("sector.{:02}", s.physical_index),
                format!(
                    "id={} counter={} valid={} active={}",
                    s.id, s.counter, s.valid, s.in_active_slot
                ),
            ));
        }
    }
    out
}

pub fn render_text(session: &Session) -> String {
    render_text_with_options(session, TextRenderOptions::default())
}

pub fn render_text_with_options(session: &Session, options: TextRenderOptions) -> String {
    let snapshot = session.snapshot();
    let party = session.party();

    let mut out = String::new();
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing(&snapshot.game_name, SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("TRAINER CARD", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    let name_section = format!("  Name: {:<16}", snapshot.player_name);
    writeln!(
        &mut out,
        "{}Play Time: {}",
        name_section,
        format_play_time(&snapshot.play_time)
    )
    .expect("writing to String cannot fail");
    let slot_section = format!("  Slot: {:<16}", snapshot.active_slot);
    writeln!(
        &mut out,
        "{}Sectors: {} valid",
        slot_section, snapshot.valid_sectors
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    write_party_table(&mut out, &party);

    if options.verbose {
        for mon in &party {
            writeln!(&mut out).expect("writing to String cannot fail");
            write_party_detail(&mut out, mon);
        }
        writeln!(&mut out).expect("writing to String cannot fail");
        write_sector_table(&mut out, &session.sectors());
    }

    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    if fields.game_name {
        out.insert(
            "game".to_string(),
            JsonValue::String(snapshot.game_name.clone()),
        );
    }
    if fields.name {
        out.insert(
            "name".to_string(),
            JsonValue::String(snapshot.player_name.clone()),
        );
    }
    if fields.play_time {
        out.insert(
            "play_time".to_string(),
            play_time_to_json(&snapshot.play_time),
        );
    }
    if fields.active_slot {
        out.insert(
            "active_slot".to_string(),
            JsonValue::from(snapshot.active_slot),
        );
    }
    if fields.party {
        out.insert("party".to_string(), party_to_json(&session.party()));
    }
    if fields.sectors {
        out.insert("sectors".to_string(), sectors_to_json(&session.sectors()));
    }

    out
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "game".to_string(),
        JsonValue::String(snapshot.game_name.clone()),
    );
    out.insert(
        "layout".to_string(),
        JsonValue::String(session.layout().kind.to_string()),
    );
    out.insert(
        "name".to_string(),
        JsonValue::String(snapshot.player_name.clone()),
    );
    out.insert(
        "play_time".to_string(),
        play_time_to_json(&snapshot.play_time),
    );
    out.insert(
        "active_slot".to_string(),
        JsonValue::from(snapshot.active_slot),
    );
    out.insert(
        "valid_sectors".to_string(),
        JsonValue::from(snapshot.valid_sectors),
    );
    out.insert("party".to_string(), party_to_json(&session.party()));

    out
}

fn play_time_to_json(pt: &PlayTime) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("hours".to_string(), JsonValue::from(pt.hours));
    m.insert("minutes".to_string(), JsonValue::from(pt.minutes));
    m.insert("seconds".to_string(), JsonValue::from(pt.seconds));
    JsonValue::Object(m)
}

fn party_to_json(party: &[PartyEntry]) -> JsonValue {
    JsonValue::Array(party.iter().map(party_entry_to_json).collect())
}

fn party_entry_to_json(p: &PartyEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("slot".to_string(), JsonValue::from(p.index + 1));
    m.insert("species".to_string(), JsonValue::from(p.species));
    m.insert("nickname".to_string(), JsonValue::String(p.nickname.clone()));
    m.insert("level".to_string(), JsonValue::from(p.level));
    m.insert("current_hp".to_string(), JsonValue::from(p.current_hp));
    m.insert("stats".to_string(), stat_block_to_json(&p.stats));
    m.insert("nature".to_string(), JsonValue::String(p.nature.clone()));
    m.insert("shiny".to_string(), JsonValue::Bool(p.shiny));
    m.insert("held_item".to_string(), JsonValue::from(p.held_item));
    m.insert(
        "moves".to_string(),
        JsonValue::Array(p.moves.iter().map(move_to_json).collect()),
    );
    m.insert("evs".to_string(), JsonValue::from(p.evs.to_vec()));
    m.insert("ivs".to_string(), JsonValue::from(p.ivs.to_vec()));
    m.insert(
        "trainer".to_string(),
        JsonValue::String(p.trainer_name.clone()),
    );
    m.insert("trainer_id".to_string(), JsonValue::from(p.trainer_id));
    m.insert(
        "status".to_string(),
        match &p.status {
            Some(s) => JsonValue::String(s.clone()),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(m)
}

fn stat_block_to_json(s: &StatBlock) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("hp".to_string(), JsonValue::from(s.hp));
    m.insert("attack".to_string(), JsonValue::from(s.attack));
    m.insert("defense".to_string(), JsonValue::from(s.defense));
    m.insert("speed".to_string(), JsonValue::from(s.speed));
    m.insert("sp_attack".to_string(), JsonValue::from(s.sp_attack));
    m.insert("sp_defense".to_string(), JsonValue::from(s.sp_defense));
    JsonValue::Object(m)
}

fn move_to_json(mv: &MoveEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("slot".to_string(), JsonValue::from(mv.slot + 1));
    m.insert("id".to_string(), JsonValue::from(mv.id));
    m.insert("pp".to_string(), JsonValue::from(mv.pp));
    JsonValue::Object(m)
}

fn sectors_to_json(sectors: &[SectorEntry]) -> JsonValue {
    JsonValue::Array(
        sectors
            .iter()
            .map(|s| {
                let mut m = JsonMap::new();
                m.insert("index".to_string(), JsonValue::from(s.physical_index));
                m.insert("id".to_string(), JsonValue::from(s.id));
                m.insert("counter".to_string(), JsonValue::from(s.counter));
                m.insert("valid".to_string(), JsonValue::Bool(s.valid));
                m.insert("active".to_string(), JsonValue::Bool(s.in_active_slot));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn write_party_table(out: &mut String, party: &[PartyEntry]) {
    writeln!(out, " ::: Party ({}) :::", party.len()).expect("writing to String cannot fail");
    if party.is_empty() {
        writeln!(out, "  (empty)").expect("writing to String cannot fail");
        return;
    }
    for mon in party {
        let hp = format!("{}/{}", mon.current_hp, mon.stats.hp);
        let line = format!(
            "  {}. {:<a$} #{:<b$} Lv{:<c$} HP {:<d$} {:<e$}{}",
            mon.index + 1,
            fit_column(&mon.nickname, PARTY_COL_NAME),
            mon.species,
            mon.level,
            hp,
            mon.nature,
            if mon.shiny { " *" } else { "" },
            a = PARTY_COL_NAME,
            b = PARTY_COL_SPECIES,
            c = PARTY_COL_LEVEL,
            d = PARTY_COL_HP,
            e = PARTY_COL_NATURE,
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn party_summary(mon: &PartyEntry) -> String {
    format!(
        "{} #{} Lv{} HP {}/{} {}{}",
        mon.nickname,
        mon.species,
        mon.level,
        mon.current_hp,
        mon.stats.hp,
        mon.nature,
        if mon.shiny { " shiny" } else { "" }
    )
}

fn write_party_detail(out: &mut String, mon: &PartyEntry) {
    writeln!(
        out,
        " {} (#{}) OT {} [{}]",
        mon.nickname, mon.species, mon.trainer_name, mon.trainer_id
    )
    .expect("writing to String cannot fail");
    let s = &mon.stats;
    writeln!(
        out,
        "   Stats  HP {:>3}  Atk {:>3}  Def {:>3}  Spe {:>3}  SpA {:>3}  SpD {:>3}",
        s.hp, s.attack, s.defense, s.speed, s.sp_attack, s.sp_defense
    )
    .expect("writing to String cannot fail");
    writeln!(out, "   IVs    {}", format_six(&mon.ivs)).expect("writing to String cannot fail");
    writeln!(out, "   EVs    {}", format_six(&mon.evs)).expect("writing to String cannot fail");
    let moves: Vec<String> = mon
        .moves
        .iter()
        .map(|m| format!("{} ({} PP)", m.id, m.pp))
        .collect();
    writeln!(out, "   Moves  {}", moves.join(", ")).expect("writing to String cannot fail");
    if let Some(status) = &mon.status {
        writeln!(out, "   Status {status}").expect("writing to String cannot fail");
    }
}

fn write_sector_table(out: &mut String, sectors: &[SectorEntry]) {
    writeln!(out, " ::: Sectors :::").expect("writing to String cannot fail");
    for s in sectors {
        let line = format!(
            "  {:>2}  id {:>2}  counter {:>8}  {}{}",
            s.physical_index,
            s.id,
            s.counter,
            if s.valid { "ok" } else { "--" },
            if s.in_active_slot { "  active" } else { "" },
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn format_six(values: &[u8; 6]) -> String {
    values
        .iter()
        .map(|v| format!("{v:>3}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_play_time(pt: &PlayTime) -> String {
    format!("{}:{:02}:{:02}", pt.hours, pt.minutes, pt.seconds)
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}
