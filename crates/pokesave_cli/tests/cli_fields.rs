use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use pokesave_core::checksum::sector_checksum;
use pokesave_core::layout::{EMERALD_SIGNATURE, SECTOR_COUNT, SECTOR_SIZE, VANILLA};
use pokesave_core::text;
use serde_json::Value;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pokesave"))
        .args(args)
        .output()
        .expect("failed to run pokesave")
}

fn temp_output_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.sav", std::process::id(), nanos))
}

fn write_sector(raw: &mut [u8], physical: usize, id: u16, data: &[u8]) {
    let region = VANILLA.data_range(physical);
    raw[region.start..region.start + data.len()].copy_from_slice(data);
    let checksum = sector_checksum(&raw[region.start..region.end]);
    let f = VANILLA.footer_range(physical).start;
    raw[f..f + 2].copy_from_slice(&id.to_le_bytes());
    raw[f + 2..f + 4].copy_from_slice(&checksum.to_le_bytes());
    raw[f + 4..f + 8].copy_from_slice(&EMERALD_SIGNATURE.to_le_bytes());
    raw[f + 8..f + 12].copy_from_slice(&1u32.to_le_bytes());
}

fn put_record(chunk: &mut [u8], slot: usize, nickname: &str, species: u16, level: u8, hp: u16) {
    let r = VANILLA.party_offset + slot * VANILLA.record_size;
    let fields = &VANILLA.record;
    let hp_at = r + fields.current_hp;
    let max_hp_at = r + fields.stats[0];
    chunk[r..r + 4].copy_from_slice(&(0x200 + u32::from(species)).to_le_bytes());
    chunk[r + 0x08..r + 0x12].copy_from_slice(&text::encode(nickname, 10));
    chunk[hp_at..hp_at + 2].copy_from_slice(&hp.to_le_bytes());
    chunk[r + 0x28..r + 0x2A].copy_from_slice(&species.to_le_bytes());
    chunk[r + 0x34..r + 0x36].copy_from_slice(&10u16.to_le_bytes());
    chunk[r + 0x3C] = 35;
    chunk[r + fields.level] = level;
    chunk[max_hp_at..max_hp_at + 2].copy_from_slice(&hp.to_le_bytes());
}

fn write_fixture_save(prefix: &str) -> PathBuf {
    let mut raw = vec![0u8; SECTOR_COUNT * SECTOR_SIZE];

    let mut block2 = vec![0u8; VANILLA.data_region_size];
    block2[..8].copy_from_slice(&text::encode("MAY", 8));
    block2[0x0E..0x10].copy_from_slice(&3u16.to_le_bytes());
    block2[0x10] = 2;
    block2[0x11] = 1;
    write_sector(&mut raw, 0, 0, &block2);

    let mut chunk = vec![0u8; VANILLA.data_region_size];
    put_record(&mut chunk, 0, "MUDKIP", 258, 5, 20);
    put_record(&mut chunk, 1, "ZIGZAGOON", 263, 3, 14);
    write_sector(&mut raw, 1, 1, &chunk);

    let path = temp_output_path(prefix);
    std::fs::write(&path, raw).expect("fixture save should be written");
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be utf-8")
}

fn json_of(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("stdout should be json")
}

#[test]
fn selected_fields_print_key_value_lines() {
    let save = write_fixture_save("pokesave_fields");
    let output = run_cli(&[path_str(&save), "--name", "--play-time", "--active-slot"]);
    let _ = std::fs::remove_file(&save);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["name=MAY", "play_time=3:02:01", "active_slot=1"]);
}

#[test]
fn party_field_lists_each_member() {
    let save = write_fixture_save("pokesave_party");
    let output = run_cli(&[path_str(&save), "--party"]);
    let _ = std::fs::remove_file(&save);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("party.1=MUDKIP #258 Lv5 HP 20/20"));
    assert!(lines[1].starts_with("party.2=ZIGZAGOON #263 Lv3"));
}

#[test]
fn json_output_includes_party() {
    let save = write_fixture_save("pokesave_json");
    let value = json_of(&run_cli(&[path_str(&save), "--json"]));
    let _ = std::fs::remove_file(&save);

    assert_eq!(value["name"], Value::from("MAY"));
    assert_eq!(value["layout"], Value::from("vanilla"));
    assert_eq!(value["party"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["party"][1]["species"], Value::from(263));
}

#[test]
fn forced_layout_and_slot_are_accepted() {
    let save = write_fixture_save("pokesave_forced");
    let value = json_of(&run_cli(&[
        path_str(&save),
        "--game",
        "vanilla",
        "--slot",
        "1",
        "--json",
        "--name",
    ]));
    let _ = std::fs::remove_file(&save);
    assert_eq!(value["name"], Value::from("MAY"));
}

#[test]
fn edits_are_written_to_output_and_reparse() {
    let save = write_fixture_save("pokesave_edit_in");
    let out = temp_output_path("pokesave_edit_out");
    let output = run_cli(&[
        path_str(&save),
        "--pokemon",
        "1",
        "--set-level",
        "12",
        "--set-nickname",
        "SWAMPY",
        "--set-ev",
        "atk=40",
        "--set-move",
        "2=55",
        "--output",
        path_str(&out),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wrote edited save to"));

    let value = json_of(&run_cli(&[path_str(&out), "--json"]));
    let _ = std::fs::remove_file(&save);
    let _ = std::fs::remove_file(&out);

    let mon = &value["party"][0];
    assert_eq!(mon["level"], Value::from(12));
    assert_eq!(mon["nickname"], Value::from("SWAMPY"));
    assert_eq!(mon["evs"][1], Value::from(40));
    assert_eq!(mon["moves"][1]["id"], Value::from(55));
}

#[test]
fn swap_reorders_party_in_output() {
    let save = write_fixture_save("pokesave_swap_in");
    let out = temp_output_path("pokesave_swap_out");
    let output = run_cli(&[
        path_str(&save),
        "--swap",
        "1,2",
        "--output",
        path_str(&out),
    ]);
    assert!(output.status.success());

    let value = json_of(&run_cli(&[path_str(&out), "--json", "--party"]));
    let _ = std::fs::remove_file(&save);
    let _ = std::fs::remove_file(&out);
    assert_eq!(value["party"][0]["nickname"], Value::from("ZIGZAGOON"));
    assert_eq!(value["party"][1]["nickname"], Value::from("MUDKIP"));
}

#[test]
fn edit_flags_without_output_exit_with_usage_error() {
    let save = write_fixture_save("pokesave_misuse");
    let no_output = run_cli(&[path_str(&save), "--pokemon", "1", "--set-level", "9"]);
    let out = temp_output_path("pokesave_misuse_out");
    let no_edits = run_cli(&[path_str(&save), "--output", path_str(&out)]);
    let no_target = run_cli(&[
        path_str(&save),
        "--set-level",
        "9",
        "--output",
        path_str(&out),
    ]);
    let _ = std::fs::remove_file(&save);

    assert_eq!(no_output.status.code(), Some(2));
    assert_eq!(no_edits.status.code(), Some(2));
    assert_eq!(no_target.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn invalid_edit_value_exits_with_error() {
    let save = write_fixture_save("pokesave_bad_level");
    let out = temp_output_path("pokesave_bad_level_out");
    let output = run_cli(&[
        path_str(&save),
        "--pokemon",
        "1",
        "--set-level",
        "101",
        "--output",
        path_str(&out),
    ]);
    let _ = std::fs::remove_file(&save);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error applying level edit"));
    assert!(!out.exists());
}

#[test]
fn unreadable_or_unknown_saves_exit_with_error() {
    let missing = temp_output_path("pokesave_missing");
    let output = run_cli(&[path_str(&missing)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading"));

    let blank = temp_output_path("pokesave_blank");
    std::fs::write(&blank, vec![0u8; SECTOR_COUNT * SECTOR_SIZE]).expect("write blank");
    let output = run_cli(&[path_str(&blank)]);
    let _ = std::fs::remove_file(&blank);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error parsing save file"));
}
