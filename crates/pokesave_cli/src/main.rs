use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use pokesave_core::core_api::{Engine, Session};
use pokesave_core::party::Stat;
use pokesave_core::{LayoutKind, ParseOptions, SaveSlot};
use pokesave_render::{
    FieldSelection, TextRenderOptions, render_field_pairs, render_json_full, render_json_selected,
    render_text_with_options,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE.SAV")]
    path: PathBuf,
    #[arg(long, value_name = "vanilla|quetzal", value_parser = parse_layout_kind)]
    game: Option<LayoutKind>,
    #[arg(long, value_name = "1|2", value_parser = parse_save_slot)]
    slot: Option<SaveSlot>,
    #[arg(long)]
    name: bool,
    #[arg(long = "play-time")]
    play_time: bool,
    #[arg(long = "active-slot")]
    active_slot: bool,
    #[arg(long = "game-name")]
    game_name: bool,
    #[arg(long)]
    party: bool,
    #[arg(long)]
    sectors: bool,
    #[arg(long)]
    json: bool,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Party member (1-6) targeted by the per-record --set-* flags.
    #[arg(long, value_name = "N")]
    pokemon: Option<usize>,
    #[arg(long = "set-level")]
    set_level: Option<i32>,
    #[arg(long = "set-hp", allow_hyphen_values = true)]
    set_hp: Option<i32>,
    #[arg(long = "set-nickname")]
    set_nickname: Option<String>,
    #[arg(long = "set-ev", value_name = "STAT=VALUE", value_parser = parse_stat_assignment)]
    set_ev: Vec<(Stat, i32)>,
    #[arg(long = "set-iv", value_name = "STAT=VALUE", value_parser = parse_stat_assignment)]
    set_iv: Vec<(Stat, i32)>,
    #[arg(long = "set-species")]
    set_species: Option<u16>,
    #[arg(long = "set-item")]
    set_item: Option<u16>,
    #[arg(long = "set-move", value_name = "SLOT=ID", value_parser = parse_move_assignment)]
    set_move: Vec<(usize, u16)>,
    /// Restore HP and clear status (whole party unless --pokemon is given).
    #[arg(long)]
    heal: bool,
    #[arg(long, value_name = "A,B", value_parser = parse_swap)]
    swap: Option<(usize, usize)>,
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn fields(&self) -> FieldSelection {
        FieldSelection {
            name: self.name,
            play_time: self.play_time,
            active_slot: self.active_slot,
            game_name: self.game_name,
            party: self.party,
            sectors: self.sectors,
        }
    }

    fn has_record_edits(&self) -> bool {
        self.set_level.is_some()
            || self.set_hp.is_some()
            || self.set_nickname.is_some()
            || !self.set_ev.is_empty()
            || !self.set_iv.is_empty()
            || self.set_species.is_some()
            || self.set_item.is_some()
            || !self.set_move.is_empty()
    }

    fn has_edits(&self) -> bool {
        self.has_record_edits() || self.heal || self.swap.is_some()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let fields = cli.fields();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("edit flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one edit flag");
        process::exit(2);
    }
    if cli.has_record_edits() && cli.pokemon.is_none() {
        eprintln!("--set-* flags require --pokemon <N>");
        process::exit(2);
    }
    let target = cli.pokemon.map(|n| {
        if n == 0 {
            eprintln!("--pokemon is 1-based, got 0");
            process::exit(2);
        }
        n - 1
    });

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let options = ParseOptions {
        layout: cli.game,
        forced_slot: cli.slot,
    };
    let mut session = Engine::new().open_bytes(bytes, options).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {e} (stage: {:?})", e.stage());
        process::exit(1);
    });

    if let (true, Some(out_path)) = (has_edits, &cli.output) {
        apply_edits(&mut session, &cli, target);

        let edited_bytes = session.to_bytes_modified().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        debug!(path = %out_path.display(), "wrote edited save");
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields)
        } else {
            render_json_full(&session)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_field_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    let options = TextRenderOptions {
        verbose: cli.verbose > 0,
    };
    print!("{}", render_text_with_options(&session, options));
}

fn apply_edits(session: &mut Session, cli: &Cli, target: Option<usize>) {
    if let Some((a, b)) = cli.swap {
        session.swap_party(a, b).unwrap_or_else(|e| {
            eprintln!("Error applying swap: {e}");
            process::exit(1);
        });
    }

    if let Some(index) = target {
        if let Some(level) = cli.set_level {
            session.set_level(index, level).unwrap_or_else(|e| {
                eprintln!("Error applying level edit: {e}");
                process::exit(1);
            });
        }
        if let Some(species) = cli.set_species {
            session.set_species(index, species).unwrap_or_else(|e| {
                eprintln!("Error applying species edit: {e}");
                process::exit(1);
            });
        }
        if let Some(name) = &cli.set_nickname {
            session.set_nickname(index, name).unwrap_or_else(|e| {
                eprintln!("Error applying nickname edit: {e}");
                process::exit(1);
            });
        }
        if let Some(item) = cli.set_item {
            session.set_item(index, item).unwrap_or_else(|e| {
                eprintln!("Error applying item edit: {e}");
                process::exit(1);
            });
        }
        for &(stat, value) in &cli.set_ev {
            session.set_ev(index, stat, value).unwrap_or_else(|e| {
                eprintln!("Error applying EV edit: {e}");
                process::exit(1);
            });
        }
        for &(stat, value) in &cli.set_iv {
            session.set_iv(index, stat, value).unwrap_or_else(|e| {
                eprintln!("Error applying IV edit: {e}");
                process::exit(1);
            });
        }
        for &(slot, move_id) in &cli.set_move {
            session.set_move(index, slot, move_id).unwrap_or_else(|e| {
                eprintln!("Error applying move edit: {e}");
                process::exit(1);
            });
        }
        if let Some(hp) = cli.set_hp {
            session.set_current_hp(index, hp).unwrap_or_else(|e| {
                eprintln!("Error applying HP edit: {e}");
                process::exit(1);
            });
        }
    }

    if cli.heal {
        let healed = match target {
            Some(index) => session.heal(index),
            None => session.heal_all(),
        };
        healed.unwrap_or_else(|e| {
            eprintln!("Error applying heal: {e}");
            process::exit(1);
        });
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_layout_kind(value: &str) -> Result<LayoutKind, String> {
    value.parse::<LayoutKind>().map_err(|e| e.message)
}

fn parse_save_slot(value: &str) -> Result<SaveSlot, String> {
    let n: u8 = value
        .parse()
        .map_err(|_| format!("invalid slot value '{value}', expected 1 or 2"))?;
    SaveSlot::from_number(n).map_err(|e| e.message)
}

fn parse_stat_assignment(value: &str) -> Result<(Stat, i32), String> {
    let (stat, amount) = value
        .split_once('=')
        .ok_or_else(|| format!("expected STAT=VALUE, got '{value}'"))?;
    let stat = stat.parse::<Stat>().map_err(|e| e.message)?;
    let amount = amount
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid value '{amount}' for {stat}"))?;
    Ok((stat, amount))
}

/// Parses `SLOT=ID` with a 1-based move slot.
fn parse_move_assignment(value: &str) -> Result<(usize, u16), String> {
    let (slot, id) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=ID, got '{value}'"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .map_err(|_| format!("invalid move slot '{slot}'"))?;
    if !(1..=4).contains(&slot) {
        return Err(format!("move slot {slot} out of range, expected 1-4"));
    }
    let id: u16 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid move id '{id}'"))?;
    Ok((slot - 1, id))
}

/// Parses `A,B` with 1-based party positions.
fn parse_swap(value: &str) -> Result<(usize, usize), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected A,B, got '{value}'"))?;
    let parse_one = |s: &str| -> Result<usize, String> {
        match s.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("invalid party position '{s}', expected 1-6")),
        }
    };
    Ok((parse_one(a)?, parse_one(b)?))
}
