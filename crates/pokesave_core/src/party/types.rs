// Record field offsets shared by every layout, relative to the start of a
// party record. The rest live in `GameLayout::record`.
pub const PERSONALITY_OFFSET: usize = 0x00;
pub const TRAINER_ID_OFFSET: usize = 0x04;
pub const NICKNAME_OFFSET: usize = 0x08;
pub const TRAINER_NAME_OFFSET: usize = 0x14;
pub const SPECIES_OFFSET: usize = 0x28;
pub const HELD_ITEM_OFFSET: usize = 0x2A;
pub const MOVES_OFFSET: usize = 0x34;
pub const PP_OFFSET: usize = 0x3C;
pub const EVS_OFFSET: usize = 0x40;

pub const MOVE_COUNT: usize = 4;
pub const STAT_COUNT: usize = 6;

pub const IV_BITS: u32 = 5;
pub const IV_MASK: u32 = 0x1F;
pub const IV_MAX: i32 = 31;
pub const EV_MAX: i32 = 255;
/// Bits 30-31 of the IV word hold egg/ability flags and are never touched.
pub const IV_FLAGS_MASK: u32 = 0xC000_0000;

pub const SHINY_THRESHOLD: u16 = 8;
pub const MAX_LEVEL: u8 = 100;

// Plausibility bound used when checking record strides during detection.
pub const PLAUSIBLE_MAX_SPECIES: u16 = 1000;

pub const STAT_NAMES: [&str; STAT_COUNT] = [
    "HP",
    "Attack",
    "Defense",
    "Speed",
    "Sp. Attack",
    "Sp. Defense",
];

pub const NATURE_NAMES: [&str; 25] = [
    "Hardy", "Lonely", "Brave", "Adamant", "Naughty", "Bold", "Docile", "Relaxed", "Impish",
    "Lax", "Timid", "Hasty", "Serious", "Jolly", "Naive", "Modest", "Mild", "Quiet", "Bashful",
    "Rash", "Calm", "Gentle", "Sassy", "Careful", "Quirky",
];

pub const STATUS_NAMES: [(u8, &str); 5] = [
    (0x08, "Poisoned"),
    (0x10, "Burned"),
    (0x20, "Frozen"),
    (0x40, "Paralyzed"),
    (0x80, "Badly Poisoned"),
];
