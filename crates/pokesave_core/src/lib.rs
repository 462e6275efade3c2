pub mod block;
pub mod checksum;
pub mod core_api;
pub mod detect;
pub mod document;
pub mod layout;
pub mod memory;
pub mod party;
pub mod reader;
pub mod reconstruct;
pub mod sector;
pub mod slot;
pub mod text;

pub use document::{ParseOptions, PlayTime, SaveDocument};
pub use layout::{GameLayout, LayoutKind};
pub use party::PartyRecord;
pub use slot::SaveSlot;
