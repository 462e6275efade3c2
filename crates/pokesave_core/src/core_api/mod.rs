mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode, ParseStage};
pub use types::{MoveEntry, PartyEntry, SectorEntry, Snapshot, StatBlock};
