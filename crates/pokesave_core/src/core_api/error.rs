use std::error::Error;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreErrorCode {
    Io,
    NotDetected,
    SlotResolution,
    SectorMissing,
    RecordTooShort,
    EncodeOutOfRange,
    InvalidInput,
}

/// The pipeline stage a failure belongs to.
///
/// Lets callers tell "this is not a save of a known game" (`Detection`)
/// apart from "this save is corrupt" (`SlotResolution`, `Block2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStage {
    Input,
    Detection,
    SlotResolution,
    Block2,
    PartyDecode,
    Encode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> ParseStage {
        match self.code {
            CoreErrorCode::Io | CoreErrorCode::InvalidInput => ParseStage::Input,
            CoreErrorCode::NotDetected => ParseStage::Detection,
            CoreErrorCode::SlotResolution => ParseStage::SlotResolution,
            CoreErrorCode::SectorMissing => ParseStage::Block2,
            CoreErrorCode::RecordTooShort => ParseStage::PartyDecode,
            CoreErrorCode::EncodeOutOfRange => ParseStage::Encode,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

impl From<io::Error> for CoreError {
    fn from(e: io::Error) -> Self {
        Self::new(CoreErrorCode::Io, e.to_string())
    }
}
