//! Engine error type
//!
//! The simulation itself never fails; these are all raised before a run starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown difficulty: {0:?} (expected easy, normal or hard)")]
    UnknownDifficulty(String),
    #[error("keyboard input not available")]
    KeyboardUnavailable,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("invalid difficulty table for {0}: min spawn interval exceeds base interval")]
    InvalidDifficulty(&'static str),
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),
    #[error("failed to read settings file: {0}")]
    SettingsIo(#[from] std::io::Error),
}
