//! Error types for arv-core

use thiserror::Error;

use crate::scene::SceneSlot;

/// Scene membership errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Scene slot {0:?} does not hold the model")]
    NotHeld(SceneSlot),
    #[error("Scene slot {0:?} already holds the model")]
    AlreadyHeld(SceneSlot),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}
