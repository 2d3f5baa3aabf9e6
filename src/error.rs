use std::io;

use thiserror::Error;

/// Rejected configuration input. The `Display` text is meant for the player.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("wave count must be a number between 1 and 15 (got {input:?})")]
    NotANumber { input: String },
    #[error("wave count must be between 1 and 15 (got {value})")]
    OutOfRange { value: i64 },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn {name} thread: {source}")]
    SpawnThread {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}
