//! Error types for the bridge's ambient layers
//!
//! Proxy accessors never return these: absence and engine failures surface as
//! neutral values. Only configuration, logging setup and direct arena inserts
//! on the in-memory engine are fallible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Handle arena is full ({limit} live objects)")]
    CapacityExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
