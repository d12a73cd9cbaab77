//! Error types for the game crate
//!
//! The simulation itself never fails; these cover input that arrives from the
//! outside (UI action names, level numbers, settings files).

use thiserror::Error;

/// The main error type for arena-doom operations
#[derive(Error, Debug)]
pub enum Error {
    /// A UI button reported an action name we do not know
    #[error("Unknown UI action: {0}")]
    UnknownAction(String),

    /// Level number outside the level table
    #[error("Invalid level {level}: levels run from 1 to {max}")]
    InvalidLevel { level: u32, max: u32 },

    /// Settings JSON did not parse
    #[error("Invalid settings: {0}")]
    Config(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for arena-doom operations
pub type Result<T> = std::result::Result<T, Error>;
