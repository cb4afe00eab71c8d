// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shell errors.

use christmas_core::{SequencerError, SettingsError};
use thiserror::Error;

/// Errors that end the shell
#[derive(Debug, Error)]
pub enum AppError {
    /// Presentation settings could not be read
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Shell configuration could not be read
    #[error("Shell config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The presentation failed
    #[error("Presentation error: {0}")]
    Sequencer(#[from] SequencerError),

    /// File system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The run report could not be written
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
}

/// Result type for the shell
pub type Result<T> = std::result::Result<T, AppError>;
