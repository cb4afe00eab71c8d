// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer errors.

use crate::providers::AssetMissing;
use christmas_timeline::TimelineError;
use thiserror::Error;

/// Errors that stop the presentation
#[derive(Debug, Error)]
pub enum SequencerError {
    /// A scene could not be staged because an asset is absent
    #[error(transparent)]
    AssetMissing(#[from] AssetMissing),

    /// A scene referred to a node that was never staged
    #[error("Node not staged: {0}")]
    NodeNotStaged(&'static str),

    /// `start` was called twice
    #[error("Presentation already started")]
    AlreadyStarted,

    /// Timeline misuse
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
