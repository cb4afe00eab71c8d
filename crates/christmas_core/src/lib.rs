// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene sequencing for the Christmas greeting.
//!
//! This crate provides the presentation logic:
//! - A readiness gate that holds the start until the name and assets are in
//! - Six scenes with a fixed transition table
//! - Choreography for every scene, built on `christmas_timeline`
//! - The photo capture sub-flow and the composite export
//! - Settings persisted as RON
//!
//! ## Architecture
//!
//! The [`Sequencer`] is synchronous and owns the [`Stage`], the set of
//! collaborator traits that actually render, speak, play and capture. The
//! [`Director`] wraps it in an async loop that feeds it input, capture
//! results and timeline deadlines. Platforms only implement the traits in
//! [`providers`].

pub mod capture;
pub mod choreography;
pub mod composite;
pub mod director;
pub mod error;
pub mod gate;
pub mod identity;
pub mod providers;
pub mod scene;
pub mod sequencer;
pub mod session;
pub mod settings;

#[cfg(test)]
mod testing;

pub use capture::{CaptureFlow, CaptureResult, CaptureState};
pub use composite::compose;
pub use director::{Director, RunSummary, TokioClock};
pub use error::{Result, SequencerError};
pub use gate::{ReadinessGate, ReadinessSource};
pub use identity::{
    resolve_greeting_name, AccountDirectory, DeviceOwner, DirectoryIdentity, Discoverability,
    GreetingCopy,
};
pub use providers::{
    Animation, AssetMissing, AssetPreloader, CameraPose, CameraProvider, CaptureError, FlashMode,
    IdentityError, IdentityProvider, LocalNameFallback, NodeHandle, NodeTransform, Overlay,
    SceneRenderer, ShareSink, SoundProvider, SpeechProvider, Stage, TextStyle, Visibility,
};
pub use scene::{Control, Decoration, Input, Scene, TreeVariant};
pub use sequencer::{Completion, Handled, PendingCompletion, Sequencer};
pub use session::{Session, TreeRig};
pub use settings::{
    AssetNames, InfoLine, PresentationSettings, Script, SettingsError, Timing,
    MAX_TIMING_SECS, SETTINGS_FILE_NAME, SETTINGS_FORMAT_VERSION,
};
