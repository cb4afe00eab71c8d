// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative scene timelines.
//!
//! This crate provides the scheduling half of the presentation:
//! - Timed actions (fades, speech, sounds, waits, custom cues)
//! - Timelines ordered by offset from their start
//! - A conductor running many timelines at once
//! - A clock abstraction with a virtual clock for tests
//!
//! ## Architecture
//!
//! Nothing here sleeps or performs side effects. The owner polls with the
//! current clock time, receives the actions that came due and dispatches
//! them itself. Cancelling a timeline only drops actions that have not
//! fired yet.

pub mod action;
pub mod clock;
pub mod conductor;
pub mod timeline;

pub use action::{ActionId, ActionKind, Delivery, TimedAction};
pub use clock::{Clock, ManualClock};
pub use conductor::{Conductor, Fired};
pub use timeline::{Timeline, TimelineError, TimelineId, TimelineState};
