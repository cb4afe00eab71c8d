// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timed action definitions for scene timelines.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a timed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    /// Create a new random action ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// What an action does when its offset elapses.
///
/// `C` is the owner's payload for anything that is not a fade, speech,
/// sound or plain wait (camera moves, scene cues, exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind<C> {
    /// Fade the target in
    FadeIn,
    /// Fade the target out
    FadeOut,
    /// Speak a line of text
    Speak(String),
    /// Play a named sound clip
    PlaySound(String),
    /// Hold for `duration` without side effects
    Wait,
    /// Owner-defined action
    Custom(C),
}

impl<C> ActionKind<C> {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::FadeIn => "fade-in",
            Self::FadeOut => "fade-out",
            Self::Speak(_) => "speak",
            Self::PlaySound(_) => "play-sound",
            Self::Wait => "wait",
            Self::Custom(_) => "custom",
        }
    }
}

/// Whether the owning scene must see this action fire before it may advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delivery {
    /// Must fire (or be explicitly superseded) before the scene moves on
    #[default]
    Mandatory,
    /// Side effect whose completion nobody waits for
    FireAndForget,
}

/// An action scheduled relative to the start of a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAction<T, C> {
    /// Unique action ID
    pub id: ActionId,
    /// Offset from the timeline start
    pub offset: Duration,
    /// What happens
    pub kind: ActionKind<C>,
    /// What it happens to, if anything
    pub target: Option<T>,
    /// Duration of the effect (fade length, hold length)
    pub duration: Duration,
    /// Delivery guarantee
    pub delivery: Delivery,
}

impl<T, C> TimedAction<T, C> {
    /// Create an untargeted, instantaneous, mandatory action
    pub fn new(kind: ActionKind<C>) -> Self {
        Self {
            id: ActionId::new(),
            offset: Duration::ZERO,
            kind,
            target: None,
            duration: Duration::ZERO,
            delivery: Delivery::Mandatory,
        }
    }

    /// Fade a target in over `duration`
    pub fn fade_in(target: T, duration: Duration) -> Self {
        Self::new(ActionKind::FadeIn).on(target).lasting(duration)
    }

    /// Fade a target out over `duration`
    pub fn fade_out(target: T, duration: Duration) -> Self {
        Self::new(ActionKind::FadeOut).on(target).lasting(duration)
    }

    /// Speak a line. Speech is fire-and-forget.
    pub fn speak(text: impl Into<String>) -> Self {
        Self::new(ActionKind::Speak(text.into())).fire_and_forget()
    }

    /// Play a sound clip. Sounds are fire-and-forget.
    pub fn play_sound(clip: impl Into<String>) -> Self {
        Self::new(ActionKind::PlaySound(clip.into())).fire_and_forget()
    }

    /// Hold for `duration`
    pub fn wait(duration: Duration) -> Self {
        Self::new(ActionKind::Wait).lasting(duration)
    }

    /// Owner-defined action
    pub fn custom(cue: C) -> Self {
        Self::new(ActionKind::Custom(cue))
    }

    /// Set the target
    pub fn on(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the effect duration
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Mark as fire-and-forget
    pub fn fire_and_forget(mut self) -> Self {
        self.delivery = Delivery::FireAndForget;
        self
    }

    /// Whether the owning scene must wait for this action
    pub fn is_mandatory(&self) -> bool {
        self.delivery == Delivery::Mandatory
    }
}
