// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single declarative timeline of timed actions.

use crate::action::{ActionId, TimedAction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Timeline errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    /// `start` was called on a timeline that already runs
    #[error("Timeline '{0}' already started")]
    AlreadyStarted(String),

    /// The timeline was cancelled and accepts nothing further
    #[error("Timeline '{0}' was cancelled")]
    Cancelled(String),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Timeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineState {
    /// Built but not armed
    #[default]
    Idle,
    /// Armed relative to `started_at`
    Running {
        /// Clock time at which offset zero elapsed
        started_at: Duration,
    },
    /// Cancelled; unfired actions were dropped
    Cancelled,
}

/// An ordered schedule of actions relative to a start time.
///
/// Actions are kept sorted by offset (stable for equal offsets). The owner
/// polls [`Timeline::due`] with the current clock time; nothing here sleeps
/// or performs side effects.
#[derive(Debug, Clone)]
pub struct Timeline<T, C> {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Name used in logs
    pub name: String,
    actions: Vec<TimedAction<T, C>>,
    /// Index of the first action that has not fired yet
    cursor: usize,
    state: TimelineState,
}

impl<T, C> Timeline<T, C> {
    /// Create an empty timeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            actions: Vec::new(),
            cursor: 0,
            state: TimelineState::Idle,
        }
    }

    /// Builder form of [`Timeline::schedule`] for timelines under construction
    pub fn at(mut self, offset: Duration, action: TimedAction<T, C>) -> Self {
        self.insert(offset, action);
        self
    }

    /// Add an action at `offset` from the timeline start.
    ///
    /// Scheduling into a running timeline is allowed; an offset that already
    /// elapsed fires on the next poll.
    pub fn schedule(&mut self, offset: Duration, action: TimedAction<T, C>) -> Result<ActionId> {
        if self.state == TimelineState::Cancelled {
            return Err(TimelineError::Cancelled(self.name.clone()));
        }
        Ok(self.insert(offset, action))
    }

    fn insert(&mut self, offset: Duration, mut action: TimedAction<T, C>) -> ActionId {
        action.offset = offset;
        let id = action.id;
        let pending = &self.actions[self.cursor..];
        let index = self.cursor + pending.partition_point(|a| a.offset <= offset);
        self.actions.insert(index, action);
        id
    }

    /// Arm every action relative to `now`
    pub fn start(&mut self, now: Duration) -> Result<()> {
        match self.state {
            TimelineState::Idle => {
                self.state = TimelineState::Running { started_at: now };
                Ok(())
            }
            TimelineState::Running { .. } => Err(TimelineError::AlreadyStarted(self.name.clone())),
            TimelineState::Cancelled => Err(TimelineError::Cancelled(self.name.clone())),
        }
    }

    /// Drop every action that has not fired yet. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.actions.len() - self.cursor;
        self.actions.truncate(self.cursor);
        self.state = TimelineState::Cancelled;
        dropped
    }

    /// Clock time at which the next unfired action is due
    pub fn next_deadline(&self) -> Option<Duration> {
        match self.state {
            TimelineState::Running { started_at } => {
                self.actions.get(self.cursor).map(|a| started_at + a.offset)
            }
            _ => None,
        }
    }

    /// Whether any mandatory action has yet to fire
    pub fn has_pending_mandatory(&self) -> bool {
        self.actions[self.cursor..].iter().any(TimedAction::is_mandatory)
    }

    /// Current state
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Whether the timeline is armed
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimelineState::Running { .. })
    }

    /// Whether the timeline was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.state == TimelineState::Cancelled
    }

    /// Armed and every action has fired
    pub fn is_finished(&self) -> bool {
        self.is_running() && self.cursor == self.actions.len()
    }

    /// All scheduled actions in offset order (fired ones included)
    pub fn actions(&self) -> &[TimedAction<T, C>] {
        &self.actions
    }

    /// Number of actions that have fired
    pub fn fired_count(&self) -> usize {
        self.cursor
    }

    /// Number of actions still waiting
    pub fn pending_count(&self) -> usize {
        self.actions.len() - self.cursor
    }

    /// End of the last effect on the timeline
    pub fn duration(&self) -> Duration {
        self.actions
            .iter()
            .map(|a| a.offset + a.duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

impl<T: Clone, C: Clone> Timeline<T, C> {
    /// Collect every action whose offset elapsed by `now`, in offset order,
    /// and mark them fired.
    pub fn due(&mut self, now: Duration) -> Vec<TimedAction<T, C>> {
        let TimelineState::Running { started_at } = self.state else {
            return Vec::new();
        };
        let elapsed = now.saturating_sub(started_at);

        let mut fired = Vec::new();
        while let Some(action) = self.actions.get(self.cursor) {
            if action.offset > elapsed {
                break;
            }
            fired.push(action.clone());
            self.cursor += 1;
        }
        fired
    }
}
