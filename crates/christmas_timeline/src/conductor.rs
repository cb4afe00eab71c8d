// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drives several running timelines against one clock.

use crate::action::TimedAction;
use crate::timeline::{Result, Timeline, TimelineId, TimelineState};
use indexmap::IndexMap;
use std::time::Duration;

/// An action that came due, with the timeline it belongs to
#[derive(Debug, Clone)]
pub struct Fired<T, C> {
    /// Owning timeline
    pub timeline: TimelineId,
    /// Clock time the action was due at
    pub at: Duration,
    /// The action itself
    pub action: TimedAction<T, C>,
}

/// Set of concurrently running timelines.
///
/// Timelines overlap freely: a scene's speech timeline keeps running while
/// the next scene's camera move starts. Finished timelines are dropped on
/// the poll that fires their last action.
#[derive(Debug)]
pub struct Conductor<T, C> {
    timelines: IndexMap<TimelineId, Timeline<T, C>>,
}

impl<T, C> Conductor<T, C> {
    /// Create an empty conductor
    pub fn new() -> Self {
        Self {
            timelines: IndexMap::new(),
        }
    }

    /// Arm a timeline at `now` and keep it running
    pub fn launch(&mut self, mut timeline: Timeline<T, C>, now: Duration) -> Result<TimelineId> {
        timeline.start(now)?;
        let id = timeline.id;
        self.timelines.insert(id, timeline);
        Ok(id)
    }

    /// Cancel a running timeline. Returns how many unfired actions were dropped.
    pub fn cancel(&mut self, id: TimelineId) -> usize {
        match self.timelines.shift_remove(&id) {
            Some(mut timeline) => timeline.cancel_all(),
            None => 0,
        }
    }

    /// Cancel every running timeline
    pub fn cancel_all(&mut self) -> usize {
        self.timelines
            .drain(..)
            .map(|(_, mut timeline)| timeline.cancel_all())
            .sum()
    }

    /// Earliest clock time at which any timeline has an action due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timelines.values().filter_map(Timeline::next_deadline).min()
    }

    /// Whether the timeline is still running
    pub fn is_active(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(&id)
    }

    /// Whether a running timeline still owes a mandatory action
    pub fn has_pending_mandatory(&self, id: TimelineId) -> bool {
        self.timelines
            .get(&id)
            .is_some_and(Timeline::has_pending_mandatory)
    }

    /// Get a running timeline
    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline<T, C>> {
        self.timelines.get(&id)
    }

    /// Get a running timeline for rescheduling
    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline<T, C>> {
        self.timelines.get_mut(&id)
    }

    /// Number of running timelines
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// No timeline is running
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

impl<T: Clone, C: Clone> Conductor<T, C> {
    /// Collect every due action across all timelines, ordered by due time.
    ///
    /// Actions due at the same instant keep launch order, then offset order.
    pub fn poll(&mut self, now: Duration) -> Vec<Fired<T, C>> {
        let mut fired = Vec::new();

        for (id, timeline) in &mut self.timelines {
            let TimelineState::Running { started_at } = timeline.state() else {
                continue;
            };
            fired.extend(timeline.due(now).into_iter().map(|action| Fired {
                timeline: *id,
                at: started_at + action.offset,
                action,
            }));
        }

        fired.sort_by_key(|f| f.at);
        self.timelines.retain(|_, timeline| !timeline.is_finished());
        fired
    }
}

impl<T, C> Default for Conductor<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn lines(fired: &[Fired<(), ()>]) -> Vec<String> {
        fired
            .iter()
            .filter_map(|f| match &f.action.kind {
                ActionKind::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_overlapping_timelines_interleave() {
        let mut conductor = Conductor::new();
        let speech = Timeline::new("speech")
            .at(secs(0), TimedAction::speak("a0"))
            .at(secs(4), TimedAction::speak("a4"));
        let camera = Timeline::new("camera")
            .at(secs(1), TimedAction::speak("b3"))
            .at(secs(5), TimedAction::speak("b7"));

        conductor.launch(speech, secs(0)).unwrap();
        conductor.launch(camera, secs(2)).unwrap();

        let fired = conductor.poll(secs(10));
        assert_eq!(lines(&fired), vec!["a0", "b3", "a4", "b7"]);
        assert!(conductor.is_empty());
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut conductor: Conductor<(), ()> = Conductor::new();
        conductor
            .launch(Timeline::new("late").at(secs(9), TimedAction::speak("x")), secs(0))
            .unwrap();
        conductor
            .launch(Timeline::new("early").at(secs(2), TimedAction::speak("y")), secs(1))
            .unwrap();
        assert_eq!(conductor.next_deadline(), Some(secs(3)));
    }

    #[test]
    fn test_cancel_drops_only_that_timeline() {
        let mut conductor = Conductor::new();
        let keep = conductor
            .launch(Timeline::new("keep").at(secs(5), TimedAction::speak("kept")), secs(0))
            .unwrap();
        let drop = conductor
            .launch(
                Timeline::new("drop")
                    .at(secs(0), TimedAction::speak("early"))
                    .at(secs(5), TimedAction::speak("dropped")),
                secs(0),
            )
            .unwrap();

        assert_eq!(lines(&conductor.poll(secs(1))), vec!["early"]);
        assert_eq!(conductor.cancel(drop), 1);
        assert!(!conductor.is_active(drop));
        assert!(conductor.is_active(keep));
        assert_eq!(lines(&conductor.poll(secs(6))), vec!["kept"]);
    }

    #[test]
    fn test_cancel_unknown_timeline_is_noop() {
        let mut conductor: Conductor<(), ()> = Conductor::new();
        assert_eq!(conductor.cancel(TimelineId::new()), 0);
    }

    #[test]
    fn test_pending_mandatory_tracks_progress() {
        let mut conductor: Conductor<(), ()> = Conductor::new();
        let id = conductor
            .launch(
                Timeline::new("scene")
                    .at(secs(1), TimedAction::wait(secs(1)))
                    .at(secs(3), TimedAction::speak("tail")),
                secs(0),
            )
            .unwrap();
        assert!(conductor.has_pending_mandatory(id));
        conductor.poll(secs(1));
        assert!(!conductor.has_pending_mandatory(id));
        assert!(conductor.is_active(id));
    }
}
