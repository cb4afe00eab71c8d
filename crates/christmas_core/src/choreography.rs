// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-scene timelines.
//!
//! Each function here only describes what happens when; the sequencer
//! stages the nodes beforehand and dispatches the actions as they come due.

use crate::providers::{CameraPose, NodeHandle};
use crate::scene::{Control, Scene};
use crate::settings::{secs, InfoLine, Timing};
use christmas_timeline::{TimedAction, Timeline};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};
use std::time::Duration;

/// What a timed action applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// A 3D node
    Node(NodeHandle),
    /// An overlay control
    Control(Control),
}

/// Scene-specific actions beyond fades, speech and sounds
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Move the camera over the action's duration
    MoveCamera(CameraPose),
    /// Rotate the target node over the action's duration
    Rotate {
        /// Rotation axis
        axis: [f32; 3],
        /// Angle in radians
        angle: f32,
    },
    /// Detach the target node
    RemoveNode,
    /// Hand over to the next scene
    Enter(Scene),
    /// Render the composite for sharing
    ExportComposite,
    /// Stop the camera preview after a capture
    StopPreview,
}

/// Action on a scene timeline
pub type SceneAction = TimedAction<Target, Cue>;

/// Timeline of scene actions
pub type SceneTimeline = Timeline<Target, Cue>;

/// Door position on the intro
pub const DOOR_POSITION: [f32; 3] = [-60.0, -45.0, -30.0];
/// Origin of the snowfall
pub const SNOW_ORIGIN: [f32; 3] = [0.0, 2.0, 20.0];
/// Centre of the forest
pub const FOREST_ORIGIN: [f32; 3] = [0.0, -45.0, -250.0];
/// Trees per forest row and column
pub const FOREST_GRID: u32 = 11;
/// Distance between forest trees
pub const FOREST_SPACING: f32 = 100.0;
/// Position of the Christmas tree
pub const TREE_POSITION: [f32; 3] = [-2.0, 6.0, -30.0];
/// Scale of the Christmas tree
pub const TREE_SCALE: f32 = 0.8;

/// Camera looking down on the forest
pub const FOREST_POSE: CameraPose = CameraPose {
    position: [0.0, 200.0, 100.0],
    euler: [-FRAC_PI_6, 0.0, 0.0],
};

/// Camera facing the Christmas tree
pub const TREE_POSE: CameraPose = CameraPose {
    position: [0.0, 0.0, 25.0],
    euler: [0.0, 0.0, 0.0],
};

/// Position of forest tree `(row, col)` inside the forest group
pub fn forest_slot(row: u32, col: u32) -> [f32; 3] {
    let half = (FOREST_GRID - 1) as f32 / 2.0 * FOREST_SPACING;
    [
        -half + col as f32 * FOREST_SPACING,
        0.0,
        -half + row as f32 * FOREST_SPACING,
    ]
}

fn fade_in(target: Target, duration: Duration) -> SceneAction {
    TimedAction::fade_in(target, duration)
}

fn fade_out(target: Target, duration: Duration) -> SceneAction {
    TimedAction::fade_out(target, duration)
}

/// Door fades in, tap hint follows
pub fn intro(timing: &Timing, door: NodeHandle) -> SceneTimeline {
    Timeline::new("intro")
        .at(Duration::ZERO, fade_in(Target::Node(door), secs(timing.door_fade_in)))
        .at(
            secs(timing.tap_hint_delay),
            fade_in(Target::Control(Control::TapHint), secs(timing.tap_hint_fade)),
        )
}

/// Knock, squeak, swing open, fade away, then the greeting
pub fn door_opening(timing: &Timing, knock: &str, squeak: &str, door: NodeHandle) -> SceneTimeline {
    let squeak_at = secs(timing.door_squeak_at);
    let enter_at = secs(timing.greeting_at);

    let rotate = TimedAction::custom(Cue::Rotate {
        axis: [0.0, 1.0, 0.0],
        angle: FRAC_PI_2,
    })
    .on(Target::Node(door))
    .lasting(secs(timing.door_swing));
    let remove = TimedAction::custom(Cue::RemoveNode).on(Target::Node(door));

    Timeline::new("door")
        .at(Duration::ZERO, TimedAction::play_sound(knock))
        .at(
            Duration::ZERO,
            fade_out(Target::Control(Control::TapHint), secs(timing.tap_hint_fade)),
        )
        .at(squeak_at, TimedAction::play_sound(squeak))
        .at(squeak_at, rotate)
        .at(
            secs(timing.door_fade_out_at),
            fade_out(Target::Node(door), secs(timing.door_fade_out)),
        )
        .at(enter_at, remove)
        .at(enter_at, TimedAction::custom(Cue::Enter(Scene::Greeting)))
}

/// Greeting, information lines and their speech, then the forest.
///
/// `lines` pairs each information line with its text node.
pub fn greeting(
    timing: &Timing,
    spoken_greeting: &str,
    title: NodeHandle,
    lines: &[(NodeHandle, InfoLine)],
) -> SceneTimeline {
    let fade = secs(timing.text_fade);
    let mut timeline = Timeline::new("greeting")
        .at(Duration::ZERO, fade_in(Target::Node(title), fade))
        .at(
            secs(timing.greeting_speech_at),
            TimedAction::speak(spoken_greeting),
        )
        .at(
            fade + secs(timing.text_hold),
            fade_out(Target::Node(title), fade),
        );

    for ((text, line), offset) in lines.iter().zip(&timing.info_line_offsets) {
        let at = secs(*offset);
        timeline = timeline
            .at(at, fade_in(Target::Node(*text), fade))
            .at(at, TimedAction::speak(line.spoken.as_str()))
            .at(at + fade + secs(timing.info_hold), fade_out(Target::Node(*text), fade));
    }

    timeline.at(
        secs(timing.greeting_duration),
        TimedAction::custom(Cue::Enter(Scene::ForestReveal)),
    )
}

/// Camera rises over the forest, tree choice appears
pub fn forest_reveal(timing: &Timing) -> SceneTimeline {
    Timeline::new("forest")
        .at(
            Duration::ZERO,
            TimedAction::custom(Cue::MoveCamera(FOREST_POSE)).lasting(secs(timing.camera_move)),
        )
        .at(
            secs(timing.choice_reveal_delay),
            fade_in(Target::Control(Control::TreeChoice), secs(timing.choice_fade)),
        )
}

/// Forest gives way to the Christmas tree and its switches
pub fn tree_customization(
    timing: &Timing,
    forest: Option<NodeHandle>,
    tree: NodeHandle,
) -> SceneTimeline {
    let mut timeline = Timeline::new("customization")
        .at(
            Duration::ZERO,
            fade_out(Target::Control(Control::TreeChoice), secs(timing.choice_fade)),
        )
        .at(
            Duration::ZERO,
            TimedAction::custom(Cue::MoveCamera(TREE_POSE)).lasting(secs(timing.camera_move)),
        );

    if let Some(forest) = forest {
        let remove = TimedAction::custom(Cue::RemoveNode).on(Target::Node(forest));
        timeline = timeline
            .at(
                Duration::ZERO,
                fade_out(Target::Node(forest), secs(timing.forest_fade)),
            )
            .at(secs(timing.forest_fade), remove);
    }

    timeline
        .at(
            secs(timing.customization_reveal_delay),
            fade_in(
                Target::Control(Control::Customization),
                secs(timing.customization_fade),
            ),
        )
        .at(
            secs(timing.tree_reveal_delay),
            fade_in(Target::Node(tree), secs(timing.tree_fade)),
        )
}

/// Customization panel gives way to the camera controls
pub fn change_background(timing: &Timing) -> SceneTimeline {
    Timeline::new("capture")
        .at(
            Duration::ZERO,
            fade_out(Target::Control(Control::Customization), secs(timing.panel_fade)),
        )
        .at(
            secs(timing.camera_controls_delay),
            fade_in(
                Target::Control(Control::CameraControls),
                secs(timing.camera_controls_fade),
            ),
        )
}

/// Camera controls give way to the customization panel again. The preview
/// stops before the panel is back.
pub fn return_from_capture(timing: &Timing) -> SceneTimeline {
    let back_at = secs(timing.camera_controls_delay);
    Timeline::new("capture-return")
        .at(
            Duration::ZERO,
            fade_out(
                Target::Control(Control::CameraControls),
                secs(timing.camera_controls_fade),
            ),
        )
        .at(back_at, TimedAction::custom(Cue::StopPreview))
        .at(
            back_at,
            fade_in(Target::Control(Control::Customization), secs(timing.panel_fade)),
        )
}

/// Closing text, composite export, share button
pub fn final_share(timing: &Timing, closing: NodeHandle) -> SceneTimeline {
    let export_at = secs(timing.export_at);
    Timeline::new("share")
        .at(
            Duration::ZERO,
            fade_out(Target::Control(Control::Customization), secs(timing.panel_fade)),
        )
        .at(
            secs(timing.closing_reveal_delay),
            fade_in(Target::Node(closing), secs(timing.closing_fade)),
        )
        .at(export_at, TimedAction::custom(Cue::ExportComposite))
        .at(
            export_at,
            fade_in(Target::Control(Control::ShareView), secs(timing.share_reveal)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use christmas_timeline::ActionKind;

    fn offsets_of<F>(timeline: &SceneTimeline, pick: F) -> Vec<f32>
    where
        F: Fn(&SceneAction) -> bool,
    {
        timeline
            .actions()
            .iter()
            .filter(|a| pick(a))
            .map(|a| a.offset.as_secs_f32())
            .collect()
    }

    #[test]
    fn test_forest_grid_is_centred() {
        assert_eq!(forest_slot(0, 0), [-500.0, 0.0, -500.0]);
        assert_eq!(forest_slot(5, 5), [0.0, 0.0, 0.0]);
        assert_eq!(forest_slot(10, 3), [-200.0, 0.0, 500.0]);
    }

    #[test]
    fn test_greeting_speech_schedule() {
        let timing = Timing::default();
        let lines = vec![
            (NodeHandle::new(), InfoLine { text: "a".into(), spoken: "text 1".into() }),
            (NodeHandle::new(), InfoLine { text: "b".into(), spoken: "text 2".into() }),
        ];
        let timeline = greeting(&timing, "Merry Christmas", NodeHandle::new(), &lines);

        let speech = offsets_of(&timeline, |a| matches!(a.kind, ActionKind::Speak(_)));
        assert_eq!(speech, vec![0.0, 4.0, 9.0]);

        let last = timeline.actions().last().unwrap();
        assert_eq!(last.kind, ActionKind::Custom(Cue::Enter(Scene::ForestReveal)));
        assert_eq!(last.offset, Duration::from_secs(13));
    }

    #[test]
    fn test_door_enters_greeting_last() {
        let timeline = door_opening(&Timing::default(), "knock", "squeak", NodeHandle::new());
        let last = timeline.actions().last().unwrap();
        assert_eq!(last.kind, ActionKind::Custom(Cue::Enter(Scene::Greeting)));
        assert_eq!(last.offset, Duration::from_millis(2750));

        let sounds = offsets_of(&timeline, |a| matches!(a.kind, ActionKind::PlaySound(_)));
        assert_eq!(sounds, vec![0.0, 1.5]);
    }

    #[test]
    fn test_forest_removed_after_fade() {
        let forest = NodeHandle::new();
        let timeline = tree_customization(&Timing::default(), Some(forest), NodeHandle::new());
        let removal = offsets_of(&timeline, |a| {
            a.kind == ActionKind::Custom(Cue::RemoveNode) && a.target == Some(Target::Node(forest))
        });
        assert_eq!(removal, vec![1.0]);
    }

    #[test]
    fn test_preview_stops_before_panel_returns() {
        let timeline = return_from_capture(&Timing::default());
        let kinds: Vec<_> = timeline
            .actions()
            .iter()
            .filter(|a| a.offset == Duration::from_millis(250))
            .map(|a| a.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Custom(Cue::StopPreview), ActionKind::FadeIn]
        );
    }

    #[test]
    fn test_share_view_follows_export() {
        let timeline = final_share(&Timing::default(), NodeHandle::new());
        let kinds: Vec<_> = timeline
            .actions()
            .iter()
            .filter(|a| a.offset == Duration::from_secs(1))
            .map(|a| a.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Custom(Cue::ExportComposite), ActionKind::FadeIn]
        );
    }
}
