// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scenes, user inputs and the transition table between them.

use serde::{Deserialize, Serialize};

/// One stage of the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    /// Snowfall and a closed door waiting for a tap
    Intro,
    /// Personalised greeting and the two information lines
    Greeting,
    /// Camera rises over a snowy forest; the user picks a tree
    ForestReveal,
    /// The chosen tree with decoration switches
    TreeCustomization,
    /// Live camera preview for a background photo
    CapturePhoto,
    /// Closing text and sharing of the composite
    FinalShare,
}

impl Scene {
    /// Every scene in presentation order
    pub const ALL: [Scene; 6] = [
        Scene::Intro,
        Scene::Greeting,
        Scene::ForestReveal,
        Scene::TreeCustomization,
        Scene::CapturePhoto,
        Scene::FinalShare,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Scene::Intro => "Intro",
            Scene::Greeting => "Greeting",
            Scene::ForestReveal => "Forest Reveal",
            Scene::TreeCustomization => "Tree Customization",
            Scene::CapturePhoto => "Capture Photo",
            Scene::FinalShare => "Final Share",
        }
    }

    /// Scene the input leads to. Inputs with no transition from this
    /// scene return `self`.
    ///
    /// The table is total. Whether a transition happens immediately or
    /// after an asynchronous step (door choreography, photo capture) is up
    /// to the sequencer.
    pub fn next(self, input: &Input) -> Scene {
        match (self, input) {
            (Scene::Intro, Input::DoorTapped) => Scene::Greeting,
            (Scene::Greeting, Input::Skip) => Scene::ForestReveal,
            (Scene::ForestReveal, Input::TreeChosen(_)) => Scene::TreeCustomization,
            (Scene::TreeCustomization, Input::ChangeBackground) => Scene::CapturePhoto,
            (Scene::TreeCustomization, Input::Confirm) => Scene::FinalShare,
            (Scene::CapturePhoto, Input::Shutter) => Scene::TreeCustomization,
            (scene, _) => scene,
        }
    }

    /// Sub-flows return to the scene they came from and may repeat
    pub fn is_sub_flow(self) -> bool {
        self == Scene::CapturePhoto
    }
}

/// A user action delivered by the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// Tap anywhere on the intro door
    DoorTapped,
    /// Tree choice button with its tag (1 spruce, 2 fir, 3 pine)
    TreeChosen(u8),
    /// Decoration switch with its tag (1 ornaments, 2 stand, 3 presents)
    SwitchToggled {
        /// Switch tag
        tag: u8,
        /// New switch position
        on: bool,
    },
    /// "Change background" button
    ChangeBackground,
    /// Camera shutter button
    Shutter,
    /// "Continue" button
    Confirm,
    /// Share button
    Share,
    /// Skip the running greeting
    Skip,
}

impl Input {
    /// Control that must be visible for the input to be accepted
    pub fn control(&self) -> Option<Control> {
        match self {
            Input::DoorTapped => Some(Control::TapHint),
            Input::TreeChosen(_) => Some(Control::TreeChoice),
            Input::SwitchToggled { .. } | Input::ChangeBackground | Input::Confirm => {
                Some(Control::Customization)
            }
            Input::Shutter => Some(Control::CameraControls),
            Input::Share => Some(Control::ShareView),
            Input::Skip => None,
        }
    }

    /// Control that must also be enabled for the input to be accepted
    pub fn enabling_control(&self) -> Option<Control> {
        match self {
            Input::Confirm => Some(Control::ContinueButton),
            _ => None,
        }
    }
}

/// 2D control groups on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// "Tap the door" hint
    TapHint,
    /// The three tree choice buttons
    TreeChoice,
    /// Decoration switches, change-background and continue buttons
    Customization,
    /// Continue button, disabled until a photo was taken
    ContinueButton,
    /// Shutter and preview frame
    CameraControls,
    /// Share button
    ShareView,
}

/// Tree species offered in the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeVariant {
    /// Tag 1
    Spruce,
    /// Tag 2
    Fir,
    /// Tag 3
    Pine,
}

impl TreeVariant {
    /// Map a button tag to a species
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(TreeVariant::Spruce),
            2 => Some(TreeVariant::Fir),
            3 => Some(TreeVariant::Pine),
            _ => None,
        }
    }
}

/// Toggleable parts of the Christmas tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
    /// Baubles and lights, tag 1
    Ornaments,
    /// Tree stand, tag 2
    Stand,
    /// Presents under the tree, tag 3
    Presents,
}

impl Decoration {
    /// Every decoration, in switch order
    pub const ALL: [Decoration; 3] = [Decoration::Ornaments, Decoration::Stand, Decoration::Presents];

    /// Map a switch tag to a decoration
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Decoration::Ornaments),
            2 => Some(Decoration::Stand),
            3 => Some(Decoration::Presents),
            _ => None,
        }
    }

    /// Child node name inside the tree asset
    pub fn node_name(self) -> &'static str {
        match self {
            Decoration::Ornaments => "Decorations",
            Decoration::Stand => "Stand",
            Decoration::Presents => "Presents",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Decoration::Ornaments => 0,
            Decoration::Stand => 1,
            Decoration::Presents => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_inputs() -> Vec<Input> {
        vec![
            Input::DoorTapped,
            Input::TreeChosen(1),
            Input::TreeChosen(9),
            Input::SwitchToggled { tag: 1, on: true },
            Input::ChangeBackground,
            Input::Shutter,
            Input::Confirm,
            Input::Share,
            Input::Skip,
        ]
    }

    #[test]
    fn test_intro_only_follows_door() {
        for input in all_inputs() {
            let expected = if input == Input::DoorTapped {
                Scene::Greeting
            } else {
                Scene::Intro
            };
            assert_eq!(Scene::Intro.next(&input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_transitions_never_go_back_except_capture() {
        let order = |s: Scene| Scene::ALL.iter().position(|x| *x == s).unwrap_or(0);
        for scene in Scene::ALL {
            for input in all_inputs() {
                let next = scene.next(&input);
                if scene.is_sub_flow() {
                    assert!(next == scene || next == Scene::TreeCustomization);
                } else if next != Scene::CapturePhoto {
                    assert!(order(next) >= order(scene), "{scene:?} -> {next:?}");
                }
            }
        }
    }

    #[test]
    fn test_any_tree_tag_leaves_forest() {
        assert_eq!(
            Scene::ForestReveal.next(&Input::TreeChosen(42)),
            Scene::TreeCustomization
        );
    }

    #[test]
    fn test_toggles_and_share_stay_in_scene() {
        let toggle = Input::SwitchToggled { tag: 2, on: true };
        assert_eq!(Scene::TreeCustomization.next(&toggle), Scene::TreeCustomization);
        assert_eq!(Scene::FinalShare.next(&Input::Share), Scene::FinalShare);
    }

    #[test]
    fn test_confirm_needs_continue_button() {
        assert_eq!(Input::Confirm.control(), Some(Control::Customization));
        assert_eq!(Input::Confirm.enabling_control(), Some(Control::ContinueButton));
        assert_eq!(Input::ChangeBackground.enabling_control(), None);
    }

    #[test]
    fn test_tags() {
        assert_eq!(TreeVariant::from_tag(3), Some(TreeVariant::Pine));
        assert_eq!(TreeVariant::from_tag(0), None);
        assert_eq!(Decoration::from_tag(2), Some(Decoration::Stand));
        assert_eq!(Decoration::from_tag(4), None);
        assert_eq!(Decoration::Ornaments.node_name(), "Decorations");
    }
}
