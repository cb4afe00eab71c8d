// SPDX-License-Identifier: MIT OR Apache-2.0
//! State of one running presentation.

use crate::capture::{CaptureFlow, CaptureState};
use crate::providers::NodeHandle;
use crate::scene::{Control, Decoration, Scene, TreeVariant};
use christmas_timeline::TimelineId;
use image::DynamicImage;
use std::collections::HashSet;

/// Handles of the staged Christmas tree and its toggleable parts
#[derive(Debug, Clone, Copy)]
pub struct TreeRig {
    /// The tree itself
    pub tree: NodeHandle,
    /// Decoration nodes, in [`Decoration::ALL`] order
    pub decorations: [NodeHandle; 3],
}

impl TreeRig {
    /// Node of one decoration
    pub fn node(&self, decoration: Decoration) -> NodeHandle {
        self.decorations[decoration.index()]
    }
}

/// Everything the sequencer remembers between inputs
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) scene: Option<Scene>,
    pub(crate) visited: Vec<Scene>,
    /// Timeline allowed to hand the current scene over
    pub(crate) scene_timeline: Option<TimelineId>,
    pub(crate) greeting_name: Option<String>,
    pub(crate) door: Option<NodeHandle>,
    pub(crate) door_opening: bool,
    pub(crate) greeting_texts: Vec<NodeHandle>,
    pub(crate) forest: Option<NodeHandle>,
    pub(crate) tree: Option<TreeRig>,
    pub(crate) tree_variant: Option<TreeVariant>,
    pub(crate) switches: [bool; 3],
    pub(crate) visible: HashSet<Control>,
    /// Controls explicitly disabled; everything else is enabled
    pub(crate) disabled: HashSet<Control>,
    pub(crate) capture: CaptureFlow,
    pub(crate) background: Option<DynamicImage>,
    pub(crate) composite: Option<DynamicImage>,
    pub(crate) finished: bool,
}

impl Session {
    /// Current scene, `None` before the start
    pub fn scene(&self) -> Option<Scene> {
        self.scene
    }

    /// Scenes entered so far, in order
    pub fn visited(&self) -> &[Scene] {
        &self.visited
    }

    /// Name used in the greeting
    pub fn greeting_name(&self) -> Option<&str> {
        self.greeting_name.as_deref()
    }

    /// Tree picked in the forest, if the tag was recognised
    pub fn tree_variant(&self) -> Option<TreeVariant> {
        self.tree_variant
    }

    /// Position of a decoration switch
    pub fn switch_on(&self, decoration: Decoration) -> bool {
        self.switches[decoration.index()]
    }

    /// Whether a control is shown and accepts input
    pub fn is_visible(&self, control: Control) -> bool {
        self.visible.contains(&control)
    }

    /// Whether a control accepts input when shown
    pub fn is_enabled(&self, control: Control) -> bool {
        !self.disabled.contains(&control)
    }

    /// Photo shown behind the tree
    pub fn background(&self) -> Option<&DynamicImage> {
        self.background.as_ref()
    }

    /// Exported composite not yet shared
    pub fn composite(&self) -> Option<&DynamicImage> {
        self.composite.as_ref()
    }

    /// Capture sub-flow state
    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    /// The composite was shared
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn has_visited(&self, scene: Scene) -> bool {
        self.visited.contains(&scene)
    }
}
