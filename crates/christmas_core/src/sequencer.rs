// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene sequencer: stages scenes, runs their timelines and routes input.
//!
//! The sequencer never sleeps and never blocks. Its owner feeds it the
//! clock time with every call:
//! - [`Sequencer::tick`] when [`Sequencer::next_deadline`] elapses
//! - [`Sequencer::handle`] for every user input
//! - [`Sequencer::complete`] when a future from [`Sequencer::take_pending`]
//!   resolves
//!
//! Scene hand-overs driven by a timeline are only honoured from the
//! timeline that currently owns the scene, so a cancelled or superseded
//! timeline can never move the presentation.

use crate::capture::CaptureResult;
use crate::choreography::{
    self, forest_slot, Cue, SceneTimeline, Target, DOOR_POSITION, FOREST_GRID, FOREST_ORIGIN,
    SNOW_ORIGIN, TREE_POSITION, TREE_SCALE,
};
use crate::composite::compose;
use crate::error::{Result, SequencerError};
use crate::identity::GreetingCopy;
use crate::providers::{Animation, NodeHandle, NodeTransform, Stage, TextStyle, Visibility};
use crate::scene::{Control, Decoration, Input, Scene, TreeVariant};
use crate::session::{Session, TreeRig};
use crate::settings::{secs, PresentationSettings};
use christmas_timeline::{ActionKind, Conductor, Fired, TimedAction, TimelineId};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Duration;

const TEXT_BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const TEXT_WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Result of asynchronous work started by the sequencer
#[derive(Debug)]
pub enum Completion {
    /// The camera finished a capture
    PhotoCaptured(CaptureResult),
}

/// Asynchronous work the owner must drive and report back
pub type PendingCompletion = BoxFuture<'static, Completion>;

/// What an input did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Not valid in the current state
    Ignored,
    /// Applied within the current scene
    Applied,
    /// The presentation moved to a new scene
    Entered(Scene),
    /// Accepted; the scene changes once a choreography or capture finishes
    Pending,
}

/// Drives the presentation through its scenes
pub struct Sequencer {
    stage: Stage,
    settings: Arc<PresentationSettings>,
    session: Session,
    timelines: Conductor<Target, Cue>,
    pending: Vec<PendingCompletion>,
}

impl Sequencer {
    /// Create a sequencer that has not started yet
    pub fn new(stage: Stage, settings: PresentationSettings) -> Self {
        Self {
            stage,
            settings: Arc::new(settings),
            session: Session::default(),
            timelines: Conductor::new(),
            pending: Vec::new(),
        }
    }

    /// Session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Presentation settings
    pub fn settings(&self) -> &PresentationSettings {
        &self.settings
    }

    /// Current scene, `None` before the start
    pub fn scene(&self) -> Option<Scene> {
        self.session.scene
    }

    /// The composite was shared
    pub fn is_finished(&self) -> bool {
        self.session.finished
    }

    /// Clock time at which [`Sequencer::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timelines.next_deadline()
    }

    /// Hand asynchronous work to the owner
    pub fn take_pending(&mut self) -> Vec<PendingCompletion> {
        std::mem::take(&mut self.pending)
    }

    /// Enter the first scene
    pub fn start(&mut self, greeting_name: Option<String>, now: Duration) -> Result<()> {
        if self.session.scene.is_some() {
            return Err(SequencerError::AlreadyStarted);
        }
        self.session.greeting_name = greeting_name.filter(|name| !name.trim().is_empty());
        tracing::info!(
            named = self.session.greeting_name.is_some(),
            "Presentation starting"
        );
        self.enter(Scene::Intro, now)?;
        self.tick(now)
    }

    /// Route a user input
    pub fn handle(&mut self, input: Input, now: Duration) -> Result<Handled> {
        let Some(scene) = self.session.scene else {
            tracing::debug!(?input, "Input before start ignored");
            return Ok(Handled::Ignored);
        };
        if self.session.finished {
            tracing::debug!(?input, "Input after share ignored");
            return Ok(Handled::Ignored);
        }
        if let Some(control) = input.control() {
            if !self.session.is_visible(control) {
                tracing::debug!(?input, ?control, "Control hidden, input ignored");
                return Ok(Handled::Ignored);
            }
        }
        if let Some(control) = input.enabling_control() {
            if !self.session.is_enabled(control) {
                tracing::debug!(?input, ?control, "Control disabled, input ignored");
                return Ok(Handled::Ignored);
            }
        }

        let next = scene.next(&input);
        let handled = match (scene, input) {
            (Scene::TreeCustomization, Input::SwitchToggled { tag, on }) => {
                self.toggle_switch(tag, on)?
            }
            (Scene::FinalShare, Input::Share) => self.share(),
            (_, input) if next == scene => {
                tracing::debug!(?input, scene = scene.name(), "No transition for input");
                Handled::Ignored
            }
            (Scene::Intro, _) => self.open_door(now)?,
            (Scene::Greeting, _) => {
                self.skip_greeting();
                self.enter(next, now)?
            }
            (Scene::ForestReveal, Input::TreeChosen(tag)) => {
                self.announce_tree(tag);
                self.enter(next, now)?
            }
            (Scene::CapturePhoto, _) => self.press_shutter(),
            _ => self.enter(next, now)?,
        };

        self.tick(now)?;
        Ok(handled)
    }

    /// Report finished asynchronous work
    pub fn complete(&mut self, completion: Completion, now: Duration) -> Result<()> {
        match completion {
            Completion::PhotoCaptured(result) => self.photo_captured(result, now)?,
        }
        self.tick(now)
    }

    /// Dispatch every action due by `now`
    pub fn tick(&mut self, now: Duration) -> Result<()> {
        loop {
            let fired = self.timelines.poll(now);
            if fired.is_empty() {
                return Ok(());
            }
            for action in fired {
                self.dispatch(action, now)?;
            }
        }
    }

    fn enter(&mut self, scene: Scene, now: Duration) -> Result<Handled> {
        if !scene.is_sub_flow() && self.session.has_visited(scene) {
            tracing::warn!(scene = scene.name(), "Scene already played, not entering again");
            return Ok(Handled::Ignored);
        }

        tracing::info!(scene = scene.name(), "Entering scene");
        let timeline = match scene {
            Scene::Intro => self.stage_intro()?,
            Scene::Greeting => self.stage_greeting(),
            Scene::ForestReveal => self.stage_forest()?,
            Scene::TreeCustomization => self.stage_tree()?,
            Scene::CapturePhoto => self.stage_capture(),
            Scene::FinalShare => self.stage_final_share(),
        };

        self.session.scene = Some(scene);
        self.session.visited.push(scene);
        self.session.scene_timeline = Some(self.timelines.launch(timeline, now)?);
        Ok(Handled::Entered(scene))
    }

    fn add_text(&mut self, text: &str, style: &TextStyle) -> NodeHandle {
        let renderer = self.stage.renderer.as_mut();
        let node = renderer.create_text(text, style);
        renderer.set_opacity(node, 0.0);
        renderer.add_node(node, None);
        node
    }

    fn stage_intro(&mut self) -> Result<SceneTimeline> {
        let settings = Arc::clone(&self.settings);
        let assets = &settings.assets;
        let renderer = self.stage.renderer.as_mut();

        let door = renderer.load_node(&assets.door, None)?;
        let leaf = renderer.child(door, &assets.door_node)?;
        renderer.set_transform(door, NodeTransform::at(DOOR_POSITION));
        renderer.set_opacity(door, 0.0);
        renderer.add_node(door, None);
        renderer.add_particles(&assets.snow_particles, SNOW_ORIGIN);

        self.session.door = Some(leaf);
        Ok(choreography::intro(&settings.timing, door))
    }

    fn open_door(&mut self, now: Duration) -> Result<Handled> {
        if self.session.door_opening {
            tracing::debug!("Door already opening");
            return Ok(Handled::Ignored);
        }
        let door = self.session.door.ok_or(SequencerError::NodeNotStaged("door"))?;

        let assets = &self.settings.assets;
        let timeline = choreography::door_opening(
            &self.settings.timing,
            &assets.knock_sound,
            &assets.squeak_sound,
            door,
        );
        self.session.door_opening = true;
        self.session.scene_timeline = Some(self.timelines.launch(timeline, now)?);
        tracing::info!("Door tapped");
        Ok(Handled::Pending)
    }

    fn stage_greeting(&mut self) -> SceneTimeline {
        let settings = Arc::clone(&self.settings);
        let script = &settings.script;
        let copy = GreetingCopy::new(script, self.session.greeting_name.as_deref());

        let title = self.add_text(
            &copy.text,
            &TextStyle {
                font: script.greeting_font.clone(),
                size: copy.size,
                color: TEXT_BLUE,
            },
        );
        let body = TextStyle {
            font: script.body_font.clone(),
            size: script.info_size,
            color: TEXT_BLUE,
        };
        let lines: Vec<_> = script
            .info_lines
            .iter()
            .map(|line| (self.add_text(&line.text, &body), line.clone()))
            .collect();

        self.session.greeting_texts = std::iter::once(title)
            .chain(lines.iter().map(|(node, _)| *node))
            .collect();
        choreography::greeting(&settings.timing, &copy.text, title, &lines)
    }

    fn skip_greeting(&mut self) {
        if let Some(id) = self.session.scene_timeline.take() {
            let dropped = self.timelines.cancel(id);
            tracing::info!(dropped, "Greeting skipped");
        }
        for text in self.session.greeting_texts.drain(..) {
            self.stage.renderer.remove_node(text);
        }
    }

    fn stage_forest(&mut self) -> Result<SceneTimeline> {
        let settings = Arc::clone(&self.settings);
        let assets = &settings.assets;
        let renderer = self.stage.renderer.as_mut();

        let template = renderer.load_node(&assets.snowy_tree, Some(&assets.snowy_tree_node))?;
        let forest = renderer.create_group("Forest");
        renderer.set_transform(forest, NodeTransform::at(FOREST_ORIGIN));
        renderer.add_node(forest, None);
        for row in 0..FOREST_GRID {
            for col in 0..FOREST_GRID {
                let tree = renderer.clone_node(template);
                renderer.set_transform(tree, NodeTransform::at(forest_slot(row, col)));
                renderer.add_node(tree, Some(forest));
            }
        }

        self.session.forest = Some(forest);
        Ok(choreography::forest_reveal(&settings.timing))
    }

    fn announce_tree(&mut self, tag: u8) {
        let Some(variant) = TreeVariant::from_tag(tag) else {
            tracing::warn!(tag, "Unrecognized tree choice");
            return;
        };
        tracing::info!(?variant, "Tree chosen");
        self.session.tree_variant = Some(variant);
        let script = &self.settings.script;
        self.stage
            .speech
            .speak(script.tree_phrase(variant), script.speech_rate);
    }

    fn stage_tree(&mut self) -> Result<SceneTimeline> {
        let settings = Arc::clone(&self.settings);
        let assets = &settings.assets;

        for decoration in Decoration::ALL {
            self.stage.overlay.reset_switch(decoration);
        }
        self.session.switches = [false; 3];
        self.set_enabled(Control::ContinueButton, false);

        let renderer = self.stage.renderer.as_mut();
        let tree = renderer.load_node(&assets.christmas_tree, Some(&assets.christmas_tree_node))?;
        let mut decorations = [tree; 3];
        for decoration in Decoration::ALL {
            let node = renderer.child(tree, decoration.node_name())?;
            renderer.set_opacity(node, 0.0);
            decorations[decoration.index()] = node;
        }
        renderer.set_transform(tree, NodeTransform::at(TREE_POSITION).scaled(TREE_SCALE));
        renderer.set_opacity(tree, 0.0);
        renderer.add_node(tree, None);

        self.session.tree = Some(TreeRig { tree, decorations });
        Ok(choreography::tree_customization(
            &settings.timing,
            self.session.forest,
            tree,
        ))
    }

    fn toggle_switch(&mut self, tag: u8, on: bool) -> Result<Handled> {
        let Some(decoration) = Decoration::from_tag(tag) else {
            tracing::warn!(tag, "Unrecognized decoration switch");
            return Ok(Handled::Ignored);
        };
        let rig = self
            .session
            .tree
            .ok_or(SequencerError::NodeNotStaged("christmas tree"))?;

        self.session.switches[decoration.index()] = on;
        let animation = if on {
            Animation::FadeIn
        } else {
            Animation::FadeOut
        };
        self.stage.renderer.animate(
            rig.node(decoration),
            animation,
            secs(self.settings.timing.switch_fade),
        );
        tracing::debug!(?decoration, on, "Decoration toggled");
        Ok(Handled::Applied)
    }

    fn stage_capture(&mut self) -> SceneTimeline {
        self.session.background = None;
        self.stage.overlay.set_background(None);
        self.session.capture.begin(self.stage.camera.as_mut());
        choreography::change_background(&self.settings.timing)
    }

    fn press_shutter(&mut self) -> Handled {
        match self.session.capture.shutter(self.stage.camera.as_mut()) {
            Some(capture) => {
                self.pending
                    .push(capture.map(Completion::PhotoCaptured).boxed());
                Handled::Pending
            }
            None => Handled::Ignored,
        }
    }

    fn photo_captured(&mut self, result: CaptureResult, now: Duration) -> Result<()> {
        if self.session.scene != Some(Scene::CapturePhoto) {
            tracing::warn!("Photo arrived outside the capture scene");
            return Ok(());
        }
        if !self.session.capture.complete(result) {
            return Ok(());
        }

        let photo = self.session.capture.take_photo();
        self.stage.overlay.set_background(photo.as_ref());
        self.set_enabled(Control::ContinueButton, true);
        tracing::info!(
            with_photo = photo.is_some(),
            "Returning to tree customization"
        );
        self.session.background = photo;

        self.session.scene = Some(Scene::TreeCustomization);
        let timeline = choreography::return_from_capture(&self.settings.timing);
        self.session.scene_timeline = Some(self.timelines.launch(timeline, now)?);
        Ok(())
    }

    fn stage_final_share(&mut self) -> SceneTimeline {
        let settings = Arc::clone(&self.settings);
        let script = &settings.script;
        let closing = self.add_text(
            &script.closing_text,
            &TextStyle {
                font: script.body_font.clone(),
                size: script.closing_size,
                color: TEXT_WHITE,
            },
        );
        choreography::final_share(&settings.timing, closing)
    }

    fn export_composite(&mut self) {
        let snapshot = self.stage.renderer.snapshot();
        let composite = compose(self.session.background.as_ref(), &snapshot);
        tracing::info!(
            width = composite.width(),
            height = composite.height(),
            with_background = self.session.background.is_some(),
            "Composite exported"
        );
        self.session.composite = Some(composite);
    }

    fn share(&mut self) -> Handled {
        let Some(composite) = self.session.composite.take() else {
            tracing::warn!("Share requested before the composite was ready");
            return Handled::Ignored;
        };
        tracing::info!("Sharing composite");
        self.stage.share.share(composite);
        self.session.finished = true;
        Handled::Applied
    }

    fn dispatch(&mut self, fired: Fired<Target, Cue>, now: Duration) -> Result<()> {
        let Fired {
            timeline, action, ..
        } = fired;
        tracing::trace!(
            kind = action.kind.label(),
            target = ?action.target,
            "Dispatching action"
        );

        let duration = action.duration;
        match (action.kind, action.target) {
            (ActionKind::FadeIn, Some(target)) => self.fade(target, Visibility::Shown, duration),
            (ActionKind::FadeOut, Some(target)) => self.fade(target, Visibility::Hidden, duration),
            (ActionKind::FadeIn | ActionKind::FadeOut, None) => {
                tracing::warn!("Fade without a target");
            }
            (ActionKind::Speak(text), _) => {
                self.stage
                    .speech
                    .speak(&text, self.settings.script.speech_rate);
            }
            (ActionKind::PlaySound(clip), _) => self.stage.sound.play(&clip),
            (ActionKind::Wait, _) => {}
            (ActionKind::Custom(cue), target) => {
                self.run_cue(cue, target, duration, timeline, now)?;
            }
        }
        Ok(())
    }

    fn set_enabled(&mut self, control: Control, enabled: bool) {
        if enabled {
            self.session.disabled.remove(&control);
        } else {
            self.session.disabled.insert(control);
        }
        self.stage.overlay.set_enabled(control, enabled);
    }

    fn fade(&mut self, target: Target, visibility: Visibility, duration: Duration) {
        match target {
            Target::Node(node) => {
                let animation = match visibility {
                    Visibility::Shown => Animation::FadeIn,
                    Visibility::Hidden => Animation::FadeOut,
                };
                self.stage.renderer.animate(node, animation, duration);
            }
            Target::Control(control) => {
                match visibility {
                    Visibility::Shown => self.session.visible.insert(control),
                    Visibility::Hidden => self.session.visible.remove(&control),
                };
                self.stage.overlay.fade(control, visibility, duration);
            }
        }
    }

    fn run_cue(
        &mut self,
        cue: Cue,
        target: Option<Target>,
        duration: Duration,
        timeline: TimelineId,
        now: Duration,
    ) -> Result<()> {
        match (cue, target) {
            (Cue::MoveCamera(pose), _) => self.stage.renderer.move_camera(pose, duration),
            (Cue::Rotate { axis, angle }, Some(Target::Node(node))) => {
                self.stage
                    .renderer
                    .animate(node, Animation::Rotate { axis, angle }, duration);
            }
            (Cue::RemoveNode, Some(Target::Node(node))) => {
                self.stage.renderer.remove_node(node);
                if self.session.door == Some(node) {
                    self.session.door = None;
                }
                if self.session.forest == Some(node) {
                    self.session.forest = None;
                }
            }
            (Cue::Rotate { .. } | Cue::RemoveNode, target) => {
                tracing::warn!(?target, "Node cue without a node target");
            }
            (Cue::Enter(scene), _) => self.hand_over(scene, timeline, now)?,
            (Cue::ExportComposite, _) => self.export_composite(),
            (Cue::StopPreview, _) => {
                self.session.capture.finish(self.stage.camera.as_mut());
            }
        }
        Ok(())
    }

    /// Timeline-driven scene change. Only the owning timeline may hand
    /// over, and only once its mandatory actions fired.
    fn hand_over(&mut self, scene: Scene, timeline: TimelineId, now: Duration) -> Result<()> {
        if self.session.scene_timeline != Some(timeline) {
            tracing::debug!(scene = scene.name(), "Stale hand-over ignored");
            return Ok(());
        }

        if let Some(owner) = self.timelines.timeline_mut(timeline) {
            if owner.has_pending_mandatory() {
                let last = owner
                    .actions()
                    .last()
                    .map_or(Duration::ZERO, |action| action.offset);
                owner.schedule(last, TimedAction::custom(Cue::Enter(scene)))?;
                tracing::debug!(scene = scene.name(), "Hand-over deferred");
                return Ok(());
            }
        }

        self.enter(scene, now).map(|_| ())
    }
}
