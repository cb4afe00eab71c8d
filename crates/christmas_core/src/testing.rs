// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording fakes for every collaborator.

use crate::capture::CaptureResult;
use crate::providers::{
    Animation, AssetMissing, AssetPreloader, CameraPose, CameraProvider, CaptureError, FlashMode,
    IdentityError, IdentityProvider, LocalNameFallback, NodeHandle, NodeTransform, Overlay,
    SceneRenderer, ShareSink, SoundProvider, SpeechProvider, Stage, TextStyle, Visibility,
};
use crate::scene::{Control, Decoration};
use futures::future::{self, BoxFuture, FutureExt};
use image::{DynamicImage, Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Observable side effect of a collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Added(String),
    Removed(String),
    Animated(String, Animation),
    Camera(CameraPose),
    Particles(String),
    Text(String, f32),
    Snapshot,
    Spoke(String),
    Played(String),
    Faded(Control, Visibility),
    Enabled(Control, bool),
    SwitchReset(Decoration),
    Background(Option<(u32, u32)>),
    Shared(u32, u32),
    PreviewStarted,
    PreviewStopped,
    FlashSet(FlashMode),
    PhotoRequested,
}

#[derive(Default)]
struct Recorded {
    calls: Vec<Call>,
    names: HashMap<NodeHandle, String>,
    opacity: HashMap<NodeHandle, f32>,
    shared: Vec<DynamicImage>,
}

/// Shared log every fake writes to
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.inner.lock().calls.push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.inner.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Spoke(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn name(&self, node: NodeHandle) -> String {
        self.inner.lock().names.get(&node).cloned().unwrap_or_default()
    }

    pub fn nodes_named(&self, name: &str) -> Vec<NodeHandle> {
        self.inner
            .lock()
            .names
            .iter()
            .filter(|(_, n)| *n == name)
            .map(|(handle, _)| *handle)
            .collect()
    }

    pub fn opacity_of(&self, name: &str) -> Option<f32> {
        let inner = self.inner.lock();
        inner
            .names
            .iter()
            .find(|(_, n)| *n == name)
            .and_then(|(handle, _)| inner.opacity.get(handle).copied())
    }

    pub fn shared(&self) -> Vec<DynamicImage> {
        self.inner.lock().shared.clone()
    }

    fn name_node(&self, name: &str) -> NodeHandle {
        let node = NodeHandle::new();
        self.inner.lock().names.insert(node, name.to_string());
        node
    }
}

/// Solid opaque test image
pub fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    let [r, g, b] = color;
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
}

/// Renderer keeping node names and opacity
pub struct FakeRenderer {
    recorder: Recorder,
    catalog: HashMap<String, Vec<String>>,
    snapshot_size: (u32, u32),
}

impl FakeRenderer {
    pub fn new(recorder: &Recorder) -> Self {
        let catalog = [
            ("door", vec!["WoodenDoor"]),
            ("snowy_tree", vec!["SnowyTree"]),
            (
                "christmas_tree",
                vec!["ChristmasTree", "Decorations", "Stand", "Presents"],
            ),
        ]
        .into_iter()
        .map(|(asset, nodes)| {
            (
                asset.to_string(),
                nodes.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        Self {
            recorder: recorder.clone(),
            catalog,
            snapshot_size: (30, 60),
        }
    }

    pub fn without(mut self, asset: &str) -> Self {
        self.catalog.remove(asset);
        self
    }

    fn known_node(&self, name: &str) -> bool {
        self.catalog.values().flatten().any(|n| n == name)
    }
}

impl SceneRenderer for FakeRenderer {
    fn load_node(&mut self, asset: &str, node: Option<&str>) -> Result<NodeHandle, AssetMissing> {
        let nodes = self
            .catalog
            .get(asset)
            .ok_or_else(|| AssetMissing::new(asset, node))?;
        match node {
            Some(name) if !nodes.iter().any(|n| n == name) => Err(AssetMissing::new(asset, node)),
            Some(name) => Ok(self.recorder.name_node(name)),
            None => Ok(self.recorder.name_node(asset)),
        }
    }

    fn child(&mut self, parent: NodeHandle, name: &str) -> Result<NodeHandle, AssetMissing> {
        if !self.known_node(name) {
            return Err(AssetMissing::new(self.recorder.name(parent), Some(name)));
        }
        Ok(self.recorder.name_node(name))
    }

    fn clone_node(&mut self, node: NodeHandle) -> NodeHandle {
        let name = self.recorder.name(node);
        self.recorder.name_node(&name)
    }

    fn create_group(&mut self, name: &str) -> NodeHandle {
        self.recorder.name_node(name)
    }

    fn create_text(&mut self, text: &str, style: &TextStyle) -> NodeHandle {
        self.recorder.push(Call::Text(text.to_string(), style.size));
        self.recorder.name_node(text)
    }

    fn add_node(&mut self, node: NodeHandle, _parent: Option<NodeHandle>) {
        let name = self.recorder.name(node);
        self.recorder.push(Call::Added(name));
    }

    fn remove_node(&mut self, node: NodeHandle) {
        let name = self.recorder.name(node);
        self.recorder.push(Call::Removed(name));
    }

    fn set_transform(&mut self, _node: NodeHandle, _transform: NodeTransform) {}

    fn set_opacity(&mut self, node: NodeHandle, opacity: f32) {
        self.recorder.inner.lock().opacity.insert(node, opacity);
    }

    fn animate(&mut self, node: NodeHandle, animation: Animation, _duration: Duration) {
        let name = self.recorder.name(node);
        match animation {
            Animation::FadeIn => self.set_opacity(node, 1.0),
            Animation::FadeOut => self.set_opacity(node, 0.0),
            Animation::Rotate { .. } => {}
        }
        self.recorder.push(Call::Animated(name, animation));
    }

    fn move_camera(&mut self, pose: CameraPose, _duration: Duration) {
        self.recorder.push(Call::Camera(pose));
    }

    fn add_particles(&mut self, system: &str, _position: [f32; 3]) {
        self.recorder.push(Call::Particles(system.to_string()));
    }

    fn snapshot(&mut self) -> DynamicImage {
        self.recorder.push(Call::Snapshot);
        let (width, height) = self.snapshot_size;
        solid(width, height, [0, 128, 0])
    }
}

pub struct FakeSpeech(Recorder);

impl SpeechProvider for FakeSpeech {
    fn speak(&mut self, text: &str, _rate: f32) {
        self.0.push(Call::Spoke(text.to_string()));
    }
}

pub struct FakeSound(Recorder);

impl SoundProvider for FakeSound {
    fn play(&mut self, clip: &str) {
        self.0.push(Call::Played(clip.to_string()));
    }
}

pub struct FakeOverlay(Recorder);

impl Overlay for FakeOverlay {
    fn fade(&mut self, control: Control, visibility: Visibility, _duration: Duration) {
        self.0.push(Call::Faded(control, visibility));
    }

    fn set_enabled(&mut self, control: Control, enabled: bool) {
        self.0.push(Call::Enabled(control, enabled));
    }

    fn reset_switch(&mut self, decoration: Decoration) {
        self.0.push(Call::SwitchReset(decoration));
    }

    fn set_background(&mut self, image: Option<&DynamicImage>) {
        self.0
            .push(Call::Background(image.map(|i| (i.width(), i.height()))));
    }
}

pub struct FakeShare(Recorder);

impl ShareSink for FakeShare {
    fn share(&mut self, image: DynamicImage) {
        self.0.push(Call::Shared(image.width(), image.height()));
        self.0.inner.lock().shared.push(image);
    }
}

/// Camera returning a fixed outcome
pub struct FakeCamera {
    recorder: Recorder,
    flash: Option<Result<(), CaptureError>>,
    outcome: CaptureResult,
}

impl FakeCamera {
    pub fn new(recorder: &Recorder) -> Self {
        Self {
            recorder: recorder.clone(),
            flash: None,
            outcome: Ok(solid(40, 80, [200, 0, 0])),
        }
    }

    pub fn with_flash(mut self, result: Result<(), CaptureError>) -> Self {
        self.flash = Some(result);
        self
    }

    pub fn failing(mut self, error: CaptureError) -> Self {
        self.outcome = Err(error);
        self
    }
}

impl CameraProvider for FakeCamera {
    fn start_preview(&mut self) {
        self.recorder.push(Call::PreviewStarted);
    }

    fn stop_preview(&mut self) {
        self.recorder.push(Call::PreviewStopped);
    }

    fn supports_flash(&self) -> bool {
        self.flash.is_some()
    }

    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CaptureError> {
        self.recorder.push(Call::FlashSet(mode));
        self.flash.clone().unwrap_or(Err(CaptureError::FlashUnsupported))
    }

    fn capture_photo(&mut self) -> BoxFuture<'static, CaptureResult> {
        self.recorder.push(Call::PhotoRequested);
        future::ready(self.outcome.clone()).boxed()
    }
}

/// Stage wired to fakes that all report to `recorder`
pub fn stage(recorder: &Recorder) -> Stage {
    stage_with(recorder, FakeRenderer::new(recorder), FakeCamera::new(recorder))
}

/// Stage with a specific renderer and camera
pub fn stage_with(recorder: &Recorder, renderer: FakeRenderer, camera: FakeCamera) -> Stage {
    Stage {
        renderer: Box::new(renderer),
        speech: Box::new(FakeSpeech(recorder.clone())),
        sound: Box::new(FakeSound(recorder.clone())),
        camera: Box::new(camera),
        overlay: Box::new(FakeOverlay(recorder.clone())),
        share: Box::new(FakeShare(recorder.clone())),
    }
}

/// Identity service with a canned answer
pub struct StaticIdentity(pub Result<String, IdentityError>);

impl IdentityProvider for StaticIdentity {
    fn resolve_first_name(&self) -> BoxFuture<'static, Result<String, IdentityError>> {
        future::ready(self.0.clone()).boxed()
    }
}

/// Local fallback with a canned answer
pub struct StaticName(pub Option<String>);

impl LocalNameFallback for StaticName {
    fn best_effort_first_name(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Preloader that resolves after `delay` with `outcome`
pub struct DelayedPreloader {
    pub delay: Duration,
    pub outcome: bool,
}

impl AssetPreloader for DelayedPreloader {
    fn preload(&self, _assets: &[String]) -> BoxFuture<'static, bool> {
        let (delay, outcome) = (self.delay, self.outcome);
        async move {
            tokio::time::sleep(delay).await;
            outcome
        }
        .boxed()
    }
}
