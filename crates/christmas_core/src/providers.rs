// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interfaces of the external collaborators the sequencer drives.
//!
//! Everything behind these traits is a replaceable I/O provider: the 3D
//! engine, speech and sound, the still camera, the identity service, the
//! 2D overlay and the platform share mechanism.

use crate::scene::{Control, Decoration};
use futures::future::BoxFuture;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Typed handle to a node owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub Uuid);

impl NodeHandle {
    /// Create a new random node handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Position, rotation (euler angles, radians) and scale of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Euler angles (x, y, z)
    pub euler: [f32; 3],
    /// Scale (x, y, z)
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform moved to `position`
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set a uniform scale
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale = [factor; 3];
        self
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            euler: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// Camera placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Euler angles (x, y, z), radians
    pub euler: [f32; 3],
}

/// Node animation requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    /// Opacity to 1
    FadeIn,
    /// Opacity to 0
    FadeOut,
    /// Rotate by `angle` radians around `axis`
    Rotate {
        /// Rotation axis
        axis: [f32; 3],
        /// Angle in radians
        angle: f32,
    },
}

/// Font and colour of a 3D text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name
    pub font: String,
    /// Font size in scene units
    pub size: f32,
    /// RGBA colour
    pub color: [f32; 4],
}

/// Target visibility of an overlay control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Fully opaque and interactive
    Shown,
    /// Transparent and not interactive
    Hidden,
}

/// Camera flash mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlashMode {
    /// Never fire
    #[default]
    Off,
    /// Always fire
    On,
    /// Device decides
    Auto,
}

/// A node or asset the scene needs is absent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Asset missing: {asset} (node: {})", .node.as_deref().unwrap_or("<root>"))]
pub struct AssetMissing {
    /// Asset (scene file) name
    pub asset: String,
    /// Node looked up inside the asset, if any
    pub node: Option<String>,
}

impl AssetMissing {
    /// Create an asset-missing error
    pub fn new(asset: impl Into<String>, node: Option<&str>) -> Self {
        Self {
            asset: asset.into(),
            node: node.map(str::to_owned),
        }
    }
}

/// Errors reported by identity lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No account is signed in on the device
    #[error("No account available: {0}")]
    NoAccount(String),

    /// The user did not allow discovery of their name
    #[error("Permission to discover the user was not granted")]
    PermissionDenied,

    /// The directory failed to return user info
    #[error("Discovery failed: {0}")]
    Discovery(String),
}

/// Errors reported by the still camera
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// No capture device is present
    #[error("No capture device")]
    NoDevice,

    /// The device could not be locked for configuration
    #[error("Could not lock capture device for configuration: {0}")]
    ConfigurationLocked(String),

    /// The device has no flash or not the requested mode
    #[error("Flash mode not supported")]
    FlashUnsupported,

    /// The capture completed without a frame
    #[error("Capture returned no frame")]
    NoFrame,

    /// Any other capture failure
    #[error("Capture failed: {0}")]
    Failed(String),
}

/// Resolves the user's first name from an account service
pub trait IdentityProvider: Send + Sync {
    /// Look up the first name. Invoked at most once per session.
    fn resolve_first_name(&self) -> BoxFuture<'static, Result<String, IdentityError>>;
}

/// Device-local name source used when the identity lookup fails
pub trait LocalNameFallback: Send + Sync {
    /// Best guess at the device owner's first name
    fn best_effort_first_name(&self) -> Option<String>;
}

/// Preloads the 3D assets the scenes need
pub trait AssetPreloader {
    /// Preload the named assets. Resolves once with the overall outcome.
    fn preload(&self, assets: &[String]) -> BoxFuture<'static, bool>;
}

/// The 3D engine, as far as the scenes need it
pub trait SceneRenderer {
    /// Load an asset, or one named node inside it, as a detached node
    fn load_node(&mut self, asset: &str, node: Option<&str>) -> Result<NodeHandle, AssetMissing>;

    /// Handle to a direct child of `parent` by name
    fn child(&mut self, parent: NodeHandle, name: &str) -> Result<NodeHandle, AssetMissing>;

    /// Deep-copy a node
    fn clone_node(&mut self, node: NodeHandle) -> NodeHandle;

    /// Create an empty grouping node
    fn create_group(&mut self, name: &str) -> NodeHandle;

    /// Create a centred 3D text node
    fn create_text(&mut self, text: &str, style: &TextStyle) -> NodeHandle;

    /// Attach a node to `parent`, or to the scene root
    fn add_node(&mut self, node: NodeHandle, parent: Option<NodeHandle>);

    /// Detach a node from the scene
    fn remove_node(&mut self, node: NodeHandle);

    /// Set a node's transform immediately
    fn set_transform(&mut self, node: NodeHandle, transform: NodeTransform);

    /// Set a node's opacity immediately
    fn set_opacity(&mut self, node: NodeHandle, opacity: f32);

    /// Run an animation on a node
    fn animate(&mut self, node: NodeHandle, animation: Animation, duration: Duration);

    /// Move the camera over `duration`
    fn move_camera(&mut self, pose: CameraPose, duration: Duration);

    /// Start a named particle system at `position`
    fn add_particles(&mut self, system: &str, position: [f32; 3]);

    /// Render the current frame to an image
    fn snapshot(&mut self) -> DynamicImage;
}

/// Text-to-speech, queued by the provider
pub trait SpeechProvider {
    /// Speak `text` at `rate` (0 slowest, 1 fastest). Fire-and-forget.
    fn speak(&mut self, text: &str, rate: f32);
}

/// Short sound clips
pub trait SoundProvider {
    /// Play a named clip. Fire-and-forget.
    fn play(&mut self, clip: &str);
}

/// Still camera with a live preview
pub trait CameraProvider {
    /// Show the live preview
    fn start_preview(&mut self);

    /// Hide the live preview
    fn stop_preview(&mut self);

    /// Whether the device has a flash supporting [`FlashMode::Auto`]
    fn supports_flash(&self) -> bool;

    /// Configure the flash. May fail if the device cannot be locked.
    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CaptureError>;

    /// Capture a still photo
    fn capture_photo(&mut self) -> BoxFuture<'static, Result<DynamicImage, CaptureError>>;
}

/// The 2D controls layered over the 3D view
pub trait Overlay {
    /// Animate a control to `visibility` over `duration`
    fn fade(&mut self, control: Control, visibility: Visibility, duration: Duration);

    /// Enable or disable a control
    fn set_enabled(&mut self, control: Control, enabled: bool);

    /// Turn a decoration switch off without animating
    fn reset_switch(&mut self, decoration: Decoration);

    /// Show `image` behind the 3D view, or clear it
    fn set_background(&mut self, image: Option<&DynamicImage>);
}

/// Platform share mechanism
pub trait ShareSink {
    /// Hand the artifact over. Nothing is reported back.
    fn share(&mut self, image: DynamicImage);
}

/// The collaborators a running sequence talks to
pub struct Stage {
    /// 3D engine
    pub renderer: Box<dyn SceneRenderer>,
    /// Speech synthesiser
    pub speech: Box<dyn SpeechProvider>,
    /// Sound effects
    pub sound: Box<dyn SoundProvider>,
    /// Still camera
    pub camera: Box<dyn CameraProvider>,
    /// 2D controls
    pub overlay: Box<dyn Overlay>,
    /// Share sheet
    pub share: Box<dyn ShareSink>,
}
