// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless stand-ins for the 3D view, speech and overlay.
//!
//! The renderer keeps a node arena instead of talking to a GPU. Its
//! snapshot draws a flat, deterministic picture of what is attached and
//! visible, with transparent pixels wherever the background should show.

use christmas_core::{
    Animation, AssetMissing, AssetPreloader, CameraPose, Control, Decoration, NodeHandle,
    NodeTransform, Overlay, SceneRenderer, SpeechProvider, TextStyle, Visibility,
};
use futures::future::{self, BoxFuture, FutureExt};
use image::{DynamicImage, Rgba, RgbaImage};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;

/// Asset name to the names of the nodes it contains
pub type Catalog = Arc<IndexMap<String, Vec<String>>>;

const TREE_GREEN: Rgba<u8> = Rgba([24, 110, 48, 255]);
const TRUNK_BROWN: Rgba<u8> = Rgba([96, 60, 28, 255]);
const ORNAMENT_RED: Rgba<u8> = Rgba([200, 24, 32, 255]);
const PRESENT_GOLD: Rgba<u8> = Rgba([220, 180, 40, 255]);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    asset: Option<String>,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    /// Attached to the scene root
    attached: bool,
    opacity: f32,
    transform: NodeTransform,
}

impl Node {
    fn new(name: impl Into<String>, asset: Option<&str>) -> Self {
        Self {
            name: name.into(),
            asset: asset.map(str::to_string),
            parent: None,
            children: Vec::new(),
            attached: false,
            opacity: 1.0,
            transform: NodeTransform::default(),
        }
    }
}

/// Renderer that tracks nodes without drawing them
pub struct HeadlessRenderer {
    catalog: Catalog,
    nodes: IndexMap<NodeHandle, Node>,
    camera: CameraPose,
    particles: Vec<String>,
    size: (u32, u32),
}

impl HeadlessRenderer {
    /// Create a renderer over an asset catalogue
    pub fn new(catalog: Catalog, size: (u32, u32)) -> Self {
        Self {
            catalog,
            nodes: IndexMap::new(),
            camera: CameraPose::default(),
            particles: Vec::new(),
            size,
        }
    }

    fn insert(&mut self, node: Node) -> NodeHandle {
        let handle = NodeHandle::new();
        self.nodes.insert(handle, node);
        handle
    }

    fn name_of(&self, node: NodeHandle) -> &str {
        self.nodes.get(&node).map_or("<unknown>", |n| n.name.as_str())
    }

    /// Opaque and reachable from the scene root
    fn is_shown(&self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get(&handle) else {
            return false;
        };
        node.opacity > 0.0 && (node.attached || node.parent.is_some_and(|p| self.is_shown(p)))
    }

    fn visible(&self, name: &str) -> bool {
        self.nodes
            .iter()
            .any(|(handle, node)| node.name == name && self.is_shown(*handle))
    }

    fn clone_subtree(&mut self, node: NodeHandle, parent: Option<NodeHandle>) -> NodeHandle {
        let Some(original) = self.nodes.get(&node).cloned() else {
            tracing::warn!(?node, "Cloning an unknown node");
            return self.insert(Node::new("<unknown>", None));
        };
        let copy = self.insert(Node {
            parent,
            children: Vec::new(),
            attached: false,
            ..original.clone()
        });
        let children = original
            .children
            .iter()
            .map(|child| self.clone_subtree(*child, Some(copy)))
            .collect();
        if let Some(copy) = self.nodes.get_mut(&copy) {
            copy.children = children;
        }
        copy
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn load_node(&mut self, asset: &str, node: Option<&str>) -> Result<NodeHandle, AssetMissing> {
        let catalog = Arc::clone(&self.catalog);
        let names = catalog
            .get(asset)
            .ok_or_else(|| AssetMissing::new(asset, node))?;
        if let Some(name) = node {
            if !names.iter().any(|n| n == name) {
                return Err(AssetMissing::new(asset, node));
            }
        }

        let root = self.insert(Node::new(node.unwrap_or(asset), Some(asset)));
        let children = names
            .iter()
            .filter(|name| Some(name.as_str()) != node)
            .map(|name| {
                self.insert(Node {
                    parent: Some(root),
                    ..Node::new(name.as_str(), Some(asset))
                })
            })
            .collect();
        if let Some(root) = self.nodes.get_mut(&root) {
            root.children = children;
        }
        tracing::debug!(asset, node = node.unwrap_or("<root>"), "Loaded node");
        Ok(root)
    }

    fn child(&mut self, parent: NodeHandle, name: &str) -> Result<NodeHandle, AssetMissing> {
        let Some(node) = self.nodes.get(&parent) else {
            return Err(AssetMissing::new("<unknown>", Some(name)));
        };
        node.children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|c| c.name == name))
            .ok_or_else(|| {
                AssetMissing::new(node.asset.as_deref().unwrap_or(&node.name), Some(name))
            })
    }

    fn clone_node(&mut self, node: NodeHandle) -> NodeHandle {
        self.clone_subtree(node, None)
    }

    fn create_group(&mut self, name: &str) -> NodeHandle {
        self.insert(Node::new(name, None))
    }

    fn create_text(&mut self, text: &str, style: &TextStyle) -> NodeHandle {
        tracing::debug!(text, font = %style.font, size = style.size, "Text created");
        self.insert(Node::new(text, None))
    }

    fn add_node(&mut self, node: NodeHandle, parent: Option<NodeHandle>) {
        if let Some(parent) = parent {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.push(node);
            }
        }
        if let Some(node) = self.nodes.get_mut(&node) {
            node.parent = parent;
            node.attached = parent.is_none();
        }
    }

    fn remove_node(&mut self, node: NodeHandle) {
        tracing::debug!(node = self.name_of(node), "Node removed");
        if let Some(node) = self.nodes.get_mut(&node) {
            node.attached = false;
            node.parent = None;
        }
    }

    fn set_transform(&mut self, node: NodeHandle, transform: NodeTransform) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.transform = transform;
        }
    }

    fn set_opacity(&mut self, node: NodeHandle, opacity: f32) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn animate(&mut self, node: NodeHandle, animation: Animation, duration: Duration) {
        tracing::debug!(
            node = self.name_of(node),
            ?animation,
            ms = duration.as_millis() as u64,
            "Animating"
        );
        // Animations land on their end state immediately
        match animation {
            Animation::FadeIn => self.set_opacity(node, 1.0),
            Animation::FadeOut => self.set_opacity(node, 0.0),
            Animation::Rotate { axis, angle } => {
                if let Some(node) = self.nodes.get_mut(&node) {
                    for (euler, weight) in node.transform.euler.iter_mut().zip(axis) {
                        *euler += weight * angle;
                    }
                }
            }
        }
    }

    fn move_camera(&mut self, pose: CameraPose, duration: Duration) {
        tracing::debug!(?pose, ms = duration.as_millis() as u64, "Camera moving");
        self.camera = pose;
    }

    fn add_particles(&mut self, system: &str, _position: [f32; 3]) {
        tracing::debug!(system, "Particles started");
        self.particles.push(system.to_string());
    }

    fn snapshot(&mut self) -> DynamicImage {
        let (width, height) = self.size;
        let mut frame = RgbaImage::new(width, height);
        let (w, h) = (width as f32, height as f32);
        let at = |fx: f32, fy: f32| ((w * fx) as u32, (h * fy) as u32);

        if self.visible("ChristmasTree") {
            let (apex_x, apex_y) = (w / 2.0, h * 0.15);
            let base = h * 0.75;
            for y in (apex_y as u32)..(base as u32).min(height) {
                let half = (y as f32 - apex_y) / (base - apex_y) * w * 0.35;
                let from = (apex_x - half).max(0.0) as u32;
                let to = ((apex_x + half) as u32).min(width);
                for x in from..to {
                    frame.put_pixel(x, y, TREE_GREEN);
                }
            }
            fill(&mut frame, at(0.45, 0.75), at(0.55, 0.82), TRUNK_BROWN);
        }
        if self.visible(Decoration::Ornaments.node_name()) {
            for (fx, fy) in [(0.45, 0.4), (0.58, 0.52), (0.4, 0.62), (0.55, 0.68)] {
                let (x, y) = at(fx, fy);
                fill(&mut frame, (x, y), (x + 3, y + 3), ORNAMENT_RED);
            }
        }
        if self.visible(Decoration::Stand.node_name()) {
            fill(&mut frame, at(0.4, 0.82), at(0.6, 0.86), TRUNK_BROWN);
        }
        if self.visible(Decoration::Presents.node_name()) {
            fill(&mut frame, at(0.62, 0.78), at(0.75, 0.86), PRESENT_GOLD);
        }

        tracing::debug!(
            width,
            height,
            camera = ?self.camera.position,
            particles = self.particles.len(),
            "Snapshot rendered"
        );
        DynamicImage::ImageRgba8(frame)
    }
}

fn fill(frame: &mut RgbaImage, (x0, y0): (u32, u32), (x1, y1): (u32, u32), color: Rgba<u8>) {
    for y in y0..y1.min(frame.height()) {
        for x in x0..x1.min(frame.width()) {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Preloader that checks every asset against the catalogue
pub struct CatalogPreloader {
    catalog: Catalog,
}

impl CatalogPreloader {
    /// Create over the renderer's catalogue
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

impl AssetPreloader for CatalogPreloader {
    fn preload(&self, assets: &[String]) -> BoxFuture<'static, bool> {
        let missing: Vec<_> = assets
            .iter()
            .filter(|asset| !self.catalog.contains_key(asset.as_str()))
            .collect();
        for asset in &missing {
            tracing::error!("Asset not in catalogue: {}", asset);
        }
        if missing.is_empty() {
            tracing::info!(count = assets.len(), "Assets preloaded");
        }
        future::ready(missing.is_empty()).boxed()
    }
}

/// Speech that goes to the log
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechProvider for LogSpeech {
    fn speak(&mut self, text: &str, rate: f32) {
        tracing::info!(rate, "Speaking: {}", text);
    }
}

/// Overlay that logs control changes
#[derive(Debug, Default)]
pub struct LogOverlay;

impl Overlay for LogOverlay {
    fn fade(&mut self, control: Control, visibility: Visibility, duration: Duration) {
        tracing::info!(?control, ?visibility, ms = duration.as_millis() as u64, "Control fade");
    }

    fn set_enabled(&mut self, control: Control, enabled: bool) {
        tracing::info!(?control, enabled, "Control enabled state");
    }

    fn reset_switch(&mut self, decoration: Decoration) {
        tracing::debug!(?decoration, "Switch reset");
    }

    fn set_background(&mut self, image: Option<&DynamicImage>) {
        match image {
            Some(image) => tracing::info!(
                width = image.width(),
                height = image.height(),
                "Background photo set"
            ),
            None => tracing::info!("Background cleared"),
        }
    }
}
