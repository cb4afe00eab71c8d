// SPDX-License-Identifier: MIT OR Apache-2.0
//! Christmas greeting - headless presentation shell
//!
//! Runs the whole greeting without a screen:
//! - Scenes are tracked in a node arena and rendered to a flat snapshot
//! - Speech and overlay changes go to the log
//! - The camera returns an image file, sharing writes a PNG
//! - A scripted autopilot plays the user
//!
//! ## Configuration
//!
//! `CHRISTMAS_SETTINGS` points at the presentation settings (default
//! `christmas.ron`), `CHRISTMAS_SHELL` at the shell config (default
//! `shell.ron`). Missing files fall back to defaults.

mod audio;
mod autopilot;
mod camera;
mod config;
mod error;
mod headless;
mod identity;
mod share;

use audio::SoundBoard;
use camera::FileCamera;
use christmas_core::{
    DeviceOwner, DirectoryIdentity, Director, PresentationSettings, RunSummary, Sequencer, Stage,
    TokioClock, SETTINGS_FILE_NAME,
};
use config::{ShellConfig, SHELL_FILE_NAME};
use error::Result;
use headless::{Catalog, CatalogPreloader, HeadlessRenderer, LogOverlay, LogSpeech};
use identity::EnvDirectory;
use share::{PngShareSink, RunReport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Presentation settings path variable
const SETTINGS_VAR: &str = "CHRISTMAS_SETTINGS";
/// Shell config path variable
const SHELL_VAR: &str = "CHRISTMAS_SHELL";

fn main() {
    let env_filter = ["christmas_app=debug", "christmas_core=debug", "christmas_timeline=info"]
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Christmas greeting v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("Presentation failed: {e}");
        std::process::exit(1);
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| PathBuf::from(default), PathBuf::from)
}

fn run() -> Result<()> {
    let settings =
        PresentationSettings::load_or_default(&env_path(SETTINGS_VAR, SETTINGS_FILE_NAME))?;
    let shell = ShellConfig::load_or_default(&env_path(SHELL_VAR, SHELL_FILE_NAME))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let share = PngShareSink::new(&shell.output_dir);
    let saved = share.saved_path();
    let summary = runtime.block_on(present(&shell, settings, share))?;

    if !summary.shared {
        tracing::warn!("Presentation ended before the greeting was shared");
    }
    let composite = saved.lock().clone();
    RunReport::new(&summary, composite).write(&shell.output_dir)?;
    Ok(())
}

async fn present(
    shell: &ShellConfig,
    settings: PresentationSettings,
    share: PngShareSink,
) -> Result<RunSummary> {
    let catalog: Catalog = Arc::new(shell.catalog.clone());
    let [width, height] = shell.snapshot_size;
    let stage = Stage {
        renderer: Box::new(HeadlessRenderer::new(Arc::clone(&catalog), (width, height))),
        speech: Box::new(LogSpeech),
        sound: Box::new(SoundBoard::new(&shell.assets_dir)),
        camera: Box::new(FileCamera::new(shell.camera_photo.clone())),
        overlay: Box::new(LogOverlay),
        share: Box::new(share),
    };

    let clock = TokioClock::new();
    let director = Director::new(
        Sequencer::new(stage, settings),
        Arc::new(DirectoryIdentity::new(EnvDirectory::from_env())),
        Arc::new(DeviceOwner::new(identity::device_name(shell.device_name.clone()))),
        Box::new(CatalogPreloader::new(catalog)),
        Arc::new(clock),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let pilot = autopilot::spawn(shell.sorted_autopilot(), tokio::time::Instant::now(), tx);
    let summary = director.run(rx).await;
    pilot.abort();
    summary.map_err(Into::into)
}
