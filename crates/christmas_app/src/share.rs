// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sharing writes the composite to disk; a JSON report records the run.

use crate::error::Result;
use christmas_core::{RunSummary, ShareSink};
use image::DynamicImage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the shared composite
pub const COMPOSITE_FILE_NAME: &str = "christmas-greeting.png";

/// File name of the run report
pub const REPORT_FILE_NAME: &str = "summary.json";

/// Saves shared images as PNG
pub struct PngShareSink {
    output_dir: PathBuf,
    saved: Arc<Mutex<Option<PathBuf>>>,
}

impl PngShareSink {
    /// Sink writing into `output_dir`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            saved: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle reporting where the composite was saved
    pub fn saved_path(&self) -> Arc<Mutex<Option<PathBuf>>> {
        Arc::clone(&self.saved)
    }
}

impl ShareSink for PngShareSink {
    fn share(&mut self, image: DynamicImage) {
        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            tracing::error!("Failed to create {}: {}", self.output_dir.display(), e);
            return;
        }
        let path = self.output_dir.join(COMPOSITE_FILE_NAME);
        match image.save(&path) {
            Ok(()) => {
                tracing::info!("Composite shared to {}", path.display());
                *self.saved.lock() = Some(path);
            }
            Err(e) => tracing::error!("Failed to save composite: {}", e),
        }
    }
}

/// What the run did, as written to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scene shown last
    pub final_scene: Option<String>,
    /// Name used in the greeting
    pub greeting_name: Option<String>,
    /// Whether the composite was shared
    pub shared: bool,
    /// Where the composite was written
    pub composite: Option<PathBuf>,
}

impl RunReport {
    /// Build from a run summary and the sink's saved path
    pub fn new(summary: &RunSummary, composite: Option<PathBuf>) -> Self {
        Self {
            final_scene: summary.final_scene.map(|s| s.name().to_string()),
            greeting_name: summary.greeting_name.clone(),
            shared: summary.shared,
            composite,
        }
    }

    /// Write as pretty JSON into `output_dir`
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(REPORT_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Run report written to {}", path.display());
        Ok(path)
    }
}
