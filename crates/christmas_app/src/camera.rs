// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera that "captures" an image file from disk.

use christmas_core::{CameraProvider, CaptureError, FlashMode};
use futures::future::{self, BoxFuture, FutureExt};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Returns the configured image file as the captured photo
pub struct FileCamera {
    photo: Option<PathBuf>,
    previewing: bool,
    flash: FlashMode,
}

impl FileCamera {
    /// Camera returning `photo`; `None` behaves like a device without a camera
    pub fn new(photo: Option<PathBuf>) -> Self {
        Self {
            photo,
            previewing: false,
            flash: FlashMode::default(),
        }
    }
}

impl CameraProvider for FileCamera {
    fn start_preview(&mut self) {
        self.previewing = true;
        tracing::info!("Camera preview started");
    }

    fn stop_preview(&mut self) {
        self.previewing = false;
        tracing::info!("Camera preview stopped");
    }

    fn supports_flash(&self) -> bool {
        self.photo.is_some()
    }

    fn set_flash(&mut self, mode: FlashMode) -> Result<(), CaptureError> {
        if self.photo.is_none() {
            return Err(CaptureError::FlashUnsupported);
        }
        self.flash = mode;
        tracing::debug!(?mode, "Flash configured");
        Ok(())
    }

    fn capture_photo(&mut self) -> BoxFuture<'static, Result<DynamicImage, CaptureError>> {
        if !self.previewing {
            tracing::warn!("Capture requested without a preview");
        }
        tracing::debug!(flash = ?self.flash, "Capturing photo");
        match self.photo.clone() {
            Some(path) => async move { load_photo(&path).await }.boxed(),
            None => future::ready(Err(CaptureError::NoDevice)).boxed(),
        }
    }
}

async fn load_photo(path: &Path) -> Result<DynamicImage, CaptureError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| CaptureError::Failed(format!("{}: {}", path.display(), e)))?;
    let photo =
        image::load_from_memory(&data).map_err(|e| CaptureError::Failed(e.to_string()))?;
    tracing::info!(
        width = photo.width(),
        height = photo.height(),
        "Photo captured from {}",
        path.display()
    );
    Ok(photo)
}
