// SPDX-License-Identifier: MIT OR Apache-2.0
//! Background photo capture sub-flow.

use crate::providers::{CameraProvider, CaptureError, FlashMode};
use futures::future::BoxFuture;
use image::DynamicImage;

/// Photo captured by the camera, or why there is none
pub type CaptureResult = Result<DynamicImage, CaptureError>;

/// Pending camera capture
pub type CaptureFuture = BoxFuture<'static, CaptureResult>;

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Camera off
    #[default]
    Idle,
    /// Live preview shown
    Previewing,
    /// Shutter pressed, waiting for the frame
    Capturing,
    /// Capture completed, with or without a photo
    Captured,
}

/// Drives the camera through preview, shutter and completion.
///
/// Calls out of order are logged and ignored.
#[derive(Debug, Default)]
pub struct CaptureFlow {
    state: CaptureState,
    photo: Option<DynamicImage>,
}

impl CaptureFlow {
    /// Create an idle capture flow
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Start the live preview
    pub fn begin(&mut self, camera: &mut dyn CameraProvider) -> bool {
        if self.state != CaptureState::Idle {
            tracing::warn!(state = ?self.state, "Preview requested while not idle");
            return false;
        }
        camera.start_preview();
        self.photo = None;
        self.state = CaptureState::Previewing;
        true
    }

    /// Configure the flash and request a still. Returns the pending capture.
    pub fn shutter(&mut self, camera: &mut dyn CameraProvider) -> Option<CaptureFuture> {
        if self.state != CaptureState::Previewing {
            tracing::warn!(state = ?self.state, "Shutter pressed while not previewing");
            return None;
        }

        if camera.supports_flash() {
            if let Err(e) = camera.set_flash(FlashMode::Auto) {
                tracing::warn!("Camera lock error: {}", e);
            }
        } else {
            tracing::debug!("Flash not supported");
        }

        self.state = CaptureState::Capturing;
        Some(camera.capture_photo())
    }

    /// Record the capture outcome. A failure leaves no photo.
    pub fn complete(&mut self, result: CaptureResult) -> bool {
        if self.state != CaptureState::Capturing {
            tracing::warn!(state = ?self.state, "Capture completed while not capturing");
            return false;
        }
        self.photo = match result {
            Ok(photo) => Some(photo),
            Err(e) => {
                tracing::warn!("Photo capture failed: {}", e);
                None
            }
        };
        self.state = CaptureState::Captured;
        true
    }

    /// Hand out the photo while the preview keeps running
    pub fn take_photo(&mut self) -> Option<DynamicImage> {
        if self.state != CaptureState::Captured {
            tracing::warn!(state = ?self.state, "Photo taken before the capture completed");
            return None;
        }
        self.photo.take()
    }

    /// Stop the preview and hand out the photo, if not taken yet
    pub fn finish(&mut self, camera: &mut dyn CameraProvider) -> Option<DynamicImage> {
        if self.state != CaptureState::Captured {
            tracing::warn!(state = ?self.state, "Capture finished before completing");
            return None;
        }
        camera.stop_preview();
        self.state = CaptureState::Idle;
        self.photo.take()
    }
}
