// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sound clips for the presentation.
//!
//! With the "audio" feature the clips are decoded and played through rodio.
//! Without it, a stub logs a warning once and stays silent.

pub use engine::SoundBoard;

#[cfg(feature = "audio")]
mod engine {
    use christmas_core::SoundProvider;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    /// Plays clips from the assets directory
    pub struct SoundBoard {
        /// Output stream (must be kept alive)
        _stream: Option<OutputStream>,
        stream_handle: Option<OutputStreamHandle>,
        assets_path: PathBuf,
    }

    impl SoundBoard {
        /// Open the default output device
        pub fn new(assets_path: &Path) -> Self {
            let (stream, stream_handle) = match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    tracing::info!("Audio output initialized");
                    (Some(stream), Some(handle))
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize audio: {}. Sounds will be skipped.", e);
                    (None, None)
                }
            };

            Self {
                _stream: stream,
                stream_handle,
                assets_path: assets_path.to_path_buf(),
            }
        }

        fn resolve_clip_path(&self, clip: &str) -> Option<PathBuf> {
            let clip_path = PathBuf::from(clip);
            if clip_path.is_absolute() && clip_path.exists() {
                return Some(clip_path);
            }
            let full_path = self.assets_path.join(&clip_path);
            full_path.exists().then_some(full_path)
        }
    }

    impl SoundProvider for SoundBoard {
        fn play(&mut self, clip: &str) {
            let Some(stream_handle) = &self.stream_handle else {
                return;
            };
            let Some(clip_path) = self.resolve_clip_path(clip) else {
                tracing::warn!("Audio clip not found: {}", clip);
                return;
            };

            let file = match File::open(&clip_path) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!("Failed to open audio file {:?}: {}", clip_path, e);
                    return;
                }
            };
            let source = match Decoder::new(BufReader::new(file)) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to decode audio file {:?}: {}", clip_path, e);
                    return;
                }
            };
            let sink = match Sink::try_new(stream_handle) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to create audio sink: {}", e);
                    return;
                }
            };

            sink.append(source);
            // Clips are fire-and-forget
            sink.detach();
            tracing::debug!("Playing clip {}", clip);
        }
    }
}

#[cfg(not(feature = "audio"))]
mod engine {
    use christmas_core::SoundProvider;
    use std::path::Path;

    /// Sound board stub (no audio support)
    pub struct SoundBoard {
        warned: bool,
    }

    impl SoundBoard {
        /// Create the stub
        pub fn new(_assets_path: &Path) -> Self {
            tracing::info!("Sound board: stub implementation (audio feature not enabled)");
            Self { warned: false }
        }

        fn warn_once(&mut self) {
            if !self.warned {
                tracing::warn!("Audio playback not available: compile with --features audio");
                self.warned = true;
            }
        }
    }

    impl SoundProvider for SoundBoard {
        fn play(&mut self, clip: &str) {
            self.warn_once();
            tracing::debug!("Skipping clip {}", clip);
        }
    }
}
