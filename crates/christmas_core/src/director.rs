// SPDX-License-Identifier: MIT OR Apache-2.0
//! Async driver for a [`Sequencer`].
//!
//! The director resolves the greeting name and preloads assets
//! concurrently, starts the presentation once both are done, then
//! multiplexes user input, capture results and timeline deadlines until
//! the composite was shared.

use crate::error::Result;
use crate::gate::{ReadinessGate, ReadinessSource};
use crate::identity::resolve_greeting_name;
use crate::providers::{AssetPreloader, IdentityProvider, LocalNameFallback};
use crate::scene::{Input, Scene};
use crate::sequencer::{PendingCompletion, Sequencer};
use christmas_timeline::Clock;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Clock backed by the tokio timer, so paused test runtimes work
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    /// Clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Scene shown last, `None` if the presentation never started
    pub final_scene: Option<Scene>,
    /// Name used in the greeting
    pub greeting_name: Option<String>,
    /// The composite was shared
    pub shared: bool,
}

enum Startup {
    Name(Option<String>),
    Preloaded(bool),
}

/// Owns a sequencer and its asynchronous collaborators
pub struct Director {
    sequencer: Sequencer,
    identity: Arc<dyn IdentityProvider>,
    fallback: Arc<dyn LocalNameFallback>,
    preloader: Box<dyn AssetPreloader>,
    clock: Arc<dyn Clock>,
}

impl Director {
    /// Create a director
    pub fn new(
        sequencer: Sequencer,
        identity: Arc<dyn IdentityProvider>,
        fallback: Arc<dyn LocalNameFallback>,
        preloader: Box<dyn AssetPreloader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sequencer,
            identity,
            fallback,
            preloader,
            clock,
        }
    }

    /// Run until the composite is shared, or until input ends and nothing
    /// is left to play.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<Input>) -> Result<RunSummary> {
        let gate = ReadinessGate::new();
        gate.register_source(ReadinessSource::Identity);
        gate.register_source(ReadinessSource::Assets);
        let ready = Arc::new(AtomicBool::new(false));
        let opened = Arc::clone(&ready);
        gate.on_ready(move || opened.store(true, Ordering::SeqCst));

        let mut startup: FuturesUnordered<BoxFuture<'static, Startup>> = FuturesUnordered::new();
        let identity = Arc::clone(&self.identity);
        let fallback = Arc::clone(&self.fallback);
        startup.push(
            async move {
                Startup::Name(resolve_greeting_name(identity.as_ref(), fallback.as_ref()).await)
            }
            .boxed(),
        );
        let assets = self.sequencer.settings().assets.preload_list();
        startup.push(self.preloader.preload(&assets).map(Startup::Preloaded).boxed());

        let mut greeting_name = None;
        let mut captures: FuturesUnordered<PendingCompletion> = FuturesUnordered::new();
        let mut inputs_open = true;

        loop {
            let wait = self
                .sequencer
                .next_deadline()
                .map(|deadline| deadline.saturating_sub(self.clock.now()));

            tokio::select! {
                Some(step) = startup.next(), if !startup.is_empty() => {
                    match step {
                        Startup::Name(name) => {
                            greeting_name = name;
                            gate.mark_ready(&ReadinessSource::Identity);
                        }
                        Startup::Preloaded(true) => gate.mark_ready(&ReadinessSource::Assets),
                        Startup::Preloaded(false) => {
                            tracing::error!("Asset preload failed, presentation cannot start");
                        }
                    }
                    if ready.load(Ordering::SeqCst) && self.sequencer.scene().is_none() {
                        self.sequencer.start(greeting_name.clone(), self.clock.now())?;
                    }
                }
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => {
                        let handled = self.sequencer.handle(input.clone(), self.clock.now())?;
                        tracing::debug!(?input, ?handled, "Input handled");
                    }
                    None => {
                        tracing::debug!("Input closed");
                        inputs_open = false;
                    }
                },
                Some(completion) = captures.next(), if !captures.is_empty() => {
                    self.sequencer.complete(completion, self.clock.now())?;
                }
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {
                    self.sequencer.tick(self.clock.now())?;
                }
                else => break,
            }

            captures.extend(self.sequencer.take_pending());
            if self.sequencer.is_finished()
                && self.sequencer.next_deadline().is_none()
                && captures.is_empty()
            {
                break;
            }
        }

        let summary = RunSummary {
            final_scene: self.sequencer.scene(),
            greeting_name: self.sequencer.session().greeting_name().map(str::to_string),
            shared: self.sequencer.is_finished(),
        };
        tracing::info!(
            final_scene = summary.final_scene.map(Scene::name),
            shared = summary.shared,
            "Presentation ended"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::IdentityError;
    use crate::settings::PresentationSettings;
    use crate::testing::{stage, Call, DelayedPreloader, Recorder, StaticIdentity, StaticName};

    fn director(recorder: &Recorder, preloaded: bool) -> Director {
        Director::new(
            Sequencer::new(stage(recorder), PresentationSettings::default()),
            Arc::new(StaticIdentity(Err(IdentityError::PermissionDenied))),
            Arc::new(StaticName(Some("Anna".to_string()))),
            Box::new(DelayedPreloader {
                delay: Duration::from_secs(2),
                outcome: preloaded,
            }),
            Arc::new(TokioClock::new()),
        )
    }

    fn send_at(script: Vec<(f32, Input)>) -> mpsc::UnboundedReceiver<Input> {
        let (tx, rx) = mpsc::unbounded_channel();
        let origin = Instant::now();
        tokio::spawn(async move {
            for (at, input) in script {
                tokio::time::sleep_until(origin + Duration::from_secs_f32(at)).await;
                if tx.send(input).is_err() {
                    return;
                }
            }
        });
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_presentation() {
        let recorder = Recorder::new();
        let inputs = send_at(vec![
            (1.0, Input::DoorTapped),
            (3.0, Input::DoorTapped),
            (20.0, Input::TreeChosen(1)),
            (22.0, Input::SwitchToggled { tag: 3, on: true }),
            (23.0, Input::ChangeBackground),
            (24.0, Input::Shutter),
            (25.0, Input::Confirm),
            (27.0, Input::Share),
        ]);

        let summary = director(&recorder, true).run(inputs).await.unwrap();

        assert_eq!(summary.final_scene, Some(Scene::FinalShare));
        assert_eq!(summary.greeting_name.as_deref(), Some("Anna"));
        assert!(summary.shared);
        assert_eq!(recorder.shared().len(), 1);
        assert_eq!(recorder.count(&Call::Played("knock.aif".to_string())), 1);
        assert_eq!(
            recorder.spoken().first().map(String::as_str),
            Some("Merry Christmas, Anna")
        );
        assert_eq!(recorder.opacity_of("Presents"), Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_preload_never_starts() {
        let recorder = Recorder::new();
        let inputs = send_at(vec![(3.0, Input::DoorTapped), (5.0, Input::Skip)]);

        let summary = director(&recorder, false).run(inputs).await.unwrap();

        assert_eq!(summary.final_scene, None);
        assert!(!summary.shared);
        assert!(recorder.calls().is_empty());
    }
}
