// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replays scripted inputs in place of a user.

use crate::config::ScriptedInput;
use christmas_core::settings::secs;
use christmas_core::Input;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Send each input at its time after `origin`. The channel closes once the
/// script is done.
pub fn spawn(
    script: Vec<ScriptedInput>,
    origin: Instant,
    inputs: mpsc::UnboundedSender<Input>,
) -> JoinHandle<usize> {
    if script.is_empty() {
        tracing::warn!("Autopilot script is empty, the presentation will stop at the intro");
    }
    tokio::spawn(async move {
        let mut sent = 0;
        for step in script {
            tokio::time::sleep_until(origin + secs(step.at)).await;
            tracing::debug!(at = step.at, input = ?step.input, "Autopilot input");
            if inputs.send(step.input).is_err() {
                tracing::debug!("Presentation stopped listening");
                break;
            }
            sent += 1;
        }
        sent
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_inputs_arrive_on_time() {
        let origin = Instant::now();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = vec![
            ScriptedInput {
                at: 1.0,
                input: Input::DoorTapped,
            },
            ScriptedInput {
                at: 2.5,
                input: Input::Skip,
            },
        ];
        let handle = spawn(script, origin, tx);

        assert_eq!(rx.recv().await, Some(Input::DoorTapped));
        assert!(origin.elapsed() >= Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(Input::Skip));
        assert!(origin.elapsed() >= Duration::from_millis(2500));
        assert_eq!(rx.recv().await, None);
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_time_does_not_panic() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let script = vec![ScriptedInput {
            at: f32::NAN,
            input: Input::DoorTapped,
        }];
        let handle = spawn(script, Instant::now(), tx);
        assert_eq!(rx.recv().await, Some(Input::DoorTapped));
        assert_eq!(handle.await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_drops() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let script = vec![ScriptedInput {
            at: 0.5,
            input: Input::Share,
        }];
        assert_eq!(spawn(script, Instant::now(), tx).await.unwrap(), 0);
    }
}
