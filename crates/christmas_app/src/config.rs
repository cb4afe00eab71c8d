// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shell configuration: where assets and photos live, where results go,
//! and the scripted inputs that stand in for a user.

use christmas_core::{Input, MAX_TIMING_SECS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current shell config format version
pub const SHELL_FORMAT_VERSION: u32 = 1;

/// Default shell config file name
pub const SHELL_FILE_NAME: &str = "shell.ron";

/// Errors from loading the shell config
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this format
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// An autopilot step has an unusable time
    #[error("Autopilot step {index} has an out-of-range time: {at}")]
    InvalidInputTime {
        /// Position in the script
        index: usize,
        /// Time in the file
        at: f32,
    },

    /// The file was written by a newer version
    #[error("Unsupported shell config version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version understood
        supported: u32,
    },
}

/// One input sent at a fixed time after launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Seconds after launch
    pub at: f32,
    /// Input to send
    pub input: Input,
}

impl ScriptedInput {
    fn new(at: f32, input: Input) -> Self {
        Self { at, input }
    }
}

/// Shell settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Format version
    pub version: u32,
    /// Directory holding sound clips
    pub assets_dir: PathBuf,
    /// Asset name to the nodes it contains
    pub catalog: IndexMap<String, Vec<String>>,
    /// Size of the rendered frame, width then height
    pub snapshot_size: [u32; 2],
    /// Image returned by the camera, `None` for no camera
    pub camera_photo: Option<PathBuf>,
    /// Where the shared composite and the run report go
    pub output_dir: PathBuf,
    /// Device name used to guess the owner's first name
    pub device_name: Option<String>,
    /// Inputs to replay
    pub autopilot: Vec<ScriptedInput>,
}

impl Default for ShellConfig {
    fn default() -> Self {
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
            version: SHELL_FORMAT_VERSION,
            assets_dir: PathBuf::from("assets"),
            catalog,
            snapshot_size: [360, 640],
            camera_photo: None,
            output_dir: PathBuf::from("out"),
            device_name: None,
            autopilot: default_autopilot(),
        }
    }
}

/// A complete walk through every scene
fn default_autopilot() -> Vec<ScriptedInput> {
    vec![
        ScriptedInput::new(1.0, Input::DoorTapped),
        ScriptedInput::new(17.5, Input::TreeChosen(1)),
        ScriptedInput::new(19.0, Input::SwitchToggled { tag: 1, on: true }),
        ScriptedInput::new(19.5, Input::SwitchToggled { tag: 2, on: true }),
        ScriptedInput::new(20.0, Input::SwitchToggled { tag: 3, on: true }),
        ScriptedInput::new(21.0, Input::ChangeBackground),
        ScriptedInput::new(22.0, Input::Shutter),
        ScriptedInput::new(23.0, Input::Confirm),
        ScriptedInput::new(25.0, Input::Share),
    ]
}

impl ShellConfig {
    /// Parse from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: ShellConfig = ron::from_str(content)?;
        if config.version > SHELL_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: SHELL_FORMAT_VERSION,
            });
        }
        if let Some((index, step)) = config
            .autopilot
            .iter()
            .enumerate()
            .find(|(_, step)| !(0.0..=MAX_TIMING_SECS).contains(&step.at))
        {
            return Err(ConfigError::InvalidInputTime {
                index,
                at: step.at,
            });
        }
        Ok(config)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No shell config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded shell config from {}", path.display());
        Ok(config)
    }

    /// Autopilot inputs in send order
    pub fn sorted_autopilot(&self) -> Vec<ScriptedInput> {
        let mut script = self.autopilot.clone();
        script.sort_by(|a, b| a.at.total_cmp(&b.at));
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ShellConfig::from_ron(
            r#"(
                output_dir: "/tmp/greeting",
                autopilot: [
                    (at: 3.0, input: Share),
                    (at: 1.0, input: DoorTapped),
                    (at: 2.0, input: SwitchToggled(tag: 2, on: true)),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/greeting"));
        assert_eq!(config.snapshot_size, [360, 640]);
        assert_eq!(config.catalog["door"], vec!["WoodenDoor".to_string()]);

        let order: Vec<_> = config.sorted_autopilot().into_iter().map(|s| s.input).collect();
        assert_eq!(
            order,
            vec![
                Input::DoorTapped,
                Input::SwitchToggled { tag: 2, on: true },
                Input::Share,
            ]
        );
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = ShellConfig::from_ron("(version: 9)");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn test_unusable_input_time_rejected() {
        let result = ShellConfig::from_ron(
            "(autopilot: [(at: 1.0, input: DoorTapped), (at: inf, input: Share)])",
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidInputTime { index: 1, .. })
        ));
        assert!(ShellConfig::from_ron("(autopilot: [(at: -3.0, input: Share)])").is_err());
    }

    #[test]
    fn test_default_autopilot_ends_with_share() {
        let script = ShellConfig::default().sorted_autopilot();
        assert_eq!(script.first().map(|s| &s.input), Some(&Input::DoorTapped));
        assert_eq!(script.last().map(|s| &s.input), Some(&Input::Share));
    }
}
