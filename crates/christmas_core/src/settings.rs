// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation settings: copy, timing and asset names.
//!
//! Loaded from a RON file so the greeting can be localised and retimed
//! without rebuilding. Every field has a default, so a partial file only
//! overrides what it names.

use crate::scene::TreeVariant;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "christmas.ron";

/// Longest offset or duration a timing value may hold, in seconds
pub const MAX_TIMING_SECS: f32 = 3600.0;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for these settings
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialisation failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// A timing value is not a usable number of seconds
    #[error("Timing '{field}' is out of range: {value}")]
    InvalidTiming {
        /// Offending field
        field: String,
        /// Value in the file
        value: f32,
    },

    /// The file was written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// A line of on-screen text with its spoken counterpart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoLine {
    /// Displayed text
    pub text: String,
    /// Text handed to speech synthesis
    pub spoken: String,
}

impl InfoLine {
    fn new(text: &str, spoken: &str) -> Self {
        Self {
            text: text.to_string(),
            spoken: spoken.to_string(),
        }
    }
}

/// Everything the presentation displays or says
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Greeting phrase, personalised as "{greeting}, {name}"
    pub greeting: String,
    /// Font of the greeting
    pub greeting_font: String,
    /// Greeting size when a name is appended
    pub greeting_size_named: f32,
    /// Greeting size without a name
    pub greeting_size_unnamed: f32,
    /// Font of every other text
    pub body_font: String,
    /// Size of the information lines
    pub info_size: f32,
    /// Information lines shown after the greeting
    pub info_lines: Vec<InfoLine>,
    /// Closing text in the final scene
    pub closing_text: String,
    /// Size of the closing text
    pub closing_size: f32,
    /// Phrase spoken after choosing the spruce
    pub spruce_choice: String,
    /// Phrase spoken after choosing the fir
    pub fir_choice: String,
    /// Phrase spoken after choosing the pine
    pub pine_choice: String,
    /// Speech rate, 0 slowest to 1 fastest
    pub speech_rate: f32,
}

impl Script {
    /// Phrase spoken for a chosen tree
    pub fn tree_phrase(&self, variant: TreeVariant) -> &str {
        match variant {
            TreeVariant::Spruce => &self.spruce_choice,
            TreeVariant::Fir => &self.fir_choice,
            TreeVariant::Pine => &self.pine_choice,
        }
    }
}

impl Default for Script {
    fn default() -> Self {
        Self {
            greeting: "Merry Christmas".to_string(),
            greeting_font: "FantasticPete".to_string(),
            greeting_size_named: 3.0,
            greeting_size_unnamed: 6.0,
            body_font: "Gunny Handwriting".to_string(),
            info_size: 2.0,
            info_lines: vec![
                InfoLine::new(
                    "This year, pick your own tree",
                    "This year, you can pick your own Christmas tree.",
                ),
                InfoLine::new(
                    "Decorate it and send it",
                    "Decorate it, put it anywhere you like and send it to your friends.",
                ),
            ],
            closing_text: "Happy holidays!".to_string(),
            closing_size: 2.5,
            spruce_choice: "A spruce. Classic and fragrant.".to_string(),
            fir_choice: "A fir. Its needles stay on the longest.".to_string(),
            pine_choice: "A pine. Tall and proud.".to_string(),
            speech_rate: 0.33,
        }
    }
}

/// Choreography timing, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Door fade-in on the intro
    pub door_fade_in: f32,
    /// Delay before the tap hint appears
    pub tap_hint_delay: f32,
    /// Fade of the tap hint, in and out
    pub tap_hint_fade: f32,
    /// Delay between the knock and the squeak
    pub door_squeak_at: f32,
    /// Swing of the opening door
    pub door_swing: f32,
    /// When the open door starts fading out
    pub door_fade_out_at: f32,
    /// Fade-out of the open door
    pub door_fade_out: f32,
    /// When the greeting scene follows the tap
    pub greeting_at: f32,
    /// Fade of every greeting text, in and out
    pub text_fade: f32,
    /// How long the greeting stays fully visible
    pub text_hold: f32,
    /// How long each information line stays fully visible
    pub info_hold: f32,
    /// When the greeting is spoken
    pub greeting_speech_at: f32,
    /// Start of each information line
    pub info_line_offsets: Vec<f32>,
    /// When the greeting scene hands over to the forest
    pub greeting_duration: f32,
    /// Camera moves
    pub camera_move: f32,
    /// Delay before the tree choice appears
    pub choice_reveal_delay: f32,
    /// Fade of the tree choice, in and out
    pub choice_fade: f32,
    /// Delay before the customization controls appear
    pub customization_reveal_delay: f32,
    /// Fade of the customization controls
    pub customization_fade: f32,
    /// Fade-out of the forest
    pub forest_fade: f32,
    /// Delay before the Christmas tree appears
    pub tree_reveal_delay: f32,
    /// Fade-in of the Christmas tree
    pub tree_fade: f32,
    /// Fade of a decoration when its switch flips
    pub switch_fade: f32,
    /// Fade of panels hidden when changing scene
    pub panel_fade: f32,
    /// Delay before camera controls appear or the panel returns
    pub camera_controls_delay: f32,
    /// Fade of the camera controls
    pub camera_controls_fade: f32,
    /// Delay before the closing text appears
    pub closing_reveal_delay: f32,
    /// Fade-in of the closing text
    pub closing_fade: f32,
    /// When the composite is exported
    pub export_at: f32,
    /// Fade-in of the share button
    pub share_reveal: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            door_fade_in: 1.0,
            tap_hint_delay: 0.5,
            tap_hint_fade: 0.5,
            door_squeak_at: 1.5,
            door_swing: 1.0,
            door_fade_out_at: 2.25,
            door_fade_out: 0.5,
            greeting_at: 2.75,
            text_fade: 1.0,
            text_hold: 2.0,
            info_hold: 3.0,
            greeting_speech_at: 0.0,
            info_line_offsets: vec![4.0, 9.0],
            greeting_duration: 13.0,
            camera_move: 2.0,
            choice_reveal_delay: 0.5,
            choice_fade: 1.0,
            customization_reveal_delay: 1.0,
            customization_fade: 1.0,
            forest_fade: 1.0,
            tree_reveal_delay: 1.0,
            tree_fade: 1.0,
            switch_fade: 0.5,
            panel_fade: 0.5,
            camera_controls_delay: 0.25,
            camera_controls_fade: 0.5,
            closing_reveal_delay: 0.5,
            closing_fade: 0.5,
            export_at: 1.0,
            share_reveal: 0.5,
        }
    }
}

impl Timing {
    /// Every value with its field name, information line offsets included
    fn values(&self) -> Vec<(String, f32)> {
        let named = [
            ("door_fade_in", self.door_fade_in),
            ("tap_hint_delay", self.tap_hint_delay),
            ("tap_hint_fade", self.tap_hint_fade),
            ("door_squeak_at", self.door_squeak_at),
            ("door_swing", self.door_swing),
            ("door_fade_out_at", self.door_fade_out_at),
            ("door_fade_out", self.door_fade_out),
            ("greeting_at", self.greeting_at),
            ("text_fade", self.text_fade),
            ("text_hold", self.text_hold),
            ("info_hold", self.info_hold),
            ("greeting_speech_at", self.greeting_speech_at),
            ("greeting_duration", self.greeting_duration),
            ("camera_move", self.camera_move),
            ("choice_reveal_delay", self.choice_reveal_delay),
            ("choice_fade", self.choice_fade),
            ("customization_reveal_delay", self.customization_reveal_delay),
            ("customization_fade", self.customization_fade),
            ("forest_fade", self.forest_fade),
            ("tree_reveal_delay", self.tree_reveal_delay),
            ("tree_fade", self.tree_fade),
            ("switch_fade", self.switch_fade),
            ("panel_fade", self.panel_fade),
            ("camera_controls_delay", self.camera_controls_delay),
            ("camera_controls_fade", self.camera_controls_fade),
            ("closing_reveal_delay", self.closing_reveal_delay),
            ("closing_fade", self.closing_fade),
            ("export_at", self.export_at),
            ("share_reveal", self.share_reveal),
        ];
        named
            .into_iter()
            .map(|(field, value)| (field.to_string(), value))
            .chain(
                self.info_line_offsets
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (format!("info_line_offsets[{}]", i), *value)),
            )
            .collect()
    }

    /// Reject values that are not finite or outside `0..=MAX_TIMING_SECS`
    pub fn validate(&self) -> Result<(), SettingsError> {
        match self
            .values()
            .into_iter()
            .find(|(_, value)| !(0.0..=MAX_TIMING_SECS).contains(value))
        {
            Some((field, value)) => Err(SettingsError::InvalidTiming { field, value }),
            None => Ok(()),
        }
    }
}

/// Seconds from settings as a duration, clamped to `0..=MAX_TIMING_SECS`.
/// NaN counts as zero.
pub fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.clamp(0.0, MAX_TIMING_SECS)).unwrap_or_default()
}

/// Names of the 3D assets, nodes, particles and sounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetNames {
    /// Door scene
    pub door: String,
    /// Swinging door leaf inside the door scene
    pub door_node: String,
    /// Snowy tree scene
    pub snowy_tree: String,
    /// Tree node inside the snowy tree scene
    pub snowy_tree_node: String,
    /// Christmas tree scene
    pub christmas_tree: String,
    /// Tree node inside the Christmas tree scene
    pub christmas_tree_node: String,
    /// Snowfall particle system
    pub snow_particles: String,
    /// Knock on the door
    pub knock_sound: String,
    /// Door hinge
    pub squeak_sound: String,
}

impl AssetNames {
    /// Scenes to preload before the presentation starts
    pub fn preload_list(&self) -> Vec<String> {
        vec![
            self.door.clone(),
            self.christmas_tree.clone(),
            self.snowy_tree.clone(),
        ]
    }
}

impl Default for AssetNames {
    fn default() -> Self {
        Self {
            door: "door".to_string(),
            door_node: "WoodenDoor".to_string(),
            snowy_tree: "snowy_tree".to_string(),
            snowy_tree_node: "SnowyTree".to_string(),
            christmas_tree: "christmas_tree".to_string(),
            christmas_tree_node: "ChristmasTree".to_string(),
            snow_particles: "Snow".to_string(),
            knock_sound: "knock.aif".to_string(),
            squeak_sound: "door-squeak.aif".to_string(),
        }
    }
}

/// Complete presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    /// Settings format version
    pub version: u32,
    /// Displayed and spoken copy
    pub script: Script,
    /// Choreography timing
    pub timing: Timing,
    /// Asset names
    pub assets: AssetNames,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            script: Script::default(),
            timing: Timing::default(),
            assets: AssetNames::default(),
        }
    }
}

impl PresentationSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: PresentationSettings = ron::from_str(content)?;
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        settings.timing.validate()?;
        Ok(settings)
    }

    /// Serialise to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let settings = Self::load(path)?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_choreography() {
        let settings = PresentationSettings::default();
        assert_eq!(settings.script.speech_rate, 0.33);
        assert_eq!(settings.timing.info_line_offsets, vec![4.0, 9.0]);
        assert_eq!(settings.timing.greeting_duration, 13.0);
        assert_eq!(settings.script.info_lines.len(), 2);
        assert_eq!(
            settings.assets.preload_list(),
            vec!["door", "christmas_tree", "snowy_tree"]
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = PresentationSettings::from_ron(
            r#"(script: (greeting: "Veselé Vánoce"), timing: (switch_fade: 0.25))"#,
        )
        .unwrap();
        assert_eq!(settings.script.greeting, "Veselé Vánoce");
        assert_eq!(settings.script.greeting_font, "FantasticPete");
        assert_eq!(settings.timing.switch_fade, 0.25);
        assert_eq!(settings.timing.door_fade_in, 1.0);
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = PresentationSettings::from_ron("(version: 99)");
        assert!(matches!(
            result,
            Err(SettingsError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let mut settings = PresentationSettings::default();
        settings.script.closing_text = "Bye".to_string();
        let text = settings.to_ron().unwrap();
        assert_eq!(PresentationSettings::from_ron(&text).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("christmas-settings-that-does-not-exist.ron");
        let settings = PresentationSettings::load_or_default(&path).unwrap();
        assert_eq!(settings, PresentationSettings::default());
    }

    #[test]
    fn test_secs_clamps_out_of_range() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(0.5), Duration::from_millis(500));
        assert_eq!(secs(f32::NAN), Duration::ZERO);
        assert_eq!(secs(f32::INFINITY), Duration::from_secs(3600));
        assert_eq!(secs(1e20), Duration::from_secs(3600));
    }

    #[test]
    fn test_unusable_timing_rejected() {
        let result = PresentationSettings::from_ron("(timing: (switch_fade: 1e20))");
        assert!(matches!(
            result,
            Err(SettingsError::InvalidTiming { ref field, .. }) if field == "switch_fade"
        ));

        let result = PresentationSettings::from_ron("(timing: (info_line_offsets: [4.0, -2.0]))");
        assert!(matches!(
            result,
            Err(SettingsError::InvalidTiming { ref field, .. }) if field == "info_line_offsets[1]"
        ));

        assert!(PresentationSettings::default().timing.validate().is_ok());
    }
}
