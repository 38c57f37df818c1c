// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for counterpoint jobs.
//!
//! A job file names the key, an optional random seed and the timing used
//! when the two voices are written back out. YAML is the default format;
//! files ending in `.toml` are read as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CounterpointError;
use crate::midi::export::{MAX_CHANNEL, MAX_DELTA_TICKS};
use crate::midi::NoteLayout;
use crate::music::KeySignature;

/// Root configuration for a counterpoint job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfig {
    /// Key label (e.g., "C", "F#m", "Bb")
    #[serde(default = "default_key")]
    pub key: String,
    /// Seed for repeatable output; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Output file settings
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_key() -> String {
    "C".to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            seed: None,
            export: ExportConfig::default(),
        }
    }
}

impl JobConfig {
    /// Load a job configuration, picking the format from the extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a job configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a job configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Parse the configured key label
    pub fn key_signature(&self) -> Result<KeySignature> {
        KeySignature::parse(&self.key).context("Invalid key in configuration")
    }
}

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Ticks per quarter note
    pub ppqn: u16,
    /// Length of each note in ticks
    pub note_ticks: u64,
    /// Silence before each note in ticks
    pub gap_ticks: u64,
    /// Note-on/note-off velocity
    pub velocity: u8,
    /// Tempo in BPM
    pub tempo: f64,
    /// MIDI channel of the melody track (0-15)
    pub melody_channel: u8,
    /// MIDI channel of the counter-melody track (0-15)
    pub counter_channel: u8,
    /// Track names
    pub melody_name: String,
    pub counter_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let layout = NoteLayout::default();
        Self {
            ppqn: 480,
            note_ticks: layout.note_ticks,
            gap_ticks: layout.gap_ticks,
            velocity: layout.velocity,
            tempo: 120.0,
            melody_channel: 0,
            counter_channel: 1,
            melody_name: "Melody".to_string(),
            counter_name: "Counterpoint".to_string(),
        }
    }
}

impl ExportConfig {
    /// Note timing for both tracks
    pub fn layout(&self) -> NoteLayout {
        NoteLayout {
            gap_ticks: self.gap_ticks,
            note_ticks: self.note_ticks,
            velocity: self.velocity,
        }
    }

    /// Check every setting against what a MIDI file can carry.
    ///
    /// Values are rejected, never adjusted.
    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=0x7FFF).contains(&self.ppqn) {
            return Err(CounterpointError::invalid_setting(
                "ppqn",
                format!("{} is outside 1-32767", self.ppqn),
            ));
        }
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&self.tempo) {
            return Err(CounterpointError::invalid_setting(
                "tempo",
                format!("{} BPM is outside {}-{}", self.tempo, MIN_TEMPO, MAX_TEMPO),
            ));
        }
        if self.velocity > 127 {
            return Err(CounterpointError::invalid_setting(
                "velocity",
                format!("{} is above 127", self.velocity),
            ));
        }
        for (setting, ticks) in [("gap_ticks", self.gap_ticks), ("note_ticks", self.note_ticks)] {
            if ticks > MAX_DELTA_TICKS {
                return Err(CounterpointError::invalid_setting(
                    setting,
                    format!("{} ticks is above the MIDI limit of {}", ticks, MAX_DELTA_TICKS),
                ));
            }
        }
        for (setting, channel) in [
            ("melody_channel", self.melody_channel),
            ("counter_channel", self.counter_channel),
        ] {
            if channel > MAX_CHANNEL {
                return Err(CounterpointError::invalid_setting(
                    setting,
                    format!("{} is not a MIDI channel (0-{})", channel, MAX_CHANNEL),
                ));
            }
        }
        Ok(())
    }
}

/// Tempo range accepted in a job file (BPM)
pub const MIN_TEMPO: f64 = 20.0;
pub const MAX_TEMPO: f64 = 300.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{Mode, Note};

    #[test]
    fn test_parse_job_config() {
        let yaml = r#"
key: "F#m"
seed: 17
export:
  ppqn: 96
  note_ticks: 90
  gap_ticks: 6
  velocity: 100
  counter_channel: 3
"#;

        let config = JobConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.key, "F#m");
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.export.ppqn, 96);
        assert_eq!(config.export.counter_channel, 3);
        assert_eq!(config.export.melody_channel, 0);
        assert_eq!(config.export.tempo, 120.0);

        let layout = config.export.layout();
        assert_eq!(layout.note_ticks, 90);
        assert_eq!(layout.gap_ticks, 6);
        assert_eq!(layout.velocity, 100);

        let key = config.key_signature().unwrap();
        assert_eq!(key.tonic(), Note::Fs);
        assert_eq!(key.mode(), Mode::Minor);
    }

    #[test]
    fn test_default_values() {
        let config = JobConfig::from_yaml("{}").unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.key, "C");
        assert_eq!(config.seed, None);
        assert_eq!(config.export.layout(), NoteLayout::default());
        assert_eq!(config.export.melody_name, "Melody");
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
key = "Bb"
seed = 5

[export]
tempo = 90.0
"#;

        let config = JobConfig::from_toml(text).unwrap();
        assert_eq!(config.key, "Bb");
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.export.tempo, 90.0);
        assert_eq!(config.export.ppqn, 480);
    }

    #[test]
    fn test_export_validation() {
        assert!(ExportConfig::default().validate().is_ok());

        let rejected = |yaml: &str, name: &str| {
            let config = JobConfig::from_yaml(yaml).unwrap();
            match config.export.validate().unwrap_err() {
                CounterpointError::InvalidExportSetting { setting, .. } => assert_eq!(setting, name),
                other => panic!("unexpected error: {}", other),
            }
        };
        rejected("export:\n  counter_channel: 16\n", "counter_channel");
        rejected("export:\n  melody_channel: 200\n", "melody_channel");
        rejected("export:\n  velocity: 128\n", "velocity");
        rejected("export:\n  tempo: 500.0\n", "tempo");
        rejected("export:\n  tempo: 5.0\n", "tempo");
        rejected("export:\n  ppqn: 0\n", "ppqn");
        rejected("export:\n  gap_ticks: 268435456\n", "gap_ticks");
        rejected("export:\n  note_ticks: 4294967301\n", "note_ticks");

        let edge = JobConfig::from_yaml("export:\n  counter_channel: 15\n  velocity: 127\n  gap_ticks: 268435455\n").unwrap();
        assert!(edge.export.validate().is_ok());
    }

    #[test]
    fn test_invalid_key_reported() {
        let config = JobConfig {
            key: "H#".to_string(),
            ..JobConfig::default()
        };
        let err = config.key_signature().unwrap_err();
        assert!(format!("{:#}", err).contains("H#"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("job.yaml");
        JobConfig {
            key: "Am".to_string(),
            seed: Some(3),
            ..JobConfig::default()
        }
        .save(&yaml_path)
        .unwrap();
        let loaded = JobConfig::load(&yaml_path).unwrap();
        assert_eq!(loaded.key, "Am");
        assert_eq!(loaded.seed, Some(3));

        let toml_path = dir.path().join("job.toml");
        fs::write(&toml_path, "key = \"D\"\n").unwrap();
        assert_eq!(JobConfig::load(&toml_path).unwrap().key, "D");

        assert!(JobConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
