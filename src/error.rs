// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for counterpoint generation and MIDI marshalling.

use thiserror::Error;

/// Errors reported by the library.
///
/// Generation itself never fails: every melody note always yields a
/// counter note (unison is the last resort), so there is no variant for
/// "no consonant candidate".
#[derive(Error, Debug)]
pub enum CounterpointError {
    #[error("Invalid key signature '{label}': {reason}")]
    InvalidKeySignature { label: String, reason: String },

    #[error("Pitch {pitch} at position {index} of track '{track}' is outside the MIDI range 0-127")]
    PitchOutOfRange {
        track: String,
        index: usize,
        pitch: i32,
    },

    #[error("Invalid export setting '{setting}': {reason}")]
    InvalidExportSetting { setting: String, reason: String },

    #[error("Delta of {delta} ticks in track '{track}' exceeds the MIDI limit of {max}")]
    DeltaTooLarge { track: String, delta: u64, max: u64 },

    #[error("Failed to parse MIDI data: {0}")]
    MidiParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CounterpointError {
    pub(crate) fn invalid_key(label: &str, reason: impl Into<String>) -> Self {
        CounterpointError::InvalidKeySignature {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_setting(setting: &str, reason: impl Into<String>) -> Self {
        CounterpointError::InvalidExportSetting {
            setting: setting.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CounterpointError>;
