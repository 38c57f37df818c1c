// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Two-voice counterpoint for MIDI melodies.
//!
//! Given a melody and a key, [`counterpoint`] writes a second voice that
//! is consonant with the first, avoids consecutive parallel fifths,
//! recovers from leaps by step and ends on the tonic. The [`midi`] and
//! [`pipeline`] modules move pitches in and out of Standard MIDI Files.

pub mod config;
pub mod counterpoint;
pub mod error;
pub mod midi;
pub mod music;
pub mod pipeline;

pub use config::JobConfig;
pub use counterpoint::{generate, Counterpoint, CounterpointGenerator};
pub use error::{CounterpointError, Result};
pub use music::{KeySignature, Mode, Pitch, PitchClass, Scale};
pub use pipeline::{harmonize_file, harmonize_melody, Harmonization};
