// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities.
//!
//! This module provides pitch types, key signatures and the diatonic
//! scales the counterpoint generator draws its notes from.

pub mod scale;

pub use scale::{pitch_class, KeySignature, Mode, Note, Pitch, PitchClass, Scale, OCTAVE};
