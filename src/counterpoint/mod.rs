// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Two-voice counterpoint generation.
//!
//! For every melody note the generator picks a consonant, in-scale pitch
//! for the second voice, avoiding consecutive parallel fifths and forcing
//! step-wise motion after leaps. The last note resolves to the tonic.
//!
//! Tritone and augmented-second checks are not applied.

pub mod generator;
pub mod rules;

pub use generator::{generate, harmonize, CounterNote, Counterpoint, CounterpointGenerator};
pub use rules::{candidates, CandidateSet, VoiceState};
