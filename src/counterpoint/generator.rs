// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequential counter-melody generation.
//!
//! Walks the melody left to right, computes the legal pitches for each
//! note from the rules in [`super::rules`], picks one at random and
//! threads the resulting [`VoiceState`] into the next step. A final pass
//! resolves the last note to the tonic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::rules::{candidates, harmonic_interval, VoiceState};
use crate::error::{CounterpointError, Result};
use crate::music::{pitch_class, Note, Pitch, PitchClass, Scale};

/// One generated counter note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterNote {
    /// Chosen pitch
    pub pitch: Pitch,
    /// True when no candidate survived and unison with the melody was used
    pub fallback: bool,
}

/// Result of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counterpoint {
    /// One counter note per melody note
    pub notes: Vec<CounterNote>,
    /// True when the last note was rewritten to the tonic
    pub cadence_corrected: bool,
}

impl Counterpoint {
    /// Counter-melody pitches
    pub fn pitches(&self) -> Vec<Pitch> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    /// Positions where the unison fallback was used
    pub fn fallback_positions(&self) -> Vec<usize> {
        self.notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.fallback)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Counterpoint generator for one scale and tonic
pub struct CounterpointGenerator<R: Rng = StdRng> {
    scale: Scale,
    tonic: PitchClass,
    rng: R,
}

impl CounterpointGenerator<StdRng> {
    /// Create a generator seeded from system entropy
    pub fn new(scale: Scale) -> Self {
        Self::with_rng(scale, StdRng::from_entropy())
    }

    /// Create a generator with a fixed seed for repeatable output
    pub fn seeded(scale: Scale, seed: u64) -> Self {
        Self::with_rng(scale, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CounterpointGenerator<R> {
    /// Create a generator drawing from `rng`. The cadence resolves to the
    /// scale's tonic.
    pub fn with_rng(scale: Scale, rng: R) -> Self {
        let tonic = scale.tonic().pitch_class();
        Self { scale, tonic, rng }
    }

    /// Resolve the cadence to a different tonic than the scale's own.
    ///
    /// Fails when `tonic` is not a pitch class (0-11).
    pub fn with_tonic(mut self, tonic: PitchClass) -> Result<Self> {
        let note = Note::from_pitch_class(tonic).ok_or_else(|| {
            CounterpointError::invalid_key(
                &tonic.to_string(),
                format!("tonic pitch class {} is outside 0-11", tonic),
            )
        })?;
        self.tonic = note.pitch_class();
        Ok(self)
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn tonic(&self) -> PitchClass {
        self.tonic
    }

    /// Generate a counter-melody with per-note details
    pub fn harmonize(&mut self, melody: &[Pitch]) -> Counterpoint {
        harmonize(melody, &self.scale, self.tonic, &mut self.rng)
    }

    /// Generate a counter-melody
    pub fn generate(&mut self, melody: &[Pitch]) -> Vec<Pitch> {
        self.harmonize(melody).pitches()
    }
}

/// Generate a counter-melody with per-note details.
///
/// The result always has one note per melody note; an empty melody gives
/// an empty result. `tonic` must be a pitch class (0-11); use
/// [`CounterpointGenerator::with_tonic`] to have it checked.
pub fn harmonize<R: Rng + ?Sized>(
    melody: &[Pitch],
    scale: &Scale,
    tonic: PitchClass,
    rng: &mut R,
) -> Counterpoint {
    debug_assert!(tonic < 12, "tonic pitch class {} is outside 0-11", tonic);

    let mut notes = Vec::with_capacity(melody.len());
    let mut state = VoiceState::new();

    for (i, &note) in melody.iter().enumerate() {
        let set = candidates(note, scale, &state);
        let pitch = set.pitches[rng.gen_range(0..set.pitches.len())];

        trace!(index = i, note, options = ?set.pitches, "candidates");
        debug!(
            index = i,
            note,
            pitch,
            interval = harmonic_interval(note, pitch),
            fallback = set.fallback,
            "placed counter note"
        );

        notes.push(CounterNote {
            pitch,
            fallback: set.fallback,
        });
        state = state.advance(note, pitch);
    }

    let mut cadence_corrected = false;
    if let Some(last) = notes.last_mut() {
        if pitch_class(last.pitch) != tonic {
            debug!(from = last.pitch, to = tonic, "resolving cadence to tonic");
            last.pitch = tonic as Pitch;
            cadence_corrected = true;
        }
    }

    Counterpoint {
        notes,
        cadence_corrected,
    }
}

/// Generate a counter-melody for `melody` in `scale`, ending on `tonic`
/// (a pitch class, 0-11)
pub fn generate<R: Rng + ?Sized>(
    melody: &[Pitch],
    scale: &Scale,
    tonic: PitchClass,
    rng: &mut R,
) -> Vec<Pitch> {
    harmonize(melody, scale, tonic, rng).pitches()
}
