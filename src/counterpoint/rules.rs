// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice-leading rules for a single counter-melody step.
//!
//! Everything here is pure: the candidate set for a melody note depends
//! only on the note, the scale and the [`VoiceState`] carried over from
//! the previous step.

use crate::music::{Pitch, PitchClass, Scale, OCTAVE};

/// Consonant harmonic interval classes: unison/octave, minor and major
/// thirds, perfect fifth, minor and major sixths. Compound forms (octave,
/// tenths) reduce to the same classes.
pub const CONSONANT_INTERVALS: [PitchClass; 6] = [0, 3, 4, 7, 8, 9];

/// Harmonic intervals that must not repeat on consecutive notes (perfect
/// fifth, octave). Recorded intervals are already reduced mod 12, so only
/// the fifth can ever match.
pub const PARALLEL_GUARDED: [PitchClass; 2] = [7, 12];

/// A melodic step larger than this many semitones is a leap
pub const LEAP_THRESHOLD: Pitch = 4;

/// Consecutive leaps after which step-wise motion is forced
pub const MAX_CONSECUTIVE_LEAPS: u32 = 3;

/// Largest step allowed while recovering from a leap
pub const RECOVERY_STEP: Pitch = 2;

/// Interval class of `pitch` above `note`, counted upwards (mod 12)
pub fn harmonic_interval(note: Pitch, pitch: Pitch) -> PitchClass {
    (i64::from(pitch) - i64::from(note)).rem_euclid(i64::from(OCTAVE)) as PitchClass
}

/// Check if `pitch` is consonant against `note`
pub fn is_consonant(note: Pitch, pitch: Pitch) -> bool {
    CONSONANT_INTERVALS.contains(&harmonic_interval(note, pitch))
}

/// Check if a melodic step between two pitches is a leap
pub fn is_leap(from: Pitch, to: Pitch) -> bool {
    to.abs_diff(from) > LEAP_THRESHOLD.unsigned_abs()
}

/// State carried from one counter-melody note to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceState {
    /// `|counter - melody| mod 12` of the last placed note
    pub prev_interval: Option<PitchClass>,
    /// Number of successive leaps ending at the last placed note
    pub leap_count: u32,
    /// Last placed counter note
    pub last: Option<Pitch>,
    /// Counter note placed before `last`
    pub before_last: Option<Pitch>,
}

impl VoiceState {
    /// State before the first note
    pub fn new() -> Self {
        Self::default()
    }

    /// If the voice must move by step, the note it must move from
    pub fn recovery_anchor(&self) -> Option<Pitch> {
        let last = self.last?;
        let leapt = self
            .before_last
            .map(|before| is_leap(before, last))
            .unwrap_or(false);

        if self.leap_count >= MAX_CONSECUTIVE_LEAPS || leapt {
            Some(last)
        } else {
            None
        }
    }

    /// State after placing `selected` against melody note `note`
    pub fn advance(self, note: Pitch, selected: Pitch) -> Self {
        let leap_count = match self.last {
            Some(last) if is_leap(last, selected) => self.leap_count + 1,
            _ => 0,
        };

        Self {
            prev_interval: Some((selected.abs_diff(note) % OCTAVE.unsigned_abs()) as PitchClass),
            leap_count,
            last: Some(selected),
            before_last: self.last,
        }
    }
}

/// Candidate pitches for one melody note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    /// Pitches the voice may take; never empty
    pub pitches: Vec<Pitch>,
    /// True when no rule-abiding pitch existed and unison was substituted
    pub fallback: bool,
}

/// Pitches in `[note - 12, note + 12)` that are consonant with `note`
/// and belong to `scale`. The window is cut off at the `i32` limits.
///
/// Independent of the voice state, so it can be computed ahead of the
/// sequential pass.
pub fn consonant_candidates(note: Pitch, scale: &Scale) -> Vec<Pitch> {
    (note.saturating_sub(OCTAVE)..note.saturating_add(OCTAVE))
        .filter(|&n| is_consonant(note, n) && scale.contains(n))
        .collect()
}

/// Apply the state-dependent filters (parallel fifths, leap recovery)
/// and the unison fallback to a consonant candidate list.
pub fn apply_voice_leading(mut pitches: Vec<Pitch>, note: Pitch, state: &VoiceState) -> CandidateSet {
    if let Some(prev) = state.prev_interval.filter(|p| PARALLEL_GUARDED.contains(p)) {
        pitches.retain(|&n| harmonic_interval(note, n) != prev);
    }

    if let Some(anchor) = state.recovery_anchor() {
        pitches.retain(|&n| anchor.abs_diff(n) <= RECOVERY_STEP.unsigned_abs());
    }

    if pitches.is_empty() {
        CandidateSet {
            pitches: vec![note],
            fallback: true,
        }
    } else {
        CandidateSet {
            pitches,
            fallback: false,
        }
    }
}

/// Full candidate computation for one melody note
pub fn candidates(note: Pitch, scale: &Scale, state: &VoiceState) -> CandidateSet {
    apply_voice_leading(consonant_candidates(note, scale), note, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{pitch_class, Mode};

    fn c_major() -> Scale {
        Scale::derive(0, Mode::Major).unwrap()
    }

    #[test]
    fn test_consonance() {
        assert!(is_consonant(60, 60));
        assert!(is_consonant(60, 64));
        assert!(is_consonant(60, 67));
        assert!(is_consonant(60, 55)); // fourth below = fifth class upwards
        assert!(!is_consonant(60, 62));
        assert!(!is_consonant(60, 66));
    }

    #[test]
    fn test_consonant_candidates_for_middle_c() {
        let pitches = consonant_candidates(60, &c_major());
        // Intervals 0,3,4,7,8,9 above each C, restricted to C major:
        // C, E, G, A in the window [48, 72)
        assert_eq!(pitches, vec![48, 52, 55, 57, 60, 64, 67, 69]);
    }

    #[test]
    fn test_candidates_stay_in_window() {
        let scale = c_major();
        for note in [0, 37, 60, 127, -5] {
            for n in consonant_candidates(note, &scale) {
                assert!(n >= note - 12 && n < note + 12);
                assert!(scale.contains(n));
                assert!(is_consonant(note, n));
            }
        }
    }

    #[test]
    fn test_parallel_fifth_filtered() {
        let state = VoiceState {
            prev_interval: Some(7),
            ..VoiceState::new()
        };
        let set = candidates(60, &c_major(), &state);
        assert!(!set.fallback);
        assert!(!set.pitches.contains(&67));
        assert!(!set.pitches.contains(&55));
        assert!(set.pitches.contains(&64));
    }

    #[test]
    fn test_unison_class_not_filtered() {
        // Octave/unison folds to 0 and is never blocked
        let state = VoiceState {
            prev_interval: Some(0),
            ..VoiceState::new()
        };
        let set = candidates(60, &c_major(), &state);
        assert!(set.pitches.contains(&60));
        assert!(set.pitches.contains(&48));
    }

    #[test]
    fn test_leap_recovery_after_large_step() {
        let state = VoiceState::new().advance(60, 60).advance(62, 67);
        assert_eq!(state.leap_count, 1);
        assert_eq!(state.recovery_anchor(), Some(67));

        let set = candidates(65, &c_major(), &state);
        for &n in &set.pitches {
            assert!((n - 67).abs() <= RECOVERY_STEP, "{} too far from 67", n);
        }
    }

    #[test]
    fn test_leap_counter_triggers_recovery() {
        let state = VoiceState {
            prev_interval: Some(0),
            leap_count: 3,
            last: Some(60),
            before_last: Some(59),
        };
        assert_eq!(state.recovery_anchor(), Some(60));
    }

    #[test]
    fn test_no_recovery_with_single_note() {
        let state = VoiceState::new().advance(60, 60);
        assert_eq!(state.recovery_anchor(), None);
    }

    #[test]
    fn test_fallback_to_unison() {
        // After a leap to 67 the voice must stay within 65..=69, which lies
        // outside the candidate window of D3.
        let state = VoiceState::new().advance(60, 60).advance(60, 67);
        let set = candidates(50, &c_major(), &state);
        assert!(set.fallback);
        assert_eq!(set.pitches, vec![50]);
    }

    #[test]
    fn test_extreme_pitches_do_not_overflow() {
        let scale = c_major();
        for note in [Pitch::MAX, Pitch::MAX - 3, Pitch::MIN, Pitch::MIN + 5] {
            for n in consonant_candidates(note, &scale) {
                assert!(is_consonant(note, n));
                assert!(scale.contains(n));
            }
        }

        // Pitch classes 4 and 7
        assert_eq!(harmonic_interval(Pitch::MIN, Pitch::MAX), 3);
        assert_eq!(pitch_class(Pitch::MAX) - pitch_class(Pitch::MIN), 3);
        assert!(is_leap(Pitch::MIN, Pitch::MAX));

        let state = VoiceState::new()
            .advance(Pitch::MIN, Pitch::MIN)
            .advance(Pitch::MAX, Pitch::MAX);
        assert_eq!(state.leap_count, 1);
        assert_eq!(state.prev_interval, Some(0));
        let set = candidates(Pitch::MIN + 5, &scale, &state);
        assert!(set.fallback);
        assert_eq!(set.pitches, vec![Pitch::MIN + 5]);
    }

    #[test]
    fn test_advance_records_absolute_interval() {
        let state = VoiceState::new().advance(60, 55);
        // 5 semitones below, recorded as |55 - 60| = 5, not 7
        assert_eq!(state.prev_interval, Some(5));
        assert_eq!(state.leap_count, 0);

        let state = state.advance(60, 67);
        assert_eq!(state.prev_interval, Some(7));
        assert_eq!(state.leap_count, 1);
        assert_eq!(state.last, Some(67));
        assert_eq!(state.before_last, Some(55));

        let state = state.advance(60, 69);
        assert_eq!(state.leap_count, 0);
    }
}
