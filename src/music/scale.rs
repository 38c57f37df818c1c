// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key signatures and diatonic scale derivation.
//!
//! A key is a tonic plus a major/minor mode. The scale of a key is the
//! major step pattern transposed to the tonic; minor keys lower the 3rd,
//! 6th and 7th degrees by a semitone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CounterpointError, Result};

/// Chromatic pitch. Any `i32`; 60 is middle C when read from MIDI.
pub type Pitch = i32;

/// Pitch class (0-11, 0 = C)
pub type PitchClass = u8;

/// Number of semitones in an octave
pub const OCTAVE: Pitch = 12;

/// Reduce a pitch to its pitch class (always 0-11, also for negative pitches)
pub fn pitch_class(pitch: Pitch) -> PitchClass {
    pitch.rem_euclid(OCTAVE) as PitchClass
}

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> PitchClass {
        self as PitchClass
    }

    /// Get note from pitch class, or `None` if it is not in 0-11
    pub fn from_pitch_class(pc: PitchClass) -> Option<Self> {
        Note::ALL.get(pc as usize).copied()
    }

    /// Parse a note name ("C", "C#", "Db", "f#", "Bb")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" | "B#" | "BS" => Some(Note::C),
            "C#" | "CS" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "DS" | "EB" => Some(Note::Ds),
            "E" | "FB" => Some(Note::E),
            "F" | "E#" | "ES" => Some(Note::F),
            "F#" | "FS" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "GS" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "AS" | "BB" => Some(Note::As),
            "B" | "CB" => Some(Note::B),
            _ => None,
        }
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: i32) -> Self {
        Note::ALL[pitch_class(self.pitch_class() as Pitch + semitones) as usize]
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        };
        write!(f, "{}", name)
    }
}

/// Mode of a key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Major scale steps (semitones from the tonic)
    pub const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

    /// Positions in `MAJOR_STEPS` lowered by a semitone in minor keys
    pub const MINOR_LOWERED: [usize; 3] = [2, 5, 6];

    /// Scale steps (semitones from the tonic) for this mode
    pub fn steps(self) -> [u8; 7] {
        let mut steps = Self::MAJOR_STEPS;
        if self == Mode::Minor {
            for &i in &Self::MINOR_LOWERED {
                steps[i] -= 1;
            }
        }
        steps
    }

    /// Parse the mode token that follows the tonic in a key label
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token == "M" {
            return Some(Mode::Major);
        }
        match token.to_lowercase().as_str() {
            "" | "maj" | "major" => Some(Mode::Major),
            "m" | "min" | "minor" => Some(Mode::Minor),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// The seven pitch classes of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    tonic: Note,
    mode: Mode,
    pitch_classes: Vec<PitchClass>,
}

impl Scale {
    /// Build the scale for a tonic note and mode
    pub fn new(tonic: Note, mode: Mode) -> Self {
        let pitch_classes = mode
            .steps()
            .iter()
            .map(|&step| tonic.transpose(step as i32).pitch_class())
            .collect();

        Self {
            tonic,
            mode,
            pitch_classes,
        }
    }

    /// Derive the scale from a raw tonic pitch class.
    ///
    /// Fails if `tonic` is not a pitch class (0-11).
    pub fn derive(tonic: PitchClass, mode: Mode) -> Result<Self> {
        let note = Note::from_pitch_class(tonic).ok_or_else(|| {
            CounterpointError::invalid_key(
                &tonic.to_string(),
                format!("tonic pitch class {} is outside 0-11", tonic),
            )
        })?;
        Ok(Self::new(note, mode))
    }

    /// Get the tonic note
    pub fn tonic(&self) -> Note {
        self.tonic
    }

    /// Get the mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pitch classes in scale-degree order, starting at the tonic
    pub fn pitch_classes(&self) -> &[PitchClass] {
        &self.pitch_classes
    }

    pub fn len(&self) -> usize {
        self.pitch_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch_classes.is_empty()
    }

    /// Check if a pitch class is in this scale
    pub fn contains_class(&self, pc: PitchClass) -> bool {
        self.pitch_classes.contains(&pc)
    }

    /// Check if a pitch (any octave) is in this scale
    pub fn contains(&self, pitch: Pitch) -> bool {
        self.contains_class(pitch_class(pitch))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

/// A key signature: tonic plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySignature {
    tonic: Note,
    mode: Mode,
}

impl KeySignature {
    /// Create a new key signature
    pub fn new(tonic: Note, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    /// Parse a key label such as "C", "C#m", "Bb", "Am" or "F# minor"
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let mut chars = trimmed.char_indices();

        let letter_end = match chars.next() {
            Some((_, c)) if matches!(c.to_ascii_uppercase(), 'A'..='G') => c.len_utf8(),
            Some((_, c)) => {
                return Err(CounterpointError::invalid_key(
                    label,
                    format!("unknown tonic '{}'", c),
                ))
            }
            None => return Err(CounterpointError::invalid_key(label, "empty key label")),
        };

        // An accidental directly follows the letter. A lone trailing "b" after
        // the letter is a flat, never a mode token.
        let tonic_end = match trimmed[letter_end..].chars().next() {
            Some('#') | Some('b') | Some('s') => letter_end + 1,
            _ => letter_end,
        };

        let tonic = Note::parse(&trimmed[..tonic_end]).ok_or_else(|| {
            CounterpointError::invalid_key(
                label,
                format!("unknown tonic '{}'", &trimmed[..tonic_end]),
            )
        })?;

        let mode_token = &trimmed[tonic_end..];
        let mode = Mode::parse(mode_token).ok_or_else(|| {
            CounterpointError::invalid_key(
                label,
                format!("unknown mode '{}'", mode_token.trim()),
            )
        })?;

        Ok(Self::new(tonic, mode))
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the scale of this key
    pub fn scale(&self) -> Scale {
        Scale::new(self.tonic, self.mode)
    }
}

impl FromStr for KeySignature {
    type Err = CounterpointError;

    fn from_str(s: &str) -> Result<Self> {
        KeySignature::parse(s)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.tonic),
            Mode::Minor => write!(f, "{}m", self.tonic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class() {
        assert_eq!(pitch_class(60), 0);
        assert_eq!(pitch_class(69), 9);
        assert_eq!(pitch_class(-1), 11);
        assert_eq!(pitch_class(-12), 0);
    }

    #[test]
    fn test_note_parse() {
        assert_eq!(Note::parse("C"), Some(Note::C));
        assert_eq!(Note::parse("C#"), Some(Note::Cs));
        assert_eq!(Note::parse("Db"), Some(Note::Cs));
        assert_eq!(Note::parse("f#"), Some(Note::Fs));
        assert_eq!(Note::parse("Bb"), Some(Note::As));
        assert_eq!(Note::parse("X"), None);
    }

    #[test]
    fn test_note_from_pitch_class() {
        assert_eq!(Note::from_pitch_class(0), Some(Note::C));
        assert_eq!(Note::from_pitch_class(11), Some(Note::B));
        assert_eq!(Note::from_pitch_class(12), None);
    }

    #[test]
    fn test_note_transpose() {
        assert_eq!(Note::C.transpose(2), Note::D);
        assert_eq!(Note::C.transpose(12), Note::C);
        assert_eq!(Note::C.transpose(-1), Note::B);
        assert_eq!(Note::G.transpose(5), Note::C);
    }

    #[test]
    fn test_mode_steps() {
        assert_eq!(Mode::Major.steps(), [0, 2, 4, 5, 7, 9, 11]);

        let mut expected = Mode::MAJOR_STEPS;
        for &i in &Mode::MINOR_LOWERED {
            expected[i] -= 1;
        }
        assert_eq!(Mode::Minor.steps(), expected);
    }

    #[test]
    fn test_c_major_scale() {
        let scale = Scale::derive(0, Mode::Major).unwrap();
        assert_eq!(scale.pitch_classes(), &[0, 2, 4, 5, 7, 9, 11]);
        assert!(scale.contains(60));
        assert!(scale.contains(71));
        assert!(!scale.contains(61));
    }

    #[test]
    fn test_a_minor_scale_lowers_third_sixth_seventh() {
        let major = Scale::derive(9, Mode::Major).unwrap();
        let minor = Scale::derive(9, Mode::Minor).unwrap();

        for (degree, (&maj, &min)) in major
            .pitch_classes()
            .iter()
            .zip(minor.pitch_classes())
            .enumerate()
        {
            let expected = if Mode::MINOR_LOWERED.contains(&degree) {
                (maj + 11) % 12
            } else {
                maj
            };
            assert_eq!(min, expected, "degree {}", degree);
        }
        assert_eq!(minor.len(), 7);
    }

    #[test]
    fn test_scale_has_seven_distinct_classes() {
        for tonic in 0..12 {
            for mode in [Mode::Major, Mode::Minor] {
                let scale = Scale::derive(tonic, mode).unwrap();
                let mut classes = scale.pitch_classes().to_vec();
                classes.sort();
                classes.dedup();
                assert_eq!(classes.len(), 7, "{}", scale);
            }
        }
    }

    #[test]
    fn test_derive_rejects_bad_tonic() {
        let err = Scale::derive(12, Mode::Major).unwrap_err();
        assert!(matches!(err, CounterpointError::InvalidKeySignature { .. }));
    }

    #[test]
    fn test_key_parse() {
        let key = KeySignature::parse("C").unwrap();
        assert_eq!(key.tonic(), Note::C);
        assert_eq!(key.mode(), Mode::Major);

        let key = KeySignature::parse("C#m").unwrap();
        assert_eq!(key.tonic(), Note::Cs);
        assert_eq!(key.mode(), Mode::Minor);

        let key = KeySignature::parse("Bb").unwrap();
        assert_eq!(key.tonic(), Note::As);
        assert_eq!(key.mode(), Mode::Major);

        let key = KeySignature::parse("bbm").unwrap();
        assert_eq!(key.tonic(), Note::As);
        assert_eq!(key.mode(), Mode::Minor);

        let key = KeySignature::parse(" F# minor ").unwrap();
        assert_eq!(key.tonic(), Note::Fs);
        assert_eq!(key.mode(), Mode::Minor);

        let key: KeySignature = "Am".parse().unwrap();
        assert_eq!(key.tonic(), Note::A);
        assert_eq!(key.mode(), Mode::Minor);
    }

    #[test]
    fn test_key_parse_errors() {
        for label in ["", "H", "Cx", "C dorian", "#"] {
            let err = KeySignature::parse(label).unwrap_err();
            assert!(
                matches!(err, CounterpointError::InvalidKeySignature { .. }),
                "label {:?}",
                label
            );
        }
    }

    #[test]
    fn test_key_display() {
        assert_eq!(KeySignature::new(Note::Cs, Mode::Minor).to_string(), "C#m");
        assert_eq!(KeySignature::new(Note::G, Mode::Major).to_string(), "G");
        assert_eq!(KeySignature::new(Note::A, Mode::Minor).scale().to_string(), "A minor");
    }
}
