// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody extraction from Standard MIDI Files.
//!
//! Every note-on with a non-zero velocity becomes one melody pitch.
//! Tracks are read in file order and events in track order, so a
//! multi-track file yields its tracks one after another.

use std::fs;
use std::path::Path;

use midly::{MidiMessage, Smf, TrackEventKind};
use tracing::debug;

use crate::error::{CounterpointError, Result};
use crate::music::Pitch;

/// Read the melody pitches from a MIDI file
pub fn read_melody<P: AsRef<Path>>(path: P) -> Result<Vec<Pitch>> {
    let bytes = fs::read(path.as_ref())?;
    let melody = melody_from_bytes(&bytes)?;
    debug!(path = ?path.as_ref(), notes = melody.len(), "read melody");
    Ok(melody)
}

/// Parse MIDI file bytes and extract the melody pitches
pub fn melody_from_bytes(bytes: &[u8]) -> Result<Vec<Pitch>> {
    let smf = Smf::parse(bytes).map_err(|e| CounterpointError::MidiParse(e.to_string()))?;
    Ok(melody_from_smf(&smf))
}

/// Extract the melody pitches from a parsed MIDI file
pub fn melody_from_smf(smf: &Smf) -> Vec<Pitch> {
    smf.tracks
        .iter()
        .flat_map(|track| track.iter())
        .filter_map(|event| match event.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } if vel.as_int() > 0 => Some(key.as_int() as Pitch),
            _ => None,
        })
        .collect()
}
