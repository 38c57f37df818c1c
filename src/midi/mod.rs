// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI File marshalling.
//!
//! This module reads melody pitches out of a MIDI file and writes the
//! melody and its counter-melody back as a two-track file. Neither side
//! knows anything about counterpoint.

pub mod export;
pub mod import;

pub use export::{ExportNote, ExportTrack, MidiExporter, NoteLayout};
pub use import::{melody_from_bytes, melody_from_smf, read_melody};

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;

    // Meta events (SMF only)
    pub const META: u8 = 0xFF;
    pub const META_TRACK_NAME: u8 = 0x03;
    pub const META_END_OF_TRACK: u8 = 0x2F;
    pub const META_TEMPO: u8 = 0x51;
    pub const META_TIME_SIGNATURE: u8 = 0x58;

    /// Highest note number / velocity
    pub const DATA_MAX: u8 = 0x7F;
}
