// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Writes voices as a Type 1 MIDI file, one track per voice. Tempo and
//! time signature live in the first track.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::messages;
use crate::error::{CounterpointError, Result};
use crate::music::Pitch;

/// Largest delta time a variable-length quantity can hold (28 bits)
pub const MAX_DELTA_TICKS: u64 = 0x0FFF_FFFF;

/// Highest MIDI channel number
pub const MAX_CHANNEL: u8 = 0x0F;

/// Fixed timing used when turning bare pitches into notes.
///
/// Every note waits `gap_ticks` after the previous note ends, then sounds
/// for `note_ticks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLayout {
    /// Silence before each note
    pub gap_ticks: u64,
    /// Length of each note
    pub note_ticks: u64,
    /// Note-on and note-off velocity
    pub velocity: u8,
}

impl Default for NoteLayout {
    fn default() -> Self {
        Self {
            gap_ticks: 480,
            note_ticks: 480,
            velocity: 64,
        }
    }
}

impl NoteLayout {
    /// Ticks from one note start to the next
    pub fn period(&self) -> u64 {
        self.gap_ticks.saturating_add(self.note_ticks)
    }

    /// Start tick of the note at `index`
    pub fn start_of(&self, index: usize) -> u64 {
        (index as u64)
            .saturating_mul(self.period())
            .saturating_add(self.gap_ticks)
    }
}

/// A track for export
#[derive(Debug, Clone)]
pub struct ExportTrack {
    /// Track name
    pub name: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Notes in this track
    pub notes: Vec<ExportNote>,
}

impl ExportTrack {
    /// Create a new export track
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel,
            notes: Vec::new(),
        }
    }

    /// Build a track from a pitch sequence using a fixed layout.
    ///
    /// Fails on a channel above 15, a velocity above 127, or the first
    /// pitch that is not a MIDI note number.
    pub fn from_pitches(
        name: impl Into<String>,
        channel: u8,
        pitches: &[Pitch],
        layout: &NoteLayout,
    ) -> Result<Self> {
        let mut track = Self::new(name, channel);

        if channel > MAX_CHANNEL {
            return Err(CounterpointError::invalid_setting(
                "channel",
                format!("{} is not a MIDI channel (0-{}) in track '{}'", channel, MAX_CHANNEL, track.name),
            ));
        }
        if layout.velocity > messages::DATA_MAX {
            return Err(CounterpointError::invalid_setting(
                "velocity",
                format!("{} is above {}", layout.velocity, messages::DATA_MAX),
            ));
        }

        for (index, &pitch) in pitches.iter().enumerate() {
            let note = u8::try_from(pitch)
                .ok()
                .filter(|&n| n <= messages::DATA_MAX)
                .ok_or_else(|| CounterpointError::PitchOutOfRange {
                    track: track.name.clone(),
                    index,
                    pitch,
                })?;

            track.add_note(ExportNote::new(
                layout.start_of(index),
                note,
                layout.velocity,
                layout.note_ticks,
            ));
        }

        Ok(track)
    }

    /// Add a note
    pub fn add_note(&mut self, note: ExportNote) {
        self.notes.push(note);
    }

    /// Note numbers in track order
    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.note).collect()
    }
}

/// A note for export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNote {
    /// Start tick
    pub tick: u64,
    /// Note number (0-127)
    pub note: u8,
    /// Velocity (0-127), used for both note-on and note-off
    pub velocity: u8,
    /// Duration in ticks
    pub duration: u64,
}

impl ExportNote {
    /// Create a new export note
    pub fn new(tick: u64, note: u8, velocity: u8, duration: u64) -> Self {
        Self {
            tick,
            note,
            velocity,
            duration,
        }
    }

    /// End tick
    pub fn end_tick(&self) -> u64 {
        self.tick.saturating_add(self.duration)
    }
}

/// MIDI event for export
#[derive(Debug, Clone)]
struct MidiExportEvent {
    /// Absolute tick
    tick: u64,
    /// Event data
    data: Vec<u8>,
}

impl MidiExportEvent {
    fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            data: vec![
                messages::NOTE_ON | (channel & 0x0F),
                note & messages::DATA_MAX,
                velocity & messages::DATA_MAX,
            ],
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            data: vec![
                messages::NOTE_OFF | (channel & 0x0F),
                note & messages::DATA_MAX,
                velocity & messages::DATA_MAX,
            ],
        }
    }

    fn tempo(tick: u64, bpm: f64) -> Self {
        let microseconds = (60_000_000.0 / bpm) as u32;
        Self {
            tick,
            data: vec![
                messages::META,
                messages::META_TEMPO,
                0x03,
                ((microseconds >> 16) & 0xFF) as u8,
                ((microseconds >> 8) & 0xFF) as u8,
                (microseconds & 0xFF) as u8,
            ],
        }
    }

    fn time_signature(tick: u64, numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = (denominator as f64).log2() as u8;
        Self {
            tick,
            data: vec![
                messages::META,
                messages::META_TIME_SIGNATURE,
                0x04,
                numerator,
                denom_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        }
    }

    fn track_name(tick: u64, name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut data = vec![messages::META, messages::META_TRACK_NAME];
        push_variable_length(&mut data, bytes.len() as u32);
        data.extend_from_slice(bytes);
        Self { tick, data }
    }

    fn end_of_track() -> Self {
        Self {
            tick: 0, // Will be set correctly during writing
            data: vec![messages::META, messages::META_END_OF_TRACK, 0x00],
        }
    }
}

/// Append a variable-length quantity
fn push_variable_length(buffer: &mut Vec<u8>, mut value: u32) {
    let mut bytes = Vec::with_capacity(4);

    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buffer.extend_from_slice(&bytes);
}

/// MIDI file exporter
#[derive(Debug, Clone)]
pub struct MidiExporter {
    /// PPQN (ticks per quarter note)
    ppqn: u16,
    /// Tempo in BPM
    tempo: f64,
    /// Time signature
    time_sig: (u8, u8),
    /// Tracks to export
    tracks: Vec<ExportTrack>,
}

impl MidiExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self {
            ppqn: 480,
            tempo: 120.0,
            time_sig: (4, 4),
            tracks: Vec::new(),
        }
    }

    /// Set PPQN
    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.ppqn = ppqn.clamp(1, 0x7FFF);
    }

    /// Get PPQN
    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Set tempo
    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm.clamp(20.0, 300.0);
    }

    /// Get tempo
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Set time signature
    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        self.time_sig = (numerator.max(1), denominator.max(1));
    }

    /// Get time signature
    pub fn time_signature(&self) -> (u8, u8) {
        self.time_sig
    }

    /// Add a track
    pub fn add_track(&mut self, track: ExportTrack) {
        self.tracks.push(track);
    }

    /// Get tracks
    pub fn tracks(&self) -> &[ExportTrack] {
        &self.tracks
    }

    /// Export to file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        debug!(path = ?path.as_ref(), tracks = self.tracks.len(), "wrote MIDI file");
        Ok(())
    }

    /// Export to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Write a Type 1 MIDI file (one chunk per track).
    ///
    /// Fails with [`CounterpointError::DeltaTooLarge`] when two events in a
    /// track are more than [`MAX_DELTA_TICKS`] apart.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.write_header(writer, 1, self.tracks.len() as u16)?;

        for (index, track) in self.tracks.iter().enumerate() {
            let mut events = Vec::new();

            events.push(MidiExportEvent::track_name(0, &track.name));

            if index == 0 {
                events.push(MidiExportEvent::tempo(0, self.tempo));
                events.push(MidiExportEvent::time_signature(0, self.time_sig.0, self.time_sig.1));
            }

            for note in &track.notes {
                events.push(MidiExportEvent::note_on(
                    note.tick,
                    track.channel,
                    note.note,
                    note.velocity,
                ));
                events.push(MidiExportEvent::note_off(
                    note.end_tick(),
                    track.channel,
                    note.note,
                    note.velocity,
                ));
            }

            // Stable: a note-off stays ahead of a note-on on the same tick
            events.sort_by_key(|e| e.tick);
            self.write_track(writer, &track.name, &events)?;
        }

        Ok(())
    }

    /// Write MIDI file header chunk
    fn write_header<W: Write>(&self, writer: &mut W, format: u16, num_tracks: u16) -> io::Result<()> {
        // MThd
        writer.write_all(b"MThd")?;
        // Chunk length (always 6)
        writer.write_all(&[0, 0, 0, 6])?;
        // Format type
        writer.write_all(&format.to_be_bytes())?;
        // Number of tracks
        writer.write_all(&num_tracks.to_be_bytes())?;
        // PPQN
        writer.write_all(&self.ppqn.to_be_bytes())?;
        Ok(())
    }

    /// Write a track chunk
    fn write_track<W: Write>(&self, writer: &mut W, name: &str, events: &[MidiExportEvent]) -> Result<()> {
        let mut track_data = Vec::new();
        let mut last_tick = 0u64;

        for event in events {
            let delta = event.tick.saturating_sub(last_tick);
            let delta = u32::try_from(delta)
                .ok()
                .filter(|&d| u64::from(d) <= MAX_DELTA_TICKS)
                .ok_or_else(|| CounterpointError::DeltaTooLarge {
                    track: name.to_string(),
                    delta,
                    max: MAX_DELTA_TICKS,
                })?;
            push_variable_length(&mut track_data, delta);
            track_data.extend_from_slice(&event.data);
            last_tick = event.tick;
        }

        let end_event = MidiExportEvent::end_of_track();
        push_variable_length(&mut track_data, 0);
        track_data.extend_from_slice(&end_event.data);

        // MTrk
        writer.write_all(b"MTrk")?;
        let length = track_data.len() as u32;
        writer.write_all(&length.to_be_bytes())?;
        writer.write_all(&track_data)?;

        Ok(())
    }
}

impl Default for MidiExporter {
    fn default() -> Self {
        Self::new()
    }
}
