// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File-to-file harmonization.
//!
//! Reads a melody from a MIDI file, generates its counter-melody and
//! writes both voices to a new two-track MIDI file.

use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{ExportConfig, JobConfig};
use crate::counterpoint::{Counterpoint, CounterpointGenerator};
use crate::midi::{read_melody, ExportTrack, MidiExporter};
use crate::music::{KeySignature, Pitch};

/// Outcome of a harmonization run
#[derive(Debug, Clone)]
pub struct Harmonization {
    /// Key the counter-melody was written in
    pub key: KeySignature,
    /// Input melody
    pub melody: Vec<Pitch>,
    /// Generated counter-melody
    pub counterpoint: Counterpoint,
}

impl Harmonization {
    /// Counter-melody pitches
    pub fn counter_melody(&self) -> Vec<Pitch> {
        self.counterpoint.pitches()
    }
}

/// Generate a counter-melody for an in-memory melody
pub fn harmonize_melody(melody: Vec<Pitch>, key: KeySignature, seed: Option<u64>) -> Harmonization {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if melody.is_empty() {
        warn!("Melody is empty, counter-melody will be empty too");
    }

    let counterpoint = CounterpointGenerator::with_rng(key.scale(), rng).harmonize(&melody);

    let fallbacks = counterpoint.fallback_positions();
    if !fallbacks.is_empty() {
        warn!(
            count = fallbacks.len(),
            positions = ?fallbacks,
            "No consonant candidate for some notes, doubled the melody instead"
        );
    }

    Harmonization {
        key,
        melody,
        counterpoint,
    }
}

/// Build the two-track exporter for a melody and its counter-melody.
///
/// Export settings are validated first; nothing is clamped.
pub fn build_exporter(
    melody: &[Pitch],
    counter_melody: &[Pitch],
    export: &ExportConfig,
) -> crate::Result<MidiExporter> {
    export.validate()?;
    let layout = export.layout();

    let mut exporter = MidiExporter::new();
    exporter.set_ppqn(export.ppqn);
    exporter.set_tempo(export.tempo);
    exporter.add_track(ExportTrack::from_pitches(
        export.melody_name.as_str(),
        export.melody_channel,
        melody,
        &layout,
    )?);
    exporter.add_track(ExportTrack::from_pitches(
        export.counter_name.as_str(),
        export.counter_channel,
        counter_melody,
        &layout,
    )?);

    Ok(exporter)
}

/// Harmonize the melody in `input` and write both voices to `output`
pub fn harmonize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &JobConfig,
) -> Result<Harmonization> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let key = config.key_signature()?;

    let melody = read_melody(input)
        .with_context(|| format!("Failed to read melody from {:?}", input))?;
    info!(notes = melody.len(), %key, "Loaded melody");

    let result = harmonize_melody(melody, key, config.seed);

    build_exporter(&result.melody, &result.counter_melody(), &config.export)
        .and_then(|exporter| exporter.export(output))
        .with_context(|| format!("Failed to write counterpoint to {:?}", output))?;
    info!(
        path = ?output,
        cadence_corrected = result.counterpoint.cadence_corrected,
        "Wrote counterpoint"
    );

    Ok(result)
}
