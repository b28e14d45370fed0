//! Cents of a resolved note
//!
//! Spelling cents from the tuning table, plus reference frequency, equave
//! and secondary accidentals, then per-note annotations: a JI ratio
//! (`5/4.`) replaces the tuning, a `+`/`-` cents offset is added on top.

use crate::models::{FingeringKind, MsNote, NoteData, TuningConfig};
use crate::parse::evaluate;
use crate::parse::tokens::ratio_to_cents;
use crate::settings::EngineSettings;
use crate::utils::remove_formatting_code;

/// Tuning annotations found on a note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TuningAnnotations {
    /// Sum of all `+`/`-` offsets
    pub cents_offset: f64,
    /// Cents of the last JI ratio relative to the 1/1 note, before equave reduction
    pub ji_cents: Option<f64>,
    /// Fingering indices recognized as annotations; hosts mark these processed
    pub indices: Vec<usize>,
}

/// Read `+`/`-` offsets and JI ratios from a note's annotations.
///
/// `skip` is a fingering already consumed as accidental entry.
pub fn read_tuning_annotations(
    note: &MsNote,
    config: &TuningConfig,
    skip: Option<usize>,
    settings: &EngineSettings,
) -> TuningAnnotations {
    let mut found = TuningAnnotations::default();

    for (idx, fingering) in note.fingerings.iter().enumerate() {
        if !fingering.is_annotation_candidate() || skip == Some(idx) {
            continue;
        }

        let text = remove_formatting_code(&fingering.text);
        let text = text.trim();

        if let Some(sign) = text.chars().next().filter(|c| *c == '+' || *c == '-') {
            if let Ok(cents) = evaluate(&text[1..]) {
                found.cents_offset += if sign == '+' { cents } else { -cents };
                found.indices.push(idx);
            }
            continue;
        }

        let ratio_text = if settings.require_period_after_fingering_ratio {
            match text.strip_suffix('.') {
                Some(t) => t,
                None => continue,
            }
        } else {
            text
        };

        match evaluate(ratio_text) {
            Ok(ratio) if ratio != 0.0 => {
                found.ji_cents = Some(ratio_to_cents(ratio));
                found.indices.push(idx);
            }
            Ok(_) => found.indices.push(idx),
            Err(_) => {}
        }
    }

    found
}

/// Cents of the note from A440, or if `absolute` is false, from the 12edo
/// pitch of the note's MIDI number.
pub fn calc_cents_offset(
    data: &NoteData,
    config: &TuningConfig,
    absolute: bool,
    settings: &EngineSettings,
) -> f64 {
    let mut cents = match config.tuning(&data.xen.hash) {
        Some(entry) => entry.unwrapped(config.equave_size),
        None => {
            log::error!("❌ no tuning for '{}'", data.xen.hash);
            0.0
        }
    };

    cents += config.reference_cents_from_a440();
    cents += data.equaves as f64 * config.equave_size;

    for (&idx, &times) in &data.secondary_acc_matches {
        if let Some(sec) = config.secondary(idx) {
            cents += times as f64 * sec.tuning.cents_for(data.xen.nominal);
        }
    }

    let annotations = read_tuning_annotations(&data.ms, config, data.consumed_fingering, settings);

    if let Some(ji) = annotations.ji_cents {
        let ji = ji + config.relative_reference_cents() + config.reference_cents_from_a440();
        let equave = config.equave_size;
        cents = ji - ((ji - cents) / equave).round() * equave;
    }

    cents += annotations.cents_offset;

    if absolute {
        cents
    } else {
        cents - (data.ms.midi_note - 69) as f64 * 100.0
    }
}

/// Fingerings of a note that are recognized as tuning annotations
pub fn annotation_fingerings(data: &NoteData, config: &TuningConfig, settings: &EngineSettings) -> Vec<usize> {
    read_tuning_annotations(&data.ms, config, data.consumed_fingering, settings)
        .indices
        .into_iter()
        .filter(|&idx| {
            data.ms
                .fingerings
                .get(idx)
                .map_or(false, |f| f.kind == FingeringKind::Unprocessed)
        })
        .collect()
}
