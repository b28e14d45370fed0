//! Playback pitch for notes tuned far from their written MIDI pitch
//!
//! Fine tuning only sounds right within a few semitones of the sample's
//! pitch. Beyond the threshold the note is played on another MIDI pitch and
//! fine-tuned from there, avoiding pitches other notes of the chord already
//! sound on (hosts merge notes sharing a MIDI pitch).

use serde::{Deserialize, Serialize};

use crate::settings::EngineSettings;

/// Furthest distance searched for a free MIDI pitch
const MAX_SEARCH: i32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPlan {
    /// Semitones added to the written MIDI pitch for playback
    pub midi_offset: i32,
    /// Remaining fine tuning in cents
    pub tuning: f64,
}

/// Plan playback of a note written at `midi_note` needing `cents_offset`
/// from 12edo. `occupied` holds the MIDI pitches sounded by the other notes
/// of the chord.
pub fn plan_playback(
    cents_offset: f64,
    midi_note: i32,
    occupied: &[i32],
    settings: &EngineSettings,
) -> PlaybackPlan {
    let mut midi_offset = (cents_offset / 100.0).round() as i32;
    if midi_offset.abs() <= settings.play_event_mod_semitones_threshold {
        midi_offset = 0;
    }

    let is_free = |offset: i32| !occupied.contains(&(midi_note + offset));

    if !is_free(midi_offset) {
        for distance in 1..MAX_SEARCH {
            let best = [midi_offset - distance, midi_offset + distance]
                .into_iter()
                .filter(|&test| is_free(test))
                .min_by_key(|test| test.abs());

            if let Some(best) = best {
                log::debug!("MIDI pitch {} taken, playing on offset {}", midi_note + midi_offset, best);
                midi_offset = best;
                break;
            }
        }
    }

    PlaybackPlan {
        midi_offset,
        tuning: cents_offset - midi_offset as f64 * 100.0,
    }
}
