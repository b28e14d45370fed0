//! Shared types for the WASM API
//!
//! Inputs and results crossing the JS boundary, in the shape hosts build
//! them rather than the engine's internal layout.

use crate::models::{BarState, MsNote, NoteData, SymbolUpdate};
use crate::tuning::{DisplayText, PlaybackPlan};

/// One bar of one staff as the host walks it
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default)]
pub struct BarInput {
    pub start_tick: i64,
    /// Tick of the next bar, absent for the last bar
    pub end_tick: Option<i64>,
    /// Host chords in score order, grace chords before their main chord
    pub chords: Vec<Vec<MsNote>>,
}

impl BarInput {
    pub fn to_bar_state(&self) -> BarState {
        BarState::from_chords(self.start_tick, self.end_tick, self.chords.clone())
    }
}

/// A resolved note with everything the host needs to tune and label it
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct ResolvedNote {
    pub data: NoteData,
    /// Cents from the written MIDI pitch
    pub cents: f64,
    pub playback: PlaybackPlan,
    /// Fingerings to mark as processed tuning annotations
    pub annotation_fingerings: Vec<usize>,
    /// Explicit accidentals for later notes, applied together with
    /// `data.updated_symbols` when a fingering entered accidentals
    pub explicit: Vec<SymbolUpdate>,
    pub steps: Option<DisplayText>,
    pub cents_text: DisplayText,
}
