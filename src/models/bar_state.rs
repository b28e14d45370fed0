//! Snapshot of one bar of one staff
//!
//! Supplied by the host adapter and only read by the resolver. Notes are
//! grouped as line → tick → voice → chords, where each chord holds the notes
//! of one host chord that sit on that line. Grace chords precede the main
//! chord of their tick.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::accidental_symbols::AccidentalSymbols;
use super::note::{MsNote, NoteId};
use super::symbol_code::SymbolCode;
use crate::errors::ResolveError;

pub const NUM_VOICES: usize = 4;

/// Notes of one chord on one line
pub type ChordSlice = Vec<MsNote>;

/// Chords per voice at one tick
pub type VoiceSlots = [Vec<ChordSlice>; NUM_VOICES];

/// Replacement symbol list for one note; an empty list clears its accidentals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolUpdate {
    pub note: NoteId,
    pub symbols: Vec<SymbolCode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarState {
    pub start_tick: i64,

    /// Tick of the next bar, `None` for the last bar
    pub end_tick: Option<i64>,

    lines: BTreeMap<i32, BTreeMap<i64, VoiceSlots>>,
}

impl BarState {
    pub fn new(start_tick: i64, end_tick: Option<i64>) -> Self {
        Self {
            start_tick,
            end_tick,
            lines: BTreeMap::new(),
        }
    }

    /// Build from chords given in score order (grace chords before their main chord)
    pub fn from_chords(
        start_tick: i64,
        end_tick: Option<i64>,
        chords: Vec<Vec<MsNote>>,
    ) -> Self {
        let mut bar = Self::new(start_tick, end_tick);
        for chord in chords {
            bar.push_chord(chord);
        }
        bar
    }

    pub fn contains_tick(&self, tick: i64) -> bool {
        tick >= self.start_tick && self.end_tick.map_or(true, |end| tick < end)
    }

    pub fn check_tick(&self, tick: i64) -> Result<(), ResolveError> {
        if self.contains_tick(tick) {
            Ok(())
        } else {
            Err(ResolveError::TickOutsideBar {
                tick,
                start: self.start_tick,
                end: self.end_tick,
            })
        }
    }

    /// Append one host chord. All notes take the tick and voice of the first note.
    pub fn push_chord(&mut self, notes: Vec<MsNote>) {
        let (tick, voice) = match notes.first() {
            Some(first) => (first.tick, first.voice.min(NUM_VOICES - 1)),
            None => return,
        };

        let mut by_line: BTreeMap<i32, ChordSlice> = BTreeMap::new();
        for mut note in notes {
            note.tick = tick;
            note.voice = voice;
            by_line.entry(note.line).or_default().push(note);
        }

        for (line, slice) in by_line {
            self.lines
                .entry(line)
                .or_default()
                .entry(tick)
                .or_default()[voice]
                .push(slice);
        }
    }

    pub fn line(&self, line: i32) -> Option<&BTreeMap<i64, VoiceSlots>> {
        self.lines.get(&line)
    }

    pub fn lines(&self) -> impl Iterator<Item = (i32, &BTreeMap<i64, VoiceSlots>)> {
        self.lines.iter().map(|(line, ticks)| (*line, ticks))
    }

    pub fn notes(&self) -> impl Iterator<Item = &MsNote> {
        self.lines
            .values()
            .flat_map(|ticks| ticks.values())
            .flat_map(|voices| voices.iter())
            .flat_map(|chords| chords.iter())
            .flat_map(|chord| chord.iter())
    }

    fn notes_mut(&mut self) -> impl Iterator<Item = &mut MsNote> {
        self.lines
            .values_mut()
            .flat_map(|ticks| ticks.values_mut())
            .flat_map(|voices| voices.iter_mut())
            .flat_map(|chords| chords.iter_mut())
            .flat_map(|chord| chord.iter_mut())
    }

    pub fn find(&self, id: NoteId) -> Option<&MsNote> {
        self.notes().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replace the explicit accidentals of a note
    pub fn set_accidentals(&mut self, id: NoteId, symbols: &[SymbolCode]) -> Result<(), ResolveError> {
        let note = self
            .notes_mut()
            .find(|n| n.id == id)
            .ok_or(ResolveError::NoteNotInBar(id))?;
        note.accidentals = if symbols.is_empty() {
            None
        } else {
            Some(AccidentalSymbols::from_list(symbols))
        };
        Ok(())
    }

    pub fn apply_symbol_updates(&mut self, updates: &[SymbolUpdate]) -> Result<(), ResolveError> {
        for update in updates {
            self.set_accidentals(update.note, &update.symbols)?;
        }
        Ok(())
    }
}
