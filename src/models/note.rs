//! Tokenized host notes
//!
//! The host adapter turns each score note into an `MsNote`: its pitch
//! spelling relative to A4, attached accidental symbols and annotation text,
//! and its position in the bar.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::accidental_symbols::AccidentalSymbols;
use super::symbol_code::SymbolCode;

/// Letter → nominals from A
const LETTER_NOMINALS: [(char, i32); 7] = [
    ('a', 0),
    ('b', 1),
    ('c', 2),
    ('d', 3),
    ('e', 4),
    ('f', 5),
    ('g', 6),
];

/// Letter → 12edo semitones from A, within the A-based octave of A4
const LETTER_SEMITONES: [(char, i32); 7] = [
    ('a', 0),
    ('b', 2),
    ('c', -9),
    ('d', -7),
    ('e', -5),
    ('f', -4),
    ('g', -2),
];

/// Letters along the circle of fifths starting at F, as used by tonal pitch classes
const TPC_LETTERS: [char; 7] = ['f', 'c', 'g', 'd', 'a', 'e', 'b'];

/// Tonal pitch class of natural F
const TPC_F: i32 = 13;

pub fn letter_nominal(letter: char) -> Option<i32> {
    let letter = letter.to_ascii_lowercase();
    LETTER_NOMINALS
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, n)| *n)
}

pub fn letter_semitones(letter: char) -> Option<i32> {
    let letter = letter.to_ascii_lowercase();
    LETTER_SEMITONES
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, s)| *s)
}

/// Nominals from A4 of a letter + scientific octave (octaves change at C)
pub fn nominals_from_letter_octave(letter: char, octave: i32) -> Option<i32> {
    let nominal = letter_nominal(letter)?;
    let mut nominals = (octave - 4) * 7 + nominal;
    if nominal >= 2 {
        nominals -= 7;
    }
    Some(nominals)
}

/// MIDI note of a letter + scientific octave without accidentals
pub fn midi_of_letter_octave(letter: char, octave: i32) -> Option<i32> {
    Some(letter_semitones(letter)? + (octave - 4) * 12 + 69)
}

/// MIDI note of the unaltered letter `nominals_from_a4` letters from A4
pub fn natural_midi(nominals_from_a4: i32) -> i32 {
    const SEMITONES_FROM_A: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
    69 + nominals_from_a4.div_euclid(7) * 12 + SEMITONES_FROM_A[nominals_from_a4.rem_euclid(7) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FingeringKind {
    /// Freshly typed by the user: may be accidental entry or a tuning annotation
    Unprocessed,
    /// Recognized as a tuning annotation on an earlier pass
    ProcessedAnnotation,
    /// Anything else (steps/cents display, real fingerings)
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingering {
    pub text: String,
    pub kind: FingeringKind,
}

impl Fingering {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FingeringKind::Unprocessed,
        }
    }

    /// Tuning annotations are read from unprocessed and processed fingerings
    pub fn is_annotation_candidate(&self) -> bool {
        matches!(
            self.kind,
            FingeringKind::Unprocessed | FingeringKind::ProcessedAnnotation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsNote {
    pub id: NoteId,

    /// 12edo MIDI pitch as written
    pub midi_note: i32,

    /// Letter-name steps from A4
    pub nominals_from_a4: i32,

    /// Explicit accidental symbols, `None` if the note carries none
    pub accidentals: Option<AccidentalSymbols>,

    pub fingerings: Vec<Fingering>,

    pub tick: i64,

    /// Staff line, decreasing upwards
    pub line: i32,

    /// 0..=3
    pub voice: usize,

    /// First note of the tie chain this note continues
    pub tied_from: Option<NoteId>,
}

impl MsNote {
    /// Note at tick 0 in voice 0, placed on the line matching its nominal
    pub fn new(id: NoteId, midi_note: i32, nominals_from_a4: i32) -> Self {
        Self {
            id,
            midi_note,
            nominals_from_a4,
            accidentals: None,
            fingerings: Vec::new(),
            tick: 0,
            line: -nominals_from_a4,
            voice: 0,
            tied_from: None,
        }
    }

    /// Tokenize from a MIDI pitch and tonal pitch class (F = 13, C = 14, ...)
    pub fn from_tpc(id: NoteId, midi_note: i32, tpc: i32) -> Self {
        let letter = TPC_LETTERS[(tpc - TPC_F).rem_euclid(7) as usize];
        let alteration = (tpc + 1).div_euclid(7) - 2;
        let nominal = letter_nominal(letter).unwrap_or(0);
        let letter_pc = letter_semitones(letter).unwrap_or(0).rem_euclid(12);

        let octaves_from_a4 =
            (midi_note - 69).div_euclid(12) - (letter_pc + alteration).div_euclid(12);

        Self::new(id, midi_note, nominal + octaves_from_a4 * 7)
    }

    pub fn with_symbols(mut self, symbols: &[SymbolCode]) -> Self {
        self.accidentals = if symbols.is_empty() {
            None
        } else {
            Some(AccidentalSymbols::from_list(symbols))
        };
        self
    }

    pub fn with_fingering(mut self, text: &str) -> Self {
        self.fingerings.push(Fingering::new(text));
        self
    }

    pub fn at(mut self, tick: i64, voice: usize) -> Self {
        self.tick = tick;
        self.voice = voice;
        self
    }

    pub fn on_line(mut self, line: i32) -> Self {
        self.line = line;
        self
    }

    pub fn tied_from(mut self, first: NoteId) -> Self {
        self.tied_from = Some(first);
        self
    }

    pub fn has_accidentals(&self) -> bool {
        self.accidentals.as_ref().map_or(false, |acc| !acc.is_empty())
    }

    /// Same note, or a tied continuation of it
    pub fn is_or_ties_to(&self, id: NoteId) -> bool {
        self.id == id || self.tied_from == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominals_from_letter_octave() {
        assert_eq!(nominals_from_letter_octave('A', 4), Some(0));
        assert_eq!(nominals_from_letter_octave('b', 4), Some(1));
        assert_eq!(nominals_from_letter_octave('c', 4), Some(-5), "C4 is below A4");
        assert_eq!(nominals_from_letter_octave('c', 5), Some(2));
        assert_eq!(nominals_from_letter_octave('g', 3), Some(-8));
        assert_eq!(nominals_from_letter_octave('h', 4), None);
    }

    #[test]
    fn test_midi_of_letter_octave() {
        assert_eq!(midi_of_letter_octave('a', 4), Some(69));
        assert_eq!(midi_of_letter_octave('c', 4), Some(60));
        assert_eq!(midi_of_letter_octave('b', 3), Some(59));
    }

    #[test]
    fn test_natural_midi() {
        assert_eq!(natural_midi(0), 69);
        assert_eq!(natural_midi(1), 71);
        assert_eq!(natural_midi(-5), 60);
        assert_eq!(natural_midi(-1), 67);
        assert_eq!(natural_midi(7), 81);
    }

    #[test]
    fn test_from_tpc() {
        // A4
        assert_eq!(MsNote::from_tpc(NoteId(1), 69, 17).nominals_from_a4, 0);
        // A#4
        assert_eq!(MsNote::from_tpc(NoteId(1), 70, 24).nominals_from_a4, 0);
        // Ab4 sounds below A4 but is spelled on the A line
        assert_eq!(MsNote::from_tpc(NoteId(1), 68, 10).nominals_from_a4, 0);
        // Abbb4 = F#4
        assert_eq!(MsNote::from_tpc(NoteId(1), 66, -4).nominals_from_a4, 0);
        // C4
        assert_eq!(MsNote::from_tpc(NoteId(1), 60, 14).nominals_from_a4, -5);
        // Gx4 = A4
        assert_eq!(MsNote::from_tpc(NoteId(1), 69, 29).nominals_from_a4, -1);
        // Cb4 = B3
        assert_eq!(MsNote::from_tpc(NoteId(1), 59, 7).nominals_from_a4, -5);
    }

    #[test]
    fn test_default_line_follows_nominal() {
        let low = MsNote::new(NoteId(1), 60, -5);
        let high = MsNote::new(NoteId(2), 69, 0);
        assert!(high.line < low.line, "higher notes sit on smaller line numbers");
    }
}
