//! Data model of the notation engine
//!
//! Symbols and their multisets, compiled tuning configs, key signatures,
//! tokenized host notes, bar snapshots and resolved notes.

pub mod accidental_symbols;
pub mod bar_state;
pub mod key_sig;
pub mod note;
pub mod note_data;
pub mod symbol_code;
pub mod tuning_config;
pub mod xen_note;

pub use accidental_symbols::AccidentalSymbols;
pub use bar_state::{BarState, ChordSlice, SymbolUpdate, VoiceSlots, NUM_VOICES};
pub use key_sig::{valid_key_sig, KeySig};
pub use note::{
    midi_of_letter_octave, natural_midi, nominals_from_letter_octave, Fingering, FingeringKind,
    MsNote, NoteId,
};
pub use note_data::{NextNote, NoteData};
pub use symbol_code::{SymbolCode, NATURAL, TEXT_MARKER};
pub use tuning_config::{
    AccidentalChain, AsciiConversion, CentsDisplay, CentsReference, ConstantConstrictions,
    DisplayPosition, Ligature, LigatureEntry, SecondaryAccidental, SecondaryTuning, StepsDisplay,
    TuningConfig, TuningEntry, TuningOverride,
};
pub use xen_note::{av_key, xen_hash, AccidentalVector, XenNote};
