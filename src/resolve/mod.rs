//! Note resolution
//!
//! Turns a tokenized host note plus its bar into a `NoteData`: which
//! accidentals are in effect, which of them are primary (identify the
//! spelling) and which are secondary (only add cents).

pub mod accidental;
pub mod fingering;
pub mod groups;
pub mod note_data;

pub use accidental::{get_accidental, ExcludeMode};
pub use fingering::{
    parse_ascii_accidentals, parse_av_literal, read_fingering_accidental_input, FingeringEntry,
    FingeringEntryKind,
};
pub use groups::{
    add_naturalizing_symbols, contains_only_naturalizing_symbols, deconstruct_symbol_groups,
    deconstruct_symbol_list, merge_symbol_groups, merge_symbol_groups_flat, remove_unused_symbols,
};
pub use note_data::read_note_data;
