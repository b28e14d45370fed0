//! Transposing a note up, down or to its next enharmonic
//!
//! The plan writes explicit accidentals on every note the move could
//! reinterpret, then gives the moved note explicit accidentals including
//! naturalizers. `cleanup_bar` removes whatever turns out redundant.

use serde::{Deserialize, Serialize};

use crate::errors::ResolveError;
use crate::models::{
    natural_midi, AccidentalSymbols, BarState, FingeringKind, KeySig, MsNote, NextNote, NoteData,
    SymbolCode, SymbolUpdate, TuningConfig,
};
use crate::resolve::{add_naturalizing_symbols, deconstruct_symbol_list, read_note_data};
use crate::settings::EngineSettings;

use super::navigator::{choose_next_note, Direction};

/// Everything the host has to change to transpose one note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransposePlan {
    /// Explicit accidentals for notes the move could reinterpret. Apply first.
    pub explicit: Vec<SymbolUpdate>,

    pub next: NextNote,

    /// The note after the move: new line, spelling and explicit symbols
    pub note: MsNote,

    /// Left-to-right symbols of the moved note
    pub symbols: Vec<SymbolCode>,

    /// Tied continuations that take the same symbols (only in `explicit()` configs)
    pub tied: Vec<SymbolUpdate>,

    /// Fingering read as accidental entry before the move. It is marked
    /// processed on the moved note and the host should do the same.
    pub consumed_fingering: Option<usize>,
}

/// Explicit form of a note's effective accidental, with a naturalizer for
/// every group that has no symbol.
pub fn make_accidentals_explicit(
    note: &MsNote,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Result<SymbolUpdate, ResolveError> {
    let data = read_note_data(note, config, key_sig, bar, settings)?;
    let symbols = add_naturalizing_symbols(&deconstruct_symbol_list(&data.all_symbols(), config), config);
    log::debug!("explicit accidentals for {}: {:?}", note.id, symbols);

    Ok(SymbolUpdate {
        note: note.id,
        symbols,
    })
}

/// Explicit accidentals for every note on `note`'s line or `new_line`, at or
/// after its tick, except the note itself and its tied continuations.
///
/// A note that fails to resolve is skipped.
pub fn force_explicit_accidentals_after(
    note: &MsNote,
    new_line: i32,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Vec<SymbolUpdate> {
    bar.notes()
        .filter(|n| n.tick >= note.tick)
        .filter(|n| n.line == note.line || n.line == new_line)
        .filter(|n| !n.is_or_ties_to(note.id))
        .filter_map(|n| match make_accidentals_explicit(n, config, key_sig, bar, settings) {
            Ok(update) => Some(update),
            Err(e) => {
                log::warn!("skipping explicit accidental for {}: {}", n.id, e);
                None
            }
        })
        .collect()
}

/// Explicit accidentals the host applies together with a fingering entry.
///
/// Entering accidentals through a fingering changes the note's symbols, which
/// can reinterpret later notes on its line. Empty when `data` has no entry.
pub fn explicit_accidentals_for_entry(
    data: &NoteData,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Vec<SymbolUpdate> {
    if data.updated_symbols.is_none() {
        return Vec::new();
    }
    force_explicit_accidentals_after(&data.ms, data.ms.line, config, key_sig, bar, settings)
}

/// Plan moving `note` one step in `direction`.
///
/// `aux` selects an `aux(...)` declaration of the config; 0 is the plain
/// step. `Ok(None)` when there is nothing to move to.
pub fn plan_transpose(
    direction: Direction,
    aux: usize,
    note: &MsNote,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Result<Option<TransposePlan>, ResolveError> {
    let data = read_note_data(note, config, key_sig, bar, settings)?;
    let constrictions = config.aux(aux);

    let Some(next) = choose_next_note(direction, constrictions, &data, key_sig, config, bar)? else {
        return Ok(None);
    };

    let new_line = note.line + next.line_offset;
    let explicit = force_explicit_accidentals_after(note, new_line, config, key_sig, bar, settings);

    let is_enharmonic = direction == Direction::Enharmonic;
    let is_diatonic = !is_enharmonic
        && constrictions.map_or(false, |c| c.is_diatonic(config.num_chains()));
    let keep_secondary = if is_enharmonic {
        settings.keep_secondary_accidentals_after_enharmonic
    } else if is_diatonic {
        settings.keep_secondary_accidentals_after_diatonic
    } else {
        settings.keep_secondary_accidentals_after_transpose
    };

    let mut symbols: Vec<SymbolCode> = Vec::new();
    if keep_secondary {
        // naturalizers are added back per group below
        symbols.extend(
            data.secondary_acc_syms
                .iter()
                .filter(|sym| !config.is_naturalizer(sym))
                .cloned(),
        );
    }
    symbols.extend(next.xen.ordered_symbols.iter().cloned());
    let symbols = add_naturalizing_symbols(&deconstruct_symbol_list(&symbols, config), config);

    log::info!(
        "✅ {} moves to '{}' (line {} → {}), symbols {:?}",
        note.id,
        next.xen.hash,
        note.line,
        new_line,
        symbols
    );

    let tied = if config.always_explicit_accidental {
        bar.notes()
            .filter(|n| n.id != note.id && n.is_or_ties_to(note.id))
            .map(|n| SymbolUpdate {
                note: n.id,
                symbols: symbols.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut moved = note.clone();
    moved.line = new_line;
    moved.nominals_from_a4 = next.nominals_from_a4;
    moved.midi_note = natural_midi(next.nominals_from_a4);
    moved.accidentals = if symbols.is_empty() {
        None
    } else {
        Some(AccidentalSymbols::from_list(&symbols))
    };
    // the entry is already part of the old spelling
    if let Some(fingering) = data.consumed_fingering.and_then(|idx| moved.fingerings.get_mut(idx)) {
        fingering.kind = FingeringKind::Other;
    }

    Ok(Some(TransposePlan {
        explicit,
        next,
        note: moved,
        symbols,
        tied,
        consumed_fingering: data.consumed_fingering,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteId, NATURAL};
    use crate::parse::parse_tuning_config;
    use crate::settings::DEFAULT_TUNING_CONFIG;

    const SHARP: SymbolCode = SymbolCode::Glyph(3);

    const WITH_COMMA: &str = "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
bb b (100c) # x
sec()
'+' 50c";

    #[test]
    fn test_later_notes_made_explicit() {
        let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
        let a = MsNote::new(NoteId(1), 69, 0);
        let later_a = MsNote::new(NoteId(2), 69, 0).at(480, 0);
        let earlier_a = MsNote::new(NoteId(3), 69, 0).at(0, 1);
        let tied = MsNote::new(NoteId(4), 69, 0).at(960, 0).tied_from(NoteId(1));
        let bar = BarState::from_chords(
            0,
            Some(1920),
            vec![vec![a.clone()], vec![earlier_a], vec![later_a], vec![tied]],
        );

        let plan = plan_transpose(Direction::Up, 0, &a, &config, None, &bar, &EngineSettings::default())
            .unwrap()
            .unwrap();

        assert_eq!(plan.next.xen.hash, "0 3 1");
        assert_eq!(plan.symbols, vec![SHARP]);
        assert_eq!(plan.note.line, 0);
        assert_eq!(plan.note.midi_note, 69);

        let ids: Vec<NoteId> = plan.explicit.iter().map(|u| u.note).collect();
        assert!(ids.contains(&NoteId(2)));
        assert!(ids.contains(&NoteId(3)), "same tick in another voice is affected too");
        assert!(!ids.contains(&NoteId(1)));
        assert!(!ids.contains(&NoteId(4)), "tied continuation is left alone");
        for update in &plan.explicit {
            assert_eq!(update.symbols, vec![NATURAL]);
        }
        assert!(plan.tied.is_empty());
    }

    #[test]
    fn test_moved_note_spelling() {
        let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
        let a_sharp = MsNote::new(NoteId(1), 70, 0).with_symbols(&[SHARP]);
        let bar = BarState::from_chords(0, None, vec![vec![a_sharp.clone()]]);

        let plan = plan_transpose(Direction::Up, 0, &a_sharp, &config, None, &bar, &EngineSettings::default())
            .unwrap()
            .unwrap();
        assert_eq!(plan.note.nominals_from_a4, 1);
        assert_eq!(plan.note.line, -1);
        assert_eq!(plan.note.midi_note, 71);
        assert_eq!(plan.symbols, vec![NATURAL], "moved notes always carry explicit naturals");
    }

    #[test]
    fn test_secondary_carry_over() {
        let config = parse_tuning_config(WITH_COMMA).unwrap();
        let plus = SymbolCode::text("+");
        let note = MsNote::new(NoteId(1), 70, 0).with_symbols(&[plus.clone(), SHARP]);
        let bar = BarState::from_chords(0, None, vec![vec![note.clone()]]);
        let settings = EngineSettings::default();

        let enharmonic = plan_transpose(Direction::Enharmonic, 0, &note, &config, None, &bar, &settings)
            .unwrap()
            .unwrap();
        assert_eq!(enharmonic.next.xen.hash, "2 5 1", "A# cycles to Cbb");
        assert_eq!(enharmonic.next.line_offset, -2);
        assert_eq!(enharmonic.symbols, vec![plus.clone(), SymbolCode::Glyph(5)]);

        let up = plan_transpose(Direction::Up, 0, &note, &config, None, &bar, &settings)
            .unwrap()
            .unwrap();
        assert_eq!(up.next.xen.hash, "1");
        assert!(!up.symbols.contains(&plus), "plain transpose drops secondary accidentals");

        let keep = EngineSettings {
            keep_secondary_accidentals_after_transpose: true,
            ..EngineSettings::default()
        };
        let up = plan_transpose(Direction::Up, 0, &note, &config, None, &bar, &keep)
            .unwrap()
            .unwrap();
        assert_eq!(up.symbols, vec![plus]);
    }

    #[test]
    fn test_explicit_mode_updates_ties() {
        let config = parse_tuning_config(&format!("{}\nexplicit()", DEFAULT_TUNING_CONFIG)).unwrap();
        assert!(config.always_explicit_accidental);

        let a = MsNote::new(NoteId(1), 69, 0);
        let tied = MsNote::new(NoteId(2), 69, 0).at(960, 0).tied_from(NoteId(1));
        let bar = BarState::from_chords(0, None, vec![vec![a.clone()], vec![tied]]);

        let plan = plan_transpose(Direction::Down, 0, &a, &config, None, &bar, &EngineSettings::default())
            .unwrap()
            .unwrap();
        assert_eq!(plan.tied.len(), 1);
        assert_eq!(plan.tied[0].note, NoteId(2));
        assert_eq!(plan.tied[0].symbols, plan.symbols);
    }

    #[test]
    fn test_entered_fingering_is_not_reapplied() {
        let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
        let settings = EngineSettings::default();
        let a = MsNote::new(NoteId(1), 69, 0).with_fingering("#");
        let bar = BarState::from_chords(0, None, vec![vec![a.clone()]]);

        let plan = plan_transpose(Direction::Up, 0, &a, &config, None, &bar, &settings)
            .unwrap()
            .unwrap();
        assert_eq!(plan.next.xen.hash, "1", "A# from the fingering moves up to B");
        assert_eq!(plan.consumed_fingering, Some(0));
        assert_eq!(plan.note.fingerings[0].kind, FingeringKind::Other);

        let moved_bar = BarState::from_chords(0, None, vec![vec![plan.note.clone()]]);
        let data = read_note_data(&plan.note, &config, None, &moved_bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "1");
        assert_eq!(data.consumed_fingering, None);
    }

    #[test]
    fn test_fingering_entry_makes_later_notes_explicit() {
        let config = parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap();
        let settings = EngineSettings::default();
        let entered = MsNote::new(NoteId(1), 69, 0).with_fingering("#");
        let later = MsNote::new(NoteId(2), 69, 0).at(480, 0);
        let bar = BarState::from_chords(0, None, vec![vec![entered.clone()], vec![later.clone()]]);

        let data = read_note_data(&entered, &config, None, &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "0 3 1");
        let updates = explicit_accidentals_for_entry(&data, &config, None, &bar, &settings);
        assert_eq!(
            updates,
            vec![SymbolUpdate {
                note: NoteId(2),
                symbols: vec![NATURAL],
            }]
        );

        let mut entered = entered.with_symbols(&data.updated_symbols.clone().unwrap());
        entered.fingerings[0].kind = FingeringKind::Other;
        let later = later.with_symbols(&updates[0].symbols);
        let bar = BarState::from_chords(0, None, vec![vec![entered.clone()], vec![later.clone()]]);

        let data = read_note_data(&entered, &config, None, &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "0 3 1");
        let data = read_note_data(&later, &config, None, &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "0", "the later A stays natural");

        let plain = MsNote::new(NoteId(3), 69, 0);
        let bar = BarState::from_chords(0, None, vec![vec![plain.clone()], vec![later]]);
        let data = read_note_data(&plain, &config, None, &bar, &settings).unwrap();
        assert!(explicit_accidentals_for_entry(&data, &config, None, &bar, &settings).is_empty());
    }

    #[test]
    fn test_no_enharmonic_is_none() {
        let config = parse_tuning_config("A4: 440\n0 200c 300c 500c 700c 800c 1000c 1200c").unwrap();
        let a = MsNote::new(NoteId(1), 69, 0);
        let bar = BarState::from_chords(0, None, vec![vec![a.clone()]]);
        let plan = plan_transpose(Direction::Enharmonic, 0, &a, &config, None, &bar, &EngineSettings::default())
            .unwrap();
        assert!(plan.is_none());
    }
}
