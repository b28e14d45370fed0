//! Removing redundant accidentals from a bar
//!
//! Walks each line in reading order, tracking the accidental in effect per
//! symbol group. A note's group is redundant when it writes exactly what is
//! already in effect (or what the key signature implies).

use std::collections::BTreeSet;

use crate::errors::ResolveError;
use crate::models::{
    valid_key_sig, AccidentalSymbols, BarState, KeySig, MsNote, SymbolCode, SymbolUpdate,
    TuningConfig,
};
use crate::resolve::{
    deconstruct_symbol_groups, merge_symbol_groups, merge_symbol_groups_flat, read_note_data,
    remove_unused_symbols,
};
use crate::settings::EngineSettings;

/// Symbol updates removing every redundant accidental in `bar`.
///
/// Configs declaring `explicit()` keep all accidentals. A chord whose notes
/// on one line disagree about the accidental is left untouched.
pub fn cleanup_bar(
    bar: &BarState,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    settings: &EngineSettings,
) -> Result<Vec<SymbolUpdate>, ResolveError> {
    if config.always_explicit_accidental {
        log::debug!("explicit() config, keeping all accidentals");
        return Ok(Vec::new());
    }

    let key_sig = valid_key_sig(key_sig, config);
    let mut updates = Vec::new();

    for (line, ticks) in bar.lines() {
        let mut state: Option<Vec<AccidentalSymbols>> = None;

        for voices in ticks.values() {
            for chords in voices.iter() {
                for chord in chords {
                    let Some(first) = chord.first() else {
                        continue;
                    };
                    let nominal = config.nominal_of(first.nominals_from_a4);
                    let key_sig_groups = key_sig
                        .and_then(|ks| ks.symbols(nominal))
                        .and_then(|syms| remove_unused_symbols(&syms, config))
                        .map(|syms| deconstruct_symbol_groups(&syms, config));

                    if !chord_is_consistent(chord, key_sig_groups.as_deref(), config) {
                        log::debug!("line {}: notes of one chord disagree, skipping", line);
                        continue;
                    }

                    for note in chord {
                        let Some(acc) = note
                            .accidentals
                            .as_ref()
                            .and_then(|a| remove_unused_symbols(a, config))
                        else {
                            continue;
                        };

                        let mut prior = match (&state, &key_sig_groups) {
                            (Some(s), Some(ks)) => merge_symbol_groups(ks, s),
                            (Some(s), None) => s.clone(),
                            (None, Some(ks)) => ks.clone(),
                            (None, None) => vec![AccidentalSymbols::new(); config.num_groups()],
                        };
                        let mut current = deconstruct_symbol_groups(&acc, config);

                        for (idx, group) in current.iter_mut().enumerate() {
                            if prior[idx].is_empty() {
                                prior[idx].insert(config.naturalizer(idx), 1);
                            }
                            if group.is_empty() {
                                *group = prior[idx].clone();
                            } else {
                                // naturalizers never stack
                                let naturalizers: Vec<SymbolCode> =
                                    group.symbols().filter(|s| config.is_naturalizer(s)).cloned().collect();
                                for sym in naturalizers {
                                    group.set(sym, 1);
                                }
                            }
                        }

                        let blacklist: BTreeSet<SymbolCode> = current
                            .iter()
                            .zip(&prior)
                            .filter(|(group, prior)| !group.is_empty() && group == prior)
                            .flat_map(|(group, _)| group.symbols().cloned())
                            .collect();

                        if !blacklist.is_empty() {
                            match redundant_removed(note, &blacklist, config, key_sig, bar, settings) {
                                Ok(update) => updates.push(update),
                                Err(e) => log::warn!("skipping cleanup of {}: {}", note.id, e),
                            }
                        }

                        state = Some(merge_symbol_groups(&prior, &current));
                    }
                }
            }
        }
    }

    if !updates.is_empty() {
        log::info!("removing redundant accidentals from {} notes", updates.len());
    }
    Ok(updates)
}

/// All explicit accidentals on one line of a chord agree once merged with
/// the key signature
fn chord_is_consistent(
    chord: &[MsNote],
    key_sig_groups: Option<&[AccidentalSymbols]>,
    config: &TuningConfig,
) -> bool {
    let mut first: Option<AccidentalSymbols> = None;

    for note in chord {
        let Some(acc) = note
            .accidentals
            .as_ref()
            .and_then(|a| remove_unused_symbols(a, config))
        else {
            continue;
        };

        if let Some(prev) = &first {
            let effective = merge_symbol_groups_flat(
                &deconstruct_symbol_groups(prev, config),
                &deconstruct_symbol_groups(&acc, config),
            );
            if effective.as_ref() != Some(prev) {
                return false;
            }
            continue;
        }

        first = match key_sig_groups {
            Some(ks) => merge_symbol_groups_flat(ks, &deconstruct_symbol_groups(&acc, config)),
            None => Some(acc),
        };
    }

    true
}

/// The note's symbols in rendering order, minus the blacklisted ones
fn redundant_removed(
    note: &MsNote,
    blacklist: &BTreeSet<SymbolCode>,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Result<SymbolUpdate, ResolveError> {
    let data = read_note_data(note, config, key_sig, bar, settings)?;
    let symbols: Vec<SymbolCode> = data
        .all_symbols()
        .into_iter()
        .filter(|sym| !blacklist.contains(sym))
        .collect();
    log::debug!("{}: removed {:?}, keeping {:?}", note.id, blacklist, symbols);

    Ok(SymbolUpdate {
        note: note.id,
        symbols,
    })
}
