//! Resolve a host note into its spelling within a tuning config
//!
//! The effective accidental (bar-local, annotation entry, key signature) is
//! matched greedily against ligatures, then accidental chains in declaration
//! order, then secondary accidentals. Whatever the primary matches produce
//! keys the compiled spelling.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::errors::ResolveError;
use crate::models::{
    valid_key_sig, xen_hash, AccidentalSymbols, BarState, KeySig, MsNote, NoteData, SymbolCode,
    TuningConfig,
};
use crate::settings::EngineSettings;

use super::accidental::{get_accidental, ExcludeMode};
use super::fingering::{read_fingering_accidental_input, FingeringEntryKind};
use super::groups::{
    add_naturalizing_symbols, deconstruct_symbol_groups, deconstruct_symbol_list,
    merge_symbol_groups_flat, remove_unused_symbols,
};

/// Secondary accidentals stack, up to this many of each
const MAX_SECONDARY_REPEATS: u32 = 70;

/// Resolve `note` against `config`.
///
/// The note is normally part of `bar`. A note the bar does not contain is
/// resolved as if it were placed after everything at its tick and voice.
pub fn read_note_data(
    note: &MsNote,
    config: &TuningConfig,
    key_sig: Option<&KeySig>,
    bar: &BarState,
    settings: &EngineSettings,
) -> Result<NoteData, ResolveError> {
    let mut trace = String::new();

    let nominal = config.nominal_of(note.nominals_from_a4);
    let equaves = config.equaves_of(note.nominals_from_a4);

    let mut acc = get_accidental(bar, note, ExcludeMode::None, None, config)?;
    if bar.find(note.id).is_none() {
        if let Some(own) = note.accidentals.as_ref().filter(|a| !a.is_empty()) {
            let prior = acc.unwrap_or_default();
            acc = merge_symbol_groups_flat(
                &deconstruct_symbol_groups(&prior, config),
                &deconstruct_symbol_groups(own, config),
            );
        }
    }
    let mut acc = acc.and_then(|a| remove_unused_symbols(&a, config));

    let entry = read_fingering_accidental_input(note, config);
    if let Some(entry) = &entry {
        let entered = AccidentalSymbols::from_list(&entry.symbols);
        acc = match acc {
            Some(existing)
                if !settings.clear_accidentals_after_ascii_entry
                    && entry.kind == FingeringEntryKind::Ascii =>
            {
                Some(existing.add(&entered))
            }
            _ => Some(entered),
        };
        let _ = write!(trace, "\nsymbols from annotation: {:?}", acc);
    }

    if let Some(key_sig_syms) = valid_key_sig(key_sig, config).and_then(|ks| ks.symbols(nominal)) {
        acc = match acc {
            None => {
                let _ = write!(trace, "\nsymbols from key signature: {}", key_sig_syms);
                Some(key_sig_syms)
            }
            Some(current) => merge_symbol_groups_flat(
                &deconstruct_symbol_groups(&key_sig_syms, config),
                &deconstruct_symbol_groups(&current, config),
            ),
        };
    }

    let mut primary: Vec<SymbolCode> = Vec::new();
    let mut secondary: Vec<SymbolCode> = Vec::new();
    let mut matches: BTreeMap<usize, u32> = BTreeMap::new();

    if let Some(mut pool) = acc {
        for (lig_idx, lig) in config.ligatures.iter().enumerate() {
            if let Some((symbols, rest)) =
                largest_match(&pool, lig.entries.iter().map(|e| &e.symbols))
            {
                let _ = write!(trace, "\nligature {}: {:?}", lig_idx + 1, symbols);
                primary.splice(0..0, symbols.iter().cloned());
                pool = rest;
            }
        }

        for (chain_idx, chain) in config.acc_chains.iter().enumerate() {
            if let Some((symbols, rest)) = largest_match(&pool, chain.degrees.iter().flatten()) {
                let _ = write!(trace, "\nchain {}: {:?}", chain_idx + 1, symbols);
                primary.splice(0..0, symbols.iter().cloned());
                pool = rest;
            }
        }

        for (sec_idx, sec) in config.secondary_accidentals.iter().enumerate() {
            let mut times = 0;
            while times < MAX_SECONDARY_REPEATS {
                match pool.checked_sub_list(&sec.symbols) {
                    Some(rest) if !sec.symbols.is_empty() => {
                        pool = rest;
                        times += 1;
                    }
                    _ => break,
                }
            }
            if times > 0 {
                for _ in 0..times {
                    secondary.splice(0..0, sec.symbols.iter().cloned());
                }
                matches.insert(sec_idx, times);
                let _ = write!(trace, "\nsecondary {}: {:?} x{}", sec_idx + 1, sec.symbols, times);
            }
        }

        let leftover: Vec<SymbolCode> = pool.symbols().cloned().collect();
        for sym in leftover {
            if !config.is_naturalizer(&sym) {
                continue;
            }
            let hash = AccidentalSymbols::from_list(std::slice::from_ref(&sym)).to_hash();
            secondary.push(sym);
            if let Some(&idx) = config.secondary_index.get(&hash) {
                *matches.entry(idx).or_insert(0) += 1;
            }
            let _ = write!(trace, "\nnaturalizer: {}", hash);
        }

        let _ = write!(trace, "\nunmatched: {}", pool);
    }

    let hash = xen_hash(nominal, &AccidentalSymbols::from_list(&primary));
    let mut xen = match config.note(&hash) {
        Some(xen) => xen.clone(),
        None => {
            log::error!(
                "❌ no spelling '{}' in tuning config; ligature or secondary declarations \
                 may be in the wrong order. Matching trace:{}",
                hash,
                trace
            );
            return Err(ResolveError::XenNoteNotFound { hash, trace });
        }
    };
    log::debug!("resolved {} as '{}'{}", note.id, xen.hash, trace);

    let mut updated_symbols = None;
    let mut consumed_fingering = None;
    if let Some(entry) = entry {
        // entered symbols are respelled canonically
        if let Some(canonical) = config
            .av(&xen.hash)
            .and_then(|av| config.canonical_symbols(av))
            .map(|syms| xen_hash(xen.nominal, &AccidentalSymbols::from_list(syms)))
            .and_then(|h| config.note(&h))
        {
            xen = canonical.clone();
        }

        let symbols: Vec<SymbolCode> = secondary
            .iter()
            .chain(xen.ordered_symbols.iter())
            .cloned()
            .collect();
        updated_symbols = Some(add_naturalizing_symbols(
            &deconstruct_symbol_list(&symbols, config),
            config,
        ));
        consumed_fingering = Some(entry.fingering_idx);
    }

    Ok(NoteData {
        ms: note.clone(),
        xen,
        equaves,
        secondary_acc_syms: secondary,
        secondary_acc_matches: matches,
        updated_symbols,
        consumed_fingering,
    })
}

/// Candidate with the most symbols that can be taken out of `pool`. Earlier
/// candidates win ties.
fn largest_match<'a>(
    pool: &AccidentalSymbols,
    candidates: impl Iterator<Item = &'a Vec<SymbolCode>>,
) -> Option<(&'a Vec<SymbolCode>, AccidentalSymbols)> {
    let mut best: Option<(&Vec<SymbolCode>, AccidentalSymbols)> = None;
    for symbols in candidates {
        let more = best.as_ref().map_or(!symbols.is_empty(), |(b, _)| symbols.len() > b.len());
        if !more {
            continue;
        }
        if let Some(rest) = pool.checked_sub_list(symbols) {
            best = Some((symbols, rest));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteId, NATURAL};
    use crate::parse::parse_tuning_config;
    use crate::settings::DEFAULT_TUNING_CONFIG;

    const SHARP: SymbolCode = SymbolCode::Glyph(3);
    const FLAT: SymbolCode = SymbolCode::Glyph(1);
    const UP: SymbolCode = SymbolCode::Glyph(15);
    const DOWN: SymbolCode = SymbolCode::Glyph(16);

    fn g(code: u16) -> SymbolCode {
        SymbolCode::Glyph(code)
    }

    fn edo12() -> TuningConfig {
        parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap()
    }

    fn resolve(note: MsNote, config: &TuningConfig, bar: &BarState) -> NoteData {
        read_note_data(&note, config, None, bar, &EngineSettings::default()).unwrap()
    }

    #[test]
    fn test_bare_nominal() {
        let config = edo12();
        let note = MsNote::new(NoteId(1), 60, -5);
        let bar = BarState::from_chords(0, None, vec![vec![note.clone()]]);
        let data = resolve(note, &config, &bar);
        assert_eq!(data.xen.hash, "2");
        assert_eq!(data.equaves, -1);
        assert!(data.secondary_acc_syms.is_empty());
    }

    #[test]
    fn test_prior_accidental_applies() {
        let config = edo12();
        let first = MsNote::new(NoteId(1), 70, 0).with_symbols(&[SHARP]);
        let second = MsNote::new(NoteId(2), 70, 0).at(480, 0);
        let bar = BarState::from_chords(0, None, vec![vec![first], vec![second.clone()]]);
        assert_eq!(resolve(second, &config, &bar).xen.hash, "0 3 1");
    }

    #[test]
    fn test_note_outside_bar_uses_own_symbols() {
        let config = edo12();
        let bar = BarState::new(0, None);
        let note = MsNote::new(NoteId(1), 68, 0).with_symbols(&[FLAT]);
        assert_eq!(resolve(note, &config, &bar).xen.hash, "0 1 1");
    }

    #[test]
    fn test_stacked_flats_use_secondary() {
        let config = edo12();
        let bar = BarState::new(0, None);
        let note = MsNote::new(NoteId(1), 67, 0).with_symbols(&[FLAT, FLAT]);
        let data = resolve(note, &config, &bar);
        assert_eq!(data.xen.hash, "0 1 1");
        assert_eq!(data.secondary_acc_syms, vec![FLAT]);
        let b_idx = config.secondary_index["1 1"];
        assert_eq!(data.secondary_acc_matches[&b_idx], 1);
    }

    #[test]
    fn test_key_sig_fallback_and_natural() {
        let config = edo12();
        let ks = KeySig::new(vec![None, None, Some("3 1".into()), None, None, None, None]);
        let settings = EngineSettings::default();

        let c = MsNote::new(NoteId(1), 61, -5);
        let bar = BarState::from_chords(0, None, vec![vec![c.clone()]]);
        let data = read_note_data(&c, &config, Some(&ks), &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "2 3 1");

        let natural = MsNote::new(NoteId(2), 60, -5).with_symbols(&[NATURAL]);
        let bar = BarState::from_chords(0, None, vec![vec![natural.clone()]]);
        let data = read_note_data(&natural, &config, Some(&ks), &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "2", "natural overrides the key signature");
        assert_eq!(data.secondary_acc_syms, vec![NATURAL]);

        let short = KeySig::new(vec![Some("3 1".into())]);
        let a = MsNote::new(NoteId(3), 69, 0);
        let bar = BarState::from_chords(0, None, vec![vec![a.clone()]]);
        let data = read_note_data(&a, &config, Some(&short), &bar, &settings).unwrap();
        assert_eq!(data.xen.hash, "0", "key signature for another tuning is ignored");
    }

    #[test]
    fn test_annotation_entry() {
        let config = edo12();
        let note = MsNote::new(NoteId(1), 69, 0)
            .with_symbols(&[FLAT])
            .with_fingering("##");
        let bar = BarState::from_chords(0, None, vec![vec![note.clone()]]);
        let data = resolve(note, &config, &bar);

        assert_eq!(data.xen.hash, "0 4 1");
        assert_eq!(data.updated_symbols, Some(vec![g(4)]));
        assert_eq!(data.consumed_fingering, Some(0));
    }

    #[test]
    fn test_annotation_entry_adds_when_not_clearing() {
        let config = edo12();
        let settings = EngineSettings {
            clear_accidentals_after_ascii_entry: false,
            ..EngineSettings::default()
        };
        let note = MsNote::new(NoteId(1), 69, 0).with_symbols(&[FLAT]).with_fingering("b");
        let bar = BarState::from_chords(0, None, vec![vec![note.clone()]]);
        let data = read_note_data(&note, &config, None, &bar, &settings).unwrap();
        // b + b: one chain flat plus one secondary flat
        assert_eq!(data.xen.hash, "0 1 1");
        assert_eq!(data.updated_symbols, Some(vec![FLAT, FLAT]));
    }

    #[test]
    fn test_ligature_match() {
        let config = parse_tuning_config(
            "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
b (100c) #
\\\\ (20c) /
lig(1,2)
1 1 #^",
        )
        .unwrap();
        let bar = BarState::new(0, None);

        let sharp_up = SymbolCode::Glyph(crate::symbols::SymbolTable::code_from_text("#^").unwrap());
        let data = resolve(MsNote::new(NoteId(1), 70, 0).with_symbols(&[sharp_up.clone()]), &config, &bar);
        assert_eq!(data.xen.ordered_symbols, vec![sharp_up]);

        let data = resolve(MsNote::new(NoteId(2), 70, 0).with_symbols(&[UP, SHARP]), &config, &bar);
        assert_eq!(data.xen.ordered_symbols, vec![UP, SHARP], "later chains render further left");

        let data = resolve(MsNote::new(NoteId(3), 68, 0).with_symbols(&[DOWN, FLAT]), &config, &bar);
        assert_eq!(data.xen.ordered_symbols, vec![DOWN, FLAT]);
    }

    #[test]
    fn test_unknown_spelling_reports_trace() {
        let config = parse_tuning_config(
            "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
b (100c) #
\\\\ (20c) /
lig(1,2)
1 1 x",
        )
        .unwrap();
        let bar = BarState::new(0, None);

        let data = resolve(MsNote::new(NoteId(1), 71, 0).with_symbols(&[g(4)]), &config, &bar);
        assert_eq!(data.xen.ordered_symbols, vec![g(4)]);

        // the ligature swallows x, leaving a lone arrow no spelling pairs with x
        let result = read_note_data(
            &MsNote::new(NoteId(2), 71, 0).with_symbols(&[g(4), UP]),
            &config,
            None,
            &bar,
            &EngineSettings::default(),
        );
        match result {
            Err(ResolveError::XenNoteNotFound { hash, trace }) => {
                assert_eq!(hash, "0 4 1 15 1");
                assert!(trace.contains("ligature 1"));
                assert!(trace.contains("chain 2"));
            }
            other => panic!("expected XenNoteNotFound, got {:?}", other),
        }
    }
}
