//! Independent symbol groups
//!
//! Each group of mutually exclusive accidentals (sharps/flats, arrows, ...)
//! is tracked separately within a bar: a later note only overrides the groups
//! it actually writes a symbol for.

use crate::models::{AccidentalSymbols, SymbolCode, TuningConfig};

/// Split a multiset into one multiset per symbol group
pub fn deconstruct_symbol_groups(
    symbols: &AccidentalSymbols,
    config: &TuningConfig,
) -> Vec<AccidentalSymbols> {
    let mut groups = vec![AccidentalSymbols::new(); config.num_groups()];
    for (sym, count) in symbols.iter() {
        let group = config.group_of(sym).min(groups.len() - 1);
        groups[group].insert(sym.clone(), count);
    }
    groups
}

/// Split an ordered symbol list into one list per group, keeping the order within each
pub fn deconstruct_symbol_list(symbols: &[SymbolCode], config: &TuningConfig) -> Vec<Vec<SymbolCode>> {
    let mut groups = vec![Vec::new(); config.num_groups()];
    for sym in symbols {
        let group = config.group_of(sym).min(groups.len() - 1);
        groups[group].push(sym.clone());
    }
    groups
}

/// Per group, `current` wins if it has any symbol for that group, otherwise `prior`
pub fn merge_symbol_groups(
    prior: &[AccidentalSymbols],
    current: &[AccidentalSymbols],
) -> Vec<AccidentalSymbols> {
    let len = prior.len().max(current.len());
    (0..len)
        .map(|i| match current.get(i) {
            Some(group) if !group.is_empty() => group.clone(),
            _ => prior.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

/// `merge_symbol_groups` flattened back into one multiset, `None` if empty
pub fn merge_symbol_groups_flat(
    prior: &[AccidentalSymbols],
    current: &[AccidentalSymbols],
) -> Option<AccidentalSymbols> {
    let merged = merge_symbol_groups(prior, current)
        .iter()
        .fold(AccidentalSymbols::new(), |acc, group| acc.add(group));

    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// Flatten per-group symbol lists for rendering, writing each empty group's
/// naturalizer so the note cancels whatever an earlier note set in that group.
///
/// Groups are emitted last group first.
pub fn add_naturalizing_symbols(groups: &[Vec<SymbolCode>], config: &TuningConfig) -> Vec<SymbolCode> {
    if groups.len() != config.num_groups() {
        log::error!(
            "add_naturalizing_symbols: got {} symbol groups, config has {}",
            groups.len(),
            config.num_groups()
        );
        return Vec::new();
    }

    let mut symbols = Vec::new();
    for (idx, group) in groups.iter().enumerate().rev() {
        if group.is_empty() {
            symbols.push(config.naturalizer(idx));
        } else {
            symbols.extend(group.iter().cloned());
        }
    }
    symbols
}

pub fn contains_only_naturalizing_symbols(symbols: &[SymbolCode], config: &TuningConfig) -> bool {
    !symbols.is_empty() && symbols.iter().all(|sym| config.is_naturalizer(sym))
}

/// Drop symbols the config never uses. `None` if nothing is left.
pub fn remove_unused_symbols(
    symbols: &AccidentalSymbols,
    config: &TuningConfig,
) -> Option<AccidentalSymbols> {
    let mut used = symbols.clone();
    used.retain(|sym| config.uses_symbol(sym));
    if used.is_empty() {
        None
    } else {
        Some(used)
    }
}
