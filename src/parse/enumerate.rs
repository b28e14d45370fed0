//! XenNote enumeration
//!
//! Expands the declared nominals × accidental chain degrees into every
//! spelling within one equave, adds ligatured spellings, then sorts by cents
//! and partitions into enharmonic steps.

use std::collections::HashMap;

use crate::models::{
    av_key, AccidentalVector, SymbolCode, TuningConfig, TuningEntry, XenNote,
};
use crate::settings::EngineSettings;
use crate::utils::is_enharmonically_equivalent;

/// One spelling with its tuning, before it is placed into the lookup tables
#[derive(Debug, Clone)]
struct Spelling {
    av: AccidentalVector,
    xen: XenNote,
    tuning: TuningEntry,
}

/// Spellings keyed by hash, in first-insertion order.
/// Re-inserting a hash replaces the entry but keeps its position.
#[derive(Default)]
struct SpellingSet {
    entries: Vec<Spelling>,
    index: HashMap<String, usize>,
}

impl SpellingSet {
    fn upsert(&mut self, spelling: Spelling) {
        match self.index.get(&spelling.xen.hash) {
            Some(&idx) => self.entries[idx] = spelling,
            None => {
                self.index
                    .insert(spelling.xen.hash.clone(), self.entries.len());
                self.entries.push(spelling);
            }
        }
    }
}

/// Wrap cents into one equave.
///
/// Returns `cents` in `[0, |equave|)` and the number of equaves added, such
/// that `cents - equaves_adjusted * equave == raw`. Values within `epsilon`
/// of the top boundary snap to 0 of the next equave.
pub fn wrap_cents(raw: f64, equave: f64, epsilon: f64) -> TuningEntry {
    let size = equave.abs();
    let sign = if equave > 0.0 { 1 } else { -1 };

    let wraps = (raw / size).floor();
    let mut cents = raw - wraps * size;
    let mut equaves_adjusted = -sign * wraps as i32;

    // floor() can land one step off for values a hair below a boundary
    if cents >= size {
        cents -= size;
        equaves_adjusted -= sign;
    } else if cents < 0.0 {
        cents += size;
        equaves_adjusted += sign;
    }

    if size - cents < epsilon {
        cents = 0.0;
        equaves_adjusted -= sign;
    }

    TuningEntry {
        cents,
        equaves_adjusted,
    }
}

/// Degree index tuples over all chains, first chain varying fastest
fn degree_permutations(chain_lengths: &[usize]) -> Vec<Vec<usize>> {
    if chain_lengths.is_empty() {
        return Vec::new();
    }

    let total: usize = chain_lengths.iter().product();
    let mut perms = Vec::with_capacity(total);

    for mut n in 0..total {
        let mut indices = Vec::with_capacity(chain_lengths.len());
        for &len in chain_lengths {
            indices.push(n % len);
            n /= len;
        }
        perms.push(indices);
    }

    perms
}

/// Populate the lookup tables, steps and enharmonic graph of a parsed config
pub(crate) fn enumerate_notes(config: &mut TuningConfig, settings: &EngineSettings) {
    let mut spellings = SpellingSet::default();
    let mut av_to_symbols: HashMap<String, Vec<SymbolCode>> = HashMap::new();

    let overrides: HashMap<(usize, String), f64> = config
        .overrides
        .iter()
        .map(|o| ((o.nominal, av_key(&o.av)), o.cents))
        .collect();

    let chain_lengths: Vec<usize> = config.acc_chains.iter().map(|c| c.len()).collect();
    let permutations = degree_permutations(&chain_lengths);

    for (nominal, &nominal_cents) in config.nominals.iter().enumerate() {
        if config.acc_chains.is_empty() {
            let raw = overrides
                .get(&(nominal, String::new()))
                .copied()
                .unwrap_or(nominal_cents);

            let mut xen = XenNote::new(nominal, Vec::new());
            xen.has_important_ligature = true;

            spellings.upsert(Spelling {
                av: Vec::new(),
                xen,
                tuning: wrap_cents(raw, config.equave_size, settings.epsilon),
            });
            continue;
        }

        for indices in &permutations {
            let mut av = Vec::with_capacity(indices.len());
            let mut ordered: Vec<SymbolCode> = Vec::new();
            let mut offset = 0.0;

            for (chain, &idx) in config.acc_chains.iter().zip(indices) {
                let degree = idx as i32 - chain.central_idx as i32;
                av.push(degree);

                if let Some(symbols) = &chain.degrees[idx] {
                    // later chains render further left
                    let mut left = symbols.clone();
                    left.extend(ordered);
                    ordered = left;
                    offset += chain.tunings[idx];
                }
            }

            let raw = overrides
                .get(&(nominal, av_key(&av)))
                .copied()
                .unwrap_or(nominal_cents + offset);
            let tuning = wrap_cents(raw, config.equave_size, settings.epsilon);

            spellings.upsert(Spelling {
                av: av.clone(),
                xen: XenNote::new(nominal, ordered.clone()),
                tuning,
            });

            let canonical = apply_ligatures(
                config,
                &mut spellings,
                nominal,
                indices,
                &av,
                ordered.clone(),
                tuning,
            );
            av_to_symbols.insert(av_key(&av), canonical.unwrap_or(ordered));
        }
    }

    config.av_to_symbols = av_to_symbols;
    build_steps(config, spellings, settings);

    log::info!(
        "compiled tuning config: {} notes/equave, {} spellings, {}c equave",
        config.steps_list.len(),
        config.notes_table.len(),
        config.equave_size
    );
}

/// Register every ligatured spelling of one accidental vector.
///
/// Each ligature is tried on the plain spelling and on every spelling
/// produced by earlier ligatures, so non-overlapping ligatures compose.
/// Returns the ligatured spelling that should become the canonical one, if any.
fn apply_ligatures(
    config: &TuningConfig,
    spellings: &mut SpellingSet,
    nominal: usize,
    indices: &[usize],
    av: &[i32],
    ordered: Vec<SymbolCode>,
    tuning: TuningEntry,
) -> Option<Vec<SymbolCode>> {
    let mut variants: Vec<Vec<SymbolCode>> = vec![ordered];
    let mut canonical = None;
    let mut highest_precedence = 0u8;

    for lig in &config.ligatures {
        // 0 weak, 1 strong, 2 important but weak, 3 strong and important.
        // Weak ligatures never become the canonical spelling.
        let precedence = (!lig.is_weak) as u8 + 2 * (lig.is_important as u8);
        let mut new_variants = Vec::new();

        for unligatured in &variants {
            let mut lig_ordered = unligatured.clone();
            let mut insert_at = 0usize;
            let mut lig_av = Vec::with_capacity(lig.regarding.len());

            for &chain_idx in &lig.regarding {
                lig_av.push(av[chain_idx]);

                let chain = &config.acc_chains[chain_idx];
                let Some(symbols) = &chain.degrees[indices[chain_idx]] else {
                    continue;
                };

                for sym in symbols {
                    let Some(pos) = lig_ordered.iter().rposition(|s| s == sym) else {
                        log::warn!(
                            "ligature: symbol {} of chain {} missing from spelling {:?}",
                            sym,
                            chain_idx + 1,
                            unligatured
                        );
                        break;
                    };
                    lig_ordered.remove(pos);
                    if pos > insert_at {
                        insert_at = pos;
                    } else if pos < insert_at {
                        insert_at -= 1;
                    }
                }
            }

            let Some(lig_symbols) = lig.symbols_for(&lig_av) else {
                continue;
            };

            let insert_at = insert_at.min(lig_ordered.len());
            lig_ordered.splice(insert_at..insert_at, lig_symbols.iter().cloned());

            let mut xen = XenNote::new(nominal, lig_ordered.clone());
            xen.has_ligature_priority = !lig.is_weak;
            xen.has_important_ligature = lig.is_important;

            spellings.upsert(Spelling {
                av: av.to_vec(),
                xen,
                tuning,
            });

            if precedence >= 1 && precedence >= highest_precedence {
                canonical = Some(lig_ordered.clone());
                highest_precedence = precedence;
            }

            new_variants.push(lig_ordered);
        }

        variants.extend(new_variants);
    }

    canonical
}

/// Sort spellings by cents, group enharmonic equivalents into steps, and
/// fill the lookup tables.
fn build_steps(config: &mut TuningConfig, spellings: SpellingSet, settings: &EngineSettings) {
    let entries = spellings.entries;
    let equave = config.equave_size;
    let threshold = settings.enharmonic_equivalent_threshold;

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[a].tuning.cents.total_cmp(&entries[b].tuning.cents));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_cents: Option<f64> = None;
    let mut first_cents: Option<f64> = None;

    for idx in order {
        let cents = entries[idx].tuning.cents;
        let first = *first_cents.get_or_insert(cents);

        match group_cents {
            Some(prev) if is_enharmonically_equivalent(cents, prev, equave, threshold) => {
                if let Some(group) = groups.last_mut() {
                    group.push(idx);
                }
            }
            Some(_) if is_enharmonically_equivalent(cents, first, equave, threshold) => {
                // wrapped around to the first step from the top of the equave
                groups[0].push(idx);
            }
            _ => {
                groups.push(vec![idx]);
                group_cents = Some(cents);
            }
        }
    }

    for group in groups.iter_mut() {
        group.sort_by(|&a, &b| entries[a].av.cmp(&entries[b].av));
    }

    for (step, group) in groups.iter().enumerate() {
        let mut hashes = Vec::with_capacity(group.len());
        for &idx in group {
            let spelling = &entries[idx];
            let hash = spelling.xen.hash.clone();
            config.notes_table.insert(hash.clone(), spelling.xen.clone());
            config.av_table.insert(hash.clone(), spelling.av.clone());
            config.tuning_table.insert(hash.clone(), spelling.tuning);
            config.steps_lookup.insert(hash.clone(), step);
            hashes.push(hash);
        }
        config.steps_list.push(hashes);
    }

    for step in &config.steps_list {
        let has_important = step
            .iter()
            .any(|h| config.notes_table[h].has_important_ligature);

        let cyclable: Vec<&String> = if has_important {
            step.iter()
                .filter(|h| {
                    let note = &config.notes_table[*h];
                    note.has_important_ligature || note.is_bare_nominal()
                })
                .collect()
        } else {
            step.iter().collect()
        };

        if cyclable.len() > 1 {
            for (i, hash) in cyclable.iter().enumerate() {
                let next = cyclable[(i + 1) % cyclable.len()];
                config.enharmonics.insert((*hash).clone(), next.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_positive_equave() {
        let e = wrap_cents(1300.0, 1200.0, 1e-8);
        assert!((e.cents - 100.0).abs() < 1e-9);
        assert_eq!(e.equaves_adjusted, -1);

        let e = wrap_cents(-100.0, 1200.0, 1e-8);
        assert!((e.cents - 1100.0).abs() < 1e-9);
        assert_eq!(e.equaves_adjusted, 1);

        let e = wrap_cents(0.0, 1200.0, 1e-8);
        assert_eq!((e.cents, e.equaves_adjusted), (0.0, 0));
    }

    #[test]
    fn test_wrap_snaps_near_top() {
        let e = wrap_cents(1200.0 - 1e-10, 1200.0, 1e-8);
        assert_eq!(e.cents, 0.0);
        assert_eq!(e.equaves_adjusted, -1);
        assert!((e.unwrapped(1200.0) - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_negative_equave() {
        for raw in [-1300.0, -100.0, 0.0, 250.0, 1250.0] {
            let e = wrap_cents(raw, -1200.0, 1e-8);
            assert!(e.cents >= 0.0 && e.cents < 1200.0, "{} wrapped to {}", raw, e.cents);
            assert!(
                (e.unwrapped(-1200.0) - raw).abs() < 1e-9,
                "{} does not unwrap back",
                raw
            );
        }
    }

    #[test]
    fn test_important_ligature_outranks_strong_for_entry() {
        use crate::parse::parse_tuning_config;
        use crate::parse::tokens::parse_symbols_declaration;

        let config = parse_tuning_config(
            "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
b (100c) #
\\\\ (10c) /
lig(1,2)!?
1 1 #^
lig(1,2)
1 1 #^2",
        )
        .unwrap();

        assert_eq!(
            config.canonical_symbols(&[1, 1]),
            parse_symbols_declaration("#^").as_ref(),
            "the later strong ligature does not replace the important one"
        );

        let weak_only = parse_tuning_config(
            "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
b (100c) #
\\\\ (10c) /
lig(1,2)?
1 1 #^",
        )
        .unwrap();
        assert_ne!(
            weak_only.canonical_symbols(&[1, 1]),
            parse_symbols_declaration("#^").as_ref()
        );
    }

    #[test]
    fn test_permutations_first_chain_fastest() {
        let perms = degree_permutations(&[2, 3]);
        assert_eq!(perms.len(), 6);
        assert_eq!(perms[0], vec![0, 0]);
        assert_eq!(perms[1], vec![1, 0]);
        assert_eq!(perms[2], vec![0, 1]);
        assert!(degree_permutations(&[]).is_empty());
    }
}
