//! Choosing the next spelling up, down, or across enharmonics
//!
//! Up/down moves to the nearest step in that direction that has at least
//! one spelling satisfying the constrictions, then picks the spelling a
//! human would write: the one the bar already implies if any, else by
//! ligature preference, line movement and accidental distance.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::ResolveError;
use crate::models::{
    valid_key_sig, xen_hash, BarState, ConstantConstrictions, KeySig, NextNote, NoteData,
    TuningConfig, XenNote,
};
use crate::resolve::{get_accidental, remove_unused_symbols, ExcludeMode};
use crate::utils::modulo;

/// AV distances closer than this are ties
const AV_DIST_TIE: f64 = 0.7;
/// Absolute AV magnitudes closer than this are ties
const ABS_AV_DIST_TIE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Enharmonic,
    Up,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Down => -1,
            Direction::Enharmonic => 0,
            Direction::Up => 1,
        }
    }

    pub fn from_sign(sign: i32) -> Self {
        match sign.signum() {
            1 => Direction::Up,
            -1 => Direction::Down,
            _ => Direction::Enharmonic,
        }
    }
}

/// A scored candidate
struct NextNoteOption {
    next: NextNote,
    av_dist: f64,
    abs_av_dist: f64,
    num_symbols: usize,
    sum_of_degree: i32,
}

/// Choose the spelling `data` moves to.
///
/// `Ok(None)` when there is nowhere to go: no enharmonic equivalent, or no
/// step satisfies the constrictions.
pub fn choose_next_note(
    direction: Direction,
    constrictions: Option<&ConstantConstrictions>,
    data: &NoteData,
    key_sig: Option<&KeySig>,
    config: &TuningConfig,
    bar: &BarState,
) -> Result<Option<NextNote>, ResolveError> {
    let hash = &data.xen.hash;
    log::debug!("choosing {:?} from '{}' (equaves: {})", direction, hash, data.equaves);

    let Some(current_tuning) = config.tuning(hash) else {
        log::warn!("'{}' is not in the tuning table", hash);
        return Ok(None);
    };

    if direction == Direction::Enharmonic {
        return Ok(enharmonic_next(data, config));
    }

    let Some(&current_step) = config.steps_lookup.get(hash) else {
        log::warn!("'{}' has no step", hash);
        return Ok(None);
    };
    let current_av = config.av(hash).cloned().unwrap_or_default();

    let num_steps = config.steps_list.len() as i32;
    let sign = direction.sign();
    let mut equave_offset = 0;
    let mut valid_options: Vec<&String> = Vec::new();

    for i in 1..num_steps {
        let new_step = modulo(current_step as i32 + i * sign, num_steps);
        if new_step == 0 && sign == 1 {
            equave_offset += 1;
        } else if new_step == num_steps - 1 && sign == -1 {
            equave_offset -= 1;
        }

        valid_options = config.steps_list[new_step as usize]
            .iter()
            .filter(|option| satisfies(option, constrictions, data, &current_av, config))
            .collect();

        if !valid_options.is_empty() {
            break;
        }
    }

    if valid_options.is_empty() {
        log::warn!(
            "no valid next note for '{}'. Did you declare an invalid tuning system?",
            hash
        );
        return Ok(None);
    }

    if config.equave_size < 0.0 {
        equave_offset = -equave_offset;
    }

    let valid_ks = valid_key_sig(key_sig, config);
    let mut options = Vec::with_capacity(valid_options.len());

    for option in valid_options {
        let (Some(new_xen), Some(option_tuning), Some(option_av)) =
            (config.note(option), config.tuning(option), config.av(option))
        else {
            continue;
        };

        let total_equave_offset =
            option_tuning.equaves_adjusted - current_tuning.equaves_adjusted + equave_offset;
        let nominal_offset = new_xen.nominal as i32 - data.xen.nominal as i32
            + total_equave_offset * config.num_nominals as i32;

        let mut next = NextNote {
            xen: new_xen.clone(),
            nominals_from_a4: data.ms.nominals_from_a4 + nominal_offset,
            equaves: data.equaves + total_equave_offset,
            line_offset: -nominal_offset,
            matches_prior_acc: false,
        };

        let mut prior = get_accidental(
            bar,
            &data.ms,
            ExcludeMode::WholeChord,
            Some(data.ms.line - nominal_offset),
            config,
        )?;
        if prior.is_none() {
            prior = valid_ks.and_then(|ks| ks.symbols(new_xen.nominal));
        }
        let prior = prior.and_then(|p| remove_unused_symbols(&p, config));
        let prior_hash = prior.as_ref().map(|p| xen_hash(new_xen.nominal, p));
        let prior_av = prior_hash.as_ref().and_then(|h| config.av(h));

        // a prior with no AV, such as a sharp next to another group's
        // naturalizer, counts as no prior
        match prior_av {
            Some(prior_av) if prior_av == option_av => {
                if let Some(prior_xen) = prior_hash.as_ref().and_then(|h| config.note(h)) {
                    next.xen = prior_xen.clone();
                }
                next.matches_prior_acc = true;
                log::debug!("'{}' matches the prior accidental", next.xen.hash);
                return Ok(Some(next));
            }
            None if new_xen.is_bare_nominal() => {
                next.matches_prior_acc = true;
                log::debug!("'{}' needs no accidental", next.xen.hash);
                return Ok(Some(next));
            }
            _ => {}
        }

        let abs_av_dist: f64 = option_av.iter().map(|d| (d * d) as f64).sum();
        let av_dist = match prior_av {
            Some(prior_av) => prior_av
                .iter()
                .zip(option_av)
                .map(|(p, o)| ((p - o) * (p - o)) as f64)
                .sum(),
            None => abs_av_dist,
        };

        options.push(NextNoteOption {
            next,
            av_dist,
            abs_av_dist,
            num_symbols: new_xen.ordered_symbols.len(),
            sum_of_degree: option_av.iter().sum(),
        });
    }

    let up = if config.equave_size > 0.0 { sign > 0 } else { sign < 0 };
    let best = options
        .iter()
        .min_by(|a, b| compare_options(a, b, up, sign).0);

    if let Some(best) = best {
        for other in options.iter().filter(|o| !std::ptr::eq(*o, best)) {
            let (order, reason) = compare_options(best, other, up, sign);
            if order == Ordering::Equal {
                log::debug!("no preference between '{}' and '{}'", best.next.xen.hash, other.next.xen.hash);
            } else {
                log::debug!("picked '{}' over '{}': {}", best.next.xen.hash, other.next.xen.hash, reason);
            }
        }
    }

    Ok(best.map(|b| b.next.clone()))
}

/// Next member of the note's enharmonic cycle
fn enharmonic_next(data: &NoteData, config: &TuningConfig) -> Option<NextNote> {
    let Some(enharmonic) = config.enharmonics.get(&data.xen.hash) else {
        log::debug!("'{}' has no enharmonic equivalent", data.xen.hash);
        return None;
    };

    let enh_xen: &XenNote = config.note(enharmonic)?;
    let current = config.tuning(&data.xen.hash)?;
    let target = config.tuning(enharmonic)?;

    let equave_offset = target.equaves_adjusted - current.equaves_adjusted;
    let nominal_offset = enh_xen.nominal as i32 - data.xen.nominal as i32
        + equave_offset * config.num_nominals as i32;

    Some(NextNote {
        xen: enh_xen.clone(),
        nominals_from_a4: data.ms.nominals_from_a4 + nominal_offset,
        equaves: data.equaves + equave_offset,
        line_offset: -nominal_offset,
        matches_prior_acc: false,
    })
}

/// Whether a spelling keeps everything the constrictions hold fixed
fn satisfies(
    option: &str,
    constrictions: Option<&ConstantConstrictions>,
    data: &NoteData,
    current_av: &[i32],
    config: &TuningConfig,
) -> bool {
    let Some(c) = constrictions else {
        return true;
    };

    if c.hold_nominal && config.note(option).map(|x| x.nominal) != Some(data.xen.nominal) {
        return false;
    }

    let Some(av) = config.av(option) else {
        return false;
    };
    c.held_chains
        .iter()
        .all(|&chain| av.get(chain) == current_av.get(chain))
}

/// Order two candidates, best first, with the deciding criterion
fn compare_options(
    a: &NextNoteOption,
    b: &NextNoteOption,
    up: bool,
    sign: i32,
) -> (Ordering, &'static str) {
    let (ax, bx) = (&a.next.xen, &b.next.xen);

    if ax.has_important_ligature != bx.has_important_ligature {
        return (prefer(ax.has_important_ligature), "important ligature");
    }
    if ax.has_ligature_priority != bx.has_ligature_priority {
        return (prefer(ax.has_ligature_priority), "strong ligature");
    }

    let matches_direction = |line_offset: i32| if up { line_offset <= 0 } else { line_offset >= 0 };
    let (a_dir, b_dir) = (
        matches_direction(a.next.line_offset),
        matches_direction(b.next.line_offset),
    );
    if a_dir != b_dir {
        return (prefer(a_dir), "line offset matches direction");
    }

    let by_line = a.next.line_offset.abs().cmp(&b.next.line_offset.abs());
    if by_line != Ordering::Equal {
        return (by_line, "line offset");
    }

    if a.av_dist - b.av_dist <= -AV_DIST_TIE {
        return (Ordering::Less, "relative AV distance");
    } else if a.av_dist - b.av_dist >= AV_DIST_TIE {
        return (Ordering::Greater, "relative AV distance");
    }

    if a.abs_av_dist - b.abs_av_dist <= -ABS_AV_DIST_TIE {
        return (Ordering::Less, "absolute AV distance");
    } else if a.abs_av_dist - b.abs_av_dist >= ABS_AV_DIST_TIE {
        return (Ordering::Greater, "absolute AV distance");
    }

    let by_symbols = a.num_symbols.cmp(&b.num_symbols);
    if by_symbols != Ordering::Equal {
        return (by_symbols, "fewer symbols");
    }

    // up prefers the sharper spelling, down the flatter one
    let by_degree = (b.sum_of_degree * sign).cmp(&(a.sum_of_degree * sign));
    (by_degree, "sum of degrees matches direction")
}

fn prefer(a_has: bool) -> Ordering {
    if a_has {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
