//! Effective accidental of a note from the accidentals before it in the bar
//!
//! Walks the note's line backwards: ticks right-to-left, voices 3 → 0,
//! chords back to front (main chord before its grace chords), notes back to
//! front. The nearest explicit accidental wins per symbol group.

use crate::errors::ResolveError;
use crate::models::{AccidentalSymbols, BarState, MsNote, TuningConfig, NUM_VOICES};

use super::groups::deconstruct_symbol_groups;

/// Which accidentals at the note's own position are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludeMode {
    /// The note's own accidental counts
    #[default]
    None,
    /// Only notes before it in its chord count
    SelfNote,
    /// Nothing in its chord counts
    WholeChord,
}

/// Accidental symbols in effect for `note`, `None` if nothing earlier in the
/// bar sets any.
///
/// `line_override` looks up another line at the note's position, as needed
/// when the note is about to move to that line.
pub fn get_accidental(
    bar: &BarState,
    note: &MsNote,
    exclude: ExcludeMode,
    line_override: Option<i32>,
    config: &TuningConfig,
) -> Result<Option<AccidentalSymbols>, ResolveError> {
    bar.check_tick(note.tick)?;

    let line = line_override.unwrap_or(note.line);
    let ticks = match bar.line(line) {
        Some(ticks) => ticks,
        None => return Ok(None),
    };

    let mut groups: Vec<Option<AccidentalSymbols>> = vec![None; config.num_groups()];

    for (&tick, voices) in ticks.range(..=note.tick).rev() {
        for voice in (0..NUM_VOICES).rev() {
            if tick == note.tick && voice > note.voice {
                continue;
            }

            let chords = &voices[voice];
            let same_slot = tick == note.tick && voice == note.voice;

            // (chord index, note index) of the note itself
            let own_position = if same_slot {
                chords.iter().enumerate().rev().find_map(|(chord_idx, chord)| {
                    chord
                        .iter()
                        .rposition(|n| n.id == note.id)
                        .map(|note_idx| (chord_idx, note_idx))
                })
            } else {
                None
            };

            for (chord_idx, chord) in chords.iter().enumerate().rev() {
                let mut note_limit = chord.len();

                if same_slot {
                    match own_position {
                        // chords after the note cannot affect it
                        Some((own_chord, _)) if chord_idx > own_chord => continue,
                        Some((own_chord, own_note)) if chord_idx == own_chord => {
                            match exclude {
                                ExcludeMode::WholeChord => continue,
                                ExcludeMode::SelfNote => note_limit = own_note,
                                ExcludeMode::None => note_limit = own_note + 1,
                            }
                        }
                        Some(_) => {}
                        None => continue,
                    }
                }

                for other in chord[..note_limit].iter().rev() {
                    let symbols = match &other.accidentals {
                        Some(symbols) if !symbols.is_empty() => symbols,
                        _ => continue,
                    };

                    let mut all_filled = true;
                    for (slot, group) in groups
                        .iter_mut()
                        .zip(deconstruct_symbol_groups(symbols, config))
                    {
                        if slot.is_none() {
                            if group.is_empty() {
                                all_filled = false;
                            } else {
                                *slot = Some(group);
                            }
                        }
                    }

                    if all_filled {
                        log::debug!(
                            "🔍 accidental for {} found at tick {}, voice {}",
                            note.id,
                            tick,
                            voice
                        );
                        return Ok(Some(flatten(groups)));
                    }
                }
            }
        }
    }

    let accidentals = flatten(groups);
    if accidentals.is_empty() {
        Ok(None)
    } else {
        Ok(Some(accidentals))
    }
}

fn flatten(groups: Vec<Option<AccidentalSymbols>>) -> AccidentalSymbols {
    groups
        .into_iter()
        .flatten()
        .fold(AccidentalSymbols::new(), |acc, group| acc.add(&group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteId, SymbolCode};
    use crate::parse::parse_tuning_config;
    use crate::settings::DEFAULT_TUNING_CONFIG;

    const SHARP: SymbolCode = SymbolCode::Glyph(3);
    const FLAT: SymbolCode = SymbolCode::Glyph(1);

    fn note(id: u64, tick: i64) -> MsNote {
        MsNote::new(NoteId(id), 69, 0).at(tick, 0)
    }

    fn config() -> TuningConfig {
        parse_tuning_config(DEFAULT_TUNING_CONFIG).unwrap()
    }

    fn sharp() -> Option<AccidentalSymbols> {
        Some(AccidentalSymbols::from_list(&[SHARP]))
    }

    #[test]
    fn test_earlier_accidental_carries_over() {
        let config = config();
        let first = note(1, 0).with_symbols(&[SHARP]);
        let second = note(2, 480);
        let bar = BarState::from_chords(0, Some(1920), vec![vec![first], vec![second.clone()]]);

        let acc = get_accidental(&bar, &second, ExcludeMode::None, None, &config).unwrap();
        assert_eq!(acc, sharp());
    }

    #[test]
    fn test_nearest_accidental_wins() {
        let config = config();
        let bar = BarState::from_chords(
            0,
            None,
            vec![
                vec![note(1, 0).with_symbols(&[SHARP])],
                vec![note(2, 480).with_symbols(&[FLAT])],
                vec![note(3, 960)],
            ],
        );
        let target = bar.find(NoteId(3)).unwrap().clone();
        let acc = get_accidental(&bar, &target, ExcludeMode::None, None, &config).unwrap();
        assert_eq!(acc, Some(AccidentalSymbols::from_list(&[FLAT])));
    }

    #[test]
    fn test_later_notes_and_other_lines_ignored() {
        let config = config();
        let bar = BarState::from_chords(
            0,
            None,
            vec![
                vec![note(1, 0)],
                vec![note(2, 480).with_symbols(&[SHARP])],
                vec![MsNote::new(NoteId(3), 71, 1).at(960, 0).with_symbols(&[FLAT])],
            ],
        );
        let first = bar.find(NoteId(1)).unwrap().clone();
        assert_eq!(
            get_accidental(&bar, &first, ExcludeMode::None, None, &config).unwrap(),
            None
        );

        let on_b_line = get_accidental(&bar, &first, ExcludeMode::None, Some(-1), &config).unwrap();
        assert_eq!(on_b_line, None, "B flat comes after the note");
    }

    #[test]
    fn test_exclude_modes_in_chord() {
        let config = config();
        let lower = note(1, 0).with_symbols(&[SHARP]);
        let upper = note(2, 0).with_symbols(&[FLAT]);
        let bar = BarState::from_chords(0, None, vec![vec![lower, upper]]);
        let upper = bar.find(NoteId(2)).unwrap().clone();

        let own = get_accidental(&bar, &upper, ExcludeMode::None, None, &config).unwrap();
        assert_eq!(own, Some(AccidentalSymbols::from_list(&[FLAT])));

        let prior = get_accidental(&bar, &upper, ExcludeMode::SelfNote, None, &config).unwrap();
        assert_eq!(prior, sharp());

        let none = get_accidental(&bar, &upper, ExcludeMode::WholeChord, None, &config).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_higher_voice_at_same_tick_ignored() {
        let config = config();
        let bar = BarState::from_chords(
            0,
            None,
            vec![vec![note(1, 0).at(0, 1).with_symbols(&[SHARP])], vec![note(2, 0)]],
        );
        let target = bar.find(NoteId(2)).unwrap().clone();
        let acc = get_accidental(&bar, &target, ExcludeMode::None, None, &config).unwrap();
        assert_eq!(acc, None);

        let voice_two = bar.find(NoteId(1)).unwrap().clone();
        let from_voice_one = BarState::from_chords(
            0,
            None,
            vec![vec![note(3, 0).with_symbols(&[FLAT])], vec![voice_two.clone()]],
        );
        let acc =
            get_accidental(&from_voice_one, &voice_two, ExcludeMode::SelfNote, None, &config).unwrap();
        assert_eq!(acc, Some(AccidentalSymbols::from_list(&[FLAT])));
    }

    #[test]
    fn test_grace_chord_before_main_chord() {
        let config = config();
        let grace = note(1, 480).with_symbols(&[SHARP]);
        let main = note(2, 480);
        let bar = BarState::from_chords(0, None, vec![vec![grace], vec![main]]);
        let main = bar.find(NoteId(2)).unwrap().clone();
        let grace = bar.find(NoteId(1)).unwrap().clone();

        assert_eq!(get_accidental(&bar, &main, ExcludeMode::None, None, &config).unwrap(), sharp());
        assert_eq!(
            get_accidental(&bar, &grace, ExcludeMode::WholeChord, None, &config).unwrap(),
            None
        );
    }

    #[test]
    fn test_tick_outside_bar() {
        let config = config();
        let bar = BarState::new(0, Some(1920));
        let result = get_accidental(&bar, &note(1, 1920), ExcludeMode::None, None, &config);
        assert!(matches!(result, Err(ResolveError::TickOutsideBar { tick: 1920, .. })));
    }
}
