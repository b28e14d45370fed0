//! Tuning config grammar
//!
//! Line-oriented. After comments (`//` to end of line) and blank lines are
//! removed:
//!
//! 1. `<Letter><Octave>: <frequency expr>` reference note
//! 2. nominal tunings followed by the equave size
//! 3. one accidental chain per line, until the first directive
//! 4. directives, some of which open a section of entries:
//!    `aux(...)`, `lig(...)[?!]`, `sec()`, `override()`, `independent()`,
//!    `nobold()`, `explicit()`, `displaysteps(...)`, `displaycents(...)`
//!
//! Any malformed line aborts the parse.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::errors::{ConfigError, ConfigErrorKind};
use crate::models::{
    AccidentalChain, AccidentalSymbols, AsciiConversion, CentsDisplay, CentsReference,
    ConstantConstrictions, DisplayPosition, Ligature, LigatureEntry, SecondaryAccidental,
    SecondaryTuning, StepsDisplay, SymbolCode, TuningConfig, TuningOverride, NATURAL,
};
use crate::settings::{EngineSettings, DEFAULT_TUNING_CONFIG};

use super::enumerate::enumerate_notes;
use super::reference_tuning::{parse_frequency, parse_reference_pitch};
use super::tokens::{
    parse_cents_or_ratio, parse_symbol_offset_pair, parse_symbols_declaration, space_separated,
};

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(.*?)//.*$").expect("comment pattern is valid"));

/// First directive line, ends the accidental chain block
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(lig|aux|sec|explicit|nobold|override|independent|displaycents|displaysteps)\([0-9,a-zA-Z\s]*\)",
    )
    .expect("directive pattern is valid")
});

static INCREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\((.+)\)$").expect("increment pattern is valid"));

static LIG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^lig\(([0-9,\s]+)\)([?!]*)").expect("lig pattern is valid"));

static AUX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^aux\(([0-9,\s]+)\)").expect("aux pattern is valid"));

static DISPLAY_CENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^displaycents\(([0-9,\sa-zA-Z]+)\)").expect("displaycents pattern is valid")
});

static DISPLAY_STEPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^displaysteps\(([0-9,\sa-zA-Z]+)\)").expect("displaysteps pattern is valid")
});

static DEFAULT_CONFIG: Lazy<Arc<TuningConfig>> = Lazy::new(|| {
    Arc::new(parse_tuning_config(DEFAULT_TUNING_CONFIG).expect("built-in tuning config is valid"))
});

impl TuningConfig {
    /// Compiled 12edo config for staves without a tuning declaration
    pub fn default_config() -> Arc<TuningConfig> {
        DEFAULT_CONFIG.clone()
    }
}

/// Section opened by the most recent directive
enum Section {
    Idle,
    Ligature(Ligature),
    Secondary,
    Override,
    Independent,
}

/// Comment-stripped, trimmed, non-empty lines
fn config_lines(text: &str) -> Vec<String> {
    COMMENT
        .replace_all(text, "$1")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_position(s: &str) -> Option<DisplayPosition> {
    match s {
        "above" => Some(DisplayPosition::Above),
        "below" => Some(DisplayPosition::Below),
        _ => None,
    }
}

/// Parse and compile a tuning config with default engine settings
pub fn parse_tuning_config(text: &str) -> Result<TuningConfig, ConfigError> {
    parse_tuning_config_with(text, &EngineSettings::default())
}

pub fn parse_tuning_config_with(
    text: &str,
    settings: &EngineSettings,
) -> Result<TuningConfig, ConfigError> {
    let lines = config_lines(text);
    if lines.len() < 2 {
        return Err(ConfigError::new(1, ConfigErrorKind::NotATuningConfig));
    }

    let mut parser = ConfigParser::new();
    let result = parser.parse(&lines);
    if let Err(err) = &result {
        log::warn!("❌ {}", err);
    }
    result?;

    let mut config = parser.finish();
    enumerate_notes(&mut config, settings);
    Ok(config)
}

struct ConfigParser {
    config: TuningConfig,
    section: Section,
}

impl ConfigParser {
    fn new() -> Self {
        Self {
            config: TuningConfig {
                aux_list: vec![None],
                display_cents: CentsDisplay::default(),
                ..TuningConfig::default()
            },
            section: Section::Idle,
        }
    }

    fn parse(&mut self, lines: &[String]) -> Result<(), ConfigError> {
        let at = |line: usize| move |kind: ConfigErrorKind| ConfigError::new(line, kind);

        self.parse_reference(&lines[0]).map_err(at(1))?;
        self.parse_nominals(&lines[1]).map_err(at(2))?;

        let mut idx = 2;
        while idx < lines.len() && !DIRECTIVE.is_match(&lines[idx]) {
            self.parse_chain(&lines[idx]).map_err(at(idx + 1))?;
            idx += 1;
        }

        for (offset, line) in lines[idx..].iter().enumerate() {
            let line_no = idx + offset + 1;
            if !self.parse_directive(line).map_err(at(line_no))? {
                self.parse_section_entry(line).map_err(at(line_no))?;
            }
        }

        self.commit_section();
        Ok(())
    }

    fn parse_reference(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let parts: Vec<&str> = line.split(':').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(ConfigErrorKind::NotATuningConfig);
        }

        let (nominal, note) = parse_reference_pitch(parts[0], None)
            .ok_or_else(|| ConfigErrorKind::InvalidReferenceNote(parts[0].to_string()))?;
        let freq = parse_frequency(parts[1])
            .ok_or_else(|| ConfigErrorKind::InvalidFrequency(parts[1].to_string()))?;

        self.config.tuning_nominal = nominal;
        self.config.tuning_note = note;
        self.config.tuning_freq = freq;
        self.config.original_tuning_freq = freq;
        Ok(())
    }

    fn parse_nominals(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let words = space_separated(line);
        if words.len() < 2 {
            return Err(ConfigErrorKind::InvalidNominals(line.to_string()));
        }

        let mut cents = Vec::with_capacity(words.len());
        for word in &words {
            let c = parse_cents_or_ratio(word)
                .ok_or_else(|| ConfigErrorKind::InvalidNominals(word.to_string()))?;
            cents.push(c);
        }

        let equave = cents.pop().unwrap_or(0.0);
        if equave == 0.0 {
            return Err(ConfigErrorKind::ZeroEquave);
        }

        self.config.num_nominals = cents.len();
        self.config.nominals = cents;
        self.config.equave_size = equave;
        Ok(())
    }

    fn parse_chain(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let mut increment: Option<f64> = None;
        let mut central_idx = 0;
        let mut degrees: Vec<Option<Vec<SymbolCode>>> = Vec::new();
        let mut offsets: Vec<f64> = Vec::new();

        for (j, word) in space_separated(line).into_iter().enumerate() {
            if let Some(caps) = INCREMENT.captures(word) {
                match parse_cents_or_ratio(&caps[1]) {
                    Some(_) if increment.is_some() => {
                        return Err(ConfigErrorKind::DuplicateIncrement(line.to_string()));
                    }
                    Some(inc) => {
                        increment = Some(inc);
                        central_idx = j;
                        degrees.push(None);
                        offsets.push(0.0);
                        continue;
                    }
                    None => {
                        log::debug!("'{}' is not an increment, reading it as symbols", word);
                    }
                }
            }

            let (symbols, offset) = parse_symbol_offset_pair(word);
            let symbols = parse_symbols_declaration(&symbols)
                .ok_or_else(|| ConfigErrorKind::InvalidSymbols(word.to_string()))?;

            self.config.used_symbols.extend(symbols.iter().cloned());
            degrees.push(Some(symbols));
            offsets.push(offset);
        }

        let increment =
            increment.ok_or_else(|| ConfigErrorKind::MissingIncrement(line.to_string()))?;

        let tunings = offsets
            .iter()
            .enumerate()
            .map(|(j, offset)| {
                if j == central_idx {
                    0.0
                } else {
                    (j as f64 - central_idx as f64) * increment + offset
                }
            })
            .collect();

        self.config.acc_chains.push(AccidentalChain {
            degrees,
            tunings,
            central_idx,
        });
        Ok(())
    }

    /// Handle a directive line. `Ok(false)` if the line is not a directive.
    fn parse_directive(&mut self, line: &str) -> Result<bool, ConfigErrorKind> {
        let num_chains = self.config.num_chains();

        if let Some(caps) = AUX.captures(line) {
            let mut listed = Vec::new();
            for x in caps[1].split(',') {
                match x.trim().parse::<usize>() {
                    Ok(idx) if idx <= num_chains => listed.push(idx),
                    _ => {
                        return Err(ConfigErrorKind::InvalidDirective {
                            directive: "aux",
                            reason: format!("invalid accidental chain index '{}'", x.trim()),
                        })
                    }
                }
            }

            let constrictions = ConstantConstrictions {
                hold_nominal: !listed.contains(&0),
                held_chains: (0..num_chains)
                    .filter(|c| !listed.contains(&(c + 1)))
                    .collect(),
            };
            self.open(Section::Idle);
            self.config.aux_list.push(Some(constrictions));
            return Ok(true);
        }

        if let Some(caps) = LIG.captures(line) {
            let mut regarding = Vec::new();
            for x in caps[1].split(',') {
                match x.trim().parse::<usize>() {
                    Ok(n) if n >= 1 && n <= num_chains => regarding.push(n - 1),
                    _ => {
                        return Err(ConfigErrorKind::InvalidDirective {
                            directive: "lig",
                            reason: format!("invalid accidental chain index '{}'", x.trim()),
                        })
                    }
                }
            }

            let flags = &caps[2];
            self.open(Section::Ligature(Ligature {
                regarding,
                is_weak: flags.contains('?'),
                is_important: flags.contains('!'),
                entries: Vec::new(),
            }));
            return Ok(true);
        }

        match line {
            "sec()" => {
                self.open(Section::Secondary);
                return Ok(true);
            }
            "override()" => {
                self.open(Section::Override);
                return Ok(true);
            }
            "independent()" => {
                self.open(Section::Independent);
                return Ok(true);
            }
            "nobold()" => {
                self.open(Section::Idle);
                self.config.non_bold_text_accidental = true;
                return Ok(true);
            }
            "explicit()" => {
                self.open(Section::Idle);
                self.config.always_explicit_accidental = true;
                return Ok(true);
            }
            _ => {}
        }

        if let Some(caps) = DISPLAY_STEPS.captures(line) {
            self.open(Section::Idle);
            let invalid = |reason: &str| ConfigErrorKind::InvalidDirective {
                directive: "displaysteps",
                reason: reason.to_string(),
            };

            let args: Vec<&str> = caps[1].split(',').map(str::trim).collect();
            if args.len() != 2 {
                return Err(invalid("expected 2 arguments"));
            }
            let steps = args[0]
                .parse::<u32>()
                .ok()
                .filter(|s| *s >= 2)
                .ok_or_else(|| invalid("invalid edo/neji steps"))?;
            let position = parse_position(args[1])
                .ok_or_else(|| invalid("display must be above or below"))?;

            self.config.display_steps = Some(StepsDisplay { steps, position });
            return Ok(true);
        }

        if let Some(caps) = DISPLAY_CENTS.captures(line) {
            self.open(Section::Idle);
            let invalid = |reason: &str| ConfigErrorKind::InvalidDirective {
                directive: "displaycents",
                reason: reason.to_string(),
            };

            let args: Vec<&str> = caps[1].split(',').map(str::trim).collect();
            if args.len() != 3 {
                return Err(invalid("expected 3 arguments"));
            }
            let reference = match args[0] {
                "nominal" => CentsReference::Nominal,
                "absolute" => CentsReference::Absolute,
                "semitone" => CentsReference::Semitone,
                _ => return Err(invalid("cent type must be nominal/absolute/semitone")),
            };
            let precision = args[1]
                .parse::<u32>()
                .ok()
                .filter(|p| *p <= 20)
                .ok_or_else(|| invalid("invalid precision"))?;
            let position = parse_position(args[2])
                .ok_or_else(|| invalid("display must be above or below"))?;

            self.config.display_cents = CentsDisplay {
                reference,
                precision,
                position,
            };
            return Ok(true);
        }

        Ok(false)
    }

    fn parse_section_entry(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        match self.section {
            Section::Idle => Err(ConfigErrorKind::UnexpectedLine(line.to_string())),
            Section::Ligature(_) => self.parse_ligature_entry(line),
            Section::Secondary => self.parse_secondary_entry(line),
            Section::Override => self.parse_override_entry(line),
            Section::Independent => self.parse_symbol_group(line),
        }
    }

    /// `<degree>... <symbols>`, one degree per regarded chain
    fn parse_ligature_entry(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let Section::Ligature(lig) = &mut self.section else {
            return Ok(());
        };

        let words = space_separated(line);
        if words.len() != lig.regarding.len() + 1 {
            return Err(ConfigErrorKind::InvalidLigature(format!(
                "expected {} degrees and a symbols declaration, got '{}'",
                lig.regarding.len(),
                line
            )));
        }

        let Some((symbols_word, degree_words)) = words.split_last() else {
            return Err(ConfigErrorKind::InvalidLigature(line.to_string()));
        };
        let mut av = Vec::with_capacity(degree_words.len());
        for word in degree_words {
            let degree = word.parse::<i32>().map_err(|_| {
                ConfigErrorKind::InvalidLigature(format!("'{}' is not a degree", word))
            })?;
            av.push(degree);
        }

        let symbols = parse_symbols_declaration(symbols_word)
            .ok_or_else(|| ConfigErrorKind::InvalidSymbols(symbols_word.to_string()))?;
        self.config.used_symbols.extend(symbols.iter().cloned());

        match lig.entries.iter_mut().find(|e| e.av == av) {
            Some(entry) => entry.symbols = symbols,
            None => lig.entries.push(LigatureEntry { av, symbols }),
        }
        Ok(())
    }

    /// `<symbols> <cents>...` or `<'text'> <symbols> <cents>...`, with either
    /// one cents value or one per nominal
    fn parse_secondary_entry(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let words = space_separated(line);
        let n = self.config.num_nominals;

        let first = parse_symbols_declaration(words[0])
            .ok_or_else(|| ConfigErrorKind::InvalidSymbols(words[0].to_string()))?;
        let first_is_text = first.len() == 1 && first[0].is_text();

        // a lone cents value after a text symbol is a tuning, not a conversion target
        let second_is_cents_only = words.get(1).map_or(false, |w| {
            parse_symbols_declaration(w).is_none() && parse_cents_or_ratio(w).is_some()
        });

        let is_plain = words.len() == 2
            || (words.len() == n + 1
                && !(words.len() == 3 && first_is_text && !second_is_cents_only));
        let is_conversion = !is_plain && (words.len() == 3 || words.len() == n + 2);

        if !is_plain && !is_conversion {
            return Err(ConfigErrorKind::InvalidSecondary(format!(
                "expected 2 or 3 words, or {} or {} for per-nominal tunings, got '{}'",
                n + 1,
                n + 2,
                line
            )));
        }

        let (symbols, cents_words) = if is_plain {
            (first.clone(), &words[1..])
        } else {
            if !first_is_text {
                return Err(ConfigErrorKind::InvalidSecondary(format!(
                    "convert-from text must be a single text symbol, got '{}'",
                    words[0]
                )));
            }
            let to = parse_symbols_declaration(words[1])
                .ok_or_else(|| ConfigErrorKind::InvalidSymbols(words[1].to_string()))?;
            (to, &words[2..])
        };

        let mut cents = Vec::with_capacity(cents_words.len());
        for word in cents_words {
            let c = parse_cents_or_ratio(word)
                .ok_or_else(|| ConfigErrorKind::InvalidCents(word.to_string()))?;
            cents.push(c);
        }

        let tuning = if cents.len() == 1 {
            SecondaryTuning::Uniform(cents[0])
        } else {
            SecondaryTuning::PerNominal(cents)
        };

        if let Some(SymbolCode::Text(from)) = first.first().filter(|_| first_is_text) {
            self.add_conversion(from.clone(), symbols.clone());
        }

        self.config.used_secondary_symbols.extend(symbols.iter().cloned());
        self.add_secondary(symbols, tuning);
        Ok(())
    }

    /// `<nominal> <degree>... <cents>`, one degree per chain
    fn parse_override_entry(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let words = space_separated(line);
        let num_chains = self.config.num_chains();

        if words.len() != num_chains + 2 {
            return Err(ConfigErrorKind::InvalidOverride(format!(
                "expected {} accidental vector degrees, got {} in '{}'",
                num_chains,
                words.len().saturating_sub(2),
                line
            )));
        }

        let nominal = words[0]
            .parse::<usize>()
            .ok()
            .filter(|n| *n < self.config.num_nominals)
            .ok_or_else(|| {
                ConfigErrorKind::InvalidOverride(format!(
                    "nominal '{}' must be 0 to {}",
                    words[0],
                    self.config.num_nominals.saturating_sub(1)
                ))
            })?;

        let mut av = Vec::with_capacity(num_chains);
        for (chain, word) in self.config.acc_chains.iter().zip(&words[1..=num_chains]) {
            let (min, max) = (chain.min_degree(), chain.max_degree());
            let degree = word
                .parse::<i32>()
                .ok()
                .filter(|d| (min..=max).contains(d))
                .ok_or_else(|| {
                    ConfigErrorKind::InvalidOverride(format!(
                        "degree '{}' must be {} to {}",
                        word, min, max
                    ))
                })?;
            av.push(degree);
        }

        let cents_word = words[num_chains + 1];
        let cents = parse_cents_or_ratio(cents_word)
            .ok_or_else(|| ConfigErrorKind::InvalidCents(cents_word.to_string()))?;

        self.config.overrides.push(TuningOverride { nominal, av, cents });
        Ok(())
    }

    /// Space-separated single symbols, the first one naturalizes the group
    fn parse_symbol_group(&mut self, line: &str) -> Result<(), ConfigErrorKind> {
        let group_idx = self.config.independent_symbol_groups.len();
        let mut group = Vec::new();

        for word in space_separated(line) {
            let symbols = parse_symbols_declaration(word)
                .ok_or_else(|| ConfigErrorKind::InvalidSymbols(word.to_string()))?;
            if symbols.len() != 1 {
                return Err(ConfigErrorKind::InvalidSymbolGroup(format!(
                    "'{}' is not a single symbol",
                    word
                )));
            }
            self.config
                .symbol_group_lookup
                .insert(symbols[0].clone(), group_idx);
            group.extend(symbols);
        }

        let naturalizer = group[0].clone();
        self.config.naturalizers.push(naturalizer.clone());
        self.config.naturalizer_group.insert(naturalizer, group_idx);
        self.config.independent_symbol_groups.push(group);
        Ok(())
    }

    fn open(&mut self, section: Section) {
        self.commit_section();
        self.section = section;
    }

    fn commit_section(&mut self) {
        if let Section::Ligature(lig) = std::mem::replace(&mut self.section, Section::Idle) {
            self.config.ligatures.push(lig);
        }
    }

    /// Redeclared secondaries keep their index
    fn add_secondary(&mut self, symbols: Vec<SymbolCode>, tuning: SecondaryTuning) {
        let hash = AccidentalSymbols::from_list(&symbols).to_hash();
        match self.config.secondary_index.get(&hash) {
            Some(&idx) => {
                self.config.secondary_accidentals[idx].symbols = symbols;
                self.config.secondary_accidentals[idx].tuning = tuning;
            }
            None => {
                self.config
                    .secondary_index
                    .insert(hash.clone(), self.config.secondary_accidentals.len());
                self.config.secondary_accidentals.push(SecondaryAccidental {
                    hash,
                    symbols,
                    tuning,
                });
            }
        }
    }

    /// Redeclared conversions keep their position in the matching order
    fn add_conversion(&mut self, from: String, to: Vec<SymbolCode>) {
        match self
            .config
            .ascii_conversions
            .iter_mut()
            .find(|c| c.from == from)
        {
            Some(conv) => conv.to = to,
            None => self.config.ascii_conversions.push(AsciiConversion { from, to }),
        }
    }

    /// Add the implicit natural sign group, the `n` conversion and the
    /// zero-cent naturalizer secondaries
    fn finish(mut self) -> TuningConfig {
        let n_symbols = if self.config.naturalizers.is_empty() {
            vec![NATURAL]
        } else {
            self.config.naturalizers.clone()
        };
        self.config.used_symbols.extend(n_symbols.iter().cloned());
        self.add_conversion("n".to_string(), n_symbols);

        if self.config.independent_symbol_groups.is_empty() {
            self.config.independent_symbol_groups.push(vec![NATURAL]);
            self.config.symbol_group_lookup.insert(NATURAL, 0);
            self.config.naturalizers.push(NATURAL);
            self.config.naturalizer_group.insert(NATURAL, 0);
        }

        for naturalizer in self.config.naturalizers.clone() {
            let hash = AccidentalSymbols::from_list(std::slice::from_ref(&naturalizer)).to_hash();
            if !self.config.secondary_index.contains_key(&hash) {
                self.add_secondary(vec![naturalizer], SecondaryTuning::Uniform(0.0));
            }
        }

        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(code: u16) -> SymbolCode {
        SymbolCode::Glyph(code)
    }

    const EDO12: &str = "A4: 440
        0 200c 300c 500c 700c 800c 1000c 1200c
        bbb bb b (100c) # x #x";

    #[test]
    fn test_reference_and_nominals() {
        let config = parse_tuning_config(EDO12).unwrap();
        assert_eq!(config.tuning_nominal, 0);
        assert_eq!(config.tuning_note, 69);
        assert_eq!(config.tuning_freq, 440.0);
        assert_eq!(config.num_nominals, 7);
        assert_eq!(config.equave_size, 1200.0);
        assert_eq!(config.nominals[2], 300.0);
    }

    #[test]
    fn test_chain_degrees() {
        let config = parse_tuning_config(EDO12).unwrap();
        let chain = &config.acc_chains[0];
        assert_eq!(chain.central_idx, 3);
        assert_eq!(chain.len(), 7);
        assert_eq!(chain.tunings, vec![-300.0, -200.0, -100.0, 0.0, 100.0, 200.0, 300.0]);
        assert_eq!(chain.symbols_at(1), Some(&vec![g(3)]));
        assert_eq!(chain.symbols_at(0), None);
        assert!(config.used_symbols.contains(&g(3)));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "// header
            C4: 261.6 // middle C

            0 9/8 5/4 4/3 3/2 5/3 15/8 2/1
            b (25/24) # // chromatic semitone";
        let config = parse_tuning_config(text).unwrap();
        assert_eq!(config.tuning_nominal, -5);
        assert_eq!(config.tuning_note, 60);
        assert_eq!(config.acc_chains.len(), 1);
        assert!((config.equave_size - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_degree_offset() {
        let config = parse_tuning_config("A4: 440\n0 1200c\nb(-5c) (100c) #(3c)").unwrap();
        assert_eq!(config.acc_chains[0].tunings, vec![-105.0, 0.0, 103.0]);
    }

    #[test]
    fn test_not_a_config() {
        let err = parse_tuning_config("A4: 440").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::NotATuningConfig);

        let err = parse_tuning_config("hello world\n0 1200c").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::NotATuningConfig);
    }

    #[test]
    fn test_chain_errors_report_line() {
        let err = parse_tuning_config("A4: 440\n0 1200c\nb #").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(matches!(err.kind, ConfigErrorKind::MissingIncrement(_)));

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) (50c) #").unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::DuplicateIncrement(_)));

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) nope").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::InvalidSymbols("nope".to_string()));

        let err = parse_tuning_config("A4: 440\n0 0c").unwrap_err();
        assert_eq!((err.line, err.kind), (2, ConfigErrorKind::ZeroEquave));
    }

    #[test]
    fn test_aux_constrictions() {
        let text = "A4: 440
            0 200c 300c 500c 700c 800c 1000c 1200c
            b (100c) #
            \\\\ (10c) /
            aux(0)
            aux(1, 2)";
        let config = parse_tuning_config(text).unwrap();
        assert_eq!(config.aux_list.len(), 3);
        assert!(config.aux_list[0].is_none());

        let diatonic = config.aux(1).unwrap();
        assert!(!diatonic.hold_nominal);
        assert_eq!(diatonic.held_chains, vec![0, 1]);
        assert!(diatonic.is_diatonic(2));

        let chromatic = config.aux(2).unwrap();
        assert!(chromatic.hold_nominal);
        assert!(chromatic.held_chains.is_empty());

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\naux(2)").unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::InvalidDirective { directive: "aux", .. }));
    }

    #[test]
    fn test_ligature_section() {
        let text = "A4: 440
            0 200c 300c 500c 700c 800c 1000c 1200c
            b (100c) #
            \\\\ (10c) /
            lig(1,2)!
            1 1 #^
            1 1 #^2
            -1 -1 bv";
        let config = parse_tuning_config(text).unwrap();
        let lig = &config.ligatures[0];
        assert_eq!(lig.regarding, vec![0, 1]);
        assert!(lig.is_important);
        assert!(!lig.is_weak);
        assert_eq!(lig.entries.len(), 2, "redeclared entry replaces the earlier one");
        assert_eq!(
            lig.symbols_for(&[1, 1]),
            parse_symbols_declaration("#^2").as_ref()
        );

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\nlig(1)\n1 1 #").unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::InvalidLigature(_)));
        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\nlig(3)").unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_secondary_section() {
        let text = "A4: 440
            0 200c 300c 500c 700c 800c 1000c 1200c
            b (100c) #
            sec()
            '+' 50c
            '^' / 20c
            \\\\ -20c";
        let config = parse_tuning_config(text).unwrap();

        let plus = &config.secondary_accidentals[config.secondary_index["'+ 1"]];
        assert_eq!(plus.tuning, SecondaryTuning::Uniform(50.0));
        let arrow = &config.secondary_accidentals[config.secondary_index["15 1"]];
        assert_eq!(arrow.symbols, vec![g(15)]);
        assert!(config.used_secondary_symbols.contains(&g(16)));

        let froms: Vec<&str> = config.ascii_conversions.iter().map(|c| c.from.as_str()).collect();
        assert_eq!(froms, vec!["+", "^", "n"]);
        assert_eq!(config.ascii_conversions[1].to, vec![g(15)]);
    }

    #[test]
    fn test_secondary_per_nominal() {
        let text = "A4: 440
            0 700c 1200c
            b (100c) #
            sec()
            / 10c 20c
            'u' / 5c 6c";
        let config = parse_tuning_config(text).unwrap();
        let up = &config.secondary_accidentals[config.secondary_index["15 1"]];
        assert_eq!(up.tuning, SecondaryTuning::PerNominal(vec![5.0, 6.0]));
        assert_eq!(up.tuning.cents_for(1), 6.0);

        // single text symbol followed by two cents values: plain per-nominal tuning
        let text = "A4: 440\n0 700c 1200c\nb (100c) #\nsec()\n'+' 3c 4c";
        let config = parse_tuning_config(text).unwrap();
        let plus = &config.secondary_accidentals[config.secondary_index["'+ 1"]];
        assert_eq!(plus.tuning, SecondaryTuning::PerNominal(vec![3.0, 4.0]));

        let bad = "A4: 440\n0 700c 1200c\nb (100c) #\nsec()\n/ 1c 2c 3c 4c";
        assert!(matches!(
            parse_tuning_config(bad).unwrap_err().kind,
            ConfigErrorKind::InvalidSecondary(_)
        ));
    }

    #[test]
    fn test_override_section() {
        let text = "A4: 440
            0 200c 300c 500c 700c 800c 1000c 1200c
            b (100c) #
            override()
            0 1 7/6";
        let config = parse_tuning_config(text).unwrap();
        let tuning = config.tuning("0 3 1").unwrap();
        assert!((tuning.cents - 266.871).abs() < 1e-3);

        let err = parse_tuning_config(
            "A4: 440\n0 1200c\nb (100c) #\noverride()\n0 2 100c",
        )
        .unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::InvalidOverride(_)));
    }

    #[test]
    fn test_independent_groups() {
        let text = "A4: 440
            0 200c 300c 500c 700c 800c 1000c 1200c
            b (100c) #
            \\\\ (10c) /
            independent()
            n b #
            '|' \\\\ /";
        let config = parse_tuning_config(text).unwrap();
        assert_eq!(config.num_groups(), 2);
        assert_eq!(config.naturalizers, vec![g(2), SymbolCode::text("|")]);
        assert_eq!(config.group_of(&g(15)), 1);
        assert_eq!(config.group_of(&g(3)), 0);
        assert!(config.secondary_index.contains_key("'| 1"));

        let n = config.ascii_conversions.iter().find(|c| c.from == "n").unwrap();
        assert_eq!(n.to, config.naturalizers);

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\nindependent()\nn b.b").unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::InvalidSymbolGroup(_)));
    }

    #[test]
    fn test_implicit_natural_group() {
        let config = parse_tuning_config(EDO12).unwrap();
        assert_eq!(config.independent_symbol_groups, vec![vec![NATURAL]]);
        assert!(config.is_naturalizer(&NATURAL));
        assert!(config.secondary_index.contains_key("2 1"));
        assert!(config.used_symbols.contains(&NATURAL));
    }

    #[test]
    fn test_flags_and_display() {
        let text = "A4: 440
            0 1200c
            b (100c) #
            nobold()
            explicit()
            displaysteps(12, below)
            displaycents(semitone, 2, above)";
        let config = parse_tuning_config(text).unwrap();
        assert!(config.non_bold_text_accidental);
        assert!(config.always_explicit_accidental);
        assert_eq!(
            config.display_steps,
            Some(StepsDisplay { steps: 12, position: DisplayPosition::Below })
        );
        assert_eq!(config.display_cents.reference, CentsReference::Semitone);
        assert_eq!(config.display_cents.precision, 2);

        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\ndisplaysteps(1, below)").unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::InvalidDirective { directive: "displaysteps", .. }));
    }

    #[test]
    fn test_unexpected_line() {
        let err = parse_tuning_config("A4: 440\n0 1200c\nb (100c) #\nnobold()\n0 1 #").unwrap_err();
        assert_eq!(err.line, 5);
        assert!(matches!(err.kind, ConfigErrorKind::UnexpectedLine(_)));
    }

    #[test]
    fn test_default_config() {
        let config = TuningConfig::default_config();
        assert_eq!(config.steps_list.len(), 12);
        assert_eq!(config.aux_list.len(), 3);
        assert!(config.ascii_conversions.iter().any(|c| c.from == "x#"));
    }
}
