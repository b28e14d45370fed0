/// Symbol code table
///
/// Format: code → (glyph labels, optional text code)
///
/// Labels are SMuFL glyph names (plus legacy host names where they differ).
/// Text codes are the short names usable in tuning config symbol declarations,
/// e.g. `b` for the flat sign or `#^2` for a sharp with two arrows up.
///
/// Code 0 is reserved and has no glyph.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub code: u16,
    pub labels: Vec<String>,
    pub text_code: Option<String>,
}

/// Hand-assigned entries: conventional accidentals, Stein-Zimmermann
/// quarter tones, arrows, Turkish/Persian and basic Sagittal.
const BASE_ENTRIES: &[(u16, &[&str], Option<&str>)] = &[
    (1, &["accidentalFlat", "FLAT"], Some("b")),
    (2, &["accidentalNatural", "NATURAL"], Some("n")),
    (3, &["accidentalSharp", "SHARP"], Some("#")),
    (4, &["accidentalDoubleSharp", "SHARP2"], Some("x")),
    (5, &["accidentalDoubleFlat", "FLAT2"], Some("bb")),
    (6, &["accidentalTripleSharp", "SHARP3"], Some("#x")),
    (7, &["accidentalTripleFlat", "FLAT3"], Some("bbb")),
    (8, &["accidentalNaturalFlat", "NATURAL_FLAT"], Some("nb")),
    (9, &["accidentalNaturalSharp", "NATURAL_SHARP"], Some("n#")),
    (10, &["accidentalSharpSharp", "SHARP_SHARP"], Some("##")),
    (11, &["accidentalQuarterToneFlatStein", "MIRRORED_FLAT"], Some("d")),
    (12, &["accidentalThreeQuarterTonesFlatZimmermann", "MIRRORED_FLAT2"], Some("db")),
    (13, &["accidentalQuarterToneSharpStein", "SHARP_SLASH"], Some("+")),
    (14, &["accidentalThreeQuarterTonesSharpStein", "SHARP_SLASH4"], Some("#+")),
    (15, &["accidentalArrowUp", "ARROW_UP"], Some("/")),
    (16, &["accidentalArrowDown", "ARROW_DOWN"], Some("\\")),
    (17, &["accidentalKomaFlat", "FLAT_SLASH"], None),
    (18, &["accidentalKomaSharp"], None),
    (19, &["accidentalBakiyeFlat", "FLAT_SLASH2"], None),
    (20, &["accidentalBakiyeSharp"], None),
    (21, &["accidentalSori", "SORI"], Some("sori")),
    (22, &["accidentalKoron", "KORON"], Some("koron")),
    (23, &["accSagittal5CommaUp"], None),
    (24, &["accSagittal5CommaDown"], None),
    (25, &["accSagittal7CommaUp"], None),
    (26, &["accSagittal7CommaDown"], None),
    (27, &["accSagittal11MediumDiesisUp"], None),
    (28, &["accSagittal11MediumDiesisDown"], None),
    (29, &["accSagittalSharp"], None),
    (30, &["accSagittalFlat"], None),
];

/// First code of the generated Helmholtz-Ellis arrow ligatures
const HEJI_START: u16 = 31;

/// (SMuFL base name, text code prefix)
const HEJI_BASES: &[(&str, &str)] = &[
    ("DoubleFlat", "bb"),
    ("Flat", "b"),
    ("Natural", "n"),
    ("Sharp", "#"),
    ("DoubleSharp", "x"),
];

const HEJI_ARROW_COUNTS: &[(&str, &str)] = &[("One", ""), ("Two", "2"), ("Three", "3")];

/// Build the full table. Codes are contiguous from 1.
pub fn build_entries() -> Vec<SymbolEntry> {
    let mut entries: Vec<SymbolEntry> = BASE_ENTRIES
        .iter()
        .map(|(code, labels, text)| SymbolEntry {
            code: *code,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            text_code: text.map(|t| t.to_string()),
        })
        .collect();

    let mut code = HEJI_START;
    for (base_name, base_text) in HEJI_BASES {
        for (count_name, count_text) in HEJI_ARROW_COUNTS {
            for (dir_name, dir_text) in [("Up", "^"), ("Down", "v")] {
                let arrows = if *count_name == "One" { "Arrow" } else { "Arrows" };
                entries.push(SymbolEntry {
                    code,
                    labels: vec![format!(
                        "accidental{}{}{}{}",
                        base_name, count_name, arrows, dir_name
                    )],
                    text_code: Some(format!("{}{}{}", base_text, dir_text, count_text)),
                });
                code += 1;
            }
        }
    }

    entries
}
