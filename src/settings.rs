//! Engine-wide tunables
//!
//! Hosts that never touch these get the behaviour of the stock plugin.

use serde::{Deserialize, Serialize};

/// Built-in 12edo config used when a staff has no tuning declaration.
pub const DEFAULT_TUNING_CONFIG: &str = "A4: 440
0 200c 300c 500c 700c 800c 1000c 1200c
bbb bb b (100c) # x #x
aux(0)
aux(1)
sec()
'bbb' bbb -300c
'bb' bb -200c
'b' b -100c
'###' #x 300c
'#x' #x 300c
'x#' #x 300c
'##' x 200c
'x' x 200c
'#' # 100c";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Notes closer than this many cents are enharmonic equivalents
    pub enharmonic_equivalent_threshold: f64,

    /// Cents within this distance below the equave snap to 0 of the next equave
    pub epsilon: f64,

    /// Playback is shifted by whole semitones once the offset exceeds this
    pub play_event_mod_semitones_threshold: i32,

    /// JI ratio annotations must end with '.' to be recognized
    pub require_period_after_fingering_ratio: bool,

    /// Entering accidentals via annotation text replaces existing ones
    pub clear_accidentals_after_ascii_entry: bool,

    pub keep_secondary_accidentals_after_transpose: bool,
    pub keep_secondary_accidentals_after_diatonic: bool,
    pub keep_secondary_accidentals_after_enharmonic: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enharmonic_equivalent_threshold: 0.005,
            epsilon: 1e-8,
            play_event_mod_semitones_threshold: 12,
            require_period_after_fingering_ratio: true,
            clear_accidentals_after_ascii_entry: true,
            keep_secondary_accidentals_after_transpose: false,
            keep_secondary_accidentals_after_diatonic: true,
            keep_secondary_accidentals_after_enharmonic: true,
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
