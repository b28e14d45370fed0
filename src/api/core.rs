//! WASM API for the notation engine
//!
//! Each function takes the tuning config as text and compiles it through a
//! module-wide cache, so hosts can pass the same staff text on every call.
//! Failures are logged to the console and come back as `null` where the
//! operation's result is optional.

use std::sync::Mutex;

use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::cache::{MemoryConfigCache, TuningConfigCache};
use crate::models::{MsNote, NoteData};
use crate::parse::{parse_key_sig, parse_tuning_config_with};
use crate::resolve::read_note_data;
use crate::settings::EngineSettings;
use crate::transposition::{cleanup_bar, explicit_accidentals_for_entry, plan_transpose, Direction};
use crate::tuning::{
    annotation_fingerings, calc_cents_offset, cents_display, plan_playback, steps_display,
};
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

use super::helpers::{
    deserialize, key_sig_from_js, load_config, occupied_from_js, serialize, serialize_or_null,
    validation_error,
};
use super::types::{BarInput, ResolvedNote};

// WASM-owned engine state
lazy_static! {
    pub(crate) static ref CONFIG_CACHE: Mutex<MemoryConfigCache> = Mutex::new(MemoryConfigCache::new());
    pub(crate) static ref SETTINGS: Mutex<EngineSettings> = Mutex::new(EngineSettings::default());
}

fn current_settings() -> Result<EngineSettings, JsValue> {
    SETTINGS
        .lock()
        .map(|s| s.clone())
        .map_err(|_| validation_error("settings lock poisoned"))
}

/// Replace the engine settings. Missing fields take their defaults.
///
/// Clears the config cache, since compiled configs depend on the settings.
#[wasm_bindgen(js_name = setEngineSettings)]
pub fn set_engine_settings(settings_js: JsValue) -> Result<(), JsValue> {
    let settings: EngineSettings = deserialize(settings_js, "Settings deserialization error")?;
    wasm_info!("setEngineSettings: {:?}", settings);

    *SETTINGS.lock().map_err(|_| validation_error("settings lock poisoned"))? = settings;
    clear_config_cache()
}

#[wasm_bindgen(js_name = clearConfigCache)]
pub fn clear_config_cache() -> Result<(), JsValue> {
    CONFIG_CACHE
        .lock()
        .map_err(|_| validation_error("config cache lock poisoned"))?
        .clear();
    Ok(())
}

/// Compile a tuning config.
///
/// # Returns
/// The compiled config, or `null` if the text is not a valid tuning config
#[wasm_bindgen(js_name = parseTuningConfig)]
pub fn parse_tuning_config_js(text: &str) -> Result<JsValue, JsValue> {
    let settings = current_settings()?;
    match parse_tuning_config_with(text, &settings) {
        Ok(config) => {
            wasm_info!(
                "parseTuningConfig: {} steps, {} spellings",
                config.steps_list.len(),
                config.notes_table.len()
            );
            serialize(&config, "Tuning config serialization error")
        }
        Err(e) => {
            wasm_warn!("parseTuningConfig: {}", e);
            Ok(JsValue::NULL)
        }
    }
}

/// Parse a `keysig ...` directive, `null` if the text is not one
#[wasm_bindgen(js_name = parseKeySig)]
pub fn parse_key_sig_js(text: &str) -> Result<JsValue, JsValue> {
    let key_sig = parse_key_sig(text);
    serialize_or_null(key_sig.as_ref(), "Key signature serialization error")
}

/// Resolve a tokenized note within its bar
///
/// # Parameters
/// - `note_js`: the tokenized note
/// - `config_text`: tuning config text, empty for 12edo
/// - `reference`: optional reference tuning change applied to the config
/// - `key_sig_js`: key signature or `null`
/// - `bar_js`: the bar containing the note
/// - `occupied_js`: MIDI pitches already assigned to playback at the note's
///   tick, or `null` to use the written pitches of the other chord notes
///
/// # Returns
/// The resolved note with its tuning, or `null` if it cannot be resolved
#[wasm_bindgen(js_name = resolveNote)]
pub fn resolve_note(
    note_js: JsValue,
    config_text: &str,
    reference: Option<String>,
    key_sig_js: JsValue,
    bar_js: JsValue,
    occupied_js: JsValue,
) -> Result<JsValue, JsValue> {
    let note: MsNote = deserialize(note_js, "Note deserialization error")?;
    let bar: BarInput = deserialize(bar_js, "Bar deserialization error")?;
    let key_sig = key_sig_from_js(key_sig_js)?;
    let config = load_config(config_text, reference.as_deref())?;
    let settings = current_settings()?;
    let bar = bar.to_bar_state();

    let data = match read_note_data(&note, &config, key_sig.as_ref(), &bar, &settings) {
        Ok(data) => data,
        Err(e) => {
            wasm_error!("resolveNote: {}", e);
            return Ok(JsValue::NULL);
        }
    };

    let cents = calc_cents_offset(&data, &config, false, &settings);
    let occupied = occupied_from_js(occupied_js, &note, &bar)?;

    let resolved = ResolvedNote {
        playback: plan_playback(cents, note.midi_note, &occupied, &settings),
        annotation_fingerings: annotation_fingerings(&data, &config, &settings),
        explicit: explicit_accidentals_for_entry(&data, &config, key_sig.as_ref(), &bar, &settings),
        steps: steps_display(&data, &config, &settings),
        cents_text: cents_display(&data, &config, &settings),
        cents,
        data,
    };
    wasm_log!("resolveNote: {} → '{}' {:+.3}c", note.id, resolved.data.xen.hash, cents);

    serialize(&resolved, "Resolved note serialization error")
}

/// Cents of a resolved note from A440, or from its written MIDI pitch when
/// `absolute` is false
#[wasm_bindgen(js_name = cents)]
pub fn cents_js(
    note_data_js: JsValue,
    config_text: &str,
    reference: Option<String>,
    absolute: bool,
) -> Result<f64, JsValue> {
    let data: NoteData = deserialize(note_data_js, "NoteData deserialization error")?;
    let config = load_config(config_text, reference.as_deref())?;
    let settings = current_settings()?;
    Ok(calc_cents_offset(&data, &config, absolute, &settings))
}

/// Move a note up (1), down (-1) or to its next enharmonic (0)
///
/// # Returns
/// The transpose plan, or `null` when there is nowhere to move
#[wasm_bindgen(js_name = nextNote)]
#[allow(clippy::too_many_arguments)]
pub fn next_note(
    direction: i32,
    aux: usize,
    note_js: JsValue,
    config_text: &str,
    reference: Option<String>,
    key_sig_js: JsValue,
    bar_js: JsValue,
) -> Result<JsValue, JsValue> {
    let note: MsNote = deserialize(note_js, "Note deserialization error")?;
    let bar: BarInput = deserialize(bar_js, "Bar deserialization error")?;
    let key_sig = key_sig_from_js(key_sig_js)?;
    let config = load_config(config_text, reference.as_deref())?;
    let settings = current_settings()?;

    let direction = Direction::from_sign(direction);
    wasm_info!("nextNote: {:?} (aux {}) on {}", direction, aux, note.id);

    let plan = plan_transpose(
        direction,
        aux,
        &note,
        &config,
        key_sig.as_ref(),
        &bar.to_bar_state(),
        &settings,
    );

    match plan {
        Ok(plan) => serialize_or_null(plan.as_ref(), "Transpose plan serialization error"),
        Err(e) => {
            wasm_error!("nextNote: {}", e);
            Ok(JsValue::NULL)
        }
    }
}

/// Symbol updates removing redundant accidentals from a bar
#[wasm_bindgen(js_name = cleanupBar)]
pub fn cleanup_bar_js(
    bar_js: JsValue,
    config_text: &str,
    reference: Option<String>,
    key_sig_js: JsValue,
) -> Result<JsValue, JsValue> {
    let bar: BarInput = deserialize(bar_js, "Bar deserialization error")?;
    let key_sig = key_sig_from_js(key_sig_js)?;
    let config = load_config(config_text, reference.as_deref())?;
    let settings = current_settings()?;

    let updates = cleanup_bar(&bar.to_bar_state(), &config, key_sig.as_ref(), &settings)
        .map_err(|e| validation_error(e.to_string()))?;
    wasm_log!("cleanupBar: {} updates", updates.len());

    serialize(&updates, "Symbol updates serialization error")
}
