//! Shared helpers for WASM API operations
//!
//! Console logging, serialization across the JS boundary, and loading the
//! tuning config an operation runs against.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::cache::parse_tuning_config_cached;
use crate::models::{BarState, KeySig, MsNote, TuningConfig};
use crate::parse::parse_change_reference_tuning;

use super::core::{CONFIG_CACHE, SETTINGS};

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

// ============================================================================
// Logging Helper Functions (called by macros)
// ============================================================================

pub fn log_debug(msg: &str) {
    log(&format!("[WASM] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("[WASM] ⚠️ {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value to JavaScript with automatic error handling
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize `Some` values, `null` for `None`
pub fn serialize_or_null<T: Serialize>(value: Option<&T>, error_context: &str) -> Result<JsValue, JsValue> {
    match value {
        Some(v) => serialize(v, error_context),
        None => Ok(JsValue::NULL),
    }
}

/// Key signature argument; `null`/`undefined` mean none
pub fn key_sig_from_js(value: JsValue) -> Result<Option<KeySig>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    deserialize(value, "Key signature deserialization error").map(Some)
}

/// MIDI pitches already taken at the note's tick. `null`/`undefined` fall
/// back to the written pitches of the other notes in `bar` at that tick.
pub fn occupied_from_js(value: JsValue, note: &MsNote, bar: &BarState) -> Result<Vec<i32>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(bar
            .notes()
            .filter(|n| n.tick == note.tick && n.id != note.id)
            .map(|n| n.midi_note)
            .collect());
    }
    deserialize(value, "Occupied pitches deserialization error")
}

// ============================================================================
// Tuning Config Loading
// ============================================================================

/// Compiled config for `text` (12edo when empty), with an optional reference
/// tuning change applied on top
pub fn load_config(text: &str, reference: Option<&str>) -> Result<Arc<TuningConfig>, JsValue> {
    let config = if text.trim().is_empty() {
        TuningConfig::default_config()
    } else {
        let settings = SETTINGS.lock().map_err(|_| validation_error("settings lock poisoned"))?.clone();
        let mut cache = CONFIG_CACHE
            .lock()
            .map_err(|_| validation_error("config cache lock poisoned"))?;
        parse_tuning_config_cached(text, &mut *cache, &settings)
            .map_err(|e| validation_error(e.to_string()))?
    };

    match reference.filter(|r| !r.trim().is_empty()) {
        Some(reference) => {
            let change = parse_change_reference_tuning(reference).ok_or_else(|| {
                validation_error(format!("Invalid reference tuning change: '{}'", reference))
            })?;
            Ok(Arc::new(config.with_reference_change(&change)))
        }
        None => Ok(config),
    }
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log_error(&msg);
    JsValue::from_str(&msg)
}
