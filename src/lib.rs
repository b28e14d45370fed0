//! Microtonal Notation Engine WASM Module
//!
//! Compiles tuning configs written as staff text, resolves which accidentals
//! apply to each note of a bar, computes the cents each note is tuned to and
//! moves notes through the spellings the config allows.

pub mod api;
pub mod cache;
pub mod errors;
pub mod models;
pub mod parse;
pub mod resolve;
pub mod settings;
pub mod symbols;
pub mod transposition;
pub mod tuning;
pub mod utils;

// Re-export commonly used types
pub use cache::{parse_tuning_config_cached, MemoryConfigCache, TuningConfigCache};
pub use errors::{ConfigError, ConfigErrorKind, ExpressionError, ResolveError};
pub use models::*;
pub use parse::{
    parse_change_reference_tuning, parse_key_sig, parse_possible_configs, parse_tuning_config,
    parse_tuning_config_with,
};
pub use resolve::read_note_data;
pub use settings::{EngineSettings, DEFAULT_TUNING_CONFIG};
pub use symbols::SymbolTable;
pub use transposition::{
    choose_next_note, cleanup_bar, explicit_accidentals_for_entry, make_accidentals_explicit,
    plan_transpose, Direction, TransposePlan,
};
pub use tuning::{calc_cents_offset, cents_display, plan_playback, steps_display};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        api::helpers::log_warn(&format!("logger already initialized: {}", e));
    }

    log::info!("Microtonal notation engine WASM module initialized");
}
