//! Text formats read by the engine
//!
//! Tuning configs, key signatures, reference tuning changes and the word
//! grammar they share.

pub mod config_event;
pub mod enumerate;
pub mod expression;
pub mod grammar;
pub mod key_sig;
pub mod reference_tuning;
pub mod tokens;

pub use config_event::{
    parse_possible_configs, parse_possible_configs_cached, ConfigEvent, ConfigUpdate,
    StaffConfigState,
};
pub use enumerate::wrap_cents;
pub use expression::evaluate;
pub use grammar::{parse_tuning_config, parse_tuning_config_with};
pub use key_sig::parse_key_sig;
pub use reference_tuning::{parse_change_reference_tuning, ReferenceTuningChange};
pub use tokens::{
    parse_cents_or_ratio, parse_symbol_offset_pair, parse_symbols_declaration, read_symbol_code,
    space_separated,
};
