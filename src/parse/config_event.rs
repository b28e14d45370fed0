//! Staff/system text classification
//!
//! Text attached to a staff may declare a reference tuning change, a whole
//! tuning config, or a key signature. Each becomes a tick-stamped event the
//! host replays in tick order while walking a staff.

use std::sync::Arc;

use crate::cache::{parse_tuning_config_cached, TuningConfigCache};
use crate::models::{KeySig, TuningConfig};
use crate::settings::EngineSettings;
use crate::utils::remove_formatting_code;

use super::grammar::parse_tuning_config_with;
use super::key_sig::parse_key_sig;
use super::reference_tuning::{parse_change_reference_tuning, ReferenceTuningChange};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    ReferenceChange(ReferenceTuningChange),
    Tuning(Arc<TuningConfig>),
    KeySig(KeySig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigUpdate {
    pub tick: i64,
    pub event: ConfigEvent,
}

/// Tuning and key signature in effect while walking a staff
#[derive(Debug, Clone)]
pub struct StaffConfigState {
    pub tuning: Arc<TuningConfig>,
    pub key_sig: Option<KeySig>,
}

impl Default for StaffConfigState {
    /// 12edo, no key signature. Reset to this at the start of each voice.
    fn default() -> Self {
        Self {
            tuning: TuningConfig::default_config(),
            key_sig: None,
        }
    }
}

impl ConfigUpdate {
    pub fn apply(&self, state: &mut StaffConfigState) {
        match &self.event {
            ConfigEvent::ReferenceChange(change) => {
                state.tuning = Arc::new(state.tuning.with_reference_change(change));
            }
            ConfigEvent::Tuning(config) => state.tuning = config.clone(),
            ConfigEvent::KeySig(key_sig) => state.key_sig = Some(key_sig.clone()),
        }
    }
}

/// Classify staff text found at `tick`. `None` if it declares nothing.
pub fn parse_possible_configs(text: &str, tick: i64) -> Option<ConfigUpdate> {
    let settings = EngineSettings::default();
    classify(text, tick, |t| parse_tuning_config_with(t, &settings).ok().map(Arc::new))
}

/// As `parse_possible_configs`, compiling tuning configs through `cache`
pub fn parse_possible_configs_cached<C: TuningConfigCache + ?Sized>(
    text: &str,
    tick: i64,
    cache: &mut C,
    settings: &EngineSettings,
) -> Option<ConfigUpdate> {
    classify(text, tick, |t| parse_tuning_config_cached(t, cache, settings).ok())
}

fn classify(
    text: &str,
    tick: i64,
    compile: impl FnOnce(&str) -> Option<Arc<TuningConfig>>,
) -> Option<ConfigUpdate> {
    let text = remove_formatting_code(text);

    if let Some(change) = parse_change_reference_tuning(&text) {
        log::info!("found reference tuning change: {}", text.trim());
        return Some(ConfigUpdate {
            tick,
            event: ConfigEvent::ReferenceChange(change),
        });
    }

    if let Some(config) = compile(&text) {
        log::info!(
            "found tuning config: {} notes/equave",
            config.steps_list.len()
        );
        // one tick early so same-tick reference changes apply on top of it
        return Some(ConfigUpdate {
            tick: tick - 1,
            event: ConfigEvent::Tuning(config),
        });
    }

    if let Some(key_sig) = parse_key_sig(&text) {
        log::info!("found key signature: {}", text.trim());
        return Some(ConfigUpdate {
            tick,
            event: ConfigEvent::KeySig(key_sig),
        });
    }

    None
}
