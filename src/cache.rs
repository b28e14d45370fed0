//! Compiled tuning config cache
//!
//! Compiling a large config enumerates every spelling, so hosts keep the
//! result per config text. The cache is owned by the caller and handed to
//! the operations that may compile configs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ConfigError;
use crate::models::TuningConfig;
use crate::parse::parse_tuning_config_with;
use crate::settings::EngineSettings;

pub trait TuningConfigCache {
    fn get(&self, key: &str) -> Option<Arc<TuningConfig>>;
    fn put(&mut self, key: &str, config: Arc<TuningConfig>);
    fn clear(&mut self);
}

/// In-memory cache keyed by trimmed config text
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigCache {
    configs: HashMap<String, Arc<TuningConfig>>,
}

/// Serialized form of a cache, for hosts that persist compiled configs
#[derive(Serialize, Deserialize)]
struct PersistedCache {
    configs: HashMap<String, TuningConfig>,
}

impl MemoryConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let persisted = PersistedCache {
            configs: self
                .configs
                .iter()
                .map(|(k, v)| (k.clone(), (**v).clone()))
                .collect(),
        };
        serde_json::to_string(&persisted)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let persisted: PersistedCache = serde_json::from_str(json)?;
        Ok(Self {
            configs: persisted
                .configs
                .into_iter()
                .map(|(k, v)| (k, Arc::new(v)))
                .collect(),
        })
    }
}

impl TuningConfigCache for MemoryConfigCache {
    fn get(&self, key: &str) -> Option<Arc<TuningConfig>> {
        self.configs.get(key).cloned()
    }

    fn put(&mut self, key: &str, config: Arc<TuningConfig>) {
        self.configs.insert(key.to_string(), config);
    }

    fn clear(&mut self) {
        self.configs.clear();
    }
}

/// Compile a config, reusing the cached result for the same text
pub fn parse_tuning_config_cached<C: TuningConfigCache + ?Sized>(
    text: &str,
    cache: &mut C,
    settings: &EngineSettings,
) -> Result<Arc<TuningConfig>, ConfigError> {
    let key = text.trim();

    if let Some(config) = cache.get(key) {
        log::debug!(
            "using cached tuning config: {} notes/equave, {}c equave",
            config.steps_list.len(),
            config.equave_size
        );
        return Ok(config);
    }

    let config = Arc::new(parse_tuning_config_with(key, settings)?);
    cache.put(key, config.clone());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_TUNING_CONFIG;

    #[test]
    fn test_cache_hit_returns_same_config() {
        let mut cache = MemoryConfigCache::new();
        let settings = EngineSettings::default();

        let a = parse_tuning_config_cached(DEFAULT_TUNING_CONFIG, &mut cache, &settings).unwrap();
        let padded = format!("\n  {}  \n", DEFAULT_TUNING_CONFIG);
        let b = parse_tuning_config_cached(&padded, &mut cache, &settings).unwrap();

        assert!(Arc::ptr_eq(&a, &b), "trimmed text hits the cache");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = MemoryConfigCache::new();
        let result = parse_tuning_config_cached("A4: 440\n0 0c", &mut cache, &EngineSettings::default());
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_json_persistence() {
        let mut cache = MemoryConfigCache::new();
        let settings = EngineSettings::default();
        parse_tuning_config_cached("A4: 440\n0 700c 1200c\nb (100c) #", &mut cache, &settings)
            .unwrap();

        let restored = MemoryConfigCache::from_json(&cache.to_json().unwrap()).unwrap();
        let config = restored.get("A4: 440\n0 700c 1200c\nb (100c) #").unwrap();
        assert_eq!(config.num_nominals, 2);
        assert_eq!(config.steps_list.len(), cache.get("A4: 440\n0 700c 1200c\nb (100c) #").unwrap().steps_list.len());
    }
}
