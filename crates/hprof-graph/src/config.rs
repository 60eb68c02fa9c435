use std::path::Path;

use hprof_core::IndexConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of decoded records kept by a graph.
pub const DEFAULT_RECORD_CACHE_CAPACITY: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of decoded records kept in memory. `0` is treated as `1`.
    pub record_cache_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            record_cache_capacity: DEFAULT_RECORD_CACHE_CAPACITY,
        }
    }
}

impl GraphConfig {
    pub fn with_record_cache_capacity(record_cache_capacity: usize) -> Self {
        Self {
            record_cache_capacity,
        }
    }
}

/// Everything a heap dump session can be configured with, as read from TOML:
///
/// ```toml
/// [graph]
/// record_cache_capacity = 5000
///
/// [index]
/// indexed_gc_roots = ["jni_global", "java_frame", "sticky_class"]
///
/// [index.symbol_remapping.classes]
/// "a.b" = "com.example.Cache"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapDumpConfig {
    pub graph: GraphConfig,
    pub index: IndexConfig,
}

impl HeapDumpConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            record_cache_capacity = config.graph.record_cache_capacity,
            "loaded heap dump config"
        );
        Ok(config)
    }
}
