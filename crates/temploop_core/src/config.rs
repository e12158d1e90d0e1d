//! Expansion configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use temploop_expr::MAX_RANGE_LEN;

use crate::error::{EngineError, EngineResult};

/// Default metadata key holding the iteration directive.
pub const ITERATION_KEY: &str = "TempLoop::Iteration";

/// Default name of the per-item binding.
pub const ITEM_NAME: &str = "TempLoop::Item";

/// Default number of hex digits appended to concrete resource names.
pub const NAME_DIGEST_LEN: usize = 12;

/// Hex digits in an MD5 digest.
const MAX_DIGEST_LEN: usize = 32;

/// Tunables of the expansion engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Metadata key holding the iteration directive.
    pub iteration_key: String,
    /// Name bound to the current element while resolving properties.
    pub item_name: String,
    /// Hex digits of the name digest appended to concrete names.
    pub name_digest_len: usize,
    /// Largest sequence `Fn::Range` may produce in a directive.
    pub max_range_len: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            iteration_key: ITERATION_KEY.to_string(),
            item_name: ITEM_NAME.to_string(),
            name_digest_len: NAME_DIGEST_LEN,
            max_range_len: MAX_RANGE_LEN,
        }
    }
}

impl ExpansionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iteration_key(mut self, key: impl Into<String>) -> Self {
        self.iteration_key = key.into();
        self
    }

    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    pub fn with_name_digest_len(mut self, len: usize) -> Self {
        self.name_digest_len = len;
        self
    }

    pub fn with_max_range_len(mut self, len: usize) -> Self {
        self.max_range_len = len;
        self
    }

    /// Load a configuration from a TOML, YAML or JSON file.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(EngineError::Config(format!(
                    "unsupported config format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        config.validate()?;
        debug!("Loaded expansion config from {:?}", path);
        Ok(config)
    }

    /// Check that the configuration can drive an expansion.
    pub fn validate(&self) -> EngineResult<()> {
        if self.iteration_key.is_empty() {
            return Err(EngineError::Config("iteration_key must not be empty".into()));
        }
        if self.item_name.is_empty() {
            return Err(EngineError::Config("item_name must not be empty".into()));
        }
        if !(1..=MAX_DIGEST_LEN).contains(&self.name_digest_len) {
            return Err(EngineError::Config(format!(
                "name_digest_len must be between 1 and {}, got {}",
                MAX_DIGEST_LEN, self.name_digest_len
            )));
        }
        if self.max_range_len == 0 {
            return Err(EngineError::Config("max_range_len must be at least 1".into()));
        }
        Ok(())
    }
}
