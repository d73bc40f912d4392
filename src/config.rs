//! Engine configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::Preprocessor;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 50;

/// Default serialized-size bound for a barrel shard (2 MiB).
pub const DEFAULT_MAX_BARREL_BYTES: u64 = 2 * 1024 * 1024;

/// Configuration for an [`Engine`](crate::engine::Engine).
#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of results returned by a search.
    pub top_k: usize,

    /// Serialized-size bound above which new terms are placed in a
    /// fresh barrel. Terms already placed keep growing their barrel.
    pub max_barrel_bytes: u64,

    /// URL of the external preprocessor service, if one is used.
    #[serde(default)]
    pub preprocessor_url: Option<String>,

    /// Preprocessor used during ingest (falls back to the inline
    /// standard preprocessor when unset).
    #[serde(skip)]
    pub preprocessor: Option<Arc<dyn Preprocessor>>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("top_k", &self.top_k)
            .field("max_barrel_bytes", &self.max_barrel_bytes)
            .field("preprocessor_url", &self.preprocessor_url)
            .field(
                "preprocessor",
                &self.preprocessor.as_ref().map(|p| p.name().to_string()),
            )
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_barrel_bytes: DEFAULT_MAX_BARREL_BYTES,
            preprocessor_url: None,
            preprocessor: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Default)]
pub struct EngineConfigBuilder {
    top_k: Option<usize>,
    max_barrel_bytes: Option<u64>,
    preprocessor_url: Option<String>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
}

impl EngineConfigBuilder {
    /// Set the maximum number of search results.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set the barrel size bound in bytes.
    pub fn max_barrel_bytes(mut self, bytes: u64) -> Self {
        self.max_barrel_bytes = Some(bytes);
        self
    }

    /// Set the external preprocessor URL.
    pub fn preprocessor_url(mut self, url: impl Into<String>) -> Self {
        self.preprocessor_url = Some(url.into());
        self
    }

    /// Set the preprocessor implementation.
    pub fn preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            max_barrel_bytes: self.max_barrel_bytes.unwrap_or(DEFAULT_MAX_BARREL_BYTES),
            preprocessor_url: self.preprocessor_url,
            preprocessor: self.preprocessor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.top_k, 50);
        assert_eq!(config.max_barrel_bytes, 2 * 1024 * 1024);
        assert!(config.preprocessor.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::builder()
            .top_k(10)
            .max_barrel_bytes(512)
            .build();

        assert_eq!(config.top_k, 10);
        assert_eq!(config.max_barrel_bytes, 512);
    }
}
