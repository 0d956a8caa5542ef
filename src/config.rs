//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::cache::{INTERACTIVE_TTL, WORKSPACE_TTL};

/// Configuration for the analysis engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on files analyzed concurrently during a workspace scan
    pub max_concurrent_files: usize,
    /// TTL for the per-file interactive result cache, in seconds
    pub file_cache_ttl_secs: u64,
    /// TTL for workspace-level result caching, in seconds
    pub workspace_cache_ttl_secs: u64,
    /// Optional TOML/JSON rule file appended to the built-in catalog
    pub rule_file_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 8,
            file_cache_ttl_secs: INTERACTIVE_TTL.as_secs(),
            workspace_cache_ttl_secs: WORKSPACE_TTL.as_secs(),
            rule_file_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize_from_empty_table() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_concurrent_files, 8);
        assert_eq!(config.file_cache_ttl_secs, 300);
        assert!(config.rule_file_path.is_none());
    }
}
