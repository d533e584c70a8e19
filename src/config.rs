//! Search configuration stored alongside a location store.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Name of the optional configuration file inside a store directory
pub const CONFIG_FILE: &str = "store.json";

/// What to do when a span cannot be located in its page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineErrorPolicy {
    /// Drop the hit and count it in the match set diagnostics
    #[default]
    Skip,
    /// Fail the whole search
    Abort,
}

/// Configuration for searching a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Index engine subdirectory of the store
    pub index_dir: String,
    /// Indexed text field, also the highlight field
    pub field: String,
    /// Permitted edits per query term
    pub fuzziness: u8,
    pub line_errors: LineErrorPolicy,
    /// Optional per-query time limit in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_dir: "index".to_string(),
            field: "Text".to_string(),
            fuzziness: 1,
            line_errors: LineErrorPolicy::Skip,
            timeout_ms: None,
        }
    }
}

impl SearchConfig {
    /// Load `store.json` from `store_path`, falling back to defaults when absent
    pub fn load(store_path: &Path) -> std::io::Result<Self> {
        let path = store_path.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(&path)?;
        serde_json::from_reader(file).map_err(std::io::Error::other)
    }

    /// Write `store.json` into `store_path`
    pub fn save(&self, store_path: &Path) -> std::io::Result<()> {
        let file = File::create(store_path.join(CONFIG_FILE))?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::other)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(SearchConfig::load(temp_dir.path()).unwrap(), SearchConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{"line_errors": "abort", "timeout_ms": 250}"#,
        )
        .unwrap();

        let config = SearchConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.line_errors, LineErrorPolicy::Abort);
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.field, "Text");
        assert_eq!(config.fuzziness, 1);
    }

    #[test]
    fn test_save_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config = SearchConfig {
            fuzziness: 0,
            ..Default::default()
        };
        config.save(temp_dir.path()).unwrap();
        assert_eq!(SearchConfig::load(temp_dir.path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(SearchConfig::load(temp_dir.path()).is_err());
    }
}
