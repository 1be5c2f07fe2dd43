use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FtdexError, Result};

/// Name of the optional configuration file inside the data directory
pub const CONFIG_FILE: &str = "config.json";

/// Term extraction configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Anything shorter cannot be matched by trigrams
    pub min_term_length: usize,
    /// Upper bound for indexed words, keeps file names manageable
    pub max_term_length: usize,
    pub stem: bool,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_term_length: 3,
            max_term_length: 128,
            stem: true,
            language: "english".to_string(),
        }
    }
}

/// Background maintenance timing
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Sleep between maintenance cycles
    pub idle_interval_ms: u64,
    /// Pause between two drained work units
    pub drain_pause_ms: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: 1000,
            drain_pause_ms: 100,
        }
    }
}

impl MaintenanceConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn drain_pause(&self) -> Duration {
        Duration::from_millis(self.drain_pause_ms)
    }
}

/// Full-text indexer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory holding config, stop words and (by default) the index
    pub data_path: PathBuf,
    /// Root of the posting file tree; relative paths resolve against `data_path`
    pub index_root_path: PathBuf,
    pub term_index_cache_limit: usize,
    /// Stop word file; relative paths resolve against `data_path`
    pub stop_words_file: PathBuf,
    /// Use the built-in English stop word list if the file is missing
    pub fallback_stopwords: bool,
    pub tokenizer: TokenizerConfig,
    pub maintenance: MaintenanceConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("."),
            index_root_path: PathBuf::from("IndexData"),
            term_index_cache_limit: 512,
            stop_words_file: PathBuf::from("stopWords.txt"),
            fallback_stopwords: true,
            tokenizer: TokenizerConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl IndexerConfig {
    /// Create a configuration rooted at the given data directory
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Default::default()
        }
    }

    /// Load `config.json` from the data directory, falling back to defaults
    /// for a missing file or missing keys
    pub fn load(data_path: impl AsRef<Path>) -> Result<Self> {
        let data_path = data_path.as_ref();
        let file = data_path.join(CONFIG_FILE);
        let mut config = if file.exists() {
            let raw = std::fs::read_to_string(&file)?;
            serde_json::from_str::<IndexerConfig>(&raw)?
        } else {
            IndexerConfig::default()
        };
        config.data_path = data_path.to_path_buf();
        Ok(config)
    }

    pub fn with_index_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_root_path = path.into();
        self
    }

    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.term_index_cache_limit = limit;
        self
    }

    pub fn with_stop_words_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stop_words_file = path.into();
        self
    }

    pub fn with_fallback_stopwords(mut self, enabled: bool) -> Self {
        self.fallback_stopwords = enabled;
        self
    }

    pub fn with_maintenance(mut self, maintenance: MaintenanceConfig) -> Self {
        self.maintenance = maintenance;
        self
    }

    /// Reject settings the index cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.term_index_cache_limit == 0 {
            return Err(FtdexError::Config(
                "term_index_cache_limit must be positive".to_string(),
            ));
        }
        if self.tokenizer.min_term_length < 3 {
            return Err(FtdexError::Config(format!(
                "min_term_length {} is below the trigram size",
                self.tokenizer.min_term_length
            )));
        }
        if self.tokenizer.max_term_length < self.tokenizer.min_term_length {
            return Err(FtdexError::Config(
                "max_term_length must not be below min_term_length".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved posting file root
    pub fn index_root(&self) -> PathBuf {
        self.resolve(&self.index_root_path)
    }

    /// Resolved stop word file
    pub fn stop_words_path(&self) -> PathBuf {
        self.resolve(&self.stop_words_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let stripped = path.strip_prefix("./").unwrap_or(path);
        if stripped.is_absolute() {
            stripped.to_path_buf()
        } else {
            self.data_path.join(stripped)
        }
    }
}
