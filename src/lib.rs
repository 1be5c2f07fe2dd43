pub mod cache;
pub mod config;
pub mod error;
pub mod indexer;
pub mod invalidated;
pub mod maintenance;
pub mod metrics;
pub mod models;
pub mod postings;
pub mod query;
pub mod tokenizer;
pub mod trigram;

pub use config::{IndexerConfig, MaintenanceConfig, TokenizerConfig};
pub use error::{FtdexError, Result};
pub use indexer::{FullTextIndexer, Indexer};
pub use maintenance::MaintenanceStatus;
pub use metrics::IndexerMetrics;
pub use models::*;
pub use tokenizer::TermNormalizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
