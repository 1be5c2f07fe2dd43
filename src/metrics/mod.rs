use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::maintenance::MaintenanceStatus;
use crate::models::MatchMode;

/// Prometheus metrics for one indexer
///
/// Each indexer owns its own registry, so several instances in one
/// process (as in tests) do not collide on metric names.
#[derive(Clone)]
pub struct IndexerMetrics {
    // Counters
    pub documents_indexed: Counter,
    pub documents_deleted: Counter,
    pub queries_total: CounterVec,

    // Gauges
    pub pending_terms: Gauge,
    pub dirty_indexes: Gauge,
    pub cached_indexes: Gauge,

    // Histograms
    pub query_latency: HistogramVec,

    registry: Arc<Registry>,
}

impl IndexerMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let documents_indexed = Counter::with_opts(Opts::new(
            "ftdex_documents_indexed_total",
            "Total number of documents indexed",
        ))?;
        registry.register(Box::new(documents_indexed.clone()))?;

        let documents_deleted = Counter::with_opts(Opts::new(
            "ftdex_documents_deleted_total",
            "Total number of documents invalidated",
        ))?;
        registry.register(Box::new(documents_deleted.clone()))?;

        let queries_total = CounterVec::new(
            Opts::new("ftdex_queries_total", "Total number of queries by match mode"),
            &["mode"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        let pending_terms = Gauge::with_opts(Opts::new(
            "ftdex_pending_terms",
            "Terms with entries waiting to be appended",
        ))?;
        registry.register(Box::new(pending_terms.clone()))?;

        let dirty_indexes = Gauge::with_opts(Opts::new(
            "ftdex_dirty_indexes",
            "Posting lists waiting for a full rewrite",
        ))?;
        registry.register(Box::new(dirty_indexes.clone()))?;

        let cached_indexes = Gauge::with_opts(Opts::new(
            "ftdex_cached_indexes",
            "Posting lists held in the cache",
        ))?;
        registry.register(Box::new(cached_indexes.clone()))?;

        let query_latency = HistogramVec::new(
            HistogramOpts::new("ftdex_query_latency_seconds", "Query evaluation latency")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["mode"],
        )?;
        registry.register(Box::new(query_latency.clone()))?;

        Ok(Self {
            documents_indexed,
            documents_deleted,
            queries_total,
            pending_terms,
            dirty_indexes,
            cached_indexes,
            query_latency,
            registry: Arc::new(registry),
        })
    }

    pub fn record_index(&self) {
        self.documents_indexed.inc();
    }

    pub fn record_delete(&self) {
        self.documents_deleted.inc();
    }

    pub fn record_query(&self, mode: MatchMode, duration_secs: f64) {
        self.queries_total.with_label_values(&[mode.as_str()]).inc();
        self.query_latency
            .with_label_values(&[mode.as_str()])
            .observe(duration_secs);
    }

    /// Refresh the queue depth gauges
    pub fn set_status(&self, status: &MaintenanceStatus) {
        self.pending_terms.set(status.pending as f64);
        self.dirty_indexes.set(status.dirty as f64);
    }

    pub fn set_cache_size(&self, len: usize) {
        self.cached_indexes.set(len as f64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
