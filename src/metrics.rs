//! Vendor-agnostic resolution metrics via a pluggable sink.
//!
//! The resolver reports every resolution and cache flush to a [`MetricsSink`]
//! without tying the library to a metrics backend (Prometheus,
//! OpenTelemetry, StatsD, ...). The sink is handed to the resolver at
//! construction time; without one, a no-op sink is used.
//!
//! ```rust
//! use pathway_core::metrics::{FlushStats, MetricsSink, ResolutionStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Default)]
//! struct HitCounter {
//!     hits: AtomicU64,
//!     misses: AtomicU64,
//! }
//!
//! impl MetricsSink for HitCounter {
//!     fn on_resolution(&self, stats: &ResolutionStats) {
//!         if stats.outcome.is_hit() {
//!             self.hits.fetch_add(1, Ordering::Relaxed);
//!         } else {
//!             self.misses.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn on_flush(&self, _stats: &FlushStats) {}
//! }
//! ```

use serde::Serialize;
use std::time::{Duration, SystemTime};

pub use crate::cache::CacheOutcome;

impl CacheOutcome {
    /// True for results served from either cache tier.
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::LocalHit | CacheOutcome::SharedHit)
    }
}

/// Snapshot of one resolution, passed to [`MetricsSink::on_resolution`].
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionStats {
    /// Wall-clock time for the whole call, cache lookups included.
    pub duration: Duration,
    pub outcome: CacheOutcome,
    /// `None` when resolution failed or was bypassed.
    pub is_pivot: Option<bool>,
    /// The path as received, segments joined by `/`.
    pub path: String,
}

/// Per-phase breakdown of a resolution, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionPhases {
    /// Time spent in the strategies (zero on a cache hit).
    pub compute_ms: f64,
    pub total_ms: f64,
}

impl ResolutionPhases {
    /// Time not spent computing: path parsing and cache traffic.
    pub fn cache_overhead_ms(&self) -> f64 {
        self.total_ms - self.compute_ms
    }
}

/// Emitted after [`crate::Resolver::flush_cache`].
#[derive(Debug, Clone, Serialize)]
pub struct FlushStats {
    pub flush_time: SystemTime,
    pub local_entries: usize,
    pub shared_entries: usize,
}

/// Consumer of resolver metrics.
///
/// Called synchronously on the request path, so implementations must be
/// cheap and thread-safe.
pub trait MetricsSink: Send + Sync {
    fn on_resolution(&self, stats: &ResolutionStats);

    fn on_flush(&self, stats: &FlushStats);

    /// Phase-level timings. Default: ignored.
    fn on_resolution_phases(&self, _stats: &ResolutionStats, _phases: &ResolutionPhases) {}
}

/// Sink used when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_resolution(&self, _stats: &ResolutionStats) {}
    fn on_flush(&self, _stats: &FlushStats) {}
}
