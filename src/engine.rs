use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, warn};

use crate::cache::{CacheOutcome, ResolutionCache, SharedStore};
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::metrics::{FlushStats, MetricsSink, NoOpSink, ResolutionPhases, ResolutionStats};
use crate::strategy::{BaseStrategy, PivotStrategy};
use crate::timers::{PhaseTimer, as_millis_f64};
use crate::traits::{EntityRegistry, ResolveStrategy};
use crate::types::{RequestAttributes, ResolvedTarget, SegmentPath};

/// The resolution service. Cloneable and thread-safe; clones share the
/// registry, the cache and the metrics sink.
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<dyn EntityRegistry>,
    strategies: Arc<Vec<Box<dyn ResolveStrategy>>>,
    cache: Arc<ResolutionCache>,
    config: Arc<ResolverConfig>,
    sink: Arc<dyn MetricsSink>,
}

impl Resolver {
    /// Build a resolver with a local-only cache and no metrics.
    pub fn new(
        registry: Arc<dyn EntityRegistry>,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        // Order matters: the pivot strategy is the narrower match and must
        // get the first look.
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(PivotStrategy::new(config.min_pivot_segments)),
            Box::new(BaseStrategy),
        ];
        Ok(Self {
            registry,
            strategies: Arc::new(strategies),
            cache: Arc::new(Self::cache_for(&config)),
            config: Arc::new(config),
            sink: Arc::new(NoOpSink),
        })
    }

    /// Replace the cache with one backed by `store` as its shared tier.
    pub fn with_shared_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.cache = Arc::new(Self::cache_for(&self.config).with_shared_store(store));
        self
    }

    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn resolve<S: AsRef<str>>(
        &self,
        segments: &[S],
    ) -> Result<Arc<ResolvedTarget>, ResolveError> {
        self.resolve_with_deadline(segments, None)
    }

    /// Resolve, giving up on the shared cache tier once `deadline` passes.
    /// Resolution itself still completes; only cache traffic is cut short.
    pub fn resolve_with_deadline<S: AsRef<str>>(
        &self,
        segments: &[S],
        deadline: Option<Instant>,
    ) -> Result<Arc<ResolvedTarget>, ResolveError> {
        let start = Instant::now();
        let mut compute_time = Duration::ZERO;

        let result = SegmentPath::parse(segments).and_then(|path| {
            let raw = path.full_path();
            self.cache.get_or_compute(&raw, deadline, || {
                let _timer = PhaseTimer::new(&mut compute_time);
                self.compute(&path)
            })
        });

        let path_label = || {
            segments
                .iter()
                .map(|s| s.as_ref().trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("/")
        };

        match result {
            Ok((target, outcome)) => {
                debug!(
                    event = "Resolve",
                    phase = "Result",
                    path = target.full_path.as_str(),
                    outcome = outcome.as_ref(),
                    entity_type = target.entity_type.as_str(),
                    is_pivot = target.is_pivot
                );
                self.record(
                    start,
                    compute_time,
                    outcome,
                    Some(target.is_pivot),
                    target.full_path.clone(),
                );
                Ok(target)
            }
            Err(err) => {
                debug!(
                    event = "Resolve",
                    phase = "Failed",
                    path = path_label(),
                    error = err.to_string()
                );
                self.record(start, compute_time, CacheOutcome::Failed, None, path_label());
                Err(err)
            }
        }
    }

    /// Resolve a raw `a/b/3` path. Returns `Ok(None)` when the path falls
    /// under a configured bypass prefix.
    pub fn resolve_request_path(
        &self,
        path: &str,
    ) -> Result<Option<Arc<ResolvedTarget>>, ResolveError> {
        let segments: Vec<&str> = path.split('/').collect();
        if self.config.is_bypassed(&segments) {
            debug!(event = "Resolve", phase = "Bypassed", path = path);
            self.record(
                Instant::now(),
                Duration::ZERO,
                CacheOutcome::Bypassed,
                None,
                path.trim_matches('/').to_string(),
            );
            return Ok(None);
        }
        self.resolve(&segments).map(Some)
    }

    /// Resolve and attach the result to `attrs`. On failure `attrs` is left
    /// untouched.
    pub fn resolve_into<S: AsRef<str>>(
        &self,
        segments: &[S],
        attrs: &mut RequestAttributes,
    ) -> Result<Arc<ResolvedTarget>, ResolveError> {
        let target = self.resolve(segments)?;
        target.attach(attrs);
        Ok(target)
    }

    /// Drop every cached resolution, e.g. after a schema deployment.
    pub fn flush_cache(&self) -> FlushStats {
        let counts = self.cache.flush();
        info!(
            event = "Cache",
            phase = "Flushed",
            local = counts.local,
            shared = counts.shared
        );
        let stats = FlushStats {
            flush_time: SystemTime::now(),
            local_entries: counts.local,
            shared_entries: counts.shared,
        };
        self.sink.on_flush(&stats);
        stats
    }

    fn compute(&self, path: &SegmentPath) -> Result<ResolvedTarget, ResolveError> {
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.can_handle(path))
            .ok_or_else(|| {
                ResolveError::InvalidPath(format!("no strategy accepts '{}'", path.full_path()))
            })?;

        debug!(
            event = "Resolve",
            phase = "Strategy",
            strategy = strategy.name(),
            path = path.full_path()
        );

        strategy
            .resolve(path, self.registry.as_ref())
            .inspect_err(|err| {
                if matches!(err, ResolveError::MalformedPivotPath(_)) {
                    warn!(
                        event = "Resolve",
                        phase = "Strategy",
                        strategy = strategy.name(),
                        path = path.full_path(),
                        "pivot detector and parser disagree"
                    );
                }
            })
    }

    fn record(
        &self,
        start: Instant,
        compute_time: Duration,
        outcome: CacheOutcome,
        is_pivot: Option<bool>,
        path: String,
    ) {
        let duration = start.elapsed();
        let stats = ResolutionStats {
            duration,
            outcome,
            is_pivot,
            path,
        };
        let phases = ResolutionPhases {
            compute_ms: as_millis_f64(compute_time),
            total_ms: as_millis_f64(duration),
        };
        self.sink.on_resolution(&stats);
        self.sink.on_resolution_phases(&stats, &phases);
    }

    fn cache_for(config: &ResolverConfig) -> ResolutionCache {
        let cache = ResolutionCache::new(
            config.cache_ttl(),
            config.cache_key_prefix.clone(),
            config.shared_cache_timeout(),
        );
        match NonZeroUsize::new(config.local_cache_capacity) {
            Some(capacity) => cache.with_local_capacity(capacity),
            None => cache,
        }
    }
}

#[cfg(test)]
mod tests;
