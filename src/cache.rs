//! Two-tier read-through cache for resolution results.
//!
//! Read path: process-local hit, else shared-store hit (copied into the local
//! tier), else compute and write both tiers. Entries in both tiers expire by
//! TTL only; there is no invalidation beyond [`ResolutionCache::flush`].
//!
//! The local tier is bounded: past its capacity the least recently used
//! entry goes, and expired entries at the cold end are dropped on every
//! write.
//!
//! The shared tier is best effort. Any error or timeout talking to it is
//! logged and the request carries on as if the tier did not exist.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use strum_macros::{AsRefStr, Display};
use tracing::{debug, warn};

use crate::error::{CacheError, ResolveError};
use crate::types::ResolvedTarget;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "pathway:resolve:";
pub const DEFAULT_SHARED_TIMEOUT: Duration = Duration::from_millis(50);
pub const DEFAULT_LOCAL_CAPACITY: usize = 10_000;

/// Shared, TTL-based key/value store backing the second cache tier.
///
/// Values are opaque strings (the resolver stores JSON). Implementations
/// should give up after `timeout` and report [`CacheError::Timeout`].
pub trait SharedStore: Send + Sync {
    fn get(&self, key: &str, timeout: Duration) -> Result<Option<String>, CacheError>;

    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<(), CacheError>;

    /// Drop every key starting with `prefix`, returning how many went.
    fn flush_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

/// In-process [`SharedStore`], useful for single-node deployments and tests.
///
/// Expired entries are swept on every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Entries that expired since the last write
    /// are still counted.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SharedStore for MemoryStore {
    fn get(&self, key: &str, _timeout: Duration) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value.clone()))
    }

    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        _timeout: Duration,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("ttl {ttl:?} is out of range")))?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, (_, expires)| now < *expires);
        entries.insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    fn flush_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }
}

/// Where a resolution result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum CacheOutcome {
    LocalHit,
    SharedHit,
    Miss,
    /// The path matched a bypass prefix and was not resolved.
    Bypassed,
    /// Resolution failed; nothing was cached.
    Failed,
}

#[derive(Debug, Clone)]
struct LocalEntry {
    target: Arc<ResolvedTarget>,
    expires_at: Instant,
}

/// Entries removed by [`ResolutionCache::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushCounts {
    pub local: usize,
    pub shared: usize,
}

/// The single cache service shared by every request a [`crate::Resolver`]
/// handles.
pub struct ResolutionCache {
    local: Mutex<LruCache<String, LocalEntry>>,
    shared: Option<Arc<dyn SharedStore>>,
    ttl: Duration,
    key_prefix: String,
    shared_timeout: Duration,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_KEY_PREFIX, DEFAULT_SHARED_TIMEOUT)
    }
}

impl ResolutionCache {
    /// A local-only cache. Attach a shared tier with
    /// [`ResolutionCache::with_shared_store`].
    pub fn new(ttl: Duration, key_prefix: impl Into<String>, shared_timeout: Duration) -> Self {
        Self {
            local: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_LOCAL_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
            shared: None,
            ttl,
            key_prefix: key_prefix.into(),
            shared_timeout,
        }
    }

    pub fn with_shared_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.shared = Some(store);
        self
    }

    /// Bound the local tier to `capacity` entries. Existing entries are
    /// dropped.
    pub fn with_local_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.local = Mutex::new(LruCache::new(capacity));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shared-tier key: the prefix plus a SHA-256 of the raw path.
    pub fn key_for(&self, raw_path: &str) -> String {
        format!(
            "{}{:x}",
            self.key_prefix,
            Sha256::digest(raw_path.as_bytes())
        )
    }

    /// Number of live local entries.
    pub fn local_len(&self) -> usize {
        let now = Instant::now();
        self.local
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, e)| now < e.expires_at)
            .count()
    }

    /// Return the cached result for `raw_path`, computing and storing it on a
    /// miss. Errors from `compute` are returned as-is and never cached.
    ///
    /// `deadline` is the enclosing request's deadline. Once it has passed the
    /// shared tier is skipped entirely.
    pub fn get_or_compute<F>(
        &self,
        raw_path: &str,
        deadline: Option<Instant>,
        compute: F,
    ) -> Result<(Arc<ResolvedTarget>, CacheOutcome), ResolveError>
    where
        F: FnOnce() -> Result<ResolvedTarget, ResolveError>,
    {
        if let Some(target) = self.local_get(raw_path) {
            return Ok((target, CacheOutcome::LocalHit));
        }

        let key = self.key_for(raw_path);
        let mut write_shared = false;

        if let Some(store) = &self.shared {
            match self.shared_budget(deadline) {
                Some(budget) => match store.get(&key, budget) {
                    Ok(Some(encoded)) => match serde_json::from_str::<ResolvedTarget>(&encoded) {
                        Ok(target) => {
                            let target = Arc::new(target);
                            self.local_put(raw_path, Arc::clone(&target));
                            debug!(event = "Cache", phase = "SharedHit", path = raw_path);
                            return Ok((target, CacheOutcome::SharedHit));
                        }
                        Err(err) => {
                            warn!(
                                event = "Cache",
                                phase = "Decode",
                                path = raw_path,
                                error = err.to_string(),
                                "discarding undecodable shared cache entry"
                            );
                            write_shared = true;
                        }
                    },
                    Ok(None) => write_shared = true,
                    Err(err) => {
                        warn!(
                            event = "Cache",
                            phase = "SharedGet",
                            path = raw_path,
                            error = err.to_string(),
                            "shared cache read failed, resolving without it"
                        );
                    }
                },
                None => {
                    debug!(
                        event = "Cache",
                        phase = "DeadlineExceeded",
                        path = raw_path,
                        "skipping shared cache"
                    );
                }
            }
        }

        let target = Arc::new(compute()?);
        self.local_put(raw_path, Arc::clone(&target));

        if write_shared {
            self.shared_put(&key, raw_path, &target, deadline);
        }

        Ok((target, CacheOutcome::Miss))
    }

    /// Operational flush: empties the local tier and every shared key under
    /// this cache's prefix.
    pub fn flush(&self) -> FlushCounts {
        let local = {
            let mut entries = self.local.lock().unwrap_or_else(PoisonError::into_inner);
            let count = entries.len();
            entries.clear();
            count
        };

        let shared = match &self.shared {
            Some(store) => store.flush_prefix(&self.key_prefix).unwrap_or_else(|err| {
                warn!(
                    event = "Cache",
                    phase = "Flush",
                    error = err.to_string(),
                    "shared cache flush failed"
                );
                0
            }),
            None => 0,
        };

        FlushCounts { local, shared }
    }

    fn local_get(&self, raw_path: &str) -> Option<Arc<ResolvedTarget>> {
        let now = Instant::now();
        let mut entries = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let live = entries
            .get(raw_path)
            .map(|entry| (now < entry.expires_at).then(|| Arc::clone(&entry.target)));
        match live {
            Some(Some(target)) => Some(target),
            Some(None) => {
                entries.pop(raw_path);
                None
            }
            None => None,
        }
    }

    fn local_put(&self, raw_path: &str, target: Arc<ResolvedTarget>) {
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(self.ttl) else {
            warn!(
                event = "Cache",
                phase = "LocalPut",
                path = raw_path,
                "ttl out of range, not caching"
            );
            return;
        };
        let mut entries = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        while entries
            .peek_lru()
            .is_some_and(|(_, entry)| entry.expires_at <= now)
        {
            entries.pop_lru();
        }
        entries.put(raw_path.to_string(), LocalEntry { target, expires_at });
    }

    fn shared_put(
        &self,
        key: &str,
        raw_path: &str,
        target: &ResolvedTarget,
        deadline: Option<Instant>,
    ) {
        let (Some(store), Some(budget)) = (&self.shared, self.shared_budget(deadline)) else {
            return;
        };
        let result = serde_json::to_string(target)
            .map_err(CacheError::from)
            .and_then(|encoded| store.set(key, encoded, self.ttl, budget));
        if let Err(err) = result {
            warn!(
                event = "Cache",
                phase = "SharedSet",
                path = raw_path,
                error = err.to_string(),
                "shared cache write failed"
            );
        }
    }

    /// Time the shared tier may take for one call, or `None` when the request
    /// deadline has already passed.
    fn shared_budget(&self, deadline: Option<Instant>) -> Option<Duration> {
        match deadline {
            None => Some(self.shared_timeout),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                (!remaining.is_zero()).then(|| remaining.min(self.shared_timeout))
            }
        }
    }
}
