//! Resolver configuration.
//!
//! Loaded from JSON with [`crate::loader::load_config`]; every field is
//! optional and falls back to the defaults below.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cache::{
    DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL, DEFAULT_LOCAL_CAPACITY, DEFAULT_SHARED_TIMEOUT,
};
use crate::detector::DEFAULT_MIN_PIVOT_SEGMENTS;
use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfig {
    /// Paths shorter than this are never treated as pivots.
    pub min_pivot_segments: usize,
    pub cache_ttl_secs: u64,
    pub cache_key_prefix: String,
    /// Maximum number of entries in the process-local cache tier.
    pub local_cache_capacity: usize,
    /// Upper bound on one shared-cache call.
    pub shared_cache_timeout_ms: u64,
    /// Path prefixes (e.g. `auth`, `auth/login`) that skip resolution.
    pub bypass_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_pivot_segments: DEFAULT_MIN_PIVOT_SEGMENTS,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
            local_cache_capacity: DEFAULT_LOCAL_CAPACITY,
            shared_cache_timeout_ms: DEFAULT_SHARED_TIMEOUT.as_millis() as u64,
            bypass_prefixes: vec!["auth".to_string()],
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.min_pivot_segments < DEFAULT_MIN_PIVOT_SEGMENTS {
            return Err(ResolveError::InvalidConfig(format!(
                "minPivotSegments must be at least {DEFAULT_MIN_PIVOT_SEGMENTS}, got {}",
                self.min_pivot_segments
            )));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ResolveError::InvalidConfig(
                "cacheTtlSecs must be positive".to_string(),
            ));
        }
        if Instant::now().checked_add(self.cache_ttl()).is_none() {
            return Err(ResolveError::InvalidConfig(format!(
                "cacheTtlSecs {} is out of range",
                self.cache_ttl_secs
            )));
        }
        if self.local_cache_capacity == 0 {
            return Err(ResolveError::InvalidConfig(
                "localCacheCapacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn shared_cache_timeout(&self) -> Duration {
        Duration::from_millis(self.shared_cache_timeout_ms)
    }

    /// True when the path starts with one of the bypass prefixes. Matching is
    /// per segment and case-insensitive, so `auth` covers `Auth/login` but
    /// not `authors`.
    pub fn is_bypassed<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        let segments: Vec<&str> = segments
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();

        self.bypass_prefixes.iter().any(|prefix| {
            let prefix: Vec<&str> = prefix
                .split('/')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            !prefix.is_empty()
                && prefix.len() <= segments.len()
                && prefix
                    .iter()
                    .zip(&segments)
                    .all(|(p, s)| p.eq_ignore_ascii_case(s))
        })
    }
}
