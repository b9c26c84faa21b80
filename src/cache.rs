//! Result cache for pricing calculations.
//!
//! Entries are keyed by the normalized request plus the rule-snapshot
//! version, so advancing the snapshot makes every old entry unreachable
//! (new keys naturally miss). Version-based invalidation is the primary
//! correctness mechanism; the optional TTL is only a safety net.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::models::{PricingRequest, PricingResult};

/// A stable cache key: the canonical string form of a normalized request
/// concatenated with the rule-set version it was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for a request under a given rule-set version.
    ///
    /// The request's country and additional-service sets are `BTreeSet`s,
    /// so iteration already yields the canonical ascending order; two
    /// requests that normalize identically produce identical keys.
    /// Free-form components (service ids) are escaped so a delimiter
    /// character inside an id cannot make two distinct requests collide.
    pub fn for_request(request: &PricingRequest, rule_set_version: &str) -> Self {
        let countries: Vec<&str> = request.country_codes.iter().map(|c| c.as_str()).collect();
        let additional: Vec<String> = request
            .additional_service_ids
            .iter()
            .map(|s| escape(s))
            .collect();

        Self(format!(
            "{version}|{countries}|{service}|{volume}|{frequency}|{additional}|{as_of}|{currency}",
            version = escape(rule_set_version),
            countries = countries.join(","),
            service = escape(&request.service_id),
            volume = request.transaction_volume,
            frequency = request.filing_frequency,
            additional = additional.join(","),
            as_of = request.as_of_date,
            currency = request.currency,
        ))
    }
}

/// Escapes the key delimiters inside a free-form component.
fn escape(component: &str) -> String {
    component
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace(',', "\\,")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Arc<PricingResult>,
    rule_set_version: String,
    inserted_at: Instant,
}

/// A concurrent, never-mutating result cache.
///
/// A hit returns the identical `Arc` that was stored, so a cached result
/// is bit-for-bit the value a fresh computation produced for the same
/// key. Reads of unrelated keys never block each other.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Option<Duration>,
}

impl ResultCache {
    /// Creates a cache with version-based invalidation only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that additionally expires entries after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Looks up a result; expired entries are dropped on access.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<PricingResult>> {
        if let Some(entry) = self.entries.get(key) {
            if let Some(ttl) = self.ttl {
                if entry.inserted_at.elapsed() > ttl {
                    drop(entry);
                    self.entries.remove(key);
                    return None;
                }
            }
            return Some(Arc::clone(&entry.result));
        }
        None
    }

    /// Stores a result under its key and rule-set version.
    pub fn put(&self, key: CacheKey, result: Arc<PricingResult>, rule_set_version: &str) {
        self.entries.insert(
            key,
            CacheEntry {
                result,
                rule_set_version: rule_set_version.to_string(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops every entry computed against the given rule-set version.
    ///
    /// New-version keys already miss naturally; this reclaims the memory
    /// of entries that can no longer be reached through current keys.
    pub fn invalidate_by_rule_set_version(&self, old_version: &str) {
        self.entries
            .retain(|_, entry| entry.rule_set_version != old_version);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
