//! Time-boxed thumbnail cache
//!
//! Stores up to three quality tiers of an item's rendered thumbnail, keyed by
//! item identity. Entries expire after a TTL; expiry is validated on read and
//! a `sweep` pass exists for callers that want to reclaim memory eagerly.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Thumbnail quality tiers, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityTier {
    /// Grid/list placeholder resolution
    Low,
    /// Default card resolution
    Medium,
    /// Detail-view resolution
    High,
}

impl QualityTier {
    fn index(self) -> usize {
        match self {
            QualityTier::Low => 0,
            QualityTier::Medium => 1,
            QualityTier::High => 2,
        }
    }
}

/// One cached item: up to three encoded thumbnail payloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    tiers: [Option<Vec<u8>>; 3],
}

impl CacheEntry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an encoded payload for a tier
    pub fn set_tier(&mut self, tier: QualityTier, payload: Vec<u8>) {
        self.tiers[tier.index()] = Some(payload);
    }

    /// Get the encoded payload for a tier, if present
    pub fn tier(&self, tier: QualityTier) -> Option<&[u8]> {
        self.tiers[tier.index()].as_deref()
    }

    /// Best available payload at or below the requested tier
    pub fn best_up_to(&self, tier: QualityTier) -> Option<&[u8]> {
        self.tiers[..=tier.index()]
            .iter()
            .rev()
            .find_map(|t| t.as_deref())
    }
}

struct TimedEntry {
    entry: CacheEntry,
    inserted_at: Instant,
    ttl: Duration,
}

impl TimedEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= self.ttl
    }
}

/// A TTL cache of thumbnail entries keyed by item identity
pub struct ThumbnailCache {
    entries: HashMap<String, TimedEntry>,
    default_ttl: Duration,
}

impl ThumbnailCache {
    /// Create a cache whose entries expire after `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    /// Insert or replace an entry with the default TTL
    pub fn put(&mut self, key: impl Into<String>, entry: CacheEntry) {
        self.put_with_ttl(key, entry, self.default_ttl);
    }

    /// Insert or replace an entry with an explicit TTL
    pub fn put_with_ttl(&mut self, key: impl Into<String>, entry: CacheEntry, ttl: Duration) {
        self.entries.insert(
            key.into(),
            TimedEntry {
                entry,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Look up an entry, validating expiry on read.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<&CacheEntry> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|timed| timed.is_expired(Instant::now()));
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|timed| &timed.entry)
    }

    /// Remove every expired entry
    pub fn sweep(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, timed| !timed.is_expired(now));
    }

    /// Remove a single entry regardless of expiry
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of entries currently stored (including not-yet-swept expired ones)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
