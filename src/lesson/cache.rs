//! In-memory cache of generated lesson plans.
//!
//! Entries are keyed by a SHA-256 digest of every request input, expire after
//! a TTL and are evicted oldest-first at capacity. Only successful plans are
//! stored. [`PlanCache::lock_key`] serializes generations for identical
//! inputs so concurrent callers share one model call.

use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::generator::LessonRequest;
use super::plan::LessonPlan;

/// Hex-encoded SHA-256 digest identifying a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Computes the key for a request.
    ///
    /// The digest covers the JSON array `[subject, grade, topic,
    /// teacher_input, language, classroom_context, output_mode,
    /// curriculum_context]`, with absent optional values as `""`.
    pub fn for_request(request: &LessonRequest) -> Self {
        let material = json!([
            request.subject,
            request.grade,
            request.topic,
            request.teacher_input.as_deref().unwrap_or(""),
            request.language,
            request.classroom_context,
            request.output_mode.as_str(),
            request.curriculum_context.as_deref().unwrap_or(""),
        ])
        .to_string();

        let mut hasher = Sha256::new();
        hasher.update(material.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size and lifetime limits for [`PlanCache`].
#[derive(Debug, Clone)]
pub struct PlanCacheConfig {
    /// Maximum number of stored plans.
    pub max_entries: usize,
    /// Entries older than this are treated as absent.
    pub ttl: Duration,
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(6 * 3600),
        }
    }
}

impl PlanCacheConfig {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_added: u64,
    pub entries_evicted: u64,
}

impl PlanCacheStats {
    /// Hit rate between 0.0 and 1.0, or 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

#[derive(Debug)]
struct CacheEntry {
    plan: LessonPlan,
    created_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: PlanCacheStats,
}

/// Shared, thread-safe plan cache.
#[derive(Debug, Default)]
pub struct PlanCache {
    config: PlanCacheConfig,
    state: Mutex<CacheState>,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl PlanCache {
    pub fn new(max_entries: usize) -> Self {
        Self::with_config(PlanCacheConfig::new(max_entries))
    }

    pub fn with_config(config: PlanCacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PlanCacheConfig {
        &self.config
    }

    /// Returns the cached plan for `key`, counting a hit or a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<LessonPlan> {
        let mut state = self.state.lock().await;
        let ttl = self.config.ttl;

        let live = match state.entries.get(key) {
            Some(entry) if entry.created_at.elapsed() < ttl => Some(entry.plan.clone()),
            Some(_) => {
                state.entries.remove(key);
                state.stats.entries_evicted += 1;
                None
            }
            None => None,
        };

        match live {
            Some(plan) => {
                state.stats.hits += 1;
                Some(plan)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Stores a plan, evicting expired entries and then the oldest entry if
    /// the cache is full.
    pub async fn insert(&self, key: CacheKey, plan: LessonPlan) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut state = self.state.lock().await;
        let ttl = self.config.ttl;

        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.created_at.elapsed() < ttl);
        state.stats.entries_evicted += (before - state.entries.len()) as u64;

        if !state.entries.contains_key(&key) && state.entries.len() >= self.config.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                state.entries.remove(&oldest);
                state.stats.entries_evicted += 1;
            }
        }

        state.entries.insert(
            key,
            CacheEntry {
                plan,
                created_at: Instant::now(),
            },
        );
        state.stats.entries_added += 1;
    }

    /// Waits until no other caller holds `key`, then holds it until the
    /// returned guard is dropped.
    pub async fn lock_key(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut in_flight = self.in_flight.lock().await;
            // Drop slots nobody is waiting on.
            in_flight.retain(|_, slot| Arc::strong_count(slot) > 1);
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    pub async fn stats(&self) -> PlanCacheStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes all entries; statistics are kept.
    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::OutputMode;
    use serde_json::Map;

    fn request() -> LessonRequest {
        LessonRequest::new("Primary 4", "Mathematics", "Fractions")
    }

    fn plan(title: &str) -> LessonPlan {
        let mut map = Map::new();
        map.insert("title".to_string(), title.into());
        LessonPlan::from_map(map)
    }

    #[test]
    fn test_key_is_stable_hex_digest() {
        let key = CacheKey::for_request(&request());
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, CacheKey::for_request(&request()));
    }

    #[test]
    fn test_key_covers_every_input() {
        let base = CacheKey::for_request(&request());
        let variants = [
            request().with_teacher_input("chalk"),
            request().with_language("Hausa"),
            request().with_classroom_context("urban"),
            request().with_output_mode(OutputMode::Short),
            request().with_curriculum_context("Topic: Fractions"),
            LessonRequest::new("Primary 5", "Mathematics", "Fractions"),
        ];
        for variant in variants {
            assert_ne!(CacheKey::for_request(&variant), base, "{variant:?}");
        }
    }

    #[test]
    fn test_empty_teacher_input_matches_absent() {
        assert_eq!(
            CacheKey::for_request(&request().with_teacher_input("")),
            CacheKey::for_request(&request())
        );
    }

    #[tokio::test]
    async fn test_get_and_insert_track_stats() {
        let cache = PlanCache::new(10);
        let key = CacheKey::for_request(&request());

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), plan("Fractions")).await;
        assert_eq!(cache.get(&key).await, Some(plan("Fractions")));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries_added, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_evicts_oldest_at_capacity() {
        let cache = PlanCache::new(2);
        let keys: Vec<CacheKey> = ["a", "b", "c"]
            .iter()
            .map(|topic| CacheKey::for_request(&LessonRequest::new("Primary 1", "Math", *topic)))
            .collect();

        for (key, title) in keys.iter().zip(["a", "b", "c"]) {
            cache.insert(key.clone(), plan(title)).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&keys[0]).await.is_none());
        assert!(cache.get(&keys[2]).await.is_some());
        assert_eq!(cache.stats().await.entries_evicted, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = PlanCache::with_config(PlanCacheConfig::new(4).with_ttl(Duration::from_millis(10)));
        let key = CacheKey::for_request(&request());
        cache.insert(key.clone(), plan("x")).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_lock_key_serializes_same_key() {
        let cache = Arc::new(PlanCache::new(4));
        let key = CacheKey::for_request(&request());

        let guard = cache.lock_key(&key).await;
        let waiter = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = cache.lock_key(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "second caller must wait for the first");

        drop(guard);
        waiter.await.expect("waiter completes");
    }
}
