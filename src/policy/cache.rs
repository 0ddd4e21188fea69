//! Bounded cache of hand-strength scores.
//!
//! Keys are order-independent card combinations, so "AsKd + Qh" and
//! "Qh + KdAs" hit the same entry. The cache never holds more than its
//! capacity: when a new key arrives at a full cache, victims are chosen by the
//! configured `EvictionPolicy` in one pass before the insert.

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::policy::cards::{Card, DECK_SIZE};
use crate::policy::config::{AdaptiveSizing, CacheConfig, EvictionPolicy};
use crate::policy::error::AgentError;

/// Canonical key for a set of cards: one bit per card id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Build the key for `private` and `board` together.
    ///
    /// Fails on an empty combination, a card outside the deck or a repeated
    /// card rather than producing a key that could alias another hand.
    pub fn from_cards(private: &[Card], board: &[Card]) -> Result<Self, AgentError> {
        let mut mask = 0u64;
        for card in private.iter().chain(board) {
            if card.id() >= DECK_SIZE {
                return Err(AgentError::InvalidCard(card.id()));
            }
            let bit = 1u64 << card.id();
            if mask & bit != 0 {
                return Err(AgentError::DuplicateCard(*card));
            }
            mask |= bit;
        }
        if mask == 0 {
            return Err(AgentError::EmptyCardSet);
        }
        Ok(Self(mask))
    }

    /// Raw bit mask.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Number of cards in the combination.
    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    score: f64,
    hits: u64,
    seq: u64,
}

/// Score cache with a hard capacity bound and optional self-tuning.
#[derive(Debug, Clone)]
pub struct EvaluationCache {
    entries: FxHashMap<CacheKey, CacheEntry>,
    capacity: usize,
    eviction: EvictionPolicy,
    adaptive: Option<AdaptiveSizing>,

    /// Monotonic insertion counter; breaks eviction ties toward older entries.
    next_seq: u64,
    /// New keys stored since the last capacity re-tune.
    new_entries: u64,
    games_played: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl EvaluationCache {
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            entries: FxHashMap::with_capacity_and_hasher(config.capacity, Default::default()),
            capacity: config.capacity,
            eviction: config.eviction,
            adaptive: config.adaptive,
            next_seq: 0,
            new_entries: 0,
            games_played: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    /// Look up a score, counting a hit for the entry.
    pub fn get(&mut self, key: &CacheKey) -> Option<f64> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.hits += 1;
                self.hits += 1;
                Some(entry.score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Read a score without touching usage metadata.
    pub fn peek(&self, key: &CacheKey) -> Option<f64> {
        self.entries.get(key).map(|e| e.score)
    }

    /// Store a score. An existing key is overwritten in place and keeps its
    /// hit count; a new key may evict others first.
    pub fn insert(&mut self, key: CacheKey, score: f64) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.score = score;
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict(self.entries.len() + 1 - self.capacity);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(key, CacheEntry { score, hits: 1, seq });
        self.new_entries += 1;
    }

    /// Cached score or `compute()`'s result, which is then stored.
    pub fn get_or_insert_with<F>(&mut self, key: CacheKey, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        if let Some(score) = self.get(&key) {
            return score;
        }
        let score = compute();
        self.insert(key, score);
        score
    }

    /// Remove `count` entries chosen by the eviction policy.
    fn evict(&mut self, count: usize) {
        if count == 0 {
            return;
        }

        let mut ranked: Vec<(CacheKey, f64, u64, u64)> = self
            .entries
            .iter()
            .map(|(k, e)| (*k, e.score, e.hits, e.seq))
            .collect();

        match self.eviction {
            EvictionPolicy::SmallestValue => ranked.sort_by(|a, b| {
                a.1.total_cmp(&b.1).then(a.3.cmp(&b.3))
            }),
            EvictionPolicy::LeastFrequentlyUsed => {
                ranked.sort_by(|a, b| a.2.cmp(&b.2).then(a.3.cmp(&b.3)))
            }
        }

        for (key, _, _, _) in ranked.into_iter().take(count) {
            self.entries.remove(&key);
            self.evictions += 1;
        }
        debug!("evicted {} cache entries ({:?})", count, self.eviction);
    }

    /// Drop every entry. Called when public cards change.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count a finished game; re-tunes capacity at the end of each window.
    pub fn record_game(&mut self) {
        self.games_played += 1;
        let Some(adaptive) = self.adaptive.clone() else {
            return;
        };
        if self.games_played % adaptive.retention_games != 0 {
            return;
        }

        let per_game = self.new_entries as f64 / adaptive.retention_games as f64;
        let resized = ((per_game * adaptive.growth) as usize).max(adaptive.min_capacity);
        info!(
            "cache capacity {} -> {} ({:.2} new entries per game)",
            self.capacity, resized, per_game
        );
        self.set_capacity(resized);
        self.new_entries = 0;
    }

    /// Change the bound, trimming immediately if the cache is now over it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        if self.entries.len() > self.capacity {
            self.evict(self.entries.len() - self.capacity);
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `key` is stored.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Hit count of an entry (insertion counts as one).
    pub fn hit_count(&self, key: &CacheKey) -> Option<u64> {
        self.entries.get(key).map(|e| e.hits)
    }

    /// Lifetime `(hits, misses, evictions)`.
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.hits, self.misses, self.evictions)
    }

    /// Games recorded so far.
    pub fn games_played(&self) -> u64 {
        self.games_played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn key(s: &str) -> CacheKey {
        CacheKey::from_cards(&Card::parse_many(s).unwrap(), &[]).unwrap()
    }

    fn cache(capacity: usize, eviction: EvictionPolicy) -> EvaluationCache {
        EvaluationCache::new(
            CacheConfig::default()
                .with_capacity(capacity)
                .with_eviction(eviction),
        )
        .unwrap()
    }

    #[test]
    fn test_key_is_order_independent() {
        let private = Card::parse_many("AsKd").unwrap();
        let board = Card::parse_many("Qh2c").unwrap();
        let a = CacheKey::from_cards(&private, &board).unwrap();
        let b = CacheKey::from_cards(&Card::parse_many("2cQh").unwrap(), &Card::parse_many("KdAs").unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_key_rejects_bad_combinations() {
        let ace = Card::parse("As").unwrap();
        assert_eq!(
            CacheKey::from_cards(&[ace], &[ace]),
            Err(AgentError::DuplicateCard(ace))
        );
        assert_eq!(CacheKey::from_cards(&[], &[]), Err(AgentError::EmptyCardSet));
    }

    #[test]
    fn test_key_rejects_out_of_deck_ids() {
        let ace = Card::parse("As").unwrap();
        for id in [52u8, 63, 64, 255] {
            let bad = Card::unchecked(id);
            assert_eq!(
                CacheKey::from_cards(&[ace], &[bad]),
                Err(AgentError::InvalidCard(id))
            );
        }
    }

    #[test]
    fn test_lfu_evicts_lowest_hit_count() {
        let mut cache = cache(3, EvictionPolicy::LeastFrequentlyUsed);
        cache.insert(key("As"), 0.9);
        cache.insert(key("Ks"), 0.8);
        cache.insert(key("Qs"), 0.7);

        cache.get(&key("As"));
        cache.get(&key("Qs"));

        cache.insert(key("Js"), 0.6);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&key("Ks")));
        assert!(cache.contains(&key("As")));
        assert!(cache.contains(&key("Qs")));
        assert!(cache.contains(&key("Js")));
    }

    #[test]
    fn test_lfu_ties_evict_oldest() {
        let mut cache = cache(2, EvictionPolicy::LeastFrequentlyUsed);
        cache.insert(key("As"), 0.1);
        cache.insert(key("Ks"), 0.2);
        cache.insert(key("Qs"), 0.3);
        assert!(!cache.contains(&key("As")));
        assert!(cache.contains(&key("Ks")));
    }

    #[test]
    fn test_smallest_value_eviction() {
        let mut cache = cache(3, EvictionPolicy::SmallestValue);
        cache.insert(key("As"), 0.5);
        cache.insert(key("Ks"), 0.1);
        cache.insert(key("Qs"), 0.9);
        // hits do not protect a small value
        for _ in 0..5 {
            cache.get(&key("Ks"));
        }

        cache.insert(key("Js"), 0.3);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&key("Ks")));
        assert_eq!(cache.peek(&key("Js")), Some(0.3));
    }

    #[test]
    fn test_capacity_plus_one_inserts() {
        for policy in [EvictionPolicy::SmallestValue, EvictionPolicy::LeastFrequentlyUsed] {
            let capacity = 8;
            let mut cache = cache(capacity, policy);
            let deck = Card::deck();
            for (i, card) in deck.iter().take(capacity + 1).enumerate() {
                cache.insert(CacheKey::from_cards(&[*card], &[]).unwrap(), 1.0 + i as f64);
            }
            assert_eq!(cache.len(), capacity);
            // first insert has both the smallest value and the oldest seq
            let first = CacheKey::from_cards(&[deck[0]], &[]).unwrap();
            assert!(!cache.contains(&first), "{:?} kept the victim", policy);
            assert_eq!(cache.counters().2, 1);
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut rng = StdRng::seed_from_u64(11);
        let deck = Card::deck();
        for policy in [EvictionPolicy::SmallestValue, EvictionPolicy::LeastFrequentlyUsed] {
            let mut cache = cache(16, policy);
            for _ in 0..2_000 {
                let a = deck[rng.gen_range(0..52)];
                let b = deck[rng.gen_range(0..52)];
                if a == b {
                    continue;
                }
                let k = CacheKey::from_cards(&[a], &[b]).unwrap();
                if rng.gen_bool(0.3) {
                    cache.get(&k);
                } else {
                    cache.insert(k, rng.gen());
                }
                assert!(cache.len() <= cache.capacity());
            }
        }
    }

    #[test]
    fn test_overwrite_keeps_size_and_hits() {
        let mut cache = cache(2, EvictionPolicy::LeastFrequentlyUsed);
        cache.insert(key("As"), 0.1);
        cache.get(&key("As"));
        cache.insert(key("As"), 0.2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&key("As")), Some(0.2));
        assert_eq!(cache.hit_count(&key("As")), Some(2));
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let mut cache = cache(4, EvictionPolicy::LeastFrequentlyUsed);
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(key("AsKs"), || {
                calls += 1;
                0.75
            });
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.counters().0, 2);
    }

    #[test]
    fn test_clear_empties() {
        let mut cache = cache(4, EvictionPolicy::SmallestValue);
        cache.insert(key("As"), 0.1);
        cache.insert(key("Ks"), 0.2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_adaptive_resize() {
        let config = CacheConfig::default()
            .with_capacity(100)
            .with_adaptive(AdaptiveSizing {
                retention_games: 4,
                growth: 1.5,
                min_capacity: 1,
            });
        let mut cache = EvaluationCache::new(config).unwrap();

        let deck = Card::deck();
        for (i, card) in deck.iter().take(20).enumerate() {
            cache.insert(CacheKey::from_cards(&[*card], &[]).unwrap(), i as f64);
        }
        for _ in 0..3 {
            cache.record_game();
        }
        assert_eq!(cache.capacity(), 100);

        // 20 new entries over 4 games -> 5 per game -> capacity 7
        cache.record_game();
        assert_eq!(cache.capacity(), 7);
        assert_eq!(cache.len(), 7);

        // an idle window shrinks to the floor
        for _ in 0..4 {
            cache.record_game();
        }
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_adaptive_shrink_keeps_largest_values() {
        let config = CacheConfig::default()
            .with_capacity(100)
            .with_eviction(EvictionPolicy::SmallestValue)
            .with_adaptive(AdaptiveSizing {
                retention_games: 2,
                growth: 1.0,
                min_capacity: 1,
            });
        let mut cache = EvaluationCache::new(config).unwrap();

        let deck = Card::deck();
        let keys: Vec<CacheKey> = deck
            .iter()
            .take(10)
            .map(|card| CacheKey::from_cards(&[*card], &[]).unwrap())
            .collect();
        for (i, k) in keys.iter().enumerate() {
            cache.insert(*k, (10 - i) as f64);
            // hits do not protect small values
            cache.get(k);
        }

        // 10 new entries over 2 games -> capacity 5
        cache.record_game();
        cache.record_game();
        assert_eq!(cache.capacity(), 5);
        assert_eq!(cache.len(), 5);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(cache.contains(k), i < 5, "entry {}", i);
        }
    }
}
