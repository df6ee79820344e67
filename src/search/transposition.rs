//! Search statistics shared between tree nodes that reach the same state.
//!
//! Different move orders often lead to the same position ([Transposition]).
//! The table owns one [`Statistics`] record per distinct state and tree nodes
//! refer to it through a [`StatsId`] handle, so every path into a position
//! reads and updates the same numbers.
//!
//! [Transposition]: https://www.chessprogramming.org/Transposition

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// Aggregated results of the simulations that went through a state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Number of completed iterations that visited the state.
    pub visits: u64,
    /// Sum of rewards from the perspective of the player who moved into the
    /// state.
    pub reward: f64,
}

impl Statistics {
    /// Mean reward, `None` for an unvisited state.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        if self.visits == 0 {
            return None;
        }
        Some(self.reward / self.visits as f64)
    }
}

/// Handle to a [`Statistics`] record owned by a [`TranspositionTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatsId(usize);

enum Index<K> {
    Direct(HashMap<K, StatsId>),
    Buckets(Vec<HashMap<K, StatsId>>),
}

/// Maps states to their statistics. Entries are never evicted.
pub struct TranspositionTable<K> {
    index: Index<K>,
    entries: Vec<Statistics>,
}

impl<K: Hash + Eq> TranspositionTable<K> {
    /// Creates an unbounded table backed by a single map.
    #[must_use]
    pub fn direct() -> Self {
        Self {
            index: Index::Direct(HashMap::new()),
            entries: Vec::new(),
        }
    }

    /// Creates a table with a fixed number of buckets. Keys that land in the
    /// same bucket are told apart by equality.
    #[must_use]
    pub fn with_buckets(buckets: NonZeroUsize) -> Self {
        Self {
            index: Index::Buckets((0..buckets.get()).map(|_| HashMap::new()).collect()),
            entries: Vec::new(),
        }
    }

    /// Direct table for `None`, bucketed table otherwise.
    #[must_use]
    pub fn new(buckets: Option<NonZeroUsize>) -> Self {
        buckets.map_or_else(Self::direct, Self::with_buckets)
    }

    fn map(&self, key: &K) -> &HashMap<K, StatsId> {
        match &self.index {
            Index::Direct(map) => map,
            Index::Buckets(buckets) => &buckets[bucket_index(key, buckets.len())],
        }
    }

    fn map_mut(&mut self, key: &K) -> &mut HashMap<K, StatsId> {
        match &mut self.index {
            Index::Direct(map) => map,
            Index::Buckets(buckets) => {
                let bucket = bucket_index(key, buckets.len());
                &mut buckets[bucket]
            },
        }
    }

    /// Returns the handle of the record stored for `key`.
    #[must_use]
    pub fn lookup(&self, key: &K) -> Option<StatsId> {
        self.map(key).get(key).copied()
    }

    /// Returns the record stored for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Statistics> {
        self.lookup(key).map(|id| self.stats(id))
    }

    /// Stores `stats` for `key`. An existing record is overwritten in place, so
    /// handles that already point to it observe the new value.
    pub fn set(&mut self, key: K, stats: Statistics) {
        match self.lookup(&key) {
            Some(id) => *self.stats_mut(id) = stats,
            None => {
                let id = self.push(stats);
                let _ = self.map_mut(&key).insert(key, id);
            },
        }
    }

    /// Returns the handle for `key`, inserting a zero record if the key is new.
    pub fn resolve(&mut self, key: &K) -> StatsId
    where
        K: Clone,
    {
        if let Some(id) = self.lookup(key) {
            return id;
        }
        let id = self.push(Statistics::default());
        let _ = self.map_mut(key).insert(key.clone(), id);
        id
    }

    fn push(&mut self, stats: Statistics) -> StatsId {
        self.entries.push(stats);
        StatsId(self.entries.len() - 1)
    }

    /// Record behind a handle produced by this table.
    #[must_use]
    pub fn stats(&self, id: StatsId) -> &Statistics {
        &self.entries[id.0]
    }

    #[allow(missing_docs)]
    pub fn stats_mut(&mut self, id: StatsId) -> &mut Statistics {
        &mut self.entries[id.0]
    }

    /// Number of distinct states stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every state. Handles produced before are invalidated.
    pub fn clear(&mut self) {
        match &mut self.index {
            Index::Direct(map) => map.clear(),
            Index::Buckets(buckets) => buckets.iter_mut().for_each(HashMap::clear),
        }
        self.entries.clear();
    }
}

impl<K: Hash + Eq> Default for TranspositionTable<K> {
    fn default() -> Self {
        Self::direct()
    }
}

/// Polynomial rolling hash (`h = 31 * h + byte` over 32-bit wrapping
/// integers). Deterministic across runs, unlike the randomly seeded default
/// hasher, so the bucket a state lands in is stable.
#[derive(Debug, Default)]
struct RollingHasher {
    hash: i32,
}

impl Hasher for RollingHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self
                .hash
                .wrapping_shl(5)
                .wrapping_sub(self.hash)
                .wrapping_add(i32::from(byte));
        }
    }

    fn finish(&self) -> u64 {
        u64::from(self.hash.unsigned_abs())
    }
}

fn bucket_index<K: Hash>(key: &K, buckets: usize) -> usize {
    let mut hasher = RollingHasher::default();
    key.hash(&mut hasher);
    // The hash fits in 32 bits.
    (hasher.finish() % buckets as u64) as usize
}
