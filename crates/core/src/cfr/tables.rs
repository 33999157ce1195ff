//! Shared regret and strategy tables.
//!
//! Both tables are maps from info-set key to per-action values, sharded
//! by key hash so concurrent writers on different keys contend only on
//! their shard's lock. Readers take shared locks and copy out one key's
//! inner map, so a snapshot is never torn.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use crate::error::SolverError;
use crate::game::Action;
use crate::serialize;

const SHARD_COUNT: usize = 16;

type ActionValues = FxHashMap<Action, f64>;
type ShardMap = FxHashMap<String, ActionValues>;

/// Sharded `key -> (action -> f64)` map underlying both tables.
struct Shards {
    shards: Vec<RwLock<ShardMap>>,
}

impl Shards {
    fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(ShardMap::default())).collect(),
        }
    }

    fn shard(&self, key: &str) -> &RwLock<ShardMap> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let index = (hasher.finish() % SHARD_COUNT as u64) as usize;
        &self.shards[index]
    }

    fn read(&self, key: &str) -> RwLockReadGuard<'_, ShardMap> {
        self.shard(key).read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self, key: &str) -> RwLockWriteGuard<'_, ShardMap> {
        self.shard(key).write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Apply `f` to one cell, creating it at zero if absent.
    fn update(&self, key: &str, action: Action, f: impl FnOnce(f64) -> f64) {
        let mut shard = self.write(key);
        let cell = shard
            .entry(key.to_string())
            .or_default()
            .entry(action)
            .or_insert(0.0);
        *cell = f(*cell);
    }

    fn get(&self, key: &str, action: Action) -> f64 {
        self.read(key)
            .get(key)
            .and_then(|values| values.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    fn row(&self, key: &str) -> ActionValues {
        self.read(key).get(key).cloned().unwrap_or_default()
    }

    fn contains(&self, key: &str) -> bool {
        self.read(key).contains_key(key)
    }

    fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(std::sync::PoisonError::into_inner).len())
            .sum()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        for shard in &self.shards {
            let guard = shard.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            keys.extend(guard.keys().cloned());
        }
        keys
    }

    fn clear(&self) {
        for shard in &self.shards {
            shard.write().unwrap_or_else(std::sync::PoisonError::into_inner).clear();
        }
    }

    /// Drop every key whose values all sit within `threshold` of zero.
    fn prune(&self, threshold: f64) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut guard = shard.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            let before = guard.len();
            guard.retain(|_, values| values.values().any(|v| v.abs() > threshold));
            removed += before - guard.len();
        }
        removed
    }

    fn snapshot(&self) -> serialize::TableRows {
        let mut rows = Vec::with_capacity(self.len());
        for shard in &self.shards {
            let guard = shard.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            rows.extend(guard.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        // Shard iteration order is arbitrary; sort for stable files.
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    fn save(&self, path: &Path) -> Result<(), SolverError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serialize::write_table(&mut writer, &self.snapshot())?;
        writer.flush()?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<(), SolverError> {
        let mut reader = BufReader::new(File::open(path)?);
        let rows = serialize::read_table(&mut reader)?;
        self.clear();
        for (key, values) in rows {
            let mut shard = self.write(&key);
            shard.insert(key, values);
        }
        Ok(())
    }
}

/// Cumulative positive regrets per info set (CFR+).
pub struct RegretTable {
    inner: Shards,
}

impl RegretTable {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Shards::new() }
    }

    /// Accumulate a regret delta, clamping the cell at zero (CFR+).
    pub fn add_regret(&self, key: &str, action: Action, delta: f64) {
        self.inner.update(key, action, |r| (r + delta).max(0.0));
    }

    /// Stored regret, zero on miss.
    #[must_use]
    pub fn get_regret(&self, key: &str, action: Action) -> f64 {
        self.inner.get(key, action)
    }

    /// Consistent snapshot of one info set's regrets.
    #[must_use]
    pub fn regrets_for(&self, key: &str) -> FxHashMap<Action, f64> {
        self.inner.row(key)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    /// Remove info sets whose regrets are all at most `threshold` in
    /// magnitude. Returns the number of keys removed.
    pub fn prune(&self, threshold: f64) -> usize {
        self.inner.prune(threshold)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Persist to the binary wire format.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures; training state is untouched either way.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        self.inner.save(path.as_ref())
    }

    /// Replace contents from a saved file.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Corrupt`; on parse failure the table is cleared.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        self.inner.load(path.as_ref())
    }
}

impl Default for RegretTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Current strategy plus reach-weighted strategy sums per info set.
///
/// The sum map is what CFR converges on and is the source of truth for
/// output; `current` is kept for inspection.
pub struct StrategyTable {
    current: Shards,
    sum: Shards,
}

impl StrategyTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Shards::new(),
            sum: Shards::new(),
        }
    }

    /// Record the latest regret-matched probability for a cell.
    pub fn set_current(&self, key: &str, action: Action, probability: f64) {
        self.current.update(key, action, |_| probability);
    }

    /// Current-strategy snapshot for one info set.
    #[must_use]
    pub fn current_for(&self, key: &str) -> FxHashMap<Action, f64> {
        self.current.row(key)
    }

    /// Accumulate reach-weighted strategy mass. Negative weights are a
    /// caller bug; they are dropped with a log instead of corrupting the
    /// average.
    pub fn add_to_sum(&self, key: &str, action: Action, weight: f64) {
        debug_assert!(weight >= 0.0, "negative strategy weight {weight} for {key}");
        if weight < 0.0 {
            log::warn!("dropping negative strategy weight {weight} for {key}");
            return;
        }
        self.sum.update(key, action, |w| w + weight);
    }

    /// Average strategy for one info set: sums normalised to 1, uniform
    /// over the recorded actions when no mass has accumulated. Empty for
    /// an unknown key.
    #[must_use]
    pub fn average(&self, key: &str) -> FxHashMap<Action, f64> {
        let sums = self.sum.row(key);
        if sums.is_empty() {
            return sums;
        }
        let total: f64 = sums.values().sum();
        if total > 0.0 {
            sums.into_iter().map(|(a, w)| (a, w / total)).collect()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let uniform = 1.0 / sums.len() as f64;
            sums.into_keys().map(|a| (a, uniform)).collect()
        }
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.sum.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sum.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sum.len() == 0
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.sum.keys()
    }

    pub fn clear(&self) {
        self.current.clear();
        self.sum.clear();
    }

    /// Write `<base>.current` and `<base>.sum`.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures; training state is untouched either way.
    pub fn save<P: AsRef<Path>>(&self, base: P) -> Result<(), SolverError> {
        let base = base.as_ref();
        self.current.save(&with_suffix(base, "current"))?;
        self.sum.save(&with_suffix(base, "sum"))
    }

    /// Load `<base>.current` and `<base>.sum`.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Corrupt`.
    pub fn load<P: AsRef<Path>>(&self, base: P) -> Result<(), SolverError> {
        let base = base.as_ref();
        self.current.load(&with_suffix(base, "current"))?;
        self.sum.load(&with_suffix(base, "sum"))
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new()
    }
}

fn with_suffix(base: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    std::path::PathBuf::from(name)
}
