//! Hand abstraction: (hole cards, board) -> bucket id per street.
//!
//! Preflop buckets come from an exhaustive ranking of the 169 canonical
//! starting hands, built once at construction. Postflop buckets come from
//! Monte-Carlo equity against random opponents, mapped non-linearly so
//! the high-strength tail gets finer resolution, and cached under a
//! read/write lock keyed on a suit-isomorphic form of the cards.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use crate::error::SolverError;
use crate::eval::{Evaluator, DEFAULT_OPPONENTS};
use crate::game::Street;
use crate::poker::{suit_index, value_rank, Card};
use crate::sampler::Sampler;

use super::AbstractionLevel;

/// Default number of equity rollouts per uncached postflop hand.
pub const DEFAULT_EQUITY_SAMPLES: u32 = 10_000;

/// Bucket counts per street for one abstraction level.
#[derive(Debug, Clone, Copy)]
struct BucketCounts {
    preflop: u32,
    flop: u32,
    turn: u32,
    river: u32,
}

impl BucketCounts {
    const fn for_level(level: AbstractionLevel) -> Self {
        match level {
            AbstractionLevel::None => Self { preflop: 1, flop: 1, turn: 1, river: 1 },
            AbstractionLevel::Minimal => Self { preflop: 10, flop: 50, turn: 50, river: 50 },
            AbstractionLevel::Standard => Self { preflop: 20, flop: 100, turn: 100, river: 100 },
            AbstractionLevel::Detailed => Self { preflop: 50, flop: 200, turn: 200, river: 200 },
        }
    }

    const fn for_street(self, street: Street) -> u32 {
        match street {
            Street::Preflop => self.preflop,
            Street::Flop => self.flop,
            Street::Turn => self.turn,
            Street::River => self.river,
        }
    }
}

/// Canonical preflop hand class: high rank, low rank, suitedness.
type PreflopClass = (u8, u8, bool);

pub struct HandAbstraction {
    level: AbstractionLevel,
    counts: BucketCounts,
    evaluator: Arc<dyn Evaluator>,
    equity_samples: u32,
    sampler: Sampler,
    preflop: FxHashMap<PreflopClass, u32>,
    cache: RwLock<FxHashMap<Vec<u8>, u32>>,
}

impl HandAbstraction {
    /// Build the abstraction, precomputing the preflop table.
    #[must_use]
    pub fn new(level: AbstractionLevel, evaluator: Arc<dyn Evaluator>) -> Self {
        let counts = BucketCounts::for_level(level);
        Self {
            level,
            counts,
            evaluator,
            equity_samples: DEFAULT_EQUITY_SAMPLES,
            sampler: Sampler::new(),
            preflop: build_preflop_table(counts.preflop),
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Override the number of equity rollouts per uncached hand.
    #[must_use]
    pub fn with_equity_samples(mut self, samples: u32) -> Self {
        self.equity_samples = samples;
        self
    }

    /// Use a seeded sampler for reproducible equity rollouts.
    #[must_use]
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    #[must_use]
    pub fn level(&self) -> AbstractionLevel {
        self.level
    }

    /// Number of buckets on a street at this level.
    #[must_use]
    pub fn num_buckets(&self, street: Street) -> u32 {
        self.counts.for_street(street)
    }

    /// Number of postflop hands bucketed so far.
    #[must_use]
    pub fn cached_hands(&self) -> usize {
        self.read_cache().len()
    }

    /// Bucket id in `[0, B_street)` for a holding on a board.
    ///
    /// Deterministic, symmetric in hole-card order, and invariant under
    /// suit permutations of the combined hand.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBoard` for board sizes outside {0, 3, 4, 5}.
    pub fn bucket(&self, hole: [Card; 2], board: &[Card]) -> Result<u32, SolverError> {
        let street = Street::from_board_len(board.len())?;

        if street == Street::Preflop {
            return Ok(self.preflop[&preflop_class(hole)]);
        }

        let buckets = self.counts.for_street(street);
        if buckets <= 1 {
            return Ok(0);
        }

        let key = canonical_key(hole, board);
        if let Some(&bucket) = self.read_cache().get(&key) {
            return Ok(bucket);
        }

        let equity = self.evaluator.equity(
            hole,
            board,
            DEFAULT_OPPONENTS,
            self.equity_samples,
            &self.sampler,
        );
        let bucket = equity_bucket(equity, buckets);
        self.write_cache().insert(key, bucket);
        Ok(bucket)
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, FxHashMap<Vec<u8>, u32>> {
        self.cache.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, FxHashMap<Vec<u8>, u32>> {
        self.cache.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Canonical class of a starting hand.
fn preflop_class(hole: [Card; 2]) -> PreflopClass {
    let a = value_rank(hole[0].value);
    let b = value_rank(hole[1].value);
    let suited = hole[0].suit == hole[1].suit;
    (a.max(b), a.min(b), suited)
}

/// Scalar preflop strength: blend of high-card mass, pair bonus,
/// suitedness, and connectedness, clamped to `[0, 1]`.
fn preflop_strength(high: u8, low: u8, suited: bool) -> f64 {
    let mut strength = 0.5 * (f64::from(high) + f64::from(low)) / 28.0;
    if high == low {
        strength += 0.3 * f64::from(high) / 14.0;
    }
    if suited {
        strength += 0.1;
    }
    let gap = f64::from(high - low);
    strength += (0.1 * (1.0 - gap / 12.0)).max(0.0);
    strength.clamp(0.0, 1.0)
}

/// Rank all 169 canonical starting hands and split them into
/// equal-size bins, strongest hands in bucket zero.
fn build_preflop_table(buckets: u32) -> FxHashMap<PreflopClass, u32> {
    let mut classes: Vec<(PreflopClass, f64)> = Vec::with_capacity(169);
    for high in 2u8..=14 {
        for low in 2u8..=high {
            classes.push(((high, low, false), preflop_strength(high, low, false)));
            if high != low {
                classes.push(((high, low, true), preflop_strength(high, low, true)));
            }
        }
    }
    classes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    #[allow(clippy::cast_possible_truncation)]
    let total = classes.len() as u32;
    classes
        .into_iter()
        .enumerate()
        .map(|(i, (class, _))| {
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (i as u32 * buckets / total).min(buckets - 1);
            (class, bucket)
        })
        .collect()
}

/// Map equity to a bucket, spending more resolution on strong hands.
fn equity_bucket(equity: f64, buckets: u32) -> u32 {
    let adjusted = equity.clamp(0.0, 1.0).powf(0.7);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bucket = (adjusted * f64::from(buckets)) as u32;
    bucket.min(buckets - 1)
}

/// Suit-isomorphic cache key.
///
/// Collects, per suit, the sorted hole and board ranks falling in that
/// suit, then sorts the four suit profiles. Any joint permutation of
/// suits (which preserves flush structure) and any hole-card reordering
/// yields the same byte string.
fn canonical_key(hole: [Card; 2], board: &[Card]) -> Vec<u8> {
    let mut profiles: [(Vec<u8>, Vec<u8>); 4] = Default::default();
    for card in hole {
        profiles[suit_index(card.suit) as usize].0.push(value_rank(card.value));
    }
    for &card in board {
        profiles[suit_index(card.suit) as usize].1.push(value_rank(card.value));
    }
    for (hole_ranks, board_ranks) in &mut profiles {
        hole_ranks.sort_unstable();
        board_ranks.sort_unstable();
    }
    profiles.sort();

    let mut key = Vec::with_capacity(hole.len() + board.len() + 8);
    for (hole_ranks, board_ranks) in profiles {
        key.extend(hole_ranks);
        key.push(0xFF);
        key.extend(board_ranks);
        key.push(0xFE);
    }
    key
}
