//! The CFR training engine.
//!
//! Drives iterations over freshly dealt hands, descending the game tree
//! with regret matching at every decision node. Two traversals are
//! available: full-tree CFR (every action explored) and outcome-sampling
//! Monte Carlo CFR (one action sampled per node, importance-weighted
//! regret update). Regrets are clamped at zero inside the table (CFR+),
//! and the average strategy accumulates in the strategy-sum table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::abstraction::{BetAbstraction, HandAbstraction};
use crate::config::TrainingConfig;
use crate::error::SolverError;
use crate::eval::NativeEvaluator;
use crate::game::{Action, GameState, Position, RoundFlow, NUM_PLAYERS, SEATS};
use crate::infoset::infoset_key;
use crate::sampler::Sampler;

use super::tables::{RegretTable, StrategyTable};
use super::regret_match;

/// Hard recursion guard. A well-formed tree stays far below this; the
/// guard tripping means round advancement or action legality is broken.
const MAX_DEPTH: u32 = 100;

/// Reach probabilities below this contribute no table updates.
const REACH_EPS: f64 = 1e-5;

/// Snapshot of training counters, taken under the stats mutex.
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Iterations completed over the solver's lifetime.
    pub iterations: u64,
    /// Info sets currently held in the regret table.
    pub info_sets: usize,
    /// Wall time spent inside traversals.
    pub total_time: Duration,
    /// Mean wall time per iteration.
    pub avg_iteration: Duration,
}

/// Invoked every `progress_interval` iterations. Must not block the
/// training thread for long.
pub type ProgressCallback = Box<dyn Fn(u64, &TrainingStats) + Send + Sync>;

#[derive(Default)]
struct StatsInner {
    iterations: u64,
    total_time: Duration,
}

pub struct CfrSolver {
    root: GameState,
    hand_abstraction: Arc<HandAbstraction>,
    bet_abstraction: BetAbstraction,
    regrets: RegretTable,
    strategies: StrategyTable,
    sampler: Arc<Sampler>,
    stats: Mutex<StatsInner>,
    progress: Option<ProgressCallback>,
    stop: AtomicBool,
    prune_interval: u64,
    prune_threshold: f64,
    progress_interval: u64,
}

impl CfrSolver {
    /// Build a solver over a root state and abstraction pair.
    #[must_use]
    pub fn new(
        root: GameState,
        hand_abstraction: Arc<HandAbstraction>,
        bet_abstraction: BetAbstraction,
    ) -> Self {
        Self {
            root,
            hand_abstraction,
            bet_abstraction,
            regrets: RegretTable::new(),
            strategies: StrategyTable::new(),
            sampler: Arc::new(Sampler::new()),
            stats: Mutex::new(StatsInner::default()),
            progress: None,
            stop: AtomicBool::new(false),
            prune_interval: 20,
            prune_threshold: 0.01,
            progress_interval: 10,
        }
    }

    /// Assemble a solver from a training configuration: native
    /// evaluator, seeded sampler, configured abstraction levels and
    /// housekeeping cadences.
    #[must_use]
    pub fn from_config(config: &TrainingConfig) -> Self {
        let sampler = Arc::new(
            config
                .seed
                .map_or_else(Sampler::new, Sampler::with_seed),
        );
        let evaluator = Arc::new(NativeEvaluator::new());
        let hand_abstraction = Arc::new(
            HandAbstraction::new(config.hand_abstraction, evaluator)
                .with_equity_samples(config.equity_samples)
                .with_sampler(
                    config
                        .seed
                        .map_or_else(Sampler::new, |s| Sampler::with_seed(s ^ 0x5eed)),
                ),
        );
        let mut solver = Self::new(
            GameState::new(),
            hand_abstraction,
            BetAbstraction::new(config.bet_abstraction),
        );
        solver.sampler = sampler;
        solver.prune_interval = config.prune_interval;
        solver.prune_threshold = config.prune_threshold;
        solver.progress_interval = config.progress_interval;
        solver
    }

    /// Replace the sampler (e.g. with a seeded one) before training.
    #[must_use]
    pub fn with_sampler(mut self, sampler: Arc<Sampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Install a progress callback.
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }

    /// Ask a running `train` to stop at the next iteration boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn regret_table(&self) -> &RegretTable {
        &self.regrets
    }

    #[must_use]
    pub fn strategy_table(&self) -> &StrategyTable {
        &self.strategies
    }

    #[must_use]
    pub fn hand_abstraction(&self) -> &HandAbstraction {
        &self.hand_abstraction
    }

    #[must_use]
    pub fn bet_abstraction(&self) -> &BetAbstraction {
        &self.bet_abstraction
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> TrainingStats {
        let inner = self.stats.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let avg = if inner.iterations > 0 {
            #[allow(clippy::cast_possible_truncation)]
            Duration::from_nanos((inner.total_time.as_nanos() / u128::from(inner.iterations)) as u64)
        } else {
            Duration::ZERO
        };
        TrainingStats {
            iterations: inner.iterations,
            info_sets: self.regrets.len(),
            total_time: inner.total_time,
            avg_iteration: avg,
        }
    }

    /// Average strategy for a key, from the strategy-sum table.
    #[must_use]
    pub fn average_strategy(&self, key: &str) -> rustc_hash::FxHashMap<Action, f64> {
        self.strategies.average(key)
    }

    /// Regret-matched current strategy for a key over a known action set.
    #[must_use]
    pub fn strategy(&self, key: &str, actions: &[Action]) -> Vec<f64> {
        regret_match(&self.regrets.regrets_for(key), actions)
    }

    /// Save the strategy table as `<base>.current` + `<base>.sum`.
    ///
    /// # Errors
    ///
    /// Propagates I/O failure; training state is preserved.
    pub fn save_strategy<P: AsRef<std::path::Path>>(&self, base: P) -> Result<(), SolverError> {
        log::info!("saving strategy to {}", base.as_ref().display());
        self.strategies.save(base)
    }

    /// Load a previously saved strategy table.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Corrupt`.
    pub fn load_strategy<P: AsRef<std::path::Path>>(&self, base: P) -> Result<(), SolverError> {
        log::info!("loading strategy from {}", base.as_ref().display());
        self.strategies.load(base)
    }

    /// Run `iterations` training iterations.
    ///
    /// Each iteration deals a fresh hand and traverses it, full-tree or
    /// Monte Carlo. Programming-bug errors inside a traversal abort that
    /// iteration with a logged error and training continues; the tables
    /// keep whatever updates landed before the abort. Pruning and
    /// progress reporting run on their configured cadences, and
    /// [`request_stop`](Self::request_stop) is honoured at iteration
    /// boundaries.
    pub fn train(&self, iterations: u64, monte_carlo: bool) {
        log::info!(
            "training for {iterations} iterations ({}), hand abstraction {}, bet abstraction {}",
            if monte_carlo { "outcome sampling" } else { "full tree" },
            self.hand_abstraction.level(),
            self.bet_abstraction.level(),
        );

        for i in 0..iterations {
            if self.stop.swap(false, Ordering::Relaxed) {
                log::info!("training stopped at iteration {i}");
                break;
            }
            self.run_iteration(monte_carlo);
            self.housekeeping(i + 1, iterations);
        }

        log::info!(
            "training pass done: {} info sets",
            self.regrets.len()
        );
    }

    /// Parallel variant: iterations run in rayon batches between
    /// housekeeping points, sharing the tables through their internal
    /// locks. Update ordering across a batch is nondeterministic, which
    /// CFR tolerates because cell updates commute.
    pub fn train_parallel(&self, iterations: u64, monte_carlo: bool) {
        log::info!("parallel training for {iterations} iterations");
        let batch = self.prune_interval.max(1);
        let mut done = 0u64;
        while done < iterations {
            if self.stop.swap(false, Ordering::Relaxed) {
                log::info!("training stopped after {done} iterations");
                break;
            }
            let chunk = batch.min(iterations - done);
            (0..chunk)
                .into_par_iter()
                .for_each(|_| self.run_iteration(monte_carlo));
            done += chunk;
            self.housekeeping(done, iterations);
        }
    }

    /// Deal one fresh hand and traverse it, updating the tables.
    fn run_iteration(&self, monte_carlo: bool) {
        let started = Instant::now();
        let mut state = self.root.clone();
        state.reset();
        if let Err(error) = state.deal_hole_cards(&self.sampler) {
            log::error!("deal failed, skipping iteration: {error}");
            return;
        }

        if let Err(error) = self.run_from(&state, monte_carlo) {
            log::error!("iteration aborted: {error}");
        }

        let elapsed = started.elapsed();
        let mut inner = self.stats.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.iterations += 1;
        inner.total_time += elapsed;
    }

    /// Run a single traversal from a prepared state with unit reach
    /// probabilities. Exposed for diagnostics and tests.
    ///
    /// # Errors
    ///
    /// Propagates `IllegalAction`/`InvalidState`/`InvalidBoard` from the
    /// traversal; callers treat these as iteration-fatal bugs.
    pub fn run_from(
        &self,
        state: &GameState,
        monte_carlo: bool,
    ) -> Result<[f64; NUM_PLAYERS], SolverError> {
        let reach = [1.0; NUM_PLAYERS];
        if monte_carlo {
            self.monte_carlo(state, reach, 0)
        } else {
            self.cfr(state, reach, 0)
        }
    }

    fn housekeeping(&self, completed: u64, total: u64) {
        if completed % self.progress_interval == 0 || completed == total {
            let stats = self.stats();
            log::info!(
                "iteration {completed}/{total}: {} info sets, avg {:.1?}/iter",
                stats.info_sets,
                stats.avg_iteration
            );
            if let Some(callback) = &self.progress {
                callback(completed, &stats);
            }
        }
        if self.prune_interval > 0 && completed % self.prune_interval == 0 {
            let removed = self.regrets.prune(self.prune_threshold);
            if removed > 0 {
                log::info!("pruned {removed} low-regret info sets");
            }
        }
    }

    /// Shared per-node preamble: info-set key, abstracted actions, and
    /// the regret-matched strategy from one regret snapshot. The same
    /// strategy vector must drive the strategy-sum update, the
    /// recursion, and the regret update.
    fn node_context(
        &self,
        state: &GameState,
    ) -> Result<(Position, String, Vec<Action>, Vec<f64>), SolverError> {
        let actor = state.current_actor();
        let key = infoset_key(state, actor, &self.hand_abstraction)?;
        let player = state.player(actor);
        let actions = self.bet_abstraction.abstract_actions(
            &state.legal_actions(),
            state.pot(),
            player.stack,
            state.street(),
        );
        let strategy = regret_match(&self.regrets.regrets_for(&key), &actions);
        Ok((actor, key, actions, strategy))
    }

    /// Record the current strategy and its reach-weighted mass.
    fn accumulate_strategy(&self, key: &str, actions: &[Action], strategy: &[f64], reach: f64) {
        for (&action, &probability) in actions.iter().zip(strategy) {
            if probability > 0.0 {
                self.strategies.set_current(key, action, probability);
                self.strategies.add_to_sum(key, action, reach * probability);
            }
        }
    }

    /// Child state after an action, advancing the round when it closes.
    fn child_state(&self, state: &GameState, action: Action) -> Result<GameState, SolverError> {
        let mut next = state.clone();
        let flow = next.apply(action)?;
        if flow == RoundFlow::Closed && !next.is_terminal() {
            next.start_next_round()?;
        }
        Ok(next)
    }

    /// Counterfactual reach: product of everyone's reach but the actor's.
    fn counterfactual_reach(reach: [f64; NUM_PLAYERS], actor: usize) -> f64 {
        reach
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != actor)
            .map(|(_, &p)| p)
            .product()
    }

    /// Full-tree CFR. Returns expected utility per seat in big blinds.
    fn cfr(
        &self,
        state: &GameState,
        reach: [f64; NUM_PLAYERS],
        depth: u32,
    ) -> Result<[f64; NUM_PLAYERS], SolverError> {
        if depth > MAX_DEPTH {
            log::error!("recursion depth {depth} exceeded in cfr");
            return Ok([0.0; NUM_PLAYERS]);
        }
        if state.is_terminal() {
            return state.payoffs();
        }

        let (actor, key, actions, strategy) = self.node_context(state)?;
        if actions.is_empty() {
            log::error!("no abstracted actions for non-terminal state at {key}");
            return Ok([0.0; NUM_PLAYERS]);
        }
        let seat = actor.index();

        if reach[seat] > REACH_EPS {
            self.accumulate_strategy(&key, &actions, &strategy, reach[seat]);
        }

        let mut node_utility = [0.0; NUM_PLAYERS];
        let mut action_utilities = vec![[0.0; NUM_PLAYERS]; actions.len()];
        for (index, (&action, &probability)) in actions.iter().zip(&strategy).enumerate() {
            let next = self.child_state(state, action)?;
            let mut next_reach = reach;
            next_reach[seat] *= probability;
            let utility = self.cfr(&next, next_reach, depth + 1)?;
            action_utilities[index] = utility;
            for player in SEATS {
                node_utility[player.index()] += probability * utility[player.index()];
            }
        }

        if reach[seat] > REACH_EPS {
            let counterfactual = Self::counterfactual_reach(reach, seat);
            for (index, &action) in actions.iter().enumerate() {
                let regret = counterfactual * (action_utilities[index][seat] - node_utility[seat]);
                self.regrets.add_regret(&key, action, regret);
            }
        }

        Ok(node_utility)
    }

    /// Outcome-sampling MC-CFR: sample one action from the current
    /// strategy, recurse on it alone, and store the importance-weighted
    /// regret for the sampled action only.
    fn monte_carlo(
        &self,
        state: &GameState,
        reach: [f64; NUM_PLAYERS],
        depth: u32,
    ) -> Result<[f64; NUM_PLAYERS], SolverError> {
        if depth > MAX_DEPTH {
            log::error!("recursion depth {depth} exceeded in monte_carlo");
            return Ok([0.0; NUM_PLAYERS]);
        }
        if state.is_terminal() {
            return state.payoffs();
        }

        let (actor, key, actions, strategy) = self.node_context(state)?;
        if actions.is_empty() {
            log::error!("no abstracted actions for non-terminal state at {key}");
            return Ok([0.0; NUM_PLAYERS]);
        }
        let seat = actor.index();

        if reach[seat] > REACH_EPS {
            self.accumulate_strategy(&key, &actions, &strategy, reach[seat]);
        }

        // Sampling is by index into the abstracted list, so the sampled
        // action is always a member of it; a zero-mass strategy falls
        // back to a uniform draw.
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_possible_wrap
        )]
        let sampled = self
            .sampler
            .sample_weighted(&strategy)
            .unwrap_or_else(|| self.sampler.int(0, actions.len() as i64 - 1) as usize);
        let action = actions[sampled];
        let probability = strategy[sampled];

        let next = self.child_state(state, action)?;
        let mut next_reach = reach;
        next_reach[seat] *= probability;
        let utility = self.monte_carlo(&next, next_reach, depth + 1)?;

        // Importance weighting by 1/sigma keeps the estimator unbiased;
        // a zero probability can only mean the sampler deviated from
        // sigma, in which case the update is skipped.
        if probability > 0.0 {
            let counterfactual = Self::counterfactual_reach(reach, seat);
            self.regrets
                .add_regret(&key, action, counterfactual * utility[seat] / probability);
        }

        Ok(utility)
    }
}
