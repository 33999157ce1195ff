#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! CFR solver core for three-handed no-limit Texas Hold'em.
//!
//! Computes approximate Nash-equilibrium strategies with Counterfactual
//! Regret Minimization, in both full-tree and outcome-sampling Monte
//! Carlo variants.
//!
//! # Modules
//!
//! - `game` - positions, actions, and the hold'em rules oracle
//! - `eval` - hand evaluation behind the [`Evaluator`] trait
//! - `abstraction` - hand bucketing and bet-size abstraction
//! - `cfr` - regret/strategy tables and the [`CfrSolver`]
//! - `config` - YAML training configuration
//! - `export` - human-readable strategy and RFI range dumps

pub mod abstraction;
pub mod cfr;
pub mod config;
pub mod error;
pub mod eval;
pub mod export;
pub mod game;
pub mod infoset;
pub mod poker;
pub mod sampler;
pub mod serialize;

pub use abstraction::{AbstractionLevel, BetAbstraction, HandAbstraction};
pub use cfr::{CfrSolver, RegretTable, StrategyTable, TrainingStats};
pub use config::TrainingConfig;
pub use error::SolverError;
pub use eval::{Evaluator, HandStrength, NativeEvaluator, RsPokerEvaluator};
pub use game::{Action, GameState, Position, RoundFlow, Street};
pub use infoset::infoset_key;
pub use sampler::Sampler;
