//! Implements [Monte Carlo Tree Search] (MCTS) algorithm.
//!
//! Every iteration runs four phases, each behind its own trait so that
//! callers can swap any of them:
//!
//! 1. [Selection](select::Select): walk down from the root through the most
//!    promising children until reaching a terminal node or a node that should
//!    grow.
//! 2. [Expansion](expand::Expand): add a child for one of the untried actions.
//! 3. [Simulation](simulate::Simulate): play the game out from the new node.
//! 4. [Backpropagation](backpropagate::BackPropagate): record the result on
//!    the path back to the root.
//!
//! Statistics live in a [transposition table](transposition::TranspositionTable)
//! keyed by state, so all tree nodes holding equal states share them.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

use std::time::{Duration, Instant};

use rand::RngCore;

use crate::game::Game;
use crate::search::transposition::TranspositionTable;
use crate::search::tree::GameTree;

pub mod backpropagate;
pub mod config;
pub mod expand;
pub mod mcts;
pub mod select;
pub mod simulate;
pub mod state;
pub mod transposition;
pub mod tree;
pub mod ucb;

pub use config::Config;
pub use mcts::{Mcts, Phases};
pub use simulate::Rollout;
pub use state::SearchState;

/// Everything the tree-growing phases touch during one iteration.
pub struct Context<'a, G: Game> {
    #[allow(missing_docs)]
    pub game: &'a G,
    #[allow(missing_docs)]
    pub tree: &'a mut GameTree<G>,
    #[allow(missing_docs)]
    pub table: &'a mut TranspositionTable<G::State>,
    #[allow(missing_docs)]
    pub rng: &'a mut dyn RngCore,
}

/// How much work a search is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Budget {
    /// Wall time. Checked between iterations, so the last iteration may run
    /// over.
    Time(Duration),
    /// Exact number of iterations. Useful for reproducible searches.
    Iterations(u64),
}

/// Keeps track of the budget spent since the search started.
#[derive(Debug)]
pub struct Limiter {
    timer: Instant,
    budget: Budget,
}

impl Limiter {
    /// Starts the clock.
    #[must_use]
    pub fn new(budget: Budget) -> Self {
        Self {
            timer: Instant::now(),
            budget,
        }
    }

    /// Returns `true` once no more iterations should be started.
    #[must_use]
    pub fn exhausted(&self, iterations: u64) -> bool {
        match self.budget {
            Budget::Time(limit) => self.timer.elapsed() >= limit,
            Budget::Iterations(limit) => iterations >= limit,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }
}
