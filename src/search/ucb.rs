//! [UCB1] bandit score and the best-child choice built on top of it.
//!
//! [UCB1]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search#Exploration_and_exploitation

use std::f64::consts::SQRT_2;

use crate::game::Game;
use crate::search::transposition::{Statistics, TranspositionTable};
use crate::search::tree::{GameTree, NodeId};

/// Scores a child for selection.
pub trait Ucb1: Send {
    /// Score of `child` given the reference visit count of its parent. With
    /// `exploit` set only the average reward counts.
    fn score(&self, reference_visits: u64, child: &Statistics, exploit: bool) -> f64;
}

/// `average + c * sqrt(ln(V) / visits)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultUcb1 {
    /// Exploration constant `c`.
    pub exploration: f64,
}

impl Default for DefaultUcb1 {
    fn default() -> Self {
        Self {
            exploration: SQRT_2,
        }
    }
}

impl Ucb1 for DefaultUcb1 {
    fn score(&self, reference_visits: u64, child: &Statistics, exploit: bool) -> f64 {
        // Unvisited children are never compared during a search, but they must
        // not poison the comparison with NaN if they are.
        let Some(average) = child.average() else {
            return f64::INFINITY;
        };
        if exploit {
            return average;
        }
        let exploration = ((reference_visits as f64).ln() / child.visits as f64).sqrt();
        self.exploration.mul_add(exploration, average)
    }
}

/// Picks the most promising child of a node.
pub trait BestChild<G: Game>: Send {
    /// Returns `None` when the node has no children.
    fn run(
        &self,
        tree: &GameTree<G>,
        table: &TranspositionTable<G::State>,
        node: NodeId,
        exploit: bool,
    ) -> Option<NodeId>;
}

/// Highest [`Ucb1`] score wins, the first child encountered wins ties. The
/// reference visit count is the sum of the children's visits.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBestChild<U = DefaultUcb1> {
    ucb: U,
}

impl<U: Ucb1> DefaultBestChild<U> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(ucb: U) -> Self {
        Self { ucb }
    }
}

impl<G: Game, U: Ucb1> BestChild<G> for DefaultBestChild<U> {
    fn run(
        &self,
        tree: &GameTree<G>,
        table: &TranspositionTable<G::State>,
        node: NodeId,
        exploit: bool,
    ) -> Option<NodeId> {
        let reference_visits = tree.child_visits(node, table);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in tree.node(node).children() {
            let stats = table.stats(tree.node(child).stats());
            let score = self.ucb.score(reference_visits, stats, exploit);
            match best {
                Some((_, best_score)) if score <= best_score => {},
                _ => best = Some((child, score)),
            }
        }
        best.map(|(child, _)| child)
    }
}
