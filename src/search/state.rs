use rand::RngCore;

use crate::game::Game;
use crate::search::mcts::Phases;
use crate::search::transposition::TranspositionTable;
use crate::search::tree::{GameTree, Tree};
use crate::search::ucb::BestChild;
use crate::search::{Context, Limiter};

/// One search from a fixed root: the tree built so far and the number of
/// finished iterations.
///
/// The tree is discarded with the search; statistics stay in the table.
pub struct SearchState<G: Game> {
    tree: GameTree<G>,
    iterations: u64,
}

impl<G: Game> SearchState<G> {
    /// Starts a search from `root`, reusing its statistics if `table` has seen
    /// it before.
    #[must_use]
    pub fn new(game: &G, table: &mut TranspositionTable<G::State>, root: G::State) -> Self {
        let stats = table.resolve(&root);
        let actions = game.actions(&root);
        Self {
            tree: Tree::new(root, stats, actions),
            iterations: 0,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn tree(&self) -> &GameTree<G> {
        &self.tree
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Returns `false` if the root is terminal or has no legal actions, in
    /// which case searching can not produce an action.
    #[must_use]
    pub fn has_actions(&self, game: &G) -> bool {
        let root = self.tree.node(self.tree.root());
        !game.is_terminal(root.state()) && !root.untried().is_empty()
    }

    /// Runs one select, simulate, backpropagate cycle.
    pub fn iterate(
        &mut self,
        phases: &Phases<G>,
        game: &G,
        table: &mut TranspositionTable<G::State>,
        rng: &mut dyn RngCore,
    ) {
        let root = self.tree.root();
        let leaf = phases.select.run(
            &mut Context {
                game,
                tree: &mut self.tree,
                table: &mut *table,
                rng: &mut *rng,
            },
            root,
        );
        let score = phases
            .simulate
            .run(game, self.tree.node(leaf).state(), rng);
        phases.backpropagate.run(&self.tree, table, leaf, score);
        self.iterations += 1;
    }

    /// Iterates until `limiter` is exhausted.
    pub fn run(
        &mut self,
        limiter: &Limiter,
        phases: &Phases<G>,
        game: &G,
        table: &mut TranspositionTable<G::State>,
        rng: &mut dyn RngCore,
    ) {
        while !limiter.exhausted(self.iterations) {
            self.iterate(phases, game, table, rng);
        }
    }

    /// Action leading to the root's child with the best average reward.
    #[must_use]
    pub fn best_action(
        &self,
        best_child: &dyn BestChild<G>,
        table: &TranspositionTable<G::State>,
    ) -> Option<G::Action> {
        let root = self.tree.root();
        best_child
            .run(&self.tree, table, root, true)
            .and_then(|child| self.tree.node(child).action().cloned())
    }
}
