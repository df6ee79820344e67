use crate::game::Game;
use crate::search::transposition::TranspositionTable;
use crate::search::tree::{GameTree, NodeId};

/// Records the result of a simulation on the path that produced it.
pub trait BackPropagate<G: Game>: Send {
    /// Updates `node` and all of its ancestors with `score`, which is the
    /// reward from the perspective of the player who moved into `node`.
    fn run(
        &self,
        tree: &GameTree<G>,
        table: &mut TranspositionTable<G::State>,
        node: NodeId,
        score: f64,
    );
}

/// Negamax-style update: players alternate, so the reward changes sign on
/// every ply and is multiplied by `decay` on the way up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultBackPropagate {
    /// Factor applied to the reward per ply, `1` keeps it intact.
    pub decay: f64,
}

impl Default for DefaultBackPropagate {
    fn default() -> Self {
        Self { decay: 1.0 }
    }
}

impl<G: Game> BackPropagate<G> for DefaultBackPropagate {
    fn run(
        &self,
        tree: &GameTree<G>,
        table: &mut TranspositionTable<G::State>,
        node: NodeId,
        score: f64,
    ) {
        let mut score = score;
        for id in tree.path_to_root(node) {
            let stats = table.stats_mut(tree.node(id).stats());
            stats.visits += 1;
            stats.reward += score;
            score = -score * self.decay;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::games::tic_tac_toe::{Board, TicTacToe};
    use crate::search::transposition::Statistics;
    use crate::search::tree::Tree;

    /// Straight line of `depth` moves below the empty board.
    fn line(
        depth: usize,
    ) -> (GameTree<TicTacToe>, TranspositionTable<Board>, Vec<NodeId>) {
        let mut table = TranspositionTable::direct();
        let mut board = Board::new();
        let mut tree = Tree::new(board.clone(), table.resolve(&board), vec![]);
        let mut path = vec![tree.root()];
        for cell in 0..depth {
            board = board.play(cell);
            let stats = table.resolve(&board);
            let parent = *path.last().unwrap();
            path.push(tree.add_child(parent, board.clone(), stats, cell, vec![]));
        }
        (tree, table, path)
    }

    fn backpropagate(
        decay: f64,
        tree: &GameTree<TicTacToe>,
        table: &mut TranspositionTable<Board>,
        node: NodeId,
        score: f64,
    ) {
        BackPropagate::<TicTacToe>::run(&DefaultBackPropagate { decay }, tree, table, node, score);
    }

    fn stats_along(
        tree: &GameTree<TicTacToe>,
        table: &TranspositionTable<Board>,
        path: &[NodeId],
    ) -> Vec<Statistics> {
        path.iter()
            .map(|&id| *table.stats(tree.node(id).stats()))
            .collect()
    }

    #[test]
    fn alternates_sign() {
        let (tree, mut table, path) = line(3);
        backpropagate(1.0, &tree, &mut table, path[3], 1.0);
        assert_eq!(
            stats_along(&tree, &table, &path),
            vec![
                Statistics {
                    visits: 1,
                    reward: -1.0
                },
                Statistics {
                    visits: 1,
                    reward: 1.0
                },
                Statistics {
                    visits: 1,
                    reward: -1.0
                },
                Statistics {
                    visits: 1,
                    reward: 1.0
                },
            ]
        );
    }

    #[test]
    fn decays() {
        let (tree, mut table, path) = line(4);
        backpropagate(0.5, &tree, &mut table, path[4], 2.0);
        let rewards: Vec<_> = stats_along(&tree, &table, &path)
            .iter()
            .map(|stats| stats.reward)
            .collect();
        // Leaf first: 2, -1, 0.5, -0.25, 0.125.
        assert_eq!(rewards, vec![0.125, -0.25, 0.5, -1.0, 2.0]);
    }

    #[test]
    fn stops_at_given_node() {
        let (tree, mut table, path) = line(3);
        backpropagate(1.0, &tree, &mut table, path[1], -1.0);
        let visits: Vec<_> = stats_along(&tree, &table, &path)
            .iter()
            .map(|stats| stats.visits)
            .collect();
        assert_eq!(visits, vec![1, 1, 0, 0]);
    }
}
