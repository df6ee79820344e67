use log::trace;
use rand::Rng;

use crate::game::Game;
use crate::search::tree::NodeId;
use crate::search::Context;

/// Grows the tree by one node.
pub trait Expand<G: Game>: Send {
    /// Adds a child of `node` for one of its untried actions and returns it.
    fn run(&self, context: &mut Context<'_, G>, node: NodeId) -> NodeId;
}

/// Plays an untried action chosen uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExpand;

impl<G: Game> Expand<G> for DefaultExpand {
    /// # Panics
    ///
    /// Panics if `node` has no untried actions left.
    fn run(&self, context: &mut Context<'_, G>, node: NodeId) -> NodeId {
        let untried = context.tree.node(node).untried().len();
        assert!(untried > 0, "expanding a fully expanded node");
        let index = context.rng.gen_range(0..untried);
        let action = context.tree.node_mut(node).take_untried(index);

        let state = context.game.apply(context.tree.node(node).state(), &action);
        let stats = context.table.resolve(&state);
        let actions = context.game.actions(&state);
        trace!(
            "expanded node #{} with {} legal actions, {} states known",
            context.tree.len(),
            actions.len(),
            context.table.len()
        );
        context.tree.add_child(node, state, stats, action, actions)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::game::{Player, Playerwise};
    use crate::games::tic_tac_toe::{Board, TicTacToe};
    use crate::search::transposition::TranspositionTable;
    use crate::search::tree::{GameTree, Tree};

    fn tree(board: Board, table: &mut TranspositionTable<Board>) -> GameTree<TicTacToe> {
        let actions = TicTacToe.actions(&board);
        Tree::new(board.clone(), table.resolve(&board), actions)
    }

    #[test]
    fn adds_child() {
        let mut table = TranspositionTable::direct();
        let board = Board::from_rows([[1, 1, -1], [1, 0, -1], [-1, 0, 0]], 1).unwrap();
        let mut tree = tree(board, &mut table);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let root = tree.root();

        let child = DefaultExpand.run(
            &mut Context {
                game: &TicTacToe,
                tree: &mut tree,
                table: &mut table,
                rng: &mut rng,
            },
            root,
        );

        assert_ne!(child, root);
        assert_eq!(tree.node(root).children(), &[child]);
        assert_eq!(tree.node(root).untried().len(), 2);
        let node = tree.node(child);
        assert_eq!(node.parent(), Some(root));
        let action = *node.action().expect("children have an action");
        assert!(!tree.node(root).untried().contains(&action));
        assert_eq!(node.state().player(), Player::Second);
        assert_eq!(node.untried(), TicTacToe.actions(node.state()).as_slice());
        assert_eq!(table.lookup(node.state()), Some(node.stats()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn expands_every_action_once() {
        let mut table = TranspositionTable::direct();
        let mut tree = tree(Board::new(), &mut table);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let root = tree.root();
        let mut context = Context {
            game: &TicTacToe,
            tree: &mut tree,
            table: &mut table,
            rng: &mut rng,
        };
        for _ in 0..9 {
            let _ = DefaultExpand.run(&mut context, root);
        }
        assert!(tree.node(root).is_fully_expanded());
        let mut actions: Vec<_> = tree
            .node(root)
            .children()
            .iter()
            .filter_map(|&child| tree.node(child).action().copied())
            .collect();
        actions.sort_unstable();
        assert_eq!(actions, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn transpositions_share_statistics() {
        let mut table = TranspositionTable::direct();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // X0 O4 X8 reached in two different orders.
        let mut stats = vec![];
        for (board, cell) in [
            (Board::new().play(0).play(4), 8),
            (Board::new().play(8).play(4), 0),
        ] {
            let mut tree = Tree::new(board.clone(), table.resolve(&board), vec![cell]);
            let root = tree.root();
            let child = DefaultExpand.run(
                &mut Context {
                    game: &TicTacToe,
                    tree: &mut tree,
                    table: &mut table,
                    rng: &mut rng,
                },
                root,
            );
            stats.push(tree.node(child).stats());
        }
        assert_eq!(stats[0], stats[1]);
        assert_eq!(table.len(), 3);
    }
}
