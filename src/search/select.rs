use crate::game::Game;
use crate::search::expand::{DefaultExpand, Expand};
use crate::search::tree::NodeId;
use crate::search::ucb::{BestChild, DefaultBestChild, DefaultUcb1, Ucb1};
use crate::search::Context;

/// Finds the node the next simulation starts from.
pub trait Select<G: Game>: Send {
    /// Walks down from `node` and returns a terminal node or a freshly
    /// expanded one.
    fn run(&self, context: &mut Context<'_, G>, node: NodeId) -> NodeId;
}

/// Tree policy with [First-Play Urgency]: a node that still has untried
/// actions is expanded unless its best child scores at least `fpu`.
///
/// [First-Play Urgency]: https://hal.inria.fr/inria-00117266/document
#[derive(Clone, Copy, Debug)]
pub struct DefaultSelect<E = DefaultExpand, B = DefaultBestChild, U = DefaultUcb1> {
    expand: E,
    best_child: B,
    ucb: U,
    fpu: f64,
}

impl<E, B, U> DefaultSelect<E, B, U> {
    #[allow(missing_docs)]
    #[must_use]
    pub fn new(expand: E, best_child: B, ucb: U, fpu: f64) -> Self {
        Self {
            expand,
            best_child,
            ucb,
            fpu,
        }
    }
}

impl DefaultSelect {
    /// Standard components with the given exploration constant and
    /// First-Play Urgency.
    #[must_use]
    pub fn with_parameters(exploration: f64, fpu: f64) -> Self {
        let ucb = DefaultUcb1 { exploration };
        Self::new(DefaultExpand, DefaultBestChild::new(ucb), ucb, fpu)
    }
}

impl<G, E, B, U> Select<G> for DefaultSelect<E, B, U>
where
    G: Game,
    E: Expand<G>,
    B: BestChild<G>,
    U: Ucb1,
{
    fn run(&self, context: &mut Context<'_, G>, node: NodeId) -> NodeId {
        let mut node = node;
        loop {
            let current = context.tree.node(node);
            if context.game.is_terminal(current.state()) {
                return node;
            }
            let fully_expanded = current.is_fully_expanded();
            let Some(child) = self.best_child.run(context.tree, context.table, node, false)
            else {
                // Nothing to descend into. A node without legal actions that
                // the rules do not consider terminal is a leaf as well.
                if fully_expanded {
                    return node;
                }
                return self.expand.run(context, node);
            };
            if !fully_expanded {
                let reference_visits = context.tree.child_visits(node, context.table);
                let stats = context.table.stats(context.tree.node(child).stats());
                if self.ucb.score(reference_visits, stats, false) < self.fpu {
                    return self.expand.run(context, node);
                }
            }
            node = child;
        }
    }
}
