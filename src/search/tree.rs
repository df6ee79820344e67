use std::hash::Hash;
use std::iter;

use crate::game::Game;
use crate::search::transposition::{StatsId, TranspositionTable};

/// Position of a node in the [`Tree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Node of the search tree. Statistics live in the transposition table and
/// may be shared with other nodes holding an equal state.
#[derive(Clone, Debug)]
pub struct Node<S, A> {
    state: S,
    stats: StatsId,
    parent: Option<NodeId>,
    /// Action that led here from the parent, `None` for the root.
    action: Option<A>,
    children: Vec<NodeId>,
    /// Legal actions that have not produced a child yet.
    untried: Vec<A>,
}

impl<S, A> Node<S, A> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn stats(&self) -> StatsId {
        self.stats
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn untried(&self) -> &[A] {
        &self.untried
    }

    /// Removes and returns the untried action at `index`.
    pub fn take_untried(&mut self, index: usize) -> A {
        self.untried.swap_remove(index)
    }

    /// A node is fully expanded once every legal action has a child.
    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }
}

/// Search tree stored as an arena: nodes own their children through indices
/// and point back to the parent without owning it.
#[derive(Clone, Debug)]
pub struct Tree<S, A> {
    nodes: Vec<Node<S, A>>,
}

/// Tree over the states and actions of a game.
pub type GameTree<G> = Tree<<G as Game>::State, <G as Game>::Action>;

impl<S, A> Tree<S, A> {
    /// Creates a tree with a single root node.
    #[must_use]
    pub fn new(state: S, stats: StatsId, actions: Vec<A>) -> Self {
        Self {
            nodes: vec![Node {
                state,
                stats,
                parent: None,
                action: None,
                children: Vec::new(),
                untried: actions,
            }],
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<S, A> {
        &self.nodes[id.0]
    }

    #[allow(missing_docs)]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<S, A> {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a child to `parent` and returns its id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        state: S,
        stats: StatsId,
        action: A,
        untried: Vec<A>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            state,
            stats,
            parent: Some(parent),
            action: Some(action),
            children: Vec::new(),
            untried,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Iterates from `id` up to the root, both included.
    pub fn path_to_root(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(Some(id), |&current| self.node(current).parent)
    }

    /// Sum of the visit counts of the children of `id`.
    ///
    /// Under transpositions a node's own visit count can differ from this sum,
    /// which is what the exploration term should be measured against.
    #[must_use]
    pub fn child_visits<K>(&self, id: NodeId, table: &TranspositionTable<K>) -> u64
    where
        K: Hash + Eq,
    {
        self.node(id)
            .children
            .iter()
            .map(|&child| table.stats(self.node(child).stats).visits)
            .sum()
    }
}
