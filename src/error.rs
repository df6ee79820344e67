//! Failures reported by a search.

use thiserror::Error;

/// Errors surfaced by [`crate::Mcts`] once it is constructed. Construction
/// itself reports configuration problems through [`anyhow::Error`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// The root state is terminal or has no legal actions, so there is no
    /// move to recommend.
    #[error("no action available: the state is terminal or has no legal actions")]
    NoAction,
    /// The budget ran out before the first iteration finished, e.g. a zero
    /// duration was requested for a position that has legal actions.
    #[error("no action available: the search budget ran out before the first iteration")]
    NoIterations,
}
