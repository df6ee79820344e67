//! Generic [Monte Carlo Tree Search] for two-player, turn-based,
//! perfect-information games.
//!
//! The game is described through the [`Game`] trait (or assembled from four
//! closures with [`Rules::builder`]) and [`Mcts`] recommends an action for a
//! given state within a time budget:
//!
//! ```
//! use std::time::Duration;
//!
//! use uctree::games::tic_tac_toe::{Board, TicTacToe};
//! use uctree::{Config, Mcts, Rollout};
//!
//! let config = Config::new(Duration::from_millis(50)).with_rollout(Rollout::AntiDecisive);
//! let mut mcts = Mcts::new(TicTacToe, config)?;
//! // X has two in a row and O must block the third cell.
//! let board = Board::from_rows([[1, 1, 0], [0, -1, 0], [0, 0, 0]], 1)?;
//! assert_eq!(mcts.get_action(&board, None)?, 2);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::private_doc_tests,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::bare_urls
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod error;
pub mod game;
pub mod games;
pub mod search;

pub use error::SearchError;
pub use game::{Game, GameResult, Player, Playerwise, Rules, RulesBuilder};
pub use search::{Budget, Config, Mcts, Rollout};
