//! Small games with well-known solutions, used to exercise the search.

pub mod tic_tac_toe;

pub use tic_tac_toe::TicTacToe;
