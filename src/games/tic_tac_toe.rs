//! Tic-tac-toe: perfect play ends in a draw, so a correct search must never
//! lose a won position and must always take a win in one.
//!
//! Cells are numbered row by row:
//!
//! ```text
//! 0 | 1 | 2
//! ---------
//! 3 | 4 | 5
//! ---------
//! 6 | 7 | 8
//! ```

use std::fmt;

use anyhow::bail;
use itertools::Itertools;

use crate::game::{Game, GameResult, Player, Playerwise};

/// Index of a cell, `0..9`.
pub type Cell = usize;

const LINES: [[Cell; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Board position. `player` made the last move; the other player is next.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Player>; 9],
    player: Player,
}

impl Board {
    /// Empty board, [`Player::First`] to move.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [None; 9],
            player: Player::Second,
        }
    }

    /// Parses rows of `1`, `-1` and `0` (empty). `player` is the player who
    /// made the last move.
    pub fn from_rows(rows: [[i8; 3]; 3], player: i8) -> anyhow::Result<Self> {
        let mut cells = [None; 9];
        for (cell, &value) in rows.iter().flatten().enumerate() {
            cells[cell] = match value {
                0 => None,
                _ => Some(Player::try_from(value)?),
            };
        }
        let board = Self {
            cells,
            player: Player::try_from(player)?,
        };
        if board.winners() > 1 {
            bail!("both players can not have three in a row");
        }
        Ok(board)
    }

    /// Player to move next.
    #[must_use]
    pub fn to_move(&self) -> Player {
        !self.player
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn cell(&self, cell: Cell) -> Option<Player> {
        self.cells[cell]
    }

    /// Places the next player's mark on `cell`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is already taken.
    #[must_use]
    pub fn play(&self, cell: Cell) -> Self {
        assert!(self.cells[cell].is_none(), "cell {cell} is already taken");
        let mut next = self.clone();
        next.player = self.to_move();
        next.cells[cell] = Some(next.player);
        next
    }

    /// Player with three marks in a row.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| self.line_owner(line))
    }

    fn line_owner(&self, line: &[Cell; 3]) -> Option<Player> {
        line.iter()
            .map(|&cell| self.cells[cell])
            .all_equal_value()
            .ok()
            .flatten()
    }

    fn winners(&self) -> usize {
        LINES
            .iter()
            .filter_map(|line| self.line_owner(line))
            .unique()
            .count()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Playerwise for Board {
    fn player(&self) -> Player {
        self.player
    }

    fn with_player(&self, player: Player) -> Self {
        Self {
            cells: self.cells,
            player,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let row = row
                .iter()
                .map(|cell| match cell {
                    Some(Player::First) => 'X',
                    Some(Player::Second) => 'O',
                    None => '.',
                })
                .join(" ");
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Rules of tic-tac-toe.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicTacToe;

impl Game for TicTacToe {
    type Action = Cell;
    type State = Board;

    fn actions(&self, state: &Board) -> Vec<Cell> {
        if state.winner().is_some() {
            return vec![];
        }
        (0..9).filter(|&cell| state.cells[cell].is_none()).collect()
    }

    fn apply(&self, state: &Board, action: &Cell) -> Board {
        state.play(*action)
    }

    fn is_terminal(&self, state: &Board) -> bool {
        state.winner().is_some() || state.is_full()
    }

    fn reward(&self, state: &Board, player: Player) -> f64 {
        let result = match state.winner() {
            Some(winner) if winner == player => GameResult::Win,
            Some(_) => GameResult::Loss,
            None => GameResult::Draw,
        };
        result.reward()
    }
}
