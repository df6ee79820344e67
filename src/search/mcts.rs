use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::SearchError;
use crate::game::Game;
use crate::search::backpropagate::{BackPropagate, DefaultBackPropagate};
use crate::search::select::{DefaultSelect, Select};
use crate::search::simulate::Simulate;
use crate::search::state::SearchState;
use crate::search::transposition::TranspositionTable;
use crate::search::ucb::{BestChild, DefaultBestChild, DefaultUcb1};
use crate::search::{Budget, Config, Limiter};

/// Strategies used for each phase of an iteration and for picking the final
/// action.
pub struct Phases<G: Game> {
    #[allow(missing_docs)]
    pub select: Box<dyn Select<G>>,
    #[allow(missing_docs)]
    pub simulate: Box<dyn Simulate<G>>,
    #[allow(missing_docs)]
    pub backpropagate: Box<dyn BackPropagate<G>>,
    /// Runs in exploitation mode on the root once the budget is spent.
    pub best_child: Box<dyn BestChild<G>>,
}

impl<G: Game> Phases<G> {
    /// Standard strategies parameterized by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let ucb = DefaultUcb1 {
            exploration: config.exploration,
        };
        Self {
            select: Box::new(DefaultSelect::with_parameters(config.exploration, config.fpu)),
            simulate: config.rollout.strategy(),
            backpropagate: Box::new(DefaultBackPropagate {
                decay: config.decay,
            }),
            best_child: Box::new(DefaultBestChild::new(ucb)),
        }
    }
}

/// Monte Carlo Tree Search over a [`Game`].
///
/// Statistics are kept in a transposition table that lives as long as the
/// searcher, so consecutive calls (e.g. one per move of a match) build on
/// what earlier calls learned. Searches on one `Mcts` are sequential: both
/// entry points take `&mut self`.
///
/// ```
/// use std::time::Duration;
///
/// use uctree::games::tic_tac_toe::{Board, TicTacToe};
/// use uctree::{Config, Mcts};
///
/// let mut mcts = Mcts::new(TicTacToe, Config::new(Duration::from_millis(50)))?
///     .with_seed(7);
/// let action = mcts.get_action(&Board::new(), None)?;
/// assert!(action < 9);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Mcts<G: Game> {
    game: G,
    config: Config,
    table: TranspositionTable<G::State>,
    phases: Phases<G>,
    rng: ChaCha8Rng,
}

impl<G: Game> Mcts<G> {
    /// Creates a searcher with the standard strategies.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(game: G, config: Config) -> anyhow::Result<Self> {
        let phases = Phases::from_config(&config);
        Self::with_phases(game, config, phases)
    }

    /// Creates a searcher with custom strategies. Only `config.duration`,
    /// `config.buckets` and `config.slice` are used; the rest of the
    /// parameters belong to the strategies.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_phases(game: G, config: Config, phases: Phases<G>) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            game,
            table: TranspositionTable::new(config.buckets),
            config,
            phases,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Makes the search reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn game(&self) -> &G {
        &self.game
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Statistics gathered by all searches so far.
    #[must_use]
    pub const fn table(&self) -> &TranspositionTable<G::State> {
        &self.table
    }

    /// Forgets everything learned by previous searches.
    pub fn clear_table(&mut self) {
        self.table.clear();
    }

    /// Searches from `state` for `duration` (or the configured duration) and
    /// returns the best action.
    ///
    /// Blocks the calling thread for the whole duration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoAction`] if `state` is terminal or has no
    /// legal actions and [`SearchError::NoIterations`] if `duration` is too
    /// short to finish a single iteration.
    pub fn get_action(
        &mut self,
        state: &G::State,
        duration: Option<Duration>,
    ) -> Result<G::Action, SearchError> {
        let budget = Budget::Time(duration.unwrap_or(self.config.duration));
        let search = self.search(state, budget);
        self.best_action(&search)
    }

    /// Same as [`Mcts::get_action`], but yields to the async runtime every
    /// `config.slice` so that other tasks on the same thread can make
    /// progress. Iterations are never interrupted. The returned future is
    /// `Send`, so it can be handed to `tokio::spawn`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoAction`] if `state` is terminal or has no
    /// legal actions and [`SearchError::NoIterations`] if `duration` is too
    /// short to finish a single iteration.
    pub async fn get_action_async(
        &mut self,
        state: &G::State,
        duration: Option<Duration>,
    ) -> Result<G::Action, SearchError>
    where
        G: Send,
        G::State: Send + Sync,
        G::Action: Send,
    {
        let limiter = Limiter::new(Budget::Time(duration.unwrap_or(self.config.duration)));
        let mut search = SearchState::new(&self.game, &mut self.table, state.clone());
        if search.has_actions(&self.game) {
            debug!(
                "searching asynchronously for {:?} in {:?} slices",
                limiter.budget(),
                self.config.slice
            );
            while !limiter.exhausted(search.iterations()) {
                let slice = Limiter::new(Budget::Time(self.config.slice));
                while !slice.exhausted(search.iterations()) && !limiter.exhausted(search.iterations())
                {
                    search.iterate(&self.phases, &self.game, &mut self.table, &mut self.rng);
                }
                tokio::task::yield_now().await;
            }
            self.report(&search, &limiter);
        }
        self.best_action(&search)
    }

    /// Runs a search from `state` within `budget` and returns it for
    /// inspection. Nothing is searched if `state` has no legal actions.
    pub fn search(&mut self, state: &G::State, budget: Budget) -> SearchState<G> {
        let limiter = Limiter::new(budget);
        let mut search = SearchState::new(&self.game, &mut self.table, state.clone());
        if search.has_actions(&self.game) {
            debug!(
                "searching for {budget:?} with {} states in the table",
                self.table.len()
            );
            search.run(
                &limiter,
                &self.phases,
                &self.game,
                &mut self.table,
                &mut self.rng,
            );
            self.report(&search, &limiter);
        }
        search
    }

    /// Picks the action a finished `search` recommends.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoAction`] if the search root has no legal
    /// actions and [`SearchError::NoIterations`] if it has some but the search
    /// never got to expand them.
    pub fn best_action(&self, search: &SearchState<G>) -> Result<G::Action, SearchError> {
        search
            .best_action(self.phases.best_child.as_ref(), &self.table)
            .ok_or_else(|| {
                if search.has_actions(&self.game) {
                    warn!("search budget ran out before the first iteration");
                    SearchError::NoIterations
                } else {
                    warn!("no action available in the searched state");
                    SearchError::NoAction
                }
            })
    }

    fn report(&self, search: &SearchState<G>, limiter: &Limiter) {
        let elapsed = limiter.elapsed();
        info!(
            "iterations {} time {} ips {} tree {} table {}",
            search.iterations(),
            elapsed.as_millis(),
            (search.iterations() as f64 / elapsed.as_secs_f64()) as u64,
            search.tree().len(),
            self.table.len(),
        );
    }
}

impl<G: Game + fmt::Debug> fmt::Debug for Mcts<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mcts")
            .field("game", &self.game)
            .field("config", &self.config)
            .field("table", &self.table.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::games::tic_tac_toe::{Board, TicTacToe};
    use crate::search::Rollout;

    fn mcts(config: Config) -> Mcts<TicTacToe> {
        Mcts::new(TicTacToe, config).unwrap().with_seed(17)
    }

    fn config() -> Config {
        Config::new(Duration::from_millis(100))
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(Mcts::new(TicTacToe, config().with_decay(2.0)).is_err());
    }

    #[test]
    fn iteration_budget_is_exact() {
        let mut mcts = mcts(config());
        let search = mcts.search(&Board::new(), Budget::Iterations(100));
        assert_eq!(search.iterations(), 100);
        let root = search.tree().node(search.tree().root());
        assert_eq!(mcts.table().stats(root.stats()).visits, 100);
    }

    #[test]
    fn terminal_state_is_not_searched() {
        let mut mcts = mcts(config());
        let board = Board::from_rows([[1, -1, 1], [1, -1, -1], [-1, 1, 1]], 1).unwrap();
        let search = mcts.search(&board, Budget::Iterations(100));
        assert_eq!(search.iterations(), 0);
        assert_eq!(mcts.best_action(&search), Err(SearchError::NoAction));
        assert_eq!(mcts.get_action(&board, None), Err(SearchError::NoAction));
    }

    #[test]
    fn table_persists_between_searches() {
        let mut mcts = mcts(config());
        let board = Board::new();
        let _ = mcts.search(&board, Budget::Iterations(50));
        let known = mcts.table().len();
        assert!(known > 1);

        let search = mcts.search(&board, Budget::Iterations(50));
        let root = search.tree().node(search.tree().root());
        assert_eq!(mcts.table().stats(root.stats()).visits, 100);
        assert!(mcts.table().len() >= known);

        mcts.clear_table();
        assert!(mcts.table().is_empty());
    }

    #[test]
    fn zero_duration_is_not_mistaken_for_a_finished_game() {
        let mut mcts = mcts(config());
        let board = Board::new();
        assert_eq!(
            mcts.get_action(&board, Some(Duration::ZERO)),
            Err(SearchError::NoIterations)
        );
        let search = mcts.search(&board, Budget::Iterations(0));
        assert_eq!(mcts.best_action(&search), Err(SearchError::NoIterations));
        assert_eq!(
            SearchError::NoIterations.to_string(),
            "no action available: the search budget ran out before the first iteration"
        );
        // A real budget still finds an action afterwards.
        assert!(mcts.get_action(&board, Some(Duration::from_millis(5))).is_ok());
    }

    #[test]
    fn custom_phases() {
        let config = config();
        let mut phases = Phases::from_config(&config);
        phases.simulate = Rollout::Decisive.strategy();
        let mut mcts = Mcts::with_phases(TicTacToe, config, phases)
            .unwrap()
            .with_seed(3);
        // X to move wins on 2.
        let board = Board::from_rows([[1, 1, 0], [-1, -1, 0], [1, -1, 0]], -1).unwrap();
        let search = mcts.search(&board, Budget::Iterations(200));
        assert_eq!(mcts.best_action(&search), Ok(2));
    }
}
