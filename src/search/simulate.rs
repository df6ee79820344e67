//! Rollout policies: play a game out from a state and report how it ended.
//!
//! The heuristic policies are described in "On the Huge Benefit of Decisive
//! Moves in Monte-Carlo Tree Search Algorithms" (Teytaud & Teytaud, 2010).

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::game::{Game, Playerwise};

/// Plays a game to the end from a given state.
pub trait Simulate<G: Game>: Send {
    /// Reward of the finished game for `state.player()`.
    ///
    /// Does not return if the rules never reach a terminal state.
    fn run(&self, game: &G, state: &G::State, rng: &mut dyn RngCore) -> f64;
}

/// Rollout strategy selected through configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rollout {
    /// Uniformly random moves.
    #[default]
    Random,
    /// Takes an immediate win whenever there is one.
    Decisive,
    /// Takes an immediate win, otherwise blocks the opponent's immediate win.
    AntiDecisive,
}

impl Rollout {
    /// Builds the strategy.
    #[must_use]
    pub fn strategy<G: Game>(self) -> Box<dyn Simulate<G>> {
        match self {
            Self::Random => Box::new(RandomRollout),
            Self::Decisive => Box::new(DecisiveRollout),
            Self::AntiDecisive => Box::new(AntiDecisiveRollout),
        }
    }
}

/// Uniformly random playout.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRollout;

/// Random playout that never misses a win in one.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecisiveRollout;

/// Random playout that never misses a win in one and blocks the opponent's
/// win in one.
#[derive(Clone, Copy, Debug, Default)]
pub struct AntiDecisiveRollout;

impl<G: Game> Simulate<G> for RandomRollout {
    fn run(&self, game: &G, state: &G::State, rng: &mut dyn RngCore) -> f64 {
        play_out(game, state, rng, |_, _| None)
    }
}

impl<G: Game> Simulate<G> for DecisiveRollout {
    fn run(&self, game: &G, state: &G::State, rng: &mut dyn RngCore) -> f64 {
        play_out(game, state, rng, |state, actions| {
            winning_action(game, state, actions)
        })
    }
}

impl<G: Game> Simulate<G> for AntiDecisiveRollout {
    fn run(&self, game: &G, state: &G::State, rng: &mut dyn RngCore) -> f64 {
        play_out(game, state, rng, |state, actions| {
            winning_action(game, state, actions).or_else(|| blocking_action(game, state, actions))
        })
    }
}

/// Plays until the game ends, preferring the action returned by `pick` over a
/// random one. A state without legal actions ends the game as well.
fn play_out<G: Game>(
    game: &G,
    state: &G::State,
    rng: &mut dyn RngCore,
    pick: impl Fn(&G::State, &[G::Action]) -> Option<G::Action>,
) -> f64 {
    let player = state.player();
    let mut state = state.clone();
    while !game.is_terminal(&state) {
        let actions = game.actions(&state);
        let action = match pick(&state, &actions) {
            Some(action) => action,
            None => match actions.choose(rng) {
                Some(action) => action.clone(),
                None => break,
            },
        };
        state = game.apply(&state, &action);
    }
    game.reward(&state, player)
}

/// Returns `true` if the game is over after `action` and the player who played
/// it won.
fn wins<G: Game>(game: &G, state: &G::State, action: &G::Action) -> bool {
    let next = game.apply(state, action);
    game.is_terminal(&next) && game.reward(&next, next.player()) >= 1.0
}

fn winning_action<G: Game>(game: &G, state: &G::State, actions: &[G::Action]) -> Option<G::Action> {
    actions
        .iter()
        .find(|action| wins(game, state, action))
        .cloned()
}

/// Looks at the position as if the opponent were to move and returns the
/// opponent's winning action if the player to move can play it too.
fn blocking_action<G: Game>(
    game: &G,
    state: &G::State,
    actions: &[G::Action],
) -> Option<G::Action> {
    let mover = !state.player();
    let as_opponent = state.with_player(mover);
    game.actions(&as_opponent)
        .into_iter()
        .filter(|threat| wins(game, &as_opponent, threat))
        .find(|threat| actions.contains(threat))
}
