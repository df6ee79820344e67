//! Interface between the search and the rules of a game.
//!
//! The search never looks inside a state or an action: everything it knows
//! about the game comes through [`Game`]. Rules are expected to be pure
//! functions of their inputs and `apply` must return a new state instead of
//! changing the one it was given.

use std::fmt;
use std::hash::Hash;
use std::ops::Not;

use anyhow::bail;

/// Two players alternate turns. `First` is conventionally encoded as `1` and
/// `Second` as `-1`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl TryFrom<i8> for Player {
    type Error = anyhow::Error;

    fn try_from(player: i8) -> anyhow::Result<Self> {
        match player {
            1 => Ok(Self::First),
            -1 => Ok(Self::Second),
            _ => bail!("player should be 1 or -1, got {player}"),
        }
    }
}

impl From<Player> for i8 {
    fn from(player: Player) -> Self {
        match player {
            Player::First => 1,
            Player::Second => -1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i8::from(*self))
    }
}

/// Result of the game from the perspective of a given player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    #[allow(missing_docs)]
    Win,
    #[allow(missing_docs)]
    Draw,
    #[allow(missing_docs)]
    Loss,
}

impl GameResult {
    /// Conventional reward: `1` for a win, `0` for a draw and `-1` for a loss.
    #[must_use]
    pub const fn reward(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Draw => 0.0,
            Self::Loss => -1.0,
        }
    }
}

/// States know which player they are credited to.
///
/// `player()` is the player whose move produced the state, so the player to
/// move next is `!state.player()`. Search statistics of a state are recorded
/// from the perspective of `player()`.
pub trait Playerwise {
    /// Player who made the move leading to this state.
    fn player(&self) -> Player;

    /// Returns a copy of this state credited to `player` without playing any
    /// move. Used to look at the position as if the other side were to move.
    #[must_use]
    fn with_player(&self, player: Player) -> Self
    where
        Self: Sized;
}

/// Rules of a two-player, zero-sum, perfect-information game.
pub trait Game {
    /// Game position. Equal states must hash equally: the hash is used as the
    /// transposition key.
    type State: Playerwise + Clone + Eq + Hash;
    /// A single legal move.
    type Action: Clone + PartialEq;

    /// Legal actions in `state`. Must be empty exactly when no move is
    /// possible.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Plays `action` and returns the resulting state.
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Returns `true` if the game is over.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Outcome of a terminal `state` for `player`, normally one of
    /// [`GameResult::reward`] values.
    fn reward(&self, state: &Self::State, player: Player) -> f64;
}

type ActionsFn<S, A> = Box<dyn Fn(&S) -> Vec<A> + Send + Sync>;
type ApplyFn<S, A> = Box<dyn Fn(&S, &A) -> S + Send + Sync>;
type TerminalFn<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;
type RewardFn<S> = Box<dyn Fn(&S, Player) -> f64 + Send + Sync>;

/// [`Game`] assembled from four plain functions.
pub struct Rules<S, A> {
    actions: ActionsFn<S, A>,
    apply: ApplyFn<S, A>,
    is_terminal: TerminalFn<S>,
    reward: RewardFn<S>,
}

impl<S, A> Rules<S, A> {
    /// Starts assembling the rules.
    #[must_use]
    pub fn builder() -> RulesBuilder<S, A> {
        RulesBuilder::default()
    }
}

impl<S, A> fmt::Debug for Rules<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules").finish_non_exhaustive()
    }
}

impl<S, A> Game for Rules<S, A>
where
    S: Playerwise + Clone + Eq + Hash,
    A: Clone + PartialEq,
{
    type Action = A;
    type State = S;

    fn actions(&self, state: &S) -> Vec<A> {
        (self.actions)(state)
    }

    fn apply(&self, state: &S, action: &A) -> S {
        (self.apply)(state, action)
    }

    fn is_terminal(&self, state: &S) -> bool {
        (self.is_terminal)(state)
    }

    fn reward(&self, state: &S, player: Player) -> f64 {
        (self.reward)(state, player)
    }
}

/// Collects the rule functions for [`Rules`]. All four are required.
pub struct RulesBuilder<S, A> {
    actions: Option<ActionsFn<S, A>>,
    apply: Option<ApplyFn<S, A>>,
    is_terminal: Option<TerminalFn<S>>,
    reward: Option<RewardFn<S>>,
}

impl<S, A> Default for RulesBuilder<S, A> {
    fn default() -> Self {
        Self {
            actions: None,
            apply: None,
            is_terminal: None,
            reward: None,
        }
    }
}

impl<S, A> RulesBuilder<S, A> {
    /// Legal move generator.
    #[must_use]
    pub fn actions(mut self, f: impl Fn(&S) -> Vec<A> + Send + Sync + 'static) -> Self {
        self.actions = Some(Box::new(f));
        self
    }

    /// Transition function.
    #[must_use]
    pub fn apply(mut self, f: impl Fn(&S, &A) -> S + Send + Sync + 'static) -> Self {
        self.apply = Some(Box::new(f));
        self
    }

    /// Terminal test.
    #[must_use]
    pub fn is_terminal(mut self, f: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        self.is_terminal = Some(Box::new(f));
        self
    }

    /// Reward of a terminal state for a player.
    #[must_use]
    pub fn reward(mut self, f: impl Fn(&S, Player) -> f64 + Send + Sync + 'static) -> Self {
        self.reward = Some(Box::new(f));
        self
    }

    /// Returns the assembled rules or an error naming the first missing
    /// function.
    pub fn build(self) -> anyhow::Result<Rules<S, A>> {
        let Some(actions) = self.actions else {
            bail!("rules are missing the `actions` function");
        };
        let Some(apply) = self.apply else {
            bail!("rules are missing the `apply` function");
        };
        let Some(is_terminal) = self.is_terminal else {
            bail!("rules are missing the `is_terminal` function");
        };
        let Some(reward) = self.reward else {
            bail!("rules are missing the `reward` function");
        };
        Ok(Rules {
            actions,
            apply,
            is_terminal,
            reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Counter {
        value: u8,
        player: Player,
    }

    impl Playerwise for Counter {
        fn player(&self) -> Player {
            self.player
        }

        fn with_player(&self, player: Player) -> Self {
            Self {
                value: self.value,
                player,
            }
        }
    }

    #[test]
    fn player_encoding() {
        assert_eq!(Player::try_from(1).unwrap(), Player::First);
        assert_eq!(Player::try_from(-1).unwrap(), Player::Second);
        assert!(Player::try_from(0).is_err());
        assert_eq!(i8::from(Player::Second), -1);
        assert_eq!(!Player::First, Player::Second);
        assert_eq!(Player::First.to_string(), "1");
    }

    #[test]
    fn results() {
        assert!(GameResult::Win.reward() > GameResult::Draw.reward());
        assert!(GameResult::Draw.reward() > GameResult::Loss.reward());
    }

    #[test]
    fn rules_from_functions() {
        let rules = Rules::<Counter, u8>::builder()
            .actions(|state| if state.value < 3 { vec![1, 2] } else { vec![] })
            .apply(|state, step| Counter {
                value: state.value + step,
                player: !state.player,
            })
            .is_terminal(|state| state.value >= 3)
            .reward(|state, player| {
                if state.player == player {
                    GameResult::Win.reward()
                } else {
                    GameResult::Loss.reward()
                }
            })
            .build()
            .expect("all rules are provided");

        let start = Counter {
            value: 0,
            player: Player::Second,
        };
        assert_eq!(rules.actions(&start), vec![1, 2]);
        let next = rules.apply(&start, &2);
        assert_eq!(next.value, 2);
        assert_eq!(next.player(), Player::First);
        assert!(!rules.is_terminal(&next));
        let last = rules.apply(&next, &1);
        assert!(rules.is_terminal(&last));
        assert!(rules.reward(&last, Player::Second) > 0.0);
        // Lookahead as the other side does not touch the original state.
        assert_eq!(last.with_player(Player::First).player(), Player::First);
        assert_eq!(last.player(), Player::Second);
    }

    #[test]
    fn missing_rule_is_reported() {
        let error = Rules::<Counter, u8>::builder()
            .actions(|_| vec![])
            .apply(|state, _| state.clone())
            .reward(|_, _| 0.0)
            .build()
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "rules are missing the `is_terminal` function"
        );
    }
}
