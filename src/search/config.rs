use std::f64::consts::SQRT_2;
use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::bail;

use crate::search::simulate::Rollout;

/// Parameters of the search. Everything except `duration` has a default.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Time budget of a single [`crate::Mcts::get_action`] call.
    pub duration: Duration,
    /// Exploration constant of [UCB1](crate::search::ucb::DefaultUcb1).
    /// Defaults to $\sqrt{2}$.
    pub exploration: f64,
    /// First-Play Urgency: a node with untried actions is expanded when its
    /// best child scores below this value. The default, `+inf`, expands every
    /// action before any child is revisited.
    pub fpu: f64,
    /// Multiplier applied to the reward per ply during backpropagation,
    /// `(0, 1]`. Defaults to `1` (no decay).
    pub decay: f64,
    /// Number of buckets of the transposition table. `None` (default) uses an
    /// unbounded map.
    pub buckets: Option<NonZeroUsize>,
    /// Rollout policy. Defaults to uniformly random moves.
    pub rollout: Rollout,
    /// How long [`crate::Mcts::get_action_async`] runs before yielding to the
    /// scheduler. Defaults to 30 ms.
    pub slice: Duration,
}

impl Config {
    /// Default parameters with the given time budget.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            exploration: SQRT_2,
            fpu: f64::INFINITY,
            decay: 1.0,
            buckets: None,
            rollout: Rollout::Random,
            slice: Duration::from_millis(30),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_fpu(mut self, fpu: f64) -> Self {
        self.fpu = fpu;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_buckets(mut self, buckets: NonZeroUsize) -> Self {
        self.buckets = Some(buckets);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_rollout(mut self, rollout: Rollout) -> Self {
        self.rollout = rollout;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.duration.is_zero() {
            bail!("search duration should be positive");
        }
        if self.slice.is_zero() {
            bail!("search slice should be positive");
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            bail!(
                "exploration constant should be a non-negative number, got {}",
                self.exploration
            );
        }
        if self.fpu.is_nan() {
            bail!("first-play urgency should be a number, got NaN");
        }
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            bail!("reward decay should be in (0, 1], got {}", self.decay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(Duration::from_millis(100))
    }

    #[test]
    fn defaults() {
        let config = config();
        assert!(config.validate().is_ok());
        assert!((config.exploration - 1.414).abs() < 1e-3);
        assert!(config.fpu.is_infinite());
        assert_eq!(config.buckets, None);
        assert_eq!(config.rollout, Rollout::Random);
        assert_eq!(config.slice, Duration::from_millis(30));
    }

    #[test]
    fn setters() {
        let config = config()
            .with_exploration(0.5)
            .with_fpu(1.0)
            .with_decay(0.9)
            .with_buckets(NonZeroUsize::new(1024).unwrap())
            .with_rollout(Rollout::AntiDecisive)
            .with_slice(Duration::from_millis(5));
        assert!(config.validate().is_ok());
        assert_eq!(config.buckets.map(NonZeroUsize::get), Some(1024));
        assert_eq!(config.rollout, Rollout::AntiDecisive);
    }

    #[test]
    fn rejects_invalid_parameters() {
        for (config, message) in [
            (
                Config::new(Duration::ZERO),
                "search duration should be positive",
            ),
            (
                config().with_slice(Duration::ZERO),
                "search slice should be positive",
            ),
            (
                config().with_exploration(-1.0),
                "exploration constant should be a non-negative number, got -1",
            ),
            (
                config().with_exploration(f64::NAN),
                "exploration constant should be a non-negative number, got NaN",
            ),
            (
                config().with_fpu(f64::NAN),
                "first-play urgency should be a number, got NaN",
            ),
            (
                config().with_decay(0.0),
                "reward decay should be in (0, 1], got 0",
            ),
            (
                config().with_decay(1.5),
                "reward decay should be in (0, 1], got 1.5",
            ),
        ] {
            assert_eq!(config.validate().unwrap_err().to_string(), message);
        }
    }
}
