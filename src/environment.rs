//! Stationary K-armed bandit environment.

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::agent::Action;

/// Stationary stochastic reward source over `K` actions
///
/// Action values are drawn from `Normal(mean_reward, 1)` at construction and
/// fixed afterwards. Every call to [`KArmedBandit::step`] returns an
/// independent `Normal(action_value, 1)` sample.
#[derive(Clone)]
pub struct KArmedBandit<R = StdRng> {
    action_values: Vec<f64>,
    optimal_actions: Vec<Action>,
    rng: R,
}

impl<R> std::fmt::Debug for KArmedBandit<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KArmedBandit")
            .field("action_values", &self.action_values)
            .field("optimal_actions", &self.optimal_actions)
            .finish()
    }
}

impl<R: Rng> KArmedBandit<R> {
    /// Creates a bandit with `k` actions whose values are centred on zero
    #[must_use]
    pub fn new(k: usize, rng: R) -> Self {
        Self::with_mean_reward(k, 0.0, rng)
    }

    /// Creates a bandit with `k` actions whose values are centred on `mean_reward`
    #[must_use]
    pub fn with_mean_reward(k: usize, mean_reward: f64, mut rng: R) -> Self {
        assert!(k > 0, "at least one action is required");
        let action_values: Vec<f64> = (0..k)
            .map(|_| mean_reward + rng.sample::<f64, _>(StandardNormal))
            .collect();
        Self::from_action_values(action_values, rng)
    }

    /// Creates a bandit with the given action values
    #[must_use]
    pub fn from_action_values(action_values: Vec<f64>, rng: R) -> Self {
        assert!(!action_values.is_empty(), "at least one action is required");
        let best = action_values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let optimal_actions = action_values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == best)
            .map(|(action, _)| action)
            .collect();
        Self {
            action_values,
            optimal_actions,
            rng,
        }
    }

    /// Sample a reward for taking `action`
    ///
    /// # Panics
    /// Panics if `action` is not a valid action index.
    pub fn step(&mut self, action: Action) -> f64 {
        let value = self.action_values[action];
        value + self.rng.sample::<f64, _>(StandardNormal)
    }
}

impl<R> KArmedBandit<R> {
    /// Number of actions
    pub fn num_actions(&self) -> usize {
        self.action_values.len()
    }

    /// The fixed value of every action
    pub fn action_values(&self) -> &[f64] {
        &self.action_values
    }

    /// Every action attaining the maximum value
    pub fn optimal_actions(&self) -> &[Action] {
        &self.optimal_actions
    }

    /// Whether `action` attains the maximum value (ties are all optimal)
    ///
    /// # Panics
    /// Panics if `action` is not a valid action index.
    pub fn is_optimal_action(&self, action: Action) -> bool {
        assert!(
            action < self.action_values.len(),
            "action {action} out of range for {} actions",
            self.action_values.len()
        );
        self.optimal_actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_optimal_action_agrees_with_max() {
        let env = KArmedBandit::new(10, StdRng::seed_from_u64(42));
        let best = env
            .action_values()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        assert!(!env.optimal_actions().is_empty());
        for action in 0..env.num_actions() {
            assert_eq!(
                env.is_optimal_action(action),
                env.action_values()[action] == best
            );
        }
    }

    #[test]
    fn test_ties_are_all_optimal() {
        let env = KArmedBandit::from_action_values(vec![1.0, 3.0, 3.0, 0.5], StdRng::seed_from_u64(0));
        assert_eq!(env.optimal_actions(), &[1, 2]);
        assert!(env.is_optimal_action(1));
        assert!(env.is_optimal_action(2));
        assert!(!env.is_optimal_action(0));
    }

    #[test]
    fn test_mean_reward_offset() {
        let env = KArmedBandit::with_mean_reward(200, 50.0, StdRng::seed_from_u64(7));
        let mean = env.action_values().iter().sum::<f64>() / 200.0;
        assert!((mean - 50.0).abs() < 0.5);
    }

    #[test]
    #[should_panic]
    fn test_step_out_of_range() {
        let mut env = KArmedBandit::new(3, StdRng::seed_from_u64(0));
        env.step(3);
    }
}
