use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::agent::{Action, Agent};

/// Epsilon-greedy agent with sample-average value estimates
///
/// With probability `epsilon` a uniformly random action is taken, otherwise
/// the agent picks uniformly among the actions tied for the highest current
/// estimate. Estimates are incremental means of the rewards received.
#[derive(Clone)]
pub struct EpsilonGreedy<R = StdRng> {
    epsilon: f64,
    estimates: Vec<f64>,
    visit_counts: Vec<u64>,
    rng: R,
}

impl<R> std::fmt::Debug for EpsilonGreedy<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpsilonGreedy")
            .field("epsilon", &self.epsilon)
            .field("estimates", &self.estimates)
            .field("visit_counts", &self.visit_counts)
            .finish()
    }
}

impl<R: Rng> EpsilonGreedy<R> {
    /// Creates a new agent over `num_actions` actions with all estimates at zero
    #[must_use]
    pub fn new(epsilon: f64, num_actions: usize, rng: R) -> Self {
        Self::with_initial_estimates(epsilon, vec![0.0; num_actions], rng)
    }

    /// Creates a new agent with caller-supplied initial value estimates
    ///
    /// Optimistic initial estimates encourage early exploration.
    #[must_use]
    pub fn with_initial_estimates(epsilon: f64, estimates: Vec<f64>, rng: R) -> Self {
        assert!(
            (0.0..=1.0).contains(&epsilon),
            "epsilon must be between 0 and 1"
        );
        assert!(!estimates.is_empty(), "at least one action is required");
        let num_actions = estimates.len();
        Self {
            epsilon,
            estimates,
            visit_counts: vec![0; num_actions],
            rng,
        }
    }

    /// Gets the exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Gets the current value estimate of every action
    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    /// Actions whose estimate equals the current maximum
    pub fn greedy_actions(&self) -> Vec<Action> {
        let best = self
            .estimates
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        self.estimates
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == best)
            .map(|(action, _)| action)
            .collect()
    }

    fn select(&mut self) -> Action {
        let r: f64 = self.rng.random_range(0.0..1.0);
        let action = if r < self.epsilon {
            self.rng.random_range(0..self.estimates.len())
        } else {
            let greedy = self.greedy_actions();
            // NaN estimates leave no greedy action; fall back to exploring
            match greedy.choose(&mut self.rng) {
                Some(&action) => action,
                None => self.rng.random_range(0..self.estimates.len()),
            }
        };
        self.visit_counts[action] += 1;
        action
    }

    fn check_action(&self, action: Action) {
        assert!(
            action < self.estimates.len(),
            "action {action} out of range for {} actions",
            self.estimates.len()
        );
        assert!(
            self.visit_counts[action] > 0,
            "update called for action {action} before it was chosen"
        );
    }
}

impl<R: Rng> Agent for EpsilonGreedy<R> {
    fn choose_action(&mut self) -> Action {
        self.select()
    }

    fn update(&mut self, action: Action, reward: f64) {
        self.check_action(action);
        let n = self.visit_counts[action] as f64;
        self.estimates[action] += (reward - self.estimates[action]) / n;
    }

    fn name(&self) -> String {
        format!("ε-greedy (ε={:.2})", self.epsilon)
    }

    fn visit_counts(&self) -> &[u64] {
        &self.visit_counts
    }
}

/// Epsilon-greedy agent with a constant step size
///
/// Action selection is identical to [`EpsilonGreedy`], but estimates are
/// exponentially-weighted averages with step size `alpha`, which favours
/// recent rewards.
#[derive(Clone)]
pub struct EpsilonGreedyConstantStepSize<R = StdRng> {
    inner: EpsilonGreedy<R>,
    step_size: f64,
}

impl<R> std::fmt::Debug for EpsilonGreedyConstantStepSize<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpsilonGreedyConstantStepSize")
            .field("epsilon", &self.inner.epsilon)
            .field("step_size", &self.step_size)
            .field("estimates", &self.inner.estimates)
            .field("visit_counts", &self.inner.visit_counts)
            .finish()
    }
}

impl<R: Rng> EpsilonGreedyConstantStepSize<R> {
    /// Creates a new agent over `num_actions` actions with all estimates at zero
    #[must_use]
    pub fn new(epsilon: f64, step_size: f64, num_actions: usize, rng: R) -> Self {
        Self::with_initial_estimates(epsilon, step_size, vec![0.0; num_actions], rng)
    }

    /// Creates a new agent with caller-supplied initial value estimates
    #[must_use]
    pub fn with_initial_estimates(
        epsilon: f64,
        step_size: f64,
        estimates: Vec<f64>,
        rng: R,
    ) -> Self {
        assert!(
            step_size > 0.0 && step_size <= 1.0,
            "step_size must be in (0, 1]"
        );
        Self {
            inner: EpsilonGreedy::with_initial_estimates(epsilon, estimates, rng),
            step_size,
        }
    }

    /// Gets the exploration rate
    pub fn epsilon(&self) -> f64 {
        self.inner.epsilon
    }

    /// Gets the step size
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Gets the current value estimate of every action
    pub fn estimates(&self) -> &[f64] {
        &self.inner.estimates
    }
}

impl<R: Rng> Agent for EpsilonGreedyConstantStepSize<R> {
    fn choose_action(&mut self) -> Action {
        self.inner.select()
    }

    fn update(&mut self, action: Action, reward: f64) {
        self.inner.check_action(action);
        let estimate = &mut self.inner.estimates[action];
        *estimate += self.step_size * (reward - *estimate);
    }

    fn name(&self) -> String {
        format!(
            "ε-greedy (ε={:.2}, α={:.2})",
            self.inner.epsilon, self.step_size
        )
    }

    fn visit_counts(&self) -> &[u64] {
        &self.inner.visit_counts
    }
}
