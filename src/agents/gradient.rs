use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;

use crate::agent::{Action, Agent};

/// Gradient bandit agent
///
/// Keeps a numerical preference for every action and samples actions from the
/// softmax of those preferences. Preferences follow stochastic gradient
/// ascent on the expected reward, using the running mean reward as a
/// baseline.
///
/// The probability vector computed by [`Agent::choose_action`] is retained
/// and consumed by the following [`Agent::update`], so the two calls must
/// alternate: `update` panics unless its action is the one just chosen.
#[derive(Clone)]
pub struct GradientBandit<R = StdRng> {
    step_size: f64,
    preferences: Vec<f64>,
    probabilities: Vec<f64>,
    mean_reward: f64,
    step: u64,
    visit_counts: Vec<u64>,
    pending: Option<Action>,
    rng: R,
}

impl<R> std::fmt::Debug for GradientBandit<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientBandit")
            .field("step_size", &self.step_size)
            .field("preferences", &self.preferences)
            .field("mean_reward", &self.mean_reward)
            .field("step", &self.step)
            .finish()
    }
}

/// Numerically stable softmax: the maximum is subtracted before exponentiating.
pub fn softmax(preferences: &[f64]) -> Vec<f64> {
    let max = preferences
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = preferences.iter().map(|p| (p - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl<R: Rng> GradientBandit<R> {
    /// Creates a new gradient bandit with all preferences at zero
    #[must_use]
    pub fn new(step_size: f64, num_actions: usize, rng: R) -> Self {
        assert!(step_size > 0.0, "step_size must be positive");
        assert!(num_actions > 0, "at least one action is required");
        let preferences = vec![0.0; num_actions];
        Self {
            step_size,
            probabilities: softmax(&preferences),
            preferences,
            mean_reward: 0.0,
            step: 1,
            visit_counts: vec![0; num_actions],
            pending: None,
            rng,
        }
    }

    /// Gets the step size
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Gets the current action preferences
    pub fn preferences(&self) -> &[f64] {
        &self.preferences
    }

    /// Gets the probabilities used for the most recent action choice
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Gets the running mean reward used as the baseline
    pub fn baseline(&self) -> f64 {
        self.mean_reward
    }
}

impl<R: Rng> Agent for GradientBandit<R> {
    fn choose_action(&mut self) -> Action {
        self.probabilities = softmax(&self.preferences);
        let action = match WeightedIndex::new(&self.probabilities) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(err) => {
                tracing::warn!(%err, "degenerate action probabilities, choosing uniformly");
                self.rng.random_range(0..self.preferences.len())
            }
        };
        self.visit_counts[action] += 1;
        self.pending = Some(action);
        action
    }

    fn update(&mut self, action: Action, reward: f64) {
        assert!(
            action < self.preferences.len(),
            "action {action} out of range for {} actions",
            self.preferences.len()
        );
        assert_eq!(
            self.pending.take(),
            Some(action),
            "update called for action {action} without choosing it first"
        );
        self.mean_reward += (reward - self.mean_reward) / self.step as f64;
        self.step += 1;

        let inc = self.step_size * (reward - self.mean_reward);
        self.preferences[action] += inc;
        for (preference, p) in self.preferences.iter_mut().zip(&self.probabilities) {
            *preference -= inc * p;
        }
    }

    fn name(&self) -> String {
        format!("Gradient bandit (α={:.2})", self.step_size)
    }

    fn visit_counts(&self) -> &[u64] {
        &self.visit_counts
    }
}
