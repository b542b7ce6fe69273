//! Gaussian posterior-sampling (Thompson sampling) agents.
//!
//! Each action value has a Gaussian likelihood estimated sequentially from the
//! rewards received for that action. A single Gaussian prior is shared by all
//! action values and re-estimated after every reward. Actions are chosen by
//! drawing one sample from every action's posterior and acting greedily on
//! the samples.
//!
//! Two prior strategies are provided:
//!
//! - [`BroadPrior`]: the maximum likelihood Gaussian over every reward ever
//!   received. Better actions are taken more often, so this prior is
//!   optimistic and encourages exploration.
//! - [`ValuePrior`]: the mean and variance of the current likelihood means.
//!   Every action contributes equally, which pulls the prior towards
//!   average-case values and encourages exploitation.

use std::marker::PhantomData;

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::agent::{Action, Agent};

/// Mean and variance of the prior shared by all action values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SharedPrior {
    pub mean: f64,
    pub var: f64,
    mean_square: f64,
    step: u64,
}

/// Strategy for re-estimating the shared prior after each reward.
pub trait PriorStrategy {
    /// Label appended to the agent name
    const LABEL: &'static str;

    /// Returns the new prior given the reward just observed and the current
    /// likelihood means. A non-positive variance is rejected by the caller.
    fn next_prior(prior: &SharedPrior, reward: f64, likelihood_means: &[f64]) -> SharedPrior;
}

/// Prior fitted to every individual reward observed so far.
#[derive(Clone, Copy, Debug, Default)]
pub struct BroadPrior;

/// Prior fitted to the current per-action likelihood means.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValuePrior;

impl PriorStrategy for BroadPrior {
    const LABEL: &'static str = "broad prior";

    fn next_prior(prior: &SharedPrior, reward: f64, _likelihood_means: &[f64]) -> SharedPrior {
        let step = prior.step + 1;
        let mean = prior.mean + (reward - prior.mean) / step as f64;
        let mean_square = prior.mean_square + (reward * reward - prior.mean_square) / step as f64;
        SharedPrior {
            mean,
            var: mean_square - mean * mean,
            mean_square,
            step,
        }
    }
}

impl PriorStrategy for ValuePrior {
    const LABEL: &'static str = "value prior";

    fn next_prior(prior: &SharedPrior, _reward: f64, likelihood_means: &[f64]) -> SharedPrior {
        let (mean, var) = mean_and_variance(likelihood_means);
        SharedPrior {
            mean,
            var,
            mean_square: var + mean * mean,
            step: prior.step + 1,
        }
    }
}

/// Population mean and variance.
pub(crate) fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var)
}

#[derive(Clone, Debug)]
struct Likelihood {
    mean: f64,
    mean_square: f64,
    var: f64,
}

impl Default for Likelihood {
    fn default() -> Self {
        Self {
            mean: 0.0,
            mean_square: 0.0,
            var: 1.0,
        }
    }
}

/// Bayesian sampler over `K` actions, parameterised by its prior strategy.
///
/// Visit counts are incremented by [`Agent::update`], since they weight the
/// likelihood of each observed reward.
#[derive(Clone)]
pub struct BayesianSampler<P, R = StdRng> {
    likelihoods: Vec<Likelihood>,
    visit_counts: Vec<u64>,
    prior: SharedPrior,
    rng: R,
    _strategy: PhantomData<P>,
}

/// Bayesian sampler whose prior mirrors the unconditional reward distribution.
pub type BayesianSamplerBroadPrior<R = StdRng> = BayesianSampler<BroadPrior, R>;

/// Bayesian sampler whose prior is fitted to the per-action value estimates.
pub type BayesianSamplerValuePrior<R = StdRng> = BayesianSampler<ValuePrior, R>;

impl<P: PriorStrategy, R> std::fmt::Debug for BayesianSampler<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BayesianSampler")
            .field("prior_strategy", &P::LABEL)
            .field("prior", &self.prior)
            .field("likelihoods", &self.likelihoods)
            .field("visit_counts", &self.visit_counts)
            .finish()
    }
}

impl<P: PriorStrategy, R: Rng> BayesianSampler<P, R> {
    /// Creates a new sampler over `num_actions` actions with an empty prior
    #[must_use]
    pub fn new(num_actions: usize, rng: R) -> Self {
        assert!(num_actions > 0, "at least one action is required");
        Self {
            likelihoods: vec![Likelihood::default(); num_actions],
            visit_counts: vec![0; num_actions],
            prior: SharedPrior::default(),
            rng,
            _strategy: PhantomData,
        }
    }

    /// Gets the shared prior
    pub fn prior(&self) -> SharedPrior {
        self.prior
    }

    /// Gets the likelihood mean of every action
    pub fn likelihood_means(&self) -> Vec<f64> {
        self.likelihoods.iter().map(|l| l.mean).collect()
    }

    /// Gets the likelihood variance of every action
    pub fn likelihood_variances(&self) -> Vec<f64> {
        self.likelihoods.iter().map(|l| l.var).collect()
    }

    /// Gaussian posterior `(mean, variance)` over the value of `action`
    ///
    /// # Panics
    /// Panics if `action` is not a valid action index.
    pub fn posterior(&self, action: Action) -> (f64, f64) {
        let likelihood = &self.likelihoods[action];
        let n = self.visit_counts[action] as f64;
        let var = 1.0 / (n / likelihood.var + 1.0 / self.prior.var);
        let mean = var * (n * likelihood.mean / likelihood.var + self.prior.mean / self.prior.var);
        (mean, var)
    }
}

impl<P: PriorStrategy, R: Rng> Agent for BayesianSampler<P, R> {
    fn choose_action(&mut self) -> Action {
        if self.prior.var == 0.0 {
            return self.rng.random_range(0..self.likelihoods.len());
        }

        let mut best = (0, f64::NEG_INFINITY);
        for action in 0..self.likelihoods.len() {
            let (mean, var) = self.posterior(action);
            let z: f64 = self.rng.sample(StandardNormal);
            let sample = mean + var.sqrt() * z;
            if sample > best.1 {
                best = (action, sample);
            }
        }
        best.0
    }

    fn update(&mut self, action: Action, reward: f64) {
        assert!(
            action < self.likelihoods.len(),
            "action {action} out of range for {} actions",
            self.likelihoods.len()
        );
        self.visit_counts[action] += 1;
        let n = self.visit_counts[action] as f64;

        let likelihood = &mut self.likelihoods[action];
        likelihood.mean += (reward - likelihood.mean) / n;
        likelihood.mean_square += (reward * reward - likelihood.mean_square) / n;
        let var = likelihood.mean_square - likelihood.mean * likelihood.mean;

        let means = self.likelihood_means();
        let (_, spread) = mean_and_variance(&means);
        let likelihood = &mut self.likelihoods[action];
        if var > 0.0 {
            likelihood.var = var;
        } else if spread > 0.0 {
            // A single observation (or identical rewards) gives zero width
            likelihood.var = spread;
        }

        let mut next = P::next_prior(&self.prior, reward, &means);
        if next.var <= 0.0 {
            next.var = if spread > 0.0 { spread } else { self.prior.var };
        }
        self.prior = next;
    }

    fn name(&self) -> String {
        format!("Bayesian sampler ({})", P::LABEL)
    }

    fn visit_counts(&self) -> &[u64] {
        &self.visit_counts
    }
}
