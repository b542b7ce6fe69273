//! Bandit agents
//!
//! Five action-selection agents, all implementing [`crate::Agent`]:
//! sample-average and constant-step-size epsilon-greedy, the gradient bandit,
//! and two Gaussian posterior samplers that differ in how their shared prior
//! is estimated.

mod bayesian;
mod epsilon_greedy;
mod gradient;

pub use bayesian::{
    BayesianSampler, BayesianSamplerBroadPrior, BayesianSamplerValuePrior, BroadPrior,
    PriorStrategy, SharedPrior, ValuePrior,
};
pub use epsilon_greedy::{EpsilonGreedy, EpsilonGreedyConstantStepSize};
pub use gradient::{GradientBandit, softmax};

pub(crate) use bayesian::mean_and_variance;
