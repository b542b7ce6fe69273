//! Armlab: a test harness for k-armed bandit agents.
//!
//! The crate provides a stationary Gaussian k-armed bandit environment, a
//! family of agents (ε-greedy, gradient bandit and Bayesian Thompson-style
//! samplers), a runner that compares agents over many repeats, and a
//! coordinate-ascent parameter sweeper that tunes any scored experiment.
//!
//! # Quick Start
//!
//! ```
//! use armlab::prelude::*;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut env = KArmedBandit::new(5, StdRng::seed_from_u64(1));
//! let mut agent = EpsilonGreedy::new(0.1, 5, StdRng::seed_from_u64(2));
//!
//! for _ in 0..100 {
//!     let action = agent.choose_action();
//!     let reward = env.step(action);
//!     agent.update(action, reward);
//! }
//! assert_eq!(agent.visit_counts().iter().sum::<u64>(), 100);
//!
//! // Tune a parameter of any scored experiment
//! let experiment = |params: &ParamAssignment| -> anyhow::Result<f64> {
//!     let x = params.get_f64("x")?;
//!     Ok(-(x - 3.0) * (x - 3.0))
//! };
//! let config = SweepConfig { n_repeats: 1, verbose: false, ..SweepConfig::default() };
//! let mut sweeper = ParamSweeper::new(experiment, config);
//! sweeper.add_parameter(Parameter::new("x", 0.0, [0.0, 1.0, 2.0, 3.0, 4.0]).unwrap()).unwrap();
//! let best = sweeper.find_best_parameters().unwrap();
//! assert_eq!(best.get_f64("x").unwrap(), 3.0);
//! ```

mod agent;
pub mod agents;
mod environment;
mod error;
mod experiments;
mod logging;
mod persistence;
pub mod plot;
mod runner;
mod seeder;
pub mod sweep;

// Re-export main types
pub use agent::{Action, Agent};
pub use environment::KArmedBandit;
pub use error::{ArmlabError, Result};
pub use experiments::BanditExperiment;
pub use logging::init_logging;
pub use persistence::ResultFile;
pub use plot::{AxisProperties, Chart, ChartSink, JsonChartSink, Series};
pub use runner::{AgentKind, AgentResult, RunConfig, comparison_charts, run_comparison, run_episode};
pub use seeder::Seeder;
pub use sweep::{
    Experiment, ParamAssignment, ParamSweeper, ParamValue, Parameter, SweepConfig, TrialOutcome,
};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use armlab::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agents::{
        BayesianSamplerBroadPrior, BayesianSamplerValuePrior, EpsilonGreedy,
        EpsilonGreedyConstantStepSize, GradientBandit,
    };
    pub use crate::sweep::{Experiment, ParamAssignment, ParamSweeper, Parameter, SweepConfig};
    pub use crate::{Action, Agent, ArmlabError, KArmedBandit, Result, Seeder};
}
