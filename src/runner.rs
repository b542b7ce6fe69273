//! Head-to-head comparison of bandit agents.
//!
//! Every repeat builds one fresh environment and runs each agent against it
//! for a fixed number of steps, recording the reward of every step and
//! whether the chosen action was optimal.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::agents::{
    BayesianSamplerBroadPrior, BayesianSamplerValuePrior, EpsilonGreedy,
    EpsilonGreedyConstantStepSize, GradientBandit, mean_and_variance,
};
use crate::environment::KArmedBandit;
use crate::error::{ArmlabError, Result};
use crate::plot::{AxisProperties, Chart, Series};
use crate::seeder::Seeder;
use crate::sweep::ParamAssignment;

/// Agent type and hyper-parameters, selected at runtime
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum AgentKind {
    EpsilonGreedy { epsilon: f64 },
    EpsilonGreedyConstantStepSize { epsilon: f64, step_size: f64 },
    GradientBandit { step_size: f64 },
    BayesianSamplerValuePrior,
    BayesianSamplerBroadPrior,
}

impl AgentKind {
    /// All five agents with their default hyper-parameters
    pub fn defaults() -> Vec<AgentKind> {
        vec![
            AgentKind::EpsilonGreedy { epsilon: 0.1 },
            AgentKind::EpsilonGreedyConstantStepSize {
                epsilon: 0.1,
                step_size: 0.1,
            },
            AgentKind::GradientBandit { step_size: 0.5 },
            AgentKind::BayesianSamplerValuePrior,
            AgentKind::BayesianSamplerBroadPrior,
        ]
    }

    /// Checks the hyper-parameters, which the agent constructors assert on
    pub fn validate(&self) -> Result<()> {
        let check_epsilon = |epsilon: f64| {
            if (0.0..=1.0).contains(&epsilon) {
                Ok(())
            } else {
                Err(ArmlabError::InvalidParameter {
                    message: format!("epsilon must be between 0 and 1, got {epsilon}"),
                })
            }
        };
        match *self {
            AgentKind::EpsilonGreedy { epsilon } => check_epsilon(epsilon),
            AgentKind::EpsilonGreedyConstantStepSize { epsilon, step_size } => {
                check_epsilon(epsilon)?;
                if step_size > 0.0 && step_size <= 1.0 {
                    Ok(())
                } else {
                    Err(ArmlabError::InvalidParameter {
                        message: format!("step_size must be in (0, 1], got {step_size}"),
                    })
                }
            }
            AgentKind::GradientBandit { step_size } => {
                if step_size > 0.0 && step_size.is_finite() {
                    Ok(())
                } else {
                    Err(ArmlabError::InvalidParameter {
                        message: format!("step_size must be positive, got {step_size}"),
                    })
                }
            }
            AgentKind::BayesianSamplerValuePrior | AgentKind::BayesianSamplerBroadPrior => Ok(()),
        }
    }

    /// Builds the agent over `num_actions` actions, driven by `rng`
    pub fn build(&self, num_actions: usize, rng: StdRng) -> Result<Box<dyn Agent>> {
        self.validate()?;
        if num_actions == 0 {
            return Err(ArmlabError::InvalidParameter {
                message: "at least one action is required".into(),
            });
        }
        let agent: Box<dyn Agent> = match *self {
            AgentKind::EpsilonGreedy { epsilon } => {
                Box::new(EpsilonGreedy::new(epsilon, num_actions, rng))
            }
            AgentKind::EpsilonGreedyConstantStepSize { epsilon, step_size } => Box::new(
                EpsilonGreedyConstantStepSize::new(epsilon, step_size, num_actions, rng),
            ),
            AgentKind::GradientBandit { step_size } => {
                Box::new(GradientBandit::new(step_size, num_actions, rng))
            }
            AgentKind::BayesianSamplerValuePrior => {
                Box::new(BayesianSamplerValuePrior::new(num_actions, rng))
            }
            AgentKind::BayesianSamplerBroadPrior => {
                Box::new(BayesianSamplerBroadPrior::new(num_actions, rng))
            }
        };
        Ok(agent)
    }

    /// The display name of the agent this kind builds
    pub fn name(&self) -> Result<String> {
        Ok(self.build(1, StdRng::seed_from_u64(0))?.name())
    }

    /// Overrides hyper-parameters with the values in `params`
    ///
    /// Every parameter in the assignment must be a hyper-parameter of this
    /// agent kind.
    pub fn with_params(&self, params: &ParamAssignment) -> Result<AgentKind> {
        let mut kind = self.clone();
        for (name, _) in params.iter() {
            let value = params.get_f64(name)?;
            match (&mut kind, name) {
                (AgentKind::EpsilonGreedy { epsilon }, "epsilon")
                | (AgentKind::EpsilonGreedyConstantStepSize { epsilon, .. }, "epsilon") => {
                    *epsilon = value;
                }
                (AgentKind::EpsilonGreedyConstantStepSize { step_size, .. }, "step_size")
                | (AgentKind::GradientBandit { step_size }, "step_size") => {
                    *step_size = value;
                }
                _ => {
                    return Err(ArmlabError::InvalidParameter {
                        message: format!("{self:?} has no parameter {name:?}"),
                    });
                }
            }
        }
        kind.validate()?;
        Ok(kind)
    }
}

/// Size of a comparison run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub num_steps: usize,
    pub num_repeats: usize,
    pub num_actions: usize,
    pub mean_reward: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_steps: 1000,
            num_repeats: 100,
            num_actions: 10,
            mean_reward: 0.0,
        }
    }
}

/// Reward and optimality traces of one agent kind across all repeats
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub kind: AgentKind,
    pub name: String,
    /// `rewards[repeat][step]`
    pub rewards: Vec<Vec<f64>>,
    /// `optimal[repeat][step]`: whether the chosen action was optimal
    pub optimal: Vec<Vec<bool>>,
}

impl AgentResult {
    fn new(kind: AgentKind, name: String) -> Self {
        Self {
            kind,
            name,
            rewards: Vec::new(),
            optimal: Vec::new(),
        }
    }

    fn num_steps(&self) -> usize {
        self.rewards.first().map_or(0, Vec::len)
    }

    fn per_step<T>(&self, rows: &[Vec<T>], f: impl Fn(Vec<&T>) -> f64) -> Vec<f64> {
        (0..self.num_steps())
            .map(|step| f(rows.iter().map(|row| &row[step]).collect()))
            .collect()
    }

    /// Mean reward at every step, across repeats
    pub fn mean_reward_per_step(&self) -> Vec<f64> {
        self.per_step(&self.rewards, |column| {
            let column: Vec<f64> = column.into_iter().copied().collect();
            mean_and_variance(&column).0
        })
    }

    /// Standard deviation of the reward at every step, across repeats
    pub fn std_reward_per_step(&self) -> Vec<f64> {
        self.per_step(&self.rewards, |column| {
            let column: Vec<f64> = column.into_iter().copied().collect();
            mean_and_variance(&column).1.sqrt()
        })
    }

    /// Percentage of repeats choosing an optimal action at every step
    pub fn percent_optimal_per_step(&self) -> Vec<f64> {
        self.per_step(&self.optimal, |column| {
            let hits = column.iter().filter(|hit| ***hit).count();
            100.0 * hits as f64 / column.len() as f64
        })
    }

    /// Mean reward over every step of every repeat
    pub fn mean_reward(&self) -> f64 {
        let all: Vec<f64> = self.rewards.iter().flatten().copied().collect();
        mean_and_variance(&all).0
    }
}

/// Runs an agent for `num_steps` against `env`, returning per-step rewards and optimality
pub fn run_episode<A: Agent + ?Sized>(
    agent: &mut A,
    env: &mut KArmedBandit,
    num_steps: usize,
) -> (Vec<f64>, Vec<bool>) {
    let mut rewards = Vec::with_capacity(num_steps);
    let mut optimal = Vec::with_capacity(num_steps);
    for _ in 0..num_steps {
        let action = agent.choose_action();
        let reward = env.step(action);
        agent.update(action, reward);
        rewards.push(reward);
        optimal.push(env.is_optimal_action(action));
    }
    (rewards, optimal)
}

/// Runs every agent kind against the same environment in each repeat
///
/// Environments and agents are seeded independently from `seeder`. Fails
/// with [`ArmlabError::InvalidParameter`] when the config asks for no
/// actions.
pub fn run_comparison(
    kinds: &[AgentKind],
    config: &RunConfig,
    seeder: &mut Seeder,
) -> Result<Vec<AgentResult>> {
    if config.num_actions == 0 {
        return Err(ArmlabError::InvalidParameter {
            message: "at least one action is required".into(),
        });
    }
    let mut results = kinds
        .iter()
        .map(|kind| Ok(AgentResult::new(kind.clone(), kind.name()?)))
        .collect::<Result<Vec<_>>>()?;

    for repeat in 0..config.num_repeats {
        if (repeat + 1) % 10 == 0 {
            info!(repeat = repeat + 1, num_repeats = config.num_repeats, "performing repeat");
        }
        let mut env = KArmedBandit::with_mean_reward(
            config.num_actions,
            config.mean_reward,
            seeder.get_rng(("environment", repeat)),
        );
        debug!(optimal_actions = ?env.optimal_actions(), "created environment");

        for result in &mut results {
            let rng = seeder.get_rng(("agent", result.name.as_str(), repeat));
            let mut agent = result.kind.build(config.num_actions, rng)?;
            let (rewards, optimal) = run_episode(&mut agent, &mut env, config.num_steps);
            result.rewards.push(rewards);
            result.optimal.push(optimal);
        }
    }

    Ok(results)
}

/// Builds the comparison charts: mean rewards, single rewards, mean ±σ,
/// percentage of optimal actions, and total mean reward per agent
pub fn comparison_charts(results: &[AgentResult], config: &RunConfig) -> Vec<Chart> {
    let t: Vec<f64> = (0..config.num_steps).map(|step| step as f64).collect();
    let sizes = format!("{} steps, {} repeats", config.num_steps, config.num_repeats);
    let k = config.num_actions;
    let reward_axis = |y_range: (f64, f64)| AxisProperties {
        xlabel: "Time".into(),
        ylabel: "Reward".into(),
        y_range: Some(y_range),
        ..AxisProperties::default()
    };

    let mean_lines: Vec<Series> = results
        .iter()
        .map(|result| Series::Line {
            label: format!("{} (mean reward)", result.name),
            x: t.clone(),
            y: result.mean_reward_per_step(),
        })
        .collect();

    let mut single_rewards = Vec::new();
    let mut mean_and_std = Vec::new();
    let mut optimal_lines = Vec::new();
    for (result, mean_line) in results.iter().zip(&mean_lines) {
        let (x, y): (Vec<f64>, Vec<f64>) = result
            .rewards
            .iter()
            .flat_map(|row| row.iter().enumerate().map(|(step, r)| (step as f64, *r)))
            .unzip();
        single_rewards.push(Series::Points {
            label: format!("{} (single reward)", result.name),
            x,
            y,
        });
        single_rewards.push(mean_line.clone());

        let mean = result.mean_reward_per_step();
        let std = result.std_reward_per_step();
        mean_and_std.push(mean_line.clone());
        mean_and_std.push(Series::Band {
            label: "±σ".into(),
            x: t.clone(),
            y_low: mean.iter().zip(&std).map(|(m, s)| m - s).collect(),
            y_high: mean.iter().zip(&std).map(|(m, s)| m + s).collect(),
        });

        optimal_lines.push(Series::Line {
            label: result.name.clone(),
            x: t.clone(),
            y: result.percent_optimal_per_step(),
        });
    }

    let mut bars: Vec<Series> = results
        .iter()
        .map(|result| Series::Bar {
            label: result.name.clone(),
            value: result.mean_reward(),
        })
        .collect();
    if let Some(best) = results
        .iter()
        .max_by(|a, b| a.mean_reward().total_cmp(&b.mean_reward()))
    {
        bars.push(Series::Marker {
            label: format!("Max reward ({})", best.name),
            x: None,
            y: Some(best.mean_reward()),
        });
    }

    vec![
        Chart {
            title: format!("{k}-armed bandit mean rewards ({sizes})"),
            series: mean_lines,
            axis: reward_axis((-2.0, 4.0)),
        },
        Chart {
            title: format!("{k}-armed bandit rewards ({sizes})"),
            series: single_rewards,
            axis: reward_axis((-2.0, 4.0)),
        },
        Chart {
            title: format!("{k}-armed bandit rewards (mean and variance, {sizes})"),
            series: mean_and_std,
            axis: reward_axis((-1.0, 4.0)),
        },
        Chart {
            title: format!("{k}-armed bandit percentage of optimal actions ({sizes})"),
            series: optimal_lines,
            axis: AxisProperties {
                xlabel: "Time".into(),
                ylabel: "% Optimal action".into(),
                y_range: Some((0.0, 100.0)),
                ..AxisProperties::default()
            },
        },
        Chart {
            title: format!("{k}-armed bandit total mean rewards ({sizes})"),
            series: bars,
            axis: AxisProperties {
                xlabel: "Agent type".into(),
                ylabel: "Mean reward".into(),
                ..AxisProperties::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_kinds_build() {
        for kind in AgentKind::defaults() {
            let agent = kind.build(4, StdRng::seed_from_u64(1)).unwrap();
            assert_eq!(agent.num_actions(), 4);
        }
        let names: Vec<String> = AgentKind::defaults()
            .iter()
            .map(|kind| kind.name().unwrap())
            .collect();
        assert_eq!(names[2], "Gradient bandit (α=0.50)");
        assert_eq!(names[4], "Bayesian sampler (broad prior)");
    }

    #[test]
    fn test_invalid_kinds_are_rejected() {
        let kind = AgentKind::EpsilonGreedy { epsilon: 2.0 };
        assert!(matches!(
            kind.build(3, StdRng::seed_from_u64(0)),
            Err(ArmlabError::InvalidParameter { .. })
        ));
        let kind = AgentKind::GradientBandit { step_size: 0.0 };
        assert!(kind.validate().is_err());
        assert!(AgentKind::BayesianSamplerBroadPrior.build(0, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_with_params() {
        let base = AgentKind::EpsilonGreedyConstantStepSize {
            epsilon: 0.1,
            step_size: 0.1,
        };
        let params: ParamAssignment = [("epsilon", 0.2), ("step_size", 0.5)].into_iter().collect();
        assert_eq!(
            base.with_params(&params).unwrap(),
            AgentKind::EpsilonGreedyConstantStepSize {
                epsilon: 0.2,
                step_size: 0.5
            }
        );

        let gradient = AgentKind::GradientBandit { step_size: 0.5 };
        let params: ParamAssignment = [("epsilon", 0.2)].into_iter().collect();
        assert!(gradient.with_params(&params).is_err());

        let params: ParamAssignment = [("epsilon", 1.5)].into_iter().collect();
        assert!(AgentKind::EpsilonGreedy { epsilon: 0.1 }.with_params(&params).is_err());
    }

    #[test]
    fn test_result_statistics() {
        let result = AgentResult {
            kind: AgentKind::BayesianSamplerBroadPrior,
            name: "agent".into(),
            rewards: vec![vec![1.0, 2.0], vec![3.0, 2.0]],
            optimal: vec![vec![true, false], vec![true, true]],
        };
        assert_eq!(result.mean_reward_per_step(), vec![2.0, 2.0]);
        assert_eq!(result.std_reward_per_step(), vec![1.0, 0.0]);
        assert_eq!(result.percent_optimal_per_step(), vec![100.0, 50.0]);
        assert_abs_diff_eq!(result.mean_reward(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_run_episode_counts() {
        let mut env = KArmedBandit::new(5, StdRng::seed_from_u64(2));
        let mut agent = EpsilonGreedy::new(0.1, 5, StdRng::seed_from_u64(3));
        let (rewards, optimal) = run_episode(&mut agent, &mut env, 50);
        assert_eq!(rewards.len(), 50);
        assert_eq!(optimal.len(), 50);
        assert_eq!(agent.visit_counts().iter().sum::<u64>(), 50);
    }
}
