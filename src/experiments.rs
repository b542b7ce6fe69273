//! Bandit agents as sweepable experiments.

use crate::environment::KArmedBandit;
use crate::error::{ArmlabError, Result};
use crate::runner::{AgentKind, run_episode};
use crate::seeder::Seeder;
use crate::sweep::{Experiment, ParamAssignment};

/// Scores an agent's hyper-parameters by its mean reward over one episode
///
/// Each run creates a fresh environment and agent from the experiment's
/// seeder, so repeated runs of the same assignment see different bandits.
/// Parameters in the assignment override the hyper-parameters of `base`.
#[derive(Clone, Debug)]
pub struct BanditExperiment {
    base: AgentKind,
    num_steps: usize,
    num_actions: usize,
    mean_reward: f64,
    seeder: Seeder,
}

impl BanditExperiment {
    pub fn new(base: AgentKind, num_steps: usize, seeder: Seeder) -> Self {
        Self {
            base,
            num_steps,
            num_actions: 10,
            mean_reward: 0.0,
            seeder,
        }
    }

    /// Sets the number of actions of every bandit (10 by default)
    pub fn with_num_actions(mut self, num_actions: usize) -> Result<Self> {
        if num_actions == 0 {
            return Err(ArmlabError::InvalidParameter {
                message: "at least one action is required".into(),
            });
        }
        self.num_actions = num_actions;
        Ok(self)
    }

    pub fn with_mean_reward(mut self, mean_reward: f64) -> Self {
        self.mean_reward = mean_reward;
        self
    }

    pub fn base(&self) -> &AgentKind {
        &self.base
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }
}

impl Experiment for BanditExperiment {
    fn run(&mut self, params: &ParamAssignment) -> anyhow::Result<f64> {
        let kind = self.base.with_params(params)?;
        // Validates the action count before the environment asserts on it
        let mut agent = kind.build(self.num_actions, self.seeder.get_rng("agent"))?;
        let mut env = KArmedBandit::with_mean_reward(
            self.num_actions,
            self.mean_reward,
            self.seeder.get_rng("environment"),
        );
        let (rewards, _) = run_episode(&mut agent, &mut env, self.num_steps);
        if rewards.is_empty() {
            anyhow::bail!("an episode needs at least one step");
        }
        Ok(rewards.iter().sum::<f64>() / rewards.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{ParamSweeper, Parameter, SweepConfig};

    #[test]
    fn test_scores_mean_reward() {
        let mut experiment =
            BanditExperiment::new(AgentKind::EpsilonGreedy { epsilon: 0.1 }, 200, Seeder::new(3))
                .with_mean_reward(5.0);
        let params: ParamAssignment = [("epsilon", 0.05)].into_iter().collect();
        let score = experiment.run(&params).unwrap();
        // Action values are drawn around the mean reward.
        assert!(score > 2.0 && score < 8.0, "score {score}");
    }

    #[test]
    fn test_repeats_see_fresh_bandits() {
        let mut experiment =
            BanditExperiment::new(AgentKind::GradientBandit { step_size: 0.5 }, 20, Seeder::new(9));
        let params = ParamAssignment::new();
        let first = experiment.run(&params).unwrap();
        let second = experiment.run(&params).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_parameters_fail_the_run() {
        let mut experiment =
            BanditExperiment::new(AgentKind::EpsilonGreedy { epsilon: 0.1 }, 20, Seeder::new(1));
        let params: ParamAssignment = [("step_size", 0.5)].into_iter().collect();
        let err = experiment.run(&params).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArmlabError>(),
            Some(ArmlabError::InvalidParameter { .. })
        ));

        let params: ParamAssignment = [("epsilon", 3.0)].into_iter().collect();
        assert!(experiment.run(&params).is_err());
    }

    #[test]
    fn test_zero_steps_fail() {
        let mut experiment =
            BanditExperiment::new(AgentKind::BayesianSamplerBroadPrior, 0, Seeder::new(1));
        assert!(experiment.run(&ParamAssignment::new()).is_err());
    }

    #[test]
    fn test_zero_actions_rejected() {
        let experiment =
            BanditExperiment::new(AgentKind::EpsilonGreedy { epsilon: 0.1 }, 20, Seeder::new(1));
        assert!(matches!(
            experiment.clone().with_num_actions(0),
            Err(ArmlabError::InvalidParameter { .. })
        ));
        assert!(experiment.with_num_actions(3).is_ok());
    }

    #[test]
    fn test_zero_action_trials_fail_without_aborting_sweep() {
        let mut experiment =
            BanditExperiment::new(AgentKind::EpsilonGreedy { epsilon: 0.1 }, 20, Seeder::new(1));
        experiment.num_actions = 0;
        let config = SweepConfig {
            n_repeats: 2,
            verbose: false,
            ..SweepConfig::default()
        };
        let mut sweeper = ParamSweeper::new(experiment, config);
        sweeper
            .add_parameter(Parameter::new("epsilon", 0.1, [0.05, 0.1, 0.2]).unwrap())
            .unwrap();

        let results = sweeper.sweep_parameter("epsilon").unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.values().all(Vec::is_empty));
        assert!(sweeper.results().values().all(Vec::is_empty));
        assert_eq!(
            sweeper.parameter("epsilon").unwrap().default_value(),
            &crate::sweep::ParamValue::from(0.1)
        );
    }
}
