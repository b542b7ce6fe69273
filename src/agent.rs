//! Agent trait definition for multi-armed bandit algorithms

/// Index of one of the `K` actions available to an agent.
pub type Action = usize;

/// Capability interface shared by every bandit agent
///
/// Agents own their random number generator, which is injected at
/// construction so that runs can be reproduced from a seed and so that
/// several agents in one run draw from independent streams.
///
/// The trait is object-safe, allowing `Box<dyn Agent>` to be used when the
/// agent type is selected at runtime (see [`crate::AgentKind`]).
pub trait Agent {
    /// Choose the next action to take
    ///
    /// Every call must be followed by exactly one call to [`Agent::update`]
    /// for the returned action before the next call to `choose_action`.
    fn choose_action(&mut self) -> Action;

    /// Update the agent with the reward observed after taking `action`
    ///
    /// # Panics
    /// Panics if `action` is not a valid action index.
    fn update(&mut self, action: Action, reward: f64);

    /// Human-readable name, used for labelling results and charts
    fn name(&self) -> String;

    /// Number of times each action has been taken
    ///
    /// Every `choose_action` + `update` pair adds exactly one visit, but the
    /// point at which it is counted differs: the epsilon-greedy and gradient
    /// agents count an action when it is chosen, while the Bayesian samplers
    /// count it when its reward arrives in `update`. An unanswered
    /// `choose_action` is therefore visible in the counts of the former only.
    fn visit_counts(&self) -> &[u64];

    /// Number of actions this agent chooses between
    fn num_actions(&self) -> usize {
        self.visit_counts().len()
    }
}

impl<T: Agent + ?Sized> Agent for Box<T> {
    fn choose_action(&mut self) -> Action {
        (**self).choose_action()
    }

    fn update(&mut self, action: Action, reward: f64) {
        (**self).update(action, reward)
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn visit_counts(&self) -> &[u64] {
        (**self).visit_counts()
    }

    fn num_actions(&self) -> usize {
        (**self).num_actions()
    }
}
