//! Tune the epsilon-greedy agents on a handful of bandits and compare the
//! tuned agents against the defaults.
//!
//! ```bash
//! cargo run --example quick_sweep
//! ```

use armlab::{
    AgentKind, BanditExperiment, ParamSweeper, Parameter, RunConfig, Seeder, SweepConfig,
    init_logging, run_comparison,
};

fn main() -> anyhow::Result<()> {
    init_logging(None)?;

    let base = AgentKind::EpsilonGreedyConstantStepSize {
        epsilon: 0.1,
        step_size: 0.1,
    };
    let experiment = BanditExperiment::new(base.clone(), 200, Seeder::new(1));
    let config = SweepConfig {
        n_repeats: 10,
        verbose: false,
        max_passes: Some(5),
        ..SweepConfig::default()
    };
    let mut sweeper = ParamSweeper::new(experiment, config);
    sweeper.add_parameter(
        Parameter::builder("epsilon", 0.1)
            .bounds(0.01, 0.6)
            .num_values(6)
            .log_space(true)
            .build()?,
    )?;
    sweeper.add_parameter(
        Parameter::builder("step_size", 0.1)
            .bounds(0.01, 1.0)
            .num_values(6)
            .log_space(true)
            .build()?,
    )?;

    let best = sweeper.find_best_parameters()?;
    println!("Best parameters: {best}");

    // Narrow the search around the best values and go again
    sweeper.tighten_ranges(5)?;
    let best = sweeper.find_best_parameters()?;
    println!("Best parameters after tightening: {best}");
    println!("Experiments run: {}", sweeper.num_experiments());

    let tuned = base.with_params(&best)?;
    let run = RunConfig {
        num_steps: 500,
        num_repeats: 20,
        ..RunConfig::default()
    };
    for result in run_comparison(&[base, tuned], &run, &mut Seeder::new(2))? {
        println!("{:<40} mean reward {:.3}", result.name, result.mean_reward());
    }
    Ok(())
}
