//! Sweep the hyper-parameters of each tunable bandit agent.
//!
//! Each sweep searches for the parameters giving the highest mean reward
//! and writes one chart per parameter.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin sweep_bandits -- --num-values 20 --max-passes 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use tracing::info;

use armlab::{
    AgentKind, BanditExperiment, JsonChartSink, ParamSweeper, Parameter, Seeder, SweepConfig,
    init_logging,
};

/// CLI arguments for the parameter sweeps.
#[derive(Parser, Debug)]
#[command(name = "sweep-bandits")]
#[command(about = "Find approximately optimal parameters for each bandit algorithm")]
struct Args {
    /// Directory in which charts are saved
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Number of time steps to simulate for each rollout
    #[arg(long, default_value = "1000")]
    num_steps: usize,

    /// Number of repeats for every parameter assignment
    #[arg(long, default_value = "100")]
    num_repeats: usize,

    /// Number of different values to test for each parameter
    #[arg(long, default_value = "20")]
    num_values: usize,

    /// Give up after this many passes over the parameters
    #[arg(long)]
    max_passes: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// One agent family to sweep, with the parameters and ranges to search
struct SweepJob {
    name: &'static str,
    dir_name: &'static str,
    base: AgentKind,
    parameters: Vec<(&'static str, f64, f64)>,
}

fn jobs() -> Vec<SweepJob> {
    vec![
        SweepJob {
            name: "Epsilon greedy",
            dir_name: "Epsilon_greedy",
            base: AgentKind::EpsilonGreedy { epsilon: 0.1 },
            parameters: vec![("epsilon", 0.01, 0.6)],
        },
        SweepJob {
            name: "Epsilon greedy (constant step size)",
            dir_name: "Epsilon_greedy_constant_step_size",
            base: AgentKind::EpsilonGreedyConstantStepSize {
                epsilon: 0.1,
                step_size: 0.1,
            },
            parameters: vec![("epsilon", 0.01, 0.6), ("step_size", 0.01, 1.0)],
        },
        SweepJob {
            name: "Gradient bandit",
            dir_name: "Gradient_bandit",
            base: AgentKind::GradientBandit { step_size: 0.1 },
            parameters: vec![("step_size", 0.01, 1.0)],
        },
    ]
}

fn run_job(job: SweepJob, args: &Args, results_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let experiment = BanditExperiment::new(job.base, args.num_steps, Seeder::default());
    let config = SweepConfig {
        n_repeats: args.num_repeats,
        print_every: 50,
        max_passes: args.max_passes,
        ..SweepConfig::default()
    };
    let mut sweeper = ParamSweeper::new(experiment, config);
    for (name, lo, hi) in job.parameters {
        sweeper.add_parameter(
            Parameter::builder(name, 0.1)
                .bounds(lo, hi)
                .num_values(args.num_values)
                .log_space(true)
                .build()?,
        )?;
    }

    let best = sweeper.find_best_parameters()?;
    info!(experiment = job.name, best = %best, "sweep finished");
    let mut sink = JsonChartSink::new(results_dir.join(job.dir_name));
    Ok(sweeper.plot(job.name, &mut sink)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let results_dir = args.results_dir.clone().unwrap_or_else(|| {
        PathBuf::from("results")
            .join("param_sweeps")
            .join("bandit")
            .join(format!(
                "{}_repeats_{}_steps_{}_values",
                args.num_repeats, args.num_steps, args.num_values
            ))
    });

    let start = Instant::now();
    let mut paths = Vec::new();
    for job in jobs() {
        paths.extend(run_job(job, &args, &results_dir)?);
    }
    info!(elapsed = ?start.elapsed(), "finished all sweeps");

    println!("Charts saved with the following filenames:");
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
