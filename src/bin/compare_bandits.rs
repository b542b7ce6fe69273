//! Compare every bandit agent over many randomly generated bandits.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin compare_bandits -- --num-steps 1000 --num-repeats 100
//! ```
//!
//! Results are saved as JSON so the charts can be regenerated later with
//! `--load-data-filename` without re-running the agents.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use armlab::{
    AgentKind, AgentResult, ChartSink, JsonChartSink, ResultFile, RunConfig, Seeder,
    comparison_charts, init_logging, run_comparison,
};

/// CLI arguments for the agent comparison.
#[derive(Parser, Debug)]
#[command(name = "compare-bandits")]
#[command(about = "Compare bandit algorithms")]
struct Args {
    /// Directory in which results and charts are saved
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// File in which new results are saved (ignored with --load-data-filename)
    #[arg(long)]
    save_data_filename: Option<PathBuf>,

    /// Load results from this file and chart them instead of running agents
    #[arg(long)]
    load_data_filename: Option<PathBuf>,

    /// Don't save results
    #[arg(long)]
    no_save: bool,

    /// Don't write charts
    #[arg(long)]
    no_plot: bool,

    /// Number of time steps to simulate for each rollout
    #[arg(long, default_value = "1000")]
    num_steps: usize,

    /// Number of different environments in which to test each agent
    #[arg(long, default_value = "100")]
    num_repeats: usize,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Saved comparison: agent results, number of steps, number of repeats
type ResultData = (Vec<AgentResult>, usize, usize);

fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    // Loaded runs keep their own sizes, which also name the default directory.
    let loaded = match &args.load_data_filename {
        Some(path) => {
            let (results, num_steps, num_repeats): ResultData = ResultFile::new(path)
                .load()
                .with_context(|| format!("loading results from {}", path.display()))?;
            args.num_steps = num_steps;
            args.num_repeats = num_repeats;
            Some(results)
        }
        None => None,
    };

    let config = RunConfig {
        num_steps: args.num_steps,
        num_repeats: args.num_repeats,
        ..RunConfig::default()
    };
    let results_dir = args.results_dir.clone().unwrap_or_else(|| {
        PathBuf::from("results")
            .join("bandit")
            .join(format!("{}_repeats_{}_steps", config.num_repeats, config.num_steps))
    });

    let results = match loaded {
        Some(results) => results,
        None => {
            let start = Instant::now();
            let results = run_comparison(&AgentKind::defaults(), &config, &mut Seeder::default())?;
            info!(elapsed = ?start.elapsed(), "finished comparison");

            if !args.no_save {
                let path = args
                    .save_data_filename
                    .clone()
                    .unwrap_or_else(|| results_dir.join("bandit_data.json"));
                let data: ResultData = (results, config.num_steps, config.num_repeats);
                ResultFile::new(&path).save(&data)?;
                info!(path = %path.display(), "saved results");
                data.0
            } else {
                results
            }
        }
    };

    for result in &results {
        info!(agent = %result.name, mean_reward = result.mean_reward(), "agent summary");
    }

    if !args.no_plot {
        info!("plotting results");
        let mut sink = JsonChartSink::new(&results_dir);
        for chart in comparison_charts(&results, &config) {
            let path = sink.render(&chart)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
