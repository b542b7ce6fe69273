use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agents::mean_and_variance;
use crate::error::{ArmlabError, Result};
use crate::plot::{AxisProperties, Chart, ChartSink, Series};
use crate::sweep::experiment::{Experiment, ParamAssignment, TrialOutcome};
use crate::sweep::parameter::{Parameter, value_range};
use crate::sweep::value::ParamValue;

/// Settings for a parameter sweep
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Number of times the experiment is run for every assignment
    pub n_repeats: usize,
    /// Number of standard deviations subtracted from (or added to) the mean score
    pub n_sigma: f64,
    /// Whether higher scores are better
    pub higher_is_better: bool,
    /// Log every `print_every`-th repeat result
    pub print_every: usize,
    /// Log every assignment and repeat result
    pub verbose: bool,
    /// Upper bound on the number of coordinate-ascent passes (unbounded by default)
    pub max_passes: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            n_repeats: 5,
            n_sigma: 1.0,
            higher_is_better: true,
            print_every: 1,
            verbose: true,
            max_passes: None,
        }
    }
}

/// Summary statistics of the results for one candidate value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueSummary {
    pub mean: f64,
    pub std: f64,
    /// Noise-penalised score: `mean - n_sigma * std` when higher is better,
    /// `mean + n_sigma * std` otherwise
    pub score: f64,
}

/// Coordinate-ascent search over the parameters of an experiment
///
/// Parameters are swept one at a time in the order they were added, holding
/// the others at their current defaults. Results are memoised per full
/// assignment, so revisiting an assignment from another parameter's sweep
/// does not run the experiment again. Failed runs are logged and left out;
/// an assignment whose runs all failed is recorded with an empty result list.
pub struct ParamSweeper<E> {
    experiment: E,
    config: SweepConfig,
    parameters: Vec<Parameter>,
    results: IndexMap<ParamAssignment, Vec<f64>>,
}

impl<E> std::fmt::Debug for ParamSweeper<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSweeper")
            .field("config", &self.config)
            .field("parameters", &self.parameters)
            .field("num_assignments", &self.results.len())
            .finish()
    }
}

impl<E: Experiment> ParamSweeper<E> {
    /// Creates a sweeper for `experiment`
    pub fn new(experiment: E, config: SweepConfig) -> Self {
        Self {
            experiment,
            config,
            parameters: Vec::new(),
            results: IndexMap::new(),
        }
    }

    /// Registers a parameter; parameters are swept in the order they are added
    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<()> {
        if self.parameter(parameter.name()).is_some() {
            return Err(ArmlabError::InvalidParameter {
                message: format!("parameter {:?} is already registered", parameter.name()),
            });
        }
        self.parameters.push(parameter);
        Ok(())
    }

    /// Gets the sweep settings
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Gets the registered parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Gets a registered parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Gets the experiment
    pub fn experiment(&self) -> &E {
        &self.experiment
    }

    /// Gets the experiment mutably
    pub fn experiment_mut(&mut self) -> &mut E {
        &mut self.experiment
    }

    /// The memo table: every assignment tried so far and its successful results
    pub fn results(&self) -> &IndexMap<ParamAssignment, Vec<f64>> {
        &self.results
    }

    /// Number of distinct assignments evaluated so far
    pub fn num_experiments(&self) -> usize {
        self.results.len()
    }

    /// The current default of every parameter
    pub fn defaults(&self) -> ParamAssignment {
        self.parameters
            .iter()
            .map(|p| (p.name().to_string(), p.default_value().clone()))
            .collect()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.parameters
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| ArmlabError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Repeats passes over every parameter until a pass changes no default
    ///
    /// Returns the final defaults. The search is local and depends on the
    /// order in which parameters were added. Without `max_passes` it runs
    /// until convergence; with it, [`ArmlabError::NotConverged`] is returned
    /// once that many passes have each changed some default.
    pub fn find_best_parameters(&mut self) -> Result<ParamAssignment> {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for index in 0..self.parameters.len() {
                info!(parameter = self.parameters[index].name(), pass = passes, "sweeping over parameter");
                changed |= self.sweep_index(index, true);
            }

            if !changed {
                info!(passes, "finished sweeping through parameters");
                break;
            }
            if let Some(max_passes) = self.config.max_passes {
                if passes >= max_passes {
                    warn!(passes, "parameter search stopped before converging");
                    return Err(ArmlabError::NotConverged { passes });
                }
            }
        }

        let best = self.defaults();
        info!(parameters = %best, "best parameters found");
        Ok(best)
    }

    /// Sweeps one parameter, updating its default to the best candidate value
    ///
    /// Returns the results for every candidate value.
    pub fn sweep_parameter(&mut self, name: &str) -> Result<IndexMap<ParamValue, Vec<f64>>> {
        let index = self.index_of(name)?;
        self.sweep_index(index, true);
        Ok(self.parameters[index].results().cloned().unwrap_or_default())
    }

    /// Evaluates every candidate value of one parameter without changing its default
    pub fn evaluate_parameter(&mut self, name: &str) -> Result<IndexMap<ParamValue, Vec<f64>>> {
        let index = self.index_of(name)?;
        self.sweep_index(index, false);
        Ok(self.parameters[index].results().cloned().unwrap_or_default())
    }

    /// Returns whether the parameter's default changed
    fn sweep_index(&mut self, index: usize, update_default: bool) -> bool {
        let mut assignment = self.defaults();
        let name = self.parameters[index].name().to_string();
        let values = self.parameters[index].values().to_vec();
        let mut value_results = IndexMap::with_capacity(values.len());

        for value in values {
            assignment.insert(name.clone(), value.clone());
            let results = match self.results.get(&assignment) {
                Some(results) => {
                    debug!(assignment = %assignment, "reusing memoised results");
                    results.clone()
                }
                None => {
                    let results = self.run_experiment(&assignment);
                    self.results.insert(assignment.clone(), results.clone());
                    results
                }
            };
            value_results.insert(value, results);
        }

        let mut changed = false;
        if update_default {
            match self.best_value(&value_results) {
                Some((best, summary)) if &best != self.parameters[index].default_value() => {
                    info!(
                        parameter = %name,
                        from = %self.parameters[index].default_value(),
                        to = %best,
                        objective = summary.score,
                        "parameter default value changing"
                    );
                    self.parameters[index].set_default(best);
                    changed = true;
                }
                Some(_) => {}
                None => warn!(parameter = %name, "every trial failed, default left unchanged"),
            }
        }

        self.parameters[index].set_results(value_results);
        changed
    }

    fn run_experiment(&mut self, assignment: &ParamAssignment) -> Vec<f64> {
        if self.config.verbose {
            info!(parameters = %assignment, "running an experiment");
        }

        let print_every = self.config.print_every.max(1);
        let mut results = Vec::with_capacity(self.config.n_repeats);
        for repeat in 0..self.config.n_repeats {
            match TrialOutcome::of(&mut self.experiment, assignment) {
                TrialOutcome::Success(score) => {
                    if self.config.verbose && repeat % print_every == 0 {
                        info!(repeat, n_repeats = self.config.n_repeats, score, "repeat finished");
                    }
                    results.push(score);
                }
                TrialOutcome::Failure(error) => {
                    warn!(parameters = %assignment, repeat, %error, "experiment trial failed");
                }
            }
        }
        results
    }

    /// Summarises a non-empty result list
    pub fn summarise(&self, results: &[f64]) -> Option<ValueSummary> {
        if results.is_empty() {
            return None;
        }
        let (mean, var) = mean_and_variance(results);
        let std = var.sqrt();
        let score = if self.config.higher_is_better {
            mean - self.config.n_sigma * std
        } else {
            mean + self.config.n_sigma * std
        };
        Some(ValueSummary { mean, std, score })
    }

    /// The candidate value with the best noise-penalised score
    ///
    /// Values whose trials all failed, or whose score is not finite, are
    /// skipped; ties keep the earliest value.
    pub fn best_value(
        &self,
        value_results: &IndexMap<ParamValue, Vec<f64>>,
    ) -> Option<(ParamValue, ValueSummary)> {
        let mut best: Option<(ParamValue, ValueSummary)> = None;
        for (value, results) in value_results {
            let Some(summary) = self.summarise(results) else {
                continue;
            };
            if !summary.score.is_finite() {
                warn!(value = %value, score = summary.score, "skipping value with non-finite score");
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, current)) if self.config.higher_is_better => summary.score > current.score,
                Some((_, current)) => summary.score < current.score,
            };
            if better {
                best = Some((value.clone(), summary));
            }
        }
        best
    }

    /// Narrows the range of every numeric parameter around its default
    ///
    /// The new range spans the nearest candidates either side of the default
    /// (or half and double the default at the edges of the range) with
    /// `new_num_values` values, plus the default itself. Categorical
    /// parameters are left unchanged.
    pub fn tighten_ranges(&mut self, new_num_values: usize) -> Result<()> {
        for param in &mut self.parameters {
            if !param.is_numeric() {
                continue;
            }
            let Some(default) = param.default_value().as_f64() else {
                continue;
            };
            let integer = param
                .values()
                .iter()
                .chain(std::iter::once(param.default_value()))
                .all(|v| v.as_i64().is_some());

            let numeric: Vec<f64> = param.values().iter().filter_map(ParamValue::as_f64).collect();
            let lo = numeric
                .iter()
                .copied()
                .filter(|v| *v < default)
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
                .unwrap_or(default / 2.0);
            let hi = numeric
                .iter()
                .copied()
                .filter(|v| *v > default)
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
                .unwrap_or(default * 2.0);
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

            let mut range = value_range(lo, hi, new_num_values, false)?;
            range.push(default);
            range.sort_by(f64::total_cmp);

            let mut values: Vec<ParamValue> = if integer {
                range.iter().map(|v| ParamValue::Int(v.round() as i64)).collect()
            } else {
                param.set_default(ParamValue::from(default));
                range.into_iter().map(ParamValue::from).collect()
            };
            values.dedup();
            debug!(parameter = param.name(), num_values = values.len(), "tightened range");
            param.set_values(values);
        }
        Ok(())
    }

    /// Builds one chart per swept parameter
    ///
    /// Each chart shows every raw result, the mean and `±n_sigma` band of each
    /// candidate value, and a marker at the current default.
    pub fn charts(&self, experiment_name: &str) -> Vec<Chart> {
        let n_sigma = self.config.n_sigma;
        let mut charts = Vec::new();

        for param in &self.parameters {
            let Some(value_results) = param.results() else {
                continue;
            };

            let categorical = !param.is_numeric();
            let x_of = |value: &ParamValue| -> f64 {
                if categorical {
                    param
                        .values()
                        .iter()
                        .position(|v| v == value)
                        .unwrap_or(param.values().len()) as f64
                } else {
                    value.as_f64().unwrap_or(f64::NAN)
                }
            };

            let mut raw_x = Vec::new();
            let mut raw_y = Vec::new();
            let mut mean_x = Vec::new();
            let mut mean_y = Vec::new();
            let mut band_low = Vec::new();
            let mut band_high = Vec::new();
            for (value, results) in value_results {
                for score in results {
                    raw_x.push(x_of(value));
                    raw_y.push(*score);
                }
                if let Some(summary) = self.summarise(results) {
                    mean_x.push(x_of(value));
                    mean_y.push(summary.mean);
                    band_low.push(summary.mean - n_sigma * summary.std);
                    band_high.push(summary.mean + n_sigma * summary.std);
                }
            }

            let default = param.default_value();
            let default_score = value_results
                .get(default)
                .and_then(|results| self.summarise(results))
                .map(|summary| summary.score);

            let series = vec![
                Series::Points {
                    label: "Result".into(),
                    x: raw_x,
                    y: raw_y,
                },
                Series::Line {
                    label: "Mean results".into(),
                    x: mean_x.clone(),
                    y: mean_y,
                },
                Series::Band {
                    label: format!("±{n_sigma}σ"),
                    x: mean_x,
                    y_low: band_low,
                    y_high: band_high,
                },
                Series::Marker {
                    label: format!("Optimal value = {default}"),
                    x: Some(x_of(default)),
                    y: default_score,
                },
            ];

            charts.push(Chart {
                title: format!(
                    "Parameter sweep results for {experiment_name:?}, varying parameter {:?}",
                    param.name()
                ),
                series,
                axis: AxisProperties {
                    xlabel: param.name().to_string(),
                    ylabel: "Result".into(),
                    log_x: param.log_x_axis() && !categorical,
                    x_tick_labels: categorical
                        .then(|| param.values().iter().map(ToString::to_string).collect()),
                    ..AxisProperties::default()
                },
            });
        }

        charts
    }

    /// Renders one chart per swept parameter, returning the saved paths
    pub fn plot(&self, experiment_name: &str, sink: &mut dyn ChartSink) -> Result<Vec<PathBuf>> {
        self.charts(experiment_name)
            .iter()
            .map(|chart| sink.render(chart))
            .collect()
    }
}
