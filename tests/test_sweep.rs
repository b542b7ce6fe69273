use armlab::plot::{Chart, Series};
use armlab::{
    ArmlabError, Experiment, JsonChartSink, ParamAssignment, ParamSweeper, ParamValue, Parameter,
    SweepConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn quiet(n_repeats: usize) -> SweepConfig {
    SweepConfig {
        n_repeats,
        verbose: false,
        ..SweepConfig::default()
    }
}

/// Scores assignments by closeness to a target point, with a little noise
struct TargetExperiment {
    target: [i64; 3],
    calls: usize,
    rng: StdRng,
}

impl TargetExperiment {
    fn new(target: [i64; 3]) -> Self {
        Self {
            target,
            calls: 0,
            rng: StdRng::seed_from_u64(42),
        }
    }
}

impl Experiment for TargetExperiment {
    fn run(&mut self, params: &ParamAssignment) -> anyhow::Result<f64> {
        self.calls += 1;
        let mut sq_distance = 0.0;
        for (name, target) in ["x", "y", "z"].iter().zip(self.target) {
            let d = (params.get_i64(name)? - target) as f64;
            sq_distance += d * d;
        }
        let noise: f64 = self.rng.random_range(-0.05..0.05);
        Ok(-sq_distance + noise)
    }
}

fn grid_sweeper(experiment: TargetExperiment, config: SweepConfig) -> ParamSweeper<TargetExperiment> {
    let mut sweeper = ParamSweeper::new(experiment, config);
    for name in ["x", "y", "z"] {
        sweeper
            .add_parameter(Parameter::new(name, 0, 0..=10).unwrap())
            .unwrap();
    }
    sweeper
}

#[test]
fn test_finds_separable_optimum() {
    let mut sweeper = grid_sweeper(TargetExperiment::new([2, 5, 7]), quiet(3));
    let best = sweeper.find_best_parameters().unwrap();
    assert_eq!(best.get_i64("x").unwrap(), 2);
    assert_eq!(best.get_i64("y").unwrap(), 5);
    assert_eq!(best.get_i64("z").unwrap(), 7);
    assert_eq!(sweeper.parameter("y").unwrap().default_value(), &ParamValue::Int(5));
}

#[test]
fn test_memoised_results_are_reused() {
    let mut sweeper = grid_sweeper(TargetExperiment::new([2, 5, 7]), quiet(3));
    let first = sweeper.find_best_parameters().unwrap();
    let calls = sweeper.experiment().calls;
    let assignments = sweeper.num_experiments();
    assert_eq!(calls, assignments * 3);

    let second = sweeper.find_best_parameters().unwrap();
    assert_eq!(first, second);
    assert_eq!(sweeper.experiment().calls, calls);
    assert_eq!(sweeper.num_experiments(), assignments);
}

#[test]
fn test_repeated_sweep_does_not_rerun_experiment() {
    let mut sweeper = grid_sweeper(TargetExperiment::new([2, 5, 7]), quiet(2));
    let first = sweeper.sweep_parameter("y").unwrap();
    assert_eq!(sweeper.experiment().calls, 11 * 2);

    let second = sweeper.sweep_parameter("y").unwrap();
    assert_eq!(first, second);
    assert_eq!(sweeper.experiment().calls, 11 * 2);
    assert_eq!(sweeper.num_experiments(), 11);
}

#[test]
fn test_max_passes_reports_non_convergence() {
    let config = SweepConfig {
        max_passes: Some(1),
        ..quiet(1)
    };
    let mut sweeper = grid_sweeper(TargetExperiment::new([2, 5, 7]), config);
    assert!(matches!(
        sweeper.find_best_parameters(),
        Err(ArmlabError::NotConverged { passes: 1 })
    ));
    // The first pass still moved every default
    assert_eq!(sweeper.defaults().get_i64("z").unwrap(), 7);
}

/// Fails whenever `x + y + z` is even, and otherwise scores the sum
fn odd_sum(params: &ParamAssignment) -> anyhow::Result<f64> {
    let sum = params.get_i64("x")? + params.get_i64("y")? + params.get_i64("z")?;
    if sum % 2 == 0 {
        anyhow::bail!("even sum {sum}");
    }
    Ok(sum as f64)
}

#[test]
fn test_failed_trials_are_left_out() {
    let mut sweeper = ParamSweeper::new(odd_sum, quiet(4));
    sweeper.add_parameter(Parameter::new("x", 1, 0..=3).unwrap()).unwrap();
    sweeper.add_parameter(Parameter::new("y", 0, 0..=3).unwrap()).unwrap();
    sweeper.add_parameter(Parameter::new("z", 0, 0..=3).unwrap()).unwrap();

    let best = sweeper.find_best_parameters().unwrap();
    assert_eq!(best.get_i64("x").unwrap(), 3);
    assert_eq!(best.get_i64("y").unwrap(), 2);
    assert_eq!(best.get_i64("z").unwrap(), 2);

    for (assignment, results) in sweeper.results() {
        let sum: i64 = ["x", "y", "z"]
            .iter()
            .map(|name| assignment.get_i64(name).unwrap())
            .sum();
        let expected = if sum % 2 == 0 { 0 } else { 4 };
        assert_eq!(results.len(), expected, "{assignment}");
    }
}

#[test]
fn test_categorical_parameter() {
    let fruit_score = |params: &ParamAssignment| -> anyhow::Result<f64> {
        Ok(match params.get_str("fruit")? {
            "apple" => 1.0,
            "orange" => 2.0,
            "pear" => 3.0,
            other => anyhow::bail!("unknown fruit {other}"),
        })
    };
    let mut sweeper = ParamSweeper::new(fruit_score, quiet(2));
    sweeper
        .add_parameter(Parameter::new("fruit", "apple", ["apple", "orange", "pear"]).unwrap())
        .unwrap();
    let best = sweeper.find_best_parameters().unwrap();
    assert_eq!(best.get_str("fruit").unwrap(), "pear");

    let charts = sweeper.charts("Fruit");
    assert_eq!(charts.len(), 1);
    let axis = &charts[0].axis;
    assert!(!axis.log_x);
    assert_eq!(
        axis.x_tick_labels.as_deref(),
        Some(&["apple".to_string(), "orange".to_string(), "pear".to_string()][..])
    );
    match &charts[0].series[3] {
        Series::Marker { x, .. } => assert_eq!(*x, Some(2.0)),
        other => panic!("expected marker, got {other:?}"),
    }
}

#[test]
fn test_plot_writes_one_chart_per_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let mut sweeper = grid_sweeper(TargetExperiment::new([1, 1, 1]), quiet(2));
    sweeper.find_best_parameters().unwrap();

    let mut sink = JsonChartSink::new(dir.path().join("sweeps"));
    let paths = sweeper.plot("Target", &mut sink).unwrap();
    assert_eq!(paths.len(), 3);
    for path in &paths {
        let chart: Chart = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(chart.title.contains("Target"));
        assert_eq!(chart.series.len(), 4);
    }
}

#[test]
fn test_tightened_ranges_contain_defaults() {
    let experiment = |params: &ParamAssignment| -> anyhow::Result<f64> {
        let rate = params.get_f64("rate")?;
        Ok(-(rate - 0.3).abs())
    };
    let mut sweeper = ParamSweeper::new(experiment, quiet(1));
    sweeper
        .add_parameter(
            Parameter::builder("rate", 0.5)
                .bounds(0.1, 1.0)
                .num_values(10)
                .build()
                .unwrap(),
        )
        .unwrap();
    sweeper.find_best_parameters().unwrap();
    sweeper.tighten_ranges(5).unwrap();

    let rate = sweeper.parameter("rate").unwrap();
    assert!(rate.values().contains(rate.default_value()));
    let values: Vec<f64> = rate.values().iter().filter_map(ParamValue::as_f64).collect();
    assert!(values.windows(2).all(|w| w[0] < w[1]));
    assert!(values[0] >= 0.1 - 1e-12 && values[values.len() - 1] <= 0.5 + 1e-12);
}
