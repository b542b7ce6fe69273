//! Chart descriptions and chart sinks.
//!
//! The harness describes charts as data: a title, labelled series and axis
//! hints. Rendering is left to a [`ChartSink`]; [`JsonChartSink`] persists
//! each chart as a JSON document that any plotting front end can draw.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// A labelled series drawn on a chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    /// Unconnected markers
    Points { label: String, x: Vec<f64>, y: Vec<f64> },
    /// A connected line
    Line { label: String, x: Vec<f64>, y: Vec<f64> },
    /// A shaded region between two curves
    Band {
        label: String,
        x: Vec<f64>,
        y_low: Vec<f64>,
        y_high: Vec<f64>,
    },
    /// Reference lines: vertical at `x` and/or horizontal at `y`
    Marker {
        label: String,
        x: Option<f64>,
        y: Option<f64>,
    },
    /// A single bar in a bar chart
    Bar { label: String, value: f64 },
}

impl Series {
    /// The legend label of the series
    pub fn label(&self) -> &str {
        match self {
            Series::Points { label, .. }
            | Series::Line { label, .. }
            | Series::Band { label, .. }
            | Series::Marker { label, .. }
            | Series::Bar { label, .. } => label,
        }
    }
}

/// Axis labels, scale and range hints
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisProperties {
    pub xlabel: String,
    pub ylabel: String,
    pub log_x: bool,
    pub y_range: Option<(f64, f64)>,
    /// Tick labels for categorical x values, placed at `0, 1, 2, ...`
    pub x_tick_labels: Option<Vec<String>>,
}

/// A chart ready to be rendered
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub series: Vec<Series>,
    pub axis: AxisProperties,
}

/// Renders and persists charts
pub trait ChartSink {
    /// Render `chart`, returning the path of the saved file
    fn render(&mut self, chart: &Chart) -> Result<PathBuf>;
}

/// Collects charts in memory; the returned "path" is the chart title
impl ChartSink for Vec<Chart> {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf> {
        self.push(chart.clone());
        Ok(PathBuf::from(&chart.title))
    }
}

/// Writes each chart to `<dir>/<clean title>.json`
#[derive(Clone, Debug)]
pub struct JsonChartSink {
    dir: PathBuf,
}

impl JsonChartSink {
    /// Creates a sink writing into `dir`, which is created on first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Gets the output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartSink for JsonChartSink {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", clean_filename(&chart.title)));
        fs::write(&path, serde_json::to_string_pretty(chart)?)?;
        debug!(path = %path.display(), "saved chart");
        Ok(path)
    }
}

/// Turns a chart title into a portable file name
pub fn clean_filename(title: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut last_was_separator = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            name.push(c);
            last_was_separator = false;
        } else if !last_was_separator {
            name.push('_');
            last_was_separator = true;
        }
    }
    while name.ends_with('_') {
        name.pop();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> Chart {
        Chart {
            title: "Mean rewards (10 steps, 2 repeats)".into(),
            series: vec![
                Series::Line {
                    label: "mean".into(),
                    x: vec![0.0, 1.0],
                    y: vec![0.5, 0.7],
                },
                Series::Marker {
                    label: "best".into(),
                    x: None,
                    y: Some(0.7),
                },
            ],
            axis: AxisProperties {
                xlabel: "Time".into(),
                ylabel: "Reward".into(),
                y_range: Some((-2.0, 4.0)),
                ..AxisProperties::default()
            },
        }
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(
            clean_filename("Mean rewards (10 steps, 2 repeats)"),
            "Mean_rewards_10_steps_2_repeats"
        );
        assert_eq!(clean_filename("varying \"epsilon\""), "varying_epsilon");
    }

    #[test]
    fn test_json_sink_writes_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonChartSink::new(dir.path().join("charts"));
        let path = sink.render(&chart()).unwrap();

        assert!(path.ends_with("Mean_rewards_10_steps_2_repeats.json"));
        let loaded: Chart = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, chart());
    }

    #[test]
    fn test_series_json_is_tagged() {
        let json = serde_json::to_value(Series::Bar {
            label: "agent".into(),
            value: 1.5,
        })
        .unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["value"], 1.5);
    }

    #[test]
    fn test_memory_sink() {
        let mut charts: Vec<Chart> = Vec::new();
        let path = charts.render(&chart()).unwrap();
        assert_eq!(path, PathBuf::from("Mean rewards (10 steps, 2 repeats)"));
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].series[0].label(), "mean");
    }
}
