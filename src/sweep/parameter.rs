use indexmap::IndexMap;

use crate::error::{ArmlabError, Result};
use crate::sweep::value::ParamValue;

/// Evenly spaced values between `lo` and `hi` inclusive
///
/// With `log_space` the values are geometrically spaced, which requires both
/// bounds to be strictly positive.
pub fn value_range(lo: f64, hi: f64, num_values: usize, log_space: bool) -> Result<Vec<f64>> {
    if num_values == 0 {
        return Err(ArmlabError::InvalidParameter {
            message: "a value range needs at least one value".into(),
        });
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Err(ArmlabError::InvalidParameter {
            message: format!("range bounds must be finite, got {lo} and {hi}"),
        });
    }
    if log_space && (lo <= 0.0 || hi <= 0.0) {
        return Err(ArmlabError::InvalidParameter {
            message: format!("log-spaced bounds must be positive, got {lo} and {hi}"),
        });
    }

    let (start, end) = if log_space {
        (lo.ln(), hi.ln())
    } else {
        (lo, hi)
    };
    let values = (0..num_values)
        .map(|i| {
            let t = if num_values == 1 {
                0.0
            } else {
                i as f64 / (num_values - 1) as f64
            };
            let v = start + t * (end - start);
            if log_space { v.exp() } else { v }
        })
        .collect();
    Ok(values)
}

/// A named parameter explored by the sweeper
///
/// A parameter has a current default value and an enumerable range of
/// candidate values, which may be numeric or categorical. After it has been
/// swept, the results of every candidate value under the defaults of the
/// other parameters are kept for plotting.
#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    default: ParamValue,
    values: Vec<ParamValue>,
    log_x_axis: bool,
    results: Option<IndexMap<ParamValue, Vec<f64>>>,
}

impl Parameter {
    /// Creates a parameter with an explicit list of candidate values
    pub fn new<V, I>(name: impl Into<String>, default: impl Into<ParamValue>, values: I) -> Result<Self>
    where
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        Self::builder(name, default).values(values).build()
    }

    /// Create a new builder for a parameter
    pub fn builder(name: impl Into<String>, default: impl Into<ParamValue>) -> ParameterBuilder {
        ParameterBuilder::new(name, default)
    }

    /// Gets the parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the current default value
    pub fn default_value(&self) -> &ParamValue {
        &self.default
    }

    pub(crate) fn set_default(&mut self, value: ParamValue) {
        self.default = value;
    }

    /// Gets the candidate values
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    pub(crate) fn set_values(&mut self, values: Vec<ParamValue>) {
        self.values = values;
    }

    /// Whether charts of this parameter should use a logarithmic x axis
    pub fn log_x_axis(&self) -> bool {
        self.log_x_axis
    }

    /// Whether every candidate value and the default are numeric
    pub fn is_numeric(&self) -> bool {
        self.default.is_numeric() && self.values.iter().all(ParamValue::is_numeric)
    }

    /// Results of the most recent sweep over this parameter, keyed by value
    pub fn results(&self) -> Option<&IndexMap<ParamValue, Vec<f64>>> {
        self.results.as_ref()
    }

    pub(crate) fn set_results(&mut self, results: IndexMap<ParamValue, Vec<f64>>) {
        self.results = Some(results);
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Parameter(name={:?}, default={}, range=[{}])",
            self.name,
            self.default,
            values.join(", ")
        )
    }
}

/// Builder for parameters whose range is given either explicitly or by bounds
#[derive(Clone, Debug)]
pub struct ParameterBuilder {
    name: String,
    default: ParamValue,
    values: Option<Vec<ParamValue>>,
    bounds: Option<(f64, f64)>,
    num_values: usize,
    log_space: bool,
    log_x_axis: Option<bool>,
}

impl ParameterBuilder {
    fn new(name: impl Into<String>, default: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            values: None,
            bounds: None,
            num_values: 10,
            log_space: false,
            log_x_axis: None,
        }
    }

    /// Set an explicit list of candidate values
    pub fn values<V, I>(mut self, values: I) -> Self
    where
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Generate candidate values between `lo` and `hi`
    pub fn bounds(mut self, lo: f64, hi: f64) -> Self {
        self.bounds = Some((lo, hi));
        self
    }

    /// Number of values generated from bounds (defaults to 10)
    pub fn num_values(mut self, num_values: usize) -> Self {
        self.num_values = num_values;
        self
    }

    /// Space generated values geometrically, and default to a log x axis
    pub fn log_space(mut self, log_space: bool) -> Self {
        self.log_space = log_space;
        self
    }

    /// Override the x axis scale used when charting this parameter
    pub fn log_x_axis(mut self, log_x_axis: bool) -> Self {
        self.log_x_axis = Some(log_x_axis);
        self
    }

    /// Build the parameter
    pub fn build(self) -> Result<Parameter> {
        let values = match (self.values, self.bounds) {
            (Some(values), _) => values,
            (None, Some((lo, hi))) => value_range(lo, hi, self.num_values, self.log_space)?
                .into_iter()
                .map(ParamValue::from)
                .collect(),
            (None, None) => {
                return Err(ArmlabError::InvalidParameter {
                    message: format!(
                        "parameter {:?} needs either a list of values or lo/hi bounds",
                        self.name
                    ),
                });
            }
        };

        if values.is_empty() {
            return Err(ArmlabError::InvalidParameter {
                message: format!("parameter {:?} has an empty value range", self.name),
            });
        }

        Ok(Parameter {
            name: self.name,
            default: self.default,
            values,
            log_x_axis: self.log_x_axis.unwrap_or(self.log_space),
            results: None,
        })
    }
}
