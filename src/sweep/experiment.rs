use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ArmlabError, Result};
use crate::sweep::value::ParamValue;

/// A full assignment of values to named parameters
///
/// Entries are kept sorted by name, so two assignments with the same
/// name/value pairs are equal and hash identically regardless of the order in
/// which parameters were registered. This makes an assignment usable directly
/// as the key of the sweep memo table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamAssignment(BTreeMap<String, ParamValue>);

impl ParamAssignment {
    /// Creates an empty assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a parameter, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Gets the value of a parameter
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Gets a numeric parameter as `f64`
    pub fn get_f64(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| ArmlabError::InvalidParameter {
            message: format!("parameter {name:?} is not numeric: {value}"),
        })
    }

    /// Gets an integer parameter
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| ArmlabError::InvalidParameter {
            message: format!("parameter {name:?} is not an integer: {value}"),
        })
    }

    /// Gets a categorical parameter
    pub fn get_str(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| ArmlabError::InvalidParameter {
            message: format!("parameter {name:?} is not a label: {value}"),
        })
    }

    fn require(&self, name: &str) -> Result<&ParamValue> {
        self.0.get(name).ok_or_else(|| ArmlabError::UnknownParameter {
            name: name.to_string(),
        })
    }

    /// Whether the assignment contains a parameter
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters in the assignment
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the assignment is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParamAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for ParamAssignment
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// An experiment whose score the sweeper maximises (or minimises)
///
/// A run may fail with any error; failed runs are logged and left out of the
/// results for that assignment rather than counted as a score.
pub trait Experiment {
    /// Run the experiment once with a full parameter assignment
    fn run(&mut self, params: &ParamAssignment) -> anyhow::Result<f64>;
}

impl<F> Experiment for F
where
    F: FnMut(&ParamAssignment) -> anyhow::Result<f64>,
{
    fn run(&mut self, params: &ParamAssignment) -> anyhow::Result<f64> {
        self(params)
    }
}

/// Outcome of a single experiment run
#[derive(Clone, Debug, PartialEq)]
pub enum TrialOutcome {
    /// The run produced a score
    Success(f64),
    /// The run failed; the message is kept for logging
    Failure(String),
}

impl TrialOutcome {
    /// Runs `experiment` once, capturing failures
    ///
    /// A NaN or infinite score counts as a failed run.
    pub fn of<E: Experiment + ?Sized>(experiment: &mut E, params: &ParamAssignment) -> Self {
        match experiment.run(params) {
            Ok(score) if score.is_finite() => TrialOutcome::Success(score),
            Ok(score) => TrialOutcome::Failure(format!("non-finite score {score}")),
            Err(err) => TrialOutcome::Failure(format!("{err:#}")),
        }
    }

    /// The score of a successful run
    pub fn score(&self) -> Option<f64> {
        match self {
            TrialOutcome::Success(score) => Some(*score),
            TrialOutcome::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_is_order_independent() {
        let mut a = ParamAssignment::new();
        a.insert("z", 1);
        a.insert("x", 2);
        let b: ParamAssignment = [("x", 2), ("z", 1)].into_iter().collect();
        assert_eq!(a, b);

        let names: Vec<&str> = a.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x", "z"]);
        assert_eq!(a.to_string(), "x=2, z=1");
    }

    #[test]
    fn test_typed_getters() {
        let mut params = ParamAssignment::new();
        params.insert("epsilon", 0.1);
        params.insert("steps", 3);
        params.insert("fruit", "pear");

        assert_eq!(params.get_f64("epsilon").unwrap(), 0.1);
        assert_eq!(params.get_f64("steps").unwrap(), 3.0);
        assert_eq!(params.get_i64("steps").unwrap(), 3);
        assert_eq!(params.get_str("fruit").unwrap(), "pear");
        assert!(matches!(
            params.get_f64("fruit"),
            Err(ArmlabError::InvalidParameter { .. })
        ));
        assert!(matches!(
            params.get_f64("alpha"),
            Err(ArmlabError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_non_finite_scores_are_failures() {
        let mut diverging = |_: &ParamAssignment| -> anyhow::Result<f64> { Ok(f64::NAN) };
        let outcome = TrialOutcome::of(&mut diverging, &ParamAssignment::new());
        assert_eq!(outcome.score(), None);
        assert!(matches!(outcome, TrialOutcome::Failure(ref msg) if msg.contains("non-finite")));

        let mut overflowing = |_: &ParamAssignment| -> anyhow::Result<f64> { Ok(f64::INFINITY) };
        assert!(TrialOutcome::of(&mut overflowing, &ParamAssignment::new()).score().is_none());
    }

    #[test]
    fn test_closure_experiment_and_outcomes() {
        let mut experiment = |params: &ParamAssignment| -> anyhow::Result<f64> {
            let x = params.get_f64("x")?;
            if x < 0.0 {
                anyhow::bail!("negative x");
            }
            Ok(x * 2.0)
        };

        let ok: ParamAssignment = [("x", 1.5)].into_iter().collect();
        let bad: ParamAssignment = [("x", -1.0)].into_iter().collect();
        assert_eq!(TrialOutcome::of(&mut experiment, &ok), TrialOutcome::Success(3.0));
        let failed = TrialOutcome::of(&mut experiment, &bad);
        assert_eq!(failed, TrialOutcome::Failure("negative x".to_string()));
        assert_eq!(failed.score(), None);
    }
}
