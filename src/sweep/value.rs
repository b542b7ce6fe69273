//! Parameter value type for sweeps.
//!
//! The `ParamValue` enum represents a single candidate value of a swept
//! parameter. Numeric values (integers and floats) and categorical labels are
//! both supported, and every variant is hashable so that full parameter
//! assignments can key the sweep memo table.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Represents a value of a swept parameter.
///
/// Values can be created from integers, floats, or strings using the `From` trait.
///
/// # Examples
///
/// ```
/// use armlab::ParamValue;
///
/// let int_value = ParamValue::from(42);
/// let float_value = ParamValue::from(0.25);
/// let label = ParamValue::from("orange");
/// assert!(int_value.is_numeric());
/// assert_eq!(float_value.as_f64(), Some(0.25));
/// assert!(!label.is_numeric());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value
    Int(i64),
    /// Float value (using OrderedFloat for Hash compatibility)
    Float(OrderedFloat<f64>),
    /// Categorical label
    Str(String),
}

impl ParamValue {
    /// Returns true for integer and float values.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ParamValue::Str(_))
    }

    /// Returns the value as an `f64`, or `None` for categorical labels.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(fl) => Some(fl.into_inner()),
            ParamValue::Str(_) => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the label if the value is categorical.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            // Three significant figures, like the chart labels
            ParamValue::Float(fl) => {
                let v = fl.into_inner();
                if v != 0.0 && (v.abs() < 1e-3 || v.abs() >= 1e4) {
                    write!(f, "{:.2e}", v)
                } else {
                    write!(f, "{}", format_sig(v, 3))
                }
            }
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

fn format_sig(v: f64, sig: i32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs().log10().floor() as i32;
    let decimals = (sig - 1 - magnitude).max(0) as usize;
    let s = format!("{:.*}", decimals, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

// From implementations for convenient value creation

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(OrderedFloat(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}
