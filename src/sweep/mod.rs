//! Parameter sweep engine
//!
//! A [`ParamSweeper`] searches the parameters of an [`Experiment`] by
//! coordinate ascent, memoising results per full [`ParamAssignment`] and
//! tolerating failed runs.

mod experiment;
mod parameter;
mod sweeper;
mod value;

pub use experiment::{Experiment, ParamAssignment, TrialOutcome};
pub use parameter::{Parameter, ParameterBuilder, value_range};
pub use sweeper::{ParamSweeper, SweepConfig, ValueSummary};
pub use value::ParamValue;
