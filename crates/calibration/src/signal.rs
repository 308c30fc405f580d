//! Time signals generated by integrating ordinary differential equations.
//!
//! A [`SignalGenerator`] turns initial states and parameters into state
//! trajectories over requested times. [`SignalDiscipline`] exposes one as a
//! [`Discipline`](gauge_core::Discipline) whose trajectories, together with
//! the `times` mesh, can be compared by integrated measures.

mod discipline;
mod ode;
mod oscillator;

pub use discipline::SignalDiscipline;
pub use ode::{OdeSignalGenerator, RightHandSide};
pub use oscillator::Oscillator;

use std::collections::BTreeMap;

use ndarray::Array1;
use thiserror::Error;

use gauge_core::Values;

/// Errors raised while generating a signal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("at least one time is required")]
    NoTimes,

    #[error("times must be finite and strictly increasing, got {previous} then {next}")]
    Times { previous: f64, next: f64 },

    #[error("missing initial value of state `{0}`")]
    MissingState(String),

    #[error("missing parameter `{0}`")]
    MissingParameter(String),

    #[error("the right-hand side returned {found} rate(s) for {expected} state(s)")]
    Dimension { expected: usize, found: usize },

    #[error("the state is no longer finite at t = {time}")]
    NonFinite { time: f64 },
}

/// State trajectories sampled at the requested times.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub times: Array1<f64>,

    /// The trajectory of every state, one value per time.
    pub evolution: BTreeMap<String, Array1<f64>>,

    /// The value of every state at the last time.
    pub final_values: BTreeMap<String, f64>,
}

/// Generates state trajectories from initial states and parameters.
pub trait SignalGenerator {
    fn state_names(&self) -> &[String];

    fn parameter_names(&self) -> &[String];

    /// Integrates from `initial` at `times[0]` through every later time.
    ///
    /// # Errors
    ///
    /// Returns an error if `times` is empty or not strictly increasing, a
    /// state or parameter is missing, or the integration diverges.
    fn generate(
        &self,
        times: &[f64],
        initial: &Values,
        parameters: &Values,
    ) -> Result<Signal, SignalError>;
}
