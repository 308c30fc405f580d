//! Golden section search over a bracketed interval.
//!
//! Two interior points sit at golden-ratio positions of the bracket. Each
//! iteration discards the end of the bracket beyond the worse interior point
//! and keeps the better one, so only one new evaluation is needed per
//! iteration.
//!
//! The objective should be unimodal on the bracket. The problem has exactly
//! one solver variable, which the solver passes as a one-element slice.
//!
//! Every evaluation is reported to the observer as an [`Event`]: two opening
//! evaluations at iteration zero, then one per iteration. Returning
//! [`Action::StopEarly`] ends the search with the best point found so far.
//! Model or problem failures end the search with an [`Error`].

mod bracket;
mod config;
mod search;


pub use config::{Config, ConfigError};

use gauge_core::{Model, Observer, OptimizationProblem, Snapshot};

use super::{EvalError, Goal};

/// Actions an observer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StopEarly,
}

/// An evaluated point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub objective: f64,
}

/// A single evaluation reported to the observer.
#[derive(Debug)]
pub struct Event<'a, I, O> {
    /// Zero for the opening evaluations.
    pub iter: usize,

    pub point: Point,

    pub input: &'a I,

    pub output: &'a O,

    /// Outer bounds of the bracket once `point` is placed.
    pub bracket: [f64; 2],

    /// Best point so far, `point` included.
    pub best: Point,
}

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Converged,
    MaxIters,
    StoppedByObserver,
}

/// The result of a golden section search.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status,

    /// Best x found.
    pub x: f64,

    pub objective: f64,

    pub snapshot: Snapshot<I, O>,

    /// Iterations after the opening evaluations.
    pub iters: usize,
}

/// Errors that end a golden section search.
///
/// Errors are boxed to keep them out of the solver's signature; use
/// `downcast_ref` to inspect them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    fn from(error: EvalError<ME, PE>) -> Self {
        match error {
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Input(e) | EvalError::Objective(e) => Self::Problem(Box::new(e)),
        }
    }
}

/// Searches `bracket` for the optimum requested by `goal`.
///
/// The bounds may be given in either order.
///
/// # Errors
///
/// Returns an error if the model or the problem fails at any evaluation.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    goal: Goal,
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    search::run(model, problem, bracket, goal, config, observer)
}

/// Finds the minimum of the objective.
///
/// # Errors
///
/// See [`solve`].
pub fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    solve(model, problem, bracket, Goal::Minimize, config, observer)
}

/// Finds the maximum of the objective.
///
/// # Errors
///
/// See [`solve`].
pub fn maximize<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    solve(model, problem, bracket, Goal::Maximize, config, observer)
}
