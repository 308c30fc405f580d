//! Cyclic coordinate search over a bounded box.
//!
//! Each sweep runs one [golden section](super::golden_section) line search
//! per variable, over that variable's bounds, with the other variables held
//! at their current values. A line-search result replaces the current point
//! only if it strictly improves the objective. The search converges when a
//! whole sweep moves no variable by more than the configured tolerance.
//!
//! Like golden section search, it assumes the objective is unimodal along
//! each coordinate. Couplings between variables are resolved by repeated
//! sweeps, which converge slowly for strongly correlated variables.
//!
//! # Observer Events
//!
//! One [`Event`] is emitted at the end of every sweep. Observers can return
//! [`Action::StopEarly`] to keep the current point and stop.

mod config;
mod error;
mod line;


pub use config::{Config, ConfigError};
pub use error::Error;

use log::debug;

use gauge_core::{Model, Observer, OptimizationProblem, Snapshot};

use super::{Goal, evaluate, golden_section};

use line::LineProblem;

/// Actions an observer can take after a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop and return the current point.
    StopEarly,
}

/// Emitted after every sweep.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// One-based sweep number.
    pub sweep: usize,

    /// The current point.
    pub x: &'a [f64],

    /// Objective at `x`.
    pub objective: f64,

    /// Largest coordinate move during the sweep.
    pub max_step: f64,
}

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Converged,
    MaxSweeps,
    StoppedByObserver,
}

/// The result of a coordinate search.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status,
    pub x: Vec<f64>,
    pub objective: f64,
    pub snapshot: Snapshot<I, O>,
    pub sweeps: usize,
}

/// Searches the box `bounds` for the optimum requested by `goal`, starting
/// from `x0`.
///
/// # Errors
///
/// Returns an error if `x0` does not fit the bounds, or if the model or
/// problem fails during an evaluation.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bounds: &[[f64; 2]],
    x0: &[f64],
    goal: Goal,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    check_start(bounds, x0)?;

    let start = evaluate(model, problem, x0)?;
    let mut x = start.x;
    let mut objective = start.objective;
    let mut snapshot = start.snapshot;

    for sweep in 1..=config.max_sweeps() {
        let mut max_step = 0.0_f64;

        for (index, &[lower, upper]) in bounds.iter().enumerate() {
            if lower == upper {
                continue;
            }
            let line = LineProblem::new(problem, &x, index);
            let found = golden_section::solve(
                model,
                &line,
                [lower, upper],
                goal,
                config.line_search(),
                (),
            )?;

            if goal.improves(found.objective, objective) {
                max_step = max_step.max((found.x - x[index]).abs());
                x[index] = found.x;
                objective = found.objective;
                snapshot = found.snapshot;
            }
        }

        debug!("coordinate sweep {sweep}: objective {objective}, max step {max_step}");

        let event = Event {
            sweep,
            x: &x,
            objective,
            max_step,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                x,
                objective,
                snapshot,
                sweeps: sweep,
            });
        }

        if max_step <= config.tolerance_at(&x) {
            return Ok(Solution {
                status: Status::Converged,
                x,
                objective,
                snapshot,
                sweeps: sweep,
            });
        }
    }

    Ok(Solution {
        status: Status::MaxSweeps,
        x,
        objective,
        snapshot,
        sweeps: config.max_sweeps(),
    })
}

/// Finds the minimum of the objective.
///
/// # Errors
///
/// See [`solve`].
pub fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    bounds: &[[f64; 2]],
    x0: &[f64],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    solve(model, problem, bounds, x0, Goal::Minimize, config, observer)
}

/// Finds the maximum of the objective.
///
/// # Errors
///
/// See [`solve`].
pub fn maximize<M, P, Obs>(
    model: &M,
    problem: &P,
    bounds: &[[f64; 2]],
    x0: &[f64],
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    solve(model, problem, bounds, x0, Goal::Maximize, config, observer)
}

fn check_start(bounds: &[[f64; 2]], x0: &[f64]) -> Result<(), Error> {
    if bounds.len() != x0.len() {
        return Err(Error::Dimension {
            expected: bounds.len(),
            found: x0.len(),
        });
    }
    for (index, (&[lower, upper], &value)) in bounds.iter().zip(x0).enumerate() {
        if !(lower <= value && value <= upper) {
            return Err(Error::OutOfBounds {
                index,
                value,
                lower,
                upper,
            });
        }
    }
    Ok(())
}
