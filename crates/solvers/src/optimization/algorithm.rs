use std::cell::Cell;

use log::{debug, warn};
use thiserror::Error;

use gauge_core::{Model, OptimizationProblem, Snapshot};

use super::{Constraints, Goal, Penalized, coordinate, golden_section};

/// An optimizer chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    /// Golden section search; the problem must have one variable.
    GoldenSection(golden_section::Config),

    /// Cyclic coordinate search over any number of bounded variables.
    CoordinateSearch(coordinate::Config),
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::CoordinateSearch(coordinate::Config::default())
    }
}

/// How an optimization ended, independent of the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Converged,
    MaxIterations,
    StoppedByObserver,
}

impl From<golden_section::Status> for Status {
    fn from(status: golden_section::Status) -> Self {
        match status {
            golden_section::Status::Converged => Self::Converged,
            golden_section::Status::MaxIters => Self::MaxIterations,
            golden_section::Status::StoppedByObserver => Self::StoppedByObserver,
        }
    }
}

impl From<coordinate::Status> for Status {
    fn from(status: coordinate::Status) -> Self {
        match status {
            coordinate::Status::Converged => Self::Converged,
            coordinate::Status::MaxSweeps => Self::MaxIterations,
            coordinate::Status::StoppedByObserver => Self::StoppedByObserver,
        }
    }
}

/// The optimum found by an [`Algorithm`].
///
/// `objective` and `constraints` are the problem's own values at `x`,
/// without any penalty.
#[derive(Debug, Clone)]
pub struct OptimizationResult<I, O> {
    pub x: Vec<f64>,
    pub objective: f64,
    pub constraints: Vec<f64>,
    pub status: Status,

    /// Number of successful model calls.
    pub evaluations: usize,

    pub snapshot: Snapshot<I, O>,
}

#[derive(Debug, Error)]
pub enum AlgorithmError {
    #[error("unknown algorithm `{0}`")]
    Unknown(String),

    #[error("{algorithm} needs exactly {expected} variable(s), got {found}")]
    Dimension {
        algorithm: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    GoldenSection(#[from] golden_section::Error),

    #[error(transparent)]
    Coordinate(#[from] coordinate::Error),

    /// The problem failed while computing values at the optimum.
    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Algorithm {
    /// Looks up an algorithm with its default config by name.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] for unrecognized names.
    pub fn from_name(name: &str) -> Result<Self, AlgorithmError> {
        match name {
            "GoldenSection" => Ok(Self::GoldenSection(golden_section::Config::default())),
            "CoordinateSearch" => Ok(Self::CoordinateSearch(coordinate::Config::default())),
            _ => Err(AlgorithmError::Unknown(name.to_owned())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GoldenSection(_) => "GoldenSection",
            Self::CoordinateSearch(_) => "CoordinateSearch",
        }
    }

    /// Optimizes `problem` over the box `bounds`, subject to `constraints`.
    ///
    /// Constraint violations are folded into the objective with the
    /// quadratic penalty of [`Penalized`]. Golden section search brackets
    /// the single variable with its bounds and ignores `x0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not suit the algorithm, if the
    /// underlying solver fails, or if the problem cannot compute its values
    /// at the optimum.
    pub fn solve<M, P>(
        &self,
        model: &M,
        problem: &P,
        bounds: &[[f64; 2]],
        x0: &[f64],
        goal: Goal,
        constraints: &Constraints,
    ) -> Result<OptimizationResult<M::Input, M::Output>, AlgorithmError>
    where
        M: Model,
        P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    {
        let evaluations = Cell::new(0_usize);
        let counted = model.inspect(|_, _| evaluations.set(evaluations.get() + 1));
        let penalized = Penalized::new(problem, constraints, goal);

        debug!(
            "{} over {} variable(s) with {} constraint(s)",
            self.name(),
            bounds.len(),
            constraints.len()
        );

        let (x, status, snapshot) = match self {
            Self::GoldenSection(config) => {
                let [bracket] = bounds else {
                    return Err(AlgorithmError::Dimension {
                        algorithm: self.name(),
                        expected: 1,
                        found: bounds.len(),
                    });
                };
                let solution =
                    golden_section::solve(&counted, &penalized, *bracket, goal, config, ())?;
                (vec![solution.x], solution.status.into(), solution.snapshot)
            }
            Self::CoordinateSearch(config) => {
                let solution =
                    coordinate::solve(&counted, &penalized, bounds, x0, goal, config, ())?;
                (solution.x, solution.status.into(), solution.snapshot)
            }
        };

        if status == Status::MaxIterations {
            warn!("{} stopped on its iteration budget", self.name());
        }

        let boxed = |e: P::Error| AlgorithmError::Problem(Box::new(e));
        let objective = problem
            .objective(&snapshot.input, &snapshot.output)
            .map_err(boxed)?;
        let constraints = if constraints.is_empty() {
            Vec::new()
        } else {
            problem
                .constraints(&snapshot.input, &snapshot.output)
                .map_err(boxed)?
        };

        Ok(OptimizationResult {
            x,
            objective,
            constraints,
            status,
            evaluations: evaluations.get(),
            snapshot,
        })
    }
}
