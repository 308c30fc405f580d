//! Solvers for optimization problems, minimizing or maximizing an objective.
//!
//! An [`OptimizationProblem`] maps solver variables `x: &[f64]` to model
//! inputs, calls the model, and extracts a scalar objective plus optional
//! constraint values. Solvers in this module search for the `x` that
//! minimizes or maximizes that objective, as chosen by a [`Goal`].
//!
//! # Solvers
//!
//! - [`golden_section`]: derivative-free search over a bracketed interval for
//!   unimodal functions of one variable
//! - [`coordinate`]: cyclic golden-section line searches over each bounded
//!   variable in turn
//!
//! Constraints are handled by [`Penalized`], which folds constraint
//! violations into the objective, and [`Algorithm`] picks a solver at runtime.
//!
//! [`OptimizationProblem`]: gauge_core::OptimizationProblem

mod algorithm;
mod evaluate;
mod goal;
mod penalty;

pub use algorithm::{Algorithm, AlgorithmError, OptimizationResult, Status};
pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};
pub use goal::Goal;
pub use penalty::{
    Constraint, ConstraintKind, Constraints, Penalized, PenaltyConfig, PenaltyConfigError,
    PenaltyError,
};

pub mod coordinate;
pub mod golden_section;
