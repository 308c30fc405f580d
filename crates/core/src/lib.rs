//! Core traits and types for Gauge.
//!
//! This crate defines the shared abstractions that solvers, drivers and the
//! calibration layer build on:
//!
//! - [`Model`]: a callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`OptimizationProblem`]: adapts solver variables to model inputs and
//!   extracts objective and constraint values from outputs
//! - [`Discipline`]: a named-array model with declared inputs and outputs
//! - [`Dataset`] and [`Values`]: tabular samples and single samples of
//!   named arrays
//! - [`DesignSpace`]: bounded variables flattened to and from solver vectors
//! - [`OneOrMany`]: accepts a single item or a list at API boundaries

mod dataset;
mod design_space;
mod discipline;
mod model;
mod observer;
mod one_or_many;
mod problem;
mod step;

pub use dataset::{Dataset, DatasetError};
pub use design_space::{DesignSpace, DesignSpaceError, Variable};
pub use discipline::{Discipline, DisciplineError, FnDiscipline, Values, ValuesExt};
pub use model::{Inspect, Model, Snapshot};
pub use observer::Observer;
pub use one_or_many::OneOrMany;
pub use problem::OptimizationProblem;
pub use step::{DerivativeOf, StepIntegrable};
