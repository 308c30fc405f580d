//! Calibration of multidisciplinary models against reference data.
//!
//! Calibration finds the parameters that make coupled disciplines reproduce
//! observed data. The building blocks are:
//!
//! - [`CalibrationMeasure`] and its built-in implementation [`Measure`],
//!   which compare model and reference values of one output
//! - [`MeasureFactory`], a registry creating measures by kind
//! - [`compose`], which weights measures into a named [`CompositeMeasure`]
//! - [`Calibrator`], which samples the disciplines at the reference inputs
//!   and evaluates composite measures
//! - [`CalibrationScenario`], which optimizes the parameters of a design
//!   space, possibly under constraints, and post-processes the result
//!
//! The [`signal`] module provides time-series disciplines for integrated
//! measures, and [`post`] the figures built after a calibration.

mod calibrator;
mod composite;
mod error;
mod factory;
mod measure;
mod scenario;
mod spec;

pub mod post;
pub mod signal;

pub use calibrator::{Calibrator, CalibratorOutput};
pub use composite::{CompositeMeasure, compose, normalize_weights, sign_adjusted_weight};
pub use error::{CalibrationError, ConfigError, MeasureError};
pub use factory::{MeasureBuilder, MeasureFactory};
pub use measure::{CalibrationMeasure, Comparison, Measure};
pub use scenario::{CalibrationScenario, NamedConstraint, State};
pub use spec::CalibrationMeasureSpec;
