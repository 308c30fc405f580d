//! Solvers and drivers for Gauge.
//!
//! - [`optimization`]: bounded, derivative-free optimizers with constraint
//!   penalties, selectable at runtime through [`optimization::Algorithm`]
//! - [`doe`]: replays a fixed sample matrix through a discipline and collects
//!   the results in a [`Dataset`](gauge_core::Dataset)
//! - [`mda`]: couples several disciplines into one

pub mod doe;
pub mod mda;
pub mod optimization;
