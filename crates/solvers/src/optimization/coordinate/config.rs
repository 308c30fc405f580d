use thiserror::Error;

use crate::optimization::golden_section;

/// Configuration for the coordinate search.
///
/// A sweep converges when no variable moved by more than
/// `x_abs_tol + x_rel_tol * max|x_i|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_sweeps: usize,
    x_abs_tol: f64,
    x_rel_tol: f64,
    line_search: golden_section::Config,
}

/// Errors that can occur when validating a coordinate search config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_sweeps must be at least 1")]
    MaxSweeps,

    #[error("x_abs_tol must be finite and non-negative")]
    XAbs,

    #[error("x_rel_tol must be finite and non-negative")]
    XRel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_sweeps: 50,
            x_abs_tol: 1e-8,
            x_rel_tol: 1e-8,
            line_search: golden_section::Config::default(),
        }
    }
}

impl Config {
    /// Creates a config with validated sweep budget and tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_sweeps` is zero or a tolerance is negative or
    /// non-finite.
    pub fn new(
        max_sweeps: usize,
        x_abs_tol: f64,
        x_rel_tol: f64,
        line_search: golden_section::Config,
    ) -> Result<Self, ConfigError> {
        if max_sweeps == 0 {
            return Err(ConfigError::MaxSweeps);
        }
        if !x_abs_tol.is_finite() || x_abs_tol < 0.0 {
            return Err(ConfigError::XAbs);
        }
        if !x_rel_tol.is_finite() || x_rel_tol < 0.0 {
            return Err(ConfigError::XRel);
        }
        Ok(Self {
            max_sweeps,
            x_abs_tol,
            x_rel_tol,
            line_search,
        })
    }

    #[must_use]
    pub fn max_sweeps(&self) -> usize {
        self.max_sweeps
    }

    #[must_use]
    pub fn x_abs_tol(&self) -> f64 {
        self.x_abs_tol
    }

    #[must_use]
    pub fn x_rel_tol(&self) -> f64 {
        self.x_rel_tol
    }

    #[must_use]
    pub fn line_search(&self) -> &golden_section::Config {
        &self.line_search
    }

    pub(super) fn tolerance_at(&self, x: &[f64]) -> f64 {
        let scale = x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        self.x_abs_tol + self.x_rel_tol * scale
    }
}
