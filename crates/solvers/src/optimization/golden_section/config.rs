use thiserror::Error;

/// Iteration budget and convergence tolerances.
///
/// The search converges once its interior points are no further apart than
/// [`Config::tolerance_at`] their midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    abs_tol: f64,
    rel_tol: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the absolute tolerance must be finite and non-negative")]
    AbsoluteTolerance,

    #[error("the relative tolerance must be finite and non-negative")]
    RelativeTolerance,
}

fn valid(tol: f64) -> bool {
    tol.is_finite() && tol >= 0.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            abs_tol: 1e-12,
            rel_tol: 1e-12,
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or not finite.
    pub fn new(max_iters: usize, abs_tol: f64, rel_tol: f64) -> Result<Self, ConfigError> {
        if !valid(abs_tol) {
            return Err(ConfigError::AbsoluteTolerance);
        }
        if !valid(rel_tol) {
            return Err(ConfigError::RelativeTolerance);
        }
        Ok(Self {
            max_iters,
            abs_tol,
            rel_tol,
        })
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Largest interior gap accepted around `x`.
    #[must_use]
    pub fn tolerance_at(&self, x: f64) -> f64 {
        self.abs_tol + self.rel_tol * x.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerances_must_be_finite_and_non_negative() {
        assert_eq!(Config::new(5, -1e-3, 0.0), Err(ConfigError::AbsoluteTolerance));
        assert_eq!(Config::new(5, 0.0, f64::INFINITY), Err(ConfigError::RelativeTolerance));
        assert!(Config::new(0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn tolerance_grows_with_the_midpoint() {
        let config = Config::new(10, 0.5, 0.1).unwrap();

        assert_eq!(config.tolerance_at(0.0), 0.5);
        assert_eq!(config.tolerance_at(-10.0), 1.5);
    }
}
