/// A state that can be advanced along its derivative.
///
/// Implementing this trait lets fixed-step integrators work with the type by
/// stepping it via `derivative * delta`, where the derivative is taken with
/// respect to `Delta`. Signal generators use it to march a state through
/// time, but `Delta` can be any independent variable.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping with a derivative and step size.
    #[must_use]
    fn step(&self, derivative: &Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

impl StepIntegrable<f64> for f64 {
    type Derivative = f64;

    fn step(&self, derivative: &f64, delta: f64) -> Self {
        self + derivative * delta
    }
}

impl StepIntegrable<f64> for Vec<f64> {
    type Derivative = Vec<f64>;

    fn step(&self, derivative: &Vec<f64>, delta: f64) -> Self {
        self.iter()
            .zip(derivative)
            .map(|(value, rate)| value + rate * delta)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn scalar_state_moves_along_its_rate() {
        let next = 1.5_f64.step(&2.0, 0.25);
        assert_relative_eq!(next, 2.0);
    }

    #[test]
    fn vector_state_steps_componentwise() {
        let state = vec![1.0, 2.0, 3.0];
        let rate: DerivativeOf<Vec<f64>, f64> = vec![0.1, 0.2, 0.3];

        let next = state.step(&rate, 10.0);

        assert_eq!(next.len(), 3);
        assert_relative_eq!(next[0], 2.0);
        assert_relative_eq!(next[1], 4.0);
        assert_relative_eq!(next[2], 6.0);
    }
}
