/// Defines an optimization problem to be solved.
///
/// An optimization problem maps solver variables to a model input, then
/// computes an objective value (and optionally constraint values) from the
/// model input and output. Whether the objective is minimized or maximized is
/// chosen by the caller of the solver.
///
/// The number of solver variables is fixed by the problem; solvers pass `x`
/// as a slice of that length.
pub trait OptimizationProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error>;

    /// Computes an objective value from model input/output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be computed.
    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error>;

    /// Computes constraint values from model input/output.
    ///
    /// The meaning of each value (equality or inequality, threshold) is
    /// supplied to the solver separately. Unconstrained problems return
    /// an empty vector, which is the default.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if a constraint value cannot be computed.
    fn constraints(
        &self,
        _input: &Self::Input,
        _output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error> {
        Ok(Vec::new())
    }
}

impl<P: OptimizationProblem + ?Sized> OptimizationProblem for &P {
    type Input = P::Input;
    type Output = P::Output;
    type Error = P::Error;

    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error> {
        (**self).input(x)
    }

    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error> {
        (**self).objective(input, output)
    }

    fn constraints(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error> {
        (**self).constraints(input, output)
    }
}
