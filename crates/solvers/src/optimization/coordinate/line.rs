use gauge_core::OptimizationProblem;

/// Restricts a problem to the line through `base` along coordinate `index`.
///
/// The line problem has a single variable `t`, mapped to `base` with
/// component `index` replaced by `t`.
pub(super) struct LineProblem<'a, P> {
    problem: &'a P,
    base: Vec<f64>,
    index: usize,
}

impl<'a, P> LineProblem<'a, P> {
    pub(super) fn new(problem: &'a P, base: &[f64], index: usize) -> Self {
        Self {
            problem,
            base: base.to_vec(),
            index,
        }
    }
}

impl<P: OptimizationProblem> OptimizationProblem for LineProblem<'_, P> {
    type Input = P::Input;
    type Output = P::Output;
    type Error = P::Error;

    fn input(&self, t: &[f64]) -> Result<Self::Input, Self::Error> {
        let mut x = self.base.clone();
        x[self.index] = t[0];
        self.problem.input(&x)
    }

    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error> {
        self.problem.objective(input, output)
    }

    fn constraints(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error> {
        self.problem.constraints(input, output)
    }
}
