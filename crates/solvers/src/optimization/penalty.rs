use std::fmt;

use thiserror::Error;

use gauge_core::OptimizationProblem;

use super::Goal;

/// Whether a constraint pins a value or bounds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// `g(x) == value`.
    #[default]
    Equality,

    /// `g(x) <= value`, or `g(x) >= value` when the constraint is positive.
    Inequality,
}

/// A constraint on one value returned by
/// [`OptimizationProblem::constraints`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub value: f64,
    pub positive: bool,
}

impl Constraint {
    /// `g(x) == value`.
    #[must_use]
    pub fn equal_to(value: f64) -> Self {
        Self {
            kind: ConstraintKind::Equality,
            value,
            positive: false,
        }
    }

    /// `g(x) <= value`.
    #[must_use]
    pub fn at_most(value: f64) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            value,
            positive: false,
        }
    }

    /// `g(x) >= value`.
    #[must_use]
    pub fn at_least(value: f64) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            value,
            positive: true,
        }
    }

    /// Returns how far `g` is from satisfying the constraint; zero when satisfied.
    #[must_use]
    pub fn violation(&self, g: f64) -> f64 {
        let gap = g - self.value;
        match (self.kind, self.positive) {
            (ConstraintKind::Equality, _) => gap.abs(),
            (ConstraintKind::Inequality, false) => gap.max(0.0),
            (ConstraintKind::Inequality, true) => (-gap).max(0.0),
        }
    }

    /// Returns the relational operator shown when displaying the constraint.
    #[must_use]
    pub fn operator(&self) -> &'static str {
        match (self.kind, self.positive) {
            (ConstraintKind::Equality, _) => "==",
            (ConstraintKind::Inequality, false) => "<=",
            (ConstraintKind::Inequality, true) => ">=",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator(), self.value)
    }
}

/// Configuration of the quadratic constraint penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyConfig {
    weight: f64,
}

/// Errors that can occur when validating a [`PenaltyConfig`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyConfigError {
    #[error("penalty weight must be finite and positive")]
    Weight,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self { weight: 1e4 }
    }
}

impl PenaltyConfig {
    /// Creates a penalty config.
    ///
    /// # Errors
    ///
    /// Returns an error if `weight` is not finite and positive.
    pub fn new(weight: f64) -> Result<Self, PenaltyConfigError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(PenaltyConfigError::Weight);
        }
        Ok(Self { weight })
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Errors raised by a [`Penalized`] problem.
#[derive(Debug, Error)]
pub enum PenaltyError<E> {
    #[error(transparent)]
    Problem(E),

    #[error("expected {expected} constraint value(s), got {found}")]
    ConstraintCount { expected: usize, found: usize },
}

/// The constraints of a problem together with their penalty settings.
///
/// Entry `i` constrains value `i` of [`OptimizationProblem::constraints`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    list: Vec<Constraint>,
    penalty: PenaltyConfig,
}

impl Constraints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.list.push(constraint);
    }

    #[must_use]
    pub fn with_penalty(mut self, penalty: PenaltyConfig) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn set_penalty(&mut self, penalty: PenaltyConfig) {
        self.penalty = penalty;
    }

    #[must_use]
    pub fn penalty(&self) -> PenaltyConfig {
        self.penalty
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Constraint] {
        &self.list
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the sum of squared violations of `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values differs from the number of
    /// constraints.
    pub fn squared_violation<E>(&self, values: &[f64]) -> Result<f64, PenaltyError<E>> {
        if values.len() != self.list.len() {
            return Err(PenaltyError::ConstraintCount {
                expected: self.list.len(),
                found: values.len(),
            });
        }
        Ok(self
            .list
            .iter()
            .zip(values)
            .map(|(constraint, &g)| constraint.violation(g).powi(2))
            .sum())
    }
}

impl FromIterator<Constraint> for Constraints {
    fn from_iter<T: IntoIterator<Item = Constraint>>(iter: T) -> Self {
        Self {
            list: iter.into_iter().collect(),
            penalty: PenaltyConfig::default(),
        }
    }
}

/// Adapter that folds constraint violations into the objective.
///
/// The penalized objective is `f + w * Σ violation²` when minimizing and
/// `f - w * Σ violation²` when maximizing, so an infeasible point always
/// scores worse than the same objective at a feasible one.
pub struct Penalized<'a, P> {
    problem: P,
    constraints: &'a Constraints,
    goal: Goal,
}

impl<'a, P: OptimizationProblem> Penalized<'a, P> {
    pub fn new(problem: P, constraints: &'a Constraints, goal: Goal) -> Self {
        Self {
            problem,
            constraints,
            goal,
        }
    }

    /// Returns the sum of squared violations at a model input/output.
    ///
    /// # Errors
    ///
    /// Returns an error if the constraint values cannot be computed or their
    /// number differs from the number of constraints.
    pub fn squared_violation(
        &self,
        input: &P::Input,
        output: &P::Output,
    ) -> Result<f64, PenaltyError<P::Error>> {
        if self.constraints.is_empty() {
            return Ok(0.0);
        }
        let values = self
            .problem
            .constraints(input, output)
            .map_err(PenaltyError::Problem)?;
        self.constraints.squared_violation(&values)
    }
}

impl<P: OptimizationProblem> OptimizationProblem for Penalized<'_, P> {
    type Input = P::Input;
    type Output = P::Output;
    type Error = PenaltyError<P::Error>;

    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error> {
        self.problem.input(x).map_err(PenaltyError::Problem)
    }

    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error> {
        let objective = self
            .problem
            .objective(input, output)
            .map_err(PenaltyError::Problem)?;
        let penalty = self.constraints.penalty().weight() * self.squared_violation(input, output)?;
        Ok(match self.goal {
            Goal::Minimize => objective + penalty,
            Goal::Maximize => objective - penalty,
        })
    }

    fn constraints(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error> {
        self.problem
            .constraints(input, output)
            .map_err(PenaltyError::Problem)
    }
}
