//! Calibration as an optimization over the parameters of a design space.

use std::{cell::RefCell, fmt};

use log::info;

use gauge_core::{Dataset, DesignSpace, Discipline, Model, OneOrMany, OptimizationProblem, Values};
use gauge_solvers::{
    mda::Formulation,
    optimization::{
        Algorithm, Constraint, ConstraintKind, Constraints, Goal, OptimizationResult,
        PenaltyConfig,
    },
};

use crate::{
    CalibrationError, CalibrationMeasureSpec, Calibrator, CalibratorOutput, MeasureFactory,
    post::{CalibrationData, Figure, History, HistoryEntry, PostFactory, PostOptions},
};

/// Where a scenario is in its lifecycle.
///
/// States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum State {
    Configured,
    ReferenceBound,
    Completed,
}

/// A constraint on a composite measure of the calibrator.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstraint {
    /// Display name, defaulting to the composite name.
    pub name: String,

    /// The composite measure constrained.
    pub measure: String,

    /// The calibrated parameters.
    pub parameters: Vec<String>,

    pub constraint: Constraint,
}

impl fmt::Display for NamedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {}",
            self.name,
            self.parameters.join(", "),
            self.constraint
        )
    }
}

#[derive(Debug)]
struct Results {
    prior_model_data: Dataset,
    posterior_parameters: Values,
    posterior_model_data: Dataset,
    optimization: OptimizationResult<Values, CalibratorOutput>,
    history: History,
}

/// Calibrates the parameters of coupled disciplines against reference data.
///
/// The scenario minimizes (or maximizes) the objective measure of a
/// [`Calibrator`] over the bounds of a calibration [`DesignSpace`], starting
/// from its current values, subject to constraints on further measures.
///
/// # Example
///
/// ```
/// use gauge_calibration::{CalibrationMeasureSpec, CalibrationScenario};
/// use gauge_core::{Dataset, DesignSpace, Discipline, FnDiscipline, Values, ValuesExt};
/// use gauge_solvers::{mda::Formulation, optimization::Algorithm};
/// use ndarray::array;
///
/// let line = FnDiscipline::new("line", ["x", "a"], ["y"], |v: &Values| {
///     Ok(Values::from([("y".to_owned(), array![v.scalar("a")? * v.scalar("x")?])]))
/// });
/// let space = DesignSpace::new().with_scalar("a", 0.0, 10.0, 1.0).unwrap();
///
/// let mut scenario = CalibrationScenario::new(
///     Box::new(line) as Box<dyn Discipline>,
///     "x",
///     CalibrationMeasureSpec::new("y"),
///     &space,
///     Formulation::Chain,
/// )
/// .unwrap();
///
/// let reference = Dataset::new()
///     .with("x", array![[1.0]])
///     .unwrap()
///     .with("y", array![[2.0]])
///     .unwrap();
/// scenario
///     .execute_with(Algorithm::from_name("GoldenSection").unwrap(), reference)
///     .unwrap();
///
/// let a = scenario.posterior_parameters().unwrap()["a"][0];
/// assert!((a - 2.0).abs() < 1e-4);
/// ```
#[derive(Debug)]
pub struct CalibrationScenario {
    name: String,
    calibrator: Calibrator,
    space: DesignSpace,
    prior: Values,
    constraints: Vec<NamedConstraint>,
    penalty: PenaltyConfig,
    algorithm: Algorithm,
    reference: Option<Dataset>,
    posts: PostFactory,
    state: State,
    results: Option<Results>,
}

impl CalibrationScenario {
    /// Creates a scenario calibrating the variables of `space`.
    ///
    /// The prior parameters are the current values of `space`.
    ///
    /// # Errors
    ///
    /// Returns an error if the [`Calibrator`] cannot be built.
    pub fn new(
        disciplines: impl Into<OneOrMany<Box<dyn Discipline>>>,
        input_names: impl Into<OneOrMany<String>>,
        control_outputs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
        calibration_space: &DesignSpace,
        formulation: Formulation,
    ) -> Result<Self, CalibrationError> {
        Self::with_factory(
            MeasureFactory::new(),
            disciplines,
            input_names,
            control_outputs,
            calibration_space,
            formulation,
        )
    }

    /// Creates a scenario whose measures come from `factory`.
    ///
    /// # Errors
    ///
    /// See [`CalibrationScenario::new`].
    pub fn with_factory(
        factory: MeasureFactory,
        disciplines: impl Into<OneOrMany<Box<dyn Discipline>>>,
        input_names: impl Into<OneOrMany<String>>,
        control_outputs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
        calibration_space: &DesignSpace,
        formulation: Formulation,
    ) -> Result<Self, CalibrationError> {
        let parameter_names: Vec<String> = calibration_space.names().map(str::to_owned).collect();
        let calibrator = Calibrator::with_factory(
            factory,
            disciplines,
            input_names,
            control_outputs,
            parameter_names,
            formulation,
        )?;
        let name = format!("Calibration of {}", calibrator.objective_name());

        Ok(Self {
            name,
            calibrator,
            space: calibration_space.clone(),
            prior: calibration_space.current_values(),
            constraints: Vec::new(),
            penalty: PenaltyConfig::default(),
            algorithm: Algorithm::default(),
            reference: None,
            posts: PostFactory::new(),
            state: State::Configured,
            results: None,
        })
    }

    /// Constrains a new composite measure built from `specs`.
    ///
    /// `name` defaults to the composite name. `positive` turns an
    /// inequality `g <= value` into `g >= value`.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::AlreadyExecuted`] once the scenario has
    /// completed, or an error if the measure cannot be added.
    pub fn add_constraint(
        &mut self,
        specs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
        kind: ConstraintKind,
        name: Option<&str>,
        value: f64,
        positive: bool,
    ) -> Result<&NamedConstraint, CalibrationError> {
        self.ensure_not_completed()?;

        let (measure, _) = self.calibrator.add_measure(specs)?;
        let constraint = NamedConstraint {
            name: name.map_or_else(|| measure.clone(), str::to_owned),
            measure,
            parameters: self.calibrator.parameter_names().to_vec(),
            constraint: Constraint {
                kind,
                value,
                positive,
            },
        };
        info!("adding constraint {constraint}");

        self.constraints
            .retain(|existing| existing.measure != constraint.measure);
        self.constraints.push(constraint);
        Ok(&self.constraints[self.constraints.len() - 1])
    }

    /// Sets the weight of the constraint penalty.
    pub fn set_penalty(&mut self, penalty: PenaltyConfig) {
        self.penalty = penalty;
    }

    /// Binds the reference data and the optimizer.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::AlreadyExecuted`] once the scenario has
    /// completed.
    pub fn set_algorithm(
        &mut self,
        reference_data: Dataset,
        algorithm: Algorithm,
    ) -> Result<(), CalibrationError> {
        self.ensure_not_completed()?;
        self.reference = Some(reference_data);
        self.algorithm = algorithm;
        self.state = State::ReferenceBound;
        Ok(())
    }

    /// Binds the reference data and the optimizer, then executes.
    ///
    /// # Errors
    ///
    /// See [`CalibrationScenario::execute`].
    pub fn execute_with(
        &mut self,
        algorithm: Algorithm,
        reference_data: Dataset,
    ) -> Result<(), CalibrationError> {
        self.set_algorithm(reference_data, algorithm)?;
        self.execute()
    }

    /// Runs the calibration.
    ///
    /// The disciplines are run at the prior parameters, the objective is
    /// optimized from there, and the disciplines are run again at the
    /// posterior parameters, which become the calibrator defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::NoReferenceData`] if no reference data is
    /// bound, [`CalibrationError::AlreadyExecuted`] on a second run, or the
    /// first error raised along the way. Nothing is recorded on error.
    pub fn execute(&mut self) -> Result<(), CalibrationError> {
        self.ensure_not_completed()?;
        let reference = self
            .reference
            .clone()
            .ok_or(CalibrationError::NoReferenceData)?;

        info!(
            "{}: {} over {} with {} constraint(s)",
            self.name,
            self.algorithm.name(),
            self.calibrator.parameter_names().join(", "),
            self.constraints.len()
        );
        info!("prior parameters {:?}", self.prior);

        self.calibrator.set_reference_data(reference)?;
        let prior_model_data = self.calibrator.execute(&self.prior)?.model_data;

        let problem = CalibrationProblem {
            space: &self.space,
            objective: self.calibrator.objective_name().to_owned(),
            constraints: self
                .constraints
                .iter()
                .map(|constraint| constraint.measure.clone())
                .collect(),
        };
        let constraints: Constraints = self
            .constraints
            .iter()
            .map(|constraint| constraint.constraint)
            .collect::<Constraints>()
            .with_penalty(self.penalty);
        let goal = Goal::from_maximize(self.calibrator.maximize_objective());
        let bounds = self.space.bounds();
        let x0 = self.space.to_vector(&self.prior)?;

        let entries = RefCell::new(Vec::new());
        let optimization = {
            let record = |parameters: &Values, output: &CalibratorOutput| {
                entries.borrow_mut().push(HistoryEntry {
                    parameters: parameters.clone(),
                    measures: output.measures.clone(),
                });
            };
            let recorder = (&self.calibrator).inspect(record);
            self.algorithm
                .solve(&recorder, &problem, &bounds, &x0, goal, &constraints)?
        };
        let history = History {
            objective_name: problem.objective.clone(),
            constraint_names: problem.constraints.clone(),
            entries: entries.into_inner(),
        };

        let posterior_parameters = self.space.from_vector(&optimization.x)?;
        let posterior_model_data = self.calibrator.execute(&posterior_parameters)?.model_data;

        info!(
            "{}: {:?} after {} evaluation(s)",
            self.name, optimization.status, optimization.evaluations
        );
        info!("posterior parameters {posterior_parameters:?}");

        let mut defaults = self.calibrator.default_parameters().clone();
        defaults.extend(posterior_parameters.clone());
        self.calibrator.set_default_parameters(defaults);

        self.results = Some(Results {
            prior_model_data,
            posterior_parameters,
            posterior_model_data,
            optimization,
            history,
        });
        self.state = State::Completed;
        Ok(())
    }

    /// Builds the figure of the post-processing `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::NotExecuted`] before completion, or an
    /// error if the post-processing is unknown or fails.
    pub fn post_process(
        &self,
        name: &str,
        options: &PostOptions,
    ) -> Result<Figure, CalibrationError> {
        let results = self.results()?;
        let reference = self
            .calibrator
            .reference_data()
            .ok_or(CalibrationError::NoReferenceData)?;
        let data = CalibrationData {
            reference,
            prior: &results.prior_model_data,
            posterior: &results.posterior_model_data,
        };
        self.posts.execute(name, &data, &results.history, options)
    }

    /// Returns the available post-processings.
    #[must_use]
    pub fn posts(&self) -> Vec<&str> {
        self.posts.names()
    }

    /// Gives access to the post-processing registries.
    pub fn posts_mut(&mut self) -> &mut PostFactory {
        &mut self.posts
    }

    fn ensure_not_completed(&self) -> Result<(), CalibrationError> {
        if self.state == State::Completed {
            Err(CalibrationError::AlreadyExecuted)
        } else {
            Ok(())
        }
    }

    fn results(&self) -> Result<&Results, CalibrationError> {
        self.results.as_ref().ok_or(CalibrationError::NotExecuted)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    #[must_use]
    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    #[must_use]
    pub fn prior_parameters(&self) -> &Values {
        &self.prior
    }

    #[must_use]
    pub fn reference_data(&self) -> Option<&Dataset> {
        self.reference.as_ref()
    }

    #[must_use]
    pub fn posterior_parameters(&self) -> Option<&Values> {
        self.results.as_ref().map(|r| &r.posterior_parameters)
    }

    #[must_use]
    pub fn prior_model_data(&self) -> Option<&Dataset> {
        self.results.as_ref().map(|r| &r.prior_model_data)
    }

    #[must_use]
    pub fn posterior_model_data(&self) -> Option<&Dataset> {
        self.results.as_ref().map(|r| &r.posterior_model_data)
    }

    #[must_use]
    pub fn optimization_result(&self) -> Option<&OptimizationResult<Values, CalibratorOutput>> {
        self.results.as_ref().map(|r| &r.optimization)
    }

    #[must_use]
    pub fn history(&self) -> Option<&History> {
        self.results.as_ref().map(|r| &r.history)
    }
}

/// Maps solver vectors onto the calibration space and reads measures back.
struct CalibrationProblem<'a> {
    space: &'a DesignSpace,
    objective: String,
    constraints: Vec<String>,
}

impl OptimizationProblem for CalibrationProblem<'_> {
    type Input = Values;
    type Output = CalibratorOutput;
    type Error = CalibrationError;

    fn input(&self, x: &[f64]) -> Result<Values, CalibrationError> {
        Ok(self.space.from_vector(x)?)
    }

    fn objective(
        &self,
        _input: &Values,
        output: &CalibratorOutput,
    ) -> Result<f64, CalibrationError> {
        output.measure(&self.objective)
    }

    fn constraints(
        &self,
        _input: &Values,
        output: &CalibratorOutput,
    ) -> Result<Vec<f64>, CalibrationError> {
        self.constraints
            .iter()
            .map(|name| output.measure(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    use gauge_core::{FnDiscipline, ValuesExt};

    fn scenario() -> CalibrationScenario {
        let line = FnDiscipline::new("line", ["x", "a"], ["y"], |v: &Values| {
            Ok(Values::from([(
                "y".to_owned(),
                array![v.scalar("a")? * v.scalar("x")?],
            )]))
        });
        let space = DesignSpace::new().with_scalar("a", 0.0, 5.0, 1.0).unwrap();
        CalibrationScenario::new(
            Box::new(line) as Box<dyn Discipline>,
            "x",
            CalibrationMeasureSpec::new("y"),
            &space,
            Formulation::Chain,
        )
        .unwrap()
    }

    #[test]
    fn starts_configured_with_the_space_values_as_prior() {
        let scenario = scenario();

        assert_eq!(scenario.state(), State::Configured);
        assert_eq!(scenario.name(), "Calibration of MSE[y]");
        assert_eq!(scenario.prior_parameters()["a"], array![1.0]);
        assert!(scenario.posterior_parameters().is_none());
        assert_eq!(scenario.posts(), ["DataVersusModel", "OptHistory"]);
    }

    #[test]
    fn executing_without_reference_data_fails() {
        let mut scenario = scenario();
        assert!(matches!(
            scenario.execute(),
            Err(CalibrationError::NoReferenceData)
        ));
        assert!(matches!(
            scenario.post_process("OptHistory", &PostOptions::default()),
            Err(CalibrationError::NotExecuted)
        ));
    }

    #[test]
    fn constraints_display_their_sense() {
        let mut scenario = scenario();

        let shown = scenario
            .add_constraint(
                CalibrationMeasureSpec::new("y").measure("MAE"),
                ConstraintKind::Inequality,
                Some("error"),
                0.05,
                false,
            )
            .unwrap()
            .to_string();
        assert_eq!(shown, "error(a) <= 0.05");

        let shown = scenario
            .add_constraint(
                CalibrationMeasureSpec::new("y").measure("MAE"),
                ConstraintKind::Equality,
                None,
                0.0,
                false,
            )
            .unwrap()
            .to_string();
        assert_eq!(shown, "MAE[y](a) == 0");
        assert_eq!(scenario.constraints().len(), 1);
        assert_eq!(scenario.calibrator().output_names(), ["MSE[y]", "MAE[y]"]);
    }

    #[test]
    fn binding_moves_the_state_forward() {
        let mut scenario = scenario();
        let reference = Dataset::new()
            .with("x", array![[1.0]])
            .unwrap()
            .with("y", array![[2.0]])
            .unwrap();

        scenario
            .set_algorithm(reference, Algorithm::default())
            .unwrap();
        assert_eq!(scenario.state(), State::ReferenceBound);
        assert!(scenario.reference_data().is_some());
    }
}
