//! Runs disciplines at the reference inputs and measures the mismatch.

mod quiet;

pub(crate) use quiet::QuietLogs;

use std::collections::BTreeMap;

use log::{LevelFilter, debug};
use ndarray::{ArrayView1, array};

use gauge_core::{Dataset, Discipline, DisciplineError, Model, OneOrMany, Values};
use gauge_solvers::{
    doe::{CustomDoe, DoeError, DoeScenario},
    mda::{Coupled, Formulation},
};

use crate::{
    CalibrationError, CalibrationMeasureSpec, CompositeMeasure, MeasureError, MeasureFactory,
    compose,
};

/// The result of one calibrator run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratorOutput {
    /// Value of every composite measure, by name.
    pub measures: BTreeMap<String, f64>,

    /// The model data sampled at the reference inputs.
    pub model_data: Dataset,
}

impl CalibratorOutput {
    /// Returns the value of a composite measure.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::MissingMeasure`] if there is no such
    /// measure.
    pub fn measure(&self, name: &str) -> Result<f64, CalibrationError> {
        self.measures
            .get(name)
            .copied()
            .ok_or_else(|| CalibrationError::MissingMeasure(name.to_owned()))
    }
}

#[derive(Debug)]
struct Reference {
    data: Dataset,
    doe: CustomDoe,
}

/// Turns "run the disciplines at the reference inputs" into named measures.
///
/// A calibrator samples the coupled disciplines at exactly the input rows of
/// the reference data, with the parameters under calibration fixed, and
/// compares the resulting model data with the reference data through one or
/// more composite measures. The first composite is the objective; later
/// ones serve as constraints.
///
/// It is both a [`Model`] from parameters to measures and a
/// [`Discipline`] whose outputs are the composite names.
#[derive(Debug)]
pub struct Calibrator {
    scenario: DoeScenario<Coupled>,
    factory: MeasureFactory,
    input_names: Vec<String>,
    parameter_names: Vec<String>,
    measures: Vec<CompositeMeasure>,
    output_names: Vec<String>,
    defaults: Values,
    reference: Option<Reference>,
}

impl Calibrator {
    /// Creates a calibrator with the built-in measure kinds.
    ///
    /// `input_names` are the inputs read from the reference data; their
    /// sizes are taken from it. `control_outputs` define the objective.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no control outputs, a name is unknown
    /// to the disciplines, or the measures are misconfigured.
    pub fn new(
        disciplines: impl Into<OneOrMany<Box<dyn Discipline>>>,
        input_names: impl Into<OneOrMany<String>>,
        control_outputs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
        parameter_names: impl Into<OneOrMany<String>>,
        formulation: Formulation,
    ) -> Result<Self, CalibrationError> {
        Self::with_factory(
            MeasureFactory::new(),
            disciplines,
            input_names,
            control_outputs,
            parameter_names,
            formulation,
        )
    }

    /// Creates a calibrator drawing its measures from `factory`.
    ///
    /// # Errors
    ///
    /// See [`Calibrator::new`].
    pub fn with_factory(
        factory: MeasureFactory,
        disciplines: impl Into<OneOrMany<Box<dyn Discipline>>>,
        input_names: impl Into<OneOrMany<String>>,
        control_outputs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
        parameter_names: impl Into<OneOrMany<String>>,
        formulation: Formulation,
    ) -> Result<Self, CalibrationError> {
        let control_outputs = control_outputs.into().into_vec();
        if control_outputs.is_empty() {
            return Err(crate::ConfigError::NoMeasures.into());
        }

        let coupled = Coupled::new(disciplines.into().into_vec(), formulation)?;
        let input_names = input_names.into().into_vec();
        let parameter_names = parameter_names.into().into_vec();
        for name in input_names.iter().chain(&parameter_names) {
            if !coupled.input_names().contains(name) {
                return Err(CalibrationError::MissingObservable(name.clone()));
            }
        }

        let defaults = coupled
            .default_inputs()
            .into_iter()
            .filter(|(name, _)| parameter_names.contains(name))
            .collect();
        let variables = input_names.iter().map(|name| (name.clone(), 1)).collect();
        let scenario = DoeScenario::new(coupled, variables, Vec::new())?;

        let mut calibrator = Self {
            scenario,
            factory,
            input_names,
            parameter_names,
            measures: Vec::new(),
            output_names: Vec::new(),
            defaults,
            reference: None,
        };
        calibrator.add_measure(control_outputs)?;
        Ok(calibrator)
    }

    /// Adds a composite measure built from `specs`.
    ///
    /// The variables it reads are recorded from then on. A composite with
    /// the name of an existing one replaces it. If reference data is set,
    /// the composite receives it immediately.
    ///
    /// Returns the composite name and the variables it reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the specs are invalid, if a variable is unknown
    /// to the disciplines, or if the reference data lacks a variable.
    pub fn add_measure(
        &mut self,
        specs: impl Into<OneOrMany<CalibrationMeasureSpec>>,
    ) -> Result<(String, Vec<String>), CalibrationError> {
        let specs = specs.into().into_vec();
        let (mut composite, required) = compose(&self.factory, &specs)?;

        for name in &required {
            self.scenario
                .add_observable(name.as_str())
                .map_err(|error| match error {
                    DoeError::UnknownObservable(name) => CalibrationError::MissingObservable(name),
                    other => other.into(),
                })?;
        }
        if let Some(reference) = &self.reference {
            composite.set_reference_data(&reference.data)?;
        }

        let name = composite.name().to_owned();
        debug!("adding measure {name}");
        let existing = self.output_names.iter().position(|n| *n == name);
        match existing {
            Some(index) => self.measures[index] = composite,
            None => {
                self.measures.push(composite);
                self.output_names.push(name.clone());
            }
        }
        Ok((name, required))
    }

    /// Binds the reference data.
    ///
    /// Input sizes are read from the data, its input rows become the samples
    /// of every run, and every composite receives it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data lacks an input or a variable a measure
    /// reads.
    ///
    /// Nothing changes unless the whole binding succeeds.
    pub fn set_reference_data(&mut self, data: Dataset) -> Result<(), CalibrationError> {
        let mut sizes = Vec::with_capacity(self.input_names.len());
        for name in &self.input_names {
            sizes.push(data.get(name)?.ncols());
        }
        let doe = CustomDoe::new(data.hstack(&self.input_names)?);
        for composite in &self.measures {
            for (_, measure) in composite.terms() {
                let names = std::iter::once(measure.output_name()).chain(measure.mesh_name());
                for name in names {
                    data.get(name).map_err(MeasureError::from)?;
                }
            }
        }

        for (name, size) in self.input_names.iter().zip(sizes) {
            self.scenario.set_variable_size(name, size)?;
        }
        for composite in &mut self.measures {
            composite.set_reference_data(&data)?;
        }
        self.reference = Some(Reference { data, doe });
        Ok(())
    }

    /// Runs the disciplines at every reference input row and evaluates the
    /// composite measures.
    ///
    /// `parameters` take precedence over the default parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if no reference data is set, a run fails, the model
    /// rows come back in a different order, or a measure fails.
    pub fn execute(&self, parameters: &Values) -> Result<CalibratorOutput, CalibrationError> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(CalibrationError::NoReferenceData)?;

        let mut inputs = self.defaults.clone();
        inputs.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));

        let model_data = {
            let _quiet = QuietLogs::new(LevelFilter::Warn);
            self.scenario.execute(&reference.doe, &inputs)?
        };
        self.check_row_order(&reference.data, &model_data)?;

        let mut measures = BTreeMap::new();
        for composite in &self.measures {
            measures.insert(
                composite.name().to_owned(),
                composite.evaluate(&model_data)?,
            );
        }
        debug!("{parameters:?} -> {measures:?}");

        Ok(CalibratorOutput {
            measures,
            model_data,
        })
    }

    fn check_row_order(
        &self,
        reference: &Dataset,
        model: &Dataset,
    ) -> Result<(), CalibrationError> {
        for name in &self.input_names {
            let expected = reference.get(name)?;
            let found = model.get(name)?;
            for (row, (e, f)) in expected.rows().into_iter().zip(found.rows()).enumerate() {
                if !same_row(e, f) {
                    return Err(CalibrationError::RowOrder {
                        name: name.clone(),
                        row,
                    });
                }
            }
            if expected.nrows() != found.nrows() {
                return Err(CalibrationError::RowOrder {
                    name: name.clone(),
                    row: expected.nrows().min(found.nrows()),
                });
            }
        }
        Ok(())
    }

    /// Returns the name of the objective composite.
    #[must_use]
    pub fn objective_name(&self) -> &str {
        &self.output_names[0]
    }

    /// Returns the composite names, objective first.
    #[must_use]
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Returns the composite measure named `name`.
    #[must_use]
    pub fn measure(&self, name: &str) -> Option<&CompositeMeasure> {
        self.measures.iter().find(|composite| composite.name() == name)
    }

    /// Returns `true` if the objective is to be maximized.
    #[must_use]
    pub fn maximize_objective(&self) -> bool {
        self.measures[0].maximize()
    }

    #[must_use]
    pub fn reference_data(&self) -> Option<&Dataset> {
        self.reference.as_ref().map(|reference| &reference.data)
    }

    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    #[must_use]
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    #[must_use]
    pub fn default_parameters(&self) -> &Values {
        &self.defaults
    }

    pub fn set_default_parameters(&mut self, parameters: Values) {
        self.defaults = parameters;
    }

    #[must_use]
    pub fn factory(&self) -> &MeasureFactory {
        &self.factory
    }
}

fn same_row(expected: ArrayView1<'_, f64>, found: ArrayView1<'_, f64>) -> bool {
    expected.len() == found.len()
        && expected
            .iter()
            .zip(found.iter())
            .all(|(e, f)| e == f || (e.is_nan() && f.is_nan()))
}

impl Model for Calibrator {
    type Input = Values;
    type Output = CalibratorOutput;
    type Error = CalibrationError;

    fn call(&self, parameters: &Values) -> Result<CalibratorOutput, CalibrationError> {
        self.execute(parameters)
    }
}

impl Discipline for Calibrator {
    fn name(&self) -> &str {
        "Calibrator"
    }

    fn input_names(&self) -> &[String] {
        &self.parameter_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn default_inputs(&self) -> Values {
        self.defaults.clone()
    }

    fn execute(&self, input: &Values) -> Result<Values, DisciplineError> {
        let output = Calibrator::execute(self, input).map_err(|error| DisciplineError::Failed {
            discipline: "Calibrator".to_owned(),
            source: Box::new(error),
        })?;
        Ok(output
            .measures
            .into_iter()
            .map(|(name, value)| (name, array![value]))
            .collect())
    }
}
