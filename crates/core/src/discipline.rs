use std::collections::BTreeMap;

use ndarray::Array1;
use thiserror::Error;

/// One sample of named 1D arrays, used as discipline input and output.
pub type Values = BTreeMap<String, Array1<f64>>;

/// Errors that can occur when executing a [`Discipline`].
#[derive(Debug, Error)]
pub enum DisciplineError {
    #[error("`{discipline}` is missing input `{name}`")]
    MissingInput { discipline: String, name: String },

    #[error("`{discipline}` did not produce output `{name}`")]
    MissingOutput { discipline: String, name: String },

    #[error("variable `{0}` is missing")]
    MissingVariable(String),

    #[error("variable `{0}` is empty")]
    Empty(String),

    #[error("`{discipline}` failed")]
    Failed {
        discipline: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Typed access to entries of [`Values`].
pub trait ValuesExt {
    /// Returns the array stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DisciplineError::MissingVariable`] if it is absent.
    fn array(&self, name: &str) -> Result<&Array1<f64>, DisciplineError>;

    /// Returns the first component of the array stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is absent or empty.
    fn scalar(&self, name: &str) -> Result<f64, DisciplineError>;
}

impl ValuesExt for Values {
    fn array(&self, name: &str) -> Result<&Array1<f64>, DisciplineError> {
        self.get(name)
            .ok_or_else(|| DisciplineError::MissingVariable(name.to_owned()))
    }

    fn scalar(&self, name: &str) -> Result<f64, DisciplineError> {
        self.array(name)?
            .first()
            .copied()
            .ok_or_else(|| DisciplineError::Empty(name.to_owned()))
    }
}

/// A model exchanging named arrays, with declared inputs and outputs.
///
/// Disciplines are the unit of execution that calibration drives: they are
/// sampled at reference inputs, possibly coupled with each other, and their
/// outputs are compared against observations.
pub trait Discipline {
    /// Returns a human-readable name, used in errors and logs.
    fn name(&self) -> &str;

    /// Returns the names of the inputs the discipline reads.
    fn input_names(&self) -> &[String];

    /// Returns the names of the outputs the discipline produces.
    fn output_names(&self) -> &[String];

    /// Returns default values for (some of) the inputs.
    fn default_inputs(&self) -> Values {
        Values::new()
    }

    /// Executes the discipline.
    ///
    /// # Errors
    ///
    /// Returns an error if an input is missing or the computation fails.
    fn execute(&self, input: &Values) -> Result<Values, DisciplineError>;
}

impl<D: Discipline + ?Sized> Discipline for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_names(&self) -> &[String] {
        (**self).input_names()
    }

    fn output_names(&self) -> &[String] {
        (**self).output_names()
    }

    fn default_inputs(&self) -> Values {
        (**self).default_inputs()
    }

    fn execute(&self, input: &Values) -> Result<Values, DisciplineError> {
        (**self).execute(input)
    }
}

/// A discipline backed by a closure.
///
/// Given inputs are merged over the defaults before the closure runs, every
/// declared input must then be present, and every declared output must be
/// produced. Extra closure outputs are dropped.
///
/// # Example
///
/// ```
/// use gauge_core::{Discipline, FnDiscipline, Values, ValuesExt};
/// use ndarray::array;
///
/// let line = FnDiscipline::new("line", ["a", "x"], ["y"], |v: &Values| {
///     let y = v.scalar("a")? * v.scalar("x")?;
///     Ok(Values::from([("y".to_owned(), array![y])]))
/// })
/// .with_default("a", array![2.0]);
///
/// let output = line
///     .execute(&Values::from([("x".to_owned(), array![3.0])]))
///     .unwrap();
/// assert_eq!(output["y"], array![6.0]);
/// ```
pub struct FnDiscipline<F> {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    defaults: Values,
    function: F,
}

impl<F> FnDiscipline<F>
where
    F: Fn(&Values) -> Result<Values, DisciplineError>,
{
    /// Creates a discipline from its declared names and a closure.
    pub fn new<I, O>(name: impl Into<String>, inputs: I, outputs: O, function: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            defaults: Values::new(),
            function,
        }
    }

    /// Sets the default value of an input.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: Array1<f64>) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }
}

impl<F> Discipline for FnDiscipline<F>
where
    F: Fn(&Values) -> Result<Values, DisciplineError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }

    fn default_inputs(&self) -> Values {
        self.defaults.clone()
    }

    fn execute(&self, input: &Values) -> Result<Values, DisciplineError> {
        let mut merged = self.defaults.clone();
        merged.extend(input.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(name) = self.inputs.iter().find(|name| !merged.contains_key(*name)) {
            return Err(DisciplineError::MissingInput {
                discipline: self.name.clone(),
                name: name.clone(),
            });
        }

        let mut produced = (self.function)(&merged)?;
        self.outputs
            .iter()
            .map(|name| {
                produced
                    .remove(name)
                    .map(|value| (name.clone(), value))
                    .ok_or_else(|| DisciplineError::MissingOutput {
                        discipline: self.name.clone(),
                        name: name.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    fn line() -> impl Discipline {
        FnDiscipline::new("line", ["a", "x"], ["y"], |v: &Values| {
            let y = v.array("x")? * v.scalar("a")?;
            Ok(Values::from([
                ("y".to_owned(), y),
                ("scratch".to_owned(), array![0.0]),
            ]))
        })
        .with_default("a", array![0.5])
    }

    #[test]
    fn defaults_fill_missing_inputs() {
        let output = line()
            .execute(&Values::from([("x".to_owned(), array![1.0, 2.0])]))
            .unwrap();

        assert_eq!(output["y"], array![0.5, 1.0]);
    }

    #[test]
    fn given_inputs_override_defaults() {
        let input = Values::from([
            ("x".to_owned(), array![1.0]),
            ("a".to_owned(), array![3.0]),
        ]);
        let output = line().execute(&input).unwrap();

        assert_eq!(output["y"], array![3.0]);
    }

    #[test]
    fn undeclared_outputs_are_dropped() {
        let output = line()
            .execute(&Values::from([("x".to_owned(), array![1.0])]))
            .unwrap();

        assert_eq!(output.keys().collect::<Vec<_>>(), ["y"]);
    }

    #[test]
    fn missing_input_is_reported() {
        let error = line().execute(&Values::new()).unwrap_err();
        assert!(matches!(
            error,
            DisciplineError::MissingInput { ref name, .. } if name == "x"
        ));
    }

    #[test]
    fn missing_output_is_reported() {
        let silent = FnDiscipline::new("silent", ["x"], ["y"], |_: &Values| Ok(Values::new()));
        let error = silent
            .execute(&Values::from([("x".to_owned(), array![1.0])]))
            .unwrap_err();

        assert!(matches!(error, DisciplineError::MissingOutput { .. }));
    }

    #[test]
    fn boxed_disciplines_delegate() {
        let boxed: Box<dyn Discipline> = Box::new(line());
        assert_eq!(boxed.name(), "line");
        assert_eq!(boxed.input_names(), ["a", "x"]);
        assert_eq!(boxed.default_inputs()["a"], array![0.5]);
    }

    #[test]
    fn scalar_of_empty_array_is_an_error() {
        let values = Values::from([("a".to_owned(), Array1::zeros(0))]);
        assert!(matches!(values.scalar("a"), Err(DisciplineError::Empty(_))));
        assert!(matches!(
            values.scalar("b"),
            Err(DisciplineError::MissingVariable(_))
        ));
    }
}
