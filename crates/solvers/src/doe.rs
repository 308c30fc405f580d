//! Design of experiments: running a discipline over a list of samples.
//!
//! A [`Sampler`] produces a sample matrix, one row per experiment. A
//! [`DoeScenario`] splits each row into its named variables, executes the
//! discipline and records the variables together with the observed outputs
//! in a [`Dataset`], keeping the sample order.

use log::{debug, info};
use ndarray::{Array2, s};
use thiserror::Error;

use gauge_core::{Dataset, DatasetError, Discipline, DisciplineError, Values};

#[derive(Debug, Error)]
pub enum DoeError {
    #[error("samples have {found} column(s), expected {expected}")]
    Dimension { expected: usize, found: usize },

    #[error("`{0}` is not an input of the discipline")]
    UnknownVariable(String),

    #[error("`{0}` is neither an input nor an output of the discipline")]
    UnknownObservable(String),

    #[error("the discipline did not return observable `{0}`")]
    MissingObservable(String),

    #[error(transparent)]
    Discipline(#[from] DisciplineError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Produces the samples of an experiment.
pub trait Sampler {
    /// Returns a matrix with one row per sample and `dimension` columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the sampler cannot produce samples of that width.
    fn samples(&self, dimension: usize) -> Result<Array2<f64>, DoeError>;
}

/// A sampler that replays a fixed sample matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDoe {
    samples: Array2<f64>,
}

impl CustomDoe {
    #[must_use]
    pub fn new(samples: Array2<f64>) -> Self {
        Self { samples }
    }

    #[must_use]
    pub fn matrix(&self) -> &Array2<f64> {
        &self.samples
    }
}

impl Sampler for CustomDoe {
    fn samples(&self, dimension: usize) -> Result<Array2<f64>, DoeError> {
        if self.samples.ncols() != dimension {
            return Err(DoeError::Dimension {
                expected: dimension,
                found: self.samples.ncols(),
            });
        }
        Ok(self.samples.clone())
    }
}

/// A discipline sampled over some of its inputs.
#[derive(Debug)]
pub struct DoeScenario<D> {
    discipline: D,
    variables: Vec<(String, usize)>,
    observables: Vec<String>,
}

impl<D: Discipline> DoeScenario<D> {
    /// Creates a scenario sampling `variables`, given as `(name, size)`
    /// pairs in sample-column order, and recording `observables`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is not a discipline input or an
    /// observable is neither an input nor an output.
    pub fn new(
        discipline: D,
        variables: Vec<(String, usize)>,
        observables: Vec<String>,
    ) -> Result<Self, DoeError> {
        if let Some((name, _)) = variables
            .iter()
            .find(|(name, _)| !discipline.input_names().contains(name))
        {
            return Err(DoeError::UnknownVariable(name.clone()));
        }

        let mut scenario = Self {
            discipline,
            variables,
            observables: Vec::new(),
        };
        for name in observables {
            scenario.add_observable(name)?;
        }
        Ok(scenario)
    }

    #[must_use]
    pub fn discipline(&self) -> &D {
        &self.discipline
    }

    #[must_use]
    pub fn variables(&self) -> &[(String, usize)] {
        &self.variables
    }

    #[must_use]
    pub fn observables(&self) -> &[String] {
        &self.observables
    }

    /// Returns the number of sample columns.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.variables.iter().map(|(_, size)| size).sum()
    }

    /// Records `name` in every sample; adding it twice has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`DoeError::UnknownObservable`] if the discipline neither
    /// reads nor produces `name`.
    pub fn add_observable(&mut self, name: impl Into<String>) -> Result<(), DoeError> {
        let name = name.into();
        let known = self.discipline.output_names().contains(&name)
            || self.discipline.input_names().contains(&name);
        if !known {
            return Err(DoeError::UnknownObservable(name));
        }
        if !self.observables.contains(&name) {
            self.observables.push(name);
        }
        Ok(())
    }

    /// Changes the number of columns a variable takes in each sample.
    ///
    /// # Errors
    ///
    /// Returns [`DoeError::UnknownVariable`] if `name` is not sampled.
    pub fn set_variable_size(&mut self, name: &str, size: usize) -> Result<(), DoeError> {
        let entry = self
            .variables
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .ok_or_else(|| DoeError::UnknownVariable(name.to_owned()))?;
        entry.1 = size;
        Ok(())
    }

    /// Executes the discipline once per sample, in sample order.
    ///
    /// Each row is split into the sampled variables and merged over
    /// `defaults`, themselves merged over the discipline's default inputs.
    /// The returned dataset holds the sampled variables and the observables.
    ///
    /// # Errors
    ///
    /// Returns an error if the samples have the wrong width, an execution
    /// fails, or an observable is missing from a result.
    pub fn execute(&self, sampler: &impl Sampler, defaults: &Values) -> Result<Dataset, DoeError> {
        let samples = sampler.samples(self.dimension())?;
        info!(
            "sampling `{}` at {} point(s)",
            self.discipline.name(),
            samples.nrows()
        );

        let mut base = self.discipline.default_inputs();
        base.extend(defaults.clone());

        let mut dataset = Dataset::new();
        for (index, row) in samples.rows().into_iter().enumerate() {
            let mut input = base.clone();
            let mut start = 0;
            for (name, size) in &self.variables {
                let values = row.slice(s![start..start + size]).to_owned();
                input.insert(name.clone(), values);
                start += size;
            }

            debug!("sample {index}: {input:?}");
            let output = self.discipline.execute(&input)?;

            let mut record: Values = self
                .variables
                .iter()
                .map(|(name, _)| (name.clone(), input[name].clone()))
                .collect();
            for name in &self.observables {
                let value = output
                    .get(name)
                    .or_else(|| input.get(name))
                    .ok_or_else(|| DoeError::MissingObservable(name.clone()))?;
                record.insert(name.clone(), value.clone());
            }
            dataset.push_row(&record)?;
        }
        Ok(dataset)
    }
}
