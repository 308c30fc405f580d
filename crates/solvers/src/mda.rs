//! Multidisciplinary analysis: running coupled disciplines as one.
//!
//! Disciplines are coupled when one reads a variable another produces.
//! [`Coupled`] wraps a list of disciplines and resolves those couplings
//! according to a [`Formulation`], exposing the whole group as a single
//! [`Discipline`].

use log::{debug, trace};
use ndarray::Array1;
use thiserror::Error;

use gauge_core::{Discipline, DisciplineError, Values};

/// How couplings between disciplines are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formulation {
    /// Gauss-Seidel fixed-point sweeps until couplings stop changing.
    Mdf(Config),

    /// A single pass in list order, for feed-forward chains.
    Chain,
}

impl Default for Formulation {
    fn default() -> Self {
        Self::Mdf(Config::default())
    }
}

/// Fixed-point iteration settings.
///
/// Sweeps stop once the relative change of the coupling variables,
/// `‖Δc‖ / ‖c‖`, is at most `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    tolerance: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("tolerance must be finite and non-negative")]
    Tolerance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 20,
            tolerance: 1e-6,
        }
    }
}

impl Config {
    /// Creates a validated config.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iters` is zero or `tolerance` is negative or
    /// non-finite.
    pub fn new(max_iters: usize, tolerance: f64) -> Result<Self, ConfigError> {
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Tolerance);
        }
        Ok(Self {
            max_iters,
            tolerance,
        })
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

#[derive(Debug, Error)]
pub enum MdaError {
    #[error("no disciplines to couple")]
    NoDisciplines,

    #[error("couplings did not converge after {iters} iteration(s), residual {residual}")]
    NotConverged { iters: usize, residual: f64 },

    #[error(transparent)]
    Discipline(#[from] DisciplineError),
}

/// A group of disciplines executed as one.
pub struct Coupled {
    name: String,
    disciplines: Vec<Box<dyn Discipline>>,
    formulation: Formulation,
    inputs: Vec<String>,
    outputs: Vec<String>,
    couplings: Vec<String>,
}

impl std::fmt::Debug for Coupled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coupled")
            .field("name", &self.name)
            .field("formulation", &self.formulation)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("couplings", &self.couplings)
            .finish_non_exhaustive()
    }
}

impl Coupled {
    /// Groups `disciplines` under `formulation`.
    ///
    /// Inputs of the group are the discipline inputs that no discipline
    /// produces. Outputs are every discipline output, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`MdaError::NoDisciplines`] if the list is empty.
    pub fn new(
        disciplines: Vec<Box<dyn Discipline>>,
        formulation: Formulation,
    ) -> Result<Self, MdaError> {
        if disciplines.is_empty() {
            return Err(MdaError::NoDisciplines);
        }

        let mut outputs: Vec<String> = Vec::new();
        for discipline in &disciplines {
            push_unique(&mut outputs, discipline.output_names());
        }

        let mut inputs = Vec::new();
        let mut couplings = Vec::new();
        for discipline in &disciplines {
            for name in discipline.input_names() {
                let target = if outputs.contains(name) {
                    &mut couplings
                } else {
                    &mut inputs
                };
                push_unique(target, std::slice::from_ref(name));
            }
        }

        let names: Vec<&str> = disciplines.iter().map(|d| d.name()).collect();
        let name = if disciplines.len() == 1 {
            names[0].to_owned()
        } else {
            format!("mda({})", names.join(", "))
        };

        Ok(Self {
            name,
            disciplines,
            formulation,
            inputs,
            outputs,
            couplings,
        })
    }

    /// Returns the variables produced by one discipline and read by another.
    #[must_use]
    pub fn couplings(&self) -> &[String] {
        &self.couplings
    }

    #[must_use]
    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    #[must_use]
    pub fn disciplines(&self) -> &[Box<dyn Discipline>] {
        &self.disciplines
    }

    /// Runs the group on `input` merged over the disciplines' defaults.
    ///
    /// Coupling variables with no default start at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a discipline fails or the fixed-point iteration
    /// does not converge.
    pub fn run(&self, input: &Values) -> Result<Values, MdaError> {
        let mut local = self.default_inputs();
        local.extend(input.iter().map(|(k, v)| (k.clone(), v.clone())));

        match self.formulation {
            Formulation::Mdf(config) if !self.couplings.is_empty() => {
                for name in &self.couplings {
                    local
                        .entry(name.clone())
                        .or_insert_with(|| Array1::zeros(1));
                }
                self.fixed_point(&mut local, config)?;
            }
            _ => self.sweep(&mut local)?,
        }

        Ok(self
            .outputs
            .iter()
            .filter_map(|name| local.remove_entry(name))
            .collect())
    }

    fn sweep(&self, local: &mut Values) -> Result<(), MdaError> {
        for discipline in &self.disciplines {
            let output = discipline.execute(local)?;
            local.extend(output);
        }
        Ok(())
    }

    fn fixed_point(&self, local: &mut Values, config: Config) -> Result<(), MdaError> {
        let mut residual = f64::INFINITY;
        for iter in 1..=config.max_iters() {
            let before = self.coupling_values(local);
            self.sweep(local)?;
            let after = self.coupling_values(local);

            residual = relative_change(&before, &after);
            trace!("{}: iteration {iter}, residual {residual}", self.name);
            if residual <= config.tolerance() {
                debug!("{} converged in {iter} iteration(s)", self.name);
                return Ok(());
            }
        }
        Err(MdaError::NotConverged {
            iters: config.max_iters(),
            residual,
        })
    }

    fn coupling_values(&self, local: &Values) -> Vec<f64> {
        self.couplings
            .iter()
            .filter_map(|name| local.get(name))
            .flat_map(|array| array.iter().copied())
            .collect()
    }
}

impl Discipline for Coupled {
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
        let mut defaults = Values::new();
        for discipline in &self.disciplines {
            for (name, value) in discipline.default_inputs() {
                defaults.entry(name).or_insert(value);
            }
        }
        defaults
    }

    fn execute(&self, input: &Values) -> Result<Values, DisciplineError> {
        self.run(input).map_err(|error| match error {
            MdaError::Discipline(error) => error,
            other => DisciplineError::Failed {
                discipline: self.name.clone(),
                source: Box::new(other),
            },
        })
    }
}

fn push_unique(target: &mut Vec<String>, names: &[String]) {
    for name in names {
        if !target.contains(name) {
            target.push(name.clone());
        }
    }
}

fn relative_change(before: &[f64], after: &[f64]) -> f64 {
    if before.len() != after.len() {
        return f64::INFINITY;
    }
    let change = before
        .iter()
        .zip(after)
        .map(|(b, a)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt();
    let scale = after.iter().map(|a| a.powi(2)).sum::<f64>().sqrt();
    if scale > 0.0 { change / scale } else { change }
}
