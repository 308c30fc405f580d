//! Measures comparing model data with reference data.
//!
//! A measure reduces the gap between the model and reference values of one
//! output to a scalar. Two families are built in:
//!
//! - mean measures compare both datasets element by element and average the
//!   result over the pairs where neither side is NaN;
//! - integrated measures interpolate the model values of each row onto the
//!   reference mesh of that row, compare, and integrate over the mesh with
//!   the trapezoidal rule. The row integrals are then averaged.
//!
//! The element-wise comparison is a separate [`Comparison`] strategy, so
//! `MSE`, `MAE`, `ISE` and `IAE` are the four combinations of
//! {mean, integrated} and {squared, absolute}.

mod comparison;
mod integrated;
mod mean;

use std::fmt;

use ndarray::Array2;

use gauge_core::Dataset;

use crate::MeasureError;

pub use comparison::Comparison;

/// A scalar comparison between the model and reference data of one output.
pub trait CalibrationMeasure: fmt::Debug {
    /// Returns the measure kind, such as `MSE`.
    fn kind(&self) -> &str;

    fn output_name(&self) -> &str;

    /// Returns the mesh the output is defined on, for integrated measures.
    fn mesh_name(&self) -> Option<&str>;

    /// Returns `true` if larger values mean a better match.
    fn maximize(&self) -> bool;

    /// Captures the reference values (and mesh) the model is compared with.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset lacks the output or the mesh.
    fn set_reference_data(&mut self, reference: &Dataset) -> Result<(), MeasureError>;

    /// Compares the model data with the captured reference data.
    ///
    /// # Errors
    ///
    /// Returns an error if no reference data was set, if the model data
    /// lacks a variable, or if the data cannot be compared.
    fn evaluate(&self, model: &Dataset) -> Result<f64, MeasureError>;

    /// Returns `Kind(output)`, or `Kind(output;mesh)` for integrated measures.
    fn name(&self) -> String {
        match self.mesh_name() {
            Some(mesh) => format!("{}({};{mesh})", self.kind(), self.output_name()),
            None => format!("{}({})", self.kind(), self.output_name()),
        }
    }

    /// Returns `output`, or `output[mesh]` for integrated measures.
    fn full_output_name(&self) -> String {
        match self.mesh_name() {
            Some(mesh) => format!("{}[{mesh}]", self.output_name()),
            None => self.output_name().to_owned(),
        }
    }

    /// Returns the variables the measure reads from a dataset.
    fn required_names(&self) -> Vec<String> {
        let mut names = vec![self.output_name().to_owned()];
        names.extend(self.mesh_name().map(str::to_owned));
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Family {
    Mean,
    Integrated { mesh_name: String },
}

#[derive(Debug, Clone)]
struct Reference {
    values: Array2<f64>,
    mesh: Option<Array2<f64>>,
}

/// A built-in measure: a family combined with a comparison.
#[derive(Debug, Clone)]
pub struct Measure {
    kind: String,
    output_name: String,
    family: Family,
    compare: Comparison,
    maximize: bool,
    reference: Option<Reference>,
}

impl Measure {
    /// A NaN-aware mean of the element-wise comparison.
    pub fn mean(kind: impl Into<String>, output: impl Into<String>, compare: Comparison) -> Self {
        Self {
            kind: kind.into(),
            output_name: output.into(),
            family: Family::Mean,
            compare,
            maximize: false,
            reference: None,
        }
    }

    /// The row mean of the comparison integrated over `mesh`.
    pub fn integrated(
        kind: impl Into<String>,
        output: impl Into<String>,
        mesh: impl Into<String>,
        compare: Comparison,
    ) -> Self {
        Self {
            kind: kind.into(),
            output_name: output.into(),
            family: Family::Integrated {
                mesh_name: mesh.into(),
            },
            compare,
            maximize: false,
            reference: None,
        }
    }

    /// Mean squared error.
    pub fn mse(output: impl Into<String>) -> Self {
        Self::mean("MSE", output, Comparison::Squared)
    }

    /// Mean absolute error.
    pub fn mae(output: impl Into<String>) -> Self {
        Self::mean("MAE", output, Comparison::Absolute)
    }

    /// Integrated squared error.
    pub fn ise(output: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self::integrated("ISE", output, mesh, Comparison::Squared)
    }

    /// Integrated absolute error.
    pub fn iae(output: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self::integrated("IAE", output, mesh, Comparison::Absolute)
    }

    /// Marks the measure as one to maximize.
    #[must_use]
    pub fn maximizing(mut self) -> Self {
        self.maximize = true;
        self
    }

    #[must_use]
    pub fn comparison(&self) -> Comparison {
        self.compare
    }
}

impl CalibrationMeasure for Measure {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn output_name(&self) -> &str {
        &self.output_name
    }

    fn mesh_name(&self) -> Option<&str> {
        match &self.family {
            Family::Mean => None,
            Family::Integrated { mesh_name } => Some(mesh_name),
        }
    }

    fn maximize(&self) -> bool {
        self.maximize
    }

    fn set_reference_data(&mut self, reference: &Dataset) -> Result<(), MeasureError> {
        let values = reference.get(&self.output_name)?.clone();
        let mesh = match &self.family {
            Family::Mean => None,
            Family::Integrated { mesh_name } => Some(reference.get(mesh_name)?.clone()),
        };
        self.reference = Some(Reference { values, mesh });
        Ok(())
    }

    fn evaluate(&self, model: &Dataset) -> Result<f64, MeasureError> {
        let reference = self
            .reference
            .as_ref()
            .ok_or_else(|| MeasureError::NoReferenceData(self.name()))?;
        let values = model.get(&self.output_name)?;

        match &self.family {
            Family::Integrated { mesh_name } => {
                let Some(reference_mesh) = &reference.mesh else {
                    return Err(MeasureError::NoReferenceData(self.name()));
                };
                let output = &self.output_name;
                let model_mesh = model.get(mesh_name)?;
                let reference =
                    integrated::Side::new(mesh_name, output, reference_mesh, &reference.values)?;
                let model = integrated::Side::new(mesh_name, output, model_mesh, values)?;
                integrated::row_mean(output, &reference, &model, self.compare)
            }
            Family::Mean => {
                if values.dim() != reference.values.dim() {
                    return Err(MeasureError::ShapeMismatch {
                        output: self.output_name.clone(),
                        reference: reference.values.dim(),
                        model: values.dim(),
                    });
                }
                Ok(mean::nan_mean(
                    reference.values.view(),
                    values.view(),
                    self.compare,
                ))
            }
        }
    }
}
