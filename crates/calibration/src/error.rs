use ninterp::error::{InterpolateError, ValidateError};
use thiserror::Error;

use gauge_core::{DatasetError, DesignSpaceError, DisciplineError};
use gauge_solvers::{doe::DoeError, mda::MdaError, optimization::AlgorithmError};

/// Invalid calibration settings, detected before anything runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least one calibration measure is required")]
    NoMeasures,

    #[error("the weight of `{output}` is {weight}, expected a value strictly between 0 and 1")]
    InvalidWeight { output: String, weight: f64 },

    #[error("the weights sum to {sum}, expected {expected}")]
    WeightSum { sum: f64, expected: &'static str },

    #[error("unknown measure `{0}`")]
    UnknownMeasure(String),

    #[error("the integrated measure `{kind}` of `{output}` needs a mesh")]
    MissingMesh { kind: String, output: String },

    #[error("the measure `{kind}` of `{output}` does not take a mesh")]
    UnexpectedMesh { kind: String, output: String },

    #[error("unknown post-processing `{0}`")]
    UnknownPost(String),

    #[error("post-processing `{post}` needs the `{option}` option")]
    MissingPostOption { post: String, option: &'static str },
}

/// Errors raised while a measure reads or compares data.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("`{0}` has no reference data")]
    NoReferenceData(String),

    #[error(transparent)]
    Data(#[from] DatasetError),

    #[error("`{output}` has shape {model:?} in the model data, {reference:?} in the reference")]
    ShapeMismatch {
        output: String,
        reference: (usize, usize),
        model: (usize, usize),
    },

    #[error("`{output}` has {model} model row(s) but {reference} reference row(s)")]
    RowMismatch {
        output: String,
        reference: usize,
        model: usize,
    },

    #[error("mesh `{mesh}` has shape {mesh_shape:?} but `{output}` has shape {output_shape:?}")]
    MeshShape {
        mesh: String,
        output: String,
        mesh_shape: (usize, usize),
        output_shape: (usize, usize),
    },

    #[error("invalid interpolation grid: {0}")]
    Grid(#[from] ValidateError),

    #[error("interpolation failed: {0}")]
    Interpolation(#[from] InterpolateError),
}

/// Errors raised by the calibrator and the calibration scenario.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    DesignSpace(#[from] DesignSpaceError),

    #[error(transparent)]
    Discipline(#[from] DisciplineError),

    #[error(transparent)]
    Doe(#[from] DoeError),

    #[error(transparent)]
    Mda(#[from] MdaError),

    #[error("optimization failed")]
    Optimization(#[source] AlgorithmError),

    #[error("no reference data has been set")]
    NoReferenceData,

    #[error("no discipline reads or produces `{0}`")]
    MissingObservable(String),

    #[error("model row {row} of `{name}` does not match the reference row")]
    RowOrder { name: String, row: usize },

    #[error("the calibration has already been executed")]
    AlreadyExecuted,

    #[error("the calibration has not been executed yet")]
    NotExecuted,

    #[error("no measure is named `{0}`")]
    MissingMeasure(String),
}

impl From<AlgorithmError> for CalibrationError {
    fn from(error: AlgorithmError) -> Self {
        Self::Optimization(error)
    }
}
