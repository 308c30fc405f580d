use crate::optimization::{EvalError, golden_section};

/// Errors that can occur during coordinate search.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected {expected} starting value(s), got {found}")]
    Dimension { expected: usize, found: usize },

    #[error("starting value {value} of variable {index} lies outside [{lower}, {upper}]")]
    OutOfBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<golden_section::Error> for Error {
    fn from(error: golden_section::Error) -> Self {
        match error {
            golden_section::Error::Model(e) => Self::Model(e),
            golden_section::Error::Problem(e) => Self::Problem(e),
        }
    }
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    fn from(error: EvalError<ME, PE>) -> Self {
        golden_section::Error::from(error).into()
    }
}
