use thiserror::Error;

use gauge_core::{Model, OptimizationProblem, Snapshot};

/// An optimization problem evaluated at one `x`.
#[derive(Debug, Clone)]
pub struct Evaluation<I, O> {
    pub x: Vec<f64>,
    pub objective: f64,
    pub snapshot: Snapshot<I, O>,
}

/// The stage at which an evaluation failed.
#[derive(Debug, Error)]
pub enum EvalError<ME, PE> {
    #[error("could not build the model input")]
    Input(#[source] PE),

    #[error("model call failed")]
    Model(#[source] ME),

    #[error("could not compute the objective")]
    Objective(#[source] PE),
}

/// Result of [`evaluate`] for a model and problem pair.
pub type EvaluateResult<M, P> = Result<
    Evaluation<<M as Model>::Input, <M as Model>::Output>,
    EvalError<<M as Model>::Error, <P as OptimizationProblem>::Error>,
>;

/// Builds the model input from `x`, calls the model and computes the
/// objective.
///
/// # Errors
///
/// Returns the first failing stage.
pub fn evaluate<M, P>(model: &M, problem: &P, x: &[f64]) -> EvaluateResult<M, P>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
{
    let input = problem.input(x).map_err(EvalError::Input)?;
    let output = model.call(&input).map_err(EvalError::Model)?;
    let objective = problem
        .objective(&input, &output)
        .map_err(EvalError::Objective)?;

    Ok(Evaluation {
        x: x.to_vec(),
        objective,
        snapshot: Snapshot::new(input, output),
    })
}
