/// A callable model that maps a typed input to a typed output.
///
/// Models must be deterministic, always producing the same result for a given
/// input. Solvers rely on this when they compare evaluations, and calibration
/// relies on it when it replays reference inputs.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Each model defines its own `Error` type to represent domain-specific failures.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;

    /// Wraps this model so that `handler` sees every successful call.
    ///
    /// The handler receives the input and the output; the output is passed
    /// through unchanged. Failed calls are not reported.
    fn inspect<F>(self, handler: F) -> Inspect<Self, F>
    where
        Self: Sized,
        F: Fn(&Self::Input, &Self::Output),
    {
        Inspect {
            model: self,
            handler,
        }
    }
}

impl<M: Model + ?Sized> Model for &M {
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        (**self).call(input)
    }
}

/// A model wrapper that reports each successful call to a handler.
///
/// Created by [`Model::inspect`].
pub struct Inspect<M, F> {
    model: M,
    handler: F,
}

impl<M, F> Model for Inspect<M, F>
where
    M: Model,
    F: Fn(&M::Input, &M::Output),
{
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let output = self.model.call(input)?;
        (self.handler)(input, &output);
        Ok(output)
    }
}

/// A captured input/output pair from a model call.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::RefCell, convert::Infallible};

    struct Double;

    impl Model for Double {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, x: &f64) -> Result<f64, Self::Error> {
            Ok(2.0 * x)
        }
    }

    #[test]
    fn inspect_sees_every_call() {
        let seen = RefCell::new(Vec::new());
        let model = Double.inspect(|x: &f64, y: &f64| seen.borrow_mut().push((*x, *y)));

        assert_eq!(model.call(&1.0).unwrap(), 2.0);
        assert_eq!(model.call(&3.0).unwrap(), 6.0);

        drop(model);
        assert_eq!(seen.into_inner(), vec![(1.0, 2.0), (3.0, 6.0)]);
    }

    #[test]
    fn references_are_models() {
        let model = Double;
        let by_ref = &model;
        assert_eq!(by_ref.call(&4.0).unwrap(), 8.0);
    }
}
