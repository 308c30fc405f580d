use gauge_core::{Values, ValuesExt};

use super::{OdeSignalGenerator, RightHandSide, SignalError};

/// A harmonic oscillator `x'' = -omega^2 x`.
///
/// States are `position` and `velocity`. With [`Oscillator::Constant`] the
/// angular velocity is the parameter `omega`. With
/// [`Oscillator::Decaying`] it is a third state, `omega`, with
/// `omega' = -rate * exp(-rate * t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Oscillator {
    Constant,
    Decaying { rate: f64 },
}

impl Oscillator {
    /// The decay rate used by [`Oscillator::decaying`].
    pub const DEFAULT_DECAY_RATE: f64 = 2e-2;

    #[must_use]
    pub fn decaying() -> Self {
        Self::Decaying {
            rate: Self::DEFAULT_DECAY_RATE,
        }
    }

    /// Returns a generator integrating this oscillator.
    #[must_use]
    pub fn generator(self) -> OdeSignalGenerator<Self> {
        match self {
            Self::Constant => OdeSignalGenerator::new(["position", "velocity"], ["omega"], self),
            Self::Decaying { .. } => OdeSignalGenerator::new(
                ["position", "velocity", "omega"],
                Vec::<String>::new(),
                self,
            ),
        }
    }
}

impl RightHandSide for Oscillator {
    fn rates(
        &self,
        time: f64,
        state: &[f64],
        parameters: &Values,
    ) -> Result<Vec<f64>, SignalError> {
        let (position, velocity) = (state[0], state[1]);
        match *self {
            Self::Constant => {
                let omega = parameters
                    .scalar("omega")
                    .map_err(|_| SignalError::MissingParameter("omega".to_owned()))?;
                Ok(vec![velocity, -omega * omega * position])
            }
            Self::Decaying { rate } => {
                let omega = state[2];
                Ok(vec![
                    velocity,
                    -omega * omega * position,
                    -rate * (-rate * time).exp(),
                ])
            }
        }
    }
}
