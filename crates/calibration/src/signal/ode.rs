use std::collections::BTreeMap;

use ndarray::Array1;

use gauge_core::{StepIntegrable, Values, ValuesExt};

use super::{Signal, SignalError, SignalGenerator};

/// The right-hand side `dy/dt = f(t, y; p)` of a first-order system.
pub trait RightHandSide {
    /// Returns the rate of every state, in state order.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing.
    fn rates(&self, time: f64, state: &[f64], parameters: &Values)
    -> Result<Vec<f64>, SignalError>;
}

impl<F> RightHandSide for F
where
    F: Fn(f64, &[f64], &Values) -> Result<Vec<f64>, SignalError>,
{
    fn rates(
        &self,
        time: f64,
        state: &[f64],
        parameters: &Values,
    ) -> Result<Vec<f64>, SignalError> {
        self(time, state, parameters)
    }
}

/// A signal generator integrating a [`RightHandSide`] with the classic
/// fourth-order Runge-Kutta scheme.
///
/// Each interval between consecutive requested times is split into
/// `substeps` equal steps.
#[derive(Debug, Clone)]
pub struct OdeSignalGenerator<F> {
    states: Vec<String>,
    parameters: Vec<String>,
    rhs: F,
    substeps: usize,
}

impl<F: RightHandSide> OdeSignalGenerator<F> {
    /// Creates a generator with 10 substeps per interval.
    pub fn new<S, P>(states: S, parameters: P, rhs: F) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            rhs,
            substeps: 10,
        }
    }

    /// Sets the number of steps per interval, at least one.
    #[must_use]
    pub fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps.max(1);
        self
    }

    fn rates(
        &self,
        time: f64,
        state: &[f64],
        parameters: &Values,
    ) -> Result<Vec<f64>, SignalError> {
        let rates = self.rhs.rates(time, state, parameters)?;
        if rates.len() != state.len() {
            return Err(SignalError::Dimension {
                expected: state.len(),
                found: rates.len(),
            });
        }
        Ok(rates)
    }

    fn rk4_step(
        &self,
        time: f64,
        state: &Vec<f64>,
        dt: f64,
        parameters: &Values,
    ) -> Result<Vec<f64>, SignalError> {
        let half = 0.5 * dt;
        let k1 = self.rates(time, state, parameters)?;
        let k2 = self.rates(time + half, &state.step(&k1, half), parameters)?;
        let k3 = self.rates(time + half, &state.step(&k2, half), parameters)?;
        let k4 = self.rates(time + dt, &state.step(&k3, dt), parameters)?;

        let slope: Vec<f64> = (0..state.len())
            .map(|i| (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) / 6.0)
            .collect();
        Ok(state.step(&slope, dt))
    }
}

impl<F: RightHandSide> SignalGenerator for OdeSignalGenerator<F> {
    fn state_names(&self) -> &[String] {
        &self.states
    }

    fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    fn generate(
        &self,
        times: &[f64],
        initial: &Values,
        parameters: &Values,
    ) -> Result<Signal, SignalError> {
        let Some(&start) = times.first() else {
            return Err(SignalError::NoTimes);
        };
        if !start.is_finite() {
            return Err(SignalError::Times {
                previous: start,
                next: start,
            });
        }
        for pair in times.windows(2) {
            if pair[1] <= pair[0] || !pair[1].is_finite() {
                return Err(SignalError::Times {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        if let Some(name) = self
            .parameters
            .iter()
            .find(|name| !parameters.contains_key(name.as_str()))
        {
            return Err(SignalError::MissingParameter(name.clone()));
        }

        let mut state = self
            .states
            .iter()
            .map(|name| {
                initial
                    .scalar(name)
                    .map_err(|_| SignalError::MissingState(name.clone()))
            })
            .collect::<Result<Vec<f64>, SignalError>>()?;

        let mut columns = vec![Vec::with_capacity(times.len()); state.len()];
        let mut record = |state: &[f64]| {
            for (column, &value) in columns.iter_mut().zip(state) {
                column.push(value);
            }
        };
        record(&state);

        for pair in times.windows(2) {
            let dt = (pair[1] - pair[0]) / self.substeps as f64;
            let mut time = pair[0];
            for _ in 0..self.substeps {
                state = self.rk4_step(time, &state, dt, parameters)?;
                time += dt;
            }
            if state.iter().any(|value| !value.is_finite()) {
                return Err(SignalError::NonFinite { time: pair[1] });
            }
            record(&state);
        }

        let final_values = self.states.iter().cloned().zip(state).collect();
        let evolution: BTreeMap<String, Array1<f64>> = self
            .states
            .iter()
            .cloned()
            .zip(columns.into_iter().map(Array1::from))
            .collect();

        Ok(Signal {
            times: Array1::from(times.to_vec()),
            evolution,
            final_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    fn decay() -> OdeSignalGenerator<impl RightHandSide> {
        let rhs = |_t: f64, y: &[f64], p: &Values| -> Result<Vec<f64>, SignalError> {
            let k = p
                .scalar("k")
                .map_err(|_| SignalError::MissingParameter("k".to_owned()))?;
            Ok(vec![-k * y[0]])
        };
        OdeSignalGenerator::new(["y"], ["k"], rhs)
    }

    fn initial(y: f64) -> Values {
        Values::from([("y".to_owned(), array![y])])
    }

    #[test]
    fn exponential_decay_matches_the_exact_solution() {
        let parameters = Values::from([("k".to_owned(), array![0.5])]);
        let times = [0.0, 1.0, 2.0, 4.0];

        let signal = decay().generate(&times, &initial(2.0), &parameters).unwrap();

        let y = &signal.evolution["y"];
        assert_eq!(y.len(), 4);
        for (value, time) in y.iter().zip(times) {
            assert_relative_eq!(*value, 2.0 * (-0.5 * time).exp(), max_relative = 1e-5);
        }
        assert_relative_eq!(signal.final_values["y"], y[3]);
        assert_eq!(signal.times, array![0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn a_single_time_returns_the_initial_state() {
        let parameters = Values::from([("k".to_owned(), array![0.5])]);
        let signal = decay().generate(&[3.0], &initial(1.5), &parameters).unwrap();
        assert_eq!(signal.evolution["y"], array![1.5]);
    }

    #[test]
    fn bad_inputs_are_reported() {
        let parameters = Values::from([("k".to_owned(), array![0.5])]);
        let generator = decay();

        assert_eq!(
            generator.generate(&[], &initial(1.0), &parameters),
            Err(SignalError::NoTimes)
        );
        assert!(matches!(
            generator.generate(&[0.0, 1.0, 1.0], &initial(1.0), &parameters),
            Err(SignalError::Times { .. })
        ));
        assert_eq!(
            generator.generate(&[0.0, 1.0], &Values::new(), &parameters),
            Err(SignalError::MissingState("y".to_owned()))
        );
        assert_eq!(
            generator.generate(&[0.0, 1.0], &initial(1.0), &Values::new()),
            Err(SignalError::MissingParameter("k".to_owned()))
        );
    }

    #[test]
    fn divergence_is_detected() {
        let blow_up = OdeSignalGenerator::new(
            ["y"],
            Vec::<String>::new(),
            |_t: f64, y: &[f64], _p: &Values| -> Result<Vec<f64>, SignalError> {
                Ok(vec![y[0] * y[0]])
            },
        );
        let result = blow_up.generate(&[0.0, 10.0, 20.0], &initial(1.0), &Values::new());
        assert!(matches!(result, Err(SignalError::NonFinite { .. })));
    }
}
