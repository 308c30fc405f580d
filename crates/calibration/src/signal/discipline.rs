use ndarray::Array1;

use gauge_core::{Discipline, DisciplineError, Values};

use super::SignalGenerator;

/// Exposes a [`SignalGenerator`] as a discipline over fixed times.
///
/// Inputs are `initial_<state>` for every state, then the generator
/// parameters. Outputs are the state trajectories, then `times`, the mesh
/// they are sampled on.
pub struct SignalDiscipline<G> {
    name: String,
    generator: G,
    times: Vec<f64>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    defaults: Values,
}

impl<G: SignalGenerator> SignalDiscipline<G> {
    /// The name of the output holding the sampling times.
    pub const TIMES: &'static str = "times";

    pub fn new(name: impl Into<String>, generator: G, times: Vec<f64>) -> Self {
        let inputs = generator
            .state_names()
            .iter()
            .map(|state| format!("initial_{state}"))
            .chain(generator.parameter_names().iter().cloned())
            .collect();
        let outputs = generator
            .state_names()
            .iter()
            .cloned()
            .chain(std::iter::once(Self::TIMES.to_owned()))
            .collect();

        Self {
            name: name.into(),
            generator,
            times,
            inputs,
            outputs,
            defaults: Values::new(),
        }
    }

    /// Sets the default value of an input.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: Array1<f64>) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }
}

impl<G: SignalGenerator> Discipline for SignalDiscipline<G> {
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
        let mut local = self.defaults.clone();
        local.extend(input.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut initial = Values::new();
        for state in self.generator.state_names() {
            let name = format!("initial_{state}");
            let value = local
                .remove(&name)
                .ok_or_else(|| DisciplineError::MissingInput {
                    discipline: self.name.clone(),
                    name,
                })?;
            initial.insert(state.clone(), value);
        }

        let signal = self
            .generator
            .generate(&self.times, &initial, &local)
            .map_err(|error| DisciplineError::Failed {
                discipline: self.name.clone(),
                source: Box::new(error),
            })?;

        let mut output: Values = signal.evolution;
        output.insert(Self::TIMES.to_owned(), signal.times);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    use crate::signal::Oscillator;

    fn oscillator() -> SignalDiscipline<impl SignalGenerator> {
        SignalDiscipline::new("oscillator", Oscillator::Constant.generator(), vec![0.0, 0.5, 1.0])
            .with_default("initial_velocity", array![0.0])
    }

    #[test]
    fn names_follow_the_generator() {
        let discipline = oscillator();
        assert_eq!(
            discipline.input_names(),
            ["initial_position", "initial_velocity", "omega"]
        );
        assert_eq!(discipline.output_names(), ["position", "velocity", "times"]);
    }

    #[test]
    fn outputs_trajectories_and_the_mesh() {
        let input = Values::from([
            ("initial_position".to_owned(), array![1.0]),
            ("omega".to_owned(), array![1.0]),
        ]);

        let output = oscillator().execute(&input).unwrap();

        assert_eq!(output["times"], array![0.0, 0.5, 1.0]);
        assert_eq!(output["position"].len(), 3);
        assert_eq!(output["position"][0], 1.0);
        assert_eq!(output["velocity"][0], 0.0);
    }

    #[test]
    fn missing_initial_states_are_reported() {
        let input = Values::from([("omega".to_owned(), array![1.0])]);
        assert!(matches!(
            oscillator().execute(&input),
            Err(DisciplineError::MissingInput { name, .. }) if name == "initial_position"
        ));
    }
}
