//! Weighted composition of measures into one named scalar function.

use std::fmt;

use gauge_core::Dataset;

use crate::{CalibrationMeasure, CalibrationMeasureSpec, ConfigError, MeasureError, MeasureFactory};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-12;

/// Resolves the weights of `specs`.
///
/// Given weights must lie strictly between 0 and 1. When every spec has a
/// weight they must sum to 1; otherwise they must sum to less than 1 and the
/// remainder is shared equally by the specs without one. A single spec
/// without a weight therefore gets weight 1.
///
/// # Errors
///
/// Returns an error if there are no specs or the weights violate the rules
/// above.
pub fn normalize_weights(specs: &[CalibrationMeasureSpec]) -> Result<Vec<f64>, ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoMeasures);
    }

    let mut given = 0.0;
    let mut missing = 0_usize;
    for spec in specs {
        match spec.weight {
            Some(weight) if weight > 0.0 && weight < 1.0 => given += weight,
            Some(weight) => {
                return Err(ConfigError::InvalidWeight {
                    output: spec.output.clone(),
                    weight,
                });
            }
            None => missing += 1,
        }
    }

    if missing == 0 {
        if (given - 1.0_f64).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                sum: given,
                expected: "1",
            });
        }
    } else if given >= 1.0 {
        return Err(ConfigError::WeightSum {
            sum: given,
            expected: "less than 1",
        });
    }

    let share = (1.0 - given) / missing.max(1) as f64;
    Ok(specs
        .iter()
        .map(|spec| spec.weight.unwrap_or(share))
        .collect())
}

/// Returns the weight of a term in a composite, negated when the term and
/// the composite optimize in opposite directions.
#[must_use]
pub fn sign_adjusted_weight(weight: f64, term_maximize: bool, composite_maximize: bool) -> f64 {
    if term_maximize == composite_maximize {
        weight
    } else {
        -weight
    }
}

/// A weighted sum of measures.
///
/// The composite optimizes in the direction of its first term. Later terms
/// with the opposite direction enter with a negated weight.
pub struct CompositeMeasure {
    name: String,
    maximize: bool,
    terms: Vec<(f64, Box<dyn CalibrationMeasure>)>,
}

impl fmt::Debug for CompositeMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeMeasure")
            .field("name", &self.name)
            .field("maximize", &self.maximize)
            .field("terms", &self.terms)
            .finish()
    }
}

impl CompositeMeasure {
    /// Returns a name such as `0.5*MSE[y]+0.5*ISE[z[time]]`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn maximize(&self) -> bool {
        self.maximize
    }

    /// Iterates over the (signed) weights and their measures.
    pub fn terms(&self) -> impl Iterator<Item = (f64, &dyn CalibrationMeasure)> {
        self.terms
            .iter()
            .map(|(weight, measure)| (*weight, measure.as_ref()))
    }

    /// Passes the reference data to every term.
    ///
    /// # Errors
    ///
    /// Returns the first term error.
    pub fn set_reference_data(&mut self, reference: &Dataset) -> Result<(), MeasureError> {
        for (_, measure) in &mut self.terms {
            measure.set_reference_data(reference)?;
        }
        Ok(())
    }

    /// Returns the weighted sum of the term values.
    ///
    /// # Errors
    ///
    /// Returns the first term error.
    pub fn evaluate(&self, model: &Dataset) -> Result<f64, MeasureError> {
        self.terms.iter().try_fold(0.0, |sum, (weight, measure)| {
            Ok(sum + weight * measure.evaluate(model)?)
        })
    }
}

/// Builds the composite measure described by `specs`.
///
/// Also returns the variables the composite reads, without duplicates and
/// in first-seen order.
///
/// # Errors
///
/// Returns an error if the weights are invalid or a measure cannot be
/// created.
pub fn compose(
    factory: &MeasureFactory,
    specs: &[CalibrationMeasureSpec],
) -> Result<(CompositeMeasure, Vec<String>), ConfigError> {
    let weights = normalize_weights(specs)?;

    let mut required: Vec<String> = Vec::new();
    let mut terms = Vec::with_capacity(specs.len());
    for spec in specs {
        let measure = factory.create(&spec.measure, &spec.output, spec.mesh.as_deref())?;
        for name in measure.required_names() {
            if !required.contains(&name) {
                required.push(name);
            }
        }
        terms.push(measure);
    }

    let maximize = terms[0].maximize();
    let mut name = String::new();
    let mut weighted = Vec::with_capacity(terms.len());
    for (index, (weight, measure)) in weights.into_iter().zip(terms).enumerate() {
        let label = format!("{}[{}]", measure.kind(), measure.full_output_name());
        let weight = if index == 0 {
            if weight == 1.0 {
                name.push_str(&label);
            } else {
                name.push_str(&format!("{weight}*{label}"));
            }
            weight
        } else {
            let weight = sign_adjusted_weight(weight, measure.maximize(), maximize);
            name.push_str(&format!("+{weight}*{label}"));
            weight
        };
        weighted.push((weight, measure));
    }

    Ok((
        CompositeMeasure {
            name,
            maximize,
            terms: weighted,
        },
        required,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::{Comparison, Measure};

    fn spec(output: &str) -> CalibrationMeasureSpec {
        CalibrationMeasureSpec::new(output)
    }

    #[test]
    fn a_lone_spec_gets_the_full_weight() {
        assert_eq!(normalize_weights(&[spec("y")]), Ok(vec![1.0]));
    }

    #[test]
    fn missing_weights_share_the_remainder() {
        let specs = [spec("a").weight(0.5), spec("b"), spec("c")];
        assert_eq!(normalize_weights(&specs), Ok(vec![0.5, 0.25, 0.25]));

        let specs = [spec("a"), spec("b")];
        assert_eq!(normalize_weights(&specs), Ok(vec![0.5, 0.5]));
    }

    #[test]
    fn complete_weights_must_sum_to_one() {
        let specs = [spec("a").weight(0.25), spec("b").weight(0.75)];
        assert_eq!(normalize_weights(&specs), Ok(vec![0.25, 0.75]));

        let specs = [spec("a").weight(0.25), spec("b").weight(0.5)];
        assert!(matches!(
            normalize_weights(&specs),
            Err(ConfigError::WeightSum { expected: "1", .. })
        ));
    }

    #[test]
    fn partial_weights_must_leave_a_remainder() {
        let specs = [spec("a").weight(0.5), spec("b").weight(0.5), spec("c")];
        assert!(matches!(
            normalize_weights(&specs),
            Err(ConfigError::WeightSum {
                expected: "less than 1",
                ..
            })
        ));
    }

    #[test]
    fn weights_outside_the_open_unit_interval_are_rejected() {
        for weight in [0.0, 1.0, -0.5, 1.5] {
            let result = normalize_weights(&[spec("y").weight(weight), spec("z")]);
            assert!(
                matches!(result, Err(ConfigError::InvalidWeight { .. })),
                "weight {weight} was accepted"
            );
        }
        assert_eq!(normalize_weights(&[]), Err(ConfigError::NoMeasures));
    }

    #[test]
    fn sign_flips_only_between_opposite_directions() {
        assert_eq!(sign_adjusted_weight(0.5, true, true), 0.5);
        assert_eq!(sign_adjusted_weight(0.5, false, false), 0.5);
        assert_eq!(sign_adjusted_weight(0.5, true, false), -0.5);
        assert_eq!(sign_adjusted_weight(0.5, false, true), -0.5);
    }

    #[test]
    fn names_list_weighted_terms() {
        let factory = MeasureFactory::new();

        let (single, required) = compose(&factory, &[spec("y")]).unwrap();
        assert_eq!(single.name(), "MSE[y]");
        assert_eq!(required, ["y"]);

        let specs = [spec("y"), spec("z").measure("ISE").mesh("mesh")];
        let (pair, required) = compose(&factory, &specs).unwrap();
        assert_eq!(pair.name(), "0.5*MSE[y]+0.5*ISE[z[mesh]]");
        assert_eq!(required, ["y", "z", "mesh"]);
        assert!(!pair.maximize());
    }

    #[test]
    fn required_names_are_deduplicated() {
        let factory = MeasureFactory::new();
        let specs = [
            spec("z").measure("ISE").mesh("t"),
            spec("w").measure("IAE").mesh("t"),
            spec("z"),
        ];

        let (_, required) = compose(&factory, &specs).unwrap();
        assert_eq!(required, ["z", "t", "w"]);
    }

    #[test]
    fn opposite_directions_enter_negated() {
        fn closeness(reference: f64, model: f64) -> f64 {
            -(model - reference).abs()
        }

        let mut factory = MeasureFactory::new();
        factory.register("Closeness", false, |output, _| {
            Box::new(
                Measure::mean("Closeness", output, Comparison::Custom(closeness))
                    .maximizing(),
            )
        });
        let specs = [spec("y").measure("Closeness"), spec("y")];

        let (mut composite, _) = compose(&factory, &specs).unwrap();
        assert!(composite.maximize());
        assert_eq!(composite.name(), "0.5*Closeness[y]+-0.5*MSE[y]");

        let reference = Dataset::new().with("y", array![[1.0], [2.0]]).unwrap();
        let model = Dataset::new().with("y", array![[2.0], [4.0]]).unwrap();
        composite.set_reference_data(&reference).unwrap();

        // Closeness is -1.5 and MSE is 2.5.
        assert_relative_eq!(composite.evaluate(&model).unwrap(), 0.5 * -1.5 - 0.5 * 2.5);
    }

    #[test]
    fn evaluating_requires_reference_data() {
        let (composite, _) = compose(&MeasureFactory::new(), &[spec("y")]).unwrap();
        let model = Dataset::new().with("y", array![[1.0]]).unwrap();
        assert!(matches!(
            composite.evaluate(&model),
            Err(MeasureError::NoReferenceData(_))
        ));
    }
}
