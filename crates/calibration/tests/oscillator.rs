use approx::assert_relative_eq;
use ndarray::array;

use gauge_calibration::{
    CalibrationMeasureSpec, CalibrationScenario,
    signal::{Oscillator, SignalDiscipline, SignalGenerator},
};
use gauge_core::{Dataset, DesignSpace, Discipline, Values};
use gauge_solvers::{mda::Formulation, optimization::Algorithm};

fn times() -> Vec<f64> {
    (0..=24).map(|i| f64::from(i) * 0.125).collect()
}

fn oscillator() -> SignalDiscipline<impl SignalGenerator> {
    SignalDiscipline::new("oscillator", Oscillator::Constant.generator(), times())
        .with_default("initial_velocity", array![0.0])
}

/// Trajectories of the oscillator with `omega = 2` from two initial positions.
fn observations() -> Dataset {
    let discipline = oscillator();
    let mut reference = Dataset::new();
    for position in [1.0, 0.5] {
        let input = Values::from([
            ("initial_position".to_owned(), array![position]),
            ("omega".to_owned(), array![2.0]),
        ]);
        let output = discipline.execute(&input).unwrap();
        let row = Values::from([
            ("initial_position".to_owned(), array![position]),
            ("position".to_owned(), output["position"].clone()),
            ("times".to_owned(), output["times"].clone()),
        ]);
        reference.push_row(&row).unwrap();
    }
    reference
}

#[test]
fn recovers_the_angular_velocity() {
    let space = DesignSpace::new()
        .with_scalar("omega", 1.8, 2.3, 1.9)
        .unwrap();
    let mut scenario = CalibrationScenario::new(
        Box::new(oscillator()) as Box<dyn Discipline>,
        "initial_position",
        CalibrationMeasureSpec::new("position")
            .measure("ISE")
            .mesh("times"),
        &space,
        Formulation::default(),
    )
    .unwrap();
    assert_eq!(
        scenario.calibrator().objective_name(),
        "ISE[position[times]]"
    );

    scenario
        .execute_with(Algorithm::from_name("GoldenSection").unwrap(), observations())
        .unwrap();

    let omega = scenario.posterior_parameters().unwrap()["omega"][0];
    assert_relative_eq!(omega, 2.0, epsilon = 1e-4);

    let prior = scenario.prior_model_data().unwrap().get("position").unwrap();
    let posterior = scenario.posterior_model_data().unwrap().get("position").unwrap();
    let reference = scenario.reference_data().unwrap().get("position").unwrap();
    let gap = |model: &ndarray::Array2<f64>| (model - reference).mapv(f64::abs).sum();
    assert!(gap(posterior) < gap(prior));
}
