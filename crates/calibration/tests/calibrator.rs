mod common;

use approx::assert_relative_eq;
use ndarray::array;

use gauge_calibration::{
    CalibrationError, CalibrationMeasureSpec, Calibrator, Comparison, Measure, MeasureFactory,
};
use gauge_core::{Discipline, FnDiscipline, Model, Values, ValuesExt};
use gauge_solvers::mda::Formulation;

use common::{dataset, line, slope};

fn squared(reference: f64, model: f64) -> f64 {
    (model - reference).powi(2)
}

fn factory() -> MeasureFactory {
    let mut factory = MeasureFactory::new();
    factory.register("MeasureCstr", false, |output, _| {
        Box::new(Measure::mean("MeasureCstr", output, Comparison::Custom(squared)))
    });
    factory
}

fn calibrator() -> Calibrator {
    Calibrator::with_factory(
        factory(),
        vec![line(), slope()],
        "x",
        vec![
            CalibrationMeasureSpec::new("y").measure("MeasureCstr"),
            CalibrationMeasureSpec::new("z").measure("MeasureCstr"),
        ],
        vec!["a", "b"],
        Formulation::default(),
    )
    .unwrap()
}

fn reference() -> gauge_core::Dataset {
    dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![2.0], vec![4.0]]),
        ("z", vec![vec![3.0], vec![6.0]]),
    ])
}

fn parameters(a: f64, b: f64) -> Values {
    Values::from([("a".to_owned(), array![a]), ("b".to_owned(), array![b])])
}

#[test]
fn composite_name_lists_weighted_custom_measures() {
    let calibrator = calibrator();
    assert_eq!(
        calibrator.objective_name(),
        "0.5*MeasureCstr[y]+0.5*MeasureCstr[z]"
    );
    assert_eq!(calibrator.parameter_names(), ["a", "b"]);
    assert_eq!(calibrator.input_names(), ["x"]);
}

#[test]
fn measures_vanish_at_the_true_parameters() {
    let mut calibrator = calibrator();
    calibrator.set_reference_data(reference()).unwrap();

    let output = calibrator.execute(&parameters(2.0, 3.0)).unwrap();
    let objective = output.measure(calibrator.objective_name()).unwrap();
    assert_relative_eq!(objective, 0.0);

    // y is off by x and z by 2x: (1 + 4) / 2 and (4 + 16) / 2.
    let output = calibrator.call(&parameters(1.0, 1.0)).unwrap();
    assert_relative_eq!(output.measures[calibrator.objective_name()], 0.5 * 2.5 + 0.5 * 10.0);
    assert_eq!(output.model_data.get("x").unwrap(), reference().get("x").unwrap());
}

#[test]
fn default_parameters_fill_in_missing_ones() {
    let mut calibrator = calibrator();
    calibrator.set_reference_data(reference()).unwrap();
    assert_eq!(calibrator.default_parameters(), &parameters(1.0, 1.0));

    calibrator.set_default_parameters(parameters(2.0, 1.0));
    let output = calibrator
        .execute(&Values::from([("b".to_owned(), array![3.0])]))
        .unwrap();
    assert_relative_eq!(output.measures[calibrator.objective_name()], 0.0);
}

#[test]
fn measures_added_later_receive_the_reference_data() {
    let mut calibrator = calibrator();
    calibrator.set_reference_data(reference()).unwrap();

    let (name, required) = calibrator
        .add_measure(CalibrationMeasureSpec::new("y").measure("MAE"))
        .unwrap();
    assert_eq!(name, "MAE[y]");
    assert_eq!(required, ["y"]);
    assert_eq!(
        calibrator.output_names(),
        ["0.5*MeasureCstr[y]+0.5*MeasureCstr[z]", "MAE[y]"]
    );

    let output = calibrator.execute(&parameters(1.5, 3.0)).unwrap();
    // The mean of |1.5 - 2| and |3 - 4|.
    assert_relative_eq!(output.measure("MAE[y]").unwrap(), 0.75);

    // Setting the data again reaches every composite.
    let shifted = dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![1.5], vec![3.0]]),
        ("z", vec![vec![3.0], vec![6.0]]),
    ]);
    calibrator.set_reference_data(shifted).unwrap();
    let output = calibrator.execute(&parameters(1.5, 3.0)).unwrap();
    assert_relative_eq!(output.measure("MAE[y]").unwrap(), 0.0);
}

#[test]
fn exposed_as_a_discipline() {
    let mut calibrator = calibrator();
    calibrator.set_reference_data(reference()).unwrap();

    assert_eq!(Discipline::input_names(&calibrator), ["a", "b"]);
    let output = Discipline::execute(&calibrator, &parameters(2.0, 3.0)).unwrap();
    assert_eq!(
        output["0.5*MeasureCstr[y]+0.5*MeasureCstr[z]"],
        array![0.0]
    );
}

#[test]
fn reference_data_must_carry_every_variable() {
    let mut calibrator = calibrator();
    let partial = dataset(vec![("x", vec![vec![1.0]]), ("y", vec![vec![2.0]])]);

    let result = calibrator.set_reference_data(partial);
    assert!(matches!(result, Err(CalibrationError::Measure(_))));
    assert!(calibrator.reference_data().is_none());
    assert!(matches!(
        calibrator.execute(&parameters(2.0, 3.0)),
        Err(CalibrationError::NoReferenceData)
    ));
}

#[test]
fn unknown_measures_fail_at_construction() {
    let result = Calibrator::new(
        line(),
        "x",
        CalibrationMeasureSpec::new("y").measure("MeasureCstr"),
        "a",
        Formulation::default(),
    );
    assert!(matches!(result, Err(CalibrationError::Config(_))));
}

#[test]
fn rejected_reference_data_keeps_the_previous_binding() {
    let mut calibrator = calibrator();
    calibrator.set_reference_data(reference()).unwrap();

    let wider = dataset(vec![("x", vec![vec![1.0, 1.0]]), ("z", vec![vec![3.0]])]);
    assert!(calibrator.set_reference_data(wider).is_err());

    assert_eq!(calibrator.reference_data(), Some(&reference()));
    let output = calibrator.execute(&parameters(2.0, 3.0)).unwrap();
    assert_relative_eq!(output.measures[calibrator.objective_name()], 0.0);
}

/// `z(t) = a * x * t` on a mesh `t` that only comes from a default input.
fn sampled_ramp() -> Box<dyn Discipline> {
    Box::new(
        FnDiscipline::new("sampled ramp", ["x", "a", "t"], ["z"], |v: &Values| {
            let slope = v.scalar("a")? * v.scalar("x")?;
            Ok(Values::from([("z".to_owned(), v.array("t")? * slope)]))
        })
        .with_default("t", array![0.0, 0.5, 1.0]),
    )
}

#[test]
fn default_inputs_can_serve_as_the_mesh() {
    let mut calibrator = Calibrator::new(
        sampled_ramp(),
        "x",
        CalibrationMeasureSpec::new("z").measure("ISE").mesh("t"),
        "a",
        Formulation::Chain,
    )
    .unwrap();
    calibrator
        .set_reference_data(dataset(vec![
            ("x", vec![vec![1.0], vec![2.0]]),
            ("z", vec![vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]]),
            ("t", vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]]),
        ]))
        .unwrap();

    let output = calibrator
        .execute(&Values::from([("a".to_owned(), array![2.0])]))
        .unwrap();

    assert_relative_eq!(output.measure("ISE[z[t]]").unwrap(), 0.0);
    assert_eq!(
        output.model_data.get("t").unwrap(),
        &array![[0.0, 0.5, 1.0], [0.0, 0.5, 1.0]]
    );
}
