mod common;

use approx::assert_relative_eq;
use ndarray::array;

use gauge_calibration::{
    CalibrationError, CalibrationMeasureSpec, CalibrationScenario, Comparison, Measure,
    MeasureFactory, State,
    post::{PostOptions, Style},
};
use gauge_core::{DesignSpace, Discipline, FnDiscipline, Values, ValuesExt};
use gauge_solvers::{
    mda::Formulation,
    optimization::{Algorithm, ConstraintKind, Status},
};

use common::{dataset, line, ramp, slope};

fn golden() -> Algorithm {
    Algorithm::from_name("GoldenSection").unwrap()
}

#[test]
fn one_parameter_line() {
    let space = DesignSpace::new().with_scalar("a", 0.0, 5.0, 1.0).unwrap();
    let mut scenario = CalibrationScenario::new(
        line(),
        "x",
        CalibrationMeasureSpec::new("y"),
        &space,
        Formulation::default(),
    )
    .unwrap();
    let reference = dataset(vec![("x", vec![vec![1.0]]), ("y", vec![vec![2.0]])]);

    scenario.execute_with(golden(), reference).unwrap();

    assert_eq!(scenario.state(), State::Completed);
    let posterior = scenario.posterior_parameters().unwrap();
    assert_relative_eq!(posterior["a"][0], 2.0, epsilon = 1e-4);
    assert_eq!(scenario.prior_parameters()["a"], array![1.0]);

    let result = scenario.optimization_result().unwrap();
    assert_eq!(result.status, Status::Converged);
    assert!(result.objective < 1e-8);

    // The posterior becomes the calibrator default.
    assert_relative_eq!(
        scenario.calibrator().default_parameters()["a"][0],
        posterior["a"][0]
    );
    assert_eq!(
        *scenario.prior_model_data().unwrap().get("y").unwrap(),
        array![[1.0]]
    );
    assert_relative_eq!(
        scenario.posterior_model_data().unwrap().get("y").unwrap()[[0, 0]],
        2.0,
        epsilon = 1e-4
    );
}

#[test]
fn two_parameters_two_outputs() {
    let space = DesignSpace::new()
        .with_scalar("a", 0.0, 5.0, 1.0)
        .unwrap()
        .with_scalar("b", 0.0, 5.0, 1.0)
        .unwrap();
    let mut scenario = CalibrationScenario::new(
        vec![line(), slope()],
        "x",
        vec![CalibrationMeasureSpec::new("y"), CalibrationMeasureSpec::new("z")],
        &space,
        Formulation::default(),
    )
    .unwrap();
    assert_eq!(scenario.calibrator().objective_name(), "0.5*MSE[y]+0.5*MSE[z]");

    let reference = dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![2.0], vec![4.0]]),
        ("z", vec![vec![3.0], vec![6.0]]),
    ]);
    scenario
        .execute_with(Algorithm::default(), reference)
        .unwrap();

    let posterior = scenario.posterior_parameters().unwrap();
    assert_relative_eq!(posterior["a"][0], 2.0, epsilon = 1e-4);
    assert_relative_eq!(posterior["b"][0], 3.0, epsilon = 1e-4);
}

#[test]
fn mean_and_integrated_measures_together() {
    let space = DesignSpace::new().with_scalar("a", 0.0, 4.0, 1.0).unwrap();
    let mut scenario = CalibrationScenario::new(
        ramp(),
        "x",
        vec![
            CalibrationMeasureSpec::new("y").weight(0.5),
            CalibrationMeasureSpec::new("z").measure("ISE").mesh("t"),
        ],
        &space,
        Formulation::Chain,
    )
    .unwrap();
    assert_eq!(scenario.calibrator().objective_name(), "0.5*MSE[y]+0.5*ISE[z[t]]");

    let reference = dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![1.5], vec![3.0]]),
        ("z", vec![vec![0.0, 0.75, 1.5], vec![0.0, 1.5, 3.0]]),
        ("t", vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]]),
    ]);
    scenario.execute_with(golden(), reference).unwrap();

    let posterior = scenario.posterior_parameters().unwrap();
    assert_relative_eq!(posterior["a"][0], 1.5, epsilon = 1e-4);
}

#[test]
fn maximizing_a_custom_measure() {
    fn closeness(reference: f64, model: f64) -> f64 {
        -(model - reference).powi(2)
    }

    let mut factory = MeasureFactory::new();
    factory.register("Closeness", false, |output, _| {
        Box::new(
            Measure::mean("Closeness", output, Comparison::Custom(closeness))
                .maximizing(),
        )
    });

    let space = DesignSpace::new().with_scalar("a", 0.0, 5.0, 1.0).unwrap();
    let mut scenario = CalibrationScenario::with_factory(
        factory,
        line(),
        "x",
        CalibrationMeasureSpec::new("y").measure("Closeness"),
        &space,
        Formulation::default(),
    )
    .unwrap();
    assert!(scenario.calibrator().maximize_objective());

    let reference = dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![2.0], vec![4.0]]),
    ]);
    scenario.execute_with(golden(), reference).unwrap();

    assert_relative_eq!(
        scenario.posterior_parameters().unwrap()["a"][0],
        2.0,
        epsilon = 1e-4
    );
}

/// `y = a * x` next to an identity `w = a` observed at 1.
fn constrained() -> CalibrationScenario {
    let identity: Box<dyn Discipline> = Box::new(FnDiscipline::new(
        "identity",
        ["a"],
        ["w"],
        |v: &Values| Ok(Values::from([("w".to_owned(), array![v.scalar("a")?])])),
    ));
    let space = DesignSpace::new().with_scalar("a", 0.0, 5.0, 1.0).unwrap();
    let mut scenario = CalibrationScenario::new(
        vec![line(), identity],
        "x",
        CalibrationMeasureSpec::new("y"),
        &space,
        Formulation::default(),
    )
    .unwrap();
    scenario
        .add_constraint(
            CalibrationMeasureSpec::new("w").measure("MAE"),
            ConstraintKind::Inequality,
            Some("drift"),
            0.5,
            false,
        )
        .unwrap();
    scenario
}

#[test]
fn constraints_hold_the_optimum_back() {
    let mut scenario = constrained();
    assert_eq!(scenario.constraints()[0].to_string(), "drift(a) <= 0.5");
    assert_eq!(scenario.calibrator().output_names(), ["MSE[y]", "MAE[w]"]);

    let reference = dataset(vec![
        ("x", vec![vec![1.0]]),
        ("y", vec![vec![2.0]]),
        ("w", vec![vec![1.0]]),
    ]);
    scenario.execute_with(golden(), reference).unwrap();

    let a = scenario.posterior_parameters().unwrap()["a"][0];
    assert_relative_eq!(a, 1.5, epsilon = 1e-3);

    let result = scenario.optimization_result().unwrap();
    assert_eq!(result.constraints.len(), 1);
    assert!(result.constraints[0] < 0.5 + 1e-3);

    let history = scenario.history().unwrap();
    assert_eq!(history.entries.len(), result.evaluations);
    assert_eq!(history.constraint_names, ["MAE[w]"]);

    // A completed scenario is frozen.
    let again = scenario.add_constraint(
        CalibrationMeasureSpec::new("y").measure("MAE"),
        ConstraintKind::Equality,
        None,
        0.0,
        false,
    );
    assert!(matches!(again, Err(CalibrationError::AlreadyExecuted)));
    assert!(matches!(
        scenario.execute(),
        Err(CalibrationError::AlreadyExecuted)
    ));
}

#[test]
fn post_processing_a_completed_scenario() {
    let mut scenario = constrained();
    let reference = dataset(vec![
        ("x", vec![vec![1.0], vec![2.0]]),
        ("y", vec![vec![2.0], vec![4.0]]),
        ("w", vec![vec![1.0], vec![1.0]]),
    ]);
    scenario.execute_with(golden(), reference).unwrap();

    let figure = scenario
        .post_process("DataVersusModel", &PostOptions::output("y"))
        .unwrap();
    let before = figure.series("Before calibration").unwrap();
    assert_eq!(before.style, Style::Markers);
    assert_eq!(before.points, [[2.0, 1.0], [4.0, 2.0]]);
    assert_eq!(
        figure.series("Identity").unwrap().points,
        [[2.0, 2.0], [4.0, 4.0]]
    );

    let history = scenario
        .post_process("OptHistory", &PostOptions::default().title("History"))
        .unwrap();
    assert_eq!(history.title, "History");
    assert_eq!(history.series.len(), 2);
    assert_eq!(
        history.series[0].points.len(),
        scenario.optimization_result().unwrap().evaluations
    );

    assert!(matches!(
        scenario.post_process("Radar", &PostOptions::default()),
        Err(CalibrationError::Config(_))
    ));
}
