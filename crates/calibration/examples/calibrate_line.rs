//! Calibrates the slope of `y = a * x` against noisy observations.
//!
//! Run with `cargo run --example calibrate_line`, or with
//! `--features plot` to display the figures.

use log::{LevelFilter, info};
use ndarray::array;
use simple_logger::SimpleLogger;

use gauge_calibration::{CalibrationMeasureSpec, CalibrationScenario, post::PostOptions};
use gauge_core::{Dataset, DesignSpace, Discipline, FnDiscipline, Values, ValuesExt};
use gauge_solvers::{
    mda::Formulation,
    optimization::{Algorithm, ConstraintKind},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let line = FnDiscipline::new("line", ["x", "a"], ["y"], |v: &Values| {
        Ok(Values::from([(
            "y".to_owned(),
            array![v.scalar("a")? * v.scalar("x")?],
        )]))
    });
    let space = DesignSpace::new().with_scalar("a", 0.0, 10.0, 1.0)?;

    let mut scenario = CalibrationScenario::new(
        Box::new(line) as Box<dyn Discipline>,
        "x",
        CalibrationMeasureSpec::new("y"),
        &space,
        Formulation::Chain,
    )?;
    scenario.add_constraint(
        CalibrationMeasureSpec::new("y").measure("MAE"),
        ConstraintKind::Inequality,
        Some("error"),
        1.0,
        false,
    )?;

    let reference = Dataset::new()
        .with("x", array![[1.0], [2.0], [3.0], [4.0]])?
        .with("y", array![[2.1], [3.9], [6.2], [7.8]])?;
    scenario.execute_with(Algorithm::from_name("GoldenSection")?, reference)?;

    let posterior = scenario
        .posterior_parameters()
        .ok_or("the calibration did not complete")?;
    info!("calibrated slope: {:.4}", posterior["a"][0]);
    for constraint in scenario.constraints() {
        info!("constraint: {constraint}");
    }

    let comparison = scenario.post_process("DataVersusModel", &PostOptions::output("y"))?;
    let history = scenario.post_process("OptHistory", &PostOptions::default())?;
    info!(
        "{} evaluation(s), {} series compared",
        history.series[0].points.len(),
        comparison.series.len()
    );

    #[cfg(feature = "plot")]
    {
        comparison.show()?;
        history.show()?;
    }

    Ok(())
}
