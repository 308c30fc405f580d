#![allow(dead_code)]

use ndarray::array;

use gauge_core::{Dataset, Discipline, FnDiscipline, Values, ValuesExt};

/// `y = a * x`.
pub fn line() -> Box<dyn Discipline> {
    Box::new(
        FnDiscipline::new("line", ["x", "a"], ["y"], |v: &Values| {
            Ok(Values::from([(
                "y".to_owned(),
                array![v.scalar("a")? * v.scalar("x")?],
            )]))
        })
        .with_default("a", array![1.0]),
    )
}

/// `z = b * x`.
pub fn slope() -> Box<dyn Discipline> {
    Box::new(
        FnDiscipline::new("slope", ["x", "b"], ["z"], |v: &Values| {
            Ok(Values::from([(
                "z".to_owned(),
                array![v.scalar("b")? * v.scalar("x")?],
            )]))
        })
        .with_default("b", array![1.0]),
    )
}

/// `y = a * x` and the profile `z(t) = a * x * t` on `t = [0, 0.5, 1]`.
pub fn ramp() -> Box<dyn Discipline> {
    Box::new(FnDiscipline::new(
        "ramp",
        ["x", "a"],
        ["y", "z", "t"],
        |v: &Values| {
            let slope = v.scalar("a")? * v.scalar("x")?;
            let t = array![0.0, 0.5, 1.0];
            Ok(Values::from([
                ("y".to_owned(), array![slope]),
                ("z".to_owned(), &t * slope),
                ("t".to_owned(), t),
            ]))
        },
    ))
}

/// Builds a dataset column by column from one row of values per sample.
pub fn dataset(columns: Vec<(&str, Vec<Vec<f64>>)>) -> Dataset {
    Dataset::from_rows(columns).unwrap()
}
