use ndarray::Axis;

use gauge_core::Dataset;

use super::{CalibrationData, Figure, PostOptions, Series, Style};
use crate::{CalibrationError, ConfigError};

/// Plots the reference data of one output against the model data before and
/// after calibration.
///
/// Each point is one reference row, averaged over the output components.
/// A perfect model lies on the dashed identity segment.
pub(super) fn data_versus_model(
    data: &CalibrationData<'_>,
    options: &PostOptions,
) -> Result<Figure, CalibrationError> {
    let output = options
        .output
        .as_deref()
        .ok_or_else(|| ConfigError::MissingPostOption {
            post: "DataVersusModel".to_owned(),
            option: "output",
        })?;

    let reference = row_means(data.reference, output)?;
    let prior = row_means(data.prior, output)?;
    let posterior = row_means(data.posterior, output)?;

    let pair = |model: &[f64]| -> Vec<[f64; 2]> {
        reference.iter().zip(model).map(|(&r, &m)| [r, m]).collect()
    };

    let mut series = vec![
        Series::new("Before calibration", Style::Markers, pair(&prior)),
        Series::new("After calibration", Style::Markers, pair(&posterior)),
    ];

    let (low, high) = reference
        .iter()
        .filter(|value| !value.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), &value| {
            (low.min(value), high.max(value))
        });
    if low <= high {
        series.push(Series::new(
            "Identity",
            Style::Dashed,
            vec![[low, low], [high, high]],
        ));
    }

    Ok(Figure {
        title: options.title.clone().unwrap_or_else(|| output.to_owned()),
        x_label: "Reference data".to_owned(),
        y_label: "Model data".to_owned(),
        series,
    })
}

fn row_means(dataset: &Dataset, name: &str) -> Result<Vec<f64>, CalibrationError> {
    let values = dataset.get(name)?;
    Ok(values
        .mean_axis(Axis(1))
        .map(|means| means.to_vec())
        .unwrap_or_else(|| vec![f64::NAN; values.nrows()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    fn datasets() -> (Dataset, Dataset, Dataset) {
        let reference = Dataset::new().with("y", array![[1.0, 3.0], [4.0, 4.0]]).unwrap();
        let prior = Dataset::new().with("y", array![[0.0, 0.0], [1.0, 3.0]]).unwrap();
        let posterior = reference.clone();
        (reference, prior, posterior)
    }

    #[test]
    fn rows_are_averaged_over_components() {
        let (reference, prior, posterior) = datasets();
        let data = CalibrationData {
            reference: &reference,
            prior: &prior,
            posterior: &posterior,
        };

        let figure = data_versus_model(&data, &PostOptions::output("y")).unwrap();

        assert_eq!(figure.title, "y");
        assert_eq!(
            figure.series("Before calibration").unwrap().points,
            [[2.0, 0.0], [4.0, 2.0]]
        );
        assert_eq!(
            figure.series("After calibration").unwrap().points,
            [[2.0, 2.0], [4.0, 4.0]]
        );
        let identity = figure.series("Identity").unwrap();
        assert_eq!(identity.style, Style::Dashed);
        assert_eq!(identity.points, [[2.0, 2.0], [4.0, 4.0]]);
    }

    #[test]
    fn output_option_is_required() {
        let (reference, prior, posterior) = datasets();
        let data = CalibrationData {
            reference: &reference,
            prior: &prior,
            posterior: &posterior,
        };

        let error = data_versus_model(&data, &PostOptions::default()).unwrap_err();
        assert!(matches!(
            error,
            CalibrationError::Config(ConfigError::MissingPostOption { option: "output", .. })
        ));
    }
}
