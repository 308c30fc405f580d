use super::{Figure, History, PostOptions, Series, Style};
use crate::CalibrationError;

/// Plots the objective and every constraint against the evaluation index.
pub(super) fn opt_history(
    history: &History,
    options: &PostOptions,
) -> Result<Figure, CalibrationError> {
    let trace = |name: &str| -> Vec<[f64; 2]> {
        history
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry
                    .measures
                    .get(name)
                    .map(|&value| [(index + 1) as f64, value])
            })
            .collect()
    };

    let series = std::iter::once(&history.objective_name)
        .chain(&history.constraint_names)
        .map(|name| Series::new(name.clone(), Style::Line, trace(name)))
        .collect();

    Ok(Figure {
        title: options
            .title
            .clone()
            .unwrap_or_else(|| "Optimization history".to_owned()),
        x_label: "Evaluation".to_owned(),
        y_label: "Value".to_owned(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use gauge_core::Values;

    use crate::post::HistoryEntry;

    fn entry(objective: f64, constraint: Option<f64>) -> HistoryEntry {
        let mut measures = BTreeMap::from([("MSE[y]".to_owned(), objective)]);
        if let Some(value) = constraint {
            measures.insert("MAE[y]".to_owned(), value);
        }
        HistoryEntry {
            parameters: Values::new(),
            measures,
        }
    }

    #[test]
    fn one_series_per_measure() {
        let history = History {
            objective_name: "MSE[y]".to_owned(),
            constraint_names: vec!["MAE[y]".to_owned()],
            entries: vec![entry(4.0, Some(2.0)), entry(1.0, Some(1.0)), entry(0.0, None)],
        };

        let figure = opt_history(&history, &PostOptions::default()).unwrap();

        assert_eq!(figure.title, "Optimization history");
        assert_eq!(figure.series.len(), 2);
        assert_eq!(figure.series[0].label, "MSE[y]");
        assert_eq!(
            figure.series[0].points,
            [[1.0, 4.0], [2.0, 1.0], [3.0, 0.0]]
        );
        assert_eq!(figure.series[1].points, [[1.0, 2.0], [2.0, 1.0]]);
    }
}
