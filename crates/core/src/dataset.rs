use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2, Axis, concatenate};
use thiserror::Error;

use crate::Values;

/// Errors that can occur when building or reading a [`Dataset`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("variable `{0}` is not in the dataset")]
    MissingVariable(String),

    #[error("variable `{name}` has {expected} column(s), got {found}")]
    ColumnMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("variable `{name}` has {found} row(s), expected {expected}")]
    RowMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("sample variables {found:?} do not match dataset variables {expected:?}")]
    VariableMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Tabular samples of named variables.
///
/// Each variable is a 2D array whose rows are samples and whose columns are
/// the components of the variable. All variables share the same number of
/// rows. `NaN` entries are allowed and mark missing observations.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Dataset {
    variables: BTreeMap<String, Array2<f64>>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from row-major nested vectors, one entry per variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows of a variable have different lengths or
    /// if the variables have different row counts.
    pub fn from_rows<I, S>(columns: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (S, Vec<Vec<f64>>)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, rows) in columns {
            let name = name.into();
            let width = rows.first().map_or(0, Vec::len);
            let mut array = Array2::zeros((rows.len(), width));
            for (i, row) in rows.iter().enumerate() {
                if row.len() != width {
                    return Err(DatasetError::ColumnMismatch {
                        name,
                        expected: width,
                        found: row.len(),
                    });
                }
                for (j, value) in row.iter().enumerate() {
                    array[[i, j]] = *value;
                }
            }
            dataset.insert(name, array)?;
        }
        Ok(dataset)
    }

    /// Inserts (or replaces) a variable.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::RowMismatch`] if the array's row count differs
    /// from the other variables'.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Array2<f64>,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        let expected = self
            .variables
            .iter()
            .find(|(existing, _)| **existing != name)
            .map(|(_, array)| array.nrows());

        if let Some(expected) = expected {
            if values.nrows() != expected {
                return Err(DatasetError::RowMismatch {
                    name,
                    expected,
                    found: values.nrows(),
                });
            }
        }

        self.variables.insert(name, values);
        Ok(())
    }

    /// Builder-style [`Dataset::insert`].
    ///
    /// # Errors
    ///
    /// See [`Dataset::insert`].
    pub fn with(
        mut self,
        name: impl Into<String>,
        values: Array2<f64>,
    ) -> Result<Self, DatasetError> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Returns the samples of a variable.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingVariable`] if the variable is absent.
    pub fn get(&self, name: &str) -> Result<&Array2<f64>, DatasetError> {
        self.variables
            .get(name)
            .ok_or_else(|| DatasetError::MissingVariable(name.to_owned()))
    }

    /// Returns `true` if the dataset holds the variable.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Returns the variable names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Iterates over the variables and their samples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<f64>)> {
        self.variables
            .iter()
            .map(|(name, array)| (name.as_str(), array))
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.variables.values().next().map_or(0, Array2::nrows)
    }

    /// Returns `true` if the dataset has no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Appends one sample.
    ///
    /// The first sample fixes the variable set and the column count of each
    /// variable. Later samples must match both; the dataset is left untouched
    /// when they don't.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::VariableMismatch`] or
    /// [`DatasetError::ColumnMismatch`] if the sample does not fit.
    pub fn push_row(&mut self, sample: &Values) -> Result<(), DatasetError> {
        if self.variables.is_empty() {
            for (name, values) in sample {
                let row = values.view().insert_axis(Axis(0)).to_owned();
                self.variables.insert(name.clone(), row);
            }
            return Ok(());
        }

        if !self.variables.keys().eq(sample.keys()) {
            return Err(DatasetError::VariableMismatch {
                expected: self.variables.keys().cloned().collect(),
                found: sample.keys().cloned().collect(),
            });
        }

        for (name, array) in &self.variables {
            let found = sample[name].len();
            if found != array.ncols() {
                return Err(DatasetError::ColumnMismatch {
                    name: name.clone(),
                    expected: array.ncols(),
                    found,
                });
            }
        }

        for (name, array) in &mut self.variables {
            let values = &sample[name];
            let expected = array.ncols();
            array
                .push_row(values.view())
                .map_err(|_| DatasetError::ColumnMismatch {
                    name: name.clone(),
                    expected,
                    found: values.len(),
                })?;
        }
        Ok(())
    }

    /// Returns sample `index` as named 1D arrays, or `None` if out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Values> {
        if index >= self.n_rows() {
            return None;
        }
        Some(
            self.variables
                .iter()
                .map(|(name, array)| (name.clone(), array.row(index).to_owned()))
                .collect(),
        )
    }

    /// Stacks the named variables side by side, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing.
    pub fn hstack(&self, names: &[String]) -> Result<Array2<f64>, DatasetError> {
        let views = names
            .iter()
            .map(|name| self.get(name).map(Array2::view))
            .collect::<Result<Vec<ArrayView2<'_, f64>>, _>>()?;

        if views.is_empty() {
            return Ok(Array2::zeros((self.n_rows(), 0)));
        }

        concatenate(Axis(1), &views).map_err(|_| DatasetError::RowMismatch {
            name: names.join(", "),
            expected: self.n_rows(),
            found: views.iter().map(ArrayView2::nrows).max().unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array1, array};

    fn sample(pairs: &[(&str, &[f64])]) -> Values {
        pairs
            .iter()
            .map(|(name, values)| ((*name).to_owned(), Array1::from(values.to_vec())))
            .collect()
    }

    #[test]
    fn from_rows_builds_variables() {
        let dataset = Dataset::from_rows([
            ("x", vec![vec![1.0], vec![2.0]]),
            ("y", vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        ])
        .unwrap();

        assert_eq!(dataset.n_rows(), 2);
        assert_eq!(dataset.get("y").unwrap(), &array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(dataset.names().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = Dataset::from_rows([("y", vec![vec![1.0, 2.0], vec![3.0]])]).unwrap_err();
        assert!(matches!(error, DatasetError::ColumnMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn insert_checks_row_counts() {
        let mut dataset = Dataset::new();
        dataset.insert("x", array![[1.0], [2.0]]).unwrap();

        let error = dataset.insert("y", array![[1.0]]).unwrap_err();
        assert!(matches!(error, DatasetError::RowMismatch { expected: 2, found: 1, .. }));

        // Replacing the only variable may change the row count.
        dataset.insert("x", array![[1.0]]).unwrap();
        assert_eq!(dataset.n_rows(), 1);
    }

    #[test]
    fn missing_variable_is_an_error() {
        let dataset = Dataset::new();
        assert_eq!(
            dataset.get("y").unwrap_err(),
            DatasetError::MissingVariable("y".into())
        );
    }

    #[test]
    fn push_row_appends_samples() {
        let mut dataset = Dataset::new();
        dataset.push_row(&sample(&[("x", &[1.0]), ("y", &[2.0, 3.0])])).unwrap();
        dataset.push_row(&sample(&[("x", &[4.0]), ("y", &[5.0, 6.0])])).unwrap();

        assert_eq!(dataset.n_rows(), 2);
        assert_eq!(dataset.get("y").unwrap(), &array![[2.0, 3.0], [5.0, 6.0]]);

        let row = dataset.row(1).unwrap();
        assert_eq!(row["x"], array![4.0]);
        assert!(dataset.row(2).is_none());
    }

    #[test]
    fn push_row_rejects_mismatches_without_mutating() {
        let mut dataset = Dataset::new();
        dataset.push_row(&sample(&[("x", &[1.0]), ("y", &[2.0])])).unwrap();

        let error = dataset
            .push_row(&sample(&[("x", &[1.0]), ("y", &[2.0, 3.0])]))
            .unwrap_err();
        assert!(matches!(error, DatasetError::ColumnMismatch { .. }));

        let error = dataset.push_row(&sample(&[("x", &[1.0])])).unwrap_err();
        assert!(matches!(error, DatasetError::VariableMismatch { .. }));

        assert_eq!(dataset.n_rows(), 1);
        assert_eq!(dataset.get("x").unwrap().nrows(), 1);
    }

    #[test]
    fn hstack_follows_requested_order() {
        let dataset = Dataset::from_rows([
            ("a", vec![vec![1.0], vec![2.0]]),
            ("b", vec![vec![10.0, 20.0], vec![30.0, 40.0]]),
        ])
        .unwrap();

        let stacked = dataset.hstack(&["b".to_owned(), "a".to_owned()]).unwrap();
        assert_eq!(stacked, array![[10.0, 20.0, 1.0], [30.0, 40.0, 2.0]]);
    }

    #[test]
    fn nan_values_are_kept() {
        let dataset = Dataset::from_rows([("y", vec![vec![f64::NAN], vec![1.0]])]).unwrap();
        assert!(dataset.get("y").unwrap()[[0, 0]].is_nan());
    }
}
