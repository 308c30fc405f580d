//! Figures built from a completed calibration.
//!
//! Post-processings come from two registries. Calibration-specific ones see
//! the reference data and the model data before and after calibration.
//! Generic ones only see the optimization [`History`].

mod data_versus_model;
mod figure;
mod opt_history;
#[cfg(feature = "plot")]
mod plot;

pub use figure::{Figure, Series, Style};

use std::collections::BTreeMap;

use gauge_core::{Dataset, Values};

use crate::{CalibrationError, ConfigError};

/// Options shared by the post-processings.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct PostOptions {
    /// The output to plot, where the post-processing needs one.
    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub output: Option<String>,

    /// Replaces the default figure title.
    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub title: Option<String>,
}

impl PostOptions {
    /// Options plotting `output`.
    #[must_use]
    pub fn output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            title: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One evaluation of the calibrator during the optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub parameters: Values,
    pub measures: BTreeMap<String, f64>,
}

/// Every calibrator evaluation of an optimization, in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub objective_name: String,
    pub constraint_names: Vec<String>,
    pub entries: Vec<HistoryEntry>,
}

impl History {
    /// Returns the objective value of every evaluation.
    #[must_use]
    pub fn objective_values(&self) -> Vec<f64> {
        self.entries
            .iter()
            .filter_map(|entry| entry.measures.get(&self.objective_name).copied())
            .collect()
    }
}

/// The datasets a calibration-specific post-processing reads.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationData<'a> {
    pub reference: &'a Dataset,
    pub prior: &'a Dataset,
    pub posterior: &'a Dataset,
}

pub type CalibrationPost =
    fn(&CalibrationData<'_>, &PostOptions) -> Result<Figure, CalibrationError>;

pub type HistoryPost = fn(&History, &PostOptions) -> Result<Figure, CalibrationError>;

/// The registries of post-processings.
///
/// [`PostFactory::new`] knows `DataVersusModel` and `OptHistory`.
#[derive(Debug, Clone)]
pub struct PostFactory {
    calibration: BTreeMap<String, CalibrationPost>,
    history: BTreeMap<String, HistoryPost>,
}

impl Default for PostFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PostFactory {
    #[must_use]
    pub fn new() -> Self {
        let mut factory = Self {
            calibration: BTreeMap::new(),
            history: BTreeMap::new(),
        };
        factory.register_calibration("DataVersusModel", data_versus_model::data_versus_model);
        factory.register_history("OptHistory", opt_history::opt_history);
        factory
    }

    pub fn register_calibration(&mut self, name: impl Into<String>, post: CalibrationPost) {
        self.calibration.insert(name.into(), post);
    }

    pub fn register_history(&mut self, name: impl Into<String>, post: HistoryPost) {
        self.history.insert(name.into(), post);
    }

    /// Runs the post-processing `name`.
    ///
    /// Calibration-specific post-processings take precedence over generic
    /// ones with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPost`] if neither registry knows `name`,
    /// or the error of the post-processing itself.
    pub fn execute(
        &self,
        name: &str,
        data: &CalibrationData<'_>,
        history: &History,
        options: &PostOptions,
    ) -> Result<Figure, CalibrationError> {
        if let Some(post) = self.calibration.get(name) {
            return post(data, options);
        }
        if let Some(post) = self.history.get(name) {
            return post(history, options);
        }
        Err(ConfigError::UnknownPost(name.to_owned()).into())
    }

    /// Returns every registered name, calibration-specific ones first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.calibration
            .keys()
            .chain(self.history.keys())
            .map(String::as_str)
            .collect()
    }
}
