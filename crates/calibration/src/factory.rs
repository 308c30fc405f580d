use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{CalibrationMeasure, ConfigError, Measure};

/// Builds a measure from an output name and an optional mesh name.
pub type MeasureBuilder =
    Arc<dyn Fn(&str, Option<&str>) -> Box<dyn CalibrationMeasure> + Send + Sync>;

#[derive(Clone)]
struct MeasureEntry {
    integrated: bool,
    build: MeasureBuilder,
}

/// A registry of measure kinds.
///
/// [`MeasureFactory::new`] knows `MSE`, `MAE`, `ISE` and `IAE`. Further
/// kinds are added with [`MeasureFactory::register`].
#[derive(Clone)]
pub struct MeasureFactory {
    entries: BTreeMap<String, MeasureEntry>,
}

impl fmt::Debug for MeasureFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureFactory")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Default for MeasureFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureFactory {
    /// Creates a factory with the built-in kinds.
    #[must_use]
    pub fn new() -> Self {
        let mut factory = Self {
            entries: BTreeMap::new(),
        };
        factory.register("MSE", false, |output, _| Box::new(Measure::mse(output)));
        factory.register("MAE", false, |output, _| Box::new(Measure::mae(output)));
        factory.register("ISE", true, |output, mesh| {
            Box::new(Measure::ise(output, mesh.unwrap_or_default()))
        });
        factory.register("IAE", true, |output, mesh| {
            Box::new(Measure::iae(output, mesh.unwrap_or_default()))
        });
        factory
    }

    /// Registers (or replaces) a measure kind.
    ///
    /// Builders of integrated kinds always receive a mesh name; the others
    /// never do.
    pub fn register<F>(&mut self, kind: impl Into<String>, integrated: bool, build: F)
    where
        F: Fn(&str, Option<&str>) -> Box<dyn CalibrationMeasure> + Send + Sync + 'static,
    {
        self.entries.insert(
            kind.into(),
            MeasureEntry {
                integrated,
                build: Arc::new(build),
            },
        );
    }

    /// Creates a measure of `kind` comparing `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown, or if a mesh is missing for
    /// an integrated kind or given for a mean kind.
    pub fn create(
        &self,
        kind: &str,
        output: &str,
        mesh: Option<&str>,
    ) -> Result<Box<dyn CalibrationMeasure>, ConfigError> {
        let entry = self.entry(kind)?;
        match (entry.integrated, mesh) {
            (true, None) => Err(ConfigError::MissingMesh {
                kind: kind.to_owned(),
                output: output.to_owned(),
            }),
            (false, Some(_)) => Err(ConfigError::UnexpectedMesh {
                kind: kind.to_owned(),
                output: output.to_owned(),
            }),
            _ => Ok((entry.build)(output, mesh)),
        }
    }

    #[must_use]
    pub fn is_available(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Returns `true` if `kind` compares data defined on a mesh.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownMeasure`] if the kind is not registered.
    pub fn is_integrated(&self, kind: &str) -> Result<bool, ConfigError> {
        Ok(self.entry(kind)?.integrated)
    }

    /// Returns the registered kinds in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn entry(&self, kind: &str) -> Result<&MeasureEntry, ConfigError> {
        self.entries
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownMeasure(kind.to_owned()))
    }
}
