const DEFAULT_MEASURE: &str = "MSE";

fn default_measure() -> String {
    DEFAULT_MEASURE.to_owned()
}

/// What to compare for one output, and how much it counts.
///
/// Without a measure kind the comparison is `MSE`. Integrated kinds also
/// need the name of the mesh the output is defined on. An unspecified
/// weight is filled in when the specs are composed.
///
/// With the `serde-derive` feature, specs can be read from configuration
/// files:
///
/// ```toml
/// output = "z"
/// measure = "ISE"
/// mesh = "time"
/// weight = 0.5
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationMeasureSpec {
    pub output: String,

    #[cfg_attr(feature = "serde-derive", serde(default = "default_measure"))]
    pub measure: String,

    #[cfg_attr(
        feature = "serde-derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mesh: Option<String>,

    #[cfg_attr(
        feature = "serde-derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub weight: Option<f64>,
}

impl CalibrationMeasureSpec {
    /// Compares `output` with the default measure and no weight.
    #[must_use]
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            measure: default_measure(),
            mesh: None,
            weight: None,
        }
    }

    #[must_use]
    pub fn measure(mut self, kind: impl Into<String>) -> Self {
        self.measure = kind.into();
        self
    }

    #[must_use]
    pub fn mesh(mut self, name: impl Into<String>) -> Self {
        self.mesh = Some(name.into());
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl From<&str> for CalibrationMeasureSpec {
    fn from(output: &str) -> Self {
        Self::new(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_field() {
        let spec = CalibrationMeasureSpec::new("z")
            .measure("ISE")
            .mesh("time")
            .weight(0.25);

        assert_eq!(spec.output, "z");
        assert_eq!(spec.measure, "ISE");
        assert_eq!(spec.mesh.as_deref(), Some("time"));
        assert_eq!(spec.weight, Some(0.25));
    }

    #[test]
    fn measure_defaults_to_mse() {
        let spec = CalibrationMeasureSpec::from("y");
        assert_eq!(spec.measure, "MSE");
        assert!(spec.mesh.is_none() && spec.weight.is_none());
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn omitted_fields_take_defaults() {
        let spec: CalibrationMeasureSpec = serde_json::from_str(r#"{"output": "y"}"#).unwrap();
        assert_eq!(spec, CalibrationMeasureSpec::new("y"));

        let json = serde_json::to_string(&CalibrationMeasureSpec::new("y")).unwrap();
        assert_eq!(json, r#"{"output":"y","measure":"MSE"}"#);
    }
}
