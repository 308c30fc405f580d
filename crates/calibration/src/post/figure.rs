/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Style {
    Line,
    Dashed,
    Markers,
}

/// A named set of points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    pub label: String,
    pub style: Style,
    pub points: Vec<[f64; 2]>,
}

impl Series {
    #[must_use]
    pub fn new(label: impl Into<String>, style: Style, points: Vec<[f64; 2]>) -> Self {
        Self {
            label: label.into(),
            style,
            points,
        }
    }
}

/// A 2D figure produced by a post-processing.
///
/// Figures are plain data; the `plot` feature adds [`Figure::show`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Figure {
    /// Returns the series labelled `label`.
    #[must_use]
    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|series| series.label == label)
    }
}
