/// Element-wise comparison between a reference value and a model value.
#[derive(Debug, Clone, Copy)]
pub enum Comparison {
    /// `(model - reference)²`.
    Squared,

    /// `|model - reference|`.
    Absolute,

    /// A user function of `(reference, model)`.
    Custom(fn(f64, f64) -> f64),
}

impl Comparison {
    #[must_use]
    pub fn apply(self, reference: f64, model: f64) -> f64 {
        match self {
            Self::Squared => (model - reference).powi(2),
            Self::Absolute => (model - reference).abs(),
            Self::Custom(compare) => compare(reference, model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_comparisons_are_symmetric() {
        for compare in [Comparison::Squared, Comparison::Absolute] {
            assert_eq!(compare.apply(1.0, 3.0), compare.apply(3.0, 1.0));
        }
        assert_eq!(Comparison::Squared.apply(1.0, 3.0), 4.0);
        assert_eq!(Comparison::Absolute.apply(1.0, 3.0), 2.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(Comparison::Squared.apply(f64::NAN, 1.0).is_nan());
    }
}
