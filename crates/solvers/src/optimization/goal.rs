/// Whether a solver should minimize or maximize the objective.
///
/// Solvers compare transformed objectives, so the same search code serves
/// both directions: minimizing `transform(f)` is the requested goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Goal {
    #[default]
    Minimize,
    Maximize,
}

impl Goal {
    /// Returns [`Goal::Maximize`] when `maximize` is set.
    #[must_use]
    pub fn from_maximize(maximize: bool) -> Self {
        if maximize {
            Self::Maximize
        } else {
            Self::Minimize
        }
    }

    /// Maps an objective to the score a solver minimizes.
    #[must_use]
    pub fn transform(self, objective: f64) -> f64 {
        match self {
            Self::Minimize => objective,
            Self::Maximize => -objective,
        }
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        self.transform(candidate) < self.transform(incumbent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn maximize_negates_scores() {
        assert_relative_eq!(Goal::Minimize.transform(-2.0), -2.0);
        assert_relative_eq!(Goal::Maximize.transform(-2.0), 2.0);
    }

    #[test]
    fn improvement_follows_the_goal() {
        assert!(Goal::Minimize.improves(1.0, 2.0));
        assert!(!Goal::Minimize.improves(2.0, 2.0));
        assert!(Goal::Maximize.improves(2.0, 1.0));
        assert_eq!(Goal::from_maximize(true), Goal::Maximize);
        assert_eq!(Goal::default(), Goal::Minimize);
    }
}
