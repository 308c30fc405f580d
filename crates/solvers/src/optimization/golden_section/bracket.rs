/// Inverse golden ratio, `(√5 - 1) / 2`.
const RATIO: f64 = 0.618_033_988_749_895;

/// Outer bounds `low <= high` with interior points `lower <= upper`.
///
/// The interior points sit at fractions `1 - RATIO` and `RATIO` of the
/// width, so dropping either end leaves one of them in place for the next
/// iteration.
#[derive(Debug, Clone, Copy)]
pub(super) struct Bracket {
    low: f64,
    high: f64,
    lower: f64,
    upper: f64,
}

fn at(low: f64, high: f64, fraction: f64) -> f64 {
    low + fraction * (high - low)
}

impl Bracket {
    pub(super) fn new([a, b]: [f64; 2]) -> Self {
        let (low, high) = (a.min(b), a.max(b));
        Self {
            low,
            high,
            lower: at(low, high, 1.0 - RATIO),
            upper: at(low, high, RATIO),
        }
    }

    pub(super) fn bounds(&self) -> [f64; 2] {
        [self.low, self.high]
    }

    pub(super) fn lower(&self) -> f64 {
        self.lower
    }

    pub(super) fn upper(&self) -> f64 {
        self.upper
    }

    /// Distance between the interior points.
    pub(super) fn gap(&self) -> f64 {
        self.upper - self.lower
    }

    pub(super) fn mid(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Drops `(upper, high]` and returns the new lower interior point.
    pub(super) fn keep_lower(&mut self) -> f64 {
        self.high = self.upper;
        self.upper = self.lower;
        self.lower = at(self.low, self.high, 1.0 - RATIO);
        self.lower
    }

    /// Drops `[low, lower)` and returns the new upper interior point.
    pub(super) fn keep_upper(&mut self) -> f64 {
        self.low = self.lower;
        self.lower = self.upper;
        self.upper = at(self.low, self.high, RATIO);
        self.upper
    }
}
