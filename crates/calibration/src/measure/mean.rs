use ndarray::ArrayView2;

use super::Comparison;

/// Mean of the comparison over the pairs where neither value is NaN.
///
/// Returns NaN when every pair has a NaN. Shapes are checked by the caller.
pub(super) fn nan_mean(
    reference: ArrayView2<'_, f64>,
    model: ArrayView2<'_, f64>,
    compare: Comparison,
) -> f64 {
    let (sum, count) = reference
        .iter()
        .zip(model.iter())
        .filter(|(r, m)| !r.is_nan() && !m.is_nan())
        .fold((0.0, 0_usize), |(sum, count), (&r, &m)| {
            (sum + compare.apply(r, m), count + 1)
        });

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
