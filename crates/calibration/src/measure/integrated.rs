use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use ninterp::{
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
};

use super::Comparison;
use crate::MeasureError;

/// The mesh and values of one output, row by row.
pub(super) struct Side<'a> {
    mesh: ArrayView2<'a, f64>,
    values: ArrayView2<'a, f64>,
}

impl<'a> Side<'a> {
    pub(super) fn new(
        mesh_name: &str,
        output: &str,
        mesh: &'a Array2<f64>,
        values: &'a Array2<f64>,
    ) -> Result<Self, MeasureError> {
        if mesh.dim() != values.dim() {
            return Err(MeasureError::MeshShape {
                mesh: mesh_name.to_owned(),
                output: output.to_owned(),
                mesh_shape: mesh.dim(),
                output_shape: values.dim(),
            });
        }
        Ok(Self {
            mesh: mesh.view(),
            values: values.view(),
        })
    }
}

/// Averages, over rows, the integral of the comparison on the reference mesh.
///
/// Model values are linearly interpolated onto the reference mesh. A
/// reference point outside the model mesh is an error, never clamped.
pub(super) fn row_mean(
    output: &str,
    reference: &Side<'_>,
    model: &Side<'_>,
    compare: Comparison,
) -> Result<f64, MeasureError> {
    let rows = reference.values.nrows();
    if model.values.nrows() != rows {
        return Err(MeasureError::RowMismatch {
            output: output.to_owned(),
            reference: rows,
            model: model.values.nrows(),
        });
    }

    let mut total = 0.0;
    for i in 0..rows {
        let (ref_mesh, ref_values) = ascending(reference.mesh.row(i), reference.values.row(i));
        let (model_mesh, model_values) = ascending(model.mesh.row(i), model.values.row(i));

        let interp = Interp1DOwned::new(
            model_mesh,
            model_values,
            ninterp::strategy::Linear,
            Extrapolate::Error,
        )?;

        let compared = ref_mesh
            .iter()
            .zip(&ref_values)
            .map(|(&t, &r)| -> Result<f64, MeasureError> {
                Ok(compare.apply(r, interp.interpolate(&[t])?))
            })
            .collect::<Result<Vec<f64>, MeasureError>>()?;

        total += trapezoid(&ref_mesh, &compared);
    }

    Ok(total / rows as f64)
}

/// Reverses a strictly descending mesh together with its values.
fn ascending(mesh: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>) -> (Array1<f64>, Array1<f64>) {
    let descending = mesh.len() > 1 && mesh.windows(2).into_iter().all(|w| w[0] > w[1]);
    if descending {
        (
            mesh.slice(s![..;-1]).to_owned(),
            values.slice(s![..;-1]).to_owned(),
        )
    } else {
        (mesh.to_owned(), values.to_owned())
    }
}

fn trapezoid(mesh: &Array1<f64>, values: &[f64]) -> f64 {
    mesh.iter()
        .zip(values)
        .collect::<Vec<_>>()
        .windows(2)
        .map(|pair| {
            let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
            0.5 * (t1 - t0) * (v0 + v1)
        })
        .sum()
}
