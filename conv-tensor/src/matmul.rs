use super::*;

/// Computes `out = a x b` with the plain triple loop over mapped matrix values.
///
/// Every operand access may walk a lineage, which keeps memory flat at the cost of recomputing
/// coordinates. Returns an error without touching `out` if the shapes are incompatible.
pub fn multiply<T, A, B>(a: &A, b: &B, out: &mut OutputMatrix<'_, T>) -> Result<()>
where
    T: Element,
    A: MatrixSource<T> + ?Sized,
    B: MatrixSource<T> + ?Sized,
{
    let (m, k) = (a.matrix_rows(), a.matrix_cols());
    let (k2, n) = (b.matrix_rows(), b.matrix_cols());

    if k != k2 {
        return Err(TensorError::DimensionMismatch(format!(
            "Matrix dimensions incompatible for multiplication: {m}x{k} @ {k2}x{n}"
        )));
    }

    if out.rows() != m || out.cols() != n {
        return Err(TensorError::DimensionMismatch(format!(
            "Output matrix is {}x{}, product is {m}x{n}",
            out.rows(),
            out.cols()
        )));
    }

    log::debug!("multiply {m}x{k} @ {k}x{n}");

    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            for l in 0..k {
                sum += a.matrix_value_at(i, l) * b.matrix_value_at(l, j);
            }
            out.set(i, j, sum);
        }
    }

    Ok(())
}
