use nalgebra::{DMatrix, DVector, SymmetricEigen};

#[inline(always)]
/// Create a symmetric, square matrix. Function is only run for upper triangle of the matrix
pub(crate) fn symmetric_matrix(
    n: usize,
    mut func: impl FnMut(usize, usize) -> f64,
) -> DMatrix<f64> {
    let m = DMatrix::from_fn(n, n, |i, j| if i <= j { func(i, j) } else { 0.0 });
    DMatrix::from_fn(n, n, |i, j| if i <= j { m[(i, j)] } else { m[(j, i)] })
}

pub(crate) fn eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let eigs = SymmetricEigen::new(matrix);
    (eigs.eigenvectors, eigs.eigenvalues)
}

pub(crate) fn sorted_eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let (eigenvectors, eigenvalues) = eigs(matrix);

    let mut val_vec_pairs = eigenvalues
        .into_iter()
        .zip(eigenvectors.column_iter())
        .collect::<Vec<_>>();

    val_vec_pairs.sort_unstable_by(|(a, _), (b, _)| a.total_cmp(b));

    let (values, vectors): (Vec<_>, Vec<_>) = val_vec_pairs.into_iter().unzip();

    (
        DMatrix::from_columns(&vectors),
        DVector::from_column_slice(&values),
    )
}

/// tr(A B) for symmetric B, without forming the product
pub(crate) fn trace_product(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.dot(b)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    use super::{sorted_eigs, symmetric_matrix, trace_product};

    #[test]
    fn symmetric_matrix_mirrors_upper_triangle() {
        let mut calls = 0;
        let m = symmetric_matrix(3, |i, j| {
            calls += 1;
            (10 * i + j) as f64
        });

        assert_eq!(calls, 6);
        assert_eq!(m, m.transpose());
        assert_eq!(m[(2, 0)], 2.0);
    }

    #[test]
    fn eigenpairs_are_sorted() {
        let (vectors, values) = sorted_eigs(dmatrix![3.0, 0.0, 0.0; 0.0, -1.0, 0.0; 0.0, 0.0, 2.0]);

        assert_relative_eq!(values[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(values[2], 3.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[(1, 0)].abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[(2, 1)].abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[(0, 2)].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn trace_of_symmetric_product() {
        let a = dmatrix![1.0, 2.0; 2.0, 3.0];
        let b = dmatrix![0.5, -1.0; -1.0, 4.0];

        assert_relative_eq!(trace_product(&a, &b), (&a * &b).trace(), epsilon = 1e-12);
    }
}
