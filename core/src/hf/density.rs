use nalgebra::DMatrix;

/// `D = C_occ C_occ^T` over the first `n_occupied` columns (orbitals) of `coefficients`.
///
/// Zero occupied orbitals give the zero matrix.
pub fn density_matrix(coefficients: &DMatrix<f64>, n_occupied: usize) -> DMatrix<f64> {
    let n_basis = coefficients.nrows();
    assert!(
        n_occupied <= coefficients.ncols(),
        "cannot occupy {n_occupied} of {} orbitals",
        coefficients.ncols()
    );

    if n_occupied == 0 {
        return DMatrix::zeros(n_basis, n_basis);
    }

    let occupied = coefficients.columns(0, n_occupied);
    &occupied * occupied.transpose()
}
