use nalgebra::{DMatrix, DVector};

use crate::error::ScfError;

use super::utils;

/// Overlap eigenvalues at or below this are treated as linear dependencies
const LINEAR_DEPENDENCE_CUTOFF: f64 = 1e-10;

/// Solves `F C = S C e` for a fixed overlap `S` by symmetric (Löwdin) orthogonalization.
///
/// The transformation `X = S^(-1/2)` is computed once; every call to [`solve`] then only
/// needs one ordinary symmetric eigendecomposition of `X^T F X`.
///
/// [`solve`]: GeneralizedEigenSolver::solve
#[derive(Clone, Debug)]
pub struct GeneralizedEigenSolver {
    transform: DMatrix<f64>,
}

impl GeneralizedEigenSolver {
    pub fn new(overlap: &DMatrix<f64>) -> Result<Self, ScfError> {
        let (u, values) = utils::eigs(overlap.clone());

        let smallest_eigenvalue = values.min();
        if !(smallest_eigenvalue > LINEAR_DEPENDENCE_CUTOFF) {
            return Err(ScfError::OverlapNotPositiveDefinite {
                smallest_eigenvalue,
            });
        }

        let diagonal_inv_sqrt = DMatrix::from_diagonal(&values.map(|f| f.sqrt().recip()));
        Ok(Self {
            transform: &u * (diagonal_inv_sqrt * u.transpose()),
        })
    }

    /// Returns the coefficient matrix (orbitals as columns) and the orbital energies, in
    /// ascending order of energy.
    pub fn solve(&self, fock: &DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
        assert_eq!(
            fock.shape(),
            self.transform.shape(),
            "fock matrix does not match the overlap"
        );

        let transformed_fock = self.transform.transpose() * (fock * &self.transform);
        let (transformed_coefficients, orbital_energies) = utils::sorted_eigs(transformed_fock);
        (&self.transform * transformed_coefficients, orbital_energies)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, DMatrix};

    use crate::error::ScfError;

    use super::GeneralizedEigenSolver;

    #[test]
    fn solves_generalized_problem() {
        let overlap = dmatrix![1.0, 0.4; 0.4, 1.0];
        let fock = dmatrix![-1.0, -0.6; -0.6, -0.5];

        let solver = GeneralizedEigenSolver::new(&overlap).unwrap();
        let (coefficients, energies) = solver.solve(&fock);

        assert!(energies[0] <= energies[1]);
        assert_relative_eq!(
            &fock * &coefficients,
            &overlap * &coefficients * DMatrix::from_diagonal(&energies),
            epsilon = 1e-12
        );
        // orbitals are orthonormal in the overlap metric
        assert_relative_eq!(
            coefficients.transpose() * &overlap * &coefficients,
            DMatrix::identity(2, 2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn identity_overlap_is_a_plain_eigenproblem() {
        let solver = GeneralizedEigenSolver::new(&DMatrix::identity(2, 2)).unwrap();
        let (_, energies) = solver.solve(&dmatrix![0.0, -1.0; -1.0, 0.0]);

        assert_relative_eq!(energies[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(energies[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_overlap_is_rejected() {
        let result = GeneralizedEigenSolver::new(&dmatrix![1.0, 1.0; 1.0, 1.0]);
        assert!(matches!(
            result,
            Err(ScfError::OverlapNotPositiveDefinite { .. })
        ));
    }
}
