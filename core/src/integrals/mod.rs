pub mod electron_tensor;
pub mod gaussian;
pub mod tabulated;

use nalgebra::DMatrix;

pub use electron_tensor::{ElectronTensor, IntegralIndex};
pub use gaussian::GaussianEngine;
pub use tabulated::TabulatedEngine;

use crate::{basis::MolecularBasis, error::ScfError, geometry::Geometry};

/// Absolute tolerance used when checking that input matrices are symmetric
const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Computes every integral an SCF run needs for a geometry in a given basis.
///
/// Implementations are picked when the calculation is set up; the SCF drivers only ever
/// see the resulting [`IntegralSet`].
pub trait IntegralEngine {
    fn compute(&self, basis: &MolecularBasis, geometry: &Geometry) -> Result<IntegralSet, ScfError>;
}

/// One- and two-electron integrals over a basis of size n. Read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegralSet {
    overlap: DMatrix<f64>,
    kinetic: DMatrix<f64>,
    nuclear: DMatrix<f64>,
    /// x, y and z dipole integrals
    dipole: [DMatrix<f64>; 3],
    electron: ElectronTensor,
}

impl IntegralSet {
    /// Bundles the integrals, checking that every matrix is n x n and symmetric and that
    /// the ERI tensor has the same dimension and its 8-fold permutational symmetry. Dipole integrals start out as zero.
    pub fn new(
        overlap: DMatrix<f64>,
        kinetic: DMatrix<f64>,
        nuclear: DMatrix<f64>,
        electron: ElectronTensor,
    ) -> Result<Self, ScfError> {
        let n = overlap.nrows();
        let dipole = [
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
        ];

        check_matrix("overlap matrix", &overlap, n)?;
        check_matrix("kinetic matrix", &kinetic, n)?;
        check_matrix("nuclear attraction matrix", &nuclear, n)?;
        if electron.size() != n {
            return Err(ScfError::DimensionMismatch {
                what: "electron repulsion tensor",
                expected: n,
                found: electron.size(),
            });
        }
        if !electron.is_symmetric(SYMMETRY_TOLERANCE) {
            return Err(ScfError::NotSymmetric {
                what: "electron repulsion tensor",
            });
        }

        Ok(Self {
            overlap,
            kinetic,
            nuclear,
            dipole,
            electron,
        })
    }

    pub fn with_dipole(mut self, dipole: [DMatrix<f64>; 3]) -> Result<Self, ScfError> {
        let n = self.n_basis();
        for (what, matrix) in ["x dipole matrix", "y dipole matrix", "z dipole matrix"]
            .into_iter()
            .zip(&dipole)
        {
            check_matrix(what, matrix, n)?;
        }
        self.dipole = dipole;
        Ok(self)
    }

    pub fn n_basis(&self) -> usize {
        self.overlap.nrows()
    }

    pub fn overlap(&self) -> &DMatrix<f64> {
        &self.overlap
    }

    pub fn kinetic(&self) -> &DMatrix<f64> {
        &self.kinetic
    }

    pub fn nuclear(&self) -> &DMatrix<f64> {
        &self.nuclear
    }

    pub fn dipole(&self) -> &[DMatrix<f64>; 3] {
        &self.dipole
    }

    pub fn electron(&self) -> &ElectronTensor {
        &self.electron
    }

    /// T + V
    pub fn core_hamiltonian(&self) -> DMatrix<f64> {
        &self.kinetic + &self.nuclear
    }
}

fn check_matrix(what: &'static str, matrix: &DMatrix<f64>, n: usize) -> Result<(), ScfError> {
    for found in [matrix.nrows(), matrix.ncols()] {
        if found != n {
            return Err(ScfError::DimensionMismatch {
                what,
                expected: n,
                found,
            });
        }
    }

    if !matrix.relative_eq(&matrix.transpose(), SYMMETRY_TOLERANCE, 0.0) {
        return Err(ScfError::NotSymmetric { what });
    }

    Ok(())
}
