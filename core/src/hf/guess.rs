use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::{eigen::GeneralizedEigenSolver, utils};

/// Wolfsberg-Helmholz proportionality constant
const WOLFSBERG_HELMHOLZ: f64 = 1.75;

/// Where the first set of orbitals comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialGuess {
    /// Diagonalize the core Hamiltonian, ignoring electron repulsion entirely.
    #[default]
    CoreHamiltonian,
    /// Diagonalize an extended Hückel Hamiltonian built from the diagonal of the core
    /// Hamiltonian.
    ExtendedHuckel,
}

impl InitialGuess {
    /// Returns starting orbitals and their energies, sorted by energy.
    pub fn orbitals(
        &self,
        core_hamiltonian: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
        solver: &GeneralizedEigenSolver,
    ) -> (DMatrix<f64>, DVector<f64>) {
        match self {
            InitialGuess::CoreHamiltonian => solver.solve(core_hamiltonian),
            InitialGuess::ExtendedHuckel => {
                solver.solve(&extended_huckel_hamiltonian(core_hamiltonian, overlap))
            }
        }
    }
}

/// `H[i, i] = Hcore[i, i]` and `H[i, j] = K S[i, j] (Hcore[i, i] + Hcore[j, j]) / 2`
fn extended_huckel_hamiltonian(
    core_hamiltonian: &DMatrix<f64>,
    overlap: &DMatrix<f64>,
) -> DMatrix<f64> {
    utils::symmetric_matrix(core_hamiltonian.nrows(), |i, j| {
        if i == j {
            core_hamiltonian[(i, i)]
        } else {
            WOLFSBERG_HELMHOLZ
                * overlap[(i, j)]
                * (core_hamiltonian[(i, i)] + core_hamiltonian[(j, j)])
                / 2.0
        }
    })
}
