use nalgebra::DMatrix;

use crate::integrals::ElectronTensor;

/// Coulomb matrix, `J[i, j] = sum_{kl} D[k, l] (ij|kl)`
pub fn coulomb(density: &DMatrix<f64>, electron: &ElectronTensor) -> DMatrix<f64> {
    electron.contract_coulomb(density)
}

/// Exchange matrix, `K[k, l] = sum_{ij} D[i, j] (ik|jl)`
pub fn exchange(density: &DMatrix<f64>, electron: &ElectronTensor) -> DMatrix<f64> {
    electron.contract_exchange(density)
}

/// J and K of the same density. The two contractions are independent of each other and
/// run concurrently with the `rayon` feature.
fn coulomb_and_exchange(
    density: &DMatrix<f64>,
    electron: &ElectronTensor,
) -> (DMatrix<f64>, DMatrix<f64>) {
    #[cfg(feature = "rayon")]
    {
        rayon::join(
            || coulomb(density, electron),
            || exchange(density, electron),
        )
    }

    #[cfg(not(feature = "rayon"))]
    {
        (coulomb(density, electron), exchange(density, electron))
    }
}

/// `F = H + 2 J(D) - K(D)` for a closed-shell density of one spin.
pub fn restricted_fock(
    core_hamiltonian: &DMatrix<f64>,
    density: &DMatrix<f64>,
    electron: &ElectronTensor,
) -> DMatrix<f64> {
    let (j, k) = coulomb_and_exchange(density, electron);
    core_hamiltonian + 2.0 * j - k
}

/// `F_a = H + J_a + J_b - K_a` and `F_b = H + J_a + J_b - K_b`.
pub fn unrestricted_fock(
    core_hamiltonian: &DMatrix<f64>,
    density_alpha: &DMatrix<f64>,
    density_beta: &DMatrix<f64>,
    electron: &ElectronTensor,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let (j_alpha, k_alpha) = coulomb_and_exchange(density_alpha, electron);
    let (j_beta, k_beta) = coulomb_and_exchange(density_beta, electron);

    let shared = core_hamiltonian + j_alpha + j_beta;
    let fock_alpha = &shared - k_alpha;
    let fock_beta = shared - k_beta;
    (fock_alpha, fock_beta)
}
