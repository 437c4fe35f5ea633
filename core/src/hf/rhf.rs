use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::{
    config::ScfConfig,
    diis::Diis,
    error::ScfError,
    integrals::{IntegralEngine, IntegralSet},
};

use super::{
    check_occupation,
    density::density_matrix,
    eigen::GeneralizedEigenSolver,
    fock::restricted_fock,
    observer::{IterationReport, LogObserver, ScfObserver},
    properties::dipole_moment,
    utils, HartreeFockInput, HartreeFockOutput,
};

/// The output of a restricted SCF run. `density` is the occupied projector `C_occ C_occ^T`
/// of one spin; the total electron density is twice that.
#[derive(Clone, Debug, Serialize)]
#[non_exhaustive]
pub struct RestrictedScfOutput {
    /// Whether the energy settled within the tolerance. An unconverged output holds the
    /// state of the last iteration and must not be trusted as an SCF solution.
    pub converged: bool,
    /// How many iterations were run
    pub iterations: usize,
    pub total_energy: f64,
    pub electronic_energy: f64,
    /// `tr(Hcore D)`
    pub one_electron_energy: f64,
    /// `tr(F D)`
    pub two_electron_energy: f64,
    pub nuclear_repulsion: f64,
    /// sorted in ascending order
    pub orbital_energies: DVector<f64>,
    /// molecular orbitals as columns, in the order of `orbital_energies`
    pub coefficients: DMatrix<f64>,
    pub density: DMatrix<f64>,
    /// the Fock matrix of the last iteration, before extrapolation
    pub fock: DMatrix<f64>,
}

impl RestrictedScfOutput {
    /// Density of both spins
    pub fn total_density(&self) -> DMatrix<f64> {
        2.0 * &self.density
    }
}

/// Runs a restricted closed-shell SCF with `n_closed` doubly occupied orbitals.
///
/// Iteration `k` builds the density of the current orbitals, builds its Fock matrix,
/// optionally replaces that by the DIIS extrapolation and diagonalizes the result. The
/// energy of iteration `k` is evaluated from the density and the raw Fock matrix of that
/// same iteration. The run has converged once two consecutive total energies differ by
/// less than `config.energy_tolerance`.
///
/// Running out of iterations is not an error: the output then has `converged == false`.
pub fn restricted_scf(
    integrals: &IntegralSet,
    nuclear_repulsion: f64,
    n_closed: usize,
    config: &ScfConfig,
    observer: &mut dyn ScfObserver,
) -> Result<RestrictedScfOutput, ScfError> {
    config.validate()?;
    let n_basis = integrals.n_basis();
    check_occupation("closed-shell orbitals", n_closed, n_basis)?;

    let overlap = integrals.overlap();
    let core_hamiltonian = integrals.core_hamiltonian();
    let solver = GeneralizedEigenSolver::new(overlap)?;

    let (mut coefficients, mut orbital_energies) =
        config.initial_guess.orbitals(&core_hamiltonian, overlap, &solver);
    let mut density = density_matrix(&coefficients, n_closed);
    let mut fock = core_hamiltonian.clone();

    let mut diis = config.use_diis.then(|| Diis::new(config.diis.clone()));

    let mut previous_energy = 0.0;
    let mut one_electron_energy = 0.0;
    let mut two_electron_energy = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        if observer.should_stop() {
            log::warn!("SCF cancelled before iteration {iteration}");
            break;
        }

        density = density_matrix(&coefficients, n_closed);
        fock = restricted_fock(&core_hamiltonian, &density, integrals.electron());

        let step = diis
            .as_mut()
            .map(|diis| diis.extrapolate(&fock, &density, overlap));
        let (next_coefficients, next_energies) =
            solver.solve(step.as_ref().map_or(&fock, |step| &step.fock));
        coefficients = next_coefficients;
        orbital_energies = next_energies;

        one_electron_energy = utils::trace_product(&core_hamiltonian, &density);
        two_electron_energy = utils::trace_product(&fock, &density);
        let total_energy = one_electron_energy + two_electron_energy + nuclear_repulsion;
        let energy_change = total_energy - previous_energy;
        iterations = iteration + 1;

        observer.on_iteration(&IterationReport {
            iteration,
            total_energy,
            energy_change,
            drms: step.map(|step| step.rms),
        });

        if energy_change.abs() < config.energy_tolerance {
            converged = true;
            density = density_matrix(&coefficients, n_closed);
            break;
        }
        previous_energy = total_energy;
    }

    let electronic_energy = one_electron_energy + two_electron_energy;
    let total_energy = electronic_energy + nuclear_repulsion;
    if converged {
        log::debug!("restricted SCF converged after {iterations} iterations: {total_energy} Eh");
    } else {
        log::warn!(
            "restricted SCF did not converge within {iterations} iterations, last energy {total_energy} Eh"
        );
    }

    Ok(RestrictedScfOutput {
        converged,
        iterations,
        total_energy,
        electronic_energy,
        one_electron_energy,
        two_electron_energy,
        nuclear_repulsion,
        orbital_energies,
        coefficients,
        density,
        fock,
    })
}

/// Restricted Hartree-Fock for a closed-shell geometry: resolves the basis, computes the
/// integrals with `engine` and runs [`restricted_scf`], logging every iteration.
pub fn restricted_hartree_fock(
    input: &HartreeFockInput,
    engine: &dyn IntegralEngine,
) -> Result<HartreeFockOutput<RestrictedScfOutput>, ScfError> {
    let n_closed = input.geometry.closed_shell_occupation()?;
    let basis = input.basis_set.basis_for(input.geometry)?;
    let integrals = engine.compute(&basis, input.geometry)?;

    let nuclear_repulsion = input.geometry.nuclear_repulsion();
    log::debug!("nuclear repulsion energy: {nuclear_repulsion}");

    let mut observer = LogObserver {
        verbose: input.config.verbose,
    };
    let scf = restricted_scf(
        &integrals,
        nuclear_repulsion,
        n_closed,
        input.config,
        &mut observer,
    )?;
    let dipole_moment = dipole_moment(input.geometry, &integrals, &scf.total_density());

    Ok(HartreeFockOutput { scf, dipole_moment })
}
