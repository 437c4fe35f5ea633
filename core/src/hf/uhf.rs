use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::{
    config::ScfConfig,
    diis::{Diis, DiisConfig, DiisStep},
    error::ScfError,
    integrals::{IntegralEngine, IntegralSet},
};

use super::{
    check_occupation,
    density::density_matrix,
    eigen::GeneralizedEigenSolver,
    fock::unrestricted_fock,
    observer::{IterationReport, LogObserver, ScfObserver},
    properties::dipole_moment,
    utils, HartreeFockInput, HartreeFockOutput,
};

/// The output of an unrestricted SCF run, with separate orbitals per spin.
#[derive(Clone, Debug, Serialize)]
#[non_exhaustive]
pub struct UnrestrictedScfOutput {
    /// Whether the energy settled within the tolerance. An unconverged output holds the
    /// state of the last iteration and must not be trusted as an SCF solution.
    pub converged: bool,
    /// How many iterations were run
    pub iterations: usize,
    pub total_energy: f64,
    pub electronic_energy: f64,
    /// `1/2 tr(Hcore (Da + Db))`
    pub one_electron_energy: f64,
    /// `1/2 tr(Fa Da) + 1/2 tr(Fb Db)`
    pub two_electron_energy: f64,
    pub nuclear_repulsion: f64,
    pub orbital_energies_alpha: DVector<f64>,
    pub orbital_energies_beta: DVector<f64>,
    pub coefficients_alpha: DMatrix<f64>,
    pub coefficients_beta: DMatrix<f64>,
    pub density_alpha: DMatrix<f64>,
    pub density_beta: DMatrix<f64>,
    pub fock_alpha: DMatrix<f64>,
    pub fock_beta: DMatrix<f64>,
}

impl UnrestrictedScfOutput {
    pub fn total_density(&self) -> DMatrix<f64> {
        &self.density_alpha + &self.density_beta
    }

    /// `Da - Db`
    pub fn spin_density(&self) -> DMatrix<f64> {
        &self.density_alpha - &self.density_beta
    }
}

/// One spin channel of the iteration
struct Channel {
    coefficients: DMatrix<f64>,
    orbital_energies: DVector<f64>,
    density: DMatrix<f64>,
    fock: DMatrix<f64>,
    n_occupied: usize,
    diis: Option<Diis>,
}

impl Channel {
    /// Starts from shared guess orbitals, with DIIS on when `diis` is given.
    fn new(
        coefficients: &DMatrix<f64>,
        orbital_energies: &DVector<f64>,
        core_hamiltonian: &DMatrix<f64>,
        n_occupied: usize,
        diis: Option<&DiisConfig>,
    ) -> Self {
        Self {
            density: density_matrix(coefficients, n_occupied),
            coefficients: coefficients.clone(),
            orbital_energies: orbital_energies.clone(),
            fock: core_hamiltonian.clone(),
            n_occupied,
            diis: diis.map(|config| Diis::new(config.clone())),
        }
    }

    fn update_density(&mut self) {
        self.density = density_matrix(&self.coefficients, self.n_occupied);
    }

    /// Feed the new Fock matrix through this channel's DIIS and diagonalize the result.
    fn diagonalize(
        &mut self,
        fock: DMatrix<f64>,
        overlap: &DMatrix<f64>,
        solver: &GeneralizedEigenSolver,
    ) -> Option<DiisStep> {
        let step = self
            .diis
            .as_mut()
            .map(|diis| diis.extrapolate(&fock, &self.density, overlap));
        let (coefficients, orbital_energies) =
            solver.solve(step.as_ref().map_or(&fock, |step| &step.fock));

        self.coefficients = coefficients;
        self.orbital_energies = orbital_energies;
        self.fock = fock;
        step
    }
}

/// Runs an unrestricted SCF with `n_alpha` spin up and `n_beta` spin down electrons.
///
/// Same iteration as [`restricted_scf`](super::restricted_scf), with both spin channels
/// advanced in lockstep. Each channel has its own DIIS history; the beta channel uses
/// `config.beta_diis()`.
pub fn unrestricted_scf(
    integrals: &IntegralSet,
    nuclear_repulsion: f64,
    n_alpha: usize,
    n_beta: usize,
    config: &ScfConfig,
    observer: &mut dyn ScfObserver,
) -> Result<UnrestrictedScfOutput, ScfError> {
    config.validate()?;
    let n_basis = integrals.n_basis();
    check_occupation("alpha orbitals", n_alpha, n_basis)?;
    check_occupation("beta orbitals", n_beta, n_basis)?;

    let overlap = integrals.overlap();
    let core_hamiltonian = integrals.core_hamiltonian();
    let solver = GeneralizedEigenSolver::new(overlap)?;

    let (coefficients, orbital_energies) =
        config.initial_guess.orbitals(&core_hamiltonian, overlap, &solver);
    let channel = |n_occupied, diis: &DiisConfig| {
        let diis = config.use_diis.then_some(diis);
        Channel::new(&coefficients, &orbital_energies, &core_hamiltonian, n_occupied, diis)
    };
    let mut alpha = channel(n_alpha, &config.diis);
    let mut beta = channel(n_beta, config.beta_diis());

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

        alpha.update_density();
        beta.update_density();
        let (fock_alpha, fock_beta) = unrestricted_fock(
            &core_hamiltonian,
            &alpha.density,
            &beta.density,
            integrals.electron(),
        );

        let drms_alpha = alpha.diagonalize(fock_alpha, overlap, &solver).map(|step| step.rms);
        let drms_beta = beta.diagonalize(fock_beta, overlap, &solver).map(|step| step.rms);

        one_electron_energy =
            0.5 * utils::trace_product(&core_hamiltonian, &(&alpha.density + &beta.density));
        two_electron_energy = 0.5 * utils::trace_product(&alpha.fock, &alpha.density)
            + 0.5 * utils::trace_product(&beta.fock, &beta.density);
        let total_energy = one_electron_energy + two_electron_energy + nuclear_repulsion;
        let energy_change = total_energy - previous_energy;
        iterations = iteration + 1;

        observer.on_iteration(&IterationReport {
            iteration,
            total_energy,
            energy_change,
            drms: drms_alpha.zip(drms_beta).map(|(a, b)| a.max(b)),
        });

        if energy_change.abs() < config.energy_tolerance {
            converged = true;
            alpha.update_density();
            beta.update_density();
            break;
        }
        previous_energy = total_energy;
    }

    let electronic_energy = one_electron_energy + two_electron_energy;
    let total_energy = electronic_energy + nuclear_repulsion;
    if converged {
        log::debug!("unrestricted SCF converged after {iterations} iterations: {total_energy} Eh");
    } else {
        log::warn!(
            "unrestricted SCF did not converge within {iterations} iterations, last energy {total_energy} Eh"
        );
    }

    Ok(UnrestrictedScfOutput {
        converged,
        iterations,
        total_energy,
        electronic_energy,
        one_electron_energy,
        two_electron_energy,
        nuclear_repulsion,
        orbital_energies_alpha: alpha.orbital_energies,
        orbital_energies_beta: beta.orbital_energies,
        coefficients_alpha: alpha.coefficients,
        coefficients_beta: beta.coefficients,
        density_alpha: alpha.density,
        density_beta: beta.density,
        fock_alpha: alpha.fock,
        fock_beta: beta.fock,
    })
}

/// Unrestricted Hartree-Fock for any geometry: resolves the basis, computes the
/// integrals with `engine` and runs [`unrestricted_scf`] with the occupations implied by
/// the charge and multiplicity.
pub fn unrestricted_hartree_fock(
    input: &HartreeFockInput,
    engine: &dyn IntegralEngine,
) -> Result<HartreeFockOutput<UnrestrictedScfOutput>, ScfError> {
    let basis = input.basis_set.basis_for(input.geometry)?;
    let integrals = engine.compute(&basis, input.geometry)?;

    let nuclear_repulsion = input.geometry.nuclear_repulsion();
    log::debug!("nuclear repulsion energy: {nuclear_repulsion}");
    log::debug!(
        "{} alpha and {} beta electrons",
        input.geometry.n_alpha(),
        input.geometry.n_beta()
    );

    let mut observer = LogObserver {
        verbose: input.config.verbose,
    };
    let scf = unrestricted_scf(
        &integrals,
        nuclear_repulsion,
        input.geometry.n_alpha(),
        input.geometry.n_beta(),
        input.config,
        &mut observer,
    )?;
    let dipole_moment = dipole_moment(input.geometry, &integrals, &scf.total_density());

    Ok(HartreeFockOutput { scf, dipole_moment })
}
