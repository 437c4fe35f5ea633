pub mod density;
pub mod eigen;
pub mod fock;
mod guess;
pub mod observer;
pub mod properties;
mod rhf;
mod uhf;
pub(crate) mod utils;

#[cfg(test)]
mod fixtures;

use nalgebra::Vector3;
use serde::Serialize;

pub use guess::InitialGuess;
pub use observer::{IterationReport, LogObserver, NoopObserver, ScfObserver};
pub use rhf::{restricted_hartree_fock, restricted_scf, RestrictedScfOutput};
pub use uhf::{unrestricted_hartree_fock, unrestricted_scf, UnrestrictedScfOutput};

use crate::{basis::BasisSet, config::ScfConfig, error::ScfError, geometry::Geometry};

/// The input to a hartree fock calculation
#[derive(Clone, Copy)]
pub struct HartreeFockInput<'a> {
    /// the molecule to run hartree fock for, with its charge and multiplicity
    pub geometry: &'a Geometry,
    /// what basis set to use
    pub basis_set: &'a BasisSet,
    pub config: &'a ScfConfig,
}

/// An SCF result together with the properties derived from it.
#[derive(Clone, Debug, Serialize)]
pub struct HartreeFockOutput<S> {
    #[serde(flatten)]
    pub scf: S,
    /// in atomic units, relative to the origin
    pub dipole_moment: Vector3<f64>,
}

fn check_occupation(what: &'static str, requested: usize, available: usize) -> Result<(), ScfError> {
    if requested > available {
        return Err(ScfError::InvalidOccupation {
            what,
            requested,
            available,
        });
    }
    Ok(())
}
