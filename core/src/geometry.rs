use std::num::NonZeroU32;

use itertools::Itertools;
use nalgebra::Vector3;

use crate::{atom::Atom, error::ScfError};

/// Nuclei closer than this (in bohr) are considered to be at the same position
const COINCIDENCE_CUTOFF: f64 = 1e-8;

/// The nuclear framework of a calculation together with its net charge and spin
/// multiplicity. Once built, a geometry is never modified.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub(crate) atoms: Vec<Atom>,
    charge: i32,
    multiplicity: NonZeroU32,
    n_electrons: usize,
}

impl Geometry {
    /// A neutral singlet.
    pub fn new(atoms: Vec<Atom>) -> Result<Self, ScfError> {
        Self::with_charge_and_multiplicity(atoms, 0, NonZeroU32::MIN)
    }

    pub fn with_charge_and_multiplicity(
        atoms: Vec<Atom>,
        charge: i32,
        multiplicity: NonZeroU32,
    ) -> Result<Self, ScfError> {
        let nuclear_charge = atoms.iter().map(Atom::nuclear_charge).sum::<u32>();

        let n_electrons = i64::from(nuclear_charge) - i64::from(charge);
        let n_electrons = usize::try_from(n_electrons).map_err(|_| ScfError::InvalidCharge {
            nuclear_charge,
            charge,
        })?;

        // 2S + 1 = M, and 2S unpaired electrons must fit and leave an even remainder
        let unpaired = multiplicity.get() as usize - 1;
        if unpaired > n_electrons || (n_electrons - unpaired) % 2 != 0 {
            return Err(ScfError::InvalidMultiplicity {
                n_electrons,
                multiplicity: multiplicity.get(),
            });
        }

        let coincident = (0..atoms.len()).tuple_combinations().find(|&(first, second)| {
            (atoms[second].position - atoms[first].position).norm() < COINCIDENCE_CUTOFF
        });
        if let Some((first, second)) = coincident {
            return Err(ScfError::CoincidentAtoms { first, second });
        }

        Ok(Self {
            atoms,
            charge,
            multiplicity,
            n_electrons,
        })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn multiplicity(&self) -> u32 {
        self.multiplicity.get()
    }

    /// Sum of the nuclear charges of all atoms.
    pub fn nuclear_charge(&self) -> u32 {
        self.atoms.iter().map(Atom::nuclear_charge).sum()
    }

    /// Returns the number of total electrons in the system
    pub fn n_electrons(&self) -> usize {
        self.n_electrons
    }

    /// Returns the number of electrons in the alpha (by convention, spin up) state
    pub fn n_alpha(&self) -> usize {
        (self.n_electrons + self.multiplicity.get() as usize - 1) / 2
    }

    /// Returns the number of electrons in the beta (by convention, spin down) state
    pub fn n_beta(&self) -> usize {
        (self.n_electrons + 1 - self.multiplicity.get() as usize) / 2
    }

    /// Number of doubly occupied orbitals for a restricted closed-shell calculation.
    pub fn closed_shell_occupation(&self) -> Result<usize, ScfError> {
        if self.n_alpha() != self.n_beta() {
            return Err(ScfError::InvalidMultiplicity {
                n_electrons: self.n_electrons,
                multiplicity: self.multiplicity.get(),
            });
        }
        Ok(self.n_alpha())
    }

    /// Classical repulsion between all pairs of nuclei. Finite because construction
    /// rejects coincident nuclei.
    pub fn nuclear_repulsion(&self) -> f64 {
        let n_atoms = self.atoms.len();

        let mut potential = 0.0;
        for atom_a in 0..n_atoms {
            for atom_b in atom_a + 1..n_atoms {
                potential += (self.atoms[atom_a].nuclear_charge()
                    * self.atoms[atom_b].nuclear_charge()) as f64
                    / (self.atoms[atom_b].position - self.atoms[atom_a].position).norm()
            }
        }
        potential
    }

    /// `sum_A Z_A R_A`, the nuclear contribution to the dipole moment.
    pub fn nuclear_dipole(&self) -> Vector3<f64> {
        self.atoms
            .iter()
            .map(|atom| atom.nuclear_charge() as f64 * atom.position)
            .sum()
    }
}
