use std::fmt;

use crate::periodic_table::ElementType;

/// Everything that can go wrong before an SCF run gets going.
///
/// Non-convergence is deliberately not part of this enum: it is reported through the
/// `converged` flag of the output records.
#[derive(Clone, Debug, PartialEq)]
pub enum ScfError {
    /// Two objects that have to share the basis dimension don't.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A matrix that has to be symmetric isn't.
    NotSymmetric { what: &'static str },
    /// More occupied orbitals were requested than there are basis functions.
    InvalidOccupation {
        what: &'static str,
        requested: usize,
        available: usize,
    },
    /// The overlap matrix can't be orthogonalized.
    OverlapNotPositiveDefinite { smallest_eigenvalue: f64 },
    /// The molecular charge removes more electrons than there are.
    InvalidCharge { nuclear_charge: u32, charge: i32 },
    /// The spin multiplicity is incompatible with the number of electrons.
    InvalidMultiplicity { n_electrons: usize, multiplicity: u32 },
    /// Two nuclei sit on top of each other, so their repulsion is infinite.
    CoincidentAtoms { first: usize, second: usize },
    /// The basis set has no functions for an element of the geometry.
    MissingBasis { element: ElementType },
    /// No built-in basis set goes by this name.
    UnknownBasisSet { name: String },
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl fmt::Display for ScfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch in {what}: expected {expected}, found {found}"
            ),
            Self::NotSymmetric { what } => write!(f, "{what} is not symmetric"),
            Self::InvalidOccupation {
                what,
                requested,
                available,
            } => write!(
                f,
                "cannot occupy {requested} {what} orbitals with only {available} basis functions"
            ),
            Self::OverlapNotPositiveDefinite {
                smallest_eigenvalue,
            } => write!(
                f,
                "overlap matrix is not positive definite (smallest eigenvalue {smallest_eigenvalue:e})"
            ),
            Self::InvalidCharge {
                nuclear_charge,
                charge,
            } => write!(
                f,
                "molecular charge {charge} exceeds the total nuclear charge {nuclear_charge}"
            ),
            Self::InvalidMultiplicity {
                n_electrons,
                multiplicity,
            } => write!(
                f,
                "spin multiplicity {multiplicity} is impossible with {n_electrons} electrons"
            ),
            Self::CoincidentAtoms { first, second } => {
                write!(f, "atoms {first} and {second} are at the same position")
            }
            Self::MissingBasis { element } => {
                write!(f, "basis set has no functions for element {element:?}")
            }
            Self::UnknownBasisSet { name } => write!(f, "unknown basis set {name:?}"),
            Self::InvalidConfig(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for ScfError {}
