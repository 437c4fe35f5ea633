//! Small systems shared by the SCF tests.

use std::num::NonZeroU32;

use nalgebra::{dmatrix, DMatrix, Vector3};

use crate::{
    atom::Atom,
    basis::{AtomicBasis, BasisSet},
    geometry::Geometry,
    integrals::{ElectronTensor, GaussianEngine, IntegralEngine, IntegralSet},
    periodic_table::ElementType,
};

/// H2 at 1.4 bohr in STO-3G
pub(crate) fn hydrogen_molecule() -> (Geometry, BasisSet) {
    let geometry = Geometry::new(vec![
        Atom::new(ElementType::H, Vector3::zeros()),
        Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4)),
    ])
    .unwrap();
    (geometry, BasisSet::named("sto-3g").unwrap())
}

/// HeH+ at 1.4632 bohr, STO-3G with Slater exponents 2.0925 (He) and 1.24 (H)
pub(crate) fn helium_hydride_cation() -> (Geometry, BasisSet) {
    let geometry = Geometry::with_charge_and_multiplicity(
        vec![
            Atom::new(ElementType::He, Vector3::zeros()),
            Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4632)),
        ],
        1,
        NonZeroU32::MIN,
    )
    .unwrap();
    let basis_set = BasisSet::new(
        "STO-3G (HeH+)",
        [
            (ElementType::H, AtomicBasis::sto_3g(1.24)),
            (ElementType::He, AtomicBasis::sto_3g(2.0925)),
        ],
    );
    (geometry, basis_set)
}

/// A doublet hydrogen atom in STO-3G
pub(crate) fn hydrogen_atom() -> (Geometry, BasisSet) {
    let geometry = Geometry::with_charge_and_multiplicity(
        vec![Atom::new(ElementType::H, Vector3::zeros())],
        0,
        NonZeroU32::new(2).unwrap(),
    )
    .unwrap();
    (geometry, BasisSet::named("sto-3g").unwrap())
}

pub(crate) fn integrals(geometry: &Geometry, basis_set: &BasisSet) -> IntegralSet {
    let basis = basis_set.basis_for(geometry).unwrap();
    GaussianEngine.compute(&basis, geometry).unwrap()
}

/// Two orthonormal sites with hopping `t` and on-site repulsion `u`.
pub(crate) fn hubbard_dimer(t: f64, u: f64) -> IntegralSet {
    IntegralSet::new(
        DMatrix::identity(2, 2),
        dmatrix![0.0, -t; -t, 0.0],
        DMatrix::zeros(2, 2),
        ElectronTensor::from_unique(2, [((0, 0, 0, 0), u), ((1, 1, 1, 1), u)]).unwrap(),
    )
    .unwrap()
}
