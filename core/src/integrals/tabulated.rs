use crate::{basis::MolecularBasis, error::ScfError, geometry::Geometry};

use super::{IntegralEngine, IntegralSet};

/// Serves integrals that were computed elsewhere, e.g. loaded from a file.
#[derive(Clone, Debug)]
pub struct TabulatedEngine {
    integrals: IntegralSet,
}

impl TabulatedEngine {
    pub fn new(integrals: IntegralSet) -> Self {
        Self { integrals }
    }
}

impl IntegralEngine for TabulatedEngine {
    fn compute(&self, basis: &MolecularBasis, _geometry: &Geometry) -> Result<IntegralSet, ScfError> {
        if basis.n_basis() != self.integrals.n_basis() {
            return Err(ScfError::DimensionMismatch {
                what: "tabulated integrals",
                expected: basis.n_basis(),
                found: self.integrals.n_basis(),
            });
        }
        Ok(self.integrals.clone())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{DMatrix, Vector3};

    use crate::{
        atom::Atom,
        basis::BasisSet,
        error::ScfError,
        geometry::Geometry,
        integrals::{ElectronTensor, IntegralEngine, IntegralSet},
        periodic_table::ElementType,
    };

    use super::TabulatedEngine;

    #[test]
    fn dimension_must_match_basis() {
        let geometry = Geometry::new(vec![
            Atom::new(ElementType::H, Vector3::zeros()),
            Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4)),
        ])
        .unwrap();
        let basis = BasisSet::named("sto-3g")
            .unwrap()
            .basis_for(&geometry)
            .unwrap();

        let three = IntegralSet::new(
            DMatrix::identity(3, 3),
            DMatrix::zeros(3, 3),
            DMatrix::zeros(3, 3),
            ElectronTensor::zeros(3),
        )
        .unwrap();
        assert!(matches!(
            TabulatedEngine::new(three).compute(&basis, &geometry),
            Err(ScfError::DimensionMismatch { .. })
        ));

        let two = IntegralSet::new(
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 2),
            ElectronTensor::zeros(2),
        )
        .unwrap();
        assert_eq!(
            TabulatedEngine::new(two.clone()).compute(&basis, &geometry),
            Ok(two)
        );
    }
}
