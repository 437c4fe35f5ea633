use std::collections::HashMap;

use smallvec::SmallVec;

use crate::{atom::Atom, error::ScfError, geometry::Geometry, periodic_table::ElementType};

use super::{BasisFunction, ContractedGaussian, Gaussian};

/// STO-3G fit of a Slater function with unit exponent, as (exponent, contraction) pairs.
const STO_3G_UNIT: [(f64, f64); 3] = [
    (2.227660584, 0.154328967),
    (0.405771156, 0.535328142),
    (0.109818000, 0.444634542),
];

/// Slater exponents of the standard STO-3G basis
const STO_3G_ZETA: [(ElementType, f64); 2] = [(ElementType::H, 1.24), (ElementType::He, 1.6875)];

#[derive(Debug)]
pub struct BasisSet {
    name: String,
    atomic_mapping: HashMap<ElementType, AtomicBasis>,
}

impl BasisSet {
    /// Look up one of the built-in basis sets by name (case insensitive).
    pub fn named(name: &str) -> Result<Self, ScfError> {
        match name.to_ascii_lowercase().as_str() {
            "sto-3g" | "sto3g" => Ok(Self::new(
                "STO-3G",
                STO_3G_ZETA
                    .into_iter()
                    .map(|(element, zeta)| (element, AtomicBasis::sto_3g(zeta))),
            )),
            _ => Err(ScfError::UnknownBasisSet {
                name: name.to_owned(),
            }),
        }
    }

    /// Create a new basis set given mappings from element type to the basis of that element
    pub fn new(
        name: impl Into<String>,
        atomic_mapping: impl IntoIterator<Item = (ElementType, AtomicBasis)>,
    ) -> Self {
        Self {
            name: name.into(),
            atomic_mapping: atomic_mapping.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the basis of a given atom, if it exists.
    pub fn for_atom(&self, atom: &Atom) -> Option<&AtomicBasis> {
        self.atomic_mapping.get(&atom.element_type)
    }

    /// Place the atomic bases on the atoms of a geometry, in atom order.
    pub fn basis_for(&self, geometry: &Geometry) -> Result<MolecularBasis, ScfError> {
        let mut functions = Vec::new();
        let mut centers = Vec::new();

        for (index, atom) in geometry.atoms().iter().enumerate() {
            let atomic_basis = self.for_atom(atom).ok_or(ScfError::MissingBasis {
                element: atom.element_type,
            })?;

            for contracted_gaussian in atomic_basis.basis_functions() {
                functions.push(BasisFunction {
                    contracted_gaussian: contracted_gaussian.clone(),
                    position: atom.position,
                });
                centers.push(index);
            }
        }

        log::debug!(
            "{} basis: {} functions on {} atoms",
            self.name,
            functions.len(),
            geometry.atoms().len()
        );

        Ok(MolecularBasis { functions, centers })
    }
}

/// Represents the basis functions for a single atom.
#[derive(Clone, Debug)]
pub struct AtomicBasis {
    shells: Vec<ContractedGaussian>,
}

impl AtomicBasis {
    pub fn new(shells: Vec<ContractedGaussian>) -> Self {
        Self { shells }
    }

    /// A single STO-3G s function for a Slater exponent `zeta`.
    pub fn sto_3g(zeta: f64) -> Self {
        let primitives = STO_3G_UNIT
            .iter()
            .map(|&(exponent, contraction)| Gaussian::normalized(exponent * zeta * zeta, contraction))
            .collect::<SmallVec<_>>();

        Self::new(vec![ContractedGaussian(primitives)])
    }

    pub fn basis_functions(&self) -> impl Iterator<Item = &ContractedGaussian> {
        self.shells.iter()
    }
}

/// The ordered basis functions of one geometry. Its length is the dimension of every
/// matrix in the calculation.
#[derive(Clone, Debug)]
pub struct MolecularBasis {
    functions: Vec<BasisFunction>,
    /// index of the atom each function sits on
    centers: Vec<usize>,
}

impl MolecularBasis {
    pub fn n_basis(&self) -> usize {
        self.functions.len()
    }

    pub fn functions(&self) -> &[BasisFunction] {
        &self.functions
    }

    pub fn centers(&self) -> &[usize] {
        &self.centers
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{atom::Atom, error::ScfError, geometry::Geometry, periodic_table::ElementType};

    use super::BasisSet;

    #[test]
    fn sto_3g_hydrogen_exponents() {
        let basis_set = BasisSet::named("STO-3G").unwrap();
        let geometry = Geometry::new(vec![
            Atom::new(ElementType::H, Vector3::zeros()),
            Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4)),
        ])
        .unwrap();

        let basis = basis_set.basis_for(&geometry).unwrap();
        assert_eq!(basis.n_basis(), 2);
        assert_eq!(basis.centers(), &[0, 1]);

        let primitives = basis.functions()[0].contracted_gaussian.primitives();
        assert_relative_eq!(primitives[0].exponent, 3.42525091, epsilon = 1e-6);
        assert_relative_eq!(primitives[1].exponent, 0.62391373, epsilon = 1e-6);
        assert_relative_eq!(primitives[2].exponent, 0.16885540, epsilon = 1e-6);
    }

    #[test]
    fn missing_element_is_reported() {
        let basis_set = BasisSet::named("sto-3g").unwrap();
        let geometry = Geometry::new(vec![Atom::new(ElementType::Ne, Vector3::zeros())]).unwrap();

        assert_eq!(
            basis_set.basis_for(&geometry).unwrap_err(),
            ScfError::MissingBasis {
                element: ElementType::Ne
            }
        );
    }

    #[test]
    fn unknown_basis_set() {
        assert!(matches!(
            BasisSet::named("6-31G"),
            Err(ScfError::UnknownBasisSet { .. })
        ));
    }
}
