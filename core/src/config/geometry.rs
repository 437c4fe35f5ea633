use std::num::NonZeroU32;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::{atom::Atom, error::ScfError, geometry::Geometry, periodic_table::ElementType};

/// Represents a full molecule in a config file: a list of positioned atoms (in bohr),
/// with optional net charge and spin multiplicity.
#[derive(Deserialize)]
pub struct ConfigGeometry {
    atoms: Vec<ConfigAtom>,
    #[serde(default)]
    charge: i32,
    #[serde(default = "singlet")]
    multiplicity: NonZeroU32,
}

fn singlet() -> NonZeroU32 {
    NonZeroU32::MIN
}

#[derive(Deserialize)]
struct ConfigAtom {
    element: ElementType,
    position: Vec<f64>,
}

impl ConfigGeometry {
    pub fn override_charge(&mut self, charge: i32) {
        self.charge = charge;
    }

    pub fn override_multiplicity(&mut self, multiplicity: NonZeroU32) {
        self.multiplicity = multiplicity;
    }
}

impl TryFrom<ConfigGeometry> for Geometry {
    type Error = ScfError;

    fn try_from(value: ConfigGeometry) -> Result<Self, Self::Error> {
        let mut atoms = Vec::with_capacity(value.atoms.len());

        for atom in value.atoms {
            let &[x, y, z] = atom.position.as_slice() else {
                return Err(ScfError::DimensionMismatch {
                    what: "atom position",
                    expected: 3,
                    found: atom.position.len(),
                });
            };

            atoms.push(Atom::new(atom.element, Vector3::new(x, y, z)));
        }

        Geometry::with_charge_and_multiplicity(atoms, value.charge, value.multiplicity)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ScfError, geometry::Geometry, periodic_table::ElementType};

    use super::ConfigGeometry;

    #[test]
    fn parse_cation() {
        let config: ConfigGeometry = serde_json::from_str(
            r#"{
                "atoms": [
                    { "element": "He", "position": [0.0, 0.0, 0.0] },
                    { "element": "H", "position": [0.0, 0.0, 1.4632] }
                ],
                "charge": 1
            }"#,
        )
        .unwrap();

        let geometry = Geometry::try_from(config).unwrap();
        assert_eq!(geometry.atoms()[0].element_type(), ElementType::He);
        assert_eq!(geometry.atoms()[1].position().z, 1.4632);
        assert_eq!(geometry.n_electrons(), 2);
        assert_eq!(geometry.multiplicity(), 1);
    }

    #[test]
    fn overrides_apply() {
        let mut config: ConfigGeometry = serde_json::from_str(
            r#"{ "atoms": [ { "element": "H", "position": [0.0, 0.0, 0.0] } ] }"#,
        )
        .unwrap();
        config.override_multiplicity(std::num::NonZeroU32::new(2).unwrap());

        let geometry = Geometry::try_from(config).unwrap();
        assert_eq!((geometry.n_alpha(), geometry.n_beta()), (1, 0));
    }

    #[test]
    fn positions_need_three_coordinates() {
        let config: ConfigGeometry = serde_json::from_str(
            r#"{ "atoms": [ { "element": "H", "position": [0.0, 0.0] } ] }"#,
        )
        .unwrap();

        assert_eq!(
            Geometry::try_from(config).unwrap_err(),
            ScfError::DimensionMismatch {
                what: "atom position",
                expected: 3,
                found: 2
            }
        );
    }
}
