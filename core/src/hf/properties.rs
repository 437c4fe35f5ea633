use nalgebra::{DMatrix, Vector3};

use crate::{geometry::Geometry, integrals::IntegralSet};

use super::utils;

/// Electric dipole moment `sum_A Z_A R_A - sum_ij P[i, j] <i|r|j>` in atomic units, for
/// the total (both spins) density `P`.
pub fn dipole_moment(
    geometry: &Geometry,
    integrals: &IntegralSet,
    total_density: &DMatrix<f64>,
) -> Vector3<f64> {
    let [x, y, z] = integrals.dipole();
    let electronic = Vector3::new(
        utils::trace_product(x, total_density),
        utils::trace_product(y, total_density),
        utils::trace_product(z, total_density),
    );

    geometry.nuclear_dipole() - electronic
}
