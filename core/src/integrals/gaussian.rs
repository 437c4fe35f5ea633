//! Closed-form integrals over contracted s-type Gaussians.
//!
//! Reference:
//!
//! [1] Szabo, A. and Ostlund, N. S. Modern Quantum Chemistry, Appendix A.
use std::f64::consts::PI;

use nalgebra::{DMatrix, Vector3};

use crate::{
    atom::Atom,
    basis::{BasisFunction, Gaussian, MolecularBasis},
    error::ScfError,
    geometry::Geometry,
    hf::utils,
};

use super::{ElectronTensor, IntegralEngine, IntegralSet};

/// Integral engine for basis sets made of spherical (s-type) contracted Gaussians.
#[derive(Copy, Clone, Debug, Default)]
pub struct GaussianEngine;

impl IntegralEngine for GaussianEngine {
    fn compute(&self, basis: &MolecularBasis, geometry: &Geometry) -> Result<IntegralSet, ScfError> {
        let functions = basis.functions();
        let n_basis = functions.len();

        let overlap = one_electron_matrix(functions, "overlap", primitive_overlap);
        log::debug!("overlap matrix: {overlap:0.4}");
        let kinetic = one_electron_matrix(functions, "kinetic", primitive_kinetic);
        log::debug!("kinetic matrix: {kinetic:0.4}");
        let nuclear = one_electron_matrix(functions, "nuclear", |a, pa, b, pb| {
            primitive_nuclear(a, pa, b, pb, geometry.atoms())
        });
        log::debug!("nuclear matrix: {nuclear:0.4}");
        let dipole = [0, 1, 2].map(|axis| {
            one_electron_matrix(functions, "dipole", |a, pa, b, pb| {
                primitive_dipole(a, pa, b, pb, axis)
            })
        });

        let electron = ElectronTensor::from_fn(n_basis, |i, j, k, l| {
            electron_repulsion(&functions[i], &functions[j], &functions[k], &functions[l])
        });

        IntegralSet::new(overlap, kinetic, nuclear, electron)?.with_dipole(dipole)
    }
}

/// Contract a primitive integral over two basis functions, for every pair of functions.
fn one_electron_matrix(
    basis: &[BasisFunction],
    name: &str,
    primitive: impl Fn(Vector3<f64>, Gaussian, Vector3<f64>, Gaussian) -> f64,
) -> DMatrix<f64> {
    utils::symmetric_matrix(basis.len(), |i, j| {
        let (basis_a, basis_b) = (&basis[i], &basis[j]);

        let mut output = 0.0;
        for (&primitive_a, &primitive_b) in itertools::iproduct!(
            basis_a.contracted_gaussian.primitives(),
            basis_b.contracted_gaussian.primitives()
        ) {
            output += primitive_a.coefficient
                * primitive_b.coefficient
                * primitive(basis_a.position, primitive_a, basis_b.position, primitive_b);
        }
        log::trace!("{name} ({i}{j}) = {output}");
        output
    })
}

/// Gaussian product center of two primitives
fn product_center(a: Vector3<f64>, alpha: f64, b: Vector3<f64>, beta: f64) -> Vector3<f64> {
    (alpha * a + beta * b) / (alpha + beta)
}

fn primitive_overlap(a: Vector3<f64>, pa: Gaussian, b: Vector3<f64>, pb: Gaussian) -> f64 {
    let (alpha, beta) = (pa.exponent, pb.exponent);
    let p = alpha + beta;

    (PI / p).powf(1.5) * (-alpha * beta / p * (a - b).norm_squared()).exp()
}

fn primitive_kinetic(a: Vector3<f64>, pa: Gaussian, b: Vector3<f64>, pb: Gaussian) -> f64 {
    let (alpha, beta) = (pa.exponent, pb.exponent);
    let reduced = alpha * beta / (alpha + beta);

    reduced * (3.0 - 2.0 * reduced * (a - b).norm_squared()) * primitive_overlap(a, pa, b, pb)
}

fn primitive_nuclear(
    a: Vector3<f64>,
    pa: Gaussian,
    b: Vector3<f64>,
    pb: Gaussian,
    nuclei: &[Atom],
) -> f64 {
    let (alpha, beta) = (pa.exponent, pb.exponent);
    let p = alpha + beta;
    let center = product_center(a, alpha, b, beta);
    let prefactor = -2.0 * PI / p * (-alpha * beta / p * (a - b).norm_squared()).exp();

    nuclei
        .iter()
        .map(|nucleus| {
            prefactor
                * nucleus.nuclear_charge() as f64
                * boys_zero(p * (center - nucleus.position).norm_squared())
        })
        .sum()
}

/// <a| r_axis |b> with the origin at zero
fn primitive_dipole(
    a: Vector3<f64>,
    pa: Gaussian,
    b: Vector3<f64>,
    pb: Gaussian,
    axis: usize,
) -> f64 {
    let center = product_center(a, pa.exponent, b, pb.exponent);
    center[axis] * primitive_overlap(a, pa, b, pb)
}

fn electron_repulsion(
    basis_a: &BasisFunction,
    basis_b: &BasisFunction,
    basis_c: &BasisFunction,
    basis_d: &BasisFunction,
) -> f64 {
    let (a, b, c, d) = (
        basis_a.position,
        basis_b.position,
        basis_c.position,
        basis_d.position,
    );
    let (ab_distance, cd_distance) = ((a - b).norm_squared(), (c - d).norm_squared());

    let mut output = 0.0;
    for (pa, pb) in itertools::iproduct!(
        basis_a.contracted_gaussian.primitives(),
        basis_b.contracted_gaussian.primitives()
    ) {
        let p = pa.exponent + pb.exponent;
        let center_p = product_center(a, pa.exponent, b, pb.exponent);
        let bra = pa.coefficient * pb.coefficient * (-pa.exponent * pb.exponent / p * ab_distance).exp();

        for (pc, pd) in itertools::iproduct!(
            basis_c.contracted_gaussian.primitives(),
            basis_d.contracted_gaussian.primitives()
        ) {
            let q = pc.exponent + pd.exponent;
            let center_q = product_center(c, pc.exponent, d, pd.exponent);
            let ket = pc.coefficient
                * pd.coefficient
                * (-pc.exponent * pd.exponent / q * cd_distance).exp();

            output += bra * ket * 2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt())
                * boys_zero(p * q / (p + q) * (center_p - center_q).norm_squared());
        }
    }
    output
}

/// Zeroth order Boys function, F0(t) = sqrt(pi / t) erf(sqrt(t)) / 2
fn boys_zero(t: f64) -> f64 {
    if t < 1e-8 {
        1.0 - t / 3.0
    } else {
        0.5 * (PI / t).sqrt() * libm::erf(t.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{
        atom::Atom,
        basis::{AtomicBasis, BasisSet},
        geometry::Geometry,
        integrals::IntegralEngine,
        periodic_table::ElementType,
    };

    use super::{boys_zero, GaussianEngine};

    #[test]
    fn boys_function_limits() {
        assert_relative_eq!(boys_zero(0.0), 1.0);
        assert_relative_eq!(boys_zero(1e-9), 1.0, epsilon = 1e-9);
        // continuous across the series cutoff
        assert_relative_eq!(boys_zero(1e-8 * 0.999), boys_zero(1e-8 * 1.001), epsilon = 1e-10);
        assert_relative_eq!(boys_zero(1.0), 0.746824132812427, epsilon = 1e-12);
        assert_relative_eq!(
            boys_zero(100.0),
            0.5 * (std::f64::consts::PI / 100.0).sqrt(),
            epsilon = 1e-12
        );
    }

    /// Reference values from Szabo and Ostlund, section 3.5.2.
    #[test]
    fn hydrogen_molecule_sto_3g() {
        let geometry = Geometry::new(vec![
            Atom::new(ElementType::H, Vector3::zeros()),
            Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4)),
        ])
        .unwrap();
        let basis = BasisSet::named("sto-3g")
            .unwrap()
            .basis_for(&geometry)
            .unwrap();

        let integrals = GaussianEngine.compute(&basis, &geometry).unwrap();

        assert_relative_eq!(integrals.overlap()[(0, 0)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(integrals.overlap()[(0, 1)], 0.6593, epsilon = 1e-4);
        assert_relative_eq!(integrals.kinetic()[(0, 0)], 0.7600, epsilon = 1e-4);
        assert_relative_eq!(integrals.kinetic()[(0, 1)], 0.2365, epsilon = 1e-4);

        let core_hamiltonian = integrals.core_hamiltonian();
        assert_relative_eq!(core_hamiltonian[(0, 0)], -1.1204, epsilon = 1e-4);
        assert_relative_eq!(core_hamiltonian[(0, 1)], -0.9584, epsilon = 1e-4);

        let electron = integrals.electron();
        assert!(electron.is_symmetric(1e-14));
        assert_relative_eq!(electron[(0, 0, 0, 0)], 0.7746, epsilon = 1e-4);
        assert_relative_eq!(electron[(0, 0, 1, 1)], 0.5697, epsilon = 1e-4);
        assert_relative_eq!(electron[(1, 0, 0, 0)], 0.4441, epsilon = 1e-4);
        assert_relative_eq!(electron[(1, 0, 1, 0)], 0.2970, epsilon = 1e-4);

        // both functions sit on the z axis, the second one at 1.4
        assert_relative_eq!(integrals.dipole()[0][(0, 1)], 0.0);
        assert_relative_eq!(integrals.dipole()[2][(1, 1)], 1.4, epsilon = 1e-5);
        assert_relative_eq!(
            integrals.dipole()[2][(0, 1)],
            0.7 * integrals.overlap()[(0, 1)],
            epsilon = 1e-12
        );
    }

    #[test]
    fn custom_slater_exponents() {
        let basis_set = BasisSet::new(
            "STO-3G (HeH+)",
            [
                (ElementType::H, AtomicBasis::sto_3g(1.24)),
                (ElementType::He, AtomicBasis::sto_3g(2.0925)),
            ],
        );
        let geometry = Geometry::with_charge_and_multiplicity(
            vec![
                Atom::new(ElementType::He, Vector3::zeros()),
                Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.4632)),
            ],
            1,
            std::num::NonZeroU32::MIN,
        )
        .unwrap();
        let basis = basis_set.basis_for(&geometry).unwrap();

        let integrals = GaussianEngine.compute(&basis, &geometry).unwrap();

        assert_relative_eq!(integrals.overlap()[(0, 1)], 0.4508, epsilon = 1e-4);
        assert_relative_eq!(integrals.electron()[(0, 0, 0, 0)], 1.3072, epsilon = 1e-4);
        assert_relative_eq!(integrals.electron()[(1, 1, 1, 1)], 0.7746, epsilon = 1e-4);
    }
}
