use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Spherical primitive of the form K*exp(-alpha*r^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The contraction coefficient of this gaussian, including the normalization constant
    pub coefficient: f64,
}

impl Gaussian {
    /// Normalization constant of an s-type primitive, (2 alpha / pi)^(3/4)
    pub fn norm(exponent: f64) -> f64 {
        (std::f64::consts::FRAC_2_PI * exponent)
            .powi(3)
            .sqrt()
            .sqrt()
    }

    /// A primitive whose coefficient already carries its normalization constant.
    pub fn normalized(exponent: f64, contraction: f64) -> Self {
        Self {
            exponent,
            coefficient: contraction * Self::norm(exponent),
        }
    }
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

impl ContractedGaussian {
    pub fn primitives(&self) -> &[Gaussian] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// The type of basis function this basis function has
    pub contracted_gaussian: ContractedGaussian,
    /// The position of this basis function, in natural units
    pub position: Vector3<f64>,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::Gaussian;

    #[test]
    fn s_type_norm() {
        // (2 * 0.5 / pi)^(3/4)
        assert_relative_eq!(
            Gaussian::norm(0.5),
            std::f64::consts::FRAC_1_PI.powf(0.75),
            epsilon = 1e-14
        );
    }
}
