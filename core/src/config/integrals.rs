use nalgebra::DMatrix;
use serde::Deserialize;

use crate::{
    error::ScfError,
    integrals::{ElectronTensor, IntegralSet},
};

/// Precomputed integrals in a config file. Matrices are lists of rows; the ERI tensor is
/// a list of `[i, j, k, l, value]` entries, one per symmetry-unique integral, with all
/// unlisted integrals zero.
#[derive(Deserialize)]
pub struct ConfigIntegrals {
    overlap: Vec<Vec<f64>>,
    kinetic: Vec<Vec<f64>>,
    nuclear: Vec<Vec<f64>>,
    #[serde(default)]
    dipole: Option<[Vec<Vec<f64>>; 3]>,
    eri: Vec<(usize, usize, usize, usize, f64)>,
}

fn matrix(what: &'static str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>, ScfError> {
    let n = rows.len();
    for row in rows {
        if row.len() != n {
            return Err(ScfError::DimensionMismatch {
                what,
                expected: n,
                found: row.len(),
            });
        }
    }
    Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
}

impl TryFrom<ConfigIntegrals> for IntegralSet {
    type Error = ScfError;

    fn try_from(value: ConfigIntegrals) -> Result<Self, Self::Error> {
        let overlap = matrix("overlap matrix", &value.overlap)?;
        let n_basis = overlap.nrows();

        let electron = ElectronTensor::from_unique(
            n_basis,
            value
                .eri
                .into_iter()
                .map(|(i, j, k, l, integral)| ((i, j, k, l), integral)),
        )?;

        let integrals = IntegralSet::new(
            overlap,
            matrix("kinetic matrix", &value.kinetic)?,
            matrix("nuclear attraction matrix", &value.nuclear)?,
            electron,
        )?;

        match value.dipole {
            Some([x, y, z]) => integrals.with_dipole([
                matrix("x dipole matrix", &x)?,
                matrix("y dipole matrix", &y)?,
                matrix("z dipole matrix", &z)?,
            ]),
            None => Ok(integrals),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ScfError, integrals::IntegralSet};

    use super::ConfigIntegrals;

    #[test]
    fn parse_hubbard_dimer() {
        let config: ConfigIntegrals = serde_json::from_str(
            r#"{
                "overlap": [[1.0, 0.0], [0.0, 1.0]],
                "kinetic": [[0.0, -1.0], [-1.0, 0.0]],
                "nuclear": [[0.0, 0.0], [0.0, 0.0]],
                "eri": [[0, 0, 0, 0, 2.0], [1, 1, 1, 1, 2.0]]
            }"#,
        )
        .unwrap();

        let integrals = IntegralSet::try_from(config).unwrap();
        assert_eq!(integrals.n_basis(), 2);
        assert_eq!(integrals.electron()[(1, 1, 1, 1)], 2.0);
        assert_eq!(integrals.electron()[(0, 0, 1, 1)], 0.0);
        assert_eq!(integrals.dipole()[2][(0, 0)], 0.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let config: ConfigIntegrals = serde_json::from_str(
            r#"{
                "overlap": [[1.0, 0.0], [0.0]],
                "kinetic": [[0.0, 0.0], [0.0, 0.0]],
                "nuclear": [[0.0, 0.0], [0.0, 0.0]],
                "eri": []
            }"#,
        )
        .unwrap();

        assert!(matches!(
            IntegralSet::try_from(config),
            Err(ScfError::DimensionMismatch { .. })
        ));
    }
}
