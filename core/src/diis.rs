use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Singular values below this fraction of the largest one mark the DIIS system as
/// singular.
const SINGULAR_CUTOFF: f64 = 1e-14;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiisConfig {
    /// How many (Fock, error) pairs are kept. The oldest one is evicted first.
    pub capacity: usize,
    /// Extrapolation starts once the history holds more than this many entries.
    /// Before that, the raw Fock matrix is passed through.
    pub start: usize,
}

impl Default for DiisConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            start: 1,
        }
    }
}

/// How full the history is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiisState {
    Empty,
    Accumulating,
    Full,
}

struct Sample {
    error: DMatrix<f64>,
    fock: DMatrix<f64>,
}

/// The result of feeding one Fock matrix through [`Diis::extrapolate`].
#[derive(Clone, Debug)]
pub struct DiisStep {
    /// The Fock matrix to diagonalize next
    pub fock: DMatrix<f64>,
    /// Root mean square of the newest error vector
    pub rms: f64,
    /// Whether `fock` is an extrapolation rather than the input matrix
    pub extrapolated: bool,
}

/// Pulay's direct inversion in the iterative subspace for one spin channel.
///
/// Holds copies of the last few Fock matrices and their commutator errors
/// `F D S - S D F`, and replaces each new Fock matrix by the linear combination of the
/// stored ones whose combined error is smallest.
pub struct Diis {
    config: DiisConfig,
    samples: VecDeque<Sample>,
}

impl Diis {
    pub fn new(config: DiisConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.capacity + 1),
            config,
        }
    }

    /// The commutator `F D S - S D F`, which vanishes at self-consistency.
    pub fn error_vector(
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        fock * density * overlap - overlap * density * fock
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn state(&self) -> DiisState {
        match self.samples.len() {
            0 => DiisState::Empty,
            n if n >= self.config.capacity => DiisState::Full,
            _ => DiisState::Accumulating,
        }
    }

    /// Record `fock` together with its error and return the extrapolated Fock matrix.
    ///
    /// Falls back to `fock` itself while the history is too short and whenever the DIIS
    /// equations are singular.
    pub fn extrapolate(
        &mut self,
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DiisStep {
        let error = Self::error_vector(fock, density, overlap);
        let rms = (error.norm_squared() / error.len().max(1) as f64).sqrt();

        self.samples.push_back(Sample {
            error,
            fock: fock.clone(),
        });
        while self.samples.len() > self.config.capacity {
            self.samples.pop_front();
        }

        let n = self.samples.len();
        if n < 2 || n <= self.config.start {
            return DiisStep {
                fock: fock.clone(),
                rms,
                extrapolated: false,
            };
        }

        match self.combine() {
            Some(extrapolated) => DiisStep {
                fock: extrapolated,
                rms,
                extrapolated: true,
            },
            None => {
                log::debug!("DIIS system is singular, using the raw Fock matrix");
                DiisStep {
                    fock: fock.clone(),
                    rms,
                    extrapolated: false,
                }
            }
        }
    }

    /// Solve
    ///
    ///   | B   -1 | | c      |   |  0 |
    ///   | -1   0 | | lambda | = | -1 |
    ///
    /// with `B[i, j] = tr(e_i^T e_j)` and return `sum_i c_i F_i`.
    fn combine(&self) -> Option<DMatrix<f64>> {
        let n = self.samples.len();

        let mut matrix = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i, j) {
            (i, j) if i == n && j == n => 0.0,
            (i, j) if i == n || j == n => -1.0,
            _ => self.samples[i].error.dot(&self.samples[j].error),
        });

        // the error block shrinks quadratically towards convergence, so scale it to keep
        // it comparable to the border
        let largest = (0..n).map(|i| matrix[(i, i)]).fold(0.0, f64::max);
        if largest > 0.0 {
            matrix.view_mut((0, 0), (n, n)).scale_mut(largest.recip());
        }

        let b = DVector::from_fn(n + 1, |i, _| if i == n { -1.0 } else { 0.0 });

        let svd = matrix.svd(true, true);
        let max_singular = svd.singular_values.max();
        let min_singular = svd.singular_values.min();
        if !(min_singular > SINGULAR_CUTOFF * max_singular) {
            return None;
        }

        let solution = svd.solve(&b, 0.0).ok()?;
        if solution.iter().any(|c| !c.is_finite()) {
            return None;
        }

        Some(
            solution
                .iter()
                .take(n)
                .zip(&self.samples)
                .map(|(&c, Sample { fock, .. })| c * fock)
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, DMatrix};

    use super::{Diis, DiisConfig, DiisState};

    fn overlap() -> DMatrix<f64> {
        DMatrix::identity(2, 2)
    }

    fn density() -> DMatrix<f64> {
        dmatrix![1.0, 0.0; 0.0, 0.0]
    }

    #[test]
    fn single_entry_passes_through_unchanged() {
        let mut diis = Diis::new(DiisConfig::default());
        let fock = dmatrix![-1.0, 0.3; 0.3, 0.5];

        let step = diis.extrapolate(&fock, &density(), &overlap());

        assert_eq!(step.fock, fock);
        assert!(!step.extrapolated);
        assert_eq!(diis.state(), DiisState::Accumulating);
    }

    #[test]
    fn error_vector_is_the_commutator() {
        let fock = dmatrix![-1.0, 0.3; 0.3, 0.5];
        let error = Diis::error_vector(&fock, &density(), &overlap());

        // F D - D F for D = diag(1, 0)
        assert_eq!(error, dmatrix![0.0, -0.3; 0.3, 0.0]);
        assert_relative_eq!(error, -error.transpose());
    }

    #[test]
    fn rms_of_latest_error() {
        let mut diis = Diis::new(DiisConfig::default());
        let step = diis.extrapolate(&dmatrix![-1.0, 0.3; 0.3, 0.5], &density(), &overlap());

        // two entries of magnitude 0.3 out of four
        assert_relative_eq!(step.rms, (2.0 * 0.09 / 4.0f64).sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn history_is_a_bounded_fifo() {
        let mut diis = Diis::new(DiisConfig {
            capacity: 3,
            start: 1,
        });
        assert_eq!(diis.state(), DiisState::Empty);

        for i in 0..5 {
            let fock = dmatrix![-1.0, 0.1 * (i + 1) as f64; 0.1 * (i + 1) as f64, 0.5];
            diis.extrapolate(&fock, &density(), &overlap());
            assert!(diis.len() <= 3);
        }

        assert_eq!(diis.len(), 3);
        assert_eq!(diis.state(), DiisState::Full);
        assert_eq!(diis.samples[0].fock[(0, 1)], 0.1 * 3.0);
    }

    #[test]
    fn duplicate_fock_matrices_fall_back_to_latest() {
        let mut diis = Diis::new(DiisConfig::default());
        let fock = dmatrix![-1.0, 0.3; 0.3, 0.5];

        diis.extrapolate(&fock, &density(), &overlap());
        let step = diis.extrapolate(&fock, &density(), &overlap());

        assert_eq!(step.fock, fock);
        assert!(!step.extrapolated);
    }

    #[test]
    fn extrapolation_cancels_linear_errors() {
        // the error is linear in the off-diagonal element, so the combination with zero
        // error sits at 0 between the two samples
        let mut diis = Diis::new(DiisConfig::default());
        let first = dmatrix![-1.0, 0.2; 0.2, 0.5];
        let second = dmatrix![-1.0, -0.1; -0.1, 0.5];

        diis.extrapolate(&first, &density(), &overlap());
        let step = diis.extrapolate(&second, &density(), &overlap());

        assert!(step.extrapolated);
        assert_relative_eq!(step.fock, dmatrix![-1.0, 0.0; 0.0, 0.5], epsilon = 1e-12);
    }

    #[test]
    fn start_offset_delays_extrapolation() {
        fn fock(a: f64, b: f64) -> DMatrix<f64> {
            dmatrix![-1.0, a, b; a, 0.5, 0.0; b, 0.0, 0.7]
        }
        let density = dmatrix![1.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 0.0];
        let overlap = DMatrix::identity(3, 3);

        let mut diis = Diis::new(DiisConfig {
            capacity: 8,
            start: 2,
        });

        assert!(!diis.extrapolate(&fock(0.2, 0.0), &density, &overlap).extrapolated);
        let step = diis.extrapolate(&fock(0.0, 0.2), &density, &overlap);
        assert!(!step.extrapolated);
        assert_eq!(step.fock, fock(0.0, 0.2));

        // F1 + F2 - F3 has no occupied-virtual coupling left
        let step = diis.extrapolate(&fock(0.2, 0.2), &density, &overlap);
        assert!(step.extrapolated);
        assert_relative_eq!(step.fock, fock(0.0, 0.0), epsilon = 1e-10);
    }
}
