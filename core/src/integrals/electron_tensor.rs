use std::ops::Index;

use nalgebra::{DMatrix, DVector};

use crate::error::ScfError;

/// An integral index used in the two-electron integrals of a basis set.
///
/// The index represents the four indices (i, j, k, l) of the integral (ij|kl) in
/// chemists' notation. For real orbitals
///
///   (ij|kl) = (ji|kl) = (ij|lk) = (ji|lk) = (kl|ij) = (lk|ij) = (kl|ji) = (lk|ji)
///
/// so the canonical form stores i >= j, k >= l and ij >= kl, where ij is the compound
/// triangular index i * (i + 1) / 2 + j.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IntegralIndex(usize, usize, usize, usize);

impl IntegralIndex {
    /// Creates a new integral index with the given indices.
    pub const fn new(index: (usize, usize, usize, usize)) -> Self {
        let (i, j, k, l) = Self::correct_order(index);
        Self(i, j, k, l)
    }

    #[inline(always)]
    const fn compound(i: usize, j: usize) -> usize {
        i * (i + 1) / 2 + j
    }

    /// Returns the indices with the correct order, such that i >= j, k >= l and ij >= kl.
    #[inline(always)]
    const fn correct_order(
        (i, j, k, l): (usize, usize, usize, usize),
    ) -> (usize, usize, usize, usize) {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        let (k, l) = if k >= l { (k, l) } else { (l, k) };

        if Self::compound(i, j) >= Self::compound(k, l) {
            (i, j, k, l)
        } else {
            (k, l, i, j)
        }
    }

    pub fn indices(&self) -> (usize, usize, usize, usize) {
        let &Self(i, j, k, l) = self;
        (i, j, k, l)
    }

    /// All eight index tuples that share this integral. Contains duplicates when some
    /// of the indices coincide.
    pub fn permutations(&self) -> [(usize, usize, usize, usize); 8] {
        let &Self(i, j, k, l) = self;
        [
            (i, j, k, l),
            (j, i, k, l),
            (i, j, l, k),
            (j, i, l, k),
            (k, l, i, j),
            (l, k, i, j),
            (k, l, j, i),
            (l, k, j, i),
        ]
    }
}

impl std::fmt::Display for IntegralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let &Self(i, j, k, l) = self;
        write!(f, "({} {}|{} {})", i, j, k, l)
    }
}

/// The electron-repulsion tensor (ij|kl) of a basis of size n.
///
/// The tensor is stored twice, as the two n^2 x n^2 "supermatrices" that turn the Coulomb
/// and exchange contractions into plain matrix-vector products:
///
///   coulomb[(i n + j, k n + l)]  = (ij|kl)
///   exchange[(k n + l, i n + j)] = (ik|jl)
///
/// Neither is mutated after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ElectronTensor {
    coulomb: DMatrix<f64>,
    exchange: DMatrix<f64>,
    /// side length
    size: usize,
}

impl ElectronTensor {
    /// Builds the tensor by evaluating `integral` once per symmetry-unique index and
    /// copying the value into all eight equivalent positions.
    pub fn from_fn(size: usize, mut integral: impl FnMut(usize, usize, usize, usize) -> f64) -> Self {
        let mut data = vec![0.0; size.pow(4)];

        for i in 0..size {
            for j in 0..=i {
                for k in 0..=i {
                    let l_max = if k == i { j } else { k };
                    for l in 0..=l_max {
                        let index = IntegralIndex(i, j, k, l);
                        let value = integral(i, j, k, l);
                        log::trace!("ERI {index} = {value:<1.8}");

                        for (p, q, r, s) in index.permutations() {
                            data[linear(size, p, q, r, s)] = value;
                        }
                    }
                }
            }
        }

        Self::from_data(size, &data)
    }

    /// Builds the tensor from a list of symmetry-unique entries. Entries that aren't
    /// listed are zero. Any of the eight equivalent index orders may be used.
    pub fn from_unique(
        size: usize,
        entries: impl IntoIterator<Item = ((usize, usize, usize, usize), f64)>,
    ) -> Result<Self, ScfError> {
        let mut data = vec![0.0; size.pow(4)];

        for (index, value) in entries {
            let (i, j, k, l) = index;
            let largest = i.max(j).max(k).max(l);
            if largest >= size {
                return Err(ScfError::DimensionMismatch {
                    what: "electron repulsion index",
                    expected: size,
                    found: largest + 1,
                });
            }

            for (p, q, r, s) in IntegralIndex::new(index).permutations() {
                data[linear(size, p, q, r, s)] = value;
            }
        }

        Ok(Self::from_data(size, &data))
    }

    pub fn zeros(size: usize) -> Self {
        Self::from_data(size, &vec![0.0; size.pow(4)])
    }

    /// All n^4 values in row-major (i, j, k, l) order, taken as they are.
    pub(super) fn from_data(size: usize, data: &[f64]) -> Self {
        let n2 = size * size;
        let coulomb = DMatrix::from_row_slice(n2, n2, data);
        let exchange = DMatrix::from_fn(n2, n2, |kl, ij| {
            let (k, l) = (kl / size, kl % size);
            let (i, j) = (ij / size, ij % size);
            data[linear(size, i, k, j, l)]
        });

        Self {
            coulomb,
            exchange,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Checks the 8-fold permutational symmetry to within `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.size;
        itertools::iproduct!(0..n, 0..n, 0..n, 0..n).all(|(i, j, k, l)| {
            let value = self[(i, j, k, l)];
            IntegralIndex(i, j, k, l)
                .permutations()
                .into_iter()
                .all(|permuted| (self[permuted] - value).abs() <= tolerance)
        })
    }

    /// `sum_{kl} (ij|kl) D[k, l]`
    pub(crate) fn contract_coulomb(&self, density: &DMatrix<f64>) -> DMatrix<f64> {
        self.contract(&self.coulomb, density)
    }

    /// `sum_{ij} (ik|jl) D[i, j]`
    pub(crate) fn contract_exchange(&self, density: &DMatrix<f64>) -> DMatrix<f64> {
        self.contract(&self.exchange, density)
    }

    fn contract(&self, supermatrix: &DMatrix<f64>, density: &DMatrix<f64>) -> DMatrix<f64> {
        let n = self.size;
        assert_eq!(density.shape(), (n, n), "density does not match the ERI tensor");

        let flat = DVector::from_fn(n * n, |ij, _| density[(ij / n, ij % n)]);
        let product = supermatrix * flat;
        DMatrix::from_fn(n, n, |i, j| product[i * n + j])
    }
}

#[inline(always)]
fn linear(size: usize, i: usize, j: usize, k: usize, l: usize) -> usize {
    ((i * size + j) * size + k) * size + l
}

impl Index<(usize, usize, usize, usize)> for ElectronTensor {
    type Output = f64;

    fn index(&self, (i, j, k, l): (usize, usize, usize, usize)) -> &Self::Output {
        &self.coulomb[(i * self.size + j, k * self.size + l)]
    }
}

impl Index<IntegralIndex> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: IntegralIndex) -> &Self::Output {
        &self[index.indices()]
    }
}
