// SPDX-License-Identifier: AGPL-3.0-only

//! Dense field storage: scalar fields on an N³ grid and the per-cell
//! 4×4 metric tensor.
//!
//! Everything is a flat `Vec<f64>` with explicit index math — row-major
//! `(x, y, z)` for scalars, `(x, y, z, row, col)` for the metric. No
//! nested vectors, no per-cell allocation.

use crate::constants::BACKGROUND_G00;

/// A spatial axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in x, y, z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Stride between consecutive cells along this axis in a flat
    /// row-major N³ array.
    #[must_use]
    pub const fn stride(self, n: usize) -> usize {
        match self {
            Self::X => n * n,
            Self::Y => n,
            Self::Z => 1,
        }
    }
}

/// A dense real scalar field on an N³ grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    n: usize,
    data: Vec<f64>,
}

impl ScalarField {
    /// All-zero field at resolution `n`.
    #[must_use]
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n * n],
        }
    }

    /// Constant field at resolution `n`.
    #[must_use]
    pub fn uniform(n: usize, value: f64) -> Self {
        Self {
            n,
            data: vec![value; n * n * n],
        }
    }

    /// Build a field by evaluating `f(i, j, k)` at every cell.
    #[must_use]
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n * n);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    data.push(f(i, j, k));
                }
            }
        }
        Self { n, data }
    }

    /// Wrap an existing flat buffer. Length must be `n³`.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n³`; this is a programming error at the
    /// call site, not caller input.
    #[must_use]
    pub fn from_vec(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n * n * n, "flat buffer must have n³ entries");
        Self { n, data }
    }

    /// Per-axis resolution.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Total cell count n³.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-resolution field (never produced by the crate).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of cell `(i, j, k)`.
    #[must_use]
    pub const fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.n + j) * self.n + k
    }

    /// Value at cell `(i, j, k)`.
    #[must_use]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.idx(i, j, k)]
    }

    /// Set the value at cell `(i, j, k)`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, v: f64) {
        let idx = self.idx(i, j, k);
        self.data[idx] = v;
    }

    /// Flat read-only view.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Flat mutable view.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Arithmetic mean over all cells.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Population standard deviation over all cells.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let var = self
            .data
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / self.data.len() as f64;
        var.sqrt()
    }

    /// Minimum over all cells.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Maximum over all cells.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean of |v| over all cells.
    #[must_use]
    pub fn mean_abs(&self) -> f64 {
        self.data.iter().map(|v| v.abs()).sum::<f64>() / self.data.len() as f64
    }

    /// Replace every cell with its absolute value.
    pub fn abs_in_place(&mut self) {
        for v in &mut self.data {
            *v = v.abs();
        }
    }
}

/// The per-cell 4×4 metric tensor field, shape N×N×N×4×4.
///
/// Canonical construction invariant: diagonal entries equal the
/// background value (1.0), off-diagonal entries equal 0.0. The solver
/// mutates only the time-00 component; the other fifteen components are
/// carried but never updated by the field solve.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricField {
    n: usize,
    data: Vec<f64>,
}

impl MetricField {
    /// Flat-background (Minkowski-like) metric at resolution `n`.
    #[must_use]
    pub fn background(n: usize) -> Self {
        let mut data = vec![0.0; n * n * n * 16];
        for cell in 0..n * n * n {
            for d in 0..4 {
                data[cell * 16 + d * 4 + d] = BACKGROUND_G00;
            }
        }
        Self { n, data }
    }

    /// Per-axis resolution.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Flat index of component `(row, col)` at cell `(i, j, k)`.
    #[must_use]
    pub const fn idx(&self, i: usize, j: usize, k: usize, row: usize, col: usize) -> usize {
        (((i * self.n + j) * self.n + k) * 4 + row) * 4 + col
    }

    /// Component `(row, col)` at cell `(i, j, k)`.
    #[must_use]
    pub fn at(&self, i: usize, j: usize, k: usize, row: usize, col: usize) -> f64 {
        self.data[self.idx(i, j, k, row, col)]
    }

    /// Set component `(row, col)` at cell `(i, j, k)`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, row: usize, col: usize, v: f64) {
        let idx = self.idx(i, j, k, row, col);
        self.data[idx] = v;
    }

    /// g₀₀ at cell `(i, j, k)`.
    #[must_use]
    pub fn g00(&self, i: usize, j: usize, k: usize) -> f64 {
        self.at(i, j, k, 0, 0)
    }

    /// Copy the g₀₀ component into a contiguous scalar field.
    #[must_use]
    pub fn g00_field(&self) -> ScalarField {
        let cells = self.n * self.n * self.n;
        let mut out = Vec::with_capacity(cells);
        for cell in 0..cells {
            out.push(self.data[cell * 16]);
        }
        ScalarField::from_vec(self.n, out)
    }

    /// Overwrite the g₀₀ component from a contiguous buffer of n³ values.
    ///
    /// # Panics
    ///
    /// Panics if `g00.len() != n³` (internal misuse, not caller input).
    pub fn store_g00(&mut self, g00: &[f64]) {
        let cells = self.n * self.n * self.n;
        assert_eq!(g00.len(), cells, "g00 buffer must have n³ entries");
        for (cell, v) in g00.iter().enumerate() {
            self.data[cell * 16] = *v;
        }
    }

    /// Flat read-only view of all components.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Flat mutable view of all components.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}
