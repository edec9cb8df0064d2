// SPDX-License-Identifier: AGPL-3.0-only

//! Finite-difference operators on N³ scalar fields.
//!
//! First-order gradients use central differences in the interior and
//! one-sided differences at the boundary faces (default edge behavior,
//! no ghost cells). The Laplacian is the axis-matched sum of second
//! derivatives: each axis's second derivative is the gradient, along
//! that same axis, of that axis's own gradient component — summing
//! ∂²/∂x², ∂²/∂y², ∂²/∂z². Taking the first gradient component on every
//! axis instead is a known regression, not an alternate mode.

use crate::field::{Axis, ScalarField};

/// First-order finite-difference gradient along one axis with spacing `dx`.
///
/// Interior: `(f[a+1] − f[a−1]) / (2 dx)`. Boundary faces: one-sided
/// `(f[1] − f[0]) / dx` and `(f[n−1] − f[n−2]) / dx`. A 1-cell grid has
/// no definable difference; the gradient is zero there.
#[must_use]
pub fn gradient_axis(field: &ScalarField, axis: Axis, dx: f64) -> ScalarField {
    let n = field.n();
    let mut out = ScalarField::zeros(n);
    if n < 2 {
        return out;
    }

    let inv_dx = 1.0 / dx;
    let inv_2dx = 0.5 / dx;
    let f = field.as_slice();

    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let a = match axis {
                    Axis::X => i,
                    Axis::Y => j,
                    Axis::Z => k,
                };
                let here = field.idx(i, j, k);
                let stride = axis.stride(n);
                let d = if a == 0 {
                    (f[here + stride] - f[here]) * inv_dx
                } else if a == n - 1 {
                    (f[here] - f[here - stride]) * inv_dx
                } else {
                    (f[here + stride] - f[here - stride]) * inv_2dx
                };
                out.as_mut_slice()[here] = d;
            }
        }
    }
    out
}

/// Discrete Laplacian: axis-matched sum of double gradients.
#[must_use]
pub fn laplacian(field: &ScalarField, dx: f64) -> ScalarField {
    let n = field.n();
    let mut lap = ScalarField::zeros(n);
    for axis in Axis::ALL {
        let grad = gradient_axis(field, axis, dx);
        let second = gradient_axis(&grad, axis, dx);
        for (out, v) in lap.as_mut_slice().iter_mut().zip(second.as_slice()) {
            *out += v;
        }
    }
    lap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerances::{EXACT_F64, STENCIL_QUADRATIC_REL};

    #[test]
    fn gradient_of_zero_field_is_zero() {
        let f = ScalarField::zeros(8);
        for axis in Axis::ALL {
            let g = gradient_axis(&f, axis, 0.5);
            assert!(g.as_slice().iter().all(|v| v.abs() < EXACT_F64));
        }
    }

    #[test]
    fn gradient_of_constant_field_is_exactly_zero() {
        let f = ScalarField::uniform(6, 3.7);
        for axis in Axis::ALL {
            let g = gradient_axis(&f, axis, 0.25);
            // Differences of equal values: exact zeros, even at edges.
            assert!(g.as_slice().iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn gradient_of_linear_ramp_is_exact_everywhere() {
        let n = 8;
        let dx = 0.5;
        // f = 3x, x = i·dx
        let f = ScalarField::from_fn(n, |i, _, _| 3.0 * i as f64 * dx);
        let g = gradient_axis(&f, Axis::X, dx);
        // Central and one-sided differences are both exact for linear fields.
        assert!(g.as_slice().iter().all(|v| (v - 3.0).abs() < EXACT_F64));
        // Cross-axis gradient is zero
        let gy = gradient_axis(&f, Axis::Y, dx);
        assert!(gy.as_slice().iter().all(|v| v.abs() < EXACT_F64));
    }

    #[test]
    fn single_cell_gradient_is_zero() {
        let f = ScalarField::uniform(1, 42.0);
        for axis in Axis::ALL {
            let g = gradient_axis(&f, axis, 1.0);
            assert_eq!(g.as_slice(), &[0.0]);
        }
    }

    #[test]
    fn two_cell_gradient_uses_one_sided_difference() {
        let mut f = ScalarField::zeros(2);
        f.set(1, 0, 0, 2.0);
        let g = gradient_axis(&f, Axis::X, 0.5);
        // (2 − 0)/0.5 = 4 at both faces
        assert!((g.at(0, 0, 0) - 4.0).abs() < EXACT_F64);
        assert!((g.at(1, 0, 0) - 4.0).abs() < EXACT_F64);
    }

    #[test]
    fn laplacian_of_quadratic_is_six_in_interior() {
        let n = 16;
        let dx = 0.25;
        // f = x² + y² + z² on physical coordinates, ∇²f = 6
        let f = ScalarField::from_fn(n, |i, j, k| {
            let x = i as f64 * dx;
            let y = j as f64 * dx;
            let z = k as f64 * dx;
            x * x + y * y + z * z
        });
        let lap = laplacian(&f, dx);

        // Double-gradient stencil reaches two cells; stay 2 cells off the faces.
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 2..n - 2 {
            for j in 2..n - 2 {
                for k in 2..n - 2 {
                    sum += lap.at(i, j, k);
                    count += 1;
                }
            }
        }
        let interior_mean = sum / count as f64;
        assert!(
            (interior_mean - 6.0).abs() / 6.0 < STENCIL_QUADRATIC_REL,
            "interior mean {interior_mean}"
        );
    }

    #[test]
    fn laplacian_sums_all_three_axes() {
        let n = 12;
        let dx = 0.5;
        // f = y² only: an axis-mismatched Laplacian that always reuses the
        // x-gradient component would see zero curvature here.
        let f = ScalarField::from_fn(n, |_, j, _| {
            let y = j as f64 * dx;
            y * y
        });
        let lap = laplacian(&f, dx);
        let c = n / 2;
        assert!((lap.at(c, c, c) - 2.0).abs() < 1e-9);
    }
}
