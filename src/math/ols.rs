//! Least squares for autoregressive fits.
//!
//! Conditional least squares for an AR(p) on a (differenced) series `w`
//! regresses each `w_t` on its own `p` lags:
//!
//! ```text
//! minimize Σ_t (w_t - c - φ_1 w_{t-1} - ... - φ_p w_{t-p})^2
//! ```
//!
//! The lags of a short annual series are often close to collinear, so the
//! system is solved through SVD. Singular values under the tolerance are
//! treated as zero, which yields the minimum-norm solution instead of failing.

use nalgebra::{DMatrix, DVector};

/// Build the lagged design matrix and response for an AR(p) regression.
///
/// Row `t - p` holds `[1?, w_{t-1}, ..., w_{t-p}]` and the response `w_t`, for
/// `t = p..w.len()`. The leading column of ones is present only when
/// `constant` is set.
pub fn lagged_design(w: &[f64], p: usize, constant: bool) -> (DMatrix<f64>, DVector<f64>) {
    let rows = w.len().saturating_sub(p);
    let cols = p + usize::from(constant);
    let offset = usize::from(constant);

    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut y = DVector::<f64>::zeros(rows);
    for r in 0..rows {
        let t = r + p;
        if constant {
            x[(r, 0)] = 1.0;
        }
        for lag in 1..=p {
            x[(r, offset + lag - 1)] = w[t - lag];
        }
        y[r] = w[t];
    }
    (x, y)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.ncols() == 0 {
        return Some(DVector::zeros(0));
    }
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
