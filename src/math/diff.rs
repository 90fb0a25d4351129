//! Differencing and its inverse.

/// Difference a series `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing for values that continue `original`.
///
/// `differenced` holds future values on the `d`-times differenced scale; the
/// result holds the matching future values on the original scale.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();

    for level in (0..d).rev() {
        // Last observed value at this differencing level seeds the cumulative sum.
        let seed = difference(original, level).last().copied().unwrap_or(0.0);
        let mut acc = seed;
        for v in result.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }

    result
}
