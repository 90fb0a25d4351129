//! ARIMA(p, d, 0) estimation and forecasting.
//!
//! The model on the `d`-times differenced series `w` is
//!
//! ```text
//! w_t = c + φ_1 w_{t-1} + ... + φ_p w_{t-p} + ε_t,   ε_t ~ N(0, σ²)
//! ```
//!
//! with `c = 0` unless a constant trend is requested. Parameters are estimated
//! by conditional least squares (the first `p` differenced values condition
//! the fit), which for a pure AR part reduces to one linear regression.
//! Everything is plain deterministic arithmetic: the same input produces
//! bit-identical coefficients and forecasts.

use tracing::debug;

use crate::domain::{ArimaOrder, ModelSummary, Trend};
use crate::error::AppError;
use crate::math::{difference, integrate, lagged_design, solve_least_squares};

/// A fitted model plus the state needed to forecast from it.
#[derive(Debug, Clone)]
pub struct ArimaFit {
    summary: ModelSummary,
    original: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

/// Point forecasts and their standard errors, one entry per step ahead.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastValues {
    pub mean: Vec<f64>,
    pub std_err: Vec<f64>,
}

/// Fit ARIMA(p, d, 0) to `series`.
///
/// Fails with exit code 3 when the series is too short for the order or holds
/// non-finite values, and with exit code 2 for a non-zero MA order.
pub fn fit_arima(series: &[f64], order: ArimaOrder, trend: Trend) -> Result<ArimaFit, AppError> {
    if order.q != 0 {
        return Err(AppError::input(format!(
            "ARIMA{order}: moving-average terms are not supported; use q = 0."
        )));
    }
    if let Some(idx) = series.iter().position(|v| !v.is_finite()) {
        return Err(AppError::data(format!(
            "Series value at position {idx} is missing or non-finite; the model needs a dense series."
        )));
    }
    let needed = order
        .min_observations(trend)
        .ok_or_else(|| AppError::input(format!("ARIMA{order}: order is too large.")))?;
    if series.len() < needed {
        return Err(AppError::data(format!(
            "Insufficient data for ARIMA{order}: need at least {needed} observations, got {}.",
            series.len()
        )));
    }

    let constant = trend.has_constant();
    let differenced = difference(series, order.d);
    let (x, y) = lagged_design(&differenced, order.p, constant);

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::numeric(format!("ARIMA{order}: least squares solve failed.")))?;

    let fitted = &x * &beta;
    let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, b)| a - b).collect();

    let (c, ar) = if constant {
        (beta[0], beta.iter().skip(1).copied().collect::<Vec<_>>())
    } else {
        (0.0, beta.iter().copied().collect::<Vec<_>>())
    };

    let n_eff = residuals.len();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let sigma2 = sse / n_eff as f64;

    // Gaussian log-likelihood at the CSS estimate; σ² is floored so an exact
    // fit still reports finite criteria.
    let var = sigma2.max(1e-300);
    let n = n_eff as f64;
    let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * var).ln() + 1.0);
    // Coefficients plus the innovation variance.
    let k = (beta.len() + 1) as f64;
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let bic = -2.0 * log_likelihood + k * n.ln();

    if !(sigma2.is_finite() && ar.iter().all(|v| v.is_finite()) && c.is_finite()) {
        return Err(AppError::numeric(format!("ARIMA{order}: non-finite estimate.")));
    }

    debug!(order = %order, ?ar, constant = c, sigma2, aic, "fitted ARIMA");

    Ok(ArimaFit {
        summary: ModelSummary {
            order,
            trend,
            ar,
            constant: c,
            sigma2,
            log_likelihood,
            aic,
            bic,
            n_obs: series.len(),
            n_eff,
        },
        original: series.to_vec(),
        differenced,
        residuals,
    })
}

impl ArimaFit {
    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    /// In-sample residuals on the differenced scale (one per regression row).
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Forecast `horizon` steps past the end of the series.
    pub fn forecast(&self, horizon: usize) -> ForecastValues {
        let p = self.summary.order.p;
        let ar = &self.summary.ar;

        let mut ext = self.differenced.clone();
        for _ in 0..horizon {
            let t = ext.len();
            let mut pred = self.summary.constant;
            for (i, phi) in ar.iter().enumerate().take(p) {
                if t > i {
                    pred += phi * ext[t - 1 - i];
                }
            }
            ext.push(pred);
        }

        let future = &ext[self.differenced.len()..];
        let mean = integrate(future, &self.original, self.summary.order.d);

        let psi = psi_weights(ar, self.summary.order.d, horizon);
        let mut acc = 0.0;
        let std_err = psi
            .iter()
            .map(|w| {
                acc += w * w;
                (self.summary.sigma2 * acc).sqrt()
            })
            .collect();

        ForecastValues { mean, std_err }
    }
}

/// First `n` ψ-weights of the model on the original (undifferenced) scale.
///
/// The AR polynomial `1 - φ_1 B - ... - φ_p B^p` is multiplied by `(1 - B)^d`;
/// the resulting recursion gives the MA(∞) weights used for forecast variance.
pub fn psi_weights(ar: &[f64], d: usize, n: usize) -> Vec<f64> {
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|v| -v)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, &a) in poly.iter().enumerate() {
            next[i] += a;
            next[i + 1] -= a;
        }
        poly = next;
    }
    // y_t = Σ φ*_i y_{t-i} + ε_t
    let phi_star: Vec<f64> = poly.iter().skip(1).map(|v| -v).collect();

    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let w: f64 = (1..=j.min(phi_star.len()))
            .map(|i| phi_star[i - 1] * psi[j - i])
            .sum();
        psi.push(w);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_series(n: usize) -> Vec<f64> {
        // Deterministic wiggle around a slow drift.
        (0..n)
            .map(|i| {
                let t = i as f64;
                6.0 + 0.05 * t + 0.8 * (t * 1.3).sin() + 0.3 * (t * 0.7).cos()
            })
            .collect()
    }

    #[test]
    fn linear_trend_is_continued_by_reference_order() {
        let series: Vec<f64> = (0..32).map(|i| 10.0 + 2.0 * i as f64).collect();
        let fit = fit_arima(&series, ArimaOrder::new(5, 1, 0), Trend::N).unwrap();
        let fc = fit.forecast(12);

        assert_eq!(fc.mean.len(), 12);
        let last = series[31];
        for (h, v) in fc.mean.iter().enumerate() {
            let expected = last + 2.0 * (h + 1) as f64;
            assert!((v - expected).abs() < 1e-8, "h={h}: {v} vs {expected}");
        }
        let phi_sum: f64 = fit.summary().ar.iter().sum();
        assert!((phi_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recovers_ar1_coefficient_on_differences() {
        // w_t = 0.5 w_{t-1}, y = cumulative sum of w.
        let mut y = vec![100.0];
        let mut w = 8.0;
        for _ in 0..20 {
            y.push(y.last().unwrap() + w);
            w *= 0.5;
        }
        let fit = fit_arima(&y, ArimaOrder::new(1, 1, 0), Trend::N).unwrap();
        assert!((fit.summary().ar[0] - 0.5).abs() < 1e-10);

        let last_w = y[20] - y[19];
        let fc = fit.forecast(2);
        assert!((fc.mean[0] - (y[20] + 0.5 * last_w)).abs() < 1e-9);
        assert!((fc.mean[1] - (y[20] + 0.5 * last_w + 0.25 * last_w)).abs() < 1e-9);
    }

    #[test]
    fn constant_trend_adds_intercept() {
        let series = noisy_series(40);
        let fit = fit_arima(&series, ArimaOrder::new(2, 1, 0), Trend::C).unwrap();
        assert_eq!(fit.summary().ar.len(), 2);
        assert_eq!(fit.summary().n_eff, 37);
        assert!(fit.summary().constant.is_finite());
    }

    #[test]
    fn insufficient_data_is_fatal() {
        let series = noisy_series(11);
        let err = fit_arima(&series, ArimaOrder::new(5, 1, 0), Trend::N).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("Insufficient data"));

        assert!(fit_arima(&noisy_series(12), ArimaOrder::new(5, 1, 0), Trend::N).is_ok());
    }

    #[test]
    fn oversized_order_is_an_input_error() {
        let err = fit_arima(&noisy_series(20), ArimaOrder::new(usize::MAX, 0, 0), Trend::N).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("too large"));
    }

    #[test]
    fn moving_average_terms_are_rejected() {
        let err = fit_arima(&noisy_series(40), ArimaOrder::new(1, 1, 1), Trend::N).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_values_are_rejected() {
        let mut series = noisy_series(30);
        series[10] = f64::NAN;
        let err = fit_arima(&series, ArimaOrder::new(5, 1, 0), Trend::N).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn forecasts_are_bit_identical_across_runs() {
        let series = noisy_series(32);
        let a = fit_arima(&series, ArimaOrder::new(5, 1, 0), Trend::N).unwrap().forecast(12);
        let b = fit_arima(&series, ArimaOrder::new(5, 1, 0), Trend::N).unwrap().forecast(12);
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.mean), bits(&b.mean));
        assert_eq!(bits(&a.std_err), bits(&b.std_err));
    }

    #[test]
    fn random_walk_errors_grow_with_sqrt_horizon() {
        let series = noisy_series(20);
        let fit = fit_arima(&series, ArimaOrder::new(0, 1, 0), Trend::N).unwrap();
        let fc = fit.forecast(4);
        let last = *series.last().unwrap();
        assert!(fc.mean.iter().all(|v| (v - last).abs() < 1e-12));
        let s = fit.summary().sigma2.sqrt();
        for (h, se) in fc.std_err.iter().enumerate() {
            assert!((se - s * ((h + 1) as f64).sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn psi_weights_of_integrated_ar1() {
        // (1 - 0.5B)(1 - B) = 1 - 1.5B + 0.5B^2
        let psi = psi_weights(&[0.5], 1, 4);
        assert_eq!(psi[0], 1.0);
        assert!((psi[1] - 1.5).abs() < 1e-12);
        assert!((psi[2] - (1.5 * 1.5 - 0.5)).abs() < 1e-12);
        assert!((psi[3] - (1.5 * psi[2] - 0.5 * psi[1])).abs() < 1e-12);
    }
}
