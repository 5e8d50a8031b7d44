//! Rolling z-score of volume.
//!
//! z[t] = (volume[t] - mean(window)) / (std(window) + epsilon)
//! Trailing window including row t; sample standard deviation (n - 1).
//! Lookback: window - 1.

use super::sma::rolling_mean;
use super::{Indicator, PriceSeries};

#[derive(Debug, Clone)]
pub struct RollingZScore {
    window: usize,
    epsilon: f64,
    name: String,
}

impl RollingZScore {
    pub fn new(window: usize, epsilon: f64) -> Self {
        assert!(window >= 2, "z-score window must be >= 2");
        Self {
            window,
            epsilon,
            name: format!("vol_z_{window}"),
        }
    }
}

impl Indicator for RollingZScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let values = &series.volume;
        let mean = rolling_mean(values, self.window);
        let std = rolling_std(values, self.window);
        values
            .iter()
            .zip(mean.iter().zip(&std))
            .map(|(v, (m, s))| (v - m) / (s + self.epsilon))
            .collect()
    }
}

/// Trailing rolling sample standard deviation.
///
/// Each window is computed two-pass from its own values, so a constant
/// window yields exactly 0.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }

    for end in window..=n {
        let slice = &values[end - window..end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        result[end - 1] = var.sqrt();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn volume_series(volume: &[f64]) -> PriceSeries {
        let mut series = PriceSeries::from_closes(&vec![100.0; volume.len()]);
        series.volume = volume.to_vec();
        series
    }

    #[test]
    fn sample_std_known_value() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: mean 5, sum sq dev 32, sample var 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&values, 8);
        assert!(result[6].is_nan());
        assert_approx(result[7], (32.0_f64 / 7.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn constant_volume_scores_zero() {
        let z = RollingZScore::new(5, 1e-8).compute(&volume_series(&[1000.0; 8]));
        assert!(z[..4].iter().all(|v| v.is_nan()));
        assert!(z[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn spike_scores_positive() {
        let mut volume = vec![1000.0; 10];
        volume[9] = 5000.0;
        let z = RollingZScore::new(5, 1e-8).compute(&volume_series(&volume));
        // window [1000 x4, 5000]: mean 1800, sample std sqrt(3_200_000)
        let expected = 3200.0 / (3_200_000.0_f64.sqrt() + 1e-8);
        assert_approx(z[9], expected, 1e-9);
    }

    #[test]
    fn lookback() {
        assert_eq!(RollingZScore::new(50, 1e-8).lookback(), 49);
    }
}
