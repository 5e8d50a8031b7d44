//! Robust scaling (median / IQR).
//!
//! Statistics are fitted on whatever rows are being processed and are never
//! persisted, so the same bar can scale differently under a different fetch
//! window. Quantiles use linear interpolation between order statistics.

use serde::{Deserialize, Serialize};

/// Quantile of pre-sorted values with linear interpolation.
/// Returns NaN for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Fitted location/scale for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingStats {
    pub median: f64,
    pub q25: f64,
    pub q75: f64,
}

impl ScalingStats {
    /// Fit on the finite values of `values`. `None` if there are none.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            median: quantile(&sorted, 0.5),
            q25: quantile(&sorted, 0.25),
            q75: quantile(&sorted, 0.75),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustScaler {
    epsilon: f64,
}

impl RobustScaler {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// `(v - median) / (iqr + epsilon)`
    pub fn transform(&self, stats: &ScalingStats, values: &mut [f64]) {
        let scale = stats.iqr() + self.epsilon;
        for v in values.iter_mut() {
            *v = (*v - stats.median) / scale;
        }
    }

    /// Fit on `values` and scale them in place.
    pub fn fit_transform(&self, values: &mut [f64]) -> Option<ScalingStats> {
        let stats = ScalingStats::fit(values)?;
        self.transform(&stats, values);
        Some(stats)
    }
}

impl Default for RobustScaler {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_approx(quantile(&sorted, 0.5), 2.5, DEFAULT_EPSILON);
        assert_approx(quantile(&sorted, 0.25), 1.75, DEFAULT_EPSILON);
        assert_approx(quantile(&sorted, 0.75), 3.25, DEFAULT_EPSILON);
        assert_approx(quantile(&sorted, 0.0), 1.0, DEFAULT_EPSILON);
        assert_approx(quantile(&sorted, 1.0), 4.0, DEFAULT_EPSILON);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn fit_ignores_order() {
        let stats = ScalingStats::fit(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_approx(stats.median, 3.0, DEFAULT_EPSILON);
        assert_approx(stats.iqr(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn fit_transform_centers_on_median() {
        let mut values = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let stats = RobustScaler::default().fit_transform(&mut values).unwrap();
        assert_approx(stats.median, 30.0, DEFAULT_EPSILON);
        assert_approx(values[2], 0.0, DEFAULT_EPSILON);
        // IQR = 40 - 20 = 20
        assert_approx(values[4], 1.0, 1e-9);
        assert_approx(values[0], -1.0, 1e-9);
    }

    #[test]
    fn constant_column_stays_finite() {
        let mut values = vec![7.0; 5];
        RobustScaler::default().fit_transform(&mut values).unwrap();
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_column_has_no_stats() {
        assert!(RobustScaler::default().fit_transform(&mut []).is_none());
    }
}
