//! Observation builder: the fixed-width vector the policy consumes.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

use crate::features::{FeatureColumn, FeatureTable};

/// Fewer valid feature rows than the window needs. A soft skip, not a failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("insufficient history: {available} feature rows, window needs {required}")]
pub struct InsufficientHistory {
    pub available: usize,
    pub required: usize,
}

/// Row-major, oldest-first flattening of the last `window` feature rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub values: Vec<f32>,
    pub window: usize,
    pub columns: Vec<FeatureColumn>,
    /// Close of the newest row, the reference price for order limits.
    pub last_close: f64,
    pub last_timestamp: DateTime<Tz>,
}

impl Observation {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values of row `row` (0 = oldest).
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        let width = self.columns.len();
        self.values.get(row * width..(row + 1) * width)
    }
}

pub fn build_obs(
    features: &FeatureTable,
    window: usize,
    columns: &[FeatureColumn],
) -> Result<Observation, InsufficientHistory> {
    let available = features.len();
    if window == 0 || available < window {
        return Err(InsufficientHistory {
            available,
            required: window,
        });
    }

    let start = available - window;
    let selected: Vec<&[f64]> = columns
        .iter()
        .map(|c| features.column(*c).unwrap_or(&[]))
        .collect();

    let mut values = Vec::with_capacity(window * columns.len());
    for row in start..available {
        for column in &selected {
            let v = column.get(row).copied().unwrap_or(f64::NAN);
            values.push(v as f32);
        }
    }

    Ok(Observation {
        values,
        window,
        columns: columns.to_vec(),
        last_close: features.close()[available - 1],
        last_timestamp: features.timestamps()[available - 1],
    })
}
