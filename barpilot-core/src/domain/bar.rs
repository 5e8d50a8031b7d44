//! Bar table: the fundamental market data unit.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the five canonical OHLCV columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OhlcvField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl OhlcvField {
    /// Canonical column order.
    pub const CANONICAL: [OhlcvField; 5] = [
        OhlcvField::Open,
        OhlcvField::High,
        OhlcvField::Low,
        OhlcvField::Close,
        OhlcvField::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OhlcvField::Open => "open",
            OhlcvField::High => "high",
            OhlcvField::Low => "low",
            OhlcvField::Close => "close",
            OhlcvField::Volume => "volume",
        }
    }

    /// Match a provider column label ("Close", "close", " CLOSE ") to a canonical field.
    ///
    /// "Adj Close" and any other label return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::CANONICAL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for OhlcvField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("column '{field}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        field: OhlcvField,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(OhlcvField),

    #[error("timestamps are not strictly increasing at row {row}")]
    NotStrictlyIncreasing { row: usize },
}

/// Ordered, single-level table of OHLCV columns.
///
/// Only the canonical columns that are present are stored, always in
/// canonical order. Timestamps are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTable {
    timestamps: Vec<DateTime<Tz>>,
    columns: Vec<(OhlcvField, Vec<f64>)>,
}

impl BarTable {
    pub fn new(
        timestamps: Vec<DateTime<Tz>>,
        mut columns: Vec<(OhlcvField, Vec<f64>)>,
    ) -> Result<Self, BarError> {
        columns.sort_by_key(|(field, _)| *field);
        for pair in columns.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(BarError::DuplicateColumn(pair[0].0));
            }
        }
        for (field, values) in &columns {
            if values.len() != timestamps.len() {
                return Err(BarError::LengthMismatch {
                    field: *field,
                    expected: timestamps.len(),
                    actual: values.len(),
                });
            }
        }
        if let Some(row) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(BarError::NotStrictlyIncreasing { row: row + 1 });
        }
        Ok(Self {
            timestamps,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Tz>] {
        &self.timestamps
    }

    pub fn column(&self, field: OhlcvField) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_slice())
    }

    pub fn has(&self, field: OhlcvField) -> bool {
        self.column(field).is_some()
    }

    /// Present columns, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = OhlcvField> + '_ {
        self.columns.iter().map(|(f, _)| *f)
    }

    pub fn columns(&self) -> &[(OhlcvField, Vec<f64>)] {
        &self.columns
    }

    /// Keep only the rows where `keep[i]` is true. Order is preserved.
    pub fn retain_rows(&self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.len());
        let pick = |values: &[f64]| -> Vec<f64> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect()
        };
        Self {
            timestamps: self
                .timestamps
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(t, _)| *t)
                .collect(),
            columns: self
                .columns
                .iter()
                .map(|(f, values)| (*f, pick(values)))
                .collect(),
        }
    }

    /// The last `n` rows (or all of them if the table is shorter).
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            timestamps: self.timestamps[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(f, values)| (*f, values[start..].to_vec()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn ts(minute: u32) -> DateTime<Tz> {
        New_York
            .with_ymd_and_hms(2024, 3, 4, 10, minute, 0)
            .unwrap()
    }

    fn close_only(minutes: &[u32]) -> Result<BarTable, BarError> {
        let closes = (0..minutes.len()).map(|i| 100.0 + i as f64).collect();
        BarTable::new(
            minutes.iter().map(|m| ts(*m)).collect(),
            vec![(OhlcvField::Close, closes)],
        )
    }

    #[test]
    fn field_from_label_is_case_insensitive() {
        assert_eq!(OhlcvField::from_label("Close"), Some(OhlcvField::Close));
        assert_eq!(OhlcvField::from_label(" VOLUME "), Some(OhlcvField::Volume));
        assert_eq!(OhlcvField::from_label("Adj Close"), None);
    }

    #[test]
    fn columns_are_stored_in_canonical_order() {
        let table = BarTable::new(
            vec![ts(0), ts(5)],
            vec![
                (OhlcvField::Volume, vec![1.0, 2.0]),
                (OhlcvField::Close, vec![10.0, 11.0]),
                (OhlcvField::Open, vec![9.0, 10.0]),
            ],
        )
        .unwrap();
        let fields: Vec<_> = table.fields().collect();
        assert_eq!(
            fields,
            vec![OhlcvField::Open, OhlcvField::Close, OhlcvField::Volume]
        );
        assert!(!table.has(OhlcvField::High));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = close_only(&[0, 0]).unwrap_err();
        assert_eq!(err, BarError::NotStrictlyIncreasing { row: 1 });
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = BarTable::new(vec![ts(0)], vec![(OhlcvField::Close, vec![1.0, 2.0])])
            .unwrap_err();
        assert!(matches!(err, BarError::LengthMismatch { .. }));
    }

    #[test]
    fn retain_and_tail_keep_order() {
        let table = close_only(&[0, 5, 10]).unwrap();
        let kept = table.retain_rows(&[true, false, true]);
        assert_eq!(kept.timestamps(), &[ts(0), ts(10)]);
        let tail = table.tail(2);
        assert_eq!(tail.timestamps(), &[ts(5), ts(10)]);
        assert_eq!(table.tail(10).len(), 3);
    }
}
