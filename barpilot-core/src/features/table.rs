//! Feature table: a bar table plus derived columns.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use super::column::FeatureColumn;
use crate::domain::{BarTable, OhlcvField};

/// Bar table extended with the derived feature columns, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    bars: BarTable,
    derived: Vec<(FeatureColumn, Vec<f64>)>,
}

impl FeatureTable {
    pub(crate) fn new(bars: BarTable, derived: Vec<(FeatureColumn, Vec<f64>)>) -> Self {
        debug_assert!(derived.iter().all(|(_, v)| v.len() == bars.len()));
        Self { bars, derived }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &BarTable {
        &self.bars
    }

    pub fn timestamps(&self) -> &[DateTime<Tz>] {
        self.bars.timestamps()
    }

    /// Local trading date of every row.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.timestamps().iter().map(|t| t.date_naive()).collect()
    }

    pub fn close(&self) -> &[f64] {
        self.bars.column(OhlcvField::Close).unwrap_or(&[])
    }

    pub fn column(&self, column: FeatureColumn) -> Option<&[f64]> {
        self.derived
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_slice())
    }

    pub(crate) fn column_mut(&mut self, column: FeatureColumn) -> Option<&mut Vec<f64>> {
        self.derived
            .iter_mut()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    /// Derived columns, in table order.
    pub fn derived(&self) -> &[(FeatureColumn, Vec<f64>)] {
        &self.derived
    }

    /// Values of `columns` at row `row`.
    pub fn row(&self, row: usize, columns: &[FeatureColumn]) -> Option<Vec<f64>> {
        columns
            .iter()
            .map(|c| self.column(*c).and_then(|v| v.get(row).copied()))
            .collect()
    }

    /// Whether every value in row `row` (bar and derived columns) is finite.
    pub fn row_is_finite(&self, row: usize) -> bool {
        self.bars
            .columns()
            .iter()
            .map(|(_, v)| v[row])
            .chain(self.derived.iter().map(|(_, v)| v[row]))
            .all(f64::is_finite)
    }

    pub fn retain_rows(&self, keep: &[bool]) -> Self {
        let derived = self
            .derived
            .iter()
            .map(|(c, values)| {
                let kept = values
                    .iter()
                    .zip(keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect();
                (*c, kept)
            })
            .collect();
        Self {
            bars: self.bars.retain_rows(keep),
            derived,
        }
    }

    /// The last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            bars: self.bars.tail(n),
            derived: self
                .derived
                .iter()
                .map(|(c, v)| (*c, v[start..].to_vec()))
                .collect(),
        }
    }
}
