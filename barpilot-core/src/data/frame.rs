//! Raw provider frames.
//!
//! A `RawFrame` is what a provider hands back before normalization: a time
//! index that may or may not carry an offset, and labelled columns that may be
//! single-level ("Close") or two-level (("Close", "SPY") or ("SPY", "Close")).
//! Missing cells are `None`.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use super::provider::DataError;

/// Row index of a raw frame. A frame is either entirely naive or entirely aware.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    Naive(Vec<NaiveDateTime>),
    Aware(Vec<DateTime<FixedOffset>>),
}

impl TimeIndex {
    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Naive(v) => v.len(),
            TimeIndex::Aware(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_naive(&self) -> bool {
        matches!(self, TimeIndex::Naive(_))
    }

    /// Naive timestamps are read as UTC; aware ones are converted to UTC.
    pub fn to_utc(&self) -> Vec<DateTime<Utc>> {
        match self {
            TimeIndex::Naive(v) => v.iter().map(|t| t.and_utc()).collect(),
            TimeIndex::Aware(v) => v.iter().map(|t| t.with_timezone(&Utc)).collect(),
        }
    }
}

/// Column label, single- or two-level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnLabel {
    Single(String),
    Pair(String, String),
}

impl ColumnLabel {
    pub fn single(name: impl Into<String>) -> Self {
        ColumnLabel::Single(name.into())
    }

    pub fn pair(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        ColumnLabel::Pair(outer.into(), inner.into())
    }
}

impl std::fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnLabel::Single(name) => f.write_str(name),
            ColumnLabel::Pair(outer, inner) => write!(f, "({outer}, {inner})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub label: ColumnLabel,
    pub values: Vec<Option<f64>>,
}

impl RawColumn {
    pub fn new(label: ColumnLabel, values: Vec<Option<f64>>) -> Self {
        Self { label, values }
    }

    /// Column with every cell present.
    pub fn dense(label: ColumnLabel, values: Vec<f64>) -> Self {
        Self {
            label,
            values: values.into_iter().map(Some).collect(),
        }
    }
}

/// Provider output before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    index: TimeIndex,
    columns: Vec<RawColumn>,
}

impl RawFrame {
    /// Build a frame. Every column must match the index length, and labels may
    /// not mix single- and two-level forms.
    pub fn new(index: TimeIndex, columns: Vec<RawColumn>) -> Result<Self, DataError> {
        let rows = index.len();
        if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
            return Err(DataError::Shape(format!(
                "column {} has {} rows, index has {rows}",
                bad.label,
                bad.values.len()
            )));
        }
        let pairs = columns
            .iter()
            .filter(|c| matches!(c.label, ColumnLabel::Pair(..)))
            .count();
        if pairs != 0 && pairs != columns.len() {
            return Err(DataError::Shape(
                "column labels mix single- and two-level forms".into(),
            ));
        }
        Ok(Self { index, columns })
    }

    /// A frame with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            index: TimeIndex::Aware(Vec::new()),
            columns: Vec::new(),
        }
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// No rows or no columns, either way there is nothing to normalize.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    pub fn is_two_level(&self) -> bool {
        self.columns
            .first()
            .is_some_and(|c| matches!(c.label, ColumnLabel::Pair(..)))
    }

    /// Labels rendered for error messages.
    pub fn describe_labels(&self) -> String {
        let labels: Vec<String> = self.columns.iter().map(|c| c.label.to_string()).collect();
        format!("[{}]", labels.join(", "))
    }
}
