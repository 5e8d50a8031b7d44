//! Column label resolution.
//!
//! Multi-symbol downloads label columns with two levels, field × symbol, and
//! the level order depends on the provider version. Resolution tries an
//! ordered list of strategies; the first one that yields columns wins.

use super::frame::{ColumnLabel, RawColumn, RawFrame};
use super::provider::DataError;
use crate::domain::OhlcvField;

/// One way of turning two-level labels into single-level names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStrategy {
    /// Keep columns whose last level is the symbol: ("Close", "SPY") → "Close".
    SymbolAtLastLevel,
    /// Keep columns whose first level is the symbol: ("SPY", "Close") → "Close".
    SymbolAtFirstLevel,
    /// Assume one embedded symbol and drop the outer level: (x, "Close") → "Close".
    DropOuterLevel,
}

impl LabelStrategy {
    /// Resolution order.
    pub const ORDER: [LabelStrategy; 3] = [
        LabelStrategy::SymbolAtLastLevel,
        LabelStrategy::SymbolAtFirstLevel,
        LabelStrategy::DropOuterLevel,
    ];

    /// Apply this strategy. `None` means it does not fit the labels.
    pub fn resolve<'a>(
        self,
        columns: &'a [RawColumn],
        symbol: &str,
    ) -> Option<Vec<NamedColumn<'a>>> {
        let resolved: Vec<NamedColumn<'a>> = columns
            .iter()
            .filter_map(|c| {
                let ColumnLabel::Pair(outer, inner) = &c.label else {
                    return None;
                };
                let name = match self {
                    LabelStrategy::SymbolAtLastLevel => (inner == symbol).then_some(outer),
                    LabelStrategy::SymbolAtFirstLevel => (outer == symbol).then_some(inner),
                    LabelStrategy::DropOuterLevel => Some(inner),
                }?;
                Some(NamedColumn {
                    name: name.as_str(),
                    values: &c.values,
                })
            })
            .collect();

        (!resolved.is_empty()).then_some(resolved)
    }
}

/// A column after label flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedColumn<'a> {
    pub name: &'a str,
    pub values: &'a [Option<f64>],
}

/// Flatten the frame's labels to single-level names.
///
/// Single-level frames pass through untouched.
pub fn flatten_labels<'a>(
    frame: &'a RawFrame,
    symbol: &str,
) -> Result<Vec<NamedColumn<'a>>, DataError> {
    if !frame.is_two_level() {
        return Ok(frame
            .columns()
            .iter()
            .filter_map(|c| match &c.label {
                ColumnLabel::Single(name) => Some(NamedColumn {
                    name: name.as_str(),
                    values: &c.values,
                }),
                ColumnLabel::Pair(..) => None,
            })
            .collect());
    }

    LabelStrategy::ORDER
        .iter()
        .find_map(|strategy| {
            let resolved = strategy.resolve(frame.columns(), symbol)?;
            tracing::debug!(?strategy, symbol, "resolved two-level column labels");
            Some(resolved)
        })
        .ok_or_else(|| DataError::MissingCanonicalColumns {
            found: frame.describe_labels(),
        })
}

/// Keep the canonical OHLCV columns, in canonical order.
///
/// Fails if none survive or if one appears twice.
pub fn select_canonical<'a>(
    columns: &[NamedColumn<'a>],
) -> Result<Vec<(OhlcvField, &'a [Option<f64>])>, DataError> {
    let mut selected: Vec<(OhlcvField, &'a [Option<f64>])> = Vec::new();
    for column in columns {
        let Some(field) = OhlcvField::from_label(column.name) else {
            continue;
        };
        if selected.iter().any(|(f, _)| *f == field) {
            return Err(DataError::DuplicateColumn {
                column: field.name().to_string(),
            });
        }
        selected.push((field, column.values));
    }

    if selected.is_empty() {
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        return Err(DataError::MissingCanonicalColumns {
            found: format!("[{}]", names.join(", ")),
        });
    }

    selected.sort_by_key(|(field, _)| *field);
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::TimeIndex;
    use chrono::NaiveDate;

    fn index(n: usize) -> TimeIndex {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(14, 35, 0)
            .unwrap();
        TimeIndex::Naive(
            (0..n)
                .map(|i| start + chrono::Duration::minutes(5 * i as i64))
                .collect(),
        )
    }

    fn frame(labels: Vec<ColumnLabel>) -> RawFrame {
        let columns = labels
            .into_iter()
            .enumerate()
            .map(|(i, l)| RawColumn::dense(l, vec![i as f64; 2]))
            .collect();
        RawFrame::new(index(2), columns).unwrap()
    }

    fn names(cols: &[NamedColumn<'_>]) -> Vec<String> {
        cols.iter().map(|c| c.name.to_string()).collect()
    }

    #[test]
    fn symbol_at_last_level_wins_first() {
        let f = frame(vec![
            ColumnLabel::pair("Close", "SPY"),
            ColumnLabel::pair("Close", "QQQ"),
            ColumnLabel::pair("Volume", "SPY"),
        ]);
        let cols = flatten_labels(&f, "SPY").unwrap();
        assert_eq!(names(&cols), vec!["Close", "Volume"]);
        assert_eq!(cols[0].values, &[Some(0.0), Some(0.0)]);
    }

    #[test]
    fn falls_back_to_symbol_at_first_level() {
        let f = frame(vec![
            ColumnLabel::pair("SPY", "Open"),
            ColumnLabel::pair("SPY", "Close"),
        ]);
        assert_eq!(
            LabelStrategy::SymbolAtLastLevel.resolve(f.columns(), "SPY"),
            None
        );
        let cols = flatten_labels(&f, "SPY").unwrap();
        assert_eq!(names(&cols), vec!["Open", "Close"]);
    }

    #[test]
    fn falls_back_to_dropping_outer_level() {
        // Symbol not present at either level: assume a single embedded symbol.
        let f = frame(vec![
            ColumnLabel::pair("Price", "Close"),
            ColumnLabel::pair("Price", "High"),
        ]);
        let cols = flatten_labels(&f, "SPY").unwrap();
        assert_eq!(names(&cols), vec!["Close", "High"]);
    }

    #[test]
    fn single_level_passes_through() {
        let f = frame(vec![ColumnLabel::single("Close"), ColumnLabel::single("Open")]);
        let cols = flatten_labels(&f, "SPY").unwrap();
        assert_eq!(names(&cols), vec!["Close", "Open"]);
    }

    #[test]
    fn canonical_selection_orders_and_filters() {
        let f = frame(vec![
            ColumnLabel::single("Volume"),
            ColumnLabel::single("Adj Close"),
            ColumnLabel::single("close"),
            ColumnLabel::single("Open"),
        ]);
        let cols = flatten_labels(&f, "SPY").unwrap();
        let selected = select_canonical(&cols).unwrap();
        let fields: Vec<OhlcvField> = selected.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![OhlcvField::Open, OhlcvField::Close, OhlcvField::Volume]
        );
    }

    #[test]
    fn canonical_selection_fails_without_ohlcv() {
        let f = frame(vec![ColumnLabel::single("Dividends")]);
        let cols = flatten_labels(&f, "SPY").unwrap();
        let err = select_canonical(&cols).unwrap_err();
        assert!(matches!(err, DataError::MissingCanonicalColumns { .. }));
    }

    #[test]
    fn canonical_selection_rejects_duplicates() {
        // Two symbols flattened together by the last-resort strategy.
        let f = frame(vec![
            ColumnLabel::pair("SPY", "Close"),
            ColumnLabel::pair("QQQ", "Close"),
        ]);
        let cols = flatten_labels(&f, "IWM").unwrap();
        let err = select_canonical(&cols).unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn { .. }));
    }
}
