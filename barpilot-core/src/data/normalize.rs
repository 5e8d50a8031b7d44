//! Bar normalizer: raw provider frame → single-symbol, local-time `BarTable`.
//!
//! Steps, in order:
//! 1. Flatten two-level labels for the target symbol (see `labels`).
//! 2. Keep the canonical OHLCV columns that are present.
//! 3. Naive timestamps are UTC; everything is converted to the exchange timezone.
//! 4. Optionally restrict to the intraday session window.
//! 5. Drop rows with a missing value in any kept column.
//! 6. Sort by time and drop duplicate timestamps (first complete row wins).

use chrono::DateTime;
use chrono_tz::Tz;

use super::frame::RawFrame;
use super::labels::{flatten_labels, select_canonical};
use super::provider::DataError;
use super::session::SessionWindow;
use crate::config::PipelineConfig;
use crate::domain::BarTable;

#[derive(Debug, Clone)]
pub struct BarNormalizer {
    timezone: Tz,
    session: Option<SessionWindow>,
}

impl BarNormalizer {
    /// Normalizer that converts to `timezone` and keeps all hours.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            session: None,
        }
    }

    pub fn with_session(mut self, session: SessionWindow) -> Self {
        self.session = Some(session);
        self
    }

    /// Normalizer using the pipeline timezone and session window.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.timezone).with_session(config.session)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn session(&self) -> Option<SessionWindow> {
        self.session
    }

    pub fn normalize(&self, frame: &RawFrame, symbol: &str) -> Result<BarTable, DataError> {
        if frame.is_empty() {
            return Err(DataError::EmptyData {
                symbol: symbol.to_string(),
            });
        }

        let named = flatten_labels(frame, symbol)?;
        let selected = select_canonical(&named)?;

        let local: Vec<DateTime<Tz>> = frame
            .index()
            .to_utc()
            .iter()
            .map(|t| t.with_timezone(&self.timezone))
            .collect();

        let total = local.len();
        let complete = |i: usize| {
            selected
                .iter()
                .all(|(_, values)| values[i].is_some_and(|v| !v.is_nan()))
        };
        let in_session = |i: usize| {
            self.session
                .map_or(true, |session| session.contains(local[i].time()))
        };

        // Only complete rows take part in deduplication; the stable sort keeps
        // the first copy of a timestamp in front.
        let mut order: Vec<usize> = (0..total)
            .filter(|&i| in_session(i) && complete(i))
            .collect();
        order.sort_by_key(|&i| local[i]);
        let mut rows: Vec<usize> = Vec::with_capacity(order.len());
        let mut duplicates = 0usize;
        for i in order {
            if rows.last().is_some_and(|&prev| local[prev] == local[i]) {
                duplicates += 1;
                continue;
            }
            rows.push(i);
        }
        if duplicates > 0 {
            tracing::warn!(symbol, duplicates, "dropped bars with duplicate timestamps");
        }

        tracing::debug!(
            symbol,
            rows_in = total,
            rows_out = rows.len(),
            naive_index = frame.index().is_naive(),
            timezone = %self.timezone,
            "normalized bars"
        );

        let timestamps = rows.iter().map(|&i| local[i]).collect();
        let columns = selected
            .iter()
            .map(|(field, values)| {
                let kept = rows
                    .iter()
                    .map(|&i| values[i].unwrap_or(f64::NAN))
                    .collect();
                (*field, kept)
            })
            .collect();

        BarTable::new(timestamps, columns).map_err(|e| DataError::Shape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::{ColumnLabel, RawColumn, TimeIndex};
    use crate::domain::OhlcvField;
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike};
    use chrono_tz::America::New_York;

    fn utc_naive(h: u32, m: u32) -> NaiveDateTime {
        // 2024-03-04 is in EST (UTC-5).
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session_normalizer() -> BarNormalizer {
        BarNormalizer::new(New_York).with_session(SessionWindow::default())
    }

    #[test]
    fn two_level_frame_resolves_to_canonical_columns() {
        let index = TimeIndex::Naive(vec![utc_naive(15, 0), utc_naive(15, 5)]);
        let frame = RawFrame::new(
            index,
            vec![
                RawColumn::dense(ColumnLabel::pair("Close", "SPY"), vec![10.0, 11.0]),
                RawColumn::dense(ColumnLabel::pair("High", "SPY"), vec![10.5, 11.5]),
                RawColumn::dense(ColumnLabel::pair("Close", "QQQ"), vec![90.0, 91.0]),
                RawColumn::dense(ColumnLabel::pair("Volume", "SPY"), vec![100.0, 120.0]),
            ],
        )
        .unwrap();

        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        let fields: Vec<_> = table.fields().collect();
        assert_eq!(
            fields,
            vec![OhlcvField::High, OhlcvField::Close, OhlcvField::Volume]
        );
        assert_eq!(table.column(OhlcvField::Close).unwrap(), &[10.0, 11.0]);
    }

    #[test]
    fn naive_timestamps_are_utc_then_local() {
        let frame = RawFrame::new(
            TimeIndex::Naive(vec![utc_naive(14, 35)]),
            vec![RawColumn::dense(ColumnLabel::single("Close"), vec![1.0])],
        )
        .unwrap();
        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        let ts = table.timestamps()[0];
        assert_eq!((ts.hour(), ts.minute()), (9, 35));
        assert_eq!(ts.timezone(), New_York);
    }

    #[test]
    fn aware_timestamps_are_converted() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let t = utc_naive(16, 35).and_local_timezone(plus_two).unwrap(); // 14:35 UTC
        let frame = RawFrame::new(
            TimeIndex::Aware(vec![t]),
            vec![RawColumn::dense(ColumnLabel::single("Close"), vec![1.0])],
        )
        .unwrap();
        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        let ts = table.timestamps()[0];
        assert_eq!((ts.hour(), ts.minute()), (9, 35));
    }

    #[test]
    fn session_window_excludes_auction_bars() {
        // 14:30, 14:35, 20:55, 21:00 UTC → 09:30, 09:35, 15:55, 16:00 EST
        let index = TimeIndex::Naive(vec![
            utc_naive(14, 30),
            utc_naive(14, 35),
            utc_naive(20, 55),
            utc_naive(21, 0),
        ]);
        let frame = RawFrame::new(
            index,
            vec![RawColumn::dense(
                ColumnLabel::single("Close"),
                vec![1.0, 2.0, 3.0, 4.0],
            )],
        )
        .unwrap();

        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        assert_eq!(table.column(OhlcvField::Close).unwrap(), &[2.0, 3.0]);

        let all_hours = BarNormalizer::new(New_York).normalize(&frame, "SPY").unwrap();
        assert_eq!(all_hours.len(), 4);
    }

    #[test]
    fn drops_rows_with_missing_values() {
        let index = TimeIndex::Naive(vec![utc_naive(15, 0), utc_naive(15, 5), utc_naive(15, 10)]);
        let frame = RawFrame::new(
            index,
            vec![
                RawColumn::new(
                    ColumnLabel::single("Close"),
                    vec![Some(1.0), None, Some(3.0)],
                ),
                RawColumn::new(
                    ColumnLabel::single("Volume"),
                    vec![Some(10.0), Some(20.0), Some(f64::NAN)],
                ),
            ],
        )
        .unwrap();
        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column(OhlcvField::Close).unwrap(), &[1.0]);
    }

    #[test]
    fn sorts_and_dedupes_timestamps() {
        let index = TimeIndex::Naive(vec![utc_naive(15, 5), utc_naive(15, 0), utc_naive(15, 5)]);
        let frame = RawFrame::new(
            index,
            vec![RawColumn::dense(
                ColumnLabel::single("Close"),
                vec![2.0, 1.0, 99.0],
            )],
        )
        .unwrap();
        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        assert_eq!(table.column(OhlcvField::Close).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn incomplete_duplicate_does_not_shadow_valid_copy() {
        let index = TimeIndex::Naive(vec![utc_naive(15, 0), utc_naive(15, 5), utc_naive(15, 5)]);
        let frame = RawFrame::new(
            index,
            vec![RawColumn::new(
                ColumnLabel::single("Close"),
                vec![Some(1.0), None, Some(2.0)],
            )],
        )
        .unwrap();
        let table = session_normalizer().normalize(&frame, "SPY").unwrap();
        assert_eq!(table.column(OhlcvField::Close).unwrap(), &[1.0, 2.0]);
        assert_eq!(table.timestamps()[1].minute(), 5);
    }

    #[test]
    fn empty_frame_is_empty_data_error() {
        let err = session_normalizer()
            .normalize(&RawFrame::empty(), "SPY")
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyData { .. }));
    }

    #[test]
    fn frame_without_ohlcv_is_shape_error() {
        let frame = RawFrame::new(
            TimeIndex::Naive(vec![utc_naive(15, 0)]),
            vec![RawColumn::dense(ColumnLabel::single("Dividends"), vec![0.0])],
        )
        .unwrap();
        let err = session_normalizer().normalize(&frame, "SPY").unwrap_err();
        assert!(err.is_shape_error());
    }
}
