//! CSV bar import.
//!
//! Reads bar files exported by charting tools or multi-symbol downloaders.
//! Two layouts are accepted:
//!
//! - single header: `Datetime,Open,High,Low,Close,Volume`
//! - two header rows, `Price,...` over `Ticker,...`, optionally followed by a
//!   bare `Datetime,,,` row; labels become (field, symbol) pairs.
//!
//! Timestamps carrying an offset produce an aware index, bare ones a naive
//! index. A file may not mix the two.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use super::frame::{ColumnLabel, RawColumn, RawFrame, TimeIndex};
use super::provider::{DataError, DataProvider, FetchRequest};

const AWARE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Bars read from a local CSV file. The whole file is returned regardless of
/// the requested lookback.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, _request: &FetchRequest) -> Result<RawFrame, DataError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", self.path.display())))?;
        parse_csv(&text)
    }
}

enum Stamp {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn parse_stamp(raw: &str) -> Result<Stamp, DataError> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Stamp::Aware(t));
    }
    for fmt in AWARE_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(raw, fmt) {
            return Ok(Stamp::Aware(t));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Stamp::Naive(t));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Stamp::Naive)
        .ok_or_else(|| DataError::InvalidTimestamp(raw.to_string()))
}

fn parse_value(raw: &str, row: usize) -> Result<Option<f64>, DataError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::Csv(format!("row {row}: '{raw}' is not a number")))
}

/// Parse CSV text into a raw frame.
pub fn parse_csv(text: &str) -> Result<RawFrame, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| DataError::Csv(e.to_string()))?;

    let Some(header) = records.first() else {
        return Ok(RawFrame::empty());
    };
    let two_level = records
        .get(1)
        .and_then(|r| r.get(0))
        .is_some_and(|c| c.trim().eq_ignore_ascii_case("ticker"));

    let width = header.len();
    let mut body_start = 1;
    let labels: Vec<ColumnLabel> = if two_level {
        let tickers = &records[1];
        body_start = 2;
        // bare index-name row: "Datetime,,,,"
        if records
            .get(2)
            .is_some_and(|r| r.iter().skip(1).all(|c| c.trim().is_empty()))
        {
            body_start = 3;
        }
        (1..width)
            .map(|j| {
                ColumnLabel::pair(
                    header.get(j).unwrap_or("").trim(),
                    tickers.get(j).unwrap_or("").trim(),
                )
            })
            .collect()
    } else {
        (1..width)
            .map(|j| ColumnLabel::single(header.get(j).unwrap_or("").trim()))
            .collect()
    };

    let mut aware = Vec::new();
    let mut naive = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); labels.len()];
    for (offset, record) in records[body_start..].iter().enumerate() {
        let row = body_start + offset + 1;
        let stamp = record
            .get(0)
            .ok_or_else(|| DataError::Csv(format!("row {row}: missing timestamp")))?;
        match parse_stamp(stamp)? {
            Stamp::Aware(t) => aware.push(t),
            Stamp::Naive(t) => naive.push(t),
        }
        for (j, column) in values.iter_mut().enumerate() {
            column.push(parse_value(record.get(j + 1).unwrap_or(""), row)?);
        }
    }

    let index = match (aware.is_empty(), naive.is_empty()) {
        (_, true) => TimeIndex::Aware(aware),
        (true, false) => TimeIndex::Naive(naive),
        (false, false) => {
            return Err(DataError::InvalidTimestamp(
                "file mixes offset and bare timestamps".into(),
            ))
        }
    };

    let columns = labels
        .into_iter()
        .zip(values)
        .map(|(label, values)| RawColumn::new(label, values))
        .collect();
    RawFrame::new(index, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_header_naive() {
        let frame = parse_csv(
            "Datetime,Open,High,Low,Close,Volume\n\
             2024-03-04 14:35:00,500,501,499,500.5,1000\n\
             2024-03-04 14:40:00,500.5,502,500,501,\n",
        )
        .unwrap();
        assert_eq!(frame.len(), 2);
        assert!(frame.index().is_naive());
        assert!(!frame.is_two_level());
        assert_eq!(frame.columns()[4].values, vec![Some(1000.0), None]);
    }

    #[test]
    fn two_row_header_aware() {
        let frame = parse_csv(
            "Price,Close,High,Low,Open,Volume\n\
             Ticker,SPY,SPY,SPY,SPY,SPY\n\
             Datetime,,,,,\n\
             2024-03-04 14:35:00+00:00,500.5,501,499,500,1000\n",
        )
        .unwrap();
        assert!(frame.is_two_level());
        assert!(!frame.index().is_naive());
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.columns()[0].label, ColumnLabel::pair("Close", "SPY"));
    }

    #[test]
    fn mixed_timestamps_rejected() {
        let err = parse_csv(
            "Datetime,Close\n2024-03-04 14:35:00+00:00,1\n2024-03-04 14:40:00,2\n",
        )
        .unwrap_err();
        assert!(matches!(err, DataError::InvalidTimestamp(_)));
    }

    #[test]
    fn bad_number_reports_row() {
        let err = parse_csv("Datetime,Close\n2024-03-04 14:35:00,abc\n").unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_csv("Datetime,Close\n").unwrap().is_empty());
        assert!(parse_csv("").unwrap().is_empty());
    }

    #[test]
    fn provider_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Close").unwrap();
        writeln!(file, "2024-03-04,500").unwrap();
        let provider = CsvProvider::new(file.path());
        let frame = provider
            .fetch(&FetchRequest::new("SPY", 3, Default::default()))
            .unwrap();
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn missing_file_is_csv_error() {
        let provider = CsvProvider::new("/nonexistent/bars.csv");
        let err = provider
            .fetch(&FetchRequest::new("SPY", 3, Default::default()))
            .unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }
}
