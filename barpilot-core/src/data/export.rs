//! Feature table export (Parquet / CSV) through Polars.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureTable;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("dataframe error: {0}")]
    Frame(String),

    #[error("io error writing {path}: {message}")]
    Io { path: String, message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    #[default]
    Parquet,
    Csv,
}

impl DatasetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DatasetFormat::Parquet => "parquet",
            DatasetFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for DatasetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(DatasetFormat::Parquet),
            "csv" => Ok(DatasetFormat::Csv),
            other => Err(format!("unknown dataset format '{other}'")),
        }
    }
}

/// Convert a feature table into a DataFrame.
///
/// Columns: `timestamp` (RFC 3339, local offset), `date` (local trading date),
/// the bar columns, then the derived columns in table order.
pub fn features_to_dataframe(table: &FeatureTable) -> Result<DataFrame, ExportError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let stamps: Vec<String> = table.timestamps().iter().map(|t| t.to_rfc3339()).collect();
    let dates: Vec<i32> = table
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = vec![
        Column::new("timestamp".into(), stamps),
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| ExportError::Frame(format!("date cast: {e}")))?,
    ];
    for (field, values) in table.bars().columns() {
        columns.push(Column::new(field.name().into(), values.as_slice()));
    }
    for (feature, values) in table.derived() {
        columns.push(Column::new(feature.name().into(), values.as_slice()));
    }

    DataFrame::new(columns).map_err(|e| ExportError::Frame(format!("dataframe creation: {e}")))
}

/// Write a feature table to `path` in the given format.
pub fn export_features(
    table: &FeatureTable,
    path: &Path,
    format: DatasetFormat,
) -> Result<(), ExportError> {
    let io_err = |e: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut df = features_to_dataframe(table)?;
    let file = fs::File::create(path).map_err(io_err)?;
    match format {
        DatasetFormat::Parquet => {
            ParquetWriter::new(file)
                .finish(&mut df)
                .map_err(|e| ExportError::Frame(format!("write parquet: {e}")))?;
        }
        DatasetFormat::Csv => {
            CsvWriter::new(file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| ExportError::Frame(format!("write csv: {e}")))?;
        }
    }
    Ok(())
}
