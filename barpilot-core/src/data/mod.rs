//! Bar data: providers, raw frames, normalization and export.

pub mod csv_import;
pub mod export;
pub mod frame;
pub mod labels;
pub mod normalize;
pub mod provider;
pub mod session;
pub mod synthetic;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use export::{export_features, features_to_dataframe, DatasetFormat, ExportError};
pub use frame::{ColumnLabel, RawColumn, RawFrame, TimeIndex};
pub use labels::{flatten_labels, LabelStrategy};
pub use normalize::BarNormalizer;
pub use provider::{BarInterval, DataError, DataProvider, FetchRequest};
pub use session::SessionWindow;
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooChartProvider;
