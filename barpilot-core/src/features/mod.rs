//! Feature engineering: derived columns, warm-up trimming and robust scaling.

pub mod builder;
pub mod column;
pub mod scaling;
pub mod table;

pub use builder::{add_features, BuildSummary, FeatureBuilder, FeatureError, ScaledFeatures};
pub use column::{FeatureColumn, MODEL_FEATURES};
pub use scaling::{quantile, RobustScaler, ScalingStats};
pub use table::FeatureTable;
