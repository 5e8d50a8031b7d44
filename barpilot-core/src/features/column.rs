//! Derived feature column identifiers.

use serde::{Deserialize, Serialize};

/// Every derived column the feature builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureColumn {
    #[serde(rename = "ret_1")]
    Ret1,
    #[serde(rename = "ret_5")]
    Ret5,
    #[serde(rename = "ret_20")]
    Ret20,
    #[serde(rename = "ma_10")]
    Ma10,
    #[serde(rename = "ma_20")]
    Ma20,
    #[serde(rename = "ma_ratio_10")]
    MaRatio10,
    #[serde(rename = "ma_ratio_20")]
    MaRatio20,
    #[serde(rename = "rsi_14")]
    Rsi14,
    #[serde(rename = "macd")]
    Macd,
    #[serde(rename = "macd_sig")]
    MacdSig,
    #[serde(rename = "macd_diff")]
    MacdDiff,
    #[serde(rename = "atr")]
    Atr,
    #[serde(rename = "vol_z")]
    VolZ,
}

/// The eleven features the policy is trained on, in observation order.
/// These are the robust-scaled columns.
pub const MODEL_FEATURES: [FeatureColumn; 11] = [
    FeatureColumn::Ret1,
    FeatureColumn::Ret5,
    FeatureColumn::Ret20,
    FeatureColumn::MaRatio10,
    FeatureColumn::MaRatio20,
    FeatureColumn::Rsi14,
    FeatureColumn::Macd,
    FeatureColumn::MacdSig,
    FeatureColumn::MacdDiff,
    FeatureColumn::Atr,
    FeatureColumn::VolZ,
];

impl FeatureColumn {
    /// All derived columns, in table order.
    pub const ALL: [FeatureColumn; 13] = [
        FeatureColumn::Ret1,
        FeatureColumn::Ret5,
        FeatureColumn::Ret20,
        FeatureColumn::Ma10,
        FeatureColumn::Ma20,
        FeatureColumn::MaRatio10,
        FeatureColumn::MaRatio20,
        FeatureColumn::Rsi14,
        FeatureColumn::Macd,
        FeatureColumn::MacdSig,
        FeatureColumn::MacdDiff,
        FeatureColumn::Atr,
        FeatureColumn::VolZ,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Ret1 => "ret_1",
            FeatureColumn::Ret5 => "ret_5",
            FeatureColumn::Ret20 => "ret_20",
            FeatureColumn::Ma10 => "ma_10",
            FeatureColumn::Ma20 => "ma_20",
            FeatureColumn::MaRatio10 => "ma_ratio_10",
            FeatureColumn::MaRatio20 => "ma_ratio_20",
            FeatureColumn::Rsi14 => "rsi_14",
            FeatureColumn::Macd => "macd",
            FeatureColumn::MacdSig => "macd_sig",
            FeatureColumn::MacdDiff => "macd_diff",
            FeatureColumn::Atr => "atr",
            FeatureColumn::VolZ => "vol_z",
        }
    }

    pub fn is_model_feature(self) -> bool {
        MODEL_FEATURES.contains(&self)
    }
}

impl std::fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FeatureColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown feature column '{s}'"))
    }
}
