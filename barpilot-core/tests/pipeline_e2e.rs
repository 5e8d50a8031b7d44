//! End-to-end pipeline tests: raw provider frame → normalized bars →
//! features → observation.

use barpilot_core::data::{
    BarInterval, BarNormalizer, ColumnLabel, DataProvider, FetchRequest, RawColumn, RawFrame,
    SessionWindow, SyntheticProvider, TimeIndex,
};
use barpilot_core::domain::OhlcvField;
use barpilot_core::features::{add_features, FeatureBuilder, FeatureColumn, MODEL_FEATURES};
use barpilot_core::{build_obs, PipelineConfig};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::America::New_York;

/// Two-level frame as a multi-symbol download returns it: (field, symbol)
/// labels plus an extra adjusted-close column, UTC timestamps.
fn two_level_frame(closes: &[f64], volume: f64) -> RawFrame {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
    let index = (0..closes.len())
        .map(|i| (start + Duration::minutes(5 * i as i64)).fixed_offset())
        .collect();
    let column = |field: &str, values: Vec<f64>| RawColumn::dense(ColumnLabel::pair(field, "SPY"), values);
    RawFrame::new(
        TimeIndex::Aware(index),
        vec![
            column("Adj Close", closes.to_vec()),
            column("Close", closes.to_vec()),
            column("High", closes.iter().map(|c| c + 0.5).collect()),
            column("Low", closes.iter().map(|c| c - 0.5).collect()),
            column("Open", closes.to_vec()),
            column("Volume", vec![volume; closes.len()]),
        ],
    )
    .unwrap()
}

#[test]
fn two_level_labels_resolve_to_present_canonical_columns() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let bars = BarNormalizer::new(New_York)
        .normalize(&two_level_frame(&closes, 1000.0), "SPY")
        .unwrap();
    assert_eq!(bars.fields().collect::<Vec<_>>(), OhlcvField::CANONICAL.to_vec());
    assert_eq!(bars.len(), 10);
    // 14:30 UTC is 09:30 EST
    assert_eq!(bars.timestamps()[0].hour(), 9);
    assert_eq!(bars.timestamps()[0].minute(), 30);
}

#[test]
fn monotonic_closes_with_constant_volume() {
    let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
    let bars = BarNormalizer::new(New_York)
        .normalize(&two_level_frame(&closes, 1000.0), "SPY")
        .unwrap();
    assert_eq!(bars.len(), 100);

    let features = FeatureBuilder::default().build_unscaled(&bars).unwrap();
    assert_eq!(features.len(), 51);

    // The trailing average lags rising prices, so the ratio stays above 1 and
    // shrinks toward it as prices grow relative to the fixed lag.
    let ratio = features.column(FeatureColumn::MaRatio10).unwrap();
    assert!(ratio.iter().all(|&r| r > 1.0));
    assert!(ratio.windows(2).all(|w| w[1] < w[0]));

    let rsi = features.column(FeatureColumn::Rsi14).unwrap();
    assert!(rsi.iter().all(|&v| (v - 100.0).abs() < 1e-9));

    let diff = features.column(FeatureColumn::MacdDiff).unwrap();
    assert!(diff.iter().all(|v| v.is_finite()));

    let vol_z = features.column(FeatureColumn::VolZ).unwrap();
    assert!(vol_z.iter().all(|&v| v == 0.0));
}

#[test]
fn session_filter_keeps_only_regular_hours() {
    // 09:30 through 10:30 local, 13 bars
    let closes: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
    let config = PipelineConfig::default();
    let bars = BarNormalizer::from_config(&config)
        .normalize(&two_level_frame(&closes, 1000.0), "SPY")
        .unwrap();
    // 09:30 is before the 09:35 session start
    assert_eq!(bars.len(), 12);
    assert_eq!(bars.timestamps()[0].minute(), 35);
}

#[test]
fn synthetic_provider_feeds_a_full_observation() {
    let config = PipelineConfig::default();
    let provider = SyntheticProvider::new(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), New_York);
    let frame = provider
        .fetch(&FetchRequest::new("SPY", 3, BarInterval::FiveMinutes))
        .unwrap();

    let bars = BarNormalizer::new(config.timezone)
        .with_session(SessionWindow::default())
        .normalize(&frame, "SPY")
        .unwrap();
    // 09:35 through 15:55 on three days
    assert_eq!(bars.len(), 3 * 77);

    let features = add_features(&bars).unwrap();
    let obs = build_obs(&features, config.window, &config.features).unwrap();
    assert_eq!(obs.len(), config.observation_len());
    assert!(obs.values.iter().all(|v| v.is_finite()));
    assert_eq!(obs.last_timestamp, *bars.timestamps().last().unwrap());
    assert_eq!(obs.columns, MODEL_FEATURES.to_vec());
}
