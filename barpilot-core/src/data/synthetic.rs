//! Deterministic synthetic bars for offline runs.
//!
//! Produces a random-walk bar series over regular session hours (09:30 to
//! 15:55 local, weekdays only) ending on an anchor date. The RNG is seeded
//! from a BLAKE3 hash of (seed, symbol), so a given symbol always produces the
//! same bars for the same anchor and lookback, independent of call order.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::frame::{ColumnLabel, RawColumn, RawFrame, TimeIndex};
use super::provider::{DataError, DataProvider, FetchRequest};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    anchor: NaiveDate,
    timezone: Tz,
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(anchor: NaiveDate, timezone: Tz) -> Self {
        Self {
            anchor,
            timezone,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sub-seed for a symbol.
    pub fn seed_for(&self, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// The `n` most recent weekdays up to and including the anchor, oldest first.
    fn trading_days(&self, n: u32) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(n as usize);
        let mut day = self.anchor;
        while days.len() < n as usize {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                days.push(day);
            }
            day -= Duration::days(1);
        }
        days.reverse();
        days
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<RawFrame, DataError> {
        let mut rng = StdRng::seed_from_u64(self.seed_for(&request.symbol));
        let step = Duration::minutes(i64::from(request.interval.minutes()));
        let open_time = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default();
        let last_time = NaiveTime::from_hms_opt(15, 55, 0).unwrap_or_default();

        let mut price: f64 = 50.0 + rng.gen_range(0.0..400.0);
        let mut index = Vec::new();
        let mut columns: [Vec<f64>; 5] = Default::default();

        for day in self.trading_days(request.lookback_days) {
            let mut local = day.and_time(open_time);
            while local.time() <= last_time {
                let Some(stamp) = self.timezone.from_local_datetime(&local).single() else {
                    local += step;
                    continue;
                };
                let open = price;
                let close = open * (1.0 + rng.gen_range(-0.002..0.002));
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.001));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.001));
                let volume = rng.gen_range(5_000.0_f64..50_000.0).round();

                index.push(stamp.fixed_offset());
                for (column, value) in columns.iter_mut().zip([open, high, low, close, volume]) {
                    column.push(value);
                }
                price = close;
                local += step;
            }
        }

        let labels = ["Open", "High", "Low", "Close", "Volume"];
        let columns = labels
            .into_iter()
            .zip(columns)
            .map(|(name, values)| RawColumn::dense(ColumnLabel::single(name), values))
            .collect();
        RawFrame::new(TimeIndex::Aware(index), columns)
    }
}
