//! Seeded synthetic intraday data.
//!
//! A developer-facing fallback for demos and integration tests: a random-walk
//! 5-minute session per weekday, with VWAP and volume columns so every
//! strategy variant can run on it. Results produced on synthetic data are
//! tagged by the runner and must not be mistaken for market results.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use orblab_core::domain::{Bar, BarSeries};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub days: usize,
    pub bars_per_day: usize,
    pub bar_minutes: i64,
    pub start_price: f64,
    pub start_day: NaiveDate,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            days: 60,
            bars_per_day: 78, // 09:30–16:00 in 5-minute bars
            bar_minutes: 5,
            start_price: 400.0,
            start_day: NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"),
        }
    }
}

/// Generate a deterministic random-walk series. Weekends are skipped so the
/// day keys look like a real exchange calendar.
pub fn generate_series(config: &SyntheticConfig) -> BarSeries {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut bars = Vec::with_capacity(config.days * config.bars_per_day);
    let mut price = config.start_price;
    let mut day = config.start_day;

    for _ in 0..config.days {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
        }
        let open_ts = day.and_hms_opt(9, 30, 0).expect("valid session open");

        for b in 0..config.bars_per_day {
            let drift: f64 = rng.gen_range(-0.45..0.45);
            let open = price;
            let close = (open + drift * open / 400.0).max(1.0);
            let wick_up: f64 = rng.gen_range(0.0..0.25);
            let wick_down: f64 = rng.gen_range(0.0..0.25);
            let high = open.max(close) + wick_up;
            let low = (open.min(close) - wick_down).max(0.5);
            let volume = rng.gen_range(5_000.0..50_000.0_f64).round();

            bars.push(Bar {
                timestamp: open_ts + Duration::minutes(config.bar_minutes * b as i64),
                open,
                high,
                low,
                close,
                volume,
                vwap: Some(((high + low + close) / 3.0 * 100.0).round() / 100.0),
            });
            price = close;
        }
        day += Duration::days(1);
    }

    BarSeries::from_bars(bars).expect("synthetic bars are generated in order")
}
