//! Average True Range over daily aggregates of intraday bars.

use crate::domain::series::TradingDay;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lookback: the 14 most recent distinct trading days.
pub const DEFAULT_ATR_PERIOD: usize = 14;

#[derive(Debug, Error, PartialEq)]
pub enum AtrError {
    /// The lookback must hold exactly `expected` distinct trading days.
    /// Partial windows are rejected rather than silently averaged.
    #[error("expected exactly {expected} distinct trading days, got {got}")]
    WrongDayCount { expected: usize, got: usize },
}

/// One trading day collapsed to its daily OHLC aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Collapse one day's bars: high = max, low = min, close = last.
pub fn aggregate_day(day: &TradingDay<'_>) -> Option<DailyAggregate> {
    let last = day.bars.last()?;
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    for bar in day.bars {
        high = high.max(bar.high);
        low = low.min(bar.low);
    }
    Some(DailyAggregate { day: day.day, high, low, close: last.close })
}

/// Arithmetic-mean ATR over exactly `period` daily aggregates, sorted
/// ascending by day.
///
/// True Range per day: max(high−low, |high−prev_close|, |low−prev_close|).
/// The first day of the window has no previous close, so its true range
/// degenerates to high−low.
pub fn average_true_range(days: &[DailyAggregate], period: usize) -> Result<f64, AtrError> {
    if days.len() != period {
        return Err(AtrError::WrongDayCount { expected: period, got: days.len() });
    }

    let mut sum = 0.0;
    let mut prev_close: Option<f64> = None;
    for day in days {
        let hl = day.high - day.low;
        let tr = match prev_close {
            Some(pc) => hl.max((day.high - pc).abs()).max((day.low - pc).abs()),
            None => hl,
        };
        sum += tr;
        prev_close = Some(day.close);
    }

    Ok(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, BarSeries};
    use chrono::NaiveDate;

    fn agg(day: u32, high: f64, low: f64, close: f64) -> DailyAggregate {
        DailyAggregate {
            day: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            high,
            low,
            close,
        }
    }

    #[test]
    fn exact_day_count_enforced() {
        let days: Vec<_> = (1..=13).map(|d| agg(d, 101.0, 99.0, 100.0)).collect();
        assert_eq!(
            average_true_range(&days, 14),
            Err(AtrError::WrongDayCount { expected: 14, got: 13 })
        );

        let days: Vec<_> = (1..=15).map(|d| agg(d, 101.0, 99.0, 100.0)).collect();
        assert_eq!(
            average_true_range(&days, 14),
            Err(AtrError::WrongDayCount { expected: 14, got: 15 })
        );
    }

    #[test]
    fn first_day_uses_high_minus_low() {
        // Day 1: TR = 10 (no previous close).
        // Day 2: TR = max(8, |108-102|, |100-102|) = 8.
        // Day 3: TR = max(9, |107-106|, |98-106|) = 9.
        let days = vec![
            agg(1, 105.0, 95.0, 102.0),
            agg(2, 108.0, 100.0, 106.0),
            agg(3, 107.0, 98.0, 99.0),
        ];
        let atr = average_true_range(&days, 3).unwrap();
        assert!((atr - 27.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn gap_day_uses_previous_close_distance() {
        // Gap up: previous close 100, next day trades 108-115.
        let days = vec![agg(1, 102.0, 97.0, 100.0), agg(2, 115.0, 108.0, 112.0)];
        let atr = average_true_range(&days, 2).unwrap();
        // TR[0] = 5, TR[1] = max(7, 15, 8) = 15.
        assert!((atr - 10.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_collapses_a_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        let mk = |min: u32, high: f64, low: f64, close: f64| Bar {
            timestamp: day.and_hms_opt(9, 30 + min, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 100.0,
            vwap: None,
        };
        let series = BarSeries::from_bars(vec![
            mk(0, 102.0, 99.0, 100.0),
            mk(5, 104.0, 100.0, 103.0),
            mk(10, 103.0, 98.0, 101.0),
        ])
        .unwrap();

        let aggregate = aggregate_day(&series.day(0)).unwrap();
        assert_eq!(aggregate.high, 104.0);
        assert_eq!(aggregate.low, 98.0);
        assert_eq!(aggregate.close, 101.0);
        assert_eq!(aggregate.day, day);
    }
}
