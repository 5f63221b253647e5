//! Signal generator — trade direction, entry trigger, and protective stop.

use crate::domain::series::TradingDay;
use crate::domain::{Bar, Direction, Instrument};
use crate::range::RangeResult;
use serde::{Deserialize, Serialize};

/// How direction and entry are derived from the day's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalPolicy {
    /// Opening bar's candle body: bullish ⇒ long, bearish ⇒ short, doji ⇒
    /// no signal. Entry at the range edge in the candle's direction.
    DirectionalCandle,

    /// Window's first-bar open against its last-bar close; ties go short.
    /// Entry at the range edge in the bias direction.
    WindowBias,

    /// Direction fixed by the range calculator's confirmed breakout; entry at
    /// the confirmation bar's extreme.
    ConfirmedBreakout,
}

/// One day's trade signal. Direction is never revised after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    /// Index of the signal bar within the day; the trade scan starts on the
    /// bar after it.
    pub signal_index: usize,
}

/// Momentum confirmation by opening volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeFilter {
    /// Minimum acceptable relative volume; below it the day is skipped.
    pub threshold: f64,
    /// Trailing window of prior distinct trading days for the average.
    pub lookback_days: usize,
}

impl Default for VolumeFilter {
    fn default() -> Self {
        Self { threshold: 1.0, lookback_days: 14 }
    }
}

impl SignalPolicy {
    /// Derive the day's signal, or `None` when the day carries no directional
    /// information (doji open, unbroken range, unconfirmed breakout).
    ///
    /// The stop sits `atr * stop_atr_multiple` beyond the entry against the
    /// trade, snapped away from entry on the instrument's tick grid.
    pub fn generate(
        &self,
        bars: &[Bar],
        range: &RangeResult,
        atr: f64,
        stop_atr_multiple: f64,
        instrument: &Instrument,
    ) -> Option<Signal> {
        let offset = atr * stop_atr_multiple;

        let (direction, entry_price, signal_index) = match *self {
            SignalPolicy::DirectionalCandle => {
                let first = bars.first()?;
                let direction = if first.is_bullish() {
                    Direction::Long
                } else if first.is_bearish() {
                    Direction::Short
                } else {
                    return None;
                };
                (direction, entry_at_range_edge(direction, range), range.signal_index())
            }
            SignalPolicy::WindowBias => {
                let first = bars.get(range.window_start)?;
                let last = bars.get(range.window_end)?;
                let direction = if first.open < last.close {
                    Direction::Long
                } else {
                    Direction::Short
                };
                (direction, entry_at_range_edge(direction, range), range.signal_index())
            }
            SignalPolicy::ConfirmedBreakout => {
                let breakout = range.breakout?;
                let index = breakout.confirmation_index?;
                let confirmation = bars.get(index)?;
                let entry = match breakout.direction {
                    Direction::Long => confirmation.high,
                    Direction::Short => confirmation.low,
                };
                (breakout.direction, entry, index)
            }
        };

        let raw_stop = entry_price - direction.sign() * offset;
        let stop_loss = instrument.quantize_stop(direction, raw_stop);

        Some(Signal { direction, entry_price, stop_loss, signal_index })
    }
}

fn entry_at_range_edge(direction: Direction, range: &RangeResult) -> f64 {
    match direction {
        Direction::Long => range.range.high,
        Direction::Short => range.range.low,
    }
}

/// Opening-bar volume relative to its trailing average.
///
/// The average covers the first-bar volumes of the last `lookback_days` of
/// `prior_days` (which hold only days strictly before the target day). A
/// missing or zero average yields 0.0, which fails any positive threshold.
pub fn relative_volume(first_bar_volume: f64, prior_days: &[TradingDay<'_>], lookback_days: usize) -> f64 {
    let start = prior_days.len().saturating_sub(lookback_days);
    let window = &prior_days[start..];

    let mut sum = 0.0;
    let mut count = 0usize;
    for day in window {
        if let Some(first) = day.bars.first() {
            sum += first.volume;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    if mean == 0.0 || mean.is_nan() {
        return 0.0;
    }
    first_bar_volume / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BarSeries;
    use crate::range::RangePolicy;
    use chrono::NaiveDate;

    fn bar(min: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
                + chrono::Duration::minutes(min as i64),
            open,
            high,
            low,
            close,
            volume: 1_000.0,
            vwap: None,
        }
    }

    fn first_bar_range(bars: &[Bar]) -> RangeResult {
        RangePolicy::FirstBar.compute(bars).unwrap()
    }

    #[test]
    fn bullish_open_goes_long_at_range_high() {
        let bars = vec![bar(0, 100.0, 102.0, 99.0, 101.0), bar(5, 101.0, 103.0, 100.0, 102.0)];
        let range = first_bar_range(&bars);
        let signal = SignalPolicy::DirectionalCandle
            .generate(&bars, &range, 5.0, 0.1, &Instrument::equity("QQQ"))
            .unwrap();

        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.entry_price, 102.0);
        assert!((signal.stop_loss - 101.5).abs() < 1e-12);
        assert_eq!(signal.signal_index, 0);
    }

    #[test]
    fn bearish_open_goes_short_at_range_low() {
        let bars = vec![bar(0, 101.0, 102.0, 99.0, 100.0)];
        let range = first_bar_range(&bars);
        let signal = SignalPolicy::DirectionalCandle
            .generate(&bars, &range, 5.0, 0.1, &Instrument::equity("QQQ"))
            .unwrap();

        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.entry_price, 99.0);
        assert!((signal.stop_loss - 99.5).abs() < 1e-12);
    }

    #[test]
    fn doji_open_yields_no_signal() {
        let bars = vec![bar(0, 100.0, 102.0, 99.0, 100.0)];
        let range = first_bar_range(&bars);
        let signal = SignalPolicy::DirectionalCandle.generate(
            &bars,
            &range,
            5.0,
            0.1,
            &Instrument::equity("QQQ"),
        );
        assert!(signal.is_none());
    }

    #[test]
    fn window_bias_tie_goes_short() {
        let bars = vec![bar(0, 100.0, 102.0, 99.0, 101.0), bar(5, 101.0, 103.0, 98.0, 100.0)];
        let policy = RangePolicy::FixedWindow {
            start: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            end: chrono::NaiveTime::from_hms_opt(9, 35, 0).unwrap(),
        };
        let range = policy.compute(&bars).unwrap();

        // first open 100.0 == last close 100.0 ⇒ short
        let signal = SignalPolicy::WindowBias
            .generate(&bars, &range, 5.0, 0.1, &Instrument::equity("QQQ"))
            .unwrap();
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.entry_price, 98.0);
        assert_eq!(signal.signal_index, 1);
    }

    #[test]
    fn futures_stop_snaps_away_from_entry() {
        let bars = vec![bar(0, 18_200.0, 18_250.0, 18_190.0, 18_240.0)];
        let range = first_bar_range(&bars);
        let mnq = Instrument::future("MNQ", 2.0, 0.25);
        // atr 3.3 → raw stop 18_250 - 0.33 = 18_249.67 → floor to 18_249.50
        let signal = SignalPolicy::DirectionalCandle
            .generate(&bars, &range, 3.3, 0.1, &mnq)
            .unwrap();
        assert!((signal.stop_loss - 18_249.50).abs() < 1e-9);
    }

    #[test]
    fn relative_volume_against_trailing_mean() {
        let day = |d: u32, volume: f64| {
            vec![Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 6, d)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume,
                vwap: None,
            }]
        };
        let mut bars = Vec::new();
        bars.extend(day(3, 1_000.0));
        bars.extend(day(4, 2_000.0));
        bars.extend(day(5, 3_000.0));
        let series = BarSeries::from_bars(bars).unwrap();

        let prior = series.prior_days(3, 14);
        // mean(1000, 2000, 3000) = 2000
        assert!((relative_volume(4_000.0, &prior, 14) - 2.0).abs() < 1e-12);
        assert!((relative_volume(1_000.0, &prior, 2) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn relative_volume_zero_mean_is_zero() {
        assert_eq!(relative_volume(5_000.0, &[], 14), 0.0);
    }
}
