//! Bar — the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Intraday OHLCV bar in exchange-local time.
///
/// The trading-day key is derived from the timestamp, never stored. The
/// `vwap` column is present only in datasets prepared for VWAP-trailing
/// strategies; all other calculations ignore it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub vwap: Option<f64>,
}

impl Bar {
    /// Calendar trading day this bar belongs to.
    pub fn trading_day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Clock time of the bar, for session-window filtering.
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Basic OHLC sanity check: high is the top of the bar, low the bottom,
    /// prices are positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Open equals close: no directional information.
    pub fn is_doji(&self) -> bool {
        self.close == self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
            vwap: None,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn trading_day_derived_from_timestamp() {
        let bar = sample_bar();
        assert_eq!(bar.trading_day(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bar.time(), chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn candle_direction() {
        let mut bar = sample_bar();
        assert!(bar.is_bullish());
        bar.close = 99.0;
        assert!(bar.is_bearish());
        bar.close = bar.open;
        assert!(bar.is_doji());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.timestamp, deser.timestamp);
        assert_eq!(bar.close, deser.close);
        assert_eq!(bar.vwap, deser.vwap);
    }
}
