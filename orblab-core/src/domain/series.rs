//! BarSeries — an ordered bar sequence grouped into trading days.

use super::bar::Bar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bar series is empty")]
    Empty,

    #[error("bars out of order at index {index}: {current} follows {previous}")]
    OutOfOrder {
        index: usize,
        previous: chrono::NaiveDateTime,
        current: chrono::NaiveDateTime,
    },
}

/// Half-open index span of one trading day within the flat bar vector.
#[derive(Debug, Clone, Copy)]
struct DaySpan {
    day: NaiveDate,
    start: usize,
    end: usize,
}

/// A single trading day's bars, borrowed from the series.
#[derive(Debug, Clone, Copy)]
pub struct TradingDay<'a> {
    pub day: NaiveDate,
    pub bars: &'a [Bar],
}

/// Immutable, timestamp-sorted bar series with per-day grouping.
///
/// Built once per run; the engine only ever reads from it. Day boundaries are
/// derived from each bar's timestamp, so a series spanning multiple sessions
/// groups itself without any external calendar.
#[derive(Debug, Clone)]
pub struct BarSeries {
    bars: Vec<Bar>,
    spans: Vec<DaySpan>,
}

impl BarSeries {
    /// Build a series from bars already sorted by timestamp.
    ///
    /// Rejects empty input and non-ascending timestamps. Equal timestamps are
    /// rejected too: duplicate bars would double-count in range and volume
    /// calculations.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for i in 1..bars.len() {
            if bars[i].timestamp <= bars[i - 1].timestamp {
                return Err(SeriesError::OutOfOrder {
                    index: i,
                    previous: bars[i - 1].timestamp,
                    current: bars[i].timestamp,
                });
            }
        }

        let mut spans: Vec<DaySpan> = Vec::new();
        for (i, bar) in bars.iter().enumerate() {
            let day = bar.trading_day();
            match spans.last_mut() {
                Some(span) if span.day == day => span.end = i + 1,
                _ => spans.push(DaySpan { day, start: i, end: i + 1 }),
            }
        }

        Ok(Self { bars, spans })
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn day_count(&self) -> usize {
        self.spans.len()
    }

    /// The bars of the day at `index` (chronological day order).
    pub fn day(&self, index: usize) -> TradingDay<'_> {
        let span = self.spans[index];
        TradingDay {
            day: span.day,
            bars: &self.bars[span.start..span.end],
        }
    }

    /// Iterate trading days in chronological order.
    pub fn days(&self) -> impl Iterator<Item = TradingDay<'_>> + '_ {
        (0..self.spans.len()).map(move |i| self.day(i))
    }

    /// The last `n` distinct trading days strictly before the day at `index`.
    ///
    /// Returns fewer than `n` days when the history is short; callers that
    /// need an exact count check the length.
    pub fn prior_days(&self, index: usize, n: usize) -> Vec<TradingDay<'_>> {
        let start = index.saturating_sub(n);
        (start..index).map(|i| self.day(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar_at(day: u32, hour: u32, min: u32) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(hour, min, 0)
                .unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 1_000.0,
            vwap: None,
        }
    }

    #[test]
    fn groups_bars_by_day() {
        let series = BarSeries::from_bars(vec![
            bar_at(4, 9, 30),
            bar_at(4, 9, 35),
            bar_at(5, 9, 30),
            bar_at(6, 9, 30),
            bar_at(6, 9, 35),
            bar_at(6, 9, 40),
        ])
        .unwrap();

        assert_eq!(series.day_count(), 3);
        assert_eq!(series.bar_count(), 6);
        assert_eq!(series.day(0).bars.len(), 2);
        assert_eq!(series.day(1).bars.len(), 1);
        assert_eq!(series.day(2).bars.len(), 3);
        assert_eq!(series.day(2).day, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(BarSeries::from_bars(vec![]), Err(SeriesError::Empty)));
    }

    #[test]
    fn rejects_out_of_order() {
        let result = BarSeries::from_bars(vec![bar_at(5, 9, 30), bar_at(4, 9, 30)]);
        assert!(matches!(result, Err(SeriesError::OutOfOrder { index: 1, .. })));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let result = BarSeries::from_bars(vec![bar_at(5, 9, 30), bar_at(5, 9, 30)]);
        assert!(result.is_err());
    }

    #[test]
    fn prior_days_takes_most_recent() {
        let series = BarSeries::from_bars(vec![
            bar_at(4, 9, 30),
            bar_at(5, 9, 30),
            bar_at(6, 9, 30),
            bar_at(7, 9, 30),
        ])
        .unwrap();

        let prior = series.prior_days(3, 2);
        assert_eq!(prior.len(), 2);
        assert_eq!(prior[0].day, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(prior[1].day, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());

        // Short history yields what exists, not an error.
        assert_eq!(series.prior_days(1, 14).len(), 1);
        assert!(series.prior_days(0, 14).is_empty());
    }
}
