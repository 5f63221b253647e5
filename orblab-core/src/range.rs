//! Range calculator — derives the day's reference range from early bars.

use crate::domain::{Bar, Direction};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// How the day's reference range is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangePolicy {
    /// High/low of the day's first bar.
    FirstBar,

    /// Max high / min low over bars whose clock time falls in
    /// `[start, end]`, both ends inclusive.
    FixedWindow { start: NaiveTime, end: NaiveTime },

    /// Fixed-window range, then an extension scan over later bars: a wick
    /// beyond the range whose close stays inside extends it; the first close
    /// strictly beyond the range is the breakout and freezes it.
    ConfirmedBreakout { start: NaiveTime, end: NaiveTime },
}

/// The day's reference high/low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRange {
    pub high: f64,
    pub low: f64,
}

impl DailyRange {
    pub fn size(&self) -> f64 {
        self.high - self.low
    }
}

/// Breakout found by the confirmed-breakout scan.
///
/// `confirmation_index` is the first later bar closing beyond the breakout
/// bar's extreme; entry is taken from that bar. `None` means the breakout was
/// never confirmed and the day produces no signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakout {
    pub direction: Direction,
    pub breakout_index: usize,
    pub confirmation_index: Option<usize>,
}

/// Range computation output: the (possibly extended) range, the inclusive
/// bar-index bounds of the range window, and the breakout when the policy
/// scans for one.
#[derive(Debug, Clone, Copy)]
pub struct RangeResult {
    pub range: DailyRange,
    pub window_start: usize,
    pub window_end: usize,
    pub breakout: Option<Breakout>,
}

impl RangeResult {
    /// Index of the bar the forward trade scan starts after: the confirmation
    /// bar when one exists, otherwise the last bar of the range window.
    pub fn signal_index(&self) -> usize {
        match self.breakout {
            Some(Breakout { confirmation_index: Some(c), .. }) => c,
            _ => self.window_end,
        }
    }
}

impl RangePolicy {
    /// Compute the range for one day's bars. `None` when the window holds no
    /// bars (the day is skipped upstream).
    pub fn compute(&self, bars: &[Bar]) -> Option<RangeResult> {
        match *self {
            RangePolicy::FirstBar => {
                let first = bars.first()?;
                Some(RangeResult {
                    range: DailyRange { high: first.high, low: first.low },
                    window_start: 0,
                    window_end: 0,
                    breakout: None,
                })
            }
            RangePolicy::FixedWindow { start, end } => {
                let (ws, we) = window_bounds(bars, start, end)?;
                Some(RangeResult {
                    range: window_range(&bars[ws..=we]),
                    window_start: ws,
                    window_end: we,
                    breakout: None,
                })
            }
            RangePolicy::ConfirmedBreakout { start, end } => {
                let (ws, we) = window_bounds(bars, start, end)?;
                let mut range = window_range(&bars[ws..=we]);
                let breakout = scan_breakout(bars, we + 1, &mut range);
                Some(RangeResult {
                    range,
                    window_start: ws,
                    window_end: we,
                    breakout,
                })
            }
        }
    }
}

/// Inclusive index bounds of the bars whose clock time lies in `[start, end]`.
fn window_bounds(bars: &[Bar], start: NaiveTime, end: NaiveTime) -> Option<(usize, usize)> {
    let mut first = None;
    let mut last = None;
    for (i, bar) in bars.iter().enumerate() {
        let t = bar.time();
        if t >= start && t <= end {
            if first.is_none() {
                first = Some(i);
            }
            last = Some(i);
        }
    }
    Some((first?, last?))
}

fn window_range(bars: &[Bar]) -> DailyRange {
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    for bar in bars {
        high = high.max(bar.high);
        low = low.min(bar.low);
    }
    DailyRange { high, low }
}

/// Extension-then-breakout scan starting at `from`.
///
/// A wick past the range whose close stays at or inside the boundary widens
/// the range and the scan continues. The first close strictly beyond the
/// boundary is the breakout bar; it fixes direction and the range stops
/// moving. The confirmation bar is the first later close beyond the breakout
/// bar's extreme.
fn scan_breakout(bars: &[Bar], from: usize, range: &mut DailyRange) -> Option<Breakout> {
    let mut breakout: Option<(Direction, usize)> = None;

    for (i, bar) in bars.iter().enumerate().skip(from) {
        if bar.high > range.high && bar.close <= range.high {
            range.high = bar.high;
            continue;
        }
        if bar.low < range.low && bar.close >= range.low {
            range.low = bar.low;
            continue;
        }
        if bar.close > range.high {
            breakout = Some((Direction::Long, i));
            break;
        }
        if bar.close < range.low {
            breakout = Some((Direction::Short, i));
            break;
        }
    }

    let (direction, breakout_index) = breakout?;
    let reference = &bars[breakout_index];
    let confirmation_index = bars
        .iter()
        .enumerate()
        .skip(breakout_index + 1)
        .find(|(_, bar)| match direction {
            Direction::Long => bar.close > reference.high,
            Direction::Short => bar.close < reference.low,
        })
        .map(|(i, _)| i);

    Some(Breakout { direction, breakout_index, confirmation_index })
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn first_bar_range() {
        let bars = vec![bar(0, 100.0, 102.0, 99.0, 101.0), bar(5, 101.0, 104.0, 100.0, 103.0)];
        let result = RangePolicy::FirstBar.compute(&bars).unwrap();
        assert_eq!(result.range, DailyRange { high: 102.0, low: 99.0 });
        assert_eq!(result.signal_index(), 0);
    }

    #[test]
    fn fixed_window_is_inclusive_on_both_ends() {
        let bars = vec![
            bar(0, 100.0, 102.0, 99.0, 101.0),  // 09:30
            bar(15, 101.0, 105.0, 98.0, 103.0), // 09:45
            bar(30, 103.0, 104.0, 101.0, 102.0), // 10:00
            bar(45, 102.0, 110.0, 90.0, 105.0), // 10:15 — outside window
        ];
        let policy = RangePolicy::FixedWindow { start: t(9, 30), end: t(10, 0) };
        let result = policy.compute(&bars).unwrap();
        assert_eq!(result.range, DailyRange { high: 105.0, low: 98.0 });
        assert_eq!(result.window_start, 0);
        assert_eq!(result.window_end, 2);
        assert_eq!(result.signal_index(), 2);
    }

    #[test]
    fn empty_window_yields_none() {
        let bars = vec![bar(120, 100.0, 101.0, 99.0, 100.5)]; // 11:30
        let policy = RangePolicy::FixedWindow { start: t(9, 30), end: t(10, 0) };
        assert!(policy.compute(&bars).is_none());
    }

    #[test]
    fn extensions_accumulate_then_breakout_locks_range() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0), // window: range 98..102
            // wick above, close back inside: extends high to 103
            bar(5, 101.0, 103.0, 100.0, 101.5),
            // wick below, close back inside: extends low to 97
            bar(10, 101.0, 102.0, 97.0, 99.0),
            // closes beyond the extended high: breakout LONG
            bar(15, 102.0, 104.5, 101.0, 103.5),
            // would extend, but range is locked after the breakout
            bar(20, 103.0, 106.0, 95.0, 104.0),
        ];
        let policy = RangePolicy::ConfirmedBreakout { start: t(9, 30), end: t(9, 30) };
        let result = policy.compute(&bars).unwrap();

        // Union of the window and both extension wicks.
        assert_eq!(result.range, DailyRange { high: 103.0, low: 97.0 });

        let breakout = result.breakout.unwrap();
        assert_eq!(breakout.direction, Direction::Long);
        assert_eq!(breakout.breakout_index, 3);
        // Bar 4 closes at 104.0, below the breakout bar's high (104.5), so
        // the breakout is never confirmed.
        assert_eq!(breakout.confirmation_index, None);
    }

    #[test]
    fn close_exactly_on_edge_extends_rather_than_breaks() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0),
            // high pierces, close lands exactly on the old high: extension
            bar(5, 101.0, 104.0, 100.0, 102.0),
            bar(10, 102.0, 103.0, 101.0, 102.5),
        ];
        let policy = RangePolicy::ConfirmedBreakout { start: t(9, 30), end: t(9, 30) };
        let result = policy.compute(&bars).unwrap();
        assert_eq!(result.range.high, 104.0);
        assert!(result.breakout.is_none());
    }

    #[test]
    fn breakout_confirmation_found() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0),
            bar(5, 101.0, 103.5, 100.5, 103.0), // close > 102: breakout LONG
            bar(10, 103.0, 103.4, 102.0, 103.2), // close below breakout high
            bar(15, 103.2, 104.5, 103.0, 104.0), // close > 103.5: confirmation
        ];
        let policy = RangePolicy::ConfirmedBreakout { start: t(9, 30), end: t(9, 30) };
        let result = policy.compute(&bars).unwrap();
        let breakout = result.breakout.unwrap();
        assert_eq!(breakout.direction, Direction::Long);
        assert_eq!(breakout.breakout_index, 1);
        assert_eq!(breakout.confirmation_index, Some(3));
        assert_eq!(result.signal_index(), 3);
    }

    #[test]
    fn short_breakout_direction() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0),
            bar(5, 99.0, 100.0, 96.5, 97.0), // close < 98: breakout SHORT
            bar(10, 97.0, 97.5, 95.0, 96.0), // close < breakout low: confirmation
        ];
        let policy = RangePolicy::ConfirmedBreakout { start: t(9, 30), end: t(9, 30) };
        let result = policy.compute(&bars).unwrap();
        let breakout = result.breakout.unwrap();
        assert_eq!(breakout.direction, Direction::Short);
        assert_eq!(breakout.confirmation_index, Some(2));
    }
}
