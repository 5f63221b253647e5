//! Live per-day session — the decision half of the trading bot.
//!
//! The session owns everything the bot used to keep in process-wide state:
//! the current day, the strategy, and whether a trade has been requested.
//! Poll-loop plumbing (broker connection, reconnects, order placement) stays
//! outside; the session only turns bars and equity into one bracket-order
//! intent per day.

use crate::atr::{aggregate_day, average_true_range};
use crate::domain::{Bar, BarSeries, Direction, Instrument};
use crate::signal::relative_volume;
use crate::simulator::ExitPolicy;
use crate::strategy::StrategyConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A bracket-order request: everything a broker layer needs to place the
/// entry stop with its protective stop and optional take-profit limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: Option<f64>,
    pub size: u64,
}

/// One trading day's decision state. Create a fresh session every day.
#[derive(Debug, Clone)]
pub struct DaySession {
    strategy: StrategyConfig,
    instrument: Instrument,
    day: NaiveDate,
    issued: bool,
}

impl DaySession {
    pub fn new(day: NaiveDate, strategy: StrategyConfig, instrument: Instrument) -> Self {
        Self { strategy, instrument, day, issued: false }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// True once an intent has been handed out; the session is then spent.
    pub fn intent_issued(&self) -> bool {
        self.issued
    }

    /// Evaluate the day so far and produce at most one trade intent.
    ///
    /// `history` holds complete prior sessions; `today` the bars seen so far
    /// this session, oldest first; `equity` the live account equity. Returns
    /// `None` while the range window is still forming, when the day carries
    /// no signal, or after an intent has already been issued.
    pub fn poll(&mut self, history: &BarSeries, today: &[Bar], equity: f64) -> Option<TradeIntent> {
        if self.issued {
            return None;
        }
        if today.iter().any(|bar| bar.trading_day() != self.day) {
            return None;
        }
        if !self.window_complete(today) {
            return None;
        }

        let strategy = &self.strategy;
        let day_count = history.day_count();
        if day_count < strategy.atr_period {
            return None;
        }

        let range = strategy.range.compute(today)?;

        let prior = history.prior_days(day_count, strategy.atr_period);
        let aggregates: Vec<_> = prior.iter().filter_map(aggregate_day).collect();
        let atr = average_true_range(&aggregates, strategy.atr_period).ok()?;

        let signal = strategy.signal.generate(
            today,
            &range,
            atr,
            strategy.stop_atr_multiple,
            &self.instrument,
        )?;

        if let Some(filter) = strategy.volume_filter {
            let first = today.first()?;
            let lookback = history.prior_days(day_count, filter.lookback_days);
            if relative_volume(first.volume, &lookback, filter.lookback_days) < filter.threshold {
                return None;
            }
        }

        let decision = strategy.sizer.position_size(
            signal.entry_price,
            signal.stop_loss,
            equity,
            self.instrument.point_value,
        );
        if decision.size == 0 {
            return None;
        }

        let risk = (signal.entry_price - signal.stop_loss).abs();
        let take_profit = match &strategy.exit {
            ExitPolicy::StopOnly => None,
            ExitPolicy::StopTakeProfit { take_profit }
            | ExitPolicy::StopTakeProfitTrailing { take_profit } => Some(take_profit.level(
                signal.direction,
                signal.entry_price,
                risk,
                &range.range,
            )),
        };

        self.issued = true;
        Some(TradeIntent {
            direction: signal.direction,
            entry_price: signal.entry_price,
            stop_loss: signal.stop_loss,
            take_profit,
            size: decision.size,
        })
    }

    /// The range window must be fully formed before a signal can exist:
    /// window-based policies wait for a bar past the window end, the
    /// first-bar policy for a second bar (the first must have closed).
    fn window_complete(&self, today: &[Bar]) -> bool {
        use crate::range::RangePolicy;
        match self.strategy.range {
            RangePolicy::FirstBar => today.len() >= 2,
            RangePolicy::FixedWindow { end, .. } | RangePolicy::ConfirmedBreakout { end, .. } => {
                today.last().is_some_and(|bar| bar.time() > end)
            }
        }
    }
}
