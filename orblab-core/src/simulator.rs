//! Trade simulator — single-pass entry/exit state machine for one day.
//!
//! One forward scan over the bars after the signal bar resolves the entry
//! trigger and then the first exit condition. Entry fills at the trigger
//! level (stop-order assumption); the entry bar itself is never examined for
//! exits. Per bar the precedence is fixed: trailing-ratchet update, stop,
//! take-profit — a bar spanning both stop and target resolves as a stop.

use crate::domain::{Bar, Direction, ExitReason, Instrument};
use crate::domain::trade::RR_STOPPED_OUT;
use crate::range::DailyRange;
use crate::signal::Signal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Broker fee model: a flat per-unit commission charged once per trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub commission_per_unit: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self { commission_per_unit: 0.0035 }
    }
}

impl CostModel {
    pub fn commission(&self, size: u64) -> f64 {
        size as f64 * self.commission_per_unit
    }
}

/// Where the take-profit level sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TakeProfitRule {
    /// Entry ± risk × multiple (6 and 10 in the observed configurations).
    RiskMultiple { multiple: f64 },

    /// One range-size beyond the range edge in the trade direction.
    RangeProjection,
}

impl TakeProfitRule {
    /// Resolve the target price for a trade with the given entry and risk.
    pub fn level(&self, direction: Direction, entry: f64, risk: f64, range: &DailyRange) -> f64 {
        match *self {
            TakeProfitRule::RiskMultiple { multiple } => {
                entry + direction.sign() * risk * multiple
            }
            TakeProfitRule::RangeProjection => match direction {
                Direction::Long => range.high + range.size(),
                Direction::Short => range.low - range.size(),
            },
        }
    }
}

/// Which exit conditions the simulator watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitPolicy {
    /// Protective stop only; anything else rides to the end of the day.
    StopOnly,

    /// Stop plus a fixed take-profit, stop checked first on every bar.
    StopTakeProfit { take_profit: TakeProfitRule },

    /// Stop, take-profit, and a VWAP trailing stop that ratchets the working
    /// stop once price and VWAP have both moved favorably.
    StopTakeProfitTrailing { take_profit: TakeProfitRule },
}

/// Simulator lifecycle. Exactly one trade or none per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    AwaitingEntry,
    InPosition,
    Closed,
}

/// Exit resolved by the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitEvent {
    pub price: f64,
    pub reason: ExitReason,
    pub time: NaiveDateTime,
}

/// One closed trade as the simulator reports it; the run loop adds the
/// per-day context before recording it.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub exit_reason: ExitReason,
    pub position_size: u64,
    pub pnl: f64,
    pub rr_ratio: f64,
    pub commission: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
}

/// Per-day state machine: `AwaitingEntry → InPosition → Closed`.
#[derive(Debug, Clone)]
pub struct TradeSimulator {
    direction: Direction,
    entry_price: f64,
    original_stop: f64,
    working_stop: f64,
    take_profit: Option<f64>,
    trailing: bool,
    instrument: Instrument,
    state: TradeState,
    stop_ratcheted: bool,
    entry_time: Option<NaiveDateTime>,
}

impl TradeSimulator {
    pub fn new(
        signal: &Signal,
        policy: &ExitPolicy,
        range: &DailyRange,
        instrument: &Instrument,
    ) -> Self {
        let risk = (signal.entry_price - signal.stop_loss).abs();
        let (take_profit, trailing) = match policy {
            ExitPolicy::StopOnly => (None, false),
            ExitPolicy::StopTakeProfit { take_profit } => (
                Some(take_profit.level(signal.direction, signal.entry_price, risk, range)),
                false,
            ),
            ExitPolicy::StopTakeProfitTrailing { take_profit } => (
                Some(take_profit.level(signal.direction, signal.entry_price, risk, range)),
                true,
            ),
        };

        Self {
            direction: signal.direction,
            entry_price: signal.entry_price,
            original_stop: signal.stop_loss,
            working_stop: signal.stop_loss,
            take_profit,
            trailing,
            instrument: instrument.clone(),
            state: TradeState::AwaitingEntry,
            stop_ratcheted: false,
            entry_time: None,
        }
    }

    pub fn state(&self) -> TradeState {
        self.state
    }

    /// Current protective level; only ever tightens.
    pub fn working_stop(&self) -> f64 {
        self.working_stop
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.take_profit
    }

    pub fn entry_time(&self) -> Option<NaiveDateTime> {
        self.entry_time
    }

    /// Advance the machine by one bar. Returns the exit when the trade closes
    /// on this bar.
    pub fn on_bar(&mut self, bar: &Bar) -> Option<ExitEvent> {
        match self.state {
            TradeState::AwaitingEntry => {
                let triggered = match self.direction {
                    Direction::Long => bar.high >= self.entry_price,
                    Direction::Short => bar.low <= self.entry_price,
                };
                if triggered {
                    self.state = TradeState::InPosition;
                    self.entry_time = Some(bar.timestamp);
                }
                // The entry bar is never also an exit bar.
                None
            }
            TradeState::InPosition => {
                if self.trailing {
                    self.ratchet(bar);
                }
                if let Some(exit) = self.check_stop(bar).or_else(|| self.check_take_profit(bar)) {
                    self.state = TradeState::Closed;
                    return Some(exit);
                }
                None
            }
            TradeState::Closed => None,
        }
    }

    /// Forced end-of-day close at the last bar's close, if still in position.
    pub fn finish(&mut self, last_bar: &Bar) -> Option<ExitEvent> {
        if self.state != TradeState::InPosition {
            return None;
        }
        self.state = TradeState::Closed;
        Some(ExitEvent {
            price: last_bar.close,
            reason: ExitReason::Eod,
            time: last_bar.timestamp,
        })
    }

    /// Ratchet the working stop toward the bar's VWAP.
    ///
    /// Armed only once the close has moved past entry and the VWAP past the
    /// original stop, both in the favorable direction. The stop never
    /// loosens; bars without a VWAP value never ratchet.
    fn ratchet(&mut self, bar: &Bar) {
        let Some(vwap) = bar.vwap else {
            return;
        };
        let armed = match self.direction {
            Direction::Long => bar.close > self.entry_price && vwap > self.original_stop,
            Direction::Short => bar.close < self.entry_price && vwap < self.original_stop,
        };
        if !armed {
            return;
        }
        let candidate = self.instrument.quantize_stop(self.direction, vwap);
        let tightened = match self.direction {
            Direction::Long => candidate.max(self.working_stop),
            Direction::Short => candidate.min(self.working_stop),
        };
        if tightened != self.working_stop {
            self.working_stop = tightened;
            self.stop_ratcheted = true;
        }
    }

    fn check_stop(&self, bar: &Bar) -> Option<ExitEvent> {
        let hit = match self.direction {
            Direction::Long => bar.low <= self.working_stop,
            Direction::Short => bar.high >= self.working_stop,
        };
        if !hit {
            return None;
        }
        let reason = if self.stop_ratcheted {
            ExitReason::Trailing
        } else {
            ExitReason::Sl
        };
        Some(ExitEvent { price: self.working_stop, reason, time: bar.timestamp })
    }

    fn check_take_profit(&self, bar: &Bar) -> Option<ExitEvent> {
        let target = self.take_profit?;
        let hit = match self.direction {
            Direction::Long => bar.high >= target,
            Direction::Short => bar.low <= target,
        };
        if !hit {
            return None;
        }
        Some(ExitEvent { price: target, reason: ExitReason::Tp, time: bar.timestamp })
    }
}

/// Run the single-pass scan over the bars strictly after the signal bar and
/// settle the trade. `None` when there are no bars to scan or the entry never
/// triggers — the day simply produces no trade.
pub fn simulate_day(
    bars: &[Bar],
    signal: &Signal,
    position_size: u64,
    policy: &ExitPolicy,
    range: &DailyRange,
    instrument: &Instrument,
    costs: &CostModel,
) -> Option<TradeOutcome> {
    let after_signal = bars.get(signal.signal_index + 1..)?;
    let last_bar = after_signal.last()?;

    let mut sim = TradeSimulator::new(signal, policy, range, instrument);
    let mut exit = None;
    for bar in after_signal {
        if let Some(event) = sim.on_bar(bar) {
            exit = Some(event);
            break;
        }
    }
    let exit = exit.or_else(|| sim.finish(last_bar))?;
    let entry_time = sim.entry_time()?;

    let risk = (signal.entry_price - signal.stop_loss).abs();
    let reward = (exit.price - signal.entry_price).abs();
    let rr_ratio = match policy {
        // Stop-only runs measure reward:risk only on end-of-day exits; a stop
        // hit records the full-loss sentinel instead.
        ExitPolicy::StopOnly if exit.reason != ExitReason::Eod => RR_STOPPED_OUT,
        _ if risk > 0.0 => reward / risk,
        _ => 0.0,
    };

    let commission = costs.commission(position_size);
    let pnl = (exit.price - signal.entry_price)
        * signal.direction.sign()
        * position_size as f64
        * instrument.point_value
        - commission;

    Some(TradeOutcome {
        direction: signal.direction,
        entry_price: signal.entry_price,
        exit_price: exit.price,
        stop_loss: signal.stop_loss,
        exit_reason: exit.reason,
        position_size,
        pnl,
        rr_ratio,
        commission,
        entry_time,
        exit_time: exit.time,
    })
}
