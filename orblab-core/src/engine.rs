//! Run loop — chronological fold over trading days.
//!
//! Per day: range → ATR → signal (with volume gate) → size → simulate, in
//! that order, short-circuiting at the first stage that yields nothing. A
//! day that cannot be analyzed is recorded as a skip with its reason and is
//! simply absent from the trade tape; no partial records exist.

use crate::atr::{aggregate_day, average_true_range};
use crate::domain::{BarSeries, Instrument, TradeRecord};
use crate::signal::{relative_volume, SignalPolicy};
use crate::simulator::{simulate_day, CostModel};
use crate::strategy::StrategyConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything a single backtest run needs besides the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub strategy: StrategyConfig,
    pub instrument: Instrument,
    /// Sizing reference. Held constant across the run: realized PnL is not
    /// compounded back, keeping risk per trade constant in dollar terms.
    pub starting_capital: f64,
    pub costs: CostModel,
}

/// Why a day produced no trade. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Fewer distinct prior trading days than the ATR lookback needs.
    InsufficientHistory,
    /// The range window held no bars.
    EmptyRange,
    /// The volatility estimator rejected the lookback (wrong day count).
    AtrUnavailable,
    /// Doji open or a window bias that resolved to nothing.
    NoDirection,
    /// Confirmed-breakout policy found no breakout or no confirmation.
    NoBreakout,
    /// Relative volume below the configured threshold.
    BelowVolumeThreshold,
    /// Risk-per-unit sized the position to zero.
    ZeroSize,
    /// The entry level was never touched after the signal.
    EntryNeverTriggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySkip {
    pub day: NaiveDate,
    pub reason: SkipReason,
}

/// Outcome of a complete run: the ordered trade tape plus skip diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<TradeRecord>,
    pub skips: Vec<DaySkip>,
    pub days_examined: usize,
}

impl RunResult {
    pub fn skip_count(&self, reason: SkipReason) -> usize {
        self.skips.iter().filter(|s| s.reason == reason).count()
    }
}

/// Replay the series day by day and collect closed trades.
///
/// Each day's analysis reads only that day's bars and the immutable history
/// before it; days are independent of each other apart from the history, so
/// the fold is deterministic and single-threaded.
pub fn run_backtest(series: &BarSeries, config: &EngineConfig) -> RunResult {
    let mut trades = Vec::new();
    let mut skips = Vec::new();

    for index in 0..series.day_count() {
        match analyze_day(series, index, config) {
            Ok(trade) => trades.push(trade),
            Err(reason) => skips.push(DaySkip { day: series.day(index).day, reason }),
        }
    }

    RunResult { trades, skips, days_examined: series.day_count() }
}

/// One day through the full pipeline. `Err` is a skip reason, not a failure.
fn analyze_day(
    series: &BarSeries,
    index: usize,
    config: &EngineConfig,
) -> Result<TradeRecord, SkipReason> {
    let strategy = &config.strategy;
    let day = series.day(index);

    let prior = series.prior_days(index, strategy.atr_period);
    if prior.len() < strategy.atr_period {
        return Err(SkipReason::InsufficientHistory);
    }

    let range = strategy.range.compute(day.bars).ok_or(SkipReason::EmptyRange)?;

    let aggregates: Vec<_> = prior.iter().filter_map(aggregate_day).collect();
    let atr = average_true_range(&aggregates, strategy.atr_period)
        .map_err(|_| SkipReason::AtrUnavailable)?;

    let signal = strategy
        .signal
        .generate(day.bars, &range, atr, strategy.stop_atr_multiple, &config.instrument)
        .ok_or(match strategy.signal {
            SignalPolicy::ConfirmedBreakout => SkipReason::NoBreakout,
            _ => SkipReason::NoDirection,
        })?;

    let rel_volume = match strategy.volume_filter {
        Some(filter) => {
            let first = day.bars.first().ok_or(SkipReason::EmptyRange)?;
            let lookback = series.prior_days(index, filter.lookback_days);
            let ratio = relative_volume(first.volume, &lookback, filter.lookback_days);
            if ratio < filter.threshold {
                return Err(SkipReason::BelowVolumeThreshold);
            }
            Some(ratio)
        }
        None => None,
    };

    let decision = strategy.sizer.position_size(
        signal.entry_price,
        signal.stop_loss,
        config.starting_capital,
        config.instrument.point_value,
    );
    if decision.size == 0 {
        return Err(SkipReason::ZeroSize);
    }

    let outcome = simulate_day(
        day.bars,
        &signal,
        decision.size,
        &strategy.exit,
        &range.range,
        &config.instrument,
        &config.costs,
    )
    .ok_or(SkipReason::EntryNeverTriggered)?;

    Ok(TradeRecord {
        day: day.day,
        direction: outcome.direction,
        entry_price: outcome.entry_price,
        exit_price: outcome.exit_price,
        stop_loss: outcome.stop_loss,
        exit_reason: outcome.exit_reason,
        position_size: outcome.position_size,
        pnl: outcome.pnl,
        rr_ratio: outcome.rr_ratio,
        commission: outcome.commission,
        entry_time: outcome.entry_time,
        exit_time: outcome.exit_time,
        atr,
        relative_volume: rel_volume,
    })
}
