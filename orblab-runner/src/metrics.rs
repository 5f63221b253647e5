//! Performance metrics — pure functions over the trade tape.
//!
//! Every metric is a pure function: trade list and/or equity curve in,
//! scalar out. No dependency on the engine or the data layer. The −1
//! reward:risk sentinel (stop exits under the stop-only policy) is excluded
//! from the average-R:R statistic; stop exits are visible through the
//! exit-reason counts instead.

use orblab_core::domain::{Direction, ExitReason, TradeRecord};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub win_rate: f64,

    pub total_pnl: f64,
    pub final_equity: f64,
    pub total_commission: f64,

    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_win: f64,
    pub max_loss: f64,
    pub profit_factor: f64,

    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,

    /// Mean reward:risk over trades with a measured ratio (sentinel rows
    /// excluded).
    pub avg_rr: f64,

    pub stop_exits: usize,
    pub take_profit_exits: usize,
    pub trailing_exits: usize,
    pub eod_exits: usize,

    pub long_trades: usize,
    pub short_trades: usize,

    /// Annualized Sharpe over per-trade returns on running equity.
    pub sharpe: f64,
    /// Worst peak-to-trough equity loss, as a negative fraction.
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    pub fn compute(trades: &[TradeRecord], starting_capital: f64) -> Self {
        let curve = equity_curve(trades, starting_capital);

        let wins: Vec<f64> = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).collect();
        let losses: Vec<f64> = trades.iter().filter(|t| t.pnl <= 0.0).map(|t| t.pnl).collect();

        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum();

        let measured_rr: Vec<f64> = trades
            .iter()
            .filter(|t| !t.rr_is_sentinel())
            .map(|t| t.rr_ratio)
            .collect();

        Self {
            trade_count: trades.len(),
            winners: wins.len(),
            losers: losses.len(),
            win_rate: ratio(wins.len(), trades.len()),
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            final_equity: curve.last().copied().unwrap_or(starting_capital),
            total_commission: trades.iter().map(|t| t.commission).sum(),
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            max_win: wins.iter().copied().fold(0.0, f64::max),
            max_loss: losses.iter().copied().fold(0.0, f64::min),
            profit_factor: if gross_loss < 0.0 { gross_win / gross_loss.abs() } else { 0.0 },
            max_consecutive_wins: longest_streak(trades, |t| t.pnl > 0.0),
            max_consecutive_losses: longest_streak(trades, |t| t.pnl < 0.0),
            avg_rr: mean(&measured_rr),
            stop_exits: exit_count(trades, ExitReason::Sl),
            take_profit_exits: exit_count(trades, ExitReason::Tp),
            trailing_exits: exit_count(trades, ExitReason::Trailing),
            eod_exits: exit_count(trades, ExitReason::Eod),
            long_trades: trades.iter().filter(|t| t.direction == Direction::Long).count(),
            short_trades: trades.iter().filter(|t| t.direction == Direction::Short).count(),
            sharpe: sharpe_ratio(trades, starting_capital),
            max_drawdown: max_drawdown(&curve),
        }
    }
}

/// Equity after each trade: `equity[i] = starting_capital + Σ pnl[0..=i]`.
///
/// Pure post-hoc aggregation; the engine never feeds it back into sizing.
pub fn equity_curve(trades: &[TradeRecord], starting_capital: f64) -> Vec<f64> {
    let mut curve = Vec::with_capacity(trades.len());
    let mut cumulative_pnl = 0.0;
    for trade in trades {
        cumulative_pnl += trade.pnl;
        curve.push(starting_capital + cumulative_pnl);
    }
    curve
}

/// Worst peak-to-trough loss over the curve, expressed as a negative
/// fraction of the peak. 0.0 for a curve that never declines.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;
    for &equity in curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }
    worst
}

/// Annualized Sharpe over per-trade returns against the pre-trade equity.
/// 0.0 with fewer than two trades or zero variance.
fn sharpe_ratio(trades: &[TradeRecord], starting_capital: f64) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let mut equity = starting_capital;
    let mut returns = Vec::with_capacity(trades.len());
    for trade in trades {
        if equity > 0.0 {
            returns.push(trade.pnl / equity);
        }
        equity += trade.pnl;
    }
    if returns.len() < 2 {
        return 0.0;
    }
    let mean_r = mean(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean_r / std) * (252.0_f64).sqrt()
}

fn exit_count(trades: &[TradeRecord], reason: ExitReason) -> usize {
    trades.iter().filter(|t| t.exit_reason == reason).count()
}

fn longest_streak(trades: &[TradeRecord], predicate: impl Fn(&TradeRecord) -> bool) -> usize {
    let mut best = 0;
    let mut current = 0;
    for trade in trades {
        if predicate(trade) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use orblab_core::domain::trade::RR_STOPPED_OUT;

    fn trade(day: u32, pnl: f64, rr: f64, reason: ExitReason, direction: Direction) -> TradeRecord {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        TradeRecord {
            day: date,
            direction,
            entry_price: 100.0,
            exit_price: 100.0 + pnl / 10.0,
            stop_loss: 99.0,
            exit_reason: reason,
            position_size: 10,
            pnl,
            rr_ratio: rr,
            commission: 0.035,
            entry_time: date.and_hms_opt(9, 35, 0).unwrap(),
            exit_time: date.and_hms_opt(15, 55, 0).unwrap(),
            atr: 2.0,
            relative_volume: None,
        }
    }

    fn sample_trades() -> Vec<TradeRecord> {
        vec![
            trade(3, 100.0, 2.0, ExitReason::Eod, Direction::Long),
            trade(4, -50.0, RR_STOPPED_OUT, ExitReason::Sl, Direction::Long),
            trade(5, -25.0, RR_STOPPED_OUT, ExitReason::Sl, Direction::Short),
            trade(6, 200.0, 4.0, ExitReason::Eod, Direction::Long),
            trade(7, 75.0, 1.5, ExitReason::Eod, Direction::Short),
        ]
    }

    #[test]
    fn equity_curve_is_cumulative_pnl() {
        let trades = sample_trades();
        let curve = equity_curve(&trades, 50_000.0);
        assert_eq!(curve.len(), trades.len());

        let mut sum = 0.0;
        for (i, trade) in trades.iter().enumerate() {
            sum += trade.pnl;
            assert_eq!(curve[i], 50_000.0 + sum);
        }
    }

    #[test]
    fn sentinel_rows_excluded_from_avg_rr() {
        let metrics = PerformanceMetrics::compute(&sample_trades(), 50_000.0);
        // mean(2.0, 4.0, 1.5), the two sentinel rows dropped
        assert!((metrics.avg_rr - 2.5).abs() < 1e-12);
        assert_eq!(metrics.stop_exits, 2);
        assert_eq!(metrics.eod_exits, 3);
    }

    #[test]
    fn win_loss_accounting() {
        let metrics = PerformanceMetrics::compute(&sample_trades(), 50_000.0);
        assert_eq!(metrics.trade_count, 5);
        assert_eq!(metrics.winners, 3);
        assert_eq!(metrics.losers, 2);
        assert!((metrics.win_rate - 0.6).abs() < 1e-12);
        assert!((metrics.total_pnl - 300.0).abs() < 1e-12);
        assert!((metrics.final_equity - 50_300.0).abs() < 1e-12);
        assert!((metrics.profit_factor - 375.0 / 75.0).abs() < 1e-12);
        assert_eq!(metrics.long_trades, 3);
        assert_eq!(metrics.short_trades, 2);
        assert!((metrics.max_win - 200.0).abs() < 1e-12);
        assert!((metrics.max_loss + 50.0).abs() < 1e-12);
    }

    #[test]
    fn streaks() {
        let trades = vec![
            trade(3, 10.0, 1.0, ExitReason::Eod, Direction::Long),
            trade(4, 10.0, 1.0, ExitReason::Eod, Direction::Long),
            trade(5, -10.0, 1.0, ExitReason::Eod, Direction::Long),
            trade(6, -10.0, 1.0, ExitReason::Eod, Direction::Long),
            trade(7, -10.0, 1.0, ExitReason::Eod, Direction::Long),
            trade(10, 10.0, 1.0, ExitReason::Eod, Direction::Long),
        ];
        let metrics = PerformanceMetrics::compute(&trades, 50_000.0);
        assert_eq!(metrics.max_consecutive_wins, 2);
        assert_eq!(metrics.max_consecutive_losses, 3);
    }

    #[test]
    fn drawdown_on_a_dipping_curve() {
        // Peak 110, trough 99: drawdown -10%.
        let curve = vec![100.0, 110.0, 99.0, 105.0];
        assert!((max_drawdown(&curve) + 0.1).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 101.0, 102.0]), 0.0);
    }

    #[test]
    fn empty_tape_is_all_zeros() {
        let metrics = PerformanceMetrics::compute(&[], 50_000.0);
        assert_eq!(metrics.trade_count, 0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.final_equity, 50_000.0);
        assert_eq!(metrics.sharpe, 0.0);
    }
}
