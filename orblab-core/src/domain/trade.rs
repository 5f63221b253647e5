//! TradeRecord — one closed round-trip trade.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction, fixed once per day and never revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short; multiplies signed price moves.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Which exit condition fired first.
///
/// `Trailing` is a stop exit whose level had been ratcheted past the original
/// stop; it separates "stopped at breakeven or better" from a plain loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Sl,
    Tp,
    Trailing,
    Eod,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Sl => write!(f, "SL"),
            ExitReason::Tp => write!(f, "TP"),
            ExitReason::Trailing => write!(f, "TRAILING"),
            ExitReason::Eod => write!(f, "EOD"),
        }
    }
}

/// Sentinel reward:risk value recorded for a stop exit under the stop-only
/// exit policy: the trade realized its full planned loss, so no reward was
/// measured. Aggregate statistics filter this marker out before averaging.
pub const RR_STOPPED_OUT: f64 = -1.0;

/// A complete trade: entry trigger through exit, with the per-day context
/// (ATR, relative volume) echoed for downstream analysis.
///
/// At most one record exists per trading day. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub day: NaiveDate,
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
    pub atr: f64,
    pub relative_volume: Option<f64>,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// True when `rr_ratio` carries the stopped-out sentinel rather than a
    /// measured reward:risk.
    pub fn rr_is_sentinel(&self) -> bool {
        self.rr_ratio == RR_STOPPED_OUT
    }
}
