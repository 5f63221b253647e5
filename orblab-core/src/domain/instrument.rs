//! Instrument metadata: dollar-per-point multiplier and tick grid.

use super::trade::Direction;
use serde::{Deserialize, Serialize};

/// Contract specification for the traded instrument.
///
/// `point_value` scales per-unit risk and PnL (1.0 for cash equities, 2.0 for
/// MNQ). `tick_size` is the minimum price increment; `None` disables price
/// quantization entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub point_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_size: Option<f64>,
}

impl Instrument {
    /// Cash equity: one dollar per point, no tick grid.
    pub fn equity(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            point_value: 1.0,
            tick_size: None,
        }
    }

    /// Point-value future on a tick grid (e.g. MNQ: 2.0 per point, 0.25 tick).
    pub fn future(symbol: impl Into<String>, point_value: f64, tick_size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            point_value,
            tick_size: Some(tick_size),
        }
    }

    /// Snap a stop price onto the tick grid, always away from the position.
    ///
    /// A long stop rounds down, a short stop rounds up: the quantized stop is
    /// never tighter than the raw one, so sizing stays conservative.
    pub fn quantize_stop(&self, direction: Direction, price: f64) -> f64 {
        let Some(tick) = self.tick_size else {
            return price;
        };
        let ticks = price / tick;
        match direction {
            Direction::Long => ticks.floor() * tick,
            Direction::Short => ticks.ceil() * tick,
        }
    }
}
