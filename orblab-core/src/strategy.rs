//! Strategy configuration — one engine, variants as data.
//!
//! Every historical script variant (5-minute, 15-minute, take-profit, VWAP
//! trailing, MNQ) is a point in this configuration space: range policy ×
//! signal policy × exit policy × sizing × optional volume gate.

use crate::atr::DEFAULT_ATR_PERIOD;
use crate::range::RangePolicy;
use crate::signal::{SignalPolicy, VolumeFilter};
use crate::simulator::ExitPolicy;
use crate::sizing::SizerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("CONFIRMED_BREAKOUT signal requires the CONFIRMED_BREAKOUT range policy")]
    SignalNeedsBreakoutRange,

    #[error("CONFIRMED_BREAKOUT range requires the CONFIRMED_BREAKOUT signal policy")]
    BreakoutRangeNeedsSignal,

    #[error("WINDOW_BIAS signal requires the FIXED_WINDOW range policy")]
    SignalNeedsWindowRange,

    #[error("range window start {start} is after end {end}")]
    WindowInverted { start: chrono::NaiveTime, end: chrono::NaiveTime },

    #[error("risk_fraction must be in (0, 1), got {0}")]
    InvalidRiskFraction(f64),

    #[error("atr_period must be at least 1")]
    ZeroAtrPeriod,
}

/// Complete description of one strategy variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub range: RangePolicy,
    pub signal: SignalPolicy,
    pub exit: ExitPolicy,

    /// Distinct prior trading days required for the ATR lookback.
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Stop offset as a fraction of ATR (0.1 in every observed variant).
    #[serde(default = "default_stop_atr_multiple")]
    pub stop_atr_multiple: f64,

    #[serde(default)]
    pub sizer: SizerConfig,

    /// Relative-volume momentum gate; absent means no gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_filter: Option<VolumeFilter>,
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

fn default_stop_atr_multiple() -> f64 {
    0.1
}

impl StrategyConfig {
    /// Check cross-field consistency before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.signal, &self.range) {
            (SignalPolicy::ConfirmedBreakout, RangePolicy::ConfirmedBreakout { .. }) => {}
            (SignalPolicy::ConfirmedBreakout, _) => {
                return Err(ConfigError::SignalNeedsBreakoutRange)
            }
            (_, RangePolicy::ConfirmedBreakout { .. }) => {
                return Err(ConfigError::BreakoutRangeNeedsSignal)
            }
            (SignalPolicy::WindowBias, RangePolicy::FixedWindow { .. }) => {}
            (SignalPolicy::WindowBias, _) => return Err(ConfigError::SignalNeedsWindowRange),
            _ => {}
        }

        if let RangePolicy::FixedWindow { start, end } | RangePolicy::ConfirmedBreakout { start, end } =
            self.range
        {
            if start > end {
                return Err(ConfigError::WindowInverted { start, end });
            }
        }

        if !(self.sizer.risk_fraction > 0.0 && self.sizer.risk_fraction < 1.0) {
            return Err(ConfigError::InvalidRiskFraction(self.sizer.risk_fraction));
        }
        if self.atr_period == 0 {
            return Err(ConfigError::ZeroAtrPeriod);
        }
        Ok(())
    }
}
