//! Position sizer — fixed fractional risk with an optional leverage bound.

use serde::{Deserialize, Serialize};

/// How the leverage bound interacts with the risk-based size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapPolicy {
    /// Risk-based size used unconditionally; the leverage bound is reported
    /// as a diagnostic only.
    RiskOnly,

    /// Size is the minimum of the risk-based and leverage-based bounds.
    MinOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageCap {
    pub leverage: f64,
    pub policy: CapPolicy,
}

/// Sizing parameters. `risk_fraction` is the share of equity put at risk per
/// trade (0.01 in every observed configuration).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizerConfig {
    pub risk_fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<LeverageCap>,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self { risk_fraction: 0.01, leverage: None }
    }
}

/// Sizing outcome: the unit count to trade plus the leverage diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeDecision {
    pub size: u64,
    /// Maximum units the leverage bound would allow, when configured.
    pub leverage_size: Option<u64>,
    /// True when the risk-based size exceeded the leverage bound (whether or
    /// not the policy actually clamped it).
    pub capped: bool,
}

impl SizerConfig {
    /// Units to trade for the given entry/stop distance and account equity.
    ///
    /// Risk per unit is the entry-to-stop distance scaled by the instrument's
    /// dollar-per-point value; a zero or negative distance sizes to zero and
    /// the day produces no trade. All divisions floor, staying conservative.
    pub fn position_size(
        &self,
        entry_price: f64,
        stop_loss: f64,
        equity: f64,
        point_value: f64,
    ) -> SizeDecision {
        let risk_per_unit = (entry_price - stop_loss).abs() * point_value;
        if risk_per_unit <= 0.0 || equity <= 0.0 {
            return SizeDecision { size: 0, leverage_size: None, capped: false };
        }

        let risk_size = (equity * self.risk_fraction / risk_per_unit).floor() as u64;

        let Some(cap) = self.leverage else {
            return SizeDecision { size: risk_size, leverage_size: None, capped: false };
        };

        let unit_cost = entry_price * point_value;
        let leverage_size = if unit_cost > 0.0 {
            (equity * cap.leverage / unit_cost).floor() as u64
        } else {
            0
        };
        let capped = risk_size > leverage_size;
        let size = match cap.policy {
            CapPolicy::RiskOnly => risk_size,
            CapPolicy::MinOfBounds => risk_size.min(leverage_size),
        };

        SizeDecision { size, leverage_size: Some(leverage_size), capped }
    }
}
