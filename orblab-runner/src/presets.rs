//! Preset catalog — the historical strategy variants as data.
//!
//! Each preset reproduces one of the original script configurations; the
//! differences between them are pure configuration, never code.

use crate::config::RunConfig;
use chrono::NaiveTime;
use orblab_core::domain::Instrument;
use orblab_core::engine::EngineConfig;
use orblab_core::range::RangePolicy;
use orblab_core::signal::{SignalPolicy, VolumeFilter};
use orblab_core::simulator::{CostModel, ExitPolicy, TakeProfitRule};
use orblab_core::sizing::{CapPolicy, LeverageCap, SizerConfig};
use orblab_core::strategy::StrategyConfig;

pub fn preset_names() -> &'static [&'static str] {
    &[
        "orb-5min",
        "orb-5min-tp",
        "orb-breakout-confirm",
        "orb-vwap-trail",
        "orb-mnq-vwap",
    ]
}

/// Build a named preset for the given symbol. `None` for unknown names.
pub fn preset(name: &str, symbol: &str) -> Option<RunConfig> {
    let strategy = match name {
        // First-bar opening range, stop-loss only, relative-volume gate.
        "orb-5min" => StrategyConfig {
            range: RangePolicy::FirstBar,
            signal: SignalPolicy::DirectionalCandle,
            exit: ExitPolicy::StopOnly,
            atr_period: 14,
            stop_atr_multiple: 0.1,
            sizer: SizerConfig::default(),
            volume_filter: Some(VolumeFilter::default()),
        },
        // Same entry, 10R fixed take-profit, no volume gate.
        "orb-5min-tp" => StrategyConfig {
            range: RangePolicy::FirstBar,
            signal: SignalPolicy::DirectionalCandle,
            exit: ExitPolicy::StopTakeProfit {
                take_profit: TakeProfitRule::RiskMultiple { multiple: 10.0 },
            },
            atr_period: 14,
            stop_atr_multiple: 0.1,
            sizer: SizerConfig::default(),
            volume_filter: None,
        },
        // Extended-range breakout confirmation, target one range beyond.
        "orb-breakout-confirm" => StrategyConfig {
            range: RangePolicy::ConfirmedBreakout { start: open_bell(), end: half_hour() },
            signal: SignalPolicy::ConfirmedBreakout,
            exit: ExitPolicy::StopTakeProfit { take_profit: TakeProfitRule::RangeProjection },
            atr_period: 14,
            stop_atr_multiple: 0.1,
            sizer: SizerConfig::default(),
            volume_filter: None,
        },
        // 09:30–10:00 window bias, 6R target, VWAP trailing stop.
        "orb-vwap-trail" => StrategyConfig {
            range: RangePolicy::FixedWindow { start: open_bell(), end: half_hour() },
            signal: SignalPolicy::WindowBias,
            exit: ExitPolicy::StopTakeProfitTrailing {
                take_profit: TakeProfitRule::RiskMultiple { multiple: 6.0 },
            },
            atr_period: 14,
            stop_atr_multiple: 0.1,
            sizer: SizerConfig {
                risk_fraction: 0.01,
                leverage: Some(LeverageCap { leverage: 4.0, policy: CapPolicy::RiskOnly }),
            },
            volume_filter: None,
        },
        // Micro Nasdaq future: tick-quantized stops, $2 point value.
        "orb-mnq-vwap" => StrategyConfig {
            range: RangePolicy::FirstBar,
            signal: SignalPolicy::DirectionalCandle,
            exit: ExitPolicy::StopTakeProfitTrailing {
                take_profit: TakeProfitRule::RiskMultiple { multiple: 10.0 },
            },
            atr_period: 14,
            stop_atr_multiple: 0.1,
            sizer: SizerConfig::default(),
            volume_filter: None,
        },
        _ => return None,
    };

    let instrument = match name {
        "orb-mnq-vwap" => Instrument::future("MNQ", 2.0, 0.25),
        _ => Instrument::equity(symbol),
    };

    Some(RunConfig {
        name: name.to_string(),
        data: None,
        engine: EngineConfig {
            strategy,
            instrument,
            starting_capital: 50_000.0,
            costs: CostModel::default(),
        },
    })
}

fn open_bell() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).expect("valid clock time")
}

fn half_hour() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).expect("valid clock time")
}
