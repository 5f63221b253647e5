//! ORB Lab Core — opening-range-breakout backtesting engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, day-grouped series, instruments, trade records)
//! - Range calculator (first-bar, fixed-window, confirmed-breakout policies)
//! - Volatility estimator (strict 14-day ATR over daily aggregates)
//! - Signal generator (candle direction, window bias, breakout confirmation)
//! - Fixed-fractional position sizer with optional leverage cap
//! - Trade simulator (single-pass entry/exit state machine with trailing ratchet)
//! - Day loop producing an ordered trade tape plus skip diagnostics
//! - Live per-day session object yielding bracket-order intents

pub mod atr;
pub mod domain;
pub mod engine;
pub mod range;
pub mod session;
pub mod signal;
pub mod simulator;
pub mod sizing;
pub mod strategy;

pub use atr::{aggregate_day, average_true_range, AtrError, DailyAggregate};
pub use domain::{Bar, BarSeries, Direction, ExitReason, Instrument, TradeRecord};
pub use engine::{run_backtest, DaySkip, EngineConfig, RunResult, SkipReason};
pub use range::{Breakout, DailyRange, RangePolicy, RangeResult};
pub use session::{DaySession, TradeIntent};
pub use signal::{relative_volume, Signal, SignalPolicy, VolumeFilter};
pub use simulator::{CostModel, ExitPolicy, TakeProfitRule, TradeSimulator};
pub use sizing::{CapPolicy, LeverageCap, SizeDecision, SizerConfig};
pub use strategy::{ConfigError, StrategyConfig};
