//! Domain types shared across the engine.

pub mod bar;
pub mod instrument;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use instrument::Instrument;
pub use series::{BarSeries, SeriesError, TradingDay};
pub use trade::{Direction, ExitReason, TradeRecord};
