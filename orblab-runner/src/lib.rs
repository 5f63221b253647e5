//! ORB Lab Runner — everything around the engine for a complete backtest:
//! CSV bar loading, TOML run configuration, performance metrics, artifact
//! export, the preset catalog, and the parallel preset sweep.

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod presets;
pub mod runner;
pub mod synthetic;

pub use config::{ConfigFileError, RunConfig, RunId};
pub use data_loader::{load_bars_csv, LoadError};
pub use export::{export_json, export_trades_csv, import_json};
pub use metrics::{equity_curve, PerformanceMetrics};
pub use presets::{preset, preset_names};
pub use runner::{run_from_config, run_single_backtest, run_sweep, save_artifacts, BacktestResult, SCHEMA_VERSION};
pub use synthetic::{generate_series, SyntheticConfig};
