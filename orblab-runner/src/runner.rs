//! Backtest orchestration: load bars, run the engine, compute metrics,
//! assemble the artifact. The preset sweep fans runs out across worker
//! threads — days within one run stay strictly sequential.

use crate::config::RunConfig;
use crate::data_loader::load_bars_csv;
use crate::metrics::{equity_curve, PerformanceMetrics};
use anyhow::{bail, Context, Result};
use orblab_core::domain::{BarSeries, TradeRecord};
use orblab_core::engine::{run_backtest, DaySkip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifact schema version; imports reject anything newer.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete, serializable result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub run_id: String,
    pub config: RunConfig,
    /// True when the run used generated bars; such results are demo-only.
    pub synthetic_data: bool,
    pub days_examined: usize,
    pub trades: Vec<TradeRecord>,
    pub skips: Vec<DaySkip>,
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<f64>,
}

/// Run one backtest over an already-loaded series.
pub fn run_single_backtest(
    config: &RunConfig,
    series: &BarSeries,
    synthetic_data: bool,
) -> Result<BacktestResult> {
    config
        .engine
        .strategy
        .validate()
        .with_context(|| format!("run '{}' has an invalid strategy", config.name))?;

    let result = run_backtest(series, &config.engine);
    let metrics = PerformanceMetrics::compute(&result.trades, config.engine.starting_capital);
    let curve = equity_curve(&result.trades, config.engine.starting_capital);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        synthetic_data,
        days_examined: result.days_examined,
        trades: result.trades,
        skips: result.skips,
        metrics,
        equity_curve: curve,
    })
}

/// Run a backtest from a config that names its own CSV data file.
pub fn run_from_config(config: &RunConfig) -> Result<BacktestResult> {
    let Some(path) = &config.data else {
        bail!("run '{}' names no data file", config.name);
    };
    let series = load_bars_csv(path)
        .with_context(|| format!("loading bars for run '{}'", config.name))?;
    eprintln!(
        "{}: {} bars over {} trading days",
        config.name,
        series.bar_count(),
        series.day_count()
    );
    run_single_backtest(config, &series, false)
}

/// Run several configs against one series in parallel.
///
/// Each run is independent (the series is read-only), so this is a plain
/// data-parallel map; result order matches input order.
pub fn run_sweep(
    configs: &[RunConfig],
    series: &BarSeries,
    synthetic_data: bool,
) -> Vec<Result<BacktestResult>> {
    configs
        .par_iter()
        .map(|config| run_single_backtest(config, series, synthetic_data))
        .collect()
}

/// Persist the JSON artifact and the trade tape CSV. Returns the JSON path.
pub fn save_artifacts(result: &BacktestResult, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let stem = format!("{}-{}", result.config.name, &result.run_id[..8]);

    let json_path = out_dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, crate::export::export_json(result)?)
        .with_context(|| format!("writing {}", json_path.display()))?;

    let csv_path = out_dir.join(format!("{stem}-trades.csv"));
    std::fs::write(&csv_path, crate::export::export_trades_csv(&result.trades)?)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    eprintln!(
        "{}: {} trades, final equity {:.2} → {}",
        result.config.name,
        result.metrics.trade_count,
        result.metrics.final_equity,
        json_path.display()
    );
    Ok(json_path)
}
