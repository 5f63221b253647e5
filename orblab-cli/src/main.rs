//! ORB Lab CLI — run backtests, sweep presets, generate demo data.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config file or a named preset
//! - `sweep` — run several presets over one data file in parallel
//! - `presets` — list the built-in strategy variants
//! - `synth` — write a seeded synthetic bar CSV for demos and smoke tests

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use orblab_runner::runner::{run_single_backtest, save_artifacts};
use orblab_runner::synthetic::{generate_series, SyntheticConfig};
use orblab_runner::{load_bars_csv, preset, preset_names, RunConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orblab", about = "ORB Lab — opening-range-breakout backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or a named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Named preset (see `orblab presets`).
        #[arg(long)]
        preset: Option<String>,

        /// Symbol label for preset runs.
        #[arg(long, default_value = "QQQ")]
        symbol: String,

        /// CSV bar file. Overrides the config's data path.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Run on generated bars instead of a data file (demo mode).
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
    /// Run several presets over one data file in parallel.
    Sweep {
        /// Presets to run. Defaults to all of them.
        #[arg(long)]
        presets: Vec<String>,

        /// Symbol label for the runs.
        #[arg(long, default_value = "QQQ")]
        symbol: String,

        /// CSV bar file.
        #[arg(long, required_unless_present = "synthetic")]
        data: Option<PathBuf>,

        /// Run on generated bars instead of a data file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
    /// List the built-in strategy presets.
    Presets,
    /// Write a seeded synthetic bar CSV.
    Synth {
        /// Output CSV path.
        #[arg(long, default_value = "synthetic_bars.csv")]
        out: PathBuf,

        /// Trading days to generate.
        #[arg(long, default_value_t = 60)]
        days: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, preset: preset_name, symbol, data, synthetic, out } => {
            let mut run_config = resolve_config(config, preset_name, &symbol)?;
            if let Some(path) = data {
                run_config.data = Some(path);
            }

            let (series, is_synthetic) = if synthetic {
                eprintln!("running on synthetic data (demo mode)");
                (generate_series(&SyntheticConfig::default()), true)
            } else {
                let Some(path) = &run_config.data else {
                    bail!("no data file: pass --data <csv> or --synthetic");
                };
                (load_bars_csv(path)?, false)
            };

            let result = run_single_backtest(&run_config, &series, is_synthetic)?;
            save_artifacts(&result, &out)?;
            print_summary(&result);
        }
        Commands::Sweep { presets, symbol, data, synthetic, out } => {
            let names: Vec<String> = if presets.is_empty() {
                preset_names().iter().map(|s| s.to_string()).collect()
            } else {
                presets
            };
            let configs: Vec<RunConfig> = names
                .iter()
                .map(|name| {
                    preset(name, &symbol)
                        .with_context(|| format!("unknown preset '{name}'"))
                })
                .collect::<Result<_>>()?;

            let (series, is_synthetic) = if synthetic {
                eprintln!("sweeping on synthetic data (demo mode)");
                (generate_series(&SyntheticConfig::default()), true)
            } else {
                let Some(path) = &data else {
                    bail!("no data file: pass --data <csv> or --synthetic");
                };
                (load_bars_csv(path)?, false)
            };

            for outcome in orblab_runner::run_sweep(&configs, &series, is_synthetic) {
                match outcome {
                    Ok(result) => {
                        save_artifacts(&result, &out)?;
                        print_summary(&result);
                    }
                    Err(err) => eprintln!("run failed: {err:#}"),
                }
            }
        }
        Commands::Presets => {
            for name in preset_names() {
                println!("{name}");
            }
        }
        Commands::Synth { out, days, seed } => {
            let series = generate_series(&SyntheticConfig { days, seed, ..Default::default() });
            write_bars_csv(&series, &out)?;
            eprintln!(
                "wrote {} bars over {} days to {}",
                series.bar_count(),
                series.day_count(),
                out.display()
            );
        }
    }

    Ok(())
}

fn resolve_config(
    config: Option<PathBuf>,
    preset_name: Option<String>,
    symbol: &str,
) -> Result<RunConfig> {
    match (config, preset_name) {
        (Some(path), None) => Ok(RunConfig::from_toml_file(&path)?),
        (None, Some(name)) => {
            preset(&name, symbol).with_context(|| format!("unknown preset '{name}'"))
        }
        (None, None) => bail!("pass --config <file> or --preset <name>"),
        (Some(_), Some(_)) => unreachable!("clap rejects --config with --preset"),
    }
}

fn write_bars_csv(series: &orblab_core::BarSeries, path: &std::path::Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume", "vwap"])?;
    for day in series.days() {
        for bar in day.bars {
            wtr.write_record([
                &bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                &format!("{:.4}", bar.open),
                &format!("{:.4}", bar.high),
                &format!("{:.4}", bar.low),
                &format!("{:.4}", bar.close),
                &format!("{:.0}", bar.volume),
                &bar.vwap.map(|v| format!("{v:.4}")).unwrap_or_default(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn print_summary(result: &orblab_runner::BacktestResult) {
    let m = &result.metrics;
    println!("── {} ({})", result.config.name, &result.run_id[..8]);
    println!(
        "   trades {}  win rate {:.1}%  profit factor {:.2}",
        m.trade_count,
        m.win_rate * 100.0,
        m.profit_factor
    );
    println!(
        "   pnl {:.2}  final equity {:.2}  max drawdown {:.2}%",
        m.total_pnl,
        m.final_equity,
        m.max_drawdown * 100.0
    );
    println!(
        "   exits: SL {}  TP {}  TRAILING {}  EOD {}",
        m.stop_exits, m.take_profit_exits, m.trailing_exits, m.eod_exits
    );
    if result.synthetic_data {
        println!("   (synthetic data — demo result)");
    }
}
