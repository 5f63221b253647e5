//! Artifact export — JSON result files and the trade tape CSV.
//!
//! All persisted artifacts carry a `schema_version` field; imports reject
//! versions newer than this build understands.

use anyhow::{bail, Context, Result};
use orblab_core::domain::TradeRecord;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: date, direction, entry_time, exit_time, entry_price, exit_price,
/// stop_loss, exit_reason, position_size, pnl, rr_ratio, commission, atr,
/// relative_volume (blank when no volume gate ran).
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "direction",
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "stop_loss",
        "exit_reason",
        "position_size",
        "pnl",
        "rr_ratio",
        "commission",
        "atr",
        "relative_volume",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.day.to_string(),
            &t.direction.to_string(),
            &t.entry_time.to_string(),
            &t.exit_time.to_string(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.stop_loss),
            &t.exit_reason.to_string(),
            &t.position_size.to_string(),
            &format!("{:.6}", t.pnl),
            &format!("{:.6}", t.rr_ratio),
            &format!("{:.6}", t.commission),
            &format!("{:.6}", t.atr),
            &t.relative_volume.map(|v| format!("{v:.6}")).unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("flushing trade CSV")?;
    String::from_utf8(bytes).context("trade CSV is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use orblab_core::domain::{Direction, ExitReason};

    fn sample_trade() -> TradeRecord {
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        TradeRecord {
            day,
            direction: Direction::Short,
            entry_price: 99.5,
            exit_price: 98.8,
            stop_loss: 99.7,
            exit_reason: ExitReason::Eod,
            position_size: 2_500,
            pnl: 1_741.25,
            rr_ratio: 3.5,
            commission: 8.75,
            entry_time: day.and_hms_opt(9, 35, 0).unwrap(),
            exit_time: day.and_hms_opt(15, 55, 0).unwrap(),
            atr: 2.0,
            relative_volume: None,
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_trade() {
        let csv = export_trades_csv(&[sample_trade(), sample_trade()]).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,direction,entry_time"));
        assert!(lines[1].contains("SHORT"));
        assert!(lines[1].contains("EOD"));
        assert!(lines[1].contains("2500"));
        // relative_volume column is blank when the gate never ran
        assert!(lines[1].ends_with(','));
    }

    #[test]
    fn relative_volume_is_echoed_when_present() {
        let mut trade = sample_trade();
        trade.relative_volume = Some(1.25);
        let csv = export_trades_csv(&[trade]).unwrap();
        assert!(csv.contains("1.250000"));
    }
}
