//! CSV bar loading.
//!
//! Input files carry at least `timestamp, open, high, low, close, volume`;
//! a `vwap` column is picked up when present and any other columns (such as
//! a precomputed `trading_day`) are ignored — the day key is always derived
//! from the timestamp. Timestamps are exchange-local; offset-bearing formats
//! are accepted and reduced to their local clock time.

use chrono::{DateTime, NaiveDateTime};
use orblab_core::domain::{Bar, BarSeries, SeriesError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: unparseable timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: OHLC values fail the sanity check")]
    InsaneBar { row: usize },

    #[error("bar ordering: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct RawRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    vwap: Option<f64>,
}

/// Accepted timestamp formats, tried in order. Offset-bearing timestamps
/// keep their local wall-clock reading.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z") {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    None
}

/// Load a CSV bar file into a validated series.
///
/// Insane rows fail loudly rather than silently polluting a run; cleaning
/// belongs to the data-preparation step, not the loader.
pub fn load_bars_csv(path: &Path) -> Result<BarSeries, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bars = Vec::new();
    for (i, record) in reader.deserialize::<RawRow>().enumerate() {
        // Header is row 1; data rows start at 2.
        let row = i + 2;
        let raw = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| LoadError::Timestamp {
            row,
            value: raw.timestamp.clone(),
        })?;

        let bar = Bar {
            timestamp,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
            vwap: raw.vwap,
        };
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar { row });
        }
        bars.push(bar);
    }

    Ok(BarSeries::from_bars(bars)?)
}
