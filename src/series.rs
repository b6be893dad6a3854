// =============================================================================
// Indicator Series — JSON payload to time-indexed numeric table
// =============================================================================
//
// The API returns `{ "<data key>": { "<timestamp>": { "<column>": "<num>" } } }`.
// `transform` flattens that into rows sorted strictly ascending by timestamp.
// Any non-numeric cell fails the whole transform.  When two keys parse to the
// same instant, the one later in the payload's key order wins.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::alpha_vantage::IndicatorResponse;
use crate::types::IndicatorDescriptor;

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("expected data key '{0}' not found in response")]
    MissingKey(String),

    #[error("'{0}' is not a JSON object")]
    NotAnObject(String),

    #[error("unparsable timestamp '{0}'")]
    BadTimestamp(String),

    #[error("non-numeric value for {column} at {timestamp}: {value}")]
    NonNumeric {
        timestamp: String,
        column: String,
        value: String,
    },
}

/// Time-indexed table of indicator values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    columns: Vec<String>,
    index: Vec<NaiveDateTime>,
    /// Row-major; `rows[i][j]` belongs to `index[i]` and `columns[j]`.
    /// Cells absent from the payload hold NaN.
    rows: Vec<Vec<f64>>,
}

impl IndicatorSeries {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `(timestamp, value)` pairs for `name`, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<(NaiveDateTime, f64)>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(
            self.index
                .iter()
                .zip(&self.rows)
                .map(|(ts, row)| (*ts, row[j]))
                .collect(),
        )
    }
}

/// Convert the descriptor's data block in `resp` into a sorted series.
pub fn transform(
    resp: &IndicatorResponse,
    descriptor: &IndicatorDescriptor,
) -> Result<IndicatorSeries, TransformError> {
    let key = descriptor.data_key();
    let result = build_series(resp, &key);
    match &result {
        Ok(series) => info!(rows = series.len(), columns = ?series.columns(), "data processing successful"),
        Err(e) => error!(error = %e, "data processing error"),
    }
    result
}

fn build_series(resp: &IndicatorResponse, key: &str) -> Result<IndicatorSeries, TransformError> {
    let block = resp
        .get(key)
        .ok_or_else(|| TransformError::MissingKey(key.to_string()))?;
    let Value::Object(block) = block else {
        return Err(TransformError::NotAnObject(key.to_string()));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut by_time: BTreeMap<NaiveDateTime, BTreeMap<usize, f64>> = BTreeMap::new();

    for (raw_ts, record) in block {
        let ts = parse_timestamp(raw_ts)?;
        let Value::Object(record) = record else {
            return Err(TransformError::NotAnObject(raw_ts.clone()));
        };

        let mut cells = BTreeMap::new();
        for (column, value) in record {
            let v = parse_number(value).ok_or_else(|| TransformError::NonNumeric {
                timestamp: raw_ts.clone(),
                column: column.clone(),
                value: value.to_string(),
            })?;
            let j = match columns.iter().position(|c| c == column) {
                Some(j) => j,
                None => {
                    columns.push(column.clone());
                    columns.len() - 1
                }
            };
            cells.insert(j, v);
        }
        by_time.insert(ts, cells);
    }

    let width = columns.len();
    let (index, rows): (Vec<NaiveDateTime>, Vec<Vec<f64>>) = by_time
        .into_iter()
        .map(|(ts, cells)| {
            let mut row = vec![f64::NAN; width];
            for (j, v) in cells {
                row[j] = v;
            }
            (ts, row)
        })
        .unzip();

    Ok(IndicatorSeries {
        columns,
        index,
        rows,
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DD HH:MM:SS`.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TransformError> {
    let raw_trimmed = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw_trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw_trimmed, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw_trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TransformError::BadTimestamp(raw.to_string()))
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
