#![deny(clippy::disallowed_methods)]

use cap_std::fs::Dir;
use serde_json::Value;
use spmv_frame::{Frame, FrameError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

pub mod speedup;
pub mod stats;
#[cfg(test)]
mod tests;

pub use speedup::{calculate_speedup, SpeedupError, DEFAULT_BASELINE};
pub use stats::{describe, filter_min_nnz, print_stats, stats_report, StatsReport, Top, TopRow};

pub const MATRICES_INFO: &str = "matrices_info.json";

pub const NNZ: &str = "nnz";
pub const ROWS: &str = "rows";
pub const COLS: &str = "cols";
pub const NNZPR: &str = "nnzpr";
pub const STD_DEVIATION: &str = "std_deviation";
// columns describing the matrix rather than a kernel
pub const STRUCTURAL_COLUMNS: [&str; 5] = [NNZ, ROWS, COLS, NNZPR, STD_DEVIATION];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {file}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object {0}")]
    Shape(String),
    #[error("cell ({row:?}, {column:?}) is not a number")]
    NonNumeric { row: String, column: String },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// The tables loaded for one dataset (e.g. `float` or `double`).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub label: String,
    // raw per-kernel timings
    pub source: Frame,
    // timings joined with matrix metadata, plus nnzpr
    pub merged: Frame,
}

/// Parses a JSON object of objects: matrix name -> field name -> number.
///
/// Columns are the union of the inner keys in the order they are first seen.
/// A field a matrix does not report, or reports as `null`, is `NaN`.
pub fn parse_table(input: &str) -> Result<Frame, LoadError> {
    let outer = match serde_json::from_str::<Value>(input)? {
        Value::Object(outer) => outer,
        _ => return Err(LoadError::Shape("at the top level".to_string())),
    };

    let mut columns: Vec<String> = vec![];
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(outer.len());
    for (label, inner) in outer {
        let inner = match inner {
            Value::Object(inner) => inner,
            _ => return Err(LoadError::Shape(format!("for matrix {:?}", label))),
        };
        let mut cells = Vec::with_capacity(inner.len());
        for (column, value) in inner {
            let t = match value {
                Value::Null => f64::NAN,
                Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                _ => return Err(LoadError::NonNumeric { row: label, column }),
            };
            let j = *index.entry(column.clone()).or_insert_with(|| {
                columns.push(column);
                columns.len() - 1
            });
            cells.push((j, t));
        }
        rows.push((label, cells));
    }

    let width = columns.len();
    let rows = rows.into_iter().map(|(label, cells)| {
        let mut values = vec![f64::NAN; width];
        for (j, t) in cells {
            values[j] = t;
        }
        (label, values)
    });
    Ok(Frame::from_rows(columns, rows)?)
}

fn read(dir: &Dir, file: &str) -> Result<String, LoadError> {
    dir.read_to_string(file).map_err(|source| LoadError::Io {
        file: file.to_string(),
        source,
    })
}

/// Loads `{dataset}.json` and [`MATRICES_INFO`] from `dir` and joins them on
/// the matrix name. Matrices missing from either file are dropped.
pub fn load_data(dir: &Dir, dataset: &str) -> Result<Dataset, LoadError> {
    let info = parse_table(&read(dir, MATRICES_INFO)?)?;
    let source = parse_table(&read(dir, &format!("{}.json", dataset))?)?;
    debug!(
        dataset,
        kernels = source.columns().len(),
        timed = source.len(),
        described = info.len(),
        "parsed result files"
    );

    let merged = with_nnzpr(source.inner_join(&info)?)?;
    info!(
        dataset,
        matrices = merged.len(),
        dropped = source.len() - merged.len(),
        "loaded results"
    );
    Ok(Dataset {
        label: dataset.to_string(),
        source,
        merged,
    })
}

// nonzeros per row
pub fn with_nnzpr(mut merged: Frame) -> Result<Frame, FrameError> {
    let nnzpr = (&merged.column(NNZ)? / &merged.column(ROWS)?).rename(NNZPR);
    merged.insert_series(nnzpr);
    Ok(merged)
}
