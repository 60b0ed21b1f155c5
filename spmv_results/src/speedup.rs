use spmv_frame::{Frame, FrameError};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASELINE: &str = "CPU CSR";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeedupError {
    #[error("baseline column {0:?} is not among the timings")]
    MissingBaseline(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Replaces every timing column of `merged` with `baseline / column`.
///
/// Ratios are taken row by row on `source`, then matched to `merged` by
/// matrix name. Columns of `merged` that are not timings are left untouched.
/// The baseline itself is included and comes out as `1.0`. A zero or missing
/// duration is not guarded against; its `inf`/`NaN` ratio is kept.
pub fn calculate_speedup(
    merged: &Frame,
    source: &Frame,
    baseline: &str,
) -> Result<Frame, SpeedupError> {
    let base = source
        .column(baseline)
        .map_err(|_| SpeedupError::MissingBaseline(baseline.to_string()))?;

    let mut speedup = merged.clone();
    for column in source.columns() {
        let ratio = (&base / &source.column(column)?).rename(column.as_str());
        let non_finite = speedup
            .labels()
            .filter(|label| ratio.get(label).map_or(true, |t| !t.is_finite()))
            .count();
        if non_finite > 0 {
            warn!(column = column.as_str(), non_finite, "speedup is not finite");
        }
        speedup.insert_series(ratio);
    }
    debug!(baseline, kernels = source.columns().len(), "computed speedups");
    Ok(speedup)
}
