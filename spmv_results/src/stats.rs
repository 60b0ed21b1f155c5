use serde::Serialize;
use spmv_frame::{serialize_f64, Description, Frame, FrameError};
use std::fmt;

use crate::NNZ;

/// Keeps the matrices with strictly more than `threshold` nonzeros.
pub fn filter_min_nnz(frame: &Frame, threshold: f64) -> Result<Frame, FrameError> {
    if !frame.has_column(NNZ) {
        return Err(FrameError::MissingColumn(NNZ.to_string()));
    }
    Ok(frame.filter(|row| row.get(NNZ).map_or(false, |nnz| nnz > threshold)))
}

// descriptive statistics of one column, or of every column when none is named
pub fn describe(frame: &Frame, column: Option<&str>) -> Result<Description, FrameError> {
    match column {
        Some(column) => Ok(Description::new(vec![(
            column.to_string(),
            frame.column(column)?.describe(),
        )])),
        None => Ok(frame.describe()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRow {
    pub matrix: String,
    #[serde(serialize_with = "serialize_f64")]
    pub baseline: f64,
    #[serde(serialize_with = "serialize_f64")]
    pub value: f64,
    #[serde(serialize_with = "serialize_f64")]
    pub nnz: f64,
}

/// The matrices with the largest values in `column`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Top {
    pub column: String,
    pub baseline: String,
    pub rows: Vec<TopRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub label: String,
    pub matrices: usize,
    pub description: Description,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Top>,
}

pub fn stats_report(
    label: &str,
    frame: &Frame,
    column: Option<&str>,
    nlargest: Option<usize>,
    baseline: &str,
) -> Result<StatsReport, FrameError> {
    let description = describe(frame, column)?;
    let top = match (column, nlargest) {
        (Some(column), Some(n)) => {
            let rows = frame
                .nlargest(n, column)?
                .into_iter()
                .map(|row| TopRow {
                    matrix: row.label().to_string(),
                    baseline: row.get(baseline).unwrap_or(f64::NAN),
                    value: row.get(column).unwrap_or(f64::NAN),
                    nnz: row.get(NNZ).unwrap_or(f64::NAN),
                })
                .collect();
            Some(Top {
                column: column.to_string(),
                baseline: baseline.to_string(),
                rows,
            })
        }
        _ => None,
    };
    Ok(StatsReport {
        label: label.to_string(),
        matrices: frame.len(),
        description,
        top,
    })
}

pub fn print_stats(report: &StatsReport) {
    print!("{}", report);
}

impl fmt::Display for Top {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .rows
            .iter()
            .map(|r| r.matrix.chars().count())
            .chain(std::iter::once("matrix".len()))
            .max()
            .unwrap_or(0);
        let (bw, vw) = (self.baseline.len().max(12), self.column.len().max(12));
        writeln!(f, "Largest {} by {}:", self.rows.len(), self.column)?;
        writeln!(
            f,
            "{:<nw$}  {:>bw$}  {:>vw$}  {:>12}",
            "matrix",
            self.baseline,
            self.column,
            NNZ,
            nw = name_width,
            bw = bw,
            vw = vw
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<nw$}  {:>bw$.6}  {:>vw$.6}  {:>12}",
                row.matrix,
                row.baseline,
                row.value,
                row.nnz,
                nw = name_width,
                bw = bw,
                vw = vw
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data for {} => ", self.label)?;
        write!(f, "{}", self.description)?;
        if let Some(top) = &self.top {
            write!(f, "{}", top)?;
        }
        Ok(())
    }
}
