#![deny(clippy::disallowed_methods)]

use itertools::{EitherOrBoth, Itertools};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    ops::Div,
};
use thiserror::Error;

#[cfg(feature = "arbitrary")]
pub mod arbitrary;
mod describe;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

pub use describe::{quantile, serialize_f64, Description, Summary};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("column {0:?} not found")]
    MissingColumn(String),
    #[error("row {0:?} not found")]
    MissingRow(String),
    #[error("column {0:?} appears more than once")]
    DuplicateColumn(String),
    #[error("row {0:?} appears more than once")]
    DuplicateLabel(String),
    #[error("row {label:?} has {found} cells, expected {expected}")]
    WidthMismatch {
        label: String,
        expected: usize,
        found: usize,
    },
}

/// A table of `f64` cells whose rows are addressed by label (a matrix file
/// name) and whose columns are addressed by name.
///
/// Rows are kept in label order. A missing measurement is stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: BTreeMap<String, Vec<f64>>,
}

// pair of frames to be joined on their labels
#[derive(Clone, Debug)]
pub struct JoinPair(pub Frame, pub Frame);

/// Borrowed view of a single row.
#[derive(Clone, Copy, Debug)]
pub struct RowRef<'a> {
    label: &'a str,
    columns: &'a [String],
    values: &'a [f64],
}

impl<'a> RowRef<'a> {
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// One cell of a frame after reshaping from wide to long.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub label: String,
    pub variable: String,
    pub value: f64,
}

fn check_unique_columns(columns: &[String]) -> Result<(), FrameError> {
    let mut seen = HashSet::new();
    match columns.iter().find(|c| !seen.insert(c.as_str())) {
        Some(c) => Err(FrameError::DuplicateColumn(c.clone())),
        None => Ok(()),
    }
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Result<Self, FrameError> {
        check_unique_columns(&columns)?;
        Ok(Frame {
            columns,
            rows: BTreeMap::new(),
        })
    }

    pub fn from_rows<I>(columns: Vec<String>, rows: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (String, Vec<f64>)>,
    {
        let mut frame = Frame::new(columns)?;
        for (label, values) in rows {
            frame.push_row(label, values)?;
        }
        Ok(frame)
    }

    pub fn push_row(&mut self, label: String, values: Vec<f64>) -> Result<(), FrameError> {
        if values.len() != self.columns.len() {
            return Err(FrameError::WidthMismatch {
                label,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        if self.rows.contains_key(&label) {
            return Err(FrameError::DuplicateLabel(label));
        }
        self.rows.insert(label, values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    // the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn position(&self, column: &str) -> Result<usize, FrameError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| FrameError::MissingColumn(column.to_string()))
    }

    pub fn get(&self, label: &str, column: &str) -> Result<f64, FrameError> {
        let j = self.position(column)?;
        self.rows
            .get(label)
            .map(|values| values[j])
            .ok_or_else(|| FrameError::MissingRow(label.to_string()))
    }

    pub fn row(&self, label: &str) -> Option<RowRef<'_>> {
        self.rows
            .get_key_value(label)
            .map(|(label, values)| self.row_ref(label, values))
    }

    fn row_ref<'a>(&'a self, label: &'a str, values: &'a [f64]) -> RowRef<'a> {
        RowRef {
            label,
            columns: &self.columns,
            values,
        }
    }

    // output rows in label order
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows
            .iter()
            .map(move |(label, values)| self.row_ref(label, values))
    }

    pub fn column(&self, name: &str) -> Result<Series, FrameError> {
        let j = self.position(name)?;
        Ok(Series {
            name: name.to_string(),
            values: self
                .rows
                .iter()
                .map(|(label, values)| (label.clone(), values[j]))
                .collect(),
        })
    }

    /// Replaces the column named after `series`, or appends it if the frame
    /// has no such column. Cells are matched by label; rows the series does
    /// not cover become `NaN` and series labels the frame lacks are ignored.
    pub fn insert_series(&mut self, series: Series) {
        let j = match self.position(&series.name) {
            Ok(j) => j,
            Err(_) => {
                self.columns.push(series.name.clone());
                self.rows.values_mut().for_each(|values| values.push(f64::NAN));
                self.columns.len() - 1
            }
        };
        for (label, values) in self.rows.iter_mut() {
            values[j] = series.get(label).unwrap_or(f64::NAN);
        }
    }

    /// Joins two frames on their row labels, keeping only labels found in both.
    ///
    /// Columns present in both frames are renamed with a `_x` suffix on the
    /// left and a `_y` suffix on the right.
    pub fn inner_join(&self, other: &Frame) -> Result<Frame, FrameError> {
        let overlap: HashSet<&str> = self
            .columns
            .iter()
            .filter(|c| other.has_column(c))
            .map(String::as_str)
            .collect();
        let suffixed = |c: &String, suffix: &str| {
            if overlap.contains(c.as_str()) {
                format!("{}{}", c, suffix)
            } else {
                c.clone()
            }
        };
        let columns: Vec<_> = self
            .columns
            .iter()
            .map(|c| suffixed(c, "_x"))
            .chain(other.columns.iter().map(|c| suffixed(c, "_y")))
            .collect();
        check_unique_columns(&columns)?;

        let rows = self
            .rows
            .iter()
            .merge_join_by(&other.rows, |(l, _), (r, _)| l.cmp(r))
            .filter_map(|eob| match eob {
                EitherOrBoth::Both((label, left), (_, right)) => {
                    Some((label.clone(), left.iter().chain(right).copied().collect()))
                }
                EitherOrBoth::Left(_) | EitherOrBoth::Right(_) => None,
            })
            .collect();
        Ok(Frame { columns, rows })
    }

    pub fn filter<P>(&self, mut pred: P) -> Frame
    where
        P: FnMut(&RowRef<'_>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|(label, values)| pred(&self.row_ref(label, values)))
            .map(|(label, values)| (label.clone(), values.clone()))
            .collect();
        Frame {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Frame, FrameError> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        check_unique_columns(&columns)?;
        let positions = columns
            .iter()
            .map(|c| self.position(c))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|(label, values)| (label.clone(), positions.iter().map(|&j| values[j]).collect()))
            .collect();
        Ok(Frame { columns, rows })
    }

    pub fn drop_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<Frame, FrameError> {
        for c in columns {
            self.position(c.as_ref())?;
        }
        let kept: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !columns.iter().any(|d| d.as_ref() == *c))
            .collect();
        self.select(&kept)
    }

    /// The rows named in `labels`. Like every frame, the result is in label
    /// order, and a label listed twice appears once.
    pub fn select_rows<S: AsRef<str>>(&self, labels: &[S]) -> Result<Frame, FrameError> {
        let rows = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.rows
                    .get_key_value(label)
                    .map(|(label, values)| (label.clone(), values.clone()))
                    .ok_or_else(|| FrameError::MissingRow(label.to_string()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Frame {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// The `n` rows with the largest values in `column`, largest first.
    /// `NaN` cells rank below every number.
    pub fn nlargest(&self, n: usize, column: &str) -> Result<Vec<RowRef<'_>>, FrameError> {
        let j = self.position(column)?;
        let mut rows: Vec<_> = self.rows().collect();
        rows.sort_by(|a, b| descending_nan_last(a.values[j], b.values[j]));
        rows.truncate(n);
        Ok(rows)
    }

    // one record per cell, in row order and then column order
    pub fn melt(&self) -> Vec<LongRecord> {
        self.rows
            .iter()
            .flat_map(|(label, values)| {
                self.columns
                    .iter()
                    .zip(values)
                    .map(move |(variable, &value)| LongRecord {
                        label: label.clone(),
                        variable: variable.clone(),
                        value,
                    })
            })
            .collect()
    }

    pub fn describe(&self) -> Description {
        Description::new(
            self.columns
                .iter()
                .enumerate()
                .map(|(j, c)| {
                    (
                        c.clone(),
                        Summary::from_values(self.rows.values().map(|values| values[j])),
                    )
                })
                .collect(),
        )
    }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// A named column of `f64` values addressed by row label.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    values: BTreeMap<String, f64>,
}

impl Series {
    pub fn new<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Series {
            name: name.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.values.get(label).copied()
    }

    // output (label, value) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(label, &t)| (label.as_str(), t))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    pub fn describe(&self) -> Summary {
        Summary::from_values(self.values())
    }

    fn apply_elementwise<F>(&self, rhs: &Self, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let values = self
            .values
            .iter()
            .merge_join_by(&rhs.values, |(l, _), (r, _)| l.cmp(r))
            .map(|eob| match eob {
                EitherOrBoth::Both((label, &t1), (_, &t2)) => (label.clone(), f(t1, t2)),
                // labels present on one side only have nothing to pair with
                EitherOrBoth::Left((label, _)) | EitherOrBoth::Right((label, _)) => {
                    (label.clone(), f64::NAN)
                }
            })
            .collect();
        Series {
            name: self.name.clone(),
            values,
        }
    }
}

impl Div for &Series {
    type Output = Series;

    fn div(self, rhs: Self) -> Self::Output {
        self.apply_elementwise(rhs, |t1, t2| t1 / t2)
    }
}
