use serde::{Serialize, Serializer};
use std::fmt;

// wide tables are elided past this many columns
const MAX_COLUMNS: usize = 30;
const MIN_CELL_WIDTH: usize = 12;
const STAT_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics of one column.
///
/// `NaN` cells are skipped and not counted; infinities take part in every
/// statistic and propagate as IEEE arithmetic dictates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    #[serde(serialize_with = "serialize_f64")]
    pub mean: f64,
    #[serde(serialize_with = "serialize_f64")]
    pub std: f64,
    #[serde(serialize_with = "serialize_f64")]
    pub min: f64,
    #[serde(rename = "25%", serialize_with = "serialize_f64")]
    pub q25: f64,
    #[serde(rename = "50%", serialize_with = "serialize_f64")]
    pub q50: f64,
    #[serde(rename = "75%", serialize_with = "serialize_f64")]
    pub q75: f64,
    #[serde(serialize_with = "serialize_f64")]
    pub max: f64,
}

/// Writes a finite `f64` as a number and anything else as `"inf"`, `"-inf"`
/// or `"NaN"`, which JSON has no literal for.
pub fn serialize_f64<S: Serializer>(t: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if t.is_finite() {
        serializer.serialize_f64(*t)
    } else if t.is_nan() {
        serializer.serialize_str("NaN")
    } else if *t > 0.0 {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

impl Summary {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut values: Vec<f64> = values.into_iter().filter(|t| !t.is_nan()).collect();
        values.sort_by(f64::total_cmp);
        let count = values.len();
        if count == 0 {
            return Summary {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        // sample standard deviation (ddof = 1)
        let std = if count > 1 {
            (values.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };
        Summary {
            count,
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values[count - 1],
        }
    }

    fn cells(&self) -> [f64; 7] {
        [
            self.mean, self.std, self.min, self.q25, self.q50, self.q75, self.max,
        ]
    }
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Per-column summaries of a frame, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Description(Vec<(String, Summary)>);

impl Description {
    pub fn new(columns: Vec<(String, Summary)>) -> Self {
        Description(columns)
    }

    pub fn get(&self, column: &str) -> Option<&Summary> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Summary)> {
        self.0.iter().map(|(c, s)| (c.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // None stands for the elision marker
    fn shown(&self) -> Vec<Option<&(String, Summary)>> {
        if self.0.len() <= MAX_COLUMNS {
            self.0.iter().map(Some).collect()
        } else {
            let half = MAX_COLUMNS / 2;
            self.0[..half]
                .iter()
                .map(Some)
                .chain(std::iter::once(None))
                .chain(self.0[self.0.len() - half..].iter().map(Some))
                .collect()
        }
    }
}

impl Serialize for Description {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(c, s)| (c, s)))
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.shown();
        let widths: Vec<usize> = shown
            .iter()
            .map(|cell| cell.map_or(3, |(c, _)| c.chars().count().max(MIN_CELL_WIDTH)))
            .collect();

        write!(f, "{:<5}", "")?;
        for (cell, &w) in shown.iter().zip(&widths) {
            write!(f, "  {:>w$}", cell.map_or("...", |(c, _)| c.as_str()), w = w)?;
        }
        writeln!(f)?;

        write!(f, "{:<5}", STAT_NAMES[0])?;
        for (cell, &w) in shown.iter().zip(&widths) {
            match cell {
                Some((_, s)) => write!(f, "  {:>w$}", s.count, w = w)?,
                None => write!(f, "  {:>w$}", "...", w = w)?,
            }
        }
        for (i, name) in STAT_NAMES[1..].iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<5}", name)?;
            for (cell, &w) in shown.iter().zip(&widths) {
                match cell {
                    Some((_, s)) => write!(f, "  {:>w$.6}", s.cells()[i], w = w)?,
                    None => write!(f, "  {:>w$}", "...", w = w)?,
                }
            }
        }
        writeln!(f)
    }
}
