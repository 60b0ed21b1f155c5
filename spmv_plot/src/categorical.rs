use itertools::Itertools;
use plotters::{coord::Shift, data::Quartiles, prelude::*};
use spmv_frame::{Frame, LongRecord};
use spmv_results::STRUCTURAL_COLUMNS;
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::{caption_font, padded_range, DrawResult, Figure, PlotError};

const GROUP_WIDTH: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Bar,
    Box,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bar => "bar",
            Kind::Box => "box",
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(Kind::Bar),
            "box" => Ok(Kind::Box),
            _ => Err(format!("unknown categorical plot {:?}, expected bar or box", s)),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kernel values for a hand-picked set of matrices, in long form.
pub struct Categorical {
    title: String,
    kind: Kind,
    matrices: Vec<String>,
    kernels: Vec<String>,
    records: Vec<LongRecord>,
}

impl Categorical {
    /// Keeps the rows named in `matrices` (every row when it is empty), drops
    /// the structural columns that are present and the `placeholder` column,
    /// then melts what is left.
    ///
    /// Matrices are drawn in the order they are listed, and a repeated name is
    /// drawn once.
    pub fn new<S: AsRef<str>>(
        frame: &Frame,
        matrices: &[S],
        placeholder: Option<&str>,
        kind: Kind,
    ) -> Result<Self, PlotError> {
        let selected = if matrices.is_empty() {
            frame.clone()
        } else {
            frame.select_rows(matrices)?
        };
        let mut dropped: Vec<&str> = STRUCTURAL_COLUMNS
            .iter()
            .copied()
            .filter(|c| selected.has_column(c))
            .collect();
        if let Some(placeholder) = placeholder {
            if !dropped.contains(&placeholder) {
                dropped.push(placeholder);
            }
        }
        let kept = selected.drop_columns(&dropped)?;
        let order: Vec<String> = if matrices.is_empty() {
            kept.labels().map(str::to_string).collect()
        } else {
            matrices.iter().map(|m| m.as_ref().to_string()).unique().collect()
        };
        let mut records = kept.melt();
        // stable, so kernels keep their column order within a matrix
        records.sort_by_key(|r| order.iter().position(|m| *m == r.label));
        if records.is_empty() {
            return Err(PlotError::Degenerate {
                what: format!("{} plot", kind),
                reason: "no matrix and kernel left after dropping columns",
            });
        }
        debug!(
            kind = kind.name(),
            matrices = kept.len(),
            kernels = kept.columns().len(),
            records = records.len(),
            "reshaped to long form"
        );
        Ok(Categorical {
            title: format!("{} plot of {} matrices", kind, kept.len()),
            kind,
            matrices: order,
            kernels: kept.columns().to_vec(),
            records,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn records(&self) -> &[LongRecord] {
        &self.records
    }

    pub fn kernels(&self) -> &[String] {
        &self.kernels
    }

    pub fn matrices(&self) -> &[String] {
        &self.matrices
    }

    fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.value).filter(|t| t.is_finite())
    }

    fn draw_bars<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a> {
        let hi = self.finite_values().fold(0.0, f64::max);
        let lo = self.finite_values().fold(0.0, f64::min);
        let n = self.matrices.len();
        let mut chart = ChartBuilder::on(root)
            .caption(self.name(), caption_font())
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..n as f64 - 0.5, lo..padded_range(lo, hi).end)?;
        let label_of = |x: &f64| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < n {
                self.matrices[i as usize].clone()
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_of)
            .y_desc("speedup")
            .draw()?;

        let bar = GROUP_WIDTH / self.kernels.len() as f64;
        for (j, kernel) in self.kernels.iter().enumerate() {
            let color = Palette99::pick(j).mix(0.9);
            let bars = self
                .records
                .iter()
                .filter(|r| &r.variable == kernel && r.value.is_finite())
                .filter_map(|r| {
                    let i = self.matrices.iter().position(|m| *m == r.label)?;
                    let x0 = i as f64 - GROUP_WIDTH / 2.0 + bar * j as f64;
                    Some(Rectangle::new([(x0, 0.0), (x0 + bar, r.value)], color.filled()))
                });
            chart
                .draw_series(bars)?
                .label(kernel.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_boxes<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a> {
        let hi = self.finite_values().fold(f64::NEG_INFINITY, f64::max);
        let lo = self.finite_values().fold(f64::INFINITY, f64::min);
        let y_range = padded_range(lo, hi);
        let mut chart = ChartBuilder::on(root)
            .caption(self.name(), caption_font())
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(
                self.kernels.as_slice().into_segmented(),
                y_range.start as f32..y_range.end as f32,
            )?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("speedup")
            .draw()?;

        for (j, kernel) in self.kernels.iter().enumerate() {
            let values: Vec<f64> = self
                .records
                .iter()
                .filter(|r| &r.variable == kernel && r.value.is_finite())
                .map(|r| r.value)
                .collect();
            if values.is_empty() {
                continue;
            }
            let quartiles = Quartiles::new(&values);
            chart.draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(kernel), &quartiles)
                    .width(30)
                    .style(Palette99::pick(j).stroke_width(2)),
            ))?;
        }
        Ok(())
    }
}

impl Figure for Categorical {
    fn name(&self) -> String {
        self.title.clone()
    }

    fn draw<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a> {
        match self.kind {
            Kind::Bar => self.draw_bars(root),
            Kind::Box => self.draw_boxes(root),
        }
    }
}
