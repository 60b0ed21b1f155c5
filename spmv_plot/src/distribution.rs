use plotters::{coord::Shift, prelude::*};
use spmv_frame::Frame;
use spmv_results::filter_min_nnz;
use std::ops::Range;
use tracing::debug;

use crate::{caption_font, kde::GaussianKde, DrawResult, Figure, PlotError};

const GRID_POINTS: usize = 256;
const HISTOGRAM_BINS: usize = 40;
pub const DEFAULT_X_RANGE: Range<f64> = 0.0..10.0;

/// One curve of a distribution plot.
#[derive(Clone, Debug, PartialEq)]
pub struct DensitySeries {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub density: f64,
}

/// Density-normalised histogram of the finite values inside `range`.
/// The last bin is closed on the right.
pub fn histogram(values: &[f64], range: Range<f64>, bins: usize) -> Vec<Bin> {
    if bins == 0 || range.is_empty() {
        return vec![];
    }
    let width = (range.end - range.start) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &t in values {
        if t.is_finite() && range.start <= t && t <= range.end {
            let i = (((t - range.start) / width) as usize).min(bins - 1);
            counts[i] += 1;
        }
    }
    let total: usize = counts.iter().sum();
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: range.start + width * i as f64,
            hi: range.start + width * (i + 1) as f64,
            density: if total == 0 {
                0.0
            } else {
                count as f64 / (total as f64 * width)
            },
        })
        .collect()
}

/// One series per nnz threshold, each holding `column` for the matrices with
/// more nonzeros than the threshold.
pub fn threshold_series(
    frame: &Frame,
    column: &str,
    thresholds: &[f64],
) -> Result<Vec<DensitySeries>, PlotError> {
    thresholds
        .iter()
        .map(|&t| -> Result<DensitySeries, PlotError> {
            let kept = filter_min_nnz(frame, t)?;
            Ok(DensitySeries {
                label: format!("nnz > {}", t),
                values: kept.column(column)?.values().collect(),
            })
        })
        .collect()
}

// one series per column, over every row
pub fn column_series<S: AsRef<str>>(frame: &Frame, columns: &[S]) -> Result<Vec<DensitySeries>, PlotError> {
    columns
        .iter()
        .map(|c| -> Result<DensitySeries, PlotError> {
            Ok(DensitySeries {
                label: c.as_ref().to_string(),
                values: frame.column(c.as_ref())?.values().collect(),
            })
        })
        .collect()
}

struct Curve {
    label: String,
    points: Vec<(f64, f64)>,
    bins: Vec<Bin>,
}

/// Overlaid kernel density estimates on a fixed x range.
pub struct Distribution {
    title: String,
    x_label: String,
    x_range: Range<f64>,
    curves: Vec<Curve>,
}

impl Distribution {
    pub fn new(
        title: &str,
        x_label: &str,
        series: Vec<DensitySeries>,
        x_range: Range<f64>,
        with_histogram: bool,
    ) -> Result<Self, PlotError> {
        if x_range.is_empty() {
            return Err(PlotError::Degenerate {
                what: title.to_string(),
                reason: "empty x range",
            });
        }
        let curves = series
            .into_iter()
            .map(|s| -> Result<Curve, PlotError> {
                let kde = GaussianKde::new(&s.label, &s.values)?;
                debug!(
                    series = s.label.as_str(),
                    samples = kde.len(),
                    bandwidth = kde.bandwidth(),
                    "estimated density"
                );
                Ok(Curve {
                    points: kde.grid(x_range.clone(), GRID_POINTS),
                    bins: if with_histogram {
                        histogram(&s.values, x_range.clone(), HISTOGRAM_BINS)
                    } else {
                        vec![]
                    },
                    label: s.label,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Distribution {
            title: title.to_string(),
            x_label: x_label.to_string(),
            x_range,
            curves,
        })
    }

    fn y_max(&self) -> f64 {
        self.curves
            .iter()
            .flat_map(|c| {
                c.points
                    .iter()
                    .map(|&(_, y)| y)
                    .chain(c.bins.iter().map(|b| b.density))
            })
            .fold(0.0, f64::max)
    }
}

impl Figure for Distribution {
    fn name(&self) -> String {
        self.title.clone()
    }

    fn draw<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a> {
        let y_max = self.y_max().max(f64::EPSILON) * 1.1;
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, caption_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(self.x_range.clone(), 0f64..y_max)?;
        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc("density")
            .draw()?;

        for (i, curve) in self.curves.iter().enumerate() {
            let color = Palette99::pick(i).mix(1.0);
            if !curve.bins.is_empty() {
                let fill = Palette99::pick(i).mix(0.3).filled();
                chart.draw_series(
                    curve
                        .bins
                        .iter()
                        .map(|b| Rectangle::new([(b.lo, 0.0), (b.hi, b.density)], fill)),
                )?;
            }
            chart
                .draw_series(LineSeries::new(
                    curve.points.iter().copied(),
                    color.stroke_width(2),
                ))?
                .label(curve.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}
