use itertools::{Itertools, MinMaxResult};
use plotters::{coord::Shift, prelude::*};
use spmv_frame::Frame;
use spmv_results::NNZPR;
use tracing::debug;

use crate::{caption_font, distribution::histogram, padded_range, DrawResult, Figure, PlotError};

const MARGINAL_BINS: usize = 30;

/// Ordinary least-squares line `y = slope * x + intercept`, with Pearson's r.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
}

impl Fit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_fit(points: &[(f64, f64)]) -> Result<Fit, PlotError> {
    if points.len() < 2 {
        return Err(PlotError::Degenerate {
            what: "regression".to_string(),
            reason: "fewer than two points",
        });
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return Err(PlotError::Degenerate {
            what: "regression".to_string(),
            reason: "x has zero variance",
        });
    }
    let slope = sxy / sxx;
    Ok(Fit {
        slope,
        intercept: mean_y - slope * mean_x,
        // NaN when y is constant
        r: sxy / (sxx * syy).sqrt(),
    })
}

/// Scatter of one column against nonzeros per row, with its regression line
/// and a histogram of each axis along the edges.
pub struct Joint {
    title: String,
    column: String,
    points: Vec<(f64, f64)>,
    fit: Fit,
}

impl Joint {
    pub fn new(frame: &Frame, column: &str) -> Result<Self, PlotError> {
        let x = frame.column(NNZPR)?;
        let y = frame.column(column)?;
        let points: Vec<(f64, f64)> = x
            .iter()
            .filter_map(|(label, x)| Some((x, y.get(label)?)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        let fit = linear_fit(&points).map_err(|e| match e {
            PlotError::Degenerate { reason, .. } => PlotError::Degenerate {
                what: format!("{} against {}", column, NNZPR),
                reason,
            },
            e => e,
        })?;
        debug!(
            column,
            points = points.len(),
            slope = fit.slope,
            intercept = fit.intercept,
            r = fit.r,
            "fitted regression"
        );
        Ok(Joint {
            title: format!("{} vs {}", column, NNZPR),
            column: column.to_string(),
            points,
            fit,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn fit(&self) -> Fit {
        self.fit
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    fn bounds(&self, axis: impl Fn(&(f64, f64)) -> f64) -> (f64, f64) {
        match self.points.iter().map(axis).minmax() {
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
            MinMaxResult::OneElement(t) => (t, t),
            MinMaxResult::NoElements => (0.0, 1.0),
        }
    }
}

impl Figure for Joint {
    fn name(&self) -> String {
        self.title.clone()
    }

    fn draw<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a> {
        let title = format!(
            "{}: y = {:.4}x + {:.4}, r = {:.3}",
            self.title, self.fit.slope, self.fit.intercept, self.fit.r
        );
        let root = root.titled(&title, caption_font())?;
        let (w, h) = root.dim_in_pixel();
        let (top, bottom) = root.split_vertically(h as f32 * 0.2);
        let (top, _) = top.split_horizontally(w as f32 * 0.8);
        let (main, right) = bottom.split_horizontally(w as f32 * 0.8);

        let (x_lo, x_hi) = self.bounds(|p| p.0);
        let (y_lo, y_hi) = self.bounds(|p| p.1);
        let (x_range, y_range) = (padded_range(x_lo, x_hi), padded_range(y_lo, y_hi));

        let mut chart = ChartBuilder::on(&main)
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;
        chart
            .configure_mesh()
            .x_desc(NNZPR)
            .y_desc(self.column.as_str())
            .draw()?;
        chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 3, BLUE.mix(0.6).filled())),
        )?;
        chart.draw_series(LineSeries::new(
            [x_range.start, x_range.end]
                .into_iter()
                .map(|x| (x, self.fit.at(x))),
            RED.stroke_width(2),
        ))?;

        let xs: Vec<f64> = self.points.iter().map(|p| p.0).collect();
        let x_bins = histogram(&xs, x_range.clone(), MARGINAL_BINS);
        let x_max = x_bins.iter().map(|b| b.density).fold(f64::EPSILON, f64::max);
        let mut chart = ChartBuilder::on(&top)
            .margin(10)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0f64..x_max * 1.1)?;
        chart.draw_series(
            x_bins
                .iter()
                .map(|b| Rectangle::new([(b.lo, 0.0), (b.hi, b.density)], BLUE.mix(0.4).filled())),
        )?;

        let ys: Vec<f64> = self.points.iter().map(|p| p.1).collect();
        let y_bins = histogram(&ys, y_range.clone(), MARGINAL_BINS);
        let y_max = y_bins.iter().map(|b| b.density).fold(f64::EPSILON, f64::max);
        let mut chart = ChartBuilder::on(&right)
            .margin(10)
            .x_label_area_size(45)
            .build_cartesian_2d(0f64..y_max * 1.1, y_range)?;
        chart.draw_series(
            y_bins
                .iter()
                .map(|b| Rectangle::new([(0.0, b.lo), (b.density, b.hi)], BLUE.mix(0.4).filled())),
        )?;
        Ok(())
    }
}
