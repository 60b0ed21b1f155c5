use spmv_frame::Summary;
use std::{f64::consts::PI, ops::Range};

use crate::PlotError;

/// Gaussian kernel density estimate with Scott's bandwidth,
/// `h = sigma * n^(-1/5)`.
#[derive(Clone, Debug)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    // non-finite samples are dropped
    pub fn new(what: &str, samples: &[f64]) -> Result<Self, PlotError> {
        let samples: Vec<f64> = samples.iter().copied().filter(|t| t.is_finite()).collect();
        if samples.len() < 2 {
            return Err(PlotError::Degenerate {
                what: what.to_string(),
                reason: "fewer than two finite values",
            });
        }
        let std = Summary::from_values(samples.iter().copied()).std;
        if std.is_nan() || std <= 0.0 {
            return Err(PlotError::Degenerate {
                what: what.to_string(),
                reason: "all values are equal",
            });
        }
        let bandwidth = std * (samples.len() as f64).powf(-0.2);
        Ok(GaussianKde { samples, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.samples.len() as f64 * h * (2.0 * PI).sqrt());
        norm * self
            .samples
            .iter()
            .map(|xi| (-0.5 * ((x - xi) / h).powi(2)).exp())
            .sum::<f64>()
    }

    // `points` evenly spaced evaluations covering `range`, ends included
    pub fn grid(&self, range: Range<f64>, points: usize) -> Vec<(f64, f64)> {
        let points = points.max(2);
        let step = (range.end - range.start) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = range.start + step * i as f64;
                (x, self.evaluate(x))
            })
            .collect()
    }
}
