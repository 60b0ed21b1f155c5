#![deny(clippy::disallowed_methods)]

use plotters::{coord::Shift, prelude::*};
use spmv_frame::FrameError;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::info;

pub mod categorical;
pub mod distribution;
pub mod joint;
pub mod kde;

pub use categorical::{Categorical, Kind};
pub use distribution::{
    column_series, histogram, threshold_series, Bin, DensitySeries, Distribution, DEFAULT_X_RANGE,
};
pub use joint::{linear_fit, Fit, Joint};
pub use kde::GaussianKde;

pub const DEFAULT_SIZE: (u32, u32) = (1280, 720);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("unsupported image format {0:?}")]
    UnsupportedFormat(String),
    #[error("cannot plot {what}: {reason}")]
    Degenerate { what: String, reason: &'static str },
    #[error("failed to create {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

type DrawResult<'a> = Result<(), Box<dyn std::error::Error + 'a>>;

/// Something that can be drawn onto any plotters backend.
pub trait Figure {
    // used to name the file when the figure is only shown
    fn name(&self) -> String;

    fn draw<'a, DB: DrawingBackend + 'a>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<'a>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Svg,
    Png,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Png => "png",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PlotError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for Format {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Format::Svg),
            "png" => Ok(Format::Png),
            _ => Err(PlotError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where a rendered figure goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    // a batch run has no window; the figure lands in the temp dir instead
    Show,
    File(PathBuf),
}

// lowercase, with every run of non-alphanumerics collapsed to '_'
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// `{dir}/{variant}_{dataset}.{ext}`
pub fn image_path(dir: &Path, variant: &str, dataset: &str, format: Format) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        slug(variant),
        slug(dataset),
        format.extension()
    ))
}

fn draw_on<F: Figure, DB: DrawingBackend>(
    figure: &F,
    root: DrawingArea<DB, Shift>,
) -> Result<(), PlotError> {
    root.fill(&WHITE)
        .map_err(|e| PlotError::Draw(e.to_string()))?;
    figure
        .draw(&root)
        .map_err(|e| PlotError::Draw(e.to_string()))?;
    root.present()
        .map_err(|e| PlotError::Draw(e.to_string()))?;
    Ok(())
}

/// Draws `figure` to `output` and returns the path written.
pub fn render<F: Figure>(figure: &F, output: &Output, size: (u32, u32)) -> Result<PathBuf, PlotError> {
    let path = match output {
        Output::File(path) => path.clone(),
        Output::Show => std::env::temp_dir().join(format!("{}.svg", slug(&figure.name()))),
    };
    let format = Format::from_path(&path)?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| PlotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    match format {
        Format::Svg => draw_on(figure, SVGBackend::new(&path, size).into_drawing_area())?,
        Format::Png => draw_on(figure, BitMapBackend::new(&path, size).into_drawing_area())?,
    }
    match output {
        Output::Show => info!(figure = %figure.name(), path = %path.display(), "figure ready to view"),
        Output::File(_) => info!(figure = %figure.name(), path = %path.display(), "saved figure"),
    }
    Ok(path)
}

// pads a data range so points do not sit on the frame
pub(crate) fn padded_range(lo: f64, hi: f64) -> std::ops::Range<f64> {
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0..1.0;
    }
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

pub(crate) fn caption_font<'a>() -> FontDesc<'a> {
    ("sans-serif", 28).into_font()
}
