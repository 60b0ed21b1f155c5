use clap::Parser;
use spmv_plot::{Format, Kind};
use spmv_results::DEFAULT_BASELINE;
use std::{ops::Range, path::PathBuf};

/// Speedup statistics and plots for SpMV benchmark results
#[derive(Parser, Debug)]
#[command(name = "spmv_analyze", version)]
pub struct Cli {
    /// Directory holding matrices_info.json and one JSON file per dataset
    #[arg(long, default_value = "../results/scoo")]
    pub results_dir: PathBuf,

    /// Datasets to analyse, e.g. float or double
    #[arg(long = "dataset", value_delimiter = ',', default_values = ["float", "double"])]
    pub datasets: Vec<String>,

    /// Kernel whose timing every other kernel is compared against
    #[arg(long, default_value = DEFAULT_BASELINE)]
    pub baseline: String,

    /// Keep matrices with strictly more nonzeros than this
    #[arg(long, default_value_t = 0.0)]
    pub min_nnz: f64,

    /// Describe only this column
    #[arg(long)]
    pub stats_column: Option<String>,

    /// Also list the N matrices with the largest --stats-column
    #[arg(long, value_name = "N", requires = "stats_column")]
    pub nlargest: Option<usize>,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Plot the speedup distribution of COL at each nnz threshold
    #[arg(long, value_name = "COL")]
    pub distribution: Option<String>,

    #[arg(long, value_delimiter = ',', default_values = ["0", "10000", "50000"])]
    pub thresholds: Vec<f64>,

    /// x axis of distribution plots, as LO:HI
    #[arg(long, value_parser = parse_range, default_value = "0:10", allow_hyphen_values = true)]
    pub x_range: Range<f64>,

    /// Draw histogram bars under distribution curves
    #[arg(long)]
    pub histogram: bool,

    /// Overlay the speedup distributions of two kernels, as A,B
    #[arg(long, value_name = "A,B", value_parser = parse_pair)]
    pub compare: Vec<(String, String)>,

    /// Scatter COL against nonzeros per row with a regression line
    #[arg(long, value_name = "COL")]
    pub joint: Option<String>,

    /// Per-kernel bar or box plot over the --matrix list
    #[arg(long)]
    pub categorical: Option<Kind>,

    /// Matrices for the categorical plot; every matrix when omitted
    #[arg(long = "matrix", value_name = "NAME")]
    pub matrices: Vec<String>,

    /// Column dropped before the categorical plot [default: the baseline]
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Write images under --image-dir instead of a temporary file
    #[arg(long)]
    pub save: bool,

    #[arg(long, default_value = "../doc/img")]
    pub image_dir: PathBuf,

    #[arg(long, default_value = "svg")]
    pub format: Format,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(&self.baseline)
    }
}

fn parse_range(s: &str) -> Result<Range<f64>, String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got {:?}", s))?;
    let lo: f64 = lo.trim().parse().map_err(|e| format!("{}: {}", lo, e))?;
    let hi: f64 = hi.trim().parse().map_err(|e| format!("{}: {}", hi, e))?;
    if lo < hi {
        Ok(lo..hi)
    } else {
        Err(format!("empty range {}:{}", lo, hi))
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once(',') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((a.trim().to_string(), b.trim().to_string()))
        }
        _ => Err(format!("expected two columns as A,B, got {:?}", s)),
    }
}
