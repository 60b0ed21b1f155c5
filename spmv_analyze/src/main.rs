#![deny(clippy::disallowed_methods)]

mod cli;

use anyhow::{Context, Result};
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use spmv_frame::Frame;
use spmv_plot::{
    column_series, image_path, render, threshold_series, Categorical, Distribution, Figure, Joint,
    Output, DEFAULT_SIZE,
};
use spmv_results::{calculate_speedup, filter_min_nnz, load_data, print_stats, stats_report};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let dir = Dir::open_ambient_dir(&cli.results_dir, ambient_authority())
        .with_context(|| format!("failed to open {}", cli.results_dir.display()))?;
    for dataset in &cli.datasets {
        analyze(&cli, &dir, dataset).with_context(|| format!("dataset {}", dataset))?;
    }
    Ok(())
}

fn analyze(cli: &Cli, dir: &Dir, dataset: &str) -> Result<()> {
    info!(dataset, baseline = cli.baseline.as_str(), "analysing");
    let data = load_data(dir, dataset).context("failed to load results")?;
    let speedup = calculate_speedup(&data.merged, &data.source, &cli.baseline)
        .context("failed to compute speedups")?;
    let filtered = filter_min_nnz(&speedup, cli.min_nnz)?;
    debug!(
        kept = filtered.len(),
        total = speedup.len(),
        min_nnz = cli.min_nnz,
        "filtered matrices"
    );

    let report = stats_report(
        dataset,
        &filtered,
        cli.stats_column.as_deref(),
        cli.nlargest,
        &cli.baseline,
    )?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stats(&report);
    }

    plot(cli, dataset, &speedup, &filtered)
}

// the threshold view filters the unfiltered table itself; every other view
// shows the matrices left after --min-nnz
fn plot(cli: &Cli, dataset: &str, speedup: &Frame, filtered: &Frame) -> Result<()> {
    if let Some(column) = &cli.distribution {
        let series = threshold_series(speedup, column, &cli.thresholds)?;
        let figure = Distribution::new(
            &format!("{} speedup over {} ({})", column, cli.baseline, dataset),
            "speedup",
            series,
            cli.x_range.clone(),
            cli.histogram,
        )?;
        show(cli, &figure, &format!("distribution_{}", column), dataset)?;
    }

    for (a, b) in &cli.compare {
        let series = column_series(filtered, &[a, b])?;
        let figure = Distribution::new(
            &format!("{} vs {} ({})", a, b, dataset),
            "speedup",
            series,
            cli.x_range.clone(),
            cli.histogram,
        )?;
        show(cli, &figure, &format!("compare_{}_vs_{}", a, b), dataset)?;
    }

    if let Some(column) = &cli.joint {
        let figure = Joint::new(filtered, column)?
            .with_title(format!("{} speedup vs nnz per row ({})", column, dataset));
        show(cli, &figure, &format!("joint_{}", column), dataset)?;
    }

    if let Some(kind) = cli.categorical {
        let figure = Categorical::new(filtered, cli.matrices.as_slice(), Some(cli.placeholder()), kind)?
            .with_title(format!("Speedup over {} per kernel ({})", cli.baseline, dataset));
        show(cli, &figure, &format!("categorical_{}", kind), dataset)?;
    }
    Ok(())
}

fn show<F: Figure>(cli: &Cli, figure: &F, variant: &str, dataset: &str) -> Result<()> {
    let output = if cli.save {
        Output::File(image_path(&cli.image_dir, variant, dataset, cli.format))
    } else {
        Output::Show
    };
    render(figure, &output, DEFAULT_SIZE).with_context(|| format!("failed to draw {}", variant))?;
    Ok(())
}
