//! Build the matrix and draw the tree in one go.

use crate::matrix::{self, BuildOptions};
use crate::plot::{self, Format, PlotOptions, PlotSummary};
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI arguments to build a presence matrix and draw it next to a tree.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
#[clap(about = "Build the presence matrix from BiG-SCAPE results and draw it next to a tree.")]
pub struct Args {
    /// BiG-SCAPE results directory.
    pub results_dir: PathBuf,

    /// Newick tree file.
    pub tree: PathBuf,

    /// Output image (.svg, .png, .jpg, .jpeg).
    pub output: PathBuf,

    #[clap(flatten)]
    pub build: BuildOptions,

    #[clap(flatten)]
    pub plot: PlotOptions,

    /// Also write the presence matrix to this file.
    #[clap(long)]
    pub matrix_out: Option<PathBuf>,
}

/// Build the matrix, optionally write it, then draw the figure.
pub fn run(args: &Args) -> Result<PlotSummary, Report> {
    debug!("Run arguments: {}", serde_json::to_string(args)?);

    // fail on the output format and style before reading any results
    let format = Format::from_path(&args.output).wrap_err(plot::STAGE_ERROR)?;
    let style = plot::load_style(&args.plot.style).wrap_err(plot::STAGE_ERROR)?;

    let matrix = matrix::build(&args.results_dir, &args.build).wrap_err(matrix::STAGE_ERROR)?;
    if let Some(path) = &args.matrix_out {
        matrix.write(path).wrap_err(matrix::STAGE_ERROR)?;
        info!("Wrote matrix: {path:?}");
    }

    plot::render(&args.tree, &matrix, &args.output, format, &args.plot, &style).wrap_err(plot::STAGE_ERROR)
}
