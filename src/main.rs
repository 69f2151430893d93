use clap::Parser;
use color_eyre::eyre::{Report, Result};
use maptree::{cli::Command, Cli};

fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (matrix, plot, run)
    match args.command {
        Command::Matrix(args) => _ = maptree::matrix::matrix(&args)?,
        Command::Plot(args) => _ = maptree::plot::plot(&args)?,
        Command::Run(args) => _ = maptree::run::run(&args)?,
    }

    Ok(())
}
