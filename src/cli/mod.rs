//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::{matrix, plot, run, Verbosity};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = maptree::Cli::parse();
/// ```
/// Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use maptree::cli::Command;
///
/// let input = ["maptree", "matrix", "bigscape/", "--cutoff", "0.5", "--mibig", "-o", "matrix.tsv"];
/// let args = maptree::Cli::parse_from(input);
/// match args.command {
///     Command::Matrix(args) => {
///         assert_eq!(args.options.cutoff, 0.5);
///         assert!(args.options.mibig);
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "maptree", author, version)]
#[clap(about = "maptree draws phylogenetic trees with a presence/absence matrix of biosynthetic gene cluster families.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the [matrix](crate::matrix::matrix()) builder.
    #[clap(about = "Build a presence/absence matrix from BiG-SCAPE results.")]
    Matrix(matrix::Args),

    /// Pass CLI arguments to the [plot](crate::plot::plot()) renderer.
    #[clap(about = "Draw a tree with a presence/absence matrix.")]
    Plot(plot::Args),

    /// Pass CLI arguments to the [run](crate::run::run()) pipeline.
    #[clap(about = "Build the matrix and draw the tree in one go.")]
    Run(run::Args),
}
