//! Build a [`PresenceMatrix`] from a BiG-SCAPE results directory.

use crate::bigscape::{self, Families, ResultsDir, Summary};
use crate::{Error, PresenceMatrix, Table};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Report, Result, WrapErr};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default BiG-SCAPE cutoff.
pub const DEFAULT_CUTOFF: f32 = 0.30;

/// Context added to every error of the matrix stage.
pub const STAGE_ERROR: &str = "Matrix stage failed.";

/// Where gene cluster families come from.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, ValueEnum)]
pub enum Mode {
    /// Families from the BiG-SCAPE clustering files.
    #[default]
    Clustering,
    /// Families as connected components of the merged BiG-SCAPE networks.
    Network,
}

/// Options that control how families are found, named and ordered.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
pub struct BuildOptions {
    /// BiG-SCAPE cutoff of the run to use.
    #[clap(short = 'c', long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: f32,

    /// Source of the gene cluster families.
    #[clap(long, value_enum, default_value_t = Mode::default())]
    pub mode: Mode,

    /// Treat MIBiG references as compound names instead of organisms.
    #[clap(long)]
    pub mibig: bool,

    /// File with one line of comma-separated family numbers, the column order.
    #[clap(long)]
    pub family_order: Option<PathBuf>,

    /// Order family columns by similarity of their presence profiles.
    ///
    /// Always on in network mode, unless a family order file is given.
    #[clap(long)]
    pub cluster_families: bool,

    /// Write the members of every family as a Cluster/Family table.
    #[clap(long)]
    pub out_families: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            cutoff: DEFAULT_CUTOFF,
            mode: Mode::default(),
            mibig: false,
            family_order: None,
            cluster_families: false,
            out_families: None,
        }
    }
}

/// CLI arguments to build a presence matrix.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
#[clap(about = "Build a presence/absence matrix of gene cluster families from BiG-SCAPE results.")]
pub struct Args {
    /// BiG-SCAPE results directory.
    pub results_dir: PathBuf,

    #[clap(flatten)]
    pub options: BuildOptions,

    /// Output matrix file (`.csv` is comma-delimited), otherwise standard output.
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Build the matrix and write it to the output file or standard output.
pub fn matrix(args: &Args) -> Result<PresenceMatrix, Report> {
    debug!("Matrix arguments: {}", serde_json::to_string(args)?);

    let matrix = build(&args.results_dir, &args.options).wrap_err(STAGE_ERROR)?;
    write_output(&matrix, &args.output).wrap_err(STAGE_ERROR)?;
    Ok(matrix)
}

fn write_output(matrix: &PresenceMatrix, output: &Option<PathBuf>) -> Result<(), Report> {
    match output {
        Some(output) => {
            matrix.write(output)?;
            info!("Wrote matrix: {output:?}");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(matrix.to_delimited('\t')?.as_bytes())
                .wrap_err("Failed to write matrix to standard output.")?;
        }
    }
    Ok(())
}

/// Build a presence matrix from a BiG-SCAPE results directory.
///
/// - Every organism of the summary is a row, even if it has no families.
/// - Every family is a column, even if no organism has it.
/// - A cell is present when at least one cluster of the organism belongs to the family.
pub fn build<P>(results_dir: &P, options: &BuildOptions) -> Result<PresenceMatrix, Report>
where
    P: AsRef<Path> + std::fmt::Debug,
{
    let results = ResultsDir::discover(results_dir)?;
    let summary = Summary::read(&results.summary)?;

    // network families always treat MIBiG entries as references
    let mibig = options.mibig || options.mode == Mode::Network;

    let families = match options.mode {
        Mode::Clustering => bigscape::clustering_families(&results, options.cutoff)?,
        Mode::Network => bigscape::network_families(&results, &summary, options.cutoff)?,
    };
    let families = match mibig {
        true => bigscape::name_mibig_families(families, &summary),
        false => families,
    };

    let organisms = summary.organisms(mibig);
    if families.is_empty() || organisms.is_empty() {
        let reason = format!(
            "no {:?} records at cutoff {:.2} ({} families, {} organisms)",
            options.mode,
            options.cutoff,
            families.len(),
            organisms.len()
        );
        return Err(Error::MissingResults { path: results.path.clone(), reason }.into());
    }

    let mut matrix = families_to_matrix(&families, &summary, mibig);
    for organism in organisms.keys() {
        matrix.add_organism(organism);
    }
    matrix.sort_families();

    match &options.family_order {
        Some(path) => {
            let order = super::order::read_family_order(path)?;
            matrix.apply_family_order(&order).wrap_err_with(|| format!("Failed to apply family order: {path:?}"))?;
        }
        None if options.cluster_families || options.mode == Mode::Network => {
            matrix.cluster_families()?;
            debug!("Clustered family order: {}", matrix.families.join(", "));
        }
        None => (),
    }

    if let Some(path) = &options.out_families {
        families_table(&families, &matrix.families).write(path, None)?;
        info!("Wrote family members: {path:?}");
    }

    info!("Built matrix of {} organisms and {} families.", matrix.organisms.len(), matrix.families.len());
    Ok(matrix)
}

/// Link each family to the organisms of its member clusters.
fn families_to_matrix(families: &Families, summary: &Summary, skip_mibig: bool) -> PresenceMatrix {
    let mut matrix = PresenceMatrix::new();
    for (family, members) in families {
        matrix.add_family(family);
        for member in members {
            match summary.entries.get(member) {
                Some(entry) if skip_mibig && entry.is_mibig() => (),
                Some(entry) => matrix.insert(&entry.organism, family),
                None => warn!("Cluster {member} of family {family} is missing from the summary file, skipping it."),
            }
        }
    }
    matrix
}

/// A `Cluster`/`Family` table of every family member, families in column order.
fn families_table(families: &Families, order: &[String]) -> Table<String> {
    let mut table = Table::new();
    table.headers = vec!["Cluster".to_string(), "Family".to_string()];
    for family in order {
        for member in families.get(family).into_iter().flatten() {
            table.rows.push(vec![member.clone(), family.clone()]);
        }
    }
    table
}
