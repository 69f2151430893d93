//! Draw a phylogenetic tree with a presence/absence heatmap of gene cluster families.

pub mod font;
pub mod layout;
pub mod raster;
pub mod scene;
pub mod style;
pub mod svg;
#[cfg(test)]
mod tests;

#[doc(inline)]
pub use style::Style;

use crate::{names, utils, Error, PresenceMatrix};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info, warn};
use maptree_phylo::{Branch, Node, Phylogeny, ToNewick};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Context added to every error of the plot stage.
pub const STAGE_ERROR: &str = "Plot stage failed.";

/// The phylogeny drawn by the renderer.
pub type Tree = Phylogeny<Node<String>, Branch>;

/// Output image format, chosen from the file extension.
///
/// ```rust
/// use maptree::plot::Format;
///
/// assert_eq!(Format::from_path(&"tree.svg")?, Format::Svg);
/// assert_eq!(Format::from_path(&"tree.PNG")?, Format::Png);
/// assert_eq!(Format::from_path(&"tree.jpg")?, Format::Jpeg);
/// assert!(Format::from_path(&"tree.pdf").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum Format {
    #[strum(serialize = "svg")]
    Svg,
    #[strum(serialize = "png")]
    Png,
    #[strum(serialize = "jpg", serialize = "jpeg")]
    Jpeg,
}

impl Format {
    pub fn from_path<P>(path: &P) -> Result<Format, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let extension =
            path.as_ref().extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_string();
        Format::from_str(&extension)
            .map_err(|_| Error::UnsupportedFormat { path: path.as_ref().into(), extension })
            .suggestion("Supported image formats: svg, png, jpg, jpeg")
    }
}

/// Options shared by `plot` and `run`.
#[derive(Clone, Debug, Default, Deserialize, Parser, Serialize)]
pub struct PlotOptions {
    /// Outgroup organism(s) to root the tree on.
    #[clap(long, num_args = 1..)]
    pub outgroup: Vec<String>,

    /// JSON file of figure style options.
    #[clap(long)]
    pub style: Option<PathBuf>,

    /// Write the rerooted tree (.nwk, .newick, .json or .dot).
    #[clap(long)]
    pub tree_out: Option<PathBuf>,
}

/// CLI arguments to draw a tree with a presence matrix.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
#[clap(about = "Draw a phylogenetic tree with a presence/absence matrix of gene cluster families.")]
pub struct Args {
    /// Newick tree file.
    pub tree: PathBuf,

    /// Presence matrix file, or the matrix text itself.
    pub matrix: String,

    /// Output image (.svg, .png, .jpg, .jpeg).
    pub output: PathBuf,

    #[clap(flatten)]
    pub options: PlotOptions,
}

/// What happened to the matrix rows and outgroups while drawing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PlotSummary {
    /// Matrix organisms mapped to the tree leaf they were drawn on.
    pub matched: BTreeMap<String, String>,
    /// Matrix organisms with no matching leaf, not drawn.
    pub dropped: Vec<String>,
    /// Tree leaves without a matrix row, drawn as all absent.
    pub empty_leaves: Vec<String>,
    /// Outgroups found in the tree.
    pub outgroups: Vec<String>,
}

/// Draw the figure described by the CLI arguments.
pub fn plot(args: &Args) -> Result<PlotSummary, Report> {
    debug!("Plot arguments: {}", serde_json::to_string(args)?);

    let format = Format::from_path(&args.output).wrap_err(STAGE_ERROR)?;
    let style = load_style(&args.options.style).wrap_err(STAGE_ERROR)?;
    let matrix =
        PresenceMatrix::load(&args.matrix).wrap_err("Failed to load matrix.").wrap_err(STAGE_ERROR)?;

    render(&args.tree, &matrix, &args.output, format, &args.options, &style).wrap_err(STAGE_ERROR)
}

/// Read and validate the style file, or use the default style.
pub fn load_style(path: &Option<PathBuf>) -> Result<Style, Report> {
    match path {
        Some(path) => Style::read(path),
        None => Ok(Style::default()),
    }
}

/// Read the tree, reroot it, match it to the matrix and write the image.
pub fn render<P, O>(
    tree_path: &P,
    matrix: &PresenceMatrix,
    output: &O,
    format: Format,
    options: &PlotOptions,
    style: &Style,
) -> Result<PlotSummary, Report>
where
    P: AsRef<Path> + Debug,
    O: AsRef<Path> + Debug,
{
    let mut tree: Tree = Phylogeny::read(tree_path)?;
    info!("Read tree with {} leaves: {tree_path:?}", tree.get_leaves()?.len());

    let mut summary = PlotSummary::default();
    if !options.outgroup.is_empty() {
        summary.outgroups = reroot(&mut tree, &options.outgroup)?;
        if style.ladderize {
            tree.ladderize(true)?;
        }
        debug!("Rerooted tree: {}", tree.to_newick()?);
    }
    if let Some(path) = &options.tree_out {
        utils::create_parent_dir(path)?;
        tree.write(path)?;
        info!("Wrote tree: {path:?}");
    }

    let (matched, dropped) = match_leaves(&tree, matrix)?;
    let mut rows = BTreeMap::new();
    for (organism, leaf) in &matched {
        if let Some(cells) = matrix.get_row(organism) {
            rows.insert(leaf.clone(), cells);
        }
    }
    for leaf in tree.get_leaves()? {
        let label = tree.get_node(&leaf)?.to_string();
        if !rows.contains_key(&label) {
            summary.empty_leaves.push(label);
        }
    }
    if !summary.empty_leaves.is_empty() {
        debug!("Leaves without a matrix row: {}", summary.empty_leaves.iter().join(", "));
    }

    let scene = layout::layout(&tree, &rows, &matrix.families, style)?;
    write_scene(&scene, output, format)?;
    info!("Wrote {format} image: {output:?}");

    summary.matched = matched;
    summary.dropped = dropped;
    Ok(summary)
}

/// Write a scene to an image file.
pub fn write_scene<P>(scene: &scene::Scene, output: &P, format: Format) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    match format {
        Format::Svg => utils::write_atomic(output, svg::render(scene).as_bytes()),
        Format::Png => raster::write_png(scene, output),
        Format::Jpeg => raster::write_jpeg(scene, output),
    }
    .wrap_err_with(|| format!("Failed to write image: {output:?}"))
}

/// Leaves whose label matches a name: exact labels first, then sanitized labels.
fn find_leaves(tree: &Tree, leaves: &[NodeIndex], name: &str, exclude: &BTreeSet<NodeIndex>) -> Result<Vec<NodeIndex>, Report> {
    let mut exact = Vec::new();
    let mut sanitized = Vec::new();
    let name_sanitized = names::sanitize(name);
    for leaf in leaves.iter().filter(|leaf| !exclude.contains(*leaf)) {
        let label = &tree.get_node(leaf)?.label;
        if label == name {
            exact.push(*leaf);
        } else if names::sanitize(label) == name_sanitized {
            sanitized.push(*leaf);
        }
    }
    Ok(match exact.is_empty() {
        true => sanitized,
        false => exact,
    })
}

/// Match each matrix organism to exactly one leaf.
///
/// Organisms matching no leaf, or several leaves, are dropped with a warning.
/// Returns the matched organisms (organism to leaf label) and the dropped organisms.
pub fn match_leaves(tree: &Tree, matrix: &PresenceMatrix) -> Result<(BTreeMap<String, String>, Vec<String>), Report> {
    let leaves = tree.get_leaves()?;
    let mut claimed = BTreeSet::new();
    let mut matched = BTreeMap::new();
    let mut dropped = Vec::new();

    // exact labels claim their leaves before sanitized labels are tried
    let mut pending = Vec::new();
    for organism in matrix.organisms.keys() {
        let exact = leaves
            .iter()
            .filter(|leaf| tree.get_node(leaf).map(|node| &node.label == organism).unwrap_or(false))
            .copied()
            .collect_vec();
        match exact.as_slice() {
            [leaf] => {
                claimed.insert(*leaf);
                matched.insert(organism.clone(), tree.get_node(leaf)?.label.clone());
            }
            [] => pending.push(organism),
            _ => {
                warn!("Organism {organism} matches {} leaves of the tree, dropping its matrix row.", exact.len());
                dropped.push(organism.clone());
            }
        }
    }

    for organism in pending {
        match find_leaves(tree, &leaves, organism, &claimed)?.as_slice() {
            [leaf] => {
                claimed.insert(*leaf);
                matched.insert(organism.clone(), tree.get_node(leaf)?.label.clone());
            }
            [] => {
                warn!("Organism {organism} has no matching leaf in the tree, dropping its matrix row.");
                dropped.push(organism.clone());
            }
            several => {
                warn!("Organism {organism} matches {} leaves of the tree, dropping its matrix row.", several.len());
                dropped.push(organism.clone());
            }
        }
    }

    info!("Matched {} of {} matrix organisms to tree leaves.", matched.len(), matrix.organisms.len());
    Ok((matched, dropped))
}

/// Reroot the tree on the outgroup organisms and return the outgroups that were found.
///
/// - The new root splits the most recent common ancestor of the outgroups from the rest.
/// - If that ancestor is the current root, the ingroup is split off instead.
/// - If neither is a clade below the root, the first outgroup leaf is used.
pub fn reroot(tree: &mut Tree, outgroups: &[String]) -> Result<Vec<String>, Report> {
    let leaves = tree.get_leaves()?;
    let none = BTreeSet::new();

    let mut found = Vec::new();
    let mut outgroup_leaves = Vec::new();
    for outgroup in outgroups {
        let matches = find_leaves(tree, &leaves, outgroup, &none)?;
        match matches.is_empty() {
            true => warn!("Outgroup {outgroup} was not found in the tree."),
            false => {
                found.push(outgroup.clone());
                outgroup_leaves.extend(matches);
            }
        }
    }
    if outgroup_leaves.is_empty() {
        return Err(Error::OutgroupNotFound { outgroups: outgroups.to_vec() })
            .suggestion("Outgroup names must match tree leaf labels, with or without sanitizing.");
    }
    let outgroup_leaves = outgroup_leaves.into_iter().unique().collect_vec();

    let root = tree.get_root_index()?;
    let outgroup_ancestor = tree.get_common_ancestor(&outgroup_leaves)?;
    let target = match outgroup_ancestor != root {
        true => outgroup_ancestor,
        false => {
            let ingroup = leaves.iter().filter(|leaf| !outgroup_leaves.contains(leaf)).copied().collect_vec();
            if ingroup.is_empty() {
                return Err(eyre!("Every leaf of the tree is an outgroup, the tree cannot be rerooted."));
            }
            let ingroup_ancestor = tree.get_common_ancestor(&ingroup)?;
            match ingroup_ancestor != root {
                true => ingroup_ancestor,
                false => {
                    let first = outgroup_leaves[0];
                    warn!(
                        "Neither the outgroups nor the ingroup form a clade, rooting on the first outgroup leaf: {}",
                        tree.get_node(&first)?
                    );
                    first
                }
            }
        }
    };

    tree.set_outgroup(target)?;
    info!("Rerooted tree on outgroup(s): {}", found.join(", "));
    Ok(found)
}
