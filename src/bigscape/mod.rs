//! Readers for a [BiG-SCAPE](https://github.com/medema-group/BiG-SCAPE) results directory.
//!
//! ```text
//! results_dir/
//!   Network_Annotations_Full.tsv      summary, one row per BGC
//!   NRPS/
//!     NRPS_clustering_c0.30.tsv       cluster -> family
//!     NRPS_c0.30.network              cluster <-> cluster similarity edges
//!   PKSI/
//!     ...
//! ```

#[cfg(test)]
mod tests;

use crate::{names, Error};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info, warn};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name prefix of the BiG-SCAPE summary file.
pub const SUMMARY_PREFIX: &str = "Network_Annotations_Full";
/// Number of columns in a standard summary row.
pub const SUMMARY_COLUMNS: usize = 7;
/// Class name for network families whose members are missing from the summary.
pub const UNKNOWN_CLASS: &str = "unknown";

/// Family name mapped to the BGC names (clusters) that belong to it.
pub type Families = BTreeMap<String, BTreeSet<String>>;

/// File name suffix of the clustering files at a cutoff (ex. `_clustering_c0.30.tsv`).
///
/// ```rust
/// use maptree::bigscape::clustering_suffix;
/// assert_eq!(clustering_suffix(0.3), "_clustering_c0.30.tsv");
/// ```
pub fn clustering_suffix(cutoff: f32) -> String {
    format!("_clustering_c{cutoff:.2}.tsv")
}

/// File name suffix of the network files at a cutoff (ex. `_c0.30.network`).
///
/// ```rust
/// use maptree::bigscape::network_suffix;
/// assert_eq!(network_suffix(0.5), "_c0.50.network");
/// ```
pub fn network_suffix(cutoff: f32) -> String {
    format!("_c{cutoff:.2}.network")
}

// ----------------------------------------------------------------------------
// Results Directory

/// The summary file and class directories found in a results directory.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResultsDir {
    pub path: PathBuf,
    pub summary: PathBuf,
    pub classes: Vec<PathBuf>,
}

impl ResultsDir {
    /// Locate the summary file and class directories of a results directory.
    pub fn discover<P>(path: &P) -> Result<ResultsDir, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let path = path.as_ref().to_path_buf();
        let missing = |reason: &str| Error::MissingResults { path: path.clone(), reason: reason.to_string() };

        if !path.is_dir() {
            return Err(missing("directory does not exist")).suggestion("Check the results directory path.");
        }

        let mut summaries = Vec::new();
        let mut classes = Vec::new();
        for entry in WalkDir::new(&path).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.wrap_err_with(|| format!("Failed to list results directory: {path:?}"))?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() {
                classes.push(entry.path().to_path_buf());
            } else if entry.file_type().is_file() && name.starts_with(SUMMARY_PREFIX) {
                summaries.push(entry.path().to_path_buf());
            }
        }

        let summary = match summaries.len() {
            0 => {
                return Err(missing("no summary file found"))
                    .suggestion(format!("Expected a file named {SUMMARY_PREFIX}*"))
            }
            1 => summaries.remove(0),
            _ => Err(Error::DuplicateResults { path: path.clone(), kind: "summary".to_string(), files: summaries })?,
        };
        if classes.is_empty() {
            return Err(missing("no class result directories found"))
                .suggestion("Each BiG-SCAPE class should have its own subdirectory with clustering and network files.");
        }

        debug!("Found summary {summary:?} and {} class directories.", classes.len());
        Ok(ResultsDir { path, summary, classes })
    }

    /// Returns the one file per class directory whose name ends with `suffix`.
    ///
    /// Class directories without such a file are skipped, more than one is an error.
    pub fn class_files(&self, suffix: &str) -> Result<Vec<PathBuf>, Report> {
        let mut files = Vec::new();
        for class in &self.classes {
            let mut found = Vec::new();
            for entry in WalkDir::new(class).min_depth(1).max_depth(1).sort_by_file_name() {
                let entry = entry.wrap_err_with(|| format!("Failed to list directory: {class:?}"))?;
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_file() && name.ends_with(suffix) {
                    found.push(entry.path().to_path_buf());
                }
            }
            match found.len() {
                0 => debug!("No *{suffix} file in {class:?}, skipping."),
                1 => files.append(&mut found),
                _ => Err(Error::DuplicateResults { path: class.clone(), kind: format!("*{suffix}"), files: found })?,
            }
        }
        Ok(files)
    }
}

// ----------------------------------------------------------------------------
// Summary

/// One row of the summary file: a BGC, either from an organism or a MIBiG reference.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BgcEntry {
    /// BGC name (ex. `NC_003888.3.region001`, `BGC0000128`).
    pub name: String,
    /// Free text description (ex. `actinorhodin biosynthetic gene cluster`).
    pub description: String,
    /// BiG-SCAPE class (ex. `PKSI`).
    pub class: String,
    /// Sanitized organism name.
    pub organism: String,
}

impl BgcEntry {
    /// Returns true if this entry is a MIBiG reference cluster.
    pub fn is_mibig(&self) -> bool {
        names::is_mibig(&self.name)
    }

    /// Compound name of a MIBiG reference cluster.
    pub fn compound(&self) -> String {
        names::compound_name(&self.description)
    }
}

/// The BiG-SCAPE summary, BGC name mapped to its [`BgcEntry`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Summary {
    pub entries: BTreeMap<String, BgcEntry>,
}

impl Summary {
    /// Parse summary text. The header line must start with `BGC`.
    ///
    /// - Rows with fewer than 6 columns are skipped with a warning.
    /// - Rows with 6 or more than 7 columns are kept, with a single warning for all of them.
    pub fn parse<P>(text: &str, path: &P) -> Result<Summary, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let mut lines = text.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.starts_with("BGC") => (),
            _ => {
                return Err(eyre!("Header line of summary file missing: {path:?}"))
                    .suggestion("The first line of the summary should start with 'BGC'.")
            }
        }

        let mut summary = Summary::default();
        let mut nonstandard = 0;
        for (i, line) in lines {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let row = line.split('\t').collect_vec();
            if row.len() < SUMMARY_COLUMNS - 1 {
                let reason = format!("expected {SUMMARY_COLUMNS} columns, found {}", row.len());
                warn!("{}", Error::MalformedRecord { path: path.as_ref().into(), line: i + 1, reason });
                continue;
            }
            if row.len() != SUMMARY_COLUMNS {
                nonstandard += 1;
            }
            let organism = names::sanitize(row[5]);
            if organism.is_empty() {
                let reason = format!("organism {:?} is empty once sanitized", row[5]);
                warn!("{}", Error::MalformedRecord { path: path.as_ref().into(), line: i + 1, reason });
                continue;
            }
            let entry = BgcEntry {
                name: row[0].to_string(),
                description: row[2].to_string(),
                class: row[4].to_string(),
                organism,
            };
            summary.entries.insert(entry.name.clone(), entry);
        }

        if nonstandard > 0 {
            warn!(
                "{nonstandard} line(s) in the summary file {path:?} contain a nonstandard number of columns (standard is {SUMMARY_COLUMNS}). In case of strange results, please check the format of the summary file."
            );
        }

        Ok(summary)
    }

    /// Read the summary file.
    pub fn read<P>(path: &P) -> Result<Summary, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read summary file: {path:?}"))?;
        let summary = Summary::parse(&text, path)?;
        info!("Read {} BGCs from summary file: {path:?}", summary.entries.len());
        Ok(summary)
    }

    /// Organisms mapped to their clusters.
    ///
    /// If `skip_mibig`, MIBiG reference clusters are not treated as organisms.
    pub fn organisms(&self, skip_mibig: bool) -> BTreeMap<String, BTreeSet<String>> {
        let mut organisms: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entry in self.entries.values().filter(|entry| !(skip_mibig && entry.is_mibig())) {
            organisms.entry(entry.organism.clone()).or_default().insert(entry.name.clone());
        }
        organisms
    }
}

// ----------------------------------------------------------------------------
// Clustering

/// Read a clustering file into (cluster, family) records.
///
/// Lines starting with `#` are headers. Lines without exactly two columns are skipped with a warning.
pub fn read_clustering<P>(path: &P) -> Result<Vec<(String, String)>, Report>
where
    P: AsRef<Path> + Debug,
{
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read clustering file: {path:?}"))?;

    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split('\t').collect_vec().as_slice() {
            [cluster, family] if !cluster.is_empty() && !family.is_empty() => {
                records.push((cluster.to_string(), family.to_string()))
            }
            row => {
                let reason = format!("expected cluster and family columns, found {} column(s)", row.len());
                warn!("{}", Error::MalformedRecord { path: path.as_ref().into(), line: i + 1, reason });
            }
        }
    }

    debug!("Read {} clustering records from: {path:?}", records.len());
    Ok(records)
}

/// Families from all clustering files of a results directory.
pub fn clustering_families(results: &ResultsDir, cutoff: f32) -> Result<Families, Report> {
    let mut families = Families::new();
    for path in results.class_files(&clustering_suffix(cutoff))? {
        for (cluster, family) in read_clustering(&path)? {
            families.entry(family).or_default().insert(cluster);
        }
    }
    info!("Found {} families in clustering files at cutoff {cutoff:.2}.", families.len());
    Ok(families)
}

// ----------------------------------------------------------------------------
// Network

/// Read a network file into cluster pairs.
///
/// The header must name the columns `Clustername 1` and `Clustername 2`.
pub fn read_network<P>(path: &P) -> Result<Vec<(String, String)>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .wrap_err_with(|| format!("Failed to read network file: {path:?}"))?;

    let headers = reader
        .headers()
        .wrap_err_with(|| format!("Failed to read network header: {path:?}"))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| eyre!("Network file {path:?} has no column {name:?}"))
    };
    let (source, target) = (column("Clustername 1")?, column("Clustername 2")?);

    let mut edges = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record = record.wrap_err_with(|| format!("Failed to read line {line} of network file: {path:?}"))?;
        match (record.get(source), record.get(target)) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => edges.push((a.to_string(), b.to_string())),
            _ => {
                let reason = "missing cluster names".to_string();
                warn!("{}", Error::MalformedRecord { path: path.as_ref().into(), line, reason });
            }
        }
    }

    debug!("Read {} network edges from: {path:?}", edges.len());
    Ok(edges)
}

/// Families as the connected components of all network files of a results directory.
///
/// - Duplicate pairs across files collapse into one edge.
/// - Components made only of MIBiG references are dropped.
/// - Families are ranked by size, largest first, ties broken by their smallest member.
/// - Each family is named `<rank>_<classes>`, the sorted BiG-SCAPE classes of its members.
pub fn network_families(results: &ResultsDir, summary: &Summary, cutoff: f32) -> Result<Families, Report> {
    let mut edges = BTreeSet::new();
    for path in results.class_files(&network_suffix(cutoff))? {
        for (a, b) in read_network(&path)? {
            let pair = match a <= b {
                true => (a, b),
                false => (b, a),
            };
            edges.insert(pair);
        }
    }
    Ok(connected_families(&edges, summary))
}

/// Name the connected components of an undirected cluster graph.
pub fn connected_families(edges: &BTreeSet<(String, String)>, summary: &Summary) -> Families {
    let clusters: BTreeSet<&String> = edges.iter().flat_map(|(a, b)| [a, b]).collect();
    let index: BTreeMap<&String, usize> = clusters.iter().enumerate().map(|(i, c)| (*c, i)).collect();

    let mut components = UnionFind::new(clusters.len());
    for (a, b) in edges {
        components.union(index[a], index[b]);
    }

    let mut grouped: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for (cluster, i) in &index {
        grouped.entry(components.find(*i)).or_default().insert((*cluster).clone());
    }

    // rank by size, then by smallest member name
    let ranked = grouped
        .into_values()
        .filter(|members| !members.iter().all(|member| names::is_mibig(member)))
        .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));

    let mut families = Families::new();
    for (rank, members) in ranked.enumerate() {
        let classes: BTreeSet<&str> = members
            .iter()
            .map(|member| match summary.entries.get(member) {
                Some(entry) => entry.class.as_str(),
                None => {
                    warn!("Cluster {member} is missing from the summary file, its class is {UNKNOWN_CLASS}.");
                    UNKNOWN_CLASS
                }
            })
            .collect();
        let name = format!("{}_{}", rank + 1, classes.iter().join("_"));
        families.insert(name, members);
    }

    info!("Found {} families as connected components of the network.", families.len());
    families
}

// ----------------------------------------------------------------------------
// MIBiG

/// Drop families made only of MIBiG references and append the compound names of
/// their MIBiG members to the remaining family names.
///
/// A compound name already contained in the family name is not appended again.
pub fn name_mibig_families(families: Families, summary: &Summary) -> Families {
    let mut named = Families::new();
    for (family, members) in families {
        if members.iter().all(|member| names::is_mibig(member)) {
            debug!("Dropping family {family}, it contains only MIBiG references.");
            continue;
        }
        let mut name = family;
        for member in members.iter().filter(|member| names::is_mibig(member)) {
            let Some(entry) = summary.entries.get(member) else {
                warn!("MIBiG cluster {member} is missing from the summary file, its compound is unknown.");
                continue;
            };
            let compound = entry.compound();
            if !compound.is_empty() && !name.contains(&compound) {
                name = format!("{name}_{compound}");
            }
        }
        named.insert(name, members);
    }
    named
}
