//! Presence/absence [matrix](PresenceMatrix) of gene cluster families per organism.

pub mod build;
pub mod order;

pub use build::{build, matrix, Args, BuildOptions, Mode, STAGE_ERROR};

use crate::{utils, Table};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Header of the first matrix column, the organism names.
pub const NAMES_HEADER: &str = "#NAMES";

/// Organisms (rows) by gene cluster families (columns), each cell present or absent.
///
/// - Families keep an explicit column order.
/// - Organisms are kept in lexicographic order.
/// - Every organism and family is kept, even if all of its cells are absent.
///
/// ```rust
/// use maptree::PresenceMatrix;
///
/// let records = [("Org_A", "Fam1"), ("Org_B", "Fam2"), ("Org_A", "Fam2")];
/// let matrix = PresenceMatrix::from_records(records);
/// assert_eq!(matrix.to_string(), "#NAMES\tFam1\tFam2\nOrg_A\t1\t1\nOrg_B\t0\t1\n");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PresenceMatrix {
    /// Family column names, in display order.
    pub families: Vec<String>,
    /// Organism row names, mapped to the families present in them.
    pub organisms: BTreeMap<String, BTreeSet<String>>,
}

impl PresenceMatrix {
    /// Create a new empty matrix.
    pub fn new() -> Self {
        PresenceMatrix { families: Vec::new(), organisms: BTreeMap::new() }
    }

    /// Add a family column, if it does not exist yet.
    pub fn add_family(&mut self, family: &str) {
        if !self.families.iter().any(|f| f == family) {
            self.families.push(family.to_string());
        }
    }

    /// Add an organism row, if it does not exist yet.
    pub fn add_organism(&mut self, organism: &str) {
        self.organisms.entry(organism.to_string()).or_default();
    }

    /// Mark a family as present in an organism, adding the row and column as needed.
    pub fn insert(&mut self, organism: &str, family: &str) {
        self.add_family(family);
        self.organisms.entry(organism.to_string()).or_default().insert(family.to_string());
    }

    /// Returns true if the family was detected in the organism.
    pub fn is_present(&self, organism: &str, family: &str) -> bool {
        self.organisms.get(organism).map(|present| present.contains(family)).unwrap_or(false)
    }

    /// Returns the cells of one organism row in column order, [`None`] for unknown organisms.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let matrix = PresenceMatrix::from_records([("Org_A", "Fam1"), ("Org_B", "Fam2")]);
    /// assert_eq!(matrix.get_row("Org_B"), Some(vec![false, true]));
    /// assert_eq!(matrix.get_row("Org_C"), None);
    /// ```
    pub fn get_row(&self, organism: &str) -> Option<Vec<bool>> {
        let present = self.organisms.get(organism)?;
        Some(self.families.iter().map(|family| present.contains(family)).collect())
    }

    /// Build a matrix from (organism, family) records, families in natural order.
    pub fn from_records<I, O, F>(records: I) -> Self
    where
        I: IntoIterator<Item = (O, F)>,
        O: AsRef<str>,
        F: AsRef<str>,
    {
        let mut matrix = PresenceMatrix::new();
        for (organism, family) in records {
            matrix.insert(organism.as_ref(), family.as_ref());
        }
        matrix.sort_families();
        matrix
    }

    /// Sort family columns in natural order.
    ///
    /// A leading integer is compared numerically, then the whole name is compared as text.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let mut matrix = PresenceMatrix::new();
    /// for family in ["10", "2_NRPS", "1", "PKSI", "2_NRPS_PKSI"] {
    ///     matrix.add_family(family);
    /// }
    /// matrix.sort_families();
    /// assert_eq!(matrix.families, ["1", "2_NRPS", "2_NRPS_PKSI", "10", "PKSI"]);
    /// ```
    pub fn sort_families(&mut self) {
        self.families.sort_by(|a, b| order::natural_key(a).cmp(&order::natural_key(b)));
    }

    /// Convert the matrix to a [`Table`] of `0`/`1` cells.
    pub fn to_table(&self) -> Table<String> {
        let mut table = Table::new();
        table.headers = std::iter::once(NAMES_HEADER.to_string())
            .chain(self.families.iter().cloned())
            .collect();
        table.rows = self
            .organisms
            .iter()
            .map(|(organism, present)| {
                std::iter::once(organism.clone())
                    .chain(self.families.iter().map(|family| match present.contains(family) {
                        true => "1".to_string(),
                        false => "0".to_string(),
                    }))
                    .collect()
            })
            .collect();
        table
    }

    /// Convert a [`Table`] back into a matrix.
    ///
    /// Any positive integer cell counts as present, so count matrices load unchanged.
    pub fn from_table(table: &Table<String>) -> Result<Self, Report> {
        let (first, families) = table
            .headers
            .split_first()
            .ok_or_else(|| eyre!("Matrix is empty, the header line is missing."))?;
        if !first.starts_with('#') {
            return Err(eyre!("Matrix header must start with {NAMES_HEADER}, found: {first:?}"))
                .suggestion("Was the matrix written by `maptree matrix`?");
        }

        let mut matrix = PresenceMatrix::new();
        for family in families {
            if matrix.families.contains(family) {
                return Err(eyre!("Matrix header contains family {family:?} more than once."));
            }
            matrix.add_family(family);
        }

        for (i, row) in table.rows.iter().enumerate() {
            let (organism, cells) = row
                .split_first()
                .ok_or_else(|| eyre!("Matrix row {} is empty.", i + 1))?;
            if cells.len() != families.len() {
                return Err(eyre!(
                    "Matrix row {organism:?} has {} cells, but there are {} families.",
                    cells.len(),
                    families.len()
                ));
            }
            matrix.add_organism(organism);
            for (family, cell) in families.iter().zip(cells) {
                let count: u64 = cell.trim().parse().wrap_err_with(|| {
                    format!("Matrix cell for {organism:?} and {family:?} is not an integer: {cell:?}")
                })?;
                if count > 0 {
                    matrix.insert(organism, family);
                }
            }
        }

        Ok(matrix)
    }

    /// Serialize the matrix as delimited text.
    pub fn to_delimited(&self, delim: char) -> Result<String, Report> {
        self.to_table().to_delimited(delim)
    }

    /// Read a matrix file, the delimiter is detected from the header line.
    pub fn read<P>(path: &P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read matrix: {path:?}"))?;
        text.parse().wrap_err_with(|| format!("Failed to parse matrix: {path:?}"))
    }

    /// Load a matrix from a file path, or from the argument itself if no such file exists.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let matrix = PresenceMatrix::load("#NAMES\tFam1\nOrg_A\t1\n")?;
    /// assert!(matrix.is_present("Org_A", "Fam1"));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn load(path_or_text: &str) -> Result<Self, Report> {
        let path = Path::new(path_or_text);
        match !path_or_text.contains('\n') && path.is_file() {
            true => {
                debug!("Reading matrix from file: {path:?}");
                PresenceMatrix::read(&path)
            }
            false => {
                debug!("Parsing matrix from argument text.");
                path_or_text.parse()
            }
        }
    }

    /// Write the matrix to a file, `.csv` is comma-delimited and anything else tab-delimited.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        self.to_table()
            .write(path, Some(utils::get_delimiter_or_tab(path)))
            .wrap_err_with(|| format!("Failed to write matrix: {path:?}"))
    }
}

impl Display for PresenceMatrix {
    /// Tab-delimited text with a trailing newline.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = self.to_delimited('\t').map_err(|_| std::fmt::Error)?;
        write!(f, "{text}")
    }
}

impl FromStr for PresenceMatrix {
    type Err = Report;

    /// Parse a tab- or comma-delimited matrix, whichever the header line uses.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let matrix: PresenceMatrix = "#NAMES,Fam1,Fam2\nOrg_A,2,0\n".parse()?;
    /// assert_eq!(matrix.get_row("Org_A"), Some(vec![true, false]));
    /// assert!("#NAMES\tFam1\nOrg_A\tyes\n".parse::<PresenceMatrix>().is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_str(text: &str) -> Result<Self, Report> {
        let header = text.lines().find(|line| !line.trim().is_empty()).unwrap_or_default();
        let delim = match header.contains('\t') {
            true => '\t',
            false if header.contains(',') => ',',
            false => '\t',
        };
        let table = Table::parse(text, delim)?;
        PresenceMatrix::from_table(&table)
    }
}
