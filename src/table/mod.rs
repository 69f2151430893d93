//! Create, read and write a delimited [Table].

use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

/// A row-based table of generic data.
///
/// # Examples
///
/// ```
/// use maptree::Table;
///
/// let mut table = Table::new();
/// table.headers = vec!["Cluster", "Family"];
/// table.add_row(vec!["NC_003888.3.region001", "1"])?;
///
/// assert_eq!(table.to_delimited('\t')?, "Cluster\tFamily\nNC_003888.3.region001\t1\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// Optional file path for where the table was read from.
    pub path: Option<PathBuf>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T> {
    /// Create a new table with empty headers and rows.
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }
}

impl<T> Table<T>
where
    T: Display,
{
    /// Add a new row to the table.
    ///
    /// The row must have as many values as there are headers.
    ///
    /// ```
    /// use maptree::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// assert!(table.add_row(vec!["A", "B", "C"]).is_ok());
    /// assert!(table.add_row(vec!["D", "E"]).is_err());
    /// ```
    pub fn add_row(&mut self, row: Vec<T>) -> Result<(), Report> {
        let (new, ex) = (row.len(), self.headers.len());
        if new != ex {
            return Err(eyre!("New row size ({new}) does not match table headers ({ex})."))
                .suggestion(format!("Row: {}", row.iter().join(", ")));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the column index (0-based) corresponding to the header.
    ///
    /// ```
    /// use maptree::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// assert_eq!(table.get_header_index("3")?, 2);
    /// assert!(table.get_header_index("4").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_header_index(&self, header: &str) -> Result<usize, Report> {
        self.headers
            .iter()
            .position(|h| h.to_string() == header)
            .ok_or_else(|| eyre!("Column '{header}' was not found in table: {:?}.", self.path))
    }

    /// Return the table values in a column.
    pub fn get_column(&self, header: &str) -> Result<Vec<&T>, Report> {
        let header_i = self.get_header_index(header)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.get(header_i).ok_or_else(|| eyre!("Row {i} has no column '{header}'."))
            })
            .collect()
    }

    /// Convert the table to delimited text, one line per row with a trailing newline.
    ///
    /// Values containing the delimiter, a quote or a newline are quoted.
    pub fn to_delimited(&self, delim: char) -> Result<String, Report> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter_byte(delim)?)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(Vec::new());

        for row in std::iter::once(&self.headers).chain(&self.rows) {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        let bytes = writer.into_inner().map_err(|e| eyre!("Failed to flush table: {e}"))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Write table to file, replacing any previous file only once writing succeeded.
    ///
    /// If `delim` is [`None`], it is chosen from the file extension (`.csv` or tab).
    ///
    /// ```
    /// use maptree::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["Cluster", "Family"];
    /// table.add_row(vec!["BGC0000128", "2_NRPS"])?;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("families.csv");
    /// table.write(&path, None)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "Cluster,Family\nBGC0000128,2_NRPS\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P, delim: Option<char>) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = delim.unwrap_or_else(|| utils::get_delimiter_or_tab(path));
        utils::write_atomic(path, self.to_delimited(delim)?.as_bytes())
            .wrap_err_with(|| format!("Failed to write table: {path:?}"))
    }
}

impl Table<String> {
    /// Parse delimited text into a Table, the first record is the header.
    ///
    /// Blank lines are skipped. Rows may have a different number of values than the header,
    /// callers decide whether that is an error.
    ///
    /// ```
    /// use maptree::Table;
    ///
    /// let table = Table::parse("#NAMES,Fam1\nOrg_A,1\n\nOrg_B,0\n", ',')?;
    /// assert_eq!(table.headers, ["#NAMES", "Fam1"]);
    /// assert_eq!(table.rows.len(), 2);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn parse(text: &str, delim: char) -> Result<Table<String>, Report> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_byte(delim)?)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut table = Table::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.wrap_err_with(|| format!("Failed to parse table line {}.", i + 1))?;
            let row = record.iter().map(String::from).collect_vec();
            // csv yields a single empty field for blank lines
            if row.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            match table.headers.is_empty() {
                true => table.headers = row,
                false => table.rows.push(row),
            }
        }

        Ok(table)
    }

    /// Read a TSV or CSV file into a Table.
    ///
    /// If `delim` is [`None`], it is chosen from the file extension.
    pub fn read<P>(path: &P, delim: Option<char>) -> Result<Table<String>, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = match delim {
            Some(c) => c,
            None => utils::get_delimiter(path)?,
        };
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read file: {path:?}"))?;
        let mut table = Table::parse(&text, delim)
            .wrap_err_with(|| format!("Failed to parse table: {path:?}"))?;
        table.path = Some(path.as_ref().to_path_buf());
        Ok(table)
    }
}

fn delimiter_byte(delim: char) -> Result<u8, Report> {
    u8::try_from(delim).map_err(|_| eyre!("Delimiter must be a single byte character: {delim:?}"))
}
