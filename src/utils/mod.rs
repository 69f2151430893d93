//! File helpers shared by the matrix builder and the renderer.

#[cfg(test)]
pub mod fixtures;
pub mod verbosity;

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use std::convert::AsRef;
use std::fmt::Debug;
use std::io::Write;
use std::path::Path;

/// Get delimiter based on file extension.
///
/// ## Examples
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// Note that `.txt` is assumed to be tab-delimited!
///
/// ```rust
/// use maptree::utils::get_delimiter;
///
/// assert_eq!(get_delimiter(&"families.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"matrix.csv")?, ',');
/// assert_eq!(get_delimiter(&"matrix.txt")?, '\t');
/// assert!(get_delimiter(&"matrix").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err_with(|| format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err_with(|| format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => {
            Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt"))
        }
    }
}

/// Get delimiter based on file extension, falling back to tab for unknown extensions.
///
/// ```rust
/// use maptree::utils::get_delimiter_or_tab;
///
/// assert_eq!(get_delimiter_or_tab(&"matrix.csv"), ',');
/// assert_eq!(get_delimiter_or_tab(&"matrix.mat"), '\t');
/// ```
pub fn get_delimiter_or_tab<P>(path: &P) -> char
where
    P: AsRef<Path> + Debug,
{
    get_delimiter(path).unwrap_or('\t')
}

/// Create the parent directory of a file path, if it does not exist yet.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create output directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Write bytes to a temporary file next to `path`, then rename it into place.
///
/// A failure leaves any existing file at `path` untouched.
///
/// ```rust
/// use maptree::utils::write_atomic;
///
/// let dir = tempfile::tempdir()?;
/// let output = dir.path().join("out").join("matrix.tsv");
/// write_atomic(&output, b"#NAMES\tFam1\n")?;
/// assert_eq!(std::fs::read_to_string(&output)?, "#NAMES\tFam1\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write_atomic<P>(path: &P, bytes: &[u8]) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    create_parent_dir(path)?;
    let dir = match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".maptree")
        .tempfile_in(dir)
        .wrap_err_with(|| format!("Unable to create temporary file in: {dir:?}"))?;
    file.write_all(bytes).wrap_err_with(|| format!("Failed to write file: {path:?}"))?;
    file.flush().wrap_err_with(|| format!("Failed to write file: {path:?}"))?;
    file.persist(path).wrap_err_with(|| format!("Failed to move output into place: {path:?}"))?;

    Ok(())
}
