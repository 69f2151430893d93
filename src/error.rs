//! Named failure conditions of the matrix builder and the renderer.
//!
//! Every variant converts into a [`Report`](color_eyre::eyre::Report), so callers
//! propagate them with `?` and tests recover them with `Report::downcast_ref`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The results directory, its summary file, its class directories, or any usable record is missing.
    #[error("No BiG-SCAPE results found in {path:?}: {reason}")]
    MissingResults { path: PathBuf, reason: String },

    /// A line of a BiG-SCAPE file that could not be parsed. Recovered by skipping the line.
    #[error("Malformed record in {path:?} line {line}: {reason}")]
    MalformedRecord { path: PathBuf, line: usize, reason: String },

    /// More than one candidate file where exactly one is expected.
    #[error("Multiple {kind} files found in {path:?}: {files:?}")]
    DuplicateResults { path: PathBuf, kind: String, files: Vec<PathBuf> },

    /// None of the requested outgroups matched a leaf of the tree.
    #[error("None of the outgroups were found in the tree: {outgroups:?}")]
    OutgroupNotFound { outgroups: Vec<String> },

    /// The output image extension is not a supported format.
    #[error("Unsupported image format {extension:?} for output {path:?}")]
    UnsupportedFormat { path: PathBuf, extension: String },
}
