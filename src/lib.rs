//! `maptree` draws a phylogenetic tree of organisms next to a presence/absence
//! matrix of their biosynthetic gene cluster (BGC) families.
//!
//! It works in two stages, which can run separately or together:
//!
//! 1. **matrix**: read a [BiG-SCAPE](https://github.com/medema-group/BiG-SCAPE) results
//!    directory and build a [`PresenceMatrix`] of families per organism.
//! 1. **plot**: read a Newick tree, optionally reroot it on outgroup organisms, and draw
//!    it with one row of matrix cells per leaf as SVG, PNG or JPEG.
//!
//! ```rust
//! use maptree::PresenceMatrix;
//!
//! let matrix = PresenceMatrix::from_records([("Org_A", "1"), ("Org_B", "2"), ("Org_A", "2")]);
//! assert!(matrix.is_present("Org_A", "1"));
//! assert!(!matrix.is_present("Org_B", "1"));
//! ```

pub mod bigscape;
pub mod cli;
pub mod error;
pub mod matrix;
pub mod names;
pub mod plot;
pub mod run;
pub mod table;
pub mod utils;

#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::matrix::PresenceMatrix;
#[doc(inline)]
pub use table::Table;
#[doc(inline)]
pub use utils::verbosity::Verbosity;
