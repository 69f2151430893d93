//! Phylogenetic trees for `maptree`: [Newick](https://en.wikipedia.org/wiki/Newick_format)
//! parsing, traversal in drawing order, outgroup rerooting and export.
//!
//! ```rust
//! use maptree_phylo::{Branch, FromNewick, Node, Phylogeny, ToNewick};
//!
//! let mut phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("((A:1,B:1):1,C:2);")?;
//! let c = phylo.get_leaf_index(&Node::from("C"))?;
//! phylo.set_outgroup(c)?;
//! assert_eq!(phylo.to_newick()?, "(C:1,(A:1,B:1):2);");
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

use color_eyre::eyre::{Report, Result};

mod branch;
pub mod newick;
mod node;
mod phylogeny;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use branch::Branch;
#[doc(inline)]
pub use node::Node;
#[doc(inline)]
pub use phylogeny::Phylogeny;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Returns an object created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`].
pub trait FromNewick {
    fn from_newick(newick: &str) -> Result<Self, Report>
    where
        Self: Sized;
}

/// Returns a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`] created from an object.
pub trait ToNewick {
    fn to_newick(&self) -> Result<String, Report>;
}
