use crate::{newick, FromNewick};

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::{Display, Formatter};

/// A [`Branch`] in the [`Phylogeny`](crate::Phylogeny).
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Branch {
    /// [`Branch`] length (ex. 1.0).
    pub length: f32,
    /// [`Branch`] confidence (ex. 90.0).
    pub confidence: f32,
}

#[rustfmt::skip]
impl AsPrimitive<f32> for Branch { fn as_(self) -> f32 { self.length } }
#[rustfmt::skip]
impl Default for Branch { fn default() -> Self { Self::new() } }
#[rustfmt::skip]
impl Display for Branch { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.length) } }
#[rustfmt::skip]
impl From<f32> for Branch { fn from(length: f32) -> Self { Branch { length, confidence: 0.0 } } }
#[rustfmt::skip]
impl Branch { pub fn new() -> Self { Branch { length: 0.0, confidence: 0.0 } } }

impl FromNewick for Branch {
    /// Returns a [`Branch`] created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) node [`str`].
    ///
    /// # Examples
    ///
    /// Just a node name.
    ///
    /// ```rust
    /// use maptree_phylo::{Branch, FromNewick};
    ///
    /// let branch = Branch::from_newick("A")?;
    /// assert_eq!(branch, Branch { length: 0.0, confidence: 0.0 });
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// Just branch attributes.
    ///
    /// ```rust
    /// # use maptree_phylo::{Branch, FromNewick};
    /// let branch = Branch::from_newick(":2:90")?;
    /// assert_eq!(branch, Branch { length: 2.0, confidence: 90.0 });
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// Branch confidence as a decimal.
    ///
    /// ```rust
    /// # use maptree_phylo::{Branch, FromNewick};
    /// let branch = Branch::from_newick(":2:0.75")?;
    /// assert_eq!(branch, Branch { length: 2.0, confidence: 75.0 });
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_newick(newick: &str) -> Result<Branch, Report> {
        let (_label, attributes) = newick::split_label(newick);
        let attributes: Vec<_> = attributes.split(':').collect();

        // attributes[0] is whatever preceded the first ':'
        let length = match attributes.get(1) {
            Some(length) if !length.is_empty() => length
                .parse()
                .wrap_err_with(|| eyre!("Failed to parse branch length from newick: {newick}"))?,
            _ => 0.0,
        };
        let confidence = match attributes.get(2) {
            Some(confidence) if !confidence.is_empty() => {
                let confidence: f32 = confidence
                    .parse()
                    .wrap_err_with(|| eyre!("Failed to parse confidence from newick: {newick}"))?;
                // if confidence is a decimal, multiple by 100
                match confidence < 1.0 {
                    true => confidence * 100.0,
                    false => confidence,
                }
            }
            _ => 0.0,
        };

        Ok(Branch { length, confidence })
    }
}
