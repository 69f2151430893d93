//! Column order of the matrix: natural order, clustered by presence profile, or an explicit family order file.

use crate::PresenceMatrix;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use kodama::{Method, Step};
use std::fmt::Debug;
use std::path::Path;

/// Sort key for natural family order: names with a leading integer first,
/// compared numerically, then by the whole name.
pub fn natural_key(family: &str) -> (bool, u64, &str) {
    let digits: String = family.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.is_empty() {
        true => (true, 0, family),
        false => (false, digits.parse().unwrap_or(u64::MAX), family),
    }
}

/// Parse a family order: a single line of comma-separated family numbers.
///
/// ```rust
/// use maptree::matrix::order::parse_family_order;
///
/// assert_eq!(parse_family_order("3, 1,2\n")?, ["3", "1", "2"]);
/// assert!(parse_family_order("1,2,1").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_family_order(text: &str) -> Result<Vec<String>, Report> {
    let line = text.lines().next().unwrap_or_default();
    let order = line
        .split(',')
        .map(|number| number.trim().to_string())
        .filter(|number| !number.is_empty())
        .collect_vec();

    let duplicates = order.iter().duplicates().collect_vec();
    if !duplicates.is_empty() {
        return Err(eyre!(
            "Family order list contains duplicates: {}",
            duplicates.iter().join(", ")
        ));
    }

    Ok(order)
}

/// Read a family order file.
pub fn read_family_order<P>(path: &P) -> Result<Vec<String>, Report>
where
    P: AsRef<Path> + Debug,
{
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read family order: {path:?}"))?;
    parse_family_order(&text).wrap_err_with(|| format!("Failed to parse family order: {path:?}"))
}

impl PresenceMatrix {
    /// Reorder family columns by number.
    ///
    /// Each number selects the one family named after it, either exactly (`3`)
    /// or as a prefix followed by `_` (`3_NRPS`). The list must name every family once.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let mut matrix = PresenceMatrix::from_records([("Org_A", "1_PKSI"), ("Org_A", "2_NRPS"), ("Org_B", "3")]);
    /// matrix.apply_family_order(&["3", "1", "2"])?;
    /// assert_eq!(matrix.families, ["3", "1_PKSI", "2_NRPS"]);
    /// assert!(matrix.apply_family_order(&["1", "2"]).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn apply_family_order<S>(&mut self, order: &[S]) -> Result<(), Report>
    where
        S: AsRef<str>,
    {
        if order.len() != self.families.len() {
            return Err(eyre!(
                "Length of family order list ({}) must match the number of families ({}).",
                order.len(),
                self.families.len()
            ))
            .suggestion(format!("Families: {}", self.families.iter().join(", ")));
        }

        let mut families = Vec::with_capacity(order.len());
        for number in order {
            let number = number.as_ref();
            let prefix = format!("{number}_");
            let matches = self
                .families
                .iter()
                .filter(|family| *family == number || family.starts_with(&prefix))
                .collect_vec();
            match matches.as_slice() {
                [family] => families.push((*family).clone()),
                [] => return Err(eyre!("Family order number {number} matches no family.")),
                _ => {
                    return Err(eyre!(
                        "Family order number {number} matches several families: {}",
                        matches.iter().join(", ")
                    ))
                }
            }
        }

        if !families.iter().all_unique() {
            return Err(eyre!("Family order selects a family more than once: {}", order.iter().map(|n| n.as_ref()).join(",")));
        }

        self.families = families;
        Ok(())
    }

    /// Reorder family columns so families with similar presence profiles sit together.
    ///
    /// Profiles are compared by euclidean distance and joined by single linkage. The columns
    /// follow the leaves of the dendrogram, the lower-labelled subtree first, so the same
    /// matrix always gets the same order.
    ///
    /// ```rust
    /// use maptree::PresenceMatrix;
    ///
    /// let records = [("Org_A", "1"), ("Org_B", "2"), ("Org_A", "3")];
    /// let mut matrix = PresenceMatrix::from_records(records);
    /// matrix.cluster_families()?;
    /// assert_eq!(matrix.families, ["2", "1", "3"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn cluster_families(&mut self) -> Result<(), Report> {
        let n = self.families.len();
        if n < 2 {
            return Ok(());
        }

        let profiles = self
            .families
            .iter()
            .map(|family| self.organisms.values().map(|present| present.contains(family)).collect_vec())
            .collect_vec();
        let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
        for (i, a) in profiles.iter().enumerate() {
            for b in &profiles[i + 1..] {
                let differences = a.iter().zip(b).filter(|(x, y)| x != y).count();
                condensed.push((differences as f64).sqrt());
            }
        }

        let dendrogram = kodama::linkage(&mut condensed, n, Method::Single);
        let order = leaf_order(dendrogram.steps(), n)?;
        self.families = order.into_iter().map(|i| self.families[i].clone()).collect();
        Ok(())
    }
}

/// Observations in the order of the dendrogram leaves, from the root down.
///
/// Observations are labelled `0..n`, step `i` creates the cluster labelled `n + i`.
fn leaf_order(steps: &[Step<f64>], n: usize) -> Result<Vec<usize>, Report> {
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + steps.len() - 1];
    while let Some(cluster) = stack.pop() {
        if cluster < n {
            order.push(cluster);
            continue;
        }
        let step = steps.get(cluster - n).ok_or_else(|| eyre!("Dendrogram has no cluster {cluster}."))?;
        stack.push(step.cluster1.max(step.cluster2));
        stack.push(step.cluster1.min(step.cluster2));
    }

    if order.len() != n {
        return Err(eyre!("Dendrogram covers {} of {n} families.", order.len()));
    }
    Ok(order)
}
