//! Organism name normalization shared by the matrix builder and the renderer.

/// Normalize an organism or compound name the way autoMLST names tree leaves.
///
/// Spaces become underscores, then every character other than ASCII letters,
/// digits, `_` and `-` is removed.
///
/// ```rust
/// use maptree::names::sanitize;
///
/// assert_eq!(sanitize("Streptomyces coelicolor A3(2)"), "Streptomyces_coelicolor_A32");
/// assert_eq!(sanitize("Amycolatopsis sp. AA4"), "Amycolatopsis_sp_AA4");
/// assert_eq!(sanitize("already_clean-name"), "already_clean-name");
/// assert_eq!(sanitize("Café"), "Caf");
/// ```
pub fn sanitize(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Returns true if `name` starts like a MIBiG accession (ex. `BGC0000001`).
///
/// ```rust
/// use maptree::names::is_mibig;
///
/// assert!(is_mibig("BGC0000128.1"));
/// assert!(!is_mibig("NC_003888.3.region001"));
/// ```
pub fn is_mibig(name: &str) -> bool {
    name.starts_with("BGC")
}

/// Compound name of a MIBiG entry from its BiG-SCAPE description.
///
/// ```rust
/// use maptree::names::compound_name;
///
/// assert_eq!(compound_name("actinorhodin biosynthetic gene cluster"), "actinorhodin");
/// assert_eq!(compound_name("calcium-dependent antibiotic biosynthetic gene cluster"), "calcium-dependent_antibiotic");
/// ```
pub fn compound_name(description: &str) -> String {
    sanitize(&description.replace(" biosynthetic gene cluster", ""))
}
