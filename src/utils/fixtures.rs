//! A small BiG-SCAPE results directory for tests.
//!
//! Five organisms (one of them only through a MIBiG reference) and two classes:
//!
//! - `PKSI`: `NC_1.region001`, `NC_2.region001` and the actinorhodin reference in family 1,
//!   the abyssomicin reference alone in family 5.
//! - `NRPS`: `NC_1.region002` in family 3, `NC_3.region001` in family 4.

use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use std::path::Path;

pub const SUMMARY: &str = indoc! {"
    BGC\tAccession ID\tDescription\tProduct Prediction\tBiG-SCAPE class\tOrganism\tTaxonomy
    NC_1.region001\tNC_1\tStreptomyces coelicolor A3(2) chromosome\tT1PKS\tPKSI\tStreptomyces coelicolor A3(2)\tBacteria
    NC_1.region002\tNC_1\tStreptomyces coelicolor A3(2) chromosome\tNRPS\tNRPS\tStreptomyces coelicolor A3(2)\tBacteria
    NC_2.region001\tNC_2\tStreptomyces griseus chromosome\tT1PKS\tPKSI\tStreptomyces griseus\tBacteria
    NC_3.region001\tNC_3\tAmycolatopsis sp. AA4 chromosome\tNRPS\tNRPS\tAmycolatopsis sp. AA4\tBacteria
    BGC0000128\tBGC0000128\tactinorhodin biosynthetic gene cluster\tT2PKS\tPKSI\tStreptomyces coelicolor\tBacteria
    BGC0000001\tBGC0000001\tabyssomicin biosynthetic gene cluster\tT1PKS\tPKSI\tVerrucosispora maris\tBacteria
"};

pub const PKSI_CLUSTERING: &str = indoc! {"
    #BGC Name\tFamily Number
    NC_1.region001\t1
    NC_2.region001\t1
    BGC0000128\t1
    BGC0000001\t5
"};

pub const NRPS_CLUSTERING: &str = indoc! {"
    #BGC Name\tFamily Number
    NC_1.region002\t3
    NC_3.region001\t4
"};

pub const PKSI_NETWORK: &str = indoc! {"
    Clustername 1\tClustername 2\tRaw distance\tSquared similarity
    NC_1.region001\tNC_2.region001\t0.2\t0.64
    NC_2.region001\tBGC0000128\t0.25\t0.56
    BGC0000001\tBGC0000001\t0.0\t1.0
"};

pub const NRPS_NETWORK: &str = indoc! {"
    Clustername 1\tClustername 2\tRaw distance\tSquared similarity
    NC_1.region002\tNC_3.region001\t0.1\t0.81
    NC_2.region001\tNC_1.region001\t0.2\t0.64
"};

/// Newick tree of the organisms in [`SUMMARY`], labels sanitized, plus one extra leaf.
pub const TREE: &str = "((Streptomyces_coelicolor_A32:0.1,Streptomyces_griseus:0.2):0.3,(Amycolatopsis_sp_AA4:0.4,(Verrucosispora_maris:0.1,Micromonospora_sp:0.5):0.2):0.1);";

/// Write the fixture results directory, at cutoff 0.30, into `dir`.
pub fn write_results(dir: &Path) -> Result<(), Report> {
    std::fs::write(dir.join("Network_Annotations_Full.tsv"), SUMMARY)?;
    for (class, clustering, network) in
        [("PKSI", PKSI_CLUSTERING, PKSI_NETWORK), ("NRPS", NRPS_CLUSTERING, NRPS_NETWORK)]
    {
        let class_dir = dir.join(class);
        std::fs::create_dir_all(&class_dir)?;
        std::fs::write(class_dir.join(format!("{class}_clustering_c0.30.tsv")), clustering)?;
        std::fs::write(class_dir.join(format!("{class}_c0.30.network")), network)?;
    }
    Ok(())
}
