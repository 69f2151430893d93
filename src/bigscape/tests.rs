use crate::bigscape::*;
use crate::utils::fixtures;
use crate::Error;

use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use std::collections::BTreeSet;

fn set(members: &[&str]) -> BTreeSet<String> {
    members.iter().map(|m| m.to_string()).collect()
}

#[test]
fn discover_results() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;

    let results = ResultsDir::discover(&dir.path())?;
    assert_eq!(results.summary, dir.path().join("Network_Annotations_Full.tsv"));
    assert_eq!(results.classes, [dir.path().join("NRPS"), dir.path().join("PKSI")]);

    let clustering = results.class_files(&clustering_suffix(0.3))?;
    assert_eq!(
        clustering,
        [
            dir.path().join("NRPS").join("NRPS_clustering_c0.30.tsv"),
            dir.path().join("PKSI").join("PKSI_clustering_c0.30.tsv")
        ]
    );

    // no files at another cutoff
    assert!(results.class_files(&clustering_suffix(0.5))?.is_empty());
    Ok(())
}

#[test]
fn discover_missing_directory() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let result = ResultsDir::discover(&dir.path().join("nonexistent"));
    let report = result.unwrap_err();
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::MissingResults { .. })));
    Ok(())
}

#[test]
fn discover_missing_summary() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;
    std::fs::remove_file(dir.path().join("Network_Annotations_Full.tsv"))?;

    let report = ResultsDir::discover(&dir.path()).unwrap_err();
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::MissingResults { .. })));
    Ok(())
}

#[test]
fn discover_missing_classes() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("Network_Annotations_Full.tsv"), fixtures::SUMMARY)?;

    let report = ResultsDir::discover(&dir.path()).unwrap_err();
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::MissingResults { .. })));
    Ok(())
}

#[test]
fn discover_duplicate_summary() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;
    std::fs::write(dir.path().join("Network_Annotations_Full_copy.tsv"), fixtures::SUMMARY)?;

    let report = ResultsDir::discover(&dir.path()).unwrap_err();
    match report.downcast_ref::<Error>() {
        Some(Error::DuplicateResults { files, .. }) => assert_eq!(files.len(), 2),
        other => panic!("Expected DuplicateResults, found {other:?}"),
    }
    Ok(())
}

#[test]
fn duplicate_class_files() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;
    let pksi = dir.path().join("PKSI");
    std::fs::write(pksi.join("PKSI_glocal_clustering_c0.30.tsv"), fixtures::PKSI_CLUSTERING)?;

    let results = ResultsDir::discover(&dir.path())?;
    let report = results.class_files(&clustering_suffix(0.3)).unwrap_err();
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::DuplicateResults { .. })));
    Ok(())
}

#[test]
fn summary_parse() -> Result<(), Report> {
    let summary = Summary::parse(fixtures::SUMMARY, &"summary.tsv")?;
    assert_eq!(summary.entries.len(), 6);

    let entry = &summary.entries["NC_1.region001"];
    assert_eq!(entry.class, "PKSI");
    assert_eq!(entry.organism, "Streptomyces_coelicolor_A32");
    assert!(!entry.is_mibig());

    let mibig = &summary.entries["BGC0000128"];
    assert!(mibig.is_mibig());
    assert_eq!(mibig.compound(), "actinorhodin");
    Ok(())
}

#[test]
fn summary_skips_malformed_rows() -> Result<(), Report> {
    let text = indoc! {"
        BGC\tAccession ID\tDescription\tProduct Prediction\tBiG-SCAPE class\tOrganism\tTaxonomy
        NC_1.region001\tNC_1\tchromosome\tT1PKS\tPKSI\tOrg A\tBacteria
        NC_2.region001\tNC_2\tchromosome

        NC_3.region001\tNC_3\tchromosome\tNRPS\tNRPS\tOrg C
    "};
    let summary = Summary::parse(text, &"summary.tsv")?;

    // short row dropped, 6-column row kept
    let observed: Vec<_> = summary.entries.keys().cloned().collect();
    assert_eq!(observed, ["NC_1.region001", "NC_3.region001"]);
    assert_eq!(summary.entries["NC_3.region001"].organism, "Org_C");
    Ok(())
}

#[test]
fn summary_skips_empty_organisms() -> Result<(), Report> {
    let text = indoc! {"
        BGC\tAccession ID\tDescription\tProduct Prediction\tBiG-SCAPE class\tOrganism\tTaxonomy
        NC_1.region001\tNC_1\tchromosome\tT1PKS\tPKSI\tOrg A\tBacteria
        NC_2.region001\tNC_2\tchromosome\tNRPS\tNRPS\t(.)\tBacteria
        NC_3.region001\tNC_3\tchromosome\tNRPS\tNRPS\t\tBacteria
    "};
    let summary = Summary::parse(text, &"summary.tsv")?;

    let observed: Vec<_> = summary.entries.keys().cloned().collect();
    assert_eq!(observed, ["NC_1.region001"]);
    // no blank row in the matrix
    assert!(!summary.organisms(false).contains_key(""));
    Ok(())
}

#[test]
fn summary_missing_header() {
    let text = "NC_1.region001\tNC_1\tchromosome\tT1PKS\tPKSI\tOrg A\tBacteria\n";
    assert!(Summary::parse(text, &"summary.tsv").is_err());
    assert!(Summary::parse("", &"summary.tsv").is_err());
}

#[test]
fn summary_organisms() -> Result<(), Report> {
    let summary = Summary::parse(fixtures::SUMMARY, &"summary.tsv")?;

    let all = summary.organisms(false);
    assert_eq!(all.len(), 5);
    assert_eq!(all["Streptomyces_coelicolor_A32"], set(&["NC_1.region001", "NC_1.region002"]));
    assert!(all.contains_key("Verrucosispora_maris"));

    let organisms = summary.organisms(true);
    let observed: Vec<_> = organisms.keys().cloned().collect();
    assert_eq!(observed, ["Amycolatopsis_sp_AA4", "Streptomyces_coelicolor_A32", "Streptomyces_griseus"]);
    Ok(())
}

#[test]
fn clustering_skips_malformed_lines() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("PKSI_clustering_c0.30.tsv");
    let text = indoc! {"
        #BGC Name\tFamily Number
        NC_1.region001\t1
        NC_2.region001
        NC_3.region001\t2\textra
        BGC0000128\t1
    "};
    std::fs::write(&path, text)?;

    let observed = read_clustering(&path)?;
    let expected = vec![
        ("NC_1.region001".to_string(), "1".to_string()),
        ("BGC0000128".to_string(), "1".to_string()),
    ];
    assert_eq!(observed, expected);
    Ok(())
}

#[test]
fn clustering_families_from_results() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;
    let results = ResultsDir::discover(&dir.path())?;

    let families = clustering_families(&results, 0.3)?;
    let names: Vec<_> = families.keys().cloned().collect();
    assert_eq!(names, ["1", "3", "4", "5"]);
    assert_eq!(families["1"], set(&["BGC0000128", "NC_1.region001", "NC_2.region001"]));
    Ok(())
}

#[test]
fn network_requires_cluster_columns() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("PKSI_c0.30.network");
    std::fs::write(&path, "Source\tTarget\nNC_1.region001\tNC_2.region001\n")?;
    assert!(read_network(&path).is_err());
    Ok(())
}

#[test]
fn network_families_from_results() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    fixtures::write_results(dir.path())?;
    let results = ResultsDir::discover(&dir.path())?;
    let summary = Summary::read(&results.summary)?;

    let families = network_families(&results, &summary, 0.3)?;
    let names: Vec<_> = families.keys().cloned().collect();
    // the abyssomicin reference forms a MIBiG-only component and is dropped
    assert_eq!(names, ["1_PKSI", "2_NRPS"]);
    assert_eq!(families["1_PKSI"], set(&["BGC0000128", "NC_1.region001", "NC_2.region001"]));
    assert_eq!(families["2_NRPS"], set(&["NC_1.region002", "NC_3.region001"]));
    Ok(())
}

#[test]
fn connected_families_mixed_classes() -> Result<(), Report> {
    let summary = Summary::parse(fixtures::SUMMARY, &"summary.tsv")?;
    let edges: BTreeSet<_> = [
        ("NC_1.region001", "NC_1.region002"),
        ("NC_2.region001", "NC_9.region001"),
    ]
    .iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();

    let families = connected_families(&edges, &summary);
    let names: Vec<_> = families.keys().cloned().collect();
    // equal sizes are ranked by their smallest member, unknown clusters get the unknown class
    assert_eq!(names, ["1_NRPS_PKSI", "2_PKSI_unknown"]);
    Ok(())
}

#[test]
fn mibig_family_names() -> Result<(), Report> {
    let summary = Summary::parse(fixtures::SUMMARY, &"summary.tsv")?;
    let mut families = Families::new();
    families.insert("1".to_string(), set(&["BGC0000128", "NC_1.region001"]));
    families.insert("2_actinorhodin".to_string(), set(&["BGC0000128", "NC_2.region001"]));
    families.insert("3".to_string(), set(&["NC_3.region001"]));
    families.insert("5".to_string(), set(&["BGC0000001"]));

    let named = name_mibig_families(families, &summary);
    let names: Vec<_> = named.keys().cloned().collect();
    assert_eq!(names, ["1_actinorhodin", "2_actinorhodin", "3"]);
    Ok(())
}
