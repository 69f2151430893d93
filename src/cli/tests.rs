use crate::cli::{Cli, Command};
use crate::matrix::Mode;
use crate::utils::fixtures;
use crate::{run, Error, PresenceMatrix, Verbosity};

use clap::Parser;
use color_eyre::eyre::{Report, Result};

#[test]
fn parse_matrix_defaults() -> Result<(), Report> {
    let cli = Cli::try_parse_from(["maptree", "matrix", "bigscape/"])?;
    assert_eq!(cli.verbosity, Verbosity::Info);
    match cli.command {
        Command::Matrix(args) => {
            assert_eq!(args.options.cutoff, 0.30);
            assert_eq!(args.options.mode, Mode::Clustering);
            assert!(!args.options.mibig);
            assert!(!args.options.cluster_families);
            assert_eq!(args.output, None);
        }
        _ => panic!("Expected the matrix command."),
    }
    Ok(())
}

#[test]
fn parse_plot_outgroups() -> Result<(), Report> {
    let input = [
        "maptree", "plot", "tree.nwk", "matrix.tsv", "maptree.png", "--outgroup", "Org_A", "Org_B", "-v", "debug",
    ];
    let cli = Cli::try_parse_from(input)?;
    assert_eq!(cli.verbosity, Verbosity::Debug);
    match cli.command {
        Command::Plot(args) => {
            assert_eq!(args.matrix, "matrix.tsv");
            assert_eq!(args.options.outgroup, ["Org_A", "Org_B"]);
        }
        _ => panic!("Expected the plot command."),
    }
    Ok(())
}

#[test]
fn parse_invalid() {
    assert!(Cli::try_parse_from(["maptree", "matrix", "bigscape/", "--mode", "graph"]).is_err());
    assert!(Cli::try_parse_from(["maptree", "plot", "tree.nwk"]).is_err());
    assert!(Cli::try_parse_from(["maptree", "matrix", "bigscape/", "-v", "loud"]).is_err());
}

#[test]
fn run_pipeline() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let results = dir.path().join("bigscape");
    std::fs::create_dir(&results)?;
    fixtures::write_results(&results)?;
    let tree = dir.path().join("tree.nwk");
    std::fs::write(&tree, fixtures::TREE)?;

    let output = dir.path().join("maptree.svg");
    let matrix = dir.path().join("matrix.csv");
    let input = [
        "maptree".into(),
        "run".into(),
        results.clone().into_os_string(),
        tree.into_os_string(),
        output.clone().into_os_string(),
        "--mibig".into(),
        "--outgroup".into(),
        "Micromonospora_sp".into(),
        "--matrix-out".into(),
        matrix.clone().into_os_string(),
    ];
    let cli = Cli::try_parse_from(input)?;
    let Command::Run(args) = cli.command else { panic!("Expected the run command.") };

    let summary = run::run(&args)?;
    assert_eq!(summary.outgroups, ["Micromonospora_sp"]);
    assert!(summary.dropped.is_empty());
    assert_eq!(summary.empty_leaves, ["Verrucosispora_maris", "Micromonospora_sp"]);

    let written = PresenceMatrix::read(&matrix)?;
    assert_eq!(written.families, ["1_actinorhodin", "3", "4"]);
    assert_eq!(written.organisms.len(), 3);
    assert!(std::fs::read_to_string(&output)?.contains("1_actinorhodin"));
    Ok(())
}

#[test]
fn run_error_names_stage() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = dir.path().join("tree.nwk");
    std::fs::write(&tree, fixtures::TREE)?;
    let results = dir.path().join("nonexistent");

    let cli = Cli::try_parse_from([
        "maptree".into(),
        "run".into(),
        results.clone().into_os_string(),
        tree.clone().into_os_string(),
        dir.path().join("maptree.svg").into_os_string(),
    ])?;
    let Command::Run(args) = cli.command else { panic!("Expected the run command.") };
    let report = run::run(&args).unwrap_err();
    assert_eq!(report.to_string(), "Matrix stage failed.");

    // the output format is checked before any results are read
    let mut args = args;
    args.output = dir.path().join("maptree.pdf");
    let report = run::run(&args).unwrap_err();
    assert_eq!(report.to_string(), "Plot stage failed.");
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::UnsupportedFormat { .. })));
    Ok(())
}
