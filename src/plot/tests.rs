use crate::plot::layout::layout;
use crate::plot::style::Color;
use crate::plot::*;
use crate::utils::fixtures;
use crate::{Error, PresenceMatrix};

use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use maptree_phylo::FromNewick;
use std::path::Path;

const MATRIX: &str = indoc! {"
    #NAMES\t1\t3\t4\t5
    Amycolatopsis_sp_AA4\t0\t0\t1\t0
    Streptomyces_coelicolor\t1\t0\t0\t0
    Streptomyces_coelicolor_A32\t1\t1\t0\t0
    Streptomyces_griseus\t1\t0\t0\t0
    Verrucosispora_maris\t0\t0\t0\t1
"};

fn write_tree(dir: &Path) -> Result<std::path::PathBuf, Report> {
    let path = dir.join("tree.nwk");
    std::fs::write(&path, fixtures::TREE)?;
    Ok(path)
}

fn args(tree: &Path, output: &Path, outgroup: &[&str]) -> Args {
    Args {
        tree: tree.to_path_buf(),
        matrix: MATRIX.to_string(),
        output: output.to_path_buf(),
        options: PlotOptions { outgroup: outgroup.iter().map(|o| o.to_string()).collect(), ..Default::default() },
    }
}

fn leaf_label(tree: &Tree, leaf: &petgraph::graph::NodeIndex) -> Result<String, Report> {
    Ok(tree.get_node(leaf)?.to_string())
}

#[test]
fn plot_svg() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;
    let output = dir.path().join("maptree.svg");

    let summary = plot(&args(&tree, &output, &[]))?;

    // one organism has no leaf, one leaf has no row
    assert_eq!(summary.dropped, ["Streptomyces_coelicolor"]);
    assert_eq!(summary.empty_leaves, ["Micromonospora_sp"]);
    assert_eq!(summary.matched.len(), 4);

    let svg = std::fs::read_to_string(&output)?;
    assert!(svg.starts_with("<?xml"));
    assert!(svg.trim_end().ends_with("</svg>"));
    // 5 leaves by 4 families, 5 present cells
    assert_eq!(svg.matches("<circle").count(), 20);
    assert_eq!(svg.matches(r##"fill="#FF0000""##).count(), 5);
    assert!(svg.contains(">Micromonospora_sp</text>"));
    Ok(())
}

#[test]
fn plot_sanitized_names() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;
    let output = dir.path().join("maptree.svg");

    let mut args = args(&tree, &output, &[]);
    args.matrix = "#NAMES\t1\nStreptomyces griseus\t1\nNonexistent strain\t1\n".to_string();
    let summary = plot(&args)?;

    assert_eq!(summary.matched["Streptomyces griseus"], "Streptomyces_griseus");
    assert_eq!(summary.dropped, ["Nonexistent strain"]);
    Ok(())
}

#[test]
fn plot_png_and_jpeg() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;

    let png = dir.path().join("maptree.png");
    plot(&args(&tree, &png, &[]))?;
    let bytes = std::fs::read(&png)?;
    assert_eq!(&bytes[0..4], b"\x89PNG");

    let jpeg = dir.path().join("maptree.JPEG");
    plot(&args(&tree, &jpeg, &[]))?;
    let bytes = std::fs::read(&jpeg)?;
    assert_eq!(&bytes[0..2], [0xFF, 0xD8]);

    // no temporary files left behind
    let files = std::fs::read_dir(dir.path())?.count();
    assert_eq!(files, 3);
    Ok(())
}

#[test]
fn unsupported_format_before_reading() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = dir.path().join("nonexistent.nwk");
    let output = dir.path().join("maptree.pdf");

    let report = plot(&args(&tree, &output, &[])).unwrap_err();
    assert_eq!(report.to_string(), "Plot stage failed.");
    assert!(matches!(report.downcast_ref::<Error>(), Some(Error::UnsupportedFormat { .. })));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn outgroup_not_found() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;
    let output = dir.path().join("maptree.svg");

    let report = plot(&args(&tree, &output, &["Nonexistent_strain"])).unwrap_err();
    match report.downcast_ref::<Error>() {
        Some(Error::OutgroupNotFound { outgroups }) => assert_eq!(outgroups, &["Nonexistent_strain"]),
        other => panic!("Expected OutgroupNotFound, found {other:?}"),
    }
    assert!(!output.exists());
    Ok(())
}

#[test]
fn reroot_single_outgroup() -> Result<(), Report> {
    let mut tree = Tree::from_newick(fixtures::TREE)?;
    let found = reroot(&mut tree, &["Micromonospora sp.".to_string()])?;
    assert_eq!(found, ["Micromonospora sp."]);

    let root = tree.get_root_index()?;
    let children = tree.get_children(&root);
    let labels = children.iter().map(|c| leaf_label(&tree, c)).collect::<Result<Vec<_>, Report>>()?;
    assert!(labels.contains(&"Micromonospora_sp".to_string()));
    assert_eq!(tree.get_leaves()?.len(), 5);
    Ok(())
}

#[test]
fn reroot_outgroup_clade() -> Result<(), Report> {
    let mut tree = Tree::from_newick(fixtures::TREE)?;
    let outgroups = ["Verrucosispora_maris".to_string(), "Micromonospora_sp".to_string()];
    reroot(&mut tree, &outgroups)?;

    // the outgroup clade hangs from the root
    let root = tree.get_root_index()?;
    let leaves = tree.get_leaves()?;
    let outgroup_leaves: Vec<_> = leaves
        .iter()
        .filter(|leaf| {
            let label = leaf_label(&tree, leaf).unwrap_or_default();
            outgroups.contains(&label)
        })
        .copied()
        .collect();
    let ancestor = tree.get_common_ancestor(&outgroup_leaves)?;
    assert_eq!(tree.get_parent(&ancestor), Some(root));
    Ok(())
}

#[test]
fn reroot_outgroups_spanning_root() -> Result<(), Report> {
    let mut tree = Tree::from_newick(fixtures::TREE)?;
    let outgroups = ["Streptomyces_griseus".to_string(), "Micromonospora_sp".to_string()];
    let found = reroot(&mut tree, &outgroups)?;
    assert_eq!(found, outgroups);

    // neither side is a clade, the first outgroup leaf is used
    let root = tree.get_root_index()?;
    let griseus = tree.get_leaf_index(&maptree_phylo::Node::from("Streptomyces_griseus"))?;
    assert_eq!(tree.get_parent(&griseus), Some(root));
    Ok(())
}

#[test]
fn reroot_all_leaves() -> Result<(), Report> {
    let mut tree = Tree::from_newick("(A:1,B:1);")?;
    let outgroups = ["A".to_string(), "B".to_string()];
    assert!(reroot(&mut tree, &outgroups).is_err());
    Ok(())
}

#[test]
fn plot_outgroup_tree_out() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;
    let output = dir.path().join("maptree.svg");
    let tree_out = dir.path().join("out").join("rerooted.nwk");

    let mut args = args(&tree, &output, &["Micromonospora_sp", "Nonexistent_strain"]);
    args.options.tree_out = Some(tree_out.clone());
    let summary = plot(&args)?;
    assert_eq!(summary.outgroups, ["Micromonospora_sp"]);

    // rerooted and ladderized, largest clades on top
    let rerooted = Tree::read(&tree_out)?;
    let leaves = rerooted.get_leaves()?;
    assert_eq!(leaf_label(&rerooted, &leaves[4])?, "Micromonospora_sp");
    Ok(())
}

#[test]
fn plot_style() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let tree = write_tree(dir.path())?;
    let output = dir.path().join("maptree.svg");

    let style = dir.path().join("style.json");
    std::fs::write(&style, r##"{"present_color": "#0000FF", "absent_color": "#FFFFFF"}"##)?;
    let mut args = args(&tree, &output, &[]);
    args.options.style = Some(style.clone());
    plot(&args)?;
    let svg = std::fs::read_to_string(&output)?;
    assert_eq!(svg.matches(r##"fill="#0000FF""##).count(), 5);

    std::fs::write(&style, r#"{"cell_radius": -1}"#)?;
    assert!(plot(&args).is_err());
    std::fs::write(&style, r##"{"cell_colour": "#0000FF"}"##)?;
    assert!(plot(&args).is_err());
    Ok(())
}

#[test]
fn layout_cells() -> Result<(), Report> {
    let tree = Tree::from_newick("((A:1,B:1):1,C:2);")?;
    let matrix: PresenceMatrix = "#NAMES\t1\t2\nA\t1\t0\nC\t1\t1\n".parse()?;
    let rows = ["A", "C"]
        .iter()
        .filter_map(|organism| Some((organism.to_string(), matrix.get_row(organism)?)))
        .collect();
    let style = Style::default();

    let scene = layout(&tree, &rows, &matrix.families, &style)?;
    let circles: Vec<_> = scene.circles().collect();
    assert_eq!(circles.len(), 6);

    let red = Color::new(0xFF, 0x00, 0x00);
    let present: Vec<_> = circles.iter().map(|(_, fill)| **fill == red).collect();
    // rows top to bottom: A, B (no matrix row), C
    assert_eq!(present, [true, false, false, false, true, true]);

    // cells of a row share a y, rows are evenly spaced
    let ys: Vec<f32> = circles.iter().map(|(center, _)| center.1).collect();
    assert_eq!(ys[0], ys[1]);
    assert_eq!(ys[3] - ys[1], ys[5] - ys[3]);

    // the matrix sits to the right of every label
    let matrix_left = circles.iter().map(|(center, _)| center.0).fold(f32::MAX, f32::min) - style.cell_radius;
    for text in scene.texts().filter(|text| !text.vertical) {
        let right = text.position.0 + font::text_width(&text.text, text.scale) as f32;
        assert!(right < matrix_left, "{} overlaps the matrix", text.text);
    }

    // headers are vertical, one per family
    assert_eq!(scene.texts().filter(|text| text.vertical).count(), 2);
    assert!(scene.width > matrix_left && scene.height > ys[5]);
    Ok(())
}

#[test]
fn layout_cladogram() -> Result<(), Report> {
    // no branch lengths, no scale bar
    let tree = Tree::from_newick("((A,B),C);")?;
    let scene = layout(&tree, &Default::default(), &["1".to_string()], &Style::default())?;
    assert_eq!(scene.circles().count(), 3);
    assert!(scene.texts().all(|text| text.text != "0.1"));
    Ok(())
}
