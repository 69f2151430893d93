use crate::{Branch, FromNewick, Node, Phylogeny, ToNewick};
use color_eyre::eyre::{Report, Result};
use petgraph::graph::NodeIndex;

type Tree = Phylogeny<Node<String>, Branch>;

const NEWICK: &str = "((Org_A:0.1,Org_B:0.2):0.3,(Org_C:0.4,(Org_D:0.1,Outgroup_E:0.5):0.2):0.1);";

fn leaf(tree: &Tree, label: &str) -> Result<NodeIndex, Report> {
    tree.get_leaf_index(&Node::from(label))
}

fn leaf_labels(tree: &Tree) -> Result<Vec<String>, Report> {
    tree.get_leaves()?.iter().map(|i| Ok(tree.get_node(i)?.to_string())).collect()
}

#[test]
fn newick_read_write() -> Result<(), Report> {
    let tree = Tree::from_newick(NEWICK)?;
    assert_eq!(tree.to_newick()?, NEWICK);
    assert_eq!(leaf_labels(&tree)?, ["Org_A", "Org_B", "Org_C", "Org_D", "Outgroup_E"]);
    Ok(())
}

#[test]
fn newick_quoted_labels() -> Result<(), Report> {
    let tree = Tree::from_newick("('Streptomyces sp. A':1,'O''Brien':2);")?;
    assert_eq!(leaf_labels(&tree)?, ["Streptomyces sp. A", "O'Brien"]);
    assert_eq!(tree.to_newick()?, "('Streptomyces sp. A':1,'O''Brien':2);");
    Ok(())
}

#[test]
fn newick_internal_support() -> Result<(), Report> {
    let tree = Tree::from_newick("((A:1,B:1)95:1,C:1);")?;
    let a = leaf(&tree, "A")?;
    let parent = tree.get_parent(&a).unwrap();
    assert_eq!(tree.get_node(&parent)?.label, "95");
    Ok(())
}

#[test]
fn newick_errors() {
    assert!(Tree::from_newick("").is_err());
    assert!(Tree::from_newick("((A,B);").is_err());
    assert!(Tree::from_newick("(A,B));").is_err());
    assert!(Tree::from_newick("(A:x,B);").is_err());
    assert!(Tree::from_newick("('A,B);").is_err());
}

#[test]
fn add_branch_errors() -> Result<(), Report> {
    let mut phylo: Phylogeny<&str, f32> = Phylogeny::new();
    let root = phylo.add_node("root");
    let a = phylo.add_node("A");
    let b = phylo.add_node("B");
    phylo.add_branch(root, a, 1.0)?;
    phylo.add_branch(a, b, 1.0)?;
    // second parent
    assert!(phylo.add_branch(root, b, 1.0).is_err());
    // cycle
    assert!(phylo.add_branch(b, root, 1.0).is_err());
    Ok(())
}

#[test]
fn distances() -> Result<(), Report> {
    let tree = Tree::from_newick(NEWICK)?;
    let e = leaf(&tree, "Outgroup_E")?;
    assert!((tree.get_distance_to_root(&e)? - 0.8).abs() < 1e-6);
    assert!((tree.get_total_length() - 1.9).abs() < 1e-6);
    Ok(())
}

#[test]
fn common_ancestor() -> Result<(), Report> {
    let tree = Tree::from_newick(NEWICK)?;
    let (a, b, d) = (leaf(&tree, "Org_A")?, leaf(&tree, "Org_B")?, leaf(&tree, "Org_D")?);
    let ab = tree.get_common_ancestor(&[a, b])?;
    assert_eq!(tree.get_leaves_of(&ab), [a, b]);
    assert_eq!(tree.get_common_ancestor(&[a, d])?, tree.get_root_index()?);
    assert_eq!(tree.get_common_ancestor(&[d])?, d);
    assert!(tree.get_common_ancestor(&[]).is_err());
    Ok(())
}

#[test]
fn reroot_keeps_leaves_and_length() -> Result<(), Report> {
    let mut tree = Tree::from_newick(NEWICK)?;
    let total = tree.get_total_length();
    let e = leaf(&tree, "Outgroup_E")?;
    tree.set_outgroup(e)?;

    let mut observed = leaf_labels(&tree)?;
    observed.sort();
    assert_eq!(observed, ["Org_A", "Org_B", "Org_C", "Org_D", "Outgroup_E"]);
    assert!((tree.get_total_length() - total).abs() < 1e-5);

    // the outgroup hangs from the new root
    let root = tree.get_root_index()?;
    let e = leaf(&tree, "Outgroup_E")?;
    assert_eq!(tree.get_parent(&e), Some(root));
    assert_eq!(tree.get_children(&root).len(), 2);
    Ok(())
}

#[test]
fn reroot_on_clade() -> Result<(), Report> {
    let mut tree = Tree::from_newick(NEWICK)?;
    let d = leaf(&tree, "Org_D")?;
    let e = leaf(&tree, "Outgroup_E")?;
    let clade = tree.get_common_ancestor(&[d, e])?;
    tree.set_outgroup(clade)?;
    assert_eq!(
        tree.to_newick()?,
        "((Org_D:0.1,Outgroup_E:0.5):0.1,((Org_A:0.1,Org_B:0.2):0.4,Org_C:0.4):0.1);"
    );
    Ok(())
}

#[test]
fn reroot_on_root_fails() -> Result<(), Report> {
    let mut tree = Tree::from_newick(NEWICK)?;
    let root = tree.get_root_index()?;
    assert!(tree.set_outgroup(root).is_err());
    Ok(())
}

#[test]
fn ladderize_keeps_leaves() -> Result<(), Report> {
    let mut tree = Tree::from_newick(NEWICK)?;
    tree.ladderize(true)?;
    assert_eq!(
        tree.to_newick()?,
        "(((Org_D:0.1,Outgroup_E:0.5):0.2,Org_C:0.4):0.1,(Org_A:0.1,Org_B:0.2):0.3);"
    );
    Ok(())
}

#[test]
fn write_formats() -> Result<(), Report> {
    let tree = Tree::from_newick(NEWICK)?;
    let dir = tempfile::tempdir()?;

    let nwk = dir.path().join("tree.nwk");
    tree.write(&nwk)?;
    assert_eq!(std::fs::read_to_string(&nwk)?, format!("{NEWICK}\n"));
    let reread = Tree::read(&nwk)?;
    assert_eq!(reread.to_newick()?, NEWICK);

    let json = dir.path().join("tree.json");
    tree.write(&json)?;
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json)?)?;
    assert!(value.get("graph").is_some());

    let dot = dir.path().join("tree.dot");
    tree.write(&dot)?;
    assert!(std::fs::read_to_string(&dot)?.contains("rankdir=\"LR\""));

    assert!(tree.write(&dir.path().join("tree.pdf")).is_err());
    Ok(())
}
