use crate::{newick, FromNewick, ToNewick};

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::debug;
use num_traits::AsPrimitive;
use petgraph::algo::has_path_connecting;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A rooted [`Phylogeny`] stored as a directed graph of parents and children.
///
/// ## Introduction
///
/// - The nodes (`N`) can be a wide variety of types (ex. [`str`], [`String`], [`Node`](crate::Node), etc.).
/// - The branches (`B`) must be a type that can be cast into an [`f32`] for the length.
/// - Nodes are addressed by [`NodeIndex`], so labels may repeat (ex. support values on internal nodes).
/// - The branch (`B`) above a node is stored on the edge from its parent.
///
/// ```rust
/// use maptree_phylo::Phylogeny;
/// let mut phylo: Phylogeny<&str, f32> = Phylogeny::new();
/// let root = phylo.add_node("root");
/// let a = phylo.add_node("A");
/// let b = phylo.add_node("B");
/// phylo.add_branch(root, a, 1.0)?;
/// phylo.add_branch(root, b, 2.0)?;
/// assert_eq!(phylo.get_root_index()?, root);
/// assert_eq!(phylo.get_leaves()?, [a, b]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Phylogeny<N, B> {
    /// Directed graph of parents and children.
    ///
    /// `N` are nodes and `B` are branches.
    pub graph: Graph<N, B>,
}

impl<N, B> Default for Phylogeny<N, B>
where
    N: Clone + Debug + Display,
    B: AsPrimitive<f32> + Debug + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, B> Phylogeny<N, B>
where
    N: Clone + Debug + Display,
    B: AsPrimitive<f32> + Debug + Display,
{
    /// Returns a new empty [`Phylogeny`] with nodes (`N`) and branches (`B`).
    pub fn new() -> Self {
        Phylogeny { graph: Graph::new() }
    }

    /// Returns true if the [`Phylogeny`] graph has no data.
    ///
    /// ```rust
    /// use maptree_phylo::Phylogeny;
    /// let mut phylo: Phylogeny<&str, f32> = Phylogeny::new();
    /// assert!(phylo.is_empty());
    /// phylo.add_node("A");
    /// assert!(!phylo.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Adds a new node (`N`) to the [`Phylogeny`] and returns its [`NodeIndex`].
    ///
    /// Nodes are not deduplicated, two nodes may carry the same label.
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        self.graph.add_node(node)
    }

    /// Creates a branch (`B`) from the parent to the child node and returns the [`EdgeIndex`].
    ///
    /// - A child can only have one parent, a second parent returns an Error.
    /// - If the new edge would create a cycle, returns an Error.
    ///
    /// ```rust
    /// use maptree_phylo::Phylogeny;
    /// let mut phylo: Phylogeny<&str, f32> = Phylogeny::new();
    /// let (a, b, c) = (phylo.add_node("A"), phylo.add_node("B"), phylo.add_node("C"));
    /// phylo.add_branch(a, b, 1.0)?;
    /// phylo.add_branch(b, c, 1.0)?;
    /// assert!(phylo.add_branch(c, a, 1.0).is_err());
    /// assert!(phylo.add_branch(a, c, 1.0).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn add_branch(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        branch: B,
    ) -> Result<EdgeIndex, Report> {
        let parent_node = self.get_node(&parent)?;
        let child_node = self.get_node(&child)?;

        if let Some(existing) = self.get_parent(&child) {
            let existing = self.get_node(&existing)?;
            return Err(eyre!("Node {child_node} already has a parent: {existing}"))
                .suggestion(format!("Cannot also connect it to {parent_node}."));
        }
        if has_path_connecting(&self.graph, child, parent, None) {
            return Err(eyre!(
                "New branch between {parent_node} and {child_node} introduced a cycle."
            ));
        }

        Ok(self.graph.add_edge(parent, child, branch))
    }

    /// Returns the node (`N`) that corresponds to the [`NodeIndex`].
    pub fn get_node(&self, node_index: &NodeIndex) -> Result<&N, Report> {
        self.graph
            .node_weight(*node_index)
            .ok_or_else(|| eyre!("Failed to get node data for node index {node_index:?}"))
    }

    /// Returns the branch (`B`) leading to a node, [`None`] for the root.
    pub fn get_branch(&self, node_index: &NodeIndex) -> Option<&B> {
        self.graph
            .edges_directed(*node_index, Direction::Incoming)
            .next()
            .map(|edge| edge.weight())
    }

    /// Returns the length of the branch leading to a node, `0.0` for the root.
    pub fn get_branch_length(&self, node_index: &NodeIndex) -> f32 {
        self.get_branch(node_index).map(|branch| branch.as_()).unwrap_or(0.0)
    }

    /// Returns the parent of a node, [`None`] for the root.
    pub fn get_parent(&self, node_index: &NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(*node_index, Direction::Incoming).next()
    }

    /// Returns the immediate children of a node, in the order they were added.
    pub fn get_children(&self, node_index: &NodeIndex) -> Vec<NodeIndex> {
        let mut children =
            self.graph.neighbors_directed(*node_index, Direction::Outgoing).collect_vec();
        // children order is last added to first added, reverse this
        children.reverse();
        children
    }

    /// Returns true if a node has no children.
    pub fn is_leaf(&self, node_index: &NodeIndex) -> bool {
        self.graph.neighbors_directed(*node_index, Direction::Outgoing).next().is_none()
    }

    /// Returns the node index of the root.
    ///
    /// If zero or multiple roots are found, returns an Error.
    ///
    /// ```rust
    /// use maptree_phylo::Phylogeny;
    /// let mut phylo: Phylogeny<&str, f32> = Phylogeny::new();
    /// let (a, b, c) = (phylo.add_node("A"), phylo.add_node("B"), phylo.add_node("C"));
    /// phylo.add_branch(b, c, 1.0)?;
    /// assert!(phylo.get_root_index().is_err());
    /// phylo.add_branch(a, b, 1.0)?;
    /// assert_eq!(phylo.get_root_index()?, a);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_root_index(&self) -> Result<NodeIndex, Report> {
        if self.is_empty() {
            Err(eyre!("Failed to locate root node index in phylogeny as graph is empty!."))?
        }

        // get all nodes with no parents, could be root
        let root_indices: Vec<_> = self
            .graph
            .node_indices()
            .filter(|i| 0 == self.graph.edges_directed(*i, Direction::Incoming).count())
            .collect();

        match root_indices.len() {
            0 => Err(eyre!("Failed to locate root node index in phylogeny."))?,
            1 => Ok(root_indices[0]),
            _ => Err(eyre!("Failed to locate root node index in phylogeny, multiple roots found: {root_indices:?}"))?
        }
    }

    /// Returns all nodes in preorder (parents before children, children in order).
    pub fn get_nodes(&self) -> Result<Vec<NodeIndex>, Report> {
        let root = self.get_root_index()?;
        Ok(self.get_subtree(&root))
    }

    /// Returns a node and all of its descendants in preorder.
    pub fn get_subtree(&self, node_index: &NodeIndex) -> Vec<NodeIndex> {
        let mut nodes = Vec::new();
        let mut stack = vec![*node_index];
        while let Some(node_index) = stack.pop() {
            nodes.push(node_index);
            // push in reverse so the first child is visited first
            stack.extend(self.get_children(&node_index).into_iter().rev());
        }
        nodes
    }

    /// Returns all leaves in preorder, which is the top-to-bottom drawing order.
    pub fn get_leaves(&self) -> Result<Vec<NodeIndex>, Report> {
        Ok(self.get_nodes()?.into_iter().filter(|i| self.is_leaf(i)).collect())
    }

    /// Returns the leaves below a node, in preorder.
    ///
    /// ```rust
    /// use maptree_phylo::{Branch, FromNewick, Node, Phylogeny};
    /// let phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("((A,B)AB,C);")?;
    /// let ab = phylo.get_nodes()?[1];
    /// let labels: Vec<_> = phylo.get_leaves_of(&ab).iter().map(|i| phylo.get_node(i).unwrap().to_string()).collect();
    /// assert_eq!(labels, ["A", "B"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_leaves_of(&self, node_index: &NodeIndex) -> Vec<NodeIndex> {
        self.get_subtree(node_index).into_iter().filter(|i| self.is_leaf(i)).collect()
    }

    /// Returns the ancestors of a node, starting from its parent and ending at the root.
    pub fn get_ancestors(&self, node_index: &NodeIndex) -> Vec<NodeIndex> {
        let mut ancestors = Vec::new();
        let mut current = *node_index;
        while let Some(parent) = self.get_parent(&current) {
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    /// Returns the sum of branch lengths from the root to a node.
    pub fn get_distance_to_root(&self, node_index: &NodeIndex) -> Result<f32, Report> {
        self.get_node(node_index)?;
        let mut distance = self.get_branch_length(node_index);
        for ancestor in self.get_ancestors(node_index) {
            distance += self.get_branch_length(&ancestor);
        }
        Ok(distance)
    }

    /// Returns the sum of all branch lengths.
    pub fn get_total_length(&self) -> f32 {
        self.graph.edge_weights().map(|branch| branch.as_()).sum()
    }

    /// Identify the most recent common ancestor shared between all nodes.
    ///
    /// ```rust
    /// use maptree_phylo::{Branch, FromNewick, Node, Phylogeny};
    /// let phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("((A,B)AB,C)root;")?;
    /// let a = phylo.get_leaf_index(&Node::from("A"))?;
    /// let b = phylo.get_leaf_index(&Node::from("B"))?;
    /// let c = phylo.get_leaf_index(&Node::from("C"))?;
    /// assert_eq!(phylo.get_node(&phylo.get_common_ancestor(&[a, b])?)?.label, "AB");
    /// assert_eq!(phylo.get_node(&phylo.get_common_ancestor(&[a, c])?)?.label, "root");
    /// assert_eq!(phylo.get_common_ancestor(&[c])?, c);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_common_ancestor(&self, nodes: &[NodeIndex]) -> Result<NodeIndex, Report> {
        let (first, rest) =
            nodes.split_first().ok_or_else(|| eyre!("Failed to get common ancestor of no nodes."))?;

        // path of the first node, from itself up to the root
        let mut lineage = vec![*first];
        lineage.extend(self.get_ancestors(first));

        // the deepest node of the lineage that every other node passes through
        let mut deepest = 0;
        for node in rest {
            self.get_node(node)?;
            let mut path = vec![*node];
            path.extend(self.get_ancestors(node));
            let shared = lineage
                .iter()
                .position(|n| path.contains(n))
                .ok_or_else(|| eyre!("Nodes {first:?} and {node:?} share no common ancestor."))?;
            deepest = deepest.max(shared);
        }

        Ok(lineage[deepest])
    }

    /// Returns the index of the first leaf whose node equals `node`.
    pub fn get_leaf_index(&self, node: &N) -> Result<NodeIndex, Report>
    where
        N: PartialEq,
    {
        self.get_leaves()?
            .into_iter()
            .find(|i| self.graph.node_weight(*i) == Some(node))
            .ok_or_else(|| eyre!("Failed to find leaf {node} in the phylogeny."))
    }

    /// Returns the phylogeny as a [Dot](https://graphviz.org/doc/info/lang.html) graphviz String.
    pub fn to_dot(&self) -> Result<String, Report> {
        let dot = Dot::with_config(&self.graph, &[Config::EdgeNoLabel]).to_string();
        // set horizontal (Left to Right) format for tree-like visualizer
        Ok(dot.replace("digraph {", "digraph {\n    rankdir=\"LR\";"))
    }
}

// ----------------------------------------------------------------------------
// Rerooting and Reordering

impl<N, B> Phylogeny<N, B>
where
    N: Clone + Debug + Default + Display,
    B: AsPrimitive<f32> + Clone + Debug + Display + From<f32>,
{
    /// Reroot the [`Phylogeny`] so that `outgroup` becomes a child of the new root.
    ///
    /// The branch above the outgroup is split in half between the outgroup and the
    /// rest of the tree. The old root is removed if it is left with a single child,
    /// merging its two branches.
    ///
    /// ```rust
    /// use maptree_phylo::{Branch, FromNewick, Node, Phylogeny, ToNewick};
    /// let mut phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("(A:1,(B:1,(C:1,D:1):2):1);")?;
    /// let c = phylo.get_leaf_index(&Node::from("C"))?;
    /// phylo.set_outgroup(c)?;
    /// assert_eq!(phylo.to_newick()?, "(C:0.5,((A:2,B:1):2,D:1):0.5);");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn set_outgroup(&mut self, outgroup: NodeIndex) -> Result<(), Report> {
        let old_root = self.get_root_index()?;
        if outgroup == old_root {
            return Err(eyre!("Cannot use the root of the phylogeny as the outgroup."))
                .suggestion("Choose a clade below the root.");
        }
        let parent = self
            .get_parent(&outgroup)
            .ok_or_else(|| eyre!("Outgroup node {outgroup:?} has no parent."))?;
        let half = self.get_branch_length(&outgroup) / 2.0;

        debug!("Rerooting on node: {}", self.get_node(&outgroup)?);

        let mut rerooted = Phylogeny::new();
        let root = rerooted.add_node(N::default());
        self.copy_unrooted(&mut rerooted, outgroup, parent, root, B::from(half))?;
        self.copy_unrooted(&mut rerooted, parent, outgroup, root, B::from(half))?;

        *self = rerooted;
        Ok(())
    }

    /// Copy the part of the tree reachable from `node` without passing through `from`,
    /// ignoring branch direction, and attach it below `target` with `branch`.
    fn copy_unrooted(
        &self,
        rerooted: &mut Phylogeny<N, B>,
        node: NodeIndex,
        from: NodeIndex,
        target: NodeIndex,
        branch: B,
    ) -> Result<(), Report> {
        // neighbors in the unrooted sense: old parent first, then children
        let mut onward: Vec<(NodeIndex, B)> = Vec::new();
        if let Some(parent) = self.get_parent(&node) {
            if parent != from {
                let branch = self.get_branch(&node).cloned().unwrap_or_else(|| B::from(0.0));
                onward.push((parent, branch));
            }
        }
        for child in self.get_children(&node) {
            if child != from {
                let branch = self.get_branch(&child).cloned().unwrap_or_else(|| B::from(0.0));
                onward.push((child, branch));
            }
        }

        // a node left with one neighbor (ex. the old root) is merged into its branch
        if onward.len() == 1 {
            let (next, next_branch) = onward.remove(0);
            let merged = B::from(branch.as_() + next_branch.as_());
            return self.copy_unrooted(rerooted, next, node, target, merged);
        }

        let copy = rerooted.add_node(self.get_node(&node)?.clone());
        rerooted.add_branch(target, copy, branch)?;
        for (next, next_branch) in onward {
            self.copy_unrooted(rerooted, next, node, copy, next_branch)?;
        }

        Ok(())
    }

    /// Sort the children of every node by the number of leaves below them.
    ///
    /// - `descending = true`: largest clades first (top of the figure).
    /// - `descending = false`: smallest clades first.
    ///
    /// Ties keep their existing order.
    ///
    /// ```rust
    /// use maptree_phylo::{Branch, FromNewick, Node, Phylogeny, ToNewick};
    /// let mut phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("(A:1,(B:1,(C:1,D:1):1):1);")?;
    /// phylo.ladderize(true)?;
    /// assert_eq!(phylo.to_newick()?, "(((C:1,D:1):1,B:1):1,A:1);");
    /// phylo.ladderize(false)?;
    /// assert_eq!(phylo.to_newick()?, "(A:1,(B:1,(C:1,D:1):1):1);");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn ladderize(&mut self, descending: bool) -> Result<(), Report> {
        let root = self.get_root_index()?;
        let sizes: Vec<usize> = self
            .graph
            .node_indices()
            .map(|i| self.get_leaves_of(&i).len())
            .collect();

        let mut ladderized = Phylogeny::new();
        let new_root = ladderized.add_node(self.get_node(&root)?.clone());
        let mut stack = vec![(root, new_root)];

        while let Some((node, copy)) = stack.pop() {
            let mut children = self.get_children(&node);
            // stable sort, ties keep their order
            match descending {
                true => children.sort_by_key(|child| Reverse(sizes[child.index()])),
                false => children.sort_by_key(|child| sizes[child.index()]),
            }
            for child in children {
                let child_copy = ladderized.add_node(self.get_node(&child)?.clone());
                let branch = self.get_branch(&child).cloned().unwrap_or_else(|| B::from(0.0));
                ladderized.add_branch(copy, child_copy, branch)?;
                stack.push((child, child_copy));
            }
        }

        *self = ladderized;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Input/Output

impl<N, B> Phylogeny<N, B>
where
    N: Clone + Debug + Default + Display + FromNewick + Serialize,
    B: AsPrimitive<f32> + Clone + Debug + Display + From<f32> + FromNewick + Serialize,
{
    /// Read a [`Phylogeny`] from a Newick file.
    pub fn read<P>(path: &P) -> Result<Phylogeny<N, B>, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let newick = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read tree file: {path:?}."))?;
        Phylogeny::from_newick(&newick)
            .wrap_err_with(|| format!("Failed to parse tree file: {path:?}."))
    }

    /// Write [`Phylogeny`] to file, the format is chosen from the extension.
    ///
    /// - `.nwk`, `.newick`, `.tree`: Newick
    /// - `.json`: serde JSON of the graph
    /// - `.dot`: graphviz
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let ext = path.as_ref().extension().and_then(|ext| ext.to_str()).unwrap_or_default();

        // format conversion
        let output = match ext {
            "nwk" | "newick" | "tree" => format!("{}\n", self.to_newick()?),
            "json" => serde_json::to_string_pretty(&self)
                .wrap_err_with(|| format!("Failed to serialize phylogeny: {path:?}"))?,
            "dot" => self.to_dot()?,
            _ => {
                return Err(eyre!("Phylogeny write for extension .{ext} is not supported."))
                    .suggestion("Please try .nwk, .json or .dot instead.")
            }
        };

        let mut file =
            File::create(path).wrap_err_with(|| format!("Unable to create file: {path:?}"))?;
        file.write_all(output.as_bytes())
            .wrap_err_with(|| format!("Failed to write file: {path:?}"))?;

        Ok(())
    }
}

impl<N, B> FromNewick for Phylogeny<N, B>
where
    N: Clone + Debug + Default + Display + FromNewick,
    B: AsPrimitive<f32> + Debug + Display + From<f32> + FromNewick,
{
    /// Returns a [`Phylogeny`] created from a [Newick](https://en.wikipedia.org/wiki/Newick_format) string.
    ///
    /// ```rust
    /// use maptree_phylo::{Phylogeny, Node, Branch, FromNewick};
    /// let phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("(A,B);")?;
    /// assert_eq!(phylo.get_leaves()?.len(), 2);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_newick(newick: &str) -> Result<Phylogeny<N, B>, Report> {
        newick::str_to_phylogeny(newick)
    }
}

impl<N, B> ToNewick for Phylogeny<N, B>
where
    N: Clone + Debug + Display,
    B: AsPrimitive<f32> + Debug + Display,
{
    /// Returns a [Newick](https://en.wikipedia.org/wiki/Newick_format) [`str`] created from a [`Phylogeny`].
    ///
    /// ```rust
    /// use maptree_phylo::{Phylogeny, Node, Branch, FromNewick, ToNewick};
    /// let phylo: Phylogeny<Node<String>, Branch> = Phylogeny::from_newick("('Org A':1,(B:0.5,C:2)90:1);")?;
    /// assert_eq!(phylo.to_newick()?, "('Org A':1,(B:0.5,C:2)90:1);");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn to_newick(&self) -> Result<String, Report> {
        let root = self.get_root_index()?;
        Ok(format!("{};", self.clade_to_newick(&root)?))
    }
}

impl<N, B> Phylogeny<N, B>
where
    N: Clone + Debug + Display,
    B: AsPrimitive<f32> + Debug + Display,
{
    fn clade_to_newick(&self, node_index: &NodeIndex) -> Result<String, Report> {
        let children = self.get_children(node_index);
        let mut newick = match children.is_empty() {
            true => String::new(),
            false => {
                let inner = children
                    .iter()
                    .map(|child| self.clade_to_newick(child))
                    .collect::<Result<Vec<_>, Report>>()?
                    .join(",");
                format!("({inner})")
            }
        };
        newick.push_str(&newick::quote_label(&self.get_node(node_index)?.to_string()));
        if let Some(branch) = self.get_branch(node_index) {
            newick.push_str(&format!(":{branch}"));
        }
        Ok(newick)
    }
}
