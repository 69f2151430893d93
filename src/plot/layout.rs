//! Place the tree, leaf labels, family headers and matrix cells of a figure.
//!
//! ```text
//!               F F F      <- family headers, reading upwards
//!               a a a
//!               m m m
//!   ┌──── Org_A ● ● ○      <- one row of cells per leaf
//! ──┤
//!   └── Org_B   ○ ● ●
//!
//!   |──|  0.1              <- scale bar
//! ```

use crate::plot::font;
use crate::plot::scene::{Scene, Text};
use crate::plot::{Style, Tree};
use color_eyre::eyre::{Report, Result};
use log::debug;
use std::collections::BTreeMap;

/// Gap between the end of a branch and its leaf label.
const LABEL_GAP: f32 = 4.0;
/// Gap between the longest leaf label and the first matrix column.
const MATRIX_GAP: f32 = 10.0;
/// Gap between family headers and the first matrix row.
const HEADER_GAP: f32 = 10.0;
/// Gap above the scale bar, and between the bar and its label.
const SCALE_GAP: f32 = 10.0;
/// Half height of the scale bar end ticks.
const TICK: f32 = 4.0;

/// Lay out a rectangular phylogram with a presence matrix aligned to the right of the leaves.
///
/// - Leaves are drawn top to bottom in preorder.
/// - `rows` maps leaf labels to their cells in `families` order, leaves without a row are all absent.
/// - A tree without branch lengths is drawn as a cladogram with unit branches.
pub fn layout(
    tree: &Tree,
    rows: &BTreeMap<String, Vec<bool>>,
    families: &[String],
    style: &Style,
) -> Result<Scene, Report> {
    let nodes = tree.get_nodes()?;
    let leaves = tree.get_leaves()?;
    let has_lengths = tree.get_total_length() > 0.0;

    // distance from the root, along branches
    let mut dist = vec![0.0_f32; tree.graph.node_count()];
    for node in &nodes {
        for child in tree.get_children(node) {
            let length = match has_lengths {
                true => tree.get_branch_length(&child).max(0.0),
                false => 1.0,
            };
            dist[child.index()] = dist[node.index()] + length;
        }
    }
    let max_dist = leaves.iter().map(|leaf| dist[leaf.index()]).fold(0.0, f32::max);
    let x_scale = match max_dist > 0.0 {
        true => style.tree_width / max_dist,
        false => 0.0,
    };

    let leaf_scale = style.leaf_font_scale;
    let header_scale = style.header_font_scale;
    let leaf_text_height = (font::HEIGHT * leaf_scale) as f32;
    let cell = style.cell_size();
    let row_height = cell.max(leaf_text_height + 2.0);

    let header_height = families
        .iter()
        .map(|family| font::text_width(family, header_scale) as f32 + HEADER_GAP)
        .fold(0.0, f32::max);
    let top = style.margin + header_height;

    // node positions
    let mut x = vec![0.0_f32; tree.graph.node_count()];
    let mut y = vec![0.0_f32; tree.graph.node_count()];
    for node in &nodes {
        x[node.index()] = style.margin + dist[node.index()] * x_scale;
    }
    for (row, leaf) in leaves.iter().enumerate() {
        y[leaf.index()] = top + row as f32 * row_height + row_height / 2.0;
    }
    // parents sit between their first and last child, children are placed first
    for node in nodes.iter().rev() {
        let children = tree.get_children(node);
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            y[node.index()] = (y[first.index()] + y[last.index()]) / 2.0;
        }
    }

    let mut scene = Scene::new(style.background);

    // branches
    for node in &nodes {
        let (nx, ny) = (x[node.index()], y[node.index()]);
        if let Some(parent) = tree.get_parent(node) {
            scene.line((x[parent.index()], ny), (nx, ny), style.line_width, style.line_color);
        }
        let children = tree.get_children(node);
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            if first != last {
                scene.line((nx, y[first.index()]), (nx, y[last.index()]), style.line_width, style.line_color);
            }
        }
    }

    // leaf labels, the matrix starts after the longest one
    let mut label_right: f32 = style.margin + max_dist * x_scale;
    for leaf in &leaves {
        let label = tree.get_node(leaf)?.to_string();
        let left = x[leaf.index()] + LABEL_GAP + style.line_width;
        label_right = label_right.max(left + font::text_width(&label, leaf_scale) as f32);
        if label.is_empty() {
            continue;
        }
        scene.text(Text {
            position: (left, y[leaf.index()] - leaf_text_height / 2.0),
            text: label,
            scale: leaf_scale,
            color: style.text_color,
            italic: true,
            vertical: false,
        });
    }
    let matrix_left = label_right + MATRIX_GAP;
    let column_x = |column: usize| matrix_left + column as f32 * cell + cell / 2.0;

    // family headers
    for (column, family) in families.iter().enumerate() {
        let glyph_width = (font::HEIGHT * header_scale) as f32;
        scene.text(Text {
            position: (column_x(column) - glyph_width / 2.0, top - HEADER_GAP),
            text: family.clone(),
            scale: header_scale,
            color: style.text_color,
            italic: false,
            vertical: true,
        });
    }

    // matrix cells
    let absent = vec![false; families.len()];
    for leaf in &leaves {
        let label = tree.get_node(leaf)?.to_string();
        let cells = rows.get(&label).unwrap_or(&absent);
        for (column, present) in cells.iter().enumerate() {
            let fill = match present {
                true => style.present_color,
                false => style.absent_color,
            };
            scene.circle((column_x(column), y[leaf.index()]), style.cell_radius, fill);
        }
    }

    // scale bar
    let mut bottom = top + leaves.len() as f32 * row_height;
    if let (true, Some(length)) = (has_lengths && x_scale > 0.0, style.scale_length) {
        let bar_y = bottom + SCALE_GAP;
        let (start, end) = (style.margin, style.margin + length * x_scale);
        scene.line((start, bar_y), (end, bar_y), style.line_width, style.line_color);
        for tick_x in [start, end] {
            scene.line((tick_x, bar_y - TICK), (tick_x, bar_y + TICK), style.line_width, style.line_color);
        }
        scene.text(Text {
            position: (start, bar_y + SCALE_GAP),
            text: length.to_string(),
            scale: leaf_scale,
            color: style.text_color,
            italic: false,
            vertical: false,
        });
        bottom = bar_y + SCALE_GAP + leaf_text_height;
    }

    scene.width = (matrix_left + families.len() as f32 * cell).max(label_right) + style.margin;
    scene.height = bottom + style.margin;

    debug!(
        "Layout of {} leaves and {} families: {}x{} pixels.",
        leaves.len(),
        families.len(),
        scene.width,
        scene.height
    );
    Ok(scene)
}
