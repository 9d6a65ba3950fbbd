//! ASCII rendering for browse views.

use crate::models::{BrowseView, Layout, ResourceKind, ResourceNode, ResourceTreeNode};

const CATEGORY: char = '▸';
const GUIDESHEET: char = '≡';
const VIDEO: char = '▶';
const LINK: char = '↗';
const SIMULATION: char = '◈';

/// Cells per row when a category uses the grid layout.
const GRID_COLUMNS: usize = 3;

fn kind_symbol(kind: ResourceKind) -> char {
    match kind {
        ResourceKind::Category => CATEGORY,
        ResourceKind::Guidesheet => GUIDESHEET,
        ResourceKind::Video => VIDEO,
        ResourceKind::Link => LINK,
        ResourceKind::Simulation => SIMULATION,
    }
}

pub fn render_view(view: &BrowseView) -> String {
    match view {
        BrowseView::Tree { roots } => render_tree(roots),
        BrowseView::Search { results, .. } => render_results(results),
    }
}

/// Render the hierarchy with one line per resource.
///
/// Grid categories pack their leaf children into rows:
/// ```text
/// PhET Simulations
/// └── ▸ Mechanics
///     ├── ◈ Projectile Motion   ◈ Energy Skate Park   ◈ Pendulum Lab
///     └── ◈ Masses and Springs
/// ```
pub fn render_tree(nodes: &[ResourceTreeNode]) -> String {
    let mut output = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        render_node(&mut output, node, "", is_last, true);
    }
    output
}

/// Flat list of search hits, one per line with its url.
pub fn render_results(results: &[ResourceNode]) -> String {
    let mut output = String::new();
    for resource in results {
        output.push(kind_symbol(resource.kind));
        output.push(' ');
        output.push_str(&resource.name);
        if let Some(url) = &resource.url {
            output.push_str("  <");
            output.push_str(url);
            output.push('>');
        }
        output.push('\n');
    }
    output
}

fn render_node(
    output: &mut String,
    node: &ResourceTreeNode,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    if is_root {
        output.push_str(&node.resource.name);
        output.push('\n');
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&cell(&node.resource));
        output.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    match node.layout {
        Some(Layout::Grid) => render_grid(output, &node.children, &child_prefix),
        _ => {
            for (i, child) in node.children.iter().enumerate() {
                let child_is_last = i == node.children.len() - 1;
                render_node(output, child, &child_prefix, child_is_last, false);
            }
        }
    }
}

/// Leaves in rows of [`GRID_COLUMNS`], then any nested categories as usual.
fn render_grid(output: &mut String, children: &[ResourceTreeNode], prefix: &str) {
    let (leaves, categories): (Vec<&ResourceTreeNode>, Vec<&ResourceTreeNode>) = children
        .iter()
        .partition(|c| c.resource.kind.is_leaf());

    let rows: Vec<&[&ResourceTreeNode]> = leaves.chunks(GRID_COLUMNS).collect();
    for (i, row) in rows.iter().enumerate() {
        let is_last = i == rows.len() - 1 && categories.is_empty();
        output.push_str(prefix);
        output.push_str(if is_last { "└── " } else { "├── " });
        let cells: Vec<String> = row.iter().map(|c| cell(&c.resource)).collect();
        output.push_str(&cells.join("   "));
        output.push('\n');
    }

    for (i, category) in categories.iter().enumerate() {
        let is_last = i == categories.len() - 1;
        render_node(output, category, prefix, is_last, false);
    }
}

fn cell(resource: &ResourceNode) -> String {
    format!("{} {}", kind_symbol(resource.kind), resource.name)
}
