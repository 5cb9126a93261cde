//! Terminal rendering of a statistics tree.

use std::fmt::Write;

use clap::ValueEnum;
use console::style;
use repostats::StatsTree;

/// Output format for statistics.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented tree (default)
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
}

const EXPANDED: &str = "▾";
const COLLAPSED: &str = "▸";
const INDENT: &str = "  ";

/// Render `tree` in the requested format.
pub(crate) fn render(
    title: &str,
    tree: &StatsTree,
    format: OutputFormat,
    depth: Option<usize>,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Tree => Ok(render_tree(title, tree, depth)),
        OutputFormat::Json => serde_json::to_string_pretty(tree),
    }
}

/// Render the children of `tree` under a `title` line.
///
/// Branches deeper than `depth` levels are shown collapsed with their total
/// only. `None` expands everything.
pub(crate) fn render_tree(title: &str, tree: &StatsTree, depth: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(title).bold());
    if let Some(values) = tree.values() {
        for (name, child) in values {
            render_node(&mut out, name, child, 0, depth);
        }
    }
    out
}

fn render_node(out: &mut String, name: &str, node: &StatsTree, level: usize, depth: Option<usize>) {
    let indent = INDENT.repeat(level);
    match node {
        StatsTree::Leaf(value) => {
            let _ = writeln!(out, "{indent}  {name} ({})", style(value).cyan());
        }
        StatsTree::Branch { total, values } => {
            let expanded = depth.is_none_or(|d| level < d);
            let marker = if expanded { EXPANDED } else { COLLAPSED };
            let _ = writeln!(
                out,
                "{indent}{} {} ({})",
                style(marker).dim(),
                style(name).bold(),
                style(total).cyan()
            );
            if expanded {
                for (child_name, child) in values {
                    render_node(out, child_name, child, level + 1, depth);
                }
            }
        }
    }
}
