//! Output formatting for parse results.

use flagtree_core::{ResultNode, ResultTree};

/// Supported output formats.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats a result tree in the requested output format.
pub fn format_tree(tree: &ResultTree, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut raw| {
                raw.push('\n');
                raw
            })
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(tree).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(tree_to_table(tree)),
    }
}

fn tree_to_table(tree: &ResultTree) -> String {
    let mut out = String::new();
    write_table(tree, 0, &mut out);
    out
}

fn write_table(tree: &ResultTree, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, node) in tree {
        match node {
            ResultNode::Unset => out.push_str(&format!("{indent}{key}\n")),
            ResultNode::Value(value) => out.push_str(&format!("{indent}{key} = {value}\n")),
            ResultNode::Group(group) => {
                out.push_str(&format!("{indent}{key}:\n"));
                write_table(group, depth + 1, out);
            }
        }
    }
}
