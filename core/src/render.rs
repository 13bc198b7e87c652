//! Plain-text usage tables.

use crate::registry::Registry;

const INDENT: &str = "    ";
const PADDING: usize = 3;

struct Row {
    cells: [String; 4],
}

/// Renders `registry` as an aligned usage table.
///
/// Flags appear in definition order under a `[Short] [Key] [Kind] [Help]`
/// header. A sub flag's group follows it, indented one level. Exclusive
/// flags have their kind marked with `*`.
///
/// # Examples
///
/// ```
/// use flagtree_core::{Flag, Registry, render};
///
/// let mut registry = Registry::new();
/// registry.define(Flag::switch("verbose").with_short('v').with_help("verbose output")).unwrap();
///
/// let table = render::usage(&registry);
/// assert!(table.starts_with("[Short]"));
/// assert!(table.contains("--verbose"));
/// ```
pub fn usage(registry: &Registry) -> String {
    let mut rows = Vec::new();
    collect_rows(registry, 0, &mut rows);

    let mut widths = [0usize; 4];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (cell, width) in row.cells.iter().zip(widths) {
            line.push_str(&format!("{:<width$}", cell, width = width + PADDING));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn collect_rows(registry: &Registry, depth: usize, rows: &mut Vec<Row>) {
    let indent = INDENT.repeat(depth);
    rows.push(Row {
        cells: [
            format!("{indent}[Short]"),
            "[Key]".to_string(),
            "[Kind]".to_string(),
            "[Help]".to_string(),
        ],
    });

    for flag in registry.flags() {
        let short = flag
            .short()
            .map(|short| format!("{indent}-{short}"))
            .unwrap_or_else(|| indent.clone());
        let key = if flag.param_help().is_empty() {
            format!("--{}", flag.key())
        } else {
            format!("--{} <{}>", flag.key(), flag.param_help())
        };
        let kind = if flag.is_exclusive() {
            format!("{}*", flag.kind())
        } else {
            flag.kind().to_string()
        };
        rows.push(Row {
            cells: [short, key, kind, flag.help().to_string()],
        });

        if let Some(group) = flag.group() {
            collect_rows(group, depth + 1, rows);
        }
    }
}
