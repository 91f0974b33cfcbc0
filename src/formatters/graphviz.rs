use std::io::{self, Write};

use crate::core::PackageGraph;

/// Graphviz DOT output, one `"from" -> "to"` line per internal import.
///
/// Packages and their dependencies are emitted in lexicographic order so the
/// same graph always renders to the same bytes.
pub struct GraphvizFormatter {
    graph_name: String,
}

impl GraphvizFormatter {
    pub fn new() -> Self {
        Self {
            graph_name: "G".to_string(),
        }
    }

    pub fn format_graph(&self, graph: &PackageGraph) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(graph, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn write_to<W: Write>(&self, graph: &PackageGraph, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "digraph {} {{", self.graph_name)?;
        for (package, dependency) in graph.sorted_edges() {
            writeln!(writer, "\t{} -> {}", quote(package), quote(dependency))?;
        }
        writeln!(writer, "}}")
    }
}

impl Default for GraphvizFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// DOT string literal for a package path.
fn quote(label: &str) -> String {
    let mut quoted = String::with_capacity(label.len() + 2);
    quoted.push('"');
    for c in label.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_dot_metacharacters() {
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("a/b"), "\"a/b\"");
        assert_eq!(quote("we\"ird\\"), "\"we\\\"ird\\\\\"");
    }
}
