use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::core::PackageGraph;

/// Single-line JSON rendering of a package graph for programmatic use.
pub struct JsonCompactFormatter;

#[derive(Debug, Serialize)]
struct JsonGraph<'a> {
    module: &'a str,
    meta: JsonMeta,
    packages: BTreeMap<&'a str, Vec<&'a str>>,
}

#[derive(Debug, Serialize)]
struct JsonMeta {
    packages: usize,
    edges: usize,
}

impl JsonCompactFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_graph(&self, graph: &PackageGraph) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json(graph))?)
    }

    pub fn write_to<W: Write>(&self, graph: &PackageGraph, writer: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *writer, &self.to_json(graph))?;
        writeln!(writer)?;
        Ok(())
    }

    fn to_json<'a>(&self, graph: &'a PackageGraph) -> JsonGraph<'a> {
        let packages = graph
            .packages()
            .map(|(package, deps)| {
                let mut deps: Vec<&str> = deps.iter().map(String::as_str).collect();
                deps.sort_unstable();
                (package, deps)
            })
            .collect();

        JsonGraph {
            module: graph.module().as_str(),
            meta: JsonMeta {
                packages: graph.package_count(),
                edges: graph.edge_count(),
            },
            packages,
        }
    }
}

impl Default for JsonCompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}
