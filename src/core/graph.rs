use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::ModulePath;
use crate::error::{GraphError, Result};

/// Package import graph of one module.
///
/// Keys are package directories relative to the checkout root, joined with
/// `/`; the root package is the empty string. Each value lists the in-module
/// packages that package imports, in discovery order.
#[derive(Debug, Clone)]
pub struct PackageGraph {
    module: ModulePath,
    packages: BTreeMap<String, Vec<String>>,
}

impl PackageGraph {
    pub fn new(module: ModulePath) -> Self {
        Self {
            module,
            packages: BTreeMap::new(),
        }
    }

    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// Records a package. A package that is already present is never
    /// overwritten; `dir` names the directory being processed when the
    /// collision was found.
    pub fn insert(&mut self, package: String, dependencies: Vec<String>, dir: &str) -> Result<()> {
        match self.packages.entry(package) {
            Entry::Occupied(entry) => Err(GraphError::DuplicatePackage {
                package: entry.key().clone(),
                dir: dir.to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(dependencies);
                Ok(())
            }
        }
    }

    pub fn dependencies(&self, package: &str) -> Option<&[String]> {
        self.packages.get(package).map(Vec::as_slice)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Packages in lexicographic order.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.packages
            .iter()
            .map(|(package, deps)| (package.as_str(), deps.as_slice()))
    }

    /// Every (package, dependency) pair, packages and dependencies both in
    /// lexicographic order. Repeated dependencies are kept.
    pub fn sorted_edges(&self) -> Vec<(&str, &str)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (package, deps) in &self.packages {
            let mut sorted: Vec<&str> = deps.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            edges.extend(sorted.into_iter().map(|dep| (package.as_str(), dep)));
        }
        edges
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn edge_count(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }
}
