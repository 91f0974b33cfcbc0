use std::path::Path;
use tracing::info;

use super::{ModuleResolver, PackageGraph, PackageScanner};
use crate::error::Result;
use crate::parsers::go::GoParser;
use crate::parsers::{ImportExtractor, ParseError};

/// Resolves a checkout's module path and builds its package graph.
pub struct ModuleAnalyzer<E = GoParser> {
    module_resolver: ModuleResolver,
    package_scanner: PackageScanner<E>,
}

impl ModuleAnalyzer<GoParser> {
    pub fn new() -> std::result::Result<Self, ParseError> {
        Ok(Self::with_extractor(GoParser::new()?))
    }
}

impl<E: ImportExtractor> ModuleAnalyzer<E> {
    pub fn with_extractor(extractor: E) -> Self {
        Self {
            module_resolver: ModuleResolver::new(),
            package_scanner: PackageScanner::new(extractor),
        }
    }

    pub fn analyze(&self, root_path: &Path) -> Result<PackageGraph> {
        let module = self.module_resolver.resolve(root_path)?;
        info!("Module {} at {}", module, root_path.display());

        let graph = self.package_scanner.scan(&module, root_path)?;
        info!(
            "Found {} packages with {} internal imports",
            graph.package_count(),
            graph.edge_count()
        );

        Ok(graph)
    }
}
