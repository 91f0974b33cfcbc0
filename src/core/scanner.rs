use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::{ModulePath, PackageGraph};
use crate::error::{GraphError, Result};
use crate::parsers::ImportExtractor;

/// Walks a module checkout depth-first and records the in-module imports of
/// every package directory.
pub struct PackageScanner<E> {
    extractor: E,
}

impl<E: ImportExtractor> PackageScanner<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    pub fn scan(&self, module: &ModulePath, root_path: &Path) -> Result<PackageGraph> {
        let mut graph = PackageGraph::new(module.clone());

        // Siblings come back in file-name order; each directory is yielded
        // before its children are listed.
        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || is_package_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|source| {
                let path = source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_path.to_path_buf());
                GraphError::DirectoryUnreadable { path, source }
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }

            let package = relative_package_path(root_path, entry.path());
            let dependencies = self.package_dependencies(module, entry.path(), &package)?;
            debug!(
                package = %package,
                dependencies = dependencies.len(),
                "Scanned package"
            );

            let parent = parent_package(&package).to_string();
            graph.insert(package, dependencies, &parent)?;
        }

        Ok(graph)
    }

    fn package_dependencies(
        &self,
        module: &ModulePath,
        path: &Path,
        package: &str,
    ) -> Result<Vec<String>> {
        let imports = self
            .extractor
            .extract_imports(path)
            .map_err(|source| GraphError::PackageScanFailed {
                dir: package.to_string(),
                source,
            })?
            .into_imports();

        Ok(filter_module_imports(module, &imports))
    }
}

/// In-module imports with the module prefix stripped, in their original
/// order and without de-duplication.
pub fn filter_module_imports(module: &ModulePath, imports: &[String]) -> Vec<String> {
    imports
        .iter()
        .filter_map(|import| module.strip(import))
        .map(str::to_string)
        .collect()
}

/// Directories named `vendor` or `testdata`, hidden directories and names
/// ending in `test` hold no packages of their own.
pub fn is_excluded_dir_name(name: &str) -> bool {
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.ends_with("test")
}

fn is_package_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && !is_excluded_dir_name(&entry.file_name().to_string_lossy())
}

fn relative_package_path(root_path: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root_path).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_package(package: &str) -> &str {
    package
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}
