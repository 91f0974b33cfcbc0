pub mod build_context;
pub mod common;
pub mod go;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Outcome of inspecting one directory for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageImports {
    /// No buildable source files in the directory.
    NotAPackage,
    /// Declared import paths, in the order the extractor reports them.
    Imports(Vec<String>),
}

impl PackageImports {
    pub fn into_imports(self) -> Vec<String> {
        match self {
            PackageImports::NotAPackage => Vec::new(),
            PackageImports::Imports(imports) => imports,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load grammar: {0}")]
    Language(String),

    #[error("{}: {message}", .file.display())]
    Syntax { file: PathBuf, message: String },

    #[error("found packages {first} ({}) and {second} ({}) in {}", .first_file.display(), .second_file.display(), .dir.display())]
    MultiplePackages {
        dir: PathBuf,
        first: String,
        first_file: PathBuf,
        second: String,
        second_file: PathBuf,
    },
}

/// Per-directory import extraction.
///
/// Implementations report either that `dir` holds no package, or the import
/// paths the package declares. Anything else is an error.
pub trait ImportExtractor {
    fn extract_imports(&self, dir: &Path) -> Result<PackageImports, ParseError>;
}

impl<T: ImportExtractor + ?Sized> ImportExtractor for &T {
    fn extract_imports(&self, dir: &Path) -> Result<PackageImports, ParseError> {
        (**self).extract_imports(dir)
    }
}
