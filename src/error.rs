//! Error types for graph construction.
//!
//! `GraphError` is what the analyzer, resolver and scanner return. Failures
//! from a single package directory are carried as a `ParseError` source of
//! `GraphError::PackageScanFailed`.

use std::path::PathBuf;
use thiserror::Error;

use crate::parsers::ParseError;

#[derive(Debug, Error)]
pub enum GraphError {
    /// `go.mod` could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `go.mod` does not start with `module <import path>`.
    #[error("{} doesn't start with 'module <import path>': {reason}", .path.display())]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("failed to scan package {dir:?}: {source}")]
    PackageScanFailed {
        dir: String,
        #[source]
        source: ParseError,
    },

    /// The same relative package path was recorded twice.
    #[error("duplicate package {package:?} in dir {dir:?}")]
    DuplicatePackage { package: String, dir: String },

    #[error("failed to list directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
