//! # godeps
//!
//! Internal package dependency graph for Go module checkouts.
//!
//! `godeps` reads the module path from `go.mod`, walks every package
//! directory below the checkout root, keeps the imports that point back into
//! the module and renders the result as a Graphviz digraph (or JSON).
//!
//! ```rust,no_run
//! use godeps::core::ModuleAnalyzer;
//! use godeps::formatters::GraphvizFormatter;
//! use std::path::Path;
//!
//! let analyzer = ModuleAnalyzer::new()?;
//! let graph = analyzer.analyze(Path::new("."))?;
//! print!("{}", GraphvizFormatter::new().format_graph(&graph));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod error;
pub mod formatters;
pub mod logger;
pub mod parsers;

pub use error::GraphError;
