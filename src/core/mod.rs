pub mod analyzer;
pub mod graph;
pub mod resolver;
pub mod scanner;

pub use analyzer::ModuleAnalyzer;
pub use graph::PackageGraph;
pub use resolver::{ModulePath, ModuleResolver, MANIFEST_FILE};
pub use scanner::PackageScanner;
