use godeps::core::{ModulePath, PackageScanner};
use godeps::parsers::{ImportExtractor, PackageImports, ParseError};
use godeps::GraphError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const MODULE: &str = "example.com/project";

/// Serves canned imports keyed by package path relative to `root`.
struct FakeExtractor {
    root: PathBuf,
    packages: HashMap<String, Vec<String>>,
    failing: Option<String>,
    visited: RefCell<Vec<String>>,
}

impl FakeExtractor {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            packages: HashMap::new(),
            failing: None,
            visited: RefCell::new(Vec::new()),
        }
    }

    fn package(mut self, dir: &str, imports: &[&str]) -> Self {
        self.packages.insert(
            dir.to_string(),
            imports.iter().map(|i| i.to_string()).collect(),
        );
        self
    }

    fn failing_at(mut self, dir: &str) -> Self {
        self.failing = Some(dir.to_string());
        self
    }

    fn relative(&self, dir: &Path) -> String {
        dir.strip_prefix(&self.root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl ImportExtractor for FakeExtractor {
    fn extract_imports(&self, dir: &Path) -> Result<PackageImports, ParseError> {
        let relative = self.relative(dir);
        self.visited.borrow_mut().push(relative.clone());

        if self.failing.as_deref() == Some(relative.as_str()) {
            return Err(ParseError::Syntax {
                file: dir.join("bad.go"),
                message: "expected 'package' clause".to_string(),
            });
        }

        Ok(match self.packages.get(&relative) {
            Some(imports) => PackageImports::Imports(imports.clone()),
            None => PackageImports::NotAPackage,
        })
    }
}

fn mkdirs(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
}

#[test]
fn scanner_keeps_only_in_module_imports_with_prefix_stripped() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    mkdirs(root, &["a", "b"]);

    let extractor = FakeExtractor::new(root)
        .package(
            "",
            &[
                "fmt",
                "example.com/project/b",
                "example.com/project",
                "example.com/projectx/a",
                "example.com/project/a",
                "example.com/project/b",
            ],
        )
        .package("a", &["os", "github.com/other/lib"]);

    let module = ModulePath::new(MODULE);
    let graph = PackageScanner::new(&extractor).scan(&module, root).unwrap();

    // Order of extraction is kept and repeats are not collapsed.
    assert_eq!(graph.dependencies("").unwrap(), ["b", "a", "b"]);
    assert!(graph.dependencies("a").unwrap().is_empty());
    assert!(graph.dependencies("b").unwrap().is_empty());

    for (package, deps) in graph.packages() {
        for dep in deps {
            let original = format!("{}/{}", MODULE, dep);
            assert!(
                extractor.packages[package].contains(&original),
                "{package} -> {dep} has no matching import"
            );
        }
    }
}

#[test]
fn scanner_records_every_eligible_directory_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    mkdirs(
        root,
        &[
            "cmd/tool",
            "internal/store",
            "vendor/github.com/x",
            "testdata/fixtures",
            ".git/objects",
            "integrationtest/sub",
            "tests",
        ],
    );
    fs::write(root.join("README.md"), "docs").unwrap();

    let extractor = FakeExtractor::new(root);
    let graph = PackageScanner::new(&extractor)
        .scan(&ModulePath::new(MODULE), root)
        .unwrap();

    let packages: Vec<&str> = graph.packages().map(|(package, _)| package).collect();
    assert_eq!(
        packages,
        vec!["", "cmd", "cmd/tool", "internal", "internal/store", "tests"]
    );
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn scanner_extracts_a_directory_before_its_children() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    mkdirs(root, &["b", "a/y", "a/x"]);

    let extractor = FakeExtractor::new(root);
    PackageScanner::new(&extractor)
        .scan(&ModulePath::new(MODULE), root)
        .unwrap();

    assert_eq!(
        *extractor.visited.borrow(),
        vec!["", "a", "a/x", "a/y", "b"]
    );
}

#[test]
fn scanner_empty_root_with_one_subpackage() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    mkdirs(root, &["a"]);

    let extractor = FakeExtractor::new(root).package("a", &[]);
    let graph = PackageScanner::new(&extractor)
        .scan(&ModulePath::new(MODULE), root)
        .unwrap();

    assert_eq!(graph.package_count(), 2);
    assert_eq!(graph.dependencies(""), Some(&[][..]));
    assert_eq!(graph.dependencies("a"), Some(&[][..]));
}

#[test]
fn scanner_aborts_on_package_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    mkdirs(root, &["a/broken", "z"]);

    let extractor = FakeExtractor::new(root).failing_at("a/broken");
    let err = PackageScanner::new(&extractor)
        .scan(&ModulePath::new(MODULE), root)
        .unwrap_err();

    match err {
        GraphError::PackageScanFailed { dir, .. } => assert_eq!(dir, "a/broken"),
        other => panic!("unexpected error: {other}"),
    }
    // Nothing after the failing package is visited.
    assert!(!extractor.visited.borrow().contains(&"z".to_string()));
}

#[cfg(target_os = "linux")]
#[test]
fn scanner_rejects_colliding_package_paths() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    // Both names render to "a\u{FFFD}" once converted to UTF-8.
    fs::create_dir(root.join(OsStr::from_bytes(b"a\xfe"))).unwrap();
    fs::create_dir(root.join(OsStr::from_bytes(b"a\xff"))).unwrap();

    let extractor = FakeExtractor::new(root);
    let err = PackageScanner::new(&extractor)
        .scan(&ModulePath::new(MODULE), root)
        .unwrap_err();

    match err {
        GraphError::DuplicatePackage { package, dir } => {
            assert_eq!(package, "a\u{FFFD}");
            assert_eq!(dir, "");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn scanner_reports_unreadable_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    let locked = root.join("locked");
    mkdirs(root, &["locked/inner"]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to a privileged user.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let extractor = FakeExtractor::new(root);
    let result = PackageScanner::new(&extractor).scan(&ModulePath::new(MODULE), root);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    match result {
        Err(GraphError::DirectoryUnreadable { path, .. }) => assert_eq!(path, locked),
        other => panic!("unexpected result: {other:?}"),
    }
}
