use godeps::core::{ModulePath, PackageGraph};
use godeps::GraphError;

fn graph() -> PackageGraph {
    PackageGraph::new(ModulePath::new("example.com/project"))
}

#[test]
fn graph_insert_records_packages() {
    let mut graph = graph();
    graph.insert(String::new(), vec!["a".to_string()], "").unwrap();
    graph.insert("a".to_string(), Vec::new(), "").unwrap();

    assert_eq!(graph.package_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.contains(""));
    assert_eq!(graph.module().as_str(), "example.com/project");
}

#[test]
fn graph_insert_refuses_to_overwrite() {
    let mut graph = graph();
    graph
        .insert("a/b".to_string(), vec!["c".to_string()], "a")
        .unwrap();

    let err = graph
        .insert("a/b".to_string(), Vec::new(), "a")
        .unwrap_err();
    match err {
        GraphError::DuplicatePackage { package, dir } => {
            assert_eq!(package, "a/b");
            assert_eq!(dir, "a");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The first recording survives.
    assert_eq!(graph.dependencies("a/b").unwrap(), ["c"]);
}
