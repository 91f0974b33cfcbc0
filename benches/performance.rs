use criterion::{black_box, criterion_group, criterion_main, Criterion};
use godeps::core::ModuleAnalyzer;
use godeps::formatters::GraphvizFormatter;
use std::path::Path;

/// Lays out `width` top-level packages, each with `depth` nested packages
/// importing their parent and a few standard library packages.
fn create_module(root: &Path, width: usize, depth: usize) {
    std::fs::create_dir_all(root).unwrap();
    std::fs::write(root.join("go.mod"), "module example.com/bench\n\ngo 1.22\n").unwrap();

    for i in 0..width {
        let mut parent = String::new();
        let mut rel = format!("pkg{}", i);
        for level in 0..depth {
            let dir = root.join(&rel);
            std::fs::create_dir_all(&dir).unwrap();

            let mut imports = vec!["\"fmt\"".to_string(), "\"strings\"".to_string()];
            if !parent.is_empty() {
                imports.push(format!("\"example.com/bench/{}\"", parent));
            }
            let content = format!(
                "package level{}\n\nimport (\n\t{}\n)\n\nfunc F() string {{ return strings.TrimSpace(fmt.Sprint({})) }}\n",
                level,
                imports.join("\n\t"),
                level
            );
            std::fs::write(dir.join("lib.go"), content).unwrap();

            parent = rel.clone();
            rel = format!("{}/sub{}", rel, level);
        }
    }
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("module_analysis");

    let small = tempfile::TempDir::new().unwrap();
    create_module(small.path(), 10, 3);

    group.bench_function("small_module", |b| {
        b.iter(|| {
            let analyzer = ModuleAnalyzer::new().unwrap();
            black_box(analyzer.analyze(black_box(small.path())))
        });
    });

    let large = tempfile::TempDir::new().unwrap();
    create_module(large.path(), 50, 8);

    group.bench_function("large_module", |b| {
        b.iter(|| {
            let analyzer = ModuleAnalyzer::new().unwrap();
            black_box(analyzer.analyze(black_box(large.path())))
        });
    });

    group.finish();
}

fn benchmark_rendering(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    create_module(dir.path(), 50, 8);
    let graph = ModuleAnalyzer::new()
        .unwrap()
        .analyze(dir.path())
        .unwrap();

    c.bench_function("graphviz_render", |b| {
        let formatter = GraphvizFormatter::new();
        b.iter(|| black_box(formatter.format_graph(black_box(&graph))));
    });
}

criterion_group!(benches, benchmark_analysis, benchmark_rendering);
criterion_main!(benches);
