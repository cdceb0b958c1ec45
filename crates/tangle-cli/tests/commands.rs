//! Command-level tests driving the library entry points on temp projects.

use std::fs;
use std::path::Path;
use tangle_cli::commands::{analyze, dataset, pipeline, trace};
use tangle_cli::commands::{AnalyzeArgs, DatasetArgs, PipelineArgs, TraceArgs};
use tangle_cli::ProjectContext;
use tangle_core::{read_artifact, Dataset, Graph, LatencySummary};
use tempfile::TempDir;

fn game_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let files = [
        ("tsconfig.json", r#"{ "include": ["src"] }"#),
        ("src/main.ts", "import { World } from './world';\nnew World();"),
        ("src/world.ts", "import { Entity } from './entity';\nexport class World {}"),
        ("src/entity.ts", "import type { World } from './world';\nexport class Entity {}"),
    ];
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn write_trace(dir: &Path, root: &Path) {
    fs::create_dir_all(dir).unwrap();
    let world = root.join("src/world.ts");
    let log = format!(
        r#"[{{"name":"checkSourceFile","ph":"X","dur":12000,"args":{{"path":"{}"}}}}]"#,
        world.display()
    );
    fs::write(dir.join("trace.json"), log).unwrap();
}

#[test]
fn analyze_writes_graph_artifact() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();

    let path = analyze::run(&ctx, &AnalyzeArgs::default(), None, false).unwrap();
    let graph: Graph = read_artifact(&path).unwrap();

    assert_eq!(path, ctx.graph_path());
    assert_eq!(graph.stats.node_count, 3);
    assert_eq!(graph.stats.cyclic_scc_count, 1);
    assert_eq!(graph.stats.roots, vec!["src/main.ts"]);
    assert_eq!(graph.node("src/entity.ts").unwrap().depth, 1);
}

#[test]
fn analyze_fails_without_configuration() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "").unwrap();
    let ctx = ProjectContext::load(dir.path(), None, None).unwrap();
    let args = AnalyzeArgs {
        project: Some(dir.path().join("missing/tsconfig.json")),
        ..Default::default()
    };

    let err = analyze::run(&ctx, &args, None, false).unwrap_err();
    let root_cause = err.downcast_ref::<tangle_core::Error>().unwrap();
    assert!(root_cause.is_configuration_failure());
    assert!(!ctx.graph_path().exists());
}

#[test]
fn build_dataset_without_latency_is_graph_only() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();
    analyze::run(&ctx, &AnalyzeArgs::default(), None, false).unwrap();

    let path = dataset::run(&ctx, &DatasetArgs::default(), None).unwrap();
    let dataset: Dataset = read_artifact(&path).unwrap();

    assert!(dataset.latency_summary.is_none());
    assert_eq!(dataset.graph.stats.total_latency_ms, None);
    assert_eq!(dataset.graph.stats.node_count, 3);
}

#[test]
fn build_dataset_requires_graph() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();

    assert!(dataset::run(&ctx, &DatasetArgs::default(), None).is_err());
}

#[test]
fn trace_skip_run_correlates_existing_directory() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();
    write_trace(&ctx.trace_dir(), &ctx.root);
    let args = TraceArgs {
        skip_run: true,
        ..Default::default()
    };

    let path = trace::run(&ctx, &args, None).unwrap();
    let summary: LatencySummary = read_artifact(&path).unwrap();

    let world = ctx.root.join("src/world.ts");
    assert_eq!(summary.per_file_ms[&world.display().to_string()], 12.0);
}

#[test]
fn trace_without_log_is_fatal() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();
    let args = TraceArgs {
        skip_run: true,
        ..Default::default()
    };

    let err = trace::run(&ctx, &args, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<tangle_core::Error>(),
        Some(tangle_core::Error::TraceFileMissing { .. })
    ));
}

#[test]
fn run_merges_latency_onto_graph() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();
    write_trace(&ctx.trace_dir(), &ctx.root);
    let args = PipelineArgs {
        trace: TraceArgs {
            skip_run: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let path = pipeline::run(&ctx, &args, None).unwrap();
    let dataset: Dataset = read_artifact(&path).unwrap();

    assert_eq!(dataset.graph.node("src/world.ts").unwrap().latency_ms, Some(12.0));
    assert_eq!(dataset.graph.node("src/main.ts").unwrap().latency_ms, None);
    assert_eq!(dataset.graph.stats.total_latency_ms, Some(12.0));
    assert!(ctx.graph_path().is_file());
    assert!(ctx.latency_path().is_file());
}

#[test]
fn run_survives_trace_failure() {
    let project = game_project();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();
    let args = PipelineArgs {
        trace: TraceArgs {
            skip_run: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let path = pipeline::run(&ctx, &args, None).unwrap();
    let dataset: Dataset = read_artifact(&path).unwrap();

    assert!(dataset.latency_summary.is_none());
    assert!(!ctx.latency_path().exists());
}

#[cfg(unix)]
#[test]
fn trace_producer_failure_respects_keep_going() {
    let project = game_project();
    fs::write(
        project.path().join(".tangle.toml"),
        "[trace]\ncommand = \"sh\"\nargs = [\"-c\", \"echo '[]' > \\\"$1/trace.json\\\"; exit 1\", \"sh\"]\n",
    )
    .unwrap();
    let ctx = ProjectContext::load(project.path(), None, None).unwrap();

    let strict = trace::run(&ctx, &TraceArgs::default(), None);
    assert!(strict.is_err());

    let lenient = TraceArgs {
        keep_going: true,
        ..Default::default()
    };
    let path = trace::run(&ctx, &lenient, None).unwrap();
    let summary: LatencySummary = read_artifact(&path).unwrap();
    assert!(summary.per_file_ms.is_empty());
    assert_eq!(summary.notes.len(), 1);
}
