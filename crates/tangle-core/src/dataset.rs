//! Merge step and artifact I/O.

use crate::error::{Error, Result};
use crate::paths::display_path;
use crate::types::{Dataset, Graph, LatencySummary, ARTIFACT_VERSION};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Merges an optional latency summary onto a graph.
///
/// A node receives latency fields only when its absolute path exactly
/// matches a key of the summary. Summary entries with no matching node are
/// ignored (generated files, files outside the analyzed scope).
pub fn build_dataset(mut graph: Graph, latency_summary: Option<LatencySummary>) -> Dataset {
    if let Some(summary) = &latency_summary {
        let mut matched = 0usize;
        let mut total = 0.0;
        for node in &mut graph.nodes {
            let key = display_path(&node.absolute_path);
            if let Some(&ms) = summary.per_file_ms.get(&key) {
                node.latency_ms = Some(ms);
                node.latency_breakdown_ms = summary.per_file_breakdown_ms.get(&key).cloned();
                total += ms;
                matched += 1;
            } else {
                node.latency_ms = None;
                node.latency_breakdown_ms = None;
            }
        }
        graph.stats.total_latency_ms = Some(total);
        debug!(
            matched,
            traced = summary.per_file_ms.len(),
            "merged latency summary onto graph"
        );
    }

    Dataset {
        version: ARTIFACT_VERSION,
        generated_at: Utc::now(),
        graph,
        latency_summary,
    }
}

/// Reads a JSON artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a JSON artifact atomically.
///
/// The artifact goes to a sibling temporary file first and is renamed into
/// place, so a failed run never leaves a half-written artifact behind.
pub fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(artifact).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, json)?;
    std::fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_graph;
    use crate::types::{Edge, EdgeKind, RawGraph};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_graph() -> Graph {
        let mut raw = RawGraph::new(PathBuf::from("/repo"));
        raw.add_scoped("a.ts", PathBuf::from("/repo/a.ts"));
        raw.add_scoped("b.ts", PathBuf::from("/repo/b.ts"));
        raw.edges
            .push(Edge::new("a.ts", "b.ts", EdgeKind::StaticImport, "./b"));
        assemble_graph(raw, Some(PathBuf::from("/repo/tsconfig.json")))
    }

    fn summary(entries: &[(&str, f64)]) -> LatencySummary {
        let per_file_ms: BTreeMap<String, f64> =
            entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let per_file_breakdown_ms = entries
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    BTreeMap::from([("checkSourceFile".to_string(), *v)]),
                )
            })
            .collect();
        LatencySummary {
            version: ARTIFACT_VERSION,
            generated_at: Utc::now(),
            root_path: PathBuf::from("/repo"),
            trace_dir_path: PathBuf::from("/repo/.tangle/trace"),
            per_file_ms,
            per_file_breakdown_ms,
            notes: Vec::new(),
        }
    }

    #[test]
    fn test_merge_attaches_matching_latency() {
        let dataset = build_dataset(
            sample_graph(),
            Some(summary(&[("/repo/a.ts", 12.5), ("/repo/generated.ts", 99.0)])),
        );

        let a = dataset.graph.node("a.ts").unwrap();
        assert_eq!(a.latency_ms, Some(12.5));
        assert_eq!(
            a.latency_breakdown_ms.as_ref().unwrap()["checkSourceFile"],
            12.5
        );

        let b = dataset.graph.node("b.ts").unwrap();
        assert_eq!(b.latency_ms, None);
        assert!(b.latency_breakdown_ms.is_none());

        assert_eq!(dataset.graph.stats.total_latency_ms, Some(12.5));
    }

    #[test]
    fn test_merge_without_summary_is_graph_only() {
        let dataset = build_dataset(sample_graph(), None);

        assert!(dataset.latency_summary.is_none());
        assert!(dataset.graph.nodes.iter().all(|n| n.latency_ms.is_none()));
        assert_eq!(dataset.graph.stats.total_latency_ms, None);
    }

    #[test]
    fn test_graph_round_trip_preserves_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("graph.json");
        let graph = sample_graph();

        write_artifact(&path, &graph).unwrap();
        let restored: Graph = read_artifact(&path).unwrap();

        assert_eq!(restored, graph);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_graph_serializes_camel_case_artifact() {
        let value = serde_json::to_value(sample_graph()).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["configPath"], "/repo/tsconfig.json");
        assert_eq!(value["stats"]["nodeCount"], 2);
        assert_eq!(value["stats"]["longestChain"][1], "b.ts");
        assert_eq!(value["edges"][0]["kind"], "static-import");
        assert!(value["stats"].get("totalLatencyMs").is_none());
    }

    #[test]
    fn test_read_artifact_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_artifact::<Graph>(&path).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
