//! Human-readable run summaries, written to stderr.

use colored::Colorize;
use std::path::Path;
use tangle_core::{Dataset, Graph, LatencySummary};

/// How many cycles or slow files a summary lists.
const MAX_LISTED: usize = 5;

pub fn graph_line(graph: &Graph) -> String {
    let stats = &graph.stats;
    format!(
        "{} files, {} edges, {} components ({} cyclic), max depth {}",
        stats.node_count,
        stats.edge_count,
        stats.scc_count,
        stats.cyclic_scc_count,
        stats.max_depth
    )
}

pub fn print_graph(graph: &Graph, written_to: &Path) {
    eprintln!("{} {}", "graph".green().bold(), graph_line(graph));

    let cycles: Vec<_> = graph.sccs.iter().filter(|c| c.cyclic).collect();
    for scc in cycles.iter().take(MAX_LISTED) {
        eprintln!("  {} {}", "cycle".yellow(), scc.members.join(", "));
    }
    if cycles.len() > MAX_LISTED {
        eprintln!("  {}", format!("... {} more", cycles.len() - MAX_LISTED).dimmed());
    }
    if graph.stats.longest_chain.len() > 1 {
        eprintln!(
            "  {} {}",
            "longest chain".cyan(),
            graph.stats.longest_chain.join(" -> ")
        );
    }
    eprintln!("  {}", written_to.display().to_string().dimmed());
}

pub fn print_latency(summary: &LatencySummary, written_to: &Path) {
    let total: f64 = summary.per_file_ms.values().sum();
    eprintln!(
        "{} {} files attributed, {:.1} ms total",
        "latency".green().bold(),
        summary.per_file_ms.len(),
        total
    );

    let mut slowest: Vec<(&String, &f64)> = summary.per_file_ms.iter().collect();
    slowest.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (file, ms) in slowest.into_iter().take(MAX_LISTED) {
        eprintln!("  {ms:>10.1} ms  {file}");
    }
    for note in &summary.notes {
        eprintln!("  {} {note}", "note".yellow());
    }
    eprintln!("  {}", written_to.display().to_string().dimmed());
}

pub fn print_dataset(dataset: &Dataset, written_to: &Path) {
    let matched = dataset
        .graph
        .nodes
        .iter()
        .filter(|n| n.latency_ms.is_some())
        .count();
    let latency = match dataset.graph.stats.total_latency_ms {
        Some(total) => format!("{matched} files with latency, {total:.1} ms"),
        None => "graph only".to_string(),
    };
    eprintln!(
        "{} {}; {latency}",
        "dataset".green().bold(),
        graph_line(&dataset.graph)
    );
    eprintln!("  {}", written_to.display().to_string().dimmed());
}
