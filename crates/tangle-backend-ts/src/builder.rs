//! Raw graph construction.
//!
//! Starting from the root file set, every admitted file is parsed, its
//! references resolved, and one edge recorded per resolved reference whose
//! target passes the [`InclusionPolicy`]. Targets not yet visited are parsed
//! in turn, so the node set is the transitive closure the policy allows.

use crate::resolver::{is_builtin_library, ModuleResolver};
use crate::syntax::ReferenceExtractor;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tangle_core::paths::{is_code_file, is_declaration_file, is_dependency_package, normalize};
use tangle_core::{Edge, RawGraph, TangleSettings};
use tracing::{debug, trace, warn};

/// Which files may become graph nodes.
///
/// TypeScript's bundled `lib.*.d.ts` files are always rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InclusionPolicy {
    /// Admit files inside `node_modules`.
    pub include_dependency_packages: bool,
    /// Admit ambient declaration files.
    pub include_declaration_files: bool,
}

impl InclusionPolicy {
    pub fn from_settings(settings: &TangleSettings) -> Self {
        Self {
            include_dependency_packages: settings.analysis.include_dependency_packages,
            include_declaration_files: settings.analysis.include_declaration_files,
        }
    }

    pub fn admits(&self, path: &Path) -> bool {
        if is_builtin_library(path) {
            return false;
        }
        if !self.include_dependency_packages && is_dependency_package(path) {
            return false;
        }
        if !self.include_declaration_files && is_declaration_file(path) {
            return false;
        }
        true
    }
}

/// Builds a [`RawGraph`] with a pluggable parser and resolver.
pub struct GraphBuilder<E, R> {
    extractor: E,
    resolver: R,
    policy: InclusionPolicy,
}

impl<E: ReferenceExtractor, R: ModuleResolver> GraphBuilder<E, R> {
    pub fn new(extractor: E, resolver: R, policy: InclusionPolicy) -> Self {
        Self {
            extractor,
            resolver,
            policy,
        }
    }

    /// Traverses from `root_files` and returns the raw graph.
    ///
    /// Files the parser gives up on are logged and contribute no edges; they
    /// stay in the node set if they were in scope.
    pub fn build(&self, project_root: &Path, root_files: &[PathBuf]) -> RawGraph {
        let mut raw = RawGraph::new(project_root.to_path_buf());
        let mut queued: HashSet<PathBuf> = HashSet::new();
        let mut worklist: VecDeque<PathBuf> = VecDeque::new();

        let mut roots: Vec<PathBuf> = root_files.iter().map(|p| normalize(p)).collect();
        roots.sort();
        roots.dedup();
        for path in roots {
            if !self.policy.admits(&path) {
                trace!(path = %path.display(), "root file rejected by inclusion policy");
                continue;
            }
            let id = raw.intern(&path);
            raw.scoped.push(id);
            queued.insert(path.clone());
            worklist.push_back(path);
        }

        let mut dropped = 0usize;
        while let Some(path) = worklist.pop_front() {
            let references = match self.extractor.extract(&path) {
                Ok(references) => references,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unparseable file");
                    continue;
                }
            };

            let from = raw.intern(&path);
            for reference in references {
                let Some(target) = self.resolver.resolve(&reference.specifier, &path) else {
                    trace!(
                        from = %from,
                        specifier = %reference.specifier,
                        "dropping unresolvable reference"
                    );
                    dropped += 1;
                    continue;
                };
                let target = normalize(&target);
                if !self.policy.admits(&target) {
                    trace!(
                        from = %from,
                        target = %target.display(),
                        "dropping reference outside inclusion policy"
                    );
                    dropped += 1;
                    continue;
                }

                let to = raw.intern(&target);
                raw.edges
                    .push(Edge::new(from.clone(), to, reference.kind, reference.specifier));

                if is_code_file(&target) && queued.insert(target.clone()) {
                    worklist.push_back(target);
                }
            }
        }

        debug!(
            scoped = raw.scoped.len(),
            nodes = raw.paths.len(),
            edges = raw.edges.len(),
            dropped,
            "built raw graph"
        );
        raw
    }
}
