//! Path identity helpers.
//!
//! Node ids are slash-delimited paths relative to the project root. They are
//! the only key used to join graph data across components, so every place
//! that turns a filesystem path into an id goes through [`node_id`].

use std::path::{Component, Path, PathBuf};

/// Extensions treated as source code (without the leading dot).
pub const CODE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

/// Directory name that marks an installed dependency package.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Returns true if the path has a source code extension.
pub fn is_code_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.iter().any(|c| c.eq_ignore_ascii_case(ext)))
}

/// Returns true if a free-form string ends in a source code extension.
///
/// Used on values pulled out of trace argument bags, which are not
/// guaranteed to be paths at all.
pub fn looks_like_code_path(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.contains('\n') {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    CODE_EXTENSIONS
        .iter()
        .any(|ext| lower.len() > ext.len() + 1 && lower.ends_with(&format!(".{ext}")))
}

/// Returns true for ambient declaration files (`.d.ts` and friends).
pub fn is_declaration_file(path: impl AsRef<Path>) -> bool {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    DECLARATION_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Returns true if any path component is a dependency package directory.
pub fn is_dependency_package(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == DEPENDENCY_DIR))
}

/// Lexical containment test: is `path` equal to or below `parent`?
pub fn is_within(path: impl AsRef<Path>, parent: impl AsRef<Path>) -> bool {
    normalize(path.as_ref()).starts_with(normalize(parent.as_ref()))
}

/// Lexically normalizes a path: drops `.` and folds `..` where possible.
///
/// Does not touch the filesystem, so it works for paths that no longer exist
/// (trace logs often reference generated or deleted files).
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Makes `path` absolute against `root` (if needed) and normalizes it.
pub fn absolutize(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    }
}

/// Renders a path the way artifacts store it.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Computes the node id of `path` relative to `root`.
///
/// Files outside the root get `..` segments so they still receive a stable,
/// unique id. Separators are always `/`.
pub fn node_id(root: &Path, path: &Path) -> String {
    let root = normalize(root);
    let path = normalize(path);

    let root_parts: Vec<Component<'_>> = root.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let shared = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::with_capacity(path_parts.len());
    segments.extend((shared..root_parts.len()).map(|_| "..".to_string()));
    segments.extend(
        path_parts[shared..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
