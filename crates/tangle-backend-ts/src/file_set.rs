//! Expansion of a project configuration into its root file set.
//!
//! `files` entries are taken literally. `include` globs select files by
//! extension (TypeScript always, JavaScript with `allowJs`), minus anything
//! matched by `exclude`. A wildcard-free pattern that names an existing
//! directory matches everything below it, as does a pattern whose last
//! segment has no wildcard and no extension.

use crate::tsconfig::{PatternList, ProjectConfig};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tangle_core::paths::{display_path, normalize};
use tangle_core::{Error, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];
const JS_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs"];

/// Package folders never entered by a wildcard unless a pattern names them.
const PACKAGE_FOLDERS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Returns the sorted, deduplicated list of files the configuration selects.
pub fn expand(config: &ProjectConfig) -> Result<Vec<PathBuf>> {
    let allow_js = config.compiler_options.allows_js();
    let mut selected = BTreeSet::new();

    if let Some(files) = &config.files {
        for name in &files.patterns {
            let path = normalize(&files.base.join(name));
            if path.is_file() {
                selected.insert(path);
            } else {
                warn!(file = %path.display(), "file listed in configuration does not exist");
            }
        }
    }

    let include = match (&config.include, &config.files) {
        (Some(include), _) => Some(include.clone()),
        (None, None) => Some(PatternList {
            base: config.dir().to_path_buf(),
            patterns: vec!["**/*".to_string()],
        }),
        (None, Some(_)) => None,
    };

    if let Some(include) = include {
        let include_globs = absolute_patterns(&include);
        let include_set = build_set(&config.path, &include_globs)?;
        let exclude_set = build_set(&config.path, &exclude_globs(config))?;
        let named_folders: Vec<&str> = PACKAGE_FOLDERS
            .iter()
            .copied()
            .filter(|folder| include.patterns.iter().any(|p| p.contains(folder)))
            .collect();

        for walk_root in walk_roots(&include_globs) {
            let entries = WalkDir::new(&walk_root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| {
                    if entry.depth() == 0 {
                        return true;
                    }
                    let lossy = entry.file_name().to_string_lossy();
                    let name: &str = &lossy;
                    if name.starts_with('.') {
                        return false;
                    }
                    if entry.file_type().is_dir() {
                        let skipped_folder =
                            PACKAGE_FOLDERS.contains(&name) && !named_folders.contains(&name);
                        return !skipped_folder && !exclude_set.is_match(entry.path());
                    }
                    true
                });

            for entry in entries.filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = normalize(entry.path());
                if has_supported_extension(&path, allow_js)
                    && include_set.is_match(&path)
                    && !exclude_set.is_match(&path)
                {
                    selected.insert(path);
                }
            }
        }
    }

    if selected.is_empty() {
        warn!(config = %config.path.display(), "configuration selects no input files");
    }
    debug!(files = selected.len(), "expanded root file set");
    Ok(selected.into_iter().collect())
}

fn has_supported_extension(path: &Path, allow_js: bool) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let matches = |exts: &[&str]| exts.iter().any(|ext| name.ends_with(ext));
    matches(TS_EXTENSIONS) || (allow_js && matches(JS_EXTENSIONS))
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// Turns relative patterns into absolute glob strings.
fn absolute_patterns(list: &PatternList) -> Vec<String> {
    list.patterns
        .iter()
        .map(|pattern| {
            let resolved = normalize(&list.base.join(pattern));
            let absolute = display_path(&resolved);
            let last = absolute.rsplit('/').next().unwrap_or_default();
            let names_directory = last == "**"
                || (!has_wildcard(pattern) && resolved.is_dir())
                || (!has_wildcard(last) && Path::new(last).extension().is_none());
            if names_directory {
                let trimmed = absolute.trim_end_matches("/**");
                format!("{trimmed}/**/*")
            } else {
                absolute
            }
        })
        .collect()
}

fn exclude_globs(config: &ProjectConfig) -> Vec<String> {
    let mut globs = match &config.exclude {
        Some(exclude) => absolute_patterns(exclude),
        None => {
            let defaults = PatternList {
                base: config.dir().to_path_buf(),
                patterns: PACKAGE_FOLDERS.iter().map(|s| s.to_string()).collect(),
            };
            absolute_patterns(&defaults)
        }
    };
    if config.exclude.is_none() {
        if let Some(out_dir) = &config.compiler_options.out_dir {
            globs.push(format!("{}/**/*", display_path(out_dir)));
        }
    }
    // A directory pattern also has to match the directory entry itself so
    // the walk can prune it.
    let directories: Vec<String> = globs
        .iter()
        .filter_map(|g| g.strip_suffix("/**/*").map(str::to_string))
        .collect();
    globs.extend(directories);
    globs
}

fn build_set(config_path: &Path, patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::ConfigurationParse {
                path: config_path.to_path_buf(),
                diagnostics: vec![format!("Invalid file pattern '{pattern}': {e}")],
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::ConfigurationParse {
        path: config_path.to_path_buf(),
        diagnostics: vec![e.to_string()],
    })
}

/// Literal directory prefixes of the include globs, with nested roots folded
/// into their ancestors.
fn walk_roots(globs: &[String]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = globs
        .iter()
        .map(|glob| {
            let literal: Vec<&str> = glob
                .split('/')
                .take_while(|segment| !has_wildcard(segment))
                .collect();
            let prefix = literal.join("/");
            let path = PathBuf::from(if prefix.is_empty() { "/".to_string() } else { prefix });
            // A fully literal pattern names a file; walk its directory.
            if literal.len() == glob.split('/').count() {
                path.parent().map(Path::to_path_buf).unwrap_or(path)
            } else {
                path
            }
        })
        .filter(|path| path.is_dir())
        .collect();

    roots.sort();
    roots.dedup();
    let mut folded: Vec<PathBuf> = Vec::new();
    for root in roots {
        if !folded.iter().any(|kept| root.starts_with(kept)) {
            folded.push(root);
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn load(root: &Path, tsconfig: &str) -> ProjectConfig {
        let path = root.join("tsconfig.json");
        fs::write(&path, tsconfig).unwrap();
        ProjectConfig::load(&path).unwrap()
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        let root = normalize(root);
        files
            .iter()
            .map(|f| display_path(f.strip_prefix(&root).unwrap()))
            .collect()
    }

    #[test]
    fn test_default_include_skips_packages_and_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "src/b.tsx");
        touch(root, "src/c.js");
        touch(root, "types/global.d.ts");
        touch(root, "node_modules/pkg/index.ts");
        touch(root, "dist/a.ts");
        touch(root, ".cache/x.ts");

        let config = load(root, r#"{ "compilerOptions": { "outDir": "dist" } }"#);
        let files = expand(&config).unwrap();

        assert_eq!(
            relative(root, &files),
            vec!["src/a.ts", "src/b.tsx", "types/global.d.ts"]
        );
    }

    #[test]
    fn test_allow_js_adds_javascript() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "src/legacy.js");
        touch(root, "src/styles.css");

        let config = load(root, r#"{ "compilerOptions": { "allowJs": true } }"#);
        let files = expand(&config).unwrap();

        assert_eq!(relative(root, &files), vec!["src/a.ts", "src/legacy.js"]);
    }

    #[test]
    fn test_include_directory_and_exclude_glob() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/game/loop.ts");
        touch(root, "src/game/loop.test.ts");
        touch(root, "scripts/build.ts");

        let config = load(
            root,
            r#"{ "include": ["src"], "exclude": ["**/*.test.ts"] }"#,
        );
        let files = expand(&config).unwrap();

        assert_eq!(relative(root, &files), vec!["src/game/loop.ts"]);
    }

    #[test]
    fn test_dotted_directory_names_are_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "packages/engine.v2/a.ts");
        touch(root, "packages/engine.v2/physics/b.ts");
        touch(root, "packages/other/c.ts");

        let config = load(root, r#"{ "include": ["packages/engine.v2"] }"#);
        let files = expand(&config).unwrap();

        assert_eq!(
            relative(root, &files),
            vec!["packages/engine.v2/a.ts", "packages/engine.v2/physics/b.ts"]
        );
    }

    #[test]
    fn test_dot_include_under_dotted_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("my.project");
        touch(&root, "src/main.ts");

        let config = load(&root, r#"{ "include": ["."] }"#);
        let files = expand(&config).unwrap();

        assert_eq!(relative(&root, &files), vec!["src/main.ts"]);
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/top.ts");
        touch(root, "src/nested/deep.ts");

        let config = load(root, r#"{ "include": ["src/*.ts"] }"#);
        let files = expand(&config).unwrap();

        assert_eq!(relative(root, &files), vec!["src/top.ts"]);
    }

    #[test]
    fn test_files_without_include_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/entry.ts");
        touch(root, "src/other.ts");

        let config = load(root, r#"{ "files": ["src/entry.ts", "src/missing.ts"] }"#);
        let files = expand(&config).unwrap();

        assert_eq!(relative(root, &files), vec!["src/entry.ts"]);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path(), r#"{ "include": ["nothing-here"] }"#);

        assert!(expand(&config).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_glob_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path(), r#"{ "include": ["src/[a.ts"] }"#);

        assert!(matches!(
            expand(&config),
            Err(Error::ConfigurationParse { .. })
        ));
    }
}
