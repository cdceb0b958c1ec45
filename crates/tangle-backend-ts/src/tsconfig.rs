//! `tsconfig.json` discovery and parsing.
//!
//! Each file in the `extends` chain is parsed with `oxc_resolver`'s
//! [`TsConfig`] reader, which accepts comments and trailing commas. Only the
//! keys that shape the file set are kept here: `files`, `include`,
//! `exclude`, and `compilerOptions.{allowJs, outDir}`. Relative paths are
//! resolved against the directory of the config file that declares them, so
//! values inherited through `extends` keep their original meaning.
//! `paths` and `baseUrl` are left to the resolver, which reads the same
//! chain itself.

use oxc_resolver::{ExtendsField, TsConfig};
use std::path::{Path, PathBuf};
use tangle_core::paths::normalize;
use tangle_core::{Error, Result};
use tracing::debug;

/// File name searched for when no explicit configuration is given.
pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Compiler options that shape the file set, with paths made absolute.
///
/// Unset options stay `None` until the whole chain is merged, so a parent
/// that never mentions an option cannot reset what another parent set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// `allowJs`: JavaScript files join the file set.
    pub allow_js: Option<bool>,
    /// `outDir`, resolved. Excluded from the file set by default.
    pub out_dir: Option<PathBuf>,
}

impl CompilerOptions {
    pub fn allows_js(&self) -> bool {
        self.allow_js.unwrap_or(false)
    }

    fn inherit(&mut self, parent: CompilerOptions) {
        if parent.allow_js.is_some() {
            self.allow_js = parent.allow_js;
        }
        if parent.out_dir.is_some() {
            self.out_dir = parent.out_dir;
        }
    }
}

/// A list of file names or globs plus the directory they are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternList {
    pub base: PathBuf,
    pub patterns: Vec<String>,
}

/// A parsed project configuration with its `extends` chain applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// The configuration file itself.
    pub path: PathBuf,
    pub compiler_options: CompilerOptions,
    pub files: Option<PatternList>,
    pub include: Option<PatternList>,
    pub exclude: Option<PatternList>,
}

fn parse_error(path: &Path, diagnostic: String) -> Error {
    Error::ConfigurationParse {
        path: path.to_path_buf(),
        diagnostics: vec![diagnostic],
    }
}

impl ProjectConfig {
    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            compiler_options: CompilerOptions::default(),
            files: None,
            include: None,
            exclude: None,
        }
    }

    /// Directory containing the configuration file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Searches `start` and its ancestors for `tsconfig.json`.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Determines which configuration file to use.
    ///
    /// An explicit path may name a file or a directory containing
    /// `tsconfig.json`; if it names neither, or nothing is found searching
    /// upward from `project_root`, this fails with `ConfigurationNotFound`.
    pub fn locate(project_root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) if path.is_file() => Ok(path.to_path_buf()),
            Some(path) if path.join(CONFIG_FILE_NAME).is_file() => {
                Ok(path.join(CONFIG_FILE_NAME))
            }
            Some(path) => Err(Error::ConfigurationNotFound {
                searched: path.to_path_buf(),
            }),
            None => Self::find(project_root).ok_or_else(|| Error::ConfigurationNotFound {
                searched: project_root.to_path_buf(),
            }),
        }
    }

    /// Loads a configuration file, following `extends`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut visiting = Vec::new();
        load_layer(&normalize(path), &mut visiting)
    }

    fn inherit(&mut self, parent: ProjectConfig) {
        self.compiler_options.inherit(parent.compiler_options);
        if parent.files.is_some() {
            self.files = parent.files;
        }
        if parent.include.is_some() {
            self.include = parent.include;
        }
        if parent.exclude.is_some() {
            self.exclude = parent.exclude;
        }
    }

    fn apply(&mut self, layer: TsConfig, dir: &Path) {
        let options = layer.compiler_options;
        if let Some(allow_js) = options.allow_js {
            self.compiler_options.allow_js = Some(allow_js);
        }
        if let Some(out_dir) = options.out_dir {
            self.compiler_options.out_dir = Some(normalize(&dir.join(out_dir)));
        }

        let list = |patterns: Vec<PathBuf>| PatternList {
            base: dir.to_path_buf(),
            patterns: patterns
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        };
        if let Some(files) = layer.files {
            self.files = Some(list(files));
        }
        if let Some(include) = layer.include {
            self.include = Some(list(include));
        }
        if let Some(exclude) = layer.exclude {
            self.exclude = Some(list(exclude));
        }
    }
}

fn load_layer(path: &Path, visiting: &mut Vec<PathBuf>) -> Result<ProjectConfig> {
    if visiting.iter().any(|seen| seen == path) {
        let chain: Vec<String> = visiting
            .iter()
            .chain(std::iter::once(&path.to_path_buf()))
            .map(|p| p.display().to_string())
            .collect();
        return Err(parse_error(
            path,
            format!(
                "Circularity detected while resolving configuration: {}",
                chain.join(" -> ")
            ),
        ));
    }
    visiting.push(path.to_path_buf());

    let content = std::fs::read_to_string(path)
        .map_err(|e| parse_error(path, format!("Cannot read file '{}': {e}", path.display())))?;
    let mut layer = TsConfig::parse(false, path, path, content)
        .map_err(|e| parse_error(path, format!("{}: {e}", path.display())))?;

    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let mut config = ProjectConfig::empty(path.to_path_buf());

    let parents = match layer.extends.take() {
        Some(ExtendsField::Single(parent)) => vec![parent],
        Some(ExtendsField::Multiple(parents)) => parents,
        None => Vec::new(),
    };
    for specifier in parents {
        let parent_path = resolve_extends(&dir, &specifier).ok_or_else(|| {
            parse_error(
                path,
                format!("File '{specifier}' not found (extended from {}).", path.display()),
            )
        })?;
        debug!(config = %path.display(), parent = %parent_path.display(), "following extends");
        let parent = load_layer(&normalize(&parent_path), visiting)?;
        config.inherit(parent);
    }

    config.apply(layer, &dir);
    visiting.pop();
    Ok(config)
}

/// Finds the file an `extends` entry points at.
///
/// Relative and absolute entries are resolved against the declaring config's
/// directory; anything else is looked up in `node_modules` of each ancestor.
fn resolve_extends(dir: &Path, specifier: &str) -> Option<PathBuf> {
    let is_path = specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute();
    if is_path {
        return json_variants(&dir.join(specifier))
            .into_iter()
            .find(|candidate| candidate.is_file());
    }

    dir.ancestors()
        .flat_map(|ancestor| json_variants(&ancestor.join("node_modules").join(specifier)))
        .find(|candidate| candidate.is_file())
}

fn json_variants(base: &Path) -> Vec<PathBuf> {
    let mut variants = vec![base.to_path_buf()];
    if base.extension().map_or(true, |ext| ext != "json") {
        let mut with_ext = base.as_os_str().to_owned();
        with_ext.push(".json");
        variants.push(PathBuf::from(with_ext));
        variants.push(base.join(CONFIG_FILE_NAME));
    }
    variants
}
