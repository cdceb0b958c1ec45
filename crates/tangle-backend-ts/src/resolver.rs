//! Module resolution.
//!
//! [`TsModuleResolver`] wraps `oxc_resolver` with TypeScript's conventions:
//! `.js` specifiers map onto their `.ts` sources, `types` entries win in
//! package manifests, and the project's `tsconfig.json` supplies `paths`,
//! `baseUrl` and project references. A specifier that resolves to no file
//! yields `None`; the caller drops the reference.

use oxc_resolver::{
    ResolveOptions, Resolver, TsconfigDiscovery, TsconfigOptions, TsconfigReferences,
};
use std::path::{Path, PathBuf};
use tangle_core::paths::normalize;
use tangle_core::{Error, Result};
use tracing::trace;

/// Maps `(specifier, importing file)` to a file on disk.
pub trait ModuleResolver {
    fn resolve(&self, specifier: &str, importer: &Path) -> Option<PathBuf>;
}

/// TypeScript-flavoured resolver, optionally bound to one `tsconfig.json`.
pub struct TsModuleResolver {
    resolver: Resolver,
    config_file: Option<PathBuf>,
}

impl TsModuleResolver {
    /// Creates a resolver. With `config_file`, its `paths` and `baseUrl`
    /// (after following `extends`) are applied before node-style lookup.
    pub fn new(config_file: Option<PathBuf>) -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let tsconfig = config_file.clone().map(|config_file| {
            TsconfigDiscovery::Manual(TsconfigOptions {
                config_file,
                references: TsconfigReferences::Auto,
            })
        });
        let resolve_options = ResolveOptions {
            tsconfig,
            extensions: strings(&[
                ".ts", ".tsx", ".d.ts", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs", ".json",
            ]),
            extension_alias: vec![
                (".js".to_string(), strings(&[".ts", ".tsx", ".js", ".jsx"])),
                (".mjs".to_string(), strings(&[".mts", ".mjs"])),
                (".cjs".to_string(), strings(&[".cts", ".cjs"])),
            ],
            condition_names: strings(&["types", "import", "require", "node", "default"]),
            main_fields: strings(&["types", "typings", "module", "main"]),
            ..ResolveOptions::default()
        };

        Self {
            resolver: Resolver::new(resolve_options),
            config_file,
        }
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Loads the bound `tsconfig.json` the way resolution will see it.
    ///
    /// Resolution swallows configuration failures per specifier, so callers
    /// check once up front.
    pub fn check_config(&self) -> Result<()> {
        let Some(path) = &self.config_file else {
            return Ok(());
        };
        self.resolver
            .resolve_tsconfig(path)
            .map(|_| ())
            .map_err(|e| Error::ConfigurationParse {
                path: path.clone(),
                diagnostics: vec![e.to_string()],
            })
    }
}

impl ModuleResolver for TsModuleResolver {
    fn resolve(&self, specifier: &str, importer: &Path) -> Option<PathBuf> {
        let dir = importer.parent().unwrap_or_else(|| Path::new("."));
        match self.resolver.resolve(dir, specifier) {
            Ok(resolution) => Some(normalize(resolution.path())),
            Err(err) => {
                trace!(specifier, importer = %importer.display(), error = %err, "unresolved");
                None
            }
        }
    }
}

/// True for TypeScript's bundled `lib.*.d.ts` files, which never become nodes.
pub fn is_builtin_library(path: &Path) -> bool {
    let is_lib_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("lib.") && name.ends_with(".d.ts"));
    let in_typescript = path
        .parent()
        .filter(|dir| dir.ends_with("lib"))
        .and_then(|dir| dir.parent())
        .is_some_and(|pkg| pkg.ends_with("typescript"));
    is_lib_file && in_typescript
}
