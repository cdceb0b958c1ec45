//! Import reference extraction.
//!
//! Four reference shapes are recognised, each with a string literal
//! specifier:
//!
//! - `import ... from "x"` / `import "x"` → [`EdgeKind::StaticImport`]
//! - `export ... from "x"` / `export * from "x"` → [`EdgeKind::ReExport`]
//! - `import("x")` → [`EdgeKind::DynamicImport`]
//! - `require("x")` / `import x = require("x")` → [`EdgeKind::LegacyRequire`]
//!
//! Computed specifiers (`import(name)`, `require(base + "/x")`) are skipped.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression, TSImportEqualsDeclaration, TSModuleReference,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;
use tangle_core::{EdgeKind, Error, Result};
use tracing::debug;

/// One syntactic reference to another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Specifier exactly as written.
    pub specifier: String,
    pub kind: EdgeKind,
}

impl Reference {
    pub fn new(specifier: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
        }
    }
}

/// Produces the references of one source file, in source order.
pub trait ReferenceExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<Reference>>;
}

/// [`ReferenceExtractor`] backed by the oxc parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcReferenceExtractor;

impl OxcReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts references from in-memory source.
    ///
    /// `path` only selects the dialect (TypeScript, JSX, module vs script)
    /// and labels errors.
    pub fn extract_source(&self, path: &Path, source: &str) -> Result<Vec<Reference>> {
        let source_type = SourceType::from_path(path).unwrap_or_default();
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type).parse();

        if ret.panicked {
            return Err(Error::SourceParse {
                path: path.to_path_buf(),
                message: format!("{} syntax error(s)", ret.errors.len()),
            });
        }
        if !ret.errors.is_empty() {
            debug!(
                path = %path.display(),
                errors = ret.errors.len(),
                "recovered from syntax errors"
            );
        }

        let mut collector = ReferenceCollector::default();
        collector.visit_program(&ret.program);
        Ok(collector.references)
    }
}

impl ReferenceExtractor for OxcReferenceExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<Reference>> {
        let source = std::fs::read_to_string(path)?;
        self.extract_source(path, &source)
    }
}

#[derive(Default)]
struct ReferenceCollector {
    references: Vec<Reference>,
}

impl ReferenceCollector {
    fn push(&mut self, specifier: &str, kind: EdgeKind) {
        self.references.push(Reference::new(specifier, kind));
    }
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.push(it.source.value.as_str(), EdgeKind::StaticImport);
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.push(source.value.as_str(), EdgeKind::ReExport);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(it.source.value.as_str(), EdgeKind::ReExport);
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &it.source {
            self.push(lit.value.as_str(), EdgeKind::DynamicImport);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee {
            if callee.name.as_str() == "require" && it.arguments.len() == 1 {
                if let Argument::StringLiteral(lit) = &it.arguments[0] {
                    self.push(lit.value.as_str(), EdgeKind::LegacyRequire);
                }
            }
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_ts_import_equals_declaration(&mut self, it: &TSImportEqualsDeclaration<'a>) {
        if let TSModuleReference::ExternalModuleReference(external) = &it.module_reference {
            self.push(external.expression.value.as_str(), EdgeKind::LegacyRequire);
        }
        walk::walk_ts_import_equals_declaration(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(name: &str, source: &str) -> Vec<(String, EdgeKind)> {
        OxcReferenceExtractor::new()
            .extract_source(Path::new(name), source)
            .unwrap()
            .into_iter()
            .map(|r| (r.specifier, r.kind))
            .collect()
    }

    #[test]
    fn test_all_reference_shapes() {
        let refs = extract(
            "main.ts",
            r#"
            import { engine } from "./engine";
            import "./polyfill";
            export { render } from "./render";
            export * from "./types";
            const lazy = () => import("./lazy");
            const legacy = require("./legacy");
            import fs = require("fs");
            "#,
        );

        assert_eq!(
            refs,
            vec![
                ("./engine".to_string(), EdgeKind::StaticImport),
                ("./polyfill".to_string(), EdgeKind::StaticImport),
                ("./render".to_string(), EdgeKind::ReExport),
                ("./types".to_string(), EdgeKind::ReExport),
                ("./lazy".to_string(), EdgeKind::DynamicImport),
                ("./legacy".to_string(), EdgeKind::LegacyRequire),
                ("fs".to_string(), EdgeKind::LegacyRequire),
            ]
        );
    }

    #[test]
    fn test_computed_specifiers_are_skipped() {
        let refs = extract(
            "main.ts",
            r#"
            const name = "./x";
            import(name);
            require(name);
            require("./a", "./b");
            other("./c");
            "#,
        );
        assert!(refs.is_empty());
    }

    #[test]
    fn test_local_exports_are_not_references() {
        let refs = extract("mod.ts", "export const a = 1; export { a as b };");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_nested_references_are_found() {
        let refs = extract(
            "view.tsx",
            r#"
            export function View() {
                const load = async () => {
                    if (true) { await import("./deep"); }
                };
                return <div onClick={() => require("./handler")} />;
            }
            "#,
        );
        assert_eq!(
            refs,
            vec![
                ("./deep".to_string(), EdgeKind::DynamicImport),
                ("./handler".to_string(), EdgeKind::LegacyRequire),
            ]
        );
    }

    #[test]
    fn test_extract_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "import { b } from './b';").unwrap();

        let refs = OxcReferenceExtractor::new().extract(&path).unwrap();
        assert_eq!(refs, vec![Reference::new("./b", EdgeKind::StaticImport)]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = OxcReferenceExtractor::new()
            .extract(Path::new("/definitely/not/here.ts"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
