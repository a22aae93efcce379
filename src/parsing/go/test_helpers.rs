//! Test helpers for Go front-end and resolver unit tests
//!
//! This module provides utilities for assembling Go sources, parsing them into
//! packages and asserting on the resolved model.

use crate::model::{DiagnosticKind, ResolvedPackage};
use crate::parsing::ast::PackageUnit;
use crate::resolve::{RemoteLookup, StaticLookup, resolve_package};
use thiserror::Error;

/// Errors specific to Go front-end testing
#[derive(Error, Debug)]
pub enum GoTestError {
    #[error(
        "Package loading failed: {0}\nSuggestion: Verify the Go snippet is syntactically valid"
    )]
    LoadFailed(String),

    #[error(
        "Test assertion failed: {0}\nSuggestion: Check test expectations against actual resolver output"
    )]
    AssertionFailed(String),
}

/// Assembles a single Go source file from a package clause, imports and type declarations
#[derive(Debug, Default)]
pub struct GoCodeBuilder {
    package: Option<String>,
    /// Import specs as written, e.g. `"io"` or `nethttp "net/http"`.
    imports: Vec<String>,
    types: Vec<String>,
}

impl GoCodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn with_type(mut self, type_decl: impl Into<String>) -> Self {
        self.types.push(type_decl.into());
        self
    }

    #[must_use = "Building the Go code may produce an incomplete result"]
    pub fn build(self) -> String {
        let mut code = String::new();

        if let Some(package) = self.package {
            code.push_str(&format!("package {package}\n\n"));
        }

        match self.imports.as_slice() {
            [] => {}
            [single] => code.push_str(&format!("import {single}\n\n")),
            imports => {
                code.push_str("import (\n");
                for import in imports {
                    code.push_str(&format!("    {import}\n"));
                }
                code.push_str(")\n\n");
            }
        }

        for type_decl in &self.types {
            code.push_str(&format!("{type_decl}\n\n"));
        }

        code
    }
}

/// Parse a single Go source into a package
pub fn parse_package(code: &str) -> Result<PackageUnit, GoTestError> {
    PackageUnit::from_sources([("test.go", code)])
        .map_err(|e| GoTestError::LoadFailed(e.to_string()))
}

/// Parse and resolve a single Go source
pub fn resolve_go_code(
    code: &str,
    lookup: &dyn RemoteLookup,
) -> Result<ResolvedPackage, GoTestError> {
    let unit = parse_package(code)?;
    Ok(resolve_package(&unit, lookup))
}

/// A lookup that serves [`snippets::IO`] as package `io`
pub fn io_lookup() -> Result<StaticLookup, GoTestError> {
    Ok(StaticLookup::new().with_package("io", parse_package(snippets::IO)?))
}

/// Method names of a resolved interface, in resolution order
pub fn method_names(package: &ResolvedPackage, interface: &str) -> Result<Vec<String>, GoTestError> {
    let resolved = package.interface(interface).ok_or_else(|| {
        GoTestError::AssertionFailed(format!("Interface '{interface}' not in catalogue"))
    })?;
    Ok(resolved.methods.iter().map(|m| m.name.clone()).collect())
}

/// Count diagnostics of one kind
pub fn count_diagnostics(package: &ResolvedPackage, kind: DiagnosticKind) -> usize {
    package.diagnostics.iter().filter(|d| d.kind == kind).count()
}

/// Assert that a diagnostic of the given kind names the declaration
pub fn assert_diagnostic(
    package: &ResolvedPackage,
    kind: DiagnosticKind,
    declaration: &str,
) -> Result<(), GoTestError> {
    if package
        .diagnostics
        .iter()
        .any(|d| d.kind == kind && d.declaration == declaration)
    {
        return Ok(());
    }
    Err(GoTestError::AssertionFailed(format!(
        "No {kind} diagnostic for '{declaration}', got: {:?}",
        package.diagnostics
    )))
}

/// Go packages shared by the parser and resolver tests
pub mod snippets {
    /// Stub of the standard `io` package, served by [`super::io_lookup`].
    /// `Closer` is left out on purpose so lookups for it fail.
    pub const IO: &str = r#"package io

type Reader interface {
    Read(p []byte) (n int, err error)
}

type Writer interface {
    Write(p []byte) (n int, err error)
}

type ReadWriter interface {
    Reader
    Writer
}
"#;

    /// Local embedding only, one unexported interface
    pub const INTERFACES: &str = r#"
package store

// Getter reads values by key
type Getter interface {
    Get(key string) ([]byte, error)
}

// Putter stores values by key
type Putter interface {
    Put(key string, value []byte) error
}

// Store embeds both halves and adds iteration
type Store interface {
    Getter
    Putter
    Keys(prefix string) <-chan string
}

// codec stays out of the catalogue
type codec interface {
    encode(v any) ([]byte, error)
}
"#;

    /// Generic declarations next to plain ones
    pub const GENERICS: &str = r#"
package cache

// Identity is a function and never a declaration
func Identity[T any](value T) T {
    return value
}

// Container is a generic struct
type Container[T any] struct {
    items []T
}

// Processor is a generic interface
type Processor[T any] interface {
    Process(T) error
}

// Evictor is not generic and resolves normally
type Evictor interface {
    Evict(key string) bool
}
"#;

    /// Aliased, dot, blank and module imports used by method signatures
    pub const COMPLEX_IMPORTS: &str = r#"
package server

import (
    "context"
    "net/http"

    // aliased import
    httputil "net/http/httputil"

    // dot import
    . "math"

    // blank import
    _ "net/http/pprof"

    // external modules
    "github.com/gorilla/mux"
    "github.com/user/project/internal/config"
)

// Router is what the generated wrapper delegates to
type Router interface {
    Handle(ctx context.Context, w http.ResponseWriter, r *http.Request)
    Mount(prefix string, router *mux.Router) error
    Proxy(target string) *httputil.ReverseProxy
    Settings() (config.Server, bool)
}
"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::NoRemoteLookup;
    use anyhow::Result;

    #[test]
    fn test_go_code_builder_resolves() -> Result<()> {
        let code = GoCodeBuilder::new()
            .with_package("pipe")
            .with_import(r#""io""#)
            .with_type("type Source interface {\n    io.Reader\n    Name() string\n}")
            .with_type("type sink interface {\n    io.Writer\n}")
            .build();

        assert!(code.starts_with("package pipe\n\nimport \"io\"\n\n"));

        let package = resolve_go_code(&code, &io_lookup()?)?;
        assert!(package.is_clean(), "{:?}", package.diagnostics);
        assert_eq!(package.interface_names(), vec!["Source"]);
        assert_eq!(method_names(&package, "Source")?, vec!["Read", "Name"]);
        Ok(())
    }

    #[test]
    fn test_go_code_builder_groups_imports() {
        let code = GoCodeBuilder::new()
            .with_package("p")
            .with_import(r#""io""#)
            .with_import(r#"nethttp "net/http""#)
            .build();
        assert_eq!(
            code,
            "package p\n\nimport (\n    \"io\"\n    nethttp \"net/http\"\n)\n\n"
        );
    }

    #[test]
    fn test_resolve_snippet_interfaces() -> Result<()> {
        let package = resolve_go_code(snippets::INTERFACES, &NoRemoteLookup)?;

        assert!(package.is_clean(), "{:?}", package.diagnostics);
        assert_eq!(package.interface_names(), vec!["Getter", "Putter", "Store"]);
        assert_eq!(method_names(&package, "Store")?, vec!["Get", "Put", "Keys"]);
        let keys = package.interface("Store").unwrap().method("Keys").unwrap();
        assert_eq!(keys.to_string(), "Keys(prefix string) <-chan string");
        assert!(method_names(&package, "codec").is_err());
        Ok(())
    }

    #[test]
    fn test_resolve_snippet_generics() -> Result<()> {
        let package = resolve_go_code(snippets::GENERICS, &NoRemoteLookup)?;

        assert_eq!(count_diagnostics(&package, DiagnosticKind::Classification), 2);
        assert_diagnostic(&package, DiagnosticKind::Classification, "Container")?;
        assert_diagnostic(&package, DiagnosticKind::Classification, "Processor")?;
        assert_eq!(package.interface_names(), vec!["Evictor"]);
        assert!(package.structs.is_empty());
        Ok(())
    }

    #[test]
    fn test_resolve_snippet_complex_imports() -> Result<()> {
        let package = resolve_go_code(snippets::COMPLEX_IMPORTS, &NoRemoteLookup)?;

        assert!(package.is_clean(), "{:?}", package.diagnostics);
        let router = package.interface("Router").unwrap();
        assert_eq!(
            router.method("Handle").unwrap().to_string(),
            "Handle(ctx context.Context, w http.ResponseWriter, r *http.Request)"
        );
        assert_eq!(
            router.method("Proxy").unwrap().to_string(),
            "Proxy(target string) *httputil.ReverseProxy"
        );
        assert_eq!(
            router.referenced_packages().into_iter().collect::<Vec<_>>(),
            vec![
                "context",
                "github.com/gorilla/mux",
                "github.com/user/project/internal/config",
                "net/http",
                "net/http/httputil",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_interface_is_an_assertion_failure() -> Result<()> {
        let package = resolve_go_code(snippets::IO, &NoRemoteLookup)?;
        let err = method_names(&package, "Closer").unwrap_err();
        assert!(matches!(err, GoTestError::AssertionFailed(_)));
        assert!(assert_diagnostic(&package, DiagnosticKind::ConflictingMethod, "ReadWriter").is_err());
        Ok(())
    }
}
