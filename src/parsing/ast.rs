//! Syntax-level declaration model
//!
//! These types mirror what the Go front end sees in source: type expressions
//! are kept as syntax ([`TypeExpr`]) and only become [`TypeReference`]s when the
//! resolver classifies them. A [`PackageUnit`] is immutable once built.
//!
//! [`TypeReference`]: crate::model::TypeReference

use crate::model::ChannelDirection;
use crate::types::{SourceLocation, Visibility};
use std::sync::Arc;

/// A single `import` line of a Go file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub path: String,
    /// Explicit name: an alias, `.` for dot imports or `_` for blank imports.
    pub alias: Option<String>,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            path: path.into(),
            alias: alias.map(str::to_string),
        }
    }

    pub fn is_dot(&self) -> bool {
        self.alias.as_deref() == Some(".")
    }

    /// Qualifier this import is referred to by inside the file, if any.
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some(".") | Some("_") => None,
            Some(alias) => Some(alias),
            None => Some(package_name_from_path(&self.path)),
        }
    }
}

/// Imports of one source file, used to turn qualifiers into import paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    specs: Vec<ImportSpec>,
}

impl ImportTable {
    pub fn new(specs: Vec<ImportSpec>) -> Self {
        Self { specs }
    }

    pub fn push(&mut self, spec: ImportSpec) {
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[ImportSpec] {
        &self.specs
    }

    /// Import path for a package qualifier such as `nethttp` or `io`.
    pub fn resolve(&self, qualifier: &str) -> Option<&str> {
        self.specs
            .iter()
            .find(|spec| spec.local_name() == Some(qualifier))
            .map(|spec| spec.path.as_str())
    }

    /// Import paths brought into file scope with `import . "path"`.
    pub fn dot_imports(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(|spec| spec.is_dot())
            .map(|spec| spec.path.as_str())
    }
}

/// Best guess of the package name declared at an import path.
///
/// Uses the last path element, skipping a trailing major version element
/// (`/v2`), a `.vN` suffix (`yaml.v3`) and a `go-` prefix.
pub fn package_name_from_path(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    if let Some((name, version)) = last.rsplit_once('.') {
        if is_major_version(version) {
            last = name;
        }
    }
    last.strip_prefix("go-").unwrap_or(last)
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// A type expression as written in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    /// Raw source text, kept for diagnostics.
    pub text: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExprKind {
    /// Unqualified identifier: a predeclared type or one declared in the same package.
    Name(String),
    /// `pkg.Name`, where `pkg` is a file-level import qualifier.
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[len]elem`; `len` is the raw length expression.
    Array { len: String, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan {
        direction: ChannelDirection,
        elem: Box<TypeExpr>,
    },
    Func {
        params: Vec<ParamDecl>,
        results: Vec<ParamDecl>,
    },
    Interface { has_members: bool },
    Struct { has_fields: bool },
    Paren(Box<TypeExpr>),
    /// `Base[Args]`
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    /// Any other syntactic form, tagged with the grammar node kind.
    Other(String),
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }
}

/// One parameter or result as written in a parameter list.
///
/// Grouped names (`a, b int`) are expanded into one `ParamDecl` per name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: TypeExpr,
    /// Declared with `...`; `ty` is then the element type.
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// `None` for embedded fields.
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructDecl {
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub results: Vec<ParamDecl>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Method(MethodDecl),
    /// Embedded interface element, classified by the resolver.
    Embedded(TypeExpr),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub members: Vec<Member>,
}

impl InterfaceDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            Member::Embedded(_) => None,
        })
    }

    pub fn embedded(&self) -> impl Iterator<Item = &TypeExpr> {
        self.members.iter().filter_map(|member| match member {
            Member::Embedded(expr) => Some(expr),
            Member::Method(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Struct(StructDecl),
    Interface(InterfaceDecl),
    /// `type A = B`; the target is kept as written.
    Alias(TypeExpr),
}

/// A named struct, interface or alias declared at package level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub visibility: Visibility,
    pub location: SourceLocation,
    /// Import table of the file the declaration came from.
    pub imports: Arc<ImportTable>,
    pub type_params: Vec<String>,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(
        name: impl Into<String>,
        location: SourceLocation,
        imports: Arc<ImportTable>,
        kind: DeclKind,
    ) -> Self {
        let name = name.into();
        Self {
            visibility: Visibility::of(&name),
            name,
            location,
            imports,
            type_params: Vec::new(),
            kind,
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<String>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn is_exported(&self) -> bool {
        self.visibility.is_exported()
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match &self.kind {
            DeclKind::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDecl> {
        match &self.kind {
            DeclKind::Struct(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&TypeExpr> {
        match &self.kind {
            DeclKind::Alias(target) => Some(target),
            _ => None,
        }
    }
}

/// Declarations of one parsed Go source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub package: String,
    pub imports: Arc<ImportTable>,
    pub declarations: Vec<Declaration>,
}

/// All declarations of one package, in file then source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageUnit {
    pub name: String,
    /// Import path of the package when known.
    pub import_path: Option<String>,
    pub declarations: Vec<Declaration>,
}

impl PackageUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import_path: None,
            declarations: Vec::new(),
        }
    }

    pub fn with_import_path(mut self, import_path: impl Into<String>) -> Self {
        self.import_path = Some(import_path.into());
        self
    }

    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    /// First declaration with the given name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.name == name)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = (&Declaration, &InterfaceDecl)> {
        self.declarations
            .iter()
            .filter_map(|decl| decl.as_interface().map(|iface| (decl, iface)))
    }

    pub fn structs(&self) -> impl Iterator<Item = (&Declaration, &StructDecl)> {
        self.declarations
            .iter()
            .filter_map(|decl| decl.as_struct().map(|s| (decl, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_from_path() {
        assert_eq!(package_name_from_path("io"), "io");
        assert_eq!(package_name_from_path("net/http"), "http");
        assert_eq!(package_name_from_path("github.com/user/repo/v2"), "repo");
        assert_eq!(package_name_from_path("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(package_name_from_path("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(package_name_from_path("v2"), "v2");
    }

    #[test]
    fn test_import_table_resolution() {
        let table = ImportTable::new(vec![
            ImportSpec::new("io", None),
            ImportSpec::new("net/http", Some("nethttp")),
            ImportSpec::new("math", Some(".")),
            ImportSpec::new("net/http/pprof", Some("_")),
        ]);

        assert_eq!(table.resolve("io"), Some("io"));
        assert_eq!(table.resolve("nethttp"), Some("net/http"));
        assert_eq!(table.resolve("http"), None);
        assert_eq!(table.resolve("pprof"), None);
        assert_eq!(table.dot_imports().collect::<Vec<_>>(), vec!["math"]);
    }

    #[test]
    fn test_declaration_visibility_is_computed_once() {
        let decl = Declaration::new(
            "unexportedInterface",
            SourceLocation::synthetic("test"),
            Arc::default(),
            DeclKind::Interface(InterfaceDecl::default()),
        );
        assert!(!decl.is_exported());
        assert!(decl.as_interface().is_some());
        assert!(decl.as_struct().is_none());
    }
}
