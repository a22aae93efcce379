//! Fixture Package Integration Tests
//!
//! Key validations:
//! - Every method shape in `wrapgentest` classifies and renders back to Go
//! - Local embedding closure (`ExportedInterfaceWithEmbedded`)
//! - Remote embedding through a GOROOT-style source tree (`io.Reader`)
//! - Only exported declarations reach the catalogue
//! - Resolving twice gives identical serialized output

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wrapgen::model::{ChannelDirection, Primitive, TypeReference};
use wrapgen::{
    DiagnosticKind, NoRemoteLookup, PackageLoader, PackageUnit, ResolvedPackage, Settings,
    SourceTreeLookup, StaticLookup, resolve_package,
};

/// Errors specific to fixture testing
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Fixture failed to load: {0}\nSuggestion: Check tests/fixtures/wrapgentest is valid Go")]
    LoadFailed(String),

    #[error("Interface '{0}' missing from catalogue\nSuggestion: Inspect the diagnostics of the run")]
    MissingInterface(String),
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture() -> Result<PackageUnit, FixtureError> {
    PackageLoader::new()
        .load_dir(&fixtures().join("wrapgentest"))
        .map_err(|e| FixtureError::LoadFailed(e.to_string()))
}

fn goroot_lookup() -> SourceTreeLookup {
    SourceTreeLookup::new(vec![fixtures().join("goroot/src")])
}

fn rendered_methods(package: &ResolvedPackage, name: &str) -> Result<Vec<String>, FixtureError> {
    let iface = package
        .interface(name)
        .ok_or_else(|| FixtureError::MissingInterface(name.to_string()))?;
    Ok(iface.methods.iter().map(ToString::to_string).collect())
}

const EXPORTED_INTERFACE_METHODS: [&str; 13] = [
    "A()",
    "B(int, bool) (string, error)",
    "C(one int, two bool) (string, error)",
    "D(one ExportedStruct, two *ExportedStruct) error",
    "E(one func(), two func(int) bool) error",
    "F(one chan bool, two <-chan bool, three chan<- bool) error",
    "G(one []string, two [100]string) error",
    "H(one os.File, two *os.File) error",
    "I(one os.FileInfo) error",
    "J(one map[string]string) error",
    "K(one ...string) error",
    "L(one interface{}, two struct{}) error",
    "M(one http.Handler) error",
];

#[test]
fn test_fixture_resolves_cleanly() -> Result<()> {
    let unit = load_fixture()?;
    assert_eq!(unit.name, "wrapgentest");

    let package = resolve_package(&unit, &goroot_lookup());
    assert!(package.is_clean(), "unexpected diagnostics: {:?}", package.diagnostics);
    assert_eq!(
        package.interface_names(),
        vec![
            "ExportedInterface",
            "ExportedInterfaceWithEmbedded",
            "ExportedInterfaceWithRemoteEmbedded",
        ]
    );
    let structs: Vec<&str> = package.structs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(structs, vec!["ExportedStruct"]);
    Ok(())
}

#[test]
fn test_embedded_interface_has_all_thirteen_methods() -> Result<()> {
    let package = resolve_package(&load_fixture()?, &goroot_lookup());

    assert_eq!(
        rendered_methods(&package, "ExportedInterface")?,
        EXPORTED_INTERFACE_METHODS
    );
    assert_eq!(
        rendered_methods(&package, "ExportedInterfaceWithEmbedded")?,
        EXPORTED_INTERFACE_METHODS
    );

    let embedded = package.interface("ExportedInterfaceWithEmbedded").unwrap();
    assert_eq!(embedded.embeds, vec!["ExportedInterface"]);
    assert!(embedded.methods.iter().all(|m| m.origin == "ExportedInterface"));
    Ok(())
}

#[test]
fn test_parameter_classification() -> Result<()> {
    let package = resolve_package(&load_fixture()?, &NoRemoteLookup);
    let iface = package.interface("ExportedInterface").unwrap();
    let param = |method: &str, index: usize| iface.method(method).unwrap().signature.params[index].ty.clone();

    let boolean = TypeReference::Primitive(Primitive::Bool);
    let string = TypeReference::Primitive(Primitive::String);

    assert_eq!(
        param("F", 1),
        TypeReference::channel(boolean.clone(), ChannelDirection::ReceiveOnly)
    );
    assert_eq!(
        param("F", 2),
        TypeReference::channel(boolean, ChannelDirection::SendOnly)
    );
    assert_eq!(param("G", 0), TypeReference::slice(string.clone()));
    assert_eq!(param("G", 1), TypeReference::array(string.clone(), 100));
    assert_eq!(param("J", 0), TypeReference::map(string.clone(), string.clone()));
    assert_eq!(param("K", 0), TypeReference::variadic(string));
    assert_eq!(
        param("H", 1),
        TypeReference::pointer(TypeReference::named(Some("os"), "File"))
    );
    // the `nethttp` alias is resolved through the file's import table
    assert_eq!(param("M", 0), TypeReference::named(Some("net/http"), "Handler"));
    assert_eq!(param("D", 0), TypeReference::named(None, "ExportedStruct"));
    assert_eq!(param("L", 0), TypeReference::EmptyInterface);
    assert_eq!(param("L", 1), TypeReference::EmptyStruct);

    let packages: Vec<String> = iface.referenced_packages().into_iter().collect();
    assert_eq!(packages, vec!["net/http", "os"]);
    Ok(())
}

#[test]
fn test_remote_embedding_through_source_tree() -> Result<()> {
    let package = resolve_package(&load_fixture()?, &goroot_lookup());

    assert_eq!(
        rendered_methods(&package, "ExportedInterfaceWithRemoteEmbedded")?,
        vec!["Read(p []byte) (n int, err error)"]
    );
    let remote = package.interface("ExportedInterfaceWithRemoteEmbedded").unwrap();
    assert_eq!(remote.embeds, vec!["io.Reader"]);
    assert_eq!(remote.methods[0].origin, "io.Reader");
    Ok(())
}

#[test]
fn test_remote_embedding_through_static_lookup() -> Result<()> {
    let io = PackageUnit::from_sources([(
        "io.go",
        "package io\n\ntype Reader interface {\n\tRead(p []byte) (n int, err error)\n}\n",
    )])?;
    let lookup = StaticLookup::new().with_package("io", io);

    let package = resolve_package(&load_fixture()?, &lookup);
    assert!(package.is_clean());
    assert_eq!(
        rendered_methods(&package, "ExportedInterfaceWithRemoteEmbedded")?,
        vec!["Read(p []byte) (n int, err error)"]
    );
    Ok(())
}

#[test]
fn test_missing_remote_package_only_drops_its_interface() -> Result<()> {
    let package = resolve_package(&load_fixture()?, &NoRemoteLookup);

    assert_eq!(package.diagnostics.len(), 1);
    let diagnostic = &package.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::UnresolvedRemoteEmbedding);
    assert_eq!(diagnostic.declaration, "ExportedInterfaceWithRemoteEmbedded");
    assert_eq!(
        package.interface_names(),
        vec!["ExportedInterface", "ExportedInterfaceWithEmbedded"]
    );
    Ok(())
}

#[test]
fn test_lookup_roots_from_settings() -> Result<()> {
    let mut settings = Settings::default();
    settings.lookup.go_root = Some(fixtures().join("goroot"));

    let lookup = SourceTreeLookup::from_settings(&settings);
    assert_eq!(lookup.roots()[0], fixtures().join("goroot/src"));

    let package = resolve_package(&load_fixture()?, &lookup);
    assert!(package.is_clean());
    Ok(())
}

#[test]
fn test_resolution_is_deterministic() -> Result<()> {
    let unit = load_fixture()?;
    let first = serde_json::to_string_pretty(&resolve_package(&unit, &goroot_lookup()))?;
    let second = serde_json::to_string_pretty(&resolve_package(&unit, &goroot_lookup()))?;
    assert_eq!(first, second);

    let decoded: ResolvedPackage = serde_json::from_str(&first)?;
    assert_eq!(decoded.interface_names().len(), 3);
    Ok(())
}
