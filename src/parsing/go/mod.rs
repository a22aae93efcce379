//! Go front end
//!
//! Turns Go source into the syntax-level declaration model of
//! [`crate::parsing::ast`].
//!
//! ## Overview
//!
//! The parser uses tree-sitter-go (ABI-15) and extracts only what interface
//! resolution needs:
//! - **Package clause and imports**: including aliased (`nethttp "net/http"`),
//!   dot and blank imports, kept per file
//! - **Struct types**: named, grouped and embedded fields with tags
//! - **Interface types**: method elements and embedded type elements
//! - **Type parameters**: recorded so generic declarations can be diagnosed
//!
//! Type expressions stay syntactic here; classification happens in
//! [`crate::model::TypeClassifier`].
//!
//! ## Module Components
//!
//! - [`parser`]: tree-sitter integration and syntax extraction
//! - [`loader`]: assembling a [`PackageUnit`](crate::parsing::ast::PackageUnit)
//!   from a package directory or in-memory sources
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use wrapgen::parsing::go::PackageLoader;
//! use wrapgen::resolve::{NoRemoteLookup, resolve_package};
//!
//! let unit = PackageLoader::new().load_dir("internal/store".as_ref())?;
//! let resolved = resolve_package(&unit, &NoRemoteLookup);
//! for iface in &resolved.interfaces {
//!     println!("{} has {} methods", iface.name, iface.methods.len());
//! }
//! # Ok::<(), wrapgen::LoadError>(())
//! ```

pub mod loader;
pub mod parser;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loader::PackageLoader;
pub use parser::GoParser;
