//! Interface resolution across package boundaries
//!
//! [`resolve_package`] is the entry point: it takes a parsed [`PackageUnit`]
//! and a [`RemoteLookup`] and produces a [`ResolvedPackage`].
//!
//! [`PackageUnit`]: crate::parsing::ast::PackageUnit
//! [`ResolvedPackage`]: crate::model::ResolvedPackage

pub mod lookup;
pub mod resolver;

pub use lookup::{NoRemoteLookup, RemoteLookup, SourceTreeLookup, StaticLookup};
pub use resolver::{DeclKey, DeclarationResolver, resolve_package};
