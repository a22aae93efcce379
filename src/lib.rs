//! Declaration model and interface resolution for Go wrapper generation
//!
//! The crate reads a Go package, classifies every type expression into a
//! closed [`TypeReference`] set and flattens each exported interface into its
//! complete method set, following embeddings into other packages.
//!
//! ```rust,no_run
//! use wrapgen::{PackageLoader, Settings, SourceTreeLookup, resolve_package};
//!
//! let settings = Settings::load()?;
//! let unit = PackageLoader::from_settings(&settings).load_dir("pkg/api".as_ref())?;
//! let lookup = SourceTreeLookup::from_settings(&settings);
//!
//! let resolved = resolve_package(&unit, &lookup);
//! for iface in &resolved.interfaces {
//!     println!("{iface}");
//! }
//! for diagnostic in &resolved.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parsing;
pub mod resolve;
pub mod types;

pub use config::Settings;
pub use error::{
    ClassificationError, ClassifyResult, LoadError, LoadResult, ParseError, ParseResult,
};
pub use model::{
    ChannelDirection, Diagnostic, DiagnosticKind, Primitive, ResolvedInterface, ResolvedMethod,
    ResolvedPackage, ResolvedStruct, Signature, TypeReference,
};
pub use parsing::{Declaration, GoParser, PackageLoader, PackageUnit};
pub use resolve::{NoRemoteLookup, RemoteLookup, SourceTreeLookup, StaticLookup, resolve_package};
pub use types::{SourceLocation, Visibility};
