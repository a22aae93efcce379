//! Canonical declaration model
//!
//! [`TypeReference`] is the closed set every type expression classifies into;
//! [`ResolvedPackage`] is what a resolve run produces.

pub mod classifier;
pub mod diagnostic;
pub mod resolved;
pub mod type_ref;

pub use classifier::{EmbeddedRef, TypeClassifier};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use resolved::{
    ResolvedField, ResolvedInterface, ResolvedMethod, ResolvedPackage, ResolvedStruct,
};
pub use type_ref::{ChannelDirection, Parameter, Primitive, ResultParam, Signature, TypeReference};
