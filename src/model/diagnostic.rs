//! Non-fatal findings recorded while resolving a package

use crate::error::ClassificationError;
use crate::types::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A type expression outside the supported set.
    Classification,
    /// An interface reaches itself through embedding.
    CyclicEmbedding,
    /// Two methods with the same name but different signatures.
    ConflictingMethod,
    /// The remote lookup could not provide an embedded interface.
    UnresolvedRemoteEmbedding,
    /// An embedded name that no declaration in the package matches.
    UnresolvedLocalEmbedding,
    /// An embedded interface that could not itself be resolved.
    InvalidEmbedding,
    DuplicateDeclaration,
    DuplicateField,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::CyclicEmbedding => "cyclic_embedding",
            Self::ConflictingMethod => "conflicting_method",
            Self::UnresolvedRemoteEmbedding => "unresolved_remote_embedding",
            Self::UnresolvedLocalEmbedding => "unresolved_local_embedding",
            Self::InvalidEmbedding => "invalid_embedding",
            Self::DuplicateDeclaration => "duplicate_declaration",
            Self::DuplicateField => "duplicate_field",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem scoped to one declaration
///
/// Diagnostics never abort a resolve run. The declaration they name is left
/// out of the catalogue, everything else is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the declaration the diagnostic is recorded against.
    pub declaration: String,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        declaration: impl Into<String>,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            declaration: declaration.into(),
            message: message.into(),
            location,
        }
    }

    pub fn from_classification(declaration: impl Into<String>, err: &ClassificationError) -> Self {
        Self::new(
            DiagnosticKind::Classification,
            declaration,
            err.to_string(),
            err.location.clone(),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.location, self.kind, self.declaration, self.message
        )
    }
}
