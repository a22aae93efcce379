//! Error types for declaration ingestion and type classification
//!
//! Ingestion errors (`ParseError`, `LoadError`) abort loading of a package.
//! `ClassificationError` never aborts a run: the resolver turns it into a
//! diagnostic scoped to the declaration that owns the type expression.

use crate::types::SourceLocation;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning Go source text into syntax
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize Go parser: {reason}")]
    ParserInit { reason: String },

    #[error("Syntax error in '{file}' at line {line}, column {column}: {reason}")]
    SyntaxError {
        file: String,
        line: u32,
        column: u32,
        reason: String,
    },

    #[error("File '{file}' has no package clause")]
    MissingPackageClause { file: String },
}

/// Errors raised while assembling a package from files on disk
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list package directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("File '{file}' declares package '{found}', expected '{expected}'")]
    PackageMismatch {
        file: String,
        expected: String,
        found: String,
    },

    #[error("No Go source files found in '{path}'")]
    EmptyPackage { path: PathBuf },
}

impl LoadError {
    /// Stable identifier for this error, usable in JSON output.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::DirectoryRead { .. } => "DIRECTORY_READ_ERROR",
            Self::Parse(ParseError::ParserInit { .. }) => "PARSER_INIT_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::PackageMismatch { .. } => "PACKAGE_MISMATCH",
            Self::EmptyPackage { .. } => "EMPTY_PACKAGE",
        }
        .to_string()
    }
}

/// A type expression whose syntactic form the classifier does not model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported type expression `{text}` at {location}: {reason}")]
pub struct ClassificationError {
    pub location: SourceLocation,
    pub text: String,
    pub reason: String,
}

impl ClassificationError {
    pub fn new(location: SourceLocation, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            location,
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for package loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type alias for classification
pub type ClassifyResult<T> = Result<T, ClassificationError>;
