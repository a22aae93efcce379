use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a declaration or type expression in Go source.
///
/// Lines and columns are 1-based; columns count bytes like the Go toolchain does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location used for declarations assembled in memory rather than parsed.
    pub fn synthetic(name: &str) -> Self {
        Self::new(format!("<{name}>"), 0, 0)
    }

    /// Build a location from a tree-sitter start point (0-based row and column).
    pub fn from_point(file: &str, point: tree_sitter::Point) -> Self {
        Self::new(file, point.row as u32 + 1, point.column as u32 + 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Exported,
    Unexported,
}

impl Visibility {
    /// Go visibility follows the first character of the identifier.
    pub fn of(name: &str) -> Self {
        match name.chars().next() {
            Some(first) if first.is_uppercase() => Visibility::Exported,
            _ => Visibility::Unexported,
        }
    }

    pub fn is_exported(self) -> bool {
        self == Visibility::Exported
    }
}

/// True when a Go identifier is visible outside its package.
pub fn is_exported(name: &str) -> bool {
    Visibility::of(name).is_exported()
}
