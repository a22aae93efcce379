//! Output of a resolve run: the catalogue handed to the code generator

use crate::model::{Diagnostic, Signature, TypeReference};
use crate::types::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A method in the flattened method set of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMethod {
    pub name: String,
    pub signature: Signature,
    /// Declaration the method was written in, `Name` or `import/path.Name`.
    pub origin: String,
    pub location: SourceLocation,
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInterface {
    pub name: String,
    pub location: SourceLocation,
    /// Direct and embedded methods, in first-encountered order.
    pub methods: Vec<ResolvedMethod>,
    /// Direct embeddings as written, `Name` or `import/path.Name`.
    pub embeds: Vec<String>,
}

impl ResolvedInterface {
    pub fn method(&self, name: &str) -> Option<&ResolvedMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|method| method.name.as_str()).collect()
    }

    /// Import paths referenced by any method signature, sorted.
    pub fn referenced_packages(&self) -> BTreeSet<String> {
        let mut packages = BTreeSet::new();
        for method in &self.methods {
            method.signature.collect_packages(&mut packages);
        }
        packages
    }
}

impl fmt::Display for ResolvedInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type {} interface {{", self.name)?;
        for method in &self.methods {
            writeln!(f, "\t{method}")?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub embedded: bool,
    pub exported: bool,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStruct {
    pub name: String,
    pub location: SourceLocation,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedStruct {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Everything produced for one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub package: String,
    /// Exported interfaces that resolved cleanly, in declaration order.
    pub interfaces: Vec<ResolvedInterface>,
    /// Exported structs whose fields all classified, in declaration order.
    pub structs: Vec<ResolvedStruct>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedPackage {
    pub fn interface(&self, name: &str) -> Option<&ResolvedInterface> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces.iter().map(|iface| iface.name.as_str()).collect()
    }

    pub fn struct_named(&self, name: &str) -> Option<&ResolvedStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn diagnostics_for<'a>(&'a self, declaration: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.declaration == declaration)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
