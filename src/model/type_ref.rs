//! Canonical type model
//!
//! Every type expression found in a method signature or struct field is
//! classified into exactly one [`TypeReference`] variant. The set is closed:
//! composite variants hold further `TypeReference` values, never raw syntax.

use crate::parsing::ast::package_name_from_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Predeclared Go types that carry no package qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Byte,
    Rune,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Error,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "error" => Self::Error,
            _ => return None,
        };
        Some(primitive)
    }

    /// `byte` and `rune` are aliases of `uint8` and `int32`.
    pub fn canonical(self) -> Self {
        match self {
            Self::Byte => Self::Uint8,
            Self::Rune => Self::Int32,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Byte => "byte",
            Self::Rune => "rune",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelDirection {
    /// `chan T`
    Bidirectional,
    /// `chan<- T`
    SendOnly,
    /// `<-chan T`
    ReceiveOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReference {
    Primitive(Primitive),
    Slice(Box<TypeReference>),
    Array {
        elem: Box<TypeReference>,
        len: u64,
    },
    Map {
        key: Box<TypeReference>,
        value: Box<TypeReference>,
    },
    Channel {
        elem: Box<TypeReference>,
        direction: ChannelDirection,
    },
    Function(Signature),
    Pointer(Box<TypeReference>),
    /// A declared type. `package` is `None` for the package being resolved,
    /// otherwise the import path the qualifier resolved to.
    Named {
        package: Option<String>,
        name: String,
    },
    EmptyInterface,
    EmptyStruct,
    /// Only valid as the type of the final parameter of a signature.
    Variadic(Box<TypeReference>),
}

impl TypeReference {
    pub fn named(package: Option<&str>, name: impl Into<String>) -> Self {
        Self::Named {
            package: package.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn slice(elem: TypeReference) -> Self {
        Self::Slice(Box::new(elem))
    }

    pub fn array(elem: TypeReference, len: u64) -> Self {
        Self::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn map(key: TypeReference, value: TypeReference) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn channel(elem: TypeReference, direction: ChannelDirection) -> Self {
        Self::Channel {
            elem: Box::new(elem),
            direction,
        }
    }

    pub fn pointer(referent: TypeReference) -> Self {
        Self::Pointer(Box::new(referent))
    }

    pub fn variadic(elem: TypeReference) -> Self {
        Self::Variadic(Box::new(elem))
    }

    /// Structural equality that ignores parameter and result names inside
    /// function types and treats predeclared aliases as their targets,
    /// matching Go's notion of identical types.
    pub fn shape_eq(&self, other: &TypeReference) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a.canonical() == b.canonical(),
            (Self::Slice(a), Self::Slice(b))
            | (Self::Pointer(a), Self::Pointer(b))
            | (Self::Variadic(a), Self::Variadic(b)) => a.shape_eq(b),
            (Self::Array { elem: a, len: la }, Self::Array { elem: b, len: lb }) => {
                la == lb && a.shape_eq(b)
            }
            (Self::Map { key: ka, value: va }, Self::Map { key: kb, value: vb }) => {
                ka.shape_eq(kb) && va.shape_eq(vb)
            }
            (
                Self::Channel {
                    elem: a,
                    direction: da,
                },
                Self::Channel {
                    elem: b,
                    direction: db,
                },
            ) => da == db && a.shape_eq(b),
            (Self::Function(a), Self::Function(b)) => a.shape_eq(b),
            _ => self == other,
        }
    }

    /// Collect the import paths of every qualified named type reachable from here.
    pub fn collect_packages(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Primitive(_) | Self::EmptyInterface | Self::EmptyStruct => {}
            Self::Slice(inner) | Self::Pointer(inner) | Self::Variadic(inner) => {
                inner.collect_packages(out)
            }
            Self::Array { elem, .. } | Self::Channel { elem, .. } => elem.collect_packages(out),
            Self::Map { key, value } => {
                key.collect_packages(out);
                value.collect_packages(out);
            }
            Self::Function(signature) => signature.collect_packages(out),
            Self::Named { package, .. } => {
                if let Some(package) = package {
                    out.insert(package.clone());
                }
            }
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(p) => f.write_str(p.as_str()),
            TypeReference::Slice(elem) => write!(f, "[]{elem}"),
            TypeReference::Array { elem, len } => write!(f, "[{len}]{elem}"),
            TypeReference::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeReference::Channel { elem, direction } => {
                // `chan (<-chan T)` needs parentheses to keep its meaning
                let nested_receive = matches!(
                    elem.as_ref(),
                    TypeReference::Channel {
                        direction: ChannelDirection::ReceiveOnly,
                        ..
                    }
                );
                match direction {
                    ChannelDirection::Bidirectional if nested_receive => write!(f, "chan ({elem})"),
                    ChannelDirection::Bidirectional => write!(f, "chan {elem}"),
                    ChannelDirection::SendOnly => write!(f, "chan<- {elem}"),
                    ChannelDirection::ReceiveOnly => write!(f, "<-chan {elem}"),
                }
            }
            TypeReference::Function(signature) => write!(f, "func{signature}"),
            TypeReference::Pointer(referent) => write!(f, "*{referent}"),
            TypeReference::Named { package, name } => match package {
                Some(path) => write!(f, "{}.{name}", package_name_from_path(path)),
                None => f.write_str(name),
            },
            TypeReference::EmptyInterface => f.write_str("interface{}"),
            TypeReference::EmptyStruct => f.write_str("struct{}"),
            TypeReference::Variadic(elem) => write!(f, "...{elem}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeReference,
}

impl Parameter {
    pub fn new(name: Option<&str>, ty: TypeReference) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.ty, TypeReference::Variadic(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultParam {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeReference,
}

impl ResultParam {
    pub fn new(name: Option<&str>, ty: TypeReference) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
        }
    }
}

/// Parameters and results of a method or function type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Parameter>,
    pub results: Vec<ResultParam>,
}

impl Signature {
    pub fn new(params: Vec<Parameter>, results: Vec<ResultParam>) -> Self {
        Self { params, results }
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(Parameter::is_variadic)
    }

    pub fn shape_eq(&self, other: &Signature) -> bool {
        self.params.len() == other.params.len()
            && self.results.len() == other.results.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty.shape_eq(&b.ty))
            && self
                .results
                .iter()
                .zip(&other.results)
                .all(|(a, b)| a.ty.shape_eq(&b.ty))
    }

    pub fn collect_packages(&self, out: &mut BTreeSet<String>) {
        for param in &self.params {
            param.ty.collect_packages(out);
        }
        for result in &self.results {
            result.ty.collect_packages(out);
        }
    }
}

fn write_named_list<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = (Option<&'a str>, &'a TypeReference)>,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, (name, ty)) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match name {
            Some(name) => write!(f, "{name} {ty}")?,
            None => write!(f, "{ty}")?,
        }
    }
    f.write_str(")")
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_named_list(
            f,
            self.params.iter().map(|p| (p.name.as_deref(), &p.ty)),
        )?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] if single.name.is_none() => write!(f, " {}", single.ty),
            results => {
                f.write_str(" ")?;
                write_named_list(f, results.iter().map(|r| (r.name.as_deref(), &r.ty)))
            }
        }
    }
}
