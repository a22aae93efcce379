//! Type classification
//!
//! Maps syntax-level [`TypeExpr`]s onto the closed [`TypeReference`] set by
//! pattern matching on their shape. Named types are never looked up here:
//! deciding what `io.Reader` *is* belongs to the resolver, and only happens
//! when a name is embedded.

use crate::error::{ClassificationError, ClassifyResult};
use crate::model::{Parameter, Primitive, ResultParam, Signature, TypeReference};
use crate::parsing::ast::{ImportTable, MethodDecl, ParamDecl, TypeExpr, TypeExprKind};

/// Target of an embedded interface element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmbeddedRef {
    /// Declared in the same package as the embedding interface.
    Local { name: String },
    /// Declared in another package, identified by import path.
    Remote { import_path: String, name: String },
    /// A predeclared interface (`error`, `any`).
    Builtin { name: String },
}

/// Classifies type expressions in the context of one declaration.
///
/// `package` is the import path of the package that owns the declaration, or
/// `None` for the package being resolved. Unqualified named types inherit it.
pub struct TypeClassifier<'a> {
    package: Option<&'a str>,
    imports: &'a ImportTable,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(package: Option<&'a str>, imports: &'a ImportTable) -> Self {
        Self { package, imports }
    }

    pub fn classify(&self, expr: &TypeExpr) -> ClassifyResult<TypeReference> {
        match &expr.kind {
            TypeExprKind::Name(name) => self.classify_name(expr, name),
            TypeExprKind::Qualified { package, name } => {
                let path = self.resolve_qualifier(expr, package)?;
                Ok(TypeReference::named(Some(path), name.clone()))
            }
            TypeExprKind::Pointer(inner) => Ok(TypeReference::pointer(self.classify(inner)?)),
            TypeExprKind::Slice(elem) => Ok(TypeReference::slice(self.classify(elem)?)),
            TypeExprKind::Array { len, elem } => {
                let len = parse_array_length(len).ok_or_else(|| {
                    unsupported(expr, "array length must be an integer literal")
                })?;
                Ok(TypeReference::array(self.classify(elem)?, len))
            }
            TypeExprKind::Map { key, value } => Ok(TypeReference::map(
                self.classify(key)?,
                self.classify(value)?,
            )),
            TypeExprKind::Chan { direction, elem } => {
                Ok(TypeReference::channel(self.classify(elem)?, *direction))
            }
            TypeExprKind::Func { params, results } => Ok(TypeReference::Function(
                self.classify_signature(params, results)?,
            )),
            TypeExprKind::Interface { has_members: false } => Ok(TypeReference::EmptyInterface),
            TypeExprKind::Interface { has_members: true } => Err(unsupported(
                expr,
                "interface literals with members are not supported",
            )),
            TypeExprKind::Struct { has_fields: false } => Ok(TypeReference::EmptyStruct),
            TypeExprKind::Struct { has_fields: true } => Err(unsupported(
                expr,
                "struct literals with fields are not supported",
            )),
            TypeExprKind::Paren(inner) => self.classify(inner),
            TypeExprKind::Generic { .. } => Err(unsupported(
                expr,
                "generic instantiation is not supported",
            )),
            TypeExprKind::Other(kind) => Err(unsupported(expr, format!("unsupported syntax `{kind}`"))),
        }
    }

    /// Classify a parameter list and result list into a [`Signature`].
    pub fn classify_signature(
        &self,
        params: &[ParamDecl],
        results: &[ParamDecl],
    ) -> ClassifyResult<Signature> {
        let last = params.len().saturating_sub(1);
        let params = params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let ty = self.classify(&param.ty)?;
                if !param.variadic {
                    return Ok(Parameter::new(param.name.as_deref(), ty));
                }
                if i != last {
                    return Err(unsupported(&param.ty, "only the final parameter may be variadic"));
                }
                Ok(Parameter::new(param.name.as_deref(), TypeReference::variadic(ty)))
            })
            .collect::<ClassifyResult<Vec<_>>>()?;

        let results = results
            .iter()
            .map(|result| {
                if result.variadic {
                    return Err(unsupported(&result.ty, "results cannot be variadic"));
                }
                Ok(ResultParam::new(result.name.as_deref(), self.classify(&result.ty)?))
            })
            .collect::<ClassifyResult<Vec<_>>>()?;

        Ok(Signature::new(params, results))
    }

    pub fn classify_method(&self, method: &MethodDecl) -> ClassifyResult<Signature> {
        self.classify_signature(&method.params, &method.results)
    }

    /// Classify an embedded interface element into the reference it names.
    pub fn classify_embedded(&self, expr: &TypeExpr) -> ClassifyResult<EmbeddedRef> {
        match &expr.kind {
            TypeExprKind::Name(name) if name == "error" || name == "any" => {
                Ok(EmbeddedRef::Builtin { name: name.clone() })
            }
            TypeExprKind::Name(name) if Primitive::from_name(name).is_some() => Err(unsupported(
                expr,
                "only interfaces can be embedded in an interface",
            )),
            TypeExprKind::Name(name) => Ok(EmbeddedRef::Local { name: name.clone() }),
            TypeExprKind::Qualified { package, name } => Ok(EmbeddedRef::Remote {
                import_path: self.resolve_qualifier(expr, package)?.to_string(),
                name: name.clone(),
            }),
            TypeExprKind::Paren(inner) => self.classify_embedded(inner),
            TypeExprKind::Generic { .. } => Err(unsupported(
                expr,
                "embedding generic interface instantiations is not supported",
            )),
            TypeExprKind::Other(kind) if kind == "type_elem" => Err(unsupported(
                expr,
                "type set elements are not supported",
            )),
            _ => Err(unsupported(
                expr,
                "only interfaces can be embedded in an interface",
            )),
        }
    }

    fn classify_name(&self, expr: &TypeExpr, name: &str) -> ClassifyResult<TypeReference> {
        if let Some(primitive) = Primitive::from_name(name) {
            return Ok(TypeReference::Primitive(primitive));
        }
        match name {
            "any" => Ok(TypeReference::EmptyInterface),
            "comparable" => Err(unsupported(
                expr,
                "`comparable` is only valid as a type constraint",
            )),
            _ => Ok(TypeReference::named(self.package, name)),
        }
    }

    fn resolve_qualifier(&self, expr: &TypeExpr, qualifier: &str) -> ClassifyResult<&'a str> {
        self.imports
            .resolve(qualifier)
            .ok_or_else(|| unsupported(expr, format!("unknown package qualifier `{qualifier}`")))
    }
}

fn unsupported(expr: &TypeExpr, reason: impl Into<String>) -> ClassificationError {
    ClassificationError::new(expr.location.clone(), expr.text.clone(), reason)
}

/// Parse a Go integer literal used as an array length.
fn parse_array_length(raw: &str) -> Option<u64> {
    let digits = raw.trim().replace('_', "");
    let (body, radix) = match digits.get(..2) {
        Some("0x") | Some("0X") => (&digits[2..], 16),
        Some("0o") | Some("0O") => (&digits[2..], 8),
        Some("0b") | Some("0B") => (&digits[2..], 2),
        _ if digits.len() > 1 && digits.starts_with('0') => (&digits[1..], 8),
        _ => (digits.as_str(), 10),
    };
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(body, radix).ok()
}
