//! Declaration resolution
//!
//! Flattens every interface of a package into its complete method set,
//! following embeddings into the same package, dot-imported packages and
//! remote packages provided by a [`RemoteLookup`].
//!
//! Each declaration is resolved at most once per run. A visiting stack keyed
//! by `(package, name)` detects embedding cycles; the memo table records
//! failures as well as successes so a broken interface is diagnosed once.
//! Type aliases are followed when they are embedded.

use crate::model::{
    Diagnostic, DiagnosticKind, EmbeddedRef, Primitive, ResolvedField, ResolvedInterface,
    ResolvedMethod, ResolvedPackage, ResolvedStruct, ResultParam, Signature, TypeClassifier,
    TypeReference,
};
use crate::parsing::ast::{
    DeclKind, Declaration, ImportTable, Member, PackageUnit, StructDecl, TypeExpr,
};
use crate::resolve::RemoteLookup;
use crate::types::{SourceLocation, is_exported};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolve every declaration of `unit`, fetching other packages through `lookup`.
pub fn resolve_package(unit: &PackageUnit, lookup: &dyn RemoteLookup) -> ResolvedPackage {
    DeclarationResolver::new(unit, lookup).resolve()
}

/// Identity of a declaration across packages
///
/// `package` is `None` for the package being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclKey {
    pub package: Option<String>,
    pub name: String,
}

impl DeclKey {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            package: None,
            name: name.into(),
        }
    }

    pub fn remote(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{package}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Default)]
struct InterfaceSummary {
    methods: Vec<ResolvedMethod>,
    embeds: Vec<String>,
}

/// A declaration owned by the unit or fetched from a remote package.
enum Found<'u> {
    Local(&'u Declaration),
    Remote(Arc<Declaration>),
}

impl Deref for Found<'_> {
    type Target = Declaration;

    fn deref(&self) -> &Declaration {
        match self {
            Found::Local(decl) => decl,
            Found::Remote(decl) => decl,
        }
    }
}

/// Outcome of following one embedded element.
enum Embedded<'u> {
    Ready(Arc<InterfaceSummary>),
    Failed,
    /// Not resolved yet; the caller flattens it first.
    Descend(DeclKey, Found<'u>),
}

/// One interface being flattened on the explicit resolution stack.
struct Frame<'u> {
    key: DeclKey,
    owner: String,
    decl: Found<'u>,
    /// Index of the next member to visit.
    next: usize,
    summary: InterfaceSummary,
    complete: bool,
    /// Embedded interface pushed above this frame, with the embedding's location.
    pending: Option<(DeclKey, SourceLocation)>,
}

impl Frame<'_> {
    fn finished(&self) -> bool {
        self.decl
            .as_interface()
            .is_none_or(|iface| self.next >= iface.members.len())
    }
}

/// State of a single resolve run over one package.
pub struct DeclarationResolver<'u> {
    unit: &'u PackageUnit,
    lookup: &'u dyn RemoteLookup,
    /// First declaration for each name.
    index: HashMap<&'u str, &'u Declaration>,
    remote: HashMap<DeclKey, Option<Arc<Declaration>>>,
    resolved: HashMap<DeclKey, Option<Arc<InterfaceSummary>>>,
    /// Keys of the frames currently on the resolution stack.
    visiting: Vec<DeclKey>,
    diagnostics: Vec<Diagnostic>,
}

impl<'u> DeclarationResolver<'u> {
    pub fn new(unit: &'u PackageUnit, lookup: &'u dyn RemoteLookup) -> Self {
        Self {
            unit,
            lookup,
            index: HashMap::new(),
            remote: HashMap::new(),
            resolved: HashMap::new(),
            visiting: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn resolve(mut self) -> ResolvedPackage {
        let unit = self.unit;
        debug!(
            package = %unit.name,
            declarations = unit.declarations.len(),
            "resolving package"
        );

        for decl in &unit.declarations {
            match self.index.entry(decl.name.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(decl);
                }
                Entry::Occupied(first) => {
                    let message = format!(
                        "`{}` is already declared at {}",
                        decl.name,
                        first.get().location
                    );
                    self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DuplicateDeclaration,
                        &decl.name,
                        message,
                        decl.location.clone(),
                    ));
                }
            }
        }

        let mut interfaces = Vec::new();
        let mut structs = Vec::new();
        for decl in &unit.declarations {
            let is_first = self
                .index
                .get(decl.name.as_str())
                .is_some_and(|first| std::ptr::eq(*first, decl));
            if !is_first {
                continue;
            }

            match &decl.kind {
                DeclKind::Interface(_) => {
                    let Some(summary) =
                        self.resolve_interface(DeclKey::local(&decl.name), Found::Local(decl))
                    else {
                        continue;
                    };
                    if decl.is_exported() {
                        interfaces.push(ResolvedInterface {
                            name: decl.name.clone(),
                            location: decl.location.clone(),
                            methods: summary.methods.clone(),
                            embeds: summary.embeds.clone(),
                        });
                    }
                }
                DeclKind::Struct(fields) => {
                    let Some(resolved) = self.resolve_struct(decl, fields) else {
                        continue;
                    };
                    if decl.is_exported() {
                        structs.push(resolved);
                    }
                }
                // only followed through embeddings
                DeclKind::Alias(_) => trace!("alias `{}` left out of the catalogue", decl.name),
            }
        }

        debug!(
            package = %unit.name,
            interfaces = interfaces.len(),
            structs = structs.len(),
            diagnostics = self.diagnostics.len(),
            "resolved package"
        );

        ResolvedPackage {
            package: unit.name.clone(),
            interfaces,
            structs,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Flatten one interface and everything it embeds.
    ///
    /// Embedded interfaces are resolved on an explicit stack of frames, so
    /// the depth of an embedding chain is bounded by memory, not by the
    /// thread's call stack. Every finished frame lands in the memo table.
    fn resolve_interface(&mut self, key: DeclKey, decl: Found<'u>) -> Option<Arc<InterfaceSummary>> {
        if let Some(done) = self.resolved.get(&key) {
            trace!("memo hit for {key}");
            return done.clone();
        }

        let mut stack = vec![self.enter(key, decl)];
        while let Some(frame) = stack.last_mut() {
            if let Some((child, location)) = frame.pending.take() {
                self.absorb(frame, &child, location);
                continue;
            }

            if !frame.finished() {
                if let Some((child, decl)) = self.visit_member(frame) {
                    let child = self.enter(child, decl);
                    stack.push(child);
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            self.visiting.pop();
            let summary = frame.complete.then(|| Arc::new(frame.summary));
            self.resolved.insert(frame.key, summary.clone());
            if stack.is_empty() {
                return summary;
            }
        }
        None
    }

    fn enter(&mut self, key: DeclKey, decl: Found<'u>) -> Frame<'u> {
        self.visiting.push(key.clone());
        let owner = key.to_string();
        let mut complete = decl.as_interface().is_some();

        if !decl.type_params.is_empty() {
            self.report(Diagnostic::new(
                DiagnosticKind::Classification,
                &owner,
                format!(
                    "generic interface with type parameters [{}] is not supported",
                    decl.type_params.join(", ")
                ),
                decl.location.clone(),
            ));
            complete = false;
        }

        let next = if complete { 0 } else { usize::MAX };
        Frame {
            key,
            owner,
            decl,
            next,
            summary: InterfaceSummary::default(),
            complete,
            pending: None,
        }
    }

    /// Visit the frame's next member, in member order. Returns an embedded
    /// interface that has to be flattened before the frame can go on.
    fn visit_member(&mut self, frame: &mut Frame<'u>) -> Option<(DeclKey, Found<'u>)> {
        let iface = frame.decl.as_interface()?;
        let member = iface.members.get(frame.next)?;
        frame.next += 1;

        let classifier = TypeClassifier::new(frame.key.package.as_deref(), &frame.decl.imports);
        match member {
            Member::Method(method) => match classifier.classify_method(method) {
                Ok(signature) => {
                    let method = ResolvedMethod {
                        name: method.name.clone(),
                        signature,
                        origin: frame.owner.clone(),
                        location: method.location.clone(),
                    };
                    frame.complete &= self.merge(&frame.owner, &mut frame.summary.methods, method);
                }
                Err(err) => {
                    self.report(Diagnostic::from_classification(&frame.owner, &err));
                    frame.complete = false;
                }
            },
            Member::Embedded(expr) => {
                let target = match classifier.classify_embedded(expr) {
                    Ok(target) => target,
                    Err(err) => {
                        self.report(Diagnostic::from_classification(&frame.owner, &err));
                        frame.complete = false;
                        return None;
                    }
                };
                frame.summary.embeds.push(embed_label(&target));

                match self.resolve_embedded(&frame.key, &frame.owner, &frame.decl.imports, target, expr) {
                    Embedded::Ready(embedded) => {
                        for method in &embedded.methods {
                            frame.complete &=
                                self.merge(&frame.owner, &mut frame.summary.methods, method.clone());
                        }
                    }
                    Embedded::Failed => frame.complete = false,
                    Embedded::Descend(key, decl) => {
                        frame.pending = Some((key.clone(), expr.location.clone()));
                        return Some((key, decl));
                    }
                }
            }
        }
        None
    }

    /// Merge an embedded interface that finished resolving above `frame`.
    fn absorb(&mut self, frame: &mut Frame<'u>, child: &DeclKey, location: SourceLocation) {
        match self.resolved.get(child).cloned().flatten() {
            Some(embedded) => {
                for method in &embedded.methods {
                    frame.complete &= self.merge(&frame.owner, &mut frame.summary.methods, method.clone());
                }
            }
            None => {
                self.report(Diagnostic::new(
                    DiagnosticKind::InvalidEmbedding,
                    &frame.owner,
                    format!("embedded interface `{child}` could not be resolved"),
                    location,
                ));
                frame.complete = false;
            }
        }
    }

    /// Add `method` unless a method of that name exists. Returns false on a conflict.
    fn merge(&mut self, owner: &str, methods: &mut Vec<ResolvedMethod>, method: ResolvedMethod) -> bool {
        let Some(existing) = methods.iter().find(|existing| existing.name == method.name) else {
            methods.push(method);
            return true;
        };

        let message = if !existing.signature.shape_eq(&method.signature) {
            format!(
                "method {} is declared as `{existing}` by {} and as `{method}` by {}",
                method.name, existing.origin, method.origin
            )
        } else if existing.origin == owner && method.origin == owner {
            format!(
                "duplicate method {}, first declared at {}",
                method.name, existing.location
            )
        } else {
            trace!("{owner}: {} from {} already present", method.name, method.origin);
            return true;
        };

        self.report(Diagnostic::new(
            DiagnosticKind::ConflictingMethod,
            owner,
            message,
            method.location.clone(),
        ));
        false
    }

    /// Find the interface an embedded element names, following aliases.
    fn resolve_embedded(
        &mut self,
        current: &DeclKey,
        owner: &str,
        imports: &Arc<ImportTable>,
        mut target: EmbeddedRef,
        expr: &TypeExpr,
    ) -> Embedded<'u> {
        let mut scope = current.package.clone();
        let mut imports = Arc::clone(imports);
        let mut aliases: Vec<DeclKey> = Vec::new();

        let (key, found) = loop {
            let key = match &target {
                EmbeddedRef::Builtin { name } => {
                    return Embedded::Ready(Arc::new(builtin_interface(name)));
                }
                // unqualified names inside a remote declaration stay in its package
                EmbeddedRef::Local { name } => match &scope {
                    Some(package) => DeclKey::remote(package, name),
                    None => DeclKey::local(name),
                },
                EmbeddedRef::Remote { import_path, name } => {
                    if self.unit.import_path.as_deref() == Some(import_path.as_str()) {
                        DeclKey::local(name)
                    } else {
                        DeclKey::remote(import_path, name)
                    }
                }
            };

            let Some((key, found)) = self.find(key, &imports) else {
                let local = scope.is_none() && matches!(target, EmbeddedRef::Local { .. });
                let label = if aliases.is_empty() {
                    expr.text.clone()
                } else {
                    embed_label(&target)
                };
                self.report_unresolved(owner, local, &label, expr.location.clone());
                return Embedded::Failed;
            };

            let Some(aliased) = found.as_alias() else {
                break (key, found);
            };

            if aliases.contains(&key) {
                let cycle = aliases
                    .iter()
                    .skip_while(|alias| **alias != key)
                    .chain(std::iter::once(&key))
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                self.report(Diagnostic::new(
                    DiagnosticKind::CyclicEmbedding,
                    owner,
                    format!("alias cycle {cycle}"),
                    expr.location.clone(),
                ));
                return Embedded::Failed;
            }

            let classifier = TypeClassifier::new(key.package.as_deref(), &found.imports);
            target = match classifier.classify_embedded(aliased) {
                Ok(target) => target,
                Err(err) => {
                    self.report(Diagnostic::from_classification(owner, &err));
                    return Embedded::Failed;
                }
            };
            trace!("{owner}: alias {key} names {}", embed_label(&target));
            scope = key.package.clone();
            imports = Arc::clone(&found.imports);
            aliases.push(key);
        };

        if let Some(start) = self.visiting.iter().position(|visiting| *visiting == key) {
            let cycle = self.visiting[start..]
                .iter()
                .chain(std::iter::once(&key))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            self.report(Diagnostic::new(
                DiagnosticKind::CyclicEmbedding,
                owner,
                format!("embedding cycle {cycle}"),
                expr.location.clone(),
            ));
            return Embedded::Failed;
        }

        if found.as_interface().is_none() {
            self.report(Diagnostic::new(
                DiagnosticKind::InvalidEmbedding,
                owner,
                format!("`{key}` is a struct, only interfaces can be embedded"),
                expr.location.clone(),
            ));
            return Embedded::Failed;
        }

        match self.resolved.get(&key) {
            Some(Some(summary)) => {
                trace!("memo hit for {key}");
                Embedded::Ready(Arc::clone(summary))
            }
            Some(None) => {
                self.report(Diagnostic::new(
                    DiagnosticKind::InvalidEmbedding,
                    owner,
                    format!("embedded interface `{key}` could not be resolved"),
                    expr.location.clone(),
                ));
                Embedded::Failed
            }
            None => Embedded::Descend(key, found),
        }
    }

    /// Locate a declaration, falling back to dot imports for names of this package.
    fn find(&mut self, key: DeclKey, imports: &ImportTable) -> Option<(DeclKey, Found<'u>)> {
        if let Some(package) = key.package.as_deref() {
            let decl = self.remote_declaration(package, &key.name)?;
            return Some((key, Found::Remote(decl)));
        }

        if let Some(decl) = self.index.get(key.name.as_str()).copied() {
            return Some((key, Found::Local(decl)));
        }

        imports.dot_imports().find_map(|path| {
            let decl = self.remote_declaration(path, &key.name)?;
            Some((DeclKey::remote(path, &key.name), Found::Remote(decl)))
        })
    }

    fn remote_declaration(&mut self, import_path: &str, name: &str) -> Option<Arc<Declaration>> {
        let key = DeclKey::remote(import_path, name);
        if let Some(cached) = self.remote.get(&key) {
            return cached.clone();
        }

        debug!(import_path, name, "remote lookup");
        let found = self.lookup.lookup(import_path, name).map(Arc::new);
        if found.is_none() {
            debug!("{key} not found by remote lookup");
        }
        self.remote.insert(key, found.clone());
        found
    }

    fn report_unresolved(&mut self, owner: &str, local: bool, label: &str, location: SourceLocation) {
        let diagnostic = if local {
            Diagnostic::new(
                DiagnosticKind::UnresolvedLocalEmbedding,
                owner,
                format!("`{label}` is not declared in package {}", self.unit.name),
                location,
            )
        } else {
            Diagnostic::new(
                DiagnosticKind::UnresolvedRemoteEmbedding,
                owner,
                format!("`{label}` not found by remote lookup"),
                location,
            )
        };
        self.report(diagnostic);
    }

    fn resolve_struct(&mut self, decl: &Declaration, fields: &StructDecl) -> Option<ResolvedStruct> {
        if !decl.type_params.is_empty() {
            self.report(Diagnostic::new(
                DiagnosticKind::Classification,
                &decl.name,
                format!(
                    "generic struct with type parameters [{}] is not supported",
                    decl.type_params.join(", ")
                ),
                decl.location.clone(),
            ));
            return None;
        }

        let classifier = TypeClassifier::new(None, &decl.imports);
        let mut resolved = Vec::with_capacity(fields.fields.len());
        let mut seen = HashSet::new();
        let mut complete = true;

        for field in &fields.fields {
            let ty = match classifier.classify(&field.ty) {
                Ok(ty) => ty,
                Err(err) => {
                    self.report(Diagnostic::from_classification(&decl.name, &err));
                    complete = false;
                    continue;
                }
            };

            let name = match &field.name {
                Some(name) => name.clone(),
                None => match embedded_field_name(&ty) {
                    Some(name) => name,
                    None => {
                        self.report(Diagnostic::new(
                            DiagnosticKind::Classification,
                            &decl.name,
                            format!("`{}` cannot be embedded in a struct", field.ty.text),
                            field.location.clone(),
                        ));
                        complete = false;
                        continue;
                    }
                },
            };

            if !seen.insert(name.clone()) {
                self.report(Diagnostic::new(
                    DiagnosticKind::DuplicateField,
                    &decl.name,
                    format!("field `{name}` is declared more than once"),
                    field.location.clone(),
                ));
                complete = false;
                continue;
            }

            resolved.push(ResolvedField {
                exported: is_exported(&name),
                embedded: field.name.is_none(),
                name,
                ty,
                tag: field.tag.clone(),
            });
        }

        complete.then(|| ResolvedStruct {
            name: decl.name.clone(),
            location: decl.location.clone(),
            fields: resolved,
        })
    }
}

fn embed_label(target: &EmbeddedRef) -> String {
    match target {
        EmbeddedRef::Local { name } | EmbeddedRef::Builtin { name } => name.clone(),
        EmbeddedRef::Remote { import_path, name } => format!("{import_path}.{name}"),
    }
}

/// Method sets of the predeclared interfaces.
fn builtin_interface(name: &str) -> InterfaceSummary {
    let mut summary = InterfaceSummary::default();
    if name == "error" {
        summary.methods.push(ResolvedMethod {
            name: "Error".to_string(),
            signature: Signature::new(
                vec![],
                vec![ResultParam::new(
                    None,
                    TypeReference::Primitive(Primitive::String),
                )],
            ),
            origin: "error".to_string(),
            location: SourceLocation::synthetic("builtin"),
        });
    }
    summary
}

/// Implicit field name of an embedded struct field: the type name without package or `*`.
fn embedded_field_name(ty: &TypeReference) -> Option<String> {
    match ty {
        TypeReference::Named { name, .. } => Some(name.clone()),
        TypeReference::Pointer(inner) => match inner.as_ref() {
            TypeReference::Named { name, .. } => Some(name.clone()),
            _ => None,
        },
        TypeReference::Primitive(primitive) => Some(primitive.as_str().to_string()),
        _ => None,
    }
}
