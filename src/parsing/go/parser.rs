//! Go parser implementation
//!
//! Uses tree-sitter-go crate’s LANGUAGE constant (converted via .into()).
//!
//! Note: This parser uses ABI-15. Only package-level `type` declarations whose
//! underlying type is a struct or an interface, and type aliases, become
//! [`Declaration`]s; functions, variables, constants and other named types are
//! skipped.

use crate::error::{ParseError, ParseResult};
use crate::model::ChannelDirection;
use crate::parsing::ast::{
    DeclKind, Declaration, FieldDecl, ImportSpec, ImportTable, InterfaceDecl, Member, MethodDecl,
    ParamDecl, SourceFile, StructDecl, TypeExpr, TypeExprKind,
};
use crate::types::SourceLocation;
use std::sync::Arc;
use tracing::{debug, trace};
use tree_sitter::{Node, Parser};

/// Go language parser
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a new Go parser
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        let lang = tree_sitter_go::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| ParseError::ParserInit {
                reason: format!("Failed to set Go language: {e}"),
            })?;

        Ok(Self { parser })
    }

    /// Parse one Go source file into its package name, imports and declarations.
    ///
    /// `path` is only used for locations and error messages. A file with any
    /// syntax error is rejected as a whole.
    pub fn parse_file(&mut self, path: &str, code: &str) -> ParseResult<SourceFile> {
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ParseError::SyntaxError {
                file: path.to_string(),
                line: 1,
                column: 1,
                reason: "parser produced no syntax tree".to_string(),
            })?;
        let root = tree.root_node();
        let source = SourceText { path, code };

        if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            let location = source.location(node);
            let reason = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                format!("unexpected `{}`", first_line(source.text(node)))
            };
            return Err(ParseError::SyntaxError {
                file: path.to_string(),
                line: location.line,
                column: location.column,
                reason,
            });
        }

        let mut package = None;
        let mut imports = ImportTable::default();
        let mut type_declarations = Vec::new();

        for child in root.named_children(&mut root.walk()) {
            match child.kind() {
                "package_clause" => {
                    package = child
                        .named_children(&mut child.walk())
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| source.text(n).to_string());
                }
                "import_declaration" => source.collect_imports(child, &mut imports),
                "type_declaration" => type_declarations.push(child),
                _ => {}
            }
        }

        let package = package.ok_or_else(|| ParseError::MissingPackageClause {
            file: path.to_string(),
        })?;
        let imports = Arc::new(imports);

        let mut declarations = Vec::new();
        for node in type_declarations {
            for spec in node.named_children(&mut node.walk()) {
                match spec.kind() {
                    "type_spec" => {
                        if let Some(decl) = source.type_spec(spec, &imports) {
                            declarations.push(decl);
                        }
                    }
                    "type_alias" => {
                        if let Some(decl) = source.type_alias(spec, &imports) {
                            declarations.push(decl);
                        }
                    }
                    _ => {}
                }
            }
        }

        debug!(
            file = path,
            package = %package,
            declarations = declarations.len(),
            "parsed Go source file"
        );

        Ok(SourceFile {
            path: path.to_string(),
            package,
            imports,
            declarations,
        })
    }
}

/// Source text of the file being converted, with node helpers
struct SourceText<'a> {
    path: &'a str,
    code: &'a str,
}

impl<'a> SourceText<'a> {
    fn text(&self, node: Node) -> &'a str {
        &self.code[node.byte_range()]
    }

    fn location(&self, node: Node) -> SourceLocation {
        SourceLocation::from_point(self.path, node.start_position())
    }

    /// Process a Go import declaration node
    fn collect_imports(&self, node: Node, imports: &mut ImportTable) {
        // import_declaration can contain either a single import_spec or import_spec_list
        for child in node.named_children(&mut node.walk()) {
            match child.kind() {
                "import_spec" => {
                    if let Some(spec) = self.import_spec(child) {
                        imports.push(spec);
                    }
                }
                "import_spec_list" => {
                    for spec_child in child.named_children(&mut child.walk()) {
                        if spec_child.kind() == "import_spec" {
                            if let Some(spec) = self.import_spec(spec_child) {
                                imports.push(spec);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_spec(&self, node: Node) -> Option<ImportSpec> {
        let path = node.child_by_field_name("path")?;
        let path = self
            .text(path)
            .trim_matches(|c| c == '"' || c == '`')
            .to_string();
        // `name` is an alias, a dot or a blank identifier
        let alias = node.child_by_field_name("name").map(|n| self.text(n));
        Some(ImportSpec::new(path, alias))
    }

    fn type_spec(&self, node: Node, imports: &Arc<ImportTable>) -> Option<Declaration> {
        let name = self.text(node.child_by_field_name("name")?);
        let type_node = node.child_by_field_name("type")?;

        let kind = match type_node.kind() {
            "struct_type" => DeclKind::Struct(self.struct_decl(type_node)),
            "interface_type" => DeclKind::Interface(self.interface_decl(type_node)),
            other => {
                trace!("skipping type `{name}` with underlying {other}");
                return None;
            }
        };

        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|list| self.type_param_names(list))
            .unwrap_or_default();

        Some(
            Declaration::new(name, self.location(node), Arc::clone(imports), kind)
                .with_type_params(type_params),
        )
    }

    fn type_alias(&self, node: Node, imports: &Arc<ImportTable>) -> Option<Declaration> {
        let name = self.text(node.child_by_field_name("name")?);
        let target = self.type_expr(node.child_by_field_name("type")?);
        trace!("alias `{name}` = {}", first_line(&target.text));

        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|list| self.type_param_names(list))
            .unwrap_or_default();

        Some(
            Declaration::new(name, self.location(node), Arc::clone(imports), DeclKind::Alias(target))
                .with_type_params(type_params),
        )
    }

    fn type_param_names(&self, list: Node) -> Vec<String> {
        let mut names = Vec::new();
        for decl in list.named_children(&mut list.walk()) {
            if decl.kind() == "type_parameter_declaration" {
                let mut cursor = decl.walk();
                names.extend(
                    decl.children_by_field_name("name", &mut cursor)
                        .map(|n| self.text(n).to_string()),
                );
            }
        }
        names
    }

    fn struct_decl(&self, node: Node) -> StructDecl {
        let mut fields = Vec::new();
        let Some(list) = node
            .named_children(&mut node.walk())
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return StructDecl::default();
        };

        for field in list.named_children(&mut list.walk()) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let Some(type_node) = field.child_by_field_name("type") else {
                continue;
            };
            let mut ty = self.type_expr(type_node);
            let tag = field.child_by_field_name("tag").map(|n| self.text(n).to_string());
            let location = self.location(field);

            let mut cursor = field.walk();
            let names: Vec<Node> = field.children_by_field_name("name", &mut cursor).collect();

            if names.is_empty() {
                // embedded `*T` keeps the star outside the type field
                let pointer = field.children(&mut field.walk()).any(|c| c.kind() == "*");
                if pointer {
                    let text = format!("*{}", ty.text);
                    ty = TypeExpr::new(TypeExprKind::Pointer(Box::new(ty)), text, location.clone());
                }
                fields.push(FieldDecl {
                    name: None,
                    ty,
                    tag,
                    location,
                });
                continue;
            }

            for name in names {
                fields.push(FieldDecl {
                    name: Some(self.text(name).to_string()),
                    ty: ty.clone(),
                    tag: tag.clone(),
                    location: location.clone(),
                });
            }
        }

        StructDecl { fields }
    }

    fn interface_decl(&self, node: Node) -> InterfaceDecl {
        let mut members = Vec::new();
        for child in node.named_children(&mut node.walk()) {
            if child.is_extra() {
                continue;
            }
            match child.kind() {
                "method_elem" | "method_spec" => members.push(Member::Method(self.method_decl(child))),
                "type_elem" => {
                    let types: Vec<Node> = child
                        .named_children(&mut child.walk())
                        .filter(|n| !n.is_extra())
                        .collect();
                    let expr = match types.as_slice() {
                        [single] => self.type_expr(*single),
                        _ => TypeExpr::new(
                            TypeExprKind::Other("type_elem".to_string()),
                            self.text(child),
                            self.location(child),
                        ),
                    };
                    members.push(Member::Embedded(expr));
                }
                _ => members.push(Member::Embedded(self.type_expr(child))),
            }
        }
        InterfaceDecl { members }
    }

    fn method_decl(&self, node: Node) -> MethodDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.parameter_list(list))
            .unwrap_or_default();
        let results = self.results(node.child_by_field_name("result"));

        MethodDecl {
            name,
            params,
            results,
            location: self.location(node),
        }
    }

    fn parameter_list(&self, node: Node) -> Vec<ParamDecl> {
        let mut params = Vec::new();
        for child in node.named_children(&mut node.walk()) {
            match child.kind() {
                "parameter_declaration" => {
                    let Some(type_node) = child.child_by_field_name("type") else {
                        continue;
                    };
                    let ty = self.type_expr(type_node);
                    let mut cursor = child.walk();
                    let names: Vec<Node> =
                        child.children_by_field_name("name", &mut cursor).collect();
                    if names.is_empty() {
                        params.push(ParamDecl {
                            name: None,
                            ty,
                            variadic: false,
                        });
                    } else {
                        // `a, b int` declares one parameter per name
                        params.extend(names.into_iter().map(|name| ParamDecl {
                            name: Some(self.text(name).to_string()),
                            ty: ty.clone(),
                            variadic: false,
                        }));
                    }
                }
                "variadic_parameter_declaration" => {
                    let Some(type_node) = child.child_by_field_name("type") else {
                        continue;
                    };
                    params.push(ParamDecl {
                        name: child
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_string()),
                        ty: self.type_expr(type_node),
                        variadic: true,
                    });
                }
                _ => {}
            }
        }
        params
    }

    fn results(&self, node: Option<Node>) -> Vec<ParamDecl> {
        match node {
            None => Vec::new(),
            Some(list) if list.kind() == "parameter_list" => self.parameter_list(list),
            Some(single) => vec![ParamDecl {
                name: None,
                ty: self.type_expr(single),
                variadic: false,
            }],
        }
    }

    fn field_type(&self, node: Node, field: &str) -> Option<Box<TypeExpr>> {
        node.child_by_field_name(field)
            .map(|child| Box::new(self.type_expr(child)))
    }

    fn first_named(&self, node: Node) -> Option<Box<TypeExpr>> {
        node.named_children(&mut node.walk())
            .find(|n| !n.is_extra())
            .map(|child| Box::new(self.type_expr(child)))
    }

    /// Convert a type node into syntax, keeping unknown shapes as `Other`.
    fn type_expr(&self, node: Node) -> TypeExpr {
        let kind = match node.kind() {
            "type_identifier" | "identifier" => Some(TypeExprKind::Name(self.text(node).to_string())),
            "qualified_type" => {
                match (
                    node.child_by_field_name("package"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(package), Some(name)) => Some(TypeExprKind::Qualified {
                        package: self.text(package).to_string(),
                        name: self.text(name).to_string(),
                    }),
                    _ => None,
                }
            }
            "pointer_type" => self.first_named(node).map(TypeExprKind::Pointer),
            "slice_type" => self.field_type(node, "element").map(TypeExprKind::Slice),
            "array_type" => match (
                node.child_by_field_name("length"),
                self.field_type(node, "element"),
            ) {
                (Some(len), Some(elem)) => Some(TypeExprKind::Array {
                    len: self.text(len).to_string(),
                    elem,
                }),
                _ => None,
            },
            "map_type" => match (self.field_type(node, "key"), self.field_type(node, "value")) {
                (Some(key), Some(value)) => Some(TypeExprKind::Map { key, value }),
                _ => None,
            },
            "channel_type" => self
                .field_type(node, "value")
                .map(|elem| TypeExprKind::Chan {
                    direction: channel_direction(node),
                    elem,
                }),
            "function_type" => Some(TypeExprKind::Func {
                params: node
                    .child_by_field_name("parameters")
                    .map(|list| self.parameter_list(list))
                    .unwrap_or_default(),
                results: self.results(node.child_by_field_name("result")),
            }),
            "interface_type" => Some(TypeExprKind::Interface {
                has_members: node
                    .named_children(&mut node.walk())
                    .any(|n| !n.is_extra()),
            }),
            "struct_type" => Some(TypeExprKind::Struct {
                has_fields: node
                    .named_children(&mut node.walk())
                    .filter(|n| n.kind() == "field_declaration_list")
                    .any(|list| {
                        list.named_children(&mut list.walk())
                            .any(|n| n.kind() == "field_declaration")
                    }),
            }),
            "parenthesized_type" => self.first_named(node).map(TypeExprKind::Paren),
            "generic_type" => self.field_type(node, "type").map(|base| {
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        list.named_children(&mut list.walk())
                            .filter(|n| !n.is_extra())
                            .map(|arg| self.type_argument(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeExprKind::Generic { base, args }
            }),
            _ => None,
        };

        TypeExpr::new(
            kind.unwrap_or_else(|| TypeExprKind::Other(node.kind().to_string())),
            self.text(node),
            self.location(node),
        )
    }

    fn type_argument(&self, node: Node) -> TypeExpr {
        // type arguments are wrapped in type_elem nodes
        if node.kind() == "type_elem" {
            let inner: Vec<Node> = node.named_children(&mut node.walk()).collect();
            if let [single] = inner.as_slice() {
                return self.type_expr(*single);
            }
        }
        self.type_expr(node)
    }
}

/// Direction of a channel_type from its anonymous tokens.
fn channel_direction(node: Node) -> ChannelDirection {
    let tokens: Vec<&str> = node
        .children(&mut node.walk())
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", ..] => ChannelDirection::ReceiveOnly,
        tokens if tokens.contains(&"<-") => ChannelDirection::SendOnly,
        _ => ChannelDirection::Bidirectional,
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let children: Vec<Node> = node.children(&mut node.walk()).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
