pub mod ast;
pub mod go;

pub use ast::{
    DeclKind, Declaration, FieldDecl, ImportSpec, ImportTable, InterfaceDecl, Member, MethodDecl,
    PackageUnit, ParamDecl, SourceFile, StructDecl, TypeExpr, TypeExprKind,
};
pub use go::{GoParser, PackageLoader};
