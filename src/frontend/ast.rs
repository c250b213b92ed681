//! Abstract Syntax Tree definitions for the Go subset
//!
//! Declarations are modelled structurally; function bodies are kept as
//! balanced token lines because the generator only ever prints them back.

use crate::frontend::token::TokenKind;
use crate::types::{FuncShape, Param, TypeShape};

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: String,
    pub decls: Vec<Decl>,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Type(TypeSpec),
    Func(FuncDecl),
    Var(VarSpec),
}

/// `type Name <expr>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub ty: TypeExpr,
}

/// Right-hand side of a type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Shape(TypeShape),
    Interface(InterfaceType),
    Struct(StructType),
}

/// Interface body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceType {
    pub methods: Vec<MethodSpec>,
    /// Embedded interfaces; parsed but never implemented
    pub embedded: Vec<TypeShape>,
}

/// One method of an interface
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub func: FuncShape,
}

/// Struct body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: TypeShape,
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Param>,
    pub name: String,
    pub func: FuncShape,
    pub body: Block,
}

/// `var name [Type] [= value]`
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub name: String,
    pub shape: Option<TypeShape>,
    pub value: Option<Expr>,
}

/// Function body as lines of tokens
///
/// Leading and trailing blank lines are dropped and runs of blank lines
/// collapse into one, so equal bodies compare equal regardless of layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub lines: Vec<Vec<BodyToken>>,
}

/// A body token and whether whitespace preceded it on its line
#[derive(Debug, Clone, PartialEq)]
pub struct BodyToken {
    pub kind: TokenKind,
    pub spaced: bool,
}

impl Block {
    /// Build a block from raw lines, normalizing blank lines
    pub fn from_lines(lines: Vec<Vec<BodyToken>>) -> Self {
        let mut normalized: Vec<Vec<BodyToken>> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.is_empty() && normalized.last().map_or(true, Vec::is_empty) {
                continue;
            }
            normalized.push(line);
        }
        while normalized.last().map_or(false, Vec::is_empty) {
            normalized.pop();
        }
        Self { lines: normalized }
    }
}

/// Expressions that appear outside function bodies
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier or selector path, e.g. `nil`, `errors.New`
    Ident(String),
    /// Literal with its raw text
    Lit(String),
    /// Empty composite literal `T{}`
    Composite(TypeShape),
    /// `&x`, `*x`, `-x`, `!x`
    Unary { op: String, expr: Box<Expr> },
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// `x...` as the final call argument
    Spread(Box<Expr>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn nil() -> Self {
        Expr::Ident("nil".into())
    }

    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call { func: Box::new(Expr::Ident(func.into())), args }
    }
}

/// A node visited while walking a file
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    File(&'a SourceFile),
    Decl(&'a Decl),
    TypeSpec(&'a TypeSpec),
    Method(&'a MethodSpec),
    Func(&'a FuncDecl),
}

impl SourceFile {
    /// All nodes in depth-first pre-order
    pub fn nodes(&self) -> Vec<Node<'_>> {
        let mut nodes = vec![Node::File(self)];
        for decl in &self.decls {
            nodes.push(Node::Decl(decl));
            match decl {
                Decl::Type(spec) => {
                    nodes.push(Node::TypeSpec(spec));
                    if let TypeExpr::Interface(iface) = &spec.ty {
                        nodes.extend(iface.methods.iter().map(Node::Method));
                    }
                }
                Decl::Func(func) => nodes.push(Node::Func(func)),
                Decl::Var(_) => {}
            }
        }
        nodes
    }
}
