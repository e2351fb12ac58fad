//! Syntax tree for the supported TypeScript subset.
//!
//! Nodes are immutable and shared through `Arc`: the rewriting pass never
//! mutates a node, it either returns the original `Arc` or builds a new one
//! through [`factory::NodeFactory`]. Every node is wrapped in [`Spanned`] so
//! replacements can keep the source position of the code they replace.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod factory;
pub mod parser;
pub mod printer;

// ============================================================================
// SPANS
// ============================================================================

/// Byte range in the source text. Synthesized nodes inherit the span of the
/// node they replace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wrapper for carrying source span information with any value.
///
/// Spans are positional metadata and do not take part in equality, so two
/// trees compare equal when they have the same shape and literal values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

pub type ExprNode = Spanned<Arc<Expr>>;
pub type StmtNode = Spanned<Arc<Stmt>>;

// ============================================================================
// SOURCE UNIT
// ============================================================================

/// One parsed file: its top-level statements plus file-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub file_name: String,
    pub statements: Vec<StmtNode>,
    pub is_declaration_file: bool,
    /// `/// <reference path="..." />`
    pub referenced_files: Vec<String>,
    /// `/// <reference types="..." />`
    pub type_reference_directives: Vec<String>,
    /// `/// <reference lib="..." />`
    pub lib_reference_directives: Vec<String>,
    /// `/// <reference no-default-lib="true" />`
    pub has_no_default_lib: bool,
}

impl SourceUnit {
    /// An empty unit named `file_name`; declaration-file status follows the name.
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            is_declaration_file: is_declaration_file_name(&file_name),
            file_name,
            statements: Vec::new(),
            referenced_files: Vec::new(),
            type_reference_directives: Vec::new(),
            lib_reference_directives: Vec::new(),
            has_no_default_lib: false,
        }
    }
}

pub fn is_declaration_file_name(name: &str) -> bool {
    name.ends_with(".d.ts") || name.ends_with(".d.tsx")
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(ExprNode),
    Var(VarDecl),
    Function(FunctionDecl),
    Enum(EnumDecl),
    Return(Option<ExprNode>),
    If {
        test: ExprNode,
        consequent: StmtNode,
        alternate: Option<StmtNode>,
    },
    Block(Vec<StmtNode>),
    Empty,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    Export,
    Declare,
    Const,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Export => "export",
            Modifier::Declare => "declare",
            Modifier::Const => "const",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Const => "const",
            VarKind::Let => "let",
            VarKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub modifiers: Vec<Modifier>,
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub type_annotation: Option<TypeAnnotation>,
    pub init: Option<ExprNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<StmtNode>,
}

/// `enum Name { ... }` with its modifiers in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub members: Vec<Spanned<EnumMember>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: MemberName,
    pub initializer: Option<ExprNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberName {
    Identifier(String),
    String(String),
    Computed(ExprNode),
}

/// Type annotations are carried as opaque, whitespace-normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub type_annotation: Option<TypeAnnotation>,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Identifier(String),
    String(String),
    Number(NumericLiteral),
    Bool(bool),
    Null,
    Array(Vec<ExprNode>),
    Object(Vec<Property>),
    Call {
        callee: ExprNode,
        args: Vec<ExprNode>,
    },
    Member {
        object: ExprNode,
        property: String,
    },
    Index {
        object: ExprNode,
        index: ExprNode,
    },
    Unary {
        op: UnaryOp,
        operand: ExprNode,
    },
    Binary {
        op: BinaryOp,
        left: ExprNode,
        right: ExprNode,
    },
    Conditional {
        test: ExprNode,
        consequent: ExprNode,
        alternate: ExprNode,
    },
    Assign {
        op: AssignOp,
        target: ExprNode,
        value: ExprNode,
    },
    Arrow(ArrowFunction),
    Spread(ExprNode),
    Paren(ExprNode),
}

/// A numeric literal keeps its source text so it prints back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericLiteral {
    pub text: String,
    pub value: f64,
}

impl NumericLiteral {
    pub fn from_u64(value: u64) -> Self {
        Self {
            text: value.to_string(),
            value: value as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    KeyValue { key: PropertyKey, value: ExprNode },
    Shorthand(String),
    Spread(ExprNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Number(NumericLiteral),
    Computed(ExprNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: ArrowBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowBody {
    Expr(ExprNode),
    Block(Vec<StmtNode>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    Typeof,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::Typeof => "typeof ",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Nullish,
    Or,
    And,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Nullish => "??",
            Or => "||",
            And => "&&",
            Eq => "==",
            NotEq => "!=",
            StrictEq => "===",
            StrictNotEq => "!==",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        use BinaryOp::*;
        match self {
            Nullish => 3,
            Or => 4,
            And => 5,
            Eq | NotEq | StrictEq | StrictNotEq => 6,
            Lt | Gt | LtEq | GtEq => 7,
            Add | Sub => 8,
            Mul | Div | Mod => 9,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }
}

impl Expr {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "identifier",
            Expr::String(_) => "string literal",
            Expr::Number(_) => "numeric literal",
            Expr::Bool(_) => "boolean literal",
            Expr::Null => "null",
            Expr::Array(_) => "array literal",
            Expr::Object(_) => "object literal",
            Expr::Call { .. } => "call expression",
            Expr::Member { .. } => "property access",
            Expr::Index { .. } => "element access",
            Expr::Unary { .. } => "unary expression",
            Expr::Binary { .. } => "binary expression",
            Expr::Conditional { .. } => "conditional expression",
            Expr::Assign { .. } => "assignment",
            Expr::Arrow(_) => "arrow function",
            Expr::Spread(_) => "spread element",
            Expr::Paren(_) => "parenthesized expression",
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Expr::String(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_do_not_affect_equality() {
        let a = Spanned::new(Arc::new(Expr::Bool(true)), Span::new(0, 4));
        let b = Spanned::new(Arc::new(Expr::Bool(true)), Span::new(10, 14));
        assert_eq!(a, b);
    }

    #[test]
    fn declaration_files_are_detected_by_name() {
        assert!(SourceUnit::new("types/index.d.ts").is_declaration_file);
        assert!(!SourceUnit::new("main.ts").is_declaration_file);
    }
}
