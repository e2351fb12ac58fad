//! Node construction facility.
//!
//! `create_*` functions build fresh nodes. `update_*` functions take the
//! original node and a rebuilt value: when every child of the rebuilt value
//! is pointer-identical to the original's, the original `Arc` is returned
//! unchanged, otherwise a new node with the original span is produced. This
//! keeps untouched subtrees shared instead of copied.

use std::sync::Arc;

use crate::syntax::{
    ArrowBody, ArrowFunction, BinaryOp, Declarator, EnumDecl, EnumMember, Expr, ExprNode,
    MemberName, NumericLiteral, Param, Property, PropertyKey, SourceUnit, Spanned, Span, Stmt,
    StmtNode, UnaryOp,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory;

// ============================================================================
// CREATE
// ============================================================================

impl NodeFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn expr(&self, expr: Expr, span: Span) -> ExprNode {
        Spanned::new(Arc::new(expr), span)
    }

    pub fn stmt(&self, stmt: Stmt, span: Span) -> StmtNode {
        Spanned::new(Arc::new(stmt), span)
    }

    pub fn create_identifier(&self, name: impl Into<String>, span: Span) -> ExprNode {
        self.expr(Expr::Identifier(name.into()), span)
    }

    pub fn create_string_literal(&self, text: impl Into<String>, span: Span) -> ExprNode {
        self.expr(Expr::String(text.into()), span)
    }

    /// Numeric literals have no sign; negative values are built by callers
    /// as a prefix `-` applied to the magnitude.
    pub fn create_numeric_literal(&self, value: u64, span: Span) -> ExprNode {
        self.expr(Expr::Number(NumericLiteral::from_u64(value)), span)
    }

    pub fn create_array_literal(&self, elements: Vec<ExprNode>, span: Span) -> ExprNode {
        self.expr(Expr::Array(elements), span)
    }

    pub fn create_property_access(
        &self,
        object: ExprNode,
        property: impl Into<String>,
        span: Span,
    ) -> ExprNode {
        self.expr(
            Expr::Member {
                object,
                property: property.into(),
            },
            span,
        )
    }

    pub fn create_element_access(&self, object: ExprNode, index: ExprNode, span: Span) -> ExprNode {
        self.expr(Expr::Index { object, index }, span)
    }

    pub fn create_call(&self, callee: ExprNode, args: Vec<ExprNode>, span: Span) -> ExprNode {
        self.expr(Expr::Call { callee, args }, span)
    }

    pub fn create_spread(&self, inner: ExprNode, span: Span) -> ExprNode {
        self.expr(Expr::Spread(inner), span)
    }

    pub fn create_parameter(&self, name: impl Into<String>) -> Param {
        Param {
            name: name.into(),
            type_annotation: None,
        }
    }

    pub fn create_arrow_function(&self, params: Vec<Param>, body: ArrowBody, span: Span) -> ExprNode {
        self.expr(
            Expr::Arrow(ArrowFunction {
                params,
                return_type: None,
                body,
            }),
            span,
        )
    }

    pub fn create_binary(&self, left: ExprNode, op: BinaryOp, right: ExprNode, span: Span) -> ExprNode {
        self.expr(Expr::Binary { op, left, right }, span)
    }

    pub fn create_prefix_unary(&self, op: UnaryOp, operand: ExprNode, span: Span) -> ExprNode {
        self.expr(Expr::Unary { op, operand }, span)
    }

    pub fn create_return(&self, value: Option<ExprNode>, span: Span) -> StmtNode {
        self.stmt(Stmt::Return(value), span)
    }

    pub fn create_enum_member(
        &self,
        name: MemberName,
        initializer: Option<ExprNode>,
        span: Span,
    ) -> Spanned<EnumMember> {
        Spanned::new(EnumMember { name, initializer }, span)
    }
}

// ============================================================================
// UPDATE
// ============================================================================

impl NodeFactory {
    pub fn update_expr(&self, original: &ExprNode, updated: Expr) -> ExprNode {
        if shallow_eq_expr(&original.value, &updated) {
            return original.clone();
        }
        Spanned::new(Arc::new(updated), original.span)
    }

    pub fn update_stmt(&self, original: &StmtNode, updated: Stmt) -> StmtNode {
        if shallow_eq_stmt(&original.value, &updated) {
            return original.clone();
        }
        Spanned::new(Arc::new(updated), original.span)
    }

    /// Replace only the member list; name and modifiers are kept.
    pub fn update_enum_declaration(
        &self,
        original: &StmtNode,
        decl: &EnumDecl,
        members: Vec<Spanned<EnumMember>>,
    ) -> StmtNode {
        self.update_stmt(
            original,
            Stmt::Enum(EnumDecl {
                modifiers: decl.modifiers.clone(),
                name: decl.name.clone(),
                members,
            }),
        )
    }

    /// New unit with `statements`; all file metadata is copied unchanged.
    pub fn update_source_unit(&self, original: &SourceUnit, statements: Vec<StmtNode>) -> SourceUnit {
        SourceUnit {
            file_name: original.file_name.clone(),
            statements,
            is_declaration_file: original.is_declaration_file,
            referenced_files: original.referenced_files.clone(),
            type_reference_directives: original.type_reference_directives.clone(),
            lib_reference_directives: original.lib_reference_directives.clone(),
            has_no_default_lib: original.has_no_default_lib,
        }
    }
}

// ============================================================================
// SHALLOW COMPARISON
// ============================================================================

// Same variant, same leaf data, pointer-identical children.

fn same<T>(a: &Spanned<Arc<T>>, b: &Spanned<Arc<T>>) -> bool {
    Arc::ptr_eq(&a.value, &b.value)
}

fn same_all<T>(a: &[Spanned<Arc<T>>], b: &[Spanned<Arc<T>>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same(x, y))
}

fn same_opt<T>(a: &Option<Spanned<Arc<T>>>, b: &Option<Spanned<Arc<T>>>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => same(x, y),
        (None, None) => true,
        _ => false,
    }
}

fn shallow_eq_expr(a: &Expr, b: &Expr) -> bool {
    use Expr::*;
    match (a, b) {
        (Identifier(x), Identifier(y)) => x == y,
        (String(x), String(y)) => x == y,
        (Number(x), Number(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Null, Null) => true,
        (Array(x), Array(y)) => same_all(x, y),
        (Object(x), Object(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| shallow_eq_property(p, q))
        }
        (Call { callee: c1, args: a1 }, Call { callee: c2, args: a2 }) => {
            same(c1, c2) && same_all(a1, a2)
        }
        (Member { object: o1, property: p1 }, Member { object: o2, property: p2 }) => {
            same(o1, o2) && p1 == p2
        }
        (Index { object: o1, index: i1 }, Index { object: o2, index: i2 }) => {
            same(o1, o2) && same(i1, i2)
        }
        (Unary { op: op1, operand: x1 }, Unary { op: op2, operand: x2 }) => {
            op1 == op2 && same(x1, x2)
        }
        (
            Binary { op: op1, left: l1, right: r1 },
            Binary { op: op2, left: l2, right: r2 },
        ) => op1 == op2 && same(l1, l2) && same(r1, r2),
        (
            Conditional { test: t1, consequent: c1, alternate: a1 },
            Conditional { test: t2, consequent: c2, alternate: a2 },
        ) => same(t1, t2) && same(c1, c2) && same(a1, a2),
        (
            Assign { op: op1, target: t1, value: v1 },
            Assign { op: op2, target: t2, value: v2 },
        ) => op1 == op2 && same(t1, t2) && same(v1, v2),
        (Arrow(x), Arrow(y)) => {
            x.params == y.params
                && x.return_type == y.return_type
                && match (&x.body, &y.body) {
                    (ArrowBody::Expr(e1), ArrowBody::Expr(e2)) => same(e1, e2),
                    (ArrowBody::Block(b1), ArrowBody::Block(b2)) => same_all(b1, b2),
                    _ => false,
                }
        }
        (Spread(x), Spread(y)) | (Paren(x), Paren(y)) => same(x, y),
        _ => false,
    }
}

fn shallow_eq_property(a: &Property, b: &Property) -> bool {
    match (a, b) {
        (Property::KeyValue { key: k1, value: v1 }, Property::KeyValue { key: k2, value: v2 }) => {
            shallow_eq_key(k1, k2) && same(v1, v2)
        }
        (Property::Shorthand(x), Property::Shorthand(y)) => x == y,
        (Property::Spread(x), Property::Spread(y)) => same(x, y),
        _ => false,
    }
}

fn shallow_eq_key(a: &PropertyKey, b: &PropertyKey) -> bool {
    match (a, b) {
        (PropertyKey::Computed(x), PropertyKey::Computed(y)) => same(x, y),
        (PropertyKey::Computed(_), _) | (_, PropertyKey::Computed(_)) => false,
        _ => a == b,
    }
}

fn shallow_eq_member(a: &EnumMember, b: &EnumMember) -> bool {
    let names = match (&a.name, &b.name) {
        (MemberName::Computed(x), MemberName::Computed(y)) => same(x, y),
        (MemberName::Computed(_), _) | (_, MemberName::Computed(_)) => false,
        (x, y) => x == y,
    };
    names && same_opt(&a.initializer, &b.initializer)
}

fn shallow_eq_declarator(a: &Declarator, b: &Declarator) -> bool {
    a.name == b.name && a.type_annotation == b.type_annotation && same_opt(&a.init, &b.init)
}

fn shallow_eq_stmt(a: &Stmt, b: &Stmt) -> bool {
    match (a, b) {
        (Stmt::Expr(x), Stmt::Expr(y)) => same(x, y),
        (Stmt::Var(x), Stmt::Var(y)) => {
            x.modifiers == y.modifiers
                && x.kind == y.kind
                && x.declarators.len() == y.declarators.len()
                && x
                    .declarators
                    .iter()
                    .zip(&y.declarators)
                    .all(|(p, q)| shallow_eq_declarator(p, q))
        }
        (Stmt::Function(x), Stmt::Function(y)) => {
            x.modifiers == y.modifiers
                && x.name == y.name
                && x.params == y.params
                && x.return_type == y.return_type
                && same_all(&x.body, &y.body)
        }
        (Stmt::Enum(x), Stmt::Enum(y)) => {
            x.modifiers == y.modifiers
                && x.name == y.name
                && x.members.len() == y.members.len()
                && x
                    .members
                    .iter()
                    .zip(&y.members)
                    .all(|(p, q)| shallow_eq_member(&p.value, &q.value))
        }
        (Stmt::Return(x), Stmt::Return(y)) => same_opt(x, y),
        (
            Stmt::If { test: t1, consequent: c1, alternate: a1 },
            Stmt::If { test: t2, consequent: c2, alternate: a2 },
        ) => same(t1, t2) && same(c1, c2) && same_opt(a1, a2),
        (Stmt::Block(x), Stmt::Block(y)) => same_all(x, y),
        (Stmt::Empty, Stmt::Empty) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_identical_children_returns_the_original() {
        let f = NodeFactory::new();
        let callee = f.create_identifier("print", Span::new(0, 5));
        let arg = f.create_string_literal("hi", Span::new(6, 10));
        let call = f.create_call(callee.clone(), vec![arg.clone()], Span::new(0, 11));

        let updated = f.update_expr(&call, Expr::Call { callee, args: vec![arg] });
        assert!(Arc::ptr_eq(&updated.value, &call.value));
    }

    #[test]
    fn update_with_a_new_child_builds_a_new_node_with_the_original_span() {
        let f = NodeFactory::new();
        let callee = f.create_identifier("print", Span::new(0, 5));
        let arg = f.create_string_literal("hi", Span::new(6, 10));
        let call = f.create_call(callee.clone(), vec![arg], Span::new(0, 11));

        let replacement = f.create_string_literal("hi", Span::default());
        let updated = f.update_expr(&call, Expr::Call { callee, args: vec![replacement] });
        assert!(!Arc::ptr_eq(&updated.value, &call.value));
        assert_eq!(updated.span, Span::new(0, 11));
        // Structurally the same tree.
        assert_eq!(updated, call);
    }

    #[test]
    fn source_unit_update_keeps_metadata() {
        let f = NodeFactory::new();
        let mut unit = SourceUnit::new("lib.d.ts");
        unit.referenced_files.push("./other.ts".into());
        unit.has_no_default_lib = true;

        let updated = f.update_source_unit(&unit, vec![f.stmt(Stmt::Empty, Span::default())]);
        assert_eq!(updated.statements.len(), 1);
        assert_eq!(updated.referenced_files, unit.referenced_files);
        assert!(updated.is_declaration_file);
        assert!(updated.has_no_default_lib);
    }
}
