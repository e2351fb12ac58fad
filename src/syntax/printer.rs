//! Source printer.
//!
//! Renders a syntax tree back to TypeScript text. Parentheses are inserted
//! from operator precedence, so synthesized trees print correctly without
//! explicit `Paren` nodes. Output uses four-space indentation and double
//! quoted strings.

use std::fmt::Write;

use crate::syntax::{
    ArrowBody, ArrowFunction, EnumDecl, Expr, ExprNode, FunctionDecl, MemberName, Param,
    Property, PropertyKey, SourceUnit, Stmt, StmtNode, TypeAnnotation, UnaryOp, VarDecl,
};

const INDENT: &str = "    ";

// Binding power of each expression level; binary operators use their own.
const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const PREC_UNARY: u8 = 10;
const PREC_POSTFIX: u8 = 11;
const PREC_PRIMARY: u8 = 12;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Print a whole unit: reference directives first, then the statements.
pub fn print_source_unit(unit: &SourceUnit) -> String {
    let mut printer = Printer::default();
    printer.directives(unit);
    for stmt in &unit.statements {
        printer.stmt(stmt);
    }
    printer.out
}

pub fn print_expr(expr: &ExprNode) -> String {
    let mut printer = Printer::default();
    printer.expr(expr, 0);
    printer.out
}

// ============================================================================
// PRINTER
// ============================================================================

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn directives(&mut self, unit: &SourceUnit) {
        for path in &unit.referenced_files {
            self.line(&format!("/// <reference path=\"{path}\" />"));
        }
        for types in &unit.type_reference_directives {
            self.line(&format!("/// <reference types=\"{types}\" />"));
        }
        for lib in &unit.lib_reference_directives {
            self.line(&format!("/// <reference lib=\"{lib}\" />"));
        }
        if unit.has_no_default_lib {
            self.line("/// <reference no-default-lib=\"true\" />");
        }
    }

    fn line(&mut self, text: &str) {
        self.indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn stmt(&mut self, stmt: &StmtNode) {
        self.indent();
        self.stmt_inline(stmt);
        self.out.push('\n');
    }

    /// A statement without its leading indent or trailing newline.
    fn stmt_inline(&mut self, stmt: &StmtNode) {
        match &*stmt.value {
            Stmt::Expr(expr) => {
                if starts_with_brace(expr) {
                    self.out.push('(');
                    self.expr(expr, 0);
                    self.out.push(')');
                } else {
                    self.expr(expr, 0);
                }
                self.out.push(';');
            }
            Stmt::Var(decl) => self.var_decl(decl),
            Stmt::Function(decl) => self.function_decl(decl),
            Stmt::Enum(decl) => self.enum_decl(decl),
            Stmt::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value, 0);
                }
                self.out.push(';');
            }
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.out.push_str("if (");
                self.expr(test, 0);
                self.out.push_str(") ");
                self.stmt_inline(consequent);
                if let Some(alternate) = alternate {
                    self.out.push_str(" else ");
                    self.stmt_inline(alternate);
                }
            }
            Stmt::Block(body) => self.block(body),
            Stmt::Empty => self.out.push(';'),
        }
    }

    fn block(&mut self, body: &[StmtNode]) {
        if body.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.depth += 1;
        for stmt in body {
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn modifiers(&mut self, modifiers: &[crate::syntax::Modifier]) {
        for modifier in modifiers {
            self.out.push_str(modifier.as_str());
            self.out.push(' ');
        }
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        self.modifiers(&decl.modifiers);
        self.out.push_str(decl.kind.as_str());
        self.out.push(' ');
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&declarator.name);
            self.type_suffix(&declarator.type_annotation);
            if let Some(init) = &declarator.init {
                self.out.push_str(" = ");
                self.expr(init, PREC_ASSIGN);
            }
        }
        self.out.push(';');
    }

    fn function_decl(&mut self, decl: &FunctionDecl) {
        self.modifiers(&decl.modifiers);
        self.out.push_str("function ");
        self.out.push_str(&decl.name);
        self.params(&decl.params);
        self.type_suffix(&decl.return_type);
        self.out.push(' ');
        self.block(&decl.body);
    }

    fn enum_decl(&mut self, decl: &EnumDecl) {
        self.modifiers(&decl.modifiers);
        let _ = write!(self.out, "enum {} ", decl.name);
        if decl.members.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.depth += 1;
        for member in &decl.members {
            self.indent();
            match &member.value.name {
                MemberName::Identifier(name) => self.out.push_str(name),
                MemberName::String(name) => self.string(name),
                MemberName::Computed(expr) => {
                    self.out.push('[');
                    self.expr(expr, 0);
                    self.out.push(']');
                }
            }
            if let Some(init) = &member.value.initializer {
                self.out.push_str(" = ");
                self.expr(init, PREC_ASSIGN);
            }
            self.out.push_str(",\n");
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn params(&mut self, params: &[Param]) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
            self.type_suffix(&param.type_annotation);
        }
        self.out.push(')');
    }

    fn type_suffix(&mut self, annotation: &Option<TypeAnnotation>) {
        if let Some(TypeAnnotation(text)) = annotation {
            self.out.push_str(": ");
            self.out.push_str(text);
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// Print `expr`, parenthesized when it binds looser than `min_prec`.
    fn expr(&mut self, expr: &ExprNode, min_prec: u8) {
        let needs_parens = precedence(&expr.value) < min_prec;
        if needs_parens {
            self.out.push('(');
        }
        self.expr_bare(expr);
        if needs_parens {
            self.out.push(')');
        }
    }

    fn expr_bare(&mut self, expr: &ExprNode) {
        match &*expr.value {
            Expr::Identifier(name) => self.out.push_str(name),
            Expr::String(text) => self.string(text),
            Expr::Number(number) => self.out.push_str(&number.text),
            Expr::Bool(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Expr::Null => self.out.push_str("null"),
            Expr::Array(elements) => {
                self.out.push('[');
                self.list(elements);
                self.out.push(']');
            }
            Expr::Object(properties) => self.object(properties),
            Expr::Call { callee, args } => {
                self.expr(callee, PREC_POSTFIX);
                self.out.push('(');
                self.list(args);
                self.out.push(')');
            }
            Expr::Member { object, property } => {
                self.expr(object, PREC_POSTFIX);
                // `1.x` would lex as a decimal point.
                if matches!(&*object.value, Expr::Number(n) if !n.text.contains(&['.', 'x', 'X', 'e', 'E'][..])) {
                    self.out.push('.');
                }
                self.out.push('.');
                self.out.push_str(property);
            }
            Expr::Index { object, index } => {
                self.expr(object, PREC_POSTFIX);
                self.out.push('[');
                self.expr(index, 0);
                self.out.push(']');
            }
            Expr::Unary { op, operand } => {
                self.out.push_str(op.as_str());
                // Keep `- -x` and `+ +x` from fusing into `--x` and `++x`.
                if let Expr::Unary { op: inner, .. } = &*operand.value {
                    if matches!(
                        (op, inner),
                        (UnaryOp::Neg, UnaryOp::Neg) | (UnaryOp::Plus, UnaryOp::Plus)
                    ) {
                        self.out.push(' ');
                    }
                }
                self.expr(operand, PREC_UNARY);
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                self.expr(left, prec);
                let _ = write!(self.out, " {} ", op.as_str());
                self.expr(right, prec + 1);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test, PREC_CONDITIONAL + 1);
                self.out.push_str(" ? ");
                self.expr(consequent, PREC_ASSIGN);
                self.out.push_str(" : ");
                self.expr(alternate, PREC_ASSIGN);
            }
            Expr::Assign { op, target, value } => {
                self.expr(target, PREC_POSTFIX);
                let _ = write!(self.out, " {} ", op.as_str());
                self.expr(value, PREC_ASSIGN);
            }
            Expr::Arrow(arrow) => self.arrow(arrow),
            Expr::Spread(inner) => {
                self.out.push_str("...");
                self.expr(inner, PREC_ASSIGN);
            }
            Expr::Paren(inner) => {
                self.out.push('(');
                self.expr(inner, 0);
                self.out.push(')');
            }
        }
    }

    fn arrow(&mut self, arrow: &ArrowFunction) {
        self.params(&arrow.params);
        self.type_suffix(&arrow.return_type);
        self.out.push_str(" => ");
        match &arrow.body {
            ArrowBody::Block(body) => self.block(body),
            ArrowBody::Expr(expr) if starts_with_brace(expr) => {
                self.out.push('(');
                self.expr(expr, 0);
                self.out.push(')');
            }
            ArrowBody::Expr(expr) => self.expr(expr, PREC_ASSIGN),
        }
    }

    fn object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{ ");
        for (i, property) in properties.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match property {
                Property::KeyValue { key, value } => {
                    match key {
                        PropertyKey::Identifier(name) => self.out.push_str(name),
                        PropertyKey::String(text) => self.string(text),
                        PropertyKey::Number(number) => self.out.push_str(&number.text),
                        PropertyKey::Computed(expr) => {
                            self.out.push('[');
                            self.expr(expr, 0);
                            self.out.push(']');
                        }
                    }
                    self.out.push_str(": ");
                    self.expr(value, PREC_ASSIGN);
                }
                Property::Shorthand(name) => self.out.push_str(name),
                Property::Spread(inner) => {
                    self.out.push_str("...");
                    self.expr(inner, PREC_ASSIGN);
                }
            }
        }
        self.out.push_str(" }");
    }

    fn list(&mut self, items: &[ExprNode]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, PREC_ASSIGN);
        }
    }

    fn string(&mut self, text: &str) {
        self.out.push_str(&quote_string(text));
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } | Expr::Arrow(_) | Expr::Spread(_) => PREC_ASSIGN,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Call { .. } | Expr::Member { .. } | Expr::Index { .. } => PREC_POSTFIX,
        _ => PREC_PRIMARY,
    }
}

/// True when the printed form of `expr` would begin with `{`.
fn starts_with_brace(expr: &ExprNode) -> bool {
    match &*expr.value {
        Expr::Object(_) => true,
        Expr::Call { callee: head, .. }
        | Expr::Member { object: head, .. }
        | Expr::Index { object: head, .. }
        | Expr::Assign { target: head, .. }
        | Expr::Binary { left: head, .. }
        | Expr::Conditional { test: head, .. } => {
            precedence(&head.value) >= precedence(&expr.value) && starts_with_brace(head)
        }
        _ => false,
    }
}

/// Double-quoted string literal with JavaScript escapes.
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04X}", ch as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::factory::NodeFactory;
    use crate::syntax::parser::{parse, parse_expression};
    use crate::syntax::{BinaryOp, Span};

    fn reprint(src: &str) -> String {
        print_expr(&parse_expression(src).unwrap())
    }

    #[test]
    fn precedence_inserts_only_needed_parens() {
        assert_eq!(reprint("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(reprint("1 + (2 * 3)"), "1 + (2 * 3)");
        assert_eq!(reprint("a - (b - c)"), "a - (b - c)");
    }

    #[test]
    fn synthesized_trees_get_parens_from_precedence() {
        let f = NodeFactory::new();
        let s = Span::default();
        let sum = f.create_binary(
            f.create_identifier("a", s),
            BinaryOp::Add,
            f.create_identifier("b", s),
            s,
        );
        let product = f.create_binary(sum, BinaryOp::Mul, f.create_identifier("c", s), s);
        assert_eq!(print_expr(&product), "(a + b) * c");
    }

    #[test]
    fn double_negation_keeps_a_space() {
        let f = NodeFactory::new();
        let s = Span::default();
        let inner = f.create_prefix_unary(UnaryOp::Neg, f.create_numeric_literal(5, s), s);
        let outer = f.create_prefix_unary(UnaryOp::Neg, inner, s);
        assert_eq!(print_expr(&outer), "- -5");
    }

    #[test]
    fn strings_are_requoted_with_escapes() {
        assert_eq!(quote_string("a\"b\n"), r#""a\"b\n""#);
        assert_eq!(reprint("'it\\'s'"), r#""it's""#);
    }

    #[test]
    fn enum_prints_one_member_per_line() {
        let unit = parse("export enum Color { Red, Green = 2 }", "e.ts").unwrap();
        assert_eq!(
            print_source_unit(&unit),
            "export enum Color {\n    Red,\n    Green = 2,\n}\n"
        );
    }

    #[test]
    fn object_literal_arrow_body_is_wrapped() {
        assert_eq!(reprint("() => ({ a: 1 })"), "() => ({ a: 1 })");
    }
}
