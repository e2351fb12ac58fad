//! Tree walker.
//!
//! Visits every node of a statement list. Matched markers are handed to the
//! [`Synthesizer`] and replaced wholesale; everything else is rebuilt from
//! its visited children through the factory's `update_*` functions, so an
//! untouched subtree comes back as the same `Arc`.

use crate::pass::config::PassConfig;
use crate::pass::matcher::{
    classify_call, classify_enum, spoofable_member_name, RewriteTarget, SPOOF_ENUM_SUFFIX,
};
use crate::pass::sampler::Sampler;
use crate::pass::sink::DiagnosticSink;
use crate::pass::synth::Synthesizer;
use crate::syntax::factory::NodeFactory;
use crate::syntax::printer::{print_expr, quote_string};
use crate::syntax::{
    ArrowBody, ArrowFunction, Declarator, EnumDecl, EnumMember, Expr, ExprNode, FunctionDecl,
    MemberName, Property, PropertyKey, Spanned, Stmt, StmtNode, VarDecl,
};

pub struct Walker<'a, S, D> {
    config: &'a PassConfig,
    factory: NodeFactory,
    synth: Synthesizer<'a, S>,
    sink: &'a mut D,
    file_name: &'a str,
}

impl<'a, S: Sampler, D: DiagnosticSink> Walker<'a, S, D> {
    pub fn new(
        config: &'a PassConfig,
        factory: NodeFactory,
        sampler: &'a mut S,
        sink: &'a mut D,
        file_name: &'a str,
    ) -> Self {
        Self {
            config,
            factory,
            synth: Synthesizer::new(factory, sampler, &config.decoder),
            sink,
            file_name,
        }
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    /// Each input statement yields zero or more output statements, in order.
    pub fn visit_statements(&mut self, statements: &[StmtNode]) -> Vec<StmtNode> {
        statements
            .iter()
            .flat_map(|stmt| self.visit_statement(stmt))
            .collect()
    }

    fn visit_statement(&mut self, stmt: &StmtNode) -> Vec<StmtNode> {
        vec![self.visit_stmt(stmt)]
    }

    pub fn visit_stmt(&mut self, stmt: &StmtNode) -> StmtNode {
        let updated = match &*stmt.value {
            Stmt::Enum(decl) => return self.visit_enum(stmt, decl),
            Stmt::Empty => return stmt.clone(),
            Stmt::Expr(expr) => Stmt::Expr(self.visit_expr(expr)),
            Stmt::Var(decl) => Stmt::Var(VarDecl {
                modifiers: decl.modifiers.clone(),
                kind: decl.kind,
                declarators: decl
                    .declarators
                    .iter()
                    .map(|d| Declarator {
                        name: d.name.clone(),
                        type_annotation: d.type_annotation.clone(),
                        init: self.visit_opt(&d.init),
                    })
                    .collect(),
            }),
            Stmt::Function(decl) => Stmt::Function(FunctionDecl {
                modifiers: decl.modifiers.clone(),
                name: decl.name.clone(),
                params: decl.params.clone(),
                return_type: decl.return_type.clone(),
                body: self.visit_statements(&decl.body),
            }),
            Stmt::Return(value) => Stmt::Return(self.visit_opt(value)),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => Stmt::If {
                test: self.visit_expr(test),
                consequent: self.visit_stmt(consequent),
                alternate: alternate.as_ref().map(|s| self.visit_stmt(s)),
            },
            Stmt::Block(body) => Stmt::Block(self.visit_statements(body)),
        };
        self.factory.update_stmt(stmt, updated)
    }

    fn visit_enum(&mut self, stmt: &StmtNode, decl: &EnumDecl) -> StmtNode {
        let target = matches!(
            classify_enum(decl, self.config),
            RewriteTarget::SpoofEnum { .. }
        );

        let members = decl
            .members
            .iter()
            .map(|member| match spoofable_member_name(&member.value) {
                Some(name) if target => self.synth.spoof_member(name, member.span),
                None if target => {
                    self.report(&format!(
                        "{SPOOF_ENUM_SUFFIX} enum `{}` in {}: member {} has no identifier name and is left unchanged",
                        decl.name,
                        self.file_name,
                        describe_member(&member.value.name)
                    ));
                    self.visit_member(member)
                }
                _ => self.visit_member(member),
            })
            .collect();

        self.factory.update_enum_declaration(stmt, decl, members)
    }

    fn visit_member(&mut self, member: &Spanned<EnumMember>) -> Spanned<EnumMember> {
        let name = match &member.value.name {
            MemberName::Computed(expr) => MemberName::Computed(self.visit_expr(expr)),
            other => other.clone(),
        };
        Spanned::new(
            EnumMember {
                name,
                initializer: self.visit_opt(&member.value.initializer),
            },
            member.span,
        )
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    pub fn visit_expr(&mut self, expr: &ExprNode) -> ExprNode {
        if let Expr::Call { callee, args } = &*expr.value {
            match classify_call(callee, args, self.config) {
                RewriteTarget::StringSpoof { text } => {
                    return self.synth.string_spoof(text, expr.span)
                }
                RewriteTarget::OffsetSpoof {
                    text,
                    offset,
                    value,
                } => return self.synth.offset_spoof(text, offset, value, expr.span),
                RewriteTarget::Uuid => return self.synth.uuid_literal(expr.span),
                RewriteTarget::NotATarget(Some(rejection)) => {
                    self.report(&format!("{}: {}", self.file_name, rejection))
                }
                RewriteTarget::NotATarget(None) | RewriteTarget::SpoofEnum { .. } => {}
            }
        }
        self.visit_children(expr)
    }

    fn visit_children(&mut self, expr: &ExprNode) -> ExprNode {
        let updated = match &*expr.value {
            Expr::Identifier(_)
            | Expr::String(_)
            | Expr::Number(_)
            | Expr::Bool(_)
            | Expr::Null => return expr.clone(),
            Expr::Array(elements) => Expr::Array(self.visit_exprs(elements)),
            Expr::Object(properties) => Expr::Object(
                properties
                    .iter()
                    .map(|p| self.visit_property(p))
                    .collect(),
            ),
            Expr::Call { callee, args } => Expr::Call {
                callee: self.visit_expr(callee),
                args: self.visit_exprs(args),
            },
            Expr::Member { object, property } => Expr::Member {
                object: self.visit_expr(object),
                property: property.clone(),
            },
            Expr::Index { object, index } => Expr::Index {
                object: self.visit_expr(object),
                index: self.visit_expr(index),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: self.visit_expr(operand),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: self.visit_expr(left),
                right: self.visit_expr(right),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: self.visit_expr(test),
                consequent: self.visit_expr(consequent),
                alternate: self.visit_expr(alternate),
            },
            Expr::Assign { op, target, value } => Expr::Assign {
                op: *op,
                target: self.visit_expr(target),
                value: self.visit_expr(value),
            },
            Expr::Arrow(arrow) => Expr::Arrow(ArrowFunction {
                params: arrow.params.clone(),
                return_type: arrow.return_type.clone(),
                body: match &arrow.body {
                    ArrowBody::Expr(body) => ArrowBody::Expr(self.visit_expr(body)),
                    ArrowBody::Block(body) => ArrowBody::Block(self.visit_statements(body)),
                },
            }),
            Expr::Spread(inner) => Expr::Spread(self.visit_expr(inner)),
            Expr::Paren(inner) => Expr::Paren(self.visit_expr(inner)),
        };
        self.factory.update_expr(expr, updated)
    }

    fn visit_property(&mut self, property: &Property) -> Property {
        match property {
            Property::KeyValue { key, value } => Property::KeyValue {
                key: match key {
                    PropertyKey::Computed(expr) => PropertyKey::Computed(self.visit_expr(expr)),
                    other => other.clone(),
                },
                value: self.visit_expr(value),
            },
            Property::Shorthand(name) => Property::Shorthand(name.clone()),
            Property::Spread(inner) => Property::Spread(self.visit_expr(inner)),
        }
    }

    fn visit_exprs(&mut self, exprs: &[ExprNode]) -> Vec<ExprNode> {
        exprs.iter().map(|e| self.visit_expr(e)).collect()
    }

    fn visit_opt(&mut self, expr: &Option<ExprNode>) -> Option<ExprNode> {
        expr.as_ref().map(|e| self.visit_expr(e))
    }

    fn report(&mut self, message: &str) {
        if self.config.verbose {
            self.sink.emit(message);
        }
    }
}

fn describe_member(name: &MemberName) -> String {
    match name {
        MemberName::Identifier(name) => name.clone(),
        MemberName::String(text) => quote_string(text),
        MemberName::Computed(expr) => format!("[{}]", print_expr(expr)),
    }
}
