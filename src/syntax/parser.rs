//! Spoof parser.
//!
//! Converts TypeScript source into a [`SourceUnit`]. Purely syntactic: no
//! name resolution and no type checking. Comments are dropped except the
//! triple-slash reference directives at the top of the file, which fill the
//! unit's metadata.

use once_cell::sync::Lazy;
use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use regex::Regex;

use crate::errors::{to_source_span, SourceContext, SpoofError};
use crate::syntax::factory::NodeFactory;
use crate::syntax::{
    ArrowBody, ArrowFunction, AssignOp, BinaryOp, Declarator, EnumDecl, EnumMember, Expr,
    ExprNode, FunctionDecl, MemberName, Modifier, NumericLiteral, Param, Property, PropertyKey,
    SourceUnit, Span, Spanned, Stmt, StmtNode, TypeAnnotation, UnaryOp, VarDecl, VarKind,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SpoofParser;

static PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::op_nullish, Assoc::Left))
        .op(Op::infix(Rule::op_or, Assoc::Left))
        .op(Op::infix(Rule::op_and, Assoc::Left))
        .op(Op::infix(Rule::op_eq, Assoc::Left)
            | Op::infix(Rule::op_ne, Assoc::Left)
            | Op::infix(Rule::op_strict_eq, Assoc::Left)
            | Op::infix(Rule::op_strict_ne, Assoc::Left))
        .op(Op::infix(Rule::op_lt, Assoc::Left)
            | Op::infix(Rule::op_gt, Assoc::Left)
            | Op::infix(Rule::op_le, Assoc::Left)
            | Op::infix(Rule::op_ge, Assoc::Left))
        .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_sub, Assoc::Left))
        .op(Op::infix(Rule::op_mul, Assoc::Left)
            | Op::infix(Rule::op_div, Assoc::Left)
            | Op::infix(Rule::op_mod, Assoc::Left))
});

static REFERENCE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^///\s*<reference\s+(path|types|lib|no-default-lib)\s*=\s*["']([^"']*)["']\s*/>"#)
        .expect("reference directive pattern is valid")
});

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a whole file.
pub fn parse(source_text: &str, file_name: &str) -> Result<SourceUnit, SpoofError> {
    let source = SourceContext::from_file(file_name, source_text);
    let mut unit = SourceUnit::new(file_name);
    collect_reference_directives(source_text, &mut unit);

    let mut pairs = SpoofParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, &source))?;
    let program = pairs
        .next()
        .ok_or_else(|| source.parse_error("empty parse result", Span::default(), None))?;

    let builder = Builder::new(&source);
    unit.statements = program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| builder.statement(p))
        .collect::<Result<_, _>>()?;
    Ok(unit)
}

/// Parse a single expression, e.g. for configuration values and tests.
pub fn parse_expression(source_text: &str) -> Result<ExprNode, SpoofError> {
    let source = SourceContext::from_file("<expression>", source_text);
    let mut pairs = SpoofParser::parse(Rule::single_expr, source_text)
        .map_err(|e| convert_parse_error(e, &source))?;
    let builder = Builder::new(&source);
    let expr = pairs
        .next()
        .and_then(|p| p.into_inner().find(|p| p.as_rule() == Rule::expr))
        .ok_or_else(|| source.parse_error("expected an expression", Span::default(), None))?;
    builder.expr(expr)
}

// ============================================================================
// REFERENCE DIRECTIVES
// ============================================================================

/// Scan the leading comment block for `/// <reference ... />` lines.
fn collect_reference_directives(source_text: &str, unit: &mut SourceUnit) {
    let mut in_block_comment = false;
    for line in source_text.lines() {
        let line = line.trim();
        if in_block_comment {
            in_block_comment = !line.contains("*/");
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if line.starts_with("/*") {
            in_block_comment = !line.contains("*/");
            continue;
        }
        if !line.starts_with("//") {
            break;
        }
        let Some(caps) = REFERENCE_DIRECTIVE.captures(line) else {
            continue;
        };
        let value = caps[2].to_string();
        match &caps[1] {
            "path" => unit.referenced_files.push(value),
            "types" => unit.type_reference_directives.push(value),
            "lib" => unit.lib_reference_directives.push(value),
            _ => unit.has_no_default_lib = value == "true",
        }
    }
}

// ============================================================================
// AST BUILDERS
// ============================================================================

struct Builder<'s> {
    source: &'s SourceContext,
    factory: NodeFactory,
}

impl<'s> Builder<'s> {
    fn new(source: &'s SourceContext) -> Self {
        Self {
            source,
            factory: NodeFactory::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn statement(&self, pair: Pair<Rule>) -> Result<StmtNode, SpoofError> {
        let span = get_span(&pair);
        let stmt = match pair.as_rule() {
            Rule::enum_decl => Stmt::Enum(self.enum_decl(pair)?),
            Rule::function_decl => Stmt::Function(self.function_decl(pair)?),
            Rule::var_decl => Stmt::Var(self.var_decl(pair)?),
            Rule::return_stmt => {
                let value = significant(pair).next().map(|p| self.expr(p)).transpose()?;
                Stmt::Return(value)
            }
            Rule::if_stmt => {
                let mut inner = significant(pair);
                let test = self.expr(self.expect(inner.next(), "if condition", span)?)?;
                let consequent = self.statement(self.expect(inner.next(), "if body", span)?)?;
                let alternate = inner.next().map(|p| self.statement(p)).transpose()?;
                Stmt::If {
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::block => Stmt::Block(self.statements(pair)?),
            Rule::empty_stmt => Stmt::Empty,
            Rule::expr_stmt => {
                let inner = self.expect(pair.into_inner().next(), "expression", span)?;
                Stmt::Expr(self.expr(inner)?)
            }
            rule => return Err(self.unsupported(rule, span)),
        };
        Ok(self.factory.stmt(stmt, span))
    }

    fn statements(&self, pair: Pair<Rule>) -> Result<Vec<StmtNode>, SpoofError> {
        pair.into_inner().map(|p| self.statement(p)).collect()
    }

    fn enum_decl(&self, pair: Pair<Rule>) -> Result<EnumDecl, SpoofError> {
        let span = get_span(&pair);
        let mut modifiers = Vec::new();
        let mut name = None;
        let mut members = Vec::new();

        for item in significant(pair) {
            match item.as_rule() {
                Rule::modifier => modifiers.push(modifier_of(item.as_str())),
                Rule::enum_const => modifiers.push(Modifier::Const),
                Rule::ident => name = Some(item.as_str().to_string()),
                Rule::enum_member => members.push(self.enum_member(item)?),
                rule => return Err(self.unsupported(rule, get_span(&item))),
            }
        }

        Ok(EnumDecl {
            modifiers,
            name: name.ok_or_else(|| self.missing("enum name", span))?,
            members,
        })
    }

    fn enum_member(&self, pair: Pair<Rule>) -> Result<Spanned<EnumMember>, SpoofError> {
        let span = get_span(&pair);
        let mut inner = pair.into_inner();
        let name_pair = self.expect(inner.next(), "enum member name", span)?;
        let name = match name_pair.as_rule() {
            Rule::ident_name => MemberName::Identifier(name_pair.as_str().to_string()),
            Rule::string => MemberName::String(self.string_value(name_pair)?),
            Rule::computed_name => {
                let inner = self.expect(name_pair.into_inner().next(), "computed name", span)?;
                MemberName::Computed(self.expr(inner)?)
            }
            rule => return Err(self.unsupported(rule, get_span(&name_pair))),
        };
        let initializer = inner.next().map(|p| self.expr(p)).transpose()?;
        Ok(Spanned::new(EnumMember { name, initializer }, span))
    }

    fn function_decl(&self, pair: Pair<Rule>) -> Result<FunctionDecl, SpoofError> {
        let span = get_span(&pair);
        let mut modifiers = Vec::new();
        let mut name = None;
        let mut params = Vec::new();
        let mut return_type = None;
        let mut body = None;

        for item in significant(pair) {
            match item.as_rule() {
                Rule::modifier => modifiers.push(modifier_of(item.as_str())),
                Rule::ident => name = Some(item.as_str().to_string()),
                Rule::params => params = self.params(item)?,
                Rule::type_ann => return_type = Some(type_annotation(&item)),
                Rule::block => body = Some(self.statements(item)?),
                rule => return Err(self.unsupported(rule, get_span(&item))),
            }
        }

        Ok(FunctionDecl {
            modifiers,
            name: name.ok_or_else(|| self.missing("function name", span))?,
            params,
            return_type,
            body: body.ok_or_else(|| self.missing("function body", span))?,
        })
    }

    fn params(&self, pair: Pair<Rule>) -> Result<Vec<Param>, SpoofError> {
        pair.into_inner()
            .map(|param| {
                let span = get_span(&param);
                let mut inner = param.into_inner();
                let name = self.expect(inner.next(), "parameter name", span)?;
                Ok(Param {
                    name: name.as_str().to_string(),
                    type_annotation: inner.next().map(|t| type_annotation(&t)),
                })
            })
            .collect()
    }

    fn var_decl(&self, pair: Pair<Rule>) -> Result<VarDecl, SpoofError> {
        let span = get_span(&pair);
        let mut modifiers = Vec::new();
        let mut kind = None;
        let mut declarators = Vec::new();

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::modifier => modifiers.push(modifier_of(item.as_str())),
                Rule::var_kind => kind = Some(var_kind_of(item.as_str())),
                Rule::declarator => declarators.push(self.declarator(item)?),
                rule => return Err(self.unsupported(rule, get_span(&item))),
            }
        }

        Ok(VarDecl {
            modifiers,
            kind: kind.ok_or_else(|| self.missing("declaration keyword", span))?,
            declarators,
        })
    }

    fn declarator(&self, pair: Pair<Rule>) -> Result<Declarator, SpoofError> {
        let span = get_span(&pair);
        let mut name = None;
        let mut type_ann = None;
        let mut init = None;
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::ident => name = Some(item.as_str().to_string()),
                Rule::type_ann => type_ann = Some(type_annotation(&item)),
                _ => init = Some(self.expr(item)?),
            }
        }
        Ok(Declarator {
            name: name.ok_or_else(|| self.missing("variable name", span))?,
            type_annotation: type_ann,
            init,
        })
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn expr(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        let span = get_span(&pair);
        match pair.as_rule() {
            Rule::expr => self.assignment(pair),
            Rule::arrow_fn => self.arrow(pair),
            Rule::conditional => {
                let mut inner = pair.into_inner();
                let test = self.expr(self.expect(inner.next(), "expression", span)?)?;
                match (inner.next(), inner.next()) {
                    (Some(consequent), Some(alternate)) => Ok(self.factory.expr(
                        Expr::Conditional {
                            test,
                            consequent: self.expr(consequent)?,
                            alternate: self.expr(alternate)?,
                        },
                        span,
                    )),
                    _ => Ok(test),
                }
            }
            Rule::binary => self.binary(pair),
            Rule::unary => self.unary(pair),
            Rule::postfix => self.postfix(pair),
            Rule::number => Ok(self.factory.expr(Expr::Number(self.number(&pair)?), span)),
            Rule::string => Ok(self.factory.expr(Expr::String(self.string_value(pair)?), span)),
            Rule::boolean => Ok(self.factory.expr(Expr::Bool(pair.as_str() == "true"), span)),
            Rule::null_lit => Ok(self.factory.expr(Expr::Null, span)),
            Rule::ident => Ok(self.factory.create_identifier(pair.as_str(), span)),
            Rule::array => {
                let elements = pair
                    .into_inner()
                    .map(|p| self.expr(p))
                    .collect::<Result<_, _>>()?;
                Ok(self.factory.create_array_literal(elements, span))
            }
            Rule::object => {
                let properties = pair
                    .into_inner()
                    .map(|p| self.property(p))
                    .collect::<Result<_, _>>()?;
                Ok(self.factory.expr(Expr::Object(properties), span))
            }
            Rule::paren => {
                let inner = self.expect(pair.into_inner().next(), "expression", span)?;
                Ok(self.factory.expr(Expr::Paren(self.expr(inner)?), span))
            }
            Rule::spread => {
                let inner = self.expect(pair.into_inner().next(), "spread operand", span)?;
                Ok(self.factory.create_spread(self.expr(inner)?, span))
            }
            rule => Err(self.unsupported(rule, span)),
        }
    }

    fn assignment(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        let span = get_span(&pair);
        let mut inner = pair.into_inner();
        let target = self.expr(self.expect(inner.next(), "expression", span)?)?;
        let Some(op) = inner.next() else {
            return Ok(target);
        };
        let op = assign_op_of(op.as_str());
        let value = self.expr(self.expect(inner.next(), "assigned value", span)?)?;

        if !is_assignment_target(&target.value) {
            return Err(self.source.parse_error(
                "invalid assignment target",
                target.span,
                Some(format!("cannot assign to a {}", target.value.kind_name())),
            ));
        }
        Ok(self.factory.expr(Expr::Assign { op, target, value }, span))
    }

    fn arrow(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        let span = get_span(&pair);
        let mut params = Vec::new();
        let mut return_type = None;
        let mut body = None;

        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::arrow_params => {
                    for p in item.into_inner() {
                        match p.as_rule() {
                            Rule::ident => params.push(Param {
                                name: p.as_str().to_string(),
                                type_annotation: None,
                            }),
                            _ => params = self.params(p)?,
                        }
                    }
                }
                Rule::type_ann => return_type = Some(type_annotation(&item)),
                Rule::block => body = Some(ArrowBody::Block(self.statements(item)?)),
                _ => body = Some(ArrowBody::Expr(self.expr(item)?)),
            }
        }

        let body = body.ok_or_else(|| self.missing("arrow function body", span))?;
        Ok(self.factory.expr(
            Expr::Arrow(ArrowFunction {
                params,
                return_type,
                body,
            }),
            span,
        ))
    }

    fn binary(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        PRATT
            .map_primary(|primary| self.expr(primary))
            .map_infix(|left, op, right| {
                let (left, right) = (left?, right?);
                let op_span = get_span(&op);
                let op = binary_op_of(op.as_rule()).ok_or_else(|| self.unsupported(op.as_rule(), op_span))?;
                let span = Span::new(left.span.start, right.span.end);
                Ok(self.factory.create_binary(left, op, right, span))
            })
            .parse(pair.into_inner())
    }

    fn unary(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        let span = get_span(&pair);
        let mut ops = Vec::new();
        let mut operand = None;

        for item in pair.into_inner() {
            if item.as_rule() != Rule::prefix_op {
                operand = Some(self.expr(item)?);
                continue;
            }
            let op_span = get_span(&item);
            let op = item
                .into_inner()
                .next()
                .and_then(|p| unary_op_of(p.as_rule()))
                .ok_or_else(|| self.missing("unary operator", op_span))?;
            ops.push((op, op_span.start));
        }

        let mut node = operand.ok_or_else(|| self.missing("operand", span))?;
        for (op, start) in ops.into_iter().rev() {
            let span = Span::new(start, node.span.end);
            node = self.factory.create_prefix_unary(op, node, span);
        }
        Ok(node)
    }

    fn postfix(&self, pair: Pair<Rule>) -> Result<ExprNode, SpoofError> {
        let span = get_span(&pair);
        let mut inner = pair.into_inner();
        let mut node = self.expr(self.expect(inner.next(), "primary expression", span)?)?;

        for op in inner {
            let op_span = Span::new(span.start, op.as_span().end());
            node = match op.as_rule() {
                Rule::call_args => {
                    let args = op
                        .into_inner()
                        .map(|a| self.expr(a))
                        .collect::<Result<_, _>>()?;
                    self.factory.create_call(node, args, op_span)
                }
                Rule::member_access => {
                    let name = self.expect(op.into_inner().next(), "property name", op_span)?;
                    self.factory.create_property_access(node, name.as_str(), op_span)
                }
                Rule::index_access => {
                    let index = self.expect(op.into_inner().next(), "index expression", op_span)?;
                    self.factory.create_element_access(node, self.expr(index)?, op_span)
                }
                rule => return Err(self.unsupported(rule, op_span)),
            };
        }
        Ok(node)
    }

    fn property(&self, pair: Pair<Rule>) -> Result<Property, SpoofError> {
        let span = get_span(&pair);
        match pair.as_rule() {
            Rule::spread => {
                let inner = self.expect(pair.into_inner().next(), "spread operand", span)?;
                Ok(Property::Spread(self.expr(inner)?))
            }
            Rule::shorthand => Ok(Property::Shorthand(pair.as_str().trim().to_string())),
            Rule::key_value => {
                let mut inner = pair.into_inner();
                let key_pair = self.expect(inner.next(), "property key", span)?;
                let key = match key_pair.as_rule() {
                    Rule::ident_name => PropertyKey::Identifier(key_pair.as_str().to_string()),
                    Rule::string => PropertyKey::String(self.string_value(key_pair)?),
                    Rule::number => PropertyKey::Number(self.number(&key_pair)?),
                    Rule::computed_name => {
                        let expr = self.expect(key_pair.into_inner().next(), "computed key", span)?;
                        PropertyKey::Computed(self.expr(expr)?)
                    }
                    rule => return Err(self.unsupported(rule, get_span(&key_pair))),
                };
                let value = self.expr(self.expect(inner.next(), "property value", span)?)?;
                Ok(Property::KeyValue { key, value })
            }
            rule => Err(self.unsupported(rule, span)),
        }
    }

    // ------------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------------

    fn number(&self, pair: &Pair<Rule>) -> Result<NumericLiteral, SpoofError> {
        let text = pair.as_str();
        let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(|v| v as f64).ok(),
            None => text.parse::<f64>().ok(),
        };
        let value = value.ok_or_else(|| {
            self.source
                .parse_error(format!("invalid numeric literal `{text}`"), get_span(pair), None)
        })?;
        Ok(NumericLiteral {
            text: text.to_string(),
            value,
        })
    }

    fn string_value(&self, pair: Pair<Rule>) -> Result<String, SpoofError> {
        let span = get_span(&pair);
        let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
        unescape_string(raw).map_err(|sequence| SpoofError::InvalidEscape {
            sequence,
            src: self.source.to_named_source(),
            span: to_source_span(span),
        })
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    fn expect<'i>(
        &self,
        pair: Option<Pair<'i, Rule>>,
        element: &str,
        span: Span,
    ) -> Result<Pair<'i, Rule>, SpoofError> {
        pair.ok_or_else(|| self.missing(element, span))
    }

    fn missing(&self, element: &str, span: Span) -> SpoofError {
        self.source.parse_error(format!("missing {element}"), span, None)
    }

    fn unsupported(&self, rule: Rule, span: Span) -> SpoofError {
        self.source
            .parse_error(format!("unsupported syntax: {}", rule_label(rule)), span, None)
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span::new(pair.as_span().start(), pair.as_span().end())
}

/// Inner pairs without the keyword tokens the grammar keeps for atomicity.
fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| {
        !matches!(
            p.as_rule(),
            Rule::kw_function | Rule::kw_enum | Rule::kw_return | Rule::kw_if | Rule::kw_else
        )
    })
}

fn type_annotation(pair: &Pair<Rule>) -> TypeAnnotation {
    TypeAnnotation(pair.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}

fn modifier_of(text: &str) -> Modifier {
    match text {
        "declare" => Modifier::Declare,
        _ => Modifier::Export,
    }
}

fn var_kind_of(text: &str) -> VarKind {
    match text {
        "let" => VarKind::Let,
        "var" => VarKind::Var,
        _ => VarKind::Const,
    }
}

fn assign_op_of(text: &str) -> AssignOp {
    match text {
        "+=" => AssignOp::Add,
        "-=" => AssignOp::Sub,
        "*=" => AssignOp::Mul,
        "/=" => AssignOp::Div,
        _ => AssignOp::Assign,
    }
}

fn binary_op_of(rule: Rule) -> Option<BinaryOp> {
    let op = match rule {
        Rule::op_nullish => BinaryOp::Nullish,
        Rule::op_or => BinaryOp::Or,
        Rule::op_and => BinaryOp::And,
        Rule::op_eq => BinaryOp::Eq,
        Rule::op_ne => BinaryOp::NotEq,
        Rule::op_strict_eq => BinaryOp::StrictEq,
        Rule::op_strict_ne => BinaryOp::StrictNotEq,
        Rule::op_lt => BinaryOp::Lt,
        Rule::op_gt => BinaryOp::Gt,
        Rule::op_le => BinaryOp::LtEq,
        Rule::op_ge => BinaryOp::GtEq,
        Rule::op_add => BinaryOp::Add,
        Rule::op_sub => BinaryOp::Sub,
        Rule::op_mul => BinaryOp::Mul,
        Rule::op_div => BinaryOp::Div,
        Rule::op_mod => BinaryOp::Mod,
        _ => return None,
    };
    Some(op)
}

fn unary_op_of(rule: Rule) -> Option<UnaryOp> {
    match rule {
        Rule::op_neg => Some(UnaryOp::Neg),
        Rule::op_plus => Some(UnaryOp::Plus),
        Rule::op_not => Some(UnaryOp::Not),
        Rule::op_typeof => Some(UnaryOp::Typeof),
        _ => None,
    }
}

fn is_assignment_target(expr: &Expr) -> bool {
    match expr {
        Expr::Identifier(_) | Expr::Member { .. } | Expr::Index { .. } => true,
        Expr::Paren(inner) => is_assignment_target(&inner.value),
        _ => false,
    }
}

/// Decode the body of a string literal. On failure returns the offending
/// escape sequence.
pub(crate) fn unescape_string(raw: &str) -> Result<String, String> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err("\\".to_string());
        };
        match escaped {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'b' => result.push('\u{8}'),
            'f' => result.push('\u{c}'),
            'v' => result.push('\u{b}'),
            '0' => result.push('\0'),
            // Line continuation.
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                let code = u32::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == 2)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("\\x{digits}"))?;
                result.push(code);
            }
            'u' => {
                let unit = read_unicode_escape(&mut chars)?;
                if (0xD800..0xDC00).contains(&unit) {
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => read_unicode_escape(&mut lookahead).ok(),
                        _ => None,
                    };
                    let Some(low) = low.filter(|low| (0xDC00..0xE000).contains(low)) else {
                        return Err(format!("\\u{unit:X}"));
                    };
                    chars = lookahead;
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    result.push(char::from_u32(combined).ok_or_else(|| format!("\\u{unit:X}"))?);
                } else {
                    result.push(char::from_u32(unit).ok_or_else(|| format!("\\u{unit:X}"))?);
                }
            }
            other => result.push(other),
        }
    }

    Ok(result)
}

fn read_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<u32, String> {
    let digits: String = if chars.peek() == Some(&'{') {
        chars.next();
        let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
        if digits.is_empty() || digits.len() > 6 {
            return Err(format!("\\u{{{digits}}}"));
        }
        digits
    } else {
        let digits: String = chars.by_ref().take(4).collect();
        if digits.len() != 4 {
            return Err(format!("\\u{digits}"));
        }
        digits
    };
    u32::from_str_radix(&digits, 16).map_err(|_| format!("\\u{digits}"))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn rule_label(rule: Rule) -> String {
    let label = match rule {
        Rule::EOI => "end of input",
        Rule::expr | Rule::single_expr => "expression",
        Rule::ident | Rule::ident_name => "identifier",
        Rule::string => "string literal",
        Rule::number => "numeric literal",
        Rule::type_ann => "type",
        Rule::block => "block",
        Rule::enum_decl => "enum declaration",
        Rule::function_decl => "function declaration",
        Rule::var_decl => "variable declaration",
        Rule::return_stmt => "return statement",
        Rule::if_stmt => "if statement",
        Rule::empty_stmt => "`;`",
        Rule::expr_stmt => "statement",
        Rule::assign_op => "assignment operator",
        Rule::call_args => "call arguments",
        Rule::member_access => "`.`",
        Rule::index_access => "`[`",
        Rule::enum_member => "enum member",
        Rule::declarator => "declarator",
        Rule::param | Rule::params => "parameter",
        Rule::kw_else => "`else`",
        Rule::kw_enum => "`enum`",
        Rule::kw_function => "`function`",
        other => return format!("{other:?}"),
    };
    label.to_string()
}

fn convert_parse_error(error: pest::error::Error<Rule>, source: &SourceContext) -> SpoofError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };

    let help = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut expected: Vec<String> = positives.iter().map(|r| rule_label(*r)).collect();
            expected.dedup();
            Some(format!("expected {}", expected.join(", ")))
        }
        _ => None,
    };

    let content = &source.content;
    let message = match content.get(span.start..).and_then(|rest| rest.chars().next()) {
        None => "unexpected end of input".to_string(),
        Some(ch) => format!("unexpected `{ch}`"),
    };
    source.parse_error(message, span, help)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let unit = parse("", "empty.ts").unwrap();
        assert!(unit.statements.is_empty());
    }

    #[test]
    fn test_comments_only() {
        let unit = parse("// nothing here\n/* or here */", "c.ts").unwrap();
        assert!(unit.statements.is_empty());
    }

    #[test]
    fn test_unclosed_call_reports_error() {
        let err = parse("print(\"a\"", "bad.ts").unwrap_err();
        assert_eq!(err.code_str(), "spoof::parse");
    }

    #[test]
    fn unescape_handles_common_sequences() {
        assert_eq!(unescape_string(r"a\nb\t\\").unwrap(), "a\nb\t\\");
        assert_eq!(unescape_string(r"\x41B\u{43}").unwrap(), "ABC");
        assert_eq!(unescape_string(r"\uD83D\uDE00").unwrap(), "\u{1F600}");
        assert_eq!(unescape_string(r"\q").unwrap(), "q");
    }

    #[test]
    fn unescape_rejects_lone_surrogates() {
        assert!(unescape_string(r"\uD83D").is_err());
        assert!(unescape_string(r"\xZZ").is_err());
    }

    #[test]
    fn directives_are_read_from_the_leading_comments() {
        let src = "/* header */\n/// <reference path=\"./a.ts\" />\n/// <reference types=\"node\" />\n/// <reference lib=\"es2015\" />\n/// <reference no-default-lib=\"true\"/>\nconst x = 1;\n/// <reference path=\"./ignored.ts\" />\n";
        let unit = parse(src, "main.ts").unwrap();
        assert_eq!(unit.referenced_files, vec!["./a.ts"]);
        assert_eq!(unit.type_reference_directives, vec!["node"]);
        assert_eq!(unit.lib_reference_directives, vec!["es2015"]);
        assert!(unit.has_no_default_lib);
    }

    #[test]
    fn binary_precedence_follows_javascript() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        let Expr::Binary { op, right, .. } = &*expr.value else {
            panic!("expected a binary expression, got {:?}", expr.value);
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(&*right.value, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn assignment_to_a_literal_is_rejected() {
        assert!(parse("1 = 2;", "a.ts").is_err());
    }
}
