//! # Spoof Test Helpers
//!
//! Shared fixtures for the integration tests: running the pass over source
//! text with a seeded sampler, and statically decoding the rewritten calls.

#![allow(dead_code)]

use spoof::pass::matcher::integer_literal;
use spoof::pass::{DefaultSampler, DiagnosticBuffer, PartialPassConfig, Transformer};
use spoof::syntax::parser::parse;
use spoof::syntax::printer::print_source_unit;
use spoof::syntax::{ArrowBody, Expr, ExprNode, SourceUnit, Stmt};
use spoof::Program;

pub const SEED: u64 = 0x5eed;

/// Outcome of one pass over one file.
pub struct Run {
    pub input: SourceUnit,
    pub output: SourceUnit,
    pub diagnostics: Vec<String>,
}

impl Run {
    pub fn printed(&self) -> String {
        print_source_unit(&self.output)
    }
}

pub fn run(source: &str) -> Run {
    run_with(source, PartialPassConfig::default())
}

pub fn run_with(source: &str, overrides: PartialPassConfig) -> Run {
    run_named("main.ts", source, overrides, SEED)
}

pub fn run_named(file_name: &str, source: &str, overrides: PartialPassConfig, seed: u64) -> Run {
    let program = Program::parse_sources([(file_name, source)]).expect("fixture parses");
    let mut transformer = Transformer::with_capabilities(
        &program,
        overrides,
        DefaultSampler::seeded(seed),
        DiagnosticBuffer::new(),
    );
    let output = transformer.transform_file(&program.files()[0]);
    Run {
        input: program.files()[0].clone(),
        output,
        diagnostics: transformer.sink().lines.clone(),
    }
}

pub fn parse_ok(source: &str) -> SourceUnit {
    parse(source, "main.ts").expect("fixture parses")
}

/// Initializer of the `index`th top-level variable declaration.
pub fn init_of(unit: &SourceUnit, index: usize) -> ExprNode {
    unit.statements
        .iter()
        .filter_map(|stmt| match &*stmt.value {
            Stmt::Var(decl) => decl.declarators[0].init.clone(),
            _ => None,
        })
        .nth(index)
        .expect("variable declaration with initializer")
}

// =============================================================================
// STATIC DECODING
// =============================================================================

/// Evaluate `decoder(...[codes].map(mapper))` without a JavaScript runtime.
/// Returns `None` when `expr` does not have that shape.
pub fn decode(expr: &ExprNode) -> Option<String> {
    let (codes, offsets) = decode_parts(expr)?;
    codes
        .iter()
        .zip(offsets)
        .map(|(code, offset)| u32::try_from(code - offset).ok().and_then(char::from_u32))
        .collect()
}

/// Encoded codes and the offset subtracted from each of them.
pub fn decode_parts(expr: &ExprNode) -> Option<(Vec<i64>, Vec<i64>)> {
    let Expr::Call { args, .. } = &*expr.value else {
        return None;
    };
    let [spread] = args.as_slice() else {
        return None;
    };
    let Expr::Spread(mapped) = &*spread.value else {
        return None;
    };
    let Expr::Call { callee, args } = &*mapped.value else {
        return None;
    };
    let Expr::Member { object, property } = &*callee.value else {
        return None;
    };
    if property != "map" {
        return None;
    }
    let codes = int_array(object)?;
    let [mapper] = args.as_slice() else {
        return None;
    };
    let Expr::Arrow(arrow) = &*mapper.value else {
        return None;
    };

    let offsets = match &arrow.body {
        // (x) => x - n
        ArrowBody::Expr(body) => {
            let Expr::Binary { right, .. } = &*body.value else {
                return None;
            };
            vec![integer_literal(right)?; codes.len()]
        }
        // (x, i) => { return x - [r...][i]; }
        ArrowBody::Block(body) => {
            let Stmt::Return(Some(value)) = &*body.first()?.value else {
                return None;
            };
            let Expr::Binary { right, .. } = &*value.value else {
                return None;
            };
            let Expr::Index { object, .. } = &*right.value else {
                return None;
            };
            int_array(object)?
        }
    };
    (offsets.len() == codes.len()).then_some((codes, offsets))
}

fn int_array(expr: &ExprNode) -> Option<Vec<i64>> {
    let Expr::Array(elements) = &*expr.value else {
        return None;
    };
    elements.iter().map(integer_literal).collect()
}

/// Names of the decoder callee, e.g. `["string", "char"]`.
pub fn decoder_of(expr: &ExprNode) -> Option<Vec<String>> {
    let Expr::Call { callee, .. } = &*expr.value else {
        return None;
    };
    let mut names = Vec::new();
    let mut node = callee;
    loop {
        match &*node.value {
            Expr::Member { object, property } => {
                names.push(property.clone());
                node = object;
            }
            Expr::Identifier(name) => {
                names.push(name.clone());
                break;
            }
            _ => return None,
        }
    }
    names.reverse();
    Some(names)
}
