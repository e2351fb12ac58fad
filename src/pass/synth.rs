//! Replacement synthesis.
//!
//! Pure construction of the rewritten subtrees. Nothing here walks the tree;
//! every node is built through the [`NodeFactory`] and carries the span of
//! the call or member it replaces.

use crate::pass::config::DecoderPath;
use crate::pass::sampler::Sampler;
use crate::syntax::factory::NodeFactory;
use crate::syntax::{
    ArrowBody, BinaryOp, EnumMember, ExprNode, MemberName, Span, Spanned, UnaryOp,
};

/// Per-character offsets are drawn from `[-OFFSET_BOUND, OFFSET_BOUND]`.
pub const OFFSET_BOUND: i64 = 250;

// ============================================================================
// ENCODING
// ============================================================================

/// Encoded character codes and the offset that was added to each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerCharacterEncoding {
    pub encoded: Vec<i64>,
    pub offsets: Vec<i64>,
}

impl PerCharacterEncoding {
    /// Undo the encoding; `None` when a code is not a Unicode scalar value.
    pub fn decode(&self) -> Option<String> {
        self.encoded
            .iter()
            .zip(&self.offsets)
            .map(|(e, r)| u32::try_from(e - r).ok().and_then(char::from_u32))
            .collect()
    }
}

/// Scheme A: an independent random offset per character.
pub fn encode_per_character<S: Sampler>(text: &str, sampler: &mut S) -> PerCharacterEncoding {
    let (encoded, offsets) = text
        .chars()
        .map(|ch| {
            let r = sampler.offset(-OFFSET_BOUND..=OFFSET_BOUND);
            (code_of(ch) + r, r)
        })
        .unzip();
    PerCharacterEncoding { encoded, offsets }
}

/// Scheme B: one offset shared by every character.
pub fn encode_with_offset(text: &str, offset: i64) -> Vec<i64> {
    text.chars().map(|ch| code_of(ch) + offset).collect()
}

fn code_of(ch: char) -> i64 {
    ch as u32 as i64
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

pub struct Synthesizer<'a, S> {
    factory: NodeFactory,
    sampler: &'a mut S,
    decoder: &'a DecoderPath,
}

impl<'a, S: Sampler> Synthesizer<'a, S> {
    pub fn new(factory: NodeFactory, sampler: &'a mut S, decoder: &'a DecoderPath) -> Self {
        Self {
            factory,
            sampler,
            decoder,
        }
    }

    /// `decoder(...[e...].map((x, i) => { return x - [r...][i]; }))`
    pub fn string_spoof(&mut self, text: &str, span: Span) -> ExprNode {
        let encoding = encode_per_character(text, &mut *self.sampler);
        let f = self.factory;

        let offsets = self.number_array(&encoding.offsets, span);
        let lookup = f.create_element_access(offsets, f.create_identifier("i", span), span);
        let difference = f.create_binary(f.create_identifier("x", span), BinaryOp::Sub, lookup, span);
        let body = ArrowBody::Block(vec![f.create_return(Some(difference), span)]);
        let mapper = f.create_arrow_function(
            vec![f.create_parameter("x"), f.create_parameter("i")],
            body,
            span,
        );

        self.decode_call(&encoding.encoded, mapper, span)
    }

    /// `decoder(...[e...].map((x) => x - offset))`, reusing the offset node.
    pub fn offset_spoof(&mut self, text: &str, offset: &ExprNode, value: i64, span: Span) -> ExprNode {
        let f = self.factory;
        let encoded = encode_with_offset(text, value);

        let difference = f.create_binary(
            f.create_identifier("x", span),
            BinaryOp::Sub,
            offset.clone(),
            span,
        );
        let mapper = f.create_arrow_function(
            vec![f.create_parameter("x")],
            ArrowBody::Expr(difference),
            span,
        );

        self.decode_call(&encoded, mapper, span)
    }

    /// A fresh version-4 UUID as a string literal.
    pub fn uuid_literal(&mut self, span: Span) -> ExprNode {
        let uuid = uuid::Builder::from_random_bytes(self.sampler.uuid_bytes()).into_uuid();
        self.factory
            .create_string_literal(uuid.hyphenated().to_string(), span)
    }

    /// `name = "<uuid>"`
    pub fn spoof_member(&mut self, name: &str, span: Span) -> Spanned<EnumMember> {
        let value = self.uuid_literal(span);
        self.factory
            .create_enum_member(MemberName::Identifier(name.to_string()), Some(value), span)
    }

    fn decode_call(&self, codes: &[i64], mapper: ExprNode, span: Span) -> ExprNode {
        let f = self.factory;
        let codes = self.number_array(codes, span);
        let map = f.create_property_access(codes, "map", span);
        let mapped = f.create_call(map, vec![mapper], span);
        let spread = f.create_spread(mapped, span);
        f.create_call(self.decoder_callee(span), vec![spread], span)
    }

    fn decoder_callee(&self, span: Span) -> ExprNode {
        let f = self.factory;
        let mut segments = self.decoder.segments().iter();
        let head = segments.next().map(String::as_str).unwrap_or("string");
        segments.fold(f.create_identifier(head, span), |object, name| {
            f.create_property_access(object, name.as_str(), span)
        })
    }

    fn number_array(&self, values: &[i64], span: Span) -> ExprNode {
        let elements = values.iter().map(|&v| self.signed_number(v, span)).collect();
        self.factory.create_array_literal(elements, span)
    }

    /// Negative values become a prefix `-` on the magnitude.
    fn signed_number(&self, value: i64, span: Span) -> ExprNode {
        let magnitude = self.factory.create_numeric_literal(value.unsigned_abs(), span);
        if value < 0 {
            self.factory.create_prefix_unary(UnaryOp::Neg, magnitude, span)
        } else {
            magnitude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::sampler::DefaultSampler;
    use crate::syntax::printer::print_expr;

    #[test]
    fn per_character_encoding_round_trips() {
        let mut sampler = DefaultSampler::seeded(42);
        let encoding = encode_per_character("héllo 👋", &mut sampler);
        assert_eq!(encoding.encoded.len(), 7);
        assert!(encoding.offsets.iter().all(|r| r.abs() <= OFFSET_BOUND));
        assert_eq!(encoding.decode().as_deref(), Some("héllo 👋"));
    }

    #[test]
    fn shared_offset_shape() {
        let mut sampler = DefaultSampler::seeded(0);
        let decoder = DecoderPath::default();
        let f = NodeFactory::new();
        let mut synth = Synthesizer::new(f, &mut sampler, &decoder);

        let offset = f.create_numeric_literal(5, Span::default());
        let node = synth.offset_spoof("AB", &offset, 5, Span::new(3, 9));
        assert_eq!(node.span, Span::new(3, 9));
        assert_eq!(print_expr(&node), "string.char(...[70, 71].map((x) => x - 5))");
    }

    #[test]
    fn per_character_shape_uses_negated_magnitudes() {
        struct Fixed;
        impl Sampler for Fixed {
            fn offset(&mut self, _range: std::ops::RangeInclusive<i64>) -> i64 {
                -2
            }
            fn uuid_bytes(&mut self) -> [u8; 16] {
                [0; 16]
            }
        }

        let decoder: DecoderPath = "utf8.char".parse().unwrap();
        let mut sampler = Fixed;
        let mut synth = Synthesizer::new(NodeFactory::new(), &mut sampler, &decoder);
        let node = synth.string_spoof("a", Span::default());
        assert_eq!(
            print_expr(&node),
            "utf8.char(...[95].map((x, i) => {\n    return x - [-2][i];\n}))"
        );
    }

    #[test]
    fn uuid_literals_are_version_4() {
        let mut sampler = DefaultSampler::seeded(9);
        let decoder = DecoderPath::default();
        let mut synth = Synthesizer::new(NodeFactory::new(), &mut sampler, &decoder);
        let node = synth.uuid_literal(Span::default());
        let text = node.value.as_string_literal().unwrap().to_string();
        let parsed = uuid::Uuid::parse_str(&text).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        let again = synth.uuid_literal(Span::default());
        assert_ne!(again.value.as_string_literal(), Some(text.as_str()));
    }
}
