//! Property tests for the encoding schemes, over arbitrary Unicode text.

mod common;

use common::{decode, decode_parts, init_of, run_named};
use proptest::prelude::*;
use spoof::pass::PartialPassConfig;
use spoof::syntax::parser::parse;
use spoof::syntax::printer::quote_string;

const PROPTEST_CASES: u32 = 64;
const MAX_STRING_LEN: usize = 40;

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 .,!?]{0,40}",
        prop::collection::vec(any::<char>(), 0..MAX_STRING_LEN)
            .prop_map(|chars| chars.into_iter().collect::<String>()),
    ]
}

fn offset_literal(offset: i64) -> String {
    if offset < 0 {
        format!("-{}", offset.unsigned_abs())
    } else {
        offset.to_string()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn per_character_spoof_round_trips(text in text_strategy(), seed in any::<u64>()) {
        let source = format!("const s = $spoof({});", quote_string(&text));
        let result = run_named("prop.ts", &source, PartialPassConfig::default(), seed);
        let init = init_of(&result.output, 0);

        let (codes, offsets) = decode_parts(&init).expect("rewritten shape");
        prop_assert_eq!(codes.len(), text.chars().count());
        prop_assert!(offsets.iter().all(|r| (-250..=250).contains(r)));
        prop_assert_eq!(decode(&init), Some(text));
    }

    #[test]
    fn shared_offset_round_trips_and_ignores_the_seed(
        text in text_strategy(),
        offset in -1_000_000i64..1_000_000,
        seeds in (any::<u64>(), any::<u64>()),
    ) {
        let source = format!("const s = $spoof({}, {});", quote_string(&text), offset_literal(offset));
        let a = run_named("prop.ts", &source, PartialPassConfig::default(), seeds.0);
        let b = run_named("prop.ts", &source, PartialPassConfig::default(), seeds.1);

        prop_assert_eq!(a.printed(), b.printed());
        let (codes, offsets) = decode_parts(&init_of(&a.output, 0)).expect("rewritten shape");
        prop_assert!(offsets.iter().all(|r| *r == offset));
        prop_assert!(codes.iter().zip(text.chars()).all(|(c, ch)| *c == ch as i64 + offset));
        prop_assert_eq!(decode(&init_of(&a.output, 0)), Some(text));
    }

    #[test]
    fn printed_output_reparses_and_still_decodes(text in text_strategy(), seed in any::<u64>()) {
        let source = format!("const s = $spoof({});", quote_string(&text));
        let result = run_named("prop.ts", &source, PartialPassConfig::default(), seed);

        let reparsed = parse(&result.printed(), "prop.ts").expect("printed output parses");
        prop_assert_eq!(&reparsed, &result.output);
        prop_assert_eq!(decode(&init_of(&reparsed, 0)), Some(text));
    }
}
