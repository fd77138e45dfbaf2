//! External tests for the segment tokenizer: delimiter precedence,
//! fallback policy, and the round-trip property.

use ask_jojo::error::MarkupError;
use ask_jojo::segment::{rejoin, tokenize, tokenize_strict, MathDisplay, SegmentKind};

// -- Precedence -------------------------------------------------------------

#[test]
fn test_doubled_marker_is_block_never_two_inline() {
    let segments = tokenize("$$x$$");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Math);
    assert_eq!(segments[0].display, MathDisplay::Block);
    assert_eq!(segments[0].content, "x");
}

#[test]
fn test_inline_and_block_coexist() {
    let segments = tokenize("inline $a$ and block $$b$$ here");
    let math: Vec<_> = segments.iter().filter(|s| s.is_math()).collect();
    assert_eq!(math.len(), 2);
    assert_eq!(math[0].display, MathDisplay::Inline);
    assert_eq!(math[1].display, MathDisplay::Block);
}

// -- Plain text -------------------------------------------------------------

#[test]
fn test_plain_text_is_one_verbatim_segment() {
    let segments = tokenize("no math here");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Text);
    assert_eq!(segments[0].content, "no math here");
}

#[test]
fn test_empty_input_yields_empty_sequence() {
    assert!(tokenize("").is_empty());
}

// -- Empty and unterminated delimiters --------------------------------------

#[test]
fn test_empty_delimiters_are_empty_math_not_errors() {
    assert_eq!(tokenize("$$")[0].content, "");
    assert_eq!(tokenize("$$$$")[0].content, "");
    assert!(tokenize_strict("$$$$").is_ok());
}

#[test]
fn test_unterminated_marker_falls_back_to_literal_text() {
    let segments = tokenize("costs $12 per unit");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].kind, SegmentKind::Text);
}

#[test]
fn test_strict_mode_reports_offset() {
    match tokenize_strict("ok $good$ bad $") {
        Err(MarkupError::UnterminatedDelimiter { offset }) => assert_eq!(offset, 14),
        other => panic!("expected unterminated delimiter, got {:?}", other),
    }
}

// -- Round trip -------------------------------------------------------------

#[test]
fn test_round_trip_on_tutoring_content() {
    let inputs = [
        "Convert the number $0.00000000031$ to the form $\\pm a \\times 10^{n}$.",
        "step 3:\n\n$$0.00000000031 = 3.1 \\times 10^{-10}$$\n\ndone",
        "mixed $a$$b$ and $$c$$ tail",
    ];
    for input in &inputs {
        assert_eq!(rejoin(&tokenize(input)), *input);
    }
}

#[test]
fn test_segments_tile_the_input() {
    let input = "a $b$ c $$d$$ e $f";
    let total: usize = tokenize(input).iter().map(|s| s.raw.len()).sum();
    assert_eq!(total, input.len());
}

mod round_trip_props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_round_trip_is_total(s in "[ -~]{0,80}") {
            prop_assert_eq!(rejoin(&tokenize(&s)), s);
        }

        #[test]
        fn prop_well_formed_math_round_trips(inner in "[a-z0-9 =+^{}\\\\-]{0,24}") {
            let input = format!("lead ${}$ trail", inner);
            prop_assert_eq!(rejoin(&tokenize(&input)), input);
        }
    }
}
