//! Unit tests for the STRling core pipeline.
//!
//! Organized by language area, parser first, then compiler behavior that
//! unit-level AST construction can exercise.

use strling_core::core::nodes::*;
use strling_core::parse;

// Helper to unwrap a successful parse.
fn parse_ok(input: &str) -> Node {
    let (_, ast) = parse(input).expect("parse should succeed");
    ast
}

fn parse_err(input: &str) -> strling_core::STRlingError {
    parse(input).expect_err("parse should fail")
}

// ============================================================================
// ANCHORS
// ============================================================================

mod anchors {
    use super::*;

    #[test]
    fn line_start() {
        assert_eq!(
            parse_ok("^"),
            Node::Anchor {
                at: AnchorKind::Start
            }
        );
    }

    #[test]
    fn line_end() {
        assert_eq!(
            parse_ok("$"),
            Node::Anchor {
                at: AnchorKind::End
            }
        );
    }

    #[test]
    fn escape_anchors() {
        let cases = [
            (r"\b", AnchorKind::WordBoundary),
            (r"\B", AnchorKind::NotWordBoundary),
            (r"\A", AnchorKind::AbsoluteStart),
            (r"\Z", AnchorKind::EndBeforeFinalNewline),
            (r"\z", AnchorKind::AbsoluteEnd),
        ];
        for (input, kind) in cases {
            assert_eq!(parse_ok(input), Node::Anchor { at: kind }, "input {input}");
        }
    }

    #[test]
    fn pattern_of_only_anchors() {
        match parse_ok(r"^\A\b$") {
            Node::Seq { parts } => {
                let kinds: Vec<AnchorKind> = parts
                    .iter()
                    .map(|p| match p {
                        Node::Anchor { at } => *at,
                        other => panic!("expected Anchor, got {:?}", other),
                    })
                    .collect();
                assert_eq!(
                    kinds,
                    vec![
                        AnchorKind::Start,
                        AnchorKind::AbsoluteStart,
                        AnchorKind::WordBoundary,
                        AnchorKind::End
                    ]
                );
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn anchor_in_middle_of_sequence() {
        match parse_ok(r"a\bb") {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(
                    parts[1],
                    Node::Anchor {
                        at: AnchorKind::WordBoundary
                    }
                );
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn multiline_flag_does_not_change_the_ast() {
        assert_eq!(parse_ok("^a$"), {
            let (_, ast) = parse("%flags m\n^a$").unwrap();
            ast
        });
    }

    #[test]
    fn quantifying_an_anchor_is_an_error() {
        let err = parse_err("^*");
        assert_eq!(err.message, "Cannot quantify anchor");
    }

    #[test]
    fn quantifying_escape_anchor_is_an_error() {
        let err = parse_err(r"a\b{2}");
        assert_eq!(err.message, "Cannot quantify anchor");
    }
}

// ============================================================================
// LITERALS AND ESCAPES
// ============================================================================

mod literals_and_escapes {
    use super::*;

    #[test]
    fn plain_literal() {
        assert_eq!(parse_ok("a"), Node::Lit { value: "a".into() });
    }

    #[test]
    fn identity_escapes() {
        for (input, value) in [(r"\.", "."), (r"\(", "("), (r"\*", "*"), (r"\\", "\\")] {
            assert_eq!(
                parse_ok(input),
                Node::Lit {
                    value: value.into()
                },
                "input {input}"
            );
        }
    }

    #[test]
    fn control_escapes() {
        for (input, value) in [
            (r"\n", "\n"),
            (r"\t", "\t"),
            (r"\r", "\r"),
            (r"\f", "\u{000C}"),
            (r"\v", "\u{000B}"),
        ] {
            assert_eq!(
                parse_ok(input),
                Node::Lit {
                    value: value.into()
                },
                "input {input:?}"
            );
        }
    }

    #[test]
    fn nul_escape() {
        assert_eq!(parse_ok(r"\0"), Node::Lit { value: "\0".into() });
    }

    #[test]
    fn hex_escapes() {
        assert_eq!(parse_ok(r"\x41"), Node::Lit { value: "A".into() });
        assert_eq!(parse_ok(r"\x{41}"), Node::Lit { value: "A".into() });
        // Codepoints above ASCII are UTF-8 encoded, not replaced.
        assert_eq!(parse_ok(r"\x{1F600}"), Node::Lit { value: "😀".into() });
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(parse_ok(r"\u0041"), Node::Lit { value: "A".into() });
        assert_eq!(parse_ok(r"\u{E9}"), Node::Lit { value: "é".into() });
    }

    #[test]
    fn malformed_hex_escapes() {
        assert_eq!(parse_err(r"\xZ1").message, "Invalid \\xHH escape");
        assert_eq!(parse_err(r"\x{41").message, "Unterminated \\x{...}");
        assert_eq!(parse_err(r"\uD800").message, "Invalid codepoint in escape");
        assert_eq!(parse_err(r"\u12").message, "Invalid \\uHHHH escape");
    }

    #[test]
    fn shorthand_escape_becomes_single_item_class() {
        match parse_ok(r"\d") {
            Node::CharClass { negated, items } => {
                assert!(!negated);
                assert_eq!(
                    items,
                    vec![ClassItem::Shorthand {
                        kind: ShorthandKind::Digit
                    }]
                );
            }
            other => panic!("expected CharClass, got {:?}", other),
        }
    }

    #[test]
    fn unicode_property_becomes_single_item_class() {
        match parse_ok(r"\p{Letter}") {
            Node::CharClass { items, .. } => {
                assert_eq!(
                    items,
                    vec![ClassItem::UnicodeProp {
                        negated: false,
                        value: "Letter".into()
                    }]
                );
            }
            other => panic!("expected CharClass, got {:?}", other),
        }
        match parse_ok(r"\P{L}") {
            Node::CharClass { items, .. } => {
                assert_eq!(
                    items,
                    vec![ClassItem::UnicodeProp {
                        negated: true,
                        value: "L".into()
                    }]
                );
            }
            other => panic!("expected CharClass, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_property_is_an_error() {
        assert_eq!(parse_err(r"\p{Letter").message, "Unterminated \\p{...}");
        assert_eq!(parse_err(r"\pL").message, "Expected '{' after \\p/\\P");
    }

    #[test]
    fn stray_closing_paren() {
        assert_eq!(parse_err(")").message, "Unmatched ')'");
    }

    #[test]
    fn trailing_backslash() {
        assert_eq!(parse_err("\\").message, "Incomplete escape sequence");
    }
}

// ============================================================================
// QUANTIFIERS
// ============================================================================

mod quantifiers {
    use super::*;

    fn quant(input: &str) -> (i64, Max, Mode) {
        match parse_ok(input) {
            Node::Quant {
                min, max, mode, ..
            } => (min, max, mode),
            other => panic!("expected Quant, got {:?}", other),
        }
    }

    #[test]
    fn symbol_forms() {
        assert_eq!(quant("a*"), (0, Max::Unbounded, Mode::Greedy));
        assert_eq!(quant("a+"), (1, Max::Unbounded, Mode::Greedy));
        assert_eq!(quant("a?"), (0, Max::Finite(1), Mode::Greedy));
    }

    #[test]
    fn lazy_and_possessive_suffixes() {
        assert_eq!(quant("a*?"), (0, Max::Unbounded, Mode::Lazy));
        assert_eq!(quant("a++"), (1, Max::Unbounded, Mode::Possessive));
        assert_eq!(quant("a??"), (0, Max::Finite(1), Mode::Lazy));
        assert_eq!(quant("a{2,3}+"), (2, Max::Finite(3), Mode::Possessive));
    }

    #[test]
    fn brace_forms() {
        assert_eq!(quant("a{3}"), (3, Max::Finite(3), Mode::Greedy));
        assert_eq!(quant("a{3,}"), (3, Max::Unbounded, Mode::Greedy));
        assert_eq!(quant("a{3,5}"), (3, Max::Finite(5), Mode::Greedy));
        assert_eq!(quant("a{0}"), (0, Max::Finite(0), Mode::Greedy));
    }

    #[test]
    fn brace_without_digits_stays_literal() {
        match parse_ok("a{z}") {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 4);
                assert_eq!(parts[1], Node::Lit { value: "{".into() });
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn committed_brace_must_be_complete() {
        assert_eq!(parse_err("a{3").message, "Incomplete quantifier");
        assert_eq!(parse_err("a{3,x}").message, "Incomplete quantifier");
    }

    #[test]
    fn quantifier_on_group_and_class() {
        match parse_ok("(ab)+") {
            Node::Quant { child, .. } => assert!(matches!(*child, Node::Group { .. })),
            other => panic!("expected Quant, got {:?}", other),
        }
        match parse_ok("[ab]+") {
            Node::Quant { child, .. } => assert!(matches!(*child, Node::CharClass { .. })),
            other => panic!("expected Quant, got {:?}", other),
        }
    }

    #[test]
    fn quantifier_with_nothing_to_repeat() {
        for input in ["*a", "+a", "?a", "{3}a", "a|*b"] {
            let err = parse_err(input);
            assert!(
                err.message.contains("nothing to quantify"),
                "input {input}: {}",
                err.message
            );
        }
    }

    #[test]
    fn sequence_of_quantified_atoms() {
        match parse_ok("a*b+c?") {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 3);
                assert!(parts.iter().all(|p| matches!(p, Node::Quant { .. })));
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }
}

// ============================================================================
// GROUPS
// ============================================================================

mod groups {
    use super::*;

    #[test]
    fn capturing_group() {
        match parse_ok("(a)") {
            Node::Group {
                capturing,
                name,
                atomic,
                ..
            } => {
                assert!(capturing);
                assert_eq!(name, None);
                assert!(!atomic);
            }
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn non_capturing_group() {
        match parse_ok("(?:a)") {
            Node::Group {
                capturing, atomic, ..
            } => {
                assert!(!capturing);
                assert!(!atomic);
            }
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn named_group() {
        match parse_ok("(?<name>a)") {
            Node::Group {
                capturing, name, ..
            } => {
                assert!(capturing);
                assert_eq!(name.as_deref(), Some("name"));
            }
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn atomic_group() {
        match parse_ok("(?>a)") {
            Node::Group {
                capturing, atomic, ..
            } => {
                assert!(!capturing);
                assert!(atomic);
            }
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn nested_groups() {
        match parse_ok("((a))") {
            Node::Group { body, .. } => assert!(matches!(*body, Node::Group { .. })),
            other => panic!("expected Group, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_forms() {
        assert_eq!(parse_err("(a").message, "Unterminated group");
        assert_eq!(parse_err("(?:a").message, "Unterminated group");
        assert_eq!(parse_err("(?>a").message, "Unterminated atomic group");
        assert_eq!(parse_err("(?=a").message, "Unterminated lookahead");
        assert_eq!(parse_err("(?<=a").message, "Unterminated lookbehind");
        assert_eq!(parse_err("(?<name").message, "Unterminated group name");
    }

    #[test]
    fn group_name_validation() {
        assert_eq!(parse_err("(?<>a)").message, "Empty group name");
        assert!(parse_err("(?<na me>a)")
            .message
            .starts_with("Invalid character in group name"));
    }

    #[test]
    fn unknown_modifier() {
        assert!(parse_err("(?&a)")
            .message
            .starts_with("Unknown group modifier"));
    }

    #[test]
    fn duplicate_group_name() {
        assert_eq!(parse_err("(?<n>a)(?<n>b)").message, "Duplicate group name");
    }
}

// ============================================================================
// LOOKAROUNDS
// ============================================================================

mod lookarounds {
    use super::*;

    fn look(input: &str) -> (LookDir, bool) {
        match parse_ok(input) {
            Node::Look { dir, neg, .. } => (dir, neg),
            other => panic!("expected Look, got {:?}", other),
        }
    }

    #[test]
    fn all_four_forms() {
        assert_eq!(look("(?=b)"), (LookDir::Ahead, false));
        assert_eq!(look("(?!b)"), (LookDir::Ahead, true));
        assert_eq!(look("(?<=a)"), (LookDir::Behind, false));
        assert_eq!(look("(?<!a)"), (LookDir::Behind, true));
    }

    #[test]
    fn lookaround_does_not_capture() {
        // A backref to group 1 with only a lookahead before it fails.
        let err = parse_err(r"(?=a)\1");
        assert_eq!(err.message, "Backreference to undefined group");
    }

    #[test]
    fn lookahead_in_sequence() {
        match parse_ok("a(?=b)") {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[1], Node::Look { .. }));
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

mod character_classes {
    use super::*;

    fn class(input: &str) -> (bool, Vec<ClassItem>) {
        match parse_ok(input) {
            Node::CharClass { negated, items } => (negated, items),
            other => panic!("expected CharClass, got {:?}", other),
        }
    }

    #[test]
    fn simple_members() {
        let (negated, items) = class("[abc]");
        assert!(!negated);
        assert_eq!(
            items,
            vec![
                ClassItem::Lit { ch: 'a' },
                ClassItem::Lit { ch: 'b' },
                ClassItem::Lit { ch: 'c' },
            ]
        );
    }

    #[test]
    fn negation() {
        let (negated, items) = class("[^ab]");
        assert!(negated);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn ranges_and_literals_mix() {
        let (_, items) = class("[a-z0-9_]");
        assert_eq!(
            items,
            vec![
                ClassItem::Range { from: 'a', to: 'z' },
                ClassItem::Range { from: '0', to: '9' },
                ClassItem::Lit { ch: '_' },
            ]
        );
    }

    #[test]
    fn trailing_dash_is_literal() {
        let (_, items) = class("[a-]");
        assert_eq!(
            items,
            vec![ClassItem::Lit { ch: 'a' }, ClassItem::Lit { ch: '-' }]
        );
    }

    #[test]
    fn leading_dash_is_literal() {
        let (_, items) = class("[-a]");
        assert_eq!(
            items,
            vec![ClassItem::Lit { ch: '-' }, ClassItem::Lit { ch: 'a' }]
        );
    }

    #[test]
    fn shorthands_and_properties_inside_class() {
        let (_, items) = class(r"[\d\w\p{L}]");
        assert_eq!(
            items,
            vec![
                ClassItem::Shorthand {
                    kind: ShorthandKind::Digit
                },
                ClassItem::Shorthand {
                    kind: ShorthandKind::Word
                },
                ClassItem::UnicodeProp {
                    negated: false,
                    value: "L".into()
                },
            ]
        );
    }

    #[test]
    fn backspace_and_nul_inside_class() {
        let (_, items) = class(r"[\b\0]");
        assert_eq!(
            items,
            vec![
                ClassItem::Lit { ch: '\u{0008}' },
                ClassItem::Lit { ch: '\0' }
            ]
        );
    }

    #[test]
    fn whitespace_stays_literal_inside_class_in_extended_mode() {
        let (_, ast) = parse("%flags x\n[a b]").unwrap();
        match ast {
            Node::CharClass { items, .. } => assert_eq!(items.len(), 3),
            other => panic!("expected CharClass, got {:?}", other),
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(parse_err("[z-a]").message, "Invalid character range");
    }

    #[test]
    fn unterminated_class() {
        assert_eq!(parse_err("[abc").message, "Unterminated character class");
    }

    #[test]
    fn empty_class_is_rejected() {
        assert_eq!(parse_err("[]").message, "Empty character class");
        assert_eq!(parse_err("[^]").message, "Empty character class");
    }
}

// ============================================================================
// ALTERNATION
// ============================================================================

mod alternation {
    use super::*;

    #[test]
    fn simple_alternation() {
        match parse_ok("a|b") {
            Node::Alt { branches } => assert_eq!(branches.len(), 2),
            other => panic!("expected Alt, got {:?}", other),
        }
    }

    #[test]
    fn many_branches() {
        match parse_ok("a|b|c|d") {
            Node::Alt { branches } => assert_eq!(branches.len(), 4),
            other => panic!("expected Alt, got {:?}", other),
        }
    }

    #[test]
    fn branches_are_sequences() {
        match parse_ok("ab|cd") {
            Node::Alt { branches } => {
                assert!(branches.iter().all(|b| matches!(b, Node::Seq { .. })));
            }
            other => panic!("expected Alt, got {:?}", other),
        }
    }

    #[test]
    fn missing_branches() {
        assert_eq!(parse_err("|a").message, "Alternation lacks left-hand side");
        assert_eq!(parse_err("a|").message, "Alternation lacks right-hand side");
        assert_eq!(parse_err("a||b").message, "Empty alternation branch");
        assert_eq!(
            parse_err("(a|)").message,
            "Alternation lacks right-hand side"
        );
    }
}

// ============================================================================
// BACKREFERENCES
// ============================================================================

mod backreferences {
    use super::*;

    #[test]
    fn numbered_backref() {
        match parse_ok(r"(a)\1") {
            Node::Seq { parts } => {
                assert_eq!(
                    parts[1],
                    Node::BackRef {
                        by_index: Some(1),
                        by_name: None
                    }
                );
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn named_backref() {
        match parse_ok(r"(?<w>a)\k<w>") {
            Node::Seq { parts } => {
                assert_eq!(
                    parts[1],
                    Node::BackRef {
                        by_index: None,
                        by_name: Some("w".into())
                    }
                );
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn forward_reference_is_rejected() {
        assert_eq!(
            parse_err(r"\1(a)").message,
            "Backreference to undefined group"
        );
        assert_eq!(
            parse_err(r"\k<w>(?<w>a)").message,
            "Backreference to undefined group"
        );
    }

    #[test]
    fn enclosing_reference_is_allowed() {
        assert!(parse(r"(a\1)").is_ok());
        assert!(parse(r"(?<x>a\k<x>)").is_ok());
    }

    #[test]
    fn multi_digit_index() {
        let mut pattern = String::new();
        for _ in 0..11 {
            pattern.push_str("(a)");
        }
        pattern.push_str(r"\11");
        match parse(&pattern) {
            Ok((_, Node::Seq { parts })) => {
                assert_eq!(
                    parts.last(),
                    Some(&Node::BackRef {
                        by_index: Some(11),
                        by_name: None
                    })
                );
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_named_backref() {
        assert_eq!(parse_err(r"(?<w>a)\k<w").message, "Unterminated named backref");
        assert_eq!(parse_err(r"(?<w>a)\kw").message, "Expected '<' after \\k");
    }
}

// ============================================================================
// FLAGS DIRECTIVE
// ============================================================================

mod flags {
    use super::*;

    #[test]
    fn single_flags() {
        let (f, _) = parse("%flags i\na").unwrap();
        assert!(f.ignore_case && !f.multiline);
        let (f, _) = parse("%flags m\na").unwrap();
        assert!(f.multiline && !f.ignore_case);
    }

    #[test]
    fn separators_and_case_are_tolerated() {
        let (f, _) = parse("%flags [I, M, s]\na").unwrap();
        assert!(f.ignore_case && f.multiline && f.dot_all);
    }

    #[test]
    fn compact_letter_run() {
        let (f, _) = parse("%flags imsux\na").unwrap();
        assert!(f.ignore_case && f.multiline && f.dot_all && f.unicode && f.extended);
    }

    #[test]
    fn unknown_letters_are_ignored() {
        let (f, _) = parse("%flags iq\na").unwrap();
        assert!(f.ignore_case && !f.multiline);
    }

    #[test]
    fn duplicate_letters_are_idempotent() {
        let (f, _) = parse("%flags iii\na").unwrap();
        assert!(f.ignore_case);
    }

    #[test]
    fn directive_must_lead() {
        // A %flags later in the text is plain pattern characters.
        let (f, ast) = parse("a %flags i").unwrap();
        assert!(!f.any());
        assert!(matches!(ast, Node::Seq { .. }));
    }
}

// ============================================================================
// EXTENDED MODE
// ============================================================================

mod extended_mode {
    use super::*;

    #[test]
    fn comments_and_newlines_are_skipped() {
        let (_, ast) = parse("%flags x\na# note\nb").unwrap();
        match ast {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 2);
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn spaces_stay_literal() {
        let (_, ast) = parse("%flags x\na b").unwrap();
        match ast {
            Node::Seq { parts } => {
                assert_eq!(parts[1], Node::Lit { value: " ".into() });
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }

    #[test]
    fn quantifier_may_follow_a_line_break() {
        let (_, ast) = parse("%flags x\na\n*").unwrap();
        assert!(matches!(ast, Node::Quant { .. }));
    }

    #[test]
    fn hash_is_literal_without_extended() {
        match parse_ok("a#b") {
            Node::Seq { parts } => assert_eq!(parts.len(), 3),
            other => panic!("expected Seq, got {:?}", other),
        }
    }
}

// ============================================================================
// DOT
// ============================================================================

mod dot {
    use super::*;

    #[test]
    fn single_dot() {
        assert_eq!(parse_ok("."), Node::Dot);
    }

    #[test]
    fn dot_in_sequence() {
        match parse_ok("a.b") {
            Node::Seq { parts } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[1], Node::Dot);
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }
}

// ============================================================================
// COMPILER INTERACTIONS
// ============================================================================

mod compiler {
    use super::*;
    use strling_core::compile;
    use strling_core::core::ir::{IRMax, IROp};

    #[test]
    fn parse_then_compile_literal_run() {
        let ast = parse_ok("hello");
        let ir = compile(&ast).unwrap();
        assert_eq!(
            ir,
            IROp::Lit {
                value: "hello".into()
            }
        );
    }

    #[test]
    fn parse_then_compile_quantifier() {
        let ast = parse_ok("a{2,}");
        match compile(&ast).unwrap() {
            IROp::Quant { min, max, .. } => {
                assert_eq!(min, 2);
                assert_eq!(max, IRMax::Unbounded);
            }
            other => panic!("expected Quant, got {:?}", other),
        }
    }

    #[test]
    fn empty_pattern_compiles_to_empty_sequence() {
        let ir = compile(&parse_ok("")).unwrap();
        assert_eq!(ir, IROp::Seq { parts: vec![] });
    }

    #[test]
    fn literal_coalescing_stops_at_non_literals() {
        let ast = parse_ok("ab.cd");
        match compile(&ast).unwrap() {
            IROp::Seq { parts } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], IROp::Lit { value: "ab".into() });
                assert_eq!(parts[1], IROp::Dot);
                assert_eq!(parts[2], IROp::Lit { value: "cd".into() });
            }
            other => panic!("expected Seq, got {:?}", other),
        }
    }
}
