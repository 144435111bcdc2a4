//! STRling AST Node Definitions
//!
//! The Abstract Syntax Tree is the parser's output: a direct structural
//! representation of the pattern text, before validation and lowering to IR.
//! Nodes serialize to the tagged-union JSON schema used by the conformance
//! fixtures (`{"type": "...", ...}`), with aliases accepted for the
//! long-form tag names of the historical fixture corpus.
//!
//! The tree is strictly owned: every node is owned by its parent and the
//! whole tree drops together. Flags live outside the tree; they are an
//! input to the parser (extended mode) and to the emitter (inline prefix),
//! never an attribute of a node.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---- Flags container ----

/// Pattern-wide matching flags, established once by the `%flags` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Flags {
    #[serde(rename = "ignoreCase", default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub multiline: bool,
    #[serde(rename = "dotAll", default)]
    pub dot_all: bool,
    #[serde(default)]
    pub unicode: bool,
    #[serde(default)]
    pub extended: bool,
}

impl Flags {
    /// Build flags from a run of directive letters.
    ///
    /// Letters are case-insensitive; separators and unknown letters are
    /// ignored; duplicates are idempotent.
    pub fn from_letters(letters: &str) -> Self {
        let mut f = Flags::default();
        for ch in letters.chars() {
            match ch.to_ascii_lowercase() {
                'i' => f.ignore_case = true,
                'm' => f.multiline = true,
                's' => f.dot_all = true,
                'u' => f.unicode = true,
                'x' => f.extended = true,
                _ => {}
            }
        }
        f
    }

    /// True when at least one flag is set.
    pub fn any(&self) -> bool {
        self.ignore_case || self.multiline || self.dot_all || self.unicode || self.extended
    }
}

// ---- Shared leaf enums ----

/// Position assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorKind {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\A`
    AbsoluteStart,
    /// `\Z`
    EndBeforeFinalNewline,
    /// `\z`
    AbsoluteEnd,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
}

/// Lookaround direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookDir {
    Ahead,
    Behind,
}

/// Quantifier matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Greedy,
    Lazy,
    Possessive,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Greedy
    }
}

/// Shorthand character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShorthandKind {
    #[serde(rename = "d", alias = "digit")]
    Digit,
    #[serde(rename = "D", alias = "not-digit")]
    NotDigit,
    #[serde(rename = "w", alias = "word")]
    Word,
    #[serde(rename = "W", alias = "not-word")]
    NotWord,
    #[serde(rename = "s", alias = "space")]
    Space,
    #[serde(rename = "S", alias = "not-space")]
    NotSpace,
}

impl ShorthandKind {
    /// Map an escape letter (`d`, `D`, `w`, `W`, `s`, `S`) to its kind.
    pub fn from_letter(ch: char) -> Option<Self> {
        match ch {
            'd' => Some(ShorthandKind::Digit),
            'D' => Some(ShorthandKind::NotDigit),
            'w' => Some(ShorthandKind::Word),
            'W' => Some(ShorthandKind::NotWord),
            's' => Some(ShorthandKind::Space),
            'S' => Some(ShorthandKind::NotSpace),
            _ => None,
        }
    }

    /// The escape letter for this kind.
    pub fn letter(&self) -> char {
        match self {
            ShorthandKind::Digit => 'd',
            ShorthandKind::NotDigit => 'D',
            ShorthandKind::Word => 'w',
            ShorthandKind::NotWord => 'W',
            ShorthandKind::Space => 's',
            ShorthandKind::NotSpace => 'S',
        }
    }
}

// ---- Quantifier bound ----

/// Upper bound of a quantifier: a finite count or unbounded.
///
/// JSON forms: a number, `null`, or the string `"Inf"` (both of the latter
/// mean unbounded, matching the fixture corpus). A missing `max` field also
/// deserializes to [`Max::Unbounded`] via `#[serde(default)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Max {
    Finite(i64),
    Unbounded,
}

impl Default for Max {
    fn default() -> Self {
        Max::Unbounded
    }
}

impl Serialize for Max {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Max::Finite(n) => serializer.serialize_i64(*n),
            Max::Unbounded => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Max {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MaxVisitor;

        impl<'de> Visitor<'de> for MaxVisitor {
            type Value = Max;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, null, or \"Inf\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Max, E> {
                Ok(Max::Finite(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Max, E> {
                Ok(Max::Finite(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Max, E> {
                if v.eq_ignore_ascii_case("inf") {
                    Ok(Max::Unbounded)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_none<E: de::Error>(self) -> Result<Max, E> {
                Ok(Max::Unbounded)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Max, E> {
                Ok(Max::Unbounded)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Max, D::Error> {
                d.deserialize_any(MaxVisitor)
            }
        }

        deserializer.deserialize_any(MaxVisitor)
    }
}

// ---- Character class items ----

/// One member of a character class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassItem {
    /// A single literal character.
    #[serde(rename = "Literal", alias = "Char")]
    Lit {
        #[serde(rename = "char", alias = "value")]
        ch: char,
    },
    /// An inclusive codepoint range like `a-z`.
    Range { from: char, to: char },
    /// A shorthand class like `\d`.
    #[serde(alias = "Escape", alias = "Esc")]
    Shorthand { kind: ShorthandKind },
    /// A unicode property reference, `\p{...}` or (negated) `\P{...}`.
    #[serde(rename = "UnicodeProp", alias = "UnicodeProperty")]
    UnicodeProp {
        #[serde(default)]
        negated: bool,
        value: String,
    },
}

// ---- AST ----

/// An AST node. The variant set is closed and mirrored 1:1 by the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Characters matched verbatim.
    #[serde(rename = "Literal")]
    Lit { value: String },
    /// `.` - any character, subject to `dotAll`.
    Dot,
    /// A position assertion.
    Anchor { at: AnchorKind },
    /// `[...]` - a character class.
    #[serde(alias = "CharacterClass")]
    CharClass {
        #[serde(default)]
        negated: bool,
        #[serde(alias = "members")]
        items: Vec<ClassItem>,
    },
    /// `(...)`, `(?:...)`, `(?>...)`, `(?<name>...)`.
    Group {
        capturing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        atomic: bool,
        #[serde(alias = "expression")]
        body: Box<Node>,
    },
    /// A lookaround assertion.
    Look {
        dir: LookDir,
        #[serde(default)]
        neg: bool,
        body: Box<Node>,
    },
    /// A repetition of its child.
    #[serde(alias = "Quantifier")]
    Quant {
        #[serde(alias = "target")]
        child: Box<Node>,
        #[serde(default)]
        min: i64,
        #[serde(default)]
        max: Max,
        #[serde(default)]
        mode: Mode,
    },
    /// A backreference to an earlier capturing group, by index or by name.
    #[serde(alias = "Backreference", alias = "BackReference")]
    BackRef {
        #[serde(
            rename = "byIndex",
            alias = "index",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        by_index: Option<u32>,
        #[serde(
            rename = "byName",
            alias = "name",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        by_name: Option<String>,
    },
    /// Ordered alternatives.
    #[serde(alias = "Alternation")]
    Alt {
        #[serde(alias = "alternatives")]
        branches: Vec<Node>,
    },
    /// Parts matched one after another.
    #[serde(alias = "Sequence")]
    Seq { parts: Vec<Node> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_letters_is_case_insensitive_and_ignores_noise() {
        let f = Flags::from_letters("I, m [x] q");
        assert!(f.ignore_case && f.multiline && f.extended);
        assert!(!f.dot_all && !f.unicode);
    }

    #[test]
    fn node_serializes_with_type_tag() {
        let node = Node::Anchor {
            at: AnchorKind::Start,
        };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["type"], "Anchor");
        assert_eq!(v["at"], "Start");
    }

    #[test]
    fn long_form_tags_deserialize() {
        let node: Node = serde_json::from_str(
            r#"{"type": "Alternation", "alternatives": [
                {"type": "Literal", "value": "a"},
                {"type": "Literal", "value": "b"}
            ]}"#,
        )
        .unwrap();
        match node {
            Node::Alt { branches } => assert_eq!(branches.len(), 2),
            other => panic!("expected Alt, got {:?}", other),
        }
    }

    #[test]
    fn quantifier_accepts_target_alias_and_null_max() {
        let node: Node = serde_json::from_str(
            r#"{"type": "Quantifier", "min": 1, "max": null,
                "target": {"type": "Literal", "value": "a"}}"#,
        )
        .unwrap();
        match node {
            Node::Quant { min, max, mode, .. } => {
                assert_eq!(min, 1);
                assert_eq!(max, Max::Unbounded);
                assert_eq!(mode, Mode::Greedy);
            }
            other => panic!("expected Quant, got {:?}", other),
        }
    }

    #[test]
    fn max_accepts_inf_keyword_and_numbers() {
        assert_eq!(serde_json::from_str::<Max>("\"Inf\"").unwrap(), Max::Unbounded);
        assert_eq!(serde_json::from_str::<Max>("3").unwrap(), Max::Finite(3));
        assert_eq!(serde_json::from_str::<Max>("null").unwrap(), Max::Unbounded);
    }

    #[test]
    fn class_items_accept_fixture_aliases() {
        let item: ClassItem =
            serde_json::from_str(r#"{"type": "Escape", "kind": "digit"}"#).unwrap();
        assert_eq!(
            item,
            ClassItem::Shorthand {
                kind: ShorthandKind::Digit
            }
        );

        let item: ClassItem =
            serde_json::from_str(r#"{"type": "Char", "char": "x"}"#).unwrap();
        assert_eq!(item, ClassItem::Lit { ch: 'x' });
    }

    #[test]
    fn backref_uses_camel_case_fields() {
        let node = Node::BackRef {
            by_index: Some(2),
            by_name: None,
        };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["byIndex"], 2);
        assert!(v.get("byName").is_none());
    }
}
