//! STRling Intermediate Representation (IR) Node Definitions
//!
//! The IR mirrors the AST variant-for-variant but is the *validated* form:
//! quantifier bounds are known non-negative and ordered, backreferences are
//! known to resolve, and group shapes satisfy the structural invariants.
//! Emitters consume IR without re-checking any of that.
//!
//! IR nodes serialize to the tagged-union JSON schema used by the
//! conformance fixtures (`{"ir": "...", ...}`); the unbounded quantifier
//! maximum serializes as the string `"Inf"`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::core::nodes::{AnchorKind, LookDir, Mode, ShorthandKind};

/// Upper bound of a validated quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IRMax {
    Finite(u32),
    Unbounded,
}

impl Serialize for IRMax {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IRMax::Finite(n) => serializer.serialize_u32(*n),
            IRMax::Unbounded => serializer.serialize_str("Inf"),
        }
    }
}

impl<'de> Deserialize<'de> for IRMax {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IRMaxVisitor;

        impl<'de> Visitor<'de> for IRMaxVisitor {
            type Value = IRMax;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative number, null, or \"Inf\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<IRMax, E> {
                u32::try_from(v)
                    .map(IRMax::Finite)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<IRMax, E> {
                if v < 0 {
                    Err(E::invalid_value(de::Unexpected::Signed(v), &self))
                } else {
                    Ok(IRMax::Finite(v as u32))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<IRMax, E> {
                if v.eq_ignore_ascii_case("inf") {
                    Ok(IRMax::Unbounded)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_none<E: de::Error>(self) -> Result<IRMax, E> {
                Ok(IRMax::Unbounded)
            }

            fn visit_unit<E: de::Error>(self) -> Result<IRMax, E> {
                Ok(IRMax::Unbounded)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<IRMax, D::Error> {
                d.deserialize_any(IRMaxVisitor)
            }
        }

        deserializer.deserialize_any(IRMaxVisitor)
    }
}

/// One member of an IR character class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ir")]
pub enum IRClassItem {
    /// A single literal character.
    Char {
        #[serde(rename = "char")]
        ch: char,
    },
    /// An inclusive codepoint range.
    Range { from: char, to: char },
    /// A shorthand class like `\d`.
    #[serde(alias = "Esc")]
    Shorthand { kind: ShorthandKind },
    /// A unicode property, `\p{...}` / `\P{...}`.
    UnicodeProp {
        #[serde(default)]
        negated: bool,
        value: String,
    },
}

/// An IR operation. Same variant set as the AST [`crate::core::nodes::Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ir")]
pub enum IROp {
    Alt {
        branches: Vec<IROp>,
    },
    Seq {
        parts: Vec<IROp>,
    },
    Lit {
        value: String,
    },
    Dot,
    Anchor {
        at: AnchorKind,
    },
    CharClass {
        #[serde(default)]
        negated: bool,
        items: Vec<IRClassItem>,
    },
    Quant {
        child: Box<IROp>,
        min: u32,
        max: IRMax,
        mode: Mode,
    },
    Group {
        capturing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        atomic: bool,
        body: Box<IROp>,
    },
    Backref {
        #[serde(
            rename = "byIndex",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        by_index: Option<u32>,
        #[serde(
            rename = "byName",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        by_name: Option<String>,
    },
    Look {
        dir: LookDir,
        #[serde(default)]
        neg: bool,
        body: Box<IROp>,
    },
}
