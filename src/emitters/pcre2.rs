//! PCRE2 Emitter - Serialize IR to a PCRE2-Compatible Pattern
//!
//! The emitter is a total function over well-formed IR: it never fails and
//! never re-validates. Flags become an inline prefix (`(?ims x)` letters in
//! fixed order); `unicode` contributes no letter because PCRE2 controls
//! UTF/UCP through compile options.
//!
//! Escaping rules worth noting:
//!   - a non-negated class holding exactly one shorthand or unicode
//!     property emits bare (`\d`, `\p{L}`), so patterns written with bare
//!     shorthands round-trip without brackets
//!   - inside classes, `-` stays bare in first or last position only
//!   - in extended mode, literal spaces and `#` are escaped so the emitted
//!     x-mode pattern still matches them

use crate::core::ir::{IRClassItem, IRMax, IROp};
use crate::core::nodes::{AnchorKind, Flags, LookDir, Mode};

/// Emitter for the PCRE2 dialect.
pub struct PCRE2Emitter {
    flags: Flags,
}

impl PCRE2Emitter {
    pub fn new(flags: Flags) -> Self {
        Self { flags }
    }

    /// Emit the full pattern: inline flag prefix plus the serialized IR.
    pub fn emit(&self, ir: &IROp) -> String {
        format!("{}{}", self.flag_prefix(), self.emit_node(ir))
    }

    /// The inline flag prefix, `""` when no flag is set. Letters appear in
    /// the fixed order `i m s x`.
    pub fn flag_prefix(&self) -> String {
        let mut letters = String::new();
        if self.flags.ignore_case {
            letters.push('i');
        }
        if self.flags.multiline {
            letters.push('m');
        }
        if self.flags.dot_all {
            letters.push('s');
        }
        if self.flags.extended {
            letters.push('x');
        }
        if letters.is_empty() {
            String::new()
        } else {
            format!("(?{})", letters)
        }
    }

    fn emit_node(&self, node: &IROp) -> String {
        match node {
            IROp::Lit { value } => self.emit_literal(value),
            IROp::Dot => ".".to_string(),
            IROp::Anchor { at } => match at {
                AnchorKind::Start => "^".to_string(),
                AnchorKind::End => "$".to_string(),
                AnchorKind::AbsoluteStart => "\\A".to_string(),
                AnchorKind::EndBeforeFinalNewline => "\\Z".to_string(),
                AnchorKind::AbsoluteEnd => "\\z".to_string(),
                AnchorKind::WordBoundary => "\\b".to_string(),
                AnchorKind::NotWordBoundary => "\\B".to_string(),
            },
            IROp::Seq { parts } => parts.iter().map(|p| self.emit_node(p)).collect(),
            IROp::Alt { branches } => branches
                .iter()
                .map(|b| self.emit_node(b))
                .collect::<Vec<_>>()
                .join("|"),
            IROp::Quant {
                child,
                min,
                max,
                mode,
            } => {
                let child = self.emit_node(child);
                let token = match (*min, *max) {
                    (0, IRMax::Unbounded) => "*".to_string(),
                    (1, IRMax::Unbounded) => "+".to_string(),
                    (0, IRMax::Finite(1)) => "?".to_string(),
                    (m, IRMax::Unbounded) => format!("{{{},}}", m),
                    (m, IRMax::Finite(n)) if m == n => format!("{{{}}}", m),
                    (m, IRMax::Finite(n)) => format!("{{{},{}}}", m, n),
                };
                let suffix = match mode {
                    Mode::Greedy => "",
                    Mode::Lazy => "?",
                    Mode::Possessive => "+",
                };
                format!("{}{}{}", child, token, suffix)
            }
            IROp::Group {
                capturing,
                name,
                atomic,
                body,
            } => {
                let body = self.emit_node(body);
                if *atomic {
                    format!("(?>{})", body)
                } else if let Some(name) = name {
                    format!("(?<{}>{})", name, body)
                } else if *capturing {
                    format!("({})", body)
                } else {
                    format!("(?:{})", body)
                }
            }
            IROp::Look { dir, neg, body } => {
                let body = self.emit_node(body);
                let opener = match (*dir, *neg) {
                    (LookDir::Ahead, false) => "(?=",
                    (LookDir::Ahead, true) => "(?!",
                    (LookDir::Behind, false) => "(?<=",
                    (LookDir::Behind, true) => "(?<!",
                };
                format!("{}{})", opener, body)
            }
            IROp::Backref { by_index, by_name } => {
                if let Some(name) = by_name {
                    format!("\\k<{}>", name)
                } else if let Some(num) = by_index {
                    format!("\\{}", num)
                } else {
                    // Well-formed IR always carries one of the two.
                    String::new()
                }
            }
            IROp::CharClass { negated, items } => self.emit_class(*negated, items),
        }
    }

    fn emit_class(&self, negated: bool, items: &[IRClassItem]) -> String {
        // A class that only wraps a shorthand or property emits bare:
        // `\d{3}` rather than `[\d]{3}`.
        if !negated && items.len() == 1 {
            match &items[0] {
                IRClassItem::Shorthand { .. } | IRClassItem::UnicodeProp { .. } => {
                    return self.emit_class_item(&items[0], 0, 1);
                }
                _ => {}
            }
        }

        let mut out = String::from("[");
        if negated {
            out.push('^');
        }
        for (idx, item) in items.iter().enumerate() {
            out.push_str(&self.emit_class_item(item, idx, items.len()));
        }
        out.push(']');
        out
    }

    fn emit_class_item(&self, item: &IRClassItem, idx: usize, len: usize) -> String {
        match item {
            IRClassItem::Char { ch } => {
                let edge = idx == 0 || idx + 1 == len;
                escape_class_char(*ch, edge)
            }
            IRClassItem::Range { from, to } => format!(
                "{}-{}",
                escape_class_char(*from, false),
                escape_class_char(*to, false)
            ),
            IRClassItem::Shorthand { kind } => format!("\\{}", kind.letter()),
            IRClassItem::UnicodeProp { negated, value } => {
                format!("\\{}{{{}}}", if *negated { 'P' } else { 'p' }, value)
            }
        }
    }

    fn emit_literal(&self, s: &str) -> String {
        s.chars().map(|ch| self.escape_char(ch)).collect()
    }

    fn escape_char(&self, ch: char) -> String {
        match ch {
            '\\' | '.' | '^' | '$' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '+'
            | '?' => format!("\\{}", ch),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            '\u{000C}' => "\\f".to_string(),
            '\u{000B}' => "\\v".to_string(),
            '\0' => "\\0".to_string(),
            ' ' if self.flags.extended => "\\ ".to_string(),
            '#' if self.flags.extended => "\\#".to_string(),
            c if (c as u32) < 0x20 || c == '\u{7F}' => format!("\\x{:02X}", c as u32),
            c => c.to_string(),
        }
    }
}

fn escape_class_char(ch: char, dash_stays_bare: bool) -> String {
    match ch {
        '\\' | ']' | '^' => format!("\\{}", ch),
        '-' if !dash_stays_bare => "\\-".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\u{000C}' => "\\f".to_string(),
        '\u{000B}' => "\\v".to_string(),
        '\u{0008}' => "\\b".to_string(),
        '\0' => "\\0".to_string(),
        c if (c as u32) < 0x20 || c == '\u{7F}' => format!("\\x{:02X}", c as u32),
        c => c.to_string(),
    }
}

/// Emit a PCRE2 pattern (with inline flag prefix) from IR.
pub fn emit_pcre2(ir: &IROp, flags: &Flags) -> String {
    PCRE2Emitter::new(*flags).emit(ir)
}
