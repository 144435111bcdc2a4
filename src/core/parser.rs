//! STRling Parser - Recursive Descent Parser for the STRling DSL
//!
//! A hand-rolled recursive-descent parser that turns pattern text into AST
//! nodes. It handles:
//!   - the `%flags` directive and free-spacing (extended) mode
//!   - alternation and sequencing
//!   - character classes with ranges, shorthands and escapes
//!   - quantifiers in all three modes, with `{` backtracking
//!   - groups (capturing, non-capturing, named, atomic) and lookarounds
//!   - anchors, control/hex/unicode escapes, numbered and named
//!     backreferences checked against the evolving capture table
//!
//! Every diagnostic carries the byte offset where the problem was detected
//! and the pattern body for caret rendering. The first diagnostic aborts
//! the parse; there is no recovery.

use crate::core::errors::{ErrorKind, STRlingError};
use crate::core::hint_engine::get_hint;
use crate::core::nodes::{AnchorKind, ClassItem, Flags, LookDir, Max, Mode, Node, ShorthandKind};
use std::collections::HashSet;

/// Group nesting beyond this depth is rejected instead of risking the
/// native stack.
const MAX_GROUP_DEPTH: usize = 1000;

/// Byte-offset cursor over the pattern body.
#[derive(Debug)]
struct Cursor {
    text: String,
    i: usize,
    extended_mode: bool,
    in_class: usize,
}

impl Cursor {
    fn new(text: String, extended_mode: bool) -> Self {
        Cursor {
            text,
            i: 0,
            extended_mode,
            in_class: 0,
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.i..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.text[self.i..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.i += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.text[self.i..].starts_with(s) {
            self.i += s.len();
            true
        } else {
            false
        }
    }

    /// In extended mode (outside character classes) skip `#`-to-end-of-line
    /// comments and line terminators. Spaces and tabs stay significant; the
    /// emitter escapes them so the emitted x-mode pattern keeps them too.
    fn skip_trivia(&mut self) {
        if !self.extended_mode || self.in_class > 0 {
            return;
        }
        while let Some(ch) = self.peek() {
            match ch {
                '\r' | '\n' => {
                    self.bump();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\r' || c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }
}

/// Parser for the STRling DSL.
pub struct Parser {
    flags: Flags,
    cur: Cursor,
    cap_count: u32,
    cap_names: HashSet<String>,
    depth: usize,
}

impl Parser {
    /// Create a parser over the given input text. The `%flags` directive,
    /// if present, is consumed here; the cursor covers only the body.
    pub fn new(text: &str) -> Self {
        let (flags, body) = split_directives(text);
        let extended = flags.extended;
        Parser {
            flags,
            cur: Cursor::new(body, extended),
            cap_count: 0,
            cap_names: HashSet::new(),
            depth: 0,
        }
    }

    fn raise_error(&self, kind: ErrorKind, message: impl Into<String>, pos: usize) -> STRlingError {
        let message = message.into();
        let hint = get_hint(&message);
        STRlingError::new(kind, message, Some(pos), self.cur.text.clone(), hint)
    }

    /// Parse the whole pattern body. Trailing input after a complete parse
    /// is a diagnostic.
    pub fn parse(&mut self) -> Result<Node, STRlingError> {
        let node = self.parse_alt()?;
        self.cur.skip_trivia();
        if !self.cur.eof() {
            if self.cur.peek() == Some(')') {
                return Err(self.raise_error(ErrorKind::Syntax, "Unmatched ')'", self.cur.i));
            }
            return Err(self.raise_error(ErrorKind::Syntax, "Unexpected trailing input", self.cur.i));
        }
        Ok(node)
    }

    /// Alt := Seq ('|' Seq)*
    fn parse_alt(&mut self) -> Result<Node, STRlingError> {
        self.cur.skip_trivia();
        if self.cur.peek() == Some('|') {
            return Err(self.raise_error(
                ErrorKind::Syntax,
                "Alternation lacks left-hand side",
                self.cur.i,
            ));
        }

        let mut branches = vec![self.parse_seq()?];
        self.cur.skip_trivia();

        while self.cur.peek() == Some('|') {
            let pipe_pos = self.cur.i;
            self.cur.bump();
            self.cur.skip_trivia();
            match self.cur.peek() {
                None | Some(')') => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Alternation lacks right-hand side",
                        pipe_pos,
                    ));
                }
                Some('|') => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Empty alternation branch",
                        pipe_pos,
                    ));
                }
                _ => {}
            }
            branches.push(self.parse_seq()?);
            self.cur.skip_trivia();
        }

        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(Node::Alt { branches })
        }
    }

    /// Seq := (Atom Quantifier?)*
    fn parse_seq(&mut self) -> Result<Node, STRlingError> {
        let mut parts: Vec<Node> = Vec::new();

        loop {
            self.cur.skip_trivia();
            let ch = match self.cur.peek() {
                None => break,
                Some(c) => c,
            };
            if ch == '|' || ch == ')' {
                break;
            }

            if parts.is_empty()
                && (matches!(ch, '*' | '+' | '?') || (ch == '{' && self.braced_quant_ahead()))
            {
                return Err(self.raise_error(
                    ErrorKind::Syntax,
                    "Invalid quantifier - nothing to quantify",
                    self.cur.i,
                ));
            }

            let atom = self.parse_atom()?;
            let quant_pos = self.cur.i;
            if let Some((min, max, mode)) = self.try_parse_quantifier()? {
                if matches!(atom, Node::Anchor { .. }) {
                    return Err(self.raise_error(
                        ErrorKind::Semantics,
                        "Cannot quantify anchor",
                        quant_pos,
                    ));
                }
                parts.push(Node::Quant {
                    child: Box::new(atom),
                    min,
                    max,
                    mode,
                });
            } else {
                parts.push(atom);
            }
        }

        if parts.len() == 1 {
            Ok(parts.remove(0))
        } else {
            Ok(Node::Seq { parts })
        }
    }

    /// True when the cursor sits on a `{` that opens a committed braced
    /// quantifier (a digit follows).
    fn braced_quant_ahead(&self) -> bool {
        let mut chars = self.cur.text[self.cur.i..].chars();
        chars.next() == Some('{') && chars.next().map_or(false, |c| c.is_ascii_digit())
    }

    /// Try to consume a quantifier. Returns `None` (with the cursor
    /// untouched) when no quantifier follows; a `{` not followed by a digit
    /// is backtracked and left for the caller to treat as a literal.
    #[allow(clippy::type_complexity)]
    fn try_parse_quantifier(&mut self) -> Result<Option<(i64, Max, Mode)>, STRlingError> {
        self.cur.skip_trivia();
        let (min, max) = match self.cur.peek() {
            Some('*') => {
                self.cur.bump();
                (0, Max::Unbounded)
            }
            Some('+') => {
                self.cur.bump();
                (1, Max::Unbounded)
            }
            Some('?') => {
                self.cur.bump();
                (0, Max::Finite(1))
            }
            Some('{') => {
                let save = self.cur.i;
                self.cur.bump();

                let mut min_val: i64 = 0;
                let mut has_min = false;
                while let Some(d) = self.cur.peek().and_then(|c| c.to_digit(10)) {
                    min_val = min_val.saturating_mul(10).saturating_add(d as i64);
                    self.cur.bump();
                    has_min = true;
                }
                if !has_min {
                    // Not a quantifier after all: restore and emit literal '{'.
                    self.cur.i = save;
                    return Ok(None);
                }

                let mut max_val = Max::Finite(min_val);
                if self.cur.peek() == Some(',') {
                    self.cur.bump();
                    if self.cur.peek() == Some('}') {
                        max_val = Max::Unbounded;
                    } else {
                        let mut n: i64 = 0;
                        let mut has_max = false;
                        while let Some(d) = self.cur.peek().and_then(|c| c.to_digit(10)) {
                            n = n.saturating_mul(10).saturating_add(d as i64);
                            self.cur.bump();
                            has_max = true;
                        }
                        if !has_max {
                            return Err(self.raise_error(
                                ErrorKind::Syntax,
                                "Incomplete quantifier",
                                self.cur.i,
                            ));
                        }
                        max_val = Max::Finite(n);
                    }
                }

                if self.cur.peek() != Some('}') {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Incomplete quantifier",
                        self.cur.i,
                    ));
                }
                self.cur.bump();
                (min_val, max_val)
            }
            _ => return Ok(None),
        };

        let mode = match self.cur.peek() {
            Some('?') => {
                self.cur.bump();
                Mode::Lazy
            }
            Some('+') => {
                self.cur.bump();
                Mode::Possessive
            }
            _ => Mode::Greedy,
        };

        Ok(Some((min, max, mode)))
    }

    /// Atom := Dot | Anchor | Group | CharClass | Escape | Literal
    fn parse_atom(&mut self) -> Result<Node, STRlingError> {
        self.cur.skip_trivia();
        let ch = match self.cur.peek() {
            Some(c) => c,
            None => {
                return Err(self.raise_error(
                    ErrorKind::Syntax,
                    "Unexpected end of input",
                    self.cur.i,
                ));
            }
        };

        match ch {
            '.' => {
                self.cur.bump();
                Ok(Node::Dot)
            }
            '^' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::Start,
                })
            }
            '$' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::End,
                })
            }
            '(' => self.parse_group_or_look(),
            '[' => self.parse_char_class(),
            '\\' => self.parse_escape_atom(),
            _ => {
                self.cur.bump();
                Ok(Node::Lit {
                    value: ch.to_string(),
                })
            }
        }
    }

    /// Dispatch the `(?...)` family in its fixed prefix order, or fall
    /// through to a plain capturing group.
    fn parse_group_or_look(&mut self) -> Result<Node, STRlingError> {
        let open_pos = self.cur.i;
        self.cur.bump(); // '('
        self.depth += 1;
        if self.depth > MAX_GROUP_DEPTH {
            return Err(self.raise_error(ErrorKind::Bound, "Nesting too deep", open_pos));
        }
        let node = self.parse_group_body()?;
        self.depth -= 1;
        Ok(node)
    }

    fn parse_group_body(&mut self) -> Result<Node, STRlingError> {
        if self.cur.eat("?:") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated group")?;
            return Ok(Node::Group {
                capturing: false,
                name: None,
                atomic: false,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?<=") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated lookbehind")?;
            return Ok(Node::Look {
                dir: LookDir::Behind,
                neg: false,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?<!") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated lookbehind")?;
            return Ok(Node::Look {
                dir: LookDir::Behind,
                neg: true,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?>") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated atomic group")?;
            return Ok(Node::Group {
                capturing: false,
                name: None,
                atomic: true,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?=") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated lookahead")?;
            return Ok(Node::Look {
                dir: LookDir::Ahead,
                neg: false,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?!") {
            let body = self.parse_alt()?;
            self.expect(')', "Unterminated lookahead")?;
            return Ok(Node::Look {
                dir: LookDir::Ahead,
                neg: true,
                body: Box::new(body),
            });
        }

        if self.cur.eat("?<") {
            let name_pos = self.cur.i;
            let name = self.parse_group_name()?;
            if self.cap_names.contains(&name) {
                return Err(self.raise_error(
                    ErrorKind::Semantics,
                    "Duplicate group name",
                    name_pos,
                ));
            }
            // Registered before the body parses so an enclosed
            // backreference to this group resolves.
            self.cap_count += 1;
            self.cap_names.insert(name.clone());

            let body = self.parse_alt()?;
            self.expect(')', "Unterminated group")?;
            return Ok(Node::Group {
                capturing: true,
                name: Some(name),
                atomic: false,
                body: Box::new(body),
            });
        }

        if self.cur.peek() == Some('?') {
            let message = match self.cur.peek_at(1) {
                Some(c) => format!("Unknown group modifier: ?{}", c),
                None => "Unknown group modifier: ?".to_string(),
            };
            return Err(self.raise_error(ErrorKind::Syntax, message, self.cur.i));
        }

        self.cap_count += 1;
        let body = self.parse_alt()?;
        self.expect(')', "Unterminated group")?;
        Ok(Node::Group {
            capturing: true,
            name: None,
            atomic: false,
            body: Box::new(body),
        })
    }

    fn parse_group_name(&mut self) -> Result<String, STRlingError> {
        let start = self.cur.i;
        let mut name = String::new();
        loop {
            match self.cur.peek() {
                Some('>') => {
                    self.cur.bump();
                    break;
                }
                Some(c) if c.is_alphanumeric() || c == '_' => {
                    name.push(c);
                    self.cur.bump();
                }
                Some(c) => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        format!("Invalid character in group name: {}", c),
                        self.cur.i,
                    ));
                }
                None => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Unterminated group name",
                        self.cur.i,
                    ));
                }
            }
        }
        if name.is_empty() {
            return Err(self.raise_error(ErrorKind::Syntax, "Empty group name", start));
        }
        Ok(name)
    }

    /// CharClass := '[' '^'? item* ']'
    fn parse_char_class(&mut self) -> Result<Node, STRlingError> {
        let open_pos = self.cur.i;
        self.cur.bump(); // '['
        self.cur.in_class += 1;

        let negated = if self.cur.peek() == Some('^') {
            self.cur.bump();
            true
        } else {
            false
        };

        let mut items = Vec::new();
        loop {
            match self.cur.peek() {
                None => {
                    self.cur.in_class -= 1;
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Unterminated character class",
                        open_pos,
                    ));
                }
                Some(']') => {
                    self.cur.bump();
                    break;
                }
                Some('\\') => items.push(self.parse_class_escape()?),
                Some(ch) => {
                    let item_pos = self.cur.i;
                    self.cur.bump();
                    // 'a-z' forms a range unless the dash is the class's
                    // final character or precedes an escape.
                    if self.cur.peek() == Some('-')
                        && !matches!(self.cur.peek_at(1), None | Some(']') | Some('\\'))
                    {
                        self.cur.bump(); // '-'
                        let to = match self.cur.bump() {
                            Some(c) => c,
                            None => {
                                self.cur.in_class -= 1;
                                return Err(self.raise_error(
                                    ErrorKind::Syntax,
                                    "Unterminated character class",
                                    open_pos,
                                ));
                            }
                        };
                        if (ch as u32) > (to as u32) {
                            self.cur.in_class -= 1;
                            return Err(self.raise_error(
                                ErrorKind::Semantics,
                                "Invalid character range",
                                item_pos,
                            ));
                        }
                        items.push(ClassItem::Range { from: ch, to });
                    } else {
                        items.push(ClassItem::Lit { ch });
                    }
                }
            }
        }
        self.cur.in_class -= 1;

        if items.is_empty() {
            return Err(self.raise_error(ErrorKind::Syntax, "Empty character class", open_pos));
        }
        Ok(Node::CharClass { negated, items })
    }

    /// An escape inside a character class. `\b` is backspace here, never a
    /// word boundary.
    fn parse_class_escape(&mut self) -> Result<ClassItem, STRlingError> {
        let start = self.cur.i;
        self.cur.bump(); // '\\'
        let ch = match self.cur.peek() {
            Some(c) => c,
            None => {
                return Err(self.raise_error(
                    ErrorKind::Syntax,
                    "Incomplete escape sequence",
                    start,
                ));
            }
        };

        if let Some(kind) = ShorthandKind::from_letter(ch) {
            self.cur.bump();
            return Ok(ClassItem::Shorthand { kind });
        }

        match ch {
            'p' | 'P' => {
                self.cur.bump();
                let value = self.parse_braced_property(start)?;
                Ok(ClassItem::UnicodeProp {
                    negated: ch == 'P',
                    value,
                })
            }
            'n' | 'r' | 't' | 'f' | 'v' => {
                self.cur.bump();
                Ok(ClassItem::Lit {
                    ch: control_escape(ch),
                })
            }
            'b' => {
                self.cur.bump();
                Ok(ClassItem::Lit { ch: '\u{0008}' })
            }
            '0' => {
                self.cur.bump();
                Ok(ClassItem::Lit { ch: '\0' })
            }
            'x' => {
                self.cur.bump();
                let c = self.parse_hex_escape(start)?;
                Ok(ClassItem::Lit { ch: c })
            }
            'u' => {
                self.cur.bump();
                let c = self.parse_unicode_escape(start)?;
                Ok(ClassItem::Lit { ch: c })
            }
            _ => {
                self.cur.bump();
                Ok(ClassItem::Lit { ch })
            }
        }
    }

    /// An escape outside character classes.
    fn parse_escape_atom(&mut self) -> Result<Node, STRlingError> {
        let start = self.cur.i;
        self.cur.bump(); // '\\'
        let ch = match self.cur.peek() {
            Some(c) => c,
            None => {
                return Err(self.raise_error(
                    ErrorKind::Syntax,
                    "Incomplete escape sequence",
                    start,
                ));
            }
        };

        // Numbered backreference: \NNN with a non-zero first digit. The
        // index must not exceed the captures opened so far.
        if ch.is_ascii_digit() && ch != '0' {
            let mut num: u32 = 0;
            while let Some(d) = self.cur.peek().and_then(|c| c.to_digit(10)) {
                num = num.saturating_mul(10).saturating_add(d);
                self.cur.bump();
                if num > self.cap_count {
                    return Err(self.raise_error(
                        ErrorKind::Semantics,
                        "Backreference to undefined group",
                        start,
                    ));
                }
            }
            return Ok(Node::BackRef {
                by_index: Some(num),
                by_name: None,
            });
        }

        if let Some(kind) = ShorthandKind::from_letter(ch) {
            self.cur.bump();
            // Shorthands become single-item classes so class handling is
            // uniform downstream.
            return Ok(Node::CharClass {
                negated: false,
                items: vec![ClassItem::Shorthand { kind }],
            });
        }

        match ch {
            'b' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::WordBoundary,
                })
            }
            'B' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::NotWordBoundary,
                })
            }
            'A' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::AbsoluteStart,
                })
            }
            'Z' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::EndBeforeFinalNewline,
                })
            }
            'z' => {
                self.cur.bump();
                Ok(Node::Anchor {
                    at: AnchorKind::AbsoluteEnd,
                })
            }
            'k' => {
                self.cur.bump();
                if self.cur.peek() != Some('<') {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Expected '<' after \\k",
                        start,
                    ));
                }
                self.cur.bump();
                let mut name = String::new();
                loop {
                    match self.cur.peek() {
                        Some('>') => {
                            self.cur.bump();
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.cur.bump();
                        }
                        None => {
                            return Err(self.raise_error(
                                ErrorKind::Syntax,
                                "Unterminated named backref",
                                start,
                            ));
                        }
                    }
                }
                if !self.cap_names.contains(&name) {
                    return Err(self.raise_error(
                        ErrorKind::Semantics,
                        "Backreference to undefined group",
                        start,
                    ));
                }
                Ok(Node::BackRef {
                    by_index: None,
                    by_name: Some(name),
                })
            }
            'p' | 'P' => {
                self.cur.bump();
                let value = self.parse_braced_property(start)?;
                Ok(Node::CharClass {
                    negated: false,
                    items: vec![ClassItem::UnicodeProp {
                        negated: ch == 'P',
                        value,
                    }],
                })
            }
            'n' | 'r' | 't' | 'f' | 'v' => {
                self.cur.bump();
                Ok(Node::Lit {
                    value: control_escape(ch).to_string(),
                })
            }
            'x' => {
                self.cur.bump();
                let c = self.parse_hex_escape(start)?;
                Ok(Node::Lit {
                    value: c.to_string(),
                })
            }
            'u' => {
                self.cur.bump();
                let c = self.parse_unicode_escape(start)?;
                Ok(Node::Lit {
                    value: c.to_string(),
                })
            }
            '0' => {
                self.cur.bump();
                Ok(Node::Lit {
                    value: '\0'.to_string(),
                })
            }
            _ => {
                self.cur.bump();
                Ok(Node::Lit {
                    value: ch.to_string(),
                })
            }
        }
    }

    /// `{Name}` after `\p`/`\P`.
    fn parse_braced_property(&mut self, start: usize) -> Result<String, STRlingError> {
        if self.cur.peek() != Some('{') {
            return Err(self.raise_error(ErrorKind::Syntax, "Expected '{' after \\p/\\P", start));
        }
        self.cur.bump();
        let mut value = String::new();
        loop {
            match self.cur.peek() {
                Some('}') => {
                    self.cur.bump();
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.cur.bump();
                }
                None => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Unterminated \\p{...}",
                        start,
                    ));
                }
            }
        }
    }

    /// `HH` or `{H...}` after `\x`. Codepoints above 127 are UTF-8 encoded
    /// into the literal, never replaced.
    fn parse_hex_escape(&mut self, start: usize) -> Result<char, STRlingError> {
        if self.cur.peek() == Some('{') {
            self.cur.bump();
            let val = self.parse_braced_hex(start, "Unterminated \\x{...}", "Invalid \\x{...} escape")?;
            return char::from_u32(val).ok_or_else(|| {
                self.raise_error(ErrorKind::Syntax, "Invalid codepoint in escape", start)
            });
        }

        let mut val: u32 = 0;
        for _ in 0..2 {
            match self.cur.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    val = val * 16 + d;
                    self.cur.bump();
                }
                None => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Invalid \\xHH escape",
                        start,
                    ));
                }
            }
        }
        char::from_u32(val)
            .ok_or_else(|| self.raise_error(ErrorKind::Syntax, "Invalid codepoint in escape", start))
    }

    /// `HHHH` or `{H...}` after `\u`.
    fn parse_unicode_escape(&mut self, start: usize) -> Result<char, STRlingError> {
        if self.cur.peek() == Some('{') {
            self.cur.bump();
            let val = self.parse_braced_hex(start, "Unterminated \\u{...}", "Invalid \\u{...} escape")?;
            return char::from_u32(val).ok_or_else(|| {
                self.raise_error(ErrorKind::Syntax, "Invalid codepoint in escape", start)
            });
        }

        let mut val: u32 = 0;
        for _ in 0..4 {
            match self.cur.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    val = val * 16 + d;
                    self.cur.bump();
                }
                None => {
                    return Err(self.raise_error(
                        ErrorKind::Syntax,
                        "Invalid \\uHHHH escape",
                        start,
                    ));
                }
            }
        }
        char::from_u32(val)
            .ok_or_else(|| self.raise_error(ErrorKind::Syntax, "Invalid codepoint in escape", start))
    }

    /// Hex digits up to a closing `}` (the `{` is already consumed).
    fn parse_braced_hex(
        &mut self,
        start: usize,
        unterminated: &str,
        invalid: &str,
    ) -> Result<u32, STRlingError> {
        let mut val: u32 = 0;
        let mut digits = 0;
        while let Some(d) = self.cur.peek().and_then(|c| c.to_digit(16)) {
            val = val.saturating_mul(16).saturating_add(d);
            self.cur.bump();
            digits += 1;
        }
        match self.cur.peek() {
            Some('}') => {
                self.cur.bump();
            }
            _ => return Err(self.raise_error(ErrorKind::Syntax, unterminated, start)),
        }
        if digits == 0 {
            return Err(self.raise_error(ErrorKind::Syntax, invalid, start));
        }
        Ok(val)
    }

    fn expect(&mut self, expected: char, message: &str) -> Result<(), STRlingError> {
        if self.cur.peek() == Some(expected) {
            self.cur.bump();
            Ok(())
        } else {
            Err(self.raise_error(ErrorKind::Syntax, message, self.cur.i))
        }
    }
}

fn control_escape(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'f' => '\u{000C}',
        _ => '\u{000B}', // 'v'
    }
}

/// Split the optional `%flags` directive off the input.
///
/// Only whitespace may precede the directive; the directive line including
/// its newline is consumed and the remainder is the pattern body. Without a
/// directive the entire text is the body, untouched.
fn split_directives(text: &str) -> (Flags, String) {
    let trimmed_start =
        text.len() - text.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    let rest = &text[trimmed_start..];
    if !rest.starts_with("%flags") {
        return (Flags::default(), text.to_string());
    }

    let after = &rest["%flags".len()..];
    let (directive_rest, body) = match after.find('\n') {
        Some(nl) => (&after[..nl], &after[nl + 1..]),
        None => (after, ""),
    };
    let flags = Flags::from_letters(directive_rest.trim_end_matches('\r'));
    (flags, body.to_string())
}

/// Parse a STRling pattern into `(Flags, AST)`.
pub fn parse(text: &str) -> Result<(Flags, Node), STRlingError> {
    let mut parser = Parser::new(text);
    let node = parser.parse()?;
    Ok((parser.flags, node))
}
