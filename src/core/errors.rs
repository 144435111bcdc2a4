//! STRling Diagnostics - Rich Error Values for the Compile Pipeline
//!
//! Every fallible stage of the pipeline (parser, compiler) returns a single
//! [`STRlingError`] value: a human-readable message, the diagnostic category,
//! an optional byte offset into the pattern body, the body text for context
//! rendering, and an optional instructional hint. The first diagnostic a
//! stage produces is the one it returns; nothing downstream rewrites it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Category of a diagnostic, mirroring the pipeline's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed pattern text: unterminated constructs, stray tokens.
    Syntax,
    /// Structurally valid but meaningless: duplicate names, dangling
    /// backreferences, quantified anchors, inverted class ranges.
    Semantics,
    /// Numeric or structural limits: inverted quantifier bounds, negative
    /// repetition counts, nesting depth.
    Bound,
}

/// A single diagnostic produced by the parser or the compiler.
///
/// Parser diagnostics carry the byte offset (into the pattern body, i.e.
/// the text after the `%flags` directive) where the problem was detected
/// and the body text itself, so the error can be rendered with a caret
/// pointing at the offending column. Compiler diagnostics describe the
/// offending subtree and carry no offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct STRlingError {
    /// Diagnostic category.
    pub kind: ErrorKind,
    /// A concise description of what went wrong.
    pub message: String,
    /// Byte offset into the pattern body where the problem was detected.
    pub pos: Option<usize>,
    /// The pattern body being processed ("" when not available).
    pub text: String,
    /// An instructional hint explaining how to fix the problem.
    pub hint: Option<String>,
}

impl STRlingError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        pos: Option<usize>,
        text: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        STRlingError {
            kind,
            message: message.into(),
            pos,
            text: text.into(),
            hint,
        }
    }

    /// Compiler-side semantic diagnostic with no source position.
    pub fn semantics(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantics, message, None, "", None)
    }

    /// Compiler-side bound diagnostic with no source position.
    pub fn bound(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Bound, message, None, "", None)
    }

    /// Locate `pos` in `text`, returning (1-indexed line, line text, column).
    fn locate(&self, pos: usize) -> (usize, String, usize) {
        let lines: Vec<&str> = self.text.lines().collect();
        let mut line_start = 0;
        for (idx, line) in lines.iter().enumerate() {
            let line_end = line_start + line.len();
            if pos <= line_end {
                return (idx + 1, line.to_string(), pos - line_start);
            }
            line_start = line_end + 1; // past the newline
        }
        // Offset beyond the last line: point at the end of it.
        match lines.last() {
            Some(last) => (lines.len(), last.to_string(), last.len()),
            None => (1, String::new(), 0),
        }
    }

    /// Render the diagnostic in the instructional format:
    /// message, source line, caret column, optional hint.
    fn format_error(&self) -> String {
        let pos = match self.pos {
            Some(p) => p,
            None => {
                let mut out = format!("STRling Compile Error: {}", self.message);
                if let Some(ref hint) = self.hint {
                    out.push_str(&format!("\n\nHint: {}", hint));
                }
                return out;
            }
        };

        if self.text.is_empty() {
            return format!("{} at position {}", self.message, pos);
        }

        let (line_num, line_text, col) = self.locate(pos);
        let mut parts = vec![
            format!("STRling Parse Error: {}", self.message),
            String::new(),
            format!("> {} | {}", line_num, line_text),
            format!(">   | {}^", " ".repeat(col)),
        ];
        if let Some(ref hint) = self.hint {
            parts.push(String::new());
            parts.push(format!("Hint: {}", hint));
        }
        parts.join("\n")
    }

    /// Convert the diagnostic to the LSP `Diagnostic` JSON shape.
    ///
    /// The returned value carries a zero-indexed line/character range, a
    /// severity of 1 (Error), the message with its hint folded in, and a
    /// snake_case error code derived from the message.
    pub fn to_lsp_diagnostic(&self) -> serde_json::Value {
        let pos = self.pos.unwrap_or(0);
        let (line, col) = if self.text.is_empty() {
            (0, pos)
        } else {
            let (line_num, _, col) = self.locate(pos);
            (line_num - 1, col)
        };

        let mut message = self.message.clone();
        if let Some(ref hint) = self.hint {
            message.push_str(&format!("\n\nHint: {}", hint));
        }

        let code: String = self
            .message
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        serde_json::json!({
            "range": {
                "start": {"line": line, "character": col},
                "end": {"line": line, "character": col + 1}
            },
            "severity": 1,
            "message": message,
            "source": "STRling",
            "code": code
        })
    }
}

impl fmt::Display for STRlingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_error())
    }
}

impl Error for STRlingError {}
