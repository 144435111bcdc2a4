//! STRling Hint Engine - Context-Aware Error Hints
//!
//! Maps parser and compiler diagnostics to instructional messages that tell
//! the user how to fix the pattern, not just what broke. The parser attaches
//! these at diagnostic-creation time; consumers that render diagnostics
//! (CLI, LSP) show the hint below the caret line.

/// Get a hint for a given diagnostic message.
///
/// Matching is substring-based so messages that interpolate context (for
/// example the offending group-modifier character) still resolve. Returns
/// `None` for messages without a curated hint.
pub fn get_hint(error_message: &str) -> Option<String> {
    let table: &[(&str, &str)] = &[
        (
            "Unterminated group name",
            "A named group looks like '(?<name>...)'. Close the name with '>' before the group body.",
        ),
        (
            "Unterminated group",
            "This group was opened with '(' but never closed. Add a matching ')' to close the group.",
        ),
        (
            "Unterminated lookahead",
            "A lookahead looks like '(?=...)' or '(?!...)'. Add the closing ')'.",
        ),
        (
            "Unterminated lookbehind",
            "A lookbehind looks like '(?<=...)' or '(?<!...)'. Add the closing ')'.",
        ),
        (
            "Unterminated atomic group",
            "An atomic group looks like '(?>...)'. Add the closing ')'.",
        ),
        (
            "Unterminated character class",
            "This character class was opened with '[' but never closed. Add a matching ']' to close it.",
        ),
        (
            "Empty character class",
            "Character classes must contain at least one item. Add characters, ranges, or escapes inside the brackets.",
        ),
        (
            "Invalid character range",
            "Ranges like 'a-z' must run from the lower codepoint to the higher one. Swap the endpoints.",
        ),
        (
            "Unmatched ')'",
            "This ')' character does not have a matching opening '('. Did you mean to escape it with '\\)'?",
        ),
        (
            "Alternation lacks left-hand side",
            "An alternation '|' must have content on both sides. Remove the leading '|' or add content before it.",
        ),
        (
            "Alternation lacks right-hand side",
            "An alternation '|' must have content on both sides. Remove the trailing '|' or add content after it.",
        ),
        (
            "Empty alternation branch",
            "Each branch of an alternation must contain at least one item. Remove the extra '|' or add content between the pipes.",
        ),
        (
            "Unexpected trailing input",
            "There is unexpected content at the end of the pattern. Check for unmatched parentheses or other syntax errors.",
        ),
        (
            "nothing to quantify",
            "Quantifiers like '*', '+' and '{2,3}' repeat the item before them. Put something quantifiable in front.",
        ),
        (
            "Incomplete quantifier",
            "A braced quantifier looks like '{2}', '{2,}' or '{2,5}'. Close it with '}' or escape the '{'.",
        ),
        (
            "Cannot quantify anchor",
            "Anchors like '^', '$' and '\\b' match positions, not text, so repeating them has no effect. Remove the quantifier.",
        ),
        (
            "Duplicate group name",
            "Each named group must have a unique name within the pattern. Rename one of the groups.",
        ),
        (
            "Backreference to undefined group",
            "Backreferences can only point at capturing groups that open earlier in the pattern. Check the group number or name.",
        ),
        (
            "Unterminated named backref",
            "A named backreference looks like '\\k<name>'. Close the name with '>'.",
        ),
        (
            "Unknown group modifier",
            "After '(?' the parser expects ':', '>', '=', '!', '<=', '<!' or '<name>'.",
        ),
        (
            "Nesting too deep",
            "The pattern nests more than 1000 groups. Flatten the expression.",
        ),
    ];

    for (needle, hint) in table {
        if error_message.contains(needle) {
            return Some((*hint).to_string());
        }
    }
    None
}
