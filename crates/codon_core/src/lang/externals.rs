//! Define the external token contract between the Codon grammar and its scanner.
//!
//! The grammar lists these tokens in its `externals` array; the generated parser then hands the
//! scanner a `valid_symbols` array indexed by position in that list. The order of [`EXTERNALS`] is
//! therefore the contract: reordering it without regenerating the grammar is a build-time break.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and uses the grammar-side names.
//! - Names starting with `_` are hidden in the syntax tree (tree-sitter convention).
//! - [`ExternalToken::Prec`] and [`ExternalToken::ErrorSentinel`] are never produced by the
//!   scanner. The first is a grammar precedence marker, the second is only ever *valid*, and only
//!   while the parser is in error recovery.
//!
//! ## Examples
//! ```rust
//! use codon_core::lang::externals::{self, ExternalToken};
//!
//! assert_eq!(externals::from_index(6), Some(ExternalToken::StringEnd));
//! assert_eq!(externals::as_str(ExternalToken::StringEnd), "string_end");
//! assert!(externals::is_error(ExternalToken::InvalidDedent));
//! ```

use super::registry::Example;

/// Stable identifier for every external token, in grammar order.
///
/// The discriminant is the index into the grammar's `externals` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ExternalToken {
    Newline = 0,
    Indent = 1,
    Dedent = 2,
    StringStart = 3,
    StringContent = 4,
    EscapeInterpolation = 5,
    StringEnd = 6,
    ExternContent = 7,
    Prec = 8,
    Comment = 9,
    InvalidDedent = 10,
    UnterminatedString = 11,
    ErrorSentinel = 12,
}

/// Number of external tokens in the contract.
pub const COUNT: usize = 13;

/// Broad grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalCategory {
    /// NEWLINE / INDENT / DEDENT.
    Layout,
    /// Tokens produced while a string literal is open.
    String,
    /// Raw foreign-language bodies.
    Extern,
    /// Comments.
    Trivia,
    /// Error tokens fed into the parser's recovery.
    Error,
    /// Grammar-only markers the scanner never emits.
    Marker,
}

/// Metadata for an external token.
#[derive(Debug, Clone, Copy)]
pub struct ExternalInfo {
    pub id: ExternalToken,
    /// Name used in the grammar's `externals` list.
    pub name: &'static str,
    pub category: ExternalCategory,
    pub description: &'static str,
    /// Whether the scanner may return this token at all.
    pub produced: bool,
    /// Snippets that produce this token. Every produced token has at least one.
    pub examples: &'static [Example],
}

/// Registry of all external tokens, ordered by contract index.
pub const EXTERNALS: &[ExternalInfo] = &[
    info(
        ExternalToken::Newline,
        "_newline",
        ExternalCategory::Layout,
        "End of a logical line. Consumes the line terminator; zero-width at end of input.",
        true,
        &[Example {
            code: "x = 1\n",
            note: Some("The `\\n` is the NEWLINE token."),
        }],
    ),
    info(
        ExternalToken::Indent,
        "_indent",
        ExternalCategory::Layout,
        "Line indented deeper than the enclosing block. Zero-width at the first content byte.",
        true,
        &[Example {
            code: "if x:\n    y\n",
            note: None,
        }],
    ),
    info(
        ExternalToken::Dedent,
        "_dedent",
        ExternalCategory::Layout,
        "One closed block. Emitted once per indentation level popped; zero-width.",
        true,
        &[Example {
            code: "if x:\n    y\nz\n",
            note: Some("Column 0 closes the block opened at column 4."),
        }],
    ),
    info(
        ExternalToken::StringStart,
        "string_start",
        ExternalCategory::String,
        "Optional prefix (r, u, f, b, rf, rb) followed by an opening quote or triple quote.",
        true,
        &[Example {
            code: "f\"{x}\"",
            note: Some("`f\"` is the string start."),
        }],
    ),
    info(
        ExternalToken::StringContent,
        "string_content",
        ExternalCategory::String,
        "One or more bytes of literal string text, escapes included.",
        true,
        &[Example {
            code: "'a\\tb'",
            note: None,
        }],
    ),
    info(
        ExternalToken::EscapeInterpolation,
        "escape_interpolation",
        ExternalCategory::String,
        "A doubled brace (`{{` or `}}`) inside an f-string.",
        true,
        &[Example {
            code: "f'{{x}}'",
            note: Some("Both doubled braces are literal text."),
        }],
    ),
    info(
        ExternalToken::StringEnd,
        "string_end",
        ExternalCategory::String,
        "The closing quote(s) of the innermost open string.",
        true,
        &[Example {
            code: "\"\"\"doc\"\"\"",
            note: None,
        }],
    ),
    info(
        ExternalToken::ExternContent,
        "extern_content",
        ExternalCategory::Extern,
        "Raw body of an `@llvm` or `@python` decorated function.",
        true,
        &[Example {
            code: "@llvm\ndef inc(x: int) -> int:\n    %0 = add i64 %x, 1\n    ret i64 %0\n",
            note: Some("The two indented lines form one extern_content token."),
        }],
    ),
    info(
        ExternalToken::Prec,
        "_prec",
        ExternalCategory::Marker,
        "Precedence marker referenced by grammar rules; never scanned.",
        false,
        &[],
    ),
    info(
        ExternalToken::Comment,
        "comment",
        ExternalCategory::Trivia,
        "`#` up to (not including) the end of the line.",
        true,
        &[Example {
            code: "x = 1  # one\n",
            note: None,
        }],
    ),
    info(
        ExternalToken::InvalidDedent,
        "_invalid_dedent",
        ExternalCategory::Error,
        "Dedent to a column that matches no open block. The indentation stack is left untouched.",
        true,
        &[Example {
            code: "if x:\n    y\n  z\n",
            note: Some("Column 2 is not on the stack [0, 4]."),
        }],
    ),
    info(
        ExternalToken::UnterminatedString,
        "_unterminated_string",
        ExternalCategory::Error,
        "Newline inside a single-quoted string, or end of input inside any string.",
        true,
        &[
            Example {
                code: "s = 'abc\n",
                note: None,
            },
            Example {
                code: "f\"{x",
                note: Some("End of input inside an interpolation also ends the string."),
            },
        ],
    ),
    info(
        ExternalToken::ErrorSentinel,
        "_error_sentinel",
        ExternalCategory::Marker,
        "Only valid while the parser is in error recovery; never scanned.",
        false,
        &[],
    ),
];

// --- lookups -----------------------------------------------------------------

/// Grammar-side name.
pub fn as_str(id: ExternalToken) -> &'static str {
    info_for(id).name
}

/// Contract index of the token.
pub fn index(id: ExternalToken) -> usize {
    id as usize
}

/// Resolve a contract index back to the token.
pub fn from_index(index: usize) -> Option<ExternalToken> {
    EXTERNALS.get(index).map(|e| e.id)
}

/// Resolve a grammar-side name.
pub fn from_str(s: &str) -> Option<ExternalToken> {
    EXTERNALS.iter().find(|e| e.name == s).map(|e| e.id)
}

/// Category.
pub fn category(id: ExternalToken) -> ExternalCategory {
    info_for(id).category
}

/// Return `true` for tokens that encode a lexical error.
pub fn is_error(id: ExternalToken) -> bool {
    category(id) == ExternalCategory::Error
}

/// Full metadata entry.
///
/// ## Panics
/// - Never in practice: the guardrail tests check that every `ExternalToken` has an entry at its own
///   index.
pub fn info_for(id: ExternalToken) -> &'static ExternalInfo {
    &EXTERNALS[index(id)]
}

/// All tokens in contract order.
pub fn all() -> impl Iterator<Item = ExternalToken> {
    EXTERNALS.iter().map(|e| e.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: ExternalToken,
    name: &'static str,
    category: ExternalCategory,
    description: &'static str,
    produced: bool,
    examples: &'static [Example],
) -> ExternalInfo {
    ExternalInfo {
        id,
        name,
        category,
        description,
        produced,
        examples,
    }
}
