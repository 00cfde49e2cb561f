//! Error types for the scanner crate.
//!
//! Three families:
//! - [`LexicalError`]: a problem in the *source text*. Produced from error tokens after the fact;
//!   scanning itself never fails.
//! - [`CheckpointError`]: a serialized scanner state that cannot be decoded or encoded.
//! - [`ReparseError`]: an incremental reparse that cannot proceed (bad edit, corrupt checkpoint).

use std::fmt;

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;

use crate::span::Span;

// ============================================================================
// Lexical diagnostics
// ============================================================================

/// What went wrong in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalErrorKind {
    /// A line dedents to a column that no enclosing block opened.
    InvalidDedent { column: usize },
    /// A string literal reaches a newline (single-quoted) or the end of input.
    UnterminatedString,
    /// A character the lexer has no token for.
    UnexpectedCharacter(char),
    /// A closing bracket with no opener.
    UnmatchedBracket(char),
    /// Brackets still open at the end of input.
    UnclosedBracket { depth: u16 },
    /// A numeric literal that does not parse, e.g. `0x` or `1e`.
    InvalidNumber,
}

impl fmt::Display for LexicalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDedent { column } => {
                write!(f, "unindent to column {column} does not match any outer indentation level")
            }
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character {c:?}"),
            Self::UnmatchedBracket(c) => write!(f, "unmatched closing bracket '{c}'"),
            Self::UnclosedBracket { depth } => {
                write!(f, "{depth} bracket(s) still open at end of input")
            }
            Self::InvalidNumber => write!(f, "invalid numeric literal"),
        }
    }
}

impl LexicalErrorKind {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidDedent { .. } => "codon::lex::invalid_dedent",
            Self::UnterminatedString => "codon::lex::unterminated_string",
            Self::UnexpectedCharacter(_) => "codon::lex::unexpected_character",
            Self::UnmatchedBracket(_) => "codon::lex::unmatched_bracket",
            Self::UnclosedBracket { .. } => "codon::lex::unclosed_bracket",
            Self::InvalidNumber => "codon::lex::invalid_number",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::InvalidDedent { .. } => "inconsistent dedent",
            Self::UnterminatedString => "string ends here",
            Self::UnexpectedCharacter(_) => "not valid here",
            Self::UnmatchedBracket(_) => "no matching opener",
            Self::UnclosedBracket { .. } => "input ends here",
            Self::InvalidNumber => "malformed literal",
        }
    }
}

/// A lexical error with its location. Renders through `miette` with the source attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub span: Span,
    pub hints: Vec<String>,
}

impl LexicalError {
    pub fn new(kind: LexicalErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn invalid_dedent(column: usize, span: Span) -> Self {
        Self::new(LexicalErrorKind::InvalidDedent { column }, span)
            .with_hint("indent the line to match one of the enclosing blocks")
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::new(LexicalErrorKind::UnterminatedString, span)
            .with_hint("close the string on the same line, or use a triple-quoted string")
    }

    pub fn unclosed_bracket(depth: u16, span: Span) -> Self {
        Self::new(LexicalErrorKind::UnclosedBracket { depth }, span)
    }
}

impl Diagnostic for LexicalError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.hints.is_empty() {
            None
        } else {
            Some(Box::new(self.hints.join("\n")))
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(Some(self.kind.label().to_string()), self.span);
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// Checkpoint codec errors
// ============================================================================

/// A scanner state that cannot be written to, or read back from, a checkpoint buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    #[error("scan state needs {needed} bytes but the checkpoint buffer holds {capacity}")]
    StateTooLarge { needed: usize, capacity: usize },

    #[error("checkpoint truncated: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("checkpoint has {extra} unexpected trailing byte(s)")]
    TrailingBytes { extra: usize },

    #[error("unsupported checkpoint version {0}")]
    Version(u8),

    #[error("invalid lexical mode byte {0}")]
    Mode(u8),

    #[error("stored lexical mode {stored} disagrees with the delimiter stack ({derived})")]
    ModeMismatch { stored: &'static str, derived: &'static str },

    #[error("indentation stack must start at column 0 and strictly increase")]
    Indents,

    #[error("invalid delimiter quote byte {0:#04x}")]
    Quote(u8),

    #[error("invalid delimiter flags {0:#010b}")]
    Flags(u8),

    #[error("delimiter interpolation nesting is inconsistent with bracket depth {bracket_depth}")]
    Interpolation { bracket_depth: u16 },

    #[error("no scan state was recorded at this checkpoint")]
    Missing,
}

// ============================================================================
// Incremental reparse errors
// ============================================================================

/// Why an incremental reparse could not reuse the previous token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReparseError {
    #[error("edit {start}..{old_end} (now ..{new_end}) is invalid for a {old_len}-byte source")]
    EditOutOfBounds {
        start: usize,
        old_end: usize,
        new_end: usize,
        old_len: usize,
    },

    #[error("edit implies a {expected}-byte source but the new source has {actual} bytes")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("the previous token stream was recorded without checkpoints")]
    NoCheckpoints,

    #[error("corrupted checkpoint before token {index}: {source}")]
    Corrupted {
        index: usize,
        #[source]
        source: CheckpointError,
    },
}
