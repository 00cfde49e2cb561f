//! Token types shared by the scanner session and the built-in lexer.

use std::fmt;

use codon_core::lang::externals::{self, ExternalToken};
use codon_core::lang::punctuation::{self, PunctuationId};

use crate::span::Span;

/// Numeric literal shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    Float,
    Imaginary,
}

/// Kind of a token in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Produced by the external scanner.
    External(ExternalToken),

    // Produced by the built-in lexer
    Ident,
    Number(NumberKind),
    Punct(PunctuationId),
    /// `{` opening an f-string interpolation.
    InterpolationStart,
    /// `}` closing an f-string interpolation.
    InterpolationEnd,

    // Error tokens of the built-in lexer
    /// Malformed numeric literal.
    InvalidNumber,
    /// Closing bracket with nothing open.
    UnmatchedClose,
    /// Character that starts no token.
    Unknown,
    /// Rest of a line skipped after an invalid dedent.
    Recovery,

    Eof,
}

impl TokenKind {
    /// Display name: the grammar symbol name for external tokens, the spelling for punctuation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::External(token) => externals::as_str(*token),
            Self::Ident => "identifier",
            Self::Number(NumberKind::Int) => "integer",
            Self::Number(NumberKind::Float) => "float",
            Self::Number(NumberKind::Imaginary) => "imaginary",
            Self::Punct(id) => punctuation::as_str(*id),
            Self::InterpolationStart => "interpolation_start",
            Self::InterpolationEnd => "interpolation_end",
            Self::InvalidNumber => "invalid_number",
            Self::UnmatchedClose => "unmatched_close",
            Self::Unknown => "unknown",
            Self::Recovery => "recovery",
            Self::Eof => "end",
        }
    }

    pub fn external(&self) -> Option<ExternalToken> {
        match self {
            Self::External(token) => Some(*token),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        self.external().is_some()
    }

    pub fn is_error(&self) -> bool {
        match self {
            Self::External(token) => externals::is_error(*token),
            Self::InvalidNumber | Self::UnmatchedClose | Self::Unknown => true,
            _ => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its location.
///
/// `lookahead_end` is one past the furthest byte inspected while producing the token, including
/// bytes looked at by a scanner attempt that declined. An edit starting at or after it cannot
/// change this token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub lookahead_end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, lookahead_end: usize) -> Self {
        Self {
            kind,
            span,
            lookahead_end,
        }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.text(source)
    }

    pub(crate) fn shifted(self, delta: isize) -> Self {
        Self {
            kind: self.kind,
            span: self.span.shifted(delta),
            lookahead_end: self.lookahead_end.saturating_add_signed(delta),
        }
    }
}
