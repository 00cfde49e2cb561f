//! Punctuation and operator vocabulary.
//!
//! This module defines the canonical set of punctuation tokens the built-in lexer produces when the
//! external scanner declines a position: delimiters, separators, arrows and every Codon operator.
//!
//! ## Notes
//! - Lookup via [`from_str`] is exact. Longest-match selection is the lexer's job; [`max_len`]
//!   bounds how far it needs to look.
//! - This module is vocabulary only (spellings + metadata). It does not tokenize source text.
//!
//! ## Examples
//! ```rust
//! use codon_core::lang::punctuation::{self, PunctuationId};
//!
//! assert_eq!(punctuation::from_str("//="), Some(PunctuationId::SlashSlashEq));
//! assert_eq!(punctuation::as_str(PunctuationId::Arrow), "->");
//! ```

/// Broad syntactic grouping for punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationCategory {
    /// Brackets and braces.
    Delimiter,
    /// Separators like `,`, `:` and `;`.
    Separator,
    /// Arithmetic, bitwise and comparison operators.
    Operator,
    /// Assignment and augmented assignment.
    Assignment,
    /// Misc markers like `.`, `->`, `@`, `...`, `!`.
    Marker,
}

/// Stable identifier for punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationId {
    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Separators
    Comma,
    Colon,
    Semicolon,

    // Markers
    Dot,
    Ellipsis,
    Arrow,
    At,
    Bang,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,

    // Assignment
    Eq,
    Walrus,
    PlusEq,
    MinusEq,
    StarEq,
    StarStarEq,
    SlashEq,
    SlashSlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    AtEq,
}

/// Which bracket a delimiter opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    Paren,
    Bracket,
    Brace,
}

/// Metadata for a punctuation token.
#[derive(Debug, Clone, Copy)]
pub struct PunctuationInfo {
    pub id: PunctuationId,
    pub canonical: &'static str,
    pub category: PunctuationCategory,
}

use PunctuationCategory::{Assignment, Delimiter, Marker, Operator, Separator};

/// Registry of all punctuation tokens.
pub const PUNCTUATION: &[PunctuationInfo] = &[
    info(PunctuationId::LParen, "(", Delimiter),
    info(PunctuationId::RParen, ")", Delimiter),
    info(PunctuationId::LBracket, "[", Delimiter),
    info(PunctuationId::RBracket, "]", Delimiter),
    info(PunctuationId::LBrace, "{", Delimiter),
    info(PunctuationId::RBrace, "}", Delimiter),
    info(PunctuationId::Comma, ",", Separator),
    info(PunctuationId::Colon, ":", Separator),
    info(PunctuationId::Semicolon, ";", Separator),
    info(PunctuationId::Dot, ".", Marker),
    info(PunctuationId::Ellipsis, "...", Marker),
    info(PunctuationId::Arrow, "->", Marker),
    info(PunctuationId::At, "@", Marker),
    info(PunctuationId::Bang, "!", Marker),
    info(PunctuationId::Plus, "+", Operator),
    info(PunctuationId::Minus, "-", Operator),
    info(PunctuationId::Star, "*", Operator),
    info(PunctuationId::StarStar, "**", Operator),
    info(PunctuationId::Slash, "/", Operator),
    info(PunctuationId::SlashSlash, "//", Operator),
    info(PunctuationId::Percent, "%", Operator),
    info(PunctuationId::Amp, "&", Operator),
    info(PunctuationId::Pipe, "|", Operator),
    info(PunctuationId::Caret, "^", Operator),
    info(PunctuationId::Tilde, "~", Operator),
    info(PunctuationId::Shl, "<<", Operator),
    info(PunctuationId::Shr, ">>", Operator),
    info(PunctuationId::Lt, "<", Operator),
    info(PunctuationId::Gt, ">", Operator),
    info(PunctuationId::LtEq, "<=", Operator),
    info(PunctuationId::GtEq, ">=", Operator),
    info(PunctuationId::EqEq, "==", Operator),
    info(PunctuationId::NotEq, "!=", Operator),
    info(PunctuationId::Eq, "=", Assignment),
    info(PunctuationId::Walrus, ":=", Assignment),
    info(PunctuationId::PlusEq, "+=", Assignment),
    info(PunctuationId::MinusEq, "-=", Assignment),
    info(PunctuationId::StarEq, "*=", Assignment),
    info(PunctuationId::StarStarEq, "**=", Assignment),
    info(PunctuationId::SlashEq, "/=", Assignment),
    info(PunctuationId::SlashSlashEq, "//=", Assignment),
    info(PunctuationId::PercentEq, "%=", Assignment),
    info(PunctuationId::AmpEq, "&=", Assignment),
    info(PunctuationId::PipeEq, "|=", Assignment),
    info(PunctuationId::CaretEq, "^=", Assignment),
    info(PunctuationId::ShlEq, "<<=", Assignment),
    info(PunctuationId::ShrEq, ">>=", Assignment),
    info(PunctuationId::AtEq, "@=", Assignment),
];

/// Canonical spelling.
pub fn as_str(id: PunctuationId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: PunctuationId) -> PunctuationCategory {
    info_for(id).category
}

/// Full metadata entry.
pub fn info_for(id: PunctuationId) -> &'static PunctuationInfo {
    PUNCTUATION
        .iter()
        .find(|p| p.id == id)
        .expect("INVARIANT: every PunctuationId has a registry entry")
}

/// Exact spelling lookup.
pub fn from_str(s: &str) -> Option<PunctuationId> {
    PUNCTUATION.iter().find(|p| p.canonical == s).map(|p| p.id)
}

/// Length in bytes of the longest spelling.
pub fn max_len() -> usize {
    PUNCTUATION.iter().map(|p| p.canonical.len()).max().unwrap_or(0)
}

/// Bracket opened by this token, if any.
pub fn opens(id: PunctuationId) -> Option<BracketKind> {
    match id {
        PunctuationId::LParen => Some(BracketKind::Paren),
        PunctuationId::LBracket => Some(BracketKind::Bracket),
        PunctuationId::LBrace => Some(BracketKind::Brace),
        _ => None,
    }
}

/// Bracket closed by this token, if any.
pub fn closes(id: PunctuationId) -> Option<BracketKind> {
    match id {
        PunctuationId::RParen => Some(BracketKind::Paren),
        PunctuationId::RBracket => Some(BracketKind::Bracket),
        PunctuationId::RBrace => Some(BracketKind::Brace),
        _ => None,
    }
}

const fn info(id: PunctuationId, canonical: &'static str, category: PunctuationCategory) -> PunctuationInfo {
    PunctuationInfo { id, canonical, category }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_len_is_three() {
        assert_eq!(max_len(), 3);
    }

    #[test]
    fn test_brackets_pair_up() {
        assert_eq!(opens(PunctuationId::LBrace), closes(PunctuationId::RBrace));
        assert_eq!(opens(PunctuationId::RBrace), None);
        assert_eq!(closes(PunctuationId::Colon), None);
    }
}
