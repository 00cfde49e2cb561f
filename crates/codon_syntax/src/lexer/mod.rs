//! Built-in lexer: the parser's own lexer for positions the external scanner declines.
//!
//! A generated tree-sitter parser carries a lexer for every token the grammar spells out
//! literally or by regex. This module stands in for it: identifiers, numbers, punctuation and
//! the braces of f-string interpolations. It never produces layout or string tokens.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `numbers` - Numeric literal scanning
//!
//! The lexer runs on the same [`SourceLexer`] the scanner used at that position, after
//! [`SourceLexer::reset`], so bytes the scanner inspected before declining remain part of the
//! token's lookahead.

mod numbers;
pub mod tokens;

pub use tokens::{NumberKind, Token, TokenKind};

use codon_core::lang::punctuation;

use crate::scanner::{ScanLexer, SourceLexer};

/// Where the parser is when it falls back to the built-in lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexContext {
    /// Ordinary code. Leading whitespace and insignificant line breaks are skipped.
    Code,
    /// Literal text of an f-string: the only token expected is the `{` of an interpolation.
    StringBody,
}

/// One-token lexer over a scanner cursor.
pub struct Lexer<'c, 's> {
    cursor: &'c mut SourceLexer<'s>,
}

impl<'c, 's> Lexer<'c, 's> {
    pub fn new(cursor: &'c mut SourceLexer<'s>) -> Self {
        Self { cursor }
    }

    /// Lex exactly one token. Returns [`TokenKind::Eof`] only at end of input.
    pub fn next_token(&mut self, context: LexContext) -> TokenKind {
        if context == LexContext::StringBody {
            return match self.advance() {
                Some('{') => TokenKind::InterpolationStart,
                Some(_) => TokenKind::Unknown,
                None => TokenKind::Eof,
            };
        }

        self.skip_trivia();
        let Some(c) = self.advance() else {
            return TokenKind::Eof;
        };

        match c {
            c if is_ident_start(c) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.advance();
                }
                TokenKind::Ident
            }
            c if c.is_ascii_digit() => self.scan_number(c),
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(c),
            c => self.scan_punctuation(c),
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.cursor.lookahead()
    }

    fn peek_next(&self) -> Option<char> {
        self.cursor.peek_second()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor.advance();
        Some(c)
    }

    /// Whitespace, line breaks (the scanner already claimed every significant one) and `\`
    /// continuations.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\x0c' | '\r' | '\n') => self.cursor.skip(),
                Some('\\') if matches!(self.peek_next(), Some('\n' | '\r')) => {
                    self.cursor.skip();
                    self.cursor.skip();
                }
                _ => return,
            }
        }
    }

    // ========================================================================
    // Punctuation
    // ========================================================================

    /// Longest registered spelling starting with `first`.
    fn scan_punctuation(&mut self, first: char) -> TokenKind {
        let window = [Some(first), self.peek(), self.peek_next()];
        debug_assert!(punctuation::max_len() <= window.len());

        for len in (1..=window.len()).rev() {
            let Some(candidate) = window[..len].iter().copied().collect::<Option<String>>() else {
                continue;
            };
            if let Some(id) = punctuation::from_str(&candidate) {
                for _ in 1..len {
                    self.advance();
                }
                return TokenKind::Punct(id);
            }
        }
        TokenKind::Unknown
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
