//! The lexer interface the scanner drives, and its implementation over an in-memory buffer.
//!
//! [`ScanLexer`] mirrors the host lexer handed to a tree-sitter external scanner: one character of
//! lookahead, `advance` to include a character in the token, `skip` to drop leading trivia,
//! `mark_end` to fix where the token ends while continuing to look ahead.

use std::cell::Cell;

use codon_core::lang::externals::ExternalToken;

/// Cursor operations available to the external scanner.
pub trait ScanLexer {
    /// Next character, or `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consume the lookahead into the current token.
    fn advance(&mut self);

    /// Consume the lookahead as trivia. Before the first `advance` this moves the token start.
    fn skip(&mut self);

    /// Record the current position as the end of the token.
    fn mark_end(&mut self);

    /// Column of the cursor on its line, counting characters (a tab is one column). Both `\n` and a
    /// lone `\r` end a line.
    fn column(&self) -> u32;

    fn is_eof(&self) -> bool;

    /// Record which external token was recognized.
    fn set_result(&mut self, token: ExternalToken);
}

/// [`ScanLexer`] over a `&str`, tracking every byte the scanner inspected.
///
/// `furthest` is one past the last byte looked at (reading the end of input counts as looking at
/// one byte past it). A token whose `furthest` does not reach an edit cannot be affected by it.
#[derive(Debug)]
pub struct SourceLexer<'s> {
    source: &'s str,
    origin: usize,
    start: usize,
    pos: usize,
    marked: Option<usize>,
    advanced: bool,
    furthest: Cell<usize>,
    result: Option<ExternalToken>,
}

impl<'s> SourceLexer<'s> {
    /// Cursor at byte `offset`. `offset` must be a char boundary.
    pub fn new(source: &'s str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        Self {
            source,
            origin: offset,
            start: offset,
            pos: offset,
            marked: None,
            advanced: false,
            furthest: Cell::new(offset),
            result: None,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Current cursor byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Where the token starts (after any skipped trivia).
    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Where the token ends: the last mark, or the cursor if never marked.
    pub fn token_end(&self) -> usize {
        self.marked.unwrap_or(self.pos).max(self.start)
    }

    /// One past the furthest byte inspected since construction (survives [`reset`](Self::reset)).
    pub fn furthest(&self) -> usize {
        self.furthest.get()
    }

    pub fn result(&self) -> Option<ExternalToken> {
        self.result
    }

    /// Rewind to the construction offset after a failed scan. Inspected bytes stay counted: the
    /// decision to decline depended on them.
    pub fn reset(&mut self) {
        self.start = self.origin;
        self.pos = self.origin;
        self.marked = None;
        self.advanced = false;
        self.result = None;
    }

    /// Character after the lookahead.
    pub fn peek_second(&self) -> Option<char> {
        let first = self.char_at(self.pos)?;
        self.char_at(self.pos + first.len_utf8())
    }

    /// Text consumed into the token so far.
    pub fn consumed(&self) -> &'s str {
        &self.source[self.start..self.pos]
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        let c = self.source.get(pos..).and_then(|rest| rest.chars().next());
        let end = pos + c.map_or(1, char::len_utf8);
        if end > self.furthest.get() {
            self.furthest.set(end);
        }
        c
    }

    fn step(&mut self) -> bool {
        match self.char_at(self.pos) {
            Some(c) => {
                self.pos += c.len_utf8();
                true
            }
            None => false,
        }
    }
}

impl ScanLexer for SourceLexer<'_> {
    fn lookahead(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    fn advance(&mut self) {
        if self.step() {
            self.advanced = true;
        }
    }

    fn skip(&mut self) {
        if self.step() && !self.advanced {
            self.start = self.pos;
        }
    }

    fn mark_end(&mut self) {
        self.marked = Some(self.pos);
    }

    fn column(&self) -> u32 {
        let line_start = self.source[..self.pos].rfind(['\n', '\r']).map_or(0, |i| i + 1);
        let count = self.source[line_start..self.pos].chars().count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn is_eof(&self) -> bool {
        self.lookahead().is_none()
    }

    fn set_result(&mut self, token: ExternalToken) {
        self.result = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_moves_token_start_until_first_advance() {
        let mut lexer = SourceLexer::new("  ab c", 0);
        lexer.skip();
        lexer.skip();
        lexer.advance();
        lexer.advance();
        lexer.skip();
        assert_eq!(lexer.token_start(), 2);
        assert_eq!(lexer.token_end(), 5);
        assert_eq!(lexer.consumed(), "ab ");
    }

    #[test]
    fn test_mark_end_fixes_token_end() {
        let mut lexer = SourceLexer::new("abc", 0);
        lexer.advance();
        lexer.mark_end();
        lexer.advance();
        assert_eq!(lexer.token_end(), 1);
        assert_eq!(lexer.position(), 2);
        assert_eq!(lexer.furthest(), 2);
    }

    #[test]
    fn test_eof_counts_as_inspected() {
        let lexer = SourceLexer::new("ab", 2);
        assert!(lexer.is_eof());
        assert_eq!(lexer.furthest(), 3);
    }

    #[test]
    fn test_reset_keeps_furthest() {
        let mut lexer = SourceLexer::new("abcd", 1);
        lexer.advance();
        lexer.advance();
        lexer.reset();
        assert_eq!(lexer.position(), 1);
        assert_eq!(lexer.token_start(), 1);
        assert_eq!(lexer.furthest(), 3);
    }

    #[test]
    fn test_column_counts_chars_from_line_start() {
        let mut lexer = SourceLexer::new("x\n\tλ y", 2);
        assert_eq!(lexer.column(), 0);
        lexer.skip();
        lexer.skip();
        assert_eq!(lexer.column(), 2);
    }
}
