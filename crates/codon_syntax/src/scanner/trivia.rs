//! Comments and extern block bodies: runs of text the parser keeps but never looks inside.

use codon_core::lang::externals::ExternalToken;

use super::{LexicalMode, Scan, ScanLexer};

impl<L: ScanLexer> Scan<'_, L> {
    /// `#` up to, not including, the line break.
    pub(super) fn comment(&mut self) -> ExternalToken {
        self.state.mode = LexicalMode::Comment;
        while let Some(c) = self.lexer.lookahead() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.lexer.advance();
        }
        self.lexer.mark_end();
        self.state.sync_mode();
        ExternalToken::Comment
    }

    /// Body of an `@llvm` / `@python` function: every following line indented deeper than the
    /// current block, blank lines included, up to the end of the last non-blank one.
    ///
    /// The body is opaque, so no INDENT/DEDENT is produced for it. Only trivia is skipped before
    /// the decision, which keeps a declined attempt harmless for the scanners that run after.
    pub(super) fn extern_content(&mut self) -> Option<ExternalToken> {
        if self.state.bracket_depth > 0 {
            return None;
        }
        self.skip_blank_lines(|lexer| lexer.skip());
        let top = u32::from(self.state.current_indent());
        if self.lexer.is_eof() || self.lexer.column() <= top {
            return None;
        }

        loop {
            while let Some(c) = self.lexer.lookahead() {
                if c == '\n' || c == '\r' {
                    break;
                }
                self.lexer.advance();
            }
            self.lexer.mark_end();

            self.skip_blank_lines(|lexer| lexer.advance());
            if self.lexer.is_eof() || self.lexer.column() <= top {
                break;
            }
        }

        tracing::trace!(indent = top, "consumed extern block body");
        Some(ExternalToken::ExternContent)
    }

    /// Move over whitespace and line breaks until the first content character of a line.
    fn skip_blank_lines(&mut self, mut step: impl FnMut(&mut L)) {
        while let Some(' ' | '\t' | '\x0c' | '\n' | '\r') = self.lexer.lookahead() {
            step(&mut *self.lexer);
        }
    }
}
