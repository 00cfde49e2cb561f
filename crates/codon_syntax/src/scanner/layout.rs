//! Layout tokens: NEWLINE, INDENT, DEDENT and INVALID_DEDENT.
//!
//! Two phases, told apart by which tokens the parser accepts:
//! - **line start** (INDENT/DEDENT valid): blank lines are skipped, the first content column is
//!   compared with the indentation stack. A comment-only line is left to the comment scanner and
//!   never changes indentation. End of input counts as column 0.
//! - **in line** (NEWLINE valid): trailing whitespace and `\` continuations are skipped; a line
//!   break or end of input ends the logical line.
//!
//! While brackets are open, line breaks are insignificant and no layout token is produced, except
//! at end of input, where the line is closed regardless.

use codon_core::lang::externals::ExternalToken;

use super::{Scan, ScanLexer, Step};

impl<L: ScanLexer> Scan<'_, L> {
    pub(super) fn layout(&mut self) -> Step {
        let line_start = self.valid.contains(ExternalToken::Indent)
            || self.valid.contains(ExternalToken::Dedent)
            || self.valid.contains(ExternalToken::InvalidDedent);
        let newline = self.valid.contains(ExternalToken::Newline);

        loop {
            self.skip_horizontal_space();
            match self.lexer.lookahead() {
                Some('\\') => {
                    self.lexer.skip();
                    if !self.skip_line_break() {
                        return Step::Decline;
                    }
                }
                Some('\n' | '\r') if line_start || self.state.bracket_depth > 0 => {
                    self.skip_line_break();
                }
                Some('\n' | '\r') if newline => return self.newline(),
                _ => break,
            }
        }

        let eof = self.lexer.is_eof();
        if line_start && (self.state.bracket_depth == 0 || eof) {
            if self.lexer.lookahead() == Some('#') {
                return Step::Continue;
            }
            let column = if eof { 0 } else { self.lexer.column() };
            return match u16::try_from(column) {
                Ok(column) => self.indentation(column),
                Err(_) => self.unrepresentable_indent(column),
            };
        }

        if newline && eof {
            self.lexer.mark_end();
            return Step::Emit(ExternalToken::Newline);
        }

        Step::Continue
    }

    /// Compare the first content column of a line with the indentation stack.
    fn indentation(&mut self, column: u16) -> Step {
        let top = self.state.current_indent();

        let token = if column > top {
            if !self.valid.contains(ExternalToken::Indent) {
                return Step::Continue;
            }
            self.state.push_indent(column);
            ExternalToken::Indent
        } else if column < top && self.state.has_indent(column) {
            if !self.valid.contains(ExternalToken::Dedent) {
                return Step::Continue;
            }
            self.state.pop_indent();
            ExternalToken::Dedent
        } else if column < top {
            // No resync: the stack stays as it is and the parser recovers at the line level.
            if !self.valid.contains(ExternalToken::InvalidDedent) {
                return Step::Continue;
            }
            tracing::trace!(column, top, "dedent to a column absent from the stack");
            ExternalToken::InvalidDedent
        } else {
            return Step::Continue;
        };

        self.lexer.mark_end();
        Step::Emit(token)
    }

    /// An indent deeper than the stack can record matches no block, so the line is rejected
    /// without touching the stack.
    fn unrepresentable_indent(&mut self, column: u32) -> Step {
        if !self.valid.contains(ExternalToken::InvalidDedent) {
            return Step::Decline;
        }
        tracing::debug!(column, "indentation exceeds the indent stack range");
        self.lexer.mark_end();
        Step::Emit(ExternalToken::InvalidDedent)
    }

    fn newline(&mut self) -> Step {
        if self.lexer.lookahead() == Some('\r') {
            self.lexer.advance();
        }
        if self.lexer.lookahead() == Some('\n') {
            self.lexer.advance();
        }
        self.lexer.mark_end();
        Step::Emit(ExternalToken::Newline)
    }

    /// Skip one `\n`, `\r\n` or lone `\r`. Returns `false` if the lookahead is not a line break.
    pub(super) fn skip_line_break(&mut self) -> bool {
        match self.lexer.lookahead() {
            Some('\r') => {
                self.lexer.skip();
                if self.lexer.lookahead() == Some('\n') {
                    self.lexer.skip();
                }
                true
            }
            Some('\n') => {
                self.lexer.skip();
                true
            }
            _ => false,
        }
    }
}
