//! Numeric literal scanning for the built-in lexer.
//!
//! Handles decimal integers, `0x`/`0o`/`0b` integers, floats with fraction and/or exponent, and
//! imaginary literals (`2j`). Underscores may separate digits. Only the shape is checked; values
//! are left to later stages.

use super::Lexer;
use super::tokens::{NumberKind, TokenKind};

impl Lexer<'_, '_> {
    /// `first` has already been consumed (a digit, or `.` followed by a digit).
    pub(super) fn scan_number(&mut self, first: char) -> TokenKind {
        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                if self.digits(radix) == 0 {
                    return self.invalid();
                }
                return self.finish(NumberKind::Int);
            }
        }

        let mut kind = NumberKind::Int;

        // Integer part, or the fraction of a literal starting with `.`
        if first == '.' {
            kind = NumberKind::Float;
        }
        self.digits(10);

        // Fraction
        if first != '.' && self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.digits(10);
            kind = NumberKind::Float;
        }

        // Exponent
        if let Some('e' | 'E') = self.peek() {
            self.advance();
            if let Some('+' | '-') = self.peek() {
                self.advance();
            }
            if self.digits(10) == 0 {
                return self.invalid();
            }
            kind = NumberKind::Float;
        }

        // Imaginary suffix
        if let Some('j' | 'J') = self.peek() {
            self.advance();
            kind = NumberKind::Imaginary;
        }

        self.finish(kind)
    }

    /// Consume digits of `radix` and `_` separators; returns how many digits were seen.
    fn digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                count += 1;
            } else if c != '_' {
                break;
            }
            self.advance();
        }
        count
    }

    /// Identifier characters glued to a literal make the whole run invalid (`12abc`).
    fn finish(&mut self, kind: NumberKind) -> TokenKind {
        if self.peek().is_some_and(super::is_ident_continue) {
            return self.invalid();
        }
        TokenKind::Number(kind)
    }

    fn invalid(&mut self) -> TokenKind {
        while self.peek().is_some_and(super::is_ident_continue) {
            self.advance();
        }
        TokenKind::InvalidNumber
    }
}
