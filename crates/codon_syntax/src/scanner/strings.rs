//! String literals: start, literal content, `{{`/`}}` escapes, end.
//!
//! A string is split into STRING_START, any number of STRING_CONTENT / ESCAPE_INTERPOLATION
//! tokens, and STRING_END. In f-strings a single `{` ends the current content run and the scanner
//! declines, so the parser's own lexer opens the interpolation and the host reports it back
//! through [`Scanner::open_interpolation`](super::Scanner::open_interpolation).

use codon_core::lang::externals::ExternalToken;
use codon_core::lang::string_prefixes::{self, MAX_PREFIX_LEN};

use super::{Delimiter, Scan, ScanLexer};

impl<L: ScanLexer> Scan<'_, L> {
    /// Optional prefix followed by `'`, `"`, `'''` or `"""`.
    pub(super) fn string_start(&mut self) -> Option<ExternalToken> {
        let mut prefix = String::with_capacity(MAX_PREFIX_LEN);
        while let Some(c) = self.lexer.lookahead() {
            if !string_prefixes::is_prefix_char(c) || prefix.len() == MAX_PREFIX_LEN {
                break;
            }
            prefix.push(c);
            self.lexer.advance();
        }

        let quote = match self.lexer.lookahead() {
            Some(q @ ('\'' | '"')) => q,
            _ => return None,
        };
        let flags = string_prefixes::from_str(&prefix)?;

        self.lexer.advance();
        self.lexer.mark_end();
        let mut triple = false;
        if self.lexer.lookahead() == Some(quote) {
            self.lexer.advance();
            if self.lexer.lookahead() == Some(quote) {
                self.lexer.advance();
                self.lexer.mark_end();
                triple = true;
            }
            // Two quotes: an empty string. The token ends after the first one so the second is
            // scanned as STRING_END.
        }

        self.state.push_delimiter(
            Delimiter::new(quote)
                .triple(triple)
                .raw(flags.raw)
                .format(flags.format)
                .bytes(flags.bytes),
        );
        Some(ExternalToken::StringStart)
    }

    /// Literal text of the innermost string, or its end.
    pub(super) fn string_body(&mut self) -> Option<ExternalToken> {
        let delimiter = *self.state.innermost()?;
        let mut has_content = false;

        loop {
            match self.lexer.lookahead() {
                None => {
                    if has_content {
                        return self.content();
                    }
                    return self.unterminated();
                }

                Some(q) if q == delimiter.quote => {
                    if !delimiter.triple {
                        if has_content {
                            return self.content();
                        }
                        self.lexer.advance();
                        return self.end();
                    }
                    self.lexer.mark_end();
                    self.lexer.advance();
                    if self.lexer.lookahead() == Some(q) {
                        self.lexer.advance();
                        if self.lexer.lookahead() == Some(q) {
                            if has_content {
                                // Ends at the mark placed before the closing quotes.
                                return self.accept(ExternalToken::StringContent);
                            }
                            self.lexer.advance();
                            return self.end();
                        }
                    }
                    has_content = true;
                }

                Some('\n' | '\r') if !delimiter.triple => {
                    if has_content {
                        return self.content();
                    }
                    return self.unterminated();
                }

                Some('\\') => {
                    self.lexer.advance();
                    self.escape(&delimiter);
                    has_content = true;
                }

                Some(brace @ ('{' | '}')) if delimiter.format => {
                    if has_content {
                        return self.content();
                    }
                    self.lexer.advance();
                    if self.lexer.lookahead() == Some(brace) {
                        self.lexer.advance();
                        self.lexer.mark_end();
                        return self.accept(ExternalToken::EscapeInterpolation);
                    }
                    if brace == '{' {
                        return None;
                    }
                    // A lone `}` is literal text.
                    has_content = true;
                }

                Some(_) => {
                    self.lexer.advance();
                    has_content = true;
                }
            }
        }
    }

    /// The character after a backslash. An escaped quote never ends the string, raw or not.
    fn escape(&mut self, delimiter: &Delimiter) {
        match self.lexer.lookahead() {
            None => {}
            Some('{') if delimiter.format => {}
            Some('N') if !delimiter.raw => {
                self.lexer.advance();
                if self.lexer.lookahead() == Some('{') {
                    self.named_escape(delimiter.quote);
                }
            }
            Some('\r') => {
                self.lexer.advance();
                if self.lexer.lookahead() == Some('\n') {
                    self.lexer.advance();
                }
            }
            Some(_) => self.lexer.advance(),
        }
    }

    /// `\N{NAME}`: braces here are part of the escape, not an interpolation.
    fn named_escape(&mut self, quote: char) {
        self.lexer.advance();
        while let Some(c) = self.lexer.lookahead() {
            if c == '\n' || c == '\r' || c == quote {
                return;
            }
            self.lexer.advance();
            if c == '}' {
                return;
            }
        }
    }

    fn content(&mut self) -> Option<ExternalToken> {
        self.lexer.mark_end();
        self.accept(ExternalToken::StringContent)
    }

    fn end(&mut self) -> Option<ExternalToken> {
        let token = self.accept(ExternalToken::StringEnd)?;
        self.lexer.mark_end();
        self.state.pop_delimiter();
        Some(token)
    }

    /// End of input inside an interpolation: the enclosing string never closes.
    pub(super) fn unterminated_interpolation(&mut self) -> Option<ExternalToken> {
        if !self.state.innermost().is_some_and(|d| d.interpolation.is_some()) {
            return None;
        }
        // Brackets are open, so line breaks are insignificant here.
        loop {
            self.skip_horizontal_space();
            if !self.skip_line_break() {
                break;
            }
        }
        if !self.lexer.is_eof() {
            return None;
        }
        self.unterminated()
    }

    /// Zero-width error token; the delimiter is dropped so scanning resumes in code.
    fn unterminated(&mut self) -> Option<ExternalToken> {
        let token = self.accept(ExternalToken::UnterminatedString)?;
        self.lexer.mark_end();
        self.state.abandon_string();
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use codon_core::lang::externals::ExternalToken::{self, *};

    use crate::scanner::{Delimiter, ExternalScanner, LexicalMode, ScanState, Scanner, SourceLexer, ValidSymbols};

    fn body() -> ValidSymbols {
        ValidSymbols::of(&[StringContent, EscapeInterpolation, StringEnd, UnterminatedString])
    }

    fn start() -> ValidSymbols {
        ValidSymbols::of(&[Newline, Comment, StringStart])
    }

    fn in_string(delimiter: Delimiter) -> Scanner {
        let mut state = ScanState::default();
        state.push_delimiter(delimiter);
        let mut scanner = Scanner::new();
        scanner.restore(state);
        scanner
    }

    /// Scan `source` to completion from `offset`, collecting `(token, text)` until the scanner
    /// declines or leaves string context.
    fn run(scanner: &mut Scanner, source: &str) -> Vec<(ExternalToken, String)> {
        let mut out = Vec::new();
        let mut offset = 0;
        while scanner.in_string_body() {
            let mut lexer = SourceLexer::new(source, offset);
            if !scanner.scan(&mut lexer, &body()) {
                break;
            }
            let (start, end) = (lexer.token_start(), lexer.token_end());
            out.push((lexer.result().unwrap(), source[start..end].to_string()));
            offset = end;
        }
        out
    }

    #[test]
    fn test_string_start_prefixes() {
        for (source, raw, format, bytes, triple, len) in [
            ("'x'", false, false, false, false, 1),
            ("rb\"x\"", true, false, true, false, 3),
            ("F'''x'''", false, true, false, true, 4),
            ("u\"\"\"", false, false, false, true, 4),
        ] {
            let mut scanner = Scanner::new();
            let mut lexer = SourceLexer::new(source, 0);
            assert!(scanner.scan(&mut lexer, &start()), "{source}");
            assert_eq!(lexer.token_end(), len, "{source}");
            let d = scanner.state().innermost().copied().unwrap();
            assert_eq!((d.raw, d.format, d.bytes, d.triple), (raw, format, bytes, triple), "{source}");
        }
    }

    #[test]
    fn test_string_start_rejects_identifiers() {
        for source in ["bar", "fb'x'", "rbf'x'", "x'"] {
            let mut scanner = Scanner::new();
            let mut lexer = SourceLexer::new(source, 0);
            assert!(!scanner.scan(&mut lexer, &start()), "{source}");
            assert!(scanner.state().delimiters().is_empty());
        }
    }

    #[test]
    fn test_empty_string_is_start_then_end() {
        let mut scanner = Scanner::new();
        let mut lexer = SourceLexer::new("\"\"", 0);
        assert!(scanner.scan(&mut lexer, &start()));
        assert_eq!(lexer.token_end(), 1);
        assert_eq!(run(&mut scanner, &"\"\""[1..]), vec![(StringEnd, "\"".to_string())]);
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        let mut scanner = in_string(Delimiter::new('"'));
        let tokens = run(&mut scanner, r#"a\"b" rest"#);
        assert_eq!(
            tokens,
            vec![(StringContent, r#"a\"b"#.to_string()), (StringEnd, "\"".to_string())]
        );
    }

    #[test]
    fn test_escaped_quote_in_raw_string() {
        let mut scanner = in_string(Delimiter::new('\'').raw(true));
        let tokens = run(&mut scanner, r"\'x'");
        assert_eq!(tokens, vec![(StringContent, r"\'x".to_string()), (StringEnd, "'".to_string())]);
    }

    #[test]
    fn test_newline_in_single_quoted_string() {
        let mut scanner = in_string(Delimiter::new('\''));
        let tokens = run(&mut scanner, "abc\nx");
        assert_eq!(
            tokens,
            vec![(StringContent, "abc".to_string()), (UnterminatedString, String::new())]
        );
        assert_eq!(scanner.state().mode(), LexicalMode::Normal);
    }

    #[test]
    fn test_eof_in_triple_quoted_string() {
        let mut scanner = in_string(Delimiter::new('"').triple(true));
        let tokens = run(&mut scanner, "a\n\"\"b");
        assert_eq!(
            tokens,
            vec![(StringContent, "a\n\"\"b".to_string()), (UnterminatedString, String::new())]
        );
    }

    #[test]
    fn test_triple_quoted_end_after_content() {
        let mut scanner = in_string(Delimiter::new('\'').triple(true));
        let tokens = run(&mut scanner, "it's\n'''");
        assert_eq!(
            tokens,
            vec![(StringContent, "it's\n".to_string()), (StringEnd, "'''".to_string())]
        );
    }

    #[test]
    fn test_fstring_escapes_and_interpolation() {
        let mut scanner = in_string(Delimiter::new('"').format(true));
        let tokens = run(&mut scanner, "a{{b}}c{x}");
        assert_eq!(
            tokens,
            vec![
                (StringContent, "a".to_string()),
                (EscapeInterpolation, "{{".to_string()),
                (StringContent, "b".to_string()),
                (EscapeInterpolation, "}}".to_string()),
                (StringContent, "c".to_string()),
            ]
        );
        // The scanner declined at the lone `{`.
        assert!(scanner.in_string_body());
    }

    #[test]
    fn test_eof_inside_interpolation() {
        let valid = ValidSymbols::of(&[Newline, Comment, StringStart, UnterminatedString]);
        let mut scanner = in_string(Delimiter::new('"').format(true));
        assert!(scanner.open_interpolation());
        scanner.open_bracket();

        let mut lexer = SourceLexer::new("  y", 0);
        assert!(!scanner.scan(&mut lexer, &valid));
        assert_eq!(scanner.state().bracket_depth(), 2);

        let mut lexer = SourceLexer::new("  \n\t", 0);
        assert!(scanner.scan(&mut lexer, &valid));
        assert_eq!(lexer.result(), Some(UnterminatedString));
        assert_eq!((lexer.token_start(), lexer.token_end()), (4, 4));
        assert!(scanner.state().delimiters().is_empty());
        assert_eq!(scanner.state().bracket_depth(), 0);
    }

    #[test]
    fn test_named_escape_is_content() {
        let mut scanner = in_string(Delimiter::new('"').format(true));
        let tokens = run(&mut scanner, r#"\N{BULLET} x""#);
        assert_eq!(
            tokens,
            vec![(StringContent, r"\N{BULLET} x".to_string()), (StringEnd, "\"".to_string())]
        );
    }

    #[test]
    fn test_plain_string_braces_are_content() {
        let mut scanner = in_string(Delimiter::new('"'));
        let tokens = run(&mut scanner, "{x}\"");
        assert_eq!(tokens, vec![(StringContent, "{x}".to_string()), (StringEnd, "\"".to_string())]);
    }
}
