//! Token session: drives the external scanner the way the generated parser would.
//!
//! The real parser decides which external tokens are valid from its parse table. The session
//! reproduces the part of that decision the scanner depends on, with a small amount of state:
//!
//! - **line phase**: at the start of a logical line (layout tokens valid) or inside one (NEWLINE
//!   valid);
//! - **extern phase**: whether the next indented block is an opaque `@llvm`/`@python` body;
//! - **recovery**: after INVALID_DEDENT the rest of the line is skipped, as the grammar's error
//!   recovery would.
//!
//! Before every token the session records a [`Checkpoint`]: the byte offset, the serialized
//! scanner state and its own state. Any checkpoint is enough to resume scanning without replay.

mod config;
pub mod incremental;

pub use config::SessionConfig;
pub use incremental::{Edit, Reparse, reparse, reparse_with, try_reparse};

use codon_core::lang::externals::ExternalToken;
use codon_core::lang::punctuation::{self, PunctuationId};

use crate::diagnostics::{CheckpointError, LexicalError, LexicalErrorKind};
use crate::lexer::{LexContext, Lexer, Token, TokenKind};
use crate::scanner::{BracketClose, ScanLexer, ScanState, Scanner, SourceLexer, ValidSymbols, checkpoint};
use crate::span::Span;

// ============================================================================
// Session state
// ============================================================================

/// Position within a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinePhase {
    /// No content yet on this line: layout tokens are valid.
    #[default]
    LineStart,
    /// The line has content: NEWLINE is valid.
    InLine,
}

/// Progress towards an extern block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExternPhase {
    #[default]
    None,
    /// An extern decorator was seen; waiting for the `def` header to end with `:`.
    Decorated,
    /// The header ended; the next indented block is the opaque body.
    AwaitingBody,
}

/// Parser-side state the scanner's valid symbols depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionState {
    pub line: LinePhase,
    pub extern_block: ExternPhase,
    line_starts_with_at: bool,
    after_at: bool,
    ends_with_colon: bool,
    recovering: bool,
}

/// Everything needed to resume scanning at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checkpoint {
    pub offset: usize,
    /// Serialized scanner state; `None` if it did not fit the checkpoint buffer.
    pub scan_state: Option<Vec<u8>>,
    pub session: SessionState,
}

impl Checkpoint {
    pub(crate) fn shifted(&self, delta: isize) -> Self {
        Self {
            offset: self.offset.saturating_add_signed(delta),
            scan_state: self.scan_state.clone(),
            session: self.session,
        }
    }

    /// A point where the following tokens depend only on bytes at or after `offset`.
    ///
    /// At line start the scanner measures indentation by looking back to the start of the line,
    /// so only in-line checkpoints are safe places to splice a previous token stream back in.
    pub(crate) fn is_splice_point(&self) -> bool {
        self.session.line == LinePhase::InLine && !self.session.recovering
    }
}

// ============================================================================
// Token stream
// ============================================================================

/// Tokens of a whole source, with the checkpoint recorded before each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub(crate) source_len: usize,
    pub(crate) tokens: Vec<Token>,
    pub(crate) checkpoints: Vec<Checkpoint>,
    pub(crate) final_state: ScanState,
}

/// Which tokens [`TokenStream::render`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFilter {
    /// External tokens only (plus the end marker).
    External,
    All,
}

impl TokenStream {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Checkpoints, one before each token. Empty if recording was disabled.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Scanner state after the last token.
    pub fn final_state(&self) -> &ScanState {
        &self.final_state
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn external_tokens(&self) -> impl Iterator<Item = ExternalToken> + '_ {
        self.tokens.iter().filter_map(|t| t.kind.external())
    }

    /// Lexical errors, in source order, derived from the error tokens and the final state.
    pub fn diagnostics(&self, source: &str) -> Vec<LexicalError> {
        let mut errors = Vec::new();
        for token in &self.tokens {
            let text = token.text(source);
            let error = match token.kind {
                TokenKind::External(ExternalToken::InvalidDedent) => {
                    LexicalError::invalid_dedent(column_of(source, token.span.start), token.span)
                }
                TokenKind::External(ExternalToken::UnterminatedString) => {
                    LexicalError::unterminated_string(token.span)
                }
                TokenKind::Unknown => {
                    let c = text.chars().next().unwrap_or('\0');
                    LexicalError::new(LexicalErrorKind::UnexpectedCharacter(c), token.span)
                }
                TokenKind::UnmatchedClose => {
                    let c = text.chars().next().unwrap_or(')');
                    LexicalError::new(LexicalErrorKind::UnmatchedBracket(c), token.span)
                }
                TokenKind::InvalidNumber => LexicalError::new(LexicalErrorKind::InvalidNumber, token.span),
                _ => continue,
            };
            errors.push(error);
        }

        let depth = self.final_state.bracket_depth();
        if depth > 0 {
            errors.push(LexicalError::unclosed_bracket(depth, Span::empty(self.source_len)));
        }
        errors
    }

    /// One line per token: `start..end name "text"`.
    pub fn render(&self, source: &str, filter: TokenFilter) -> String {
        self.tokens
            .iter()
            .filter(|t| filter == TokenFilter::All || t.kind.is_external() || t.kind == TokenKind::Eof)
            .map(|t| format!("{}..{} {} {:?}", t.span.start, t.span.end, t.kind.name(), t.text(source)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn column_of(source: &str, offset: usize) -> usize {
    let line_start = source[..offset].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    source[line_start..offset].chars().count()
}

// ============================================================================
// Session
// ============================================================================

/// A scanner plus the parser-side state that decides its valid symbols.
#[derive(Debug, Clone)]
pub struct Session<'s> {
    source: &'s str,
    config: SessionConfig,
    scanner: Scanner,
    state: SessionState,
    pos: usize,
    finished: bool,
}

impl<'s> Session<'s> {
    pub fn new(source: &'s str, config: SessionConfig) -> Self {
        Self {
            source,
            config,
            scanner: Scanner::new(),
            state: SessionState::default(),
            pos: 0,
            finished: false,
        }
    }

    /// Continue from a checkpoint recorded on this (or an identical prefix of this) source.
    pub fn resume(source: &'s str, config: SessionConfig, checkpoint: &Checkpoint) -> Result<Self, CheckpointError> {
        let bytes = checkpoint.scan_state.as_deref().ok_or(CheckpointError::Missing)?;
        let mut scanner = Scanner::new();
        scanner.restore(checkpoint::decode(bytes)?);
        Ok(Self {
            source,
            config,
            scanner,
            state: checkpoint.session,
            pos: checkpoint.offset.min(source.len()),
            finished: false,
        })
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let scan_state = match checkpoint::encode_to_vec(self.scanner.state()) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::debug!(offset = self.pos, %err, "no checkpoint recorded");
                None
            }
        };
        Checkpoint {
            offset: self.pos,
            scan_state,
            session: self.state,
        }
    }

    /// External tokens the parser would accept at the current position.
    pub fn valid_symbols(&self) -> ValidSymbols {
        use ExternalToken::*;

        if self.scanner.in_string_body() {
            return ValidSymbols::of(&[StringContent, EscapeInterpolation, StringEnd, UnterminatedString]);
        }
        let valid = match self.state.line {
            LinePhase::LineStart => {
                let valid = ValidSymbols::of(&[Indent, Dedent, InvalidDedent, Comment, StringStart]);
                if self.state.extern_block == ExternPhase::AwaitingBody {
                    valid.with(ExternContent)
                } else {
                    valid
                }
            }
            LinePhase::InLine => ValidSymbols::of(&[Newline, Comment, StringStart]),
        };
        // Inside an interpolation the enclosing string can still end unterminated.
        if self.scanner.state().delimiters().is_empty() {
            valid
        } else {
            valid.with(UnterminatedString)
        }
    }

    /// Produce the next token, or `None` after [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let mut cursor = SourceLexer::new(self.source, self.pos);
        let kind = if self.state.recovering {
            skip_line(&mut cursor);
            TokenKind::Recovery
        } else {
            let valid = self.valid_symbols();
            match self.scanner.attempt(&mut cursor, &valid) {
                Some(tentative) => TokenKind::External(self.scanner.commit(tentative)),
                None => {
                    cursor.reset();
                    self.builtin(&mut cursor)
                }
            }
        };

        let span = Span::new(cursor.token_start(), cursor.token_end());
        let token = Token::new(kind, span, cursor.furthest());
        self.pos = span.end;
        self.observe(kind, span);
        if kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }

    /// Built-in lexer plus the bracket hooks the host owes the scanner.
    fn builtin(&mut self, cursor: &mut SourceLexer<'s>) -> TokenKind {
        let context = if self.scanner.in_string_body() {
            LexContext::StringBody
        } else {
            LexContext::Code
        };
        let kind = Lexer::new(cursor).next_token(context);

        match kind {
            TokenKind::InterpolationStart => {
                if self.scanner.open_interpolation() {
                    kind
                } else {
                    TokenKind::Unknown
                }
            }
            TokenKind::Punct(id) if punctuation::opens(id).is_some() => {
                self.scanner.open_bracket();
                kind
            }
            TokenKind::Punct(id) if punctuation::closes(id).is_some() => match self.scanner.close_bracket() {
                BracketClose::Bracket => kind,
                BracketClose::Interpolation => TokenKind::InterpolationEnd,
                BracketClose::Unmatched => TokenKind::UnmatchedClose,
            },
            other => other,
        }
    }

    /// Update parser-side state after a token.
    fn observe(&mut self, kind: TokenKind, span: Span) {
        let state = &mut self.state;
        match kind {
            TokenKind::External(ExternalToken::Newline) => {
                state.extern_block = match state.extern_block {
                    ExternPhase::Decorated if state.ends_with_colon => ExternPhase::AwaitingBody,
                    ExternPhase::Decorated if state.line_starts_with_at => ExternPhase::Decorated,
                    _ => ExternPhase::None,
                };
                state.start_line();
            }
            TokenKind::External(ExternalToken::InvalidDedent) => state.recovering = true,
            TokenKind::External(ExternalToken::Indent | ExternalToken::Dedent | ExternalToken::Comment)
            | TokenKind::Eof => {}
            TokenKind::Recovery => {
                state.recovering = false;
                if state.extern_block == ExternPhase::AwaitingBody {
                    state.extern_block = ExternPhase::None;
                }
                state.start_line();
            }
            _ => {
                if state.line == LinePhase::LineStart {
                    state.line = LinePhase::InLine;
                    state.line_starts_with_at = kind == TokenKind::Punct(PunctuationId::At);
                }
                if state.extern_block == ExternPhase::AwaitingBody {
                    state.extern_block = ExternPhase::None;
                }
                if state.after_at && kind == TokenKind::Ident && self.config.is_extern_decorator(span.text(self.source)) {
                    state.extern_block = ExternPhase::Decorated;
                }
                state.after_at = kind == TokenKind::Punct(PunctuationId::At);
                state.ends_with_colon = kind == TokenKind::Punct(PunctuationId::Colon);
            }
        }
    }
}

impl SessionState {
    fn start_line(&mut self) {
        self.line = LinePhase::LineStart;
        self.line_starts_with_at = false;
        self.after_at = false;
        self.ends_with_colon = false;
    }
}

impl Iterator for Session<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Consume the rest of the line, line break included.
fn skip_line(cursor: &mut SourceLexer<'_>) {
    while let Some(c) = cursor.lookahead() {
        if c == '\n' || c == '\r' {
            break;
        }
        cursor.advance();
    }
    if cursor.lookahead() == Some('\r') {
        cursor.advance();
    }
    if cursor.lookahead() == Some('\n') {
        cursor.advance();
    }
}

// ============================================================================
// Full scan
// ============================================================================

/// Tokenize `source` with the default configuration.
pub fn tokenize(source: &str) -> TokenStream {
    tokenize_with(source, &SessionConfig::default())
}

#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize_with(source: &str, config: &SessionConfig) -> TokenStream {
    let mut session = Session::new(source, config.clone());
    let mut tokens = Vec::new();
    let mut checkpoints = Vec::new();

    loop {
        let checkpoint = config.checkpoints.then(|| session.checkpoint());
        let Some(token) = session.next_token() else {
            break;
        };
        checkpoints.extend(checkpoint);
        tokens.push(token);
    }

    tracing::debug!(tokens = tokens.len(), "tokenized");
    TokenStream {
        source_len: source.len(),
        tokens,
        checkpoints,
        final_state: session.scanner().snapshot(),
    }
}
