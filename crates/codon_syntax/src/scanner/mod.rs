//! External scanner for the Codon grammar.
//!
//! The generated parser calls the scanner at every lexical checkpoint where an external token may
//! appear, passing the set of tokens it would accept. The scanner either recognizes one of them,
//! or declines and lets the parser's own lexer take the position.
//!
//! ## Modules
//! - `cursor`: the lexer interface the scanner drives
//! - `valid`: valid-symbol sets
//! - `state`: persistent state (indent stack, string delimiters, bracket depth)
//! - `checkpoint`: state serialization
//! - `layout`: NEWLINE / INDENT / DEDENT
//! - `strings`: string start, content, interpolation escapes, end
//! - `trivia`: comments and extern block bodies
//!
//! ## Reversibility
//! A GLR parser may run the scanner on a branch it later abandons. [`Scanner::attempt`] never
//! mutates the scanner; it returns a [`Tentative`] holding the token and the state the scan would
//! leave behind. The host calls [`Scanner::commit`] only for the branch it keeps.

mod layout;
mod strings;
mod trivia;

pub mod checkpoint;
pub mod cursor;
pub mod state;
pub mod valid;

use codon_core::lang::externals::ExternalToken;

use crate::diagnostics::CheckpointError;
pub use checkpoint::SERIALIZATION_BUFFER_SIZE;
pub use cursor::{ScanLexer, SourceLexer};
pub use state::{BracketClose, Delimiter, LexicalMode, ScanState};
pub use valid::ValidSymbols;

/// Entry points of a tree-sitter external scanner.
///
/// `destroy` is `Drop`. The trait exists so hosts (and tests) can drive any scanner through the
/// same five operations the parser runtime uses.
pub trait ExternalScanner: Sized {
    fn create() -> Self;

    /// Try to recognize one valid external token at the cursor. On `true` the token kind has been
    /// reported through [`ScanLexer::set_result`] and the state updated.
    fn scan<L: ScanLexer>(&mut self, lexer: &mut L, valid: &ValidSymbols) -> bool;

    /// Write the state into the host's checkpoint buffer; returns bytes used.
    fn serialize(&self, buffer: &mut [u8; SERIALIZATION_BUFFER_SIZE]) -> Result<usize, CheckpointError>;

    /// Replace the state with a checkpoint. An empty buffer resets to the initial state.
    fn deserialize(&mut self, buffer: &[u8]) -> Result<(), CheckpointError>;
}

/// A recognized token together with the state it leaves behind, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a tentative scan has no effect until committed"]
pub struct Tentative {
    token: ExternalToken,
    state: ScanState,
}

impl Tentative {
    pub fn token(&self) -> ExternalToken {
        self.token
    }

    /// State the scanner will have after [`Scanner::commit`].
    pub fn state(&self) -> &ScanState {
        &self.state
    }
}

/// The Codon external scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanner {
    state: ScanState,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Copy of the current state, for branch bookkeeping.
    pub fn snapshot(&self) -> ScanState {
        self.state.clone()
    }

    pub fn restore(&mut self, state: ScanState) {
        self.state = state;
    }

    pub fn in_string_body(&self) -> bool {
        self.state.in_string_body()
    }

    /// Scan without mutating `self`. `None` means the scanner declines this position; the host
    /// must rewind the cursor before using its own lexer.
    pub fn attempt<L: ScanLexer>(&self, lexer: &mut L, valid: &ValidSymbols) -> Option<Tentative> {
        if valid.is_error_recovery() {
            tracing::trace!("error recovery in progress, declining");
            return None;
        }

        let mut state = self.state.clone();
        let token = Scan {
            state: &mut state,
            lexer: &mut *lexer,
            valid,
        }
        .run()?;
        debug_assert!(valid.contains(token), "scanner produced {token:?} which is not valid here");
        debug_assert_ne!(state.mode, LexicalMode::Comment);

        lexer.set_result(token);
        tracing::trace!(?token, "scanned external token");
        Some(Tentative { token, state })
    }

    pub fn commit(&mut self, tentative: Tentative) -> ExternalToken {
        self.state = tentative.state;
        tentative.token
    }

    // ------------------------------------------------------------------------
    // Host hooks for brackets the parser's own lexer consumed
    // ------------------------------------------------------------------------

    pub fn open_bracket(&mut self) {
        self.state.open_bracket();
    }

    /// Open an f-string interpolation at a `{` the scanner declined. Returns `false` if the
    /// scanner is not in format-string text, in which case nothing changes.
    pub fn open_interpolation(&mut self) -> bool {
        self.state.open_interpolation()
    }

    pub fn close_bracket(&mut self) -> BracketClose {
        self.state.close_bracket()
    }
}

impl ExternalScanner for Scanner {
    fn create() -> Self {
        Self::new()
    }

    fn scan<L: ScanLexer>(&mut self, lexer: &mut L, valid: &ValidSymbols) -> bool {
        match self.attempt(lexer, valid) {
            Some(tentative) => {
                self.commit(tentative);
                true
            }
            None => false,
        }
    }

    fn serialize(&self, buffer: &mut [u8; SERIALIZATION_BUFFER_SIZE]) -> Result<usize, CheckpointError> {
        checkpoint::encode(&self.state, buffer)
    }

    fn deserialize(&mut self, buffer: &[u8]) -> Result<(), CheckpointError> {
        self.state = checkpoint::decode(buffer)?;
        Ok(())
    }
}

// ============================================================================
// One scan
// ============================================================================

/// Outcome of a sub-scanner that may leave the position to later ones.
enum Step {
    Emit(ExternalToken),
    /// Nothing here for this sub-scanner; only trivia was skipped.
    Continue,
    /// The position cannot start any external token.
    Decline,
}

/// Working set for a single scan call. Methods are spread over the submodules.
struct Scan<'a, L: ScanLexer> {
    state: &'a mut ScanState,
    lexer: &'a mut L,
    valid: &'a ValidSymbols,
}

impl<L: ScanLexer> Scan<'_, L> {
    fn run(mut self) -> Option<ExternalToken> {
        if self.state.in_string_body() {
            return self.string_body();
        }

        if self.valid.contains(ExternalToken::UnterminatedString) {
            if let Some(token) = self.unterminated_interpolation() {
                return Some(token);
            }
        }

        if self.valid.contains(ExternalToken::ExternContent) {
            if let Some(token) = self.extern_content() {
                return Some(token);
            }
        }

        match self.layout() {
            Step::Emit(token) => return Some(token),
            Step::Decline => return None,
            Step::Continue => {}
        }

        if self.valid.contains(ExternalToken::Comment) && self.lexer.lookahead() == Some('#') {
            return Some(self.comment());
        }

        if self.valid.contains(ExternalToken::StringStart) {
            return self.string_start();
        }

        None
    }

    fn accept(&self, token: ExternalToken) -> Option<ExternalToken> {
        self.valid.contains(token).then_some(token)
    }

    /// Skip spaces, tabs and form feeds.
    fn skip_horizontal_space(&mut self) {
        while matches!(self.lexer.lookahead(), Some(' ' | '\t' | '\x0c')) {
            self.lexer.skip();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_once(
        scanner: &mut Scanner,
        source: &str,
        offset: usize,
        valid: &ValidSymbols,
    ) -> Option<(ExternalToken, usize, usize)> {
        let mut lexer = SourceLexer::new(source, offset);
        scanner
            .scan(&mut lexer, valid)
            .then(|| (lexer.result().unwrap(), lexer.token_start(), lexer.token_end()))
    }

    #[test]
    fn test_attempt_does_not_mutate() {
        let scanner = Scanner::new();
        let mut lexer = SourceLexer::new("    x", 0);
        let valid = ValidSymbols::of(&[ExternalToken::Indent, ExternalToken::Dedent]);
        let tentative = scanner.attempt(&mut lexer, &valid).unwrap();
        assert_eq!(tentative.token(), ExternalToken::Indent);
        assert_eq!(tentative.state().indents(), &[0, 4]);
        assert_eq!(scanner.state().indents(), &[0]);
    }

    #[test]
    fn test_commit_applies_state() {
        let mut scanner = Scanner::new();
        let mut lexer = SourceLexer::new("    x", 0);
        let valid = ValidSymbols::of(&[ExternalToken::Indent]);
        let tentative = scanner.attempt(&mut lexer, &valid).unwrap();
        assert_eq!(scanner.commit(tentative), ExternalToken::Indent);
        assert_eq!(scanner.state().indents(), &[0, 4]);
    }

    #[test]
    fn test_error_recovery_declines() {
        let mut scanner = Scanner::new();
        assert_eq!(scan_once(&mut scanner, "\n", 0, &ValidSymbols::all()), None);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut scanner = Scanner::new();
        let before = scanner.snapshot();
        let valid = ValidSymbols::of(&[ExternalToken::Indent]);
        assert!(scan_once(&mut scanner, "  x", 0, &valid).is_some());
        assert_ne!(scanner.state(), &before);
        scanner.restore(before.clone());
        assert_eq!(scanner.state(), &before);
    }

    #[test]
    fn test_serialize_deserialize_entry_points() {
        let mut scanner = Scanner::create();
        let valid = ValidSymbols::of(&[ExternalToken::StringStart]);
        assert_eq!(
            scan_once(&mut scanner, "f'''x", 0, &valid),
            Some((ExternalToken::StringStart, 0, 4))
        );

        let mut buffer = [0u8; SERIALIZATION_BUFFER_SIZE];
        let len = scanner.serialize(&mut buffer).unwrap();

        let mut other = Scanner::create();
        other.deserialize(&buffer[..len]).unwrap();
        assert_eq!(other, scanner);

        other.deserialize(&[]).unwrap();
        assert_eq!(other, Scanner::new());
    }

    #[test]
    fn test_deserialize_failure_leaves_state() {
        let mut scanner = Scanner::new();
        scanner.open_bracket();
        let before = scanner.clone();
        assert!(scanner.deserialize(&[0xFF]).is_err());
        assert_eq!(scanner, before);
    }
}
