//! Persistent scanner state: indentation stack, open string delimiters, bracket depth and mode.
//!
//! Everything the scanner needs to resume at a position lives here, and nothing else does. The
//! checkpoint codec round-trips this struct byte-exactly.

use std::fmt;

/// Which lexical context the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexicalMode {
    /// Ordinary code, including the inside of an f-string interpolation.
    #[default]
    Normal,
    /// Literal text of a non-format string.
    String,
    /// Literal text of a format string.
    FString,
    /// Inside a `#` comment. Transient: never left set between tokens.
    Comment,
}

impl LexicalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::String => "string",
            Self::FString => "fstring",
            Self::Comment => "comment",
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::String => 1,
            Self::FString => 2,
            Self::Comment => 3,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Normal),
            1 => Some(Self::String),
            2 => Some(Self::FString),
            3 => Some(Self::Comment),
            _ => None,
        }
    }
}

impl fmt::Display for LexicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One open string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter {
    /// `'` or `"`.
    pub quote: char,
    pub triple: bool,
    pub raw: bool,
    pub format: bool,
    pub bytes: bool,
    /// Bracket depth at which the currently open `{…}` interpolation started, if any.
    pub interpolation: Option<u16>,
}

impl Delimiter {
    pub fn new(quote: char) -> Self {
        Self {
            quote,
            triple: false,
            raw: false,
            format: false,
            bytes: false,
            interpolation: None,
        }
    }

    pub fn triple(mut self, triple: bool) -> Self {
        self.triple = triple;
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn bytes(mut self, bytes: bool) -> Self {
        self.bytes = bytes;
        self
    }

    /// Closing sequence, e.g. `"""` or `'`.
    pub fn closing(&self) -> String {
        let count = if self.triple { 3 } else { 1 };
        std::iter::repeat_n(self.quote, count).collect()
    }
}

/// The complete scanner state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanState {
    pub(crate) indents: Vec<u16>,
    pub(crate) delimiters: Vec<Delimiter>,
    pub(crate) bracket_depth: u16,
    pub(crate) mode: LexicalMode,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            indents: vec![0],
            delimiters: Vec::new(),
            bracket_depth: 0,
            mode: LexicalMode::Normal,
        }
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indentation stack, bottom first. Always starts with column 0.
    pub fn indents(&self) -> &[u16] {
        &self.indents
    }

    /// Current block indentation (top of the stack).
    pub fn current_indent(&self) -> u16 {
        self.indents.last().copied().unwrap_or(0)
    }

    /// Number of blocks opened by INDENT and not yet closed.
    pub fn open_blocks(&self) -> usize {
        self.indents.len().saturating_sub(1)
    }

    pub fn delimiters(&self) -> &[Delimiter] {
        &self.delimiters
    }

    pub fn bracket_depth(&self) -> u16 {
        self.bracket_depth
    }

    pub fn mode(&self) -> LexicalMode {
        self.mode
    }

    /// Innermost open string, if any.
    pub fn innermost(&self) -> Option<&Delimiter> {
        self.delimiters.last()
    }

    /// `true` when the scanner is positioned in literal string text (not inside an interpolation).
    pub fn in_string_body(&self) -> bool {
        self.innermost().is_some_and(|d| d.interpolation.is_none())
    }

    /// Mode implied by the delimiter stack.
    pub fn derived_mode(&self) -> LexicalMode {
        match self.innermost() {
            None => LexicalMode::Normal,
            Some(d) if d.interpolation.is_some() => LexicalMode::Normal,
            Some(d) if d.format => LexicalMode::FString,
            Some(_) => LexicalMode::String,
        }
    }

    pub(crate) fn sync_mode(&mut self) {
        self.mode = self.derived_mode();
    }

    // ------------------------------------------------------------------------
    // Indentation
    // ------------------------------------------------------------------------

    pub(crate) fn push_indent(&mut self, column: u16) {
        debug_assert!(column > self.current_indent());
        self.indents.push(column);
    }

    /// Pop one level. The bottom column 0 is never popped.
    pub(crate) fn pop_indent(&mut self) -> Option<u16> {
        if self.indents.len() > 1 { self.indents.pop() } else { None }
    }

    pub(crate) fn has_indent(&self, column: u16) -> bool {
        self.indents.binary_search(&column).is_ok()
    }

    // ------------------------------------------------------------------------
    // Delimiters and brackets
    // ------------------------------------------------------------------------

    pub(crate) fn push_delimiter(&mut self, delimiter: Delimiter) {
        self.delimiters.push(delimiter);
        self.sync_mode();
    }

    pub(crate) fn pop_delimiter(&mut self) -> Option<Delimiter> {
        let popped = self.delimiters.pop();
        self.sync_mode();
        popped
    }

    /// Drop the innermost string left open at a line break or end of input, together with any
    /// brackets opened inside its interpolation.
    pub(crate) fn abandon_string(&mut self) -> Option<Delimiter> {
        let abandoned = self.delimiters.pop()?;
        if let Some(depth) = abandoned.interpolation {
            self.bracket_depth = depth;
        }
        self.sync_mode();
        Some(abandoned)
    }

    pub(crate) fn open_bracket(&mut self) {
        self.bracket_depth = self.bracket_depth.saturating_add(1);
    }

    pub(crate) fn open_interpolation(&mut self) -> bool {
        let depth = self.bracket_depth;
        match self.delimiters.last_mut() {
            Some(d) if d.format && d.interpolation.is_none() => {
                d.interpolation = Some(depth);
            }
            _ => return false,
        }
        self.open_bracket();
        self.sync_mode();
        true
    }

    pub(crate) fn close_bracket(&mut self) -> BracketClose {
        if self.bracket_depth == 0 {
            return BracketClose::Unmatched;
        }
        self.bracket_depth -= 1;
        let depth = self.bracket_depth;
        match self.delimiters.last_mut() {
            Some(d) if d.interpolation == Some(depth) => {
                d.interpolation = None;
                self.sync_mode();
                BracketClose::Interpolation
            }
            _ => BracketClose::Bracket,
        }
    }
}

/// Result of closing a bracket through the host hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketClose {
    /// An ordinary bracket closed.
    Bracket,
    /// The brace closed an f-string interpolation; the scanner is back in string text.
    Interpolation,
    /// Nothing was open.
    Unmatched,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={} depth={} indents={:?}", self.mode, self.bracket_depth, self.indents)?;
        if !self.delimiters.is_empty() {
            f.write_str(" strings=[")?;
            for (i, d) in self.delimiters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if d.raw {
                    f.write_str("r")?;
                }
                if d.bytes {
                    f.write_str("b")?;
                }
                if d.format {
                    f.write_str("f")?;
                }
                f.write_str(&d.closing())?;
                if let Some(at) = d.interpolation {
                    write!(f, "{{@{at}")?;
                }
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ScanState::new();
        assert_eq!(state.indents(), &[0]);
        assert_eq!(state.open_blocks(), 0);
        assert_eq!(state.mode(), LexicalMode::Normal);
        assert!(!state.in_string_body());
    }

    #[test]
    fn test_bottom_indent_never_pops() {
        let mut state = ScanState::new();
        state.push_indent(4);
        assert_eq!(state.pop_indent(), Some(4));
        assert_eq!(state.pop_indent(), None);
        assert_eq!(state.indents(), &[0]);
    }

    #[test]
    fn test_interpolation_round_trip() {
        let mut state = ScanState::new();
        state.push_delimiter(Delimiter::new('"').format(true));
        assert_eq!(state.mode(), LexicalMode::FString);

        assert!(state.open_interpolation());
        assert_eq!(state.mode(), LexicalMode::Normal);
        assert!(!state.in_string_body());

        state.open_bracket();
        assert_eq!(state.close_bracket(), BracketClose::Bracket);
        assert_eq!(state.close_bracket(), BracketClose::Interpolation);
        assert_eq!(state.mode(), LexicalMode::FString);
        assert_eq!(state.close_bracket(), BracketClose::Unmatched);
    }

    #[test]
    fn test_abandoned_string_closes_its_interpolation() {
        let mut state = ScanState::new();
        state.open_bracket();
        state.push_delimiter(Delimiter::new('"').format(true));
        assert!(state.open_interpolation());
        state.open_bracket();
        state.open_bracket();
        assert_eq!(state.bracket_depth(), 4);

        assert!(state.abandon_string().is_some());
        assert_eq!(state.bracket_depth(), 1);
        assert_eq!(state.mode(), LexicalMode::Normal);
        assert_eq!(state.abandon_string(), None);
    }

    #[test]
    fn test_plain_string_cannot_interpolate() {
        let mut state = ScanState::new();
        state.push_delimiter(Delimiter::new('\''));
        assert!(!state.open_interpolation());
        assert_eq!(state.bracket_depth(), 0);
    }

    #[test]
    fn test_display() {
        let mut state = ScanState::new();
        state.push_indent(4);
        state.push_delimiter(Delimiter::new('"').triple(true).format(true));
        insta::assert_snapshot!(state.to_string(), @r#"mode=fstring depth=0 indents=[0, 4] strings=[f"""]"#);

        state.open_interpolation();
        state.open_bracket();
        state.push_delimiter(Delimiter::new('\'').raw(true));
        insta::assert_snapshot!(state.to_string(), @r#"mode=string depth=2 indents=[0, 4] strings=[f"""{@0, r']"#);
    }
}
