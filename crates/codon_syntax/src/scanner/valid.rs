//! The set of external tokens the parser will accept at the current position.

use codon_core::lang::externals::{self, ExternalToken};

/// One flag per external token, indexed by the registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidSymbols([bool; externals::COUNT]);

impl ValidSymbols {
    pub fn none() -> Self {
        Self::default()
    }

    /// Every external token valid at once. This is how tree-sitter signals error recovery.
    pub fn all() -> Self {
        Self([true; externals::COUNT])
    }

    pub fn of(tokens: &[ExternalToken]) -> Self {
        let mut set = Self::none();
        for &token in tokens {
            set.insert(token);
        }
        set
    }

    /// Build from the host's raw flag array. `None` if the length does not match the registry.
    pub fn from_flags(flags: &[bool]) -> Option<Self> {
        let flags: [bool; externals::COUNT] = flags.try_into().ok()?;
        Some(Self(flags))
    }

    pub fn insert(&mut self, token: ExternalToken) {
        self.0[externals::index(token)] = true;
    }

    pub fn with(mut self, token: ExternalToken) -> Self {
        self.insert(token);
        self
    }

    pub fn contains(&self, token: ExternalToken) -> bool {
        self.0[externals::index(token)]
    }

    /// The parser is recovering from a syntax error; the scanner must decline.
    pub fn is_error_recovery(&self) -> bool {
        self.contains(ExternalToken::ErrorSentinel)
    }

    pub fn iter(&self) -> impl Iterator<Item = ExternalToken> + '_ {
        externals::all().filter(|&t| self.contains(t))
    }

    pub fn as_flags(&self) -> &[bool] {
        &self.0
    }
}
