//! String literal prefix vocabulary.
//!
//! A prefix is zero to two letters before the opening quote. Each letter sets one flag; only the
//! combinations listed in [`PREFIXES`] are accepted, in any letter case.
//!
//! ## Examples
//! ```rust
//! use codon_core::lang::string_prefixes;
//!
//! let flags = string_prefixes::from_str("Rf").unwrap();
//! assert!(flags.raw && flags.format && !flags.bytes);
//! assert!(string_prefixes::from_str("ub").is_none());
//! ```

/// Flags carried by a string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrefixFlags {
    pub raw: bool,
    pub format: bool,
    pub bytes: bool,
}

/// Metadata for an accepted prefix spelling (lowercase canonical form).
#[derive(Debug, Clone, Copy)]
pub struct PrefixInfo {
    pub canonical: &'static str,
    pub flags: PrefixFlags,
    pub description: &'static str,
}

/// Longest accepted prefix, in characters.
pub const MAX_PREFIX_LEN: usize = 2;

/// Registry of accepted prefixes.
pub const PREFIXES: &[PrefixInfo] = &[
    prefix("", false, false, false, "Plain string."),
    prefix("u", false, false, false, "Unicode string (same as plain)."),
    prefix("r", true, false, false, "Raw string: backslashes are kept verbatim."),
    prefix("f", false, true, false, "Formatted string with `{expr}` interpolation."),
    prefix("b", false, false, true, "Bytes literal."),
    prefix("rf", true, true, false, "Raw formatted string."),
    prefix("fr", true, true, false, "Raw formatted string."),
    prefix("rb", true, false, true, "Raw bytes literal."),
    prefix("br", true, false, true, "Raw bytes literal."),
];

/// Return `true` if `c` may appear in a prefix.
pub fn is_prefix_char(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'f' | 'b')
}

/// Resolve a prefix spelling (case-insensitive).
pub fn from_str(s: &str) -> Option<PrefixFlags> {
    let lower = s.to_ascii_lowercase();
    PREFIXES.iter().find(|p| p.canonical == lower).map(|p| p.flags)
}

const fn prefix(canonical: &'static str, raw: bool, format: bool, bytes: bool, description: &'static str) -> PrefixInfo {
    PrefixInfo {
        canonical,
        flags: PrefixFlags { raw, format, bytes },
        description,
    }
}
