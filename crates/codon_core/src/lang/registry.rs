//! Shareable metadata for `codon_core::lang` registries.
//!
//! Every registry in `codon_core::lang` is a `const` table of small `Copy` records. This submodule
//! provides the metadata types reused across them.
//!
//! ## Notes
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of lexical rules lives in the
//!   scanner and the built-in lexer.

/// Represent a small example snippet for documentation.
///
/// ## Notes
/// - `code` is the example body, in Codon syntax. Tests tokenize every external token example and
///   check that it produces the token it documents.
/// - `note` is an optional short explanation.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}
