//! Codon lexical vocabulary registries.
//!
//! This module is the “front door” for lexical vocabulary: external tokens delegated to the
//! hand-written scanner, punctuation/operators, and string prefixes.
//!
//! The design goal is to avoid stringly-typed checks scattered across the scanner and tooling.
//! Callers work with **stable IDs** (e.g. `ExternalToken`, `PunctuationId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Examples
//! ```rust
//! use codon_core::lang::externals::{self, ExternalToken};
//!
//! assert_eq!(externals::from_str("_indent"), Some(ExternalToken::Indent));
//! assert_eq!(externals::index(ExternalToken::Indent), 1);
//! ```

pub mod externals;
pub mod punctuation;
pub mod registry;
pub mod string_prefixes;
