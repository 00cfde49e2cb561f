#![forbid(unsafe_code)]
//! Codon scanner toolkit.
//!
//! The external scanner of the Codon tree-sitter grammar, together with the token session and
//! incremental reparse that drive it outside a generated parser. This crate adds the
//! `codon-scan` command-line tool on top of the two library crates:
//!
//! - `codon_core`: the external token contract, punctuation and string prefix tables
//! - `codon_syntax`: scanner, checkpoint codec, built-in lexer, session, incremental reparse
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **True invariants**: If a panic represents a scanner bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;

pub use codon_core::lang;
pub use codon_syntax::diagnostics;
pub use codon_syntax::lexer;
pub use codon_syntax::scanner;
pub use codon_syntax::session;
pub use codon_syntax::span::Span;

pub use codon_syntax::session::{Edit, SessionConfig, TokenStream, reparse, tokenize, tokenize_with, try_reparse};
