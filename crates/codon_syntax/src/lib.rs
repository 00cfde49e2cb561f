#![forbid(unsafe_code)]
//! External scanner and incremental token session for the Codon grammar.
//!
//! This crate holds the hand-written half of a tree-sitter style grammar package: the context
//! sensitive scanner the generated parser calls at marked lexical states, the codec that
//! checkpoints its state for incremental re-parsing, and a token session that plays the role of the
//! generated parser so the scanner can be driven, checkpointed and tested in isolation.
//!
//! ## Notes
//! - The scanner is an owned value; there is no process-wide state. Each [`session::Session`] owns
//!   exactly one [`scanner::Scanner`].
//! - Lexical errors are tokens, never panics or `Err`s. `Err` is reserved for corrupted checkpoints
//!   and malformed edits.
//! - The external token contract lives in `codon_core::lang::externals`.
//!
//! ## Examples
//! ```rust
//! use codon_syntax::session;
//! use codon_core::lang::externals::ExternalToken;
//!
//! let stream = session::tokenize("if x:\n    y\n");
//! let layout: Vec<_> = stream.external_tokens().collect();
//! assert_eq!(
//!     layout,
//!     vec![ExternalToken::Newline, ExternalToken::Indent, ExternalToken::Newline, ExternalToken::Dedent]
//! );
//! ```

pub mod diagnostics;
pub mod lexer;
pub mod scanner;
pub mod session;
pub mod span;

pub use span::Span;
