//! Provide the canonical vocabulary shared by the Codon grammar and its external scanner.
//!
//! This crate is intentionally small and dependency-free. It holds the tables both sides of the
//! grammar-to-scanner contract must agree on:
//! - the ordered list of external tokens (their indices are the contract),
//! - the punctuation/operator spellings the built-in lexer recognises,
//! - the accepted string literal prefixes.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, and no scanner types.
//! - Tables are `const` so they can be checked by guardrail tests without running a scanner.

pub mod lang;
