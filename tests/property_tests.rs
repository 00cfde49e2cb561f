//! Property-based tests for the scanner
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use codon_scan::lang::externals::ExternalToken;
use codon_scan::lexer::TokenKind;
use codon_scan::scanner::checkpoint;
use codon_scan::session::{Edit, Session, SessionConfig, reparse, tokenize};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Fragments chosen to hit every scanner path: layout, brackets, strings, comments, escapes.
const FRAGMENTS: &[&str] = &[
    "a", "x1", " ", "  ", "    ", "\t", "\n", "\r\n", "\r", ":", "(", ")", "[", "]", "{", "}", "'", "\"", "'''",
    "\"\"\"", "f'", "f\"{", "rb\"", "#", "\\", "\\\n", "{{", "}}", "\\N{DASH}", "@llvm\ndef f():\n", "1.5j", "0x", "=", "$",
];

fn arbitrary_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.concat())
}

/// Programs whose indentation is always consistent: each line is at most one level deeper than
/// the previous one and dedents only to levels that are open.
fn well_indented_source() -> impl Strategy<Value = String> {
    prop::collection::vec((0usize..4, prop::bool::ANY), 1..20).prop_map(|lines| {
        let mut depths = Vec::with_capacity(lines.len());
        let mut depth = 0usize;
        for (target, _) in &lines {
            // The first line is always at column 0.
            depth = if depths.is_empty() { 0 } else { (*target).min(depth + 1) };
            depths.push(depth);
        }

        let mut out = String::new();
        for (i, (depth, blank_before)) in depths.iter().zip(lines.iter().map(|l| l.1)).enumerate() {
            if blank_before {
                out.push('\n');
            }
            out.push_str(&"    ".repeat(*depth));
            out.push_str("stmt");
            if depths.get(i + 1).is_some_and(|next| next > depth) {
                out.push(':');
            }
            out.push('\n');
        }
        out
    })
}

fn source_and_edit() -> impl Strategy<Value = (String, usize, usize, String)> {
    (arbitrary_source(), any::<usize>(), 0usize..6, arbitrary_source()).prop_map(|(source, start, delete, insert)| {
        let start = start % (source.len() + 1);
        (source, start, delete, insert)
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Property: tokenizing terminates with exactly one end token, and spans are ordered.
    #[test]
    fn tokenize_is_total(source in arbitrary_source()) {
        let stream = tokenize(&source);
        let tokens = stream.tokens();
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        prop_assert!(tokens.iter().all(|t| t.span.end <= source.len() && t.lookahead_end >= t.span.end));
    }

    /// Property: every string that starts either ends or is reported unterminated.
    #[test]
    fn strings_are_balanced_at_eof(source in arbitrary_source()) {
        let stream = tokenize(&source);
        let starts = stream.external_tokens().filter(|t| *t == ExternalToken::StringStart).count();
        let closes = stream
            .external_tokens()
            .filter(|t| matches!(t, ExternalToken::StringEnd | ExternalToken::UnterminatedString))
            .count();
        prop_assert_eq!(starts, closes);
        prop_assert!(stream.final_state().delimiters().is_empty(), "{}", stream.final_state());
    }

    /// Property: every recorded checkpoint decodes and re-encodes to the same bytes.
    #[test]
    fn checkpoints_round_trip(source in arbitrary_source()) {
        let stream = tokenize(&source);
        for point in stream.checkpoints() {
            let Some(bytes) = point.scan_state.as_deref() else { continue };
            let state = checkpoint::decode(bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(checkpoint::encode_to_vec(&state).map_err(|e| TestCaseError::fail(e.to_string()))?, bytes);
        }
    }

    /// Property: resuming from any checkpoint reproduces the rest of the token stream.
    #[test]
    fn resume_matches_full_scan(source in arbitrary_source(), pick in any::<usize>()) {
        let stream = tokenize(&source);
        let index = pick % stream.checkpoints().len();
        let session = Session::resume(&source, SessionConfig::default(), &stream.checkpoints()[index])
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let rest: Vec<_> = session.collect();
        prop_assert_eq!(&rest[..], &stream.tokens()[index..]);
    }

    /// Property: consistent indentation yields balanced INDENT/DEDENT and an empty stack at EOF.
    #[test]
    fn indentation_is_balanced(source in well_indented_source()) {
        let stream = tokenize(&source);
        let indents = stream.external_tokens().filter(|t| *t == ExternalToken::Indent).count();
        let dedents = stream.external_tokens().filter(|t| *t == ExternalToken::Dedent).count();
        prop_assert_eq!(indents, dedents);
        prop_assert_eq!(stream.final_state().indents(), &[0u16][..]);
        prop_assert!(!stream.external_tokens().any(|t| t == ExternalToken::InvalidDedent));
    }

    /// Property: an incremental reparse equals a full scan of the edited source.
    #[test]
    fn reparse_equals_full_scan((source, start, delete, insert) in source_and_edit()) {
        let Some((edit, edited)) = Edit::splice(&source, start, delete, &insert) else {
            return Ok(());
        };
        let old = tokenize(&source);
        prop_assert_eq!(reparse(&old, &edited, edit), tokenize(&edited));
    }
}
