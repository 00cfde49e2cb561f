//! Incremental re-tokenization after a text edit.
//!
//! 1. Find the first token whose lookahead reaches the edit; every token before it is unaffected.
//! 2. Resume a session from the checkpoint recorded before that token.
//! 3. Rescan until a new checkpoint past the edit matches an old one: same position (after
//!    shifting by the length change), same scanner bytes, same session state. From there on the
//!    old tokens are reused, shifted.
//!
//! The result is always identical to tokenizing the new source from scratch. A checkpoint that
//! fails to decode makes [`try_reparse`] return an error; [`reparse`] then falls back to a full
//! scan.

use super::{Checkpoint, Session, SessionConfig, TokenStream, tokenize_with};
use crate::diagnostics::{CheckpointError, ReparseError};

/// A replaced byte range: `start..old_end` in the old source became `start..new_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl Edit {
    pub fn new(start: usize, old_end: usize, new_end: usize) -> Self {
        Self { start, old_end, new_end }
    }

    pub fn insert(at: usize, len: usize) -> Self {
        Self::new(at, at, at + len)
    }

    pub fn delete(start: usize, len: usize) -> Self {
        Self::new(start, start + len, start)
    }

    /// Change in source length.
    pub fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }

    /// Delete `delete` bytes at `start` and insert `insert`, returning the edit and the new text.
    /// `None` if the range is out of bounds or splits a character.
    pub fn splice(source: &str, start: usize, delete: usize, insert: &str) -> Option<(Edit, String)> {
        let old_end = start.checked_add(delete)?;
        if old_end > source.len() || !source.is_char_boundary(start) || !source.is_char_boundary(old_end) {
            return None;
        }
        let mut text = String::with_capacity(source.len() - delete + insert.len());
        text.push_str(&source[..start]);
        text.push_str(insert);
        text.push_str(&source[old_end..]);
        Some((Edit::new(start, old_end, start + insert.len()), text))
    }

    fn validate(&self, old_len: usize, new_source: &str) -> Result<(), ReparseError> {
        if self.start > self.old_end
            || self.old_end > old_len
            || self.new_end < self.start
            || !new_source.is_char_boundary(self.start)
            || !new_source.is_char_boundary(self.new_end)
        {
            return Err(ReparseError::EditOutOfBounds {
                start: self.start,
                old_end: self.old_end,
                new_end: self.new_end,
                old_len,
            });
        }
        let expected = old_len - (self.old_end - self.start) + (self.new_end - self.start);
        if expected != new_source.len() {
            return Err(ReparseError::LengthMismatch {
                expected,
                actual: new_source.len(),
            });
        }
        Ok(())
    }
}

/// Outcome of a successful incremental reparse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reparse {
    pub stream: TokenStream,
    /// Index of the token whose checkpoint scanning resumed from.
    pub restored_at: usize,
    /// Tokens produced by rescanning.
    pub rescanned: usize,
    /// Tokens carried over from the old stream after the rescanned region.
    pub reused: usize,
}

/// Reparse with the default configuration, falling back to a full scan on failure.
pub fn reparse(old: &TokenStream, new_source: &str, edit: Edit) -> TokenStream {
    reparse_with(old, new_source, edit, &SessionConfig::default())
}

#[tracing::instrument(skip_all, fields(source_len = new_source.len(), edit_start = edit.start))]
pub fn reparse_with(old: &TokenStream, new_source: &str, edit: Edit, config: &SessionConfig) -> TokenStream {
    match try_reparse(old, new_source, edit, config) {
        Ok(reparse) => reparse.stream,
        Err(err) => {
            tracing::warn!(%err, "incremental reparse failed, rescanning the whole source");
            tokenize_with(new_source, config)
        }
    }
}

/// Reparse reusing `old`, or report why it cannot be reused.
pub fn try_reparse(
    old: &TokenStream,
    new_source: &str,
    edit: Edit,
    config: &SessionConfig,
) -> Result<Reparse, ReparseError> {
    edit.validate(old.source_len, new_source)?;
    if old.checkpoints.is_empty() || old.checkpoints.len() != old.tokens.len() {
        return Err(ReparseError::NoCheckpoints);
    }

    let first_affected = old
        .tokens
        .iter()
        .position(|t| t.lookahead_end > edit.start)
        .unwrap_or(old.tokens.len() - 1);
    let restored_at = (0..=first_affected)
        .rev()
        .find(|&i| old.checkpoints[i].scan_state.is_some())
        .ok_or(ReparseError::Corrupted {
            index: 0,
            source: CheckpointError::Missing,
        })?;

    let mut session = Session::resume(new_source, config.clone(), &old.checkpoints[restored_at]).map_err(|source| {
        ReparseError::Corrupted {
            index: restored_at,
            source,
        }
    })?;
    tracing::debug!(
        restored_at,
        offset = old.checkpoints[restored_at].offset,
        "resumed from checkpoint"
    );

    let delta = edit.delta();
    let mut tokens = old.tokens[..restored_at].to_vec();
    let mut checkpoints = old.checkpoints[..restored_at].to_vec();
    let mut rescanned = 0;

    loop {
        let checkpoint = session.checkpoint();
        if let Some(j) = splice_index(old, &checkpoint, edit, restored_at) {
            let reused = old.tokens.len() - j;
            tracing::debug!(rescanned, reused, "rejoined previous token stream");
            tokens.extend(old.tokens[j..].iter().map(|t| t.shifted(delta)));
            checkpoints.extend(old.checkpoints[j..].iter().map(|c| c.shifted(delta)));
            return Ok(Reparse {
                stream: TokenStream {
                    source_len: new_source.len(),
                    tokens,
                    checkpoints,
                    final_state: old.final_state.clone(),
                },
                restored_at,
                rescanned,
                reused,
            });
        }

        let Some(token) = session.next_token() else {
            break;
        };
        checkpoints.push(checkpoint);
        tokens.push(token);
        rescanned += 1;
    }

    tracing::debug!(rescanned, "rescanned to end of input");
    Ok(Reparse {
        stream: TokenStream {
            source_len: new_source.len(),
            tokens,
            checkpoints,
            final_state: session.scanner().snapshot(),
        },
        restored_at,
        rescanned,
        reused: 0,
    })
}

/// Index of an old checkpoint equivalent to `checkpoint` (taken on the new source), if the
/// old tokens from there on can be reused.
fn splice_index(old: &TokenStream, checkpoint: &Checkpoint, edit: Edit, restored_at: usize) -> Option<usize> {
    if checkpoint.offset < edit.new_end || !checkpoint.is_splice_point() || checkpoint.scan_state.is_none() {
        return None;
    }
    let old_offset = checkpoint.offset.checked_add_signed(-edit.delta())?;
    if old_offset < edit.old_end {
        return None;
    }

    let first = old.checkpoints.partition_point(|c| c.offset < old_offset);
    old.checkpoints[first..]
        .iter()
        .take_while(|c| c.offset == old_offset)
        .position(|c| c.scan_state == checkpoint.scan_state && c.session == checkpoint.session)
        .map(|i| first + i)
        .filter(|&j| j >= restored_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tokenize;

    fn check(source: &str, start: usize, delete: usize, insert: &str) -> Reparse {
        let old = tokenize(source);
        let (edit, new_source) = Edit::splice(source, start, delete, insert).unwrap();
        let reparse = try_reparse(&old, &new_source, edit, &SessionConfig::default()).unwrap();
        assert_eq!(reparse.stream, tokenize(&new_source), "edit {edit:?} on {source:?}");
        reparse
    }

    const SOURCE: &str = "def f(x):\n    y = x + 1\n    return y\n\ndef g():\n    pass\n";

    #[test]
    fn test_blank_line_insertion_reuses_tail() {
        let at = SOURCE.find("    return").unwrap();
        let reparse = check(SOURCE, at, 0, "\n");
        assert!(reparse.reused > 0);
        assert!(reparse.restored_at > 0);
    }

    #[test]
    fn test_identifier_rename() {
        let at = SOURCE.find("y =").unwrap();
        let reparse = check(SOURCE, at, 1, "total");
        assert!(reparse.reused > 0);
        assert!(reparse.rescanned < 6);
    }

    #[test]
    fn test_indentation_change_rescans_layout() {
        let at = SOURCE.find("    return").unwrap();
        check(SOURCE, at, 4, "  ");
        check(SOURCE, at, 4, "        ");
        check(SOURCE, at, 4, "");
    }

    #[test]
    fn test_opening_a_string_rescans_to_eof() {
        let at = SOURCE.find("x + 1").unwrap();
        let reparse = check(SOURCE, at, 0, "\"\"\"");
        assert_eq!(reparse.reused, 0);
    }

    #[test]
    fn test_append_and_truncate() {
        check(SOURCE, SOURCE.len(), 0, "h = 1\n");
        check(SOURCE, SOURCE.len() - 1, 1, "");
        check(SOURCE, 0, SOURCE.len(), "");
    }

    #[test]
    fn test_corrupted_checkpoint_falls_back_to_full_scan() {
        let mut old = tokenize(SOURCE);
        let at = SOURCE.find("return").unwrap();
        let (edit, new_source) = Edit::splice(SOURCE, at, 0, "x = 2; ").unwrap();

        let first_affected = old.tokens.iter().position(|t| t.lookahead_end > edit.start).unwrap();
        old.checkpoints[first_affected].scan_state = Some(vec![0xFF, 0x00]);

        let err = try_reparse(&old, &new_source, edit, &SessionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ReparseError::Corrupted {
                source: CheckpointError::Version(0xFF),
                ..
            }
        ));
        assert_eq!(reparse(&old, &new_source, edit), tokenize(&new_source));
    }

    #[test]
    fn test_rejects_inconsistent_edits() {
        let old = tokenize("abc\n");
        let config = SessionConfig::default();
        assert!(matches!(
            try_reparse(&old, "abc\n", Edit::new(2, 9, 2), &config),
            Err(ReparseError::EditOutOfBounds { .. })
        ));
        assert!(matches!(
            try_reparse(&old, "abcd\n", Edit::new(1, 1, 1), &config),
            Err(ReparseError::LengthMismatch { expected: 4, actual: 5 })
        ));
    }

    #[test]
    fn test_requires_checkpoints() {
        let config = SessionConfig::new().with_checkpoints(false);
        let old = tokenize_with("a\n", &config);
        let err = try_reparse(&old, "ab\n", Edit::insert(1, 1), &config).unwrap_err();
        assert_eq!(err, ReparseError::NoCheckpoints);
        assert_eq!(reparse_with(&old, "ab\n", Edit::insert(1, 1), &config), tokenize_with("ab\n", &config));
    }

    #[test]
    fn test_splice_helper() {
        let (edit, text) = Edit::splice("héllo", 1, 2, "e").unwrap();
        assert_eq!(text, "hello");
        assert_eq!(edit, Edit::new(1, 3, 2));
        assert_eq!(edit.delta(), -1);
        assert!(Edit::splice("héllo", 2, 1, "").is_none());
        assert!(Edit::splice("abc", 2, 5, "").is_none());
    }
}
