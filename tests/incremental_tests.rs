//! Incremental reparse: every edit must produce exactly the tokens of a full scan.

use codon_scan::diagnostics::{CheckpointError, ReparseError};
use codon_scan::session::{Edit, Session, SessionConfig, TokenStream, reparse, tokenize, try_reparse};

const PROGRAM: &str = r#"import math

@llvm
def popcnt(x: int) -> int:
    %0 = call i64 @llvm.ctpop.i64(i64 %x)
    ret i64 %0

class Point:
    x: float
    y: float

    def norm(self) -> float:
        # Euclidean
        return math.sqrt(self.x ** 2 +
                         self.y ** 2)

def describe(p: Point):
    label = f"({p.x:.2f}, {p.y!r}) {{raw}}"
    doc = """multi
line "text"
"""
    if p.norm() > 1.0:
        print(label, doc, r'\d+', b"\x00")
    else:
        pass
"#;

fn assert_equivalent(source: &str, start: usize, delete: usize, insert: &str) {
    let Some((edit, edited)) = Edit::splice(source, start, delete, insert) else {
        return;
    };
    let old = tokenize(source);
    let result = try_reparse(&old, &edited, edit, &SessionConfig::default())
        .unwrap_or_else(|err| panic!("reparse failed for {edit:?}: {err}"));
    let full = tokenize(&edited);
    assert_eq!(
        result.stream, full,
        "incremental and full scan differ after {edit:?} inserting {insert:?}"
    );
}

#[test]
fn test_blank_line_insertion_mid_file() {
    let at = PROGRAM.find("    def norm").unwrap();
    let (edit, edited) = Edit::splice(PROGRAM, at, 0, "\n").unwrap();
    let old = tokenize(PROGRAM);
    let result = try_reparse(&old, &edited, edit, &SessionConfig::default()).unwrap();
    assert_eq!(result.stream, tokenize(&edited));
    assert!(result.reused > result.rescanned, "{result:?}");
}

#[test]
fn test_insertions_at_every_offset() {
    for insert in ["\n", " ", "x", "#", "'", "\"\"\"", "(", "}", "\\", ":\n    "] {
        for start in 0..=PROGRAM.len() {
            assert_equivalent(PROGRAM, start, 0, insert);
        }
    }
}

#[test]
fn test_deletions_at_every_offset() {
    for delete in [1, 2, 5, 17] {
        for start in 0..PROGRAM.len() {
            assert_equivalent(PROGRAM, start, delete, "");
        }
    }
}

#[test]
fn test_replacements_that_change_layout() {
    let cases = [
        ("        return", 8, "  "),
        ("    if p.norm()", 4, ""),
        ("@llvm", 5, "@cache"),
        ("\"\"\"multi", 3, "'"),
        ("{{raw}}", 2, "{"),
        ("-> float:", 9, "-> float"),
    ];
    for (needle, delete, insert) in cases {
        let start = PROGRAM.find(needle).unwrap();
        assert_equivalent(PROGRAM, start, delete, insert);
    }
}

#[test]
fn test_sequence_of_edits_reuses_previous_result() {
    let mut source = PROGRAM.to_string();
    let mut stream: TokenStream = tokenize(&source);
    let edits = [("x: float", 1, "xx"), ("pass", 4, "return 0"), ("import", 0, "# header\n")];
    for (needle, delete, insert) in edits {
        let start = source.find(needle).unwrap();
        let (edit, edited) = Edit::splice(&source, start, delete, insert).unwrap();
        stream = reparse(&stream, &edited, edit);
        assert_eq!(stream, tokenize(&edited));
        source = edited;
    }
}

#[test]
fn test_corrupted_checkpoint_cannot_be_resumed() {
    let stream = tokenize(PROGRAM);
    let mut point = stream.checkpoints()[10].clone();
    point.scan_state = Some(vec![1, 9]);
    let err = Session::resume(PROGRAM, SessionConfig::default(), &point).unwrap_err();
    assert_eq!(err, CheckpointError::Mode(9));
}

#[test]
fn test_edit_that_does_not_match_source_is_rejected() {
    let old = tokenize(PROGRAM);
    let err = try_reparse(&old, "x\n", Edit::insert(0, 1), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, ReparseError::LengthMismatch { .. }), "{err:?}");
    // The infallible entry point still returns the right tokens.
    assert_eq!(reparse(&old, "x\n", Edit::insert(0, 1)), tokenize("x\n"));
}
