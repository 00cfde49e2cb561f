//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.
//! Each command reads its file and hands the text to a pure `render_*` function, which the tests
//! exercise directly.

use std::fs;
use std::path::Path;

use miette::{NamedSource, Report};
use serde_json::json;

use codon_syntax::lexer::TokenKind;
use codon_syntax::scanner::checkpoint;
use codon_syntax::session::{Edit, SessionConfig, TokenFilter, TokenStream, tokenize_with, try_reparse};

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB)
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a source file with size validation.
pub fn read_source(path: &Path) -> CliResult<String> {
    let shown = path.display();
    let metadata = fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{shown}': {e}")))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{shown}' is too large ({} bytes, max {MAX_SOURCE_SIZE} bytes)",
            metadata.len()
        )));
    }

    tracing::debug!(path = %shown, bytes = metadata.len(), "reading source");
    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{shown}': {e}")))
}

// ============================================================================
// tokens
// ============================================================================

pub fn tokens(path: &Path, json: bool, all: bool, config: &SessionConfig) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let filter = if all { TokenFilter::All } else { TokenFilter::External };
    let output = if json {
        render_tokens_json(&source, filter, config)?
    } else {
        tokenize_with(&source, config).render(&source, filter)
    };
    println!("{output}");
    Ok(ExitCode::SUCCESS)
}

/// Token stream as a JSON array of `{kind, start, end, lookahead_end, text}` objects.
pub fn render_tokens_json(source: &str, filter: TokenFilter, config: &SessionConfig) -> CliResult<String> {
    let stream = tokenize_with(source, config);
    let tokens: Vec<_> = stream
        .tokens()
        .iter()
        .filter(|t| filter == TokenFilter::All || t.kind.is_external() || t.kind == TokenKind::Eof)
        .map(|t| {
            json!({
                "kind": t.kind.name(),
                "start": t.span.start,
                "end": t.span.end,
                "lookahead_end": t.lookahead_end,
                "text": t.text(source),
            })
        })
        .collect();
    serde_json::to_string_pretty(&tokens).map_err(|e| CliError::failure(format!("Error serializing tokens: {e}")))
}

// ============================================================================
// check
// ============================================================================

pub fn check(path: &Path, config: &SessionConfig) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    match render_diagnostics(&path.display().to_string(), &source, config) {
        None => {
            println!("✓ No lexical errors");
            Ok(ExitCode::SUCCESS)
        }
        Some(report) => Err(CliError::failure(report)),
    }
}

/// All lexical errors rendered with source context, or `None` if there are none.
pub fn render_diagnostics(name: &str, source: &str, config: &SessionConfig) -> Option<String> {
    let errors = tokenize_with(source, config).diagnostics(source);
    if errors.is_empty() {
        return None;
    }

    let count = errors.len();
    let mut out = String::new();
    for error in errors {
        let report = Report::new(error).with_source_code(NamedSource::new(name, source.to_string()));
        out.push_str(&format!("{report:?}\n"));
    }
    out.push_str(&format!("{count} lexical error(s) in {name}"));
    Some(out)
}

// ============================================================================
// state
// ============================================================================

pub fn state(path: &Path, config: &SessionConfig) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    println!("{}", render_states(&source, config)?);
    Ok(ExitCode::SUCCESS)
}

/// One line per token: the offset, the token, and the scan state decoded from its checkpoint.
pub fn render_states(source: &str, config: &SessionConfig) -> CliResult<String> {
    let config = config.clone().with_checkpoints(true);
    let stream = tokenize_with(source, &config);

    let mut lines = Vec::with_capacity(stream.tokens().len() + 1);
    for (index, (token, point)) in stream.tokens().iter().zip(stream.checkpoints()).enumerate() {
        let state = match &point.scan_state {
            Some(bytes) => checkpoint::decode(bytes)
                .map_err(|e| CliError::failure(format!("Checkpoint before token {index} does not decode: {e}")))?
                .to_string(),
            None => "(not recorded)".to_string(),
        };
        lines.push(format!("{:>6} {:<20} {state}", point.offset, token.kind.name()));
    }
    lines.push(format!("{:>6} {:<20} {}", stream.source_len(), "(final)", stream.final_state()));
    Ok(lines.join("\n"))
}

// ============================================================================
// reparse
// ============================================================================

pub fn reparse(path: &Path, at: usize, delete: usize, insert: &str, config: &SessionConfig) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    println!("{}", render_reparse(&source, at, delete, &unescape(insert), config)?);
    Ok(ExitCode::SUCCESS)
}

/// Reparse after the edit and check the result against a full scan of the edited text.
pub fn render_reparse(source: &str, at: usize, delete: usize, insert: &str, config: &SessionConfig) -> CliResult<String> {
    let (edit, edited) = Edit::splice(source, at, delete, insert).ok_or_else(|| {
        CliError::failure(format!(
            "Edit {at}..{} is out of bounds or splits a character ({} byte source)",
            at.saturating_add(delete),
            source.len()
        ))
    })?;

    let config = config.clone().with_checkpoints(true);
    let old = tokenize_with(source, &config);
    let result = try_reparse(&old, &edited, edit, &config)
        .map_err(|e| CliError::failure(format!("Incremental reparse failed: {e}")))?;

    let full: TokenStream = tokenize_with(&edited, &config);
    if result.stream != full {
        return Err(CliError::failure(format!(
            "Incremental result differs from a full scan after edit {}..{} -> ..{}",
            edit.start, edit.old_end, edit.new_end
        )));
    }

    Ok(format!(
        "✓ Matches full scan: resumed at token {}, rescanned {}, reused {} of {} tokens",
        result.restored_at,
        result.rescanned,
        result.reused,
        full.tokens().len()
    ))
}

/// Expand `\n`, `\r`, `\t` and `\\` in command-line text. Other sequences are kept as written.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_source() {
        let dir = std::env::temp_dir().join(format!("codon_scan_read_source_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ok.codon");
        fs::write(&path, "x = 1\n").unwrap();

        assert_eq!(read_source(&path).unwrap(), "x = 1\n");
        let err = read_source(&dir.join("missing.codon")).unwrap_err();
        assert!(err.message.contains("Cannot access file"), "{err}");
        assert_eq!(err.exit_code, ExitCode::FAILURE);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_tokens_json() {
        let json = render_tokens_json("x\n", TokenFilter::External, &SessionConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let kinds: Vec<_> = value.as_array().unwrap().iter().map(|t| t["kind"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["_newline", "end"]);
        assert_eq!(value[0]["start"], 1);
        assert_eq!(value[0]["text"], "\n");
    }

    #[test]
    fn test_check_clean_source() {
        assert!(render_diagnostics("ok.codon", "x = 1\n", &SessionConfig::default()).is_none());
    }

    #[test]
    fn test_check_reports_errors() {
        let report = render_diagnostics("bad.codon", "s = \"abc\nif a:\n    b\n  c\n", &SessionConfig::default()).unwrap();
        assert!(report.contains("unterminated string literal"));
        assert!(report.contains("unindent to column 2"));
        assert!(report.ends_with("2 lexical error(s) in bad.codon"));
    }

    #[test]
    fn test_check_reports_fstring_open_at_eof() {
        let report = render_diagnostics("open.codon", "x = f\"{a", &SessionConfig::default()).unwrap();
        assert!(report.contains("unterminated string literal"));
        assert!(!report.contains("still open"));
        assert!(report.ends_with("1 lexical error(s) in open.codon"));
    }

    #[test]
    fn test_states_one_line_per_token_plus_final() {
        let source = "if a:\n    b\n";
        let rendered = render_states(source, &SessionConfig::default().with_checkpoints(false)).unwrap();
        let lines: Vec<_> = rendered.lines().collect();
        let tokens = tokenize_with(source, &SessionConfig::default()).tokens().len();
        assert_eq!(lines.len(), tokens + 1);
        assert!(lines.iter().any(|l| l.contains("indents=[0, 4]")));
        assert!(lines.last().unwrap().contains("(final)"));
    }

    #[test]
    fn test_reparse_reports_reuse() {
        let source = "def f():\n    a = 1\n    b = 2\n";
        let at = source.find("b =").unwrap();
        let out = render_reparse(source, at, 1, "total", &SessionConfig::default()).unwrap();
        assert!(out.starts_with("✓ Matches full scan"));
        assert!(!out.contains("reused 0 "));
    }

    #[test]
    fn test_reparse_rejects_bad_edit() {
        let err = render_reparse("abc\n", 3, 10, "", &SessionConfig::default()).unwrap_err();
        assert!(err.message.contains("out of bounds"));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\nb\\t\\\\"), "a\nb\t\\");
        assert_eq!(unescape("\\x"), "\\x");
        assert_eq!(unescape("end\\"), "end\\");
    }
}
