#![no_main]

use codon_scan::session::{Edit, reparse, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let stream = tokenize(source);
    let _ = stream.diagnostics(source);

    // Delete the first half and check the incremental path agrees with a full scan
    let half = source.len() / 2;
    if let Some((edit, edited)) = Edit::splice(source, 0, half, "") {
        assert_eq!(reparse(&stream, &edited, edit), tokenize(&edited));
    }
});
