#![no_main]

use codon_scan::scanner::checkpoint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to the same bytes
    if let Ok(state) = checkpoint::decode(data) {
        if !data.is_empty() {
            assert_eq!(checkpoint::encode_to_vec(&state).ok().as_deref(), Some(data));
        }
    }
});
