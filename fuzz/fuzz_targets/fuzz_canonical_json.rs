#![no_main]

use libfuzzer_sys::fuzz_target;

// Canonicalization must never panic, and must be idempotent with a stable digest.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(once) = verdict_crypto::canonicalize_str(text) else {
        return;
    };
    let twice = verdict_crypto::canonicalize_str(&once).expect("canonical text must parse");
    assert_eq!(once, twice);
    assert_eq!(
        verdict_crypto::digest_canonical(&once),
        verdict_crypto::digest_canonical(&twice)
    );
});
