//! Fuzz target: JSON deserialization of `Transaction`.
//!
//! Arbitrary bytes fed to the parser must never panic, and anything that
//! parses must serialize again.

#![no_main]

use kbank_core::Transaction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(tx) = serde_json::from_slice::<Transaction>(data) {
        let json = serde_json::to_string(&tx).expect("parsed Transaction must serialize");
        assert!(json.contains("\"currency\":\"THB\""), "currency tag must stay THB");
    }
});
