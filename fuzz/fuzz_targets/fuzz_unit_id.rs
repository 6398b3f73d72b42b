//! Fuzz target: binding validation and unit identity derivation.
//!
//! Any accepted binding name must derive the same unit id every time.

#![no_main]

use kbank_core::Binding;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(binding) = Binding::new(name) else {
        return;
    };
    let first = kbank_executor::derive_unit_id(&binding);
    let second = kbank_executor::derive_unit_id(&binding);
    assert_eq!(first, second, "unit id derivation must be deterministic");
    assert_eq!(first.to_string().len(), 36, "unit id must display as a UUID");
});
