//! Fuzz target for placeholder resolution.
//!
//! Self-referencing and malformed tokens must terminate without panicking.

#![no_main]

use cwatm_settings::resolve_placeholders;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str)| {
    let (path, text) = input;
    let resolution = resolve_placeholders(path, text);
    for warning in &resolution.unresolved {
        assert!(resolution.path.contains(&warning.token));
    }
});
