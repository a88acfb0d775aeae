//! Fuzz target for the collapse/expand round trip.
//!
//! Any text must load, survive collapsing every section, and reconstruct to
//! exactly what was loaded.

#![no_main]

use cwatm_settings::EditSession;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut session = EditSession::from_text(data, "fuzz.ini");

    // marker-looking lines in the source change the section structure once
    // displayed, so only structurally plain inputs must round-trip exactly
    let plain = !data
        .split('\n')
        .any(|line| cwatm_settings::Marker::parse_prefix(line).is_some());

    if session.collapse_all().is_err() {
        return;
    }
    if plain {
        assert_eq!(session.clean_text(), data);
    }
    let _ = session.expand_all();
    if plain {
        assert_eq!(session.clean_text(), data);
    }
});
