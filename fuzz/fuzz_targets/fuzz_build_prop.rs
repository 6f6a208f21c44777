//! Fuzz target for `build.prop` and `/proc/*/status` parsing.
//!
//! Goal: neither parser may panic on any input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_build_prop
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = deviceguard_host::fuzz::parse_build_prop(&text);
    let _ = deviceguard_host::fuzz::parse_tracer_pid(&text);
});
