#![no_main]
use installer_insight::triage::msi::scan::{parse_property_run, parse_summary, SUMMARY_MARKER};
use libfuzzer_sys::fuzz_target;
use memchr::memmem;

fuzz_target!(|data: &[u8]| {
    if let Some(marker) = memmem::find(data, SUMMARY_MARKER) {
        let _ = parse_summary(data, marker, 512);
    }
    let _ = parse_summary(data, data.len() / 2, 512);
    let _ = parse_property_run(data);
});
