#![no_main]
use installer_insight::triage::headers::pe_machine_from_bytes;
use installer_insight::triage::signatures::{contains_burn_marker, is_inno, is_nullsoft};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = is_nullsoft(data);
    let _ = is_inno(data);
    let _ = pe_machine_from_bytes(data);
    let _ = contains_burn_marker(&mut Cursor::new(data), 8, 4096);
});
