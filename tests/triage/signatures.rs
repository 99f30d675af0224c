//! Integration tests for engine signature detection.

use installer_insight::triage::config::SignatureConfig;
use installer_insight::triage::io::IOLimits;
use installer_insight::triage::signatures::{detect_family, BURN_MAX_WINDOWS, BURN_WINDOW_SIZE};
use installer_insight::InstallerType;

use crate::common::test_utils::create_temp_file;
use crate::common::{burn_image, inno_image, nsis_image, pe_image};

fn family_of(data: &[u8]) -> Option<InstallerType> {
    let file = create_temp_file(data);
    detect_family(file.path(), &IOLimits::default(), &SignatureConfig::default())
}

#[test]
fn test_nullsoft_prefix() {
    assert_eq!(family_of(&nsis_image()), Some(InstallerType::Nullsoft));
}

#[test]
fn test_corrupted_nullsoft_tail_is_unknown() {
    let mut data = nsis_image();
    data[222] = 0;
    data[223] = 0;
    assert_eq!(family_of(&data), None);
}

#[test]
fn test_inno_prefix() {
    assert_eq!(family_of(&inno_image()), Some(InstallerType::Inno));

    let mut data = inno_image();
    data[262] = 0;
    data[263] = 0;
    assert_eq!(family_of(&data), None);
}

#[test]
fn test_truncated_prefix_is_unknown() {
    assert_eq!(family_of(&nsis_image()[..200]), None);
    assert_eq!(family_of(&[]), None);
}

#[test]
fn test_burn_marker_within_bound() {
    assert_eq!(family_of(&burn_image(0x400)), Some(InstallerType::Burn));

    let last_window = (BURN_MAX_WINDOWS as usize - 1) * BURN_WINDOW_SIZE;
    assert_eq!(family_of(&burn_image(last_window)), Some(InstallerType::Burn));
}

#[test]
fn test_burn_marker_beyond_bound_is_unknown() {
    let beyond = BURN_MAX_WINDOWS as usize * BURN_WINDOW_SIZE;
    assert_eq!(family_of(&burn_image(beyond)), None);
}

#[test]
fn test_plain_pe_is_unknown() {
    assert_eq!(family_of(&pe_image(0x8664)), None);
}

#[test]
fn test_missing_file_is_unknown() {
    let result = detect_family(
        std::path::Path::new("/nonexistent/setup.exe"),
        &IOLimits::default(),
        &SignatureConfig::default(),
    );
    assert_eq!(result, None);
}
