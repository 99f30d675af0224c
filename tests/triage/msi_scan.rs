//! Integration tests for MSI inspection through the byte-scan backend.

use installer_insight::triage::config::{AnalysisConfig, MsiBackendPreference};
use installer_insight::triage::msi::scan::ByteScanInspector;
use installer_insight::triage::msi::{inspect_msi, MsiCapability, MsiInspector};
use installer_insight::triage::{ArtifactClassifier, NonInteractive};
use installer_insight::{Architecture, InstallerType};

use crate::common::msi_scan_image;
use crate::common::test_utils::create_temp_file_with_suffix;

fn byte_scan_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.msi.backend = MsiBackendPreference::ByteScan;
    config
}

#[test]
fn test_byte_scan_recovers_properties() {
    let file = create_temp_file_with_suffix(&msi_scan_image("x64;1033", false), ".msi");
    let info = ByteScanInspector::new(&byte_scan_config())
        .inspect(file.path())
        .unwrap();
    assert_eq!(info.product_code.as_deref(), Some("{6F330B47-2577-43AD-9095-1861BA25889B}"));
    assert_eq!(info.upgrade_code.as_deref(), Some("{1D8E6291-B0D5-35EC-8441-6616F567A0F7}"));
    assert_eq!(info.product_name.as_deref(), Some("Example Tool"));
    assert_eq!(info.product_version.as_deref(), Some("3.1.4"));
    assert_eq!(info.manufacturer.as_deref(), Some("Example Corp"));
    assert_eq!(info.product_language.as_deref(), Some("1033"));
    assert_eq!(info.architecture, Some(Architecture::X64));
    assert_eq!(info.scope, None);
    assert!(!info.is_wix);
}

#[test]
fn test_byte_scan_flags_wix() {
    let file = create_temp_file_with_suffix(&msi_scan_image("Intel;1033", true), ".msi");
    let info = inspect_msi(file.path(), MsiCapability::ByteScanOnly, &byte_scan_config());
    assert!(info.is_wix);
    assert_eq!(info.architecture, Some(Architecture::X86));
    assert_eq!(info.installer_type(), InstallerType::Wix);
}

#[test]
fn test_small_chunks_still_match() {
    let mut config = byte_scan_config();
    config.io.scan_chunk_size = 512;
    config.io.scan_overlap = 256;
    let file = create_temp_file_with_suffix(&msi_scan_image("x64;1033", false), ".msi");
    let info = ByteScanInspector::new(&config).inspect(file.path()).unwrap();
    assert_eq!(info.product_version.as_deref(), Some("3.1.4"));
}

#[test]
fn test_truncated_database_yields_nulls() {
    let mut data = msi_scan_image("x64;1033", false);
    let cut = data
        .windows(b"ProductCode".len())
        .position(|w| w == b"ProductCode")
        .unwrap();
    data.truncate(cut + 5);
    let file = create_temp_file_with_suffix(&data, ".msi");
    let info = ByteScanInspector::new(&byte_scan_config())
        .inspect(file.path())
        .unwrap();
    assert_eq!(info.product_code, None);
    assert_eq!(info.product_version, None);
    assert_eq!(info.manufacturer.as_deref(), Some("Example Corp"));
}

#[test]
fn test_classifier_reports_msi_facts() {
    let file = create_temp_file_with_suffix(&msi_scan_image("Intel;1033", false), ".msi");
    let classifier = ArtifactClassifier::new(byte_scan_config());
    let result = classifier.classify(file.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Msi));
    assert_eq!(result.architecture, Architecture::X86);
    assert_eq!(
        result.product_code.as_deref(),
        Some("{6F330B47-2577-43AD-9095-1861BA25889B}")
    );
    assert!(result.msi.is_some());
}
