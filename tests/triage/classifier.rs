//! Integration tests for the artifact classifier.

use installer_insight::core::InstallerRecord;
use installer_insight::triage::{ArtifactClassifier, NonInteractive};
use installer_insight::{Architecture, InstallerType, Scope};

use crate::common::test_utils::{create_temp_file, create_temp_file_with_suffix};
use crate::common::{burn_image, inno_image, nsis_image, pe_image};

#[test]
fn test_engine_installers_carry_pe_architecture() {
    let classifier = ArtifactClassifier::default();
    let cases = [
        (nsis_image(), InstallerType::Nullsoft),
        (inno_image(), InstallerType::Inno),
        (burn_image(0x1000), InstallerType::Burn),
    ];
    for (data, expected) in cases {
        let file = create_temp_file_with_suffix(&data, ".exe");
        let result = classifier.classify(file.path(), None, &mut NonInteractive);
        assert_eq!(result.installer_type, Some(expected));
        assert_eq!(result.architecture, Architecture::X86, "{expected}");
    }
}

#[test]
fn test_extensionless_executable_uses_signatures() {
    let file = create_temp_file(&nsis_image());
    let result = ArtifactClassifier::default().classify(file.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Nullsoft));
}

#[test]
fn test_plain_executable_needs_a_decision() {
    let file = create_temp_file_with_suffix(&pe_image(0xaa64), ".exe");
    let result = ArtifactClassifier::default().classify(file.path(), None, &mut NonInteractive);
    assert!(result.needs_installer_type());
    assert_eq!(result.architecture, Architecture::Arm64);
}

#[test]
fn test_url_hints_override_binary() {
    let file = create_temp_file_with_suffix(&pe_image(0x8664), ".exe");
    let result = ArtifactClassifier::default().classify(
        file.path(),
        Some("https://downloads.example.com/v2/App-Setup-x86-machine.exe"),
        &mut NonInteractive,
    );
    assert_eq!(result.architecture, Architecture::X86);
    assert_eq!(result.scope, Some(Scope::Machine));
}

#[test]
fn test_missing_artifact_degrades_to_defaults() {
    let result = ArtifactClassifier::default().classify(
        std::path::Path::new("/nonexistent/download.bin"),
        None,
        &mut NonInteractive,
    );
    assert_eq!(result.installer_type, None);
    assert_eq!(result.architecture, Architecture::X64);
}

#[test]
fn test_detection_feeds_installer_record() {
    let file = create_temp_file_with_suffix(&inno_image(), ".exe");
    let url = "https://example.com/setup.exe";
    let result = ArtifactClassifier::default().classify(file.path(), Some(url), &mut NonInteractive);
    let record = InstallerRecord::from_detection(url, &result);
    assert_eq!(record.installer_type, Some(InstallerType::Inno));
    assert_eq!(record.url_extension().as_deref(), Some("exe"));
}
