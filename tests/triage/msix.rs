//! Integration tests for MSIX/APPX package and bundle inspection.

use installer_insight::triage::msix::{inspect_msix, inspect_msix_bundle, package_family_name};
use installer_insight::triage::{AnalysisConfig, ArtifactClassifier, NonInteractive};
use installer_insight::{Architecture, InstallerType, UpgradeBehavior};
use sha2::{Digest, Sha256};

use crate::common::test_utils::{create_temp_file, create_temp_file_with_suffix};
use crate::common::{bundle_bytes, msix_bytes, zip_bytes};

#[test]
fn test_package_identity_and_targeting() {
    let file = create_temp_file_with_suffix(&msix_bytes("Example.App", "x86"), ".msix");
    let info = inspect_msix(file.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(info.name.as_deref(), Some("Example.App"));
    assert_eq!(info.publisher.as_deref(), Some("CN=Example Publisher"));
    assert_eq!(info.architecture, Some(Architecture::X86));
    assert_eq!(info.min_version.as_deref(), Some("10.0.17763.0"));
    assert_eq!(info.target_device_family.as_deref(), Some("Windows.Desktop"));
    assert_eq!(
        info.package_family_name,
        Some(package_family_name("Example.App", "CN=Example Publisher"))
    );
    let expected = hex::encode(Sha256::digest(b"PKCX-signature"));
    assert_eq!(info.signature_sha256.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_bundle_lists_every_application_package() {
    let file = create_temp_file_with_suffix(&bundle_bytes(), ".msixbundle");
    let packages = inspect_msix_bundle(file.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(packages.len(), 2);

    assert_eq!(packages[0].architecture, Some(Architecture::X64));
    assert_eq!(packages[0].min_version.as_deref(), Some("10.0.19041.0"));

    assert_eq!(packages[1].architecture, Some(Architecture::Arm64));
    assert_eq!(packages[1].version.as_deref(), Some("2.4.0.0"));
    assert_eq!(packages[1].min_version.as_deref(), Some("10.0.17763.0"));
    assert_eq!(packages[1].target_device_family.as_deref(), Some("Windows.Desktop"));
}

#[test]
fn test_nested_package_size_limit_keeps_bundle_data() {
    let mut config = AnalysisConfig::default();
    config.archive.max_nested_package_size = 16;
    let file = create_temp_file_with_suffix(&bundle_bytes(), ".msixbundle");
    let packages = inspect_msix_bundle(file.path(), &config).unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[1].min_version, None);
}

#[test]
fn test_classifier_package_result() {
    let file = create_temp_file_with_suffix(&msix_bytes("Example.App", "arm64"), ".appx");
    let result = ArtifactClassifier::default().classify(file.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Appx));
    assert_eq!(result.architecture, Architecture::Arm64);
    assert_eq!(result.upgrade_behavior, Some(UpgradeBehavior::Install));
    assert!(result.signature_sha256.is_some());
}

#[test]
fn test_extensionless_package_is_probed() {
    let file = create_temp_file(&msix_bytes("Example.App", "x64"));
    let result = ArtifactClassifier::default().classify(file.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Msix));
    assert!(result.msix.is_some());

    let bundle = create_temp_file(&bundle_bytes());
    let result = ArtifactClassifier::default().classify(bundle.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Msix));
    assert_eq!(result.bundle_packages.len(), 2);
}

#[test]
fn test_malformed_manifest_degrades() {
    let data = zip_bytes(&[("AppxManifest.xml", b"<Package><Identity Name=\"x\"")]);
    let file = create_temp_file_with_suffix(&data, ".msix");
    assert!(inspect_msix(file.path(), &AnalysisConfig::default()).is_err());

    let result = ArtifactClassifier::default().classify(file.path(), None, &mut NonInteractive);
    assert_eq!(result.installer_type, Some(InstallerType::Msix));
    assert_eq!(result.architecture, Architecture::X64);
}
