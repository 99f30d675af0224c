//! Artifact classifier: the single entry point of the detection pipeline.
//!
//! Dispatches on the declared extension first and on content second, then
//! resolves architecture as URL hint, binary value, x64 default.

use crate::core::detection::{DetectionResult, MsixInfo};
use crate::core::installer::{Architecture, InstallerType, UpgradeBehavior};
use crate::span_trace;
use crate::triage::config::AnalysisConfig;
use crate::triage::containers::analyze_archive;
use crate::triage::headers::read_pe_machine;
use crate::triage::hints;
use crate::triage::io::SafeFileReader;
use crate::triage::msi::{inspect_msi, MsiCapability};
use crate::triage::msix::{
    inspect_bundle_archive, inspect_msix, inspect_msix_bundle, inspect_msix_reader, open_archive,
    package_layout, PackageLayout,
};
use crate::triage::prompt::ChoiceProvider;
use crate::triage::signatures;
use crate::triage::sniffers::{ArtifactKind, CombinedSniffer, ExtensionSniffer};
use std::path::Path;
use tracing::{debug, info, warn};

/// Facts read from the artifact itself, before hints are applied.
struct BinaryFacts {
    result: DetectionResult,
    architecture: Option<Architecture>,
}

impl BinaryFacts {
    fn new(installer_type: Option<InstallerType>) -> Self {
        Self {
            result: DetectionResult::with_type(installer_type),
            architecture: None,
        }
    }
}

/// Classifies downloaded artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    config: AnalysisConfig,
    msi_capability: MsiCapability,
}

impl Default for ArtifactClassifier {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl ArtifactClassifier {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_capability(config, MsiCapability::probe())
    }

    pub fn with_capability(config: AnalysisConfig, msi_capability: MsiCapability) -> Self {
        Self {
            config,
            msi_capability,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn msi_capability(&self) -> MsiCapability {
        self.msi_capability
    }

    fn sniff(&self, path: &Path) -> (ArtifactKind, ArtifactKind) {
        let declared = ExtensionSniffer::sniff_path(path);
        let prefix = SafeFileReader::open(path, self.config.io.limits())
            .and_then(|mut reader| reader.read_prefix(self.config.io.sniff_size));
        let prefix = match prefix {
            Ok(prefix) => prefix,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read artifact prefix");
                Vec::new()
            }
        };
        (declared, CombinedSniffer::sniff(&prefix, path))
    }

    /// Family of an artifact without descending into archives.
    ///
    /// Used for nested installers; a zip reports `Zip` and stops there.
    pub fn detect_family(&self, path: &Path) -> Option<InstallerType> {
        let (declared, kind) = self.sniff(path);
        match kind {
            ArtifactKind::Msi => Some(inspect_msi(path, self.msi_capability, &self.config).installer_type()),
            ArtifactKind::Msix | ArtifactKind::MsixBundle => Some(InstallerType::Msix),
            ArtifactKind::Appx | ArtifactKind::AppxBundle => Some(InstallerType::Appx),
            ArtifactKind::Zip if declared == ArtifactKind::Unknown => {
                match open_archive(path, &self.config.io.limits()).map(|a| package_layout(&a)) {
                    Ok(PackageLayout::Package | PackageLayout::Bundle) => Some(InstallerType::Msix),
                    _ => Some(InstallerType::Zip),
                }
            }
            ArtifactKind::Zip => Some(InstallerType::Zip),
            ArtifactKind::Exe | ArtifactKind::Unknown => {
                signatures::detect_family(path, &self.config.io.limits(), &self.config.signatures)
            }
        }
    }

    /// Produce a complete detection result for one artifact.
    ///
    /// Never fails: anything that cannot be determined is left unresolved,
    /// except architecture which falls back to x64.
    pub fn classify(
        &self,
        path: &Path,
        url: Option<&str>,
        provider: &mut dyn ChoiceProvider,
    ) -> DetectionResult {
        let span = span_trace!("classify", artifact = %path.display());
        let _guard = span.enter();

        let (declared, kind) = self.sniff(path);
        debug!(?declared, ?kind, "Artifact sniffed");

        let facts = match kind {
            ArtifactKind::Msi => self.classify_msi(path),
            ArtifactKind::Msix => self.classify_package(path, InstallerType::Msix),
            ArtifactKind::Appx => self.classify_package(path, InstallerType::Appx),
            ArtifactKind::MsixBundle => self.classify_bundle(path, InstallerType::Msix),
            ArtifactKind::AppxBundle => self.classify_bundle(path, InstallerType::Appx),
            ArtifactKind::Zip => self.classify_zip(path, declared == ArtifactKind::Unknown, provider),
            ArtifactKind::Exe | ArtifactKind::Unknown => self.classify_executable(path),
        };

        let BinaryFacts {
            mut result,
            architecture,
        } = facts;
        let url_architecture = url.and_then(hints::architecture_from_url);
        result.architecture = url_architecture.or(architecture).unwrap_or_default();
        if result.scope.is_none() {
            result.scope = url.and_then(hints::scope_from_url);
        }
        if matches!(
            result.installer_type,
            Some(InstallerType::Msix | InstallerType::Appx)
        ) {
            result.upgrade_behavior = Some(UpgradeBehavior::Install);
        }

        info!(
            installer_type = ?result.installer_type,
            architecture = %result.architecture,
            scope = ?result.scope,
            nested = result.nested_installer_files.len(),
            "Artifact classified"
        );
        result
    }

    fn classify_msi(&self, path: &Path) -> BinaryFacts {
        let msi = inspect_msi(path, self.msi_capability, &self.config);
        let mut facts = BinaryFacts::new(Some(msi.installer_type()));
        facts.architecture = msi.architecture;
        facts.result.scope = msi.scope;
        facts.result.product_code = msi.product_code.clone();
        facts.result.msi = Some(msi);
        facts
    }

    fn apply_package(facts: &mut BinaryFacts, info: MsixInfo) {
        facts.architecture = info.architecture;
        facts.result.signature_sha256 = info.signature_sha256.clone();
        facts.result.msix = Some(info);
    }

    fn apply_bundle(facts: &mut BinaryFacts, packages: Vec<MsixInfo>) {
        facts.architecture = packages.first().and_then(|p| p.architecture);
        facts.result.signature_sha256 = packages.first().and_then(|p| p.signature_sha256.clone());
        facts.result.bundle_packages = packages;
    }

    fn classify_package(&self, path: &Path, installer_type: InstallerType) -> BinaryFacts {
        let mut facts = BinaryFacts::new(Some(installer_type));
        match inspect_msix(path, &self.config) {
            Ok(info) => Self::apply_package(&mut facts, info),
            Err(e) => warn!(error = %e, "Package manifest unreadable"),
        }
        facts
    }

    fn classify_bundle(&self, path: &Path, installer_type: InstallerType) -> BinaryFacts {
        let mut facts = BinaryFacts::new(Some(installer_type));
        match inspect_msix_bundle(path, &self.config) {
            Ok(packages) => Self::apply_bundle(&mut facts, packages),
            Err(e) => warn!(error = %e, "Bundle manifest unreadable"),
        }
        facts
    }

    fn classify_zip(
        &self,
        path: &Path,
        probe_packages: bool,
        provider: &mut dyn ChoiceProvider,
    ) -> BinaryFacts {
        let mut archive = match open_archive(path, &self.config.io.limits()) {
            Ok(archive) => archive,
            Err(e) => {
                warn!(error = %e, "Zip artifact unreadable");
                return BinaryFacts::new(Some(InstallerType::Zip));
            }
        };

        if probe_packages {
            match package_layout(&archive) {
                PackageLayout::Package => {
                    debug!("Extensionless zip holds a package manifest");
                    let mut facts = BinaryFacts::new(Some(InstallerType::Msix));
                    match inspect_msix_reader(archive.into_inner()) {
                        Ok(info) => Self::apply_package(&mut facts, info),
                        Err(e) => warn!(error = %e, "Package manifest unreadable"),
                    }
                    return facts;
                }
                PackageLayout::Bundle => {
                    debug!("Extensionless zip holds a bundle manifest");
                    let mut facts = BinaryFacts::new(Some(InstallerType::Msix));
                    match inspect_bundle_archive(&mut archive, &self.config) {
                        Ok(packages) => Self::apply_bundle(&mut facts, packages),
                        Err(e) => warn!(error = %e, "Bundle manifest unreadable"),
                    }
                    return facts;
                }
                PackageLayout::PlainZip => {}
            }
        }

        let mut facts = BinaryFacts::new(Some(InstallerType::Zip));
        match analyze_archive(&mut archive, self, provider) {
            Ok(analysis) => {
                facts.result.nested_installer_type = analysis.nested_installer_type;
                facts.result.nested_installer_files = analysis.nested_installer_files;
            }
            Err(e) => warn!(error = %e, "Zip analysis failed"),
        }
        facts
    }

    fn classify_executable(&self, path: &Path) -> BinaryFacts {
        let limits = self.config.io.limits();
        let family = signatures::detect_family(path, &limits, &self.config.signatures);
        let mut facts = BinaryFacts::new(family);
        facts.architecture = match read_pe_machine(path, &limits) {
            Ok(machine) => Some(Architecture::from_pe_machine(machine)),
            Err(e) => {
                debug!(error = %e, "No PE machine field");
                None
            }
        };
        facts
    }
}
