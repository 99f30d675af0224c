//! Detection results produced by the artifact classifier.

use crate::core::installer::{Architecture, InstallerType, Scope, UpgradeBehavior};
use serde::{Deserialize, Serialize};

/// A nested installer inside a zip artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedInstallerFile {
    /// Path of the entry relative to the archive root, `/`-separated.
    pub relative_file_path: String,
    /// Command alias for portable nested installers.
    pub portable_command_alias: Option<String>,
}

impl NestedInstallerFile {
    pub fn new(relative_file_path: impl Into<String>) -> Self {
        Self {
            relative_file_path: relative_file_path.into(),
            portable_command_alias: None,
        }
    }
}

/// Product metadata recovered from an MSI database.
///
/// Every field is optional; a field the backend could not ground stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsiInfo {
    pub product_code: Option<String>,
    pub upgrade_code: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub manufacturer: Option<String>,
    pub product_language: Option<String>,
    pub architecture: Option<Architecture>,
    pub scope: Option<Scope>,
    /// The database was authored with the WiX toolset.
    pub is_wix: bool,
}

impl MsiInfo {
    /// True when no field at all was recovered.
    pub fn is_empty(&self) -> bool {
        *self == MsiInfo::default()
    }

    pub fn installer_type(&self) -> InstallerType {
        if self.is_wix {
            InstallerType::Wix
        } else {
            InstallerType::Msi
        }
    }
}

/// Identity and targeting data from one MSIX/APPX package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsixInfo {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub architecture: Option<Architecture>,
    pub display_name: Option<String>,
    pub publisher_display_name: Option<String>,
    pub min_version: Option<String>,
    pub target_device_family: Option<String>,
    pub package_family_name: Option<String>,
    /// SHA-256 of the package signature blob, lowercase hex.
    pub signature_sha256: Option<String>,
    /// File name of the package inside a bundle.
    pub file_name: Option<String>,
}

/// Complete result of classifying one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// `None` when the family could not be determined and must be asked.
    pub installer_type: Option<InstallerType>,
    /// Always resolved; defaults to x64.
    pub architecture: Architecture,
    pub scope: Option<Scope>,
    pub product_code: Option<String>,
    pub upgrade_behavior: Option<UpgradeBehavior>,
    /// MSIX/APPX signature hash.
    pub signature_sha256: Option<String>,
    /// Installer type of the nested installers when the artifact is a zip.
    pub nested_installer_type: Option<InstallerType>,
    pub nested_installer_files: Vec<NestedInstallerFile>,
    pub msi: Option<MsiInfo>,
    pub msix: Option<MsixInfo>,
    /// One entry per application package of an MSIX/APPX bundle.
    pub bundle_packages: Vec<MsixInfo>,
}

impl DetectionResult {
    /// An unresolved result: unknown family, default architecture.
    pub fn unknown() -> Self {
        Self {
            installer_type: None,
            architecture: Architecture::default(),
            scope: None,
            product_code: None,
            upgrade_behavior: None,
            signature_sha256: None,
            nested_installer_type: None,
            nested_installer_files: Vec::new(),
            msi: None,
            msix: None,
            bundle_packages: Vec::new(),
        }
    }

    pub fn with_type(installer_type: Option<InstallerType>) -> Self {
        Self {
            installer_type,
            ..Self::unknown()
        }
    }

    /// True when the family still needs a human decision.
    pub fn needs_installer_type(&self) -> bool {
        self.installer_type.is_none()
    }
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self::unknown()
    }
}
