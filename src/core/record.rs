//! Manifest-facing installer records.

use crate::core::detection::{DetectionResult, NestedInstallerFile};
use crate::core::installer::{Architecture, InstallerType, Scope, UpgradeBehavior};
use crate::triage::hints;
use serde::{Deserialize, Serialize};

/// One installer entry of a package manifest.
///
/// Records are assembled by manifest code from a [`DetectionResult`] plus
/// user or previous-manifest data; the analysis engine only reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstallerRecord {
    pub architecture: Architecture,
    pub installer_type: Option<InstallerType>,
    pub scope: Option<Scope>,
    pub installer_url: String,
    pub installer_sha256: Option<String>,
    pub signature_sha256: Option<String>,
    pub product_code: Option<String>,
    pub upgrade_behavior: Option<UpgradeBehavior>,
    pub nested_installer_type: Option<InstallerType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_installer_files: Vec<NestedInstallerFile>,
    pub installer_switches: Option<InstallerSwitches>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installer_success_codes: Vec<i64>,
}

/// Silent/custom switches for an installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstallerSwitches {
    pub silent: Option<String>,
    pub silent_with_progress: Option<String>,
    pub custom: Option<String>,
}

impl InstallerRecord {
    pub fn new(installer_url: impl Into<String>, architecture: Architecture) -> Self {
        Self {
            installer_url: installer_url.into(),
            architecture,
            ..Self::default()
        }
    }

    pub fn with_type(mut self, installer_type: InstallerType) -> Self {
        self.installer_type = Some(installer_type);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Build a record for a freshly analyzed artifact.
    pub fn from_detection(installer_url: impl Into<String>, detection: &DetectionResult) -> Self {
        Self {
            architecture: detection.architecture,
            installer_type: detection.installer_type,
            scope: detection.scope,
            installer_url: installer_url.into(),
            signature_sha256: detection.signature_sha256.clone(),
            product_code: detection.product_code.clone(),
            upgrade_behavior: detection.upgrade_behavior,
            nested_installer_type: detection.nested_installer_type,
            nested_installer_files: detection.nested_installer_files.clone(),
            ..Self::default()
        }
    }

    /// Carry user-maintained fields over from a previous record.
    ///
    /// Detected facts win; switches, success codes and an unresolved scope
    /// are inherited.
    pub fn inherit_from(&mut self, previous: &InstallerRecord) {
        if self.installer_switches.is_none() {
            self.installer_switches = previous.installer_switches.clone();
        }
        if self.installer_success_codes.is_empty() {
            self.installer_success_codes = previous.installer_success_codes.clone();
        }
        if self.scope.is_none() {
            self.scope = previous.scope;
        }
        if self.installer_type.is_none() {
            self.installer_type = previous.installer_type;
        }
    }

    /// File extension of the installer URL, lowercased.
    pub fn url_extension(&self) -> Option<String> {
        hints::url_extension(&self.installer_url)
    }
}
