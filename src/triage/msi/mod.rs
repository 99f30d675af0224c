//! MSI (Windows Installer database) inspection.
//!
//! Two backends sit behind the [`MsiInspector`] seam: a compound-file reader
//! that queries the `Property` table and summary information, and a
//! heuristic byte scan for builds without that reader. The backend is picked
//! once from an [`MsiCapability`] probe and the configured preference.

#[cfg(feature = "msi-library")]
pub mod library;
pub mod scan;

use crate::core::detection::MsiInfo;
use crate::core::installer::{Architecture, Scope};
use crate::error::Result;
use crate::triage::config::{AnalysisConfig, MsiBackendPreference};
use std::path::Path;
use tracing::{debug, info, warn};

/// Properties read from the `Property` table.
pub const PROPERTY_NAMES: &[&str] = &[
    "UpgradeCode",
    "ProductCode",
    "ProductName",
    "ProductVersion",
    "Manufacturer",
    "ProductLanguage",
    "WixUI_Mode",
    "ALLUSERS",
];

/// A source of MSI product metadata.
pub trait MsiInspector {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Read whatever metadata the backend can ground.
    fn inspect(&self, path: &Path) -> Result<MsiInfo>;
}

/// What this build can do with an MSI database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsiCapability {
    /// A compound-file reader is compiled in.
    Library,
    /// Only the byte scan is available.
    ByteScanOnly,
}

impl MsiCapability {
    pub fn probe() -> Self {
        if cfg!(feature = "msi-library") {
            MsiCapability::Library
        } else {
            MsiCapability::ByteScanOnly
        }
    }
}

/// Choose the primary backend for a capability and preference.
pub fn select_inspector(
    capability: MsiCapability,
    config: &AnalysisConfig,
) -> Box<dyn MsiInspector> {
    match (capability, config.msi.backend) {
        #[cfg(feature = "msi-library")]
        (MsiCapability::Library, MsiBackendPreference::Auto | MsiBackendPreference::Library) => {
            Box::new(library::LibraryInspector)
        }
        (_, MsiBackendPreference::Library) => {
            warn!("MSI library backend requested but not available; using byte scan");
            Box::new(scan::ByteScanInspector::new(config))
        }
        _ => Box::new(scan::ByteScanInspector::new(config)),
    }
}

/// Inspect an MSI database, never failing.
///
/// If the primary backend errors, the byte scan gets a chance; if that also
/// fails the result is an empty [`MsiInfo`].
pub fn inspect_msi(path: &Path, capability: MsiCapability, config: &AnalysisConfig) -> MsiInfo {
    let primary = select_inspector(capability, config);
    match primary.inspect(path) {
        Ok(msi) => {
            info!(backend = primary.name(), product = ?msi.product_name, "MSI inspected");
            return msi;
        }
        Err(e) => warn!(backend = primary.name(), error = %e, "MSI backend failed"),
    }

    if primary.name() == scan::ByteScanInspector::NAME {
        return MsiInfo::default();
    }
    match scan::ByteScanInspector::new(config).inspect(path) {
        Ok(msi) => {
            debug!("MSI metadata recovered by byte scan");
            msi
        }
        Err(e) => {
            warn!(error = %e, "MSI byte scan failed");
            MsiInfo::default()
        }
    }
}

/// Platform of a summary-information template such as `x64;1033`.
pub fn architecture_from_template(template: &str) -> Option<Architecture> {
    template.split(';').next().and_then(Architecture::from_msi_platform)
}

/// Apply one `Property` table row to the collected info.
pub(crate) fn apply_property(info: &mut MsiInfo, name: &str, value: &str) {
    let owned = || Some(value.to_string());
    match name {
        "UpgradeCode" => info.upgrade_code = owned(),
        "ProductCode" => info.product_code = owned(),
        "ProductName" => info.product_name = owned(),
        "ProductVersion" => info.product_version = owned(),
        "Manufacturer" => info.manufacturer = owned(),
        "ProductLanguage" => info.product_language = owned(),
        "WixUI_Mode" => info.is_wix = true,
        "ALLUSERS" => info.scope = Scope::from_all_users(value),
        _ => {}
    }
}

/// True when a creating-application or comment string names the WiX toolset.
pub(crate) fn mentions_wix(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("wix") || lower.contains("windows installer xml")
}
