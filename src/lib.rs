//! Installer artifact analysis and reconciliation.
//!
//! Classifies downloaded installers (engine signatures, PE architecture,
//! MSI/MSIX metadata, zip bundles), maps a previous release's installer list
//! onto freshly analyzed candidates, and orders free-form version strings.

/// Core data types module
pub mod core;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod triage;
pub mod version;

pub use crate::core::{
    Architecture, DetectionResult, InstallerRecord, InstallerType, Scope, UpgradeBehavior,
};
pub use crate::error::{InsightError, Result};
pub use crate::triage::{AnalysisConfig, ArtifactClassifier};
