//! Core data types for installer analysis.
//!
//! This module contains the vocabulary shared between the detection
//! pipeline, the reconciliation matcher and manifest code.

pub mod detection;
pub mod installer;
pub mod record;

pub use detection::{DetectionResult, MsiInfo, MsixInfo, NestedInstallerFile};
pub use installer::{Architecture, InstallerType, Scope, UpgradeBehavior};
pub use record::{InstallerRecord, InstallerSwitches};
