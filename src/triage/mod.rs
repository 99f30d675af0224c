//! Detection pipeline for downloaded installer artifacts.
//!
//! Each stage reads the artifact through bounded I/O and degrades to
//! "unknown" rather than failing; [`api::ArtifactClassifier`] composes them.

pub mod api;
pub mod config;
pub mod containers;
pub mod headers;
pub mod hints;
pub mod io;
pub mod msi;
pub mod msix;
pub mod prompt;
pub mod signatures;
pub mod sniffers;

pub use api::ArtifactClassifier;
pub use config::AnalysisConfig;
pub use containers::{analyze_zip, ZipAnalysis};
pub use msi::{inspect_msi, MsiCapability};
pub use msix::{inspect_msix, inspect_msix_bundle};
pub use prompt::{ChoiceProvider, NestedFamilyChoice, NonInteractive, ScriptedChoices};
