//! Configuration for the analysis pipeline.
//!
//! Provides centralized configuration for all detection components with
//! sensible defaults. Every section is `#[serde(default)]`, so a JSON file
//! only needs to name the values it overrides.

use crate::error::{InsightError, Result};
use crate::triage::io::{IOLimits, DEFAULT_SCAN_CHUNK, DEFAULT_SCAN_OVERLAP, MAX_SNIFF_SIZE};
use crate::triage::signatures::{BURN_MAX_WINDOWS, BURN_WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// I/O configuration for file reading and chunked scans.
    pub io: IOConfig,
    /// Engine signature scanning.
    pub signatures: SignatureConfig,
    /// MSI inspection.
    pub msi: MsiConfig,
    /// Zip and bundle inspection.
    pub archive: ArchiveConfig,
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings that would make a scan read nothing.
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("io.scan_chunk_size", self.io.scan_chunk_size == 0),
            ("io.sniff_size", self.io.sniff_size == 0),
            ("signatures.burn_window_size", self.signatures.burn_window_size == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((name, _)) => Err(InsightError::InvalidInput(format!("{name} must be non-zero"))),
            None => Ok(()),
        }
    }
}

/// I/O configuration for file reading and buffering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum artifact size to open (default: 4GB).
    pub max_file_size: u64,
    /// Maximum bytes read from one artifact (default: 4GB).
    pub max_read_bytes: u64,
    /// Prefix size used for content sniffing (default: 4096).
    pub sniff_size: u64,
    /// Chunk size for streaming scans (default: 1MB).
    pub scan_chunk_size: usize,
    /// Bytes carried from one chunk into the next (default: 64KB).
    pub scan_overlap: usize,
}

impl Default for IOConfig {
    fn default() -> Self {
        let limits = IOLimits::default();
        Self {
            max_file_size: limits.max_file_size,
            max_read_bytes: limits.max_read_bytes,
            sniff_size: MAX_SNIFF_SIZE,
            scan_chunk_size: DEFAULT_SCAN_CHUNK,
            scan_overlap: DEFAULT_SCAN_OVERLAP,
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_read_bytes: self.max_read_bytes,
            max_file_size: self.max_file_size,
        }
    }
}

/// Engine signature configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Width of one Burn scan window (default: 8).
    pub burn_window_size: usize,
    /// Windows examined before the Burn scan gives up (default: 65535).
    pub burn_max_windows: u32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            burn_window_size: BURN_WINDOW_SIZE,
            burn_max_windows: BURN_MAX_WINDOWS,
        }
    }
}

/// Which MSI backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsiBackendPreference {
    /// Pick the best backend the build supports.
    #[default]
    Auto,
    /// Compound-file reader; falls back to the scan when not compiled in.
    Library,
    /// Heuristic byte scan only.
    ByteScan,
}

/// MSI inspection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsiConfig {
    pub backend: MsiBackendPreference,
    /// Bytes after the summary marker searched for a WiX mention (default: 512).
    pub wix_marker_window: usize,
}

impl Default for MsiConfig {
    fn default() -> Self {
        Self {
            backend: MsiBackendPreference::Auto,
            wix_marker_window: 512,
        }
    }
}

/// Zip and bundle inspection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Largest candidate set offered for selection (default: 20).
    pub max_selectable_entries: usize,
    /// Longest accepted portable command alias (default: 40).
    pub max_command_alias_len: usize,
    /// Largest nested package read into memory from a bundle (default: 512MB).
    pub max_nested_package_size: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_selectable_entries: 20,
            max_command_alias_len: 40,
            max_nested_package_size: 512 * 1024 * 1024,
        }
    }
}
