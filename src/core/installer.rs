//! Installer vocabulary shared by detection, reconciliation and manifests.
//!
//! The enums are plain tags; their manifest spelling lives in the
//! `as_str` lookup functions rather than in per-variant behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The installer technology of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallerType {
    /// MSIX package
    Msix,
    /// Windows Installer database
    Msi,
    /// APPX package
    Appx,
    /// Executable with no recognised installer engine
    Exe,
    /// Zip archive carrying one or more nested installers
    Zip,
    /// Inno Setup
    Inno,
    /// Nullsoft Scriptable Install System
    Nullsoft,
    /// WiX-authored MSI
    Wix,
    /// WiX Burn bootstrapper
    Burn,
    /// Progressive web app
    Pwa,
    /// Standalone executable that is not installed
    Portable,
}

impl InstallerType {
    /// Every installer type, in manifest schema order.
    pub const ALL: [InstallerType; 11] = [
        InstallerType::Msix,
        InstallerType::Msi,
        InstallerType::Appx,
        InstallerType::Exe,
        InstallerType::Zip,
        InstallerType::Inno,
        InstallerType::Nullsoft,
        InstallerType::Wix,
        InstallerType::Burn,
        InstallerType::Pwa,
        InstallerType::Portable,
    ];

    /// Manifest spelling of the installer type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallerType::Msix => "msix",
            InstallerType::Msi => "msi",
            InstallerType::Appx => "appx",
            InstallerType::Exe => "exe",
            InstallerType::Zip => "zip",
            InstallerType::Inno => "inno",
            InstallerType::Nullsoft => "nullsoft",
            InstallerType::Wix => "wix",
            InstallerType::Burn => "burn",
            InstallerType::Pwa => "pwa",
            InstallerType::Portable => "portable",
        }
    }

    /// Human-readable name used in prompts and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            InstallerType::Msix => "MSIX",
            InstallerType::Msi => "MSI",
            InstallerType::Appx => "APPX",
            InstallerType::Exe => "EXE",
            InstallerType::Zip => "ZIP",
            InstallerType::Inno => "Inno Setup",
            InstallerType::Nullsoft => "Nullsoft",
            InstallerType::Wix => "WiX",
            InstallerType::Burn => "WiX Burn",
            InstallerType::Pwa => "Progressive Web App",
            InstallerType::Portable => "Portable",
        }
    }

    /// Parse the manifest spelling (case-insensitive).
    pub fn from_manifest_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }

    /// Types that may appear as the nested installer of a zip.
    pub fn is_nestable(&self) -> bool {
        !matches!(self, InstallerType::Zip | InstallerType::Pwa)
    }
}

impl fmt::Display for InstallerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The CPU architecture an installer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// 32-bit x86
    X86,
    /// 64-bit x86
    #[default]
    X64,
    /// 32-bit ARM
    Arm,
    /// 64-bit ARM
    Arm64,
    /// Architecture independent
    Neutral,
}

impl Architecture {
    /// Manifest spelling of the architecture.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::Neutral => "neutral",
        }
    }

    /// Map a PE `IMAGE_FILE_HEADER.Machine` value.
    ///
    /// Anything unrecognised is `Neutral`, never an error.
    pub fn from_pe_machine(machine: u16) -> Self {
        match machine {
            0x8664 => Architecture::X64, // IMAGE_FILE_MACHINE_AMD64
            0x014C => Architecture::X86, // IMAGE_FILE_MACHINE_I386
            0xAA64 => Architecture::Arm64, // IMAGE_FILE_MACHINE_ARM64
            0x01C0 | 0x01C4 => Architecture::Arm, // IMAGE_FILE_MACHINE_ARM / ARMNT
            _ => Architecture::Neutral,
        }
    }

    /// Map the platform token of an MSI summary-information template
    /// (`x64;1033`, `Intel;1033`, `Arm64;1033`).
    pub fn from_msi_platform(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "x64" | "intel64" | "amd64" => Some(Architecture::X64),
            "intel" => Some(Architecture::X86),
            "arm64" => Some(Architecture::Arm64),
            "arm" => Some(Architecture::Arm),
            _ => None,
        }
    }

    /// Map an APPX/MSIX `ProcessorArchitecture` attribute.
    pub fn from_appx(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x86" => Some(Architecture::X86),
            "x64" => Some(Architecture::X64),
            "arm" => Some(Architecture::Arm),
            "arm64" => Some(Architecture::Arm64),
            "neutral" => Some(Architecture::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an installer installs per-user or per-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Machine,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Machine => "machine",
        }
    }

    /// Map the MSI `ALLUSERS` property.
    ///
    /// `"2"` means the scope depends on the installing user's privileges
    /// and is deliberately left unresolved.
    pub fn from_all_users(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Scope::Machine),
            "" => Some(Scope::User),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a new version should be applied over an installed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeBehavior {
    Install,
    UninstallPrevious,
}

impl UpgradeBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeBehavior::Install => "install",
            UpgradeBehavior::UninstallPrevious => "uninstallPrevious",
        }
    }
}
