//! Extension and content sniffers for initial artifact classification.
//!
//! The declared extension is authoritative when it names a known container;
//! otherwise `infer` classifies the content prefix.

use std::path::Path;
use tracing::{debug, info};

/// Coarse artifact kind used to dispatch to a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Msi,
    Msix,
    Appx,
    MsixBundle,
    AppxBundle,
    Zip,
    Exe,
    Unknown,
}

/// Extensions a nested installer inside a zip may carry.
pub const INSTALLER_EXTENSIONS: &[&str] =
    &["msix", "appx", "msi", "exe", "zip", "msixbundle", "appxbundle"];

impl ArtifactKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "msi" => ArtifactKind::Msi,
            "msix" => ArtifactKind::Msix,
            "appx" => ArtifactKind::Appx,
            "msixbundle" => ArtifactKind::MsixBundle,
            "appxbundle" => ArtifactKind::AppxBundle,
            "zip" => ArtifactKind::Zip,
            "exe" => ArtifactKind::Exe,
            _ => ArtifactKind::Unknown,
        }
    }

    /// Kinds backed by a zip container.
    pub fn is_zip_container(&self) -> bool {
        matches!(
            self,
            ArtifactKind::Msix
                | ArtifactKind::Appx
                | ArtifactKind::MsixBundle
                | ArtifactKind::AppxBundle
                | ArtifactKind::Zip
        )
    }
}

/// Sniffer for the declared file extension.
pub struct ExtensionSniffer;

impl ExtensionSniffer {
    /// Lowercased extension of a path.
    pub fn extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn sniff_path(path: &Path) -> ArtifactKind {
        Self::extension(path)
            .map(|e| ArtifactKind::from_extension(&e))
            .unwrap_or(ArtifactKind::Unknown)
    }
}

/// Sniffer for content-based type detection using `infer`.
pub struct ContentSniffer;

impl ContentSniffer {
    pub fn sniff_bytes(data: &[u8]) -> ArtifactKind {
        let Some(kind) = infer::get(data) else {
            debug!("No content type detected from {} bytes", data.len());
            return ArtifactKind::Unknown;
        };
        info!(
            "Content detected as {} ({})",
            kind.mime_type(),
            kind.extension()
        );
        match kind.extension() {
            "zip" => ArtifactKind::Zip,
            "msi" => ArtifactKind::Msi,
            "exe" | "dll" => ArtifactKind::Exe,
            _ => ArtifactKind::Unknown,
        }
    }
}

/// Combined sniffer: extension first, content as the fallback.
pub struct CombinedSniffer;

impl CombinedSniffer {
    pub fn sniff(prefix: &[u8], path: &Path) -> ArtifactKind {
        match ExtensionSniffer::sniff_path(path) {
            ArtifactKind::Unknown => ContentSniffer::sniff_bytes(prefix),
            declared => {
                let content = ContentSniffer::sniff_bytes(prefix);
                if content != ArtifactKind::Unknown && !Self::compatible(declared, content) {
                    debug!(?declared, ?content, "Declared extension disagrees with content");
                }
                declared
            }
        }
    }

    fn compatible(declared: ArtifactKind, content: ArtifactKind) -> bool {
        declared == content || (declared.is_zip_container() && content == ArtifactKind::Zip)
    }
}
