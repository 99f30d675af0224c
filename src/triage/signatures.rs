//! Installer engine signatures.
//!
//! Nullsoft and Inno Setup installers start with a tool-specific byte prefix
//! that is compared exactly at offset 0. WiX Burn bootstrappers carry a
//! `.wixburn` section whose name is found by a bounded, window-aligned scan.

use crate::core::installer::InstallerType;
use crate::triage::config::SignatureConfig;
use crate::triage::io::{read_full, IOLimits, SafeFileReader};
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Leading 224 bytes shared by Nullsoft installers: the exehead DOS header,
/// stub, Rich header and the start of its i386 PE header (five sections).
pub const NSIS_SIGNATURE: [u8; 224] = [
    0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00,
    0xB8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xD8, 0x00, 0x00, 0x00,
    0x0E, 0x1F, 0xBA, 0x0E, 0x00, 0xB4, 0x09, 0xCD, 0x21, 0xB8, 0x01, 0x4C, 0xCD, 0x21, 0x54, 0x68,
    0x69, 0x73, 0x20, 0x70, 0x72, 0x6F, 0x67, 0x72, 0x61, 0x6D, 0x20, 0x63, 0x61, 0x6E, 0x6E, 0x6F,
    0x74, 0x20, 0x62, 0x65, 0x20, 0x72, 0x75, 0x6E, 0x20, 0x69, 0x6E, 0x20, 0x44, 0x4F, 0x53, 0x20,
    0x6D, 0x6F, 0x64, 0x65, 0x2E, 0x0D, 0x0D, 0x0A, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xAD, 0xE1, 0xF1, 0xCD, 0xE9, 0x80, 0x9F, 0x9E, 0xE9, 0x80, 0x9F, 0x9E, 0xE9, 0x80, 0x9F, 0x9E,
    0x2A, 0x8F, 0xC0, 0x9E, 0xEB, 0x80, 0x9F, 0x9E, 0xE9, 0x80, 0x9E, 0x9E, 0x4C, 0x80, 0x9F, 0x9E,
    0x2A, 0x8F, 0xC2, 0x9E, 0xE6, 0x80, 0x9F, 0x9E, 0x3D, 0xA3, 0xAF, 0x9E, 0xE3, 0x80, 0x9F, 0x9E,
    0x2E, 0x86, 0x99, 0x9E, 0xE8, 0x80, 0x9F, 0x9E, 0x52, 0x69, 0x63, 0x68, 0xE9, 0x80, 0x9F, 0x9E,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x50, 0x45, 0x00, 0x00, 0x4C, 0x01, 0x05, 0x00,
];

/// Leading 264 bytes shared by Inno Setup installers: the Delphi-linked loader
/// DOS header (with the `InUn` mode marker at 0x30), Borland stub and the start
/// of its i386 PE header (ten sections).
pub const INNO_SIGNATURE: [u8; 264] = [
    0x4D, 0x5A, 0x50, 0x00, 0x02, 0x00, 0x00, 0x00, 0x04, 0x00, 0x0F, 0x00, 0xFF, 0xFF, 0x00, 0x00,
    0xB8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x1A, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x6E, 0x55, 0x6E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0xBA, 0x10, 0x00, 0x0E, 0x1F, 0xB4, 0x09, 0xCD, 0x21, 0xB8, 0x01, 0x4C, 0xCD, 0x21, 0x90, 0x90,
    0x54, 0x68, 0x69, 0x73, 0x20, 0x70, 0x72, 0x6F, 0x67, 0x72, 0x61, 0x6D, 0x20, 0x6D, 0x75, 0x73,
    0x74, 0x20, 0x62, 0x65, 0x20, 0x72, 0x75, 0x6E, 0x20, 0x75, 0x6E, 0x64, 0x65, 0x72, 0x20, 0x57,
    0x69, 0x6E, 0x33, 0x32, 0x0D, 0x0A, 0x24, 0x37, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x50, 0x45, 0x00, 0x00, 0x4C, 0x01, 0x0A, 0x00,
];

/// Section name marking a WiX Burn bootstrapper.
pub const BURN_MARKER: &[u8; 8] = b".wixburn";

/// Width of one Burn scan window in bytes.
pub const BURN_WINDOW_SIZE: usize = 8;

/// Maximum number of windows examined before giving up.
pub const BURN_MAX_WINDOWS: u32 = 65_535;

/// Exact comparison of the leading bytes against the Nullsoft prefix.
pub fn is_nullsoft(prefix: &[u8]) -> bool {
    prefix.len() >= NSIS_SIGNATURE.len() && prefix[..NSIS_SIGNATURE.len()] == NSIS_SIGNATURE
}

/// Exact comparison of the leading bytes against the Inno Setup prefix.
pub fn is_inno(prefix: &[u8]) -> bool {
    prefix.len() >= INNO_SIGNATURE.len() && prefix[..INNO_SIGNATURE.len()] == INNO_SIGNATURE
}

/// Scan fixed-size windows from offset 0 for the Burn marker.
///
/// Only window-aligned occurrences count, and at most `max_windows` windows
/// are read; a marker beyond that bound is reported as absent.
pub fn contains_burn_marker<R: Read>(
    reader: &mut R,
    window_size: usize,
    max_windows: u32,
) -> io::Result<bool> {
    let window_size = window_size.max(1);
    let mut window = vec![0u8; window_size];
    for index in 0..max_windows {
        if read_full(reader, &mut window)? < window_size {
            return Ok(false);
        }
        if window.as_slice() == BURN_MARKER.as_slice() {
            debug!(offset = index as u64 * window_size as u64, "Found Burn marker");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Classify an executable by its engine signature.
///
/// Returns `None` when no signature matches or the file cannot be read;
/// the caller treats that as "ask the user".
pub fn detect_family(path: &Path, limits: &IOLimits, config: &SignatureConfig) -> Option<InstallerType> {
    match try_detect_family(path, limits, config) {
        Ok(found) => found,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Signature detection failed");
            None
        }
    }
}

fn try_detect_family(
    path: &Path,
    limits: &IOLimits,
    config: &SignatureConfig,
) -> io::Result<Option<InstallerType>> {
    let mut reader = SafeFileReader::open(path, limits.clone())?;
    let prefix = reader.read_prefix(INNO_SIGNATURE.len().max(NSIS_SIGNATURE.len()) as u64)?;

    if is_nullsoft(&prefix) {
        return Ok(Some(InstallerType::Nullsoft));
    }
    if is_inno(&prefix) {
        return Ok(Some(InstallerType::Inno));
    }
    let mut stream = reader.stream()?;
    if contains_burn_marker(&mut stream, config.burn_window_size, config.burn_max_windows)? {
        return Ok(Some(InstallerType::Burn));
    }
    Ok(None)
}
