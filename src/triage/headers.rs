//! Minimal PE header reading for architecture detection.
//!
//! Only the `e_lfanew` pointer and the COFF `Machine` field are read; the
//! rest of the image is never parsed.

use crate::core::installer::Architecture;
use crate::triage::io::{IOLimits, SafeFileReader};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Offset of `e_lfanew`, the pointer to the PE header.
pub const PE_POINTER_OFFSET: u64 = 0x3C;

/// Length of the `PE\0\0` signature preceding the COFF header.
pub const PE_SIGNATURE_LEN: u64 = 4;

/// Read the COFF `Machine` field of a PE file.
pub fn read_pe_machine(path: &Path, limits: &IOLimits) -> io::Result<u16> {
    let mut reader = SafeFileReader::open(path, limits.clone())?;
    let pe_offset = u32::from_le_bytes(reader.read_array_at::<4>(PE_POINTER_OFFSET)?);
    let machine = u16::from_le_bytes(
        reader.read_array_at::<2>(u64::from(pe_offset) + PE_SIGNATURE_LEN)?,
    );
    debug!(pe_offset, machine = format_args!("{:#06x}", machine), "Read PE machine");
    Ok(machine)
}

/// Resolve the target architecture of a PE file.
///
/// Unknown machine values and any read failure resolve to `Neutral`.
pub fn pe_architecture(path: &Path, limits: &IOLimits) -> Architecture {
    match read_pe_machine(path, limits) {
        Ok(machine) => Architecture::from_pe_machine(machine),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "PE header unreadable");
            Architecture::Neutral
        }
    }
}

/// Same lookup over an in-memory buffer.
pub fn pe_machine_from_bytes(data: &[u8]) -> Option<u16> {
    let ptr = data.get(0x3C..0x40)?;
    let pe_offset = u32::from_le_bytes([ptr[0], ptr[1], ptr[2], ptr[3]]) as usize;
    let start = pe_offset.checked_add(PE_SIGNATURE_LEN as usize)?;
    let machine = data.get(start..start.checked_add(2)?)?;
    Some(u16::from_le_bytes([machine[0], machine[1]]))
}
