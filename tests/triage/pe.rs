//! Integration tests for PE architecture detection.

use installer_insight::triage::headers::pe_architecture;
use installer_insight::triage::io::IOLimits;
use installer_insight::Architecture;

use crate::common::pe_image;
use crate::common::test_utils::create_temp_file;

fn arch_of(data: &[u8]) -> Architecture {
    let file = create_temp_file(data);
    pe_architecture(file.path(), &IOLimits::default())
}

#[test]
fn test_machine_values() {
    let cases = [
        (0x8664, Architecture::X64),
        (0x014c, Architecture::X86),
        (0xaa64, Architecture::Arm64),
        (0x01c0, Architecture::Arm),
        (0x01c4, Architecture::Arm),
        (0x0200, Architecture::Neutral),
    ];
    for (machine, expected) in cases {
        assert_eq!(arch_of(&pe_image(machine)), expected, "machine {machine:#06x}");
    }
}

#[test]
fn test_garbled_header_is_neutral() {
    assert_eq!(arch_of(b"MZ"), Architecture::Neutral);
    assert_eq!(arch_of(&[]), Architecture::Neutral);

    let mut data = pe_image(0x8664);
    data[0x3C..0x40].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
    assert_eq!(arch_of(&data), Architecture::Neutral);
}
