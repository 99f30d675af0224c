//! Common test utilities and helpers.
//!
//! Builders for synthetic installer artifacts shared by the integration tests.

pub mod test_utils;

use installer_insight::triage::msix::{APPX_MANIFEST, APPX_SIGNATURE, BUNDLE_MANIFEST};
use installer_insight::triage::signatures::{INNO_SIGNATURE, NSIS_SIGNATURE};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Minimal PE image whose COFF machine field is `machine`.
pub fn pe_image(machine: u16) -> Vec<u8> {
    let mut data = vec![0u8; 0x200];
    data[0..2].copy_from_slice(b"MZ");
    data[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());
    data[0x80..0x84].copy_from_slice(b"PE\0\0");
    data[0x84..0x86].copy_from_slice(&machine.to_le_bytes());
    data
}

/// Nullsoft prefix followed by filler.
pub fn nsis_image() -> Vec<u8> {
    let mut data = NSIS_SIGNATURE.to_vec();
    data.resize(4096, 0xCC);
    data
}

/// Inno Setup prefix followed by filler.
pub fn inno_image() -> Vec<u8> {
    let mut data = INNO_SIGNATURE.to_vec();
    data.resize(4096, 0xCC);
    data
}

/// A PE image with the Burn marker at `offset`.
pub fn burn_image(offset: usize) -> Vec<u8> {
    let mut data = pe_image(0x14c);
    data.resize(offset + 64, 0);
    data[offset..offset + 8].copy_from_slice(b".wixburn");
    data
}

/// Zip archive bytes holding the given entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A package manifest for `name` targeting `arch`.
pub fn appx_manifest(name: &str, arch: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10">
  <Identity Name="{name}" Publisher="CN=Example Publisher" Version="2.4.0.0" ProcessorArchitecture="{arch}" />
  <Properties>
    <DisplayName>{name} App</DisplayName>
    <PublisherDisplayName>Example</PublisherDisplayName>
  </Properties>
  <Dependencies>
    <TargetDeviceFamily Name="Windows.Desktop" MinVersion="10.0.17763.0" MaxVersionTested="10.0.22621.0" />
  </Dependencies>
</Package>"#
    )
}

/// A signed package archive.
pub fn msix_bytes(name: &str, arch: &str) -> Vec<u8> {
    let manifest = appx_manifest(name, arch);
    zip_bytes(&[
        (APPX_MANIFEST, manifest.as_bytes()),
        (APPX_SIGNATURE, b"PKCX-signature"),
    ])
}

/// A bundle with one x64 and one arm64 package, the latter without targeting data.
pub fn bundle_bytes() -> Vec<u8> {
    let manifest = r#"<?xml version="1.0" encoding="UTF-8"?>
<Bundle xmlns="http://schemas.microsoft.com/appx/2013/bundle"
        xmlns:b4="http://schemas.microsoft.com/appx/2018/bundle">
  <Identity Name="Example.App" Publisher="CN=Example Publisher" Version="2.4.0.0" />
  <Packages>
    <Package Type="application" Version="2.4.0.0" Architecture="x64" FileName="App_x64.msix">
      <b4:Dependencies>
        <b4:TargetDeviceFamily Name="Windows.Desktop" MinVersion="10.0.19041.0" />
      </b4:Dependencies>
    </Package>
    <Package Type="application" Version="2.4.0.0" Architecture="arm64" FileName="App_arm64.msix" />
  </Packages>
</Bundle>"#;
    let arm = msix_bytes("Example.App", "arm64");
    zip_bytes(&[
        (BUNDLE_MANIFEST, manifest.as_bytes()),
        ("App_arm64.msix", &arm),
        (APPX_SIGNATURE, b"PKCX-bundle"),
    ])
}

/// OLE-looking bytes carrying a summary stream and a `Property` string pool run.
pub fn msi_scan_image(template: &str, wix: bool) -> Vec<u8> {
    fn lpstr(buf: &mut Vec<u8>, text: &str) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        buf.extend_from_slice(&0x1Eu32.to_le_bytes());
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        let padded = bytes.len().div_ceil(4) * 4;
        bytes.resize(padded, 0);
        buf.extend_from_slice(&bytes);
    }

    let mut data = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    data.resize(512, 0);
    lpstr(&mut data, "Installation Database");
    lpstr(&mut data, "Example Tool");
    lpstr(&mut data, "Example Corp");
    lpstr(&mut data, "Installer,MSI");
    lpstr(
        &mut data,
        if wix {
            "Windows Installer XML Toolset"
        } else {
            "Authored by hand"
        },
    );
    lpstr(&mut data, template);
    data.resize(data.len() + 256, 0);
    data.extend_from_slice(template.as_bytes());
    data.extend_from_slice(
        b"ManufacturerExample Corp\
ProductCode{6F330B47-2577-43AD-9095-1861BA25889B}\
ProductLanguage1033\
ProductNameExample Tool\
ProductVersion3.1.4UpgradeCode\
{1D8E6291-B0D5-35EC-8441-6616F567A0F7}",
    );
    data.resize(data.len() + 1024, 0);
    data
}
