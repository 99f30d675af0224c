//! MSIX/APPX package and bundle inspection.
//!
//! Packages are zip containers holding an `AppxManifest.xml`; bundles hold
//! an `AppxMetadata/AppxBundleManifest.xml` listing their sub-packages.

use crate::core::detection::MsixInfo;
use crate::core::installer::Architecture;
use crate::error::{InsightError, Result};
use crate::triage::config::AnalysisConfig;
use crate::triage::io::{IOLimits, SafeFileReader};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

pub const APPX_MANIFEST: &str = "AppxManifest.xml";
pub const BUNDLE_MANIFEST: &str = "AppxMetadata/AppxBundleManifest.xml";
pub const APPX_SIGNATURE: &str = "AppxSignature.p7x";

const MAX_MANIFEST_SIZE: u64 = 16 * 1024 * 1024;
const CROCKFORD: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// What kind of package a zip container holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageLayout {
    Package,
    Bundle,
    PlainZip,
}

/// Decide from the entry list whether a zip is a package, a bundle or neither.
pub fn package_layout<R: Read + Seek>(archive: &ZipArchive<R>) -> PackageLayout {
    if archive.index_for_name(APPX_MANIFEST).is_some() {
        PackageLayout::Package
    } else if archive.index_for_name(BUNDLE_MANIFEST).is_some() {
        PackageLayout::Bundle
    } else {
        PackageLayout::PlainZip
    }
}

/// Open a zip artifact through the bounded file reader.
pub(crate) fn open_archive(path: &Path, limits: &IOLimits) -> Result<ZipArchive<BufReader<File>>> {
    // Enforce the size limit before handing the handle to the zip reader.
    SafeFileReader::open(path, limits.clone())?;
    let file = File::open(path)?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Read a whole entry, refusing entries larger than `limit`.
pub(crate) fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    limit: u64,
) -> Result<Vec<u8>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(InsightError::MissingEntry(name.to_string())),
        Err(e) => return Err(e.into()),
    };
    if entry.size() > limit {
        return Err(InsightError::ResourceExhausted {
            resource: name.to_string(),
            used: entry.size(),
            limit,
        });
    }
    let mut data = Vec::with_capacity(entry.size() as usize);
    (&mut entry).take(limit).read_to_end(&mut data)?;
    Ok(data)
}

/// SHA-256 of the package signature blob, if the package is signed.
pub fn signature_sha256<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Option<String> {
    match read_entry(archive, APPX_SIGNATURE, MAX_MANIFEST_SIZE) {
        Ok(blob) => Some(hex::encode(Sha256::digest(&blob))),
        Err(InsightError::MissingEntry(_)) => None,
        Err(e) => {
            warn!(error = %e, "Package signature unreadable");
            None
        }
    }
}

/// Package family name: `<Name>_<publisher id>`.
///
/// The publisher id is the first 8 bytes of SHA-256 over the UTF-16LE
/// publisher, padded with one zero bit and written as 13 Crockford base32
/// characters.
pub fn package_family_name(name: &str, publisher: &str) -> String {
    let utf16: Vec<u8> = publisher
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    let digest = Sha256::digest(&utf16);
    let mut first = [0u8; 8];
    first.copy_from_slice(&digest[..8]);
    let bits = u128::from(u64::from_be_bytes(first)) << 1;
    let id: String = (0..13)
        .map(|i| CROCKFORD[((bits >> (60 - 5 * i)) & 0x1F) as usize] as char)
        .collect();
    format!("{name}_{id}")
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        out.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(out)
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn apply_device_family(info: &mut MsixInfo, attrs: &[(String, String)]) {
    let name = attr(attrs, "Name");
    // Prefer the desktop family when a package targets several.
    let replace = info.target_device_family.is_none()
        || (name == Some("Windows.Desktop")
            && info.target_device_family.as_deref() != Some("Windows.Desktop"));
    if replace {
        info.target_device_family = name.map(str::to_string);
        info.min_version = attr(attrs, "MinVersion").map(str::to_string);
    }
}

/// Parse an `AppxManifest.xml` document.
pub fn parse_appx_manifest(xml: &str) -> Result<MsixInfo> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut info = MsixInfo::default();
    let mut in_properties = false;
    let mut text_target: Option<&'static str> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Identity" => read_identity(&mut info, &attributes(&e)?),
                b"TargetDeviceFamily" => apply_device_family(&mut info, &attributes(&e)?),
                b"Properties" => in_properties = true,
                b"DisplayName" if in_properties => text_target = Some("DisplayName"),
                b"PublisherDisplayName" if in_properties => {
                    text_target = Some("PublisherDisplayName")
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Identity" => read_identity(&mut info, &attributes(&e)?),
                b"TargetDeviceFamily" => apply_device_family(&mut info, &attributes(&e)?),
                _ => {}
            },
            Event::Text(t) => {
                let value = t.unescape()?.trim().to_string();
                match text_target {
                    Some("DisplayName") => info.display_name = Some(value),
                    Some("PublisherDisplayName") => info.publisher_display_name = Some(value),
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"Properties" {
                    in_properties = false;
                }
                text_target = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let (Some(name), Some(publisher)) = (&info.name, &info.publisher) {
        info.package_family_name = Some(package_family_name(name, publisher));
    }
    Ok(info)
}

fn read_identity(info: &mut MsixInfo, attrs: &[(String, String)]) {
    info.name = attr(attrs, "Name").map(str::to_string);
    info.publisher = attr(attrs, "Publisher").map(str::to_string);
    info.version = attr(attrs, "Version").map(str::to_string);
    info.architecture = attr(attrs, "ProcessorArchitecture")
        .and_then(Architecture::from_appx)
        .or(Some(Architecture::Neutral));
}

/// Inspect a package held in any seekable reader.
pub fn inspect_msix_reader<R: Read + Seek>(reader: R) -> Result<MsixInfo> {
    let mut archive = ZipArchive::new(reader)?;
    inspect_package_archive(&mut archive)
}

fn inspect_package_archive<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<MsixInfo> {
    let manifest = read_entry(archive, APPX_MANIFEST, MAX_MANIFEST_SIZE)?;
    let mut info = parse_appx_manifest(&String::from_utf8_lossy(&manifest))?;
    info.signature_sha256 = signature_sha256(archive);
    Ok(info)
}

/// Inspect an MSIX or APPX package file.
pub fn inspect_msix(path: &Path, config: &AnalysisConfig) -> Result<MsixInfo> {
    let mut archive = open_archive(path, &config.io.limits())?;
    let info = inspect_package_archive(&mut archive)?;
    info!(
        name = ?info.name,
        version = ?info.version,
        architecture = ?info.architecture,
        "Package inspected"
    );
    Ok(info)
}

/// Parse an `AppxBundleManifest.xml` into one entry per application package.
pub fn parse_bundle_manifest(xml: &str) -> Result<Vec<MsixInfo>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut bundle_name = None;
    let mut bundle_publisher = None;
    let mut packages = Vec::new();
    let mut current: Option<MsixInfo> = None;

    let start_package = |attrs: &[(String, String)]| -> Option<MsixInfo> {
        if attr(attrs, "Type").is_some_and(|t| !t.eq_ignore_ascii_case("application")) {
            return None;
        }
        Some(MsixInfo {
            version: attr(attrs, "Version").map(str::to_string),
            architecture: attr(attrs, "Architecture")
                .and_then(Architecture::from_appx)
                .or(Some(Architecture::Neutral)),
            file_name: attr(attrs, "FileName").map(str::to_string),
            ..MsixInfo::default()
        })
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Identity" if current.is_none() => {
                    let attrs = attributes(&e)?;
                    bundle_name = attr(&attrs, "Name").map(str::to_string);
                    bundle_publisher = attr(&attrs, "Publisher").map(str::to_string);
                }
                b"Package" => current = start_package(&attributes(&e)?),
                b"TargetDeviceFamily" => {
                    if let Some(pkg) = current.as_mut() {
                        apply_device_family(pkg, &attributes(&e)?);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Identity" if current.is_none() => {
                    let attrs = attributes(&e)?;
                    bundle_name = attr(&attrs, "Name").map(str::to_string);
                    bundle_publisher = attr(&attrs, "Publisher").map(str::to_string);
                }
                b"Package" => {
                    if let Some(pkg) = start_package(&attributes(&e)?) {
                        packages.push(pkg);
                    }
                }
                b"TargetDeviceFamily" => {
                    if let Some(pkg) = current.as_mut() {
                        apply_device_family(pkg, &attributes(&e)?);
                    }
                }
                _ => {}
            },
            Event::End(e) => {
                if e.local_name().as_ref() == b"Package" {
                    if let Some(pkg) = current.take() {
                        packages.push(pkg);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    for pkg in &mut packages {
        pkg.name = bundle_name.clone();
        pkg.publisher = bundle_publisher.clone();
        if let (Some(name), Some(publisher)) = (&pkg.name, &pkg.publisher) {
            pkg.package_family_name = Some(package_family_name(name, publisher));
        }
    }
    Ok(packages)
}

/// Inspect an MSIX or APPX bundle, one entry per application package.
///
/// Fields the bundle manifest omits are filled from each sub-package's own
/// manifest. Every entry carries the bundle's signature hash.
pub fn inspect_msix_bundle(path: &Path, config: &AnalysisConfig) -> Result<Vec<MsixInfo>> {
    let mut archive = open_archive(path, &config.io.limits())?;
    inspect_bundle_archive(&mut archive, config)
}

pub(crate) fn inspect_bundle_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    config: &AnalysisConfig,
) -> Result<Vec<MsixInfo>> {
    let manifest = read_entry(archive, BUNDLE_MANIFEST, MAX_MANIFEST_SIZE)?;
    let mut packages = parse_bundle_manifest(&String::from_utf8_lossy(&manifest))?;
    let signature = signature_sha256(archive);

    for pkg in &mut packages {
        pkg.signature_sha256 = signature.clone();
        if pkg.min_version.is_some() && pkg.target_device_family.is_some() {
            continue;
        }
        let Some(file_name) = pkg.file_name.clone() else {
            continue;
        };
        let nested = read_entry(archive, &file_name, config.archive.max_nested_package_size)
            .and_then(|bytes| inspect_msix_reader(Cursor::new(bytes)));
        match nested {
            Ok(inner) => {
                debug!(file = %file_name, "Filled bundle entry from nested manifest");
                pkg.min_version = pkg.min_version.take().or(inner.min_version);
                pkg.target_device_family =
                    pkg.target_device_family.take().or(inner.target_device_family);
                pkg.display_name = pkg.display_name.take().or(inner.display_name);
                pkg.publisher_display_name =
                    pkg.publisher_display_name.take().or(inner.publisher_display_name);
            }
            Err(e) => warn!(file = %file_name, error = %e, "Nested package unreadable"),
        }
    }

    info!(packages = packages.len(), "Bundle inspected");
    Ok(packages)
}
