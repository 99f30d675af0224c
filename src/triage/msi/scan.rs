//! Heuristic byte-scan MSI backend.
//!
//! Reads no compound-file structure. Instead it streams the file in
//! overlapping chunks and looks for two things:
//!
//! - the summary-information property set, found by its `Installation
//!   Database` title, whose following `VT_LPSTR` properties carry the product
//!   description, manufacturer and platform template;
//! - the string pool run `Manufacturer…ProductCode{GUID}ProductLanguage…
//!   ProductName…ProductVersion…{GUID}` where property names sit next to
//!   their values.
//!
//! Any field the bytes do not ground stays `None`. Scope is never inferred.

use super::{architecture_from_template, mentions_wix, MsiInspector};
use crate::core::detection::MsiInfo;
use crate::core::installer::Architecture;
use crate::error::Result;
use crate::triage::config::AnalysisConfig;
use crate::triage::io::{IOLimits, SafeFileReader};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::path::Path;
use tracing::{debug, trace};

/// Title of the summary-information stream of every MSI.
pub const SUMMARY_MARKER: &[u8] = b"Installation Database";

const WIX_UI_MARKER: &[u8] = b"WixUI_Mode";
const VT_LPSTR: u32 = 0x1E;
const MAX_LPSTR_LEN: usize = 4096;
/// Bytes after the summary marker that make a parse trustworthy.
const SUMMARY_CONTEXT: usize = 1024;

static RE_PROPERTIES: Lazy<Regex> = Lazy::new(|| {
    const GUID: &str =
        r"\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}";
    Regex::new(&format!(
        r"(?s-u)Manufacturer(.*?)ProductCode({GUID})ProductLanguage(\d*)ProductName(.*?)ProductVersion(.*?)({GUID})"
    ))
    .expect("valid MSI property regex")
});

/// Fields recovered from the summary-information property set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SummaryFields {
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub template: Option<String>,
    pub mentions_wix: bool,
    /// The property walk reached the template or had ample context.
    pub complete: bool,
}

/// Fields recovered from the string-pool property run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertyRun {
    pub manufacturer: Option<String>,
    pub product_code: Option<String>,
    pub product_language: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub upgrade_code: Option<String>,
    /// Platform read backwards from the `Manufacturer` marker.
    pub architecture: Option<Architecture>,
}

fn text(bytes: &[u8]) -> Option<String> {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    let s = String::from_utf8_lossy(&bytes[..end]);
    let s = s.trim_matches(|c: char| c.is_control() || c.is_whitespace());
    (!s.is_empty()).then(|| s.to_string())
}

fn read_u32(buf: &[u8], pos: usize) -> Option<u32> {
    let b = buf.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// Read one `VT_LPSTR` property value at `pos`.
///
/// Returns the value and the offset of the next property.
fn read_lpstr(buf: &[u8], pos: usize) -> Option<(Option<String>, usize)> {
    if read_u32(buf, pos)? != VT_LPSTR {
        return None;
    }
    let len = read_u32(buf, pos + 4)? as usize;
    if len > MAX_LPSTR_LEN {
        return None;
    }
    let start = pos + 8;
    let value = buf.get(start..start + len)?;
    Some((text(value), start + align4(len)))
}

/// Walk the summary property set that starts with the title at `marker`.
pub fn parse_summary(buf: &[u8], marker: usize, wix_window: usize) -> SummaryFields {
    let mut fields = SummaryFields::default();

    let title_len = marker
        .checked_sub(4)
        .and_then(|p| read_u32(buf, p))
        .map(|l| l as usize)
        .filter(|&l| l > SUMMARY_MARKER.len() && l <= MAX_LPSTR_LEN)
        .unwrap_or(SUMMARY_MARKER.len() + 1);
    let mut pos = marker + align4(title_len);

    let window_end = buf.len().min(marker.saturating_add(wix_window));
    fields.mentions_wix = buf
        .get(marker..window_end)
        .map(|w| mentions_wix(&String::from_utf8_lossy(w)))
        .unwrap_or(false);

    let slots: [&mut Option<String>; 5] = [
        &mut fields.description,
        &mut fields.manufacturer,
        &mut fields.keywords,
        &mut fields.comments,
        &mut fields.template,
    ];
    let mut walked = 0;
    for slot in slots {
        match read_lpstr(buf, pos) {
            Some((value, next)) => {
                *slot = value;
                pos = next;
                walked += 1;
            }
            None => break,
        }
    }
    fields.complete = walked == 5 || buf.len().saturating_sub(marker) >= SUMMARY_CONTEXT;
    trace!(walked, ?fields, "Parsed summary property set");
    fields
}

/// Platform token in the NUL-bounded segment preceding `marker`, read up to
/// its first `;` (e.g. `x64;1033` before `Manufacturer`).
pub fn architecture_before(buf: &[u8], marker: usize) -> Option<Architecture> {
    let head = buf.get(..marker)?;
    let start = memchr::memrchr(0, head).map(|i| i + 1).unwrap_or(0);
    let segment = &head[start..];
    let semi = memchr::memchr(b';', segment)?;
    let token = String::from_utf8_lossy(&segment[..semi]);
    let platform: String = token
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    ["Intel64", "AMD64", "Arm64", "x64", "Intel", "Arm"]
        .iter()
        .find(|p| platform.to_ascii_lowercase().ends_with(&p.to_ascii_lowercase()))
        .and_then(|p| Architecture::from_msi_platform(p))
}

/// Match the string-pool property run in `buf`.
pub fn parse_property_run(buf: &[u8]) -> Option<PropertyRun> {
    let caps = RE_PROPERTIES.captures(buf)?;
    let group = |i: usize| caps.get(i).and_then(|m| text(m.as_bytes()));
    let version = group(5).map(|v| v.trim_end_matches("UpgradeCode").to_string());
    let marker = caps.get(0).map(|m| m.start()).unwrap_or(0);
    Some(PropertyRun {
        manufacturer: group(1),
        product_code: group(2),
        product_language: group(3),
        product_name: group(4),
        product_version: version.filter(|v| !v.is_empty()),
        upgrade_code: group(6),
        architecture: architecture_before(buf, marker),
    })
}

/// Streaming heuristic backend.
#[derive(Debug, Clone)]
pub struct ByteScanInspector {
    limits: IOLimits,
    chunk_size: usize,
    overlap: usize,
    wix_window: usize,
}

impl ByteScanInspector {
    pub const NAME: &'static str = "byte-scan";

    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            limits: config.io.limits(),
            chunk_size: config.io.scan_chunk_size,
            overlap: config.io.scan_overlap,
            wix_window: config.msi.wix_marker_window,
        }
    }

    fn merge(summary: Option<SummaryFields>, run: Option<PropertyRun>, wix_ui: bool) -> MsiInfo {
        let summary = summary.unwrap_or_default();
        let run = run.unwrap_or_default();
        MsiInfo {
            product_code: run.product_code,
            upgrade_code: run.upgrade_code,
            product_name: run.product_name.or(summary.description),
            product_version: run.product_version,
            manufacturer: summary.manufacturer.or(run.manufacturer),
            product_language: run.product_language,
            architecture: summary
                .template
                .as_deref()
                .and_then(architecture_from_template)
                .or(run.architecture),
            scope: None,
            is_wix: wix_ui
                || summary.mentions_wix
                || summary.comments.as_deref().is_some_and(mentions_wix),
        }
    }
}

impl MsiInspector for ByteScanInspector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn inspect(&self, path: &Path) -> Result<MsiInfo> {
        let mut reader = SafeFileReader::open(path, self.limits.clone())?;
        let summary_finder = memmem::Finder::new(SUMMARY_MARKER);
        let wix_finder = memmem::Finder::new(WIX_UI_MARKER);

        let mut summary: Option<SummaryFields> = None;
        let mut run: Option<PropertyRun> = None;
        let mut wix_ui = false;

        reader.scan_chunks(self.chunk_size, self.overlap, |window, offset| {
            if !summary.as_ref().is_some_and(|s| s.complete) {
                if let Some(marker) = summary_finder.find(window) {
                    debug!(offset = offset + marker as u64, "Found MSI summary marker");
                    summary = Some(parse_summary(window, marker, self.wix_window));
                }
            }
            if run.is_none() {
                run = parse_property_run(window);
            }
            wix_ui = wix_ui || wix_finder.find(window).is_some();

            let done = summary.as_ref().is_some_and(|s| s.complete) && run.is_some() && wix_ui;
            done.then_some(())
        })?;

        Ok(Self::merge(summary, run, wix_ui))
    }
}
