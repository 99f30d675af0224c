//! Zip bundle analysis.
//!
//! Enumerates installer-looking entries, picks the nested installer
//! automatically when the archive leaves no doubt, and otherwise asks the
//! [`ChoiceProvider`]. The chosen entry is extracted to a temporary file and
//! classified without recursing into further archives.

use crate::core::detection::NestedInstallerFile;
use crate::core::installer::InstallerType;
use crate::error::{InsightError, Result};
use crate::triage::api::ArtifactClassifier;
use crate::triage::msix::open_archive;
use crate::triage::prompt::ChoiceProvider;
use crate::triage::sniffers::INSTALLER_EXTENSIONS;
use std::collections::BTreeMap;
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// An installer-looking file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub path: String,
    pub size: u64,
}

/// Installer entries grouped by lowercase extension.
pub type EntryGroups = BTreeMap<String, Vec<ZipEntry>>;

/// How the nested installer is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedSelection {
    /// The archive holds one unambiguous installer.
    Automatic(ZipEntry),
    /// One extension, a manageable number of entries: offer them.
    Candidates(Vec<ZipEntry>),
    /// Nothing usable; paths must be entered by hand.
    Manual,
}

/// Outcome of analyzing a zip artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipAnalysis {
    pub nested_installer_files: Vec<NestedInstallerFile>,
    /// `None` when no nested file was chosen or its family stayed undecided.
    pub nested_installer_type: Option<InstallerType>,
}

fn entry_extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    INSTALLER_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Collect installer entries grouped by extension.
pub fn installer_entries<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<EntryGroups> {
    let mut groups = EntryGroups::new();
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if entry.is_dir() {
            continue;
        }
        if let Some(ext) = entry_extension(entry.name()) {
            groups.entry(ext).or_default().push(ZipEntry {
                path: entry.name().to_string(),
                size: entry.size(),
            });
        }
    }
    Ok(groups)
}

/// Decide how the nested installer is picked from the grouped entries.
pub fn plan_selection(groups: &EntryGroups, max_selectable: usize) -> NestedSelection {
    let mut singles = groups.values().filter(|entries| entries.len() == 1);
    if let (Some(only), None) = (singles.next(), singles.next()) {
        return NestedSelection::Automatic(only[0].clone());
    }

    let mut present = groups.values().filter(|entries| !entries.is_empty());
    if let (Some(entries), None) = (present.next(), present.next()) {
        if (1..=max_selectable).contains(&entries.len()) {
            return NestedSelection::Candidates(entries.clone());
        }
    }
    NestedSelection::Manual
}

fn lookup<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<ZipEntry> {
    let normalized = path.trim().trim_start_matches(['/', '\\']).replace('\\', "/");
    let entry = archive.by_name(&normalized).ok()?;
    if entry.is_dir() {
        return None;
    }
    Some(ZipEntry {
        path: normalized,
        size: entry.size(),
    })
}

fn choose_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    selection: NestedSelection,
    provider: &mut dyn ChoiceProvider,
) -> Vec<ZipEntry> {
    match selection {
        NestedSelection::Automatic(entry) => {
            debug!(path = %entry.path, "Nested installer selected automatically");
            vec![entry]
        }
        NestedSelection::Candidates(candidates) => {
            let offered: Vec<String> = candidates.iter().map(|e| e.path.clone()).collect();
            let picked = provider.select_nested(&offered);
            candidates
                .into_iter()
                .filter(|e| picked.contains(&e.path))
                .collect()
        }
        NestedSelection::Manual => {
            let mut chosen: Vec<ZipEntry> = Vec::new();
            while let Some(path) = provider.enter_relative_path() {
                match lookup(archive, &path) {
                    Some(entry) if !chosen.iter().any(|c| c.path == entry.path) => {
                        chosen.push(entry)
                    }
                    Some(_) => debug!(path = %path, "Duplicate nested path ignored"),
                    None => warn!(path = %path, "Nested path not found in archive"),
                }
            }
            chosen
        }
    }
}

fn extract_to_temp<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &ZipEntry,
    limit: u64,
) -> Result<tempfile::NamedTempFile> {
    if entry.size > limit {
        return Err(InsightError::ResourceExhausted {
            resource: entry.path.clone(),
            used: entry.size,
            limit,
        });
    }
    let suffix = entry_extension(&entry.path)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut temp = tempfile::Builder::new()
        .prefix("nested-")
        .suffix(&suffix)
        .tempfile()?;
    let mut source = archive.by_name(&entry.path)?;
    io::copy(&mut (&mut source).take(limit), temp.as_file_mut())?;
    Ok(temp)
}

fn valid_alias(alias: &str, max_len: usize) -> bool {
    let len = alias.chars().count();
    (1..=max_len).contains(&len)
}

/// Analyze an already opened zip archive.
pub fn analyze_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    classifier: &ArtifactClassifier,
    provider: &mut dyn ChoiceProvider,
) -> Result<ZipAnalysis> {
    let config = &classifier.config().archive;
    let groups = installer_entries(archive)?;
    debug!(extensions = ?groups.keys().collect::<Vec<_>>(), "Installer entries");

    let selection = plan_selection(&groups, config.max_selectable_entries);
    let chosen = choose_entries(archive, selection, provider);
    let Some(smallest) = chosen.iter().min_by_key(|e| e.size).cloned() else {
        info!("No nested installer chosen");
        return Ok(ZipAnalysis::default());
    };

    let temp = extract_to_temp(archive, &smallest, classifier.config().io.max_file_size)?;
    let detected = classifier
        .detect_family(temp.path())
        .filter(InstallerType::is_nestable);
    let nested_type = match detected {
        Some(family) => Some(family),
        None => provider.nested_family(&smallest.path).map(InstallerType::from),
    };

    let mut files: Vec<NestedInstallerFile> = chosen
        .iter()
        .map(|e| NestedInstallerFile::new(e.path.clone()))
        .collect();
    if nested_type == Some(InstallerType::Portable) {
        for file in &mut files {
            file.portable_command_alias = provider
                .command_alias(&file.relative_file_path)
                .map(|alias| alias.trim().to_string())
                .filter(|alias| {
                    let ok = valid_alias(alias, config.max_command_alias_len);
                    if !ok {
                        warn!(alias = %alias, "Command alias rejected");
                    }
                    ok
                });
        }
    }

    info!(
        nested = %smallest.path,
        nested_type = ?nested_type,
        count = files.len(),
        "Zip analyzed"
    );
    Ok(ZipAnalysis {
        nested_installer_files: files,
        nested_installer_type: nested_type,
    })
}

/// Analyze a zip artifact on disk.
pub fn analyze_zip(
    path: &Path,
    classifier: &ArtifactClassifier,
    provider: &mut dyn ChoiceProvider,
) -> Result<ZipAnalysis> {
    let mut archive = open_archive(path, &classifier.config().io.limits())?;
    analyze_archive(&mut archive, classifier, provider)
}
