//! Installer reconciliation.
//!
//! Maps each installer of a previously published release onto one of the
//! freshly analyzed candidates. Predicates run from most to least specific;
//! the first predicate any candidate satisfies decides, and the first such
//! candidate in list order is taken.
//!
//! A candidate may be chosen for several previous installers: a release that
//! folds per-user and per-machine installers into one maps both onto it.

use crate::core::record::InstallerRecord;
use std::collections::BTreeMap;
use tracing::debug;

type Predicate = fn(&InstallerRecord, &InstallerRecord) -> bool;

/// Match predicates in evaluation order, with names for logging.
const PREDICATES: [(&str, Predicate); 7] = [
    ("architecture+type+scope", |p: &InstallerRecord, c: &InstallerRecord| {
        p.architecture == c.architecture
            && p.installer_type == c.installer_type
            && p.scope == c.scope
    }),
    ("architecture+type, candidate scope unset", |p: &InstallerRecord, c: &InstallerRecord| {
        p.architecture == c.architecture && p.installer_type == c.installer_type && c.scope.is_none()
    }),
    ("architecture+scope, candidate type unset", |p: &InstallerRecord, c: &InstallerRecord| {
        p.architecture == c.architecture && p.scope == c.scope && c.installer_type.is_none()
    }),
    ("architecture+type", |p: &InstallerRecord, c: &InstallerRecord| {
        p.architecture == c.architecture && p.installer_type == c.installer_type
    }),
    ("type", |p: &InstallerRecord, c: &InstallerRecord| p.installer_type == c.installer_type),
    ("architecture", |p: &InstallerRecord, c: &InstallerRecord| p.architecture == c.architecture),
    ("url extension", |p: &InstallerRecord, c: &InstallerRecord| {
        matches!((p.url_extension(), c.url_extension()), (Some(a), Some(b)) if a == b)
    }),
];

/// Map previous installer indices to candidate indices.
///
/// Pure and deterministic. Previous installers with no match are absent from
/// the map, so it never holds more entries than `previous`.
pub fn match_installers(
    previous: &[InstallerRecord],
    candidates: &[InstallerRecord],
) -> BTreeMap<usize, usize> {
    let mut mapping = BTreeMap::new();
    for (p_idx, prev) in previous.iter().enumerate() {
        let found = PREDICATES.iter().find_map(|(name, predicate)| {
            candidates
                .iter()
                .position(|candidate| predicate(prev, candidate))
                .map(|c_idx| (*name, c_idx))
        });
        match found {
            Some((rule, c_idx)) => {
                debug!(previous = p_idx, candidate = c_idx, rule, "Installer matched");
                mapping.insert(p_idx, c_idx);
            }
            None => debug!(previous = p_idx, "Installer left unmatched"),
        }
    }
    mapping
}

/// Candidates with user-maintained fields carried over from their match.
///
/// When several previous installers map to one candidate, the first of them
/// supplies the inherited fields.
pub fn inherit_matched(
    previous: &[InstallerRecord],
    candidates: &[InstallerRecord],
) -> Vec<InstallerRecord> {
    let mapping = match_installers(previous, candidates);
    let mut source: BTreeMap<usize, usize> = BTreeMap::new();
    for (&p_idx, &c_idx) in &mapping {
        source.entry(c_idx).or_insert(p_idx);
    }
    candidates
        .iter()
        .enumerate()
        .map(|(c_idx, candidate)| {
            let mut record = candidate.clone();
            if let Some(&p_idx) = source.get(&c_idx) {
                record.inherit_from(&previous[p_idx]);
            }
            record
        })
        .collect()
}
