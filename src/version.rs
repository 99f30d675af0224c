//! Ordering of free-form version strings.
//!
//! A version is an optional `v` prefix, a dotted core and an optional
//! `-tag`. Core components compare numerically with arbitrary width, missing
//! or non-numeric components count as zero, and an untagged version outranks
//! a tagged one. For sorting, remaining ties fall back to the raw text so
//! the order is total; new-highest checks ignore that tie-break.

use std::cmp::Ordering;
use std::fmt;

/// Ordering key derived from a version string.
#[derive(Debug, Clone)]
pub struct VersionKey {
    raw: String,
    /// Core components as digit strings without leading zeros; zero is empty.
    core: Vec<String>,
    tag: Option<Tag>,
}

#[derive(Debug, Clone)]
struct Tag {
    prefix: String,
    number: String,
}

fn normalize_number(digits: &str) -> String {
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.trim_start_matches('0').to_string()
    } else {
        String::new()
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Tag {
    fn parse(text: &str) -> Self {
        let split = text
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map_or(text.len(), |(i, _)| i);
        let (prefix, number) = text.split_at(split);
        Self {
            prefix: prefix.to_ascii_lowercase(),
            number: normalize_number(number),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.prefix
            .cmp(&other.prefix)
            .then_with(|| compare_numbers(&self.number, &other.number))
    }
}

impl VersionKey {
    pub fn parse(version: &str) -> Self {
        let trimmed = version.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let (core, tag) = match body.split_once('-') {
            Some((core, tag)) => (core, Some(tag).filter(|t| !t.is_empty())),
            None => (body, None),
        };
        let mut components: Vec<String> = core.split('.').map(normalize_number).collect();
        while components.last().is_some_and(String::is_empty) {
            components.pop();
        }
        Self {
            raw: version.to_string(),
            core: components,
            tag: tag.map(Tag::parse),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn compare_core(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        (0..len)
            .map(|i| {
                let a = self.core.get(i).map_or("", String::as_str);
                let b = other.core.get(i).map_or("", String::as_str);
                compare_numbers(a, b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn compare_tags(&self, other: &Self) -> Ordering {
        match (&self.tag, &other.tag) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.compare(b),
        }
    }

    /// Ordering by meaning alone: `1.0`, `1.0.0` and `v1.0` are equal here.
    pub fn cmp_semantic(&self, other: &Self) -> Ordering {
        self.compare_core(other).then_with(|| self.compare_tags(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_semantic(other).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for VersionKey {
    fn from(version: &str) -> Self {
        Self::parse(version)
    }
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    VersionKey::parse(a).cmp(&VersionKey::parse(b))
}

/// The highest version of a set, independent of input order.
pub fn highest<I, S>(versions: I) -> Option<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions
        .into_iter()
        .map(|v| (VersionKey::parse(v.as_ref()), v))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, v)| v)
}

/// True when `candidate` is newer in meaning than every known version.
///
/// Spelling variants of a known version (`1.0.0`, `v1.0`) are not new.
pub fn is_new_highest<I, S>(candidate: &str, known: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let key = VersionKey::parse(candidate);
    known
        .into_iter()
        .all(|v| key.cmp_semantic(&VersionKey::parse(v.as_ref())).is_gt())
}
