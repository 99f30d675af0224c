//! Hints derived from the artifact's download URL.
//!
//! Release URLs frequently name the target architecture (`app-arm64.msi`,
//! `setup_x86_64.exe`); when present that hint outranks anything read from
//! the binary.

use crate::core::installer::{Architecture, Scope};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Words are maximal alphanumeric runs, so `x64` in `app-x64.msi` is a word
// but `x6400` never matches `x64`.
static RE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("valid word regex"));

static RE_SCOPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(user|machine|system|allusers|peruser)(?:$|[^a-z0-9])")
        .expect("valid scope regex")
});

fn file_name_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url.rsplit(['/', '\\']).next().unwrap_or_default().to_string(),
    }
}

fn path_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    }
}

fn map_arch_token(token: &str) -> Option<Architecture> {
    match token.to_ascii_lowercase().as_str() {
        "x86_64" | "x64" | "amd64" | "win64" | "64bit" | "64_bit" => Some(Architecture::X64),
        "arm64" | "aarch64" | "armv8" => Some(Architecture::Arm64),
        "x86" | "x32" | "i386" | "i486" | "i586" | "i686" | "win32" | "32bit" | "32_bit"
        | "ia32" => Some(Architecture::X86),
        "arm" => Some(Architecture::Arm),
        _ => None,
    }
}

/// Architecture named in the URL path, preferring the file name.
///
/// The last architecture word wins. Two-word spellings such as `x86_64`
/// and `64-bit` are tried before their first word alone.
pub fn architecture_from_url(url: &str) -> Option<Architecture> {
    let file_name = file_name_of(url);
    [file_name, path_of(url)]
        .iter()
        .find_map(|haystack| last_architecture_word(haystack))
}

fn last_architecture_word(haystack: &str) -> Option<Architecture> {
    let words: Vec<&str> = RE_WORD.find_iter(haystack).map(|m| m.as_str()).collect();
    let mut found = None;
    let mut i = 0;
    while i < words.len() {
        let pair = words
            .get(i + 1)
            .and_then(|next| map_arch_token(&format!("{}_{}", words[i], next)));
        if let Some(arch) = pair {
            found = Some(arch);
            i += 2;
            continue;
        }
        if let Some(arch) = map_arch_token(words[i]) {
            found = Some(arch);
        }
        i += 1;
    }
    found
}

/// Install scope named in the URL path.
pub fn scope_from_url(url: &str) -> Option<Scope> {
    let path = path_of(url);
    let token = RE_SCOPE.captures(&path)?.get(1)?.as_str().to_ascii_lowercase();
    match token.as_str() {
        "user" | "peruser" => Some(Scope::User),
        "machine" | "system" | "allusers" => Some(Scope::Machine),
        _ => None,
    }
}

/// Lowercased file extension of the URL's last path segment.
pub fn url_extension(url: &str) -> Option<String> {
    let file_name = file_name_of(url);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
