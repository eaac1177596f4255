//! Base-name cleanup and extension expansion.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// The extension set probed when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".net", ".co", ".co.in", ".in", ".us"];

/// Extensions stripped from input even when they are not probed.
const COMMON_EXTENSIONS: &[&str] = &[
    ".com", ".net", ".org", ".io", ".ai", ".dev", ".app", ".co", ".me", ".us", ".in", ".info",
    ".biz", ".xyz", ".tech", ".online", ".site", ".store", ".co.in", ".co.uk", ".org.in",
    ".net.in", ".com.au",
];

lazy_static! {
    static ref HOSTNAME: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)*$")
            .expect("hostname pattern is valid");
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Lowercases an extension and gives it exactly one leading dot.
pub fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim().trim_start_matches('.').to_lowercase())
}

/// Reduces raw user input to a bare base name, or `None` if nothing usable is left.
///
/// `https://www.MySite.co.in/about` becomes `mysite` when `.co.in` is known.
pub fn normalize_base(raw: &str, extensions: &[String]) -> Option<String> {
    let mut name = raw.trim().to_lowercase();

    for prefix in ["https://", "http://"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.to_string();
            break;
        }
    }
    if let Some(rest) = name.strip_prefix("www.") {
        name = rest.to_string();
    }
    if let Some(cut) = name.find(['/', '?', '#']) {
        name.truncate(cut);
    }
    let mut name = name.trim_end_matches('.').to_string();

    let mut known: Vec<String> = extensions
        .iter()
        .map(|e| normalize_extension(e))
        .chain(COMMON_EXTENSIONS.iter().map(|e| e.to_string()))
        .collect();
    // Longest first so ".co.in" is stripped before ".in".
    known.sort_by_key(|e| std::cmp::Reverse(e.len()));
    if let Some(ext) = known.iter().find(|ext| name.ends_with(ext.as_str()) && name.len() > ext.len()) {
        name.truncate(name.len() - ext.len());
    }

    if HOSTNAME.is_match(&name) {
        Some(name)
    } else {
        None
    }
}

/// Normalises every input, dropping unusable ones and later duplicates.
pub fn normalize_bases<I, S>(raw: I, extensions: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|r| normalize_base(r.as_ref(), extensions))
        .filter(|base| seen.insert(base.clone()))
        .collect()
}

pub fn expand_extensions<'a>(
    base: &'a str,
    extensions: &'a [String],
) -> impl Iterator<Item = String> + 'a {
    extensions
        .iter()
        .map(move |ext| format!("{}{}", base, normalize_extension(ext)))
}

/// Applies `never` then `always` adjustments; `always` entries go first.
pub fn adjust_extensions(mut extensions: Vec<String>, always: &[String], never: &[String]) -> Vec<String> {
    let never_set: HashSet<String> = never.iter().map(|s| normalize_extension(s)).collect();

    extensions = extensions.iter().map(|e| normalize_extension(e)).collect();
    extensions.retain(|ext| !never_set.contains(ext));

    for always_ext in always.iter().rev() {
        let ext = normalize_extension(always_ext);
        if !extensions.contains(&ext) {
            extensions.insert(0, ext);
        }
    }

    let mut seen = HashSet::new();
    extensions.retain(|e| seen.insert(e.clone()));
    extensions
}
