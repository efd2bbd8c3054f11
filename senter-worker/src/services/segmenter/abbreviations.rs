use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use super::LoadError;

const CROATIAN: &[&str] = &[
    "akad", "al", "br", "čl", "dipl", "doc", "dr", "engl", "fax", "franc", "gđa", "gđica", "god",
    "gosp", "grč", "hrv", "ing", "itd", "itsl", "izd", "kn", "kr", "lat", "mag", "mil", "min",
    "mlrd", "mr", "njem", "npr", "odn", "pogl", "pr", "prev", "prof", "sek", "sl", "st", "str",
    "sur", "sv", "tal", "tel", "tis", "tj", "tzv", "ul", "ur", "usp", "vs", "zb",
];

const ENGLISH: &[&str] = &[
    "a.m", "approx", "apr", "aug", "co", "corp", "dec", "dept", "dr", "e.g", "etc", "feb", "fig",
    "i.e", "inc", "jan", "jr", "jul", "jun", "ltd", "mr", "mrs", "ms", "nov", "oct", "p.m", "prof",
    "sep", "sept", "sr", "st", "u.s", "vs",
];

/// Language profile selecting the built-in abbreviation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Croatian,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Croatian => "hr",
            Language::English => "en",
        }
    }

    pub fn abbreviations(self) -> &'static [&'static str] {
        match self {
            Language::Croatian => CROATIAN,
            Language::English => ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported language '{0}' (expected hr or en)")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hr" | "hrv" | "croatian" => Ok(Language::Croatian),
            "en" | "eng" | "english" => Ok(Language::English),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Lowercases an abbreviation and strips its trailing dot.
/// Comments and blank entries yield `None`.
pub(super) fn normalize(entry: &str) -> Option<String> {
    let entry = entry.trim();
    if entry.is_empty() || entry.starts_with('#') {
        return None;
    }

    let entry = entry.trim_end_matches('.');
    if entry.is_empty() {
        return None;
    }

    Some(entry.to_lowercase())
}

pub(super) fn read_file(path: &Path) -> Result<Vec<String>, LoadError> {
    let data = fs::read_to_string(path).map_err(|source| LoadError::Abbreviations {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(data.lines().filter_map(normalize).collect())
}
