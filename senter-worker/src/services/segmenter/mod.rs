//! Sentence segmentation capability.
//!
//! The request loop only sees the [`Segmenter`] trait. [`RuleSegmenter`] is the
//! bundled implementation: it is built once at startup from a language profile
//! and an optional abbreviation file, and is read-only afterwards.

mod abbreviations;

use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;

pub use abbreviations::Language;

/// Longest text accepted by default, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 1_000_000;

// Terminal punctuation, optional closing quotes or brackets, then whitespace.
const BOUNDARY_PATTERN: &str = r#"(?P<term>[.!?…]+)(?P<close>["'”’»)\]]*)\s+"#;
const PARAGRAPH_PATTERN: &str = r"\n[ \t\r]*\n";

const OPENING_PUNCTUATION: &[char] = &['(', '[', '"', '\'', '“', '‘', '„', '«', '»'];

/// Splits text into sentences.
pub trait Segmenter {
    /// Returns the sentences of `text` in source order.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be processed.
    fn segment(&self, text: &str) -> Result<Vec<String>, SegmentError>;
}

/// Errors raised while segmenting a single text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("text of length {length} exceeds maximum of {max_length} characters")]
    TextTooLong { length: usize, max_length: usize },
}

/// Errors raised while building a segmenter.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to compile boundary pattern: {source}")]
    Pattern {
        #[source]
        source: regex::Error,
    },
    #[error("failed to read abbreviations from '{}': {source}", path.display())]
    Abbreviations {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    pub language: Language,
    pub abbreviations_file: Option<PathBuf>,
    pub max_length: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            abbreviations_file: None,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

pub struct RuleSegmenter {
    boundary: Regex,
    paragraph: Regex,
    abbreviations: HashSet<String>,
    max_length: usize,
}

impl RuleSegmenter {
    /// Builds the segmenter for the configured language.
    ///
    /// # Errors
    ///
    /// Returns an error if the abbreviation file cannot be read.
    pub fn load(config: &SegmenterConfig) -> Result<Self, LoadError> {
        let boundary =
            Regex::new(BOUNDARY_PATTERN).map_err(|source| LoadError::Pattern { source })?;
        let paragraph =
            Regex::new(PARAGRAPH_PATTERN).map_err(|source| LoadError::Pattern { source })?;

        let mut abbreviations: HashSet<String> = config
            .language
            .abbreviations()
            .iter()
            .map(|a| (*a).to_string())
            .collect();

        if let Some(path) = &config.abbreviations_file {
            let extra = abbreviations::read_file(path)?;
            tracing::debug!(path = %path.display(), entries = extra.len(), "loaded extra abbreviations");
            abbreviations.extend(extra);
        }

        tracing::info!(
            language = %config.language,
            abbreviations = abbreviations.len(),
            max_length = config.max_length,
            "sentence segmenter loaded"
        );

        Ok(Self {
            boundary,
            paragraph,
            abbreviations,
            max_length: config.max_length,
        })
    }

    /// Byte offsets where one sentence ends and the next may begin.
    fn boundaries(&self, text: &str) -> Vec<usize> {
        let mut cuts = Vec::new();

        for caps in self.boundary.captures_iter(text) {
            let (Some(whole), Some(term), Some(close)) =
                (caps.get(0), caps.name("term"), caps.name("close"))
            else {
                continue;
            };

            // Trailing whitespace at the end of the text.
            let Some(next) = text[whole.end()..].chars().next() else {
                continue;
            };

            if next.is_lowercase() {
                continue;
            }

            if term.as_str() == "." && self.ends_with_abbreviation(&text[..term.start()]) {
                continue;
            }

            cuts.push(close.end());
        }

        cuts.extend(self.paragraph.find_iter(text).map(|m| m.start()));

        cuts.sort_unstable();
        cuts.dedup();
        cuts
    }

    fn ends_with_abbreviation(&self, before: &str) -> bool {
        let word = before
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(OPENING_PUNCTUATION);

        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (None, _) => false,
            // Initials: "J. R. R. Tolkien"
            (Some(first), None) if first.is_uppercase() => true,
            _ => self.abbreviations.contains(&word.to_lowercase()),
        }
    }
}

impl Segmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, SegmentError> {
        let length = text.chars().count();
        if length > self.max_length {
            return Err(SegmentError::TextTooLong {
                length,
                max_length: self.max_length,
            });
        }

        let mut sentences = Vec::new();
        let mut start = 0usize;

        for cut in self
            .boundaries(text)
            .into_iter()
            .chain(std::iter::once(text.len()))
        {
            let piece = text[start..cut].trim();
            if !piece.is_empty() {
                sentences.push(piece.to_string());
            }
            start = cut;
        }

        tracing::debug!(chars = length, sentences = sentences.len(), "segmented text");

        Ok(sentences)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn croatian() -> RuleSegmenter {
        RuleSegmenter::load(&SegmenterConfig::default()).unwrap()
    }

    #[fixture]
    fn english() -> RuleSegmenter {
        RuleSegmenter::load(&SegmenterConfig {
            language: Language::English,
            ..SegmenterConfig::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("Ovo je rečenica. A ovo druga.", &["Ovo je rečenica.", "A ovo druga."])]
    #[case("Što? Ne znam... možda.", &["Što?", "Ne znam... možda."])]
    #[case("Stani! Tko ide?! Nitko.", &["Stani!", "Tko ide?!", "Nitko."])]
    #[case("To je rekao dr. Horvat. Zatim je otišao.", &["To je rekao dr. Horvat.", "Zatim je otišao."])]
    #[case("Voće, npr. Jabuke, je zdravo.", &["Voće, npr. Jabuke, je zdravo."])]
    #[case("J. R. R. Tolkien je pisao knjige.", &["J. R. R. Tolkien je pisao knjige."])]
    #[case("Cijena je 3.14 kuna. Skupo je.", &["Cijena je 3.14 kuna.", "Skupo je."])]
    #[case("Rekao je: \"Idemo.\" Zatim je otišao.", &["Rekao je: \"Idemo.\"", "Zatim je otišao."])]
    #[case("Bio je to kraj… Ili početak.", &["Bio je to kraj…", "Ili početak."])]
    #[case("Naslov bez točke\n\nprvi odlomak teksta.", &["Naslov bez točke", "prvi odlomak teksta."])]
    #[case("  Jedna rečenica.  ", &["Jedna rečenica."])]
    fn splits_croatian_text(
        croatian: RuleSegmenter,
        #[case] text: &str,
        #[case] expected: &[&str],
    ) {
        assert_eq!(croatian.segment(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\n\t\n")]
    fn empty_text_has_no_sentences(croatian: RuleSegmenter, #[case] text: &str) {
        assert!(croatian.segment(text).unwrap().is_empty());
    }

    #[rstest]
    fn english_profile_knows_english_abbreviations(english: RuleSegmenter) {
        let sentences = english
            .segment("Mr. Smith arrived, e.g. Yesterday. He left at 5 p.m. Today.")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["Mr. Smith arrived, e.g. Yesterday.", "He left at 5 p.m. Today."]
        );
    }

    #[rstest]
    fn croatian_profile_does_not_know_english_abbreviations(croatian: RuleSegmenter) {
        let sentences = croatian.segment("Mrs. Smith arrived.").unwrap();
        assert_eq!(sentences, vec!["Mrs.", "Smith arrived."]);
    }

    #[rstest]
    fn concatenation_reconstructs_text(croatian: RuleSegmenter) {
        let text = "Prva rečenica. Druga, s npr. kraticom!\n\nTreća?  Četvrta \"citat.\" Kraj";
        let sentences = croatian.segment(text).unwrap();
        assert_eq!(sentences.len(), 5);

        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        assert_eq!(strip(&sentences.concat()), strip(text));
    }

    #[test]
    fn rejects_text_over_max_length() {
        let segmenter = RuleSegmenter::load(&SegmenterConfig {
            max_length: 5,
            ..SegmenterConfig::default()
        })
        .unwrap();

        assert_eq!(segmenter.segment("čćžšđ").unwrap(), vec!["čćžšđ"]);
        assert_eq!(
            segmenter.segment("Predugo."),
            Err(SegmentError::TextTooLong {
                length: 8,
                max_length: 5
            })
        );
    }

    #[test]
    fn merges_abbreviations_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# project terms").unwrap();
        writeln!(file, "Ozn.").unwrap();
        writeln!(file).unwrap();

        let segmenter = RuleSegmenter::load(&SegmenterConfig {
            abbreviations_file: Some(file.path().to_path_buf()),
            ..SegmenterConfig::default()
        })
        .unwrap();

        let sentences = segmenter.segment("Vidi ozn. A na karti. Npr. Ovdje.").unwrap();
        assert_eq!(sentences, vec!["Vidi ozn. A na karti.", "Npr. Ovdje."]);
    }

    #[test]
    fn missing_abbreviation_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = RuleSegmenter::load(&SegmenterConfig {
            abbreviations_file: Some(path.clone()),
            ..SegmenterConfig::default()
        })
        .err()
        .unwrap();

        assert!(matches!(err, LoadError::Abbreviations { path: p, .. } if p == path));
    }
}
