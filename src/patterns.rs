// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Stupid-question classifier.
//!
//! Pattern categories are loaded from a JSON document shaped as
//! `{"categories": {"name": {"patterns": ["..."]}}}`. Every pattern is
//! lower-cased and merged into a single set; a title is "stupid" when any
//! pattern occurs in it as a plain, case-insensitive substring. Loading never
//! fails: a missing or malformed source degrades to a built-in pattern list.

use std::{
    collections::{BTreeMap, BTreeSet},
    env, fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock}
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{self, Error};

/// Location of the pattern document used when nothing else is configured.
pub const DEFAULT_PATTERNS_PATH: &str = "data/stupid_patterns.json";
/// Environment variable overriding [`DEFAULT_PATTERNS_PATH`].
pub const PATTERNS_PATH_ENV: &str = "RANDBADGE_PATTERNS";

/// Patterns used when the pattern source cannot be found.
pub const FALLBACK_PATTERNS: &[&str] = &[
    "hack",
    "crack",
    "virus",
    "malware",
    "plz",
    "please help",
    "urgent",
    "exit vim",
    "stuck in vim",
    "homework",
    "school project",
    "my code not working"
];

/// Patterns used when the pattern source exists but cannot be parsed.
pub const MALFORMED_FALLBACK_PATTERNS: &[&str] = &["help", "urgent", "stuck"];

/// Named group of related patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCategory {
    /// Optional human readable summary of the theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Substring patterns contributed by the category.
    #[serde(default)]
    pub patterns:    Vec<String>
}

/// Root of the JSON pattern source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDocument {
    /// Categories keyed by name.
    #[serde(default)]
    pub categories: BTreeMap<String, PatternCategory>
}

impl PatternDocument {
    /// Total number of patterns across categories, duplicates included.
    pub fn raw_pattern_count(&self) -> usize {
        self.categories
            .values()
            .map(|category| category.patterns.len())
            .sum()
    }
}

/// Describes which tier of the load contract produced the active pattern set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOrigin {
    /// Patterns were read from a JSON file.
    File(PathBuf),
    /// Patterns were supplied as an in-memory document.
    Document,
    /// The source was missing; [`FALLBACK_PATTERNS`] are active.
    Fallback,
    /// The source was malformed; [`MALFORMED_FALLBACK_PATTERNS`] are active.
    MalformedFallback
}

impl PatternOrigin {
    /// Returns `true` when a built-in list replaced the configured source.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback | Self::MalformedFallback)
    }
}

#[derive(Debug, Clone)]
enum PatternSource {
    Path(PathBuf),
    Document(PatternDocument)
}

/// Classifies question titles against a configurable pattern set.
///
/// Instances are independent; [`default_detector`] exposes the shared one
/// used by question selection. The detector has no interior locking, so a
/// shared instance must be wrapped in external synchronization.
///
/// # Examples
///
/// ```
/// use randbadge::StupidDetector;
///
/// let detector = StupidDetector::from_path("does/not/exist.json");
/// assert!(detector.is_stupid("Please help me exit vim"));
/// assert!(!detector.is_stupid("How does TCP congestion control work?"));
/// ```
#[derive(Debug, Clone)]
pub struct StupidDetector {
    source:     PatternSource,
    origin:     PatternOrigin,
    categories: BTreeMap<String, PatternCategory>,
    patterns:   BTreeSet<String>
}

impl StupidDetector {
    /// Builds a detector from the default pattern location.
    ///
    /// The location is taken from `RANDBADGE_PATTERNS` when set, otherwise
    /// [`DEFAULT_PATTERNS_PATH`].
    pub fn new() -> Self {
        let path = env::var_os(PATTERNS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATTERNS_PATH));
        Self::from_path(path)
    }

    /// Builds a detector from a JSON pattern file, falling back to built-in
    /// patterns when the file is missing or malformed.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::load(PatternSource::Path(path.into()))
    }

    /// Builds a detector from an already parsed document.
    pub fn from_document(document: PatternDocument) -> Self {
        Self::load(PatternSource::Document(document))
    }

    fn load(source: PatternSource) -> Self {
        let (origin, categories, patterns) = resolve_patterns(&source);
        Self {
            source,
            origin,
            categories,
            patterns
        }
    }

    /// Returns `true` when any pattern occurs in the lower-cased title.
    ///
    /// Matching is a plain substring test, so `help` also matches
    /// `unhelpful`.
    pub fn is_stupid(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| title.contains(pattern.as_str()))
    }

    /// Returns every pattern that occurs in the lower-cased title.
    ///
    /// The order follows the internal set and carries no meaning.
    pub fn matched_patterns(&self, title: &str) -> Vec<String> {
        let title = title.to_lowercase();
        self.patterns
            .iter()
            .filter(|pattern| title.contains(pattern.as_str()))
            .cloned()
            .collect()
    }

    /// Inserts a pattern into the live set. Empty patterns are ignored.
    pub fn add_pattern(&mut self, pattern: &str) {
        if let Some(normalized) = normalize_pattern(pattern) {
            self.patterns.insert(normalized);
        }
    }

    /// Inserts several patterns into the live set.
    pub fn add_patterns<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        for pattern in patterns {
            self.add_pattern(pattern.as_ref());
        }
    }

    /// Discards the current set, including added patterns, and repeats the
    /// load contract against the remembered source.
    pub fn reload(&mut self) {
        let (origin, categories, patterns) = resolve_patterns(&self.source);
        self.origin = origin;
        self.categories = categories;
        self.patterns = patterns;
    }

    /// Number of distinct patterns in the live set.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Iterates over the distinct patterns in the live set.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Categories of the loaded document; empty when a fallback is active.
    pub fn categories(&self) -> &BTreeMap<String, PatternCategory> {
        &self.categories
    }

    /// Looks up a single category by name.
    pub fn category_info(&self, name: &str) -> Option<&PatternCategory> {
        self.categories.get(name)
    }

    /// Reports which tier produced the active pattern set.
    pub fn origin(&self) -> &PatternOrigin {
        &self.origin
    }
}

impl Default for StupidDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and parses a JSON pattern document.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::PatternParse`] when its contents are not a pattern document.
pub fn load_pattern_document(path: &Path) -> Result<PatternDocument, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    serde_json::from_str(&contents).map_err(|source| error::pattern_parse_error(path, source))
}

/// Built-in pattern set for the given fallback tier.
pub fn fallback_patterns(origin: &PatternOrigin) -> BTreeSet<String> {
    let list = match origin {
        PatternOrigin::MalformedFallback => MALFORMED_FALLBACK_PATTERNS,
        _ => FALLBACK_PATTERNS
    };
    list.iter().filter_map(|pattern| normalize_pattern(pattern)).collect()
}

fn resolve_patterns(
    source: &PatternSource
) -> (PatternOrigin, BTreeMap<String, PatternCategory>, BTreeSet<String>) {
    let (document, origin) = match source {
        PatternSource::Document(document) => (document.clone(), PatternOrigin::Document),
        PatternSource::Path(path) => match load_pattern_document(path) {
            Ok(document) => (document, PatternOrigin::File(path.clone())),
            Err(error @ Error::PatternParse { .. }) => {
                warn!("{error}; using fallback patterns");
                let origin = PatternOrigin::MalformedFallback;
                return (origin.clone(), BTreeMap::new(), fallback_patterns(&origin));
            }
            Err(error) => {
                warn!("pattern source unavailable ({error}); using fallback patterns");
                let origin = PatternOrigin::Fallback;
                return (origin.clone(), BTreeMap::new(), fallback_patterns(&origin));
            }
        }
    };

    let patterns: BTreeSet<String> = document
        .categories
        .values()
        .flat_map(|category| category.patterns.iter())
        .filter_map(|pattern| normalize_pattern(pattern))
        .collect();

    if patterns.is_empty() {
        warn!("pattern source contains no usable patterns; using fallback patterns");
        let origin = PatternOrigin::Fallback;
        return (origin.clone(), BTreeMap::new(), fallback_patterns(&origin));
    }

    info!(
        "Loaded {} patterns ({} distinct) from {} categories",
        document.raw_pattern_count(),
        patterns.len(),
        document.categories.len()
    );

    (origin, document.categories, patterns)
}

fn normalize_pattern(pattern: &str) -> Option<String> {
    if pattern.is_empty() {
        None
    } else {
        Some(pattern.to_lowercase())
    }
}

/// Shared detector used by question selection.
///
/// Lazily built from the default pattern location on first access. The
/// [`Mutex`] is the synchronization the detector needs when shared; never hold
/// the guard across an `.await`.
pub fn default_detector() -> &'static Mutex<StupidDetector> {
    static DETECTOR: OnceLock<Mutex<StupidDetector>> = OnceLock::new();
    DETECTOR.get_or_init(|| Mutex::new(StupidDetector::new()))
}

/// Classifies a title with the shared detector.
pub fn is_stupid_question(title: &str) -> bool {
    default_detector()
        .lock()
        .map(|detector| detector.is_stupid(title))
        .unwrap_or_else(|poisoned| poisoned.into_inner().is_stupid(title))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::*;

    fn sample_document() -> PatternDocument {
        serde_json::from_str(
            r#"{
                "categories": {
                    "urgent": {
                        "description": "Demands immediate attention",
                        "patterns": ["URGENT", "asap", "Please Help"]
                    },
                    "vim": { "patterns": ["exit vim", "please help"] }
                }
            }"#
        )
        .expect("valid document")
    }

    #[test]
    fn document_patterns_are_lowercased_and_merged() {
        let detector = StupidDetector::from_document(sample_document());
        assert_eq!(detector.pattern_count(), 4);
        assert_eq!(detector.origin(), &PatternOrigin::Document);
        let patterns: Vec<&str> = detector.patterns().collect();
        assert!(patterns.contains(&"urgent"));
        assert!(patterns.contains(&"please help"));
        assert!(patterns.iter().all(|p| *p == p.to_lowercase()));
    }

    #[test]
    fn is_stupid_matches_case_insensitive_substrings() {
        let detector = StupidDetector::from_document(sample_document());
        assert!(detector.is_stupid("How do I EXIT VIM??"));
        assert!(detector.is_stupid("need this asap"));
        assert!(!detector.is_stupid("Borrow checker and lifetimes"));
    }

    #[test]
    fn substring_matching_ignores_word_boundaries() {
        let mut detector = StupidDetector::from_document(sample_document());
        detector.add_pattern("help");
        assert!(detector.is_stupid("An unhelpful compiler message"));
    }

    #[test]
    fn matched_patterns_reports_every_match() {
        let detector = StupidDetector::from_document(sample_document());
        let mut matched = detector.matched_patterns("Please help, urgent: exit vim");
        matched.sort();
        assert_eq!(matched, vec!["exit vim", "please help", "urgent"]);
        assert!(detector.matched_patterns("clean title").is_empty());
    }

    #[test]
    fn missing_source_uses_fallback_patterns() {
        let directory = tempdir().expect("failed to create temp dir");
        let detector = StupidDetector::from_path(directory.path().join("missing.json"));

        assert_eq!(detector.origin(), &PatternOrigin::Fallback);
        assert_eq!(detector.pattern_count(), FALLBACK_PATTERNS.len());
        assert!(detector.categories().is_empty());

        let title = "please help me exit vim";
        assert!(detector.is_stupid(title));
        let matched = detector.matched_patterns(title);
        assert!(matched.contains(&"please help".to_owned()));
        assert!(matched.contains(&"exit vim".to_owned()));
        assert!(!detector.is_stupid("How does TCP congestion control work?"));
    }

    #[test]
    fn malformed_source_uses_minimal_fallback() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("patterns.json");
        fs::write(&path, "{ not json").expect("failed to write patterns");

        let detector = StupidDetector::from_path(&path);
        assert_eq!(detector.origin(), &PatternOrigin::MalformedFallback);
        assert!(detector.pattern_count() > 0);
        assert!(detector.is_stupid("I am stuck"));
    }

    #[test]
    fn empty_document_never_leaves_detector_without_patterns() {
        let document = PatternDocument {
            categories: BTreeMap::from([(
                "blank".to_owned(),
                PatternCategory {
                    description: None,
                    patterns:    vec![String::new()]
                }
            )])
        };
        let detector = StupidDetector::from_document(document);
        assert!(detector.origin().is_fallback());
        assert!(detector.pattern_count() > 0);
    }

    #[test]
    fn load_pattern_document_reports_each_failure_tier() {
        let directory = tempdir().expect("failed to create temp dir");
        let missing = directory.path().join("missing.json");
        assert!(matches!(load_pattern_document(&missing), Err(Error::Io { .. })));

        let broken = directory.path().join("broken.json");
        fs::write(&broken, "[1, 2").expect("failed to write");
        assert!(matches!(
            load_pattern_document(&broken),
            Err(Error::PatternParse { .. })
        ));
    }

    #[test]
    fn fallback_tiers_are_distinct() {
        let missing = fallback_patterns(&PatternOrigin::Fallback);
        let malformed = fallback_patterns(&PatternOrigin::MalformedFallback);
        assert!(missing.contains("exit vim"));
        assert_eq!(malformed.len(), MALFORMED_FALLBACK_PATTERNS.len());
    }

    #[test]
    fn add_patterns_lowercases_and_ignores_empty() {
        let mut detector = StupidDetector::from_document(sample_document());
        let before = detector.pattern_count();
        detector.add_patterns(["Segfault", "", "URGENT"]);
        assert_eq!(detector.pattern_count(), before + 1);
        assert!(detector.is_stupid("why SEGFAULT"));
    }

    #[test]
    fn reload_discards_added_patterns_and_rereads_source() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("patterns.json");
        fs::write(&path, r#"{"categories": {"a": {"patterns": ["first"]}}}"#)
            .expect("failed to write patterns");

        let mut detector = StupidDetector::from_path(&path);
        detector.add_pattern("extra");
        assert!(detector.is_stupid("extra"));

        fs::write(&path, r#"{"categories": {"b": {"patterns": ["second"]}}}"#)
            .expect("failed to rewrite patterns");
        detector.reload();

        assert!(!detector.is_stupid("extra"));
        assert!(!detector.is_stupid("first"));
        assert!(detector.is_stupid("SECOND"));
        assert!(detector.category_info("b").is_some());
        assert!(detector.category_info("a").is_none());
    }

    #[test]
    fn category_info_exposes_metadata() {
        let detector = StupidDetector::from_document(sample_document());
        let info = detector.category_info("urgent").expect("category present");
        assert_eq!(info.description.as_deref(), Some("Demands immediate attention"));
        assert_eq!(info.patterns.len(), 3);
        assert_eq!(detector.categories().len(), 2);
        assert!(detector.category_info("missing").is_none());
    }

    #[test]
    fn shipped_pattern_file_classifies_reference_titles() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_PATTERNS_PATH);
        let detector = StupidDetector::from_path(path);
        assert!(matches!(detector.origin(), PatternOrigin::File(_)));

        let matched = detector.matched_patterns("please help me exit vim");
        assert!(matched.iter().any(|p| p == "please help" || p == "exit vim"));
        assert!(!detector.is_stupid("How does TCP congestion control work?"));
    }

    #[test]
    fn default_detector_is_built_once_and_shared() {
        let first = default_detector();
        let second = default_detector();
        assert!(std::ptr::eq(first, second));

        for title in [
            "please help me exit vim",
            "How does TCP congestion control work?",
            ""
        ] {
            let expected = first
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .is_stupid(title);
            assert_eq!(is_stupid_question(title), expected, "title: {title:?}");
        }
        assert!(
            first
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pattern_count()
                > 0
        );
    }

    proptest! {
        #[test]
        fn matched_patterns_agree_with_is_stupid(title in "[A-Za-z ]{0,40}") {
            let detector = StupidDetector::from_document(sample_document());
            let matched = detector.matched_patterns(&title);
            let lowered = title.to_lowercase();
            prop_assert_eq!(matched.is_empty(), !detector.is_stupid(&title));
            prop_assert!(matched.iter().all(|pattern| lowered.contains(pattern.as_str())));
            let expected = detector.patterns().filter(|p| lowered.contains(*p)).count();
            prop_assert_eq!(matched.len(), expected);
        }
    }
}
