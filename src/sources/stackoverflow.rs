// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// StackOverflow question source.
///
/// Downloads the public Atom feed of newest questions and picks the first one
/// whose title the classifier flags as stupid. When nothing matches, an
/// arbitrary question from the feed is used instead and the header changes
/// accordingly.
use std::{sync::PoisonError, time::Duration};

use masterror::AppError;
use rand::{Rng, seq::IndexedRandom};
use regex::Regex;
use tracing::{debug, info, warn};

use super::{SourceAdapter, USER_AGENT};
use crate::{
    badge::{PLAIN_QUESTION_HEADER, STUPID_QUESTION_HEADER},
    item::NormalizedItem,
    patterns::{StupidDetector, default_detector},
    retry::{RetryPolicy, retry_with_backoff}
};

/// Public feed of the newest StackOverflow questions.
pub const STACKOVERFLOW_FEED_URL: &str = "https://stackoverflow.com/feeds";
/// Number of newest entries examined for a stupid title.
const CANDIDATE_WINDOW: usize = 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Title and link of one feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Question title with entities decoded.
    pub title: String,
    /// Question URL.
    pub link:  String
}

/// Outcome of choosing a question from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSelection {
    /// Chosen entry.
    pub entry:            FeedEntry,
    /// Whether the entry matched the classifier.
    pub found_stupid:     bool,
    /// Patterns that matched the chosen title.
    pub matched_patterns: Vec<String>
}

/// Picks the question to render.
///
/// The first stupid title among the newest entries wins. Without a match a
/// random entry from the whole feed is returned with `found_stupid` unset.
/// Returns `None` only for an empty feed.
pub fn select_question<R>(
    entries: &[FeedEntry],
    detector: &StupidDetector,
    rng: &mut R
) -> Option<QuestionSelection>
where
    R: Rng + ?Sized
{
    let stupid = entries
        .iter()
        .take(CANDIDATE_WINDOW)
        .find(|entry| detector.is_stupid(&entry.title));

    if let Some(entry) = stupid {
        return Some(QuestionSelection {
            matched_patterns: detector.matched_patterns(&entry.title),
            entry:            entry.clone(),
            found_stupid:     true
        });
    }

    info!("No stupid questions found, using random fallback");
    entries.choose(rng).map(|entry| QuestionSelection {
        entry:            entry.clone(),
        found_stupid:     false,
        matched_patterns: Vec::new()
    })
}

/// Extracts entries from an Atom document.
///
/// Entries without a title or a link are skipped.
///
/// # Errors
///
/// Returns [`AppError`] when the extraction patterns fail to compile.
pub fn parse_feed(document: &str) -> Result<Vec<FeedEntry>, AppError> {
    let entry_pattern = compile(r"(?s)<entry\b[^>]*>(.*?)</entry>")?;
    let title_pattern = compile(r"(?s)<title\b[^>]*>(.*?)</title>")?;
    let alternate_pattern =
        compile(r#"<link\b[^>]*\brel="alternate"[^>]*\bhref="([^"]*)""#)?;
    let link_pattern = compile(r#"<link\b[^>]*\bhref="([^"]*)""#)?;
    let entity_pattern = compile(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);")?;

    let mut entries = Vec::new();
    for captures in entry_pattern.captures_iter(document) {
        let body = &captures[1];

        let Some(title) = title_pattern.captures(body).map(|found| {
            let raw = strip_cdata(found[1].trim());
            decode_entities(&entity_pattern, raw).trim().to_owned()
        }) else {
            continue;
        };
        let Some(link) = alternate_pattern
            .captures(body)
            .or_else(|| link_pattern.captures(body))
            .map(|found| decode_entities(&entity_pattern, &found[1]))
        else {
            continue;
        };

        if title.is_empty() || link.is_empty() {
            continue;
        }
        entries.push(FeedEntry {
            title,
            link
        });
    }

    debug!("Parsed {} feed entries", entries.len());
    Ok(entries)
}

fn compile(pattern: &str) -> Result<Regex, AppError> {
    Regex::new(pattern).map_err(|e| AppError::internal(format!("invalid regex: {e}")))
}

fn strip_cdata(value: &str) -> &str {
    value
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(value)
}

fn decode_entities(pattern: &Regex, value: &str) -> String {
    pattern
        .replace_all(value, |captures: &regex::Captures<'_>| {
            let name = &captures[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32)
            };
            decoded.map_or_else(|| captures[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Source of StackOverflow questions.
#[derive(Debug, Clone)]
pub struct StackOverflowSource {
    feed_url:     String,
    retry:        RetryPolicy,
    detector:     Option<StupidDetector>,
    found_stupid: bool
}

impl Default for StackOverflowSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StackOverflowSource {
    /// Source reading the public feed and classifying with the shared
    /// detector.
    pub fn new() -> Self {
        Self {
            feed_url:     STACKOVERFLOW_FEED_URL.to_owned(),
            retry:        RetryPolicy::default(),
            detector:     None,
            found_stupid: true
        }
    }

    /// Uses a dedicated detector instead of the shared one.
    #[must_use]
    pub fn with_detector(mut self, detector: StupidDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Reads a different feed URL.
    #[must_use]
    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = feed_url.into();
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether the last fetch found a stupid question.
    pub fn found_stupid(&self) -> bool {
        self.found_stupid
    }

    /// Chooses a question from already parsed entries and records the outcome.
    pub fn select<R>(&mut self, entries: &[FeedEntry], rng: &mut R) -> Option<NormalizedItem>
    where
        R: Rng + ?Sized
    {
        let selection = match &self.detector {
            Some(detector) => select_question(entries, detector, rng),
            None => {
                let detector = default_detector()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                select_question(entries, &detector, rng)
            }
        }?;

        self.found_stupid = selection.found_stupid;
        let mut item = NormalizedItem::new(selection.entry.title, selection.entry.link)
            .with_display_name(self.display_name());
        if !selection.matched_patterns.is_empty() {
            item = item.with_metadata("matched_patterns", selection.matched_patterns);
        }
        Some(item)
    }

    async fn download(&self) -> Result<String, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::service(format!("failed to build HTTP client: {e}")))?;
        let url = self.feed_url.as_str();

        retry_with_backoff(&self.retry, "stackoverflow feed", || {
            let client = client.clone();
            async move {
                client
                    .get(url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| AppError::service(format!("feed request failed: {e}")))?
                    .text()
                    .await
                    .map_err(|e| AppError::service(format!("failed to read feed body: {e}")))
            }
        })
        .await
    }
}

impl SourceAdapter for StackOverflowSource {
    fn display_name(&self) -> String {
        if self.found_stupid {
            STUPID_QUESTION_HEADER.to_owned()
        } else {
            PLAIN_QUESTION_HEADER.to_owned()
        }
    }

    async fn fetch(&mut self) -> Option<NormalizedItem> {
        info!("Fetching questions from {}", self.feed_url);
        let document = match self.download().await {
            Ok(document) => document,
            Err(error) => {
                warn!("Error fetching from StackOverflow: {error}");
                return None;
            }
        };

        let entries = match parse_feed(&document) {
            Ok(entries) => entries,
            Err(error) => {
                warn!("Error parsing StackOverflow feed: {error}");
                return None;
            }
        };
        if entries.is_empty() {
            warn!("StackOverflow feed contained no entries");
            return None;
        }

        self.select(&entries, &mut rand::rng())
    }
}
