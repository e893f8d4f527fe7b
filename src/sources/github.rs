// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Random GitHub repository source.
///
/// Searches popular repositories through the GitHub API with a random sort
/// order and page, then picks one repository from the page at random.
use masterror::AppError;
use octocrab::{Octocrab, models::Repository};
use rand::{Rng, seq::IndexedRandom};
use serde_json::Value;
use tracing::{info, warn};

use super::SourceAdapter;
use crate::{
    badge::REPOSITORY_HEADER,
    item::NormalizedItem,
    retry::{RetryPolicy, retry_with_backoff}
};

const SEARCH_QUERY: &str = "stars:>10";
const SORT_OPTIONS: [&str; 3] = ["stars", "forks", "updated"];
const MAX_PAGE: u32 = 5;
const PER_PAGE: u8 = 100;
const DESCRIPTION_CHARS: usize = 50;
const TITLE_SEPARATOR: &str = " • ";

/// Fields of a repository that end up on the badge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySummary {
    /// `owner/name`.
    pub full_name:   Option<String>,
    /// Web URL of the repository.
    pub html_url:    Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Stargazer count.
    pub stars:       u32,
    /// Primary language.
    pub language:    Option<String>
}

impl From<&Repository> for RepositorySummary {
    fn from(repository: &Repository) -> Self {
        Self {
            full_name:   repository.full_name.clone(),
            html_url:    repository.html_url.as_ref().map(ToString::to_string),
            description: repository.description.clone(),
            stars:       repository.stargazers_count.unwrap_or_default(),
            language:    repository
                .language
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_owned)
        }
    }
}

impl RepositorySummary {
    /// Converts the summary into a badge item.
    pub fn into_item(self) -> NormalizedItem {
        let name = self.full_name.unwrap_or_else(|| "Unknown".to_owned());
        let title =
            build_repository_title(&name, self.description.as_deref(), self.language.as_deref());
        let link = self
            .html_url
            .unwrap_or_else(|| "https://github.com".to_owned());

        NormalizedItem::new(title, link)
            .with_display_name(REPOSITORY_HEADER)
            .with_metadata("repo_name", name)
            .with_metadata("description", self.description)
            .with_metadata("stars", self.stars)
            .with_metadata("language", self.language)
    }
}

/// Joins name, shortened description and language into a badge title.
///
/// # Examples
///
/// ```
/// use randbadge::sources::build_repository_title;
///
/// let title = build_repository_title("rust-lang/rust", Some("Empowering everyone"), Some("Rust"));
/// assert_eq!(title, "rust-lang/rust • Empowering everyone • (Rust)");
/// ```
pub fn build_repository_title(
    name: &str,
    description: Option<&str>,
    language: Option<&str>
) -> String {
    let mut parts = vec![name.to_owned()];

    if let Some(description) = description.filter(|text| !text.is_empty()) {
        let shortened: String = description.chars().take(DESCRIPTION_CHARS).collect();
        parts.push(shortened.trim_end().to_owned());
    }
    if let Some(language) = language.filter(|text| !text.is_empty() && *text != "Unknown") {
        parts.push(format!("({language})"));
    }

    parts.join(TITLE_SEPARATOR)
}

/// Source of random popular repositories.
#[derive(Debug, Clone, Default)]
pub struct GitHubRepositorySource {
    token: Option<String>,
    retry: RetryPolicy
}

impl GitHubRepositorySource {
    /// Unauthenticated source; subject to the anonymous search rate limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticates requests with a personal access token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn client(&self) -> Result<Octocrab, AppError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = self.token.as_deref() {
            builder = builder.personal_token(token);
        }
        builder
            .build()
            .map_err(|e| AppError::unauthorized(format!("failed to initialize GitHub client: {e}")))
    }

    async fn search(&self, sort: &'static str, page: u32) -> Result<Vec<Repository>, AppError> {
        let octocrab = self.client()?;

        retry_with_backoff(&self.retry, "github repository search", || {
            let octocrab = octocrab.clone();
            async move {
                octocrab
                    .search()
                    .repositories(SEARCH_QUERY)
                    .sort(sort)
                    .order("desc")
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
                    .map(|result| result.items)
                    .map_err(|e| AppError::service(format!("GitHub repository search failed: {e}")))
            }
        })
        .await
    }
}

fn random_query<R>(rng: &mut R) -> (&'static str, u32)
where
    R: Rng + ?Sized
{
    let sort = SORT_OPTIONS.choose(rng).copied().unwrap_or(SORT_OPTIONS[0]);
    (sort, rng.random_range(1..=MAX_PAGE))
}

impl SourceAdapter for GitHubRepositorySource {
    fn display_name(&self) -> String {
        REPOSITORY_HEADER.to_owned()
    }

    async fn fetch(&mut self) -> Option<NormalizedItem> {
        let (sort, page) = random_query(&mut rand::rng());
        info!("Searching GitHub repositories sorted by {sort}, page {page}");

        let repositories = match self.search(sort, page).await {
            Ok(repositories) => repositories,
            Err(error) => {
                warn!("Error fetching from GitHub: {error}");
                return None;
            }
        };

        let Some(repository) = repositories.choose(&mut rand::rng()) else {
            warn!("No repositories found");
            return None;
        };

        Some(RepositorySummary::from(repository).into_item())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn title_joins_all_parts() {
        let title = build_repository_title("octocat/hello", Some("A friendly repo"), Some("Rust"));
        assert_eq!(title, "octocat/hello • A friendly repo • (Rust)");
    }

    #[test]
    fn title_truncates_description_and_trims_trailing_space() {
        let description = format!("{} tail that is dropped", "x".repeat(49));
        let title = build_repository_title("o/r", Some(&description), None);
        assert_eq!(title, format!("o/r • {}", "x".repeat(49)));
    }

    #[test]
    fn title_skips_missing_and_unknown_parts() {
        assert_eq!(build_repository_title("o/r", None, None), "o/r");
        assert_eq!(build_repository_title("o/r", Some(""), Some("Unknown")), "o/r");
    }

    #[test]
    fn summary_becomes_item_with_metadata() {
        let summary = RepositorySummary {
            full_name:   Some("octocat/hello".to_owned()),
            html_url:    Some("https://github.com/octocat/hello".to_owned()),
            description: None,
            stars:       1234,
            language:    Some("Go".to_owned())
        };

        let item = summary.into_item();
        assert_eq!(item.title.as_deref(), Some("octocat/hello • (Go)"));
        assert_eq!(item.link.as_deref(), Some("https://github.com/octocat/hello"));
        assert_eq!(item.display_name.as_deref(), Some(REPOSITORY_HEADER));
        assert_eq!(item.metadata["repo_name"], "octocat/hello");
        assert_eq!(item.metadata["stars"], 1234);
        assert_eq!(item.metadata["language"], "Go");
        assert!(item.metadata["description"].is_null());
    }

    #[test]
    fn empty_summary_uses_fallback_values() {
        let item = RepositorySummary::default().into_item();
        assert_eq!(item.title.as_deref(), Some("Unknown"));
        assert_eq!(item.link.as_deref(), Some("https://github.com"));
    }

    #[test]
    fn random_query_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let (sort, page) = random_query(&mut rng);
            assert!(SORT_OPTIONS.contains(&sort));
            assert!((1..=MAX_PAGE).contains(&page));
        }
    }

    #[test]
    fn blank_token_is_ignored() {
        let source = GitHubRepositorySource::new().with_token(Some("  ".to_owned()));
        assert!(source.token.is_none());
        assert_eq!(source.display_name(), REPOSITORY_HEADER);
    }
}
