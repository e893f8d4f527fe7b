// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Remote sources that produce badge items.
//!
//! Adapters swallow transport and parsing failures: they log the cause and
//! report an absent item, leaving the decision to abort the run to the
//! caller.

mod github;
mod stackoverflow;

use std::future::Future;

pub use github::{GitHubRepositorySource, RepositorySummary, build_repository_title};
pub use stackoverflow::{
    FeedEntry, QuestionSelection, STACKOVERFLOW_FEED_URL, StackOverflowSource, parse_feed,
    select_question
};

use crate::item::NormalizedItem;

/// User agent sent with every remote request.
pub(crate) const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Capability shared by every item source.
pub trait SourceAdapter {
    /// Header describing the most recently fetched item.
    fn display_name(&self) -> String;

    /// Fetches one item, or `None` when the source is unreachable or empty.
    fn fetch(&mut self) -> impl Future<Output = Option<NormalizedItem>> + Send;
}
