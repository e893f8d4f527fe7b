// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Common record produced by every source adapter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Item fetched from a remote source, ready to be rendered as a badge.
///
/// Every field is optional so that partially populated records still reach
/// the renderer, which substitutes placeholders for absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Headline rendered as wrapped badge text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:        Option<String>,
    /// Target of the clickable link line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link:         Option<String>,
    /// Header text chosen by the adapter at fetch time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Source specific details such as star counts or matched patterns.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata:     BTreeMap<String, Value>
}

impl NormalizedItem {
    /// Creates an item with a title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            link: Some(link.into()),
            ..Self::default()
        }
    }

    /// Sets the header text.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Adds a metadata entry, replacing an existing value under the same key.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Title when present and not blank.
    pub fn title_text(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Link when present and not blank.
    pub fn link_text(&self) -> Option<&str> {
        non_blank(self.link.as_deref())
    }

    /// Header text when present and not blank.
    pub fn display_name_text(&self) -> Option<&str> {
        non_blank(self.display_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_populate_fields() {
        let item = NormalizedItem::new("Title", "https://example.com")
            .with_display_name("Header")
            .with_metadata("stars", 42);

        assert_eq!(item.title_text(), Some("Title"));
        assert_eq!(item.link_text(), Some("https://example.com"));
        assert_eq!(item.display_name_text(), Some("Header"));
        assert_eq!(item.metadata["stars"], 42);
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let item = NormalizedItem {
            title: Some("   ".to_owned()),
            ..NormalizedItem::default()
        };
        assert_eq!(item.title_text(), None);
        assert_eq!(item.link_text(), None);
    }

    #[test]
    fn serialization_skips_absent_fields() {
        let item = NormalizedItem::new("Title", "https://example.com");
        let json = serde_json::to_string(&item).expect("serialization failed");
        assert_eq!(json, r#"{"title":"Title","link":"https://example.com"}"#);

        let parsed: NormalizedItem = serde_json::from_str("{}").expect("empty item parses");
        assert_eq!(parsed, NormalizedItem::default());
    }
}
