//! Daily random-content badges for GitHub profile READMEs.
//!
//! The library fetches one item from a remote source (a StackOverflow
//! question, preferably a stupid one, or a random popular GitHub repository),
//! renders it as a self-contained SVG card and keeps a README section in sync
//! with the rendered cards. The stupid-question classifier and the renderer
//! are pure and never fail; errors only surface from configuration loading,
//! artifact writing and README regeneration.
//!
//! # Example
//!
//! ```
//! use randbadge::{BadgeKind, NormalizedItem, StupidDetector, render_item};
//!
//! let detector = StupidDetector::new();
//! let title = "please help me exit vim";
//! assert!(detector.is_stupid(title));
//!
//! let item = NormalizedItem::new(title, "https://stackoverflow.com/q/11828270");
//! let svg = render_item(BadgeKind::StackOverflow, &item, None);
//! assert!(svg.starts_with("<svg"));
//! ```

mod badge;
mod config;
mod error;
mod generate;
mod item;
mod patterns;
mod readme;
pub mod retry;
pub mod sources;
mod svg;

pub use badge::{
    BadgeAssets, BadgeKind, PLAIN_QUESTION_HEADER, REPOSITORY_HEADER, STUPID_QUESTION_HEADER,
    render_item, write_badge_assets
};
pub use config::{
    BadgeConfig, BadgeEntry, DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_DIR, StyleOverrides, load_config,
    parse_config, resolve_config
};
pub use error::{Error, badge_io_error, io_error};
pub use generate::generate_badge;
pub use item::NormalizedItem;
pub use patterns::{
    DEFAULT_PATTERNS_PATH, FALLBACK_PATTERNS, MALFORMED_FALLBACK_PATTERNS, PATTERNS_PATH_ENV,
    PatternCategory, PatternDocument, PatternOrigin, StupidDetector, default_detector,
    fallback_patterns, is_stupid_question, load_pattern_document
};
pub use readme::{
    BadgeSummary, SECTION_END_MARKER, SECTION_START_MARKER, parse_badge_summary,
    read_badge_summary, update_readme
};
pub use sources::SourceAdapter;
pub use svg::{
    BadgeStyle, LINK_ELLIPSIS, MAX_LINK_DISPLAY_CHARS, display_link, escape_xml, render_badge,
    wrap_text
};
