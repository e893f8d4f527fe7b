// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge presets and asset writing.
//!
//! Each badge kind carries its own palette, header and placeholder strings.
//! Rendering an item never fails: absent titles and links are replaced with
//! placeholders so that a badge is always produced. Writing places the SVG
//! next to a JSON manifest that records the item the badge was built from.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};

use crate::{
    config::StyleOverrides,
    error::{self, Error},
    item::NormalizedItem,
    svg::{BadgeStyle, render_badge}
};

/// Header of a StackOverflow badge whose question matched the patterns.
pub const STUPID_QUESTION_HEADER: &str = "🤡 Stupid StackOverflow Question of the Day";
/// Header of a StackOverflow badge that fell back to an arbitrary question.
pub const PLAIN_QUESTION_HEADER: &str = "💻 StackOverflow Question of the Day";
/// Header of a repository badge.
pub const REPOSITORY_HEADER: &str = "⭐ Random Interesting GitHub Repository";

/// Supported badge flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BadgeKind {
    /// Question pulled from the StackOverflow feed.
    #[serde(rename = "stackoverflow")]
    StackOverflow,
    /// Repository pulled from GitHub search.
    #[serde(rename = "github")]
    GitHubRepository
}

impl BadgeKind {
    /// All kinds in README order.
    pub const ALL: [BadgeKind; 2] = [BadgeKind::StackOverflow, BadgeKind::GitHubRepository];

    /// Short identifier used on the command line and in configuration.
    pub fn key(self) -> &'static str {
        match self {
            Self::StackOverflow => "stackoverflow",
            Self::GitHubRepository => "github"
        }
    }

    /// Base style of the kind.
    pub fn base_style(self) -> BadgeStyle {
        match self {
            Self::StackOverflow => BadgeStyle::default(),
            Self::GitHubRepository => BadgeStyle {
                background: "#0d1117".to_owned(),
                accent: "#58a6ff".to_owned(),
                text_color: "#c9d1d9".to_owned(),
                link_color: "#79c0ff".to_owned(),
                ..BadgeStyle::default()
            }
        }
    }

    /// Title rendered when the item has none.
    pub fn placeholder_title(self) -> &'static str {
        match self {
            Self::StackOverflow => "Unknown question",
            Self::GitHubRepository => "Unknown repository"
        }
    }

    /// Link rendered when the item has none.
    pub fn placeholder_link(self) -> &'static str {
        match self {
            Self::StackOverflow => "https://stackoverflow.com",
            Self::GitHubRepository => "https://github.com"
        }
    }

    /// Header used when the item does not carry its own.
    pub fn default_header(self) -> &'static str {
        match self {
            Self::StackOverflow => STUPID_QUESTION_HEADER,
            Self::GitHubRepository => REPOSITORY_HEADER
        }
    }

    /// File name of the rendered SVG inside the output directory.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::StackOverflow => "stupid.svg",
            Self::GitHubRepository => "github_repo.svg"
        }
    }

    /// Resolves the header for an item.
    ///
    /// Question badges honour the header chosen at fetch time because it
    /// tells whether a stupid question was found; repository badges always use
    /// the fixed header.
    pub fn header_for(self, item: &NormalizedItem) -> String {
        match self {
            Self::StackOverflow => item
                .display_name_text()
                .unwrap_or(self.default_header())
                .to_owned(),
            Self::GitHubRepository => self.default_header().to_owned()
        }
    }
}

impl std::fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Renders an item with the kind's preset, optionally adjusted by overrides.
pub fn render_item(
    kind: BadgeKind,
    item: &NormalizedItem,
    overrides: Option<&StyleOverrides>
) -> String {
    let mut style = kind.base_style();
    if let Some(overrides) = overrides {
        overrides.apply(&mut style);
    }

    render_badge(
        item.title_text().unwrap_or(kind.placeholder_title()),
        item.link_text().unwrap_or(kind.placeholder_link()),
        &kind.header_for(item),
        &style
    )
}

/// Paths of the artifacts produced for one badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeAssets {
    /// Location of the rendered SVG badge.
    pub svg_path:      PathBuf,
    /// Location of the JSON manifest describing the badge.
    pub manifest_path: PathBuf
}

/// Writes a rendered badge and its manifest into `output_dir`.
///
/// The directory is created when missing. The manifest shares the SVG's file
/// stem with a `.json` extension.
///
/// # Errors
///
/// Returns [`Error::BadgeIo`] when directories or files cannot be created and
/// [`Error::Serialize`] if the manifest cannot be encoded.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use randbadge::{BadgeKind, NormalizedItem, render_item, write_badge_assets};
///
/// # fn main() -> Result<(), randbadge::Error> {
/// let item = NormalizedItem::new("How do I exit vim?", "https://stackoverflow.com/q/11828270");
/// let svg = render_item(BadgeKind::StackOverflow, &item, None);
/// let assets = write_badge_assets(Path::new("assets"), "stupid.svg", BadgeKind::StackOverflow, &svg, &item)?;
/// println!("SVG: {}", assets.svg_path.display());
/// # Ok(())
/// # }
/// ```
pub fn write_badge_assets(
    output_dir: &Path,
    file_name: &str,
    kind: BadgeKind,
    svg: &str,
    item: &NormalizedItem
) -> Result<BadgeAssets, Error> {
    fs::create_dir_all(output_dir).map_err(|source| error::badge_io_error(output_dir, source))?;

    let svg_path = output_dir.join(file_name);
    let manifest_path = svg_path.with_extension("json");

    write_svg(&svg_path, svg)?;
    write_manifest(&manifest_path, kind, item, &svg_path)?;

    Ok(BadgeAssets {
        svg_path,
        manifest_path
    })
}

fn write_svg(path: &Path, contents: &str) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::badge_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|source| error::badge_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::badge_io_error(path, source))
}

fn write_manifest(
    path: &Path,
    kind: BadgeKind,
    item: &NormalizedItem,
    svg_path: &Path
) -> Result<(), Error> {
    let manifest = BadgeManifest {
        kind,
        header: kind.header_for(item),
        svg_artifact: path_to_string(svg_path),
        item
    };

    let file = File::create(path).map_err(|source| error::badge_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    writer
        .write_all(b"\n")
        .map_err(|source| error::badge_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::badge_io_error(path, source))
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[derive(Serialize)]
struct BadgeManifest<'a> {
    kind:         BadgeKind,
    header:       String,
    svg_artifact: String,
    item:         &'a NormalizedItem
}
