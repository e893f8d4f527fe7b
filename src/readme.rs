// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Regenerates the badge section of a README.
///
/// Reads the rendered SVG badges back, extracts their header, title and link,
/// and rewrites the content between two HTML comment markers:
/// - `<!-- randbadge:start -->`
/// - `<!-- randbadge:end -->`
use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info};

use crate::{
    badge::BadgeKind,
    config::BadgeConfig,
    error::{self, Error}
};

/// Marker opening the generated section.
pub const SECTION_START_MARKER: &str = "<!-- randbadge:start -->";
/// Marker closing the generated section.
pub const SECTION_END_MARKER: &str = "<!-- randbadge:end -->";

/// Text recovered from a rendered badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSummary {
    /// Header taken from the `aria-label` attribute.
    pub header: String,
    /// Title lines joined with spaces.
    pub title:  String,
    /// Link target, when present.
    pub link:   Option<String>
}

/// Extracts a [`BadgeSummary`] from SVG markup.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the extraction patterns fail to compile.
pub fn parse_badge_summary(svg: &str) -> Result<BadgeSummary, Error> {
    let title_pattern = compile(r#"<text [^>]*font-size="16"[^>]*>([^<]*)</text>"#)?;
    let link_pattern = compile(r#"<a href="([^"]+)">"#)?;
    let header_pattern = compile(r#"aria-label="([^"]+)""#)?;

    let lines: Vec<String> = title_pattern
        .captures_iter(svg)
        .map(|captures| unescape_xml(&captures[1]))
        .collect();
    let title = if lines.is_empty() {
        "No data available".to_owned()
    } else {
        lines.join(" ")
    };

    let link = link_pattern
        .captures(svg)
        .map(|captures| unescape_xml(&captures[1]));
    let header = header_pattern
        .captures(svg)
        .map_or_else(|| "Badge".to_owned(), |captures| unescape_xml(&captures[1]));

    Ok(BadgeSummary {
        header,
        title,
        link
    })
}

/// Reads a rendered badge from disk.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`Error::Io`] for any other read failure.
pub fn read_badge_summary(path: &Path) -> Result<Option<BadgeSummary>, Error> {
    match fs::read_to_string(path) {
        Ok(svg) => parse_badge_summary(&svg).map(Some),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(error::io_error(path, source))
    }
}

/// Rewrites the badge section of the README at `readme_path`.
///
/// The README is created when missing and the section is appended when the
/// markers are absent. Returns `true` when the file changed.
///
/// # Errors
///
/// Returns [`Error::Io`] when the README or a badge cannot be read and
/// [`Error::BadgeIo`] when the README cannot be written.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use randbadge::{BadgeConfig, update_readme};
///
/// # fn main() -> Result<(), randbadge::Error> {
/// update_readme(Path::new("README.md"), &BadgeConfig::default(), chrono::Utc::now())?;
/// # Ok(())
/// # }
/// ```
pub fn update_readme(
    readme_path: &Path,
    config: &BadgeConfig,
    updated_at: DateTime<Utc>
) -> Result<bool, Error> {
    let content = match fs::read_to_string(readme_path) {
        Ok(content) => content,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!("README not found at {}, creating it", readme_path.display());
            String::new()
        }
        Err(source) => return Err(error::io_error(readme_path, source))
    };

    let mut badges = Vec::with_capacity(BadgeKind::ALL.len());
    for kind in BadgeKind::ALL {
        let file_name = config.output_file(kind);
        let svg_path = config.output_dir.join(file_name);
        match read_badge_summary(&svg_path)? {
            Some(summary) => {
                debug!("Found {} badge at {}", kind, svg_path.display());
                badges.push((kind, image_path(&config.output_dir, file_name), summary));
            }
            None => debug!("No {} badge at {}", kind, svg_path.display())
        }
    }
    info!("Found {} rendered badges", badges.len());

    let section = generate_section(&badges, updated_at);
    let updated = replace_section(&content, &section);

    if updated == content {
        info!("No changes to README");
        return Ok(false);
    }

    info!("Writing updated README to {}", readme_path.display());
    fs::write(readme_path, updated).map_err(|source| error::badge_io_error(readme_path, source))?;
    Ok(true)
}

fn generate_section(
    badges: &[(BadgeKind, String, BadgeSummary)],
    updated_at: DateTime<Utc>
) -> String {
    let mut section = String::from("## 📊 Current Badges\n");

    if badges.is_empty() {
        section.push_str("\nNo badges generated yet.\n");
    }

    for (kind, image, summary) in badges {
        let alt = match kind {
            BadgeKind::StackOverflow => "Stupid StackOverflow Question",
            BadgeKind::GitHubRepository => "Random GitHub Repository"
        };
        section.push_str(&format!(
            "\n### {}\n\n![{alt}]({})\n",
            escape_markdown(&summary.header),
            escape_url(image)
        ));
        match &summary.link {
            Some(link) => section.push_str(&format!(
                "\n[{}]({})\n",
                escape_markdown(&summary.title),
                escape_url(link)
            )),
            None => section.push_str(&format!("\n{}\n", escape_markdown(&summary.title)))
        }
    }

    section.push_str(&format!(
        "\n**Last Updated:** {}\n",
        updated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    section
}

fn replace_section(content: &str, section: &str) -> String {
    let block = format!("{SECTION_START_MARKER}\n{section}{SECTION_END_MARKER}");

    let bounds = content.find(SECTION_START_MARKER).and_then(|start| {
        let search_from = start + SECTION_START_MARKER.len();
        content[search_from..]
            .find(SECTION_END_MARKER)
            .map(|end| (start, search_from + end + SECTION_END_MARKER.len()))
    });

    match bounds {
        Some((start, end)) => {
            let mut result = String::with_capacity(content.len() + block.len());
            result.push_str(&content[..start]);
            result.push_str(&block);
            result.push_str(&content[end..]);
            result
        }
        None if content.trim().is_empty() => format!("{block}\n"),
        None => {
            let mut result = content.trim_end().to_owned();
            result.push_str("\n\n");
            result.push_str(&block);
            result.push('\n');
            result
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::validation(format!("invalid regex: {e}")))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Escapes text so it renders literally and cannot open HTML comments or tags.
fn escape_markdown(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

fn escape_url(url: &str) -> String {
    url.replace('<', "%3C")
        .replace('>', "%3E")
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

/// Markdown path of a badge image: relative directories get a `./` prefix.
fn image_path(output_dir: &Path, file_name: &str) -> String {
    let directory = output_dir.to_string_lossy().replace('\\', "/");
    let directory = directory.trim_end_matches('/');

    if directory.is_empty() || directory == "." {
        format!("./{file_name}")
    } else if output_dir.is_absolute()
        || directory.starts_with('/')
        || directory.starts_with("./")
        || directory.starts_with("../")
    {
        format!("{directory}/{file_name}")
    } else {
        format!("./{directory}/{file_name}")
    }
}
