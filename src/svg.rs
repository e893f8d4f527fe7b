// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! SVG badge renderer.
//!
//! Turns a title, a link and a header into a fixed-layout card: rounded
//! background with a drop shadow, a bold header, the title wrapped on word
//! boundaries and a clickable link line. Rendering is a pure function of its
//! inputs; identical arguments always produce byte-identical markup.

use std::{borrow::Cow, fmt::Write as _};

use serde::{Deserialize, Serialize};
use textwrap::{Options, WordSeparator, WrapAlgorithm};

/// Links longer than this many characters are shortened for display.
pub const MAX_LINK_DISPLAY_CHARS: usize = 80;
/// Marker appended to a shortened link.
pub const LINK_ELLIPSIS: &str = "...";
/// Extra vertical gap placed after the header and before the link line.
const SECTION_GAP: u32 = 6;
const FONT_FAMILY: &str = "Segoe UI, Roboto, Arial, sans-serif";

/// Colors and layout parameters of a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStyle {
    /// Fill of the background rectangle.
    pub background:  String,
    /// Header color.
    pub accent:      String,
    /// Title line color.
    pub text_color:  String,
    /// Link line color.
    pub link_color:  String,
    /// Canvas width in pixels.
    pub width:       u32,
    /// Maximum number of title lines; extra lines are dropped.
    pub max_lines:   usize,
    /// Vertical distance between text lines in pixels.
    pub line_height: u32,
    /// Outer padding in pixels.
    pub padding:     u32,
    /// Characters per wrapped title line.
    pub wrap_width:  usize
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            background:  "#0f172a".to_owned(),
            accent:      "#ffb86b".to_owned(),
            text_color:  "#e6eef8".to_owned(),
            link_color:  "#9be7ff".to_owned(),
            width:       680,
            max_lines:   6,
            line_height: 20,
            padding:     20,
            wrap_width:  40
        }
    }
}

impl BadgeStyle {
    /// Canvas height for the given number of rendered title lines.
    ///
    /// Padding on both sides plus one header row, the title rows and one link
    /// row.
    pub fn height_for(&self, title_lines: usize) -> u32 {
        let rows = u32::try_from(title_lines).unwrap_or(u32::MAX).saturating_add(2);
        self.padding
            .saturating_mul(2)
            .saturating_add(self.line_height.saturating_mul(rows))
    }
}

/// Wraps text on whitespace so that no line exceeds `width` columns.
///
/// Runs of whitespace collapse to a single space before wrapping. Lines are
/// filled greedily and words wider than `width` are broken into pieces.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let options = Options::new(width.max(1))
        .word_separator(WordSeparator::AsciiSpace)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(&normalized, options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}

/// Escapes characters that are significant in XML text and attributes.
pub fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len() + 16);
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#x27;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}

/// Shortens a link for display; the clickable target keeps the full value.
pub fn display_link(link: &str) -> Cow<'_, str> {
    if link.chars().count() <= MAX_LINK_DISPLAY_CHARS {
        return Cow::Borrowed(link);
    }
    let keep = MAX_LINK_DISPLAY_CHARS - LINK_ELLIPSIS.len();
    let mut shortened: String = link.chars().take(keep).collect();
    shortened.push_str(LINK_ELLIPSIS);
    Cow::Owned(shortened)
}

/// Renders a badge as a standalone SVG document.
///
/// # Examples
///
/// ```
/// use randbadge::{BadgeStyle, render_badge};
///
/// let svg = render_badge("How do I exit vim?", "https://stackoverflow.com/q/1", "Header", &BadgeStyle::default());
/// assert!(svg.starts_with("<svg"));
/// assert!(svg.contains("How do I exit vim?"));
/// ```
pub fn render_badge(title: &str, link: &str, header: &str, style: &BadgeStyle) -> String {
    let mut lines = wrap_text(title, style.wrap_width);
    lines.truncate(style.max_lines);

    let width = style.width;
    let height = style.height_for(lines.len());
    let padding = style.padding;
    let header = escape_xml(header);

    let mut body = String::with_capacity(256 + lines.len() * 160);
    let mut y = padding.saturating_add(style.line_height);

    let _ = write!(
        body,
        "<text x=\"{padding}\" y=\"{y}\" font-size=\"18\" font-family=\"{FONT_FAMILY}\" font-weight=\"700\" fill=\"{}\">{header}</text>",
        escape_xml(&style.accent),
    );
    y = y.saturating_add(style.line_height).saturating_add(SECTION_GAP);

    for line in &lines {
        let _ = write!(
            body,
            "<text x=\"{padding}\" y=\"{y}\" font-size=\"16\" font-family=\"{FONT_FAMILY}\" fill=\"{}\">{}</text>",
            escape_xml(&style.text_color),
            escape_xml(line),
        );
        y = y.saturating_add(style.line_height);
    }

    y = y.saturating_add(SECTION_GAP);
    let _ = write!(
        body,
        "<a href=\"{}\"><text x=\"{padding}\" y=\"{y}\" font-size=\"13\" font-family=\"{FONT_FAMILY}\" fill=\"{}\">{}</text></a>",
        escape_xml(link),
        escape_xml(&style.link_color),
        escape_xml(&display_link(link)),
    );

    let mut svg = String::with_capacity(body.len() + 640);
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" role=\"img\" aria-label=\"{header}\">",
    );
    svg.push_str("  <defs>\n    <filter id=\"shadow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\n      <feDropShadow dx=\"0\" dy=\"6\" stdDeviation=\"8\" flood-color=\"#000\" flood-opacity=\"0.45\"/>\n    </filter>\n  </defs>\n");
    let _ = writeln!(
        svg,
        "  <rect width=\"100%\" height=\"100%\" rx=\"12\" fill=\"{}\" filter=\"url(#shadow)\"/>",
        escape_xml(&style.background),
    );
    let _ = writeln!(svg, "  <g>\n    {body}\n  </g>");
    let _ = writeln!(
        svg,
        "  <rect x=\"0\" y=\"{}\" width=\"{width}\" height=\"28\" fill-opacity=\"0\"/>",
        height.saturating_sub(28),
    );
    svg.push_str("</svg>");

    svg
}
