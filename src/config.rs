//! Configuration document describing where badges are written and how they
//! look.
//!
//! The YAML file is optional. Every value has a default, and style overrides
//! only replace the fields they name, leaving the rest of the per-kind preset
//! intact.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};

use crate::{
    badge::BadgeKind,
    error::{self, Error},
    patterns::DEFAULT_PATTERNS_PATH,
    svg::BadgeStyle
};

/// Directory receiving rendered badges by default.
pub const DEFAULT_OUTPUT_DIR: &str = "assets";
/// Configuration file picked up when present and no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "randbadge.yaml";

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use randbadge::{BadgeConfig, BadgeKind};
///
/// let yaml = r##"
/// output_dir: public
/// badges:
///   stackoverflow:
///     output: question.svg
///     style:
///       accent: "#ff5555"
/// "##;
/// let config = randbadge::parse_config(yaml).expect("valid configuration");
/// assert_eq!(config.output_file(BadgeKind::StackOverflow), "question.svg");
/// assert_eq!(config.output_file(BadgeKind::GitHubRepository), "github_repo.svg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeConfig {
    /// Directory receiving rendered badges.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// JSON pattern source consumed by the classifier.
    #[serde(default = "default_patterns_path", alias = "patterns_file")]
    pub patterns: PathBuf,

    /// Per-kind settings keyed by kind.
    #[serde(default)]
    pub badges: BTreeMap<BadgeKind, BadgeEntry>
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            patterns:   default_patterns_path(),
            badges:     BTreeMap::new()
        }
    }
}

impl BadgeConfig {
    /// File name of the badge for `kind` inside [`Self::output_dir`].
    pub fn output_file(&self, kind: BadgeKind) -> &str {
        self.badges
            .get(&kind)
            .and_then(|entry| entry.output.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(kind.default_file_name())
    }

    /// Style overrides configured for `kind`.
    pub fn overrides(&self, kind: BadgeKind) -> Option<&StyleOverrides> {
        self.badges.get(&kind).and_then(|entry| entry.style.as_ref())
    }

    /// Fully resolved style for `kind`.
    pub fn style(&self, kind: BadgeKind) -> BadgeStyle {
        let mut style = kind.base_style();
        if let Some(overrides) = self.overrides(kind) {
            overrides.apply(&mut style);
        }
        style
    }

    fn validate(&self) -> Result<(), Error> {
        for (kind, entry) in &self.badges {
            if let Some(output) = entry.output.as_deref()
                && (output.contains('/') || output.contains('\\'))
            {
                return Err(Error::validation(format!(
                    "badge '{kind}' output must be a file name, got '{output}'"
                )));
            }
            if let Some(style) = &entry.style {
                style.validate(*kind)?;
            }
        }
        Ok(())
    }
}

/// Settings of a single badge kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEntry {
    /// Output file name override.
    #[serde(default, alias = "output_file")]
    pub output: Option<String>,
    /// Style overrides layered on the kind's preset.
    #[serde(default)]
    pub style:  Option<StyleOverrides>
}

/// Optional replacements for [`BadgeStyle`] fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOverrides {
    /// Background color.
    #[serde(default, alias = "bg")]
    pub background:  Option<String>,
    /// Header color.
    #[serde(default)]
    pub accent:      Option<String>,
    /// Title color.
    #[serde(default)]
    pub text_color:  Option<String>,
    /// Link color.
    #[serde(default)]
    pub link_color:  Option<String>,
    /// Canvas width in pixels.
    #[serde(default)]
    pub width:       Option<u32>,
    /// Maximum number of title lines.
    #[serde(default)]
    pub max_lines:   Option<usize>,
    /// Line height in pixels.
    #[serde(default)]
    pub line_height: Option<u32>,
    /// Padding in pixels.
    #[serde(default)]
    pub padding:     Option<u32>,
    /// Characters per title line.
    #[serde(default)]
    pub wrap_width:  Option<usize>
}

impl StyleOverrides {
    /// Replaces the fields of `style` that have an override.
    pub fn apply(&self, style: &mut BadgeStyle) {
        if let Some(value) = &self.background {
            style.background.clone_from(value);
        }
        if let Some(value) = &self.accent {
            style.accent.clone_from(value);
        }
        if let Some(value) = &self.text_color {
            style.text_color.clone_from(value);
        }
        if let Some(value) = &self.link_color {
            style.link_color.clone_from(value);
        }
        if let Some(value) = self.width {
            style.width = value;
        }
        if let Some(value) = self.max_lines {
            style.max_lines = value;
        }
        if let Some(value) = self.line_height {
            style.line_height = value;
        }
        if let Some(value) = self.padding {
            style.padding = value;
        }
        if let Some(value) = self.wrap_width {
            style.wrap_width = value;
        }
    }

    fn validate(&self, kind: BadgeKind) -> Result<(), Error> {
        let colors = [
            ("background", &self.background),
            ("accent", &self.accent),
            ("text_color", &self.text_color),
            ("link_color", &self.link_color)
        ];
        for (field, value) in colors {
            if value.as_deref().is_some_and(|color| color.trim().is_empty()) {
                return Err(Error::validation(format!(
                    "badge '{kind}' style.{field} cannot be empty"
                )));
            }
        }

        let sizes = [
            ("width", self.width.map(|value| value as usize)),
            ("max_lines", self.max_lines),
            ("line_height", self.line_height.map(|value| value as usize)),
            ("wrap_width", self.wrap_width)
        ];
        for (field, value) in sizes {
            if value == Some(0) {
                return Err(Error::validation(format!(
                    "badge '{kind}' style.{field} must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}

/// Parses and validates a YAML configuration document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for invalid YAML and [`Error::Validation`] when a
/// value violates the documented constraints.
pub fn parse_config(source: &str) -> Result<BadgeConfig, Error> {
    if source.trim().is_empty() {
        return Ok(BadgeConfig::default());
    }
    let config: BadgeConfig = serde_yaml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, plus every error of
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<BadgeConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Loads `path` when given, otherwise [`DEFAULT_CONFIG_PATH`] when it exists,
/// otherwise the built-in defaults.
///
/// # Errors
///
/// Propagates [`load_config`] errors. An explicitly requested file that does
/// not exist is an error.
pub fn resolve_config(path: Option<&Path>) -> Result<BadgeConfig, Error> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.is_file() {
                load_config(default_path)
            } else {
                Ok(BadgeConfig::default())
            }
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_patterns_path() -> PathBuf {
    PathBuf::from(DEFAULT_PATTERNS_PATH)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").expect("empty config is valid");
        assert_eq!(config, BadgeConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("assets"));
        assert_eq!(config.patterns, PathBuf::from(DEFAULT_PATTERNS_PATH));
        assert_eq!(config.style(BadgeKind::StackOverflow), BadgeStyle::default());
    }

    #[test]
    fn overrides_are_layered_on_presets() {
        let yaml = r##"
badges:
  github:
    style:
      bg: "#111111"
      max_lines: 3
"##;
        let config = parse_config(yaml).expect("valid config");
        let style = config.style(BadgeKind::GitHubRepository);
        assert_eq!(style.background, "#111111");
        assert_eq!(style.max_lines, 3);
        assert_eq!(style.accent, "#58a6ff");
        assert_eq!(style.width, 680);
        assert!(config.overrides(BadgeKind::StackOverflow).is_none());
    }

    #[test]
    fn unknown_badge_kind_is_rejected() {
        let yaml = "badges:\n  reddit:\n    output: r.svg\n";
        let error = parse_config(yaml).expect_err("expected parse error");
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let yaml = "badges:\n  stackoverflow:\n    style:\n      max_lines: 0\n";
        let error = parse_config(yaml).expect_err("expected validation error");
        match error {
            Error::Validation {
                message
            } => assert!(message.contains("max_lines")),
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn blank_colors_are_rejected() {
        let yaml = "badges:\n  github:\n    style:\n      accent: \"  \"\n";
        assert!(matches!(parse_config(yaml), Err(Error::Validation { .. })));
    }

    #[test]
    fn output_must_be_a_file_name() {
        let yaml = "badges:\n  github:\n    output: ../escape.svg\n";
        assert!(matches!(parse_config(yaml), Err(Error::Validation { .. })));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("randbadge.yaml");
        let error = load_config(&path).expect_err("expected io error");
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn resolve_config_reads_explicit_path() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("custom.yaml");
        fs::write(&path, "output_dir: out\npatterns: p.json\n").expect("failed to write config");

        let config = resolve_config(Some(&path)).expect("config loads");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.patterns, PathBuf::from("p.json"));
    }
}
