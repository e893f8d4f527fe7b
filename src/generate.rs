// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// One badge run: fetch an item, render it and write the artifacts.
///
/// A source that yields no item aborts the run before anything touches the
/// output directory, so the previous badge stays in place.
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    badge::{BadgeAssets, BadgeKind, render_item, write_badge_assets},
    config::BadgeConfig,
    error::Error,
    sources::SourceAdapter
};

const SPINNER_TEMPLATE: &str = "{spinner:.yellow} [{elapsed_precise}] {msg}";

/// Fetches from `source` and writes the `kind` badge described by `config`.
///
/// # Errors
///
/// Returns [`Error::Service`] when the source produces no item, and every
/// error of [`write_badge_assets`].
///
/// # Example
///
/// ```no_run
/// use randbadge::{BadgeConfig, BadgeKind, generate_badge, sources::StackOverflowSource};
///
/// # async fn example() -> Result<(), randbadge::Error> {
/// let mut source = StackOverflowSource::new();
/// let assets =
///     generate_badge(&mut source, BadgeKind::StackOverflow, &BadgeConfig::default()).await?;
/// println!("{}", assets.svg_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn generate_badge<S>(
    source: &mut S,
    kind: BadgeKind,
    config: &BadgeConfig
) -> Result<BadgeAssets, Error>
where
    S: SourceAdapter
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    pb.set_message(format!("Fetching {kind} item..."));
    info!("Fetching {} item", kind);
    let item = source.fetch().await;
    pb.finish_and_clear();

    let Some(item) = item else {
        return Err(Error::service(format!(
            "{kind} source returned no item, keeping the previous badge"
        )));
    };
    debug!(
        "Fetched {} item: {}",
        kind,
        item.title_text().unwrap_or(kind.placeholder_title())
    );

    let svg = render_item(kind, &item, config.overrides(kind));
    let assets =
        write_badge_assets(&config.output_dir, config.output_file(kind), kind, &svg, &item)?;

    info!(
        "Generated {} badge: {}",
        source.display_name(),
        assets.svg_path.display()
    );
    Ok(assets)
}
