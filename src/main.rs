//! Command-line interface for the randbadge binary.
//!
//! The CLI exposes subcommands for generating a badge from one source,
//! regenerating the README badge section and classifying a single title.

use std::{
    io,
    path::{Path, PathBuf},
    process
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use randbadge::{
    BadgeConfig, BadgeKind, Error, PATTERNS_PATH_ENV, StupidDetector, generate_badge,
    resolve_config,
    sources::{GitHubRepositorySource, StackOverflowSource},
    update_readme
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for rendering daily random-content badges.
#[derive(Debug, Parser)]
#[command(name = "randbadge", version, about = "Render random-content SVG badges")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
/// Supported commands exposed by the CLI.
enum Command {
    /// Fetch one item and write its badge.
    Generate(GenerateArgs),
    /// Rewrite the badge section of a README.
    Readme(ReadmeArgs),
    /// Report whether a title reads as a stupid question.
    Classify(ClassifyArgs)
}

/// Source selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    /// StackOverflow question of the day.
    Stackoverflow,
    /// Random GitHub repository.
    Github
}

impl From<SourceArg> for BadgeKind {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Stackoverflow => Self::StackOverflow,
            SourceArg::Github => Self::GitHubRepository
        }
    }
}

/// Options shared by commands reading the configuration file.
#[derive(Debug, Args, Default)]
struct ConfigArgs {
    /// Path to the YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the rendered badges.
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>
}

impl ConfigArgs {
    fn resolve(&self) -> Result<BadgeConfig, Error> {
        let mut config = resolve_config(self.config.as_deref())?;
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Source to fetch the item from.
    #[arg(value_enum)]
    source: SourceArg,

    #[command(flatten)]
    config: ConfigArgs,

    /// JSON pattern source used by the stupid-question classifier.
    #[arg(long = "patterns", value_name = "PATH", env = PATTERNS_PATH_ENV)]
    patterns: Option<PathBuf>,

    /// Token used to authenticate GitHub searches.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>
}

#[derive(Debug, Args)]
struct ReadmeArgs {
    /// README file to update.
    #[arg(long = "readme", value_name = "PATH", default_value = "README.md")]
    readme: PathBuf,

    #[command(flatten)]
    config: ConfigArgs
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    /// Question title to classify.
    #[arg(long = "title", value_name = "TEXT")]
    title: String,

    /// JSON pattern source used by the classifier.
    #[arg(long = "patterns", value_name = "PATH", env = PATTERNS_PATH_ENV)]
    patterns: Option<PathBuf>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty")]
    pretty: bool
}

/// Result of the `classify` subcommand.
#[derive(Debug, Serialize)]
struct Classification<'a> {
    title:            &'a str,
    stupid:           bool,
    matched_patterns: Vec<String>,
    pattern_count:    usize,
    fallback:         bool
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .try_init();

    if let Err(error) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors from configuration loading, fetching, artifact writing
/// and README regeneration.
fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Readme(args) => run_readme(&args),
        Command::Classify(args) => run_classify(&args)
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), Error> {
    let config = args.config.resolve()?;
    let kind = BadgeKind::from(args.source);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::service(format!("failed to start async runtime: {e}")))?;

    let assets = match kind {
        BadgeKind::StackOverflow => {
            let patterns = args.patterns.unwrap_or_else(|| config.patterns.clone());
            let mut source =
                StackOverflowSource::new().with_detector(StupidDetector::from_path(patterns));
            runtime.block_on(generate_badge(&mut source, kind, &config))?
        }
        BadgeKind::GitHubRepository => {
            let mut source = GitHubRepositorySource::new().with_token(args.github_token);
            runtime.block_on(generate_badge(&mut source, kind, &config))?
        }
    };

    info!("Manifest written to {}", assets.manifest_path.display());
    Ok(())
}

fn run_readme(args: &ReadmeArgs) -> Result<(), Error> {
    let config = args.config.resolve()?;
    let changed = update_readme(&args.readme, &config, chrono::Utc::now())?;
    if changed {
        info!("README updated");
    }
    Ok(())
}

fn run_classify(args: &ClassifyArgs) -> Result<(), Error> {
    let detector = build_detector(args.patterns.as_deref());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_classification(&mut handle, &detector, &args.title, args.pretty)
}

fn build_detector(patterns: Option<&Path>) -> StupidDetector {
    match patterns {
        Some(path) => StupidDetector::from_path(path),
        None => StupidDetector::new()
    }
}

fn write_classification<W: io::Write>(
    writer: &mut W,
    detector: &StupidDetector,
    title: &str,
    pretty: bool
) -> Result<(), Error> {
    let matched_patterns = detector.matched_patterns(title);
    let report = Classification {
        title,
        stupid: !matched_patterns.is_empty(),
        matched_patterns,
        pattern_count: detector.pattern_count(),
        fallback: detector.origin().is_fallback()
    };

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &report)?;
    } else {
        serde_json::to_writer(&mut *writer, &report)?;
    }
    writeln!(writer).map_err(|e| Error::service(format!("failed to write output: {e}")))
}
