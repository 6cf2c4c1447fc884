use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use radiocast::{
    NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient, RssEmitter, RunConfig,
    SharedProgressReporter, run,
};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static SKIPPED: Emoji<'_, '_> = Emoji("⏭️  ", "[-] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Build podcast RSS feeds from radio programme pages
#[derive(Parser, Debug)]
#[command(name = "radiocast")]
#[command(about = "Build podcast RSS feeds from radio programme pages")]
#[command(version)]
struct Args {
    /// JSON config file replacing the built-in programme table and settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for feed files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only build feeds for these programme slugs (repeatable)
    #[arg(short, long = "programme", value_name = "SLUG")]
    programmes: Vec<String>,

    /// Omny Studio organisation id, skips discovery
    #[arg(long)]
    org_id: Option<String>,

    /// Always merge page links with embedded episode data
    #[arg(long)]
    supplement: bool,

    /// Strip markup from episode descriptions
    #[arg(long)]
    strip_markup: bool,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        config.select_programmes(&self.programmes)?;

        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(org_id) = self.org_id {
            config.org_id = Some(org_id);
        }
        if self.supplement {
            config.extraction = radiocast::ExtractionMode::Supplement;
        }
        if self.strip_markup {
            config.strip_description_markup = true;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }

        Ok(config)
    }
}

/// Progress reporter using an indicatif spinner for terminal output
struct IndicatifReporter {
    bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap();

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { bar }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarting { total_programmes } => {
                self.bar.set_message(format!(
                    "Building feeds for {} programmes",
                    total_programmes.to_string().cyan()
                ));
            }

            ProgressEvent::FetchingProgramme {
                url,
                programme_index,
                total_programmes,
                ..
            } => {
                self.bar.set_message(format!(
                    "{SEARCH}[{}/{}] Fetching {}",
                    (programme_index + 1).to_string().cyan(),
                    total_programmes.to_string().cyan(),
                    url.cyan()
                ));
            }

            ProgressEvent::ProgrammeSkipped { slug, error } => {
                self.bar.println(format!(
                    "{SKIPPED}{} - {}",
                    slug.yellow(),
                    error.dimmed()
                ));
            }

            ProgressEvent::EpisodesExtracted {
                programme_title,
                episode_count,
                from_embedded_data,
                ..
            } => {
                let source = if from_embedded_data {
                    "page data"
                } else {
                    "page links"
                };
                self.bar.set_message(format!(
                    "{HEADPHONES}{} • {} episodes from {}",
                    programme_title.bold().green(),
                    episode_count.to_string().cyan(),
                    source
                ));
            }

            ProgressEvent::ResolvingAudio {
                episode_title,
                episode_index,
                total_episodes,
                ..
            } => {
                self.bar.set_message(format!(
                    "{HEADPHONES}[{}/{}] Resolving audio: {}",
                    (episode_index + 1).to_string().cyan(),
                    total_episodes.to_string().cyan(),
                    truncate_title(&episode_title, 40)
                ));
            }

            ProgressEvent::FeedWritten {
                slug,
                path,
                episode_count,
                with_audio,
            } => {
                self.bar.println(format!(
                    "{SUCCESS}{} • {} episodes, {} with audio → {}",
                    slug.green(),
                    episode_count.to_string().cyan(),
                    with_audio.to_string().cyan(),
                    path.display().to_string().dimmed()
                ));
            }

            ProgressEvent::FeedFailed { slug, error } => {
                self.bar
                    .println(format!("{FAILURE}{} - {}", slug.red(), error.red()));
            }

            ProgressEvent::RunCompleted {
                written_count,
                skipped_count,
                failed_count,
            } => {
                self.bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} written, {} skipped, {} failed",
                    "Done:".bold().green(),
                    written_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let truncated: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let quiet = args.quiet;
    let config = args.into_config().context("Invalid configuration")?;

    if !quiet {
        println!(
            "\n{}{} {}\n",
            RADIO,
            "radiocast".bold().magenta(),
            "- Radio programme feeds".dimmed()
        );
    }

    let client = ReqwestClient::from_settings(&config.http).context("Failed to build HTTP client")?;

    let reporter: SharedProgressReporter = if quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let summary = run(&client, &config, &RssEmitter::new(), reporter)
        .await
        .context("Failed to build feeds")?;

    if !quiet {
        let problems = summary.skipped.iter().chain(summary.failed.iter());
        let mut header_printed = false;
        for (slug, error) in problems {
            if !header_printed {
                println!("\n{}", "Programmes without a feed:".red().bold());
                header_printed = true;
            }
            println!("  {}{} - {}", CROSS, slug.yellow(), error.dimmed());
        }

        println!(
            "\n{FOLDER}Output: {}\n",
            config.output_dir.display().to_string().cyan()
        );
    }

    if summary.written.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
