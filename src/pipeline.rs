// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::audio::{RunContext, resolve_audio};
use crate::config::{ExtractionMode, Programme, RunConfig};
use crate::episode::{NormalizeOptions, RawEpisodeRecord, normalize_episodes, order_episodes};
use crate::error::{FeedError, ProgrammeError, RunError};
use crate::extract::{
    collect_episode_records, discover_show_id, extract_episode_links, locate_page_data,
    page_heading, page_image,
};
use crate::feed::{FeedEmitter, ProgrammeFeed, write_feed};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// A feed file produced by a run
#[derive(Debug, Clone)]
pub struct WrittenFeed {
    pub slug: String,
    pub path: PathBuf,
    pub episode_count: usize,
    pub with_audio: usize,
}

/// Result of a run over all configured programmes
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<WrittenFeed>,
    /// Programmes whose page could not be scraped (slug, error message)
    pub skipped: Vec<(String, String)>,
    /// Programmes whose feed could not be rendered or written (slug, error message)
    pub failed: Vec<(String, String)>,
}

/// Scrape, normalize and publish every configured programme in order
///
/// Only configuration errors abort the run. A programme whose page is
/// unavailable is skipped and a feed that cannot be written is recorded as
/// failed; either way the remaining programmes are still processed.
pub async fn run<C, E>(
    client: &C,
    config: &RunConfig,
    emitter: &E,
    reporter: SharedProgressReporter,
) -> Result<RunSummary, RunError>
where
    C: HttpClient + ?Sized,
    E: FeedEmitter + ?Sized,
{
    config.validate()?;

    let mut context = match config.org_id.as_deref().map(str::trim) {
        Some(org_id) if !org_id.is_empty() => RunContext::with_org_id(org_id),
        _ => RunContext::new(),
    };

    let total_programmes = config.programmes.len();
    reporter.report(ProgressEvent::RunStarting { total_programmes });

    let mut summary = RunSummary::default();

    for (programme_index, programme) in config.programmes.iter().enumerate() {
        reporter.report(ProgressEvent::FetchingProgramme {
            slug: programme.slug.clone(),
            url: config
                .programme_url(programme)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| programme.slug.clone()),
            programme_index,
            total_programmes,
        });

        match process_programme(client, &mut context, config, programme, emitter, &reporter).await
        {
            Ok((feed, path)) => {
                let written = WrittenFeed {
                    slug: programme.slug.clone(),
                    path,
                    episode_count: feed.episodes.len(),
                    with_audio: feed.episodes_with_audio(),
                };
                info!(
                    programme = %written.slug,
                    episodes = written.episode_count,
                    with_audio = written.with_audio,
                    path = %written.path.display(),
                    "Feed written"
                );
                reporter.report(ProgressEvent::FeedWritten {
                    slug: written.slug.clone(),
                    path: written.path.clone(),
                    episode_count: written.episode_count,
                    with_audio: written.with_audio,
                });
                summary.written.push(written);
            }
            Err(ProgrammeError::Feed(e)) => {
                warn!(programme = %programme.slug, error = %e, "Feed could not be written");
                reporter.report(ProgressEvent::FeedFailed {
                    slug: programme.slug.clone(),
                    error: e.to_string(),
                });
                summary.failed.push((programme.slug.clone(), e.to_string()));
            }
            Err(e) => {
                warn!(programme = %programme.slug, error = %e, "Skipping programme");
                reporter.report(ProgressEvent::ProgrammeSkipped {
                    slug: programme.slug.clone(),
                    error: e.to_string(),
                });
                summary.skipped.push((programme.slug.clone(), e.to_string()));
            }
        }
    }

    reporter.report(ProgressEvent::RunCompleted {
        written_count: summary.written.len(),
        skipped_count: summary.skipped.len(),
        failed_count: summary.failed.len(),
    });

    Ok(summary)
}

async fn process_programme<C, E>(
    client: &C,
    context: &mut RunContext,
    config: &RunConfig,
    programme: &Programme,
    emitter: &E,
    reporter: &SharedProgressReporter,
) -> Result<(ProgrammeFeed, PathBuf), ProgrammeError>
where
    C: HttpClient + ?Sized,
    E: FeedEmitter + ?Sized,
{
    let feed = scrape_programme(client, context, config, programme, reporter).await?;
    let path = publish_feed(emitter, &feed, &config.output_dir)?;
    Ok((feed, path))
}

/// Build the feed contents for one programme
///
/// Fails only when the programme page itself cannot be fetched. Every later
/// problem degrades the result: missing identifiers or unavailable episode
/// pages leave episodes without audio.
pub async fn scrape_programme<C: HttpClient + ?Sized>(
    client: &C,
    context: &mut RunContext,
    config: &RunConfig,
    programme: &Programme,
    reporter: &SharedProgressReporter,
) -> Result<ProgrammeFeed, ProgrammeError> {
    let page_url = config.programme_url(programme)?;
    let html = client.get_text(page_url.as_str()).await?;

    let tree = match locate_page_data(&html) {
        Ok(tree) => Some(tree),
        Err(e) => {
            debug!(programme = %programme.slug, reason = %e, "No usable embedded data");
            None
        }
    };

    let org_id = context
        .observe_programme_page(&html, tree.as_ref())
        .map(String::from);

    let show_id = programme
        .show_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| discover_show_id(&html, tree.as_ref()));
    if show_id.is_none() {
        warn!(programme = %programme.slug, "No show id configured or discovered; episodes will lack audio");
    }

    let (records, from_embedded_data) =
        extract_records(&html, tree.as_ref(), &page_url, programme, config.extraction);

    let options = NormalizeOptions {
        strip_description_markup: config.strip_description_markup,
    };
    let mut episodes = normalize_episodes(records, &page_url, &options);

    let title = if programme.title.trim().is_empty() {
        page_heading(&html).unwrap_or_else(|| programme.slug.clone())
    } else {
        programme.title.trim().to_string()
    };

    reporter.report(ProgressEvent::EpisodesExtracted {
        slug: programme.slug.clone(),
        programme_title: title.clone(),
        episode_count: episodes.len(),
        from_embedded_data,
    });

    let total_episodes = episodes.len();
    let mut with_audio = 0;
    for (episode_index, episode) in episodes.iter_mut().enumerate() {
        reporter.report(ProgressEvent::ResolvingAudio {
            slug: programme.slug.clone(),
            episode_title: episode.title.clone(),
            episode_index,
            total_episodes,
        });

        let resolution =
            resolve_audio(client, episode, org_id.as_deref(), show_id.as_deref()).await;
        debug!(episode = %episode.url, ?resolution, "Audio resolved");
        if resolution.has_audio() {
            with_audio += 1;
        }
    }

    if with_audio < total_episodes {
        info!(
            programme = %programme.slug,
            with_audio,
            total_episodes,
            "Some episodes have no audio"
        );
    }

    let description = format!("Podcast feed for {} on {}", title, config.site_name);

    Ok(ProgrammeFeed {
        slug: programme.slug.clone(),
        title,
        description,
        image_url: programme
            .image_url
            .clone()
            .or_else(|| page_image(&html)),
        link: page_url,
        episodes: order_episodes(episodes),
    })
}

/// Gather raw records from the embedded data and, when needed, the page anchors
///
/// Returns the records and whether any came from embedded data.
fn extract_records(
    html: &str,
    tree: Option<&Value>,
    page_url: &Url,
    programme: &Programme,
    mode: ExtractionMode,
) -> (Vec<RawEpisodeRecord>, bool) {
    let mut records: Vec<RawEpisodeRecord> = tree
        .map(|tree| collect_episode_records(tree, page_url))
        .unwrap_or_default()
        .into_iter()
        .map(RawEpisodeRecord::from)
        .collect();

    let from_embedded_data = !records.is_empty();
    if from_embedded_data && mode == ExtractionMode::Fallback {
        return (records, true);
    }

    if tree.is_some() && !from_embedded_data {
        debug!(programme = %programme.slug, "Embedded data holds no episodes");
    }

    records.extend(
        extract_episode_links(html, page_url, &programme.slug)
            .into_iter()
            .map(RawEpisodeRecord::from),
    );

    (records, from_embedded_data)
}

/// Render a feed, re-apply the episode order and write it to `output_dir`
pub fn publish_feed<E: FeedEmitter + ?Sized>(
    emitter: &E,
    feed: &ProgrammeFeed,
    output_dir: &Path,
) -> Result<PathBuf, FeedError> {
    let document = emitter.emit(feed)?;
    let document = emitter.reorder(&document, &feed.episode_order())?;
    write_feed(output_dir, &feed.slug, &document)
}
