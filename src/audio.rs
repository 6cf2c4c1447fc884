// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-episode audio URLs built from Omny Studio identifiers.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::episode::CanonicalEpisode;
use crate::extract::{discover_org_id, find_clip_id, locate_page_data};
use crate::http::HttpClient;

/// The three identifiers that address one clip on the audio host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioIdentifierTriple {
    pub org_id: String,
    pub show_id: String,
    pub clip_id: String,
}

impl AudioIdentifierTriple {
    pub fn audio_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "https://traffic.omny.fm/d/clips/{}/{}/{}/audio.mp3",
            self.org_id, self.show_id, self.clip_id
        ))
    }
}

/// Run-wide organisation identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrgId {
    /// No programme page has been seen yet
    #[default]
    Undiscovered,
    Known(String),
    /// Discovery failed on the first programme page
    Unavailable,
}

/// State shared across the programmes of one run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    org_id: OrgId,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a configured orgId; discovery is skipped
    pub fn with_org_id(org_id: &str) -> Self {
        Self {
            org_id: OrgId::Known(org_id.to_string()),
        }
    }

    pub fn org_id(&self) -> Option<&str> {
        match &self.org_id {
            OrgId::Known(id) => Some(id),
            _ => None,
        }
    }

    pub fn org_id_state(&self) -> &OrgId {
        &self.org_id
    }

    /// Discover the orgId from the first programme page fetched in the run
    ///
    /// Later pages never change the outcome, including a failed discovery.
    pub fn observe_programme_page(&mut self, html: &str, tree: Option<&Value>) -> Option<&str> {
        if self.org_id == OrgId::Undiscovered {
            self.org_id = match discover_org_id(html, tree) {
                Some(id) => {
                    debug!(org_id = %id, "Discovered organisation id");
                    OrgId::Known(id)
                }
                None => {
                    warn!("No organisation id on the first programme page; constructed audio URLs are disabled for this run");
                    OrgId::Unavailable
                }
            };
        }

        self.org_id()
    }
}

/// How an episode's audio URL was settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioResolution {
    /// The extracted record already carried an audio URL
    Inline,
    /// Built from the identifier triple
    Constructed,
    /// orgId or showId unknown; the episode page was not fetched
    MissingIdentifiers,
    /// The episode page could not be fetched
    PageUnavailable,
    /// The episode page had no clip identifier
    ClipNotFound,
}

impl AudioResolution {
    pub fn has_audio(&self) -> bool {
        matches!(self, Self::Inline | Self::Constructed)
    }
}

/// Settle the audio URL of one episode
///
/// An inline URL always wins. Otherwise the episode page is fetched for its
/// clip identifier, but only when both orgId and showId are known. Failures
/// leave the episode without audio and never propagate.
pub async fn resolve_audio<C: HttpClient + ?Sized>(
    client: &C,
    episode: &mut CanonicalEpisode,
    org_id: Option<&str>,
    show_id: Option<&str>,
) -> AudioResolution {
    if episode.audio_url.is_some() {
        return AudioResolution::Inline;
    }

    let (Some(org_id), Some(show_id)) = (org_id, show_id) else {
        return AudioResolution::MissingIdentifiers;
    };

    let html = match client.get_text(episode.url.as_str()).await {
        Ok(html) => html,
        Err(e) => {
            warn!(episode = %episode.url, error = %e, "Episode page unavailable");
            return AudioResolution::PageUnavailable;
        }
    };

    let tree = locate_page_data(&html).ok();
    let Some(clip_id) = find_clip_id(&html, tree.as_ref()) else {
        debug!(episode = %episode.url, "No clip id on episode page");
        return AudioResolution::ClipNotFound;
    };

    let triple = AudioIdentifierTriple {
        org_id: org_id.to_string(),
        show_id: show_id.to_string(),
        clip_id,
    };

    match triple.audio_url() {
        Ok(url) => {
            episode.audio_url = Some(url);
            episode.clip_id = Some(triple.clip_id);
            AudioResolution::Constructed
        }
        Err(e) => {
            warn!(episode = %episode.url, error = %e, "Could not build audio URL");
            AudioResolution::ClipNotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ORG: &str = "02b00798-16d7-4067-89ac-aba000ffd8cb";
    const SHOW: &str = "85ea9d91-cb57-46c4-a9c6-abe601048b69";
    const CLIP: &str = "0b239285-ff32-4160-aad8-b38800644870";

    /// Serves canned pages and records every requested URL
    #[derive(Default)]
    struct MockClient {
        pages: HashMap<String, String>,
        timeouts: Vec<String>,
        requests: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn with_timeout(mut self, url: &str) -> Self {
            self.timeouts.push(url.to_string());
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn get_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if self.timeouts.iter().any(|u| u == url) {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                });
            }
            self.pages
                .get(url)
                .map(|html| Bytes::from(html.clone()))
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    const EPISODE_URL: &str = "https://www.fbi.radio/programs/jack-off/episodes/ep-a";

    fn episode() -> CanonicalEpisode {
        CanonicalEpisode::new("Ep A", Url::parse(EPISODE_URL).unwrap())
    }

    fn episode_page() -> String {
        format!(
            r#"<html><script>window.__NUXT__ = {{"episode": {{"omnyStudioClip": {{"uuid": "{CLIP}"}}}}}};</script></html>"#
        )
    }

    #[test]
    fn builds_omny_url() {
        let triple = AudioIdentifierTriple {
            org_id: ORG.to_string(),
            show_id: SHOW.to_string(),
            clip_id: CLIP.to_string(),
        };
        assert_eq!(
            triple.audio_url().unwrap().as_str(),
            format!("https://traffic.omny.fm/d/clips/{ORG}/{SHOW}/{CLIP}/audio.mp3")
        );
    }

    #[tokio::test]
    async fn constructs_url_from_episode_page() {
        let client = MockClient::default().with_page(EPISODE_URL, &episode_page());
        let mut episode = episode();

        let resolution = resolve_audio(&client, &mut episode, Some(ORG), Some(SHOW)).await;

        assert_eq!(resolution, AudioResolution::Constructed);
        assert!(resolution.has_audio());
        assert_eq!(episode.clip_id.as_deref(), Some(CLIP));
        assert!(
            episode
                .audio_url
                .as_ref()
                .unwrap()
                .as_str()
                .ends_with(&format!("{SHOW}/{CLIP}/audio.mp3"))
        );
    }

    #[tokio::test]
    async fn inline_url_wins_without_fetching() {
        let client = MockClient::default().with_page(EPISODE_URL, &episode_page());
        let mut episode = episode();
        episode.audio_url = Some(Url::parse("https://cdn.example.com/ep-a.mp3").unwrap());

        let resolution = resolve_audio(&client, &mut episode, Some(ORG), Some(SHOW)).await;

        assert_eq!(resolution, AudioResolution::Inline);
        assert_eq!(client.request_count(), 0);
        assert_eq!(
            episode.audio_url.unwrap().as_str(),
            "https://cdn.example.com/ep-a.mp3"
        );
    }

    #[tokio::test]
    async fn missing_show_id_skips_fetch() {
        let client = MockClient::default().with_page(EPISODE_URL, &episode_page());
        let mut episode = episode();

        let resolution = resolve_audio(&client, &mut episode, Some(ORG), None).await;

        assert_eq!(resolution, AudioResolution::MissingIdentifiers);
        assert_eq!(client.request_count(), 0);
        assert!(episode.audio_url.is_none());
    }

    #[tokio::test]
    async fn missing_org_id_skips_fetch() {
        let client = MockClient::default().with_page(EPISODE_URL, &episode_page());
        let mut episode = episode();

        let resolution = resolve_audio(&client, &mut episode, None, Some(SHOW)).await;

        assert_eq!(resolution, AudioResolution::MissingIdentifiers);
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn timeout_leaves_audio_absent() {
        let client = MockClient::default().with_timeout(EPISODE_URL);
        let mut episode = episode();

        let resolution = resolve_audio(&client, &mut episode, Some(ORG), Some(SHOW)).await;

        assert_eq!(resolution, AudioResolution::PageUnavailable);
        assert!(!resolution.has_audio());
        assert!(episode.audio_url.is_none());
        assert_eq!(episode.title, "Ep A");
    }

    #[tokio::test]
    async fn page_without_clip_id() {
        let client = MockClient::default().with_page(EPISODE_URL, "<html><p>No player</p></html>");
        let mut episode = episode();

        let resolution = resolve_audio(&client, &mut episode, Some(ORG), Some(SHOW)).await;

        assert_eq!(resolution, AudioResolution::ClipNotFound);
        assert!(episode.audio_url.is_none());
        assert!(episode.clip_id.is_none());
    }

    #[test]
    fn org_id_is_discovered_once() {
        let mut context = RunContext::new();
        assert_eq!(context.org_id_state(), &OrgId::Undiscovered);

        let first = format!(r#"omnyStudio: {{ orgId: "{ORG}" }}"#);
        assert_eq!(context.observe_programme_page(&first, None), Some(ORG));

        let other = "11111111-2222-3333-4444-555555555555";
        let second = format!(r#"omnyStudio: {{ orgId: "{other}" }}"#);
        assert_eq!(context.observe_programme_page(&second, None), Some(ORG));
    }

    #[test]
    fn failed_discovery_sticks_for_the_run() {
        let mut context = RunContext::new();
        assert_eq!(context.observe_programme_page("<html></html>", None), None);
        assert_eq!(context.org_id_state(), &OrgId::Unavailable);

        let later = format!(r#"omnyStudio: {{ orgId: "{ORG}" }}"#);
        assert_eq!(context.observe_programme_page(&later, None), None);
    }

    #[test]
    fn configured_org_id_bypasses_discovery() {
        let mut context = RunContext::with_org_id(ORG);
        assert_eq!(context.observe_programme_page("<html></html>", None), Some(ORG));
    }
}
