// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{BTreeMap, HashMap};

use rss::extension::itunes::{self, ITunesCategory, ITunesChannelExtension, ITunesItemExtension};
use rss::{Channel, Enclosure, Guid, Image, Item};
use url::Url;

use crate::episode::CanonicalEpisode;
use crate::error::FeedError;

const FEED_LANGUAGE: &str = "en";
const ITUNES_CATEGORY: &str = "Music";
const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Everything needed to render one programme's feed
#[derive(Debug, Clone)]
pub struct ProgrammeFeed {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// The programme page
    pub link: Url,
    pub image_url: Option<String>,
    /// Episodes in feed order
    pub episodes: Vec<CanonicalEpisode>,
}

impl ProgrammeFeed {
    pub fn episodes_with_audio(&self) -> usize {
        self.episodes
            .iter()
            .filter(|episode| episode.audio_url.is_some())
            .count()
    }

    /// Episode URLs in feed order, the key `reorder` sorts by
    pub fn episode_order(&self) -> Vec<String> {
        self.episodes
            .iter()
            .map(|episode| episode.url.to_string())
            .collect()
    }
}

/// Serializes programme feeds into documents
pub trait FeedEmitter: Send + Sync {
    /// Render a complete feed document
    fn emit(&self, feed: &ProgrammeFeed) -> Result<String, FeedError>;

    /// Rewrite a rendered document so its items follow `order` (episode URLs)
    fn reorder(&self, document: &str, order: &[String]) -> Result<String, FeedError>;
}

/// RSS 2.0 emitter with iTunes podcast tags
#[derive(Debug, Clone)]
pub struct RssEmitter {
    generator: String,
}

impl RssEmitter {
    pub fn new() -> Self {
        Self {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    fn channel(&self, feed: &ProgrammeFeed) -> Channel {
        let mut channel = Channel::default();
        channel.set_title(feed.title.clone());
        channel.set_link(feed.link.to_string());
        channel.set_description(feed.description.clone());
        channel.set_language(FEED_LANGUAGE.to_string());
        channel.set_generator(self.generator.clone());
        channel.set_namespaces(BTreeMap::from([(
            "itunes".to_string(),
            itunes::NAMESPACE.to_string(),
        )]));

        if let Some(image_url) = &feed.image_url {
            let mut image = Image::default();
            image.set_url(image_url.clone());
            image.set_title(feed.title.clone());
            image.set_link(feed.link.to_string());
            channel.set_image(image);
        }

        let mut category = ITunesCategory::default();
        category.set_text(ITUNES_CATEGORY);

        let mut itunes_ext = ITunesChannelExtension::default();
        itunes_ext.set_image(feed.image_url.clone());
        itunes_ext.set_categories(vec![category]);
        itunes_ext.set_summary(feed.description.clone());
        channel.set_itunes_ext(itunes_ext);

        channel.set_items(
            feed.episodes
                .iter()
                .map(|episode| item(episode, feed.image_url.as_deref()))
                .collect::<Vec<_>>(),
        );

        channel
    }
}

impl Default for RssEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn item(episode: &CanonicalEpisode, image_url: Option<&str>) -> Item {
    let mut item = Item::default();
    item.set_title(episode.title.clone());
    item.set_link(episode.url.to_string());

    let mut guid = Guid::default();
    guid.set_value(episode.url.to_string());
    guid.set_permalink(true);
    item.set_guid(guid);

    if let Some(published) = &episode.published {
        item.set_pub_date(published.to_rfc2822());
    }

    if !episode.description.is_empty() {
        item.set_description(episode.description.clone());
    }

    if let Some(audio_url) = &episode.audio_url {
        let mut enclosure = Enclosure::default();
        enclosure.set_url(audio_url.to_string());
        enclosure.set_length("0");
        enclosure.set_mime_type(AUDIO_MIME_TYPE);
        item.set_enclosure(enclosure);
    }

    if let Some(image_url) = image_url {
        let mut itunes_ext = ITunesItemExtension::default();
        itunes_ext.set_image(image_url.to_string());
        item.set_itunes_ext(itunes_ext);
    }

    item
}

fn serialize(channel: &Channel) -> Result<String, FeedError> {
    let bytes = channel
        .write_to(Vec::new())
        .map_err(FeedError::SerializeFailed)?;
    Ok(String::from_utf8(bytes)?)
}

/// Stable sort of items by their guid's position in `order`; unknown items go last
fn reorder_items(items: &mut [Item], order: &[String]) {
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(index, key)| (key.trim_end_matches('/'), index))
        .collect();

    items.sort_by_key(|item| {
        item.guid()
            .and_then(|guid| rank.get(guid.value().trim_end_matches('/')))
            .copied()
            .unwrap_or(usize::MAX)
    });
}

impl FeedEmitter for RssEmitter {
    fn emit(&self, feed: &ProgrammeFeed) -> Result<String, FeedError> {
        serialize(&self.channel(feed))
    }

    fn reorder(&self, document: &str, order: &[String]) -> Result<String, FeedError> {
        let mut channel =
            Channel::read_from(document.as_bytes()).map_err(FeedError::ParseFailed)?;

        let mut items = channel.items().to_vec();
        reorder_items(&mut items, order);
        channel.set_items(items);

        serialize(&channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::parse_publish_date;

    fn episode(slug: &str, date: Option<&str>) -> CanonicalEpisode {
        let url = Url::parse(&format!("https://www.fbi.radio/programs/jack-off/episodes/{slug}"))
            .unwrap();
        let mut episode = CanonicalEpisode::new(&format!("Episode {slug}"), url);
        episode.published = date.and_then(parse_publish_date);
        episode
    }

    fn feed(episodes: Vec<CanonicalEpisode>) -> ProgrammeFeed {
        ProgrammeFeed {
            slug: "jack-off".to_string(),
            title: "Jack Off".to_string(),
            description: "Podcast feed for Jack Off on FBi Radio".to_string(),
            link: Url::parse("https://www.fbi.radio/programs/jack-off").unwrap(),
            image_url: Some("https://media.fbi.radio/images/jack-off.jpg".to_string()),
            episodes,
        }
    }

    fn parse(document: &str) -> Channel {
        Channel::read_from(document.as_bytes()).unwrap()
    }

    #[test]
    fn emits_channel_metadata() {
        let document = RssEmitter::new().emit(&feed(vec![])).unwrap();
        let channel = parse(&document);

        assert_eq!(channel.title(), "Jack Off");
        assert_eq!(channel.link(), "https://www.fbi.radio/programs/jack-off");
        assert_eq!(channel.language(), Some("en"));
        assert!(channel.generator().unwrap().starts_with("radiocast"));
        assert_eq!(
            channel.image().map(|image| image.url()),
            Some("https://media.fbi.radio/images/jack-off.jpg")
        );
        assert!(document.contains("xmlns:itunes"));
        let itunes = channel.itunes_ext().unwrap();
        assert_eq!(itunes.categories()[0].text(), "Music");
        assert!(channel.items().is_empty());
    }

    #[test]
    fn emits_items_with_guid_date_and_enclosure() {
        let mut with_audio = episode("ep-a", Some("2025-10-28"));
        with_audio.description = "Tonight's show".to_string();
        with_audio.audio_url = Some(Url::parse("https://traffic.omny.fm/d/clips/o/s/c/audio.mp3").unwrap());

        let document = RssEmitter::new()
            .emit(&feed(vec![with_audio, episode("ep-b", None)]))
            .unwrap();
        let channel = parse(&document);
        let items = channel.items();

        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title(), Some("Episode ep-a"));
        assert_eq!(
            first.guid().map(|g| g.value()),
            Some("https://www.fbi.radio/programs/jack-off/episodes/ep-a")
        );
        assert!(first.guid().unwrap().is_permalink());
        assert_eq!(first.pub_date(), Some("Tue, 28 Oct 2025 00:00:00 +0000"));
        assert_eq!(first.description(), Some("Tonight's show"));
        let enclosure = first.enclosure().unwrap();
        assert_eq!(enclosure.mime_type(), "audio/mpeg");
        assert_eq!(enclosure.length(), "0");

        let second = &items[1];
        assert!(second.pub_date().is_none());
        assert!(second.enclosure().is_none());
        assert!(second.description().is_none());
    }

    #[test]
    fn reorder_applies_given_order() {
        let emitter = RssEmitter::new();
        let episodes = vec![
            episode("a", None),
            episode("b", None),
            episode("c", None),
        ];
        let document = emitter.emit(&feed(episodes)).unwrap();

        let order = vec![
            "https://www.fbi.radio/programs/jack-off/episodes/c".to_string(),
            "https://www.fbi.radio/programs/jack-off/episodes/a/".to_string(),
        ];
        let reordered = emitter.reorder(&document, &order).unwrap();

        let titles: Vec<_> = parse(&reordered)
            .items()
            .iter()
            .map(|item| item.title().unwrap().to_string())
            .collect();
        // unknown items keep their relative order at the end
        assert_eq!(titles, vec!["Episode c", "Episode a", "Episode b"]);
    }

    #[test]
    fn reorder_rejects_invalid_document() {
        let result = RssEmitter::new().reorder("not xml at all", &[]);
        assert!(matches!(result, Err(FeedError::ParseFailed(_))));
    }

    #[test]
    fn episode_order_follows_feed() {
        let feed = feed(vec![episode("b", None), episode("a", None)]);
        assert_eq!(
            feed.episode_order(),
            vec![
                "https://www.fbi.radio/programs/jack-off/episodes/b".to_string(),
                "https://www.fbi.radio/programs/jack-off/episodes/a".to_string(),
            ]
        );
        assert_eq!(feed.episodes_with_audio(), 0);
    }
}
