// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::date::{date_from_url, parse_publish_date};
use super::record::{CanonicalEpisode, RawEpisodeRecord};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Options controlling how raw records become canonical episodes
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Remove markup from descriptions instead of passing it through
    pub strip_description_markup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSource {
    Embedded,
    Structural,
}

/// A record whose URL has been resolved, awaiting merge and validation
#[derive(Debug, Clone)]
struct Draft {
    source: RecordSource,
    url: Url,
    title: Option<String>,
    published: Option<String>,
    description: Option<String>,
    audio_url: Option<Url>,
}

impl Draft {
    fn from_record(record: RawEpisodeRecord, page_url: &Url) -> Option<Self> {
        match record {
            RawEpisodeRecord::Embedded(record) => Some(Self {
                source: RecordSource::Embedded,
                url: resolve_http_url(page_url, record.url.as_deref()?)?,
                title: non_empty(Some(record.title)),
                published: non_empty(record.published),
                description: non_empty(record.description),
                audio_url: record
                    .audio_url
                    .as_deref()
                    .and_then(|audio| resolve_http_url(page_url, audio)),
            }),
            RawEpisodeRecord::Structural(record) => Some(Self {
                source: RecordSource::Structural,
                url: resolve_http_url(page_url, &record.url)?,
                title: non_empty(Some(record.title)),
                published: None,
                description: None,
                audio_url: None,
            }),
        }
    }

    fn populated_fields(&self) -> usize {
        [
            self.title.is_some(),
            self.published.is_some(),
            self.description.is_some(),
            self.audio_url.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// Merge two drafts sharing a key, field by field
    ///
    /// Non-empty values always win over empty ones. When both are set the
    /// embedded record beats the structural one, and between records of the
    /// same kind the more populated one wins (the earlier one on ties).
    fn merge(self, other: Self) -> Self {
        let (primary, secondary) = match (self.source, other.source) {
            (RecordSource::Embedded, RecordSource::Structural) => (self, other),
            (RecordSource::Structural, RecordSource::Embedded) => (other, self),
            _ if other.populated_fields() > self.populated_fields() => (other, self),
            _ => (self, other),
        };

        Self {
            source: primary.source,
            url: primary.url,
            title: primary.title.or(secondary.title),
            published: primary.published.or(secondary.published),
            description: primary.description.or(secondary.description),
            audio_url: primary.audio_url.or(secondary.audio_url),
        }
    }

    fn into_episode(self, options: &NormalizeOptions) -> Option<CanonicalEpisode> {
        let title = self.title?;

        let published = self
            .published
            .as_deref()
            .and_then(parse_publish_date)
            .or_else(|| date_from_url(self.url.as_str()));

        let description = self
            .description
            .map(|description| {
                if options.strip_description_markup {
                    strip_markup(&description)
                } else {
                    description.trim().to_string()
                }
            })
            .unwrap_or_default();

        Some(CanonicalEpisode {
            title,
            published,
            description,
            url: self.url,
            audio_url: self.audio_url,
            clip_id: None,
        })
    }
}

/// Deduplication key: the absolute URL without trailing slashes
pub fn dedup_key(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Turn raw records from either extraction path into canonical episodes
///
/// Records without a resolvable http(s) URL are dropped, as are records whose
/// title is still empty after merging duplicates. Output keeps the order in
/// which each URL was first seen.
pub fn normalize_episodes(
    records: Vec<RawEpisodeRecord>,
    page_url: &Url,
    options: &NormalizeOptions,
) -> Vec<CanonicalEpisode> {
    let mut drafts: Vec<Draft> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for draft in records
        .into_iter()
        .filter_map(|record| Draft::from_record(record, page_url))
    {
        let key = dedup_key(&draft.url);
        match index_by_key.get(&key) {
            Some(&index) => {
                let existing = drafts[index].clone();
                drafts[index] = existing.merge(draft);
            }
            None => {
                index_by_key.insert(key, drafts.len());
                drafts.push(draft);
            }
        }
    }

    drafts
        .into_iter()
        .filter_map(|draft| draft.into_episode(options))
        .collect()
}

/// Remove tags and decode entities
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn resolve_http_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}
