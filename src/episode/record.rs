// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset};
use url::Url;

/// Episode found in the page's embedded JSON state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedRecord {
    pub title: String,
    /// Publish date exactly as the page stores it
    pub published: Option<String>,
    pub description: Option<String>,
    /// Episode page URL, possibly relative
    pub url: Option<String>,
    pub audio_url: Option<String>,
}

/// Episode link found by walking the page's anchors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralRecord {
    pub title: String,
    pub url: String,
}

/// An episode as extracted, before validation and deduplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEpisodeRecord {
    Embedded(EmbeddedRecord),
    Structural(StructuralRecord),
}

impl From<EmbeddedRecord> for RawEpisodeRecord {
    fn from(record: EmbeddedRecord) -> Self {
        Self::Embedded(record)
    }
}

impl From<StructuralRecord> for RawEpisodeRecord {
    fn from(record: StructuralRecord) -> Self {
        Self::Structural(record)
    }
}

/// A validated, deduplicated episode ready for audio resolution and emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEpisode {
    pub title: String,
    /// `None` when the date is unknown; such episodes sort last
    pub published: Option<DateTime<FixedOffset>>,
    pub description: String,
    pub url: Url,
    pub audio_url: Option<Url>,
    pub clip_id: Option<String>,
}

impl CanonicalEpisode {
    pub fn new(title: &str, url: Url) -> Self {
        Self {
            title: title.to_string(),
            published: None,
            description: String::new(),
            url,
            audio_url: None,
            clip_id: None,
        }
    }
}
