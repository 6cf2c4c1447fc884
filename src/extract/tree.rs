// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema-tolerant reading of embedded page data.
//!
//! The embedded blob changes shape between site versions, so nothing here
//! binds to a fixed structure: episodes are recognised by the keys they carry
//! wherever they appear in the tree.

use serde_json::{Map, Value};
use url::Url;

use crate::episode::EmbeddedRecord;

const TITLE_KEYS: &[&str] = &["title", "name"];
const DATE_KEYS: &[&str] = &[
    "airedAt",
    "date",
    "publishedAt",
    "pubDate",
    "published_at",
    "releaseDate",
    "datePublished",
    "uploadDate",
];
const URL_KEYS: &[&str] = &["url", "href", "link", "permalink"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary", "excerpt"];
const AUDIO_KEYS: &[&str] = &["audioUrl", "audio_url", "enclosureUrl", "mp3"];
/// Objects holding the audio of an episode rather than the episode itself
const MEDIA_KEYS: &[&str] = &["omnyStudioClip", "associatedMedia"];
const MEDIA_URL_KEYS: &[&str] = &["audioUrl", "audio_url", "contentUrl"];

/// Depth-first, document-order search returning the first `Some` produced by `f`
///
/// `f` sees every object and array before its children.
pub fn find_map<'a, T, F>(value: &'a Value, f: &mut F) -> Option<T>
where
    F: FnMut(&'a Value) -> Option<T>,
{
    if let Some(found) = f(value) {
        return Some(found);
    }

    let children: Box<dyn Iterator<Item = &'a Value>> = match value {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => return None,
    };

    for child in children {
        if let Some(found) = find_map(child, &mut *f) {
            return Some(found);
        }
    }

    None
}

/// First non-empty string stored under any of `keys`
pub fn str_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First string value stored under `key` anywhere in the tree that satisfies `accept`
pub fn find_string_key<'a>(
    tree: &'a Value,
    key: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    find_map(tree, &mut |value: &'a Value| {
        value
            .as_object()
            .and_then(|object| object.get(key))
            .and_then(Value::as_str)
            .filter(|s| accept(*s))
    })
}

/// Collect every episode-shaped object in the tree, in document order
///
/// An object is episode-shaped when it has a title, a publish date key and
/// either a URL or a slug. Episode objects are not searched further, so an
/// episode's nested references are never mistaken for episodes themselves.
pub fn collect_episode_records(tree: &Value, programme_url: &Url) -> Vec<EmbeddedRecord> {
    let mut records = Vec::new();
    collect_into(tree, programme_url, &mut records);
    records
}

fn collect_into(value: &Value, programme_url: &Url, records: &mut Vec<EmbeddedRecord>) {
    match value {
        Value::Object(object) => {
            if let Some(record) = episode_from_object(object, programme_url) {
                records.push(record);
                return;
            }
            for child in object.values() {
                collect_into(child, programme_url, records);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_into(child, programme_url, records);
            }
        }
        _ => {}
    }
}

fn episode_from_object(object: &Map<String, Value>, programme_url: &Url) -> Option<EmbeddedRecord> {
    if is_series(object) {
        return None;
    }

    let title = str_field(object, TITLE_KEYS)?;

    let has_date_key = DATE_KEYS.iter().any(|key| object.contains_key(*key));
    let url = str_field(object, URL_KEYS).map(String::from).or_else(|| {
        str_field(object, &["slug"]).map(|slug| episode_url_from_slug(programme_url, slug))
    });

    if !has_date_key || url.is_none() {
        return None;
    }

    Some(EmbeddedRecord {
        title: title.to_string(),
        published: str_field(object, DATE_KEYS).map(String::from),
        description: DESCRIPTION_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .map(description_text)
            .find(|text| !text.trim().is_empty()),
        url,
        audio_url: inline_audio_url(object),
    })
}

/// Episode pages live below the programme page, keyed by the episode slug
pub fn episode_url_from_slug(programme_url: &Url, slug: &str) -> String {
    format!(
        "{}/episodes/{}",
        programme_url.as_str().trim_end_matches('/'),
        slug.trim_matches('/')
    )
}

fn inline_audio_url(object: &Map<String, Value>) -> Option<String> {
    let is_http = |s: &&str| s.starts_with("http://") || s.starts_with("https://");

    str_field(object, AUDIO_KEYS)
        .filter(is_http)
        .or_else(|| {
            MEDIA_KEYS
                .iter()
                .filter_map(|key| object.get(*key))
                .flat_map(media_objects)
                .filter_map(|media| str_field(media, MEDIA_URL_KEYS))
                .find(is_http)
        })
        .map(String::from)
}

/// A media reference is either one object or a list of them
fn media_objects(value: &Value) -> Vec<&Map<String, Value>> {
    match value {
        Value::Object(object) => vec![object],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// schema.org series carry a name, a date and a URL of their own
fn is_series(object: &Map<String, Value>) -> bool {
    object
        .get("@type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.ends_with("Series"))
}

/// Text of a description that is either plain text or a rich-text tree
pub fn description_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(object) => {
            let blocks = object
                .get("root")
                .and_then(|root| root.get("children"))
                .or_else(|| object.get("children"));
            match blocks {
                Some(Value::Array(blocks)) => join_blocks(blocks),
                _ => inline_text(value),
            }
        }
        Value::Array(blocks) => join_blocks(blocks),
        _ => String::new(),
    }
}

fn join_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .map(inline_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Concatenated `text` leaves of a rich-text node
fn inline_text(node: &Value) -> String {
    match node {
        Value::Object(object) => {
            if let Some(text) = object.get("text").and_then(Value::as_str) {
                return text.to_string();
            }
            object
                .get("children")
                .map(inline_text)
                .unwrap_or_default()
        }
        Value::Array(children) => children.iter().map(inline_text).collect(),
        Value::String(text) => text.clone(),
        _ => String::new(),
    }
}
