// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery of the Omny Studio identifiers that make up an audio URL.
//!
//! Every lookup returns the first candidate: text patterns in document order
//! first, then embedded data in depth-first key order, then the segments of
//! an already rendered clip URL.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::tree::{find_map, find_string_key};

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ORG_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)omnyStudio[^}]*?orgId["']?\s*:\s*["']([^"']+)"#).unwrap()
});

static SHOW_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)omnyStudio[^}]*?showId["']?\s*:\s*["']([^"']+)"#).unwrap()
});

static CLIP_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)traffic\.omny\.fm/d/clips/([0-9a-f]{8}-[0-9a-f-]{27})/([0-9a-f]{8}-[0-9a-f-]{27})/([0-9a-f]{8}-[0-9a-f-]{27})/audio\.mp3",
    )
    .unwrap()
});

/// Whether `s` has the 8-4-4-4-12 hex shape of a UUID
pub fn is_uuid(s: &str) -> bool {
    UUID_RE.is_match(s)
}

/// Segments of the first rendered clip URL in the page
fn clip_url_segment(html: &str, index: usize) -> Option<String> {
    CLIP_URL_RE
        .captures(html)
        .and_then(|caps| caps.get(index))
        .map(|m| m.as_str().to_string())
        .filter(|s| is_uuid(s))
}

fn pattern_match(re: &Regex, html: &str) -> Option<String> {
    re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|s| is_uuid(s))
}

/// Organisation identifier shared by every programme of the site
pub fn discover_org_id(html: &str, tree: Option<&Value>) -> Option<String> {
    pattern_match(&ORG_ID_RE, html)
        .or_else(|| {
            tree.and_then(|tree| find_string_key(tree, "orgId", is_uuid))
                .map(String::from)
        })
        .or_else(|| clip_url_segment(html, 1))
}

/// Show identifier of the programme a page belongs to
pub fn discover_show_id(html: &str, tree: Option<&Value>) -> Option<String> {
    pattern_match(&SHOW_ID_RE, html)
        .or_else(|| {
            tree.and_then(|tree| {
                find_string_key(tree, "showId", is_uuid)
                    .or_else(|| find_string_key(tree, "omnyShowId", is_uuid))
            })
            .map(String::from)
        })
        .or_else(|| clip_url_segment(html, 2))
}

/// Clip identifier of the episode an episode page belongs to
pub fn find_clip_id(html: &str, tree: Option<&Value>) -> Option<String> {
    tree.and_then(clip_id_in_tree)
        .or_else(|| clip_url_segment(html, 3))
}

fn clip_id_in_tree(tree: &Value) -> Option<String> {
    let referenced = find_map(tree, &mut |value: &Value| {
        let clip = value.as_object()?.get("omnyStudioClip")?;
        match clip {
            Value::String(id) if is_uuid(id) => Some(id.clone()),
            Value::Object(clip) => ["uuid", "id"]
                .iter()
                .filter_map(|key| clip.get(*key).and_then(Value::as_str))
                .find(|id| is_uuid(id))
                .map(String::from),
            _ => None,
        }
    });

    referenced
        .or_else(|| {
            find_map(tree, &mut |value: &Value| {
                let object = value.as_object()?;
                let typename = object.get("__typename")?.as_str()?;
                if !typename.to_ascii_lowercase().contains("clip") {
                    return None;
                }
                object
                    .get("uuid")
                    .and_then(Value::as_str)
                    .filter(|id| is_uuid(id))
                    .map(String::from)
            })
        })
        .or_else(|| find_string_key(tree, "clipId", is_uuid).map(String::from))
}
