// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::EmbeddedDataError;

/// Global state assignment emitted by the page's rendering framework,
/// e.g. `window.__NUXT__ = {...}` or `window.__DATA__={...}`
static STATE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\.__[A-Za-z0-9_]+__\s*=\s*").unwrap());

static LD_JSON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Locate and decode the JSON state blob assigned after the first marker
pub fn locate_embedded_data(html: &str) -> Result<Value, EmbeddedDataError> {
    let marker = STATE_MARKER_RE
        .find(html)
        .ok_or(EmbeddedDataError::NotFound)?;

    let payload = html[marker.end()..].trim_start();

    match payload.as_bytes().first() {
        None | Some(b';') | Some(b'<') => return Err(EmbeddedDataError::NotFound),
        Some(b'{') | Some(b'[') => {}
        Some(_) => {
            return Err(EmbeddedDataError::Malformed {
                reason: "assignment is not a JSON object or array".to_string(),
            });
        }
    }

    let json = balanced_json_slice(payload).ok_or_else(|| EmbeddedDataError::Malformed {
        reason: "unbalanced braces (payload truncated?)".to_string(),
    })?;

    let value: Value = serde_json::from_str(json)?;

    if is_empty_container(&value) {
        return Err(EmbeddedDataError::NotFound);
    }

    Ok(value)
}

/// Locate embedded page data, trying JSON-LD blocks when no state marker exists
pub fn locate_page_data(html: &str) -> Result<Value, EmbeddedDataError> {
    match locate_embedded_data(html) {
        Err(EmbeddedDataError::NotFound) => {
            locate_json_ld(html).ok_or(EmbeddedDataError::NotFound)
        }
        other => other,
    }
}

/// First `application/ld+json` script whose content is a JSON object
pub fn locate_json_ld(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);

    document.select(&LD_JSON_SELECTOR).find_map(|script| {
        let text: String = script.text().collect();
        serde_json::from_str::<Value>(text.trim())
            .ok()
            .filter(|value| value.is_object() && !is_empty_container(value))
    })
}

/// Slice `text` from its leading `{`/`[` through the matching closing delimiter
///
/// Delimiters inside string literals (including escaped quotes) are ignored.
/// Returns `None` when the input ends before the outermost container closes.
pub fn balanced_json_slice(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Null => true,
        _ => false,
    }
}
