// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::episode::StructuralRecord;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static IMAGE_META_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="og:image"], meta[name="og:image"], meta[name="twitter:image"]"#,
    )
    .unwrap()
});

/// Extract episode link candidates from the anchors of a programme page
///
/// Anchors qualify when their target is on the same host and its path ends in
/// `/episode/<slug>` or `/episodes/<slug>`. When a segment precedes the
/// `episodes` segment it must be the programme slug, which keeps links to other
/// programmes' episodes out.
pub fn extract_episode_links(html: &str, page_url: &Url, programme_slug: &str) -> Vec<StructuralRecord> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = page_url.join(href.trim()).ok()?;

            if !same_site(&url, page_url) || !is_episode_path(&url, programme_slug) {
                return None;
            }

            Some(StructuralRecord {
                title: anchor_title(&anchor),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Hosts match when equal after dropping a leading `www.`
fn same_site(url: &Url, page_url: &Url) -> bool {
    let bare = |url: &Url| {
        url.host_str()
            .map(|host| host.trim_start_matches("www.").to_ascii_lowercase())
    };
    bare(url).is_some() && bare(url) == bare(page_url)
}

fn is_episode_path(url: &Url, programme_slug: &str) -> bool {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let Some(position) = segments
        .iter()
        .position(|s| *s == "episode" || *s == "episodes")
    else {
        return false;
    };

    // exactly one segment (the episode slug) after the marker
    if position + 2 != segments.len() {
        return false;
    }

    position == 0 || segments[position - 1] == programme_slug
}

/// Visible anchor text, falling back to the title or aria-label attribute
fn anchor_title(anchor: &ElementRef) -> String {
    let text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
    if !text.is_empty() {
        return text;
    }

    ["title", "aria-label"]
        .iter()
        .filter_map(|attr| anchor.value().attr(attr))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the page's first `<h1>`
pub fn page_heading(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING_SELECTOR)
        .map(|h1| collapse_whitespace(&h1.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
}

/// Artwork advertised through Open Graph or Twitter card meta tags
pub fn page_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&IMAGE_META_SELECTOR)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| content.starts_with("http://") || content.starts_with("https://"))
        .map(String::from)
}
