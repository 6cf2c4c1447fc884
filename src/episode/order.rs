// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;

use super::record::CanonicalEpisode;

/// Sort episodes newest first, undated episodes last
///
/// The sort is stable: equal dates and undated episodes keep their
/// extraction order.
pub fn order_episodes(mut episodes: Vec<CanonicalEpisode>) -> Vec<CanonicalEpisode> {
    episodes.sort_by(|a, b| match (&a.published, &b.published) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    episodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::parse_publish_date;
    use url::Url;

    fn episode(title: &str, date: Option<&str>) -> CanonicalEpisode {
        let url = Url::parse(&format!("https://www.fbi.radio/episode/{title}")).unwrap();
        let mut episode = CanonicalEpisode::new(title, url);
        episode.published = date.and_then(parse_publish_date);
        episode
    }

    fn titles(episodes: &[CanonicalEpisode]) -> Vec<&str> {
        episodes.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn newest_first() {
        let ordered = order_episodes(vec![
            episode("Ep1", Some("2024-01-01")),
            episode("Ep2", Some("2024-02-01")),
        ]);
        assert_eq!(titles(&ordered), vec!["Ep2", "Ep1"]);
    }

    #[test]
    fn undated_episodes_go_last_in_original_order() {
        let ordered = order_episodes(vec![
            episode("X", None),
            episode("Y", Some("2024-05-05")),
            episode("Z", None),
        ]);
        assert_eq!(titles(&ordered), vec!["Y", "X", "Z"]);
    }

    #[test]
    fn equal_dates_keep_extraction_order() {
        let ordered = order_episodes(vec![
            episode("A", Some("2024-03-01")),
            episode("B", Some("2024-03-01T00:00:00Z")),
            episode("C", Some("2024-04-01")),
        ]);
        assert_eq!(titles(&ordered), vec!["C", "A", "B"]);
    }

    #[test]
    fn compares_instants_across_offsets() {
        let ordered = order_episodes(vec![
            episode("Sydney", Some("2024-03-01T09:00:00+11:00")),
            episode("Utc", Some("2024-02-29T23:00:00Z")),
        ]);
        // 09:00+11:00 is 22:00Z the previous day
        assert_eq!(titles(&ordered), vec!["Utc", "Sydney"]);
    }

    #[test]
    fn empty_input() {
        assert!(order_episodes(Vec::new()).is_empty());
    }
}
