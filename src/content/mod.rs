//! Content collections (activities and news) sourced from the headless CMS.
//!
//! - `store`: the `ContentStore` seam the adapter reads through
//! - `notion`: the Notion API implementation of that seam
//! - `record`: raw store page shape and field default policies
//! - `adapter`: `ContentAdapter`, the only thing pages talk to

mod adapter;
mod notion;
mod record;
mod store;

pub use adapter::{CollectionIds, ContentAdapter};
pub use notion::{NotionClient, MAX_QUERY_PAGES};
pub use record::{RawPage, UNTITLED};
pub use store::{ContentStore, ListQuery, StoreError};

use crate::i18n::{calendar_date, Locale};
use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The two content collections. Structurally identical; each lives in its own
/// store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Activities,
    News,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Activities, ContentKind::News];

    /// Route segment and log label (e.g. "activities").
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Activities => "activities",
            ContentKind::News => "news",
        }
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "activities" => Ok(ContentKind::Activities),
            "news" => Ok(ContentKind::News),
            _ => bail!("Unknown content kind: '{}'", s),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single activity or news item, ready for display.
///
/// `cover_image` is always derived from `images` (the first entry), so the
/// two cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    id: String,
    title: String,
    description: String,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image: Option<String>,
    images: Vec<String>,
    locale: Locale,
    published: bool,
}

impl ContentRecord {
    pub fn new(
        id: String,
        title: String,
        description: String,
        date: String,
        images: Vec<String>,
        locale: Locale,
    ) -> Self {
        Self {
            id,
            title,
            description,
            date,
            cover_image: images.first().cloned(),
            images,
            locale,
            published: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// ISO-8601 date or timestamp string.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn published(&self) -> bool {
        self.published
    }

    /// Instant used to order records, newest first.
    ///
    /// Plain dates count as midnight UTC. `None` for unparseable dates, which
    /// order after every parseable one.
    pub fn sort_key(&self) -> Option<DateTime<Utc>> {
        let value = self.date.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                calendar_date(value)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
    }
}

/// Stable sort, newest first.
pub fn sort_newest_first(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(id: &str, date: &str, images: &[&str]) -> ContentRecord {
        ContentRecord::new(
            id.to_string(),
            format!("Title {}", id),
            String::new(),
            date.to_string(),
            images.iter().map(|s| s.to_string()).collect(),
            Locale::En,
        )
    }

    // ==================== ContentKind Tests ====================

    #[test]
    fn test_kind_round_trips_through_route_segment() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert!("events".parse::<ContentKind>().is_err());
    }

    // ==================== ContentRecord Tests ====================

    #[test]
    fn test_cover_is_first_image() {
        let r = record("1", "2024-01-01", &["a", "b", "c"]);
        assert_eq!(r.cover_image(), Some("a"));
        assert_eq!(r.images().len(), 3);
    }

    #[test]
    fn test_no_images_no_cover() {
        let r = record("1", "2024-01-01", &[]);
        assert!(r.cover_image().is_none());
    }

    #[test]
    fn test_always_published() {
        assert!(record("1", "2024-01-01", &[]).published());
    }

    #[test]
    fn test_serialization_shape() {
        let value = serde_json::to_value(record("1", "2024-01-01", &["a"])).unwrap();
        assert_eq!(value["coverImage"], "a");
        assert_eq!(value["locale"], "en");
        assert_eq!(value["published"], true);

        let value = serde_json::to_value(record("2", "2024-01-01", &[])).unwrap();
        assert!(value.get("coverImage").is_none());
        assert_eq!(value["images"], serde_json::json!([]));
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_sort_key_plain_date_is_midnight_utc() {
        let key = record("1", "2024-01-03", &[]).sort_key().unwrap();
        assert_eq!(key.to_rfc3339(), "2024-01-03T00:00:00+00:00");
    }

    #[test]
    fn test_sort_key_respects_offset() {
        let key = record("1", "2024-01-03T01:00:00+03:00", &[]).sort_key().unwrap();
        assert_eq!(key.to_rfc3339(), "2024-01-02T22:00:00+00:00");
    }

    #[test]
    fn test_sort_newest_first_mixed_formats() {
        let mut records = vec![
            record("old", "2024-01-01", &[]),
            record("garbage", "not a date", &[]),
            record("newest", "2024-01-03T08:00:00.000Z", &[]),
            record("middle", "2024-01-02", &[]),
        ];

        sort_newest_first(&mut records);

        let ids: Vec<_> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["newest", "middle", "old", "garbage"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut records = vec![
            record("first", "2024-01-01", &[]),
            record("second", "2024-01-01", &[]),
        ];

        sort_newest_first(&mut records);

        assert_eq!(records[0].id(), "first");
        assert_eq!(records[1].id(), "second");
    }

    proptest! {
        #[test]
        fn prop_cover_matches_first_image(images in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
            let refs: Vec<&str> = images.iter().map(String::as_str).collect();
            let r = record("1", "2024-01-01", &refs);
            prop_assert_eq!(r.cover_image(), images.first().map(String::as_str));
        }

        #[test]
        fn prop_sorted_dates_never_increase(days in proptest::collection::vec(1u32..28, 0..12)) {
            let mut records: Vec<_> = days
                .iter()
                .enumerate()
                .map(|(i, d)| record(&i.to_string(), &format!("2024-02-{:02}", d), &[]))
                .collect();

            sort_newest_first(&mut records);

            for pair in records.windows(2) {
                prop_assert!(pair[0].sort_key() >= pair[1].sort_key());
            }
        }
    }
}
