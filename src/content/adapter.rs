use crate::config::Config;
use crate::content::{
    sort_newest_first, ContentKind, ContentRecord, ContentStore, ListQuery, NotionClient,
    StoreError,
};
use crate::i18n::Locale;
use anyhow::Result;
use chrono::Utc;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Store collection id for each content kind. A kind without an id is
/// simply not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionIds {
    pub activities: Option<String>,
    pub news: Option<String>,
}

impl CollectionIds {
    pub fn get(&self, kind: ContentKind) -> Option<&str> {
        match kind {
            ContentKind::Activities => self.activities.as_deref(),
            ContentKind::News => self.news.as_deref(),
        }
    }
}

/// Reads activities and news from the content store for pages.
///
/// This is the boundary where store failures stop: every operation returns a
/// plain value (an empty list or `None`) and logs what went wrong. A missing
/// credential or collection id is the normal "nothing to show" state.
#[derive(Clone)]
pub struct ContentAdapter {
    store: Option<Arc<dyn ContentStore>>,
    collections: CollectionIds,
}

impl ContentAdapter {
    /// `store` is `None` when no store credential is configured.
    pub fn new(store: Option<Arc<dyn ContentStore>>, collections: CollectionIds) -> Self {
        Self { store, collections }
    }

    /// An adapter with no store at all; every fetch is empty.
    pub fn unconfigured() -> Self {
        Self::new(None, CollectionIds::default())
    }

    /// Build the adapter from environment configuration, using Notion when a
    /// token is present.
    pub fn from_config(config: &Config) -> Result<Self> {
        let collections = CollectionIds {
            activities: config.notion_activities_db_id.clone(),
            news: config.notion_news_db_id.clone(),
        };

        let store: Option<Arc<dyn ContentStore>> = match &config.notion_token {
            Some(token) => {
                let client =
                    NotionClient::new(token, &config.notion_api_url, config.notion_timeout())?;
                Some(Arc::new(client))
            }
            None => {
                info!("NOTION_TOKEN not set, activities and news will be empty");
                None
            }
        };

        for kind in ContentKind::ALL {
            if store.is_some() && collections.get(kind).is_none() {
                info!("No Notion database configured for {}, it will be empty", kind);
            }
        }

        Ok(Self::new(store, collections))
    }

    pub fn is_configured(&self, kind: ContentKind) -> bool {
        self.store.is_some() && self.collections.get(kind).is_some()
    }

    /// Published records of `kind` in `locale`, newest first.
    ///
    /// Never fails: no store, no collection id, or any store error all give
    /// an empty list.
    pub async fn fetch_list(&self, kind: ContentKind, locale: Locale) -> Vec<ContentRecord> {
        let (Some(store), Some(collection_id)) = (&self.store, self.collections.get(kind)) else {
            debug!("{} not configured, returning no records", kind);
            return Vec::new();
        };

        let operation = format!("fetch {} ({})", kind, locale);
        let fetched = absorb_failures(&operation, async {
            let pages = store
                .query(collection_id, ListQuery::published_in(locale))
                .await?;

            let now = Utc::now();
            let total = pages.len();
            let mut records: Vec<ContentRecord> = pages
                .into_iter()
                .filter(|page| page.is_listable_in(locale))
                .map(|page| page.into_record(locale, now))
                .collect();

            if records.len() < total {
                warn!(
                    "{}: store returned {} records outside the publish/locale filter, dropped",
                    operation,
                    total - records.len()
                );
            }

            sort_newest_first(&mut records);
            Ok::<_, StoreError>(records)
        })
        .await;

        fetched.unwrap_or_default()
    }

    /// A single record by id, tagged with `locale`.
    ///
    /// The store is asked for the id directly, so neither the publish flag nor
    /// the stored locale is checked here (detail pages open from direct links).
    /// `None` when there is no store, the id does not resolve, or the store fails.
    pub async fn fetch_one(
        &self,
        kind: ContentKind,
        id: &str,
        locale: Locale,
    ) -> Option<ContentRecord> {
        let Some(store) = &self.store else {
            debug!("No content store configured, {} {} unavailable", kind, id);
            return None;
        };

        let operation = format!("fetch {} {} ({})", kind, id, locale);
        let fetched = absorb_failures(&operation, async {
            let page = store.retrieve(id).await?;
            Ok::<_, StoreError>(page.map(|page| page.into_record(locale, Utc::now())))
        })
        .await;

        let record = fetched.flatten();
        if record.is_none() {
            debug!("{}: no record", operation);
        }
        record
    }
}

/// Run a store operation, turning errors and panics into `None` with a log line.
async fn absorb_failures<T, F>(operation: &str, future: F) -> Option<T>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("Content store error during {}: {}", operation, e);
            None
        }
        Err(_) => {
            error!("Content store panicked during {}", operation);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RawPage;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use serde_json::json;
    use std::sync::Mutex;

    // ==================== Test Store ====================

    /// In-memory store that applies the filter the way Notion does, and
    /// records every call it receives.
    #[derive(Default)]
    struct FakeStore {
        pages: Vec<(String, serde_json::Value)>,
        ignore_filter: bool,
        fail: bool,
        panic: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn with_pages(pages: Vec<(&str, serde_json::Value)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(collection, page)| (collection.to_string(), page))
                    .collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentStore for FakeStore {
        async fn query(
            &self,
            collection_id: &str,
            query: ListQuery,
        ) -> Result<Vec<RawPage>, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("query {} {}", collection_id, query.locale));
            if self.panic {
                panic!("store exploded");
            }
            if self.fail {
                return Err(StoreError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }

            let mut matching: Vec<RawPage> = self
                .pages
                .iter()
                .filter(|(collection, _)| collection == collection_id)
                .map(|(_, page)| serde_json::from_value(page.clone()).unwrap())
                .filter(|page: &RawPage| self.ignore_filter || page.is_listable_in(query.locale))
                .collect();
            if !self.ignore_filter {
                // Notion puts empty dates last when sorting descending
                matching.sort_by(|a, b| date_of(b).cmp(&date_of(a)));
            }
            Ok(matching)
        }

        async fn retrieve(&self, id: &str) -> Result<Option<RawPage>, StoreError> {
            self.calls.lock().unwrap().push(format!("retrieve {}", id));
            if self.panic {
                panic!("store exploded");
            }
            if self.fail {
                return Err(StoreError::Status {
                    status: 401,
                    body: "unauthorized".to_string(),
                });
            }

            Ok(self
                .pages
                .iter()
                .find(|(_, page)| page["id"] == id)
                .map(|(_, page)| serde_json::from_value(page.clone()).unwrap()))
        }
    }

    fn date_of(page: &RawPage) -> Option<String> {
        page.properties
            .date
            .as_ref()
            .and_then(|d| d.date.as_ref())
            .and_then(|d| d.start.clone())
    }

    // ==================== Helper Functions ====================

    fn page(id: &str, locale: &str, published: bool, date: Option<&str>) -> serde_json::Value {
        let mut properties = json!({
            "title": { "title": [ { "plain_text": format!("Item {}", id) } ] },
            "published": { "checkbox": published },
            "locale": { "select": { "name": locale } }
        });
        if let Some(date) = date {
            properties["date"] = json!({ "date": { "start": date } });
        }
        json!({ "id": id, "properties": properties })
    }

    fn collections() -> CollectionIds {
        CollectionIds {
            activities: Some("activities-db".to_string()),
            news: Some("news-db".to_string()),
        }
    }

    fn adapter(store: FakeStore) -> (ContentAdapter, Arc<FakeStore>) {
        let store = Arc::new(store);
        let adapter = ContentAdapter::new(Some(store.clone() as Arc<dyn ContentStore>), collections());
        (adapter, store)
    }

    fn ids(records: &[ContentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id()).collect()
    }

    // ==================== fetch_list Tests ====================

    #[tokio::test]
    async fn test_returns_published_records_newest_first() {
        let (adapter, _) = adapter(FakeStore::with_pages(vec![
            ("activities-db", page("a1", "en", true, Some("2024-01-01"))),
            ("activities-db", page("a3", "en", true, Some("2024-01-03"))),
            ("activities-db", page("a4", "en", false, Some("2024-01-04"))),
            ("activities-db", page("a2", "en", true, Some("2024-01-02"))),
        ]));

        let records = adapter.fetch_list(ContentKind::Activities, Locale::En).await;

        assert_eq!(ids(&records), ["a3", "a2", "a1"]);
        assert_eq!(records[0].date(), "2024-01-03");
        assert!(records.iter().all(|r| r.published() && r.locale() == Locale::En));
    }

    #[tokio::test]
    async fn test_queries_the_collection_for_the_kind() {
        let (adapter, store) = adapter(FakeStore::default());

        adapter.fetch_list(ContentKind::News, Locale::Ar).await;
        adapter.fetch_list(ContentKind::Activities, Locale::En).await;

        assert_eq!(store.calls(), ["query news-db ar", "query activities-db en"]);
    }

    #[tokio::test]
    async fn test_only_requested_locale() {
        let (adapter, _) = adapter(FakeStore::with_pages(vec![
            ("news-db", page("n-ar", "ar", true, Some("2024-01-01"))),
            ("news-db", page("n-en", "en", true, Some("2024-01-02"))),
        ]));

        let ar = adapter.fetch_list(ContentKind::News, Locale::Ar).await;
        let en = adapter.fetch_list(ContentKind::News, Locale::En).await;

        assert_eq!(ids(&ar), ["n-ar"]);
        assert_eq!(ids(&en), ["n-en"]);
    }

    #[tokio::test]
    async fn test_store_ignoring_filter_still_yields_filtered_sorted_records() {
        let (adapter, _) = adapter(FakeStore {
            ignore_filter: true,
            ..FakeStore::with_pages(vec![
                ("news-db", page("old", "en", true, Some("2023-06-01"))),
                ("news-db", page("draft", "en", false, Some("2024-06-01"))),
                ("news-db", page("arabic", "ar", true, Some("2024-06-02"))),
                ("news-db", page("new", "en", true, Some("2024-05-01"))),
            ])
        });

        let records = adapter.fetch_list(ContentKind::News, Locale::En).await;

        assert_eq!(ids(&records), ["new", "old"]);
    }

    #[tokio::test]
    async fn test_missing_date_is_now_and_sorts_first() {
        let (adapter, _) = adapter(FakeStore::with_pages(vec![
            ("activities-db", page("dated", "en", true, Some("2024-01-02"))),
            ("activities-db", page("undated", "en", true, None)),
            ("activities-db", page("older", "en", true, Some("2023-12-31"))),
        ]));

        let before = Utc::now();
        let records = adapter.fetch_list(ContentKind::Activities, Locale::En).await;

        assert_eq!(ids(&records), ["undated", "dated", "older"]);
        let stamped: DateTime<Utc> = records[0].date().parse().expect("RFC 3339 timestamp");
        assert!(stamped >= before - Duration::seconds(1));
        assert!(stamped <= Utc::now() + Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_no_store_returns_empty() {
        let adapter = ContentAdapter::new(None, collections());

        for kind in ContentKind::ALL {
            for locale in [Locale::Ar, Locale::En] {
                assert!(adapter.fetch_list(kind, locale).await.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_missing_collection_id_returns_empty_without_calling_store() {
        let store = Arc::new(FakeStore::with_pages(vec![(
            "news-db",
            page("n1", "en", true, Some("2024-01-01")),
        )]));
        let adapter = ContentAdapter::new(
            Some(store.clone() as Arc<dyn ContentStore>),
            CollectionIds {
                activities: Some("activities-db".to_string()),
                news: None,
            },
        );

        assert!(adapter.fetch_list(ContentKind::News, Locale::En).await.is_empty());
        assert!(store.calls().is_empty());
        assert!(!adapter.is_configured(ContentKind::News));
        assert!(adapter.is_configured(ContentKind::Activities));
    }

    #[tokio::test]
    async fn test_store_error_returns_empty() {
        let (adapter, store) = adapter(FakeStore {
            fail: true,
            ..FakeStore::with_pages(vec![("news-db", page("n1", "en", true, None))])
        });

        assert!(adapter.fetch_list(ContentKind::News, Locale::En).await.is_empty());
        assert_eq!(store.calls().len(), 1, "no retries");
    }

    #[tokio::test]
    async fn test_store_panic_returns_empty() {
        let (adapter, _) = adapter(FakeStore {
            panic: true,
            ..Default::default()
        });

        assert!(adapter.fetch_list(ContentKind::Activities, Locale::Ar).await.is_empty());
    }

    #[tokio::test]
    async fn test_cover_image_is_first_image() {
        let mut with_images = page("img", "en", true, Some("2024-01-01"));
        with_images["properties"]["cover_image"] = json!({ "files": [
            { "external": { "url": "https://cdn.example/1.jpg" } },
            { "external": { "url": "https://cdn.example/2.jpg" } }
        ] });
        let (adapter, _) = adapter(FakeStore::with_pages(vec![
            ("activities-db", with_images),
            ("activities-db", page("plain", "en", true, Some("2023-01-01"))),
        ]));

        let records = adapter.fetch_list(ContentKind::Activities, Locale::En).await;

        assert_eq!(records[0].cover_image(), Some(records[0].images()[0].as_str()));
        assert!(records[1].images().is_empty());
        assert!(records[1].cover_image().is_none());
    }

    // ==================== fetch_one Tests ====================

    #[tokio::test]
    async fn test_fetch_one_tags_with_requested_locale() {
        let (adapter, store) = adapter(FakeStore::with_pages(vec![(
            "news-db",
            page("n1", "ar", true, Some("2024-01-01")),
        )]));

        let record = adapter
            .fetch_one(ContentKind::News, "n1", Locale::En)
            .await
            .expect("record");

        assert_eq!(record.id(), "n1");
        assert_eq!(record.locale(), Locale::En);
        assert_eq!(store.calls(), ["retrieve n1"]);
    }

    #[tokio::test]
    async fn test_fetch_one_does_not_check_publish_flag() {
        // Detail pages stay reachable by direct link even when unpublished.
        let (adapter, _) = adapter(FakeStore::with_pages(vec![(
            "activities-db",
            page("draft", "en", false, Some("2024-01-01")),
        )]));

        let record = adapter
            .fetch_one(ContentKind::Activities, "draft", Locale::En)
            .await
            .expect("unpublished record is still returned");

        assert!(record.published());
    }

    #[tokio::test]
    async fn test_fetch_one_unknown_id() {
        let (adapter, _) = adapter(FakeStore::default());
        assert!(adapter
            .fetch_one(ContentKind::News, "missing", Locale::En)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_one_without_store() {
        let adapter = ContentAdapter::unconfigured();
        assert!(adapter
            .fetch_one(ContentKind::News, "n1", Locale::Ar)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_one_works_without_collection_id() {
        let store = Arc::new(FakeStore::with_pages(vec![(
            "news-db",
            page("n1", "en", true, Some("2024-01-01")),
        )]));
        let adapter = ContentAdapter::new(
            Some(store as Arc<dyn ContentStore>),
            CollectionIds::default(),
        );

        assert!(adapter
            .fetch_one(ContentKind::News, "n1", Locale::En)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_fetch_one_store_error() {
        let (adapter, _) = adapter(FakeStore {
            fail: true,
            ..FakeStore::with_pages(vec![("news-db", page("n1", "en", true, None))])
        });

        assert!(adapter
            .fetch_one(ContentKind::News, "n1", Locale::En)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_one_store_panic() {
        let (adapter, _) = adapter(FakeStore {
            panic: true,
            ..Default::default()
        });

        assert!(adapter
            .fetch_one(ContentKind::Activities, "a1", Locale::En)
            .await
            .is_none());
    }

    // ==================== from_config Tests ====================

    fn config(token: Option<&str>) -> Config {
        Config {
            notion_token: token.map(str::to_string),
            notion_activities_db_id: Some("activities-db".to_string()),
            notion_news_db_id: None,
            notion_api_url: "https://api.notion.com/v1".to_string(),
            notion_timeout_seconds: 10,
            messages_dir: "messages".to_string(),
            static_dir: "static".to_string(),
            revalidate_seconds: 3600,
            revalidate_secret: None,
            port: 3000,
        }
    }

    #[test]
    fn test_from_config_without_token() {
        let adapter = ContentAdapter::from_config(&config(None)).unwrap();
        assert!(!adapter.is_configured(ContentKind::Activities));
        assert!(!adapter.is_configured(ContentKind::News));
    }

    #[test]
    fn test_from_config_with_token() {
        let adapter = ContentAdapter::from_config(&config(Some("secret_abc"))).unwrap();
        assert!(adapter.is_configured(ContentKind::Activities));
        assert!(!adapter.is_configured(ContentKind::News));
    }

    #[test]
    fn test_from_config_rejects_bad_api_url() {
        let mut config = config(Some("secret_abc"));
        config.notion_api_url = "::not a url::".to_string();
        assert!(ContentAdapter::from_config(&config).is_err());
    }
}
