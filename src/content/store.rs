use crate::content::RawPage;
use crate::i18n::Locale;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to content store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse content store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid content store URL: {0}")]
    InvalidUrl(String),

    #[error("content store pagination did not terminate: {0}")]
    Pagination(String),
}

/// A listing request against one collection.
///
/// Stores must return only records with `published == true` and
/// `locale == self.locale`, newest `date` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub locale: Locale,
}

impl ListQuery {
    pub fn published_in(locale: Locale) -> Self {
        Self { locale }
    }
}

/// Read-only access to the external content store.
///
/// Implementations report failures as `StoreError`; deciding what a failure
/// means for a page is the adapter's job.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Query a collection (`collection_id`) with the publish/locale filter and date sort.
    async fn query(
        &self,
        collection_id: &str,
        query: ListQuery,
    ) -> Result<Vec<RawPage>, StoreError>;

    /// Fetch a single record by id, regardless of publish state.
    ///
    /// `Ok(None)` when the id does not resolve.
    async fn retrieve(&self, id: &str) -> Result<Option<RawPage>, StoreError>;
}
