use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedPage {
    html: String,
    rendered_at: Instant,
}

/// Rendered HTML keyed by request path.
///
/// Entries older than `ttl` are treated as absent and re-rendered on the next
/// request. A zero `ttl` disables caching.
pub struct PageCache {
    ttl: Duration,
    pages: Mutex<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: Mutex::new(HashMap::new()),
        }
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<String, CachedPage>> {
        // A panic mid-insert leaves the map itself consistent
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached page for `path`, if it is still fresh.
    pub fn get(&self, path: &str) -> Option<String> {
        let mut pages = self.pages();
        match pages.get(path) {
            Some(page) if page.rendered_at.elapsed() < self.ttl => Some(page.html.clone()),
            Some(_) => {
                debug!("Cached page {} expired", path);
                pages.remove(path);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, path: &str, html: String) {
        if self.ttl.is_zero() {
            return;
        }
        let mut pages = self.pages();
        let before = pages.len();
        pages.retain(|_, page| page.rendered_at.elapsed() < self.ttl);
        if pages.len() < before {
            debug!("Swept {} expired cached pages", before - pages.len());
        }
        pages.insert(
            path.to_string(),
            CachedPage {
                html,
                rendered_at: Instant::now(),
            },
        );
    }

    /// Drop one path, or every page when `path` is `None`. Returns how many
    /// entries were removed.
    pub fn purge(&self, path: Option<&str>) -> usize {
        let mut pages = self.pages();
        match path {
            Some(path) => usize::from(pages.remove(path).is_some()),
            None => {
                let count = pages.len();
                pages.clear();
                count
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
