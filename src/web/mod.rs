//! HTTP surface: locale-prefixed pages rendered with tera, a page cache with
//! time-based and on-demand revalidation, and static assets.

mod cache;
mod error;
mod pages;
mod revalidate;

pub use cache::PageCache;
pub use error::{WebError, NOT_FOUND_PAGE};
pub use pages::{excerpt, switch_locale_path, ORGANIZATION};
pub use revalidate::{constant_time_compare, SECRET_HEADER};

use crate::content::ContentAdapter;
use crate::i18n::DictionaryStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tera::Tera;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Page templates, compiled into the binary.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("macros.html", include_str!("../../templates/macros.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("contact.html", include_str!("../../templates/contact.html")),
    ("donate.html", include_str!("../../templates/donate.html")),
    ("list.html", include_str!("../../templates/list.html")),
    ("detail.html", include_str!("../../templates/detail.html")),
];

pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    tera.set_escape_fn(escape_html);
    Ok(tera)
}

/// HTML escaping for template output. Unlike tera's default, `/` is left
/// alone so paths and image URLs stay readable in the markup.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// State shared by every handler. Only the page cache changes after startup.
pub struct AppState {
    pub dictionaries: DictionaryStore,
    pub content: ContentAdapter,
    pub templates: Tera,
    pub cache: PageCache,
    pub revalidate_secret: Option<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        dictionaries: DictionaryStore,
        content: ContentAdapter,
        revalidate_after: Duration,
        revalidate_secret: Option<String>,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            dictionaries,
            content,
            templates: load_templates()?,
            cache: PageCache::new(revalidate_after),
            revalidate_secret,
        })
    }
}

/// Create the site router
pub fn create_router(state: SharedState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(pages::root))
        .route("/health", get(pages::health))
        .route("/api/revalidate", post(revalidate::revalidate))
        .route("/:locale", get(pages::home))
        .route("/:locale/about", get(pages::about))
        .route("/:locale/contact", get(pages::contact))
        .route("/:locale/donate", get(pages::donate))
        .route("/:locale/:kind", get(pages::collection_list))
        .route("/:locale/:kind/:id", get(pages::collection_detail))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
