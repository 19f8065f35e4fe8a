use crate::content::{ContentKind, ContentRecord};
use crate::i18n::{format_long_date, Locale, Translations};
use crate::web::{AppState, SharedState, WebError};
use axum::{
    extract::{Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::future::Future;
use tera::Context;
use tracing::debug;

/// Records shown per collection on the home page.
pub const HOME_PREVIEW_COUNT: usize = 3;

/// Card descriptions are cut to this many characters.
pub const EXCERPT_CHARS: usize = 160;

// ==================== Organization Details ====================

#[derive(Debug, Serialize)]
pub struct Organization {
    pub phones: &'static [&'static str],
    pub email: &'static str,
    pub website: &'static str,
    pub facebook: &'static str,
    pub impact: &'static [ImpactStat],
}

#[derive(Debug, Serialize)]
pub struct ImpactStat {
    /// Dictionary key under `home.impact.stats`
    pub key: &'static str,
    pub value: u32,
}

pub const ORGANIZATION: Organization = Organization {
    phones: &["+970 599 116 582", "+970 923 19 9816"],
    email: "isaadtefelfalastini@gmail.com",
    website: "https://www.isaadtefelfalastini.com",
    facebook: "https://facebook.com/share/1Agb8p5Xji",
    impact: &[
        ImpactStat { key: "children", value: 500 },
        ImpactStat { key: "programs", value: 60 },
        ImpactStat { key: "volunteers", value: 50 },
        ImpactStat { key: "years", value: 14 },
    ],
};

// ==================== View Models ====================

/// Locale and navigation data every page template needs.
#[derive(Debug, Serialize)]
struct PageMeta {
    locale: &'static str,
    dir: &'static str,
    region_tag: &'static str,
    path: String,
    other_locale: &'static str,
    other_locale_name: &'static str,
    switch_href: String,
    year: i32,
}

impl PageMeta {
    fn new(locale: Locale, path: &str) -> Self {
        let other = locale.other();
        Self {
            locale: locale.code(),
            dir: locale.direction().as_html_dir(),
            region_tag: locale.config().region_tag,
            path: path.to_string(),
            other_locale: other.code(),
            other_locale_name: other.config().native_name,
            switch_href: switch_locale_path(path, other),
            year: Utc::now().year(),
        }
    }
}

/// Collection-specific copy, so list and detail templates can stay generic.
#[derive(Debug, Serialize)]
struct CollectionCopy<'a> {
    kind: ContentKind,
    nav_label: &'a str,
    title: &'a str,
    description: &'a str,
    empty: &'a str,
    back: &'a str,
    gallery: &'a str,
}

impl<'a> CollectionCopy<'a> {
    fn new(t: &'a Translations, kind: ContentKind) -> Self {
        match kind {
            ContentKind::Activities => Self {
                kind,
                nav_label: &t.common.activities,
                title: &t.activities.title,
                description: &t.activities.description,
                empty: &t.activities.no_activities,
                back: &t.activities.back_to_activities,
                gallery: &t.activities.gallery,
            },
            ContentKind::News => Self {
                kind,
                nav_label: &t.common.news,
                title: &t.news.title,
                description: &t.news.description,
                empty: &t.news.no_news,
                back: &t.news.back_to_news,
                gallery: &t.news.gallery,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct CardView<'a> {
    href: String,
    title: &'a str,
    excerpt: String,
    date: String,
    cover_image: Option<&'a str>,
    image_count: usize,
}

impl<'a> CardView<'a> {
    fn new(record: &'a ContentRecord, kind: ContentKind, locale: Locale) -> Self {
        Self {
            href: format!("/{}/{}/{}", locale.code(), kind, record.id()),
            title: record.title(),
            excerpt: excerpt(record.description(), EXCERPT_CHARS),
            date: format_long_date(record.date(), locale),
            cover_image: record.cover_image(),
            image_count: record.images().len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetailView<'a> {
    title: &'a str,
    description: &'a str,
    date: String,
    cover_image: Option<&'a str>,
    /// Only populated when there is more than the cover to show
    gallery: &'a [String],
}

impl<'a> DetailView<'a> {
    fn new(record: &'a ContentRecord, locale: Locale) -> Self {
        let images = record.images();
        Self {
            title: record.title(),
            description: record.description(),
            date: format_long_date(record.date(), locale),
            cover_image: record.cover_image(),
            gallery: if images.len() > 1 { images } else { &[] },
        }
    }
}

fn cards(records: &[ContentRecord], kind: ContentKind, locale: Locale) -> Vec<CardView<'_>> {
    records
        .iter()
        .map(|record| CardView::new(record, kind, locale))
        .collect()
}

// ==================== Helpers ====================

/// Same path under `target`'s prefix. Paths without a locale prefix get one.
pub fn switch_locale_path(path: &str, target: Locale) -> String {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };

    let rest = if Locale::from_code(first).is_ok() {
        rest
    } else if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    };

    match rest.filter(|r| !r.is_empty()) {
        Some(rest) => format!("/{}/{}", target.code(), rest),
        None => format!("/{}", target.code()),
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

fn parse_locale(code: &str) -> Result<Locale, WebError> {
    Locale::from_code(code).map_err(|_| {
        debug!("Unknown locale in path: {}", code);
        WebError::NotFound
    })
}

fn parse_kind(segment: &str) -> Result<ContentKind, WebError> {
    segment.parse().map_err(|_| WebError::NotFound)
}

impl AppState {
    fn page_context(&self, locale: Locale, path: &str) -> Context {
        let t = self.dictionaries.translations(locale);
        let mut context = Context::new();
        context.insert("t", t.as_ref());
        context.insert("page", &PageMeta::new(locale, path));
        context.insert("org", &ORGANIZATION);
        context
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, WebError> {
        Ok(self.templates.render(template, context)?)
    }

    /// Serve `path` from the page cache, or run `render` and cache its output.
    /// `render` is never polled on a cache hit.
    async fn cached<F>(&self, path: &str, render: F) -> Result<Html<String>, WebError>
    where
        F: Future<Output = Result<String, WebError>>,
    {
        if let Some(html) = self.cache.get(path) {
            debug!("Serving {} from page cache", path);
            return Ok(Html(html));
        }

        let html = render.await?;
        self.cache.insert(path, html.clone());
        Ok(Html(html))
    }
}

// ==================== Handlers ====================

/// `GET /` sends visitors to the default locale.
pub async fn root() -> Redirect {
    Redirect::temporary(&format!("/{}", Locale::DEFAULT.code()))
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn not_found() -> WebError {
    WebError::NotFound
}

pub async fn home(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let locale = parse_locale(&code)?;

    state
        .cached(uri.path(), async {
            let (activities, news) = tokio::join!(
                state.content.fetch_list(ContentKind::Activities, locale),
                state.content.fetch_list(ContentKind::News, locale),
            );

            let latest = |records: &[ContentRecord]| records.len().min(HOME_PREVIEW_COUNT);
            let activities = &activities[..latest(&activities)];
            let news = &news[..latest(&news)];

            let mut context = state.page_context(locale, uri.path());
            context.insert("activities", &cards(activities, ContentKind::Activities, locale));
            context.insert("news", &cards(news, ContentKind::News, locale));
            state.render("home.html", &context)
        })
        .await
}

/// A page that only needs the dictionary (about, contact, donate).
async fn static_page(
    state: &AppState,
    code: &str,
    uri: &Uri,
    template: &str,
) -> Result<Html<String>, WebError> {
    let locale = parse_locale(code)?;

    state
        .cached(uri.path(), async {
            let context = state.page_context(locale, uri.path());
            state.render(template, &context)
        })
        .await
}

pub async fn about(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    static_page(&state, &code, &uri, "about.html").await
}

pub async fn contact(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    static_page(&state, &code, &uri, "contact.html").await
}

pub async fn donate(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    static_page(&state, &code, &uri, "donate.html").await
}

/// `GET /:locale/activities` and `GET /:locale/news`
pub async fn collection_list(
    State(state): State<SharedState>,
    Path((code, segment)): Path<(String, String)>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let locale = parse_locale(&code)?;
    let kind = parse_kind(&segment)?;

    state
        .cached(uri.path(), async {
            let records = state.content.fetch_list(kind, locale).await;

            let t = state.dictionaries.translations(locale);
            let mut context = state.page_context(locale, uri.path());
            context.insert("collection", &CollectionCopy::new(&t, kind));
            context.insert("items", &cards(&records, kind, locale));
            state.render("list.html", &context)
        })
        .await
}

/// `GET /:locale/activities/:id` and `GET /:locale/news/:id`
pub async fn collection_detail(
    State(state): State<SharedState>,
    Path((code, segment, id)): Path<(String, String, String)>,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let locale = parse_locale(&code)?;
    let kind = parse_kind(&segment)?;

    state
        .cached(uri.path(), async {
            let record = state
                .content
                .fetch_one(kind, &id, locale)
                .await
                .ok_or(WebError::NotFound)?;

            let t = state.dictionaries.translations(locale);
            let mut context = state.page_context(locale, uri.path());
            context.insert("collection", &CollectionCopy::new(&t, kind));
            context.insert("item", &DetailView::new(&record, locale));
            context.insert("back_href", &format!("/{}/{}", locale.code(), kind));
            state.render("detail.html", &context)
        })
        .await
}
