//! Raw store records and their mapping into [`ContentRecord`].
//!
//! The store's page shape is deeply optional: any property may be missing,
//! null, or empty. Each field of a `ContentRecord` has a named default policy
//! below, applied in `RawPage::into_record`.

use crate::content::ContentRecord;
use crate::i18n::Locale;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

/// Title used when a record has no (or an empty) title.
pub const UNTITLED: &str = "Untitled";

/// A page as returned by the content store (Notion page object).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    pub id: String,
    #[serde(default)]
    pub properties: RawProperties,
}

/// The database properties the site reads. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProperties {
    #[serde(default)]
    pub title: Option<TitleProperty>,
    #[serde(default)]
    pub description: Option<RichTextProperty>,
    #[serde(default)]
    pub date: Option<DateProperty>,
    #[serde(default)]
    pub cover_image: Option<FilesProperty>,
    #[serde(default)]
    pub published: Option<CheckboxProperty>,
    #[serde(default)]
    pub locale: Option<SelectProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Option<Vec<TextFragment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichTextProperty {
    #[serde(default)]
    pub rich_text: Option<Vec<TextFragment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextFragment {
    #[serde(default)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateProperty {
    #[serde(default)]
    pub date: Option<DateValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesProperty {
    #[serde(default)]
    pub files: Option<Vec<FileEntry>>,
}

/// A file attachment: either uploaded to the store (`file`) or linked (`external`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckboxProperty {
    #[serde(default)]
    pub checkbox: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectProperty {
    #[serde(default)]
    pub select: Option<SelectOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawPage {
    /// Publish flag as stored, if the property is present.
    pub fn published_flag(&self) -> Option<bool> {
        self.properties.published.as_ref()?.checkbox
    }

    /// Locale code as stored, if the property is present.
    pub fn locale_code(&self) -> Option<&str> {
        self.properties.locale.as_ref()?.select.as_ref()?.name.as_deref()
    }

    /// Whether the record is eligible for a `locale` listing, judged only on the
    /// properties the store reported. Missing properties are not held against it.
    pub fn is_listable_in(&self, locale: Locale) -> bool {
        let published = self.published_flag().unwrap_or(true);
        let same_locale = self.locale_code().map_or(true, |code| code == locale.code());
        published && same_locale
    }

    /// Map into a `ContentRecord` tagged with `locale`, using `now` for a missing date.
    pub fn into_record(self, locale: Locale, now: DateTime<Utc>) -> ContentRecord {
        let title = title_or_untitled(self.properties.title.as_ref());
        let description = joined_description(self.properties.description.as_ref());
        let date = date_or_now(self.properties.date.as_ref(), now);
        let images = image_urls(self.properties.cover_image.as_ref());

        ContentRecord::new(self.id, title, description, date, images, locale)
    }
}

/// First title fragment's text; "Untitled" when missing or empty.
fn title_or_untitled(property: Option<&TitleProperty>) -> String {
    property
        .and_then(|p| p.title.as_ref())
        .and_then(|fragments| fragments.first())
        .and_then(|fragment| fragment.plain_text.as_deref())
        .filter(|text| !text.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}

/// All rich-text fragments concatenated in order, no separator; empty when missing.
fn joined_description(property: Option<&RichTextProperty>) -> String {
    property
        .and_then(|p| p.rich_text.as_ref())
        .map(|fragments| {
            fragments
                .iter()
                .filter_map(|fragment| fragment.plain_text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// The stored start date; the fetch time (RFC 3339, UTC, milliseconds) when missing.
fn date_or_now(property: Option<&DateProperty>, now: DateTime<Utc>) -> String {
    property
        .and_then(|p| p.date.as_ref())
        .and_then(|d| d.start.as_deref())
        .filter(|start| !start.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Uploaded-file URL, else external URL, per attachment; attachments with neither are dropped.
fn image_urls(property: Option<&FilesProperty>) -> Vec<String> {
    property
        .and_then(|p| p.files.as_ref())
        .map(|files| {
            files
                .iter()
                .filter_map(|entry| {
                    let uploaded = entry.file.as_ref().and_then(|f| f.url.as_deref());
                    let external = entry.external.as_ref().and_then(|f| f.url.as_deref());
                    uploaded
                        .filter(|url| !url.is_empty())
                        .or(external.filter(|url| !url.is_empty()))
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
