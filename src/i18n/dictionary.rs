//! Static string dictionaries, one JSON asset per locale.
//!
//! Dictionaries are strongly typed: an asset missing any key fails to parse,
//! so a loaded dictionary is always complete. All locales are loaded once at
//! startup. A locale whose asset cannot be loaded falls back to the default
//! locale's dictionary; if the default itself cannot be loaded, loading
//! fails and the server does not start.

use crate::i18n::{Locale, LOCALES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dictionary {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The complete set of UI strings for one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translations {
    pub site: SiteStrings,
    pub common: CommonStrings,
    pub home: HomeStrings,
    pub about: AboutStrings,
    pub activities: ActivitiesStrings,
    pub news: NewsStrings,
    pub contact: ContactStrings,
    pub donate: DonateStrings,
    pub footer: FooterStrings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStrings {
    pub name: String,
    pub short_name: String,
    pub city: String,
    pub address: String,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonStrings {
    pub home: String,
    pub about: String,
    pub activities: String,
    pub news: String,
    pub contact: String,
    pub donate: String,
    pub read_more: String,
    pub learn_more: String,
    pub view_all: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStrings {
    pub hero: HeroStrings,
    pub mission: TitledText,
    pub impact: ImpactStrings,
    pub call_to_action: TitledText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStrings {
    pub title: String,
    pub subtitle: String,
    pub cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStrings {
    pub title: String,
    pub stats: ImpactStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStats {
    pub children: String,
    pub programs: String,
    pub volunteers: String,
    pub years: String,
}

/// A heading with a paragraph, used for repeated blocks (values, impact areas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitledText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutStrings {
    pub title: String,
    pub mission: String,
    pub vision: String,
    pub values: String,
    pub mission_body: Vec<String>,
    pub vision_body: String,
    pub value_items: Vec<TitledText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesStrings {
    pub title: String,
    pub description: String,
    pub no_activities: String,
    pub back_to_activities: String,
    pub gallery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStrings {
    pub title: String,
    pub description: String,
    pub no_news: String,
    pub back_to_news: String,
    pub gallery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStrings {
    pub title: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub facebook: String,
    pub send_message: String,
    pub follow_facebook: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateStrings {
    pub title: String,
    pub description: String,
    pub bank_details: BankDetailsStrings,
    pub direct_donation: String,
    pub impact_title: String,
    pub impact_items: Vec<TitledText>,
    pub please_contact: String,
    pub contact_for_details: String,
    pub thank_you: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailsStrings {
    pub title: String,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub iban: String,
    pub swift: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterStrings {
    pub description: String,
    pub quick_links: String,
    pub contact_us: String,
    pub rights: String,
}

/// Path of the dictionary asset for `locale` inside `dir`.
pub fn dictionary_path(dir: &Path, locale: Locale) -> PathBuf {
    dir.join(format!("{}.json", locale.code()))
}

/// Load and parse a single dictionary asset, without any fallback.
pub fn load_dictionary(dir: &Path, locale: Locale) -> Result<Translations, DictionaryError> {
    let path = dictionary_path(dir, locale);

    let raw = std::fs::read_to_string(&path).map_err(|source| DictionaryError::Io {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| DictionaryError::Parse { path, source })
}

/// Dictionaries for every locale, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    ar: Arc<Translations>,
    en: Arc<Translations>,
}

impl DictionaryStore {
    /// Load every locale's dictionary from `dir`.
    ///
    /// A broken or missing asset is logged and replaced by the default
    /// locale's dictionary. Only a failure to load the default locale is
    /// returned as an error, since there is nothing left to fall back to.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let dir = dir.as_ref();

        let default = Arc::new(load_dictionary(dir, Locale::DEFAULT).map_err(|e| {
            error!("Failed to load default dictionary ({}): {}", Locale::DEFAULT, e);
            e
        })?);

        let mut store = Self {
            ar: Arc::clone(&default),
            en: Arc::clone(&default),
        };

        for locale in LOCALES.iter().filter(|l| !l.is_default()) {
            let resolved = match load_dictionary(dir, *locale) {
                Ok(translations) => Arc::new(translations),
                Err(e) => {
                    error!(
                        "Failed to load translations for {}: {}. Falling back to {}",
                        locale,
                        e,
                        Locale::DEFAULT
                    );
                    Arc::clone(&default)
                }
            };
            store.set(*locale, resolved);
        }

        info!("Loaded dictionaries for {} locales", LOCALES.len());

        Ok(store)
    }

    fn set(&mut self, locale: Locale, translations: Arc<Translations>) {
        match locale {
            Locale::Ar => self.ar = translations,
            Locale::En => self.en = translations,
        }
    }

    /// The dictionary for `locale` (or the default locale's, if it failed to load).
    pub fn translations(&self, locale: Locale) -> Arc<Translations> {
        match locale {
            Locale::Ar => Arc::clone(&self.ar),
            Locale::En => Arc::clone(&self.en),
        }
    }
}
