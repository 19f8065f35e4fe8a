//! Internationalization (i18n) for the bilingual site.
//!
//! # Architecture
//!
//! - `locale`: the fixed locale set (ar, en), default locale and text direction
//! - `dictionary`: typed UI string dictionaries loaded from `messages/*.json`,
//!   with fallback to the default locale
//! - `format`: long-form, locale-aware date display
//!
//! # Example
//!
//! ```rust,ignore
//! use ahpc_website::i18n::{DictionaryStore, Locale};
//!
//! let dictionaries = DictionaryStore::load("messages")?;
//! let locale = Locale::from_code("en")?;
//! let t = dictionaries.translations(locale);
//! println!("{} ({})", t.common.home, locale.direction().as_html_dir());
//! ```

mod dictionary;
mod format;
mod locale;

pub use dictionary::{
    dictionary_path, load_dictionary, DictionaryError, DictionaryStore, TitledText, Translations,
};
pub use format::{calendar_date, format_long_date, to_arabic_digits};
pub use locale::{Direction, Locale, LocaleConfig, LOCALES};
