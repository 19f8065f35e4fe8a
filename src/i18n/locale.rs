//! Locale type and registry: the two languages the site is published in.
//!
//! Every route is prefixed with a locale code, and every content record
//! belongs to exactly one locale. Arabic is the default and is written
//! right-to-left.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported site locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ar,
    En,
}

/// Text direction for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Value for the HTML `dir` attribute.
    pub fn as_html_dir(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Static metadata for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    /// ISO 639-1 code, also the route prefix (e.g. "ar")
    pub code: &'static str,

    /// Name of the language in itself
    pub native_name: &'static str,

    pub direction: Direction,

    /// BCP 47 tag used for `og:locale` style metadata (e.g. "ar_PS")
    pub region_tag: &'static str,
}

/// All locales, default first.
pub const LOCALES: &[Locale] = &[Locale::Ar, Locale::En];

const ARABIC: LocaleConfig = LocaleConfig {
    code: "ar",
    native_name: "العربية",
    direction: Direction::Rtl,
    region_tag: "ar_PS",
};

const ENGLISH: LocaleConfig = LocaleConfig {
    code: "en",
    native_name: "English",
    direction: Direction::Ltr,
    region_tag: "en_US",
};

impl Locale {
    /// The locale used for `/` and as the dictionary fallback.
    pub const DEFAULT: Locale = Locale::Ar;

    /// Parse a route segment or store value into a locale.
    ///
    /// Only the exact lowercase codes are accepted; anything else is an
    /// unknown locale and should end up as a not-found response.
    pub fn from_code(code: &str) -> Result<Locale> {
        match code {
            "ar" => Ok(Locale::Ar),
            "en" => Ok(Locale::En),
            _ => bail!("Unknown locale code: '{}'", code),
        }
    }

    pub fn config(&self) -> &'static LocaleConfig {
        match self {
            Locale::Ar => &ARABIC,
            Locale::En => &ENGLISH,
        }
    }

    pub fn code(&self) -> &'static str {
        self.config().code
    }

    pub fn direction(&self) -> Direction {
        self.config().direction
    }

    pub fn is_default(&self) -> bool {
        *self == Locale::DEFAULT
    }

    /// The locale the language switch in the header points to.
    pub fn other(&self) -> Locale {
        match self {
            Locale::Ar => Locale::En,
            Locale::En => Locale::Ar,
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::from_code(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
