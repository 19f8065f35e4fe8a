//! Bilingual (Arabic/English) website for the Association for Happiness of the
//! Palestinian Child.
//!
//! Static pages come from the per-locale dictionaries in `messages/`; the
//! activities and news collections are read from Notion databases.

pub mod config;
pub mod content;
pub mod i18n;
pub mod web;
