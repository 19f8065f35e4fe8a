use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Notion (content store)
    pub notion_token: Option<String>,
    pub notion_activities_db_id: Option<String>,
    pub notion_news_db_id: Option<String>,
    pub notion_api_url: String,
    pub notion_timeout_seconds: u64,

    // Assets
    pub messages_dir: String,
    pub static_dir: String,

    // Page cache
    pub revalidate_seconds: u64,
    pub revalidate_secret: Option<String>,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Notion - all optional, the site renders empty collections without them
            notion_token: optional_var("NOTION_TOKEN"),
            notion_activities_db_id: optional_var("NOTION_ACTIVITIES_DB_ID"),
            notion_news_db_id: optional_var("NOTION_NEWS_DB_ID"),
            notion_api_url: std::env::var("NOTION_API_URL")
                .unwrap_or_else(|_| "https://api.notion.com/v1".to_string()),
            notion_timeout_seconds: parsed_var("NOTION_TIMEOUT_SECONDS", 10)?,

            // Assets
            messages_dir: std::env::var("MESSAGES_DIR").unwrap_or_else(|_| "messages".to_string()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),

            // Page cache
            revalidate_seconds: parsed_var("REVALIDATE_SECONDS", 3600)?,
            revalidate_secret: optional_var("REVALIDATE_SECRET"),

            // Server
            port: parsed_var("PORT", 3000)?,
        })
    }

    pub fn notion_timeout(&self) -> Duration {
        Duration::from_secs(self.notion_timeout_seconds)
    }

    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate_seconds)
    }
}

/// Read an env var, treating unset and blank the same way
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, value)),
        None => Ok(default),
    }
}
