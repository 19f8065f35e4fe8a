//! Preview binary - prints the records a page would show, without the server
//!
//! Usage:
//!   cargo run --bin preview                      # Both collections, both locales
//!   cargo run --bin preview -- news en           # One collection in one locale
//!   cargo run --bin preview -- activities --id <page-id> ar
//!
//! Uses the same environment as the server:
//! - NOTION_TOKEN
//! - NOTION_ACTIVITIES_DB_ID / NOTION_NEWS_DB_ID
//!
//! Without them every list is empty, exactly as the site would render it.

use ahpc_website::{
    config::Config,
    content::{ContentAdapter, ContentKind},
    i18n::{Locale, LOCALES},
};
use anyhow::{bail, Result};
use futures::future::join_all;
use serde_json::json;
use tracing::info;

#[derive(Debug, Default, PartialEq)]
struct PreviewArgs {
    kind: Option<ContentKind>,
    locale: Option<Locale>,
    id: Option<String>,
}

fn parse_args(args: &[String]) -> Result<PreviewArgs> {
    let mut parsed = PreviewArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--id" => match iter.next() {
                Some(id) => parsed.id = Some(id.clone()),
                None => bail!("--id needs a page id"),
            },
            other => {
                if let Ok(kind) = other.parse::<ContentKind>() {
                    parsed.kind = Some(kind);
                } else if let Ok(locale) = Locale::from_code(other) {
                    parsed.locale = Some(locale);
                } else {
                    bail!(
                        "Unknown argument '{}' (expected activities, news, ar, en or --id <id>)",
                        other
                    );
                }
            }
        }
    }

    if parsed.id.is_some() && parsed.kind.is_none() {
        bail!("--id needs a collection (activities or news)");
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout stays valid JSON)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ahpc_website=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let config = Config::from_env()?;
    let adapter = ContentAdapter::from_config(&config)?;

    let locales: Vec<Locale> = match args.locale {
        Some(locale) => vec![locale],
        None => LOCALES.to_vec(),
    };

    if let (Some(kind), Some(id)) = (args.kind, &args.id) {
        let records = join_all(
            locales
                .iter()
                .map(|&locale| adapter.fetch_one(kind, id, locale)),
        )
        .await;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let kinds: Vec<ContentKind> = match args.kind {
        Some(kind) => vec![kind],
        None => ContentKind::ALL.to_vec(),
    };

    let requests: Vec<(ContentKind, Locale)> = kinds
        .iter()
        .flat_map(|&kind| locales.iter().map(move |&locale| (kind, locale)))
        .collect();

    info!("Fetching {} collection listings...", requests.len());
    let results = join_all(
        requests
            .iter()
            .map(|&(kind, locale)| adapter.fetch_list(kind, locale)),
    )
    .await;

    let output: Vec<_> = requests
        .iter()
        .zip(results)
        .map(|(&(kind, locale), records)| {
            json!({
                "kind": kind,
                "locale": locale,
                "count": records.len(),
                "records": records,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
