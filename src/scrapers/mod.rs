//! Listing page scrapers and URL dispatch.

pub mod error;
pub mod fetcher;
pub mod idealista;
pub mod immobiliare;
pub mod markup;
pub mod traits;
pub mod types;

pub use error::{FetchError, ParseError};
pub use fetcher::{HttpFetcher, StaticFetcher};
pub use traits::PageFetcher;
pub use types::{FetchConfig, RawListing};

use crate::models::{Listing, Site};
use crate::normalizer::normalize;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

/// URL recognition rules, tried in order. Group 1 is the canonical URL.
static SOURCES: LazyLock<Vec<(Site, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Site::Immobiliare,
            Regex::new(r"^(https://www\.immobiliare\.it/annunci/\d+)/?.*$").unwrap(),
        ),
        (
            Site::Idealista,
            Regex::new(r"^(https://www\.idealista\.it/immobile/\d+)/?.*$").unwrap(),
        ),
    ]
});

/// Match `url` against the known sources, returning the site and canonical URL
pub fn recognize(url: &str) -> Result<(Site, String), ParseError> {
    SOURCES
        .iter()
        .find_map(|(site, pattern)| {
            pattern
                .captures(url)
                .and_then(|caps| caps.get(1))
                .map(|canonical| (*site, canonical.as_str().to_string()))
        })
        .ok_or_else(|| ParseError::UnknownSource { url: url.to_string() })
}

/// Extract and normalize a listing from already fetched markup
pub fn parse_markup(site: Site, url: &str, html: &str) -> Result<Listing, ParseError> {
    let raw = match site {
        Site::Immobiliare => immobiliare::extract(url, html)?,
        Site::Idealista => idealista::extract(url, html)?,
    };

    Ok(normalize(site, url, raw))
}

/// Fetch and parse the listing behind `url`
pub async fn parse_listing(fetcher: &dyn PageFetcher, url: &str) -> Result<Listing, ParseError> {
    let (site, canonical) = recognize(url)?;

    let html = fetcher
        .fetch(&canonical)
        .await
        .map_err(|err| ParseError::SourceUnavailable {
            site,
            url: canonical.clone(),
            reason: err.to_string(),
        })?;

    parse_markup(site, &canonical, &html)
}

/// Listings parsed from one message, plus the text of every failure
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub listings: Vec<Listing>,
    pub errors: Vec<String>,
}

impl BatchOutcome {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Parse `urls` one after the other. A failing URL never stops the rest.
pub async fn parse_batch(fetcher: &dyn PageFetcher, urls: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for url in urls {
        match parse_listing(fetcher, url).await {
            Ok(listing) => {
                info!("Parsed {} ({} €)", listing.key(), listing.price);
                outcome.listings.push(listing);
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", url, e);
                outcome.errors.push(e.to_string());
            }
        }
    }

    outcome
}
