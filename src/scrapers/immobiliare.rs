//! Field extraction for immobiliare.it listing pages.

use crate::models::{Details, Site};
use crate::scrapers::error::ParseError;
use crate::scrapers::markup::{first_count, first_text, joined_text, texts};
use crate::scrapers::types::RawListing;
use crate::normalizer::parse_amount;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"€ ([\d.]+)").unwrap());

static DETAILS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".section-data .col-xs-12 .col-xs-12").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".features__price > span").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title-detail").unwrap());
static SUBTITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".description__title").unwrap());
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".description-text").unwrap());
static TAGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".label-gray").unwrap());
static PLAN_TAB: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#plan-tab").unwrap());
static VIDEO_TAB: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#video-tab").unwrap());
static PHOTO_TAB: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#foto-tab").unwrap());
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".leaflet-control").unwrap());

/// Extract listing fields from an Immobiliare page.
///
/// The details block is a flat run of label, value, label, value... cells.
pub fn extract(url: &str, html: &str) -> Result<RawListing, ParseError> {
    let document = Html::parse_document(html);

    let price_text = first_text(&document, &PRICE).ok_or_else(|| ParseError::SourceUnavailable {
        site: Site::Immobiliare,
        url: url.to_string(),
        reason: "price not found".to_string(),
    })?;
    let price = parse_amount(&PRICE_PATTERN, &price_text).ok_or_else(|| ParseError::MalformedPrice {
        site: Site::Immobiliare,
        url: url.to_string(),
        text: price_text.clone(),
    })?;

    let cells = texts(&document, &DETAILS);
    let details: Details = cells
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    debug!("Immobiliare {}: {} detail cells, price text {:?}", url, cells.len(), price_text);

    Ok(RawListing {
        title: joined_text(&document, &TITLE),
        subtitle: joined_text(&document, &SUBTITLE),
        description: joined_text(&document, &DESCRIPTION),
        price,
        details,
        tags: Some(texts(&document, &TAGS)),
        planimetry_photos: first_count(&document, &PLAN_TAB),
        video: first_count(&document, &VIDEO_TAB),
        photos: first_count(&document, &PHOTO_TAB),
        address: first_text(&document, &ADDRESS),
    })
}
