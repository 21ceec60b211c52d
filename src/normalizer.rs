//! Conversion of raw page fragments into [`Listing`] records.

use crate::models::{Action, Listing, Site};
use crate::scrapers::types::RawListing;
use regex::Regex;

/// Idealista has no contract field; anything above this is taken as a sale.
pub const RENT_PRICE_CEILING: u64 = 5000;

/// Detail label holding the contract type on Immobiliare
pub const CONTRACT_LABEL: &str = "Contratto";

/// Pull the amount captured by `pattern` out of `text`, keeping digits only.
///
/// `pattern` must have one capture group around the amount. Thousands
/// separators are dropped, so `"€ 1.234"` gives `1234`.
pub fn parse_amount(pattern: &Regex, text: &str) -> Option<u64> {
    let captured = pattern.captures(text)?.get(1)?.as_str();
    let digits: String = captured.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Trailing run of digits in `url`
pub fn trailing_id(url: &str) -> String {
    let start = url
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(url.len());
    url[start..].to_string()
}

/// Classify an Immobiliare contract value ("Vendita", "Affitto", ...)
pub fn classify_contract(contract: &str) -> Action {
    let contract = contract.to_lowercase();
    if contract.contains("vendita") {
        Action::Buy
    } else if contract.contains("affitto") {
        Action::Rent
    } else {
        Action::Auction
    }
}

pub fn classify_by_price(price: u64) -> Action {
    if price > RENT_PRICE_CEILING {
        Action::Buy
    } else {
        Action::Rent
    }
}

/// Build the canonical listing for `url` from fields extracted on `site`.
pub fn normalize(site: Site, url: &str, raw: RawListing) -> Listing {
    let action = match site {
        Site::Immobiliare => classify_contract(
            raw.details.get(CONTRACT_LABEL).map(String::as_str).unwrap_or(""),
        ),
        Site::Idealista => classify_by_price(raw.price),
    };

    let tags = raw
        .tags
        .map(|labels| labels.join(", "))
        .filter(|joined| !joined.is_empty());

    Listing {
        site,
        id: trailing_id(url),
        action,
        url: url.to_string(),
        price: raw.price,
        title: raw.title,
        subtitle: raw.subtitle,
        description: raw.description,
        details: raw.details,
        tags,
        planimetry_photos: raw.planimetry_photos,
        video: raw.video,
        photos: raw.photos,
        address: raw.address.filter(|a| !a.is_empty()),
    }
}
