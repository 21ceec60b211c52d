//! Field extraction for idealista.it listing pages.

use crate::models::{Details, Site};
use crate::normalizer::parse_amount;
use crate::scrapers::error::ParseError;
use crate::scrapers::markup::{count, count_containing, first_count, first_text, joined_text, texts};
use crate::scrapers::types::RawListing;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d.]+) €").unwrap());

/// Marker text of floor-plan thumbnails
const PLAN_MARKER: &str = "Planimetria";

// Both the old and the new page layout are matched.
static DETAILS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#details li, .flex-feature .txt-medium").unwrap());
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".features__price > span , .info-data-price").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".main-info__title-main").unwrap());
static SUBTITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".main-info__title-minor").unwrap());
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".comment").unwrap());
static SHOWN_PHOTOS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".show").unwrap());
static MORE_PHOTOS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".more-photos").unwrap());
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#headerMap li").unwrap());

/// Extract listing fields from an Idealista page.
///
/// Idealista exposes no label/value pairs, so details get positional keys.
pub fn extract(url: &str, html: &str) -> Result<RawListing, ParseError> {
    let document = Html::parse_document(html);

    let price_text = first_text(&document, &PRICE).ok_or_else(|| ParseError::SourceUnavailable {
        site: Site::Idealista,
        url: url.to_string(),
        reason: "price not found".to_string(),
    })?;
    let price = parse_amount(&PRICE_PATTERN, &price_text).ok_or_else(|| ParseError::MalformedPrice {
        site: Site::Idealista,
        url: url.to_string(),
        text: price_text.clone(),
    })?;

    let details: Details = texts(&document, &DETAILS)
        .into_iter()
        .enumerate()
        .map(|(index, text)| (format!("d{}", index), text))
        .collect();

    Ok(RawListing {
        title: joined_text(&document, &TITLE),
        subtitle: joined_text(&document, &SUBTITLE),
        description: joined_text(&document, &DESCRIPTION),
        price,
        details,
        tags: None,
        planimetry_photos: count_containing(&document, PLAN_MARKER),
        video: 0,
        photos: count(&document, &SHOWN_PHOTOS) + first_count(&document, &MORE_PHOTOS),
        address: Some(joined_text(&document, &ADDRESS)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.idealista.it/immobile/27311234";

    const PAGE: &str = r#"
        <html><body>
          <span class="main-info__title-main">Bilocale in via Padova</span>
          <span class="main-info__title-minor">Loreto, Milano</span>
          <span class="info-data-price">250.000 €</span>
          <div class="comment"><p>Ottimo investimento.</p></div>
          <div id="details">
            <ul><li>65 m² commerciali</li><li>2 locali</li></ul>
          </div>
          <div class="flex-feature"><span class="txt-medium">Piano 3</span></div>
          <div class="show">img</div><div class="show">img</div><div class="show">img</div>
          <span class="more-photos">+12 foto</span>
          <div><span>Planimetria</span></div>
          <div id="headerMap"><ul><li>Via Padova</li><li>Loreto</li></ul></div>
        </body></html>
    "#;

    #[test]
    fn test_extract_fields() {
        let raw = extract(URL, PAGE).unwrap();

        assert_eq!(raw.title, "Bilocale in via Padova");
        assert_eq!(raw.subtitle, "Loreto, Milano");
        assert_eq!(raw.description, "Ottimo investimento.");
        assert_eq!(raw.price, 250_000);
        let keys: Vec<&str> = raw.details.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["d0", "d1", "d2"]);
        assert_eq!(raw.details["d2"], "Piano 3");
        assert_eq!(raw.tags, None);
        // span, its div, body and html all contain the marker
        assert_eq!(raw.planimetry_photos, 4);
        assert_eq!(raw.video, 0);
        assert_eq!(raw.photos, 15);
        assert_eq!(raw.address.as_deref(), Some("Via Padova Loreto"));
    }

    #[test]
    fn test_euro_first_price_is_malformed() {
        let page = r#"<span class="info-data-price">€ 250.000</span>"#;
        let err = extract(URL, page).unwrap_err();
        assert!(matches!(err, ParseError::MalformedPrice { site: Site::Idealista, .. }));
    }

    #[test]
    fn test_missing_price_is_unavailable() {
        let err = extract(URL, "<html></html>").unwrap_err();
        assert!(matches!(err, ParseError::SourceUnavailable { site: Site::Idealista, .. }));
    }
}
