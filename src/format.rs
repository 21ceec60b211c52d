//! Text rendering of listings and reviews.

use crate::models::{Listing, Review};
use std::collections::BTreeMap;

/// How prices are written. Passed explicitly so rendering stays pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_sep: char,
    pub decimal_sep: char,
    pub decimals: usize,
    pub symbol_first: bool,
}

impl CurrencyFormat {
    /// Euro amounts as written in Italy: `1.234,00 €`
    pub fn italian() -> Self {
        Self {
            symbol: "€".to_string(),
            thousands_sep: '.',
            decimal_sep: ',',
            decimals: 2,
            symbol_first: false,
        }
    }

    pub fn format(&self, amount: u64) -> String {
        let digits = amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_sep);
            }
            grouped.push(c);
        }

        if self.decimals > 0 {
            grouped.push(self.decimal_sep);
            grouped.push_str(&"0".repeat(self.decimals));
        }

        if self.symbol_first {
            format!("{} {}", self.symbol, grouped)
        } else {
            format!("{} {}", grouped, self.symbol)
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::italian()
    }
}

/// Renders listings for chat replies
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub currency: CurrencyFormat,
}

impl Formatter {
    pub fn new(currency: CurrencyFormat) -> Self {
        Self { currency }
    }

    /// Two-line summary: icon and title, then price and the `/site_id` command
    pub fn format_short(&self, listing: &Listing, show_tags: bool) -> String {
        let mut text = format!(
            "{} {}\n{} /{}",
            listing.action.icon(),
            listing.title,
            self.currency.format(listing.price),
            listing.key()
        );
        if show_tags {
            push_line(&mut text, "", listing.tags.as_deref());
        }
        text
    }

    pub fn format_detailed(&self, listing: &Listing, show_url: bool) -> String {
        let details = listing
            .details
            .iter()
            .map(|(key, value)| {
                if is_positional(key) {
                    value.clone()
                } else {
                    format!("{}: {}", key, value)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut text = format!(
            "{} {}, {}\nPrice: {}\nDetails: {}\n/{}\nImages: {} 📷, {} 📹, {} 🗺",
            listing.action.icon(),
            listing.title,
            listing.subtitle,
            self.currency.format(listing.price),
            details,
            listing.key(),
            listing.photos,
            listing.video,
            listing.planimetry_photos,
        );
        push_line(&mut text, "Tags: ", listing.tags.as_deref());
        if show_url {
            push_line(&mut text, "Url: ", Some(&listing.url));
        }
        text
    }
}

/// One `<reviewer> Vote: n - comment` line per review
pub fn format_reviews(reviews: &BTreeMap<String, Review>) -> String {
    reviews
        .iter()
        .map(|(reviewer, review)| format!("{} {}", reviewer, review))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keys like `d3`: anything after the first character is digits
fn is_positional(key: &str) -> bool {
    key.chars().skip(1).all(|c| c.is_ascii_digit())
}

fn push_line(text: &mut String, prefix: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        text.push('\n');
        text.push_str(prefix);
        text.push_str(value);
    }
}
