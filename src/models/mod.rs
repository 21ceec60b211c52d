use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Site a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Immobiliare,
    Idealista,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Immobiliare => "immobiliare",
            Site::Idealista => "idealista",
        }
    }

    /// Display name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Site::Immobiliare => "Immobiliare",
            Site::Idealista => "Idealista",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction type of a listing.
///
/// Variant order is the display order used when ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Rent,
    Auction,
    /// Any action string this version does not recognise
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn icon(&self) -> &'static str {
        match self {
            Action::Buy => "🏠",
            Action::Rent => "🛏",
            Action::Auction => "📢",
            Action::Unknown => "❓",
        }
    }
}

/// Detail table of a listing, keyed by label or by positional key (`d0`, `d1`, ...)
pub type Details = IndexMap<String, String>;

/// Normalized real-estate ad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub site: Site,
    pub id: String,
    pub action: Action,
    pub url: String,
    pub price: u64,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub details: Details,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub planimetry_photos: u32,
    pub video: u32,
    pub photos: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Listing {
    /// Storage key, unique across sites: `<site>_<id>`
    pub fn key(&self) -> String {
        format!("{}_{}", self.site, self.id)
    }
}

/// A single reviewer's vote on a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub vote: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Review {
    /// Parse free-text input such as `"8 nice view"`.
    ///
    /// Returns `None` unless the text starts with a digit.
    pub fn parse(input: &str) -> Option<Self> {
        let digits: String = input.chars().take_while(|c| c.is_ascii_digit()).collect();
        let vote = digits.parse().ok()?;
        let comment: String = input[digits.len()..].chars().skip(1).collect();

        Some(Self {
            vote,
            comment: if comment.is_empty() { None } else { Some(comment) },
        })
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vote: {} - {}", self.vote, self.comment.as_deref().unwrap_or(""))
    }
}
