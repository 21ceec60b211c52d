//! Display ordering of stored listings.

use crate::models::{Listing, Review};
use std::collections::BTreeMap;

/// A listing with its reviews, keyed by reviewer name
pub type Entry = (Listing, BTreeMap<String, Review>);

/// Mean vote; a listing nobody reviewed counts as 0
pub fn average_vote(reviews: &BTreeMap<String, Review>) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.values().map(|r| r.vote as f64).sum::<f64>() / reviews.len() as f64
}

/// Order entries for display.
///
/// Three stable passes, each overriding the previous one on ties:
/// price descending, then average vote descending, then action
/// (buy, rent, auction).
pub fn order(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| b.0.price.cmp(&a.0.price));
    entries.sort_by(|a, b| average_vote(&b.1).total_cmp(&average_vote(&a.1)));
    entries.sort_by_key(|entry| entry.0.action);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, Details, Site};

    fn listing(id: &str, action: Action, price: u64) -> Listing {
        Listing {
            site: Site::Idealista,
            id: id.to_string(),
            action,
            url: format!("https://www.idealista.it/immobile/{}", id),
            price,
            title: format!("Casa {}", id),
            subtitle: String::new(),
            description: String::new(),
            details: Details::new(),
            tags: None,
            planimetry_photos: 0,
            video: 0,
            photos: 0,
            address: None,
        }
    }

    fn reviews(votes: &[i64]) -> BTreeMap<String, Review> {
        votes
            .iter()
            .enumerate()
            .map(|(i, vote)| (format!("user{}", i), Review { vote: *vote, comment: None }))
            .collect()
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|(l, _)| l.id.as_str()).collect()
    }

    #[test]
    fn test_action_then_vote_then_price() {
        let entries = vec![
            (listing("A", Action::Buy, 100), reviews(&[5])),
            (listing("C", Action::Rent, 50), reviews(&[9])),
            (listing("B", Action::Buy, 200), reviews(&[4, 6])),
        ];

        assert_eq!(ids(&order(entries)), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_unreviewed_counts_as_zero() {
        let entries = vec![
            (listing("cheap", Action::Buy, 90_000), reviews(&[1])),
            (listing("pricey", Action::Buy, 400_000), reviews(&[])),
        ];

        assert_eq!(ids(&order(entries)), vec!["cheap", "pricey"]);
        assert_eq!(average_vote(&reviews(&[])), 0.0);
    }

    #[test]
    fn test_full_ordering() {
        let entries = vec![
            (listing("auction", Action::Auction, 1_000_000), reviews(&[10])),
            (listing("rent-low", Action::Rent, 600), reviews(&[7])),
            (listing("buy-top", Action::Buy, 150_000), reviews(&[9, 8])),
            (listing("rent-high", Action::Rent, 900), reviews(&[7])),
            (listing("buy-none", Action::Buy, 500_000), reviews(&[])),
        ];

        assert_eq!(
            ids(&order(entries)),
            vec!["buy-top", "buy-none", "rent-high", "rent-low", "auction"]
        );
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let entries = vec![
            (listing("first", Action::Rent, 700), reviews(&[6])),
            (listing("second", Action::Rent, 700), reviews(&[6])),
        ];

        assert_eq!(ids(&order(entries)), vec!["first", "second"]);
    }
}
