//! Chat command handling on top of the scraping, storage and ranking layers.

use crate::format::{format_reviews, Formatter};
use crate::models::{Action, Review};
use crate::ranking::{order, Entry};
use crate::scrapers::{parse_batch, PageFetcher};
use crate::store::{DocumentStore, ListingRepository, UserCache};
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

const BUY_WORDS: &[&str] = &["casa", "case", "buy", "compra", "🏠", "🏡", "🏘", "🏚"];
const RENT_WORDS: &[&str] = &["affitto", "affitta", "rent", "🛏"];
const AUCTION_WORDS: &[&str] = &["asta", "auction", "bid", "📢"];

const VOTE_HINT: &str = "Leave a vote (1-10), optionally followed by a short comment, e.g. \"10 lovely!\"";
const DELETE_HINT: &str = "To delete the listing (and its reviews) write: delete";

/// An incoming chat message
#[derive(Debug, Clone)]
pub struct Message {
    /// Display name of the sender, also the reviewer name
    pub user: String,
    pub text: String,
    /// URLs already marked up by the chat platform; empty means scan `text`
    pub urls: Vec<String>,
}

impl Message {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self { user: user.into(), text: text.into(), urls: Vec::new() }
    }
}

/// All `http(s)://` tokens in `text`
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub struct Assistant<S, C> {
    repo: ListingRepository<S>,
    cache: C,
    fetcher: Box<dyn PageFetcher>,
    formatter: Formatter,
}

impl<S: DocumentStore, C: UserCache> Assistant<S, C> {
    pub fn new(store: S, cache: C, fetcher: Box<dyn PageFetcher>, formatter: Formatter) -> Self {
        Self { repo: ListingRepository::new(store), cache, fetcher, formatter }
    }

    /// Handle one message and return the reply text.
    ///
    /// The user's last viewed listing only survives until their next message.
    pub async fn handle(&self, message: &Message) -> Result<String> {
        let input = message.text.trim();
        let lowered = input.to_lowercase();
        let last_key = self.cache.get(&message.user).await;
        self.cache.delete(&message.user).await;

        if BUY_WORDS.contains(&lowered.as_str()) {
            return self.show_ranked(Action::Buy).await;
        }
        if RENT_WORDS.contains(&lowered.as_str()) {
            return self.show_ranked(Action::Rent).await;
        }
        if AUCTION_WORDS.contains(&lowered.as_str()) {
            return self.show_ranked(Action::Auction).await;
        }
        if let Some(command) = input.strip_prefix('/') {
            let key = command.split('@').next().unwrap_or_default();
            return self.show_listing(&message.user, key).await;
        }

        match last_key {
            Some(key) if input.starts_with(|c: char| c.is_ascii_digit()) => {
                self.review(&message.user, &key, input).await
            }
            Some(key) if lowered == "delete" => self.delete(&key).await,
            _ => self.search_and_save(message).await,
        }
    }

    async fn show_ranked(&self, action: Action) -> Result<String> {
        let entries: Vec<Entry> = self
            .repo
            .all_with_reviews()
            .await?
            .into_iter()
            .filter(|(listing, _)| listing.action == action)
            .collect();

        if entries.is_empty() {
            return Ok("No listings.".to_string());
        }

        let blocks: Vec<String> = order(entries)
            .iter()
            .map(|(listing, reviews)| {
                let mut block = self.formatter.format_short(listing, false);
                if !reviews.is_empty() {
                    block.push('\n');
                    block.push_str(&format_reviews(reviews));
                }
                block
            })
            .collect();

        Ok(blocks.join("\n\n"))
    }

    async fn show_listing(&self, user: &str, key: &str) -> Result<String> {
        let Some(listing) = self.repo.get(key).await? else {
            return Ok(format!("No listing {}", key));
        };
        let reviews = self.repo.reviews(key).await?;
        self.cache.set(user, key.to_string()).await;

        let mut text = self.formatter.format_detailed(&listing, true);
        text.push_str("\n-- REVIEWS --");
        if !reviews.is_empty() {
            text.push('\n');
            text.push_str(&format_reviews(&reviews));
        }
        text.push_str(&format!("\n\n{}\n{}", VOTE_HINT, DELETE_HINT));
        Ok(text)
    }

    async fn review(&self, user: &str, key: &str, input: &str) -> Result<String> {
        let Some(listing) = self.repo.get(key).await? else {
            return Ok(format!("No listing {}", key));
        };
        let Some(review) = Review::parse(input) else {
            return Ok(format!("Vote not understood: {}", input));
        };

        self.repo.put_review(key, user, &review).await?;
        info!("{} voted {} on {}", user, review.vote, key);

        Ok(format!("{}\n{} {}", self.formatter.format_short(&listing, true), user, review))
    }

    async fn delete(&self, key: &str) -> Result<String> {
        self.repo.delete(key).await?;
        info!("Deleted {}", key);
        Ok("🏠 deleted!".to_string())
    }

    async fn search_and_save(&self, message: &Message) -> Result<String> {
        let urls = if message.urls.is_empty() {
            extract_urls(&message.text)
        } else {
            message.urls.clone()
        };

        let outcome = parse_batch(self.fetcher.as_ref(), &urls).await;
        if !outcome.listings.is_empty() {
            self.repo.save_all(&outcome.listings).await?;
        }

        if let [listing] = outcome.listings.as_slice() {
            self.cache.set(&message.user, listing.key()).await;
            return Ok(format!("{}\n\n{}", self.formatter.format_detailed(listing, false), VOTE_HINT));
        }

        let errors = match outcome.error_count() {
            0 => String::new(),
            n => format!(" ({} errors)", n),
        };
        let mut text = format!("Found {} listings{}.", outcome.listings.len(), errors);
        if !outcome.listings.is_empty() {
            let shorts: Vec<String> = outcome
                .listings
                .iter()
                .map(|listing| self.formatter.format_short(listing, true))
                .collect();
            text.push_str("\n\n");
            text.push_str(&shorts.join("\n\n"));
        }
        Ok(text)
    }
}
