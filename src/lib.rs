//! Real-estate listing assistant: scrapes immobiliare.it and idealista.it
//! ads into a common record, stores them with reviews, and ranks them.

pub mod bot;
pub mod config;
pub mod format;
pub mod models;
pub mod normalizer;
pub mod ranking;
pub mod scrapers;
pub mod store;

pub use models::{Action, Listing, Review, Site};
pub use ranking::order;
pub use scrapers::{parse_batch, parse_listing, ParseError};
