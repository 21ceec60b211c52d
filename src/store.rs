//! Persistence of listings and reviews, and the per-user "last viewed" cache.

use crate::models::{Listing, Review};
use crate::ranking::Entry;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Hierarchical JSON document store addressed by `/`-separated paths.
///
/// Reading an inner path returns the whole subtree as an object.
/// Writes are last-write-wins per path; there are no transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Write each child of `path` in `children`, leaving other children alone
    async fn update(&self, path: &str, children: Map<String, Value>) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;
}

pub async fn get_typed<T: DeserializeOwned>(store: &dyn DocumentStore, path: &str) -> Result<Option<T>> {
    match store.get(path).await? {
        Some(value) => {
            let typed = serde_json::from_value(value).with_context(|| format!("Malformed document at {}", path))?;
            Ok(Some(typed))
        }
        None => Ok(None),
    }
}

pub async fn set_typed<T: Serialize>(store: &dyn DocumentStore, path: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value).context("Failed to serialize document")?;
    store.set(path, value).await
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// In-process [`DocumentStore`] holding a single JSON tree
#[derive(Debug)]
pub struct MemoryStore {
    root: RwLock<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { root: RwLock::new(Value::Object(Map::new())) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn node_mut<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Value {
    path.iter().fold(root, |node, segment| {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        match node {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            _ => unreachable!("node was just made an object"),
        }
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.read().await;
        let found = segments(path)
            .iter()
            .try_fold(&*root, |node, segment| node.get(segment));
        Ok(found.filter(|v| !v.is_null()).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        debug!("store set {}", path);
        let mut root = self.root.write().await;
        *node_mut(&mut root, &segments(path)) = value;
        Ok(())
    }

    async fn update(&self, path: &str, children: Map<String, Value>) -> Result<()> {
        debug!("store update {} ({} children)", path, children.len());
        let mut root = self.root.write().await;
        let node = node_mut(&mut root, &segments(path));
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            map.extend(children);
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        debug!("store delete {}", path);
        let mut root = self.root.write().await;
        let segments = segments(path);
        let Some((last, parents)) = segments.split_last() else {
            *root = Value::Object(Map::new());
            return Ok(());
        };

        let parent = parents.iter().try_fold(&mut *root, |node, segment| node.get_mut(*segment));
        if let Some(Value::Object(map)) = parent {
            map.remove(*last);
        }
        Ok(())
    }
}

const HOUSES: &str = "house";
const REVIEWS: &str = "review";

/// Escape `%` and `/` so a display name stays a single path segment
fn encode_segment(name: &str) -> String {
    name.replace('%', "%25").replace('/', "%2F")
}

fn decode_segment(segment: &str) -> String {
    segment.replace("%2F", "/").replace("%25", "%")
}

fn decode_reviewers(reviews: BTreeMap<String, Review>) -> BTreeMap<String, Review> {
    reviews
        .into_iter()
        .map(|(reviewer, review)| (decode_segment(&reviewer), review))
        .collect()
}

/// Typed access to listings (`house/<key>`) and reviews (`review/<key>/<reviewer>`)
pub struct ListingRepository<S> {
    store: S,
}

impl<S: DocumentStore> ListingRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store all listings in one write; same key overwrites
    pub async fn save_all(&self, listings: &[Listing]) -> Result<()> {
        let mut children = Map::new();
        for listing in listings {
            let value = serde_json::to_value(listing).context("Failed to serialize listing")?;
            children.insert(listing.key(), value);
        }
        self.store.update(HOUSES, children).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<Listing>> {
        get_typed(&self.store, &format!("{}/{}", HOUSES, key)).await
    }

    /// Remove a listing together with all of its reviews
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&format!("{}/{}", HOUSES, key)).await?;
        self.store.delete(&format!("{}/{}", REVIEWS, key)).await
    }

    pub async fn reviews(&self, key: &str) -> Result<BTreeMap<String, Review>> {
        let stored = get_typed(&self.store, &format!("{}/{}", REVIEWS, key)).await?;
        Ok(decode_reviewers(stored.unwrap_or_default()))
    }

    /// Store `reviewer`'s review of `key`, replacing any earlier one
    pub async fn put_review(&self, key: &str, reviewer: &str, review: &Review) -> Result<()> {
        if reviewer.is_empty() {
            bail!("Reviewer name must not be empty");
        }
        let path = format!("{}/{}/{}", REVIEWS, key, encode_segment(reviewer));
        set_typed(&self.store, &path, review).await
    }

    /// Every stored listing paired with its reviews
    pub async fn all_with_reviews(&self) -> Result<Vec<Entry>> {
        let houses: Map<String, Value> = get_typed(&self.store, HOUSES).await?.unwrap_or_default();
        let mut reviews: BTreeMap<String, BTreeMap<String, Review>> =
            get_typed(&self.store, REVIEWS).await?.unwrap_or_default();

        houses
            .into_iter()
            .map(|(key, value)| -> Result<Entry> {
                let listing: Listing = serde_json::from_value(value)
                    .with_context(|| format!("Malformed listing {}", key))?;
                let listing_reviews = decode_reviewers(reviews.remove(&listing.key()).unwrap_or_default());
                Ok((listing, listing_reviews))
            })
            .collect()
    }
}

/// Remembers the listing each user last looked at
#[async_trait]
pub trait UserCache: Send + Sync {
    async fn get(&self, user: &str) -> Option<String>;

    async fn set(&self, user: &str, value: String);

    async fn delete(&self, user: &str);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserCache for MemoryCache {
    async fn get(&self, user: &str) -> Option<String> {
        self.entries.lock().await.get(user).cloned()
    }

    async fn set(&self, user: &str, value: String) {
        self.entries.lock().await.insert(user.to_string(), value);
    }

    async fn delete(&self, user: &str) {
        self.entries.lock().await.remove(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, Details, Site};
    use serde_json::json;

    fn listing(id: &str, price: u64) -> Listing {
        let mut details = Details::new();
        for i in 0..12 {
            details.insert(format!("d{}", i), format!("feature {}", i));
        }

        Listing {
            site: Site::Immobiliare,
            id: id.to_string(),
            action: Action::Buy,
            url: format!("https://www.immobiliare.it/annunci/{}", id),
            price,
            title: "Attico".to_string(),
            subtitle: String::new(),
            description: String::new(),
            details,
            tags: None,
            planimetry_photos: 0,
            video: 0,
            photos: 3,
            address: Some("Via Verdi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_memory_store_paths() {
        let store = MemoryStore::new();
        store.set("a/b/c", json!(1)).await.unwrap();
        store.set("a/b/d", json!("x")).await.unwrap();

        assert_eq!(store.get("a/b").await.unwrap(), Some(json!({ "c": 1, "d": "x" })));
        assert_eq!(store.get("a/b/c").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get("a/z").await.unwrap(), None);

        let mut children = Map::new();
        children.insert("e".to_string(), json!(true));
        store.update("a/b", children).await.unwrap();
        assert_eq!(store.get("a/b/d").await.unwrap(), Some(json!("x")));
        assert_eq!(store.get("a/b/e").await.unwrap(), Some(json!(true)));

        store.delete("a/b").await.unwrap();
        assert_eq!(store.get("a/b/c").await.unwrap(), None);
        assert_eq!(store.get("a").await.unwrap(), Some(json!({})));
    }

    #[tokio::test]
    async fn test_repository_roundtrip_keeps_detail_order() {
        let repo = ListingRepository::new(MemoryStore::new());
        let original = listing("55", 320_000);
        repo.save_all(&[original.clone()]).await.unwrap();

        let stored = repo.get("immobiliare_55").await.unwrap().unwrap();
        assert_eq!(stored, original);
        let keys: Vec<&str> = stored.details.keys().map(String::as_str).collect();
        assert_eq!(keys[10], "d10");
        assert_eq!(keys[2], "d2");
    }

    #[tokio::test]
    async fn test_resubmission_overwrites() {
        let repo = ListingRepository::new(MemoryStore::new());
        repo.save_all(&[listing("7", 100_000)]).await.unwrap();
        repo.save_all(&[listing("7", 95_000), listing("8", 1)]).await.unwrap();

        let all = repo.all_with_reviews().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.get("immobiliare_7").await.unwrap().unwrap().price, 95_000);
    }

    #[tokio::test]
    async fn test_delete_removes_reviews() {
        let repo = ListingRepository::new(MemoryStore::new());
        repo.save_all(&[listing("7", 100_000), listing("8", 90_000)]).await.unwrap();
        let review = Review { vote: 9, comment: Some("top".to_string()) };
        repo.put_review("immobiliare_7", "anna", &review).await.unwrap();
        repo.put_review("immobiliare_8", "anna", &review).await.unwrap();

        let all = repo.all_with_reviews().await.unwrap();
        let seven = all.iter().find(|(l, _)| l.id == "7").unwrap();
        assert_eq!(seven.1.get("anna"), Some(&review));

        repo.delete("immobiliare_7").await.unwrap();
        assert_eq!(repo.get("immobiliare_7").await.unwrap(), None);
        assert!(repo.reviews("immobiliare_7").await.unwrap().is_empty());
        assert_eq!(repo.reviews("immobiliare_8").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reviewer_name_with_slash_is_one_review() {
        let repo = ListingRepository::new(MemoryStore::new());
        repo.save_all(&[listing("7", 100_000)]).await.unwrap();
        let review = Review { vote: 8, comment: Some("ok".to_string()) };
        repo.put_review("immobiliare_7", "Mario/Rossi", &review).await.unwrap();
        repo.put_review("immobiliare_7", "50%/off", &review).await.unwrap();
        repo.put_review("immobiliare_7", "anna", &review).await.unwrap();

        let reviews = repo.reviews("immobiliare_7").await.unwrap();
        let names: Vec<&str> = reviews.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["50%/off", "Mario/Rossi", "anna"]);

        let all = repo.all_with_reviews().await.unwrap();
        assert_eq!(all[0].1.get("Mario/Rossi"), Some(&review));

        // Voting again replaces the earlier review
        let second = Review { vote: 3, comment: None };
        repo.put_review("immobiliare_7", "Mario/Rossi", &second).await.unwrap();
        let reviews = repo.reviews("immobiliare_7").await.unwrap();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews.get("Mario/Rossi"), Some(&second));
    }

    #[tokio::test]
    async fn test_empty_reviewer_is_rejected() {
        let repo = ListingRepository::new(MemoryStore::new());
        let review = Review { vote: 5, comment: None };
        assert!(repo.put_review("immobiliare_7", "", &review).await.is_err());
        assert!(repo.reviews("immobiliare_7").await.unwrap().is_empty());
    }

    #[test]
    fn test_segment_encoding() {
        for name in ["Mario/Rossi", "a%2Fb", "100%", "plain"] {
            let encoded = encode_segment(name);
            assert!(!encoded.contains('/'));
            assert_eq!(decode_segment(&encoded), name);
        }
    }

    #[tokio::test]
    async fn test_unknown_action_still_loads() {
        let store = MemoryStore::new();
        let mut value = serde_json::to_value(listing("9", 1)).unwrap();
        value["action"] = json!("lease");
        store.set("house/immobiliare_9", value).await.unwrap();

        let repo = ListingRepository::new(store);
        let all = repo.all_with_reviews().await.unwrap();
        assert_eq!(all[0].0.action, Action::Unknown);
    }

    #[tokio::test]
    async fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("anna").await, None);
        cache.set("anna", "idealista_1".to_string()).await;
        assert_eq!(cache.get("anna").await.as_deref(), Some("idealista_1"));
        cache.delete("anna").await;
        assert_eq!(cache.get("anna").await, None);
    }
}
