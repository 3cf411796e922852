use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{CatalogReader, CatalogWriter, Error, Item, ItemDraft, Result};

/// A live record plus the sequence number of its insertion.
///
/// The sequence breaks ordering ties between items created in the same
/// instant: the later insert wins.
struct Entry {
    item: Item,
    seq: u64,
}

struct Inner {
    items: HashMap<String, Entry>,
    next_seq: u64,
}

/// The authoritative in-memory record store.
///
/// All operations take the same lock, so every insert, lookup, enumeration
/// and removal is atomic with respect to the others. State is volatile and
/// scoped to the life of the hosting process.
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Inserts a fully-formed item under its own id.
    ///
    /// Fails with [`Error::DuplicateId`] if the id is already present. The
    /// id generator guarantees uniqueness, so a duplicate here signals a
    /// programming error rather than a condition worth retrying.
    pub fn insert(&self, item: Item) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.items.contains_key(&item.id) {
            return Err(Error::DuplicateId(item.id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.items.insert(item.id.clone(), Entry { item, seq });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogReader for MemStore {
    async fn get(&self, id: &str) -> Result<Item> {
        let inner = self.inner.read().unwrap();
        inner
            .items
            .get(id)
            .map(|entry| entry.item.clone())
            .ok_or(Error::NotFound)
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let inner = self.inner.read().unwrap();
        let mut entries: Vec<&Entry> = inner.items.values().collect();
        // Map iteration order is arbitrary; sort on every call.
        entries.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|e| e.item.clone()).collect())
    }
}

#[async_trait]
impl CatalogWriter for MemStore {
    async fn create(&self, draft: ItemDraft) -> Result<Item> {
        let item = Item::new(draft);
        match self.insert(item.clone()) {
            Ok(()) => Ok(item),
            Err(e @ Error::DuplicateId(_)) => {
                log::error!("id generator produced a duplicate: {}", e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.items.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn draft(title: &str) -> ItemDraft {
        ItemDraft {
            title: title.to_string(),
            description: format!("{} description", title),
            image_url: format!("blob://{}", title.to_lowercase()),
        }
    }

    fn item_at(title: &str, created_at: chrono::DateTime<Utc>) -> Item {
        let mut item = Item::new(draft(title));
        item.created_at = created_at;
        item.updated_at = created_at;
        item
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemStore::new();
        let created = store.create(draft("Lamp")).await.unwrap();

        let got = store.get(&created.id).await.unwrap();
        assert_eq!(got, created);
        assert_eq!(got.created_at, got.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemStore::new();
        let res = store.get("no-such-id").await;
        assert!(matches!(res, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = MemStore::new();
        let t0 = Utc::now();
        let lamp = item_at("Lamp", t0);
        let mug = item_at("Mug", t0 + Duration::seconds(1));

        store.insert(lamp.clone()).unwrap();
        store.insert(mug.clone()).unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![mug, lamp]);
    }

    #[tokio::test]
    async fn test_list_breaks_timestamp_ties_by_insertion() {
        let store = MemStore::new();
        let t0 = Utc::now();
        let first = item_at("First", t0);
        let second = item_at("Second", t0);

        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![second, first]);
    }

    #[tokio::test]
    async fn test_remove_reports_whether_present() {
        let store = MemStore::new();
        let created = store.create(draft("Lamp")).await.unwrap();

        assert!(store.remove(&created.id).await.unwrap());
        assert!(!store.remove(&created.id).await.unwrap());
        assert!(matches!(store.get(&created.id).await, Err(Error::NotFound)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_id_leaves_size_unchanged() {
        let store = MemStore::new();
        store.create(draft("Lamp")).await.unwrap();

        assert!(!store.remove("no-such-id").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemStore::new();
        let item = Item::new(draft("Lamp"));

        store.insert(item.clone()).unwrap();
        let res = store.insert(item);
        assert!(matches!(res, Err(Error::DuplicateId(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let store = MemStore::new();
        store.create(draft("Lamp")).await.unwrap();

        let before = store.list().await.unwrap();
        store.create(draft("Mug")).await.unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_length_tracks_inserts_minus_removes() {
        let store = MemStore::new();
        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(store.create(draft(&format!("Item{}", i))).await.unwrap().id);
        }
        for id in ids.iter().take(3) {
            assert!(store.remove(id).await.unwrap());
        }
        assert_eq!(store.list().await.unwrap().len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_all_visible_once() {
        let store = Arc::new(MemStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(&format!("Item{}", i))).await.unwrap().id
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 32);
        let listed: HashSet<String> = all.into_iter().map(|i| i.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_create_delete_scenario() {
        let store = MemStore::new();
        let t0 = Utc::now();
        let lamp = item_at("Lamp", t0);
        let mug = item_at("Mug", t0 + Duration::seconds(1));
        store.insert(lamp.clone()).unwrap();
        store.insert(mug.clone()).unwrap();
        assert_eq!(store.list().await.unwrap(), vec![mug.clone(), lamp.clone()]);

        assert!(store.remove(&lamp.id).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![mug]);
        assert!(matches!(store.get(&lamp.id).await, Err(Error::NotFound)));
    }
}
