//! In-memory document store backend.
//!
//! Backs tests and local development. Documents live in per-collection
//! maps behind a read-write lock; watches are `tokio::sync::watch`
//! channels that receive a freshly ordered full snapshot after every
//! committed write. Server timestamps come from a strictly monotonic
//! store-side clock, so `createdAt` ordering never depends on the caller.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::{RwLock, watch};

use crate::{
    Direction, Document, DocumentId, DocumentStore, OrderBy, StoreError,
    resolve_server_timestamps,
};

/// Watcher over a whole collection, with its requested ordering.
struct CollectionWatcher {
    order_by: OrderBy,
    tx: watch::Sender<Vec<Document>>,
}

#[derive(Default)]
struct CollectionState {
    docs: HashMap<DocumentId, Value>,
    collection_watchers: Vec<CollectionWatcher>,
    document_watchers: HashMap<DocumentId, Vec<watch::Sender<Option<Document>>>>,
}

fn ordered_snapshot(docs: &HashMap<DocumentId, Value>, order_by: &OrderBy) -> Vec<Document> {
    let mut docs: Vec<Document> = docs
        .iter()
        .map(|(id, data)| Document {
            id: *id,
            data: data.clone(),
        })
        .collect();

    docs.sort_by(|a, b| {
        let ordering = compare_fields(a.field(&order_by.field), b.field(&order_by.field))
            // Deterministic tie-break so equal keys keep a stable order.
            .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()));
        match order_by.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });

    docs
}

impl CollectionState {
    /// Push fresh snapshots to every live watcher; drop the dead ones.
    fn publish(&mut self, changed: DocumentId) {
        let docs = &self.docs;
        self.collection_watchers
            .retain(|w| w.tx.send(ordered_snapshot(docs, &w.order_by)).is_ok());

        if let Some(watchers) = self.document_watchers.get_mut(&changed) {
            let current = self.docs.get(&changed).map(|data| Document {
                id: changed,
                data: data.clone(),
            });
            watchers.retain(|tx| tx.send(current.clone()).is_ok());
            if watchers.is_empty() {
                self.document_watchers.remove(&changed);
            }
        }
    }
}

/// In-memory [`DocumentStore`] implementation.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionState>>,
    clock: Mutex<DateTime<Utc>>,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
            writes: AtomicU64::new(0),
        }
    }

    /// Total committed writes (creates + merges). Test observability.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Strictly monotonic server clock.
    fn server_now(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut now = Utc::now();
        if now <= *last {
            now = *last + Duration::microseconds(1);
        }
        *last = now;
        now
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, mut data: Value) -> Result<DocumentId, StoreError> {
        if !data.is_object() {
            return Err(StoreError::NotAnObject);
        }
        resolve_server_timestamps(&mut data, self.server_now());

        let mut collections = self.collections.write().await;
        let state = collections.entry(collection.to_owned()).or_default();
        let id = DocumentId::generate();
        state.docs.insert(id, data);
        state.publish(id);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);

        tracing::debug!(collection, document_id = %id, "document created");
        Ok(id)
    }

    async fn merge(
        &self,
        collection: &str,
        id: DocumentId,
        mut patch: Value,
    ) -> Result<(), StoreError> {
        let Value::Object(patch_map) = &mut patch else {
            return Err(StoreError::NotAnObject);
        };
        let now = self.server_now();
        for value in patch_map.values_mut() {
            resolve_server_timestamps(value, now);
        }

        let mut collections = self.collections.write().await;
        let state = collections.entry(collection.to_owned()).or_default();
        match state.docs.get_mut(&id) {
            Some(Value::Object(doc_map)) => {
                for (key, value) in std::mem::take(patch_map) {
                    doc_map.insert(key, value);
                }
            }
            Some(other) => {
                // Stored documents are always objects; anything else is a
                // corrupted entry.
                return Err(StoreError::Backend(format!(
                    "document {id} in {collection} is not an object: {other}"
                )));
            }
            None => {
                state.docs.insert(id, patch);
            }
        }
        state.publish(id);
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);

        tracing::debug!(collection, document_id = %id, "document merged");
        Ok(())
    }

    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|state| state.docs.get(&id))
            .map(|data| Document {
                id,
                data: data.clone(),
            }))
    }

    async fn watch_collection(
        &self,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<watch::Receiver<Vec<Document>>, StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections.entry(collection.to_owned()).or_default();
        let (tx, rx) = watch::channel(ordered_snapshot(&state.docs, &order_by));
        state.collection_watchers.push(CollectionWatcher { order_by, tx });
        Ok(rx)
    }

    async fn watch_document(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<watch::Receiver<Option<Document>>, StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections.entry(collection.to_owned()).or_default();
        let current = state.docs.get(&id).map(|data| Document {
            id,
            data: data.clone(),
        });
        let (tx, rx) = watch::channel(current);
        state.document_watchers.entry(id).or_default().push(tx);
        Ok(rx)
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y),
    }
}

fn compare_values(x: &Value, y: &Value) -> Ordering {
    match (x, y) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
