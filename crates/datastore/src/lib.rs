//! Document store abstractions for Green Basket.
//!
//! The remote document store is an external collaborator; this crate owns
//! the narrow interface the rest of the system is allowed to touch:
//! create-with-generated-id, merge-update-by-id, point reads, and
//! real-time watches over collections and single documents. Watches carry
//! full snapshots - every delivered value completely replaces the previous
//! projection, so consumers never patch incrementally and never mix stale
//! and fresh data.
//!
//! Timestamps that must be globally ordered (`createdAt`, `approvedAt`)
//! are written as [`server_timestamp`] sentinels and resolved by the
//! backend at commit time, keeping ordering consistent across clients with
//! unsynchronized clocks.
//!
//! [`memory::MemoryStore`] is the in-repo backend, used by tests and local
//! development. [`sync::CollectionSync`] is the push-based read model the
//! storefront order history and the admin dashboard both consume.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod memory;
pub mod sync;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::sync::watch;

pub use memory::MemoryStore;
pub use sync::CollectionSync;

/// Collection names used by the Green Basket document store.
pub mod collections {
    /// Business customer profiles, keyed by identity.
    pub const CUSTOMERS: &str = "customers";
    /// Submitted orders.
    pub const ORDERS: &str = "orders";
    /// Contact-form business leads.
    pub const CONTACT_REQUESTS: &str = "contactRequests";
}

/// Errors that can occur during document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced document does not exist.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// Collection searched.
        collection: String,
        /// Missing document ID.
        id: DocumentId,
    },
    /// Document payloads must be JSON objects.
    #[error("document data must be a JSON object")]
    NotAnObject,
    /// A document could not be decoded into the requested type.
    #[error("failed to decode document {id}: {source}")]
    Decode {
        /// Offending document ID.
        id: DocumentId,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The storage backend rejected or failed the operation.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Identifier assigned by the store when a document is created.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(uuid::Uuid);

impl DocumentId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: uuid::Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for DocumentId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

/// A stored document: the assigned ID plus its JSON object payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// Object payload.
    pub data: Value,
}

impl Document {
    /// Decode the payload into a typed record.
    ///
    /// The document ID is injected as an `id` field before decoding, so
    /// domain types carry their identity the same way the remote reads do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the payload does not match the
    /// target type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.insert("id".to_owned(), json!(self.id));
        }
        serde_json::from_value(data).map_err(|source| StoreError::Decode {
            id: self.id,
            source,
        })
    }

    /// Borrow a top-level field of the payload.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.as_object().and_then(|map| map.get(name))
    }
}

/// Sort direction for collection watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied to a collection watch, by a top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Top-level field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Ascending order on a field.
    #[must_use]
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Ascending,
        }
    }

    /// Descending order on a field. The order feeds use
    /// `OrderBy::desc("createdAt")` so the newest documents come first.
    #[must_use]
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: Direction::Descending,
        }
    }
}

/// Key under which a server-timestamp sentinel is written.
const SERVER_TIMESTAMP_KEY: &str = "$serverTimestamp";

/// A placeholder the backend replaces with its own clock at commit time.
///
/// Used for `createdAt` / `approvedAt` so ordering does not depend on
/// client clocks.
#[must_use]
pub fn server_timestamp() -> Value {
    json!({ SERVER_TIMESTAMP_KEY: true })
}

/// Replace every [`server_timestamp`] sentinel in `value` with `now`.
pub(crate) fn resolve_server_timestamps(value: &mut Value, now: DateTime<Utc>) {
    match value {
        Value::Object(map) => {
            if is_sentinel(map) {
                *value = Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true));
                return;
            }
            for child in map.values_mut() {
                resolve_server_timestamps(child, now);
            }
        }
        Value::Array(items) => {
            for child in items {
                resolve_server_timestamps(child, now);
            }
        }
        _ => {}
    }
}

fn is_sentinel(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.get(SERVER_TIMESTAMP_KEY) == Some(&Value::Bool(true))
}

/// The narrow interface to the remote document store.
///
/// Everything the cart/order core needs from its store fits in five
/// operations; backends stay swappable behind this trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-generated ID, resolving timestamp
    /// sentinels. Returns the assigned ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAnObject`] for non-object payloads, or a
    /// backend error if the write is rejected.
    async fn create(&self, collection: &str, data: Value) -> Result<DocumentId, StoreError>;

    /// Merge `patch` into a document by ID: top-level fields in the patch
    /// overwrite, everything else is preserved. Creates the document when
    /// it does not exist (upsert), matching the remote store's
    /// merge-write semantics.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAnObject`] for non-object patches, or a
    /// backend error if the write is rejected.
    async fn merge(&self, collection: &str, id: DocumentId, patch: Value)
    -> Result<(), StoreError>;

    /// Fetch a single document, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read fails.
    async fn get(&self, collection: &str, id: DocumentId)
    -> Result<Option<Document>, StoreError>;

    /// Watch a collection, ordered by `order_by`.
    ///
    /// The receiver starts at the current snapshot and is pushed a full
    /// replacement snapshot on every server-observed change. Dropping the
    /// receiver ends the subscription.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the subscription cannot be established.
    async fn watch_collection(
        &self,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<watch::Receiver<Vec<Document>>, StoreError>;

    /// Watch a single document by ID, `None` while it does not exist.
    /// Dropping the receiver ends the subscription.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the subscription cannot be established.
    async fn watch_document(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<watch::Receiver<Option<Document>>, StoreError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_server_timestamps_recurses() {
        let now = Utc::now();
        let mut value = json!({
            "createdAt": server_timestamp(),
            "nested": { "approvedAt": server_timestamp() },
            "items": [ { "createdAt": server_timestamp() } ],
            "name": "unchanged",
        });

        resolve_server_timestamps(&mut value, now);

        let stamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
        assert_eq!(value["createdAt"], json!(stamp));
        assert_eq!(value["nested"]["approvedAt"], json!(stamp));
        assert_eq!(value["items"][0]["createdAt"], json!(stamp));
        assert_eq!(value["name"], json!("unchanged"));
    }

    #[test]
    fn test_sentinel_requires_exact_shape() {
        let now = Utc::now();
        // An object that merely contains the key is user data, not a sentinel.
        let mut value = json!({ "$serverTimestamp": true, "extra": 1 });
        let before = value.clone();
        resolve_server_timestamps(&mut value, now);
        assert_eq!(value, before);
    }

    #[test]
    fn test_document_decode_injects_id() {
        #[derive(serde::Deserialize)]
        struct Row {
            id: DocumentId,
            name: String,
        }

        let doc = Document {
            id: DocumentId::generate(),
            data: json!({ "name": "tomato" }),
        };
        let row: Row = doc.decode().unwrap();
        assert_eq!(row.id, doc.id);
        assert_eq!(row.name, "tomato");
    }

    #[test]
    fn test_document_decode_error_carries_id() {
        let doc = Document {
            id: DocumentId::generate(),
            data: json!({ "name": 42 }),
        };

        #[derive(serde::Deserialize, Debug)]
        struct Row {
            #[allow(dead_code)]
            name: String,
        }

        let err = doc.decode::<Row>().unwrap_err();
        assert!(matches!(err, StoreError::Decode { id, .. } if id == doc.id));
    }
}
