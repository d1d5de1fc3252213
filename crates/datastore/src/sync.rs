//! Push-based collection read models.
//!
//! [`CollectionSync`] projects a watched collection into an ordered,
//! locally observable list of typed records. Every server-observed change
//! re-materializes and republishes the full list - consumers re-derive
//! from each snapshot instead of patching incrementally, so the local
//! projection can never diverge from the remote state.
//!
//! The same projection serves the customer's own order history and the
//! admin console's orders, customers, and leads tabs; the only parameters
//! are the collection, the ordering, and an optional filter.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{Document, DocumentStore, OrderBy, StoreError};

/// Client-side predicate applied to each decoded record.
pub type SyncFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A live, typed projection of one collection.
///
/// Holds exactly one store subscription; dropping the handle cancels it.
pub struct CollectionSync<T> {
    rx: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T> CollectionSync<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Subscribe to a collection with the given ordering.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe(
        store: &dyn DocumentStore,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<Self, StoreError> {
        Self::subscribe_filtered(store, collection, order_by, None).await
    }

    /// Subscribe with a client-side filter over decoded records.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe_filtered(
        store: &dyn DocumentStore,
        collection: &str,
        order_by: OrderBy,
        filter: Option<SyncFilter<T>>,
    ) -> Result<Self, StoreError> {
        let mut source = store.watch_collection(collection, order_by).await?;
        let collection = collection.to_owned();

        let initial = project(&source.borrow_and_update(), filter.as_ref(), &collection);
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while source.changed().await.is_ok() {
                let docs = source.borrow_and_update().clone();
                let list = project(&docs, filter.as_ref(), &collection);
                if tx.send(list).is_err() {
                    // All consumers are gone.
                    break;
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// The latest materialized list.
    #[must_use]
    pub fn current(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }

    /// A receiver over future snapshots, for consumers that outlive the
    /// handle's borrow.
    #[must_use]
    pub fn receiver(&self) -> watch::Receiver<Vec<T>> {
        self.rx.clone()
    }

    /// Wait for the next republished snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the projection task has shut down.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

impl<T> Drop for CollectionSync<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Decode and filter one remote snapshot.
///
/// Documents that fail to decode are dropped with a warning rather than
/// corrupting the projection.
fn project<T>(docs: &[Document], filter: Option<&SyncFilter<T>>, collection: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(collection, document_id = %doc.id, %error, "skipping undecodable document");
                None
            }
        })
        .filter(|record| filter.is_none_or(|f| f(record)))
        .collect()
}
