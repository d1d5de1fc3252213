//! Synced read models for the staff console.
//!
//! The console's three tabs are each a typed projection over the shared
//! collection sync: orders and leads newest first, customers by signup
//! time. Search is client-side over the already-materialized list, the
//! way the console filters a few hundred rows without another round trip.

use green_basket_core::{ContactLead, Order, Profile};
use green_basket_datastore::{CollectionSync, DocumentStore, OrderBy, StoreError, collections};

/// All orders, newest first.
pub struct OrdersFeed {
    sync: CollectionSync<Order>,
}

impl OrdersFeed {
    /// Subscribe to the orders collection.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let sync =
            CollectionSync::subscribe(store, collections::ORDERS, OrderBy::desc("createdAt"))
                .await?;
        Ok(Self { sync })
    }

    /// Latest materialized list.
    #[must_use]
    pub fn current(&self) -> Vec<Order> {
        self.sync.current()
    }

    /// Wait for the next republished list.
    ///
    /// # Errors
    ///
    /// Returns an error when the projection has shut down.
    pub async fn changed(&mut self) -> Result<(), tokio::sync::watch::error::RecvError> {
        self.sync.changed().await
    }
}

/// All customer profiles, newest signup first.
pub struct CustomersFeed {
    sync: CollectionSync<Profile>,
}

impl CustomersFeed {
    /// Subscribe to the customers collection.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let sync =
            CollectionSync::subscribe(store, collections::CUSTOMERS, OrderBy::desc("createdAt"))
                .await?;
        Ok(Self { sync })
    }

    /// Latest materialized list.
    #[must_use]
    pub fn current(&self) -> Vec<Profile> {
        self.sync.current()
    }

    /// Wait for the next republished list.
    ///
    /// # Errors
    ///
    /// Returns an error when the projection has shut down.
    pub async fn changed(&mut self) -> Result<(), tokio::sync::watch::error::RecvError> {
        self.sync.changed().await
    }
}

/// All contact leads, newest first.
pub struct LeadsFeed {
    sync: CollectionSync<ContactLead>,
}

impl LeadsFeed {
    /// Subscribe to the contact requests collection.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let sync = CollectionSync::subscribe(
            store,
            collections::CONTACT_REQUESTS,
            OrderBy::desc("createdAt"),
        )
        .await?;
        Ok(Self { sync })
    }

    /// Latest materialized list.
    #[must_use]
    pub fn current(&self) -> Vec<ContactLead> {
        self.sync.current()
    }

    /// Wait for the next republished list.
    ///
    /// # Errors
    ///
    /// Returns an error when the projection has shut down.
    pub async fn changed(&mut self) -> Result<(), tokio::sync::watch::error::RecvError> {
        self.sync.changed().await
    }
}

/// Case-insensitive search over contact name, phone, and address.
#[must_use]
pub fn search_orders<'a>(orders: &'a [Order], term: &str) -> Vec<&'a Order> {
    let term = term.to_lowercase();
    orders
        .iter()
        .filter(|order| {
            order.profile.name.to_lowercase().contains(&term)
                || order.profile.phone.to_lowercase().contains(&term)
                || order.profile.address.to_lowercase().contains(&term)
        })
        .collect()
}
