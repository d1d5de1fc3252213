//! Mirror of the signed-in customer's remote profile document.
//!
//! The remote `customers/{id}` document is the source of truth; the
//! storefront reads profiles only through this mirror. A background task
//! follows the auth-state stream: every identity change tears down the
//! previous document watch and establishes a new one (or none when signed
//! out), so subscriptions never leak across identity switches.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use green_basket_core::{CurrentUser, Profile, ProfileUpdate};
use green_basket_datastore::{
    Document, DocumentId, DocumentStore, StoreError, collections, server_timestamp,
};

/// Errors from [`ProfileStore::save`].
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No identity is signed in.
    #[error("sign in before saving your profile")]
    Unauthenticated,
    /// The remote write was rejected.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The mirrored profile plus the resolution flag dependent UI defers on.
///
/// `loading` is true from the moment an identity transition starts until
/// the first document snapshot for that identity arrives; it resolves
/// exactly once per transition, including when the document does not exist
/// (`profile = None`, `loading = false`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState {
    /// The mirrored profile, `None` when signed out or not yet created.
    pub profile: Option<Profile>,
    /// Whether identity resolution or the first fetch is outstanding.
    pub loading: bool,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            loading: true,
        }
    }
}

/// Read-through cache of the current identity's profile document.
pub struct ProfileStore {
    store: Arc<dyn DocumentStore>,
    auth: watch::Receiver<Option<CurrentUser>>,
    state: watch::Receiver<ProfileState>,
    task: JoinHandle<()>,
}

impl ProfileStore {
    /// Start mirroring against the given auth-state stream.
    #[must_use]
    pub fn spawn(
        store: Arc<dyn DocumentStore>,
        auth: watch::Receiver<Option<CurrentUser>>,
    ) -> Self {
        let (tx, state) = watch::channel(ProfileState::default());
        let task = tokio::spawn(run_mirror(Arc::clone(&store), auth.clone(), tx));
        Self {
            store,
            auth,
            state,
            task,
        }
    }

    /// Current mirror state.
    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    /// Current profile, when one is mirrored.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().profile.clone()
    }

    /// The identity the mirror is currently following.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.auth.borrow().clone()
    }

    /// Observe mirror states.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.clone()
    }

    /// Merge a partial update into the remote profile document.
    ///
    /// Unset fields are preserved. The first save for an identity also
    /// stamps `createdAt` and records the sign-in email; every save stamps
    /// `updatedAt`. The mirror picks the result up through its watch.
    ///
    /// # Errors
    ///
    /// [`SaveError::Unauthenticated`] when signed out; [`SaveError::Store`]
    /// when the write is rejected.
    pub async fn save(&self, update: ProfileUpdate) -> Result<(), SaveError> {
        let user = self.auth.borrow().clone().ok_or(SaveError::Unauthenticated)?;
        let doc_id = DocumentId::new(user.id.as_uuid());

        let mut patch = serde_json::to_value(&update)
            .map_err(|e| SaveError::Store(StoreError::Backend(e.to_string())))?;
        let Value::Object(map) = &mut patch else {
            return Err(SaveError::Store(StoreError::NotAnObject));
        };

        let exists = self
            .store
            .get(collections::CUSTOMERS, doc_id)
            .await?
            .is_some();
        if !exists {
            map.insert("createdAt".to_owned(), server_timestamp());
            map.entry("email").or_insert_with(|| json!(user.email));
        }
        map.insert("updatedAt".to_owned(), server_timestamp());

        self.store
            .merge(collections::CUSTOMERS, doc_id, patch)
            .await?;
        tracing::info!(customer_id = %user.id, "Profile saved");
        Ok(())
    }
}

impl Drop for ProfileStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_mirror(
    store: Arc<dyn DocumentStore>,
    mut auth: watch::Receiver<Option<CurrentUser>>,
    state: watch::Sender<ProfileState>,
) {
    loop {
        let user = auth.borrow_and_update().clone();
        let Some(user) = user else {
            state.send_replace(ProfileState {
                profile: None,
                loading: false,
            });
            if auth.changed().await.is_err() {
                return;
            }
            continue;
        };

        state.send_replace(ProfileState {
            profile: None,
            loading: true,
        });
        let doc_id = DocumentId::new(user.id.as_uuid());
        let mut documents = match store.watch_document(collections::CUSTOMERS, doc_id).await {
            Ok(rx) => rx,
            Err(error) => {
                tracing::warn!(customer_id = %user.id, %error, "Profile subscription failed");
                state.send_replace(ProfileState {
                    profile: None,
                    loading: false,
                });
                if auth.changed().await.is_err() {
                    return;
                }
                continue;
            }
        };

        // First snapshot resolves the loading flag, document or not.
        publish(&state, documents.borrow_and_update().as_ref());

        loop {
            tokio::select! {
                changed = auth.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Identity switch: drop this document watch and
                    // re-resolve from the latest identity.
                    break;
                }
                changed = documents.changed() => {
                    if changed.is_err() {
                        // Store went away; nothing more to mirror.
                        return;
                    }
                    publish(&state, documents.borrow_and_update().as_ref());
                }
            }
        }
    }
}

fn publish(state: &watch::Sender<ProfileState>, doc: Option<&Document>) {
    let profile = doc.and_then(|doc| match doc.decode::<Profile>() {
        Ok(profile) => Some(profile),
        Err(error) => {
            tracing::warn!(document_id = %doc.id, %error, "Skipping undecodable profile document");
            None
        }
    });
    state.send_replace(ProfileState {
        profile,
        loading: false,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use green_basket_core::{CustomerId, Email};
    use green_basket_datastore::MemoryStore;

    use super::*;

    fn user(id: CustomerId) -> CurrentUser {
        CurrentUser {
            id,
            email: Email::parse("asha@freshmart.in").unwrap(),
            display_name: Some("Asha Rao".to_owned()),
        }
    }

    async fn wait_until(
        rx: &mut watch::Receiver<ProfileState>,
        accept: impl Fn(&ProfileState) -> bool,
    ) -> ProfileState {
        loop {
            {
                let current = rx.borrow_and_update();
                if accept(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_signed_out_resolves_to_no_profile() {
        let store = Arc::new(MemoryStore::new());
        let (_auth_tx, auth_rx) = watch::channel(None);
        let profiles = ProfileStore::spawn(store, auth_rx);

        let mut state = profiles.subscribe();
        let resolved = wait_until(&mut state, |s| !s.loading).await;
        assert!(resolved.profile.is_none());
    }

    #[tokio::test]
    async fn test_missing_document_still_resolves_loading() {
        let store = Arc::new(MemoryStore::new());
        let id = CustomerId::generate();
        let (_auth_tx, auth_rx) = watch::channel(Some(user(id)));
        let profiles = ProfileStore::spawn(store, auth_rx);

        let mut state = profiles.subscribe();
        let resolved = wait_until(&mut state, |s| !s.loading).await;
        assert!(resolved.profile.is_none());
    }

    #[tokio::test]
    async fn test_save_creates_then_mirror_updates() {
        let store = Arc::new(MemoryStore::new());
        let id = CustomerId::generate();
        let (_auth_tx, auth_rx) = watch::channel(Some(user(id)));
        let profiles = ProfileStore::spawn(Arc::clone(&store) as Arc<dyn DocumentStore>, auth_rx);

        let mut state = profiles.subscribe();
        wait_until(&mut state, |s| !s.loading).await;

        profiles
            .save(ProfileUpdate {
                name: Some("Asha Rao".to_owned()),
                business: Some("Freshmart Wholesale".to_owned()),
                phone: Some("+91 98450 12345".to_owned()),
                address: Some("14 Market Rd, Bengaluru".to_owned()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        let resolved = wait_until(&mut state, |s| s.profile.is_some()).await;
        let profile = resolved.profile.unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.business, "Freshmart Wholesale");
        // First save records the sign-in email and stamps both times.
        assert_eq!(profile.email.as_str(), "asha@freshmart.in");
        assert!(profile.created_at.is_some());
        assert!(profile.updated_at.is_some());

        // A later partial save preserves everything it does not mention.
        profiles
            .save(ProfileUpdate {
                phone: Some("+91 90000 00000".to_owned()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();
        let resolved = wait_until(&mut state, |s| {
            s.profile
                .as_ref()
                .is_some_and(|p| p.phone == "+91 90000 00000")
        })
        .await;
        let profile = resolved.profile.unwrap();
        assert_eq!(profile.business, "Freshmart Wholesale");
        assert!(profile.created_at.is_some());
    }

    #[tokio::test]
    async fn test_identity_switch_tears_down_previous_subscription() {
        let store = Arc::new(MemoryStore::new());
        let first = CustomerId::generate();
        let second = CustomerId::generate();
        let (auth_tx, auth_rx) = watch::channel(Some(user(first)));
        let profiles = ProfileStore::spawn(Arc::clone(&store) as Arc<dyn DocumentStore>, auth_rx);

        let mut state = profiles.subscribe();
        wait_until(&mut state, |s| !s.loading).await;
        profiles
            .save(ProfileUpdate {
                name: Some("First".to_owned()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();
        wait_until(&mut state, |s| s.profile.is_some()).await;

        // Switch identities; the first user's profile must not bleed over.
        auth_tx.send_replace(Some(user(second)));
        let resolved = wait_until(&mut state, |s| !s.loading && s.profile.is_none()).await;
        assert!(resolved.profile.is_none());

        // Sign out entirely.
        auth_tx.send_replace(None);
        let resolved = wait_until(&mut state, |s| !s.loading).await;
        assert!(resolved.profile.is_none());
    }

    #[tokio::test]
    async fn test_save_requires_identity() {
        let store = Arc::new(MemoryStore::new());
        let (_auth_tx, auth_rx) = watch::channel(None);
        let profiles = ProfileStore::spawn(store, auth_rx);

        let err = profiles.save(ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, SaveError::Unauthenticated));
    }
}
