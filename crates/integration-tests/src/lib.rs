//! Integration test support for Green Basket.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p green-basket-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `order_lifecycle` - submit, sync, approve, idempotence
//! - `admin_dashboard` - feeds, search, analytics
//!
//! [`TestContext`] wires the whole core together the way an embedding app
//! would: one in-memory document store shared by the storefront and the
//! admin console, a recording notifier standing in for the email
//! transport, and an auth-state channel standing in for the identity
//! provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use green_basket_admin::{AdminApprovalService, AdminGate, AdminVerifier};
use green_basket_core::{
    AdminClaims, AuthError, CurrentUser, CustomerId, Email, OrderId,
};
use green_basket_datastore::{DocumentStore, MemoryStore};
use green_basket_notify::{NotificationKind, Notifier, NotifyError, OrderNotice};
use green_basket_storefront::{ContactLeadService, OrderSubmissionService, ProfileStore};

/// One delivered notification, as seen by the recording transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotice {
    pub kind: NotificationKind,
    pub recipient: String,
    pub order_id: OrderId,
}

/// Test double for the notification transport: records every send and can
/// be switched into a failing state to exercise the best-effort paths.
#[derive(Default)]
pub struct RecordingNotifier {
    failing: AtomicBool,
    sent: Mutex<Vec<SentNotice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotice> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Deliveries of one kind.
    #[must_use]
    pub fn sent_of(&self, kind: NotificationKind) -> usize {
        self.sent().iter().filter(|n| n.kind == kind).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        kind: NotificationKind,
        recipient: &Email,
        notice: &OrderNotice,
    ) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Send("relay down".to_owned()));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(SentNotice {
                kind,
                recipient: recipient.to_string(),
                order_id: notice.order_id,
            });
        Ok(())
    }
}

/// Verifier that grants the admin claim to everyone.
pub struct AlwaysAdmin;

#[async_trait]
impl AdminVerifier for AlwaysAdmin {
    async fn verify(&self, user: &CurrentUser) -> Result<AdminClaims, AuthError> {
        Ok(AdminClaims {
            subject: user.id,
            email: user.email.clone(),
            role: "admin".to_owned(),
        })
    }
}

/// Verifier that denies everyone.
pub struct NeverAdmin;

#[async_trait]
impl AdminVerifier for NeverAdmin {
    async fn verify(&self, _user: &CurrentUser) -> Result<AdminClaims, AuthError> {
        Err(AuthError::NotAdmin)
    }
}

/// Shared wiring for one test: store, notifier, and identity channel.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub auth: watch::Sender<Option<CurrentUser>>,
    auth_rx: watch::Receiver<Option<CurrentUser>>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let (auth, auth_rx) = watch::channel(None);
        Self {
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            auth,
            auth_rx,
        }
    }

    /// The store as the trait object the services take.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store) as Arc<dyn DocumentStore>
    }

    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier) as Arc<dyn Notifier>
    }

    /// Sign an identity in (or out with `None`).
    pub fn set_identity(&self, user: Option<CurrentUser>) {
        self.auth.send_replace(user);
    }

    #[must_use]
    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::spawn(self.store(), self.auth_rx.clone())
    }

    #[must_use]
    pub fn submission(&self) -> OrderSubmissionService {
        OrderSubmissionService::new(self.store(), self.notifier())
    }

    #[must_use]
    pub fn leads(&self) -> ContactLeadService {
        ContactLeadService::new(self.store())
    }

    /// The approval service with the given verifier behind its gate.
    #[must_use]
    pub fn approval(&self, verifier: Arc<dyn AdminVerifier>) -> AdminApprovalService {
        AdminApprovalService::new(self.store(), self.notifier(), AdminGate::new(verifier))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A buyer identity for tests.
#[must_use]
pub fn buyer(email: &str) -> CurrentUser {
    CurrentUser {
        id: CustomerId::generate(),
        email: Email::parse(email).expect("valid test email"),
        display_name: None,
    }
}

/// A staff identity for tests.
#[must_use]
pub fn staff() -> CurrentUser {
    CurrentUser {
        id: CustomerId::generate(),
        email: Email::parse("ops@greenbasket.example").expect("valid test email"),
        display_name: Some("Ops".to_owned()),
    }
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
