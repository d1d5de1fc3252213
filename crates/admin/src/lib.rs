//! Green Basket Admin - staff console core.
//!
//! Everything staff do against the order lifecycle lives here: the
//! fail-closed administrator gate, the idempotent approval workflow, the
//! synced dashboard feeds, and the analytics projection. Rendering is
//! external; this crate is the state and workflow layer under the console.
//!
//! # Architecture
//!
//! - [`auth::AdminGate`] - verified-claim authorization, denying while
//!   verification is in flight or failing
//! - [`approval::AdminApprovalService`] - the only writer of an order's
//!   `status`; monotonic, idempotent, best-effort confirmation notice
//! - [`feeds`] - orders / customers / leads read models over the shared
//!   collection sync, plus the console's client-side search
//! - [`analytics`] - pure time-bucketed counts over the same feeds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod approval;
pub mod auth;
pub mod error;
pub mod feeds;

pub use analytics::{Period, PeriodCounts, count_by_period};
pub use approval::{AdminApprovalService, ApprovalError, ApprovalOutcome};
pub use auth::{AdminGate, AdminVerifier};
pub use error::AppError;
pub use feeds::{CustomersFeed, LeadsFeed, OrdersFeed};
