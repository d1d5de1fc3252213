//! Green Basket Storefront - customer-side order core.
//!
//! The storefront owns the session-local cart, mirrors the signed-in
//! customer's profile, and runs the order submission workflow. Rendering,
//! navigation, and authentication UI are external; this crate is the state
//! and workflow layer they sit on.
//!
//! # Architecture
//!
//! - [`cart::CartStore`] - pure in-memory cart state machine with a
//!   snapshot subscription for observers
//! - [`catalog`] - read-only catalog rows and their conversion into cart
//!   lines
//! - [`profile::ProfileStore`] - identity-driven mirror of the remote
//!   profile document
//! - [`orders::OrderSubmissionService`] - validate, snapshot, persist,
//!   then best-effort notify
//! - [`orders::OrderHistory`] - the customer's own synced order list
//! - [`contact::ContactLeadService`] - write-once business leads
//!
//! This crate only ever touches the remote store through the
//! `green-basket-datastore` interface and the notification transport
//! through `green-basket-notify`; customer code never writes an order's
//! `status` field.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod error;
pub mod orders;
pub mod profile;

pub use cart::CartStore;
pub use catalog::CatalogRow;
pub use contact::{ContactError, ContactForm, ContactLeadService};
pub use error::AppError;
pub use orders::{OrderHistory, OrderSubmissionService, SubmitError, SubmitOutcome};
pub use profile::{ProfileState, ProfileStore, SaveError};
