//! Green Basket Core - Shared types library.
//!
//! This crate provides common types used across all Green Basket components:
//! - `storefront` - Customer-facing cart, profile, and order submission
//! - `admin` - Staff console for approvals, dashboards, and analytics
//! - `datastore` / `notify` - The document store and notification seams
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async runtime, no
//! transport clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails, statuses, and the domain
//!   records shared by the storefront and the admin console

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
