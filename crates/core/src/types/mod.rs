//! Core types for Green Basket.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the domain records shared between the storefront and the admin console.

pub mod auth;
pub mod cart;
pub mod customer;
pub mod email;
pub mod id;
pub mod lead;
pub mod order;
pub mod price;
pub mod status;

pub use auth::{AdminClaims, AuthError, CurrentUser};
pub use cart::{CartItem, DEFAULT_MIN_ORDER, MAX_LINE_QUANTITY, cart_total};
pub use customer::{Profile, ProfileUpdate};
pub use email::{Email, EmailError};
pub use id::*;
pub use lead::ContactLead;
pub use order::Order;
pub use price::Rupees;
pub use status::OrderStatus;
