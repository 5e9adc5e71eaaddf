//! Client for the subscription billing provider.
//!
//! Exposes the [`client::CustomerApi`] capability consumed by the gateway and
//! the operator CLI, a REST implementation of it, and the resolve-or-create
//! algorithm that keeps one live billing customer per tenant.

pub mod client;
pub mod config;
pub mod errors;
pub mod resolver;
pub mod types;

pub use client::{CustomerApi, RestBillingClient};
pub use errors::{BillingError, Result};
pub use resolver::resolve_customer;
pub use types::{Customer, NewCustomer, Subscription};
