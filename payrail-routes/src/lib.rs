#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Typed resource routes for the payrail payment API client.
//!
//! Each resource module declares its models, its request parameter structs
//! and a route object whose methods map one-to-one onto endpoints. Route
//! objects hold a clone of a shared [`payrail_http::ApiHandler`] plus their own
//! `headers`; [`Client`] bundles one of each.
//!
//! # Resources
//!
//! - [`webhook_endpoints`] - Event notification endpoints
//! - [`tokens`] - Single-use card, bank account, PII and account tokens
//! - [`plans`] - Recurring prices, with an expandable `product`
//! - [`tax_rates`] - Tax percentages
//! - [`terminal::locations`] - Places readers are registered to
//! - [`radar::value_lists`] - Lists referenced by fraud rules
//! - [`billing_portal::configurations`] - Customer portal settings
//!
//! # Feature Flags
//!
//! - `telemetry` - Records a tracing span per request

pub mod billing_portal;
mod client;
pub mod error;
pub mod plans;
pub mod radar;
mod route;
pub mod tax_rates;
pub mod terminal;
pub mod tokens;
pub mod webhook_endpoints;

#[cfg(test)]
mod test_support;

pub use client::Client;
pub use error::ClientError;
