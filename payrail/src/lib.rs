#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the payrail payment API client.
//!
//! This crate holds everything the request/response pipeline needs that does
//! not touch the network. The HTTP dispatcher lives in `payrail-http`, and the
//! per-resource route tables in `payrail-routes`.
//!
//! # Modules
//!
//! - [`form`] - Nested bracket form encoding of request parameters
//! - [`expandable`] - Response fields that arrive as an id or a nested object
//! - [`proto`] - Wire types shared by every resource (error envelope, lists)
//! - [`config`] - Client configuration
//! - [`error`] - Local validation errors

pub mod config;
pub mod error;
pub mod expandable;
pub mod form;
pub mod proto;

pub use config::ClientConfig;
pub use error::{ConfigError, EncodingError};
pub use expandable::{DynamicExpandable, Expandable};
pub use form::{ParamTree, ParamValue};
