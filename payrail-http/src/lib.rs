#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP dispatcher for the payrail payment API client.
//!
//! [`ApiHandler`] is the single component that talks to the network. Route
//! tables hand it a method, a path and pre-encoded parameters; it composes the
//! URL, merges headers, performs exactly one HTTP exchange and decodes the
//! JSON response into the caller's type or a [`DispatchError`].
//!
//! # Modules
//!
//! - [`constants`] - API path segment, header names, content type
//! - [`error`] - [`DispatchError`] and [`TransportError`]
//! - [`headers`] - Default header construction and per-call merging
//! - [`handler`] - [`ApiHandler`] and [`RequestDescriptor`]
//!
//! # Feature Flags
//!
//! - `telemetry` - Records a tracing span per request

pub mod constants;
pub mod error;
pub mod handler;
pub mod headers;

pub use error::{DispatchError, TransportError};
pub use handler::{ApiHandler, RequestDescriptor};
pub use http::{HeaderMap, Method, StatusCode};
