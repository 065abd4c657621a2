//! Request header construction.
//!
//! The default set (credential, version pin, user agent) is built once from a
//! [`ClientConfig`] and never mutated. Each call merges its own headers on
//! top, per-call values replacing defaults with the same name.

use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue, USER_AGENT};
use payrail::ClientConfig;

use crate::constants::{ACCOUNT_HEADER, API_VERSION_HEADER, IDEMPOTENCY_KEY_HEADER};
use crate::error::TransportError;

/// Builds the headers sent with every request of a client.
///
/// # Errors
///
/// Returns [`TransportError::InvalidHeader`] if the key, version or user agent
/// contains characters not allowed in a header value.
pub fn default_headers(config: &ClientConfig) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    let mut auth = header_value(AUTHORIZATION, &format!("Bearer {}", config.secret_key))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(USER_AGENT, header_value(USER_AGENT, &config.user_agent)?);
    if let Some(version) = &config.api_version {
        headers.insert(API_VERSION_HEADER, header_value(API_VERSION_HEADER, version)?);
    }

    Ok(headers)
}

/// Returns `defaults` overlaid with `overrides`.
///
/// A name present in `overrides` drops every default value for that name.
/// Neither input is modified.
#[must_use]
pub fn merge(defaults: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for name in overrides.keys() {
        merged.remove(name);
    }
    for (name, value) in overrides {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Sets the `Idempotency-Key` header.
///
/// # Errors
///
/// Returns [`TransportError::InvalidHeader`] if `key` is not a valid header value.
pub fn insert_idempotency_key(headers: &mut HeaderMap, key: &str) -> Result<(), TransportError> {
    headers.insert(IDEMPOTENCY_KEY_HEADER, header_value(IDEMPOTENCY_KEY_HEADER, key)?);
    Ok(())
}

/// Sets the `Stripe-Account` header to act on behalf of a connected account.
///
/// # Errors
///
/// Returns [`TransportError::InvalidHeader`] if `account` is not a valid header value.
pub fn insert_account(headers: &mut HeaderMap, account: &str) -> Result<(), TransportError> {
    headers.insert(ACCOUNT_HEADER, header_value(ACCOUNT_HEADER, account)?);
    Ok(())
}

fn header_value(name: HeaderName, value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|source| TransportError::InvalidHeader { name, source })
}
