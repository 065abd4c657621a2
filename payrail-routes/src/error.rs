//! Errors raised while building a [`Client`](crate::Client).

use payrail::ConfigError;
use payrail_http::TransportError;

/// Failure to construct a client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The environment did not yield a usable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configuration could not be turned into a handler.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
