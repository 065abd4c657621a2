//! Error taxonomy of the dispatcher.
//!
//! Every failure of a call ends up in one [`DispatchError`] variant:
//!
//! - [`DispatchError::Encoding`] - parameters could not be encoded; nothing was sent
//! - [`DispatchError::Transport`] - the exchange failed, or a non-2xx body was not an error envelope
//! - [`DispatchError::Api`] - the provider answered with its structured error envelope
//! - [`DispatchError::Decoding`] - a 2xx body did not match the expected type

use http::StatusCode;
use http::header::{HeaderName, InvalidHeaderValue};
use payrail::EncodingError;
use payrail::proto::{ApiErrorBody, ErrorKind};

/// Errors returned by [`ApiHandler`](crate::ApiHandler) calls.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The parameter tree could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The HTTP exchange failed or returned an unparseable error body.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider returned a structured error.
    #[error("API error (HTTP {status}): {error}")]
    Api {
        /// The HTTP status code.
        status: StatusCode,
        /// The decoded error envelope contents.
        error: Box<ApiErrorBody>,
    },

    /// A successful response did not decode into the expected type.
    #[error("failed to decode HTTP {status} response: {source}")]
    Decoding {
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::Decoding { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Encoding(_) => None,
        }
    }

    /// Returns the provider's error details for [`DispatchError::Api`].
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Api { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Whether repeating the same request could succeed.
    ///
    /// True for connection failures, timeouts, `429` and `5xx` responses.
    /// Callers repeating a `POST` should send the same idempotency key.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Http { .. }) => true,
            Self::Transport(TransportError::HttpStatus { status, .. }) => {
                is_retryable_status(*status)
            }
            Self::Api { status, error } => {
                is_retryable_status(*status) || error.kind() == ErrorKind::RateLimitError
            }
            _ => false,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Failures below the level of the provider's error envelope.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// URL construction failed.
    #[error("URL parse error: {context}: {source}")]
    Url {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A route path does not address a resource below the versioned API
    /// root, e.g. an absolute URL, a `..` segment or an empty object id.
    #[error("route path `{path}` does not address a resource below the API root")]
    RoutePath {
        /// The path as given.
        path: String,
    },

    /// A header value contains characters HTTP does not allow.
    #[error("invalid value for header {name}: {source}")]
    InvalidHeader {
        /// The header name.
        name: HeaderName,
        /// The underlying header error.
        #[source]
        source: InvalidHeaderValue,
    },

    /// The request could not be sent (connection, TLS, timeout, middleware).
    #[error("HTTP error: {source}")]
    Http {
        /// The underlying client error.
        #[source]
        source: reqwest_middleware::Error,
    },

    /// The response body could not be read.
    #[error("failed to read HTTP {status} response body: {source}")]
    ResponseBodyRead {
        /// The HTTP status code.
        status: StatusCode,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// A non-2xx response whose body is not the provider's error envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },
}

impl TransportError {
    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ResponseBodyRead { status, .. } | Self::HttpStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http {
                source: reqwest_middleware::Error::Reqwest(err),
            } => err.is_timeout(),
            Self::ResponseBodyRead { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let rate_limited = DispatchError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            error: Box::new(ApiErrorBody::new("rate_limit_error")),
        };
        assert!(rate_limited.is_retryable());

        let declined = DispatchError::Api {
            status: StatusCode::PAYMENT_REQUIRED,
            error: Box::new(ApiErrorBody::new("card_error").with_code("card_declined")),
        };
        assert!(!declined.is_retryable());
        assert_eq!(declined.status(), Some(StatusCode::PAYMENT_REQUIRED));
        assert_eq!(
            declined.api_error().and_then(|e| e.code.as_deref()),
            Some("card_declined")
        );

        let bad_gateway = DispatchError::from(TransportError::HttpStatus {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>".into(),
        });
        assert!(bad_gateway.is_retryable());
        assert!(bad_gateway.api_error().is_none());

        let encoding = DispatchError::from(EncodingError::DuplicateKey { path: "a".into() });
        assert!(!encoding.is_retryable());
        assert!(encoding.status().is_none());
    }

    #[test]
    fn test_api_error_display() {
        let err = DispatchError::Api {
            status: StatusCode::PAYMENT_REQUIRED,
            error: Box::new(
                ApiErrorBody::new("card_error")
                    .with_code("card_declined")
                    .with_message("Your card was declined."),
            ),
        };
        assert_eq!(
            err.to_string(),
            "API error (HTTP 402 Payment Required): card_error (card_declined): Your card was declined."
        );
    }
}
