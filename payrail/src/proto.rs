//! Wire types shared by every resource.
//!
//! - [`ErrorEnvelope`] / [`ApiErrorBody`] - the provider's error shape on non-2xx responses
//! - [`List`] - the paginated list envelope
//! - [`Deleted`] - the acknowledgement returned by `DELETE` endpoints
//! - [`ListParams`] - cursor pagination parameters

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::form::{ParamTree, ToParams};

/// Free-form key/value pairs attached to most objects.
pub type Metadata = HashMap<String, String>;

/// Encodes metadata under sorted keys so request bodies are reproducible.
impl ToParams for Metadata {
    fn to_params(&self) -> ParamTree {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort();
        entries
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Seconds since the Unix epoch, as the provider sends them.
pub type Timestamp = i64;

/// The body of every non-2xx response: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ApiErrorBody,
}

/// Error details reported by the provider, kept verbatim.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error classification (`card_error`, `invalid_request_error`, ...).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Short machine-readable code (`card_declined`, `resource_missing`, ...).
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// The request parameter the error relates to.
    #[serde(default)]
    pub param: Option<String>,
    /// Issuer decline code for card errors.
    #[serde(default)]
    pub decline_code: Option<String>,
    /// Link to the provider's documentation for `code`.
    #[serde(default)]
    pub doc_url: Option<String>,
}

impl ApiErrorBody {
    /// Creates an error body with only a type.
    #[must_use]
    pub fn new(error_type: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            code: None,
            message: None,
            param: None,
            decline_code: None,
            doc_url: None,
        }
    }

    /// Sets the error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Classifies [`Self::error_type`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_type(&self.error_type)
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_type)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Known values of the provider's error `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `api_error`: a problem on the provider's side.
    ApiError,
    /// `card_error`: the card could not be charged.
    CardError,
    /// `idempotency_error`: an idempotency key was reused with different parameters.
    IdempotencyError,
    /// `invalid_request_error`: the request had invalid parameters.
    InvalidRequestError,
    /// `rate_limit_error`: too many requests.
    RateLimitError,
    /// `authentication_error`: the secret key was rejected.
    AuthenticationError,
    /// Any type this client does not know about.
    Unknown,
}

impl ErrorKind {
    /// Maps a raw error type string.
    #[must_use]
    pub fn from_type(error_type: &str) -> Self {
        match error_type {
            "api_error" => Self::ApiError,
            "card_error" => Self::CardError,
            "idempotency_error" => Self::IdempotencyError,
            "invalid_request_error" => Self::InvalidRequestError,
            "rate_limit_error" => Self::RateLimitError,
            "authentication_error" => Self::AuthenticationError,
            _ => Self::Unknown,
        }
    }
}

/// A page of objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List<T> {
    /// Always `"list"`.
    #[serde(default = "list_object")]
    pub object: String,
    /// The objects on this page.
    pub data: Vec<T>,
    /// Whether more objects follow the last one in `data`.
    #[serde(default)]
    pub has_more: bool,
    /// The path this list was fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn list_object() -> String {
    "list".to_owned()
}

/// Acknowledgement returned when an object is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    /// Id of the deleted object.
    pub id: String,
    /// Type of the deleted object.
    pub object: String,
    /// Always `true` on success.
    pub deleted: bool,
}

/// Cursor pagination shared by every `list` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Page size, between 1 and 100.
    pub limit: Option<u8>,
    /// Return objects after this id.
    pub starting_after: Option<String>,
    /// Return objects before this id.
    pub ending_before: Option<String>,
    /// Fields to expand on each returned object.
    pub expand: Vec<String>,
}

impl ListParams {
    /// Continues after the last object of `page`, or returns `None` when the
    /// page was the last one.
    #[must_use]
    pub fn next_page<T, F>(&self, page: &List<T>, id: F) -> Option<Self>
    where
        F: Fn(&T) -> &str,
    {
        if !page.has_more {
            return None;
        }
        let last = page.data.last()?;
        Some(Self {
            starting_after: Some(id(last).to_owned()),
            ending_before: None,
            ..self.clone()
        })
    }
}

impl ToParams for ListParams {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("limit", self.limit)
            .with("starting_after", self.starting_after.clone())
            .with("ending_before", self.ending_before.clone());
        if !self.expand.is_empty() {
            params.push("expand", self.expand.clone());
        }
        params
    }
}
