//! HTTP-level constants for the provider's API.

use http::HeaderName;

/// Version segment inserted between the API origin and every route path.
pub const API_VERSION_PATH: &str = "v1";

/// Header pinning the API version for a request.
pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("stripe-version");

/// Header carrying an idempotency key on `POST` requests.
pub const IDEMPOTENCY_KEY_HEADER: HeaderName = HeaderName::from_static("idempotency-key");

/// Header selecting a connected account to act on behalf of.
pub const ACCOUNT_HEADER: HeaderName = HeaderName::from_static("stripe-account");

/// Content type of every request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
