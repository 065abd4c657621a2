//! The API handler: one HTTP exchange per call.
//!
//! [`ApiHandler`] owns the transport and the immutable default headers. Route
//! tables call [`ApiHandler::send`] (or the `get`/`post`/`delete` shorthands
//! that encode a [`ParamTree`] first) and receive the decoded model or a
//! [`DispatchError`].
//!
//! ## Behavior
//!
//! - URL = API origin + `/v1/` + route path, with the query string appended
//!   when one is given. A path that resolves outside `/v1/` on the same
//!   origin is rejected without sending.
//! - A body is sent as `application/x-www-form-urlencoded`. The handler does
//!   not encode anything itself; use [`ApiHandler::encode`].
//! - 2xx bodies decode into the requested type. Non-2xx bodies decode into
//!   the provider's error envelope, falling back to a raw transport error.
//! - Exactly one attempt per call. Retries belong to the caller, who can
//!   also plug a `reqwest-middleware` stack in via [`ApiHandler::with_http_client`].

use std::fmt;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use payrail::form::{self, ParamTree};
use payrail::proto::ErrorEnvelope;
use payrail::{ClientConfig, EncodingError};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::{API_VERSION_PATH, FORM_CONTENT_TYPE};
use crate::error::{DispatchError, TransportError};
use crate::headers;

/// Everything needed to perform one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Route path relative to the versioned API root (e.g. `webhook_endpoints/we_123`).
    pub path: String,
    /// Pre-encoded query string, without the leading `?`.
    pub query: Option<String>,
    /// Pre-encoded form body.
    pub body: Option<String>,
    /// Per-call headers, merged over the handler's defaults.
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    /// Creates a descriptor with no query, body or headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the query string.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the form body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the per-call headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Performs requests against the provider's API.
///
/// Cloning is cheap: clones share the connection pool and carry the same
/// default headers. The handler holds no mutable state, so any number of
/// calls may run concurrently.
#[derive(Clone)]
pub struct ApiHandler {
    /// Versioned API root, e.g. `https://api.stripe.com/v1/`
    base_url: Url,
    /// HTTP client, optionally wrapped in caller-supplied middleware
    client: ClientWithMiddleware,
    /// Credential, version pin and user agent
    default_headers: HeaderMap,
    /// Optional per-request timeout
    timeout: Option<Duration>,
}

impl fmt::Debug for ApiHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiHandler")
            .field("base_url", &self.base_url.as_str())
            .field("default_headers", &self.default_headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiHandler {
    /// Constructs a handler from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the API origin is not a valid URL or a
    /// header value is invalid.
    pub fn try_new(config: &ClientConfig) -> Result<Self, TransportError> {
        let root = format!(
            "{}/{API_VERSION_PATH}/",
            config.api_base.trim_end_matches('/')
        );
        let base_url = Url::parse(&root).map_err(|source| TransportError::Url {
            context: "Failed to parse API base url",
            source,
        })?;
        Ok(Self {
            base_url,
            client: reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            default_headers: headers::default_headers(config)?,
            timeout: config.timeout(),
        })
    }

    /// Constructs a handler for the default API origin.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidHeader`] if the key is not a valid header value.
    pub fn from_secret_key(secret_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::try_new(&ClientConfig::new(secret_key))
    }

    /// Replaces the HTTP client, e.g. to add caller-managed retry middleware.
    #[must_use]
    pub fn with_http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = client;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the versioned API root.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the headers sent with every request.
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Returns the configured timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Encodes request parameters for use as a query string or body.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the tree repeats a key at one level or
    /// contains an empty key.
    pub fn encode(params: &ParamTree) -> Result<String, EncodingError> {
        form::encode(params)
    }

    /// Sends one request and decodes the response into `T`.
    ///
    /// `query` and `body` must already be encoded. `headers` is merged over
    /// the defaults without being modified.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] as described in [`crate::error`].
    pub async fn send<T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let request = RequestDescriptor {
            method,
            path: path.to_owned(),
            query: query.map(str::to_owned),
            body: body.map(str::to_owned),
            headers: headers.clone(),
        };
        self.execute(request).await
    }

    /// Sends a `GET` with `params` encoded into the query string.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] as described in [`crate::error`].
    pub async fn get<T>(
        &self,
        path: &str,
        params: &ParamTree,
        headers: &HeaderMap,
    ) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let query = Self::encode(params)?;
        self.send(Method::GET, path, Some(&query), None, headers).await
    }

    /// Sends a `POST` with `params` encoded into the form body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] as described in [`crate::error`].
    pub async fn post<T>(
        &self,
        path: &str,
        params: &ParamTree,
        headers: &HeaderMap,
    ) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let body = Self::encode(params)?;
        self.send(Method::POST, path, None, Some(&body), headers).await
    }

    /// Sends a `DELETE` with `params` encoded into the query string.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] as described in [`crate::error`].
    pub async fn delete<T>(
        &self,
        path: &str,
        params: &ParamTree,
        headers: &HeaderMap,
    ) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let query = Self::encode(params)?;
        self.send(Method::DELETE, path, Some(&query), None, headers).await
    }

    /// Performs the exchange described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] as described in [`crate::error`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "payrail.api_handler.execute",
            skip_all,
            fields(
                http.method = %request.method,
                http.path = %request.path,
                http.status_code = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn execute<T>(&self, request: RequestDescriptor) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let result = self.execute_inner(request).await;
        record_result_on_span(&result);
        result
    }

    async fn execute_inner<T>(&self, request: RequestDescriptor) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(&request.path, request.query.as_deref())?;
        let mut headers = headers::merge(&self.default_headers, &request.headers);
        if request.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }

        let mut req = self.client.request(request.method, url).headers(headers);
        if let Some(body) = request.body {
            req = req.body(body);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req
            .send()
            .await
            .map_err(|source| TransportError::Http { source })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::ResponseBodyRead { status, source })?;

        record_status_on_span(status);
        decode_response(status, &bytes)
    }

    /// Resolves `path` below the versioned root. Paths that would reach
    /// another origin or climb out of the root are rejected before anything
    /// carrying the credential is sent.
    fn url_for(&self, path: &str, query: Option<&str>) -> Result<Url, TransportError> {
        let outside_root = || TransportError::RoutePath {
            path: path.to_owned(),
        };
        let relative = path.trim_start_matches(['/', '\\']);
        if relative.split(['/', '\\']).any(is_dot_segment) {
            return Err(outside_root());
        }
        let mut url = self
            .base_url
            .join(relative)
            .map_err(|source| TransportError::Url {
                context: "Failed to join route path",
                source,
            })?;
        if url.origin() != self.base_url.origin()
            || !url.path().starts_with(self.base_url.path())
        {
            return Err(outside_root());
        }
        match query {
            Some(q) if !q.is_empty() => url.set_query(Some(q)),
            _ => url.set_query(None),
        }
        Ok(url)
    }
}

/// Maps a status and raw body onto the typed result.
///
/// An empty 2xx body decodes as JSON `null`, so `()` and `Option<_>` targets
/// accept it.
fn decode_response<T>(status: StatusCode, body: &[u8]) -> Result<T, DispatchError>
where
    T: DeserializeOwned,
{
    if status.is_success() {
        let payload: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        return serde_json::from_slice(payload).map_err(|source| DispatchError::Decoding {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        });
    }

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => Err(DispatchError::Api {
            status,
            error: Box::new(envelope.error),
        }),
        Err(_) => Err(TransportError::HttpStatus {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
        .into()),
    }
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R, DispatchError>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::debug!(error = %err, "request failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span<R>(_result: &Result<R, DispatchError>) {}

/// `.` and `..`, including their percent-encoded spellings, which URL
/// resolution treats the same way.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}

#[cfg(feature = "telemetry")]
fn record_status_on_span(status: StatusCode) {
    Span::current().record("http.status_code", status.as_u16());
}

#[cfg(not(feature = "telemetry"))]
const fn record_status_on_span(_status: StatusCode) {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    fn handler_for(server: &MockServer) -> ApiHandler {
        let config = ClientConfig::new("sk_test_123")
            .with_api_base(server.uri())
            .with_api_version("2020-08-27");
        ApiHandler::try_new(&config).unwrap()
    }

    #[test]
    fn test_url_composition() {
        let handler = ApiHandler::try_new(
            &ClientConfig::new("sk_test_123").with_api_base("https://api.example.com/"),
        )
        .unwrap();
        assert_eq!(handler.base_url().as_str(), "https://api.example.com/v1/");
        assert_eq!(
            handler.url_for("/plans/gold", Some("expand[]=product")).unwrap().as_str(),
            "https://api.example.com/v1/plans/gold?expand[]=product"
        );
        assert_eq!(
            handler.url_for("terminal/locations", Some("")).unwrap().as_str(),
            "https://api.example.com/v1/terminal/locations"
        );
    }

    #[test]
    fn test_paths_cannot_leave_api_root() {
        let handler = ApiHandler::from_secret_key("sk_test_123").unwrap();
        for path in [
            "http://other-host/steal",
            "../v2/charges",
            "plans/../../v2/charges",
            "%2e%2e/v2/charges",
            "./plans",
        ] {
            assert!(
                matches!(
                    handler.url_for(path, None),
                    Err(TransportError::RoutePath { .. })
                ),
                "{path} was accepted"
            );
        }
        assert_eq!(
            handler.url_for("//other-host/steal", None).unwrap().as_str(),
            "https://api.stripe.com/v1/other-host/steal"
        );
        assert_eq!(
            handler.url_for("plans/gold%2Fsilver", None).unwrap().path(),
            "/v1/plans/gold%2Fsilver"
        );
    }

    #[tokio::test]
    async fn test_absolute_path_does_not_reach_other_host() {
        let api = MockServer::start().await;
        let other = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&other)
            .await;

        let err = handler_for(&api)
            .send::<serde_json::Value>(
                Method::GET,
                &format!("{}/steal", other.uri()),
                None,
                None,
                &HeaderMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Transport(TransportError::RoutePath { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let err = ApiHandler::try_new(&ClientConfig::new("sk").with_api_base("not a url"))
            .unwrap_err();
        assert!(matches!(err, TransportError::Url { .. }));
    }

    #[test]
    fn test_empty_success_body_decodes_as_null() {
        decode_response::<()>(StatusCode::OK, b"").unwrap();
        let none: Option<Thing> = decode_response(StatusCode::NO_CONTENT, b"  ").unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_success_decodes_typed_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/th_1"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(header("stripe-version", "2020-08-27"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "th_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let thing: Thing = handler_for(&server)
            .send(Method::GET, "things/th_1", None, None, &HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(thing.id, "th_1");
    }

    #[tokio::test]
    async fn test_body_is_form_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/webhook_endpoints"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "url=https%3A%2F%2Fx&enabled_events[]=charge.succeeded&metadata[order_id]=6735",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "we_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let params = ParamTree::new()
            .with("url", "https://x")
            .with("enabled_events", vec!["charge.succeeded"])
            .with("metadata", ParamTree::new().with("order_id", "6735"));
        let thing: Thing = handler_for(&server)
            .post("webhook_endpoints", &params, &HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(thing.id, "we_1");
    }

    #[tokio::test]
    async fn test_query_is_appended() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plans"))
            .and(query_param("limit", "3"))
            .and(query_param("expand[]", "data.product"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "list"})))
            .expect(1)
            .mount(&server)
            .await;

        let params = ParamTree::new()
            .with("limit", 3_i64)
            .with("expand", vec!["data.product"]);
        let _: Thing = handler_for(&server)
            .get("plans", &params, &HeaderMap::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_per_call_headers_override_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/things/th_1"))
            .and(header("stripe-version", "2023-10-16"))
            .and(header("idempotency-key", "key-1"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "th_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut per_call = HeaderMap::new();
        per_call.insert("stripe-version", HeaderValue::from_static("2023-10-16"));
        headers::insert_idempotency_key(&mut per_call, "key-1").unwrap();
        let handler = handler_for(&server);
        let _: Thing = handler
            .delete("things/th_1", &ParamTree::new(), &per_call)
            .await
            .unwrap();

        assert_eq!(handler.default_headers()["stripe-version"], "2020-08-27");
        assert_eq!(per_call.len(), 2);
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(402).set_body_json(
                json!({"error": {"type": "card_error", "code": "card_declined"}}),
            ))
            .mount(&server)
            .await;

        let err = handler_for(&server)
            .post::<Thing>("charges", &ParamTree::new().with("amount", 100_i64), &HeaderMap::new())
            .await
            .unwrap_err();
        let DispatchError::Api { status, error } = &err else {
            panic!("expected API error, got {err:?}");
        };
        assert_eq!(*status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(error.error_type, "card_error");
        assert_eq!(error.code.as_deref(), Some("card_declined"));
    }

    #[tokio::test]
    async fn test_malformed_error_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = handler_for(&server)
            .get::<Thing>("things", &ParamTree::new(), &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            DispatchError::Transport(TransportError::HttpStatus { status, body })
                if *status == StatusCode::INTERNAL_SERVER_ERROR && body == "<html>oops</html>"
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_schema_drift_is_decoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things/th_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
            .mount(&server)
            .await;

        let err = handler_for(&server)
            .get::<Thing>("things/th_1", &ParamTree::new(), &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            DispatchError::Decoding { status, body, .. }
                if *status == StatusCode::OK && body == r#"{"id":42}"#
        ));
    }

    #[tokio::test]
    async fn test_encoding_error_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let params = ParamTree::new().with("a", "1").with("a", "2");
        let err = handler_for(&server)
            .post::<Thing>("things", &params, &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Encoding(EncodingError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let handler = ApiHandler::try_new(
            &ClientConfig::new("sk_test_123").with_api_base("http://127.0.0.1:1"),
        )
        .unwrap();
        let err = handler
            .get::<Thing>("things", &ParamTree::new(), &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Transport(TransportError::Http { .. })));
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "slow"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = handler_for(&server)
            .with_timeout(Duration::from_millis(50))
            .get::<Thing>("things", &ParamTree::new(), &HeaderMap::new())
            .await
            .unwrap_err();
        let DispatchError::Transport(transport) = &err else {
            panic!("expected transport error, got {err:?}");
        };
        assert!(transport.is_timeout());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let server = MockServer::start().await;
        for i in 0..8 {
            Mock::given(method("POST"))
                .and(path("/v1/things"))
                .and(header("idempotency-key", format!("key-{i}").as_str()))
                .and(body_string(format!("n={i}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"id": format!("th_{i}")})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let handler = handler_for(&server);
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8_i64 {
            let handler = handler.clone();
            tasks.spawn(async move {
                let mut headers = HeaderMap::new();
                headers::insert_idempotency_key(&mut headers, &format!("key-{i}")).unwrap();
                let params = ParamTree::new().with("n", i);
                let thing: Thing = handler.post("things", &params, &headers).await.unwrap();
                (i, thing)
            });
        }

        let mut seen = 0;
        while let Some(joined) = tasks.join_next().await {
            let (i, thing) = joined.unwrap();
            assert_eq!(thing.id, format!("th_{i}"));
            seen += 1;
        }
        assert_eq!(seen, 8);
    }

    struct CountingMiddleware(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl reqwest_middleware::Middleware for CountingMiddleware {
        async fn handle(
            &self,
            req: reqwest::Request,
            extensions: &mut http::Extensions,
            next: reqwest_middleware::Next<'_>,
        ) -> reqwest_middleware::Result<reqwest::Response> {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(req, extensions).await
        }
    }

    #[tokio::test]
    async fn test_single_attempt_through_middleware() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&server)
            .await;

        let attempts = Arc::new(AtomicUsize::new(0));
        let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
            .with(CountingMiddleware(Arc::clone(&attempts)))
            .build();
        let err = handler_for(&server)
            .with_http_client(client)
            .get::<Thing>("things", &ParamTree::new(), &HeaderMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
