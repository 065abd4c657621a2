//! `/v1/webhook_endpoints`: endpoints the provider posts event notifications to.

use payrail::form::ToParams;
use payrail::proto::{Deleted, List, ListParams, Metadata, Timestamp};
use payrail::ParamTree;
use payrail_http::DispatchError;
use serde::{Deserialize, Serialize};

use crate::route::{object_path, route_object};

const PATH: &str = "webhook_endpoints";

/// A configured webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// Unique identifier (`we_...`).
    pub id: String,
    /// Always `"webhook_endpoint"`.
    pub object: String,
    /// API version events are rendered with; `None` means the account default.
    #[serde(default)]
    pub api_version: Option<String>,
    /// The Connect application that created the endpoint.
    #[serde(default)]
    pub application: Option<String>,
    /// Creation time.
    pub created: Timestamp,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Event types sent to this endpoint; `*` means all.
    pub enabled_events: Vec<String>,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Signing secret, only returned on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Whether events are currently delivered.
    pub status: WebhookEndpointStatus,
    /// Destination URL.
    pub url: String,
}

/// Whether the endpoint currently receives events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEndpointStatus {
    /// Events are delivered.
    Enabled,
    /// Delivery is paused.
    Disabled,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Parameters for [`WebhookEndpoints::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateWebhookEndpoint {
    /// Destination URL.
    pub url: String,
    /// Event types to deliver; `*` for all.
    pub enabled_events: Vec<String>,
    /// Pins the API version events are rendered with.
    pub api_version: Option<String>,
    /// Receive events from connected accounts instead of this account.
    pub connect: Option<bool>,
    /// Free-form description.
    pub description: Option<String>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl CreateWebhookEndpoint {
    /// Starts a request for `url` subscribed to `enabled_events`.
    #[must_use]
    pub fn new<I, S>(url: impl Into<String>, enabled_events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            enabled_events: enabled_events.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl ToParams for CreateWebhookEndpoint {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("url", &self.url)
            .with("enabled_events", self.enabled_events.clone())
            .with("api_version", self.api_version.clone())
            .with("connect", self.connect)
            .with("description", self.description.clone())
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

/// Parameters for [`WebhookEndpoints::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateWebhookEndpoint {
    /// New destination URL.
    pub url: Option<String>,
    /// Replaces the subscribed event types.
    pub enabled_events: Option<Vec<String>>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// Pauses or resumes delivery.
    pub disabled: Option<bool>,
    /// Metadata to merge; an empty value removes a key.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdateWebhookEndpoint {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("url", self.url.clone())
            .with("enabled_events", self.enabled_events.clone())
            .with("description", self.description.clone())
            .with("disabled", self.disabled)
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

route_object!(
    /// Operations on webhook endpoints.
    WebhookEndpoints
);

impl WebhookEndpoints {
    /// `POST /v1/webhook_endpoints`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(
        &self,
        params: &CreateWebhookEndpoint,
    ) -> Result<WebhookEndpoint, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/webhook_endpoints/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<WebhookEndpoint, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }

    /// `POST /v1/webhook_endpoints/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(
        &self,
        id: &str,
        params: &UpdateWebhookEndpoint,
    ) -> Result<WebhookEndpoint, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/webhook_endpoints`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(&self, params: &ListParams) -> Result<List<WebhookEndpoint>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `DELETE /v1/webhook_endpoints/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn delete(&self, id: &str) -> Result<Deleted, DispatchError> {
        self.handler
            .delete(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::handler_for;
    use payrail::form::encode;
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoint_json() -> serde_json::Value {
        json!({
            "id": "we_123",
            "object": "webhook_endpoint",
            "api_version": null,
            "application": null,
            "created": 1_600_000_000,
            "description": null,
            "enabled_events": ["charge.failed", "charge.succeeded"],
            "livemode": false,
            "metadata": {},
            "secret": "whsec_abc",
            "status": "enabled",
            "url": "https://example.com/my/webhook/endpoint"
        })
    }

    #[test]
    fn test_create_params() {
        let mut params = CreateWebhookEndpoint::new(
            "https://example.com/hook",
            ["charge.failed", "charge.succeeded"],
        );
        params.metadata = Some(Metadata::from([("order_id".to_owned(), "6735".to_owned())]));
        assert_eq!(
            encode(&params.to_params()).unwrap(),
            "url=https%3A%2F%2Fexample.com%2Fhook\
             &enabled_events[]=charge.failed&enabled_events[]=charge.succeeded\
             &metadata[order_id]=6735"
        );
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let params = UpdateWebhookEndpoint {
            disabled: Some(true),
            description: Some(String::new()),
            ..UpdateWebhookEndpoint::default()
        };
        assert_eq!(
            encode(&params.to_params()).unwrap(),
            "description=&disabled=true"
        );
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let mut value = endpoint_json();
        value["status"] = json!("paused");
        let endpoint: WebhookEndpoint = serde_json::from_value(value).unwrap();
        assert_eq!(endpoint.status, WebhookEndpointStatus::Unknown);
    }

    #[tokio::test]
    async fn test_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/webhook_endpoints"))
            .and(body_string(
                "url=https%3A%2F%2Fexample.com%2Fmy%2Fwebhook%2Fendpoint&enabled_events[]=charge.failed",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(endpoint_json()))
            .expect(1)
            .mount(&server)
            .await;

        let routes = WebhookEndpoints::new(handler_for(&server));
        let endpoint = routes
            .create(&CreateWebhookEndpoint::new(
                "https://example.com/my/webhook/endpoint",
                ["charge.failed"],
            ))
            .await
            .unwrap();
        assert_eq!(endpoint.id, "we_123");
        assert_eq!(endpoint.secret.as_deref(), Some("whsec_abc"));
        assert_eq!(endpoint.status, WebhookEndpointStatus::Enabled);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/webhook_endpoints"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "url": "/v1/webhook_endpoints",
                "has_more": false,
                "data": [endpoint_json()]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/webhook_endpoints/we_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "we_123",
                "object": "webhook_endpoint",
                "deleted": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let routes = WebhookEndpoints::new(handler_for(&server));
        let page = routes
            .list(&ListParams {
                limit: Some(3),
                ..ListParams::default()
            })
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_more);

        let deleted = routes.delete(&page.data[0].id).await.unwrap();
        assert!(deleted.deleted);
    }
}
