//! The [`Client`] facade: one route object per resource over a shared handler.

use payrail::ClientConfig;
use payrail_http::{ApiHandler, HeaderMap};

use crate::billing_portal::configurations::PortalConfigurations;
use crate::error::ClientError;
use crate::plans::Plans;
use crate::radar::value_lists::ValueLists;
use crate::tax_rates::TaxRates;
use crate::terminal::locations::Locations;
use crate::tokens::Tokens;
use crate::webhook_endpoints::WebhookEndpoints;

/// Entry point to every resource.
///
/// All route objects share one [`ApiHandler`] (and its connection pool). Each
/// carries its own `headers`, so setting `Stripe-Account` on
/// `client.terminal_locations` does not affect `client.plans`.
///
/// # Example
///
/// ```rust,no_run
/// use payrail::proto::ListParams;
/// use payrail_routes::Client;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::from_env()?;
/// let page = client.plans.list(&Default::default()).await?;
/// for plan in &page.data {
///     println!("{} {:?}", plan.id, plan.amount);
/// }
/// let next = ListParams::default().next_page(&page, |p| p.id.as_str());
/// # let _ = next;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    handler: ApiHandler,
    /// `/v1/webhook_endpoints`
    pub webhook_endpoints: WebhookEndpoints,
    /// `/v1/tokens`
    pub tokens: Tokens,
    /// `/v1/plans`
    pub plans: Plans,
    /// `/v1/tax_rates`
    pub tax_rates: TaxRates,
    /// `/v1/terminal/locations`
    pub terminal_locations: Locations,
    /// `/v1/radar/value_lists`
    pub radar_value_lists: ValueLists,
    /// `/v1/billing_portal/configurations`
    pub billing_portal_configurations: PortalConfigurations,
}

impl Client {
    /// Builds a client around an existing handler.
    #[must_use]
    pub fn from_handler(handler: ApiHandler) -> Self {
        Self {
            webhook_endpoints: WebhookEndpoints::new(handler.clone()),
            tokens: Tokens::new(handler.clone()),
            plans: Plans::new(handler.clone()),
            tax_rates: TaxRates::new(handler.clone()),
            terminal_locations: Locations::new(handler.clone()),
            radar_value_lists: ValueLists::new(handler.clone()),
            billing_portal_configurations: PortalConfigurations::new(handler.clone()),
            handler,
        }
    }

    /// Builds a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the API origin or a header value
    /// is invalid.
    pub fn try_new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::from_handler(ApiHandler::try_new(config)?))
    }

    /// Builds a client from `PAYRAIL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the secret key is missing or a value
    /// does not parse, and [`ClientError::Transport`] as for [`Self::try_new`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::try_new(&ClientConfig::from_env()?)
    }

    /// Sets the same headers on every route object, e.g. `Stripe-Account`.
    #[must_use]
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        self.webhook_endpoints.headers.clone_from(headers);
        self.tokens.headers.clone_from(headers);
        self.plans.headers.clone_from(headers);
        self.tax_rates.headers.clone_from(headers);
        self.terminal_locations.headers.clone_from(headers);
        self.radar_value_lists.headers.clone_from(headers);
        self.billing_portal_configurations.headers.clone_from(headers);
        self
    }

    /// The handler shared by all route objects, for endpoints without a typed route.
    #[must_use]
    pub const fn handler(&self) -> &ApiHandler {
        &self.handler
    }
}
