//! `/v1/billing_portal/configurations`: what customers may do in the hosted portal.
//!
//! Feature lists in responses are read tolerantly: an entry this client does
//! not recognize is dropped instead of failing the whole configuration.

use payrail::form::ToParams;
use payrail::proto::{List, ListParams, Metadata, Timestamp};
use payrail::{ParamTree, ParamValue};
use payrail_http::DispatchError;
use serde::{Deserialize, Serialize};
use serde_with::{VecSkipError, serde_as};

use crate::route::{nested, object_path, route_object};

const PATH: &str = "billing_portal/configurations";

/// A portal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfiguration {
    /// Unique identifier (`bpc_...`).
    pub id: String,
    /// Always `"billing_portal.configuration"`.
    pub object: String,
    /// Whether the configuration can be used for new sessions.
    pub active: bool,
    /// Business information shown in the portal.
    pub business_profile: BusinessProfile,
    /// Creation time.
    pub created: Timestamp,
    /// Where customers go after leaving the portal.
    #[serde(default)]
    pub default_return_url: Option<String>,
    /// Enabled portal features.
    pub features: Features,
    /// Whether this is the account's default configuration.
    pub is_default: bool,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Last update time.
    pub updated: Timestamp,
}

/// Business information shown in the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Headline shown above the portal.
    #[serde(default)]
    pub headline: Option<String>,
    /// Link to the privacy policy.
    #[serde(default)]
    pub privacy_policy_url: Option<String>,
    /// Link to the terms of service.
    #[serde(default)]
    pub terms_of_service_url: Option<String>,
}

impl ToParams for BusinessProfile {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("headline", self.headline.clone())
            .with("privacy_policy_url", self.privacy_policy_url.clone())
            .with("terms_of_service_url", self.terms_of_service_url.clone())
    }
}

/// Portal features as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Updating customer details.
    pub customer_update: CustomerUpdate,
    /// Viewing past invoices.
    pub invoice_history: Toggle,
    /// Updating payment methods.
    pub payment_method_update: Toggle,
    /// Cancelling subscriptions.
    pub subscription_cancel: SubscriptionCancel,
    /// Switching plans.
    pub subscription_update: SubscriptionUpdate,
}

/// A feature with no settings beyond on/off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    /// Whether the feature is enabled.
    pub enabled: bool,
}

/// Which customer fields can be edited.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    /// Editable fields.
    #[serde_as(as = "VecSkipError<_>")]
    #[serde(default)]
    pub allowed_updates: Vec<CustomerField>,
    /// Whether the feature is enabled.
    pub enabled: bool,
}

/// A customer field the portal can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    /// Billing address.
    Address,
    /// Email address.
    Email,
    /// Name.
    Name,
    /// Phone number.
    Phone,
    /// Shipping address.
    Shipping,
    /// Tax ids.
    TaxId,
}

impl CustomerField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Email => "email",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Shipping => "shipping",
            Self::TaxId => "tax_id",
        }
    }
}

/// Cancellation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCancel {
    /// Whether the feature is enabled.
    pub enabled: bool,
    /// `immediately` or `at_period_end`.
    #[serde(default)]
    pub mode: Option<String>,
    /// `none`, `create_prorations` or `always_invoice`.
    #[serde(default)]
    pub proration_behavior: Option<String>,
}

impl ToParams for SubscriptionCancel {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("enabled", self.enabled)
            .with("mode", self.mode.clone())
            .with("proration_behavior", self.proration_behavior.clone())
    }
}

/// Plan switching settings.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    /// Whether the feature is enabled.
    pub enabled: bool,
    /// What may change: `price`, `quantity`, `promotion_code`.
    #[serde_as(as = "VecSkipError<_>")]
    #[serde(default)]
    pub default_allowed_updates: Vec<String>,
    /// `none`, `create_prorations` or `always_invoice`.
    #[serde(default)]
    pub proration_behavior: Option<String>,
    /// Products and prices customers can switch between.
    #[serde_as(as = "VecSkipError<_>")]
    #[serde(default)]
    pub products: Vec<ProductPrices>,
}

/// A product and the prices selectable for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrices {
    /// Product id.
    pub product: String,
    /// Price ids.
    pub prices: Vec<String>,
}

impl ToParams for ProductPrices {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("product", &self.product)
            .with("prices", self.prices.clone())
    }
}

impl ToParams for SubscriptionUpdate {
    fn to_params(&self) -> ParamTree {
        let products: Vec<ParamValue> = self
            .products
            .iter()
            .map(|p| p.to_params().into())
            .collect();
        ParamTree::new()
            .with("enabled", self.enabled)
            .with("default_allowed_updates", self.default_allowed_updates.clone())
            .with("proration_behavior", self.proration_behavior.clone())
            .with("products", products)
    }
}

/// Feature settings sent on create and update. `None` leaves a feature unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureParams {
    /// Customer detail editing.
    pub customer_update: Option<CustomerUpdate>,
    /// Invoice history.
    pub invoice_history: Option<bool>,
    /// Payment method updates.
    pub payment_method_update: Option<bool>,
    /// Cancellation.
    pub subscription_cancel: Option<SubscriptionCancel>,
    /// Plan switching.
    pub subscription_update: Option<SubscriptionUpdate>,
}

impl ToParams for FeatureParams {
    fn to_params(&self) -> ParamTree {
        let toggle = |enabled: Option<bool>| enabled.map(|e| ParamTree::new().with("enabled", e));
        let customer_update = self.customer_update.as_ref().map(|c| {
            let fields: Vec<&str> = c.allowed_updates.iter().map(|f| f.as_str()).collect();
            ParamTree::new()
                .with("allowed_updates", fields)
                .with("enabled", c.enabled)
        });
        ParamTree::new()
            .with("customer_update", customer_update)
            .with("invoice_history", toggle(self.invoice_history))
            .with("payment_method_update", toggle(self.payment_method_update))
            .with("subscription_cancel", nested(self.subscription_cancel.as_ref()))
            .with("subscription_update", nested(self.subscription_update.as_ref()))
    }
}

/// Parameters for [`PortalConfigurations::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePortalConfiguration {
    /// Business information shown in the portal.
    pub business_profile: BusinessProfile,
    /// Features to enable.
    pub features: FeatureParams,
    /// Where customers go after leaving the portal.
    pub default_return_url: Option<String>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl ToParams for CreatePortalConfiguration {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("business_profile", self.business_profile.to_params())
            .with("features", self.features.to_params())
            .with("default_return_url", self.default_return_url.clone())
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

/// Parameters for [`PortalConfigurations::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePortalConfiguration {
    /// Activates or deactivates the configuration.
    pub active: Option<bool>,
    /// Replaces business information.
    pub business_profile: Option<BusinessProfile>,
    /// Feature changes.
    pub features: Option<FeatureParams>,
    /// Where customers go after leaving the portal; an empty string clears it.
    pub default_return_url: Option<String>,
    /// Metadata to merge.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdatePortalConfiguration {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("active", self.active)
            .with("business_profile", nested(self.business_profile.as_ref()))
            .with("features", nested(self.features.as_ref()))
            .with("default_return_url", self.default_return_url.clone())
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

/// Parameters for [`PortalConfigurations::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPortalConfigurations {
    /// Only active or only inactive configurations.
    pub active: Option<bool>,
    /// Only the default configuration, or only the others.
    pub is_default: Option<bool>,
    /// Cursor and expansion.
    pub page: ListParams,
}

impl ToParams for ListPortalConfigurations {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("active", self.active)
            .with("is_default", self.is_default);
        params.merge(self.page.to_params());
        params
    }
}

route_object!(
    /// Operations on billing portal configurations.
    PortalConfigurations
);

impl PortalConfigurations {
    /// `POST /v1/billing_portal/configurations`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(
        &self,
        params: &CreatePortalConfiguration,
    ) -> Result<PortalConfiguration, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/billing_portal/configurations/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<PortalConfiguration, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }

    /// `POST /v1/billing_portal/configurations/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(
        &self,
        id: &str,
        params: &UpdatePortalConfiguration,
    ) -> Result<PortalConfiguration, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/billing_portal/configurations`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(
        &self,
        params: &ListPortalConfigurations,
    ) -> Result<List<PortalConfiguration>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }
}
