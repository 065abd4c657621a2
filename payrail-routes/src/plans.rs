//! `/v1/plans`: recurring prices attached to a product.
//!
//! A plan's `product` comes back as an id unless the call asks for
//! `expand[]=product`, in which case the full [`Product`] is embedded. Both
//! shapes land in [`Expandable<Product>`].

use payrail::Expandable;
use payrail::form::ToParams;
use payrail::proto::{Deleted, List, ListParams, Metadata, Timestamp};
use payrail::ParamTree;
use payrail_http::DispatchError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::route::{expand_params, object_path, route_object};

const PATH: &str = "plans";

/// A recurring price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier, caller-chosen or `plan_...`.
    pub id: String,
    /// Always `"plan"`.
    pub object: String,
    /// Whether new subscriptions can use the plan.
    pub active: bool,
    /// Amount in the smallest currency unit.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Amount with sub-unit precision.
    #[serde(default)]
    pub amount_decimal: Option<Decimal>,
    /// `per_unit` or `tiered`.
    #[serde(default)]
    pub billing_scheme: Option<String>,
    /// Creation time.
    pub created: Timestamp,
    /// Three-letter currency.
    pub currency: String,
    /// Billing frequency unit.
    pub interval: PlanInterval,
    /// Number of intervals between bills.
    pub interval_count: u32,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Display name.
    #[serde(default)]
    pub nickname: Option<String>,
    /// The product this plan prices.
    #[serde(default, skip_serializing_if = "Expandable::is_empty")]
    pub product: Expandable<Product>,
    /// Free trial length for new subscriptions.
    #[serde(default)]
    pub trial_period_days: Option<u32>,
    /// `licensed` or `metered`.
    #[serde(default)]
    pub usage_type: Option<String>,
}

/// Billing frequency of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanInterval {
    /// Daily.
    Day,
    /// Weekly.
    Week,
    /// Monthly.
    Month,
    /// Yearly.
    Year,
}

impl PlanInterval {
    /// Wire name of the interval.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// A product, as embedded in an expanded plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (`prod_...`).
    pub id: String,
    /// Always `"product"`.
    pub object: String,
    /// Whether the product is available for purchase.
    pub active: bool,
    /// Customer-facing name.
    pub name: String,
    /// Customer-facing description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created: Option<Timestamp>,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Unit label shown on invoices.
    #[serde(default)]
    pub unit_label: Option<String>,
}

/// The product a new plan belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanProduct {
    /// An existing product, sent as `product=<id>`.
    Id(String),
    /// A product created along with the plan, sent under `product[...]`.
    Inline {
        /// Customer-facing name.
        name: String,
        /// Whether the product is available for purchase.
        active: Option<bool>,
        /// Statement descriptor for charges.
        statement_descriptor: Option<String>,
        /// Unit label shown on invoices.
        unit_label: Option<String>,
        /// Caller-defined key/value pairs.
        metadata: Option<Metadata>,
    },
}

impl PlanProduct {
    /// An inline product with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            active: None,
            statement_descriptor: None,
            unit_label: None,
            metadata: None,
        }
    }
}

/// Parameters for [`Plans::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlan {
    /// Three-letter currency.
    pub currency: String,
    /// Billing frequency unit.
    pub interval: PlanInterval,
    /// The product being priced.
    pub product: PlanProduct,
    /// Amount in the smallest currency unit.
    pub amount: Option<i64>,
    /// Amount with sub-unit precision; excludes `amount`.
    pub amount_decimal: Option<Decimal>,
    /// Caller-chosen id.
    pub id: Option<String>,
    /// Whether new subscriptions can use the plan.
    pub active: Option<bool>,
    /// Number of intervals between bills.
    pub interval_count: Option<u32>,
    /// Display name.
    pub nickname: Option<String>,
    /// Free trial length.
    pub trial_period_days: Option<u32>,
    /// `licensed` or `metered`.
    pub usage_type: Option<String>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl CreatePlan {
    /// Starts a plan request with the three required fields.
    #[must_use]
    pub fn new(currency: impl Into<String>, interval: PlanInterval, product: PlanProduct) -> Self {
        Self {
            currency: currency.into(),
            interval,
            product,
            amount: None,
            amount_decimal: None,
            id: None,
            active: None,
            interval_count: None,
            nickname: None,
            trial_period_days: None,
            usage_type: None,
            metadata: None,
        }
    }
}

impl ToParams for CreatePlan {
    fn to_params(&self) -> ParamTree {
        let product: payrail::ParamValue = match &self.product {
            PlanProduct::Id(id) => id.into(),
            PlanProduct::Inline {
                name,
                active,
                statement_descriptor,
                unit_label,
                metadata,
            } => ParamTree::new()
                .with("name", name)
                .with("active", *active)
                .with("statement_descriptor", statement_descriptor.clone())
                .with("unit_label", unit_label.clone())
                .with("metadata", metadata.as_ref().map(ToParams::to_params))
                .into(),
        };
        ParamTree::new()
            .with("currency", &self.currency)
            .with("interval", self.interval.as_str())
            .with("product", product)
            .with("amount", self.amount)
            .with("amount_decimal", self.amount_decimal)
            .with("id", self.id.clone())
            .with("active", self.active)
            .with("interval_count", self.interval_count)
            .with("nickname", self.nickname.clone())
            .with("trial_period_days", self.trial_period_days)
            .with("usage_type", self.usage_type.clone())
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

/// Parameters for [`Plans::update`]. Pricing fields cannot change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Whether new subscriptions can use the plan.
    pub active: Option<bool>,
    /// Display name.
    pub nickname: Option<String>,
    /// Moves the plan to another product.
    pub product: Option<String>,
    /// Free trial length.
    pub trial_period_days: Option<u32>,
    /// Metadata to merge.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdatePlan {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("active", self.active)
            .with("nickname", self.nickname.clone())
            .with("product", self.product.clone())
            .with("trial_period_days", self.trial_period_days)
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

/// Parameters for [`Plans::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPlans {
    /// Only active or only inactive plans.
    pub active: Option<bool>,
    /// Only plans of this product.
    pub product: Option<String>,
    /// Cursor and expansion.
    pub page: ListParams,
}

impl ToParams for ListPlans {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("active", self.active)
            .with("product", self.product.clone());
        params.merge(self.page.to_params());
        params
    }
}

route_object!(
    /// Operations on plans.
    Plans
);

impl Plans {
    /// `POST /v1/plans`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(&self, params: &CreatePlan) -> Result<Plan, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/plans/{id}`, expanding the given fields (e.g. `product`).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str, expand: &[&str]) -> Result<Plan, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &expand_params(expand), &self.headers)
            .await
    }

    /// `POST /v1/plans/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(&self, id: &str, params: &UpdatePlan) -> Result<Plan, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/plans`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(&self, params: &ListPlans) -> Result<List<Plan>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `DELETE /v1/plans/{id}`
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
