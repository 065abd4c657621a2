//! `/v1/tax_rates`: tax percentages applied to invoices and subscriptions.
//!
//! Tax rates are never deleted; archive one with `active=false`.

use payrail::form::ToParams;
use payrail::proto::{List, ListParams, Metadata, Timestamp};
use payrail::ParamTree;
use payrail_http::DispatchError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::route::{object_path, route_object};

const PATH: &str = "tax_rates";

/// A tax rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    /// Unique identifier (`txr_...`).
    pub id: String,
    /// Always `"tax_rate"`.
    pub object: String,
    /// Whether the rate can be applied to new objects.
    pub active: bool,
    /// Two-letter country.
    #[serde(default)]
    pub country: Option<String>,
    /// Creation time.
    pub created: Timestamp,
    /// Internal description.
    #[serde(default)]
    pub description: Option<String>,
    /// Name shown on invoices (`VAT`, `Sales Tax`, ...).
    pub display_name: String,
    /// Whether the rate is included in prices.
    pub inclusive: bool,
    /// Jurisdiction shown on invoices.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Rate in percent, e.g. `8.25`.
    pub percentage: Decimal,
    /// ISO 3166-2 subdivision code without the country prefix.
    #[serde(default)]
    pub state: Option<String>,
    /// `vat`, `sales_tax`, `gst`, ...
    #[serde(default)]
    pub tax_type: Option<String>,
}

/// Parameters for [`TaxRates::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaxRate {
    /// Name shown on invoices.
    pub display_name: String,
    /// Whether the rate is included in prices.
    pub inclusive: bool,
    /// Rate in percent.
    pub percentage: Decimal,
    /// Whether the rate can be applied to new objects.
    pub active: Option<bool>,
    /// Two-letter country.
    pub country: Option<String>,
    /// Internal description.
    pub description: Option<String>,
    /// Jurisdiction shown on invoices.
    pub jurisdiction: Option<String>,
    /// Subdivision code.
    pub state: Option<String>,
    /// High-level tax type.
    pub tax_type: Option<String>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl ToParams for CreateTaxRate {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("display_name", &self.display_name)
            .with("inclusive", self.inclusive)
            .with("percentage", self.percentage)
            .with("active", self.active)
            .with("country", self.country.clone())
            .with("description", self.description.clone())
            .with("jurisdiction", self.jurisdiction.clone())
            .with("state", self.state.clone())
            .with("tax_type", self.tax_type.clone())
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

/// Parameters for [`TaxRates::update`]. The percentage is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaxRate {
    /// Archives or restores the rate.
    pub active: Option<bool>,
    /// Two-letter country.
    pub country: Option<String>,
    /// Internal description.
    pub description: Option<String>,
    /// Name shown on invoices.
    pub display_name: Option<String>,
    /// Jurisdiction shown on invoices.
    pub jurisdiction: Option<String>,
    /// Subdivision code.
    pub state: Option<String>,
    /// High-level tax type.
    pub tax_type: Option<String>,
    /// Metadata to merge.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdateTaxRate {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("active", self.active)
            .with("country", self.country.clone())
            .with("description", self.description.clone())
            .with("display_name", self.display_name.clone())
            .with("jurisdiction", self.jurisdiction.clone())
            .with("state", self.state.clone())
            .with("tax_type", self.tax_type.clone())
            .with("metadata", self.metadata.as_ref().map(ToParams::to_params))
    }
}

/// Parameters for [`TaxRates::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTaxRates {
    /// Only active or only archived rates.
    pub active: Option<bool>,
    /// Only inclusive or only exclusive rates.
    pub inclusive: Option<bool>,
    /// Cursor and expansion.
    pub page: ListParams,
}

impl ToParams for ListTaxRates {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("active", self.active)
            .with("inclusive", self.inclusive);
        params.merge(self.page.to_params());
        params
    }
}

route_object!(
    /// Operations on tax rates.
    TaxRates
);

impl TaxRates {
    /// `POST /v1/tax_rates`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(&self, params: &CreateTaxRate) -> Result<TaxRate, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/tax_rates/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<TaxRate, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }

    /// `POST /v1/tax_rates/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(&self, id: &str, params: &UpdateTaxRate) -> Result<TaxRate, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/tax_rates`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(&self, params: &ListTaxRates) -> Result<List<TaxRate>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }
}
