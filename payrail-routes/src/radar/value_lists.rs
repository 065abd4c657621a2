//! `/v1/radar/value_lists`: lists referenced from fraud rules.

use payrail::form::ToParams;
use payrail::proto::{Deleted, List, ListParams, Metadata, Timestamp};
use payrail::ParamTree;
use payrail_http::DispatchError;
use serde::{Deserialize, Serialize};

use crate::route::{nested, object_path, route_object};

const PATH: &str = "radar/value_lists";

/// A value list, with its first page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueList {
    /// Unique identifier (`rsl_...`).
    pub id: String,
    /// Always `"radar.value_list"`.
    pub object: String,
    /// Name used in rules, e.g. `@blocked_emails`.
    pub alias: String,
    /// Creation time.
    pub created: Timestamp,
    /// Who created the list.
    pub created_by: String,
    /// Type of the items.
    pub item_type: ValueListItemType,
    /// First page of items.
    pub list_items: List<ValueListItem>,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
    /// Human-readable name.
    pub name: String,
}

/// One entry of a value list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueListItem {
    /// Unique identifier (`rsli_...`).
    pub id: String,
    /// Always `"radar.value_list_item"`.
    pub object: String,
    /// Creation time.
    pub created: Timestamp,
    /// Who added the item.
    pub created_by: String,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// The listed value.
    pub value: String,
    /// Id of the owning list.
    pub value_list: String,
}

/// What kind of values a list holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueListItemType {
    /// Card BINs.
    CardBin,
    /// Card fingerprints.
    CardFingerprint,
    /// Two-letter countries.
    Country,
    /// Email addresses.
    Email,
    /// IP addresses.
    IpAddress,
    /// Free-form strings (the provider's default).
    #[default]
    String,
    /// Case-sensitive strings.
    CaseSensitiveString,
    /// Customer ids.
    CustomerId,
    /// A type this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ValueListItemType {
    /// Wire name of the type, `None` for [`Self::Unknown`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::CardBin => Some("card_bin"),
            Self::CardFingerprint => Some("card_fingerprint"),
            Self::Country => Some("country"),
            Self::Email => Some("email"),
            Self::IpAddress => Some("ip_address"),
            Self::String => Some("string"),
            Self::CaseSensitiveString => Some("case_sensitive_string"),
            Self::CustomerId => Some("customer_id"),
            Self::Unknown => None,
        }
    }
}

/// Parameters for [`ValueLists::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateValueList {
    /// Name used in rules.
    pub alias: String,
    /// Human-readable name.
    pub name: String,
    /// Type of the items; defaults to `string` on the provider side.
    pub item_type: Option<ValueListItemType>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl ToParams for CreateValueList {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("alias", &self.alias)
            .with("name", &self.name)
            .with("item_type", self.item_type.and_then(ValueListItemType::as_str))
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

/// Parameters for [`ValueLists::update`]. The item type is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateValueList {
    /// Name used in rules.
    pub alias: Option<String>,
    /// Human-readable name.
    pub name: Option<String>,
    /// Metadata to merge.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdateValueList {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("alias", self.alias.clone())
            .with("name", self.name.clone())
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

/// Parameters for [`ValueLists::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListValueLists {
    /// Only the list with this alias.
    pub alias: Option<String>,
    /// Only lists containing this value.
    pub contains: Option<String>,
    /// Cursor and expansion.
    pub page: ListParams,
}

impl ToParams for ListValueLists {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("alias", self.alias.clone())
            .with("contains", self.contains.clone());
        params.merge(self.page.to_params());
        params
    }
}

route_object!(
    /// Operations on Radar value lists.
    ValueLists
);

impl ValueLists {
    /// `POST /v1/radar/value_lists`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(&self, params: &CreateValueList) -> Result<ValueList, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/radar/value_lists/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<ValueList, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }

    /// `POST /v1/radar/value_lists/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(
        &self,
        id: &str,
        params: &UpdateValueList,
    ) -> Result<ValueList, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/radar/value_lists`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(&self, params: &ListValueLists) -> Result<List<ValueList>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `DELETE /v1/radar/value_lists/{id}`. Fails while a rule references the list.
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
