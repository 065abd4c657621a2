//! `/v1/terminal/locations`: physical places readers are registered to.

use payrail::form::ToParams;
use payrail::proto::{Deleted, List, ListParams, Metadata};
use payrail::ParamTree;
use payrail_http::DispatchError;
use serde::{Deserialize, Serialize};

use crate::route::{nested, object_path, route_object};

const PATH: &str = "terminal/locations";

/// A terminal location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier (`tml_...`).
    pub id: String,
    /// Always `"terminal.location"`.
    pub object: String,
    /// Postal address of the location.
    pub address: Address,
    /// Reader configuration applied to readers at this location.
    #[serde(default)]
    pub configuration_overrides: Option<String>,
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// Caller-defined key/value pairs.
    #[serde(default)]
    pub metadata: Metadata,
}

/// A postal address. Used both in responses and as request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// City, district, suburb, town or village.
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter country.
    #[serde(default)]
    pub country: Option<String>,
    /// Street, PO box or company name.
    #[serde(default)]
    pub line1: Option<String>,
    /// Apartment, suite, unit or building.
    #[serde(default)]
    pub line2: Option<String>,
    /// ZIP or postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// State, county, province or region.
    #[serde(default)]
    pub state: Option<String>,
}

impl ToParams for Address {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("city", self.city.clone())
            .with("country", self.country.clone())
            .with("line1", self.line1.clone())
            .with("line2", self.line2.clone())
            .with("postal_code", self.postal_code.clone())
            .with("state", self.state.clone())
    }
}

/// Parameters for [`Locations::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLocation {
    /// Postal address; `country` is required by the provider.
    pub address: Address,
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Reader configuration id.
    pub configuration_overrides: Option<String>,
    /// Caller-defined key/value pairs.
    pub metadata: Option<Metadata>,
}

impl ToParams for CreateLocation {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("address", self.address.to_params())
            .with("display_name", &self.display_name)
            .with("configuration_overrides", self.configuration_overrides.clone())
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

/// Parameters for [`Locations::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateLocation {
    /// Replaces the address.
    pub address: Option<Address>,
    /// Name shown in the dashboard.
    pub display_name: Option<String>,
    /// Reader configuration id; an empty string removes it.
    pub configuration_overrides: Option<String>,
    /// Metadata to merge.
    pub metadata: Option<Metadata>,
}

impl ToParams for UpdateLocation {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("address", nested(self.address.as_ref()))
            .with("display_name", self.display_name.clone())
            .with("configuration_overrides", self.configuration_overrides.clone())
            .with("metadata", nested(self.metadata.as_ref()))
    }
}

route_object!(
    /// Operations on terminal locations.
    Locations
);

impl Locations {
    /// `POST /v1/terminal/locations`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(&self, params: &CreateLocation) -> Result<Location, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/terminal/locations/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<Location, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }

    /// `POST /v1/terminal/locations/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn update(&self, id: &str, params: &UpdateLocation) -> Result<Location, DispatchError> {
        self.handler
            .post(&object_path(PATH, id)?, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/terminal/locations`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn list(&self, params: &ListParams) -> Result<List<Location>, DispatchError> {
        self.handler
            .get(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `DELETE /v1/terminal/locations/{id}`
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
    use payrail_http::headers::insert_account;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location_json() -> serde_json::Value {
        json!({
            "id": "tml_1",
            "object": "terminal.location",
            "address": {
                "city": "San Francisco",
                "country": "US",
                "line1": "1234 Main Street",
                "line2": null,
                "postal_code": "94111",
                "state": "CA"
            },
            "display_name": "My First Store",
            "livemode": false,
            "metadata": {}
        })
    }

    fn store_address() -> Address {
        Address {
            city: Some("San Francisco".into()),
            country: Some("US".into()),
            line1: Some("1234 Main Street".into()),
            postal_code: Some("94111".into()),
            state: Some("CA".into()),
            ..Address::default()
        }
    }

    #[test]
    fn test_create_params_nest_address() {
        let params = CreateLocation {
            address: store_address(),
            display_name: "My First Store".into(),
            ..CreateLocation::default()
        };
        assert_eq!(
            encode(&params.to_params()).unwrap(),
            "address[city]=San+Francisco&address[country]=US&address[line1]=1234+Main+Street\
             &address[postal_code]=94111&address[state]=CA&display_name=My+First+Store"
        );
    }

    #[test]
    fn test_update_without_address_omits_it() {
        let params = UpdateLocation {
            display_name: Some("Renamed".into()),
            ..UpdateLocation::default()
        };
        assert_eq!(encode(&params.to_params()).unwrap(), "display_name=Renamed");
    }

    #[tokio::test]
    async fn test_create_on_behalf_of_connected_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/terminal/locations"))
            .and(header("stripe-account", "acct_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(location_json()))
            .expect(1)
            .mount(&server)
            .await;

        let mut routes = Locations::new(handler_for(&server));
        insert_account(&mut routes.headers, "acct_1").unwrap();
        let location = routes
            .create(&CreateLocation {
                address: store_address(),
                display_name: "My First Store".into(),
                ..CreateLocation::default()
            })
            .await
            .unwrap();
        assert_eq!(location.address.city.as_deref(), Some("San Francisco"));
        assert!(location.address.line2.is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/terminal/locations/tml_1"))
            .and(body_string("display_name=My+First+Store"))
            .respond_with(ResponseTemplate::new(200).set_body_json(location_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/terminal/locations/tml_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "tml_1",
                "object": "terminal.location",
                "deleted": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let routes = Locations::new(handler_for(&server));
        let location = routes
            .update(
                "tml_1",
                &UpdateLocation {
                    display_name: Some("My First Store".into()),
                    ..UpdateLocation::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(location.display_name, "My First Store");
        assert!(routes.delete("tml_1").await.unwrap().deleted);
    }
}
