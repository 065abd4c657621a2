//! `/v1/tokens`: single-use tokens for card, bank account, PII and account data.
//!
//! Tokens can be created and retrieved, never updated or listed.

use payrail::form::ToParams;
use payrail::proto::{Metadata, Timestamp};
use payrail::{ParamTree, ParamValue};
use payrail_http::DispatchError;
use serde::{Deserialize, Serialize};

use crate::route::{object_path, route_object};

const PATH: &str = "tokens";

/// A single-use token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier (`tok_...`, `btok_...`, `pii_...`, `ct_...`).
    pub id: String,
    /// Always `"token"`.
    pub object: String,
    /// Set for `bank_account` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<BankAccount>,
    /// Set for `card` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    /// IP address of the client that created the token.
    #[serde(default)]
    pub client_ip: Option<String>,
    /// Creation time.
    pub created: Timestamp,
    /// Whether the object exists in live mode.
    pub livemode: bool,
    /// `account`, `bank_account`, `card`, `cvc_update` or `pii`.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Whether the token has already been consumed.
    pub used: bool,
}

/// Card details as returned inside a token. The full number is never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier (`card_...`).
    pub id: String,
    /// `Visa`, `MasterCard`, `American Express`, ...
    pub brand: String,
    /// Two-letter issuing country.
    #[serde(default)]
    pub country: Option<String>,
    /// Expiry month, 1 through 12.
    pub exp_month: u8,
    /// Four-digit expiry year.
    pub exp_year: u16,
    /// `credit`, `debit`, `prepaid` or `unknown`.
    #[serde(default)]
    pub funding: Option<String>,
    /// Last four digits of the number.
    pub last4: String,
    /// Cardholder name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Bank account details as returned inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier (`ba_...`).
    pub id: String,
    /// Account holder name.
    #[serde(default)]
    pub account_holder_name: Option<String>,
    /// `individual` or `company`.
    #[serde(default)]
    pub account_holder_type: Option<String>,
    /// Name of the bank.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Two-letter country of the bank.
    pub country: String,
    /// Three-letter currency of the account.
    pub currency: String,
    /// Last four digits of the account number.
    pub last4: String,
    /// Routing or sort code.
    #[serde(default)]
    pub routing_number: Option<String>,
}

/// Raw card data for [`TokenSource::Card`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardParams {
    /// Full card number.
    pub number: String,
    /// Expiry month.
    pub exp_month: u8,
    /// Expiry year.
    pub exp_year: u16,
    /// Security code.
    pub cvc: Option<String>,
    /// Cardholder name.
    pub name: Option<String>,
    /// Billing address line 1.
    pub address_line1: Option<String>,
    /// Billing postal code.
    pub address_zip: Option<String>,
    /// Billing country.
    pub address_country: Option<String>,
    /// Currency for cards used as payout destinations.
    pub currency: Option<String>,
}

impl ToParams for CardParams {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("number", &self.number)
            .with("exp_month", self.exp_month)
            .with("exp_year", u32::from(self.exp_year))
            .with("cvc", self.cvc.clone())
            .with("name", self.name.clone())
            .with("address_line1", self.address_line1.clone())
            .with("address_zip", self.address_zip.clone())
            .with("address_country", self.address_country.clone())
            .with("currency", self.currency.clone())
    }
}

/// Raw bank account data for [`TokenSource::BankAccount`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankAccountParams {
    /// Account number.
    pub account_number: String,
    /// Two-letter country of the bank.
    pub country: String,
    /// Three-letter currency.
    pub currency: Option<String>,
    /// Routing or sort code.
    pub routing_number: Option<String>,
    /// Account holder name.
    pub account_holder_name: Option<String>,
    /// `individual` or `company`.
    pub account_holder_type: Option<String>,
}

impl ToParams for BankAccountParams {
    fn to_params(&self) -> ParamTree {
        ParamTree::new()
            .with("account_number", &self.account_number)
            .with("country", &self.country)
            .with("currency", self.currency.clone())
            .with("routing_number", self.routing_number.clone())
            .with("account_holder_name", self.account_holder_name.clone())
            .with("account_holder_type", self.account_holder_type.clone())
    }
}

/// Account data for [`TokenSource::Account`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountTokenParams {
    /// `individual`, `company`, `non_profit` or `government_entity`.
    pub business_type: Option<String>,
    /// Whether the account holder accepted the service agreement.
    pub tos_shown_and_accepted: Option<bool>,
    /// Extra fields, nested under `account[...]`.
    pub extra: Option<Metadata>,
}

impl ToParams for AccountTokenParams {
    fn to_params(&self) -> ParamTree {
        let mut params = ParamTree::new()
            .with("business_type", self.business_type.clone())
            .with("tos_shown_and_accepted", self.tos_shown_and_accepted);
        if let Some(extra) = &self.extra {
            params.merge(extra.to_params());
        }
        params
    }
}

/// What a token is created from. Exactly one source per token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A card, sent under `card[...]`.
    Card(CardParams),
    /// An existing card or bank account id on a customer, sent as a string.
    CardId(String),
    /// A bank account, sent under `bank_account[...]`.
    BankAccount(BankAccountParams),
    /// A personal id number, sent as `pii[id_number]`.
    Pii {
        /// The id number.
        id_number: String,
    },
    /// A connected account's details, sent under `account[...]`.
    Account(AccountTokenParams),
    /// A fresh CVC for a saved card, sent as `cvc_update[cvc]`.
    CvcUpdate {
        /// The security code.
        cvc: String,
    },
}

/// Parameters for [`Tokens::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateToken {
    /// What the token carries.
    pub source: TokenSource,
    /// Customer whose saved source is tokenized for a connected account.
    pub customer: Option<String>,
}

impl From<TokenSource> for CreateToken {
    fn from(source: TokenSource) -> Self {
        Self {
            source,
            customer: None,
        }
    }
}

impl ToParams for CreateToken {
    fn to_params(&self) -> ParamTree {
        let (key, value): (&str, ParamValue) = match &self.source {
            TokenSource::Card(card) => ("card", card.to_params().into()),
            TokenSource::CardId(id) => ("card", id.into()),
            TokenSource::BankAccount(account) => ("bank_account", account.to_params().into()),
            TokenSource::Pii { id_number } => {
                ("pii", ParamTree::new().with("id_number", id_number).into())
            }
            TokenSource::Account(account) => ("account", account.to_params().into()),
            TokenSource::CvcUpdate { cvc } => {
                ("cvc_update", ParamTree::new().with("cvc", cvc).into())
            }
        };
        let mut params = ParamTree::new().with(key, value);
        params.push("customer", self.customer.clone());
        params
    }
}

route_object!(
    /// Operations on tokens.
    Tokens
);

impl Tokens {
    /// `POST /v1/tokens`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn create(&self, params: &CreateToken) -> Result<Token, DispatchError> {
        self.handler
            .post(PATH, &params.to_params(), &self.headers)
            .await
    }

    /// `GET /v1/tokens/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the call fails.
    pub async fn retrieve(&self, id: &str) -> Result<Token, DispatchError> {
        self.handler
            .get(&object_path(PATH, id)?, &ParamTree::new(), &self.headers)
            .await
    }
}
