//! Response fields that arrive either as an id or as a nested object.
//!
//! The provider returns related objects as a bare id (`"cus_123"`) unless the
//! request asked for them with `expand[]`, in which case the whole object is
//! inlined. [`Expandable`] captures both shapes and degrades to
//! [`Expandable::Empty`] when the payload matches neither, so one unexpected
//! field never fails the whole response.
//!
//! Model fields should be declared as
//!
//! ```rust
//! # use payrail::Expandable;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Serialize, Deserialize)] struct Customer { id: String }
//! #[derive(Serialize, Deserialize)]
//! struct Charge {
//!     #[serde(default, skip_serializing_if = "Expandable::is_empty")]
//!     customer: Expandable<Customer>,
//! }
//! ```
//!
//! so that a missing field decodes to `Empty` and `Empty` re-serializes as an
//! omitted field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A field holding either a reference id or the expanded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expandable<T> {
    /// The field was returned as a bare id.
    Reference(String),
    /// The field was returned as a nested object.
    Expanded(T),
    /// The field was missing, `null`, or matched neither shape.
    Empty,
}

impl<T> Default for Expandable<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> Expandable<T> {
    /// Returns the id when the field was not expanded.
    #[must_use]
    pub fn id_if_unexpanded(&self) -> Option<&str> {
        match self {
            Self::Reference(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Returns the nested object when the field was expanded.
    #[must_use]
    pub const fn value_if_expanded(&self) -> Option<&T> {
        match self {
            Self::Expanded(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the field and returns the nested object, if any.
    #[must_use]
    pub fn into_expanded(self) -> Option<T> {
        match self {
            Self::Expanded(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if neither shape is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl<T: DeserializeOwned> Expandable<T> {
    /// Resolves a buffered JSON value by trial: a string becomes a reference,
    /// anything decodable as `T` becomes an expanded object, the rest is empty.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(id) => Self::Reference(id),
            Value::Null => Self::Empty,
            other => serde_json::from_value(other).map_or(Self::Empty, Self::Expanded),
        }
    }
}

impl<T> From<String> for Expandable<T> {
    fn from(id: String) -> Self {
        Self::Reference(id)
    }
}

impl<T> From<&str> for Expandable<T> {
    fn from(id: &str) -> Self {
        Self::Reference(id.to_owned())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Expandable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only syntactically broken input fails here; shape mismatches land in `Empty`.
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl<T: Serialize> Serialize for Expandable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Reference(id) => serializer.serialize_str(id),
            Self::Expanded(value) => value.serialize(serializer),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

/// An expandable field whose expanded form is one of two object types.
///
/// Payment sources are the usual case: the nested object may be a card or a
/// bank account. Decoding tries `A` before `B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicExpandable<A, B> {
    /// The field was returned as a bare id.
    Reference(String),
    /// The field was expanded into the first candidate type.
    ExpandedA(A),
    /// The field was expanded into the second candidate type.
    ExpandedB(B),
    /// The field was missing, `null`, or matched no shape.
    Empty,
}

impl<A, B> Default for DynamicExpandable<A, B> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<A, B> DynamicExpandable<A, B> {
    /// Returns the id when the field was not expanded.
    #[must_use]
    pub fn id_if_unexpanded(&self) -> Option<&str> {
        match self {
            Self::Reference(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Returns the nested object when it decoded as `A`.
    #[must_use]
    pub const fn value_if_a(&self) -> Option<&A> {
        match self {
            Self::ExpandedA(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested object when it decoded as `B`.
    #[must_use]
    pub const fn value_if_b(&self) -> Option<&B> {
        match self {
            Self::ExpandedB(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if no shape is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl<A: DeserializeOwned, B: DeserializeOwned> DynamicExpandable<A, B> {
    /// Resolves a buffered JSON value, trying a string, then `A`, then `B`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(id) => Self::Reference(id),
            Value::Null => Self::Empty,
            other => {
                if let Ok(a) = A::deserialize(&other) {
                    Self::ExpandedA(a)
                } else {
                    B::deserialize(&other).map_or(Self::Empty, Self::ExpandedB)
                }
            }
        }
    }
}

impl<'de, A: DeserializeOwned, B: DeserializeOwned> Deserialize<'de> for DynamicExpandable<A, B> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl<A: Serialize, B: Serialize> Serialize for DynamicExpandable<A, B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Reference(id) => serializer.serialize_str(id),
            Self::ExpandedA(value) => value.serialize(serializer),
            Self::ExpandedB(value) => value.serialize(serializer),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Customer {
        id: String,
        name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Card {
        id: String,
        last4: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct BankAccount {
        id: String,
        bank_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Charge {
        id: String,
        #[serde(default, skip_serializing_if = "Expandable::is_empty")]
        customer: Expandable<Customer>,
    }

    #[test]
    fn test_reference_shape() {
        let field: Expandable<Customer> = serde_json::from_value(json!("cus_123")).unwrap();
        assert_eq!(field, Expandable::Reference("cus_123".into()));
        assert_eq!(field.id_if_unexpanded(), Some("cus_123"));
        assert!(field.value_if_expanded().is_none());
    }

    #[test]
    fn test_expanded_shape() {
        let field: Expandable<Customer> =
            serde_json::from_value(json!({"id": "cus_123", "name": "Jane"})).unwrap();
        let expected = Customer {
            id: "cus_123".into(),
            name: "Jane".into(),
        };
        assert_eq!(field.value_if_expanded(), Some(&expected));
        assert!(field.id_if_unexpanded().is_none());
    }

    #[test]
    fn test_unmatched_shapes_degrade_to_empty() {
        for payload in [json!(null), json!(42), json!(true), json!({"unexpected": 1}), json!([])] {
            let field: Expandable<Customer> = serde_json::from_value(payload).unwrap();
            assert!(field.is_empty());
            assert!(field.id_if_unexpanded().is_none());
            assert!(field.value_if_expanded().is_none());
        }
    }

    #[test]
    fn test_bad_field_does_not_fail_parent() {
        let charge: Charge =
            serde_json::from_str(r#"{"id": "ch_1", "customer": {"id": 7}}"#).unwrap();
        assert_eq!(charge.id, "ch_1");
        assert!(charge.customer.is_empty());

        let charge: Charge = serde_json::from_str(r#"{"id": "ch_2"}"#).unwrap();
        assert!(charge.customer.is_empty());
    }

    #[test]
    fn test_serializes_back_to_stored_shape() {
        let reference = Charge {
            id: "ch_1".into(),
            customer: "cus_123".into(),
        };
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            json!({"id": "ch_1", "customer": "cus_123"})
        );

        let expanded = Charge {
            id: "ch_1".into(),
            customer: Expandable::Expanded(Customer {
                id: "cus_123".into(),
                name: "Jane".into(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&expanded).unwrap(),
            json!({"id": "ch_1", "customer": {"id": "cus_123", "name": "Jane"}})
        );

        let empty = Charge {
            id: "ch_1".into(),
            customer: Expandable::Empty,
        };
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"id": "ch_1"}));
    }

    #[test]
    fn test_dynamic_picks_matching_type() {
        type Source = DynamicExpandable<Card, BankAccount>;

        let source: Source = serde_json::from_value(json!("card_1")).unwrap();
        assert_eq!(source.id_if_unexpanded(), Some("card_1"));

        let source: Source =
            serde_json::from_value(json!({"object": "card", "id": "card_1", "last4": "4242"}))
                .unwrap();
        assert_eq!(source.value_if_a().map(|c| c.last4.as_str()), Some("4242"));
        assert!(source.value_if_b().is_none());

        let source: Source = serde_json::from_value(
            json!({"object": "bank_account", "id": "ba_1", "bank_name": "STRIPE TEST BANK"}),
        )
        .unwrap();
        assert_eq!(
            source.value_if_b().map(|b| b.bank_name.as_str()),
            Some("STRIPE TEST BANK")
        );

        let source: Source = serde_json::from_value(json!({"object": "alipay"})).unwrap();
        assert!(source.is_empty());
    }
}
