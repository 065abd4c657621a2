//! `/v1/billing_portal/*`: the hosted customer self-service portal.

pub mod configurations;
