//! Plumbing shared by every route object.

use payrail::ParamTree;
use payrail::form::ToParams;
use payrail_http::TransportError;
use url::form_urlencoded;

/// Declares a route object: a handler clone plus headers sent with each call.
macro_rules! route_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            handler: ::payrail_http::ApiHandler,
            /// Headers merged over the handler defaults on every call made
            /// through this object (e.g. `Stripe-Account`).
            pub headers: ::payrail_http::HeaderMap,
        }

        impl $name {
            /// Creates the route object over `handler`.
            #[must_use]
            pub fn new(handler: ::payrail_http::ApiHandler) -> Self {
                Self {
                    handler,
                    headers: ::payrail_http::HeaderMap::new(),
                }
            }
        }
    };
}

pub(crate) use route_object;

/// Joins a collection path and an object id, escaping the id so it stays a
/// single path segment.
///
/// An empty id would address the collection itself, and `.`/`..` would be
/// resolved away, so those are rejected.
pub(crate) fn object_path(collection: &str, id: &str) -> Result<String, TransportError> {
    if matches!(id, "" | "." | "..") {
        return Err(TransportError::RoutePath {
            path: format!("{collection}/{id}"),
        });
    }
    let escaped: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    Ok(format!("{collection}/{}", escaped.replace('+', "%20")))
}

/// Parameters of a retrieve call that only selects fields to expand.
pub(crate) fn expand_params(expand: &[&str]) -> ParamTree {
    let mut params = ParamTree::new();
    if !expand.is_empty() {
        params.push("expand", expand.to_vec());
    }
    params
}

/// Encodes an optional nested struct, leaving the key out when `None`.
pub(crate) fn nested<P: ToParams>(value: Option<&P>) -> Option<ParamTree> {
    value.map(ToParams::to_params)
}
