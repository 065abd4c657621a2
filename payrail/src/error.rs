//! Local validation errors.
//!
//! Neither error type here is ever produced by a network exchange: they are
//! raised before a request is built.

use std::num::ParseIntError;

/// The parameter tree handed to the form encoder cannot be linearized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The same key appears twice at one nesting level.
    #[error("duplicate parameter key `{path}`")]
    DuplicateKey {
        /// Flattened path of the duplicated key.
        path: String,
    },

    /// A key is the empty string.
    #[error("empty parameter key under `{parent}`")]
    EmptyKey {
        /// Flattened path of the enclosing tree (empty at the top level).
        parent: String,
    },

    /// A flat key does not follow the `name[a][b]` grammar, or a tree key
    /// contains a bracket.
    #[error("malformed parameter key `{key}`")]
    MalformedKey {
        /// The offending key, flattened when it came from a tree.
        key: String,
    },

    /// A path is used both as a scalar and as a nested tree or list.
    #[error("parameter `{path}` is used both as a value and as a container")]
    Conflict {
        /// Flattened path of the conflicting key.
        path: String,
    },
}

/// Errors raised while assembling a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No secret key was supplied.
    #[error("missing secret key: set {0}")]
    MissingSecretKey(&'static str),

    /// The timeout value is not a whole number of seconds.
    #[error("invalid timeout `{value}`: {source}")]
    InvalidTimeout {
        /// The raw value that failed to parse.
        value: String,
        /// The underlying parse error.
        #[source]
        source: ParseIntError,
    },
}
