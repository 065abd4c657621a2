//! Argument definitions and their translation into requests.

use clap::{Args, Parser, Subcommand};
use http::header::{HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};
use payrail::config::{API_BASE_ENV, API_VERSION_ENV, SECRET_KEY_ENV, TIMEOUT_SECS_ENV};
use payrail::{ClientConfig, ConfigError, EncodingError, ParamTree};
use payrail_http::headers::insert_idempotency_key;
use payrail_http::{ApiHandler, HeaderMap, Method, RequestDescriptor, TransportError};

/// Talk to the payment API from the command line.
#[derive(Debug, Parser)]
#[command(name = "payrail", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings, each also read from the environment.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Secret API key.
    #[arg(long, env = SECRET_KEY_ENV, hide_env_values = true, global = true)]
    pub secret_key: Option<String>,

    /// API origin.
    #[arg(long, env = API_BASE_ENV, default_value = ClientConfig::DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// API version to pin with the `Stripe-Version` header.
    #[arg(long, env = API_VERSION_ENV, global = true)]
    pub api_version: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = TIMEOUT_SECS_ENV, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    /// Builds the client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] when no key was given.
    pub fn to_config(&self) -> Result<ClientConfig, ConfigError> {
        let secret_key = self
            .secret_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingSecretKey(SECRET_KEY_ENV))?;
        let mut config = ClientConfig::new(secret_key).with_api_base(self.api_base.clone());
        if let Some(version) = &self.api_version {
            config = config.with_api_version(version.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one request and print the JSON response.
    Request(RequestArgs),
    /// Print the form encoding of the given parameters.
    Encode(ParamArgs),
}

/// Parameters given as `-d key[a][b]=value`.
#[derive(Debug, Args)]
pub struct ParamArgs {
    /// A parameter in bracket notation; repeat for more.
    #[arg(short = 'd', long = "data", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub data: Vec<(String, String)>,
}

impl ParamArgs {
    /// Rebuilds the parameter tree.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] for malformed, repeated or conflicting keys.
    pub fn to_tree(&self) -> Result<ParamTree, EncodingError> {
        ParamTree::from_pairs(self.data.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, DELETE, ...).
    pub method: String,

    /// Path below `/v1/`, e.g. `plans/gold`.
    pub path: String,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Extra header as `Name: value`; repeat for more.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// Sets the `Idempotency-Key` header.
    #[arg(long)]
    pub idempotency_key: Option<String>,
}

/// Reasons a request could not be built from arguments.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid HTTP method {0:?}")]
    Method(String),
    #[error("invalid header name {name:?}: {source}")]
    HeaderName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },
    #[error("invalid value for header {name:?}: {source}")]
    HeaderValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RequestArgs {
    /// Builds the request descriptor. `GET` and `DELETE` carry the parameters
    /// in the query string, every other method in the body.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] for an unknown method, bad headers or parameters.
    pub fn to_descriptor(&self) -> Result<RequestDescriptor, CliError> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| CliError::Method(self.method.clone()))?;
        let encoded = ApiHandler::encode(&self.params.to_tree()?)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|source| CliError::HeaderName {
                    name: name.clone(),
                    source,
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|source| CliError::HeaderValue {
                    name: name.clone(),
                    source,
                })?;
            headers.append(header_name, header_value);
        }
        if let Some(key) = &self.idempotency_key {
            insert_idempotency_key(&mut headers, key)?;
        }

        let descriptor =
            RequestDescriptor::new(method.clone(), self.path.clone()).with_headers(headers);
        Ok(if method == Method::GET || method == Method::DELETE {
            descriptor.with_query(encoded)
        } else {
            descriptor.with_body(encoded)
        })
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

fn parse_header_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .ok_or_else(|| format!("expected NAME:VALUE, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn request_args(cli: Cli) -> RequestArgs {
        match cli.command {
            Command::Request(args) => args,
            Command::Encode(_) => panic!("expected request"),
        }
    }

    #[test]
    fn test_post_params_go_to_body() {
        let cli = parse(&[
            "payrail",
            "--secret-key",
            "sk_test_123",
            "request",
            "post",
            "webhook_endpoints",
            "-d",
            "url=https://x",
            "-d",
            "enabled_events[]=charge.failed",
            "-d",
            "metadata[order_id]=6735",
            "--idempotency-key",
            "k1",
        ]);
        let descriptor = request_args(cli).to_descriptor().unwrap();
        assert_eq!(descriptor.method, Method::POST);
        assert_eq!(
            descriptor.body.as_deref(),
            Some("url=https%3A%2F%2Fx&enabled_events[]=charge.failed&metadata[order_id]=6735")
        );
        assert!(descriptor.query.is_none());
        assert_eq!(descriptor.headers["idempotency-key"], "k1");
    }

    #[test]
    fn test_get_params_go_to_query() {
        let cli = parse(&[
            "payrail",
            "request",
            "GET",
            "plans",
            "-d",
            "limit=3",
            "-H",
            "Stripe-Account: acct_1",
        ]);
        let descriptor = request_args(cli).to_descriptor().unwrap();
        assert_eq!(descriptor.query.as_deref(), Some("limit=3"));
        assert!(descriptor.body.is_none());
        assert_eq!(descriptor.headers["stripe-account"], "acct_1");
    }

    #[test]
    fn test_conflicting_params_are_rejected() {
        let cli = parse(&["payrail", "request", "POST", "plans", "-d", "a=1", "-d", "a[b]=2"]);
        let err = request_args(cli).to_descriptor().unwrap_err();
        assert!(matches!(err, CliError::Encoding(EncodingError::Conflict { .. })));
    }

    #[test]
    fn test_bad_pair_is_a_usage_error() {
        assert!(Cli::try_parse_from(["payrail", "encode", "-d", "novalue"]).is_err());
    }

    #[test]
    fn test_missing_secret_key() {
        let cli = parse(&["payrail", "encode"]);
        if std::env::var_os(SECRET_KEY_ENV).is_none() {
            assert!(matches!(
                cli.connection.to_config(),
                Err(ConfigError::MissingSecretKey(_))
            ));
        }
    }

    #[test]
    fn test_config_from_flags() {
        let cli = parse(&[
            "payrail",
            "--secret-key",
            "sk_test_123",
            "--api-base",
            "http://localhost:12111",
            "--api-version",
            "2020-08-27",
            "--timeout-secs",
            "5",
            "encode",
        ]);
        let config = cli.connection.to_config().unwrap();
        assert_eq!(config.api_base, "http://localhost:12111");
        assert_eq!(config.api_version.as_deref(), Some("2020-08-27"));
        assert_eq!(config.timeout_secs, Some(5));
    }
}
