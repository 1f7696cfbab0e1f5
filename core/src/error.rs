//! Error types for the mycenae gateway, its configuration, and the raw-query
//! parser.
//!
//! # Design
//! The gateway never interprets status codes itself, so `ApiError` only has
//! status-bearing variants for the outcomes the call sites map:
//! `UnexpectedStatus` for anything outside an operation's recognized set and
//! `BadRequest` for a rejected raw query. When a response arrived but its body
//! could not be decoded, the status travels inside `Unmarshal` so the caller
//! still sees it. Transport failures have no status.

use std::io;

use thiserror::Error;

/// Errors returned by `Gateway` and the endpoint call sites.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The gateway configuration was rejected before any transport was built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Marshal(#[source] serde_json::Error),

    /// DNS, connect, timeout, or malformed URI; no response was received.
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// The status arrived but reading the body failed.
    #[error("could not read response body (HTTP {status}): {source}")]
    Body {
        status: u16,
        #[source]
        source: ureq::Error,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed (HTTP {status}): {source}")]
    Unmarshal {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a status the operation does not recognize.
    #[error("received an error or unmapped status: {0}")]
    UnexpectedStatus(u16),

    /// The server rejected the query parameters (HTTP 400).
    #[error("invalid parameters")]
    BadRequest,
}

impl ApiError {
    /// The HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Body { status, .. } | ApiError::Unmarshal { status, .. } => Some(*status),
            ApiError::UnexpectedStatus(status) => Some(*status),
            ApiError::BadRequest => Some(400),
            _ => None,
        }
    }
}

/// Errors raised while loading or validating a `GatewayConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors returned by `RawQuery::parse`.
///
/// `Malformed`, `MissingField` and `TypeMismatch` form the unmarshalling
/// class; `MissingMandatoryFields` is reserved for the query type and the
/// `ksid` tag.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("error unmarshalling data: {0}")]
    Malformed(String),

    #[error("error unmarshalling data: field `{0}` is absent")]
    MissingField(&'static str),

    #[error("error unmarshalling data: field `{field}` must be a {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("mandatory fields are missing: `{0}`")]
    MissingMandatoryFields(&'static str),
}

impl ParseError {
    pub fn is_unmarshalling(&self) -> bool {
        !matches!(self, ParseError::MissingMandatoryFields(_))
    }
}
