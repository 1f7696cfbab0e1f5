//! Blocking client core for the mycenae timeseries HTTP API.
//!
//! # Overview
//! `Gateway` turns a static `Endpoint` descriptor into an HTTP call: it fills
//! URI placeholders, encodes the optional body as JSON, executes the request
//! with the configured timeout, and decodes the response into a caller-chosen
//! type. Status codes pass through untouched; the keyset and raw-query call
//! sites decide what each code means for their operation.
//!
//! `RawQuery::parse` is the server-side counterpart for inbound raw-query
//! documents. It validates one field at a time so that the first structural
//! problem is the one reported.
//!
//! # Design
//! - `Gateway` carries no per-call state and is `Send + Sync`.
//! - The JSON codec is a constructor argument (`Codec`), not global state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
mod keyset;
mod query;
mod raw;
pub mod types;

pub use codec::{Codec, JsonCodec};
pub use config::GatewayConfig;
pub use error::{ApiError, ConfigError, ParseError};
pub use gateway::{Gateway, NO_BODY};
pub use http::{Endpoint, HttpMethod, Reply};
pub use types::{
    Metadata, NumberPoint, NumberQueryResults, Points, QueryResults, RawDataQuery, RawQuery, RawQueryType, TextPoint,
    TextQueryResults,
};
