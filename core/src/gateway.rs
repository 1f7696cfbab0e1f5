//! Blocking request gateway for the mycenae HTTP API.
//!
//! # Design
//! `Gateway` holds the base URL, a `ureq` agent, and a codec, and carries no
//! mutable state between calls, so one instance can be shared by any number
//! of threads. Each call resolves an `Endpoint` into a request, executes the
//! round-trip, and hands back the raw status code. What a status means is up
//! to the call site; the gateway only decides whether there is a body to
//! decode.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use ureq::http::Response;
use ureq::tls::TlsConfig;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::codec::{Codec, JsonCodec};
use crate::config::GatewayConfig;
use crate::error::ApiError;
use crate::http::{Endpoint, HttpMethod, Reply, APPLICATION_JSON, CONTENT_TYPE};

const NO_CONTENT: u16 = 204;

/// Body argument for calls that send nothing.
pub const NO_BODY: Option<&()> = None;

/// Client for one remote mycenae service.
#[derive(Clone)]
pub struct Gateway<C = JsonCodec> {
    base_url: String,
    agent: Agent,
    codec: C,
}

impl<C> fmt::Debug for Gateway<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl Gateway<JsonCodec> {
    pub fn new(config: &GatewayConfig) -> Result<Self, ApiError> {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec> Gateway<C> {
    /// Validate `config` and build the transport.
    ///
    /// Nothing is allocated on the network side when validation fails.
    pub fn with_codec(config: &GatewayConfig, codec: C) -> Result<Self, ApiError> {
        config.validate()?;

        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .proxy(None)
            .timeout_global(Some(config.timeout))
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(config.insecure_skip_verify)
                    .build(),
            )
            .build()
            .new_agent();

        Ok(Self {
            base_url: config.base_url(),
            agent,
            codec,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute `endpoint` and decode the response body into `T`.
    ///
    /// The body is decoded unless the status is 204 or the body is empty, in
    /// which case `Reply::value` is `None`. A decode failure still reports
    /// the status inside `ApiError::Unmarshal`.
    pub fn execute<B, T>(&self, endpoint: &Endpoint, uri_args: &[&str], body: Option<&B>) -> Result<Reply<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, content) = self.round_trip(endpoint, uri_args, body)?;

        if status == NO_CONTENT || content.is_empty() {
            return Ok(Reply { status, value: None });
        }

        let value = self
            .codec
            .decode(&content)
            .map_err(|source| ApiError::Unmarshal { status, source })?;

        Ok(Reply {
            status,
            value: Some(value),
        })
    }

    /// Execute `endpoint` without decoding; the body is drained and dropped.
    pub fn send<B>(&self, endpoint: &Endpoint, uri_args: &[&str], body: Option<&B>) -> Result<u16, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let (status, _) = self.round_trip(endpoint, uri_args, body)?;
        Ok(status)
    }

    /// Drop the agent and with it every pooled idle connection.
    ///
    /// Takes `self` so no call can still be borrowing the gateway.
    pub fn close(self) {
        debug!(base_url = %self.base_url, "closing gateway");
    }

    /// Returns the status and the fully read body.
    fn round_trip<B>(&self, endpoint: &Endpoint, uri_args: &[&str], body: Option<&B>) -> Result<(u16, Vec<u8>), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(|b| self.codec.encode(b))
            .transpose()
            .map_err(ApiError::Marshal)?;

        let url = format!("{}{}", self.base_url, endpoint.resolve(uri_args));
        debug!(method = %endpoint.method(), url = %url, "dispatching request");

        let mut response = self.dispatch(endpoint.method(), &url, payload.as_deref())?;
        let status = response.status().as_u16();
        // result sets have no size cap, so lift ureq's default read limit
        let content = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|source| ApiError::Body { status, source })?;

        debug!(method = %endpoint.method(), url = %url, status, bytes = content.len(), "received response");
        Ok((status, content))
    }

    fn dispatch(&self, method: HttpMethod, url: &str, payload: Option<&[u8]>) -> Result<Response<Body>, ureq::Error> {
        match method {
            HttpMethod::Get => send_without_body(self.agent.get(url), payload),
            HttpMethod::Head => send_without_body(self.agent.head(url), payload),
            HttpMethod::Delete => send_without_body(self.agent.delete(url), payload),
            HttpMethod::Post => send_with_body(self.agent.post(url), payload),
            HttpMethod::Put => send_with_body(self.agent.put(url), payload),
        }
    }
}

/// The content type is set even when nothing is sent.
fn send_without_body(
    request: RequestBuilder<WithoutBody>,
    payload: Option<&[u8]>,
) -> Result<Response<Body>, ureq::Error> {
    let request = request.header(CONTENT_TYPE, APPLICATION_JSON);
    match payload {
        Some(bytes) => request.force_send_body().send(bytes),
        None => request.call(),
    }
}

fn send_with_body(request: RequestBuilder<WithBody>, payload: Option<&[u8]>) -> Result<Response<Body>, ureq::Error> {
    let request = request.header(CONTENT_TYPE, APPLICATION_JSON);
    match payload {
        Some(bytes) => request.send(bytes),
        None => request.send_empty(),
    }
}
