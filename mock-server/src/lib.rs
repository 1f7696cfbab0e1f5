//! Emulation of the mycenae HTTP API for tests and local development.
//!
//! The server answers the three endpoints the client core talks to from a
//! fixed `Dataset`, switches behaviour through `Mode`, and records every
//! request it sees so tests can assert on what actually went over the wire.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, head, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

/// How the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// Serve the dataset.
    Success = 0,
    /// 204 everywhere; keysets never exist.
    Empty = 1,
    /// 200 with a result document whose total is zero.
    NoData = 2,
    /// 200 with a body that is not JSON.
    Garbage = 3,
    /// 500 with a JSON error body.
    Error = 4,
}

impl Mode {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Mode::Success,
            1 => Mode::Empty,
            2 => Mode::NoData,
            3 => Mode::Garbage,
            _ => Mode::Error,
        }
    }
}

/// Canned content served in `Mode::Success`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub keysets: Vec<String>,
    /// Raw number query results, served verbatim.
    pub number_results: Value,
    /// Raw text query results, served verbatim.
    pub text_results: Value,
}

impl Dataset {
    pub fn sample() -> Self {
        Self {
            keysets: vec!["stats".to_string(), "network".to_string()],
            number_results: json!({
                "results": [{
                    "metadata": {"metric": "cpu.load", "tags": {"ksid": "stats", "host": "a"}},
                    "points": [{"timestamp": 1700000000, "value": 0.25}, {"timestamp": 1700000060, "value": 0.5}]
                }],
                "total": 1
            }),
            text_results: json!({
                "results": [{
                    "metadata": {"metric": "deploy.log", "tags": {"ksid": "stats", "host": "a"}},
                    "points": [{"timestamp": 1700000000, "text": "started"}]
                }],
                "total": 1
            }),
        }
    }
}

/// One request as the server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug)]
pub struct MockState {
    mode: AtomicU8,
    dataset: Dataset,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub type SharedState = Arc<MockState>;

impl MockState {
    pub fn new(dataset: Dataset) -> SharedState {
        Arc::new(Self {
            mode: AtomicU8::new(Mode::Success as u8),
            dataset,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::SeqCst))
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::SeqCst);
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) {
        let request = RecordedRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: String::from_utf8_lossy(body).into_owned(),
        };
        info!(method = %request.method, uri = %request.uri, mode = ?self.mode(), "request received");
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
    }
}

pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/keysets", get(list_keysets))
        .route("/keyset/{name}", head(keyset_exists))
        .route("/api/query/raw", post(raw_query))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: SharedState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn garbage() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], "<html>not json</html>").into_response()
}

fn no_data() -> Response {
    (StatusCode::OK, Json(json!({ "results": [], "total": 0 }))).into_response()
}

async fn list_keysets(State(state): State<SharedState>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&method, &uri, &headers, &[]);
    match state.mode() {
        Mode::Success => Json(state.dataset.keysets.clone()).into_response(),
        Mode::Empty => StatusCode::NO_CONTENT.into_response(),
        Mode::NoData => Json(Vec::<String>::new()).into_response(),
        Mode::Garbage => garbage(),
        Mode::Error => error_response(StatusCode::INTERNAL_SERVER_ERROR, "keyset listing failed"),
    }
}

async fn keyset_exists(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    state.record(&method, &uri, &headers, &[]);
    match state.mode() {
        Mode::Success if state.dataset.keysets.contains(&name) => StatusCode::OK,
        Mode::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::NOT_FOUND,
    }
}

async fn raw_query(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&method, &uri, &headers, &body);
    match state.mode() {
        Mode::Error => return error_response(StatusCode::INTERNAL_SERVER_ERROR, "query failed"),
        Mode::Empty => return StatusCode::NO_CONTENT.into_response(),
        _ => {}
    }

    let Some(query_type) = raw_query_type(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid raw query");
    };

    match state.mode() {
        Mode::NoData => no_data(),
        Mode::Garbage => garbage(),
        _ if query_type == "text" => Json(state.dataset.text_results.clone()).into_response(),
        _ => Json(state.dataset.number_results.clone()).into_response(),
    }
}

/// The `type` of a raw query document that names a known type and carries a
/// `ksid` tag.
fn raw_query_type(body: &[u8]) -> Option<&'static str> {
    let doc: Value = serde_json::from_slice(body).ok()?;
    doc.get("tags")?.get("ksid")?.as_str()?;
    match doc.get("type")?.as_str()? {
        "number" => Some("number"),
        "text" => Some("text"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_roundtrips_through_state() {
        let state = MockState::new(Dataset::default());
        assert_eq!(state.mode(), Mode::Success);
        for mode in [Mode::Empty, Mode::NoData, Mode::Garbage, Mode::Error, Mode::Success] {
            state.set_mode(mode);
            assert_eq!(state.mode(), mode);
        }
    }

    #[test]
    fn sample_dataset_has_consistent_totals() {
        let dataset = Dataset::sample();
        assert_eq!(dataset.number_results["total"], 1);
        assert_eq!(dataset.number_results["results"].as_array().unwrap().len(), 1);
        assert_eq!(dataset.text_results["total"], 1);
    }

    #[test]
    fn raw_query_type_accepts_known_types_only() {
        let ks = r#""tags":{"ksid":"stats"}"#;
        assert_eq!(raw_query_type(format!(r#"{{"type":"number",{ks}}}"#).as_bytes()), Some("number"));
        assert_eq!(raw_query_type(format!(r#"{{"type":"text",{ks}}}"#).as_bytes()), Some("text"));
        assert_eq!(raw_query_type(format!(r#"{{"type":"meta",{ks}}}"#).as_bytes()), None);
        assert_eq!(raw_query_type(br#"{"type":"number","tags":{"host":"a"}}"#), None);
        assert_eq!(raw_query_type(br#"{"metric":"m"}"#), None);
        assert_eq!(raw_query_type(b"not json"), None);
    }

    #[test]
    fn requests_are_recorded_in_order() {
        let state = MockState::new(Dataset::default());
        let uri: Uri = "/keysets".parse().unwrap();
        state.record(&Method::GET, &uri, &HeaderMap::new(), b"");
        state.record(&Method::POST, &"/api/query/raw".parse().unwrap(), &HeaderMap::new(), b"{}");
        let requests = state.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].content_type, None);
        assert_eq!(state.last_request().unwrap().body, "{}");
    }
}
