//! Raw-query DTOs.
//!
//! # Design
//! These types mirror the remote service's schema but are defined
//! independently of the mock-server crate; integration tests catch schema
//! drift. `RawDataQuery` is what a caller fills in; `RawQuery` is the wire
//! document, which adds the `type` discriminator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which kind of points a raw query asks for.
///
/// Wire values are `"number"` and `"text"`; no other spelling is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawQueryType {
    Number,
    Text,
}

impl RawQueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            RawQueryType::Number => "number",
            RawQueryType::Text => "text",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "number" => Some(RawQueryType::Number),
            "text" => Some(RawQueryType::Text),
            _ => None,
        }
    }
}

/// Metric, tag filters and time window of a raw query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataQuery {
    pub metric: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Duration expression such as `15m`.
    pub since: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub until: String,
    #[serde(default, rename = "estimateSize")]
    pub estimate_size: bool,
}

impl RawDataQuery {
    pub fn new(metric: impl Into<String>, since: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            since: since.into(),
            ..Self::default()
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn until(mut self, until: impl Into<String>) -> Self {
        self.until = until.into();
        self
    }

    pub fn typed(&self, query_type: RawQueryType) -> RawQuery {
        RawQuery {
            data: self.clone(),
            query_type,
        }
    }
}

/// A complete raw-query document as sent to, or received by, the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(flatten)]
    pub data: RawDataQuery,
    #[serde(rename = "type")]
    pub query_type: RawQueryType,
}

/// The metric and tags a series of points belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub metric: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberPoint {
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPoint {
    pub timestamp: i64,
    pub text: String,
}

/// One series of a raw query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Points<P> {
    pub metadata: Metadata,
    #[serde(default = "Vec::new")]
    pub points: Vec<P>,
}

/// The final raw query results. `total == 0` means the query matched no data;
/// a document without `total` counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults<P> {
    #[serde(default = "Vec::new")]
    pub results: Vec<Points<P>>,
    #[serde(default)]
    pub total: i64,
}

impl<P> QueryResults<P> {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub type NumberQueryResults = QueryResults<NumberPoint>;
pub type TextQueryResults = QueryResults<TextPoint>;
