//! Field-at-a-time parser for inbound raw-query documents.
//!
//! # Design
//! A raw query mixes mandatory fields, optional fields, and a mandatory key
//! nested inside the `tags` object. Rather than decoding structurally and
//! validating afterwards, the document is run through an ordered pipeline of
//! pure extraction steps. Each step reads one field from the JSON object and
//! either yields its value or an error; the first error ends the parse, so on
//! input with several problems the reported one is always the same.
//!
//! Step order: `type`, `metric`, `since`, `until`, `estimateSize`, `tags`,
//! then the `ksid` tag.
//!
//! A key repeated in the document, top level or inside `tags`, is not an
//! error: the last occurrence wins.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::types::{RawDataQuery, RawQuery, RawQueryType};

const TYPE: &str = "type";
const METRIC: &str = "metric";
const SINCE: &str = "since";
const UNTIL: &str = "until";
const ESTIMATE_SIZE: &str = "estimateSize";
const TAGS: &str = "tags";
const KSID: &str = "ksid";

type Document = Map<String, Value>;

impl RawQuery {
    /// Validate and extract a raw query from untrusted bytes.
    pub fn parse(data: &[u8]) -> Result<RawQuery, ParseError> {
        let value: Value = serde_json::from_slice(data).map_err(|e| ParseError::Malformed(e.to_string()))?;
        let Value::Object(doc) = value else {
            return Err(ParseError::Malformed("document is not a JSON object".to_string()));
        };

        let query_type = query_type(&doc)?;
        let metric = required_string(&doc, METRIC)?;
        let since = required_string(&doc, SINCE)?;
        let until = optional_string(&doc, UNTIL)?.unwrap_or_default();
        let estimate_size = optional_bool(&doc, ESTIMATE_SIZE)?.unwrap_or(false);
        let tags = tags(&doc)?;
        if !tags.contains_key(KSID) {
            return Err(ParseError::MissingMandatoryFields(KSID));
        }

        Ok(RawQuery {
            data: RawDataQuery {
                metric,
                tags,
                since,
                until,
                estimate_size,
            },
            query_type,
        })
    }
}

fn query_type(doc: &Document) -> Result<RawQueryType, ParseError> {
    match doc.get(TYPE) {
        None => Err(ParseError::MissingMandatoryFields(TYPE)),
        Some(Value::String(s)) => RawQueryType::from_wire(s).ok_or(ParseError::MissingMandatoryFields(TYPE)),
        Some(_) => Err(mismatch(TYPE, "string")),
    }
}

fn required_string(doc: &Document, field: &'static str) -> Result<String, ParseError> {
    optional_string(doc, field)?.ok_or(ParseError::MissingField(field))
}

fn optional_string(doc: &Document, field: &'static str) -> Result<Option<String>, ParseError> {
    match doc.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(mismatch(field, "string")),
    }
}

fn optional_bool(doc: &Document, field: &'static str) -> Result<Option<bool>, ParseError> {
    match doc.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(mismatch(field, "boolean")),
    }
}

/// Absent or null tags yield an empty map; the `ksid` check reports it.
fn tags(doc: &Document) -> Result<HashMap<String, String>, ParseError> {
    let entries = match doc.get(TAGS) {
        None | Some(Value::Null) => return Ok(HashMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(mismatch(TAGS, "object")),
    };

    entries
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), s.clone())),
            _ => Err(mismatch(format!("{TAGS}.{key}"), "string")),
        })
        .collect()
}

fn mismatch(field: impl Into<String>, expected: &'static str) -> ParseError {
    ParseError::TypeMismatch {
        field: field.into(),
        expected,
    }
}
