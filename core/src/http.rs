//! Endpoint descriptors and the plain-data reply returned by the gateway.
//!
//! # Design
//! An `Endpoint` is static value data: one `const` per remote operation,
//! naming its method, its URI template, and whether that template takes
//! positional arguments. Nothing dispatches on it polymorphically; the
//! gateway reads the three fields and builds the call.

use std::fmt;

pub(crate) const CONTENT_TYPE: &str = "content-type";
pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Placeholder consumed by one positional URI argument.
const PLACEHOLDER: &str = "{}";

/// HTTP method for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    method: HttpMethod,
    uri: &'static str,
    has_uri_parameters: bool,
}

impl Endpoint {
    /// An endpoint whose URI is used verbatim.
    pub const fn new(method: HttpMethod, uri: &'static str) -> Self {
        Self {
            method,
            uri,
            has_uri_parameters: false,
        }
    }

    /// An endpoint whose URI holds `{}` placeholders filled positionally at
    /// call time.
    pub const fn with_parameters(method: HttpMethod, uri: &'static str) -> Self {
        Self {
            method,
            uri,
            has_uri_parameters: true,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri_template(&self) -> &'static str {
        self.uri
    }

    pub fn has_uri_parameters(&self) -> bool {
        self.has_uri_parameters
    }

    /// Resolve the request URI for this call.
    ///
    /// Arguments replace placeholders left to right. There is no arity
    /// check: surplus arguments are ignored and unfilled placeholders stay in
    /// the URI, where the transport rejects them as malformed.
    pub fn resolve(&self, args: &[&str]) -> String {
        if !self.has_uri_parameters {
            return self.uri.to_string();
        }

        let mut resolved = String::with_capacity(self.uri.len() + args.iter().map(|a| a.len()).sum::<usize>());
        let mut rest = self.uri;
        let mut args = args.iter();
        while let Some(at) = rest.find(PLACEHOLDER) {
            let Some(arg) = args.next() else {
                break;
            };
            resolved.push_str(&rest[..at]);
            resolved.push_str(arg);
            rest = &rest[at + PLACEHOLDER.len()..];
        }
        resolved.push_str(rest);
        resolved
    }
}

/// A completed HTTP exchange: the raw status code and, when the body was
/// decoded, the typed value.
///
/// `value` is `None` for 204 responses and for empty bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub value: Option<T>,
}

impl<T: Default> Reply<T> {
    /// The decoded value, or the type's zero value when nothing was decoded.
    pub fn into_value_or_default(self) -> T {
        self.value.unwrap_or_default()
    }
}
