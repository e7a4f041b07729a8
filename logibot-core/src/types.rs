//! HTTP value types for webhook dispatch: method, request, and JSON response.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LogibotError, Result};

/// HTTP method of an incoming request. Routing treats a method with no registered
/// routes as unknown (405), so the enum stays closed over the verbs we dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        };
        f.write_str(verb)
    }
}

impl FromStr for Method {
    type Err = LogibotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(LogibotError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// An incoming request as seen by the router: method, raw url, optional body.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    body: Option<String>,
}

impl Request {
    /// Request without a body (e.g. GET).
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Request carrying a raw body (read lazily via [`Request::json`]).
    pub fn with_body(method: Method, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: Some(body.into()),
        }
    }

    /// Pathname of the url: scheme/host prefix, query string, and fragment stripped.
    pub fn path(&self) -> &str {
        let rest = match self.url.find("://") {
            Some(idx) => {
                let after_scheme = &self.url[idx + 3..];
                match after_scheme.find('/') {
                    Some(slash) => &after_scheme[slash..],
                    None => "/",
                }
            }
            None => self.url.as_str(),
        };
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Raw body, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Deserializes the body as JSON. A missing or unparsable body is reported as the
    /// one generic "Invalid JSON body" error, never the serde detail.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body.as_deref().ok_or(LogibotError::InvalidJson)?;
        serde_json::from_str(body).map_err(|_| LogibotError::InvalidJson)
    }
}

/// JSON response produced by the router: status, headers, pretty-printed body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Response {
    /// Serializes `data` as a pretty-printed JSON body with the given status.
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        let body = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 response with a JSON body.
    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self::json(200, data)
    }

    /// Error response `{"error": message}` with the given status (400 for client errors).
    pub fn error(message: &str, status: u16) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }
}
