use crate::common::error::Error;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, str::FromStr};

/// An intercepted HTTP request as seen by the matching engine.
///
/// This is also the payload that is captured by a handler when it answers a request, so that
/// tests can inspect what the code under test has sent (see
/// [Mock::sent_request](crate::Mock::sent_request)).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestPayload {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl RequestPayload {
    /// Creates a request with the given method and absolute URL, no headers and an empty body.
    pub fn new<M: Into<String>, U: Into<String>>(method: M, url: U) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header to the request.
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces all headers of the request.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body.
    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// The HTTP method exactly as reported by the transport.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The absolute URL of the request.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Vec<(String, String)> {
        &self.headers
    }

    /// Returns the first value of the header with the given name. Header names are compared
    /// case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body interpreted as UTF-8. Invalid sequences are replaced.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the body from JSON.
    pub fn json_body<'a, T: Deserialize<'a>>(&'a self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl From<http::Request<Bytes>> for RequestPayload {
    fn from(value: http::Request<Bytes>) -> Self {
        let (parts, body) = value.into_parts();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();

        Self {
            method: parts.method.to_string(),
            url: parts.uri.to_string(),
            headers,
            body,
        }
    }
}

/// A fully resolved response description, ready to be turned into a transport-level response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl MockResponse {
    /// The response emitted for requests that no handler answers: status 404 and an empty body.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND.as_u16(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Builds a response from a handler configuration, applying defaults (status 200, empty
    /// body, no headers) and validating status code and headers.
    pub(crate) fn from_config(config: &ResponseConfig) -> Result<Self, Error> {
        let status = config.status.unwrap_or(200);
        StatusCode::from_u16(status).map_err(|_| Error::InvalidStatus(status))?;

        let mut headers = Vec::with_capacity(config.headers.len() + 1);
        for (name, value) in &config.headers {
            HeaderName::from_str(name)
                .map_err(|err| Error::InvalidHeader(format!("{}: {}", name, err)))?;
            HeaderValue::from_str(value)
                .map_err(|err| Error::InvalidHeader(format!("{}: {}", name, err)))?;
            headers.push((name.to_string(), value.to_string()));
        }

        let (body, content_type) = match &config.body {
            None => (Bytes::new(), None),
            Some(body) => body.to_bytes()?,
        };

        if let Some(content_type) = content_type {
            let has_content_type = headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case(http::header::CONTENT_TYPE.as_str()));
            if !has_content_type {
                headers.push((
                    http::header::CONTENT_TYPE.as_str().to_string(),
                    content_type.to_string(),
                ));
            }
        }

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Converts this description into an `http` response, e.g. for transports built on `hyper`.
    pub fn into_http_response(self) -> Result<http::Response<Full<Bytes>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);

        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        builder.body(Full::new(self.body))
    }
}

/// The outcome of resolving a request against the registered handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A handler answered the request.
    Matched(MockResponse),
    /// The request targets a mock server, but none of its handlers matches.
    NotFound,
    /// No mock server is registered for the request URL.
    Unhandled,
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    /// The response to emit. Everything but a match turns into a 404 with an empty body.
    pub fn into_response(self) -> MockResponse {
        match self {
            Resolution::Matched(response) => response,
            Resolution::NotFound | Resolution::Unhandled => MockResponse::not_found(),
        }
    }
}

/// The body of a mocked response.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Binary(Bytes),
    Json(Value),
}

impl ResponseBody {
    /// Serializes the body and returns the content type it implies, if any.
    pub(crate) fn to_bytes(&self) -> Result<(Bytes, Option<&'static str>), Error> {
        Ok(match self {
            ResponseBody::Text(text) => (Bytes::from(text.clone()), None),
            ResponseBody::Binary(bytes) => (bytes.clone(), None),
            ResponseBody::Json(value) => (
                Bytes::from(serde_json::to_vec(value)?),
                Some("application/json"),
            ),
        })
    }
}

// Strings in a JSON configuration are plain text bodies, anything else is serialized as JSON.
impl<'de> Deserialize<'de> for ResponseBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => ResponseBody::Text(text),
            value => ResponseBody::Json(value),
        })
    }
}

/// Exact-value constraints a request must satisfy in addition to method and path.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestConstraints {
    pub path_params: BTreeMap<String, String>,
    pub search_params: BTreeMap<String, String>,
}

/// The response part of a handler configuration. Unset fields fall back to status 200, an
/// empty body and no headers.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ResponseConfig {
    pub status: Option<u16>,
    pub body: Option<ResponseBody>,
    pub headers: BTreeMap<String, String>,
}

/// The normalized shape of every handler registration.
///
/// JSON configurations use the keys `request.pathParams`, `request.searchParams`,
/// `response.status`, `response.body` and `response.headers`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HandlerConfig {
    pub request: RequestConstraints,
    pub response: ResponseConfig,
}
