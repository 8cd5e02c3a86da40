use crate::common::data::{HandlerConfig, ResponseBody};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// The argument of every handler registration: either a bare response body or a full
/// [HandlerConfig].
///
/// Both shapes are normalized into a [HandlerConfig] right away, so the matching engine only
/// ever sees one. Most values convert implicitly:
///
/// ```
/// use fetchmock::{HandlerConfig, Registry};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// let server = registry.create_server("https://api.test").unwrap();
///
/// server.get("/text", "hello");
/// server.get("/json", json!({ "id": 1 }));
/// server.get(
///     "/users/:id",
///     HandlerConfig::new().path_param("id", "1").status(200).body("user 1"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum MockSpec {
    Body(ResponseBody),
    Config(HandlerConfig),
}

impl MockSpec {
    pub(crate) fn into_config(self) -> HandlerConfig {
        match self {
            MockSpec::Body(body) => HandlerConfig::new().body(body),
            MockSpec::Config(config) => config,
        }
    }
}

impl From<HandlerConfig> for MockSpec {
    fn from(value: HandlerConfig) -> Self {
        MockSpec::Config(value)
    }
}

impl From<ResponseBody> for MockSpec {
    fn from(value: ResponseBody) -> Self {
        MockSpec::Body(value)
    }
}

impl From<&str> for MockSpec {
    fn from(value: &str) -> Self {
        MockSpec::Body(value.into())
    }
}

impl From<String> for MockSpec {
    fn from(value: String) -> Self {
        MockSpec::Body(value.into())
    }
}

impl From<Value> for MockSpec {
    fn from(value: Value) -> Self {
        MockSpec::Body(value.into())
    }
}

impl From<Bytes> for MockSpec {
    fn from(value: Bytes) -> Self {
        MockSpec::Body(value.into())
    }
}

impl From<Vec<u8>> for MockSpec {
    fn from(value: Vec<u8>) -> Self {
        MockSpec::Body(value.into())
    }
}

impl From<&str> for ResponseBody {
    fn from(value: &str) -> Self {
        ResponseBody::Text(value.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        ResponseBody::Text(value)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}

impl From<Bytes> for ResponseBody {
    fn from(value: Bytes) -> Self {
        ResponseBody::Binary(value)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        ResponseBody::Binary(Bytes::from(value))
    }
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the path parameter `name` (declared as `:name` in the pattern) to be equal to
    /// `value`.
    pub fn path_param<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.request.path_params.insert(name.into(), value.into());
        self
    }

    /// Requires the query parameter `name` to be present with the given value. Other query
    /// parameters of the request are ignored.
    pub fn search_param<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.request.search_params.insert(name.into(), value.into());
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.response.status = Some(status);
        self
    }

    pub fn body<B: Into<ResponseBody>>(mut self, body: B) -> Self {
        self.response.body = Some(body.into());
        self
    }

    /// Sets a JSON body from any serializable value.
    ///
    /// # Panics
    /// Panics if the value cannot be serialized to JSON.
    pub fn json_body<T: Serialize>(self, body: &T) -> Self {
        let value = serde_json::to_value(body)
            .unwrap_or_else(|err| panic!("cannot serialize JSON body: {}", err));
        self.body(ResponseBody::Json(value))
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.response.headers.insert(name.into(), value.into());
        self
    }
}
