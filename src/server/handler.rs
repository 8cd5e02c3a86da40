use crate::{
    common::{
        data::{HandlerConfig, MockResponse, RequestPayload},
        error::Error,
        util::decode,
    },
    server::matchers::{
        path::PathTemplate,
        query::{embedded_search_params, normalize_search_params},
    },
};
use http::Method;
use std::collections::BTreeMap;

/// One registered handler together with its call history.
#[derive(Debug, Clone)]
pub(crate) struct HandlerRecord {
    pub id: usize,
    pub method: Method,
    pub template: PathTemplate,
    pub path_params: BTreeMap<String, String>,
    pub search_params: BTreeMap<String, String>,
    pub response: MockResponse,
    pub call_counter: usize,
    pub last_request: Option<RequestPayload>,
}

impl HandlerRecord {
    /// Compiles a handler from its registration. Everything that can be wrong with a
    /// registration is reported here rather than when requests arrive.
    pub fn new(
        id: usize,
        method: &str,
        pattern: &str,
        config: &HandlerConfig,
    ) -> Result<Self, Error> {
        let method = normalize_method(method).ok_or_else(|| Error::InvalidMethod(method.to_string()))?;
        let template = PathTemplate::compile(pattern)?;

        let mut path_params = BTreeMap::new();
        for (name, value) in &config.request.path_params {
            if !template.has_param(name) {
                return Err(Error::UnknownPathParam {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            path_params.insert(name.to_string(), decode(value).into_owned());
        }

        // Explicit constraints win over the ones embedded in the pattern.
        let mut search_params = embedded_search_params(pattern);
        search_params.extend(normalize_search_params(&config.request.search_params));

        let response = MockResponse::from_config(&config.response)?;

        Ok(Self {
            id,
            method,
            template,
            path_params,
            search_params,
            response,
            call_counter: 0,
            last_request: None,
        })
    }

    pub fn record_call(&mut self, req: RequestPayload) {
        self.call_counter += 1;
        self.last_request = Some(req);
    }

    pub fn clear_history(&mut self) {
        self.call_counter = 0;
        self.last_request = None;
    }

    /// A short human readable description such as `GET /users/:id`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.template.pattern())
    }
}

/// Upper-cases and parses an HTTP method. Returns `None` for strings that are not valid method
/// tokens.
pub(crate) fn normalize_method(method: &str) -> Option<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).ok()
}
