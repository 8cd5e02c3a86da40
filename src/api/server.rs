use crate::{
    api::{mock::Mock, output::uncalled_output, spec::MockSpec},
    common::{
        data::{RequestPayload, Resolution},
        error::Error,
    },
    server::state::ServerState,
};
use std::sync::Arc;

/// A mock server for one base URL.
///
/// Requests to URLs below the base URL are answered by the handlers registered on this server.
/// Handlers are tried in registration order and the first one that matches answers the request,
/// so register specific handlers before general ones that would match the same requests.
/// Requests that no handler matches are answered with status 404 and an empty body.
///
/// Instances are created by a [Registry](crate::Registry) (or by
/// [create_mock_server](crate::create_mock_server) for the global registry). Cloning is cheap
/// and all clones refer to the same server.
#[derive(Clone)]
pub struct MockServer {
    state: Arc<ServerState>,
}

impl MockServer {
    pub(crate) fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// The normalized base URL of this server, e.g. `https://api.test`.
    pub fn base_url(&self) -> &str {
        self.state.base_url().as_str()
    }

    /// Builds the absolute URL for a path on this server.
    ///
    /// **Example**:
    /// ```
    /// let registry = fetchmock::Registry::new();
    /// let server = registry.create_server("https://api.test/v1/").unwrap();
    ///
    /// assert_eq!(server.url("/users"), "https://api.test/v1/users");
    /// ```
    pub fn url<S: AsRef<str>>(&self, path: S) -> String {
        let path = path.as_ref();
        if path.is_empty() || path.starts_with('/') || path.starts_with('?') {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }

    /// Registers a handler for an arbitrary HTTP method.
    ///
    /// Fails if the method or the pattern is malformed, if a path parameter constraint names a
    /// parameter the pattern does not declare, if the response is invalid or if the server has
    /// been disposed.
    pub fn try_mock<S: Into<MockSpec>>(
        &self,
        method: &str,
        pattern: &str,
        spec: S,
    ) -> Result<Mock, Error> {
        let config = spec.into().into_config();
        let id = self.state.add_handler(method, pattern, &config)?;

        Ok(Mock::new(
            id,
            format!("{} {}", method.trim().to_ascii_uppercase(), pattern),
            self.state.clone(),
        ))
    }

    /// Registers a handler for an arbitrary HTTP method.
    ///
    /// # Panics
    /// Panics if the registration is invalid, see [MockServer::try_mock].
    pub fn mock<S: Into<MockSpec>>(&self, method: &str, pattern: &str, spec: S) -> Mock {
        self.try_mock(method, pattern, spec)
            .unwrap_or_else(|err| panic!("cannot register handler {} {}: {}", method, pattern, err))
    }

    /// Registers a `GET` handler. See [MockServer::mock].
    pub fn get<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("GET", pattern, spec)
    }

    /// Registers a `POST` handler. See [MockServer::mock].
    pub fn post<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("POST", pattern, spec)
    }

    /// Registers a `PUT` handler. See [MockServer::mock].
    pub fn put<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("PUT", pattern, spec)
    }

    /// Registers a `PATCH` handler. See [MockServer::mock].
    pub fn patch<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("PATCH", pattern, spec)
    }

    /// Registers a `DELETE` handler. See [MockServer::mock].
    pub fn delete<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("DELETE", pattern, spec)
    }

    /// Registers a `HEAD` handler. See [MockServer::mock].
    pub fn head<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("HEAD", pattern, spec)
    }

    /// Registers an `OPTIONS` handler. See [MockServer::mock].
    pub fn options<S: Into<MockSpec>>(&self, pattern: &str, spec: S) -> Mock {
        self.mock("OPTIONS", pattern, spec)
    }

    /// Resolves a request against the handlers of this server only. The matched handler's call
    /// history is updated.
    pub fn resolve(&self, request: RequestPayload) -> Resolution {
        self.state.resolve(request)
    }

    /// Clears the call history of all handlers. Handlers stay registered.
    pub fn reset(&self) {
        self.state.clear_history();
    }

    /// Removes all handlers from this server.
    pub fn delete_all_mocks(&self) {
        self.state.delete_all_handlers();
    }

    /// Requests that reached this server but matched no handler, oldest first. The number of
    /// requests kept is bounded by [RegistryConfig::history_limit](crate::RegistryConfig).
    pub fn unmatched_requests(&self) -> Vec<RequestPayload> {
        self.state.unmatched_requests()
    }

    /// Whether the registry this server belonged to has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// Asserts that every handler registered on this server has been called at least once.
    ///
    /// # Panics
    /// Panics with a table of all handlers that were never called.
    pub fn assert_all_called(&self) {
        let uncalled: Vec<(String, String)> = self
            .state
            .uncalled_handlers()
            .into_iter()
            .map(|(_, description)| (self.base_url().to_string(), description))
            .collect();

        if !uncalled.is_empty() {
            panic!("{}", uncalled_output(&uncalled));
        }
    }
}

impl std::fmt::Debug for MockServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockServer")
            .field("base_url", &self.base_url())
            .finish()
    }
}
