use crate::{
    api::{output::uncalled_output, server::MockServer},
    common::{
        data::{MockResponse, RequestPayload, Resolution},
        error::Error,
        util::{lock, read_env, Join},
    },
    server::{base_url::BaseUrl, state::ServerState},
    transport::{ManualTransport, RequestHook, RequestSource, Transport},
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, Weak},
};
use lazy_static::lazy_static;
use url::Url;

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Configuration of a [Registry].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of unmatched requests each mock server keeps for diagnostics.
    pub history_limit: usize,
}

impl RegistryConfig {
    /// Reads the configuration from the environment. `FETCHMOCK_HISTORY_LIMIT` overrides the
    /// history limit.
    ///
    /// # Panics
    /// Panics if `FETCHMOCK_HISTORY_LIMIT` is set but is not an unsigned integer.
    pub fn from_env() -> Self {
        let history_limit = read_env(
            "FETCHMOCK_HISTORY_LIMIT",
            &DEFAULT_HISTORY_LIMIT.to_string(),
        )
        .parse::<usize>()
        .expect("Cannot parse environment variable FETCHMOCK_HISTORY_LIMIT to an integer");

        Self { history_limit }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

struct RegistryState {
    servers: BTreeMap<String, Arc<ServerState>>,
    transport: Arc<dyn Transport>,
    installed: bool,
}

struct RegistryInner {
    config: RegistryConfig,
    state: Mutex<RegistryState>,
}

/// Owns all mock servers of a test run and the installation of the interception transport.
///
/// Intercepted requests are dispatched to the mock server whose base URL prefixes the request
/// URL. If several base URLs match (e.g. `https://api.test` and `https://api.test/v2`) the one
/// with the longest path wins.
///
/// The transport is installed when the first mock server is created and uninstalled by
/// [Registry::dispose]. A registry can be created per test for full isolation, or the global
/// registry can be shared through [create_mock_server] and friends, in which case tests
/// should call [reset_mock_servers] between independent cases.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Creates a registry with the default configuration and a [ManualTransport].
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config,
                state: Mutex::new(RegistryState {
                    servers: BTreeMap::new(),
                    transport: Arc::new(ManualTransport),
                    installed: false,
                }),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Replaces the transport. If the current transport is installed, it is uninstalled and the
    /// new one is installed in its place.
    ///
    /// The new transport replaces the old one even if installing it fails. In that case no
    /// transport is installed and the next [Registry::create_server] retries the new one.
    pub fn set_transport<T: Transport + 'static>(&self, transport: T) -> Result<(), Error> {
        let mut state = lock(&self.inner.state);
        let reinstall = state.installed;

        if state.installed {
            state.transport.uninstall();
            state.installed = false;
        }

        state.transport = Arc::new(transport);

        if reinstall {
            state.transport.install(self.hook())?;
            state.installed = true;
        }

        Ok(())
    }

    /// Whether the transport is currently installed.
    pub fn is_installed(&self) -> bool {
        lock(&self.inner.state).installed
    }

    /// Creates a mock server for the given base URL and installs the transport if this is the
    /// first server since the registry was created or disposed.
    ///
    /// Fails with [Error::DuplicateBaseUrl] if a server already exists for the same
    /// (normalized) base URL.
    pub fn create_server(&self, base_url: &str) -> Result<MockServer, Error> {
        let base_url = BaseUrl::parse(base_url)?;
        let mut state = lock(&self.inner.state);

        if state.servers.contains_key(base_url.as_str()) {
            return Err(Error::DuplicateBaseUrl(base_url.as_str().to_string()));
        }

        if !state.installed {
            state.transport.install(self.hook())?;
            state.installed = true;
            tracing::debug!("Installed interception transport");
        }

        tracing::debug!("Creating mock server for {}", base_url.as_str());

        let key = base_url.as_str().to_string();
        let server = Arc::new(ServerState::new(base_url, self.inner.config.history_limit));
        state.servers.insert(key, server.clone());

        Ok(MockServer::new(server))
    }

    /// Returns the live mock server for the given base URL.
    pub fn server(&self, base_url: &str) -> Option<MockServer> {
        let base_url = BaseUrl::parse(base_url).ok()?;
        lock(&self.inner.state)
            .servers
            .get(base_url.as_str())
            .map(|s| MockServer::new(s.clone()))
    }

    /// All live mock servers, ordered by base URL.
    pub fn servers(&self) -> Vec<MockServer> {
        lock(&self.inner.state)
            .servers
            .values()
            .map(|s| MockServer::new(s.clone()))
            .collect()
    }

    /// Resolves a request against the mock server responsible for its URL.
    pub fn resolve(&self, request: RequestPayload) -> Resolution {
        match self.find_server(request.url()) {
            Some(server) => server.resolve(request),
            None => {
                tracing::warn!(
                    "No mock server is registered for the following request: {} {}",
                    request.method(),
                    request.url()
                );
                Resolution::Unhandled
            }
        }
    }

    /// Resolves a request and returns the response to emit. Unmatched requests are answered
    /// with status 404 and an empty body.
    pub fn handle(&self, request: RequestPayload) -> MockResponse {
        self.resolve(request).into_response()
    }

    /// Like [Registry::handle], but reads headers and body from the source only if the request
    /// targets a registered mock server.
    pub async fn handle_source_async(&self, source: &dyn RequestSource) -> MockResponse {
        let (method, url) = (source.method(), source.url());

        let server = match self.find_server(&url) {
            Some(server) => server,
            None => {
                tracing::warn!(
                    "No mock server is registered for the following request: {} {}",
                    method,
                    url
                );
                return MockResponse::not_found();
            }
        };

        let request = RequestPayload::new(method, url)
            .with_headers(source.headers().await)
            .with_body(source.body().await);

        server.resolve(request).into_response()
    }

    /// Blocking version of [Registry::handle_source_async].
    pub fn handle_source(&self, source: &dyn RequestSource) -> MockResponse {
        self.handle_source_async(source).join()
    }

    /// Clears the call history of every handler of every mock server. Registrations are kept;
    /// use [MockServer::delete_all_mocks] to remove them.
    pub fn reset(&self) {
        let servers: Vec<Arc<ServerState>> =
            lock(&self.inner.state).servers.values().cloned().collect();

        servers.iter().for_each(|s| s.clear_history());

        tracing::debug!("Reset call history of {} mock servers", servers.len());
    }

    /// Uninstalls the transport and discards all mock servers and their handlers.
    pub fn dispose(&self) {
        let mut state = lock(&self.inner.state);

        if state.installed {
            state.transport.uninstall();
            state.installed = false;
            tracing::debug!("Uninstalled interception transport");
        }

        for server in state.servers.values() {
            server.dispose();
        }
        state.servers.clear();

        tracing::debug!("Disposed all mock servers");
    }

    /// Asserts that every handler of every live mock server has been called at least once.
    ///
    /// # Panics
    /// Panics with a table of all handlers that were never called.
    pub fn assert_all_called(&self) {
        let servers: Vec<Arc<ServerState>> =
            lock(&self.inner.state).servers.values().cloned().collect();

        let uncalled: Vec<(String, String)> = servers
            .iter()
            .flat_map(|s| {
                s.uncalled_handlers()
                    .into_iter()
                    .map(move |(_, description)| (s.base_url().as_str().to_string(), description))
            })
            .collect();

        if !uncalled.is_empty() {
            panic!("{}", uncalled_output(&uncalled));
        }
    }

    /// Picks the server with the longest base URL that prefixes the given URL.
    fn find_server(&self, url: &str) -> Option<Arc<ServerState>> {
        let url = Url::parse(url).ok()?;

        lock(&self.inner.state)
            .servers
            .values()
            .filter(|s| s.base_url().strip(&url).is_some())
            .max_by_key(|s| s.base_url().depth())
            .cloned()
    }

    fn hook(&self) -> RequestHook {
        let inner: Weak<RegistryInner> = Arc::downgrade(&self.inner);

        Arc::new(move |request: RequestPayload| match inner.upgrade() {
            Some(inner) => Registry { inner }.handle(request),
            None => MockResponse::not_found(),
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Registry")
            .field("config", &self.inner.config)
            .field("servers", &state.servers.keys().collect::<Vec<_>>())
            .field("installed", &state.installed)
            .finish()
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: Registry = Registry::with_config(RegistryConfig::from_env());
}

/// The process-wide registry used by [create_mock_server], [uninstall_interceptor] and
/// [reset_mock_servers].
pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Creates a mock server for the given base URL on the global registry.
pub fn create_mock_server(base_url: &str) -> Result<MockServer, Error> {
    global_registry().create_server(base_url)
}

/// Alias of [create_mock_server]. Creating the first server installs the interception transport.
pub fn install_interceptor(base_url: &str) -> Result<MockServer, Error> {
    create_mock_server(base_url)
}

/// Uninstalls the interception transport of the global registry and discards all its mock
/// servers.
pub fn uninstall_interceptor() {
    global_registry().dispose()
}

/// Clears the call history of all handlers of the global registry. Handlers stay registered.
pub fn reset_mock_servers() {
    global_registry().reset()
}
