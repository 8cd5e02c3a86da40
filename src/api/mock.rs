use crate::{
    api::output::{fail_with, uncalled_output},
    common::data::RequestPayload,
    server::state::ServerState,
};
use std::sync::Arc;

/// A handle to a handler registered on a [MockServer](crate::MockServer).
///
/// It gives access to the call history of the handler, so tests can assert that the code under
/// test has sent the expected requests.
///
/// # Example
/// ```
/// use fetchmock::{Registry, RequestPayload};
///
/// let registry = Registry::new();
/// let server = registry.create_server("https://api.test").unwrap();
/// let mock = server.post("/users", "created");
///
/// registry.handle(RequestPayload::new("POST", "https://api.test/users").with_body("Fred"));
///
/// assert!(mock.was_called());
/// assert_eq!(mock.sent_request().unwrap().body_string(), "Fred");
/// mock.assert();
/// ```
#[derive(Clone)]
pub struct Mock {
    id: usize,
    description: String,
    state: Arc<ServerState>,
}

impl Mock {
    pub(crate) fn new(id: usize, description: String, state: Arc<ServerState>) -> Self {
        Self {
            id,
            description,
            state,
        }
    }

    /// The ID of the handler, unique per mock server.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The base URL of the mock server this handler belongs to.
    pub fn base_url(&self) -> &str {
        self.state.base_url().as_str()
    }

    /// Method and pattern of the handler, e.g. `GET /users/:id`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// How many requests this handler has answered since it was registered or since the last
    /// reset. Deleted handlers report `0`.
    pub fn hits(&self) -> usize {
        self.state
            .call_history(self.id)
            .map_or(0, |history| history.call_counter)
    }

    /// Whether this handler has answered at least one request.
    pub fn was_called(&self) -> bool {
        self.hits() > 0
    }

    /// The most recent request this handler has answered.
    pub fn sent_request(&self) -> Option<RequestPayload> {
        self.state
            .call_history(self.id)
            .and_then(|history| history.last_request)
    }

    /// Asserts that this handler has answered exactly one request.
    ///
    /// # Panics
    /// Panics with a comparison against the most similar unmatched request if the handler has
    /// not been called exactly once.
    pub fn assert(&self) {
        self.assert_hits(1)
    }

    /// Asserts that this handler has answered exactly `hits` requests.
    ///
    /// # Panics
    /// Panics with a comparison against the most similar unmatched request otherwise.
    pub fn assert_hits(&self, hits: usize) {
        let actual = self.hits();
        if actual == hits {
            return;
        }

        fail_with(
            &format!("'{}' on {}", self.description, self.base_url()),
            actual,
            hits,
            self.state.closest_match(self.id),
        )
    }

    /// Removes this handler from its mock server. Requests it would have answered are now
    /// resolved by the remaining handlers.
    pub fn delete(&mut self) {
        self.state.delete_handler(self.id);
    }
}

impl std::fmt::Debug for Mock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mock")
            .field("id", &self.id)
            .field("base_url", &self.base_url())
            .field("description", &self.description)
            .finish()
    }
}

/// Asserts that every given handler has been called at least once. Use it at the end of a test
/// to catch mocks that the code under test never needed.
///
/// # Panics
/// Panics with a table of all handlers that were never called.
pub fn assert_all_called<'a, I>(mocks: I)
where
    I: IntoIterator<Item = &'a Mock>,
{
    let uncalled: Vec<(String, String)> = mocks
        .into_iter()
        .filter(|mock| !mock.was_called())
        .map(|mock| (mock.base_url().to_string(), mock.description().to_string()))
        .collect();

    if !uncalled.is_empty() {
        panic!("{}", uncalled_output(&uncalled));
    }
}
