//! `fetchmock` lets tests declare fake HTTP responses per base URL and answers intercepted
//! requests with them, so no real request ever leaves the process. It contains two major
//! components:
//!
//! * a **matching engine** that resolves an intercepted request to at most one registered
//!   handler and records the call for later assertions, and
//! * a **test library** to register handlers and assert how they were called.
//!
//! The layer that physically intercepts the HTTP client of the code under test is not part of
//! this crate. It plugs in through the [Transport] trait and hands every intercepted request
//! to the [Registry], which returns the [MockResponse] to emit.
//!
//! # Getting Started
//! ```rust
//! use fetchmock::{HandlerConfig, Registry, RequestPayload};
//!
//! let registry = Registry::new();
//! let server = registry.create_server("https://api.test").unwrap();
//!
//! let user_mock = server.get(
//!     "/users/:id",
//!     HandlerConfig::new().path_param("id", "1").body("Fred"),
//! );
//!
//! // Normally the transport does this for every intercepted request.
//! let response = registry.handle(RequestPayload::new("GET", "https://api.test/users/1"));
//!
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_string(), "Fred");
//! user_mock.assert();
//! ```
//!
//! # Matching
//! A request is dispatched to the mock server whose base URL prefixes the request URL. The
//! handlers of that server are tried in registration order and the first one that matches
//! answers the request:
//!
//! * the method must be equal (case-insensitive),
//! * the path must match the handler pattern segment by segment. Segments starting with `:`
//!   capture any value, all others must be equal after percent-decoding. Leading and trailing
//!   slashes are not significant,
//! * declared path parameter values must be equal to the captured ones,
//! * declared search parameters must be present in the query string with equal values. Other
//!   query parameters are ignored. A query string in the pattern (`/search?q=rust`) is a
//!   search parameter constraint as well.
//!
//! No specificity ranking is applied. A general handler that was registered first shadows a
//! specific one registered later, so register specific handlers first.
//!
//! # Responses
//! If no handler matches, the request is answered with status 404 and an empty body, exactly
//! like a real server without the route. Handlers answer with status 200 and an empty body
//! unless configured otherwise. JSON bodies are serialized when the handler is registered and
//! get a `content-type: application/json` header.
//!
//! # Registries
//! The global registry behind [create_mock_server], [uninstall_interceptor] and
//! [reset_mock_servers] is shared by all tests of a process. Call [reset_mock_servers] between
//! independent test cases, or create a [Registry] per test for full isolation.
//! [reset_mock_servers] clears the call history of every handler but keeps the handlers
//! registered. Use [MockServer::delete_all_mocks] to remove handlers.
//!
//! # Debugging
//! `fetchmock` logs through `tracing` with the `log` compatibility feature enabled. For example,
//! if you use the `env_logger` backend, set the `RUST_LOG` environment variable to `debug` and
//! call `env_logger::try_init()`. Unmatched requests are logged together with the closest
//! handler and the reasons why it did not match.
//!
//! # Configuration
//! The global registry reads `FETCHMOCK_HISTORY_LIMIT` (default `100`), the number of
//! unmatched requests each mock server keeps for assertion messages.
pub use api::{
    assert_all_called, create_mock_server, global_registry, install_interceptor,
    reset_mock_servers, uninstall_interceptor, Mock, MockServer, MockSpec, Registry,
    RegistryConfig,
};
pub use common::{
    data::{
        HandlerConfig, MockResponse, RequestConstraints, RequestPayload, Resolution,
        ResponseBody, ResponseConfig,
    },
    error::Error,
};
pub use server::{
    matchers::{
        path::{PathMatch, PathTemplate},
        query::{embedded_search_params, matches as search_params_match},
        Mismatch,
    },
    state::ClosestMatch,
};
pub use transport::{ManualTransport, RequestHook, RequestSource, Transport};

mod api;
mod common;
mod server;
pub mod transport;

pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{
        assert_all_called, create_mock_server, reset_mock_servers, uninstall_interceptor,
        HandlerConfig, Mock, MockServer, Registry, RequestPayload, Resolution,
    };
}
